use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Duration;
use crates::{
    domain::{
        entities::services::ServiceEntity,
        repositories::services::ServiceRepository,
        value_objects::{
            clock::Clock,
            enums::{
                moderation_statuses::ModerationStatus, service_statuses::ServiceStatus,
                subscription_tiers::SubscriptionTier,
            },
            services::{DirectoryFilter, RegisterServiceModel, ServiceDto},
        },
    },
    infra::cache::TtlCache,
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(String),
    #[error("Owner is banned from listing services")]
    OwnerBanned,
    #[error("Only the owner can delete this service")]
    NotOwner,
    #[error("Service not found")]
    ServiceNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for DirectoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            DirectoryError::Validation(_) => StatusCode::BAD_REQUEST,
            DirectoryError::OwnerBanned | DirectoryError::NotOwner => StatusCode::FORBIDDEN,
            DirectoryError::ServiceNotFound => StatusCode::NOT_FOUND,
            DirectoryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            DirectoryError::Validation(_) => "VALIDATION_ERROR",
            DirectoryError::OwnerBanned => "OWNER_BANNED",
            DirectoryError::NotOwner => "FORBIDDEN",
            DirectoryError::ServiceNotFound => "SERVICE_NOT_FOUND",
            DirectoryError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, DirectoryError>;

/// Top-tier listings first in their stored order, the rest shuffled by `seed`.
pub fn order_listings(services: Vec<ServiceEntity>, seed: u64) -> Vec<ServiceEntity> {
    let (mut ordered, mut rest): (Vec<_>, Vec<_>) = services.into_iter().partition(|service| {
        SubscriptionTier::from_str(&service.subscription_tier) == SubscriptionTier::Top
    });

    let mut rng = StdRng::seed_from_u64(seed);
    rest.shuffle(&mut rng);

    ordered.append(&mut rest);
    ordered
}

fn is_publicly_visible(service: &ServiceEntity) -> bool {
    ModerationStatus::from_str(&service.moderation_status) != ModerationStatus::Suspended
        && ServiceStatus::from_str(&service.status) != Some(ServiceStatus::Cancelled)
}

pub struct DirectoryUseCase<S>
where
    S: ServiceRepository + Send + Sync + 'static,
{
    service_repo: Arc<S>,
    cache: TtlCache,
    clock: Arc<dyn Clock>,
    trial_days: i64,
    order_seed_ttl: Duration,
}

impl<S> DirectoryUseCase<S>
where
    S: ServiceRepository + Send + Sync + 'static,
{
    pub fn new(
        service_repo: Arc<S>,
        cache: TtlCache,
        clock: Arc<dyn Clock>,
        trial_days: i64,
        order_seed_ttl: Duration,
    ) -> Self {
        Self {
            service_repo,
            cache,
            clock,
            trial_days,
            order_seed_ttl,
        }
    }

    pub async fn register(
        &self,
        owner_user_id: Uuid,
        model: RegisterServiceModel,
    ) -> UseCaseResult<ServiceDto> {
        let banned = self
            .service_repo
            .is_owner_banned(owner_user_id)
            .await
            .map_err(|err| {
                error!(%owner_user_id, db_error = ?err, "directory: ban lookup failed");
                DirectoryError::Internal(err)
            })?;
        if banned {
            warn!(%owner_user_id, "directory: banned owner tried to register a service");
            return Err(DirectoryError::OwnerBanned);
        }

        let entity = model
            .to_entity(owner_user_id, self.clock.now(), self.trial_days)
            .map_err(DirectoryError::Validation)?;

        let service = self.service_repo.register(entity).await.map_err(|err| {
            error!(%owner_user_id, db_error = ?err, "directory: failed to register service");
            DirectoryError::Internal(err)
        })?;

        info!(
            %owner_user_id,
            service_id = %service.id,
            trial_end = ?service.trial_end,
            "directory: service registered on trial"
        );
        Ok(ServiceDto::from(service))
    }

    pub async fn list(
        &self,
        viewer_id: Uuid,
        filter: DirectoryFilter,
    ) -> UseCaseResult<Vec<ServiceDto>> {
        let services = self.service_repo.list_visible(filter).await.map_err(|err| {
            error!(%viewer_id, db_error = ?err, "directory: failed to list services");
            DirectoryError::Internal(err)
        })?;

        let seed = self.order_seed(viewer_id).await;
        let ordered = order_listings(services, seed);

        info!(%viewer_id, count = ordered.len(), "directory: services listed");
        Ok(ordered.into_iter().map(ServiceDto::from).collect())
    }

    pub async fn get(&self, viewer_id: Uuid, service_id: Uuid) -> UseCaseResult<ServiceDto> {
        let service = self
            .service_repo
            .find_by_id(service_id)
            .await
            .map_err(|err| {
                error!(%service_id, db_error = ?err, "directory: failed to load service");
                DirectoryError::Internal(err)
            })?
            .filter(|service| service.owner_user_id == viewer_id || is_publicly_visible(service))
            .ok_or(DirectoryError::ServiceNotFound)?;

        Ok(ServiceDto::from(service))
    }

    pub async fn delete(&self, owner_user_id: Uuid, service_id: Uuid) -> UseCaseResult<()> {
        let service = self
            .service_repo
            .find_by_id(service_id)
            .await
            .map_err(|err| {
                error!(%service_id, db_error = ?err, "directory: failed to load service");
                DirectoryError::Internal(err)
            })?
            .ok_or(DirectoryError::ServiceNotFound)?;

        if service.owner_user_id != owner_user_id {
            warn!(%owner_user_id, %service_id, "directory: delete by non-owner rejected");
            return Err(DirectoryError::NotOwner);
        }

        let deleted = self
            .service_repo
            .delete_owned(service_id, owner_user_id)
            .await
            .map_err(|err| {
                error!(%service_id, db_error = ?err, "directory: failed to delete service");
                DirectoryError::Internal(err)
            })?;
        if !deleted {
            return Err(DirectoryError::ServiceNotFound);
        }

        info!(%owner_user_id, %service_id, "directory: service deleted by owner");
        Ok(())
    }

    /// Per-viewer shuffle seed, stable for the cache TTL so paging does not
    /// reshuffle. Cache trouble only costs stability, never the listing.
    async fn order_seed(&self, viewer_id: Uuid) -> u64 {
        let key = format!("directory:order-seed:{viewer_id}");

        match self.cache.get::<u64>(&key).await {
            Ok(Some(seed)) => return seed,
            Ok(None) => {}
            Err(err) => warn!(%viewer_id, error = ?err, "directory: order seed lookup failed"),
        }

        let seed = rand::random::<u64>();
        if let Err(err) = self.cache.set(&key, &seed, self.order_seed_ttl).await {
            warn!(%viewer_id, error = ?err, "directory: failed to cache order seed");
        }
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crates::{
        domain::{repositories::services::MockServiceRepository, value_objects::clock::FixedClock},
        infra::cache::in_memory::{DEFAULT_MAX_ENTRIES, InMemoryCacheStore},
    };

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap(),
        ))
    }

    fn service(tier: &str, owner: Uuid) -> ServiceEntity {
        let now = Utc::now();
        ServiceEntity {
            id: Uuid::new_v4(),
            owner_user_id: owner,
            name: "Listing".to_string(),
            category: "legal".to_string(),
            city: Some("Leeds".to_string()),
            description: None,
            phone: None,
            website: None,
            reports_count: 0,
            moderation_status: "active".to_string(),
            subscription_tier: tier.to_string(),
            status: "trial".to_string(),
            trial_start: Some(now),
            trial_end: Some(now + Duration::days(30)),
            stripe_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(repo: MockServiceRepository, clock: Arc<FixedClock>) -> DirectoryUseCase<MockServiceRepository> {
        let cache = TtlCache::new(
            Arc::new(InMemoryCacheStore::new(DEFAULT_MAX_ENTRIES, clock.clone())),
            clock.clone(),
        );
        DirectoryUseCase::new(Arc::new(repo), cache, clock, 30, Duration::hours(24))
    }

    #[test]
    fn top_tier_leads_and_seed_is_deterministic() {
        let owner = Uuid::new_v4();
        let listings: Vec<ServiceEntity> = (0..12)
            .map(|i| service(if i % 4 == 0 { "top" } else { "standard" }, owner))
            .collect();

        let first = order_listings(listings.clone(), 7);
        let second = order_listings(listings, 7);

        let ids = |v: &[ServiceEntity]| v.iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert!(first[..3].iter().all(|s| s.subscription_tier == "top"));
        assert!(first[3..].iter().all(|s| s.subscription_tier == "standard"));
    }

    #[tokio::test]
    async fn listing_order_is_stable_for_a_viewer_until_seed_expires() {
        let owner = Uuid::new_v4();
        let listings: Vec<ServiceEntity> = (0..20).map(|_| service("standard", owner)).collect();

        let mut repo = MockServiceRepository::new();
        repo.expect_list_visible()
            .returning(move |_| Ok(listings.clone()));

        let usecase = usecase(repo, clock());
        let viewer = Uuid::new_v4();

        let first = usecase.list(viewer, DirectoryFilter::default()).await.unwrap();
        let second = usecase.list(viewer, DirectoryFilter::default()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn registration_starts_trial_from_clock() {
        let owner = Uuid::new_v4();
        let clock = clock();
        let now = clock.now();

        let mut repo = MockServiceRepository::new();
        repo.expect_is_owner_banned().returning(|_| Ok(false));
        repo.expect_register()
            .withf(move |entity| {
                entity.status == "trial"
                    && entity.trial_start == Some(now)
                    && entity.trial_end == Some(now + Duration::days(30))
            })
            .times(1)
            .returning(move |entity| {
                let mut stored = service("standard", entity.owner_user_id);
                stored.trial_end = entity.trial_end;
                Ok(stored)
            });

        let dto = usecase(repo, clock)
            .register(
                owner,
                RegisterServiceModel {
                    name: Some("Polish Deli".to_string()),
                    category: Some("food".to_string()),
                    city: None,
                    description: None,
                    phone: None,
                    website: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.owner_user_id, owner);
        assert_eq!(dto.trial_end, Some(now + Duration::days(30)));
    }

    #[tokio::test]
    async fn banned_owner_cannot_register() {
        let mut repo = MockServiceRepository::new();
        repo.expect_is_owner_banned().returning(|_| Ok(true));
        repo.expect_register().never();

        let err = usecase(repo, clock())
            .register(
                Uuid::new_v4(),
                RegisterServiceModel {
                    name: Some("Cafe".to_string()),
                    category: Some("food".to_string()),
                    city: None,
                    description: None,
                    phone: None,
                    website: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "OWNER_BANNED");
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let owner = Uuid::new_v4();
        let listing = service("standard", owner);
        let service_id = listing.id;

        let mut repo = MockServiceRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(listing.clone())));
        repo.expect_delete_owned()
            .withf(move |id, by| *id == service_id && *by == owner)
            .times(1)
            .returning(|_, _| Ok(true));

        let usecase = usecase(repo, clock());

        let err = usecase.delete(Uuid::new_v4(), service_id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        usecase.delete(owner, service_id).await.unwrap();
    }

    #[tokio::test]
    async fn suspended_listing_is_hidden_from_other_viewers() {
        let owner = Uuid::new_v4();
        let mut listing = service("standard", owner);
        listing.moderation_status = "suspended".to_string();
        let service_id = listing.id;

        let mut repo = MockServiceRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(listing.clone())));

        let usecase = usecase(repo, clock());

        assert!(usecase.get(owner, service_id).await.is_ok());
        let err = usecase.get(Uuid::new_v4(), service_id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
