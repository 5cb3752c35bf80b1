use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::owner_bans::InsertOwnerBanEntity,
    repositories::{moderation::ModerationRepository, roles::RoleRepository},
    value_objects::{
        enums::{app_roles::AppRole, moderation_statuses::ModerationStatus},
        moderation::{
            BanOutcome, FLAG_FOR_REVIEW_THRESHOLD, ModerationQueueItemDto, ModeratorActionDto,
            ModeratorActionModel, ModeratorCommand, classify_for_queue,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Moderator or admin role required")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("Service not found")]
    ServiceNotFound,
    #[error("Owner is already banned")]
    AlreadyBanned,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for ModerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ModerationError::Forbidden => StatusCode::FORBIDDEN,
            ModerationError::Validation(_) => StatusCode::BAD_REQUEST,
            ModerationError::ServiceNotFound => StatusCode::NOT_FOUND,
            ModerationError::AlreadyBanned => StatusCode::CONFLICT,
            ModerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ModerationError::Forbidden => "FORBIDDEN",
            ModerationError::Validation(_) => "VALIDATION_ERROR",
            ModerationError::ServiceNotFound => "SERVICE_NOT_FOUND",
            ModerationError::AlreadyBanned => "ALREADY_BANNED",
            ModerationError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ModerationError>;

pub struct ModerationUseCase<M, R>
where
    M: ModerationRepository + Send + Sync + 'static,
    R: RoleRepository + Send + Sync + 'static,
{
    moderation_repo: Arc<M>,
    role_repo: Arc<R>,
}

impl<M, R> ModerationUseCase<M, R>
where
    M: ModerationRepository + Send + Sync + 'static,
    R: RoleRepository + Send + Sync + 'static,
{
    pub fn new(moderation_repo: Arc<M>, role_repo: Arc<R>) -> Self {
        Self {
            moderation_repo,
            role_repo,
        }
    }

    async fn ensure_moderator(&self, user_id: Uuid) -> UseCaseResult<()> {
        for role in AppRole::MODERATION {
            let granted = self
                .role_repo
                .has_role(user_id, role)
                .await
                .map_err(|err| {
                    error!(%user_id, %role, db_error = ?err, "moderation: role lookup failed");
                    ModerationError::Internal(err)
                })?;
            if granted {
                return Ok(());
            }
        }

        warn!(%user_id, "moderation: caller lacks moderator role");
        Err(ModerationError::Forbidden)
    }

    pub async fn execute(
        &self,
        caller_id: Uuid,
        model: ModeratorActionModel,
    ) -> UseCaseResult<ModeratorActionDto> {
        self.ensure_moderator(caller_id).await?;

        let command = ModeratorCommand::try_from(model).map_err(ModerationError::Validation)?;
        let action = command.name();
        info!(%caller_id, action, "moderation: executing action");

        let message = match command {
            ModeratorCommand::Approve { service_id } => {
                let found = self
                    .moderation_repo
                    .approve_service(service_id)
                    .await
                    .map_err(|err| self.internal(action, err))?;
                Self::require_found(found, service_id, action)?;
                "Service approved and reports cleared".to_string()
            }
            ModeratorCommand::Suspend { service_id } => {
                let found = self
                    .moderation_repo
                    .suspend_service(service_id)
                    .await
                    .map_err(|err| self.internal(action, err))?;
                Self::require_found(found, service_id, action)?;
                "Service suspended".to_string()
            }
            ModeratorCommand::Delete { service_id } => {
                let found = self
                    .moderation_repo
                    .delete_service(service_id)
                    .await
                    .map_err(|err| self.internal(action, err))?;
                Self::require_found(found, service_id, action)?;
                "Service deleted".to_string()
            }
            ModeratorCommand::BanOwner { owner_id, reason } => {
                let outcome = self
                    .moderation_repo
                    .ban_owner(InsertOwnerBanEntity {
                        user_id: owner_id,
                        banned_by: caller_id,
                        reason,
                    })
                    .await
                    .map_err(|err| self.internal(action, err))?;

                match outcome {
                    BanOutcome::Banned { suspended_services } => {
                        info!(
                            %owner_id,
                            suspended_services,
                            "moderation: owner banned and listings suspended"
                        );
                        format!("Owner banned; {} service(s) suspended", suspended_services)
                    }
                    BanOutcome::AlreadyBanned => {
                        warn!(%owner_id, "moderation: owner already banned");
                        return Err(ModerationError::AlreadyBanned);
                    }
                }
            }
        };

        info!(%caller_id, action, "moderation: action completed");
        Ok(ModeratorActionDto {
            success: true,
            message,
        })
    }

    /// Listings at or over the review threshold with their derived queue state.
    pub async fn review_queue(&self, caller_id: Uuid) -> UseCaseResult<Vec<ModerationQueueItemDto>> {
        self.ensure_moderator(caller_id).await?;

        let services = self
            .moderation_repo
            .list_review_queue(FLAG_FOR_REVIEW_THRESHOLD)
            .await
            .map_err(|err| self.internal("review_queue", err))?;

        let queue = services
            .into_iter()
            .filter_map(|service| {
                let moderation_status = ModerationStatus::from_str(&service.moderation_status);
                classify_for_queue(service.reports_count, moderation_status).map(
                    |classification| ModerationQueueItemDto {
                        service_id: service.id,
                        owner_user_id: service.owner_user_id,
                        name: service.name,
                        reports_count: service.reports_count,
                        moderation_status,
                        classification,
                    },
                )
            })
            .collect::<Vec<_>>();

        info!(%caller_id, queue_len = queue.len(), "moderation: review queue loaded");
        Ok(queue)
    }

    fn require_found(found: bool, service_id: Uuid, action: &str) -> UseCaseResult<()> {
        if found {
            Ok(())
        } else {
            warn!(%service_id, action, "moderation: service not found");
            Err(ModerationError::ServiceNotFound)
        }
    }

    fn internal(&self, action: &str, err: anyhow::Error) -> ModerationError {
        error!(action, db_error = ?err, "moderation: action failed");
        ModerationError::Internal(err)
    }
}
