use std::{fmt::Display, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crates::{
    domain::{
        repositories::entitlements::EntitlementRepository,
        value_objects::{clock::Clock, entitlements::UserEntitlements},
    },
    payments::revenuecat_client::RevenueCatClient,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingGateway: Send + Sync {
    async fn fetch_entitlements(&self, user_id: Uuid, now: DateTime<Utc>) -> AnyResult<UserEntitlements>;
}

#[async_trait]
impl BillingGateway for RevenueCatClient {
    async fn fetch_entitlements(&self, user_id: Uuid, now: DateTime<Utc>) -> AnyResult<UserEntitlements> {
        let subscriber = self.get_subscriber(&user_id.to_string()).await?;
        Ok(subscriber.to_user_entitlements(now))
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementSource {
    Native,
    Server,
    Default,
}

impl Display for EntitlementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self {
            EntitlementSource::Native => "native",
            EntitlementSource::Server => "server",
            EntitlementSource::Default => "default",
        };
        write!(f, "{}", source)
    }
}

/// One way of answering "what does this user currently hold".
#[async_trait]
pub trait EntitlementResolver: Send + Sync {
    fn source(&self) -> EntitlementSource;

    async fn resolve(&self, user_id: Uuid) -> AnyResult<UserEntitlements>;
}

/// Live lookup against the billing provider.
pub struct NativeBillingResolver<G>
where
    G: BillingGateway + 'static,
{
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G> NativeBillingResolver<G>
where
    G: BillingGateway + 'static,
{
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

#[async_trait]
impl<G> EntitlementResolver for NativeBillingResolver<G>
where
    G: BillingGateway + 'static,
{
    fn source(&self) -> EntitlementSource {
        EntitlementSource::Native
    }

    async fn resolve(&self, user_id: Uuid) -> AnyResult<UserEntitlements> {
        self.gateway.fetch_entitlements(user_id, self.clock.now()).await
    }
}

/// Reads the entitlement store kept current by the webhook. A user with no
/// row holds nothing.
pub struct ServerEntitlementResolver<E>
where
    E: EntitlementRepository + Send + Sync + 'static,
{
    entitlement_repo: Arc<E>,
}

impl<E> ServerEntitlementResolver<E>
where
    E: EntitlementRepository + Send + Sync + 'static,
{
    pub fn new(entitlement_repo: Arc<E>) -> Self {
        Self { entitlement_repo }
    }
}

#[async_trait]
impl<E> EntitlementResolver for ServerEntitlementResolver<E>
where
    E: EntitlementRepository + Send + Sync + 'static,
{
    fn source(&self) -> EntitlementSource {
        EntitlementSource::Server
    }

    async fn resolve(&self, user_id: Uuid) -> AnyResult<UserEntitlements> {
        Ok(self
            .entitlement_repo
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(UserEntitlements::inactive))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub native_billing: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntitlementsDto {
    pub entitlements: UserEntitlements,
    pub source: EntitlementSource,
}

/// Picks the resolver chain once at construction: native first when the
/// platform has it, then the server store, then all-inactive.
pub struct EntitlementResolverUseCase {
    chain: Vec<Arc<dyn EntitlementResolver>>,
}

impl EntitlementResolverUseCase {
    pub fn new(
        capabilities: PlatformCapabilities,
        native: Option<Arc<dyn EntitlementResolver>>,
        server: Arc<dyn EntitlementResolver>,
    ) -> Self {
        let mut chain = Vec::with_capacity(2);
        if capabilities.native_billing {
            match native {
                Some(native) => chain.push(native),
                None => warn!("entitlements: native billing advertised without a resolver"),
            }
        }
        chain.push(server);

        Self { chain }
    }

    /// Never fails: every resolver error falls through to the next strategy.
    pub async fn resolve(&self, user_id: Uuid) -> ResolvedEntitlementsDto {
        for resolver in &self.chain {
            let source = resolver.source();
            match resolver.resolve(user_id).await {
                Ok(entitlements) => {
                    debug!(%user_id, %source, "entitlements: resolved");
                    return ResolvedEntitlementsDto {
                        entitlements,
                        source,
                    };
                }
                Err(err) => {
                    warn!(%user_id, %source, error = ?err, "entitlements: resolver failed, falling back");
                }
            }
        }

        ResolvedEntitlementsDto {
            entitlements: UserEntitlements::inactive(),
            source: EntitlementSource::Default,
        }
    }
}
