//! Context registry: endpoint resolution and per-context connection pools.

use std::collections::HashMap;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::context::{Context, ContextBinding, ContextKey, EndpointResolver, CONTEXTS};
use crate::error::{Result, StoreError};

/// Owns the mapping from context key to its connection pool.
///
/// Endpoints are re-resolved on every access, so a context configured after
/// start-up becomes active without a restart. Pools are created lazily on the
/// first query against a context and then kept for the registry's lifetime,
/// one per context.
pub struct ContextRegistry {
    resolver: Box<dyn EndpointResolver>,
    pools: RwLock<HashMap<ContextKey, PgPool>>,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl ContextRegistry {
    /// Default maximum number of connections per context pool.
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Default time to wait for a free connection before failing a query.
    pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(resolver: impl EndpointResolver + 'static) -> Self {
        Self::with_pool_size(resolver, Self::DEFAULT_MAX_CONNECTIONS)
    }

    /// Create a registry whose pools allow at most `max_connections` each.
    pub fn with_pool_size(resolver: impl EndpointResolver + 'static, max_connections: u32) -> Self {
        Self {
            resolver: Box::new(resolver),
            pools: RwLock::new(HashMap::new()),
            max_connections: max_connections.max(1),
            acquire_timeout: Self::DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Every context with the endpoint it currently resolves to.
    pub fn bindings(&self) -> Vec<ContextBinding> {
        CONTEXTS
            .into_iter()
            .map(|context| ContextBinding {
                context,
                endpoint: self.resolver.resolve(context.config_key),
            })
            .collect()
    }

    /// Pool for `context`, or `None` when it has no endpoint.
    pub async fn pool_for(&self, context: &Context) -> Result<Option<PgPool>> {
        if let Some(pool) = self.pools.read().await.get(&context.key) {
            return Ok(Some(pool.clone()));
        }

        let Some(url) = self.resolver.resolve(context.config_key) else {
            return Ok(None);
        };

        let mut pools = self.pools.write().await;
        if let Some(pool) = pools.get(&context.key) {
            return Ok(Some(pool.clone()));
        }

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_lazy(&url)
            .map_err(|source| StoreError::InvalidEndpoint {
                context: context.key,
                source,
            })?;

        tracing::info!(
            context = %context.key,
            max_connections = self.max_connections,
            "Created transcript pool"
        );

        pools.insert(context.key, pool.clone());
        Ok(Some(pool))
    }

    /// Close every pool created so far.
    pub async fn close(&self) {
        let pools = self.pools.read().await;
        for pool in pools.values() {
            pool.close().await;
        }
    }
}
