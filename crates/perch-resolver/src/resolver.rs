//! Tiered user resolution.
//!
//! [`UserResolver`] owns the two durable tiers and the middleware pipeline.
//! The platform adapter is borrowed per call, so one resolver serves any
//! number of platforms.

use std::fmt;
use std::sync::Arc;

use dashmap::DashSet;
use perch_core::{DynPlatform, Platform, PlatformUser, fast_cache_key};
use perch_storage::{DynFastCache, DynUserStore, FastCache, UserStore};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::middleware::{DynMiddleware, Middleware};


/// Tier a resolved user was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    LiveState,
    FastCache,
    Persistent,
    Remote,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiveState => "live_state",
            Self::FastCache => "fast_cache",
            Self::Persistent => "persistent",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolved {
    pub user: PlatformUser,
    pub source: ResolutionSource,
    /// Middleware or cache-write failure after the user was obtained.
    ///
    /// The user is still valid; it just was not written back.
    pub persist_error: Option<ResolveError>,
}

/// Builder for [`UserResolver`].
pub struct UserResolverBuilder {
    store: DynUserStore,
    fast_cache: DynFastCache,
    middlewares: Vec<DynMiddleware>,
    config: ResolverConfig,
}

impl UserResolverBuilder {
    pub fn new(store: DynUserStore, fast_cache: DynFastCache) -> Self {
        Self {
            store,
            fast_cache,
            middlewares: Vec::new(),
            config: ResolverConfig::default(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a middleware to the persist pipeline.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn middleware_arc(mut self, middleware: DynMiddleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn build(self) -> UserResolver {
        UserResolver {
            inner: Arc::new(Inner {
                store: self.store,
                fast_cache: self.fast_cache,
                middlewares: self.middlewares,
                config: self.config,
                refreshing: DashSet::new(),
            }),
        }
    }
}

struct Inner {
    store: DynUserStore,
    fast_cache: DynFastCache,
    middlewares: Vec<DynMiddleware>,
    config: ResolverConfig,
    /// Fast-cache keys with a background refresh in flight
    refreshing: DashSet<String>,
}

/// Read-through resolver over live state, fast cache, persistent store and
/// remote fetch.
///
/// Cheap to clone; clones share stores, middleware and the refresh guard.
#[derive(Clone)]
pub struct UserResolver {
    inner: Arc<Inner>,
}

impl fmt::Debug for UserResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserResolver")
            .field("store", &self.inner.store.backend_name())
            .field("fast_cache", &self.inner.fast_cache.backend_name())
            .field("middlewares", &self.inner.middlewares.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl UserResolver {
    pub fn builder(store: DynUserStore, fast_cache: DynFastCache) -> UserResolverBuilder {
        UserResolverBuilder::new(store, fast_cache)
    }

    pub fn new(store: DynUserStore, fast_cache: DynFastCache, config: ResolverConfig) -> Self {
        Self::builder(store, fast_cache).config(config).build()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.inner.config
    }

    pub(crate) fn store(&self) -> &DynUserStore {
        &self.inner.store
    }

    pub(crate) fn fast_cache(&self) -> &DynFastCache {
        &self.inner.fast_cache
    }

    /// Number of background refreshes currently tracked by the guard.
    pub fn refreshes_in_flight(&self) -> usize {
        self.inner.refreshing.len()
    }

    /// Resolves a user, returning only the user.
    ///
    /// See [`UserResolver::resolve`].
    pub async fn get_user(&self, raw_id: &str, platform: &DynPlatform) -> ResolveResult<PlatformUser> {
        let resolved = self.resolve(raw_id, platform).await?;
        if let Some(err) = &resolved.persist_error {
            debug!(error = %err, "returning user that was not written back");
        }
        Ok(resolved.user)
    }

    /// Resolves a user through the tiers in priority order.
    ///
    /// 1. live-state probe (hit is persisted through middleware)
    /// 2. fast cache
    /// 3. persistent store (hit is persisted through middleware; a stale
    ///    row also starts a background refresh)
    /// 4. remote fetch (persisted through middleware)
    ///
    /// An invalid identity is rejected before any tier is touched.
    #[instrument(skip(self, platform), fields(platform = %platform.name()))]
    pub async fn resolve(&self, raw_id: &str, platform: &DynPlatform) -> ResolveResult<Resolved> {
        let name = platform.name();
        let id = platform
            .validate_identity(raw_id)
            .map_err(|source| ResolveError::InvalidIdentity {
                platform: name.to_string(),
                source,
            })?;

        self.ensure_initialized(platform.as_ref()).await?;

        let live = platform
            .live_state_probe(&id)
            .await
            .map_err(|source| ResolveError::LiveStateProbeFailed {
                platform: name.to_string(),
                source,
            })?;
        if let Some(mut user) = live {
            debug!(id = %id, "live state hit");
            normalize(&mut user, &id);
            let (user, persist_error) = self.inner.persist_through(platform.as_ref(), &id, user).await;
            return Ok(Resolved {
                user,
                source: ResolutionSource::LiveState,
                persist_error,
            });
        }

        let key = fast_cache_key(name, &id);
        if let Some(user) = self.inner.read_fast_cache(&key, &id).await {
            debug!(id = %id, "fast cache hit");
            return Ok(Resolved {
                user,
                source: ResolutionSource::FastCache,
                persist_error: None,
            });
        }

        match self.inner.store.find(name, &id).await {
            Ok(Some(record)) => {
                let stale = record.is_stale(self.inner.config.user_expiry(), OffsetDateTime::now_utc());
                debug!(id = %id, stale, "persistent store hit");

                let mut user = record.into_user();
                normalize(&mut user, &id);
                let (user, persist_error) = self.inner.persist_through(platform.as_ref(), &id, user).await;

                if stale {
                    self.spawn_refresh(Arc::clone(platform), id);
                }
                return Ok(Resolved {
                    user,
                    source: ResolutionSource::Persistent,
                    persist_error,
                });
            }
            Ok(None) => debug!(id = %id, "persistent store miss"),
            Err(e) => warn!(
                id = %id,
                backend = self.inner.store.backend_name(),
                error = %e,
                category = %e.category(),
                "persistent store read failed, treating as miss"
            ),
        }

        let mut user = platform
            .remote_fetch(&id)
            .await
            .map_err(|source| ResolveError::RemoteFetchFailed {
                platform: name.to_string(),
                source,
            })?;
        debug!(id = %id, "fetched from remote");
        normalize(&mut user, &id);
        let (user, persist_error) = self.inner.persist_through(platform.as_ref(), &id, user).await;
        Ok(Resolved {
            user,
            source: ResolutionSource::Remote,
            persist_error,
        })
    }

    /// Creates the platform's table and initializes the adapter if it
    /// reports uninitialized.
    pub async fn ensure_initialized(&self, platform: &dyn Platform) -> ResolveResult<()> {
        if platform.is_initialized() {
            return Ok(());
        }

        let name = platform.name();
        info!(platform = %name, "initializing platform");

        self.inner
            .store
            .ensure_table(name)
            .await
            .map_err(|e| ResolveError::AdapterInitFailed {
                platform: name.to_string(),
                message: e.to_string(),
            })?;

        platform
            .initialize()
            .await
            .map_err(|e| ResolveError::AdapterInitFailed {
                platform: name.to_string(),
                message: e.to_string(),
            })?;

        if !platform.is_initialized() {
            return Err(ResolveError::AdapterNotInitialized {
                platform: name.to_string(),
            });
        }
        Ok(())
    }

    /// Starts a detached refresh of a stale persistent row.
    ///
    /// The task outlives the caller's request. With `dedupe_refreshes` set,
    /// a refresh already in flight for the same key swallows this one.
    fn spawn_refresh(&self, platform: DynPlatform, id: String) {
        let inner = Arc::clone(&self.inner);

        let guard = if inner.config.dedupe_refreshes {
            let key = fast_cache_key(platform.name(), &id);
            if !inner.refreshing.insert(key.clone()) {
                debug!(key = %key, "refresh already in flight");
                return;
            }
            Some(RefreshGuard {
                inner: Arc::clone(&inner),
                key,
            })
        } else {
            None
        };

        tokio::spawn(async move {
            let _guard = guard;
            inner.refresh(platform.as_ref(), &id).await;
        });
    }
}

impl Inner {
    async fn refresh(&self, platform: &dyn Platform, id: &str) {
        info!(platform = %platform.name(), id = %id, "refreshing stale user");

        let mut user = match platform.remote_fetch(id).await {
            Ok(user) => user,
            Err(e) => {
                error!(platform = %platform.name(), id = %id, error = %e, "background refresh failed");
                return;
            }
        };
        normalize(&mut user, id);

        let (_, persist_error) = self.persist_through(platform, id, user).await;
        match persist_error {
            Some(e) => error!(platform = %platform.name(), id = %id, error = %e, "background refresh not persisted"),
            None => debug!(platform = %platform.name(), id = %id, "background refresh complete"),
        }
    }

    /// Runs the middleware chain, then writes the persistent store and the
    /// fast cache.
    ///
    /// On middleware failure the pre-middleware user comes back with the
    /// error and neither tier is written. On upsert failure the transformed
    /// user comes back with the error and the fast cache is not written.
    async fn persist_through(
        &self,
        platform: &dyn Platform,
        id: &str,
        user: PlatformUser,
    ) -> (PlatformUser, Option<ResolveError>) {
        let original = user.clone();
        let mut current = user;

        for (index, middleware) in self.middlewares.iter().enumerate() {
            current = match middleware.apply(platform, current).await {
                Ok(next) => next,
                Err(source) => {
                    warn!(
                        platform = %platform.name(),
                        id = %id,
                        index,
                        error = %source,
                        "middleware failed, skipping cache writes"
                    );
                    return (original, Some(ResolveError::MiddlewareFailed { index, source }));
                }
            };
        }
        normalize(&mut current, id);

        if let Err(e) = self.store.upsert(platform.name(), &current).await {
            warn!(
                platform = %platform.name(),
                id = %id,
                backend = self.store.backend_name(),
                error = %e,
                category = %e.category(),
                "persistent upsert failed, skipping fast cache write"
            );
            return (current, Some(ResolveError::PersistentStoreUnavailable(e)));
        }

        let key = fast_cache_key(platform.name(), id);
        self.write_fast_cache(&key, &current).await;
        (current, None)
    }

    async fn read_fast_cache(&self, key: &str, id: &str) -> Option<PlatformUser> {
        let bytes = match self.fast_cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %key, "fast cache miss");
                return None;
            }
            Err(e) => {
                warn!(
                    key = %key,
                    backend = self.fast_cache.backend_name(),
                    error = %e,
                    category = %e.category(),
                    "fast cache read failed, treating as miss"
                );
                return None;
            }
        };

        match serde_json::from_slice::<PlatformUser>(&bytes) {
            Ok(mut user) => {
                normalize(&mut user, id);
                Some(user)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "undecodable fast cache entry, treating as miss");
                None
            }
        }
    }

    /// Best-effort fast cache write; failures are logged.
    async fn write_fast_cache(&self, key: &str, user: &PlatformUser) {
        let bytes = match serde_json::to_vec(user) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to serialize user for fast cache");
                return;
            }
        };

        if let Err(e) = self
            .fast_cache
            .set(key, bytes, self.config.user_expiry())
            .await
        {
            warn!(
                key = %key,
                backend = self.fast_cache.backend_name(),
                error = %e,
                category = %e.category(),
                "fast cache write failed"
            );
        }
    }
}

/// Releases a refresh slot when the background task ends, even on panic.
struct RefreshGuard {
    inner: Arc<Inner>,
    key: String,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.inner.refreshing.remove(&self.key);
    }
}

/// Pins the validated identity and defaults the display name.
fn normalize(user: &mut PlatformUser, id: &str) {
    if user.id != id {
        if !user.id.is_empty() {
            debug!(returned = %user.id, validated = %id, "overwriting identity returned by platform");
        }
        user.id = id.to_string();
    }
    user.ensure_display_name();
}
