//! Removal of a user from the durable tiers.

use perch_core::{CacheTier, DynPlatform, fast_cache_key};
use perch_storage::{FastCache, UserStore};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::UserResolver;

/// Tiers that actually held the user and were cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    pub cleared_from: Vec<CacheTier>,
}

impl ClearOutcome {
    pub fn is_empty(&self) -> bool {
        self.cleared_from.is_empty()
    }

    pub fn contains(&self, tier: CacheTier) -> bool {
        self.cleared_from.contains(&tier)
    }
}

impl UserResolver {
    /// Removes a user from the requested tiers; an empty slice means all.
    ///
    /// Tiers are processed persistent first, then fast cache. Only tiers
    /// that held the user appear in the outcome. Live state is never
    /// touched.
    #[instrument(skip(self, platform), fields(platform = %platform.name()))]
    pub async fn clear_user(
        &self,
        raw_id: &str,
        platform: &DynPlatform,
        tiers: &[CacheTier],
    ) -> ResolveResult<ClearOutcome> {
        let name = platform.name();
        let id = platform
            .validate_identity(raw_id)
            .map_err(|source| ResolveError::InvalidIdentity {
                platform: name.to_string(),
                source,
            })?;

        self.ensure_initialized(platform.as_ref()).await?;

        let mut outcome = ClearOutcome::default();
        for tier in CacheTier::ALL {
            if !tiers.is_empty() && !tiers.contains(&tier) {
                continue;
            }

            let removed = match tier {
                CacheTier::Persistent => self.clear_persistent(name, &id).await?,
                CacheTier::FastCache => self
                    .fast_cache()
                    .delete(&fast_cache_key(name, &id))
                    .await
                    .map_err(ResolveError::FastCacheUnavailable)?,
            };

            debug!(id = %id, tier = %tier, removed, "cleared tier");
            if removed {
                outcome.cleared_from.push(tier);
            }
        }

        info!(id = %id, cleared_from = ?outcome.cleared_from, "cleared user");
        Ok(outcome)
    }

    async fn clear_persistent(&self, platform: &str, id: &str) -> ResolveResult<bool> {
        let store = self.store();
        if !store
            .exists(platform, id)
            .await
            .map_err(ResolveError::PersistentStoreUnavailable)?
        {
            return Ok(false);
        }

        store
            .delete(platform, id)
            .await
            .map_err(ResolveError::PersistentStoreUnavailable)
    }
}
