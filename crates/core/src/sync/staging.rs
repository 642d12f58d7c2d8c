//! Sync staging store: persists a reviewed comparison for a later apply.
//!
//! Storage is best-effort. The staged diff is an optimization - the apply
//! phase can always re-derive it - so quota or serialization failures are
//! logged and swallowed, never propagated.

use std::sync::Arc;

use chrono::Utc;
use tallysync_domain::constants::STAGING_KEY_PREFIX;
use tallysync_domain::{DateWindow, StagedComparison, SyncComparison};
use tracing::{debug, warn};

use super::ports::SessionStore;

/// Session-scoped staging store keyed by `(organization, date window)`.
pub struct SyncStagingStore {
    session: Arc<dyn SessionStore>,
}

impl SyncStagingStore {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }

    fn key(organization_id: &str, window: &DateWindow) -> String {
        format!("{STAGING_KEY_PREFIX}.{organization_id}.{}.{}", window.start, window.end)
    }

    /// Stage a comparison, overwriting any prior entry for the key and
    /// stamping it with the review timestamp. Best-effort: failures no-op.
    pub fn store(
        &self,
        organization_id: &str,
        window: &DateWindow,
        comparison: &SyncComparison,
    ) {
        let staged =
            StagedComparison { comparison: comparison.clone(), reviewed_at: Utc::now() };
        let key = Self::key(organization_id, window);

        let payload = match serde_json::to_string(&staged) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%key, error = %err, "failed to serialize staged comparison; skipping");
                return;
            }
        };

        if let Err(err) = self.session.set_item(&key, &payload) {
            warn!(%key, error = %err, "failed to stage comparison; apply will re-derive");
        } else {
            debug!(%key, "staged comparison for later apply");
        }
    }

    /// The staged comparison for the key, if a readable one exists.
    /// Corrupt payloads are treated as absent and cleared.
    pub fn get(&self, organization_id: &str, window: &DateWindow) -> Option<StagedComparison> {
        let key = Self::key(organization_id, window);
        let payload = match self.session.get_item(&key) {
            Ok(payload) => payload?,
            Err(err) => {
                warn!(%key, error = %err, "failed to read staged comparison");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(staged) => Some(staged),
            Err(err) => {
                warn!(%key, error = %err, "staged comparison is corrupt; clearing");
                self.clear(organization_id, window);
                None
            }
        }
    }

    /// Remove the staged entry for the key.
    pub fn clear(&self, organization_id: &str, window: &DateWindow) {
        let key = Self::key(organization_id, window);
        if let Err(err) = self.session.remove_item(&key) {
            warn!(%key, error = %err, "failed to clear staged comparison");
        }
    }

    /// True iff a staged comparison exists with any pending mutation.
    pub fn has_pending(&self, organization_id: &str, window: &DateWindow) -> bool {
        self.get(organization_id, window)
            .is_some_and(|staged| staged.comparison.has_pending())
    }
}
