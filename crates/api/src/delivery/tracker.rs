use std::collections::HashMap;

use kree_core::delivery::{DeliveryStage, DeliveryStep};
use kree_core::error::CoreError;
use kree_core::types::DbId;
use tokio::sync::RwLock;

/// In-process delivery stage per accepted offer.
///
/// Offers without an entry are at [`DeliveryStage::None`]. State does not
/// survive a restart.
#[derive(Default)]
pub struct DeliveryTracker {
    stages: RwLock<HashMap<DbId, DeliveryStage>>,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the flow for a freshly accepted offer.
    pub async fn open(&self, offer_id: DbId) {
        self.stages
            .write()
            .await
            .insert(offer_id, DeliveryStage::EnRoutePending);
    }

    pub async fn stage(&self, offer_id: DbId) -> DeliveryStage {
        self.stages
            .read()
            .await
            .get(&offer_id)
            .copied()
            .unwrap_or(DeliveryStage::None)
    }

    /// Apply `step` under the write lock, clearing the entry once the flow
    /// completes. Concurrent callers see each other's transitions, so only one
    /// of two racing arrivals can succeed.
    pub async fn advance(
        &self,
        offer_id: DbId,
        step: DeliveryStep,
    ) -> Result<Transition, CoreError> {
        let mut stages = self.stages.write().await;
        let from = stages.get(&offer_id).copied().unwrap_or(DeliveryStage::None);
        let to = from.advance(step)?.unwrap_or(DeliveryStage::None);
        put(&mut stages, offer_id, to);
        Ok(Transition { from, to })
    }

    /// Undo `transition` if nothing has moved the offer since.
    pub async fn revert(&self, offer_id: DbId, transition: Transition) {
        let mut stages = self.stages.write().await;
        let current = stages.get(&offer_id).copied().unwrap_or(DeliveryStage::None);
        if current == transition.to {
            put(&mut stages, offer_id, transition.from);
        }
    }

    /// Forget the flow for an offer whose reservation is gone.
    pub async fn clear(&self, offer_id: DbId) {
        self.stages.write().await.remove(&offer_id);
    }

    /// Number of offers with an unfinished flow.
    pub async fn open_flows(&self) -> usize {
        self.stages.read().await.len()
    }
}

/// A stage change applied by [`DeliveryTracker::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DeliveryStage,
    pub to: DeliveryStage,
}

fn put(stages: &mut HashMap<DbId, DeliveryStage>, offer_id: DbId, stage: DeliveryStage) {
    match stage {
        DeliveryStage::None => {
            stages.remove(&offer_id);
        }
        open => {
            stages.insert(offer_id, open);
        }
    }
}
