//! Cluster-mode dispatch.
//!
//! Each qualifying overlap region becomes one JSON job message; after the
//! queue is loaded, a single batch job sized to the message count is
//! submitted. Job execution, retries, and exit status belong to the
//! external dispatcher, not to this crate.

use super::store::{OverlapStore, StoreError};
use crate::distribute::PlacementPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to enqueue job message: {0}")]
    Enqueue(String),
    #[error("failed to submit batch job: {0}")]
    Submit(String),
    #[error("failed to encode job message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One unit of cluster work.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapJob {
    pub overlap_region_id: u64,
    #[serde(rename = "placementParameters")]
    pub placement: PlacementPolicy,
}

/// External queue plus batch submitter.
pub trait JobDispatcher: Send + Sync {
    fn enqueue(&self, message: &str) -> Result<(), DispatchError>;

    /// Submit a batch job sized to the queued message count. Called once
    /// per dispatch, after all messages are enqueued.
    fn submit(&self, job_count: usize) -> Result<(), DispatchError>;
}

/// Queue one job per region larger than `size_threshold` and submit the
/// batch. Returns the number of jobs enqueued; nothing is submitted when
/// no region qualifies.
pub fn dispatch_overlap_jobs(
    store: &dyn OverlapStore,
    dispatcher: &dyn JobDispatcher,
    size_threshold: f64,
    placement: PlacementPolicy,
) -> Result<usize, DispatchError> {
    let regions = store.query_overlaps(size_threshold)?;
    let mut count = 0usize;
    for region in &regions {
        let job = OverlapJob {
            overlap_region_id: region.id,
            placement,
        };
        dispatcher.enqueue(&serde_json::to_string(&job)?)?;
        count += 1;
    }
    if count > 0 {
        dispatcher.submit(count)?;
    }
    Ok(count)
}
