//! Fan-in of independent record streams
//!
//! Each source runs as its own task inside a [`JoinSet`] and feeds a bounded
//! channel, so a slow consumer applies backpressure to every branch.
//! Per-source order is preserved; order across sources is not. The first
//! error from any branch is forwarded immediately, after which the
//! remaining branches are aborted. The merged stream ends once every
//! branch has ended.

use crate::{RecordStream, boxed};
use async_stream::try_stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use wristkit_core::{BuildError, BuildResult, FileRecord};

/// Channel capacity used by [`merge`]
pub const DEFAULT_MERGE_CAPACITY: usize = 16;

/// Merge `sources` into one stream
pub fn merge(sources: Vec<RecordStream>) -> RecordStream {
    merge_with_capacity(sources, DEFAULT_MERGE_CAPACITY)
}

/// Merge `sources` with an explicit channel capacity
pub fn merge_with_capacity(sources: Vec<RecordStream>, capacity: usize) -> RecordStream {
    boxed(try_stream! {
        let (tx, mut rx) = mpsc::channel::<BuildResult<FileRecord>>(capacity.max(1));
        let mut branches = JoinSet::new();

        for (branch, mut source) in sources.into_iter().enumerate() {
            let tx = tx.clone();
            branches.spawn(async move {
                while let Some(item) = source.next().await {
                    let failed = item.is_err();
                    // A closed channel means the consumer went away
                    if tx.send(item).await.is_err() || failed {
                        break;
                    }
                }
                tracing::trace!(branch, "merge branch ended");
            });
        }
        drop(tx);

        while let Some(item) = rx.recv().await {
            yield item?;
        }

        while let Some(joined) = branches.join_next().await {
            if let Err(err) = joined {
                if err.is_panic() {
                    Err::<(), _>(BuildError::internal(format!("merge branch panicked: {err}")))?;
                }
            }
        }
    })
}
