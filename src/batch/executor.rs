//! Batch executor: dispatches planned chunks sequentially or with bounded parallelism.

use super::planner::Chunk;
use crate::types::{percent_complete, Payload, ProgressCallback, ProgressEvent};
use crate::{Error, ErrorContext, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One chunk at a time in index order. Supports progress callbacks.
    Sequential,
    /// Up to `max_parallel` chunks in flight. Completion order is unspecified.
    Concurrent { max_parallel: usize },
}
impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Concurrent { max_parallel: 5 }
    }
}
impl ExecutionMode {
    pub fn is_sequential(&self) -> bool {
        matches!(self, ExecutionMode::Sequential)
    }
}

enum Admission<R> {
    Finished(Result<R>),
    Cancelled,
}

/// Runs a chunk sender over a list of chunks.
///
/// Any chunk failure fails the whole run: chunks not yet started are cancelled,
/// in-flight chunks are allowed to finish, and the first observed failure is returned.
/// Successful results always come back in chunk order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor {
    mode: ExecutionMode,
}

impl BatchExecutor {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub async fn run<'c, F, Fut>(
        &self,
        chunks: &'c [Chunk],
        sender: F,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<Payload>>
    where
        F: Fn(&'c Chunk) -> Fut,
        Fut: Future<Output = Result<Payload>>,
    {
        let start = Instant::now();
        let results = match self.mode {
            ExecutionMode::Sequential => Self::run_sequential(chunks, sender, progress).await,
            ExecutionMode::Concurrent { max_parallel } => {
                if progress.is_some() {
                    return Err(Error::validation_with_context(
                        "progress callbacks are only supported in sequential mode",
                        ErrorContext::new()
                            .with_field_path("progress_callback")
                            .with_source("batch_executor"),
                    ));
                }
                Self::run_concurrent(chunks, sender, max_parallel.max(1)).await
            }
        };
        debug!(
            chunks = chunks.len(),
            sequential = self.mode.is_sequential(),
            ok = results.is_ok(),
            duration_ms = start.elapsed().as_millis() as u64,
            "batch finished"
        );
        results
    }

    async fn run_sequential<'c, F, Fut>(
        chunks: &'c [Chunk],
        sender: F,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<Payload>>
    where
        F: Fn(&'c Chunk) -> Fut,
        Fut: Future<Output = Result<Payload>>,
    {
        let total = chunks.len();
        let mut results = Vec::with_capacity(total);
        for (pos, chunk) in chunks.iter().enumerate() {
            let processed = sender(chunk)
                .await
                .map_err(|e| chunk_failure(e, pos, total))?;
            if let Some(cb) = progress.as_mut() {
                cb.report(&ProgressEvent {
                    percent: percent_complete(pos + 1, total),
                    completed: pos + 1,
                    total,
                    source: &chunk.items,
                    processed: &processed,
                });
            }
            results.push(processed);
        }
        Ok(results)
    }

    async fn run_concurrent<'c, F, Fut>(
        chunks: &'c [Chunk],
        sender: F,
        max_parallel: usize,
    ) -> Result<Vec<Payload>>
    where
        F: Fn(&'c Chunk) -> Fut,
        Fut: Future<Output = Result<Payload>>,
    {
        let total = chunks.len();
        run_bounded(chunks, max_parallel, sender)
            .await
            .map_err(|(pos, e)| chunk_failure(e, pos, total))
    }
}

/// Run `f` over `items` with at most `max_parallel` calls in flight.
///
/// On the first failure the admission gate is closed: items still waiting are
/// never started, items already running are awaited. Returns results in input
/// order, or the position and error of the first observed failure.
pub(crate) async fn run_bounded<'c, T, R, F, Fut>(
    items: &'c [T],
    max_parallel: usize,
    f: F,
) -> std::result::Result<Vec<R>, (usize, Error)>
where
    F: Fn(&'c T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let total = items.len();
    let gate = Semaphore::new(max_parallel.max(1));
    let f = &f;
    let gate_ref = &gate;

    let mut pending: FuturesUnordered<_> = items
        .iter()
        .enumerate()
        .map(|(pos, item)| async move {
            let permit = match gate_ref.acquire().await {
                Ok(p) => p,
                // Gate closed by an earlier failure: never started.
                Err(_) => return (pos, Admission::Cancelled),
            };
            // A permit handed over by a finishing task can race the close.
            if gate_ref.is_closed() {
                return (pos, Admission::Cancelled);
            }
            let outcome = f(item).await;
            drop(permit);
            (pos, Admission::Finished(outcome))
        })
        .collect();

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    let mut first_failure: Option<(usize, Error)> = None;
    let mut cancelled = 0usize;

    while let Some((pos, admission)) = pending.next().await {
        match admission {
            Admission::Finished(Ok(value)) => slots[pos] = Some(value),
            Admission::Finished(Err(e)) => {
                if first_failure.is_none() {
                    warn!(position = pos, total, error = %e, "task failed, cancelling pending tasks");
                    gate.close();
                    first_failure = Some((pos, e));
                } else {
                    debug!(position = pos, error = %e, "additional failure after cancellation");
                }
            }
            Admission::Cancelled => cancelled += 1,
        }
    }

    if let Some(failure) = first_failure {
        debug!(cancelled, "pending tasks cancelled");
        return Err(failure);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(pos, slot)| {
            slot.ok_or_else(|| {
                (
                    pos,
                    Error::configuration_with_context(
                        "task result missing",
                        ErrorContext::new()
                            .with_chunk_index(pos)
                            .with_source("batch_executor"),
                    ),
                )
            })
        })
        .collect()
}

/// Attach chunk position; wrap as a partial-batch failure when the call had several chunks.
fn chunk_failure(err: Error, pos: usize, total: usize) -> Error {
    let err = err.annotate(Some(pos), None);
    if total <= 1 {
        return err;
    }
    Error::PartialBatch {
        chunk_index: pos,
        total_chunks: total,
        source: Box::new(err),
        context: ErrorContext::new()
            .with_chunk_index(pos)
            .with_source("batch_executor"),
    }
}
