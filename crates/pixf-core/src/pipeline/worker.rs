//! Fixed-size worker pool that encodes and writes unique images.
//!
//! All tasks are queued up front into a channel sized to the batch, so
//! enqueueing never waits. Workers pull tasks until the queue is empty or the
//! batch's cancellation token fires. The token is checked before a task is
//! started, never during one: a failure stops new work but lets in-flight
//! encodes finish and write their files.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{EncodeTask, OutputFile};

use super::buffer::BufferPool;
use super::encode::FormatEncoder;
use super::writer::OutputWriter;

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Dispatching,
    Draining,
    Completed,
    Failed,
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Terminal state of the run
    pub state: BatchState,
    /// Files written, ordered by index
    pub written: Vec<OutputFile>,
    /// Failures in the order they were reported
    pub errors: Vec<PipelineError>,
}

impl BatchOutcome {
    /// The first failure reported by any worker.
    pub fn first_error(&self) -> Option<&PipelineError> {
        self.errors.first()
    }

    /// Collapse into the batch's public result: the first error, if any.
    pub fn into_result(self) -> PipelineResult<Vec<OutputFile>> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.written),
        }
    }
}

/// Concurrent encode-and-write pool.
pub struct WorkerPool {
    workers: usize,
    encoder: Arc<dyn FormatEncoder>,
    buffers: Arc<BufferPool>,
    writer: OutputWriter,
}

impl WorkerPool {
    /// Create a pool of `workers` workers (at least one).
    pub fn new(
        workers: usize,
        encoder: Arc<dyn FormatEncoder>,
        buffers: Arc<BufferPool>,
        writer: OutputWriter,
    ) -> Self {
        Self {
            workers: workers.max(1),
            encoder,
            buffers,
            writer,
        }
    }

    /// Run every task to completion or until the first failure stops the batch.
    pub async fn run(&self, tasks: Vec<EncodeTask>) -> BatchOutcome {
        let start = Instant::now();
        let total = tasks.len();
        let mut state = BatchState::Idle;
        let token = CancellationToken::new();

        let capacity = total.max(1);
        let (task_tx, task_rx) = mpsc::channel::<EncodeTask>(capacity);
        let (result_tx, mut result_rx) = mpsc::channel::<PipelineResult<OutputFile>>(capacity);
        let queue = Arc::new(Mutex::new(task_rx));

        advance(&mut state, BatchState::Dispatching);
        let mut handles = JoinSet::new();
        for id in 0..self.workers {
            let worker = Worker {
                id,
                queue: queue.clone(),
                results: result_tx.clone(),
                token: token.clone(),
                encoder: self.encoder.clone(),
                buffers: self.buffers.clone(),
                writer: self.writer.clone(),
            };
            handles.spawn(worker.run());
        }
        drop(result_tx);
        drop(queue);

        for task in tasks {
            if task_tx.send(task).await.is_err() {
                // Every worker is gone; whatever they reported explains why
                break;
            }
        }
        drop(task_tx);
        advance(&mut state, BatchState::Draining);

        let mut written = Vec::with_capacity(total);
        let mut errors = Vec::new();
        while let Some(result) = result_rx.recv().await {
            match result {
                Ok(file) => written.push(file),
                Err(e) => errors.push(e),
            }
        }

        while let Some(joined) = handles.join_next().await {
            if let Err(e) = joined {
                token.cancel();
                errors.push(PipelineError::WorkerPanicked(e.to_string()));
            }
        }

        written.sort_by_key(|f| f.index);
        let terminal = if token.is_cancelled() {
            BatchState::Failed
        } else {
            BatchState::Completed
        };
        advance(&mut state, terminal);

        tracing::debug!(
            "Batch {:?}: {}/{} written, {} error(s) in {:?}",
            state,
            written.len(),
            total,
            errors.len(),
            start.elapsed()
        );

        BatchOutcome {
            state,
            written,
            errors,
        }
    }
}

fn advance(state: &mut BatchState, next: BatchState) {
    tracing::trace!("Batch state {:?} -> {:?}", state, next);
    *state = next;
}

/// One worker's share of the pool.
struct Worker {
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<EncodeTask>>>,
    results: mpsc::Sender<PipelineResult<OutputFile>>,
    token: CancellationToken,
    encoder: Arc<dyn FormatEncoder>,
    buffers: Arc<BufferPool>,
    writer: OutputWriter,
}

impl Worker {
    async fn run(self) {
        loop {
            let next = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };
            let Some(task) = next else {
                break;
            };
            if self.token.is_cancelled() {
                tracing::debug!("Worker {} stopping: batch already failed", self.id);
                break;
            }

            let result = self.process(task).await;
            if result.is_err() {
                self.token.cancel();
            }
            if self.results.send(result).await.is_err() {
                break;
            }
        }
    }

    async fn process(&self, task: EncodeTask) -> PipelineResult<OutputFile> {
        let index = task.index;
        let encoder = self.encoder.clone();
        let buffers = self.buffers.clone();
        let writer = self.writer.clone();

        tokio::task::spawn_blocking(move || {
            encode_and_write(encoder.as_ref(), &buffers, &writer, task)
        })
        .await
        .map_err(|e| PipelineError::WorkerPanicked(format!("image {}: {}", index, e)))?
    }
}

/// Encode one task into a pooled buffer and persist it.
pub fn encode_and_write(
    encoder: &dyn FormatEncoder,
    buffers: &BufferPool,
    writer: &OutputWriter,
    task: EncodeTask,
) -> PipelineResult<OutputFile> {
    let start = Instant::now();
    let mut buf = buffers.acquire();

    encoder
        .encode(&task.image.pixels, &mut buf)
        .map_err(|e| PipelineError::Encode {
            index: task.index,
            format: encoder.name().to_string(),
            message: e.to_string(),
        })?;
    let file = writer.write(task.index, encoder.extension(), &buf)?;

    tracing::trace!(
        "Encoded {:?} as {} ({}x{}) in {:?}",
        task.image.source,
        file.path.display(),
        task.image.width(),
        task.image.height(),
        start.elapsed()
    );
    Ok(file)
}
