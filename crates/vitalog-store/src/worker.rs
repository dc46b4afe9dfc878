//! Background submit worker: the widget's save is a fire-and-await hand-off
//! that never blocks UI logic on SQLite.
//!
//! Architecture:
//! - Bounded channel for backpressure
//! - Retry queue with linear backoff
//! - Atomic metrics for observability
//! - Graceful shutdown (drains retries, joins on drop)

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use vitalog_core::domain::Measurement;
use vitalog_core::submit::SinkError;

use crate::ReadingStore;

const CHANNEL_CAPACITY: usize = 50;
const MAX_RETRIES: u8 = 3;
const RETRY_BACKOFF_MS: u64 = 100;

/// Worker metrics tracked atomically
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    pub persists_success: AtomicU64,
    pub persists_failed: AtomicU64,
    pub retries: AtomicU64,
    pub channel_full_rejects: AtomicU64,
}

impl WorkerMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            persists_success: self.persists_success.load(Ordering::Relaxed),
            persists_failed: self.persists_failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            channel_full_rejects: self.channel_full_rejects.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub persists_success: u64,
    pub persists_failed: u64,
    pub retries: u64,
    pub channel_full_rejects: u64,
}

/// Commands sent to the worker thread
enum WorkerCmd {
    Persist(Measurement),
    FlushSync {
        response_tx: crossbeam_channel::Sender<Result<(), SinkError>>,
    },
    Shutdown,
}

/// Retry queue entry
struct RetryEntry {
    reading: Measurement,
    retry_count: u8,
    last_error: String,
}

/// Handle to the background submit thread. The thread owns the store;
/// dropping the handle shuts it down and joins.
pub struct SubmitWorker {
    tx: Sender<WorkerCmd>,
    metrics: Arc<WorkerMetrics>,
    worker_thread: Option<thread::JoinHandle<()>>,
}

impl SubmitWorker {
    pub fn start(store: ReadingStore) -> Self {
        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let metrics = Arc::new(WorkerMetrics::default());
        let metrics_clone = Arc::clone(&metrics);

        let worker_thread = thread::spawn(move || {
            Self::loop_forever(store, rx, metrics_clone);
        });

        SubmitWorker {
            tx,
            metrics,
            worker_thread: Some(worker_thread),
        }
    }

    /// Hand a finalized reading to the worker without blocking. A full
    /// queue is surfaced as a retryable error, never a silent drop.
    pub fn submit(&self, reading: Measurement) -> Result<(), SinkError> {
        match self.tx.try_send(WorkerCmd::Persist(reading)) {
            Ok(()) => Ok(()),
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                self.metrics
                    .channel_full_rejects
                    .fetch_add(1, Ordering::Relaxed);
                log::warn!("submit queue full, reading rejected for retry");
                Err(SinkError::Unavailable("submit queue full".into()))
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                Err(SinkError::Unavailable("submit worker stopped".into()))
            }
        }
    }

    /// Drain pending retries and checkpoint the WAL, blocking until done.
    pub fn flush(&self) -> Result<(), SinkError> {
        let (response_tx, response_rx) = crossbeam_channel::bounded(1);

        self.tx
            .send(WorkerCmd::FlushSync { response_tx })
            .map_err(|_| SinkError::Unavailable("submit worker stopped".into()))?;

        response_rx
            .recv()
            .map_err(|_| SinkError::Unavailable("flush response channel closed".into()))?
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Shutdown gracefully, draining pending work first.
    pub fn shutdown(mut self) {
        let _ = self.tx.send(WorkerCmd::Shutdown);

        if let Some(handle) = self.worker_thread.take() {
            let _ = handle.join();
        }
    }

    fn loop_forever(store: ReadingStore, rx: Receiver<WorkerCmd>, metrics: Arc<WorkerMetrics>) {
        let mut retry_queue: Vec<RetryEntry> = Vec::new();

        loop {
            // 1. Clear retry backlog first
            if !retry_queue.is_empty() {
                let entry = retry_queue.remove(0);

                match store.insert(&entry.reading) {
                    Ok(_) => {
                        metrics.persists_success.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        if entry.retry_count < MAX_RETRIES {
                            metrics.retries.fetch_add(1, Ordering::Relaxed);
                            let backoff = RETRY_BACKOFF_MS * entry.retry_count as u64;
                            retry_queue.push(RetryEntry {
                                reading: entry.reading,
                                retry_count: entry.retry_count + 1,
                                last_error: format!("{e:?}"),
                            });
                            thread::sleep(Duration::from_millis(backoff));
                        } else {
                            metrics.persists_failed.fetch_add(1, Ordering::Relaxed);
                            log::error!(
                                "reading lost after {MAX_RETRIES} retries ({:?} at {}): {}",
                                entry.reading.kind,
                                entry.reading.recorded_at_us,
                                entry.last_error
                            );
                        }
                    }
                }
            }

            // 2. Channel: block when idle, poll while retries are pending
            let msg = if retry_queue.is_empty() {
                match rx.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                }
            } else {
                match rx.try_recv() {
                    Ok(cmd) => Some(cmd),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => break,
                }
            };

            match msg {
                Some(WorkerCmd::Persist(reading)) => match store.insert(&reading) {
                    Ok(_) => {
                        metrics.persists_success.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        retry_queue.push(RetryEntry {
                            reading,
                            retry_count: 1,
                            last_error: format!("{e:?}"),
                        });
                    }
                },

                Some(WorkerCmd::FlushSync { response_tx }) => {
                    while !retry_queue.is_empty() {
                        let entry = retry_queue.remove(0);
                        match store.insert(&entry.reading) {
                            Ok(_) => {
                                metrics.persists_success.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                metrics.persists_failed.fetch_add(1, Ordering::Relaxed);
                                log::error!(
                                    "reading lost during flush ({:?} at {}): {e:?}",
                                    entry.reading.kind,
                                    entry.reading.recorded_at_us
                                );
                            }
                        }
                    }

                    let result = store
                        .checkpoint_full()
                        .map_err(|e| SinkError::Unavailable(e.to_string()));
                    let _ = response_tx.send(result);
                }

                Some(WorkerCmd::Shutdown) => {
                    while !retry_queue.is_empty() {
                        let entry = retry_queue.remove(0);
                        match store.insert(&entry.reading) {
                            Ok(_) => {
                                metrics.persists_success.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                metrics.persists_failed.fetch_add(1, Ordering::Relaxed);
                                log::error!(
                                    "reading lost during shutdown ({:?} at {}): {e:?}",
                                    entry.reading.kind,
                                    entry.reading.recorded_at_us
                                );
                            }
                        }
                    }
                    break;
                }

                None => continue,
            }
        }
    }
}

impl Drop for SubmitWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerCmd::Shutdown);

        if let Some(handle) = self.worker_thread.take() {
            let _ = handle.join();
        }
    }
}
