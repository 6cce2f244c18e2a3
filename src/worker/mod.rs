//! Worker pool
//!
//! This module implements the fan-out/fan-in harness the coordinator dispatches
//! chunks through. Each chunk is summed by its own worker; workers never talk to
//! each other and communicate only through the partial sum they return.
//!
//! # Backends
//!
//! - **Threads**: one named OS thread per chunk, results sent back over a bounded
//!   crossbeam channel, every handle joined before the pool returns
//! - **Rayon**: a dedicated rayon pool sized to the chunk count, mapping chunks in
//!   parallel and collecting in chunk order; its threads are joined after the pool
//!   is dropped
//!
//! Both backends return partial sums indexed by chunk, so the caller can reduce in
//! a fixed order regardless of completion order.

pub mod cancel;

pub use cancel::CancelToken;

use crate::config::Backend;
use crate::coordinator::Chunk;
use crate::error::PiError;
use crate::series;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Computes the partial sum of one chunk
///
/// Implementations must be pure with respect to the chunk: the same chunk always
/// yields the same bits. `should_stop` may be polled at any granularity; returning
/// `None` means the worker honoured a stop request.
pub trait PartialSummer: Send + Sync {
    fn sum_chunk(&self, chunk: Chunk, should_stop: &dyn Fn() -> bool) -> Option<f64>;
}

/// The Leibniz partial summer used by every real run
#[derive(Debug, Clone, Copy, Default)]
pub struct LeibnizSummer;

impl PartialSummer for LeibnizSummer {
    fn sum_chunk(&self, chunk: Chunk, should_stop: &dyn Fn() -> bool) -> Option<f64> {
        series::sum_range_until(chunk.start, chunk.end, should_stop)
    }
}

/// What a single worker handed back
enum Outcome {
    Sum(f64),
    Stopped,
    Panicked(String),
}

/// Produces the builder for worker thread `index`; an error stands in for a failed spawn
pub type Spawner = dyn Fn(usize) -> io::Result<thread::Builder> + Send + Sync;

/// Fixed-size pool that runs one worker per chunk
pub struct WorkerPool {
    backend: Backend,
    summer: Arc<dyn PartialSummer>,
    spawner: Arc<Spawner>,
}

impl WorkerPool {
    /// Create a pool summing the Leibniz series on the given backend
    pub fn new(backend: Backend) -> Self {
        Self::with_summer(backend, Arc::new(LeibnizSummer))
    }

    pub fn with_summer(backend: Backend, summer: Arc<dyn PartialSummer>) -> Self {
        Self {
            backend,
            summer,
            spawner: named_threads(backend),
        }
    }

    /// Replace how worker threads are created
    pub fn with_spawner(mut self, spawner: Arc<Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Run every chunk to completion and return the partial sums in chunk order
    ///
    /// Blocks until all workers have finished and every thread the pool started
    /// has been joined. The first worker failure fails the whole run; if `cancel`
    /// is raised before every worker finished, the run returns
    /// [`PiError::Cancelled`].
    pub fn run(&self, chunks: &[Chunk], cancel: Option<&CancelToken>) -> Result<Vec<f64>, PiError> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(PiError::Cancelled);
        }

        let outcomes = match self.backend {
            Backend::Threads => self.run_on_threads(chunks, cancel)?,
            Backend::Rayon => self.run_on_rayon(chunks, cancel)?,
        };

        collect_partials(outcomes)
    }

    fn run_on_threads(
        &self,
        chunks: &[Chunk],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Outcome>, PiError> {
        let (tx, rx) = crossbeam::channel::bounded::<(usize, Option<f64>)>(chunks.len());
        // Raised only when the pool itself gives up, so the caller's token stays untouched
        let abort = CancelToken::new();
        let mut handles = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().copied().enumerate() {
            let tx = tx.clone();
            let summer = Arc::clone(&self.summer);
            let worker_abort = abort.clone();
            let cancel = cancel.cloned();

            let spawned = (self.spawner)(index).and_then(|builder| {
                builder.spawn(move || {
                    let should_stop = || {
                        worker_abort.is_cancelled()
                            || cancel.as_ref().is_some_and(CancelToken::is_cancelled)
                    };
                    let partial = summer.sum_chunk(chunk, &should_stop);
                    // Capacity equals the worker count, so this never blocks
                    let _ = tx.send((index, partial));
                })
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    abort.cancel();
                    let spawned = handles.len();
                    join_all(handles);
                    return Err(PiError::ResourceExhaustion {
                        requested: chunks.len(),
                        spawned,
                        source,
                    });
                }
            }
        }
        drop(tx);

        // Ends once every worker has dropped its sender, including panicked ones
        let mut outcomes: Vec<Option<Outcome>> = (0..chunks.len()).map(|_| None).collect();
        for (index, partial) in rx.iter() {
            outcomes[index] = Some(match partial {
                Some(sum) => Outcome::Sum(sum),
                None => Outcome::Stopped,
            });
        }

        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(payload) = handle.join() {
                outcomes[index] = Some(Outcome::Panicked(panic_message(payload.as_ref())));
            }
        }

        Ok(outcomes
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| Outcome::Panicked("no partial sum reported".to_string()))
            })
            .collect())
    }

    fn run_on_rayon(
        &self,
        chunks: &[Chunk],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Outcome>, PiError> {
        use rayon::prelude::*;

        // Pool threads are spawned here so they can be joined once the pool is dropped
        let mut handles = Vec::with_capacity(chunks.len());
        let built = rayon::ThreadPoolBuilder::new()
            .num_threads(chunks.len())
            .spawn_handler(|thread| {
                let mut builder = (self.spawner)(thread.index())?;
                if let Some(size) = thread.stack_size() {
                    builder = builder.stack_size(size);
                }
                handles.push(builder.spawn(move || thread.run())?);
                Ok(())
            })
            .build();

        let pool = match built {
            Ok(pool) => pool,
            Err(e) => {
                // A failed build terminates the threads it already started
                let spawned = handles.len();
                join_all(handles);
                return Err(PiError::ResourceExhaustion {
                    requested: chunks.len(),
                    spawned,
                    source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                });
            }
        };

        let should_stop = || cancel.is_some_and(CancelToken::is_cancelled);
        let summer = self.summer.as_ref();

        let outcomes = pool.install(|| {
            chunks
                .par_iter()
                .map(|&chunk| {
                    match panic::catch_unwind(AssertUnwindSafe(|| summer.sum_chunk(chunk, &should_stop))) {
                        Ok(Some(sum)) => Outcome::Sum(sum),
                        Ok(None) => Outcome::Stopped,
                        Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
                    }
                })
                .collect::<Vec<_>>()
        });

        drop(pool);
        join_all(handles);

        Ok(outcomes)
    }
}

/// Default spawner: one named thread per worker
fn named_threads(backend: Backend) -> Arc<Spawner> {
    let prefix = match backend {
        Backend::Threads => "leibniz-worker",
        Backend::Rayon => "leibniz-rayon",
    };
    Arc::new(move |index: usize| -> io::Result<thread::Builder> {
        Ok(thread::Builder::new().name(format!("{}-{}", prefix, index)))
    })
}

fn join_all(handles: Vec<thread::JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.join();
    }
}

/// Turn per-chunk outcomes into partial sums, failing on the first bad worker
///
/// A panic outranks a stop: a run that was both cancelled and broken reports the
/// breakage.
fn collect_partials(outcomes: Vec<Outcome>) -> Result<Vec<f64>, PiError> {
    let mut stopped = false;
    let mut partials = Vec::with_capacity(outcomes.len());

    for (chunk, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Outcome::Sum(sum) => partials.push(sum),
            Outcome::Stopped => stopped = true,
            Outcome::Panicked(reason) => return Err(PiError::WorkerFailure { chunk, reason }),
        }
    }

    if stopped {
        return Err(PiError::Cancelled);
    }
    Ok(partials)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::partition;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    const BACKENDS: [Backend; 2] = [Backend::Threads, Backend::Rayon];

    /// Panics on one chosen chunk, sums the rest normally
    struct FailingSummer {
        fail_on: usize,
    }

    impl PartialSummer for FailingSummer {
        fn sum_chunk(&self, chunk: Chunk, should_stop: &dyn Fn() -> bool) -> Option<f64> {
            if chunk.start == self.fail_on as u64 {
                panic!("injected failure");
            }
            LeibnizSummer.sum_chunk(chunk, should_stop)
        }
    }

    /// Raises the token from inside a worker, then keeps polling it
    struct CancellingSummer {
        token: CancelToken,
        calls: AtomicUsize,
    }

    impl PartialSummer for CancellingSummer {
        fn sum_chunk(&self, _chunk: Chunk, should_stop: &dyn Fn() -> bool) -> Option<f64> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.token.cancel();
            if should_stop() {
                None
            } else {
                Some(0.0)
            }
        }
    }

    /// Holds each chunk until told to stop, counting how many workers saw the stop
    #[derive(Default)]
    struct WaitingSummer {
        started: AtomicUsize,
        stopped: AtomicUsize,
    }

    impl PartialSummer for WaitingSummer {
        fn sum_chunk(&self, _chunk: Chunk, should_stop: &dyn Fn() -> bool) -> Option<f64> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let deadline = Instant::now() + Duration::from_secs(10);
            while Instant::now() < deadline {
                if should_stop() {
                    self.stopped.fetch_add(1, Ordering::SeqCst);
                    return None;
                }
                thread::sleep(Duration::from_millis(1));
            }
            Some(0.0)
        }
    }

    /// Decrements the live-thread count when its worker thread exits
    struct LiveThread(Arc<AtomicUsize>);

    impl Drop for LiveThread {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    thread_local! {
        static LIVE_THREAD: RefCell<Option<LiveThread>> = RefCell::new(None);
    }

    /// Counts the threads that summed a chunk and have not exited yet
    #[derive(Default)]
    struct ThreadTrackingSummer {
        live: Arc<AtomicUsize>,
        seen: AtomicUsize,
    }

    impl PartialSummer for ThreadTrackingSummer {
        fn sum_chunk(&self, chunk: Chunk, should_stop: &dyn Fn() -> bool) -> Option<f64> {
            LIVE_THREAD.with(|slot| {
                let mut slot = slot.borrow_mut();
                if slot.is_none() {
                    self.live.fetch_add(1, Ordering::SeqCst);
                    self.seen.fetch_add(1, Ordering::SeqCst);
                    *slot = Some(LiveThread(Arc::clone(&self.live)));
                }
            });
            LeibnizSummer.sum_chunk(chunk, should_stop)
        }
    }

    /// Spawns normally until worker `fail_at`, which fails like an exhausted thread limit
    fn failing_spawner(fail_at: usize) -> Arc<Spawner> {
        Arc::new(move |index: usize| -> io::Result<thread::Builder> {
            if index == fail_at {
                Err(io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached"))
            } else {
                Ok(thread::Builder::new())
            }
        })
    }

    #[test]
    fn test_partials_in_chunk_order() {
        let chunks = partition(1_000, 4);
        for backend in BACKENDS {
            let partials = WorkerPool::new(backend).run(&chunks, None).unwrap();
            assert_eq!(partials.len(), 4);
            for (chunk, partial) in chunks.iter().zip(&partials) {
                assert_eq!(partial.to_bits(), series::sum_range(chunk.start, chunk.end).to_bits());
            }
        }
    }

    #[test]
    fn test_degenerate_chunks_are_dispatched() {
        let chunks = partition(3, 5);
        for backend in BACKENDS {
            let partials = WorkerPool::new(backend).run(&chunks, None).unwrap();
            assert_eq!(partials.len(), 5);
            assert_eq!(partials[3], 0.0);
            assert_eq!(partials[4], 0.0);
        }
    }

    #[test]
    fn test_worker_panic_fails_run() {
        let chunks = partition(100, 4);
        for backend in BACKENDS {
            let pool = WorkerPool::with_summer(backend, Arc::new(FailingSummer { fail_on: 50 }));
            match pool.run(&chunks, None) {
                Err(PiError::WorkerFailure { chunk, reason }) => {
                    assert_eq!(chunk, 2);
                    assert!(reason.contains("injected failure"));
                }
                other => panic!("expected worker failure, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_cancelled_before_dispatch() {
        let token = CancelToken::new();
        token.cancel();
        for backend in BACKENDS {
            let result = WorkerPool::new(backend).run(&partition(10, 2), Some(&token));
            assert!(matches!(result, Err(PiError::Cancelled)));
        }
    }

    #[test]
    fn test_cancelled_while_running() {
        for backend in BACKENDS {
            let token = CancelToken::new();
            let summer = Arc::new(CancellingSummer { token: token.clone(), calls: AtomicUsize::new(0) });
            let pool = WorkerPool::with_summer(backend, summer.clone());

            let result = pool.run(&partition(10, 3), Some(&token));
            assert!(matches!(result, Err(PiError::Cancelled)));
            // Every worker still ran and was joined
            assert_eq!(summer.calls.load(Ordering::Relaxed), 3);
        }
    }

    #[test]
    fn test_caller_token_untouched_on_success() {
        let token = CancelToken::new();
        WorkerPool::new(Backend::Threads).run(&partition(10, 2), Some(&token)).unwrap();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_spawn_failure_stops_and_joins_started_workers() {
        let summer = Arc::new(WaitingSummer::default());
        let pool = WorkerPool::with_summer(Backend::Threads, summer.clone())
            .with_spawner(failing_spawner(2));
        let token = CancelToken::new();

        match pool.run(&partition(100, 4), Some(&token)) {
            Err(PiError::ResourceExhaustion { requested, spawned, source }) => {
                assert_eq!(requested, 4);
                assert_eq!(spawned, 2);
                assert_eq!(source.kind(), io::ErrorKind::WouldBlock);
            }
            other => panic!("expected resource exhaustion, got {:?}", other),
        }

        // Both started workers were told to stop and had finished by the time run returned
        assert_eq!(summer.started.load(Ordering::SeqCst), 2);
        assert_eq!(summer.stopped.load(Ordering::SeqCst), 2);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_spawn_failure_on_first_worker() {
        for backend in BACKENDS {
            let summer = Arc::new(WaitingSummer::default());
            let pool = WorkerPool::with_summer(backend, summer.clone())
                .with_spawner(failing_spawner(0));

            let result = pool.run(&partition(100, 3), None);
            assert!(matches!(
                result,
                Err(PiError::ResourceExhaustion { requested: 3, spawned: 0, .. })
            ));
            assert_eq!(summer.started.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn test_rayon_spawn_failure_reports_started_threads() {
        let summer = Arc::new(WaitingSummer::default());
        let pool = WorkerPool::with_summer(Backend::Rayon, summer.clone())
            .with_spawner(failing_spawner(3));

        let result = pool.run(&partition(100, 5), None);
        assert!(matches!(
            result,
            Err(PiError::ResourceExhaustion { requested: 5, spawned: 3, .. })
        ));
        // The pool never got built, so no chunk was handed out
        assert_eq!(summer.started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pool_threads_joined_before_return() {
        for backend in BACKENDS {
            let summer = Arc::new(ThreadTrackingSummer::default());
            let pool = WorkerPool::with_summer(backend, summer.clone());

            for _ in 0..5 {
                pool.run(&partition(1_000, 16), None).unwrap();
                assert_eq!(summer.live.load(Ordering::SeqCst), 0, "{} threads outlived the run", backend);
            }
            assert!(summer.seen.load(Ordering::SeqCst) > 0);
        }
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "panicked: boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "panicked: bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(boxed.as_ref()), "panicked");
    }
}
