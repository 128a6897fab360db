//! Runtime abstraction layer for async operations
//!
//! Content fetches, registry loads and tile downloads are spawned through
//! this module so the UI thread never blocks. With the `tokio-runtime`
//! feature tasks go to the ambient tokio runtime, or to a small private one
//! when the caller is not inside a runtime (tests, plain egui main loops).
//! Without it every task gets its own thread with a current-thread runtime.

use std::pin::Pin;

use crate::prelude::Future;

type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Spawn a future on the global runtime
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::runtime::{Builder, Handle, Runtime};
        use ::tokio::task::JoinHandle;
        use once_cell::sync::Lazy;

        /// Used only when a task is spawned from outside any tokio runtime
        static PRIVATE_RUNTIME: Lazy<Option<Runtime>> = Lazy::new(|| {
            match Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("campusmap-io")
                .enable_all()
                .build()
            {
                Ok(runtime) => Some(runtime),
                Err(e) => {
                    log::error!("failed to start the background runtime: {}", e);
                    None
                }
            }
        });

        /// Tokio-based async spawner
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                let handle = match Handle::try_current() {
                    Ok(handle) => handle.spawn(future),
                    Err(_) => match PRIVATE_RUNTIME.as_ref() {
                        Some(runtime) => runtime.spawn(future),
                        None => return Box::new(super::Finished),
                    },
                };
                Box::new(TokioHandle(handle))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    /// Runs each task to completion on its own OS thread
    pub struct ThreadSpawner;

    impl AsyncSpawner for ThreadSpawner {
        fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
            let finished = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
            let flag = finished.clone();
            let spawned = std::thread::Builder::new()
                .name("campusmap-task".into())
                .spawn(move || {
                    // reqwest and tokio::fs need a reactor on the polling thread
                    match ::tokio::runtime::Builder::new_current_thread().enable_all().build() {
                        Ok(runtime) => runtime.block_on(future),
                        Err(e) => log::error!("failed to start a task runtime: {}", e),
                    }
                    flag.store(true, std::sync::atomic::Ordering::Release);
                });
            if let Err(e) = spawned {
                log::error!("failed to spawn task thread: {}", e);
                return Box::new(Finished);
            }
            Box::new(ThreadHandle(finished))
        }
    }

    struct ThreadHandle(std::sync::Arc<std::sync::atomic::AtomicBool>);

    impl AsyncHandle for ThreadHandle {
        fn is_finished(&self) -> bool {
            self.0.load(std::sync::atomic::Ordering::Acquire)
        }

        fn cancel(&self) {
            // Threads run to completion; results are dropped by the receiver
        }
    }

    /// Handle for a task that could not be started
    pub(super) struct Finished;

    impl AsyncHandle for Finished {
        fn is_finished(&self) -> bool {
            true
        }

        fn cancel(&self) {}
    }
}

/// Shared async helpers
pub mod async_utils {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Non-blocking permit counter bounding concurrent downloads
    #[derive(Debug, Clone)]
    pub struct Semaphore {
        permits: Arc<AtomicUsize>,
        max_permits: usize,
    }

    impl Semaphore {
        pub fn new(permits: usize) -> Self {
            Self {
                permits: Arc::new(AtomicUsize::new(permits)),
                max_permits: permits,
            }
        }

        pub fn try_acquire(&self) -> bool {
            self.permits
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| p.checked_sub(1))
                .is_ok()
        }

        pub fn release(&self) {
            let max = self.max_permits;
            let _ = self
                .permits
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| {
                    (p < max).then_some(p + 1)
                });
        }

        pub fn available_permits(&self) -> usize {
            self.permits.load(Ordering::Acquire)
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Box::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                Box::new(spawners::ThreadSpawner)
            }
        })
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::async_utils::Semaphore;
    use super::*;

    #[test]
    fn test_semaphore_bounds() {
        let semaphore = Semaphore::new(2);
        assert!(semaphore.try_acquire());
        assert!(semaphore.try_acquire());
        assert!(!semaphore.try_acquire());

        semaphore.release();
        assert_eq!(semaphore.available_permits(), 1);

        semaphore.release();
        semaphore.release();
        assert_eq!(semaphore.available_permits(), 2);
    }

    #[test]
    fn test_spawn_outside_runtime_delivers() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        spawn(async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(5)), Ok(42));
    }

    #[test]
    fn test_thread_spawner_provides_a_reactor() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let handle = spawners::ThreadSpawner.spawn_boxed(Box::pin(async move {
            ::tokio::time::sleep(::tokio::time::Duration::from_millis(5)).await;
            let _ = tx.send(7);
        }));
        assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(5)), Ok(7));
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(1);
        while !handle.is_finished() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(handle.is_finished());
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let handle = spawn(async {
            ::tokio::time::sleep(::tokio::time::Duration::from_millis(10)).await;
        });

        assert!(!handle.is_finished());

        ::tokio::time::sleep(::tokio::time::Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }
}
