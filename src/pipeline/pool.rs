//! Bounded worker pool
//!
//! Tasks sit in a shared queue drained by a fixed number of blocking
//! workers. Each outcome, including a panic, is sent back over a channel and
//! returned in submission order.

use crate::error::{Error, Result};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Fixed-size pool of blocking workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` workers (at least one)
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Pool sized `min(max_workers, task_count)`
    pub fn for_tasks(max_workers: usize, task_count: usize) -> Self {
        Self::new(max_workers.min(task_count))
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `work` over every task; results come back in task order
    pub async fn run<T, R, F>(&self, tasks: Vec<T>, work: F) -> Vec<Result<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }

        let queue: Arc<Mutex<VecDeque<(usize, T)>>> =
            Arc::new(Mutex::new(tasks.into_iter().enumerate().collect()));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<R>)>();

        let workers = self.size.min(total);
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = Arc::clone(&queue);
            let work = Arc::clone(&work);
            let tx = tx.clone();

            handles.push(tokio::task::spawn_blocking(move || loop {
                let next = match queue.lock() {
                    Ok(mut pending) => pending.pop_front(),
                    Err(_) => None,
                };
                let Some((index, task)) = next else {
                    break;
                };

                tracing::debug!("Worker {} picked task {}", worker_id, index);

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| (*work)(task)))
                    .unwrap_or_else(|payload| {
                        Err(Error::WorkerPanic {
                            message: panic_message(payload.as_ref()),
                        })
                    });

                if tx.send((index, outcome)).is_err() {
                    break;
                }
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<Result<R>>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = rx.recv().await {
            slots[index] = Some(outcome);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker terminated abnormally: {e}");
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(Error::WorkerPanic {
                        message: "task produced no result".to_string(),
                    })
                })
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_pool_size_bounds() {
        assert_eq!(WorkerPool::new(0).size(), 1);
        assert_eq!(WorkerPool::for_tasks(4, 2).size(), 2);
        assert_eq!(WorkerPool::for_tasks(4, 10).size(), 4);
        assert_eq!(WorkerPool::for_tasks(4, 0).size(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_results_in_task_order() {
        let pool = WorkerPool::new(3);
        let tasks: Vec<u64> = (0..10).collect();

        let results = pool
            .run(tasks, |n| {
                std::thread::sleep(Duration::from_millis((10 - n) * 2));
                Ok(n * n)
            })
            .await;

        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        let results = pool
            .run((0..8).collect::<Vec<_>>(), move |_: i32| {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                a.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(results.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_errors_are_isolated() {
        let pool = WorkerPool::new(2);
        let results = pool
            .run(vec!["orders", "missing", "customers"], |name| {
                if name == "missing" {
                    Err(Error::no_files(name))
                } else {
                    Ok(name.len())
                }
            })
            .await;

        assert_eq!(results[0].as_ref().unwrap(), &6);
        assert!(results[1].as_ref().unwrap_err().is_not_found());
        assert_eq!(results[2].as_ref().unwrap(), &9);
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let pool = WorkerPool::new(2);
        let results = pool
            .run(vec![1, 2, 3], |n| {
                if n == 2 {
                    panic!("boom on {n}");
                }
                Ok(n)
            })
            .await;

        assert_eq!(results[0].as_ref().unwrap(), &1);
        assert!(matches!(
            &results[1],
            Err(Error::WorkerPanic { message }) if message == "boom on 2"
        ));
        assert_eq!(results[2].as_ref().unwrap(), &3);
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let pool = WorkerPool::new(4);
        let results = pool.run(Vec::<u8>::new(), |n| Ok(n)).await;
        assert!(results.is_empty());
    }
}
