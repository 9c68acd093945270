use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::TreeConfig;
use crate::error::{Error, NodeFailure, Result};
use crate::hash::{Algorithm, Element};
use crate::queue::WorkQueue;
use crate::tree::Tree;

/// Outcome of a single worker loop.
#[derive(Debug)]
pub struct WorkerReport {
    /// Worker index, `0..thread_count`.
    pub worker: usize,
    /// Number of nodes this worker hashed.
    pub processed: usize,
    /// Nodes whose digest failed on this worker.
    pub failures: Vec<NodeFailure>,
}

/// Fixed set of workers draining a [`WorkQueue`].
///
/// Every pool thread runs exactly one worker loop per [`WorkerPool::run`]:
///
/// 1. pop a node, exit the loop if the queue is empty;
/// 2. hash it and mark it done;
/// 3. if that completed the last pending child of its parent, claim the
///    parent and push it.
///
/// A node is pushed only by the worker that completed its last child, and
/// that worker polls the queue again before it can exit, so no ready node is
/// ever left behind.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Spawns `config.thread_count` worker threads.
    pub fn new(config: &TreeConfig) -> Result<WorkerPool> {
        config.validate()?;

        let name = config.thread_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count)
            .thread_name(move |i| format!("{}-{}", name, i))
            .build()
            .map_err(|e| Error::PoolFailure(e.to_string()))?;

        Ok(WorkerPool {
            pool,
            threads: config.thread_count,
        })
    }

    /// Returns number of workers.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Hashes and completes every leaf, in parallel on the pool threads.
    ///
    /// Returns the leaves whose digest failed; those stay claimed and never
    /// become done.
    pub fn hash_leaves<T, A>(&self, tree: &Tree<T>) -> Result<Vec<NodeFailure>>
    where
        T: Element,
        A: Algorithm<T>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool.install(|| {
                tree.leaves()
                    .par_iter()
                    .enumerate()
                    .map_init(A::default, |alg, (index, leaf)| {
                        if !leaf.try_claim() {
                            return None;
                        }
                        tree.compute(index, alg).err().map(|source| {
                            warn!("failed to hash leaf {}: {:#}", index, source);
                            NodeFailure {
                                node: index,
                                worker: None,
                                source,
                            }
                        })
                    })
                    .flatten()
                    .collect::<Vec<_>>()
            })
        }));

        outcome.map_err(|payload| {
            let msg = panic_message(&*payload);
            warn!("leaf hashing panicked: {}", msg);
            Error::PoolFailure(format!("leaf hashing panicked: {}", msg))
        })
    }

    /// Runs one worker loop on every pool thread and waits for all of them.
    ///
    /// A panicking worker does not stop the others; once every loop has
    /// exited the panics are reported as [`Error::PoolFailure`].
    pub fn run<T, A>(&self, tree: &Tree<T>, queue: &WorkQueue) -> Result<Vec<WorkerReport>>
    where
        T: Element,
        A: Algorithm<T>,
    {
        let outcomes = self.pool.broadcast(|ctx| {
            panic::catch_unwind(AssertUnwindSafe(|| {
                run_worker::<T, A>(ctx.index(), tree, queue)
            }))
        });

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut panics = Vec::new();
        for (worker, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(report) => reports.push(report),
                Err(payload) => {
                    let msg = panic_message(&*payload);
                    warn!("worker {} panicked: {}", worker, msg);
                    panics.push(format!("worker {} panicked: {}", worker, msg));
                }
            }
        }

        if !panics.is_empty() {
            return Err(Error::PoolFailure(panics.join("; ")));
        }

        Ok(reports)
    }
}

fn run_worker<T, A>(worker: usize, tree: &Tree<T>, queue: &WorkQueue) -> WorkerReport
where
    T: Element,
    A: Algorithm<T>,
{
    let mut alg = A::default();
    let mut report = WorkerReport {
        worker,
        processed: 0,
        failures: Vec::new(),
    };

    while let Some(index) = queue.try_pop() {
        if let Err(source) = tree.compute(index, &mut alg) {
            warn!("worker {} failed to hash node {}: {:#}", worker, index, source);
            report.failures.push(NodeFailure {
                node: index,
                worker: Some(worker),
                source,
            });
            continue;
        }
        report.processed += 1;

        if let Some(parent) = tree[index].parent() {
            if tree.try_schedule(parent) {
                queue.push(parent);
            }
        }
    }

    debug!("worker {} exiting after {} nodes", worker, report.processed);
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
