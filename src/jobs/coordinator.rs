// src/jobs/coordinator.rs
//! Dispatches worker requests onto the async compute pool and filters the
//! replies down to the jobs still being tracked.

use bevy::log::{debug, info};
use bevy::prelude::Resource;
use bevy::tasks::{AsyncComputeTaskPool, Task, TaskPool};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures_lite::future;
use std::collections::HashMap;

use crate::terrain::{JobKind, JobSlots, TerrainWorker, WorkerRequest, WorkerResponse};

struct RunningJob {
    kind: JobKind,
    id: u64,
    task: Task<()>,
}

/// One tracked job per [`JobKind`]. Submitting a new job of a kind stops
/// tracking the previous one; its replies are dropped on arrival and the
/// worker notices the change and stops early.
#[derive(Resource)]
pub struct JobCoordinator {
    worker: TerrainWorker,
    tx: Sender<WorkerResponse>,
    rx: Receiver<WorkerResponse>,
    running: Vec<RunningJob>,
    /// Submitted ids whose terminal reply has not been seen.
    outstanding: HashMap<u64, JobKind>,
}

impl JobCoordinator {
    pub fn new(worker: TerrainWorker) -> Self {
        let (tx, rx) = unbounded();
        Self { worker, tx, rx, running: Vec::new(), outstanding: HashMap::new() }
    }

    #[inline]
    pub fn slots(&self) -> &JobSlots { self.worker.slots() }

    /// Id currently tracked for `kind`, if any.
    pub fn tracked(&self, kind: JobKind) -> Option<u64> {
        let id = self.slots().current(kind);
        (id != 0 && self.outstanding.contains_key(&id)).then_some(id)
    }

    /// Stamp `req` with a fresh id for its kind and start it.
    pub fn submit(&mut self, req: WorkerRequest) -> u64 {
        let kind = req.kind();
        if let Some(prev) = self.tracked(kind) {
            debug!("Coordinator: {:?} job {} superseded", kind, prev);
            self.outstanding.remove(&prev);
        }
        let id = self.slots().begin(kind);
        let req = req.with_job_id(id);
        self.outstanding.insert(id, kind);

        let worker = self.worker.clone();
        let tx = self.tx.clone();
        let pool = AsyncComputeTaskPool::get_or_init(TaskPool::default);
        let task = pool.spawn(async move {
            worker.run(req, &mut |resp| {
                // receiver gone means the app is shutting down
                let _ = tx.send(resp);
            });
        });
        info!("Coordinator: started {:?} job {}", kind, id);
        self.running.push(RunningJob { kind, id, task });
        id
    }

    /// Stop tracking `kind`; a running job winds down on its own.
    pub fn cancel(&mut self, kind: JobKind) {
        if let Some(id) = self.tracked(kind) {
            self.outstanding.remove(&id);
        }
        self.slots().cancel(kind);
    }

    /// Retire finished tasks. Returns how many are still running.
    pub fn poll_tasks(&mut self) -> usize {
        self.running.retain_mut(|job| {
            if job.task.is_finished() {
                future::block_on(future::poll_once(&mut job.task));
                debug!("Coordinator: {:?} task {} finished", job.kind, job.id);
                false
            } else {
                true
            }
        });
        self.running.len()
    }

    /// Replies for tracked jobs, in arrival order. Anything from a job that
    /// is no longer tracked is dropped.
    pub fn drain(&mut self) -> Vec<WorkerResponse> {
        let mut out = Vec::new();
        for resp in self.rx.try_iter() {
            let id = resp.job_id();
            let live = self.outstanding.get(&id).is_some_and(|kind| self.worker.slots().is_current(*kind, id));
            if !live {
                debug!("Coordinator: dropping stale reply for job {}", id);
                continue;
            }
            if resp.is_terminal() {
                self.outstanding.remove(&id);
            }
            out.push(resp);
        }
        out
    }

    /// No tasks running and nothing waiting in the channel.
    pub fn is_idle(&self) -> bool { self.running.is_empty() && self.rx.is_empty() }
}
