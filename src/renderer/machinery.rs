use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use anyhow::anyhow;
use parking_lot::Mutex;

use crate::{
    camera::{OrthogonalCamera, Rendering},
    functor::Sidedness,
    scene::FrozenScene,
};

use super::{RenderError, SimpleRayTraceWorker};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WorkerCount {
    /// One worker per CPU.
    #[default]
    Auto,
    Manual(NonZeroUsize),
}

impl WorkerCount {
    pub fn get(self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get(),
            WorkerCount::Manual(count) => count.get(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSettings {
    pub worker_count: WorkerCount,
}

/// One scene to render with the shared batch camera.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub name: String,
    pub scene: FrozenScene,
    pub sidedness: Sidedness,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobResult {
    pub name: String,
    pub result: Result<Rendering, RenderError>,
}

/// Renders all jobs in background threads, each thread pinned to a core.
///
/// A failing job is reported in its [`JobResult`] and doesn't stop the others.
pub fn render_batch(
    jobs: Vec<RenderJob>,
    camera: OrthogonalCamera,
    settings: BatchSettings,
) -> anyhow::Result<BatchProgress> {
    let thread_count = settings.worker_count.get().min(jobs.len());
    let results = Mutex::new(vec![None; jobs.len()]);
    let state = Arc::new(BatchState {
        jobs,
        camera,
        results,
        next_job_index: AtomicUsize::new(0),
        finished_jobs: AtomicUsize::new(0),
    });

    let cores = core_affinity::get_core_ids().unwrap_or_default();
    if cores.is_empty() {
        log::warn!("CPU list unavailable, worker threads won't be pinned");
    }
    log::debug!(
        "Rendering {} jobs on {thread_count} threads",
        state.jobs.len()
    );

    let threads = (0..thread_count)
        .map(|worker_id| {
            let state = Arc::clone(&state);
            let core = (!cores.is_empty()).then(|| cores[worker_id % cores.len()]);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    // Each thread traces one job at a time, a single idle scratch set is enough.
                    let single = SimpleRayTraceWorker::builder()
                        .sidedness(Sidedness::Single)
                        .max_idle_scratch(1)
                        .build();
                    let double = SimpleRayTraceWorker::builder()
                        .sidedness(Sidedness::Double)
                        .max_idle_scratch(1)
                        .build();

                    while let Some((index, job)) = state.get_next_job() {
                        let worker = match job.sidedness {
                            Sidedness::Single => &single,
                            Sidedness::Double => &double,
                        };
                        let result = state.camera.render(&job.scene, worker);
                        if let Err(error) = &result {
                            log::warn!("Job {:?} failed: {error}", job.name);
                        } else {
                            log::trace!("Worker {worker_id} finished job {:?}", job.name);
                        }

                        state.results.lock()[index] = Some(JobResult {
                            name: job.name.clone(),
                            result,
                        });
                        state.finished_jobs.fetch_add(1, Ordering::AcqRel);
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchProgress {
        batch_state: state,
        threads,
    })
}

pub struct BatchProgress {
    batch_state: Arc<BatchState>,
    threads: Vec<JoinHandle<()>>,
}

impl BatchProgress {
    /// Return number of finished and total jobs.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.batch_state.jobs.len();
        let finished = self
            .batch_state
            .finished_jobs
            .load(Ordering::Acquire)
            .min(total);
        (finished, total)
    }

    pub fn progress_percent(&self) -> f32 {
        let (finished, total) = self.progress();
        if total == 0 {
            return 100.0;
        }
        100.0 * (finished as f32) / (total as f32)
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Running jobs still finish, but no new ones are started.
    pub fn abort(&self) {
        self.batch_state
            .next_job_index
            .store(self.batch_state.jobs.len(), Ordering::Release);
    }

    /// Blocks until all workers are done.
    pub fn wait(&mut self) -> anyhow::Result<()> {
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_owned();
            handle
                .join()
                .map_err(|_| anyhow!("Render thread {name} panicked"))?;
        }
        Ok(())
    }

    /// Waits for the workers and returns results in job order.
    /// Jobs skipped because of [`BatchProgress::abort`] are missing.
    pub fn into_results(mut self) -> anyhow::Result<Vec<JobResult>> {
        self.wait()?;
        let results = std::mem::take(&mut *self.batch_state.results.lock());
        Ok(results.into_iter().flatten().collect())
    }
}

struct BatchState {
    jobs: Vec<RenderJob>,
    camera: OrthogonalCamera,

    results: Mutex<Vec<Option<JobResult>>>,

    next_job_index: AtomicUsize,
    finished_jobs: AtomicUsize,
}

impl BatchState {
    fn get_next_job(&self) -> Option<(usize, &RenderJob)> {
        let index = self.next_job_index.fetch_add(1, Ordering::AcqRel);
        self.jobs.get(index).map(|job| (index, job))
    }
}
