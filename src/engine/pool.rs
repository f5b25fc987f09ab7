use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::Level;

use crate::engine::channel::{Completion, Outcome};
use crate::engine::task::Task;
use crate::error::{FilterError, HangaError};
use crate::filter;

static SHARED: Mutex<Weak<WorkerPool>> = Mutex::new(Weak::new());

/// Worker threads that run filters.
///
/// The pool does no scheduling of its own; tasks go straight onto the rayon
/// queue and may run in any order. Dropping the last handle lets the threads
/// finish the work already queued and exit.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Builds a dedicated pool. `None` leaves sizing to rayon.
    pub fn new(threads: Option<usize>) -> Result<Self, HangaError> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("hanga-worker-{i}"));

        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }

        Ok(Self {
            pool: builder.build()?,
        })
    }

    /// Process-wide pool shared by every processor built without an explicit
    /// one. It lives while at least one handle is held and is rebuilt on the
    /// next call after that.
    pub fn shared() -> Result<Arc<Self>, HangaError> {
        let mut shared = SHARED.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(pool) = shared.upgrade() {
            return Ok(pool);
        }

        let pool = Arc::new(Self::new(None)?);
        *shared = Arc::downgrade(&pool);

        Ok(pool)
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queues the task and returns immediately.
    pub(crate) fn execute(&self, task: Task) {
        self.pool.spawn(move || execute(task));
    }
}

fn execute(task: Task) {
    let span = tracing::span!(Level::INFO, "task", id = %task.id, kind = %task.kind);
    let _enter = span.enter();

    let result = catch_unwind(AssertUnwindSafe(|| {
        filter::run(task.kind, &task.source, &task.destination)
    }))
    .unwrap_or_else(|panic| {
        let msg = if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("unknown payload")
        };

        Err(FilterError::Panicked(msg))
    });

    let outcome = match result {
        Ok(()) => {
            tracing::debug!("{} -> {}", task.source, task.destination);
            Outcome::Written
        }
        Err(err) => {
            tracing::warn!("{}: {}", task.source, err);
            Outcome::Aborted
        }
    };

    let owner = task.owner.clone();
    if let Err(completion) = owner.post(Completion { task, outcome }) {
        tracing::debug!("owner is gone, dropping {}", completion.task.id);
    }
}
