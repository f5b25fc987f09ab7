use std::sync::{Arc, LazyLock};

use camino::{Utf8Path, Utf8PathBuf};
use indicatif::ProgressStyle;
use serde::Serialize;
use tracing::Level;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::engine::{Completion, Inbox, Mailbox, Naming, Outcome, Task, TaskId, TaskTracker, WorkerPool, mailbox};
use crate::error::HangaError;
use crate::filter::FilterKind;
use crate::locator::{FileUrl, Resolve};

static DRAIN_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("Error setting progress bar template")
        .progress_chars("=>-")
});

/// The most recently accepted completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCompleted {
    pub source: Utf8PathBuf,
    pub kind: FilterKind,
}

/// A completion whose task was still tracked when the owner processed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accepted {
    pub id: TaskId,
    pub source: Utf8PathBuf,
    pub destination: Utf8PathBuf,
    pub kind: FilterKind,
    /// `false` when the filter failed and nothing was written.
    pub written: bool,
}

/// Configures a [`Processor`].
pub struct ProcessorBuilder {
    temp_dir: Option<Utf8PathBuf>,
    naming: Naming,
    pool: Option<Arc<WorkerPool>>,
    resolver: Box<dyn Resolve>,
}

impl ProcessorBuilder {
    fn new() -> Self {
        Self {
            temp_dir: None,
            naming: Naming::default(),
            pool: None,
            resolver: Box::new(FileUrl),
        }
    }

    /// Directory that receives filtered rasters. Defaults to the current
    /// directory.
    pub fn temp_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.temp_dir = Some(path.into());
        self
    }

    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Runs tasks on `pool` instead of [`WorkerPool::shared`].
    pub fn pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Replaces the default [`FileUrl`] locator resolution.
    pub fn resolver(mut self, resolver: impl Resolve + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn build(self) -> Result<Processor, HangaError> {
        let temp_dir = match self.temp_dir {
            Some(path) => path,
            None => {
                let cwd = std::env::current_dir().map_err(HangaError::CurrentDir)?;
                Utf8PathBuf::try_from(cwd)?
            }
        };

        let pool = match self.pool {
            Some(pool) => pool,
            None => WorkerPool::shared()?,
        };

        let (mailbox, inbox) = mailbox();

        Ok(Processor {
            tracker: TaskTracker::default(),
            last: None,
            temp_dir,
            naming: self.naming,
            pool,
            resolver: self.resolver,
            mailbox,
            inbox,
            next_id: 0,
            in_flight: 0,
        })
    }
}

/// Owner of filter tasks.
///
/// All bookkeeping happens through `&mut self` on whichever thread holds the
/// processor. Workers only ever see the task they were handed and talk back
/// through the processor's inbox, which is serviced by
/// [`process_pending`](Self::process_pending) or [`drain`](Self::drain).
///
/// Completions arrive in no particular order. A completion is *accepted* when
/// its task is still tracked at the time it is processed, which updates
/// [`last_completed`](Self::last_completed). Results are observed by polling;
/// there are no callbacks.
pub struct Processor {
    tracker: TaskTracker,
    last: Option<LastCompleted>,
    temp_dir: Utf8PathBuf,
    naming: Naming,
    pool: Arc<WorkerPool>,
    resolver: Box<dyn Resolve>,
    mailbox: Mailbox,
    inbox: Inbox,
    next_id: u64,
    /// Dispatched tasks whose completion hasn't been processed yet.
    in_flight: usize,
}

impl Processor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }

    /// Resolves `locator`, registers a task and queues it on the pool.
    ///
    /// Never blocks and never touches the filesystem on this thread.
    pub fn submit(&mut self, locator: &str, kind: FilterKind) -> TaskId {
        let source = self.resolver.resolve(locator);
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let task = Task::new(
            id,
            source,
            kind,
            &self.temp_dir,
            self.naming,
            self.mailbox.clone(),
        );

        tracing::debug!(%id, %kind, source = %task.source, destination = %task.destination, "submit");

        self.tracker.insert(&task);
        self.in_flight += 1;
        self.pool.execute(task);

        id
    }

    /// Soft-cancels the oldest tracked task for `(locator, kind)`.
    ///
    /// The filter keeps running and still writes its file, only its
    /// completion is discarded. Returns the cancelled task, if any matched.
    pub fn cancel(&mut self, locator: &str, kind: FilterKind) -> Option<TaskId> {
        let source = self.resolver.resolve(locator);
        let id = self.tracker.cancel(&source, kind);

        match id {
            Some(id) => tracing::debug!(%id, %kind, %source, "cancel"),
            None => tracing::debug!(%kind, %source, "cancel matched nothing"),
        }

        id
    }

    /// Affects tasks submitted after this call.
    pub fn set_temp_dir(&mut self, path: impl Into<Utf8PathBuf>) {
        self.temp_dir = path.into();
    }

    pub fn temp_dir(&self) -> &Utf8Path {
        &self.temp_dir
    }

    pub fn naming(&self) -> Naming {
        self.naming
    }

    pub fn last_completed(&self) -> Option<&LastCompleted> {
        self.last.as_ref()
    }

    pub fn last_completed_source(&self) -> Option<&Utf8Path> {
        self.last.as_ref().map(|last| last.source.as_path())
    }

    pub fn last_completed_kind(&self) -> Option<FilterKind> {
        self.last.as_ref().map(|last| last.kind)
    }

    /// Number of tracked (not cancelled, not completed) tasks.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tracker.contains(id)
    }

    /// Number of dispatched tasks whose completion hasn't been processed,
    /// cancelled ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// One owner turn: processes every completion queued so far without
    /// waiting for more.
    pub fn process_pending(&mut self) -> Vec<Accepted> {
        let mut accepted = Vec::new();

        while let Some(completion) = self.inbox.try_next() {
            accepted.extend(self.complete(completion));
        }

        accepted
    }

    /// Blocks until every dispatched task has completed and been processed.
    ///
    /// The processor keeps a sender of its own inbox alive, so the wait can
    /// only end once every worker has posted.
    pub fn drain(&mut self) -> Vec<Accepted> {
        let mut accepted = Vec::new();

        if self.in_flight == 0 {
            return accepted;
        }

        let span = tracing::span!(Level::INFO, "drain");
        span.pb_set_style(&DRAIN_STYLE);
        span.pb_set_length(self.in_flight as u64);
        span.pb_set_message("Filtering images...");
        let _enter = span.enter();

        while self.in_flight > 0 {
            let Some(completion) = self.inbox.next() else {
                break;
            };
            accepted.extend(self.complete(completion));
            span.pb_inc(1);
        }

        tracing::info!("{} task(s) accepted", accepted.len());
        accepted
    }

    /// Drains outstanding work and releases this processor's pool handle.
    pub fn shutdown(mut self) -> Vec<Accepted> {
        self.drain()
    }

    fn complete(&mut self, completion: Completion) -> Option<Accepted> {
        let Completion { task, outcome } = completion;
        self.in_flight = self.in_flight.saturating_sub(1);

        if !self.tracker.remove(task.id) {
            tracing::debug!(id = %task.id, "discarding stale completion");
            return None;
        }

        tracing::debug!(id = %task.id, kind = %task.kind, ?outcome, "accepted");

        self.last = Some(LastCompleted {
            source: task.source.clone(),
            kind: task.kind,
        });

        Some(Accepted {
            id: task.id,
            source: task.source,
            destination: task.destination,
            kind: task.kind,
            written: outcome == Outcome::Written,
        })
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        // tasks are always released here, never on a worker
        if self.in_flight > 0 {
            let accepted = self.drain().len();
            tracing::debug!("{accepted} completion(s) accepted while dropping");
        }
    }
}
