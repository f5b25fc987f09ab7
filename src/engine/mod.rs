//! Task dispatch: building tasks, running them on worker threads and routing
//! their completions back to the owning [`Processor`](crate::Processor).

mod channel;
mod pool;
mod task;
mod tracker;

pub use crate::engine::pool::WorkerPool;
pub use crate::engine::task::{Naming, TaskId, destination_path};

pub(crate) use crate::engine::channel::{Completion, Inbox, Mailbox, Outcome, mailbox};
pub(crate) use crate::engine::task::Task;
pub(crate) use crate::engine::tracker::TaskTracker;
