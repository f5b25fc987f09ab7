use std::sync::mpsc::{Receiver, SendError, Sender, TryRecvError, channel};

use crate::engine::task::Task;

/// How a worker finished a task. Failures are logged on the worker and never
/// cross back to the owner as error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Written,
    Aborted,
}

/// Message posted by a worker once its filter returns.
#[derive(Debug)]
pub(crate) struct Completion {
    pub task: Task,
    pub outcome: Outcome,
}

/// Sending half of the owner's inbox, cloned into every task.
#[derive(Debug, Clone)]
pub(crate) struct Mailbox(Sender<Completion>);

impl Mailbox {
    /// Posts a completion. Gives the message back if the owner is gone.
    pub fn post(&self, completion: Completion) -> Result<(), Completion> {
        self.0.send(completion).map_err(|SendError(completion)| completion)
    }
}

/// Receiving half, serviced only by the owner.
#[derive(Debug)]
pub(crate) struct Inbox(Receiver<Completion>);

impl Inbox {
    /// Next queued completion, without waiting.
    pub fn try_next(&self) -> Option<Completion> {
        match self.0.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits for the next completion. `None` once every mailbox is dropped.
    pub fn next(&self) -> Option<Completion> {
        self.0.recv().ok()
    }
}

pub(crate) fn mailbox() -> (Mailbox, Inbox) {
    let (sender, receiver) = channel();
    (Mailbox(sender), Inbox(receiver))
}
