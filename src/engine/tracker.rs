use camino::{Utf8Path, Utf8PathBuf};

use crate::engine::task::{Task, TaskId};
use crate::filter::FilterKind;

#[derive(Debug, Clone)]
struct Entry {
    id: TaskId,
    source: Utf8PathBuf,
    kind: FilterKind,
}

/// Tasks that were submitted and are neither cancelled nor completed.
///
/// Entries keep submission order and identical `(source, kind)` pairs are
/// tracked separately. Only the owner touches the tracker, so it needs no
/// locking.
#[derive(Debug, Default)]
pub(crate) struct TaskTracker {
    entries: Vec<Entry>,
}

impl TaskTracker {
    pub fn insert(&mut self, task: &Task) {
        self.entries.push(Entry {
            id: task.id,
            source: task.source.clone(),
            kind: task.kind,
        });
    }

    /// Removes the oldest entry matching `(source, kind)`.
    pub fn cancel(&mut self, source: &Utf8Path, kind: FilterKind) -> Option<TaskId> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.kind == kind && entry.source.as_path() == source)?;

        Some(self.entries.remove(index).id)
    }

    /// Removes the entry for `id`, reporting whether it was still tracked.
    pub fn remove(&mut self, id: TaskId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
