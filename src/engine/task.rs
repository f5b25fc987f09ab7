use std::fmt::Display;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::engine::channel::Mailbox;
use crate::filter::FilterKind;

/// Identity of a submitted task, unique within one [`Processor`](crate::Processor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaskId(pub(crate) u64);

impl Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How destination file names are derived from the source path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// `{temp}/{index}_{file}`.
    ///
    /// Two sources with the same file name in different directories map to
    /// the same destination, and concurrent tasks race on the final file.
    Plain,
    /// `{temp}/{index}_{dirhash}_{file}`, where `dirhash` is the first 16 hex
    /// digits of the blake3 hash of the source's parent directory.
    #[default]
    Qualified,
}

/// One unit of filter work.
///
/// A task is built on the owner thread, moved to a worker, and moved back
/// inside its completion message so the owner is the one that drops it.
#[derive(Debug)]
pub(crate) struct Task {
    pub id: TaskId,
    pub source: Utf8PathBuf,
    pub destination: Utf8PathBuf,
    pub kind: FilterKind,
    /// Route back to the owner. Holding it never keeps the owner alive.
    pub owner: Mailbox,
}

impl Task {
    /// Builds a task without touching the filesystem.
    pub fn new(
        id: TaskId,
        source: Utf8PathBuf,
        kind: FilterKind,
        temp_dir: &Utf8Path,
        naming: Naming,
        owner: Mailbox,
    ) -> Self {
        let destination = destination_path(temp_dir, &source, kind, naming);

        Self {
            id,
            source,
            destination,
            kind,
            owner,
        }
    }
}

/// Computes where the filtered raster for `source` is written.
pub fn destination_path(
    temp_dir: &Utf8Path,
    source: &Utf8Path,
    kind: FilterKind,
    naming: Naming,
) -> Utf8PathBuf {
    // a source without a file name (e.g. ending in `..`) falls back to the
    // whole path with separators flattened
    let file_name = match source.file_name() {
        Some(name) => name.to_string(),
        None => source.as_str().replace(['/', '\\'], "_"),
    };

    let name = match naming {
        Naming::Plain => format!("{}_{}", kind.index(), file_name),
        Naming::Qualified => {
            let parent = source.parent().map(Utf8Path::as_str).unwrap_or_default();
            let hash = blake3::hash(parent.as_bytes()).to_hex();
            format!("{}_{}_{}", kind.index(), &hash.as_str()[..16], file_name)
        }
    };

    temp_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_naming() {
        let path = destination_path(
            Utf8Path::new("/tmp/out"),
            Utf8Path::new("/photos/cat.png"),
            FilterKind::Soften,
            Naming::Plain,
        );

        assert_eq!(path, Utf8Path::new("/tmp/out/5_cat.png"));
    }

    #[test]
    fn test_plain_naming_collides_across_directories() {
        let temp = Utf8Path::new("/tmp/out");
        let a = destination_path(temp, Utf8Path::new("/a/cat.png"), FilterKind::Gray, Naming::Plain);
        let b = destination_path(temp, Utf8Path::new("/b/cat.png"), FilterKind::Gray, Naming::Plain);

        assert_eq!(a, b);
    }

    #[test]
    fn test_qualified_naming_separates_directories() {
        let temp = Utf8Path::new("/tmp/out");
        let a = destination_path(temp, Utf8Path::new("/a/cat.png"), FilterKind::Gray, Naming::Qualified);
        let b = destination_path(temp, Utf8Path::new("/b/cat.png"), FilterKind::Gray, Naming::Qualified);
        let again = destination_path(temp, Utf8Path::new("/a/cat.png"), FilterKind::Gray, Naming::Qualified);

        assert_ne!(a, b);
        assert_eq!(a, again);

        let name = a.file_name().unwrap();
        assert!(name.starts_with("0_"));
        assert!(name.ends_with("_cat.png"));
        // index, underscore, 16 hex digits, underscore, file name
        assert_eq!(name.len(), 2 + 16 + 1 + "cat.png".len());
    }

    #[test]
    fn test_kind_changes_prefix() {
        let temp = Utf8Path::new("out");
        let source = Utf8Path::new("cat.png");

        for kind in FilterKind::ALL {
            let path = destination_path(temp, source, kind, Naming::Plain);
            assert_eq!(path.file_name(), Some(format!("{}_cat.png", kind.index()).as_str()));
        }
    }
}
