#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod engine;
mod error;
pub mod filter;
mod locator;
mod processor;

pub use crate::engine::{Naming, TaskId, WorkerPool, destination_path};
pub use crate::error::*;
pub use crate::filter::{FilterKind, UnknownFilter};
pub use crate::locator::{FileUrl, Resolve};
pub use crate::processor::{Accepted, LastCompleted, Processor, ProcessorBuilder};

/// Installs a `tracing` subscriber that prints to stderr and renders span
/// progress bars, filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "logging")]
pub fn init_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_indicatif::IndicatifLayer;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let indicatif = IndicatifLayer::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif.get_stderr_writer()))
        .with(indicatif)
        .try_init()
}
