use std::fs;
use std::sync::Arc;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use console::style;
use hanga::{Accepted, FilterKind, LastCompleted, Naming, Processor, WorkerPool};
use serde::Serialize;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Apply pixel filters to images on a worker pool")]
struct Args {
    /// Images to filter: paths, `file://` URLs or glob patterns.
    #[clap(required = true)]
    inputs: Vec<String>,

    /// Filter to apply, by name or index. Repeat to apply several.
    #[clap(short, long = "filter", default_value = "gray")]
    filters: Vec<FilterKind>,

    /// Output directory, defaults to the current directory.
    #[clap(short, long)]
    temp_dir: Option<Utf8PathBuf>,

    /// Worker threads, defaults to one per core.
    #[clap(short = 'j', long)]
    threads: Option<usize>,

    /// Name outputs `{index}_{file}` without the directory hash.
    #[clap(long)]
    plain_names: bool,

    /// Soft-cancel this filter for every input right after submitting.
    #[clap(long)]
    cancel: Vec<FilterKind>,

    /// Write a JSON summary of accepted completions.
    #[clap(long)]
    report: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    accepted: &'a [Accepted],
    cancelled: usize,
    last: Option<&'a LastCompleted>,
}

fn expand(inputs: &[String]) -> anyhow::Result<Vec<String>> {
    let mut locators = Vec::new();

    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            locators.push(input.clone());
            continue;
        }

        for entry in glob::glob(input).with_context(|| format!("bad pattern '{input}'"))? {
            let path = Utf8PathBuf::try_from(entry?)?;
            locators.push(path.into_string());
        }
    }

    Ok(locators)
}

fn main() -> anyhow::Result<()> {
    hanga::init_logging()?;

    let args = Args::parse();
    let locators = expand(&args.inputs)?;

    let pool = Arc::new(WorkerPool::new(args.threads)?);

    eprintln!(
        "Running {} on {} worker(s).",
        style("hanga").red(),
        style(pool.threads()).blue()
    );

    let mut builder = Processor::builder().pool(pool);
    if let Some(dir) = args.temp_dir {
        builder = builder.temp_dir(dir);
    }
    if args.plain_names {
        builder = builder.naming(Naming::Plain);
    }
    let mut processor = builder.build()?;

    for locator in &locators {
        for &kind in &args.filters {
            processor.submit(locator, kind);
        }
    }

    let mut cancelled = 0;
    for locator in &locators {
        for &kind in &args.cancel {
            cancelled += processor.cancel(locator, kind).is_some() as usize;
        }
    }

    let accepted = processor.drain();

    for done in &accepted {
        if done.written {
            println!("{:>8} {} -> {}", style(done.kind).cyan(), done.source, done.destination);
        } else {
            println!("{:>8} {} {}", style(done.kind).cyan(), done.source, style("skipped").yellow());
        }
    }

    if cancelled > 0 {
        tracing::info!(cancelled, "cancelled tasks were discarded");
    }

    if let Some(path) = args.report {
        let report = Report {
            accepted: &accepted,
            cancelled,
            last: processor.last_completed(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json).with_context(|| format!("couldn't write report to {path}"))?;
    }

    processor.shutdown();

    Ok(())
}
