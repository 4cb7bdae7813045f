use anyhow::{bail, Context, Result};
use clap::Parser;
use removebg::cli::{Args, Commands};
use removebg::logger::init_logging;
use removebg::{Compositor, FileStorage, Processor, ProcessorConfig, ZipCompositor};
use std::path::Path;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    match &args.command {
        Some(Commands::Zip2png { input, output }) => convert_zip(input, output),
        None => run_batch(&args),
    }
}

fn convert_zip(input: &Path, output: &Path) -> Result<()> {
    ZipCompositor::new(FileStorage)
        .process(input, output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    tracing::info!("Processed zip: {} -> {}", input.display(), output.display());
    Ok(())
}

fn run_batch(args: &Args) -> Result<()> {
    let api_key = match args.api_key.as_deref().filter(|key| !key.is_empty()) {
        Some(key) => key,
        None => bail!("API key must be specified"),
    };

    let processor = Processor::with_defaults(ProcessorConfig::new(api_key), !args.quiet)?;
    let summary = processor.process(&args.files, args.settings())?;

    if summary.cancelled {
        return Ok(());
    }

    tracing::info!(
        "Batch complete: {} processed, {} skipped, {} failed (of {})",
        summary.succeeded,
        summary.skipped,
        summary.failed,
        summary.total
    );
    if summary.halted {
        tracing::warn!("Stopped early: API rate limit exceeded");
    }

    Ok(())
}
