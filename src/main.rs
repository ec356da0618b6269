//! Builds production font binaries from UFO sources.

use anyhow::Result;
use fontsmith::compile::{FontcCompiler, PyftSubset};
use fontsmith::core::{self, BuildConfig, BuildRequest};
use fontsmith::logging;

/// Run one build with the given CLI arguments.
async fn run_build(cli_args: core::CliArgs) -> Result<()> {
    let config = BuildConfig::load(cli_args.config.as_deref())?;

    let log_dir = match (&cli_args.log_dir, config.log_to_file) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(BuildConfig::logs_dir()),
        (None, false) => None,
    };
    let _guard = logging::init(cli_args.verbose, log_dir.as_deref())?;

    cli_args.validate()?;
    let request = BuildRequest::from(&cli_args);
    let compiler = FontcCompiler::new(&config.compiler);
    let subsetter = PyftSubset::new(config.subsetter.clone());

    let summary = core::build(&request, &config, &compiler, &subsetter).await?;
    tracing::info!(
        "Built {} ({} outlines, {} stroke sets)",
        summary.output.display(),
        summary.flavor,
        summary.strokes.len()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = core::platform::get_cli_args();
    if let Err(error) = run_build(cli_args).await {
        core::platform::handle_error(error);
    }
}
