//! Process-level setup and error reporting.

/// Report a failed build and exit with code 1.
///
/// Prints the whole error chain so that tool output carried inside an error
/// (compiler stderr, for instance) reaches the user.
pub fn handle_error(error: anyhow::Error) -> ! {
    tracing::error!("{error:#}");
    eprintln!();
    eprintln!("Build failed:");
    eprintln!("{error}");
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    eprintln!();
    eprintln!("No output was written. Try running with -v for details.");
    std::process::exit(1);
}

/// Parse CLI arguments from the process command line.
pub fn get_cli_args() -> crate::core::cli::CliArgs {
    use clap::Parser;
    crate::core::cli::CliArgs::parse()
}
