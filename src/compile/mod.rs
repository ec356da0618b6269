//! External compiler and subsetter collaborators
//!
//! Producing OpenType binaries is delegated to command-line tools: `fontc`
//! compiles the prepared UFO and `pyftsubset` trims the variant build. The
//! pipeline talks to them through the [`FontCompiler`] and [`Subsetter`]
//! traits so tests can substitute in-process fakes.

pub mod compiler;
pub mod metrics;
pub mod subset;

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

use crate::variant::SubsetPlan;

pub use compiler::FontcCompiler;
pub use metrics::{fix_vertical_metrics, MetricsError, VerticalExtents};
pub use subset::PyftSubset;

/// Failures of an external tool; the tool's own output is carried verbatim
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("could not run '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("'{tool}' failed ({status}):\n{stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("'{tool}' reported success but did not write {path}")]
    MissingOutput { tool: String, path: String },
    #[error("no compiler configured for {0} outlines")]
    UnsupportedFlavor(OutlineFlavor),
}

/// Outline format of the compiled binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineFlavor {
    /// Quadratic `glyf` outlines
    TrueType,
    /// Cubic `CFF` outlines
    Cff,
}

impl OutlineFlavor {
    /// `.ttf` selects TrueType, anything else CFF
    pub fn from_output_path(path: &Path) -> Self {
        let is_ttf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf"));
        if is_ttf {
            OutlineFlavor::TrueType
        } else {
            OutlineFlavor::Cff
        }
    }
}

impl fmt::Display for OutlineFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineFlavor::TrueType => write!(f, "TrueType"),
            OutlineFlavor::Cff => write!(f, "CFF"),
        }
    }
}

/// Compiles a UFO on disk to an OpenType binary on disk
#[allow(async_fn_in_trait)]
pub trait FontCompiler {
    async fn compile(
        &self,
        ufo: &Path,
        output: &Path,
        flavor: OutlineFlavor,
    ) -> Result<(), ToolError>;
}

/// Subsets an OpenType binary according to a plan
#[allow(async_fn_in_trait)]
pub trait Subsetter {
    async fn subset(&self, input: &Path, output: &Path, plan: &SubsetPlan)
        -> Result<(), ToolError>;
}

/// Run a prepared command, turning a non-zero exit into [`ToolError::Failed`]
pub(crate) async fn run_tool(mut command: Command, tool: &str, output: &Path) -> Result<(), ToolError> {
    tracing::debug!("Running {:?}", command.as_std());
    let result = command.output().await.map_err(|source| ToolError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    if !result.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }

    if !tokio::fs::try_exists(output).await.unwrap_or(false) {
        return Err(ToolError::MissingOutput {
            tool: tool.to_string(),
            path: output.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_from_extension() {
        assert_eq!(
            OutlineFlavor::from_output_path(Path::new("out/Amiri-Regular.ttf")),
            OutlineFlavor::TrueType
        );
        assert_eq!(
            OutlineFlavor::from_output_path(Path::new("Amiri.TTF")),
            OutlineFlavor::TrueType
        );
        assert_eq!(
            OutlineFlavor::from_output_path(Path::new("Amiri-Regular.otf")),
            OutlineFlavor::Cff
        );
        assert_eq!(OutlineFlavor::from_output_path(Path::new("Amiri")), OutlineFlavor::Cff);
    }

    #[tokio::test]
    async fn test_run_tool_reports_missing_program() {
        let command = Command::new("fontsmith-no-such-tool");
        let err = run_tool(command, "fontsmith-no-such-tool", Path::new("/tmp/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_carries_stderr() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo 'bad glyph' >&2; exit 3"]);
        let err = run_tool(command, "sh", Path::new("/tmp/x")).await.unwrap_err();
        match err {
            ToolError::Failed { stderr, .. } => assert_eq!(stderr, "bad glyph\n"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
