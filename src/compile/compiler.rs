//! Compiling the prepared UFO with `fontc`

use std::path::Path;

use tokio::process::Command;

use super::{run_tool, FontCompiler, OutlineFlavor, ToolError};
use crate::core::config_file::CompilerConfig;

/// Runs `fontc` for TrueType output and a configured command for CFF
#[derive(Debug, Clone)]
pub struct FontcCompiler {
    fontc: String,
    /// Command line template with `{input}` and `{output}` placeholders
    cff_command: Option<String>,
}

impl FontcCompiler {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            fontc: config.fontc.clone(),
            cff_command: config.cff_command.clone(),
        }
    }

    fn fontc_command(&self, ufo: &Path, output: &Path, build_dir: &Path) -> Command {
        let mut command = Command::new(&self.fontc);
        command
            .arg("--build-dir")
            .arg(build_dir)
            .arg("--output-file")
            .arg(output)
            .arg(ufo);
        command
    }

    /// Expand the CFF command template; `None` when no template is configured
    fn cff_command(&self, ufo: &Path, output: &Path) -> Option<(String, Command)> {
        let template = self.cff_command.as_deref()?;
        let mut words = template.split_whitespace().map(|word| {
            word.replace("{input}", &ufo.to_string_lossy())
                .replace("{output}", &output.to_string_lossy())
        });
        let program = words.next()?;
        let mut command = Command::new(&program);
        command.args(words);
        Some((program, command))
    }
}

impl FontCompiler for FontcCompiler {
    async fn compile(
        &self,
        ufo: &Path,
        output: &Path,
        flavor: OutlineFlavor,
    ) -> Result<(), ToolError> {
        tracing::info!("Compiling {} outlines to {}", flavor, output.display());
        match flavor {
            OutlineFlavor::TrueType => {
                let build_dir = tempfile::tempdir().map_err(|source| ToolError::Spawn {
                    tool: self.fontc.clone(),
                    source,
                })?;
                let command = self.fontc_command(ufo, output, build_dir.path());
                run_tool(command, &self.fontc, output).await
            }
            OutlineFlavor::Cff => {
                let (program, command) = self
                    .cff_command(ufo, output)
                    .ok_or(ToolError::UnsupportedFlavor(flavor))?;
                run_tool(command, &program, output).await
            }
        }
    }
}
