//! Subsetting the compiled variant with `pyftsubset`

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;

use super::{run_tool, Subsetter, ToolError};
use crate::variant::SubsetPlan;

#[derive(Debug, Clone)]
pub struct PyftSubset {
    program: String,
}

impl PyftSubset {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments realising `plan`
    pub fn arguments(input: &Path, output: &Path, plan: &SubsetPlan) -> Vec<OsString> {
        let unicodes = plan
            .codepoint_ranges()
            .into_iter()
            .map(|range| {
                if range.start() == range.end() {
                    format!("{:04X}", range.start())
                } else {
                    format!("{:04X}-{:04X}", range.start(), range.end())
                }
            })
            .collect::<Vec<_>>()
            .join(",");

        let mut args: Vec<OsString> = vec![input.into(), format!("--unicodes={unicodes}").into()];
        if plan.keep_glyph_names {
            args.push("--glyph-names".into());
        }
        if plan.keep_all_names {
            args.push("--name-IDs=*".into());
            args.push("--name-languages=*".into());
        }
        args.push(format!("--layout-scripts={}", plan.layout_scripts.join(",")).into());
        args.push("--layout-features=*".into());
        if !plan.dropped_features.is_empty() {
            args.push(format!("--layout-features-={}", plan.dropped_features.join(",")).into());
        }
        if plan.recalc_average_width {
            args.push("--recalc-average-width".into());
        }
        if plan.recalc_max_context {
            args.push("--recalc-max-context".into());
        }
        let mut output_arg = OsString::from("--output-file=");
        output_arg.push(output);
        args.push(output_arg);
        args
    }
}

impl Default for PyftSubset {
    fn default() -> Self {
        Self::new("pyftsubset")
    }
}

impl Subsetter for PyftSubset {
    async fn subset(
        &self,
        input: &Path,
        output: &Path,
        plan: &SubsetPlan,
    ) -> Result<(), ToolError> {
        tracing::info!(
            "Subsetting {} to {} codepoints",
            input.display(),
            plan.codepoints.len()
        );
        let mut command = Command::new(&self.program);
        command.args(Self::arguments(input, output, plan));
        run_tool(command, &self.program, output).await
    }
}
