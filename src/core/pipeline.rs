//! The build pipeline
//!
//! One run takes a UFO source from disk to a single compiled binary:
//!
//! ```text
//! load → [companion merge] → license/version → stroke synthesis
//!      → feature merge → [variant rescale + rename] → production names
//!      → reference check → compile → [subset + metric fix-up] → write
//! ```
//!
//! Any previous output is removed before work starts and the new binary is
//! only moved into place once everything succeeded, so a failed run leaves
//! nothing behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::compile::{fix_vertical_metrics, FontCompiler, OutlineFlavor, Subsetter};
use crate::core::cli::CliArgs;
use crate::core::config_file::BuildConfig;
use crate::core::errors::{BuildContext, BuildResult};
use crate::core::version::FontVersion;
use crate::data::ufo::save_ufo_to_path;
use crate::features::{load_external_features, merge_features};
use crate::font_source::{metrics, FontSource};
use crate::merge::{merge_companion, MergeReport};
use crate::naming::export_production_names;
use crate::synth::{synthesize_strokes, StrokeReport};
use crate::variant::{rescale_marks, rewrite_metadata, subset_plan};

/// Inputs of a single build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub features: PathBuf,
    pub version: FontVersion,
    pub license: PathBuf,
    pub variant: bool,
    pub companion: Option<PathBuf>,
}

impl From<&CliArgs> for BuildRequest {
    fn from(args: &CliArgs) -> Self {
        Self {
            input: args.input.clone(),
            output: args.output.clone(),
            features: args.features.clone(),
            version: args.font_version,
            license: args.license.clone(),
            variant: args.variant,
            companion: args.companion.clone(),
        }
    }
}

/// What a successful build did
#[derive(Debug)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub flavor: OutlineFlavor,
    pub merge: Option<MergeReport>,
    pub strokes: Vec<StrokeReport>,
    pub production_names: usize,
    pub bytes: usize,
}

/// Prepare the UFO in memory: every step before compilation
pub fn prepare_source(request: &BuildRequest, config: &BuildConfig) -> BuildResult<PreparedSource> {
    let mut source = FontSource::load(&request.input)?;

    let merge = match &request.companion {
        Some(path) => {
            let companion = FontSource::load(path)?;
            Some(merge_companion(&mut source, &companion))
        }
        None => None,
    };

    let license = std::fs::read_to_string(&request.license)
        .with_file_context("read license", &request.license)?;
    metrics::apply_license(source.info_mut(), &license);
    request.version.apply(source.info_mut());
    tracing::info!(
        "Building {} version {}",
        metrics::display_name(source.info()),
        request.version
    );

    let mut strokes = Vec::new();
    for base in &config.stroke_bases {
        if let Some(report) = synthesize_strokes(&mut source, base)? {
            strokes.push(report);
        }
    }

    let defines: Vec<&str> = if request.variant {
        vec![config.variant.define.as_str()]
    } else {
        Vec::new()
    };
    let external = load_external_features(&request.features, defines.as_slice())
        .with_file_context("preprocess", &request.features)?;
    merge_features(&mut source, &external);

    if request.variant {
        rescale_marks(&mut source, &config.variant.marks, config.variant.scale)?;
        rewrite_metadata(&mut source, &config.variant);
    }

    let production_names = if config.production_names {
        export_production_names(&mut source)
    } else {
        0
    };

    source.validate_references()?;

    Ok(PreparedSource {
        source,
        merge,
        strokes,
        production_names,
    })
}

/// A source ready for compilation, with what was done to it
#[derive(Debug)]
pub struct PreparedSource {
    pub source: FontSource,
    pub merge: Option<MergeReport>,
    pub strokes: Vec<StrokeReport>,
    pub production_names: usize,
}

/// Run the whole pipeline with the given collaborators
pub async fn build<C, S>(
    request: &BuildRequest,
    config: &BuildConfig,
    compiler: &C,
    subsetter: &S,
) -> BuildResult<BuildSummary>
where
    C: FontCompiler,
    S: Subsetter,
{
    remove_stale_output(&request.output)?;

    let prepared = prepare_source(request, config)?;
    let flavor = OutlineFlavor::from_output_path(&request.output);

    let workdir = tempfile::tempdir()?;
    let ufo_path = workdir.path().join("build.ufo");
    save_ufo_to_path(prepared.source.font(), &ufo_path)?;

    let extension = match flavor {
        OutlineFlavor::TrueType => "ttf",
        OutlineFlavor::Cff => "otf",
    };
    let compiled = workdir.path().join(format!("compiled.{extension}"));
    compiler.compile(&ufo_path, &compiled, flavor).await?;

    let bytes = if request.variant {
        let plan = subset_plan(&config.variant)?;
        let subset = workdir.path().join(format!("subset.{extension}"));
        subsetter.subset(&compiled, &subset, &plan).await?;
        let data = tokio::fs::read(&subset)
            .await
            .with_file_context("read", &subset)?;
        fix_vertical_metrics(&data)?
    } else {
        tokio::fs::read(&compiled)
            .await
            .with_file_context("read", &compiled)?
    };

    write_atomically(&request.output, &bytes)?;
    tracing::info!("Wrote {} ({} bytes)", request.output.display(), bytes.len());

    Ok(BuildSummary {
        output: request.output.clone(),
        flavor,
        merge: prepared.merge,
        strokes: prepared.strokes,
        production_names: prepared.production_names,
        bytes: bytes.len(),
    })
}

/// Delete output left by an earlier run so a failure cannot look like success
fn remove_stale_output(output: &Path) -> BuildResult<()> {
    if output.exists() {
        std::fs::remove_file(output).with_file_context("remove previous", output)?;
        tracing::debug!("Removed previous output {}", output.display());
    }
    Ok(())
}

/// Write to a temporary file next to `path`, then rename it into place
fn write_atomically(path: &Path, bytes: &[u8]) -> BuildResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_file_context("create", dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir).with_file_context("create temporary file in", dir)?;
    file.write_all(bytes).with_file_context("write", file.path())?;
    file.persist(path).with_file_context("write", path)?;
    Ok(())
}
