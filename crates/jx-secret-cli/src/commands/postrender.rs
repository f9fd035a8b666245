//! Postrender command - convert Secrets in a rendered manifest stream
//!
//! Helm pipes the rendered release into this command and applies whatever
//! comes out, so nothing but manifests may be written to stdout.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use jx_secret_convert::{ConvertOptions, ExternalSecretConverter};
use jx_secret_core::{DiagnosticSink, FileSink, PostrenderConfig, Postrenderer, TransformOutcome};
use jx_secret_populate::{FileSecretStore, StorePopulator};

use crate::error::{CliError, Result};

/// Command-line overrides applied on top of the environment
#[derive(Debug, Clone, Default)]
pub struct PostrenderArgs {
    pub no_populate: bool,
    pub log_file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
}

pub fn run(args: &PostrenderArgs) -> Result<()> {
    let config = load_config(args)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| CliError::io("failed to read standard input", e))?;

    let sink = FileSink::new(&config.log_file);
    let outcome = transform(&config, &input, &sink)?;

    tracing::debug!(
        secrets = outcome.secret_count(),
        failed = outcome.failed_sections,
        "postrender complete"
    );

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(terminate_line(outcome.output).as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::io("failed to write standard output", e))?;

    Ok(())
}

/// Read the environment once and apply command-line overrides
pub fn load_config(args: &PostrenderArgs) -> Result<PostrenderConfig> {
    let mut config = PostrenderConfig::from_env()?;
    if args.no_populate {
        config.disable_populate = true;
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = log_file.clone();
    }
    if let Some(dir) = &args.dir {
        config.dir = Some(dir.clone());
    }
    Ok(config)
}

/// Run the pipeline with the default converter, populator and store
pub fn transform(
    config: &PostrenderConfig,
    input: &str,
    sink: &dyn DiagnosticSink,
) -> Result<TransformOutcome> {
    let converter = ExternalSecretConverter::new(ConvertOptions::from_config(config))?;
    let store = FileSecretStore::in_dir(&config.dir_or_current());
    let populator = StorePopulator::new(store);

    Ok(Postrenderer::new(config, converter, populator, sink).transform(input))
}

/// Output always ends with a newline
fn terminate_line(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
