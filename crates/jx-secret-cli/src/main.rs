//! jx-secret-postrender - Helm postrenderer converting Secrets into ExternalSecrets

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "jx-secret-postrender")]
#[command(author = "Jenkins X Contributors")]
#[command(version)]
#[command(about = "A helm postrender to convert any Secret resources into ExternalSecret resources")]
#[command(long_about = "A helm postrender to convert any Secret resources into ExternalSecret resources.

Reads rendered manifests on standard input and writes them to standard output
with every v1/Secret rewritten as an ExternalSecret. Values found in the
Secrets are used to populate the external secret store unless JX_NO_POPULATE
is set.

Non-fatal errors are appended to jx-secret-postrenderer.log.")]
#[command(after_help = "Example:
  helm install --post-renderer jx-secret-postrender myname mychart")]
struct Cli {
    /// Don't populate the external secret store from Secret data
    #[arg(long)]
    no_populate: bool,

    /// Log file for non-fatal errors
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Working directory (overrides JX_DIR)
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Enable debug output on stderr
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    // stdout carries the manifests, diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let args = commands::postrender::PostrenderArgs {
        no_populate: cli.no_populate,
        log_file: cli.log_file,
        dir: cli.dir,
    };

    let code = match commands::postrender::run(&args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
