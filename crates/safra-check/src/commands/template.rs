//! Template command: emit a starter CSV with the required columns.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use tracing::{debug, info, instrument};

use safra_check_core::config::Config;
use safra_check_core::structure::csv_template;

/// Arguments for the `template` subcommand.
#[derive(Args, Debug, Default)]
pub struct TemplateArgs {
    /// Write to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Overwrite FILE if it exists.
    #[arg(long, requires = "output")]
    pub force: bool,
}

/// Print or write the template.
#[instrument(name = "cmd_template", skip_all, fields(output = ?args.output))]
pub fn cmd_template(args: TemplateArgs, config: &Config) -> anyhow::Result<()> {
    debug!("executing template command");
    let template = csv_template(&config.effective_required_columns());

    let Some(path) = args.output else {
        print!("{template}");
        return Ok(());
    };

    if path.exists() && !args.force {
        bail!("{path} already exists (use --force to overwrite)");
    }
    std::fs::write(&path, template).with_context(|| format!("failed to write {path}"))?;
    info!(path = %path, "template written");
    Ok(())
}
