//! Serve command: run the MCP server on stdio.

use clap::Args;
use rmcp::ServiceExt;
use tracing::{info, instrument};

use safra_check_core::config::Config;
use safra_check_core::upload::UploadOptions;

use crate::server::ProjectServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

/// Serve until the client disconnects.
///
/// stdout carries the protocol; logs go to stderr and the log file only.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(_args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let options = UploadOptions::from_config(&config);
    info!(
        parser = %options.parser,
        max_file_bytes = options.max_file_bytes,
        "starting MCP server on stdio"
    );

    let service = ProjectServer::new(options)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;

    info!("MCP server stopped");
    Ok(())
}
