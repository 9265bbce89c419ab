//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes the pre-upload checks to AI assistants over stdio. Every tool
//! delegates to `safra_check_core`; nothing here decides whether a file is
//! acceptable.
//!
//! # Tools
//!
//! - `get_info`: package name, version and description
//! - `check_file`: type and size admission from a name, size and MIME type
//! - `validate_csv`: the full pipeline over CSV text supplied inline

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use safra_check_core::format::{format_file_size, format_record_count};
use safra_check_core::guard::{FileDescriptor, check_file_with};
use safra_check_core::parse::ParserMode;
use safra_check_core::upload::{CsvSource, InMemoryCsv, UploadOptions, prepare_upload};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `check_file` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CheckFileParams {
    /// File name, including extension.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// Declared MIME type, if known.
    pub content_type: Option<String>,
}

/// Parameters for the `validate_csv` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ValidateCsvParams {
    /// File name, including extension.
    pub name: String,
    /// Full CSV content.
    pub text: String,
    /// Declared MIME type, if known.
    pub content_type: Option<String>,
    /// Parse quoted fields per RFC 4180.
    #[serde(default)]
    pub strict: bool,
}

/// Result of the `validate_csv` tool.
#[derive(Debug, Serialize)]
struct ValidateReport {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'static str>,
    errors: Vec<String>,
    size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<String>,
}

/// MCP server exposing the pre-upload checks.
#[derive(Clone)]
pub struct ProjectServer {
    options: UploadOptions,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new(UploadOptions::default())
    }
}

#[tool_router]
impl ProjectServer {
    /// Create a server that checks uploads with `options`.
    pub fn new(options: UploadOptions) -> Self {
        Self {
            options,
            tool_router: Self::tool_router(),
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
        });

        let text = if params.format == "json" {
            serde_json::to_string_pretty(&info)
                .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Type and size admission only; no content is involved.
    #[tool(
        description = "Check whether a file may be uploaded, from its name, size in bytes and MIME type. Returns is_valid and the list of error messages."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", name = %params.name))]
    fn check_file(
        &self,
        Parameters(params): Parameters<CheckFileParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "check_file", size = params.size, "executing MCP tool");

        let mut descriptor = FileDescriptor::new(params.name, params.size);
        descriptor.content_type = params.content_type;
        let outcome =
            check_file_with(&descriptor, self.options.max_file_bytes, self.options.locale());

        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "check_file",
            is_valid = outcome.is_valid(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Run the whole pipeline over inline CSV text.
    #[tool(
        description = "Validate CSV content for upload: file type, size, parsing, required columns (Id, DataAvaliacao, Propriedade, NomeCultura), non-empty data and consistent row width."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", name = %params.name))]
    fn validate_csv(
        &self,
        Parameters(params): Parameters<ValidateCsvParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "validate_csv", strict = params.strict, "executing MCP tool");

        let mut options = self.options.clone();
        if params.strict {
            options = options.with_parser(ParserMode::Rfc4180);
        }
        let locale = options.locale();

        let mut source = InMemoryCsv::new(params.name, params.text);
        if let Some(content_type) = params.content_type {
            source = source.with_content_type(content_type);
        }
        let size = format_file_size(source.descriptor().size);

        let report = match prepare_upload(source, &options) {
            Ok(upload) => ValidateReport {
                is_valid: true,
                failure: None,
                errors: Vec::new(),
                size,
                row_count: Some(upload.row_count()),
                records: Some(format_record_count(upload.row_count() as u64, locale)),
            },
            Err(err) => ValidateReport {
                is_valid: false,
                failure: Some(err.kind()),
                errors: err.messages(),
                size,
                row_count: None,
                records: None,
            },
        };

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "validate_csv",
            is_valid = report.is_valid,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use check_file before reading a file and validate_csv on its content before uploading pest-sampling CSVs.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use safra_check_core::config::Locale;

    const GOOD: &str = "Id,DataAvaliacao,Propriedade,NomeCultura\n1,2024-01-01,Norte,Soja\n";

    #[test]
    fn server_info_has_correct_name() {
        let server = ProjectServer::default();
        let info = ServerHandler::get_info(&server);

        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn server_has_tools_capability() {
        let server = ProjectServer::default();
        let info = ServerHandler::get_info(&server);

        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn server_has_instructions() {
        let server = ProjectServer::default();
        let info = ServerHandler::get_info(&server);

        let instructions = info.instructions.expect("server should have instructions");
        assert!(instructions.contains(env!("CARGO_PKG_NAME")));
    }

    /// Extract text from the first content item in a `CallToolResult`.
    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn json_of(result: &CallToolResult) -> serde_json::Value {
        let text = extract_text(result).expect("should have text content");
        serde_json::from_str(text).expect("output should be valid JSON")
    }

    #[test]
    fn get_info_tool_returns_text_by_default() {
        let server = ProjectServer::default();
        let params = Parameters(GetInfoParams {
            format: "text".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");

        assert!(!result.is_error.unwrap_or(false));
        let text = extract_text(&result).expect("should have text content");
        assert!(text.contains(env!("CARGO_PKG_NAME")));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let server = ProjectServer::default();
        let params = Parameters(GetInfoParams {
            format: "json".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");
        let json = json_of(&result);

        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn check_file_accepts_csv() {
        let server = ProjectServer::default();
        let params = Parameters(CheckFileParams {
            name: "dados.csv".to_string(),
            size: 1024,
            content_type: Some("text/csv".to_string()),
        });

        let result = server.check_file(params).expect("check_file should succeed");
        let json = json_of(&result);

        assert_eq!(json["is_valid"], true);
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn check_file_reports_every_problem() {
        let server = ProjectServer::default();
        let params = Parameters(CheckFileParams {
            name: "dados.pdf".to_string(),
            size: 60 * 1024 * 1024,
            content_type: Some("application/pdf".to_string()),
        });

        let result = server.check_file(params).expect("check_file should succeed");
        let json = json_of(&result);

        assert_eq!(json["is_valid"], false);
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn validate_csv_accepts_good_content() {
        let server = ProjectServer::default();
        let params = Parameters(ValidateCsvParams {
            name: "dados.csv".to_string(),
            text: GOOD.to_string(),
            content_type: None,
            strict: false,
        });

        let result = server
            .validate_csv(params)
            .expect("validate_csv should succeed");
        let json = json_of(&result);

        assert_eq!(json["is_valid"], true);
        assert_eq!(json["row_count"], 1);
    }

    #[test]
    fn validate_csv_reports_structure_failure() {
        let server = ProjectServer::default();
        let params = Parameters(ValidateCsvParams {
            name: "dados.csv".to_string(),
            text: "Id,Propriedade\n1,Norte\n".to_string(),
            content_type: None,
            strict: true,
        });

        let result = server
            .validate_csv(params)
            .expect("validate_csv should succeed");
        let json = json_of(&result);

        assert_eq!(json["is_valid"], false);
        assert_eq!(json["failure"], "structure");
        let first = json["errors"][0].as_str().unwrap();
        assert!(first.contains("DataAvaliacao"));
    }

    #[test]
    fn validate_csv_uses_server_locale() {
        let mut options = UploadOptions::default();
        options.rules.locale = Locale::PtBr;
        let server = ProjectServer::new(options);
        let params = Parameters(ValidateCsvParams {
            name: "dados.txt".to_string(),
            text: GOOD.to_string(),
            content_type: None,
            strict: false,
        });

        let result = server
            .validate_csv(params)
            .expect("validate_csv should succeed");
        let json = json_of(&result);

        assert_eq!(json["failure"], "rejected");
        let first = json["errors"][0].as_str().unwrap();
        assert!(first.contains("CSV"));
    }
}
