pub mod config;
pub mod input;
pub mod rank;
pub mod validate;

use bazaar_core::errors::ApplicationError;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(command: &str, message: impl Into<String>, data: Value) -> Self {
        Self::report(command, None, message.into(), Some(data), 0)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::report(command, Some(error_class), message.into(), None, exit_code)
    }

    pub fn failure_with_data(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        data: Value,
        exit_code: u8,
    ) -> Self {
        Self::report(command, Some(error_class), message.into(), Some(data), exit_code)
    }

    /// Maps an application failure onto the CLI's error classes and exit codes.
    ///
    /// The payload carries the interface-level message, its user-safe hint and a
    /// correlation id that also appears in the error log line.
    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        let (error_class, exit_code) = match error {
            ApplicationError::Configuration(_) => ("config_validation", 2),
            ApplicationError::Input(_) => ("input", 3),
            ApplicationError::Domain(_) => ("domain", 4),
        };
        let correlation_id = format!("{command}-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
        let interface = error.clone().into_interface(correlation_id);

        tracing::error!(
            event_name = "cli.command.failed",
            command,
            error_class,
            correlation_id = interface.correlation_id(),
            error = %interface,
            "command failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: interface.to_string(),
            hint: Some(interface.user_message().to_string()),
            correlation_id: Some(interface.correlation_id().to_string()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn report(
        command: &str,
        error_class: Option<&str>,
        message: String,
        data: Option<Value>,
        exit_code: u8,
    ) -> Self {
        let status = if error_class.is_some() { "error" } else { "ok" };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: error_class.map(str::to_string),
            message,
            hint: None,
            correlation_id: None,
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
