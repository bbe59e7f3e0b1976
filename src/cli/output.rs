//! Output helpers shared by the CLI commands.

use console::style;
use serde::Serialize;

/// Envelope for robot-mode responses.
#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: &'static str,
    pub version: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Print a robot-mode success envelope to stdout.
pub fn emit_robot<T: Serialize>(data: T, warnings: Vec<String>) {
    let response = RobotResponse {
        status: "ok",
        version: crate::VERSION,
        data,
        warnings,
    };
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("Error: failed to serialize output: {err}"),
    }
}

/// Print warnings to stderr, one styled line each.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", style("warning:").yellow().bold());
    }
}

/// Styled section heading for human output.
#[must_use]
pub fn heading(text: &str) -> String {
    style(text).bold().to_string()
}
