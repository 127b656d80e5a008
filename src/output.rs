//! Text and JSON output formatting for CLI commands.

use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key/value lines
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => match serde_json::to_value(item) {
            Ok(serde_json::Value::Object(fields)) => {
                for (key, value) in &fields {
                    match value {
                        serde_json::Value::String(s) => print_kv(key, s),
                        other => print_kv(key, &other.to_string()),
                    }
                }
            }
            Ok(other) => println!("{other}"),
            Err(e) => print_error(&format!("Failed to render output: {e}")),
        },
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("✓ {msg}"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "message": msg })),
    }
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
