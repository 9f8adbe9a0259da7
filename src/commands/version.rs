//! Version/metadata reporting.
//!
//! Implements the `registry-auth version` subcommand, which can output either
//! a human-readable summary or a machine-readable JSON document describing the
//! build.

use serde_json::json;

use crate::color::ColorScheme;

const GIT_HASH: &str = env!("GIT_HASH");
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
const TARGET: &str = env!("TARGET");
const RUSTC_VERSION: &str = env!("RUSTC_VERSION");

/// Render version and build metadata in JSON or human-readable form.
///
/// # Arguments
/// * `json` - When `true`, emit a JSON document instead of colored text.
/// * `short` - When `true`, print only the semantic version string.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  let version = env!("CARGO_PKG_VERSION");

  if short {
    println!("{version}");
    return;
  }

  if json {
    // No colors in JSON
    let document = json!({
      "version": version,
      "git_commit": GIT_HASH,
      "build_timestamp": format_timestamp(BUILD_TIMESTAMP),
      "target": TARGET,
      "rust_version": RUSTC_VERSION,
    });
    println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());
  } else {
    println!("{} {}", colors.emphasis("registry-auth"), colors.number(version));
    println!("{}: {}", colors.emphasis("Git commit"), colors.code(GIT_HASH));
    println!(
      "{}: {}",
      colors.emphasis("Built"),
      colors.dimmed(format_timestamp(BUILD_TIMESTAMP))
    );
    println!("{}: {}", colors.emphasis("Target"), TARGET);
    println!("{}: {}", colors.emphasis("Rust version"), RUSTC_VERSION);
  }
}

/// Convert the embedded build timestamp into a human-readable ISO-8601 string.
///
/// # Arguments
/// * `timestamp` - Unix epoch seconds encoded as a string.
///
/// # Returns
/// ISO-8601 UTC timestamp when parsing succeeds, otherwise the raw input.
fn format_timestamp(timestamp: &str) -> String {
  timestamp
    .parse::<i64>()
    .ok()
    .and_then(|ts| chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0))
    .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    .unwrap_or_else(|| timestamp.to_string())
}
