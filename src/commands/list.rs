//! `registry-auth list`: enumerate the primary auth file.

use std::process;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use super::auth::mask_secret;
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::credentials::{self, Credential, auth_file_path};

/// Print every credential stored in the primary auth file.
///
/// Secrets are always masked. JSON output maps each stored key to its
/// username and whether it uses an identity token.
pub(crate) fn handle_list_command(json: bool, cli: &Cli, colors: &ColorScheme) {
  let (path, entries) = match load(cli) {
    Ok(loaded) => loaded,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("✗"));
      process::exit(1);
    }
  };

  if json {
    let document: Map<String, Value> = entries
      .iter()
      .map(|(registry, credential)| {
        let value = json!({
          "username": credential.username,
          "identitytoken": credential.has_identity_token(),
        });
        (registry.clone(), value)
      })
      .collect();
    println!(
      "{}",
      serde_json::to_string_pretty(&Value::Object(document)).unwrap_or_default()
    );
    return;
  }

  println!("{}: {}", colors.emphasis("Auth file"), colors.path(path));
  if entries.is_empty() {
    println!("\n{}", colors.dimmed("(no stored credentials)"));
    return;
  }

  println!();
  for (registry, credential) in &entries {
    let secret = if credential.has_identity_token() {
      format!("identity token {}", mask_secret(&credential.identity_token))
    } else {
      mask_secret(&credential.password)
    };
    println!(
      "  {} {} {}",
      colors.link(registry),
      credential.username,
      colors.dimmed(secret)
    );
  }
  println!(
    "\n{} {} registries",
    colors.info("ℹ"),
    colors.number(entries.len())
  );
}

fn load(cli: &Cli) -> Result<(String, Vec<(String, Credential)>)> {
  let ctx = cli.resolution_context()?;
  let (path, _) = auth_file_path(&ctx)?;
  let entries = credentials::get_all_credentials(&ctx)
    .with_context(|| format!("Failed to read {}", path.display()))?;
  Ok((path.display().to_string(), entries.into_iter().collect()))
}
