//! Credential subcommand handlers.
//!
//! Covers `registry-auth get`, which resolves credentials through the full
//! lookup chain, `login`/`logout`, which edit the primary auth file, and
//! `path`, which reports where that file lives.

use std::io::{self, BufRead};
use std::process;

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::credentials::{self, Credential, CredentialError, ResolvedCredential, auth_file_path, normalize_registry};

/// Print the credentials resolved for `registry`.
///
/// Exits with status 2 when no source holds credentials for the registry and
/// with status 1 when resolution itself fails.
///
/// # Arguments
/// * `registry` - Registry reference as typed by the user.
/// * `json` - Emit a JSON document instead of colored text.
/// * `show_secret` - Print secrets verbatim instead of masking them.
/// * `cli` - Parsed CLI settings containing the auth file options.
/// * `colors` - Shared color scheme used to render output consistently.
pub(crate) fn handle_get_command(registry: &str, json: bool, show_secret: bool, cli: &Cli, colors: &ColorScheme) {
  let resolved = match resolve(registry, cli) {
    Ok(Some(resolved)) => resolved,
    Ok(None) => {
      eprintln!(
        "{} No credentials found for {}",
        colors.warning("⚠"),
        colors.emphasis(normalize_registry(registry))
      );
      eprintln!(
        "\n{}",
        colors.dimmed("Run 'registry-auth path' to see which auth file is consulted first")
      );
      process::exit(2);
    }
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to resolve credentials"));
      eprintln!("  {e:#}");
      process::exit(1);
    }
  };

  let credential = &resolved.credential;
  let reveal = |secret: &str| {
    if show_secret {
      secret.to_string()
    } else {
      mask_secret(secret)
    }
  };

  if json {
    let mut document = json!({
      "registry": normalize_registry(registry),
      "username": credential.username,
      "source": resolved.source.to_string(),
    });
    if credential.has_identity_token() {
      document["identitytoken"] = json!(reveal(&credential.identity_token));
    } else {
      document["password"] = json!(reveal(&credential.password));
    }
    println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());
    return;
  }

  println!(
    "{}: {}",
    colors.emphasis("Registry"),
    colors.link(normalize_registry(registry))
  );
  if !credential.username.is_empty() {
    println!("{}: {}", colors.emphasis("Username"), credential.username);
  }
  if credential.has_identity_token() {
    println!(
      "{}: {}",
      colors.emphasis("Identity token"),
      colors.dimmed(reveal(&credential.identity_token))
    );
  } else {
    println!(
      "{}: {}",
      colors.emphasis("Password"),
      colors.dimmed(reveal(&credential.password))
    );
    if !show_secret {
      println!(
        "  {}: {} characters",
        colors.dimmed("Length"),
        colors.number(credential.password.chars().count())
      );
    }
  }
  println!(
    "{}: {}",
    colors.dimmed("Source"),
    colors.path(&resolved.source)
  );
}

/// Print the primary auth file location and its format.
pub(crate) fn handle_path_command(cli: &Cli, colors: &ColorScheme) {
  let result = cli
    .resolution_context()
    .and_then(|ctx| auth_file_path(&ctx))
    .context("Failed to resolve the auth file path");

  match result {
    Ok((path, format)) => {
      println!("{}", colors.path(path.display()));
      if !path.exists() {
        eprintln!("  {}", colors.dimmed(format!("{format}, not created yet")));
      } else {
        eprintln!("  {}", colors.dimmed(format));
      }
    }
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("✗"));
      process::exit(1);
    }
  }
}

/// Store credentials for `registry` in the primary auth file.
///
/// # Arguments
/// * `registry` - Registry reference as typed by the user.
/// * `username` - Username to store.
/// * `password` - Password from `--password`, if given.
/// * `password_stdin` - Read the password from the first line of stdin.
/// * `cli` - Parsed CLI settings containing the auth file options.
/// * `colors` - Shared color scheme used to render output consistently.
pub(crate) fn handle_login_command(
  registry: &str,
  username: &str,
  password: Option<&str>,
  password_stdin: bool,
  cli: &Cli,
  colors: &ColorScheme,
) {
  let result = read_password(password, password_stdin).and_then(|password| {
    let ctx = cli.resolution_context()?;
    credentials::set_credential(&ctx, registry, &Credential::basic(username, password))
      .with_context(|| format!("Failed to store credentials for {registry}"))
  });

  match result {
    Ok(()) => {
      println!(
        "{} Login succeeded for {}",
        colors.success("✓"),
        colors.emphasis(normalize_registry(registry))
      );
    }
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("✗"));
      process::exit(1);
    }
  }
}

/// Remove credentials for one registry, or for all of them with `--all`.
pub(crate) fn handle_logout_command(registry: Option<&str>, all: bool, cli: &Cli, colors: &ColorScheme) {
  let result = cli
    .resolution_context()
    .map_err(anyhow::Error::from)
    .and_then(|ctx| match registry {
      Some(registry) if !all => credentials::remove_authentication(&ctx, registry).map_err(|err| match err {
        CredentialError::NotLoggedIn(_) => anyhow::Error::from(err),
        other => anyhow::Error::from(other).context(format!("Failed to remove credentials for {registry}")),
      }),
      _ => credentials::remove_all_authentication(&ctx).context("Failed to remove credentials"),
    });

  match (result, registry) {
    (Ok(()), Some(registry)) if !all => {
      println!(
        "{} Removed login credentials for {}",
        colors.success("✓"),
        colors.emphasis(normalize_registry(registry))
      );
    }
    (Ok(()), _) => {
      println!("{} Removed login credentials for all registries", colors.success("✓"));
    }
    (Err(e), _) => {
      eprintln!("{} {e:#}", colors.error("✗"));
      process::exit(1);
    }
  }
}

fn resolve(registry: &str, cli: &Cli) -> Result<Option<ResolvedCredential>> {
  let ctx = cli.resolution_context()?;
  credentials::lookup(&ctx, registry).with_context(|| format!("Failed to look up {registry}"))
}

fn read_password(password: Option<&str>, password_stdin: bool) -> Result<String> {
  if !password_stdin {
    return match password {
      Some(password) => Ok(password.to_string()),
      None => bail!("no password given"),
    };
  }

  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("Failed to read password from stdin")?;
  let password = line.trim_end_matches(['\r', '\n']);
  if password.is_empty() {
    bail!("password read from stdin is empty");
  }
  Ok(password.to_string())
}

/// Mask a secret, keeping the first four characters of long values.
pub(crate) fn mask_secret(secret: &str) -> String {
  let len = secret.chars().count();
  if len > 8 {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}{}", "*".repeat(len - 4))
  } else {
    "*".repeat(len)
  }
}
