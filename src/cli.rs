//! Command-line interface definitions for registry-auth.
//!
//! This module defines the CLI structure using clap derives and dispatches
//! each subcommand to its handler in [`crate::commands`].

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::completions::handle_completions_command;
use crate::commands::auth::{handle_get_command, handle_login_command, handle_logout_command, handle_path_command};
use crate::commands::list::handle_list_command;
use crate::commands::version::handle_version_command;
use crate::credentials::{CredentialError, ResolutionContext};

/// registry-auth - Manage container registry credentials
#[derive(Debug, Parser)]
#[command(
  name = "registry-auth",
  version,
  about = "Resolve and manage container registry credentials",
  long_about = "Reads and writes registry logins stored in containers auth.json files, \
                ~/.docker/config.json, and the legacy ~/.dockercfg.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Auth file location options
  #[command(flatten)]
  pub auth_file: AuthFileOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Print the credentials resolved for a registry
  Get {
    /// Registry host or URL (e.g. quay.io, https://index.docker.io/v1/)
    #[arg(value_name = "REGISTRY")]
    registry: String,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Print the password and identity token instead of masking them
    #[arg(long)]
    show_secret: bool,
  },

  /// Store credentials for a registry in the auth file
  Login {
    /// Registry host or URL
    #[arg(value_name = "REGISTRY")]
    registry: String,

    /// Registry username
    #[arg(short, long, value_name = "USER")]
    username: String,

    /// Registry password
    #[arg(short, long, value_name = "PASSWORD", conflicts_with = "password_stdin")]
    password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    password_stdin: bool,
  },

  /// Remove stored credentials
  Logout {
    /// Registry host or URL
    #[arg(value_name = "REGISTRY", conflicts_with = "all")]
    registry: Option<String>,

    /// Remove credentials for every registry
    #[arg(short, long)]
    all: bool,
  },

  /// List every credential in the auth file
  List {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Print the location of the auth file
  Path,

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Auth file location options
#[derive(Debug, Parser)]
pub struct AuthFileOptions {
  /// Path of the auth file to use instead of the default location
  #[arg(long, global = true, env = "REGISTRY_AUTH_FILE", value_name = "PATH")]
  pub authfile: Option<PathBuf>,

  /// Path of a legacy .dockercfg-format file to use as the auth file (read-only)
  #[arg(long, global = true, value_name = "PATH")]
  pub legacy_authfile: Option<PathBuf>,

  /// Root directory prefixed to the implicit /run/containers path
  #[arg(long, global = true, value_name = "DIR")]
  pub root: Option<PathBuf>,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

/// Shells supported by `completions`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    match &self.command {
      Command::Get { registry, .. } | Command::Login { registry, .. } if registry.trim().is_empty() => {
        return Err("REGISTRY must not be empty".to_string());
      }
      Command::Login {
        password,
        password_stdin,
        ..
      } if password.is_none() && !password_stdin => {
        return Err("login requires --password or --password-stdin".to_string());
      }
      Command::Logout { registry: None, all: false } => {
        return Err("logout requires a REGISTRY or --all".to_string());
      }
      _ => {}
    }

    Ok(())
  }

  /// Build the resolution context from the environment and the auth file
  /// flags.
  pub fn resolution_context(&self) -> Result<ResolutionContext, CredentialError> {
    let mut ctx = ResolutionContext::from_env()?;
    ctx.auth_file_path = self.auth_file.authfile.clone();
    ctx.legacy_auth_file_path = self.auth_file.legacy_authfile.clone();
    ctx.root_prefix = self.auth_file.root.clone();
    Ok(ctx)
  }
}

/// Parse CLI arguments, initialize tracing, and dispatch to the chosen
/// command.
pub fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  // Create color scheme based on user preference
  let colors = ColorScheme::new(cli.behavior.color);

  // Validate CLI arguments
  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Get {
      registry,
      json,
      show_secret,
    } => {
      handle_get_command(registry, *json, *show_secret, &cli, &colors);
    }
    Command::Login {
      registry,
      username,
      password,
      password_stdin,
    } => {
      handle_login_command(registry, username, password.as_deref(), *password_stdin, &cli, &colors);
    }
    Command::Logout { registry, all } => {
      handle_logout_command(registry.as_deref(), *all, &cli, &colors);
    }
    Command::List { json } => {
      handle_list_command(*json, &cli, &colors);
    }
    Command::Path => {
      handle_path_command(&cli, &colors);
    }
    Command::Version { json, short } => {
      handle_version_command(*json, *short, &colors);
    }
    Command::Completions { shell } => {
      handle_completions_command(*shell);
    }
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["registry-auth"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
  }

  #[test]
  fn test_cli_definition_is_valid() {
    use clap::CommandFactory;

    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_get() {
    let cli = parse(&["get", "quay.io", "--json"]);
    match cli.command {
      Command::Get {
        registry,
        json,
        show_secret,
      } => {
        assert_eq!(registry, "quay.io");
        assert!(json);
        assert!(!show_secret);
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn test_global_authfile_after_subcommand() {
    let cli = parse(&["list", "--authfile", "/tmp/auth.json", "--root", "/prefix"]);
    assert_eq!(cli.auth_file.authfile, Some(PathBuf::from("/tmp/auth.json")));
    assert_eq!(cli.auth_file.root, Some(PathBuf::from("/prefix")));
  }

  #[test]
  fn test_login_password_conflicts_with_stdin() {
    let result = Cli::try_parse_from([
      "registry-auth",
      "login",
      "quay.io",
      "-u",
      "user",
      "-p",
      "pass",
      "--password-stdin",
    ]);
    assert!(result.is_err());
  }

  #[test]
  fn test_validation_login_requires_password() {
    let cli = parse(&["login", "quay.io", "-u", "user"]);
    let result = cli.validate();
    assert!(result.unwrap_err().contains("--password or --password-stdin"));

    let cli = parse(&["login", "quay.io", "-u", "user", "--password-stdin"]);
    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_validation_logout_requires_target() {
    let cli = parse(&["logout"]);
    assert!(cli.validate().unwrap_err().contains("REGISTRY or --all"));

    assert!(parse(&["logout", "--all"]).validate().is_ok());
    assert!(parse(&["logout", "quay.io"]).validate().is_ok());
  }

  #[test]
  fn test_logout_registry_conflicts_with_all() {
    assert!(Cli::try_parse_from(["registry-auth", "logout", "quay.io", "--all"]).is_err());
  }

  #[test]
  fn test_validation_rejects_empty_registry() {
    let cli = parse(&["get", " "]);
    assert!(cli.validate().unwrap_err().contains("must not be empty"));
  }

  #[test]
  fn test_verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["registry-auth", "-v", "-q", "path"]).is_err());
  }
}
