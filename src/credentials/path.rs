//! Location of the primary auth file.
//!
//! The primary file is the one credentials are written to and the first one
//! consulted on lookup. Its location depends on caller overrides, the
//! operating system, and whether a per-session runtime directory exists.

use std::path::{Path, PathBuf};

use tracing::trace;

use super::{AuthFileFormat, CredentialError, ResolutionContext};

/// Relative location of `auth.json` below `XDG_RUNTIME_DIR`.
const RUNTIME_DIR_AUTH_FILE: &str = "containers/auth.json";
/// Relative location of `auth.json` below the home directory on macOS and
/// Windows.
const NON_LINUX_AUTH_FILE: &str = ".config/containers/auth.json";

/// Resolve the primary auth file and the format it is stored in.
///
/// Precedence, first match wins:
/// 1. the legacy-format override,
/// 2. the modern-format override,
/// 3. on Linux, `$XDG_RUNTIME_DIR/containers/auth.json` when the runtime
///    directory is set, otherwise `<root>/run/containers/<uid>/auth.json`,
/// 4. elsewhere, `$HOME/.config/containers/auth.json`.
///
/// The path is returned whether or not a file exists there.
///
/// # Errors
/// Returns [`CredentialError::RuntimeDirUnavailable`] when the runtime
/// directory is set on Linux but does not exist.
pub fn auth_file_path(ctx: &ResolutionContext) -> Result<(PathBuf, AuthFileFormat), CredentialError> {
  if let Some(path) = &ctx.legacy_auth_file_path {
    trace!(path = %path.display(), "using legacy auth file override");
    return Ok((path.clone(), AuthFileFormat::Legacy));
  }

  if let Some(path) = &ctx.auth_file_path {
    trace!(path = %path.display(), "using auth file override");
    return Ok((path.clone(), AuthFileFormat::Modern));
  }

  if !ctx.os.is_linux_family() {
    return Ok((ctx.home_dir.join(NON_LINUX_AUTH_FILE), AuthFileFormat::Modern));
  }

  if let Some(runtime_dir) = &ctx.runtime_dir {
    if !runtime_dir.exists() {
      return Err(CredentialError::RuntimeDirUnavailable(runtime_dir.clone()));
    }
    return Ok((runtime_dir.join(RUNTIME_DIR_AUTH_FILE), AuthFileFormat::Modern));
  }

  Ok((per_uid_path(ctx.root_prefix.as_deref(), ctx.uid), AuthFileFormat::Modern))
}

/// `<root>/run/containers/<uid>/auth.json`
fn per_uid_path(root_prefix: Option<&Path>, uid: u32) -> PathBuf {
  let relative = PathBuf::from("run")
    .join("containers")
    .join(uid.to_string())
    .join("auth.json");

  match root_prefix {
    Some(root) => root.join(relative),
    None => Path::new("/").join(relative),
  }
}
