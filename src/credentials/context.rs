//! Inputs that control where credentials are looked up.
//!
//! Every resolution function takes a [`ResolutionContext`] instead of reading
//! environment variables directly, so tests can point the resolver at
//! temporary directories and run in parallel.

use std::path::PathBuf;

use super::{Credential, CredentialError};

/// Operating system family, as far as default path selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
  /// Linux and every other Unix-like system that provides `/run`
  Linux,
  MacOs,
  Windows,
}

impl HostOs {
  /// Maps an OS identifier such as [`std::env::consts::OS`] (or a Go-style
  /// `darwin`) to its family.
  pub fn from_identifier(os: &str) -> Self {
    match os {
      "macos" | "darwin" | "ios" => Self::MacOs,
      "windows" => Self::Windows,
      _ => Self::Linux,
    }
  }

  /// The family of the running process.
  pub fn current() -> Self {
    Self::from_identifier(std::env::consts::OS)
  }

  /// Returns `true` for systems that use the `/run` based default paths.
  pub fn is_linux_family(self) -> bool {
    matches!(self, Self::Linux)
  }
}

/// Everything the resolver needs to know about its environment.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
  /// Modern-format auth file to use instead of the computed default
  pub auth_file_path: Option<PathBuf>,
  /// Legacy-format auth file to use instead of the computed default
  pub legacy_auth_file_path: Option<PathBuf>,
  /// Prefix for implicit absolute paths (`/run/containers/<uid>`)
  pub root_prefix: Option<PathBuf>,
  /// Value of `XDG_RUNTIME_DIR`, when set
  pub runtime_dir: Option<PathBuf>,
  /// Home directory of the current user
  pub home_dir: PathBuf,
  /// Operating system family used to pick default paths
  pub os: HostOs,
  /// Numeric user id used in `/run/containers/<uid>/auth.json`
  pub uid: u32,
  /// Credential that bypasses every file when set
  pub credential_override: Option<Credential>,
  /// Directory holding `docker-credential-*` programs; `PATH` is searched
  /// when unset
  pub helper_dir: Option<PathBuf>,
}

impl ResolutionContext {
  /// Creates a context rooted at `home_dir` with no overrides, no runtime
  /// directory, and the OS family of the running process.
  pub fn new(home_dir: impl Into<PathBuf>) -> Self {
    Self {
      auth_file_path: None,
      legacy_auth_file_path: None,
      root_prefix: None,
      runtime_dir: None,
      home_dir: home_dir.into(),
      os: HostOs::current(),
      uid: current_uid(),
      credential_override: None,
      helper_dir: None,
    }
  }

  /// Builds a context from the process environment.
  ///
  /// # Errors
  /// Returns [`CredentialError::HomeDirUnavailable`] when no home directory
  /// can be determined for the current user.
  pub fn from_env() -> Result<Self, CredentialError> {
    let home_dir = directories::BaseDirs::new()
      .map(|dirs| dirs.home_dir().to_path_buf())
      .ok_or(CredentialError::HomeDirUnavailable)?;

    let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR")
      .filter(|value| !value.is_empty())
      .map(PathBuf::from);

    Ok(Self {
      runtime_dir,
      ..Self::new(home_dir)
    })
  }

  pub fn with_auth_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.auth_file_path = Some(path.into());
    self
  }

  pub fn with_legacy_auth_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.legacy_auth_file_path = Some(path.into());
    self
  }

  pub fn with_root_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
    self.root_prefix = Some(prefix.into());
    self
  }

  pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.runtime_dir = Some(dir.into());
    self
  }

  pub fn with_os(mut self, os: HostOs) -> Self {
    self.os = os;
    self
  }

  pub fn with_uid(mut self, uid: u32) -> Self {
    self.uid = uid;
    self
  }

  pub fn with_credential_override(mut self, credential: Credential) -> Self {
    self.credential_override = Some(credential);
    self
  }

  pub fn with_helper_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.helper_dir = Some(dir.into());
    self
  }

  /// `~/.docker/config.json`
  pub fn docker_config_path(&self) -> PathBuf {
    self.home_dir.join(".docker").join("config.json")
  }

  /// `~/.dockercfg`
  pub fn legacy_docker_config_path(&self) -> PathBuf {
    self.home_dir.join(".dockercfg")
  }
}

#[cfg(unix)]
fn current_uid() -> u32 {
  // SAFETY: getuid has no preconditions and cannot fail.
  unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
  0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_host_os_from_identifier() {
    assert_eq!(HostOs::from_identifier("linux"), HostOs::Linux);
    assert_eq!(HostOs::from_identifier("freebsd"), HostOs::Linux);
    assert_eq!(HostOs::from_identifier("macos"), HostOs::MacOs);
    assert_eq!(HostOs::from_identifier("darwin"), HostOs::MacOs);
    assert_eq!(HostOs::from_identifier("windows"), HostOs::Windows);
  }

  #[test]
  fn test_linux_family() {
    assert!(HostOs::Linux.is_linux_family());
    assert!(!HostOs::MacOs.is_linux_family());
    assert!(!HostOs::Windows.is_linux_family());
  }

  #[test]
  fn test_new_context_has_no_overrides() {
    let ctx = ResolutionContext::new("/home/user");
    assert!(ctx.auth_file_path.is_none());
    assert!(ctx.legacy_auth_file_path.is_none());
    assert!(ctx.root_prefix.is_none());
    assert!(ctx.runtime_dir.is_none());
    assert!(ctx.credential_override.is_none());
    assert!(ctx.helper_dir.is_none());
    assert_eq!(ctx.home_dir, PathBuf::from("/home/user"));
  }

  #[cfg(unix)]
  #[test]
  fn test_current_uid_owns_new_files() {
    use std::os::unix::fs::MetadataExt;

    let file = tempfile::NamedTempFile::new().unwrap();
    assert_eq!(current_uid(), file.as_file().metadata().unwrap().uid());
  }

  #[test]
  fn test_docker_paths_follow_home() {
    let ctx = ResolutionContext::new("/home/user");
    assert_eq!(ctx.docker_config_path(), PathBuf::from("/home/user/.docker/config.json"));
    assert_eq!(ctx.legacy_docker_config_path(), PathBuf::from("/home/user/.dockercfg"));
  }

  #[test]
  fn test_builders_set_fields() {
    let ctx = ResolutionContext::new("/home/user")
      .with_auth_file("/tmp/auth.json")
      .with_legacy_auth_file("/tmp/dockercfg")
      .with_root_prefix("/prefix")
      .with_runtime_dir("/run/user/1000")
      .with_os(HostOs::Windows)
      .with_uid(1000)
      .with_credential_override(Credential::basic("foo", "bar"))
      .with_helper_dir("/opt/helpers");

    assert_eq!(ctx.auth_file_path, Some(PathBuf::from("/tmp/auth.json")));
    assert_eq!(ctx.legacy_auth_file_path, Some(PathBuf::from("/tmp/dockercfg")));
    assert_eq!(ctx.root_prefix, Some(PathBuf::from("/prefix")));
    assert_eq!(ctx.runtime_dir, Some(PathBuf::from("/run/user/1000")));
    assert_eq!(ctx.os, HostOs::Windows);
    assert_eq!(ctx.uid, 1000);
    assert_eq!(ctx.credential_override, Some(Credential::basic("foo", "bar")));
    assert_eq!(ctx.helper_dir, Some(PathBuf::from("/opt/helpers")));
  }
}
