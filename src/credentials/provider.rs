//! Credential provider abstractions.
//!
//! Defines the [`CredentialsProvider`] trait so the lookup chain (in-memory
//! override, primary auth file, `~/.docker/config.json`, `~/.dockercfg`) is a
//! list of interchangeable sources evaluated in order.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::auth_file::{AuthFile, read_auth_file};
use super::helper::CredentialHelper;
use super::normalize::find_entry;
use super::{AuthFileFormat, Credential, CredentialError};

/// Where a resolved credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
  /// Supplied directly by the caller
  Override,
  /// Read from an auth file (or a helper that file delegates to)
  File { path: PathBuf, format: AuthFileFormat },
}

impl fmt::Display for CredentialSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Override => write!(f, "in-memory override"),
      Self::File { path, format } => write!(f, "{} ({format})", path.display()),
    }
  }
}

/// A provider for retrieving credentials.
///
/// This trait allows different credential sources to be used interchangeably.
pub trait CredentialsProvider {
  /// Describes this provider for diagnostics.
  fn source(&self) -> CredentialSource;

  /// Retrieves credentials for the specified registry.
  ///
  /// # Arguments
  /// * `registry` - Registry reference as supplied by the caller (e.g., `quay.io` or `https://index.docker.io/v1/`).
  ///
  /// # Returns
  /// * `Ok(Some(Credential))` when the provider holds usable credentials for the registry.
  /// * `Ok(None)` when the provider has no entry for the registry, allowing fallback providers to run.
  ///
  /// # Errors
  /// Returns `Err(CredentialError)` when the source exists but cannot be read
  /// or parsed. Callers stop at the first error.
  fn get_credentials(&self, registry: &str) -> Result<Option<Credential>, CredentialError>;
}

/// A credential supplied by the caller that bypasses every file.
#[derive(Debug)]
pub struct OverrideProvider {
  credential: Credential,
}

impl OverrideProvider {
  pub fn new(credential: Credential) -> Self {
    Self { credential }
  }
}

impl CredentialsProvider for OverrideProvider {
  fn source(&self) -> CredentialSource {
    CredentialSource::Override
  }

  fn get_credentials(&self, _registry: &str) -> Result<Option<Credential>, CredentialError> {
    Ok(Some(self.credential.clone()))
  }
}

/// A credentials provider that reads one auth file.
#[derive(Debug)]
pub struct AuthFileProvider {
  path: PathBuf,
  format: AuthFileFormat,
  helper_dir: Option<PathBuf>,
}

impl AuthFileProvider {
  /// Creates a provider for the auth file at `path`.
  pub fn new(path: impl Into<PathBuf>, format: AuthFileFormat) -> Self {
    Self {
      path: path.into(),
      format,
      helper_dir: None,
    }
  }

  /// Runs credential helpers from `dir` instead of searching `PATH`.
  pub fn with_helper_dir(mut self, dir: Option<PathBuf>) -> Self {
    self.helper_dir = dir;
    self
  }
}

impl CredentialsProvider for AuthFileProvider {
  fn source(&self) -> CredentialSource {
    CredentialSource::File {
      path: self.path.clone(),
      format: self.format,
    }
  }

  /// Resolve credentials for `registry` from the file.
  ///
  /// A `credHelpers` entry matching `registry` is consulted before `auths`.
  /// Entries that decode to neither a username/password pair nor an identity
  /// token count as missing.
  fn get_credentials(&self, registry: &str) -> Result<Option<Credential>, CredentialError> {
    debug!(path = %self.path.display(), format = %self.format, registry, "checking auth file");

    let Some(file) = read_auth_file(&self.path, self.format)? else {
      return Ok(None);
    };

    lookup_in_file(&file, registry, self.helper_dir.as_deref())
  }
}

/// Find usable credentials for `registry` in an already parsed file.
///
/// `credHelpers` and `auths` keys are matched the same way, so a helper
/// configured for `gcr.io` also serves `https://gcr.io/v2/`. The helper is
/// asked for the key it is configured under.
pub(crate) fn lookup_in_file(
  file: &AuthFile,
  registry: &str,
  helper_dir: Option<&Path>,
) -> Result<Option<Credential>, CredentialError> {
  if let Some((key, helper)) = find_entry(&file.cred_helpers, registry) {
    return CredentialHelper::locate(helper, helper_dir).get(key);
  }

  let Some((key, entry)) = find_entry(&file.auths, registry) else {
    return Ok(None);
  };

  let credential = entry.to_credential(key)?;
  if is_usable(&credential) {
    Ok(Some(credential))
  } else {
    debug!(key, "auth entry carries no usable credentials");
    Ok(None)
  }
}

fn is_usable(credential: &Credential) -> bool {
  (!credential.username.is_empty() && !credential.password.is_empty()) || credential.has_identity_token()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn test_override_provider_ignores_registry() {
    let provider = OverrideProvider::new(Credential::basic("foo", "bar"));
    assert_eq!(provider.source(), CredentialSource::Override);
    assert_eq!(
      provider.get_credentials("anything").unwrap(),
      Some(Credential::basic("foo", "bar"))
    );
  }

  #[test]
  fn test_file_provider_missing_file() {
    let dir = TempDir::new().unwrap();
    let provider = AuthFileProvider::new(dir.path().join("auth.json"), AuthFileFormat::Modern);
    assert!(provider.get_credentials("example.org").unwrap().is_none());
  }

  #[test]
  fn test_file_provider_match_and_miss() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "auth.json", r#"{"auths":{"example.org":{"auth":"ZXhhbXBsZTpvcmc="}}}"#);
    let provider = AuthFileProvider::new(path, AuthFileFormat::Modern);

    assert_eq!(
      provider.get_credentials("example.org").unwrap(),
      Some(Credential::basic("example", "org"))
    );
    assert!(provider.get_credentials("registry.example.org").unwrap().is_none());
  }

  #[test]
  fn test_file_provider_legacy_layout() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, ".dockercfg", r#"{"docker.io":{"auth":"ZG9ja2VyOmlvLWxlZ2FjeQ=="}}"#);
    let provider = AuthFileProvider::new(path, AuthFileFormat::Legacy);

    assert_eq!(
      provider.get_credentials("https://docker.io/v1").unwrap(),
      Some(Credential::basic("docker", "io-legacy"))
    );
  }

  #[test]
  fn test_modern_file_read_as_legacy_finds_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "auth.json", r#"{"auths":{"example.org":{"auth":"ZXhhbXBsZTpvcmc="}}}"#);
    let provider = AuthFileProvider::new(path, AuthFileFormat::Legacy);

    assert!(provider.get_credentials("example.org").unwrap().is_none());
  }

  #[test]
  fn test_unusable_entry_is_skipped() {
    let dir = TempDir::new().unwrap();
    // "user:" has no password and no identity token
    let path = write(&dir, "auth.json", r#"{"auths":{"example.org":{"auth":"dXNlcjo="}}}"#);
    let provider = AuthFileProvider::new(path, AuthFileFormat::Modern);

    assert!(provider.get_credentials("example.org").unwrap().is_none());
  }

  #[test]
  fn test_cred_helper_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let path = write(
      &dir,
      "auth.json",
      r#"{"auths":{"example.org":{"auth":"ZXhhbXBsZTpvcmc="}},"credHelpers":{"example.org":"registry-auth-test-missing"}}"#,
    );
    let provider = AuthFileProvider::new(path, AuthFileFormat::Modern);

    let err = provider.get_credentials("example.org").unwrap_err();
    assert!(matches!(err, CredentialError::Helper { .. }));
  }

  #[cfg(unix)]
  #[test]
  fn test_cred_helper_matches_normalized_registry() {
    let dir = TempDir::new().unwrap();
    crate::credentials::helper::script::install(dir.path(), "test");
    let path = write(&dir, "auth.json", r#"{"credHelpers":{"gcr.io":"test"}}"#);
    let provider = AuthFileProvider::new(path, AuthFileFormat::Modern).with_helper_dir(Some(dir.path().to_path_buf()));

    for registry in ["gcr.io", "https://gcr.io/v2/", "http://gcr.io"] {
      assert_eq!(
        provider.get_credentials(registry).unwrap(),
        Some(Credential::basic("helper-user", "helper-pass")),
        "{registry}"
      );
    }
  }

  #[test]
  fn test_source_display() {
    let source = CredentialSource::File {
      path: PathBuf::from("/run/containers/0/auth.json"),
      format: AuthFileFormat::Modern,
    };
    assert_eq!(source.to_string(), "/run/containers/0/auth.json (auth.json)");
    assert_eq!(CredentialSource::Override.to_string(), "in-memory override");
  }
}
