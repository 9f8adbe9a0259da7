//! Strongly typed credentials and related errors.
//!
//! These types are shared between the lookup sources, the auth file codec, and
//! the CLI so that callers can reason about usernames, identity tokens, and
//! failure modes consistently.

use std::fmt;
use std::path::PathBuf;

/// Credentials for a single registry host.
///
/// Either `username` and `password` are populated, or `identity_token` is.
/// An identity-token entry may still carry the username that was packed next
/// to it. Empty strings mean "unset"; [`Credential::default`] is the empty
/// result returned when nothing matches.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
  /// The registry username
  pub username: String,
  /// The registry password
  pub password: String,
  /// Opaque bearer token used in place of a password
  pub identity_token: String,
}

impl Credential {
  /// Creates a username/password credential.
  pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password: password.into(),
      identity_token: String::new(),
    }
  }

  /// Creates an identity-token credential.
  pub fn token(username: impl Into<String>, identity_token: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password: String::new(),
      identity_token: identity_token.into(),
    }
  }

  /// Returns `true` when no field carries a value.
  pub fn is_empty(&self) -> bool {
    self.username.is_empty() && self.password.is_empty() && self.identity_token.is_empty()
  }

  /// Returns `true` when this credential authenticates with an identity token.
  pub fn has_identity_token(&self) -> bool {
    !self.identity_token.is_empty()
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let redact = |value: &str| if value.is_empty() { "" } else { "[REDACTED]" };
    f.debug_struct("Credential")
      .field("username", &self.username)
      .field("password", &redact(&self.password))
      .field("identity_token", &redact(&self.identity_token))
      .finish()
  }
}

/// Layout of an auth file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFileFormat {
  /// `{"auths": {host: entry}, "credHelpers": {...}}`
  Modern,
  /// Flat `{host: entry}` map as written to `~/.dockercfg`
  Legacy,
}

impl AuthFileFormat {
  /// Returns `true` for the flat `.dockercfg` layout.
  pub fn is_legacy(self) -> bool {
    matches!(self, Self::Legacy)
  }
}

impl fmt::Display for AuthFileFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Modern => write!(f, "auth.json"),
      Self::Legacy => write!(f, "legacy .dockercfg"),
    }
  }
}

/// Errors that can occur during credential operations.
#[derive(Debug)]
pub enum CredentialError {
  /// `XDG_RUNTIME_DIR` points at a directory that does not exist
  RuntimeDirUnavailable(PathBuf),
  /// The home directory of the current user could not be determined
  HomeDirUnavailable,
  /// An auth file is not valid JSON of the expected shape
  Parse { path: PathBuf, source: serde_json::Error },
  /// The `auth` field of an entry is not valid base64
  InvalidAuth {
    registry: String,
    source: base64::DecodeError,
  },
  /// The decoded `auth` field of an entry is not valid UTF-8
  AuthNotUtf8 {
    registry: String,
    source: std::string::FromUtf8Error,
  },
  /// A `docker-credential-*` helper failed
  Helper { helper: String, message: String },
  /// The entry holds an identity token, which the caller cannot use
  IdentityTokenUnsupported(String),
  /// Writes to a legacy-format auth file are not supported
  LegacyWriteUnsupported(PathBuf),
  /// No stored credentials exist for the registry
  NotLoggedIn(String),
  /// An I/O error occurred while reading or writing credentials
  Io(std::io::Error),
}

impl CredentialError {
  /// Returns `true` when the error wraps a JSON syntax error.
  pub fn is_syntax_error(&self) -> bool {
    matches!(self, Self::Parse { source, .. } if source.is_syntax())
  }
}

impl fmt::Display for CredentialError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::RuntimeDirUnavailable(dir) => write!(
        f,
        "runtime directory {} does not exist (XDG_RUNTIME_DIR is set but the directory is missing)",
        dir.display()
      ),
      Self::HomeDirUnavailable => write!(f, "could not determine the home directory"),
      Self::Parse { path, source } => write!(f, "failed to parse {}: {source}", path.display()),
      Self::InvalidAuth { registry, source } => {
        write!(f, "invalid auth field for {registry}: {source}")
      }
      Self::AuthNotUtf8 { registry, source } => {
        write!(f, "decoded auth field for {registry} is not valid UTF-8: {source}")
      }
      Self::Helper { helper, message } => write!(f, "credential helper {helper} failed: {message}"),
      Self::IdentityTokenUnsupported(registry) => {
        write!(f, "credentials for {registry} use an identity token, not a username and password")
      }
      Self::LegacyWriteUnsupported(path) => {
        write!(f, "writes to {} using the legacy format are not supported", path.display())
      }
      Self::NotLoggedIn(registry) => write!(f, "not logged into {registry}"),
      Self::Io(err) => write!(f, "I/O error: {err}"),
    }
  }
}

impl std::error::Error for CredentialError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Parse { source, .. } => Some(source),
      Self::InvalidAuth { source, .. } => Some(source),
      Self::AuthNotUtf8 { source, .. } => Some(source),
      Self::Io(err) => Some(err),
      _ => None,
    }
  }
}

impl From<std::io::Error> for CredentialError {
  fn from(err: std::io::Error) -> Self {
    Self::Io(err)
  }
}

#[cfg(test)]
mod tests {
  use std::error::Error;

  use super::*;

  #[test]
  fn test_credential_equality() {
    let cred1 = Credential::basic("user", "pass");
    let cred2 = Credential::basic("user", "pass");
    let cred3 = Credential::basic("other", "pass");

    assert_eq!(cred1, cred2);
    assert_ne!(cred1, cred3);
  }

  #[test]
  fn test_default_credential_is_empty() {
    assert!(Credential::default().is_empty());
    assert!(!Credential::basic("user", "").is_empty());
    assert!(!Credential::token("", "tok").is_empty());
  }

  #[test]
  fn test_debug_redacts_secrets() {
    let cred = Credential::basic("user", "secret");
    let debug_str = format!("{cred:?}");
    assert!(debug_str.contains("user"));
    assert!(debug_str.contains("[REDACTED]"));
    assert!(!debug_str.contains("secret"));

    let token = Credential::token("", "some very long identity token");
    assert!(!format!("{token:?}").contains("some very long"));
  }

  #[test]
  fn test_identity_token_flag() {
    assert!(Credential::token("00000000-0000-0000-0000-000000000000", "tok").has_identity_token());
    assert!(!Credential::basic("user", "pass").has_identity_token());
  }

  #[test]
  fn test_credential_error_display() {
    let err = CredentialError::NotLoggedIn("quay.io".to_string());
    assert_eq!(err.to_string(), "not logged into quay.io");

    let err = CredentialError::RuntimeDirUnavailable(PathBuf::from("/run/user/1000"));
    assert!(err.to_string().contains("/run/user/1000"));

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err = CredentialError::Io(io_err);
    assert!(err.to_string().contains("I/O error"));
  }

  #[test]
  fn test_credential_error_source() {
    assert!(CredentialError::HomeDirUnavailable.source().is_none());

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    assert!(CredentialError::Io(io_err).source().is_some());

    let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
    let err = CredentialError::Parse {
      path: PathBuf::from("auth.json"),
      source: json_err,
    };
    assert!(err.source().is_some());
    assert!(err.is_syntax_error());
  }

  #[test]
  fn test_credential_error_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
    let cred_err: CredentialError = io_err.into();
    assert!(matches!(cred_err, CredentialError::Io(_)));
  }

  #[test]
  fn test_auth_file_format() {
    assert!(AuthFileFormat::Legacy.is_legacy());
    assert!(!AuthFileFormat::Modern.is_legacy());
  }
}
