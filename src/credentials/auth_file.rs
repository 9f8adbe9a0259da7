//! On-disk auth file format.
//!
//! Two layouts exist:
//!
//! ```text
//! modern (auth.json, ~/.docker/config.json):
//!   {"auths": {"quay.io": {"auth": "<base64 user:pass>", "identitytoken": "..."}},
//!    "credHelpers": {"gcr.io": "gcloud"}}
//!
//! legacy (~/.dockercfg):
//!   {"quay.io": {"auth": "<base64 user:pass>"}}
//! ```
//!
//! The base64 packing of `auth` is decoded here and never leaves this module;
//! the rest of the crate works with [`Credential`] values.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use super::{AuthFileFormat, Credential, CredentialError};

/// Contents of a modern auth file.
///
/// Unknown top-level keys (`credsStore`, `HttpHeaders`, ...) are kept in
/// `extra` so rewriting the file does not drop settings owned by other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthFile {
  #[serde(default)]
  pub auths: BTreeMap<String, AuthEntry>,
  #[serde(rename = "credHelpers", default, skip_serializing_if = "BTreeMap::is_empty")]
  pub cred_helpers: BTreeMap<String, String>,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One registry entry of an auth file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthEntry {
  /// Base64 of `username:password`
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub auth: String,
  #[serde(rename = "identitytoken", default, skip_serializing_if = "String::is_empty")]
  pub identity_token: String,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthEntry {
  /// Packs a credential into its on-disk form.
  pub fn from_credential(credential: &Credential) -> Self {
    Self {
      auth: encode_auth(&credential.username, &credential.password),
      identity_token: credential.identity_token.clone(),
      extra: serde_json::Map::new(),
    }
  }

  /// Unpacks the entry stored under `registry`.
  ///
  /// A decoded `auth` value without a `:` separator carries no username or
  /// password and is ignored, leaving only the identity token (if any).
  ///
  /// # Errors
  /// Returns [`CredentialError::InvalidAuth`] when `auth` is not valid base64
  /// and [`CredentialError::AuthNotUtf8`] when the decoded bytes are not UTF-8.
  pub fn to_credential(&self, registry: &str) -> Result<Credential, CredentialError> {
    let decoded = STANDARD
      .decode(self.auth.trim())
      .map_err(|source| CredentialError::InvalidAuth {
        registry: registry.to_string(),
        source,
      })?;
    let decoded = String::from_utf8(decoded).map_err(|source| CredentialError::AuthNotUtf8 {
      registry: registry.to_string(),
      source,
    })?;

    let mut credential = match decoded.split_once(':') {
      Some((username, password)) => Credential::basic(username, password.trim_matches('\0')),
      None => Credential::default(),
    };
    credential.identity_token = self.identity_token.clone();
    Ok(credential)
  }
}

/// Base64 of `username:password`, as stored in the `auth` field.
pub fn encode_auth(username: &str, password: &str) -> String {
  if username.is_empty() && password.is_empty() {
    return String::new();
  }
  STANDARD.encode(format!("{username}:{password}"))
}

/// Read and parse an auth file.
///
/// Legacy files are lifted into an [`AuthFile`] whose `auths` holds the flat
/// map, so callers handle both layouts the same way.
///
/// # Returns
/// * `Ok(Some(AuthFile))` when the file exists and parses.
/// * `Ok(None)` when there is no file at `path`.
///
/// # Errors
/// Returns [`CredentialError::Parse`] for malformed content and
/// [`CredentialError::Io`] when the file exists but cannot be read.
pub fn read_auth_file(path: &Path, format: AuthFileFormat) -> Result<Option<AuthFile>, CredentialError> {
  let content = match fs::read(path) {
    Ok(content) => content,
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "auth file does not exist");
      return Ok(None);
    }
    Err(err) => return Err(err.into()),
  };

  let parse_error = |source| CredentialError::Parse {
    path: path.to_path_buf(),
    source,
  };

  let file = match format {
    AuthFileFormat::Modern => serde_json::from_slice::<AuthFile>(&content).map_err(parse_error)?,
    AuthFileFormat::Legacy => AuthFile {
      auths: serde_json::from_slice(&content).map_err(parse_error)?,
      ..AuthFile::default()
    },
  };

  debug!(
    path = %path.display(),
    entries = file.auths.len(),
    helpers = file.cred_helpers.len(),
    "loaded auth file"
  );
  Ok(Some(file))
}

/// Serialize an auth file with tab indentation, the layout container tools
/// write.
pub fn to_json(file: &AuthFile) -> Result<Vec<u8>, serde_json::Error> {
  let mut buffer = Vec::new();
  let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));
  file.serialize(&mut serializer)?;
  buffer.push(b'\n');
  Ok(buffer)
}

/// Write `file` to `path`, creating parent directories as needed.
///
/// Content goes to a temporary file in the same directory that is renamed over
/// `path`, so concurrent readers see either the old or the new file. On Unix
/// the directory is created `0700` and the file ends up `0600`.
///
/// # Errors
/// Returns [`CredentialError::Io`] for any filesystem failure.
pub fn write_auth_file(path: &Path, file: &AuthFile) -> Result<(), CredentialError> {
  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  create_private_dir(parent)?;

  let data = to_json(file).map_err(io::Error::from)?;

  let mut tmp = tempfile::Builder::new()
    .prefix(".auth.json")
    .tempfile_in(parent)?;
  tmp.write_all(&data)?;
  tmp.as_file().sync_all()?;
  tmp.persist(path).map_err(|err| err.error)?;

  debug!(path = %path.display(), entries = file.auths.len(), "wrote auth file");
  Ok(())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
  use std::os::unix::fs::DirBuilderExt;

  fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
  fs::create_dir_all(dir)
}
