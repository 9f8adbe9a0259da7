//! External credential helpers.
//!
//! An auth file may delegate a registry to a helper via
//! `"credHelpers": {"gcr.io": "gcloud"}`. The helper is the program
//! `docker-credential-<name>`, spoken to over stdin/stdout:
//!
//! - `get`: stdin is the server URL, stdout is
//!   `{"ServerURL": ..., "Username": ..., "Secret": ...}`
//! - `store`: stdin is that same JSON document
//! - `erase`: stdin is the server URL
//!
//! A `Username` of `<token>` marks the secret as an identity token.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Credential, CredentialError};

/// Prefix of every helper program name.
const HELPER_PREFIX: &str = "docker-credential-";
/// Username a helper reports for identity tokens.
const TOKEN_USERNAME: &str = "<token>";
/// Message helpers print when they hold no entry for a server.
const NOT_FOUND_MESSAGE: &str = "credentials not found in native keychain";

/// Wire form of a helper credential.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HelperCredential {
  #[serde(rename = "ServerURL", default)]
  server_url: String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  secret: String,
}

/// A `docker-credential-*` program.
#[derive(Debug, Clone)]
pub struct CredentialHelper {
  name: String,
  program: PathBuf,
}

impl CredentialHelper {
  /// The helper configured as `name` in `credHelpers`, found on `PATH`.
  pub fn named(name: &str) -> Self {
    Self {
      name: name.to_string(),
      program: PathBuf::from(format!("{HELPER_PREFIX}{name}")),
    }
  }

  /// The helper configured as `name`, taken from `dir` when given and from
  /// `PATH` otherwise.
  pub fn locate(name: &str, dir: Option<&Path>) -> Self {
    match dir {
      Some(dir) => Self::at(name, dir.join(format!("{HELPER_PREFIX}{name}"))),
      None => Self::named(name),
    }
  }

  /// A helper at an explicit program path.
  pub fn at(name: &str, program: impl Into<PathBuf>) -> Self {
    Self {
      name: name.to_string(),
      program: program.into(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Ask the helper for the credentials of `registry`.
  ///
  /// # Returns
  /// * `Ok(Some(Credential))` when the helper holds an entry.
  /// * `Ok(None)` when the helper reports that no entry exists.
  ///
  /// # Errors
  /// Returns [`CredentialError::Helper`] when the program cannot be run, fails
  /// for another reason, or prints something that is not a credential.
  pub fn get(&self, registry: &str) -> Result<Option<Credential>, CredentialError> {
    match self.run("get", registry.as_bytes())? {
      HelperOutput::NotFound => Ok(None),
      HelperOutput::Success(stdout) => {
        let response: HelperCredential = serde_json::from_slice(&stdout).map_err(|err| self.error(err))?;
        Ok(Some(credential_from_helper(response)))
      }
    }
  }

  /// Store `credential` for `registry` in the helper.
  pub fn store(&self, registry: &str, credential: &Credential) -> Result<(), CredentialError> {
    let request = helper_from_credential(registry, credential);
    let input = serde_json::to_vec(&request).map_err(|err| self.error(err))?;
    match self.run("store", &input)? {
      HelperOutput::Success(_) => Ok(()),
      HelperOutput::NotFound => Err(self.error(NOT_FOUND_MESSAGE)),
    }
  }

  /// Remove the entry for `registry` from the helper.
  ///
  /// # Returns
  /// `Ok(true)` when an entry was erased, `Ok(false)` when none existed.
  pub fn erase(&self, registry: &str) -> Result<bool, CredentialError> {
    match self.run("erase", registry.as_bytes())? {
      HelperOutput::Success(_) => Ok(true),
      HelperOutput::NotFound => Ok(false),
    }
  }

  fn run(&self, action: &str, input: &[u8]) -> Result<HelperOutput, CredentialError> {
    debug!(helper = %self.name, action, "invoking credential helper");

    let mut child = Command::new(&self.program)
      .arg(action)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|err| self.error(format!("failed to run {}: {err}", self.program.display())))?;

    if let Some(mut stdin) = child.stdin.take() {
      stdin.write_all(input).map_err(|err| self.error(err))?;
    }

    let output = child.wait_with_output().map_err(|err| self.error(err))?;
    if output.status.success() {
      return Ok(HelperOutput::Success(output.stdout));
    }

    let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if is_not_found(&message) {
      return Ok(HelperOutput::NotFound);
    }

    let message = if message.is_empty() {
      String::from_utf8_lossy(&output.stderr).trim().to_string()
    } else {
      message
    };
    Err(self.error(format!("{action} exited with {}: {message}", output.status)))
  }

  fn error(&self, message: impl ToString) -> CredentialError {
    CredentialError::Helper {
      helper: self.name.clone(),
      message: message.to_string(),
    }
  }
}

enum HelperOutput {
  Success(Vec<u8>),
  NotFound,
}

fn is_not_found(message: &str) -> bool {
  message.contains(NOT_FOUND_MESSAGE)
}

fn credential_from_helper(response: HelperCredential) -> Credential {
  if response.username == TOKEN_USERNAME {
    Credential::token("", response.secret)
  } else {
    Credential::basic(response.username, response.secret)
  }
}

fn helper_from_credential(registry: &str, credential: &Credential) -> HelperCredential {
  let (username, secret) = if credential.has_identity_token() {
    (TOKEN_USERNAME.to_string(), credential.identity_token.clone())
  } else {
    (credential.username.clone(), credential.password.clone())
  };

  HelperCredential {
    server_url: registry.to_string(),
    username,
    secret,
  }
}
