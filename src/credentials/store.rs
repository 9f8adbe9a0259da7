//! Reading, writing, and listing stored registry credentials.
//!
//! Every call re-reads the files it needs; nothing is cached between calls.
//! Writes are read-modify-write on the primary auth file without locking, so
//! concurrent writers from separate processes race and the last one wins.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::auth_file::{AuthEntry, AuthFile, read_auth_file, write_auth_file};
use super::helper::CredentialHelper;
use super::normalize::{find_entry, matching_keys, normalize_registry};
use super::path::auth_file_path;
use super::provider::{AuthFileProvider, CredentialSource, CredentialsProvider, OverrideProvider};
use super::{AuthFileFormat, Credential, CredentialError, ResolutionContext};

/// A credential together with the source that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
  pub credential: Credential,
  pub source: CredentialSource,
}

/// The ordered lookup chain for `ctx`.
///
/// A caller-supplied credential short-circuits the chain. Otherwise the
/// primary auth file comes first, then `~/.docker/config.json`, then
/// `~/.dockercfg`.
///
/// # Errors
/// Fails when the primary auth file path cannot be resolved.
pub fn providers(ctx: &ResolutionContext) -> Result<Vec<Box<dyn CredentialsProvider>>, CredentialError> {
  let mut chain: Vec<Box<dyn CredentialsProvider>> = Vec::new();
  if let Some(credential) = &ctx.credential_override {
    chain.push(Box::new(OverrideProvider::new(credential.clone())));
    return Ok(chain);
  }

  let (primary, format) = auth_file_path(ctx)?;
  let sources = [
    (primary, format),
    (ctx.docker_config_path(), AuthFileFormat::Modern),
    (ctx.legacy_docker_config_path(), AuthFileFormat::Legacy),
  ];
  for (path, format) in sources {
    chain.push(Box::new(
      AuthFileProvider::new(path, format).with_helper_dir(ctx.helper_dir.clone()),
    ));
  }
  Ok(chain)
}

/// Resolve credentials for `registry` and report where they came from.
///
/// # Returns
/// * `Ok(Some(ResolvedCredential))` from the first source holding an entry.
/// * `Ok(None)` when no source has one; absence is not an error.
///
/// # Errors
/// Stops at the first source that fails: a malformed file yields
/// [`CredentialError::Parse`] without consulting lower-precedence files.
pub fn lookup(ctx: &ResolutionContext, registry: &str) -> Result<Option<ResolvedCredential>, CredentialError> {
  for provider in providers(ctx)? {
    if let Some(credential) = provider.get_credentials(registry)? {
      let source = provider.source();
      debug!(registry, %source, "resolved credentials");
      return Ok(Some(ResolvedCredential { credential, source }));
    }
  }

  debug!(registry, "no credentials found");
  Ok(None)
}

/// Credentials for `registry`, or an empty [`Credential`] when none exist.
pub fn get_credentials(ctx: &ResolutionContext, registry: &str) -> Result<Credential, CredentialError> {
  Ok(lookup(ctx, registry)?.map(|resolved| resolved.credential).unwrap_or_default())
}

/// Username and password for `registry`, empty strings when none exist.
///
/// # Errors
/// Returns [`CredentialError::IdentityTokenUnsupported`] when the stored entry
/// authenticates with an identity token.
pub fn get_authentication(ctx: &ResolutionContext, registry: &str) -> Result<(String, String), CredentialError> {
  let credential = get_credentials(ctx, registry)?;
  if credential.has_identity_token() {
    return Err(CredentialError::IdentityTokenUnsupported(registry.to_string()));
  }
  Ok((credential.username, credential.password))
}

/// Store a username and password for `registry` in the primary auth file.
pub fn set_authentication(
  ctx: &ResolutionContext,
  registry: &str,
  username: &str,
  password: &str,
) -> Result<(), CredentialError> {
  set_credential(ctx, registry, &Credential::basic(username, password))
}

/// Store `credential` for `registry` in the primary auth file.
///
/// The entry is keyed by the normalized hostname; any existing keys that
/// normalize to the same host are replaced. When the file delegates the
/// registry to a credential helper, the helper stores it instead.
///
/// # Errors
/// Returns [`CredentialError::LegacyWriteUnsupported`] when the primary file is
/// a legacy-format override, and [`CredentialError::Io`] for filesystem
/// failures.
pub fn set_credential(ctx: &ResolutionContext, registry: &str, credential: &Credential) -> Result<(), CredentialError> {
  modify_auth_file(ctx, |file| {
    if let Some((key, helper)) = find_entry(&file.cred_helpers, registry) {
      CredentialHelper::locate(helper, ctx.helper_dir.as_deref()).store(key, credential)?;
      return Ok(false);
    }

    for key in matching_keys(&file.auths, registry) {
      file.auths.remove(&key);
    }
    file
      .auths
      .insert(normalize_registry(registry), AuthEntry::from_credential(credential));
    Ok(true)
  })
}

/// Remove the stored credentials for `registry`.
///
/// Every key normalizing to the registry is dropped, and a configured helper
/// is asked to erase its entry.
///
/// # Errors
/// Returns [`CredentialError::NotLoggedIn`] when nothing was stored.
pub fn remove_authentication(ctx: &ResolutionContext, registry: &str) -> Result<(), CredentialError> {
  modify_auth_file(ctx, |file| {
    let erased = match find_entry(&file.cred_helpers, registry) {
      Some((key, helper)) => CredentialHelper::locate(helper, ctx.helper_dir.as_deref()).erase(key)?,
      None => false,
    };

    let keys = matching_keys(&file.auths, registry);
    for key in &keys {
      file.auths.remove(key);
    }

    if keys.is_empty() && !erased {
      return Err(CredentialError::NotLoggedIn(registry.to_string()));
    }
    Ok(!keys.is_empty())
  })
}

/// Drop every stored credential and helper mapping from the primary file.
pub fn remove_all_authentication(ctx: &ResolutionContext) -> Result<(), CredentialError> {
  modify_auth_file(ctx, |file| {
    file.auths.clear();
    file.cred_helpers.clear();
    Ok(true)
  })
}

/// Every credential in the primary auth file, keyed as stored.
///
/// Neither `~/.docker/config.json` nor `~/.dockercfg` is consulted (unless one
/// of them is the primary file). Registries delegated to a helper are included
/// when the helper holds an entry for them. A helper that cannot be run is
/// logged and skipped so the remaining entries are still returned.
pub fn get_all_credentials(ctx: &ResolutionContext) -> Result<BTreeMap<String, Credential>, CredentialError> {
  let (path, format) = auth_file_path(ctx)?;
  let Some(file) = read_auth_file(&path, format)? else {
    return Ok(BTreeMap::new());
  };

  let mut credentials = BTreeMap::new();
  for (registry, entry) in &file.auths {
    credentials.insert(registry.clone(), entry.to_credential(registry)?);
  }
  for (registry, helper) in &file.cred_helpers {
    match CredentialHelper::locate(helper, ctx.helper_dir.as_deref()).get(registry) {
      Ok(Some(credential)) => {
        credentials.insert(registry.clone(), credential);
      }
      Ok(None) => {}
      Err(err) => warn!(registry, %err, "skipping credential helper"),
    }
  }

  Ok(credentials)
}

/// Load the primary auth file (or an empty one), let `edit` change it, and
/// write it back when `edit` reports a change.
fn modify_auth_file<F>(ctx: &ResolutionContext, edit: F) -> Result<(), CredentialError>
where
  F: FnOnce(&mut AuthFile) -> Result<bool, CredentialError>,
{
  let (path, format) = auth_file_path(ctx)?;
  if format.is_legacy() {
    return Err(CredentialError::LegacyWriteUnsupported(path));
  }

  let mut file = read_auth_file(&path, format)?.unwrap_or_default();
  if edit(&mut file)? {
    write_auth_file(&path, &file)?;
  }
  Ok(())
}
