//! Registry hostname normalization.
//!
//! Auth files are keyed by whatever the writing tool chose: bare hostnames,
//! `https://index.docker.io/v1/`, `host:port`, and so on. Lookups compare
//! normalized forms so those variants all resolve to the same entry.

use std::collections::BTreeMap;

/// Canonical name of Docker Hub.
pub const DOCKER_HUB: &str = "docker.io";

/// Hostnames that refer to Docker Hub.
const DOCKER_HUB_ALIASES: [&str; 2] = ["index.docker.io", "registry-1.docker.io"];

/// Reduce a registry reference to the host key used in auth files.
///
/// Strips an `http://` or `https://` scheme, drops everything from the first
/// `/`, and maps Docker Hub aliases to [`DOCKER_HUB`]. Ports are kept as-is.
///
/// Normalizing twice yields the same value as normalizing once.
pub fn normalize_registry(registry: &str) -> String {
  let host = strip_scheme(registry);
  let host = host.split_once('/').map_or(host, |(host, _)| host);

  if DOCKER_HUB_ALIASES.contains(&host) {
    DOCKER_HUB.to_string()
  } else {
    host.to_string()
  }
}

fn strip_scheme(registry: &str) -> &str {
  registry
    .strip_prefix("https://")
    .or_else(|| registry.strip_prefix("http://"))
    .unwrap_or(registry)
}

/// Find the entry for `registry` in a map keyed as stored on disk.
///
/// An exact key match wins. Otherwise the normalized request is compared
/// against each normalized key; when several keys collapse onto the same
/// host the last one in key order wins. No prefix matching is attempted.
pub fn find_entry<'a, V>(entries: &'a BTreeMap<String, V>, registry: &str) -> Option<(&'a str, &'a V)> {
  if let Some((key, value)) = entries.get_key_value(registry) {
    return Some((key.as_str(), value));
  }

  let wanted = normalize_registry(registry);
  entries
    .iter()
    .filter(|(key, _)| normalize_registry(key) == wanted)
    .next_back()
    .map(|(key, value)| (key.as_str(), value))
}

/// Keys of `entries` that normalize to the same host as `registry`.
pub fn matching_keys<V>(entries: &BTreeMap<String, V>, registry: &str) -> Vec<String> {
  let wanted = normalize_registry(registry);
  entries
    .keys()
    .filter(|key| key.as_str() == registry || normalize_registry(key) == wanted)
    .cloned()
    .collect()
}
