//! Auth file fixtures
//!
//! Realistic auth files as written by podman, skopeo, and docker. The `auth`
//! values are base64 of `user:password`.

use serde_json::json;

// One registry: example.org -> example/org
pub fn example() -> String {
  json!({
    "auths": {
      "example.org": { "auth": "ZXhhbXBsZTpvcmc=" }
    }
  })
  .to_string()
}

// Several hosts stored under the keys docker writes
pub fn full() -> String {
  json!({
    "auths": {
      "https://index.docker.io/v1/": { "auth": "ZG9ja2VyOmlv" },
      "example.org": { "auth": "ZXhhbXBsZTpvcmc=" },
      "localhost": { "auth": "bG9jYWw6aG9zdA==" },
      "10.10.30.45:5000": { "auth": "MTAuMTA6MzAuNDUtNTAwMA==" }
    }
  })
  .to_string()
}

// Keys that only match after normalization
pub fn abnormal() -> String {
  json!({
    "auths": {
      "index.docker.io": { "auth": "aW5kZXg6ZG9ja2VyLmlv" },
      "https://localhost:5000": { "auth": "bG9jYWw6aG9zdC01MDAw" }
    }
  })
  .to_string()
}

// example.org authenticated by identity token
pub fn example_identity_token() -> String {
  json!({
    "auths": {
      "example.org": {
        "auth": "MDAwMDAwMDAtMDAwMC0wMDAwLTAwMDAtMDAwMDAwMDAwMDAwOg==",
        "identitytoken": "some very long identity token"
      }
    }
  })
  .to_string()
}

pub fn empty() -> String {
  "{}".to_string()
}

// Flat ~/.dockercfg layout
pub fn legacy() -> String {
  json!({
    "docker.io": { "auth": "ZG9ja2VyOmlvLWxlZ2FjeQ==" }
  })
  .to_string()
}

pub const NOT_JSON: &str = "Json rocks! Unless it doesn't.";
