//! Registry credential resolution.
//!
//! Container tools keep registry logins in JSON auth files. This module finds
//! the right file, parses it, matches registry names the way registries are
//! addressed, and returns a [`Credential`].
//!
//! # Lookup order
//!
//! 1. A credential supplied in the [`ResolutionContext`] (no files are read).
//! 2. The primary auth file:
//!    - an explicit legacy or modern override, else
//!    - Linux: `$XDG_RUNTIME_DIR/containers/auth.json`, or
//!      `/run/containers/<uid>/auth.json` when the runtime dir is unset,
//!    - macOS/Windows: `$HOME/.config/containers/auth.json`.
//! 3. `$HOME/.docker/config.json`
//! 4. `$HOME/.dockercfg` (legacy flat layout)
//!
//! The first source with a match wins. A malformed file aborts the lookup;
//! a missing file does not.
//!
//! ```no_run
//! use registry_auth::credentials::{self, ResolutionContext};
//!
//! let ctx = ResolutionContext::from_env()?;
//! let credential = credentials::get_credentials(&ctx, "quay.io")?;
//! if credential.is_empty() {
//!   println!("not logged in");
//! }
//! # Ok::<(), registry_auth::credentials::CredentialError>(())
//! ```

mod auth_file;
mod context;
mod helper;
mod normalize;
mod path;
mod provider;
mod store;
mod types;

pub use auth_file::{AuthEntry, AuthFile};
pub use context::{HostOs, ResolutionContext};
pub use helper::CredentialHelper;
pub use normalize::{DOCKER_HUB, normalize_registry};
pub use path::auth_file_path;
pub use provider::{AuthFileProvider, CredentialSource, CredentialsProvider, OverrideProvider};
pub use store::{
  ResolvedCredential, get_all_credentials, get_authentication, get_credentials, lookup, providers,
  remove_all_authentication, remove_authentication, set_authentication, set_credential,
};
pub use types::{AuthFileFormat, Credential, CredentialError};
