//! registry-auth - Manage container registry credentials
//!
//! This is the main entry point for the CLI application.

fn main() {
  registry_auth::cli::run();
}
