//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use registry_auth::credentials::{HostOs, ResolutionContext};
use tempfile::TempDir;

/// An isolated home and runtime directory pair.
pub struct TestEnv {
  root: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let root = TempDir::new().expect("create temp dir");
    fs::create_dir_all(root.path().join("home")).expect("create home");
    fs::create_dir_all(root.path().join("run")).expect("create runtime dir");
    Self { root }
  }

  pub fn root(&self) -> &Path {
    self.root.path()
  }

  pub fn home(&self) -> PathBuf {
    self.root.path().join("home")
  }

  pub fn runtime_dir(&self) -> PathBuf {
    self.root.path().join("run")
  }

  /// Linux context whose primary file is `<runtime>/containers/auth.json`.
  pub fn linux_context(&self) -> ResolutionContext {
    ResolutionContext::new(self.home())
      .with_os(HostOs::Linux)
      .with_runtime_dir(self.runtime_dir())
      .with_uid(1000)
  }

  /// macOS context whose primary file is `<home>/.config/containers/auth.json`.
  pub fn macos_context(&self) -> ResolutionContext {
    ResolutionContext::new(self.home()).with_os(HostOs::MacOs)
  }

  pub fn primary_path(&self) -> PathBuf {
    self.runtime_dir().join("containers").join("auth.json")
  }

  pub fn docker_config_path(&self) -> PathBuf {
    self.home().join(".docker").join("config.json")
  }

  pub fn dockercfg_path(&self) -> PathBuf {
    self.home().join(".dockercfg")
  }

  /// Write `content` to `path`, creating parent directories.
  pub fn write(&self, path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write fixture");
  }
}
