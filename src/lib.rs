//! Container registry credential resolver
//!
//! This library locates container registry auth files (`auth.json`,
//! `~/.docker/config.json`, `~/.dockercfg`) and reads, writes, and removes
//! the credentials stored in them. See [`credentials`] for the lookup rules.

pub mod cli;
pub mod color;
pub mod commands;
pub mod credentials;
