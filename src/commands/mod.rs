//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `registry-auth`
//! subcommand, keeping `cli::run` a thin dispatcher while still allowing the
//! handlers to share utilities such as secret masking.

pub mod auth;
pub mod completions;
pub mod list;
pub mod version;
