//! Core library for the devup launcher
//!
//! This crate contains the launcher's logic: control-keyword parsing,
//! environment resolution, compose argument rewriting, the compose
//! invocation seam, terminal session orchestration, per-service attachment,
//! ownership validation, logging, and error handling.

pub mod attach;
pub mod compose;
pub mod config;
pub mod env;
pub mod errors;
pub mod logging;
pub mod ownership;
pub mod rewrite;
pub mod terminal;
