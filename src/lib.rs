//! Nimbus CLI
//!
//! A one-shot command-line client for Nimbus Cloud: every invocation parses
//! one verb chain, performs the HTTPS calls behind it, renders the result,
//! and exits. The crate is organized around the cross-cutting subsystems
//! each command composes: input-model parsing, the client factory, the wait
//! handler, and the output renderer.

pub mod auth;
pub mod cancel;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod globalflags;
pub mod printer;
pub mod prompt;
pub mod render;
pub mod services;
pub mod spinner;
pub mod table;
pub mod validate;
pub mod wait;
