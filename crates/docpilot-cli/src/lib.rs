//! Docpilot CLI library.
//!
//! This crate provides the command-line interface and interactive REPL
//! for Docpilot.

pub mod cli;
pub mod commands;
pub mod repl;
