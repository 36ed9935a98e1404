//! ui
//!
//! Terminal interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`prompts`] - Interactive prompts
//!
//! All output and prompts go through this module so quiet and
//! non-interactive modes behave consistently across commands.

pub mod output;
pub mod prompts;
