//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for Holly Hot Box.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
