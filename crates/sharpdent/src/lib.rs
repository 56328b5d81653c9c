// lib.rs — Library crate behind the sharpdent binary.
//
// The indentation engine and its syntax layer are usable on their own;
// the remaining modules host them behind LSP and the command line.

pub mod backend;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod indentation;
pub mod perf;
pub mod state;
pub mod syntax;
pub mod text;
pub mod utf16;
