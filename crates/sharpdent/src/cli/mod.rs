// cli/mod.rs - Command-line subcommands
//
// Subcommands run without the language server and print to stdout.

pub mod indent;
