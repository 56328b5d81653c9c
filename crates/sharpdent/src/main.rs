//
// main.rs
//
// Entry point for the sharpdent binary: the language server on stdio and
// the `indent` probe.
//

use std::env;

use anyhow::Context;

use sharpdent::{backend, cli};

fn print_usage() {
    println!("sharpdent {}, a C# smart-indentation server.", env!("CARGO_PKG_VERSION"));
    print!(
        r#"
Usage: sharpdent [OPTIONS]
       sharpdent indent <path> --line N [--unit U] [--tab-size T] [--tabs] [--base B] [--symbol S]...

Available options:

--stdio                      Start the LSP server using stdio transport
--version                    Print the version
--help                       Print this help message

Subcommands:

indent                       Print the indentation decision for one line of a file

"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut use_stdio = false;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--stdio" => use_stdio = true,
            "--version" => {
                println!("sharpdent {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            "indent" => {
                env_logger::init();
                let args = cli::indent::parse_args(&mut argv)
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("Invalid arguments for 'indent'")?;
                println!("{}", cli::indent::run(&args)?);
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
        }
    }

    if !use_stdio {
        print_usage();
        return Ok(());
    }

    env_logger::init();

    backend::start_lsp().await
}
