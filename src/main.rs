//! Completion Engine demo
//!
//! An interactive line editor whose completion is served by the engine.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! completion-engine --delay 150
//!
//! # Show the effective configuration
//! completion-engine config --show
//! ```

use tracing::Level;

use completion_engine::Result;
use completion_engine::cli::CliInterface;
use completion_engine::repl::ReplEngine;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the REPL
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand().await? {
        return Ok(());
    }

    cli.print_banner();

    run_interactive_mode(&cli).await
}

/// Run the REPL until Ctrl-D or `exit`
async fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let mut repl = ReplEngine::new(cli.config())?;

    // reedline blocks the calling thread; the debounce timer runs on the
    // other workers meanwhile
    tokio::task::block_in_place(|| run_repl_loop(&mut repl))?;

    if !cli.args().quiet {
        println!("Goodbye!");
    }
    Ok(())
}

/// Main REPL loop
fn run_repl_loop(repl: &mut ReplEngine) -> Result<()> {
    while repl.is_running() {
        let input = match repl.read_line()? {
            Some(line) if !line.trim().is_empty() => line,
            Some(_) => continue,
            None => break,
        };

        if matches!(input.trim(), "exit" | "quit") {
            repl.stop();
            continue;
        }

        repl.submit(&input);
    }

    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// The CLI has already folded `-v`, `--vv` and `-q` into the configured
/// level.
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
