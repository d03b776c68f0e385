//! `hbnb` console binary.
//!
//! Loads `file.json` from the working directory, then reads commands from
//! stdin until `quit` or end of input.

use std::io::{self, IsTerminal};
use std::process;

use tracing::error;

use hbnb_engine::KindRegistry;
use hbnb_runtime::logging::init_logging;
use hbnb_runtime::{run_console, ConsoleConfig, ConsoleError, FileStorage, Interpreter};

fn main() {
    init_logging();
    let config = ConsoleConfig::default();

    if let Err(err) = run(&config) {
        error!(error = %err, "console stopped");
        eprintln!("hbnb: {}", err);
        process::exit(1);
    }
}

fn run(config: &ConsoleConfig) -> Result<(), ConsoleError> {
    let registry = KindRegistry::standard();
    let storage = FileStorage::open(&config.storage_path, &registry)?;
    let mut interpreter = Interpreter::new(registry, storage);

    let stdin = io::stdin();
    let prompt = stdin.is_terminal().then_some(config.prompt.as_str());
    let mut stdout = io::stdout().lock();
    run_console(&mut interpreter, stdin.lock(), &mut stdout, prompt)
}
