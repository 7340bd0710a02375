use clap::Parser;
use devup_core::errors::DevupError;

mod cli;
mod launch;

fn main() {
    let parsed = cli::Cli::parse();

    if let Err(e) = devup_core::logging::init(parsed.log_format.map(cli::LogFormat::as_str)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(err) = launch::run(parsed.tokens) {
        // Compose failures carry the child's own exit code.
        if let Some(devup_err) = err.downcast_ref::<DevupError>() {
            eprintln!("Error: {}", devup_err);
            std::process::exit(devup_err.exit_code());
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
