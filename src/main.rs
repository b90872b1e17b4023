use clap::Parser;
use wpstack::cli::{Cli, Commands};
use wpstack::errors::WpStackError;
use wpstack::signal;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = signal::install_handler() {
        tracing::warn!(error = %e, "continuing without interrupt handler");
    }

    let result = match cli.command {
        Commands::Init => wpstack::cli::commands::init::execute(&cli),
        Commands::Set {
            ref name,
            ref value,
        } => wpstack::cli::commands::set::execute(&cli, name, value.as_deref()),
        Commands::Get { ref name } => wpstack::cli::commands::get::execute(&cli, name),
        Commands::List => wpstack::cli::commands::list::execute(&cli),
        Commands::Delete { ref name, force } => {
            wpstack::cli::commands::delete::execute(&cli, name, force)
        }
        Commands::Export { ref format } => wpstack::cli::commands::export::execute(&cli, format),
        Commands::ChangePin => wpstack::cli::commands::change_pin::execute(&cli),
        Commands::Status => wpstack::cli::commands::status::execute(&cli),
        Commands::Completions { shell } => wpstack::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        wpstack::cli::output::error(&e.to_string());
        if let WpStackError::VaultNotFound(_) = e {
            wpstack::cli::output::tip("Run `wpstack init` to create a vault.");
        }
        let code = if matches!(e, WpStackError::Interrupted) {
            signal::INTERRUPTED_EXIT_CODE
        } else {
            1
        };
        std::process::exit(code);
    }

    // An interrupt that arrived during a write that still completed.
    if signal::interrupted() {
        std::process::exit(signal::INTERRUPTED_EXIT_CODE);
    }
}

/// Initializes the tracing subscriber.  `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wpstack={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
