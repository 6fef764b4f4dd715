use clap::Parser;
use medtracker::cli::{
    handle_add, handle_delete, handle_get, handle_init, handle_list, handle_progress,
    handle_remind, handle_toggle, handle_update, handle_watch, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so --json output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add {
            name,
            dosage,
            time,
            frequency,
            json,
        } => handle_add(name, dosage, time, frequency, json),
        Commands::List { json } => handle_list(json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Update {
            id,
            name,
            dosage,
            time,
            frequency,
            json,
        } => handle_update(id, name, dosage, time, frequency, json),
        Commands::Delete { id, force } => handle_delete(id, force),
        Commands::Toggle { id, json } => handle_toggle(id, json),
        Commands::Progress { json } => handle_progress(json),
        Commands::Remind { json } => handle_remind(json),
        Commands::Watch => handle_watch(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
