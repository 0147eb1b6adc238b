use backoffice::cli::{
    handle_add, handle_delete, handle_init, handle_list, handle_move, handle_reset, handle_update,
    Cli, Commands,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Reset => handle_reset(),
        Commands::List { entity, json } => handle_list(entity, json),
        Commands::Add { entity, data, json } => handle_add(entity, data, json),
        Commands::Update {
            entity,
            id,
            data,
            json,
        } => handle_update(entity, id, data, json),
        Commands::Delete { entity, id } => handle_delete(entity, id),
        Commands::Move {
            entity,
            id,
            target,
            position,
        } => handle_move(entity, id, target, position),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
