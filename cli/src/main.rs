mod commands;
mod terminal;

use commands::{CommandLine, Commands, search, sources, watch};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init_logging(&cfg);
    if !cfg.json {
        print::banner(cfg.quiet);
    }

    match commands.command {
        Commands::Sources => sources::sources(cfg.quiet),
        Commands::Search { filters } => search::search(filters, &cfg).await,
        Commands::Watch {
            filters,
            interval,
            rounds,
        } => watch::watch(filters, interval, rounds, &cfg).await,
    }
}
