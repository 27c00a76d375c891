pub mod search;
pub mod sources;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use domov_common::config::Config;
use domov_common::progress::{FanoutReporter, ProgressReporter, TracingReporter};
use domov_common::query::{City, QueryError, QueryParams, parse_sources};
use domov_core::registry::SourceRegistry;
use domov_core::search::SearchService;
use domov_sources::{BezrealitkyAdapter, SrealityAdapter};

use crate::terminal::spinner::SpinnerReporter;

#[derive(Parser)]
#[command(name = "domov")]
#[command(about = "Aggregates flat listings from Czech real-estate portals.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output; repeat for terser output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// More log output; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print the search response as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Seconds a plain search result may be reused
    #[arg(long, value_name = "SECS", default_value_t = 300, global = true)]
    pub staleness: u64,

    /// Seconds each portal gets before it counts as failed; 0 disables
    #[arg(long, value_name = "SECS", default_value_t = 60, global = true)]
    pub source_timeout: u64,

    /// City searched when no --location is given
    #[arg(long, value_name = "CITY", default_value = "praha", global = true)]
    pub default_location: City,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search all configured portals once
    #[command(alias = "s")]
    Search {
        #[command(flatten)]
        filters: Filters,
    },
    /// Repeat a search on an interval
    #[command(alias = "w")]
    Watch {
        #[command(flatten)]
        filters: Filters,
        /// Seconds between rounds
        #[arg(long, value_name = "SECS", default_value_t = 600)]
        interval: u64,
        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u32>,
    },
    /// List known portals and whether they can be searched
    Sources,
}

#[derive(Args, Clone, Default)]
pub struct Filters {
    /// praha, brno or ostrava
    #[arg(long)]
    pub location: Option<City>,
    /// Minimum usable area in m²
    #[arg(long)]
    pub size_from: Option<u32>,
    /// Maximum usable area in m²
    #[arg(long)]
    pub size_to: Option<u32>,
    /// Minimum price in CZK
    #[arg(long)]
    pub price_from: Option<u64>,
    /// Maximum price in CZK
    #[arg(long)]
    pub price_to: Option<u64>,
    /// Comma separated portals, e.g. sreality,bezrealitky
    #[arg(long, value_name = "LIST")]
    pub sources: Option<String>,
}

impl Filters {
    pub fn to_params(&self) -> Result<QueryParams, QueryError> {
        let params = QueryParams {
            location: self.location,
            size_from: self.size_from,
            size_to: self.size_to,
            price_from: self.price_from,
            price_to: self.price_to,
            sources: self.sources.as_deref().map(parse_sources).transpose()?,
        };
        params.validate()?;
        Ok(params)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            default_location: self.default_location,
            staleness_window: Duration::from_secs(self.staleness),
            source_deadline: (self.source_timeout > 0)
                .then(|| Duration::from_secs(self.source_timeout)),
            quiet: self.quiet,
            verbose: self.verbose,
            json: self.json,
        }
    }
}

pub fn build_registry() -> anyhow::Result<SourceRegistry> {
    let registry = SourceRegistry::new()
        .with(Arc::new(
            SrealityAdapter::new().context("failed to set up sreality client")?,
        ))?
        .with(Arc::new(
            BezrealitkyAdapter::new().context("failed to set up bezrealitky client")?,
        ))?;
    Ok(registry)
}

pub fn build_service(cfg: &Config) -> anyhow::Result<SearchService> {
    let reporters: Vec<Arc<dyn ProgressReporter>> =
        vec![Arc::new(TracingReporter), Arc::new(SpinnerReporter)];
    let reporter = Arc::new(FanoutReporter::new(reporters));
    Ok(SearchService::new(build_registry()?, cfg, reporter))
}
