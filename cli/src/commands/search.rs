use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use domov_common::config::Config;
use domov_common::query::QueryParams;
use domov_core::orchestrator::SourceOutcome;
use domov_core::search::{SearchResponse, SearchService};

use crate::commands::{Filters, build_service};
use crate::terminal::{colors, format, print, spinner};

pub async fn search(filters: Filters, cfg: &Config) -> anyhow::Result<()> {
    let params = filters.to_params().context("invalid search filters")?;
    let service = build_service(cfg)?;
    run_once(&service, params, cfg).await
}

/// Runs one search and renders it according to the output flags.
pub async fn run_once(service: &SearchService, params: QueryParams, cfg: &Config) -> anyhow::Result<()> {
    let show_progress = !cfg.json && cfg.quiet == 0;
    if show_progress {
        spinner::start("Querying portals...");
    }

    let start = Instant::now();
    let result = service.search(params).await;
    spinner::finish();
    let response = result.context("search failed")?;

    if cfg.json {
        print::print(&serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    render(&response, start.elapsed(), cfg.quiet);
    Ok(())
}

fn render(response: &SearchResponse, elapsed: Duration, q_level: u8) {
    if response.listings.is_empty() {
        print::header("no listings found", q_level);
        print::no_results();
        summary(response, elapsed);
        return;
    }

    print::header("listings by price per m²", q_level);
    match q_level {
        0 => {
            for (idx, listing) in response.listings.iter().enumerate() {
                print::tree_head(idx + 1, &listing.name);
                print::as_tree_one_level(format::listing_details(listing));
            }
        }
        1 => {
            for listing in &response.listings {
                print::print(&format::listing_line(listing));
            }
        }
        _ => {}
    }

    print::header("summary", q_level);
    summary(response, elapsed);
}

fn summary(response: &SearchResponse, elapsed: Duration) {
    print::aligned_line(
        "Total",
        response.count.to_string().color(colors::ACCENT).bold(),
    );
    for (tag, count) in &response.stats.per_source {
        let outcome = response
            .outcomes
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, o)| o);
        let value = match outcome {
            Some(SourceOutcome::Failed(e)) => format!("failed ({e})").color(colors::FAILURE),
            _ => count.to_string().color(colors::TEXT_DEFAULT),
        };
        print::aligned_line(tag.as_str(), value);
    }

    let origin = if response.from_cache {
        format!(
            "cached snapshot from {}",
            response.timestamp.format("%H:%M:%S")
        )
        .dimmed()
    } else {
        "fresh fetch".normal()
    };
    print::aligned_line("Data", origin);

    let location = response
        .search_params
        .location
        .map(|c| c.to_string())
        .unwrap_or_default();
    print::aligned_line("City", location.normal());

    print::centerln(
        &format!("Done in {:.2}s", elapsed.as_secs_f64())
            .bright_black()
            .to_string(),
    );
    print::end_of_program();
}
