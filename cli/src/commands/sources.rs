use colored::*;
use domov_common::listing::SourceTag;

use crate::commands::build_registry;
use crate::terminal::{colors, print};

pub fn sources(q_level: u8) -> anyhow::Result<()> {
    let registry = build_registry()?;
    let configured = registry.tags();

    print::header("known portals", q_level);
    for tag in SourceTag::ALL {
        let status = if configured.contains(&tag) {
            "searchable".color(colors::PRIMARY)
        } else {
            "no adapter".color(colors::SEPARATOR)
        };
        print::aligned_line(tag.as_str(), status);
    }
    Ok(())
}
