use colored::*;
use domov_common::listing::{GroupColor, Listing};

use crate::terminal::colors;

pub fn group_color(color: GroupColor) -> Color {
    match color {
        GroupColor::Yellow => Color::Yellow,
        GroupColor::Blue => Color::Blue,
        GroupColor::Green => Color::Green,
        GroupColor::Purple => Color::Magenta,
        GroupColor::Pink => Color::BrightMagenta,
        GroupColor::Orange => Color::TrueColor { r: 255, g: 165, b: 0 },
        GroupColor::Teal => Color::Cyan,
        GroupColor::Red => Color::Red,
    }
}

/// Groups digits by thousands with spaces, Czech style: `8 100 000`.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

pub fn czk(value: f64) -> String {
    format!("{} Kč", thousands(value.round() as i64))
}

fn or_unknown(value: Option<String>) -> ColoredString {
    match value {
        Some(v) => v.color(colors::TEXT_DEFAULT),
        None => "unknown".dimmed(),
    }
}

pub fn listing_details(listing: &Listing) -> Vec<(String, ColoredString)> {
    let mut details = vec![
        (
            "Price".to_string(),
            match listing.price {
                Some(price) => czk(price).color(colors::PRICE).bold(),
                None => "unknown".dimmed(),
            },
        ),
        (
            "Size".to_string(),
            or_unknown(listing.size.map(|s| format!("{s} m²"))),
        ),
        (
            "Per m²".to_string(),
            or_unknown(listing.price_per_meter.map(|p| format!("{} Kč", thousands(p)))),
        ),
        ("Where".to_string(), or_unknown(Some(listing.location.clone()).filter(|l| !l.is_empty()))),
        ("Source".to_string(), listing.source.as_str().color(colors::ACCENT)),
    ];

    if let (Some(color), Some(count)) = (listing.group_color, listing.duplicate_count) {
        let label = format!("{count} listings, {color:?}").to_lowercase();
        details.push(("Group".to_string(), label.color(group_color(color)).bold()));
    }

    details.push(("Link".to_string(), listing.url.as_str().color(colors::LINK).underline()));
    details
}

/// One-line rendering used at `-q`.
pub fn listing_line(listing: &Listing) -> String {
    let per_meter = listing
        .price_per_meter
        .map(|p| format!("{} Kč/m²", thousands(p)))
        .unwrap_or_else(|| "? Kč/m²".to_string());
    let marker = match listing.group_color {
        Some(color) => "●".color(group_color(color)).to_string(),
        None => " ".to_string(),
    };
    format!(
        "{} {:>16}  {:<12} {}",
        marker,
        per_meter.color(colors::PRICE),
        listing.source.as_str().color(colors::ACCENT),
        listing.name
    )
}
