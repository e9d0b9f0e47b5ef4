//! Class-name helpers shared by pages and components.

use realm_price_scanner::domain::{PopulationType, TrendDirection};

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-button active"
    } else {
        "nav-button"
    }
}

pub fn toggle(selected: bool) -> &'static str {
    if selected {
        "toggle selected"
    } else {
        "toggle"
    }
}

pub fn population(population: PopulationType) -> &'static str {
    match population {
        PopulationType::Full => "badge population-full",
        PopulationType::High => "badge population-high",
        PopulationType::Medium => "badge population-medium",
        PopulationType::Low => "badge population-low",
        PopulationType::Unclassified => "badge population-unclassified",
    }
}

pub fn rank_row(is_highest: bool, is_lowest: bool) -> &'static str {
    match (is_highest, is_lowest) {
        (true, true) => "rank-highest rank-lowest",
        (true, false) => "rank-highest",
        (false, true) => "rank-lowest",
        (false, false) => "",
    }
}

/// Labels for the positional tags of a ranked row.
pub fn rank_markers(is_highest: bool, is_lowest: bool) -> Vec<&'static str> {
    let mut markers = Vec::new();
    if is_highest {
        markers.push("▲ highest");
    }
    if is_lowest {
        markers.push("▼ lowest");
    }
    markers
}

pub fn trend(direction: TrendDirection) -> (&'static str, &'static str) {
    match direction {
        TrendDirection::Up => ("trend-up", "▲"),
        TrendDirection::Down => ("trend-down", "▼"),
        TrendDirection::Stable => ("trend-stable", "■"),
    }
}
