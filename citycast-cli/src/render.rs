use citycast_core::{Candidate, Quantity, SearchOutcome, SeriesSummary, Summary};

pub const NO_RESULTS: &str = "No matching places.";
pub const SEARCH_FAILED: &str = "Search failed, try again.";
pub const FORECAST_UNAVAILABLE: &str = "Forecast unavailable.";

fn value(v: Option<f64>, unit: &str) -> String {
    match v {
        // Debug keeps the provider's value as-is but always shows a decimal.
        Some(v) => format!("{v:?} {unit}"),
        None => "n/a".to_string(),
    }
}

fn series_lines(s: &SeriesSummary) -> [String; 2] {
    let label = s.quantity.label();
    [
        format!("{label} (min): {}", value(s.min(), &s.unit)),
        format!("{label} (max): {}", value(s.max(), &s.unit)),
    ]
}

pub fn candidate_line(index: usize, c: &Candidate) -> String {
    format!("{:>2}. {} ({:.2}, {:.2})", index + 1, c.label(), c.latitude, c.longitude)
}

/// Lines for a search outcome; empty for a skipped search.
pub fn outcome_lines(outcome: &SearchOutcome) -> Vec<String> {
    match outcome {
        SearchOutcome::Skipped => Vec::new(),
        SearchOutcome::Found(candidates) => {
            candidates.iter().enumerate().map(|(i, c)| candidate_line(i, c)).collect()
        }
        SearchOutcome::NoResults => vec![NO_RESULTS.to_string()],
        SearchOutcome::Failed(_) => vec![SEARCH_FAILED.to_string()],
    }
}

pub fn selection_lines(candidate: &Candidate, summary: Option<&Summary>) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", candidate.name),
        format!("Country: {}", candidate.country),
    ];

    let Some(summary) = summary else {
        lines.push(FORECAST_UNAVAILABLE.to_string());
        return lines;
    };

    if let Some((from, to)) = summary.window {
        let days = (to.date() - from.date()).num_days() + 1;
        let unit = if days == 1 { "day" } else { "days" };
        lines.push(format!(
            "Window: {} .. {} ({days} {unit})",
            from.format("%Y-%m-%d %H:%M"),
            to.format("%Y-%m-%d %H:%M"),
        ));
    }
    for quantity in Quantity::all() {
        lines.extend(series_lines(summary.series(*quantity)));
    }

    lines
}
