//! Reduction of the upstream 3-hour forecast series to what gets displayed.

use serde::{Deserialize, Serialize};

use crate::model::ForecastEntry;

/// Number of forecast entries kept by default.
pub const DEFAULT_FORECAST_LIMIT: usize = 7;

/// How the forecast series is reduced before it reaches view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMode {
    /// First `limit` entries of the series, as returned (3-hour steps, so
    /// roughly 21 hours for a limit of 7).
    #[default]
    Steps,
    /// First entry of each calendar day, up to `limit` days. Assumes the
    /// series is in chronological order, as upstream returns it.
    Daily,
}

impl ForecastMode {
    pub fn heading(&self, limit: usize) -> String {
        match self {
            // Kept as the product labels it, even though entries are 3-hour steps.
            ForecastMode::Steps => format!("{limit}-Day Forecast"),
            ForecastMode::Daily => format!("Daily Forecast (up to {limit} days)"),
        }
    }
}

/// Keep at most `limit` entries, preserving upstream order.
pub fn select(entries: Vec<ForecastEntry>, mode: ForecastMode, limit: usize) -> Vec<ForecastEntry> {
    match mode {
        ForecastMode::Steps => entries.into_iter().take(limit).collect(),
        ForecastMode::Daily => {
            let mut out: Vec<ForecastEntry> = Vec::with_capacity(limit);
            for entry in entries {
                if out.len() == limit {
                    break;
                }
                let day = entry.date();
                if day.is_some() && out.last().and_then(ForecastEntry::date) == day {
                    continue;
                }
                out.push(entry);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: &str) -> ForecastEntry {
        ForecastEntry {
            timestamp_text: ts.to_string(),
            description: "clear sky".to_string(),
            temperature: 10.0,
        }
    }

    fn series(n: usize) -> Vec<ForecastEntry> {
        (0..n)
            .map(|i| entry(&format!("2024-01-{:02} {:02}:00:00", 15 + (i * 3) / 24, (i * 3) % 24)))
            .collect()
    }

    #[test]
    fn steps_truncates_to_limit_in_order() {
        let input = series(40);
        let out = select(input.clone(), ForecastMode::Steps, 7);
        assert_eq!(out.len(), 7);
        assert_eq!(out, input[..7].to_vec());
    }

    #[test]
    fn steps_keeps_short_series_whole() {
        for n in 0..7 {
            let out = select(series(n), ForecastMode::Steps, 7);
            assert_eq!(out.len(), n);
        }
    }

    #[test]
    fn daily_picks_first_entry_per_day() {
        let out = select(series(40), ForecastMode::Daily, 7);
        let days: Vec<_> = out.iter().map(|e| e.timestamp_text.as_str()).collect();
        assert_eq!(
            days,
            vec![
                "2024-01-15 00:00:00",
                "2024-01-16 00:00:00",
                "2024-01-17 00:00:00",
                "2024-01-18 00:00:00",
                "2024-01-19 00:00:00",
            ]
        );
    }

    #[test]
    fn daily_respects_limit() {
        let out = select(series(40), ForecastMode::Daily, 2);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn daily_only_merges_adjacent_days() {
        let out = select(
            vec![entry("2024-01-15 00:00:00"), entry("2024-01-16 00:00:00"), entry("2024-01-15 21:00:00")],
            ForecastMode::Daily,
            7,
        );
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn heading_keeps_product_label_for_steps() {
        assert_eq!(ForecastMode::Steps.heading(7), "7-Day Forecast");
    }
}
