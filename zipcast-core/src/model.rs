use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Postal/ZIP code as typed by the user.
///
/// No structural validation happens locally; the upstream service decides
/// whether a code is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Trim the raw input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Query value for the forecast endpoint, which wants `<zip>,<country>`.
    pub fn with_country(&self, country: &str) -> String {
        if country.is_empty() {
            self.0.clone()
        } else {
            format!("{},{}", self.0, country)
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit system passed to the upstream `units` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// Present weather for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub place_name: String,
    pub country_code: String,
    pub description: String,
    pub temperature: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// One time-stepped forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Upstream `dt_txt`, e.g. `2024-01-15 12:00:00` (UTC).
    pub timestamp_text: String,
    pub description: String,
    pub temperature: f64,
}

impl ForecastEntry {
    /// Calendar date part of the timestamp (`YYYY-MM-DD`), if it parses.
    pub fn date(&self) -> Option<chrono::NaiveDate> {
        let head = self.timestamp_text.get(..10)?;
        chrono::NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

/// Everything one successful fetch cycle produced. Applied to view state as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: LocationQuery,
    pub units: Units,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_query_trims_and_rejects_blank() {
        assert_eq!(LocationQuery::parse("  10001 \n").unwrap().as_str(), "10001");
        assert!(LocationQuery::parse("   ").is_none());
    }

    #[test]
    fn forecast_query_gets_country_suffix() {
        let loc = LocationQuery::parse("90210").unwrap();
        assert_eq!(loc.with_country("us"), "90210,us");
        assert_eq!(loc.with_country(""), "90210");
    }

    #[test]
    fn units_parse_is_case_insensitive() {
        assert_eq!(Units::try_from("Imperial").unwrap(), Units::Imperial);
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn forecast_entry_date_from_dt_txt() {
        let entry = ForecastEntry {
            timestamp_text: "2024-01-15 21:00:00".into(),
            description: "light rain".into(),
            temperature: 3.2,
        };
        assert_eq!(entry.date(), chrono::NaiveDate::from_ymd_opt(2024, 1, 15));

        let broken = ForecastEntry { timestamp_text: "soon".into(), ..entry };
        assert_eq!(broken.date(), None);
    }
}
