//! Scenario files: TOML or JSON, written in minutes, converted to [ScenarioParams].
//!
//! ```toml
//! horizon_minutes = 480
//! seed = 42
//!
//! [service_time]
//! kind = "triangular"
//! min = 4.0
//! mode = 5.0
//! max = 6.0
//!
//! [[rides]]
//! name = "Coaster"
//! capacity = 24
//!
//! [[arrival_phases]]
//! start_minute = 0
//! end_minute = 480
//! visitors_per_hour = 30.0
//! ```
//!
//! Omitting `arrival_phases` uses the park-day pattern fitted to the horizon; an explicit
//! empty list disables generated arrivals. Explicit phases are taken as written and must
//! partition `[0, horizon_minutes]`.

use std::path::{Path, PathBuf};

use park_core::arrival_schedule::{ArrivalRateSchedule, RateWindow};
use park_core::clock::minutes_to_ms;
use park_core::distributions::ServiceTimeDistribution;
use park_core::patterns::PARK_DAY_MINUTES;
use park_core::scenario::{default_rides, RideConfig, ScenarioParams, ScriptedArrival};
use park_core::spawner::RideSelectionPolicy;
use park_core::SimError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML scenario: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported scenario file extension '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Invalid(#[from] SimError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RideFile {
    pub name: String,
    pub capacity: usize,
    #[serde(default)]
    pub service_time: Option<ServiceTimeDistribution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseFile {
    pub start_minute: u64,
    pub end_minute: u64,
    pub visitors_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedFile {
    pub at_minute: f64,
    pub ride: String,
    #[serde(default)]
    pub service_minutes: Option<f64>,
}

impl ScriptedFile {
    fn into_arrival(self) -> Result<ScriptedArrival, SimError> {
        let minutes_field = |field: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(minutes_to_ms(value))
            } else {
                Err(SimError::config(format!(
                    "scripted arrival for '{}' has invalid {field} {value}",
                    self.ride
                )))
            }
        };
        let at_ms = minutes_field("at_minute", self.at_minute)?;
        let service_ms = self
            .service_minutes
            .map(|minutes| minutes_field("service_minutes", minutes))
            .transpose()?;
        Ok(ScriptedArrival {
            at_ms,
            ride: self.ride,
            service_ms,
        })
    }
}

fn default_horizon_minutes() -> u64 {
    PARK_DAY_MINUTES
}

/// On-disk scenario description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(default = "default_horizon_minutes")]
    pub horizon_minutes: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub max_visitors: Option<usize>,
    #[serde(default)]
    pub service_time: ServiceTimeDistribution,
    #[serde(default)]
    pub ride_selection: RideSelectionPolicy,
    #[serde(default)]
    pub rides: Option<Vec<RideFile>>,
    #[serde(default)]
    pub arrival_phases: Option<Vec<PhaseFile>>,
    #[serde(default)]
    pub scripted: Vec<ScriptedFile>,
}

impl Default for ScenarioFile {
    fn default() -> Self {
        Self {
            horizon_minutes: default_horizon_minutes(),
            seed: None,
            max_visitors: None,
            service_time: ServiceTimeDistribution::default(),
            ride_selection: RideSelectionPolicy::default(),
            rides: None,
            arrival_phases: None,
            scripted: Vec::new(),
        }
    }
}

impl ScenarioFile {
    /// Convert to validated [ScenarioParams].
    pub fn into_params(self) -> Result<ScenarioParams, ConfigError> {
        let rides = match self.rides {
            Some(rides) => rides
                .into_iter()
                .map(|ride| RideConfig {
                    name: ride.name,
                    capacity: ride.capacity,
                    service_time: ride.service_time,
                })
                .collect(),
            None => default_rides(),
        };

        let mut params = ScenarioParams::default()
            .with_park_day_minutes(self.horizon_minutes)
            .with_rides(rides)
            .with_service_time(self.service_time)
            .with_ride_selection(self.ride_selection)
            .with_scripted_arrivals(
                self.scripted
                    .into_iter()
                    .map(ScriptedFile::into_arrival)
                    .collect::<Result<_, _>>()?,
            );
        if let Some(phases) = self.arrival_phases {
            let windows = phases
                .iter()
                .map(|p| {
                    RateWindow::from_minutes(
                        p.start_minute as f64,
                        p.end_minute as f64,
                        p.visitors_per_hour,
                    )
                })
                .collect();
            params = params.with_arrival_schedule(ArrivalRateSchedule::new(windows));
        }
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        if let Some(max_visitors) = self.max_visitors {
            params = params.with_max_visitors(max_visitors);
        }

        params.validate()?;
        Ok(params)
    }
}

pub fn parse_toml(text: &str) -> Result<ScenarioParams, ConfigError> {
    toml::from_str::<ScenarioFile>(text)?.into_params()
}

pub fn parse_json(text: &str) -> Result<ScenarioParams, ConfigError> {
    serde_json::from_str::<ScenarioFile>(text)?.into_params()
}

/// Load a scenario, picking the format from the file extension.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioParams, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "toml" => parse_toml(&text),
        "json" => parse_json(&text),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::clock::ONE_MIN_MS;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn empty_toml_is_the_default_park_day() {
        let params = parse_toml("").unwrap();
        let defaults = ScenarioParams::default();
        assert_eq!(params.horizon_ms, defaults.horizon_ms);
        assert_eq!(params.rides, defaults.rides);
        assert_eq!(params.arrival_schedule, defaults.arrival_schedule);
    }

    #[test]
    fn toml_scenario_converts_minutes() {
        let params = parse_toml(
            r#"
            horizon_minutes = 60
            seed = 9

            [service_time]
            kind = "fixed"
            minutes = 3.0

            [[rides]]
            name = "Coaster"
            capacity = 4

            [[arrival_phases]]
            start_minute = 0
            end_minute = 60
            visitors_per_hour = 20.0

            [[scripted]]
            at_minute = 1.5
            ride = "Coaster"
            service_minutes = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(params.horizon_ms, 60 * ONE_MIN_MS);
        assert_eq!(params.seed, Some(9));
        assert_eq!(params.rides, vec![RideConfig::new("Coaster", 4)]);
        assert_eq!(params.arrival_schedule.windows().len(), 1);
        assert_eq!(params.scripted_arrivals[0].at_ms, 90_000);
        assert_eq!(params.scripted_arrivals[0].service_ms, Some(120_000));
    }

    #[test]
    fn empty_phase_list_disables_arrivals() {
        let params = parse_json(r#"{ "horizon_minutes": 30, "arrival_phases": [] }"#).unwrap();
        assert!(params.arrival_schedule.is_empty());
    }

    #[test]
    fn invalid_values_are_reported() {
        let zero = parse_toml("[[rides]]\nname = \"Broken\"\ncapacity = 0\n");
        assert!(matches!(zero, Err(ConfigError::Invalid(SimError::Configuration(_)))));

        let unknown = parse_toml("horizon = 10");
        assert!(matches!(unknown, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn phases_must_cover_the_horizon_as_written() {
        let short = parse_toml(
            "horizon_minutes = 480\n\n[[arrival_phases]]\nstart_minute = 0\nend_minute = 100\nvisitors_per_hour = 30.0\n",
        );
        assert!(matches!(short, Err(ConfigError::Invalid(SimError::Configuration(_)))));

        let overlong = parse_json(
            r#"{
                "horizon_minutes": 60,
                "arrival_phases": [
                    { "start_minute": 0, "end_minute": 30, "visitors_per_hour": 10.0 },
                    { "start_minute": 30, "end_minute": 900, "visitors_per_hour": 10.0 },
                    { "start_minute": 900, "end_minute": 950, "visitors_per_hour": 10.0 }
                ]
            }"#,
        );
        assert!(matches!(overlong, Err(ConfigError::Invalid(SimError::Configuration(_)))));

        let exact = parse_json(
            r#"{
                "horizon_minutes": 60,
                "arrival_phases": [
                    { "start_minute": 0, "end_minute": 30, "visitors_per_hour": 10.0 },
                    { "start_minute": 30, "end_minute": 60, "visitors_per_hour": 20.0 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(exact.arrival_schedule.windows().len(), 2);
        assert_eq!(exact.arrival_schedule.rate_at(45 * ONE_MIN_MS), 20.0);
    }

    #[test]
    fn scripted_minutes_must_be_finite_and_non_negative() {
        let scenario = |at: &str, service: &str| {
            format!(
                "[[rides]]\nname = \"Coaster\"\ncapacity = 1\n\n[[scripted]]\nat_minute = {at}\nride = \"Coaster\"\nservice_minutes = {service}\n"
            )
        };
        for (at, service) in [("-1.0", "2.0"), ("nan", "2.0"), ("inf", "2.0"), ("1.0", "-0.5"), ("1.0", "nan")] {
            let result = parse_toml(&scenario(at, service));
            assert!(
                matches!(result, Err(ConfigError::Invalid(SimError::Configuration(_)))),
                "at_minute = {at}, service_minutes = {service}"
            );
        }

        let params = parse_toml(&scenario("0.0", "0.5")).unwrap();
        assert_eq!(params.scripted_arrivals[0].at_ms, 0);
        assert_eq!(params.scripted_arrivals[0].service_ms, Some(30_000));
    }

    #[test]
    fn load_scenario_dispatches_on_extension() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "horizon_minutes": 120, "seed": 1 }}"#).unwrap();
        let params = load_scenario(file.path()).unwrap();
        assert_eq!(params.horizon_ms, 120 * ONE_MIN_MS);

        let other = Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            load_scenario(other.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
