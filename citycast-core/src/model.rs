use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A place suggestion returned by the geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    pub name: String,
    pub country: String,
    /// First-level administrative area (state, region), when known.
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Candidate {
    /// "Name, Country" as shown in a suggestion list.
    pub fn label(&self) -> String {
        match &self.admin1 {
            Some(admin) if admin != &self.name && !admin.is_empty() => {
                format!("{}, {}, {}", self.name, admin, self.country)
            }
            _ => format!("{}, {}", self.name, self.country),
        }
    }
}

/// The three hourly quantities the forecast lookup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temperature,
    WindSpeed,
    Rain,
}

impl Quantity {
    /// Variable name on the forecast API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature_2m",
            Quantity::WindSpeed => "windspeed_10m",
            Quantity::Rain => "rain",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quantity::Temperature => "Temperature",
            Quantity::WindSpeed => "Wind",
            Quantity::Rain => "Rain",
        }
    }

    pub const fn all() -> &'static [Quantity] {
        &[Quantity::Temperature, Quantity::WindSpeed, Quantity::Rain]
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hourly series with its declared unit. `None` marks a missing sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub unit: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(unit: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self { unit: unit.into(), values }
    }

    /// Convenience constructor for series without gaps.
    pub fn complete(unit: impl Into<String>, values: &[f64]) -> Self {
        Self::new(unit, values.iter().copied().map(Some).collect())
    }

    fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }
}

/// Raw hourly forecast for one window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastSample {
    pub time: Vec<String>,
    pub temperature: Series,
    pub wind_speed: Series,
    pub rain: Series,
}

impl ForecastSample {
    pub fn series(&self, quantity: Quantity) -> &Series {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::WindSpeed => &self.wind_speed,
            Quantity::Rain => &self.rain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub min: f64,
    pub max: f64,
}

/// Min/max of one series. `extremes` is `None` when no sample was present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub quantity: Quantity,
    pub unit: String,
    pub samples: usize,
    pub extremes: Option<Extremes>,
}

impl SeriesSummary {
    pub fn min(&self) -> Option<f64> {
        self.extremes.map(|e| e.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.extremes.map(|e| e.max)
    }
}

/// Derived statistics for one forecast window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub temperature: SeriesSummary,
    pub wind_speed: SeriesSummary,
    pub rain: SeriesSummary,
    pub window: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl Summary {
    pub fn series(&self, quantity: Quantity) -> &SeriesSummary {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::WindSpeed => &self.wind_speed,
            Quantity::Rain => &self.rain,
        }
    }
}

/// Reduce every series of `sample` to its extremes.
///
/// Missing samples are skipped, nothing is interpolated and units are
/// carried through unchanged.
pub fn summarize(sample: &ForecastSample) -> Summary {
    let reduce = |quantity: Quantity| {
        let series = sample.series(quantity);
        let extremes = series.present().fold(None, |acc: Option<Extremes>, v| {
            Some(match acc {
                None => Extremes { min: v, max: v },
                Some(e) => Extremes { min: e.min.min(v), max: e.max.max(v) },
            })
        });

        SeriesSummary {
            quantity,
            unit: series.unit.clone(),
            samples: series.present().count(),
            extremes,
        }
    };

    Summary {
        temperature: reduce(Quantity::Temperature),
        wind_speed: reduce(Quantity::WindSpeed),
        rain: reduce(Quantity::Rain),
        window: window(&sample.time),
    }
}

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

fn window(time: &[String]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDateTime::parse_from_str(time.first()?, TIME_FORMAT).ok()?;
    let last = NaiveDateTime::parse_from_str(time.last()?, TIME_FORMAT).ok()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temperature: Series, wind_speed: Series, rain: Series) -> ForecastSample {
        ForecastSample { time: Vec::new(), temperature, wind_speed, rain }
    }

    #[test]
    fn summarize_takes_min_and_max_with_declared_units() {
        let s = sample(
            Series::complete("°C", &[18.0, 21.5, 19.0]),
            Series::complete("km/h", &[4.2, 3.1, 9.8]),
            Series::complete("mm", &[0.0, 0.4, 0.1]),
        );

        let summary = summarize(&s);

        assert_eq!(summary.temperature.min(), Some(18.0));
        assert_eq!(summary.temperature.max(), Some(21.5));
        assert_eq!(summary.temperature.unit, "°C");
        assert_eq!(summary.wind_speed.extremes, Some(Extremes { min: 3.1, max: 9.8 }));
        assert_eq!(summary.wind_speed.unit, "km/h");
        assert_eq!(summary.rain.max(), Some(0.4));
        assert_eq!(summary.rain.samples, 3);
    }

    #[test]
    fn empty_series_has_no_extremes() {
        let s = sample(
            Series::complete("°C", &[12.0]),
            Series::complete("km/h", &[1.0]),
            Series::complete("mm", &[]),
        );

        let summary = summarize(&s);

        assert_eq!(summary.rain.extremes, None);
        assert_eq!(summary.rain.samples, 0);
        assert_eq!(summary.rain.unit, "mm");
        assert_eq!(summary.temperature.extremes, Some(Extremes { min: 12.0, max: 12.0 }));
    }

    #[test]
    fn missing_samples_are_skipped_not_zeroed() {
        let s = sample(
            Series::new("°C", vec![None, Some(-3.5), None, Some(-1.0)]),
            Series::new("km/h", vec![None, None]),
            Series::default(),
        );

        let summary = summarize(&s);

        assert_eq!(summary.temperature.extremes, Some(Extremes { min: -3.5, max: -1.0 }));
        assert_eq!(summary.temperature.samples, 2);
        assert_eq!(summary.wind_speed.extremes, None);
    }

    #[test]
    fn min_never_exceeds_max() {
        let series = [
            vec![5.0],
            vec![3.0, 3.0, 3.0],
            vec![-10.0, 40.0, 0.0, 12.5],
            (0..24).map(|h| (h as f64 * 1.7).sin() * 10.0).collect(),
        ];

        for values in series {
            let s = sample(
                Series::complete("°C", &values),
                Series::complete("km/h", &values),
                Series::complete("mm", &values),
            );
            let summary = summarize(&s);

            for quantity in Quantity::all() {
                let e = summary.series(*quantity).extremes.expect("non-empty series");
                assert!(e.min <= e.max, "{quantity}: {} > {}", e.min, e.max);
            }
        }
    }

    #[test]
    fn window_spans_first_and_last_timestamp() {
        let s = ForecastSample {
            time: vec!["2024-05-01T00:00".into(), "2024-05-01T01:00".into(), "2024-05-01T23:00".into()],
            ..Default::default()
        };

        let (from, to) = summarize(&s).window.expect("window");

        assert_eq!(from.to_string(), "2024-05-01 00:00:00");
        assert_eq!(to.to_string(), "2024-05-01 23:00:00");
    }

    #[test]
    fn unparsable_time_axis_leaves_window_empty() {
        let s = ForecastSample { time: vec!["yesterday".into()], ..Default::default() };

        assert_eq!(summarize(&s).window, None);
    }

    #[test]
    fn label_includes_admin_area_only_when_distinct() {
        let mut c = Candidate {
            id: 1,
            name: "Lima".into(),
            country: "Peru".into(),
            admin1: Some("Lima".into()),
            latitude: -12.05,
            longitude: -77.04,
        };
        assert_eq!(c.label(), "Lima, Peru");

        c.country = "United States".into();
        c.admin1 = Some("Ohio".into());
        assert_eq!(c.label(), "Lima, Ohio, United States");
    }
}
