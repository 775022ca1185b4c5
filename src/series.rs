use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// One of the cumulative counts published by the historical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cases,
    Recovered,
    Deaths,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Recovered => "recovered",
            Metric::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown plot type \"{0}\"")]
pub struct UnknownPlot(pub String);

impl FromStr for Metric {
    type Err = UnknownPlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cases" => Ok(Metric::Cases),
            "recovered" => Ok(Metric::Recovered),
            "deaths" => Ok(Metric::Deaths),
            other => Err(UnknownPlot(other.to_string())),
        }
    }
}

/// What the user picked on the plot keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotChoice {
    Single(Metric),
    Comparison(Metric, Metric),
}

impl PlotChoice {
    /// Payload attached to the keyboard button.
    pub fn callback_data(&self) -> String {
        match self {
            PlotChoice::Single(m) => m.to_string(),
            PlotChoice::Comparison(a, b) => format!("{a} {b}"),
        }
    }
}

impl FromStr for PlotChoice {
    type Err = UnknownPlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownPlot(s.to_string());
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts[..] {
            [single] => Ok(PlotChoice::Single(single.parse().map_err(|_| unknown())?)),
            [a, b] => {
                let a: Metric = a.parse().map_err(|_| unknown())?;
                let b: Metric = b.parse().map_err(|_| unknown())?;
                if a == b {
                    return Err(unknown());
                }
                Ok(PlotChoice::Comparison(a, b))
            }
            _ => Err(unknown()),
        }
    }
}

/// Cumulative counts per date, in the order the API listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSeries {
    points: Vec<(String, i64)>,
}

/// Day-over-day increments derived from a [`TimeSeries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaSeries {
    points: Vec<(String, i64)>,
}

impl TimeSeries {
    pub fn new(points: Vec<(String, i64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(String, i64)] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The first day keeps its cumulative value, every later day is the
    /// difference to the previous one. Corrections in the source data show
    /// up as negative deltas.
    pub fn to_delta(&self) -> DeltaSeries {
        let mut points = Vec::with_capacity(self.points.len());
        if let Some(first) = self.points.first() {
            points.push(first.clone());
        }
        for pair in self.points.windows(2) {
            let (_, prev) = &pair[0];
            let (date, current) = &pair[1];
            points.push((date.clone(), current.saturating_sub(*prev)));
        }
        DeltaSeries { points }
    }
}

impl DeltaSeries {
    pub fn points(&self) -> &[(String, i64)] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(String, i64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// Walks the JSON object in document order so the dates are never resorted.
impl<'de> Deserialize<'de> for TimeSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SeriesVisitor;

        impl<'de> Visitor<'de> for SeriesVisitor {
            type Value = TimeSeries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping dates to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TimeSeries, A::Error> {
                let mut points = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((date, count)) = map.next_entry::<String, i64>()? {
                    points.push((date, count));
                }
                Ok(TimeSeries { points })
            }
        }

        deserializer.deserialize_map(SeriesVisitor)
    }
}

/// The `timeline` object of the historical endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Timeline {
    cases: TimeSeries,
    recovered: TimeSeries,
    deaths: TimeSeries,
}

impl Timeline {
    pub fn get(&self, metric: Metric) -> &TimeSeries {
        match metric {
            Metric::Cases => &self.cases,
            Metric::Recovered => &self.recovered,
            Metric::Deaths => &self.deaths,
        }
    }
}
