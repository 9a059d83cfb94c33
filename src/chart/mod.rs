//! Chart documents
//!
//! Every computation ends in a [`Chart`]: a title, axis labels and one or
//! more labelled series. Where a chart goes is up to the [`ChartSink`]; the
//! default sink writes one pretty-printed JSON document per chart into the
//! results directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::util::ensure_directory;
use crate::error::{Error, Result};
use crate::utils::dates::SpanFilter;

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesStyle {
    Line,
    Scatter,
}

/// A value on the x axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AxisValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u8> for AxisValue {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<NaiveDate> for AxisValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// One labelled series; `x` and `y` have the same length
///
/// A `None` in `y` is a gap in the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub style: SeriesStyle,
    pub x: Vec<AxisValue>,
    pub y: Vec<Option<f64>>,
}

impl Series {
    /// A line through `(x, y)` points
    pub fn line<X: Into<AxisValue>>(label: impl Into<String>, points: impl IntoIterator<Item = (X, f64)>) -> Self {
        Self::from_points(label, SeriesStyle::Line, points.into_iter().map(|(x, y)| (x, Some(y))))
    }

    /// Unconnected `(x, y)` points
    pub fn scatter<X: Into<AxisValue>>(label: impl Into<String>, points: impl IntoIterator<Item = (X, f64)>) -> Self {
        Self::from_points(label, SeriesStyle::Scatter, points.into_iter().map(|(x, y)| (x, Some(y))))
    }

    /// A line that may have gaps
    pub fn line_with_gaps<X: Into<AxisValue>>(
        label: impl Into<String>,
        points: impl IntoIterator<Item = (X, Option<f64>)>,
    ) -> Self {
        Self::from_points(label, SeriesStyle::Line, points)
    }

    fn from_points<X: Into<AxisValue>>(
        label: impl Into<String>,
        style: SeriesStyle,
        points: impl IntoIterator<Item = (X, Option<f64>)>,
    ) -> Self {
        let (x, y): (Vec<AxisValue>, Vec<Option<f64>>) = points.into_iter().map(|(x, y)| (x.into(), y)).unzip();
        Self {
            label: label.into(),
            style,
            x,
            y,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// A chart ready to be published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// File stem of the published chart
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
        }
    }

    #[must_use]
    pub fn axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    #[must_use]
    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }
}

/// Builder for chart file stems
///
/// `ChartName::new("mortality_by_temperature").lag(3).ages(Some(span))`
/// gives `mortality_by_temperature_delta3_ages_60_100`. A lag of 0 adds no
/// suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartName {
    parts: Vec<String>,
}

impl ChartName {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            parts: vec![base.into()],
        }
    }

    #[must_use]
    pub fn lag(mut self, lag: u32) -> Self {
        if lag != 0 {
            self.parts.push(format!("delta{lag}"));
        }
        self
    }

    #[must_use]
    pub fn ages(mut self, ages: Option<SpanFilter>) -> Self {
        if let Some(ages) = ages {
            self.parts.push(ages.file_suffix("ages"));
        }
        self
    }

    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.parts.push(suffix.into());
        self
    }
}

impl fmt::Display for ChartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("_"))
    }
}

/// Destination of finished charts
pub trait ChartSink {
    /// Publish a chart, returning where it went
    fn publish(&mut self, chart: &Chart) -> Result<PathBuf>;
}

/// Writes `<dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct JsonChartSink {
    dir: PathBuf,
}

impl JsonChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartSink for JsonChartSink {
    fn publish(&mut self, chart: &Chart) -> Result<PathBuf> {
        ensure_directory(&self.dir)?;
        let path = self.dir.join(format!("{}.json", chart.name));
        let json = serde_json::to_vec_pretty(chart)?;
        fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
        log::info!("Wrote chart {}", path.display());
        Ok(path)
    }
}

/// Keeps published charts in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryChartSink {
    pub charts: Vec<Chart>,
}

impl MemoryChartSink {
    /// Find a published chart by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.name == name)
    }
}

impl ChartSink for MemoryChartSink {
    fn publish(&mut self, chart: &Chart) -> Result<PathBuf> {
        self.charts.push(chart.clone());
        Ok(PathBuf::from(&chart.name))
    }
}
