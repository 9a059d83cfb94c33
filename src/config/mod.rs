//! Configuration for the mortality analysis pipeline.
//!
//! The whole configuration is loaded once at start-up (from JSON, or from the
//! built-in defaults) and passed by reference to every phase.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::util::safe_read;
use crate::error::{Error, Result};
use crate::utils::dates::DateRange;

const DEATH_FILES_BASE_URL: &str =
    "https://static.data.gouv.fr/resources/fichier-des-personnes-decedees";

/// Release folder and file name of every yearly death file
const DEATH_FILE_RELEASES: &[&str] = &[
    "20191209-190504/deces-2000.txt",
    "20191209-190558/deces-2001.txt",
    "20191209-190702/deces-2002.txt",
    "20191209-190755/deces-2003.txt",
    "20191209-190852/deces-2004.txt",
    "20191209-190939/deces-2005.txt",
    "20191209-191027/deces-2006.txt",
    "20191209-191117/deces-2007.txt",
    "20191209-191225/deces-2008.txt",
    "20191209-191359/deces-2009.txt",
    "20191209-191659/deces-2010.txt",
    "20191209-191745/deces-2011.txt",
    "20191209-191851/deces-2012.txt",
    "20191209-191938/deces-2013.txt",
    "20191209-192022/deces-2014.txt",
    "20191209-192119/deces-2015.txt",
    "20191209-192203/deces-2016.txt",
    "20191209-192304/deces-2017.txt",
    "20191205-191652/deces-2018.txt",
    "20200113-173945/deces-2019.txt",
    "20210112-143457/deces-2020.txt",
    "20210409-131502/deces-2021-t1.txt",
    "20210709-174839/deces-2021-t2.txt",
    "20211012-093424/deces-2021-t3.txt",
    "20211118-093353/deces-2021-m10.txt",
    "20211215-093836/deces-2021-m11.txt",
    "20220106-161749/deces-2021-m12.txt",
];

const TEMPERATURE_URL: &str = "https://public.opendatasoft.com/explore/dataset/donnees-synop-essentielles-omm/download/?format=csv&timezone=Europe/Berlin&lang=en&use_labels_for_header=true&csv_separator=%3B";

/// A remote file and the local name it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub url: String,
    /// Local file name; defaults to the last segment of the URL
    #[serde(default)]
    pub name: Option<String>,
}

impl SourceFile {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn named(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: Some(name.into()),
        }
    }

    /// Local file name of the source
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.url.rsplit('/').next().unwrap_or(&self.url))
    }
}

/// Inclusive span of 1-based sheet rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub first: usize,
    pub last: usize,
}

impl RowSpan {
    /// Zero-based row indices covered by the span
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.first.saturating_sub(1)..=self.last.saturating_sub(1)
    }
}

/// Position of the data inside an age pyramid sheet
///
/// Row and column numbers are 1-based, as displayed by spreadsheet software.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PyramidLayout {
    /// One column per year, men and women in two stacked blocks
    MultiYear {
        year_row: usize,
        men_rows: RowSpan,
        women_rows: RowSpan,
        age_col: usize,
        first_year: i32,
        last_year: i32,
    },
    /// A single year with one total column
    SingleYear {
        year: i32,
        rows: RowSpan,
        age_col: usize,
        count_col: usize,
    },
}

/// An age pyramid workbook and the sheet to read from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidSource {
    pub source: SourceFile,
    /// Sheet name inside the workbook
    pub sheet: String,
    /// Delimited export of that sheet, relative to the data directory
    pub export: String,
    #[serde(default = "default_sheet_delimiter")]
    pub delimiter: char,
    pub layout: PyramidLayout,
}

fn default_sheet_delimiter() -> char {
    ';'
}

/// Weather observations file and its column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureSource {
    pub source: SourceFile,
    pub delimiter: char,
    pub date_column: String,
    pub temperature_column: String,
    pub department_column: String,
}

/// A named date range used to compare periods side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangePreset {
    /// Short identifier used on the command line and in file names
    pub key: String,
    /// Human readable label used in chart legends
    pub name: String,
    /// Year of the population used to compute rates for this range
    pub year: i32,
    pub range: DateRange,
}

/// Months of the seasonal reference window (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalWindow {
    pub start_month: u32,
    pub end_month: u32,
}

impl SeasonalWindow {
    #[must_use]
    pub fn contains(&self, month: u32) -> bool {
        month >= self.start_month && month <= self.end_month
    }
}

impl Default for SeasonalWindow {
    fn default() -> Self {
        Self {
            start_month: 6,
            end_month: 8,
        }
    }
}

/// Settings of the cohort forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// First year of the window used to average mortality rates
    pub history_first_year: i32,
    /// Last year of the window used to average mortality rates
    pub history_last_year: i32,
    /// Year whose population starts the projection
    pub start_year: i32,
    /// Last projected year
    pub end_year: i32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_first_year: 2010,
            history_last_year: 2019,
            start_year: 2020,
            end_year: 2050,
        }
    }
}

/// Directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Downloaded source files
    pub data_dir: PathBuf,
    /// Parquet tables
    pub store_dir: PathBuf,
    /// Chart documents
    pub results_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_dir: PathBuf::from("data/store"),
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Configuration of every phase of the pipeline
///
/// Fields missing from a configuration file keep their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub paths: PathConfig,
    pub death_sources: Vec<SourceFile>,
    pub pyramid_sources: Vec<PyramidSource>,
    pub temperature_source: TemperatureSource,
    /// Period covered by the standardization and temperature computations
    pub study_period: DateRange,
    pub date_presets: Vec<DateRangePreset>,
    pub seasonal_window: SeasonalWindow,
    pub forecast: ForecastConfig,
    /// Ages drawn on the temperature factor chart
    pub temperature_chart_ages: Vec<u8>,
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = safe_read(path, "configuration")?;
        let config: Self = serde_json::from_slice(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        let window = self.seasonal_window;
        if !(1..=12).contains(&window.start_month)
            || !(1..=12).contains(&window.end_month)
            || window.end_month < window.start_month
        {
            return Err(Error::Config(format!(
                "invalid seasonal window {}..={}",
                window.start_month, window.end_month
            )));
        }
        let forecast = self.forecast;
        if forecast.history_last_year < forecast.history_first_year {
            return Err(Error::Config("forecast history window is empty".to_string()));
        }
        if forecast.end_year < forecast.start_year {
            return Err(Error::Config("forecast ends before it starts".to_string()));
        }
        Ok(())
    }

    /// Find a date preset by key
    pub fn preset(&self, key: &str) -> Result<&DateRangePreset> {
        self.date_presets
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| Error::Config(format!("unknown date preset `{key}`")))
    }

    /// Select presets by key, or all of them when no key is given
    pub fn presets(&self, keys: &[String]) -> Result<Vec<&DateRangePreset>> {
        if keys.is_empty() {
            return Ok(self.date_presets.iter().collect());
        }
        keys.iter().map(|k| self.preset(k)).collect()
    }
}

/// Presets drawn on the same chart must cover the same number of days
pub fn ensure_same_duration(presets: &[&DateRangePreset]) -> Result<()> {
    let mut durations = presets.iter().map(|p| (p, p.range.duration_days()));
    if let Some((first, expected)) = durations.next() {
        for (preset, duration) in durations {
            if duration != expected {
                return Err(Error::Config(format!(
                    "preset `{}` spans {duration} days but `{}` spans {expected}",
                    preset.key, first.key
                )));
            }
        }
    }
    Ok(())
}

fn preset(key: &str, name: &str, year: i32, start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRangePreset {
    let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    DateRangePreset {
        key: key.to_string(),
        name: name.to_string(),
        year,
        range: DateRange {
            start: date(start),
            end: date(end),
        },
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let death_sources = DEATH_FILE_RELEASES
            .iter()
            .map(|release| SourceFile::new(format!("{DEATH_FILES_BASE_URL}/{release}")))
            .collect();

        let pyramid_sources = vec![
            PyramidSource {
                source: SourceFile::new(
                    "https://www.insee.fr/fr/statistiques/pyramide/3312958/xls/pyramides-des-ages_bilan-demo_2019.xls",
                ),
                sheet: "France métropolitaine".to_string(),
                export: "pyramides-des-ages_bilan-demo_2019.metro.csv".to_string(),
                delimiter: ';',
                layout: PyramidLayout::MultiYear {
                    year_row: 9,
                    men_rows: RowSpan { first: 11, last: 116 },
                    women_rows: RowSpan { first: 120, last: 225 },
                    age_col: 2,
                    first_year: 2000,
                    last_year: 2020,
                },
            },
            PyramidSource {
                source: SourceFile::new(
                    "https://www.insee.fr/fr/statistiques/fichier/5007688/Pyramides-des-ages-2021.xlsx",
                ),
                sheet: "2021 Métro".to_string(),
                export: "Pyramides-des-ages-2021.metro.csv".to_string(),
                delimiter: ';',
                layout: PyramidLayout::SingleYear {
                    year: 2021,
                    rows: RowSpan { first: 8, last: 112 },
                    age_col: 2,
                    count_col: 5,
                },
            },
        ];

        Self {
            paths: PathConfig::default(),
            death_sources,
            pyramid_sources,
            temperature_source: TemperatureSource {
                source: SourceFile::named(TEMPERATURE_URL, "meteo.csv"),
                delimiter: ';',
                date_column: "Date".to_string(),
                temperature_column: "Température (°C)".to_string(),
                department_column: "department (code)".to_string(),
            },
            study_period: DateRange {
                start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
                end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap_or_default(),
            },
            date_presets: vec![
                preset("grippe-2017", "Grippe (2017-01-01 to 2017-02-01)", 2017, (2017, 1, 1), (2017, 2, 1)),
                preset("covid-2020", "Covid19 (2020-03-20 to 2020-04-20)", 2020, (2020, 3, 20), (2020, 4, 20)),
            ],
            seasonal_window: SeasonalWindow::default(),
            forecast: ForecastConfig::default(),
            temperature_chart_ages: (40..=90).step_by(10).collect(),
        }
    }
}

impl fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Configuration:")?;
        writeln!(f, "  Data Directory: {}", self.paths.data_dir.display())?;
        writeln!(f, "  Store Directory: {}", self.paths.store_dir.display())?;
        writeln!(f, "  Results Directory: {}", self.paths.results_dir.display())?;
        writeln!(f, "  Death Files: {}", self.death_sources.len())?;
        writeln!(f, "  Age Pyramids: {}", self.pyramid_sources.len())?;
        writeln!(f, "  Study Period: {}", self.study_period)?;
        writeln!(
            f,
            "  Seasonal Window: months {}-{}",
            self.seasonal_window.start_month, self.seasonal_window.end_month
        )?;
        writeln!(
            f,
            "  Forecast: {}-{} (rates averaged over {}-{})",
            self.forecast.start_year,
            self.forecast.end_year,
            self.forecast.history_first_year,
            self.forecast.history_last_year
        )?;
        for preset in &self.date_presets {
            writeln!(f, "  Preset {}: {} ({})", preset.key, preset.name, preset.range)?;
        }
        Ok(())
    }
}
