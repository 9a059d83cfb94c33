//! `import`: parse the downloaded sources into the store
//!
//! Each table is cleared before it is repopulated, so an import always
//! reflects exactly the files currently configured.

use std::time::Instant;

use anyhow::{Context, bail};

use super::Pipeline;
use crate::chart::ChartSink;
use crate::download::local_path;
use crate::import::{import_death_file, import_pyramid, import_temperature_file};
use crate::store::Table;
use crate::utils::logging::console::{print_parse_summary, print_temperature_stats};

/// A table that can be imported on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImportTarget {
    Deaths,
    Population,
    Temperature,
}

/// Row counts written by an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub deaths: usize,
    pub population: usize,
    pub temperature: usize,
}

impl<S: ChartSink> Pipeline<S> {
    /// Import one table, or all of them when `only` is `None`
    pub fn import(&self, only: Option<ImportTarget>) -> anyhow::Result<ImportReport> {
        let start = Instant::now();
        let mut report = ImportReport::default();
        let wanted = |target| only.is_none_or(|o| o == target);

        if wanted(ImportTarget::Deaths) {
            report.deaths = self.import_deaths()?;
        }
        if wanted(ImportTarget::Population) {
            report.population = self.import_population()?;
        }
        if wanted(ImportTarget::Temperature) {
            report.temperature = self.import_temperature()?;
        }

        log::info!("Import finished in {:?}: {report:?}", start.elapsed());
        Ok(report)
    }

    fn import_deaths(&self) -> anyhow::Result<usize> {
        self.store.clear(Table::Deaths)?;
        let mut total = 0;
        for source in &self.config.death_sources {
            let path = local_path(&self.config.paths.data_dir, source);
            let (records, summary) = import_death_file(&path)
                .with_context(|| format!("Failed to import death file {}", path.display()))?;
            print_parse_summary(&summary);
            self.store.write(source.file_name(), &records)?;
            total += records.len();
        }
        Ok(total)
    }

    fn import_population(&self) -> anyhow::Result<usize> {
        self.store.clear(Table::Population)?;
        let mut total = 0;
        for pyramid in &self.config.pyramid_sources {
            let path = self.config.paths.data_dir.join(&pyramid.export);
            if !path.is_file() {
                bail!(
                    "Missing {}: export sheet `{}` of {} as delimited text first",
                    path.display(),
                    pyramid.sheet,
                    pyramid.source.file_name()
                );
            }
            let rows = import_pyramid(&path, pyramid.delimiter, &pyramid.layout)
                .with_context(|| format!("Failed to import age pyramid {}", path.display()))?;
            self.store.write(&pyramid.export, &rows)?;
            total += rows.len();
        }
        Ok(total)
    }

    fn import_temperature(&self) -> anyhow::Result<usize> {
        self.store.clear(Table::Temperature)?;
        let source = &self.config.temperature_source;
        let path = local_path(&self.config.paths.data_dir, &source.source);
        let (records, stats) = import_temperature_file(&path, source, &self.config.study_period)
            .with_context(|| format!("Failed to import temperatures {}", path.display()))?;
        print_temperature_stats(&stats, records.len());
        self.store.write(source.source.file_name(), &records)?;
        Ok(records.len())
    }
}
