//! `download`: fetch every missing source file

use anyhow::Context;

use super::Pipeline;
use crate::chart::ChartSink;
use crate::download::{DownloadOutcome, download_all};

impl<S: ChartSink> Pipeline<S> {
    /// Download the death files, age pyramids and weather observations
    pub async fn download(&self) -> anyhow::Result<()> {
        let outcomes = download_all(&self.config)
            .await
            .context("Failed to download source files")?;

        let downloaded = outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, DownloadOutcome::Downloaded(_)))
            .count();
        log::info!(
            "{downloaded} files downloaded, {} already present",
            outcomes.len() - downloaded
        );
        Ok(())
    }
}
