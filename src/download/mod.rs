//! Source file downloads
//!
//! Files are fetched one at a time and streamed to disk. A file already
//! present in the data directory is never downloaded again; partial
//! downloads are written under a `.part` name and renamed once complete.

use std::path::{Path, PathBuf};
use std::time::Instant;

use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::config::{AnalysisConfig, SourceFile};
use crate::error::{Error, Result};
use crate::utils::logging::{create_byte_progress_bar, finish_progress_bar, log_operation_start};

/// What happened to one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Fetched, with the number of bytes written
    Downloaded(u64),
    /// Already on disk
    Skipped,
}

/// Every remote file the pipeline needs, in download order
#[must_use]
pub fn sources(config: &AnalysisConfig) -> Vec<&SourceFile> {
    config
        .death_sources
        .iter()
        .chain(config.pyramid_sources.iter().map(|p| &p.source))
        .chain(std::iter::once(&config.temperature_source.source))
        .collect()
}

/// Local path of a source inside the data directory
#[must_use]
pub fn local_path(data_dir: &Path, source: &SourceFile) -> PathBuf {
    data_dir.join(source.file_name())
}

/// Download every missing source file
pub async fn download_all(config: &AnalysisConfig) -> Result<Vec<(PathBuf, DownloadOutcome)>> {
    let data_dir = &config.paths.data_dir;
    fs::create_dir_all(data_dir)
        .await
        .map_err(|e| Error::io(data_dir, e))?;

    let client = reqwest::Client::new();
    let mut outcomes = Vec::new();
    for source in sources(config) {
        let path = local_path(data_dir, source);
        let outcome = download_file(&client, source, &path).await?;
        outcomes.push((path, outcome));
    }
    Ok(outcomes)
}

/// Download one file unless it already exists
pub async fn download_file(
    client: &reqwest::Client,
    source: &SourceFile,
    path: &Path,
) -> Result<DownloadOutcome> {
    if fs::try_exists(path).await.map_err(|e| Error::io(path, e))? {
        log::debug!("{} already downloaded", path.display());
        return Ok(DownloadOutcome::Skipped);
    }

    let start = Instant::now();
    log_operation_start("Downloading", path);
    let response = client.get(&source.url).send().await?.error_for_status()?;
    let progress = create_byte_progress_bar(response.content_length(), Some(source.file_name()));

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    let mut file = File::create(&partial)
        .await
        .map_err(|e| Error::io(&partial, e))?;
    let mut written = 0_u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(&partial, e))?;
        written += chunk.len() as u64;
        progress.set_position(written);
    }
    file.flush().await.map_err(|e| Error::io(&partial, e))?;
    drop(file);
    fs::rename(&partial, path)
        .await
        .map_err(|e| Error::io(path, e))?;

    finish_progress_bar(&progress, Some(source.file_name()));
    log::info!(
        "Downloaded {} ({written} bytes) in {:?}",
        path.display(),
        start.elapsed()
    );
    Ok(DownloadOutcome::Downloaded(written))
}
