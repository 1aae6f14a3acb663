use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::ProgressBar;
use tokio::{fs::File, io::AsyncWriteExt};
use url::Url;

use crate::ingest::pipeline::error::DownloadError;

/// Latest English Wikivoyage articles, multistream bzip2.
pub(crate) const DEFAULT_DUMP_URL: &str = "https://dumps.wikimedia.org/enwikivoyage/latest/enwikivoyage-latest-pages-articles-multistream.xml.bz2";

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    output.with_file_name(name)
}

/// Streams `url` to `output` piece by piece. The file only appears under its
/// final name once every byte has arrived.
pub(crate) async fn download(
    url: &Url,
    output: &Path,
    progress: &ProgressBar,
) -> Result<u64, DownloadError> {
    let response = reqwest::get(url.clone()).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status));
    }
    if let Some(length) = response.content_length() {
        progress.set_length(length);
    }
    progress.set_message("Downloading");

    let partial = partial_path(output);
    let io_error = |e| DownloadError::Io(partial.clone(), e);
    let mut file = File::create(&partial).await.map_err(io_error)?;
    let mut received = 0u64;
    let mut pieces = response.bytes_stream();
    while let Some(piece) = pieces.next().await {
        let piece = piece?;
        file.write_all(&piece).await.map_err(io_error)?;
        received += piece.len() as u64;
        progress.set_position(received);
    }
    file.flush().await.map_err(io_error)?;
    file.sync_all().await.map_err(io_error)?;
    drop(file);

    tokio::fs::rename(&partial, output)
        .await
        .map_err(|e| DownloadError::Io(output.to_path_buf(), e))?;
    progress.finish_with_message("Downloaded");
    Ok(received)
}
