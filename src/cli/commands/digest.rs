use super::pipeline_config;
use crate::core::{StreamSummary, StreamerError};
use crate::engine::{stream_with_config, AsyncStreamer};
use crate::services::{FileDigestStage, WalkDirSource};
use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Configuration struct for digest command
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub directory: PathBuf,
    pub workers: Option<usize>,
    pub depth: usize,
    pub output: Option<PathBuf>,
}

fn open_output(output: Option<&PathBuf>) -> Result<Box<dyn Write + Send>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| StreamerError::io(path.display().to_string(), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// ディレクトリを遅延走査し、ファイルごとのダイジェストをJSON Linesで出力する
pub async fn execute_digest(config: DigestConfig) -> Result<StreamSummary> {
    if !config.directory.is_dir() {
        anyhow::bail!(
            "Target path is not a directory: {}",
            config.directory.display()
        );
    }

    let pipeline = pipeline_config(config.workers, config.depth);
    let streamer = stream_with_config(
        WalkDirSource::new(&config.directory).skip_errors(true),
        FileDigestStage::new(),
        &pipeline,
    )?;
    let stream = AsyncStreamer::new(streamer);

    let mut out = open_output(config.output.as_ref())?;
    let mut failed = 0usize;

    while let Some(digest) = stream.try_next().await? {
        if digest.error.is_some() {
            failed += 1;
        }
        writeln!(out, "{}", serde_json::to_string(&digest)?)?;
    }
    out.flush()?;

    let summary = stream.close().await?;
    if failed > 0 {
        log::warn!("{failed}個のファイルを読み込めませんでした");
    }
    log::info!(
        "Digested {} files in {}ms",
        summary.delivered,
        summary.elapsed_ms
    );

    Ok(summary)
}
