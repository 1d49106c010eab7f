use super::pipeline_config;
use crate::core::StreamSummary;
use crate::engine::stream_with_config;
use crate::services::{IdentityStage, IterSource};
use anyhow::Result;
use std::io::Write;

/// Configuration struct for range command
#[derive(Debug, Clone)]
pub struct RangeConfig {
    pub count: u64,
    pub workers: Option<usize>,
    pub depth: usize,
    pub summary: bool,
}

/// `0..count` を恒等ステージに流し、受け取った順に1行ずつ出力する
pub fn execute_range<W: Write>(config: RangeConfig, out: &mut W) -> Result<StreamSummary> {
    let pipeline = pipeline_config(config.workers, config.depth);
    let streamer = stream_with_config(
        IterSource::new(0..config.count),
        IdentityStage::<u64>::new(),
        &pipeline,
    )?;

    while let Some(value) = streamer.pull() {
        writeln!(out, "{value}")?;
    }

    let summary = streamer.close()?;
    if config.summary {
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    }
    out.flush()?;

    Ok(summary)
}
