use crate::models::{Listing, ScrapeResult};
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const SCRAPE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stamps the collected listings with the current local time.
pub fn new_scrape_result(loupans: Vec<Listing>) -> ScrapeResult {
    ScrapeResult {
        scrape_time: Local::now().format(SCRAPE_TIME_FORMAT).to_string(),
        loupans,
    }
}

/// Writes the result as indented UTF-8 JSON, replacing any existing file.
pub fn save_to_json(result: &ScrapeResult, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    result
        .serialize(&mut serializer)
        .context("Failed to serialize scrape result")?;
    writer.flush().context("Failed to flush output file")?;

    log::debug!("Wrote {} listings to {}", result.loupans.len(), output_path.display());
    Ok(())
}
