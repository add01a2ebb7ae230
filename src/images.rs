use crate::http::PageFetcher;
use crate::models::{Listing, NOT_AVAILABLE};
use anyhow::{Context, Result};
use reqwest::Url;
use std::fs;
use std::path::PathBuf;

/// Downloads unit-type images into one shared directory.
///
/// Files are named after the last path segment of their URL, so two URLs sharing a
/// basename overwrite each other and the later download wins.
pub struct ImageStore {
    dir: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    /// Creates the target directory (idempotent) before any download happens.
    pub fn new(dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create image directory: {}", dir.display()))?;
        Ok(Self {
            dir,
            public_prefix: public_prefix.into(),
        })
    }

    /// Downloads one image and returns the file name it was stored under.
    ///
    /// `None` for the sentinel or an empty URL, a non-2xx response, or a transport failure.
    pub fn download(&self, fetcher: &dyn PageFetcher, url: &str) -> Option<String> {
        if url.is_empty() || url == NOT_AVAILABLE {
            return None;
        }

        let Some(filename) = file_name_from_url(url) else {
            log::warn!("Cannot derive a file name from image URL {}", url);
            return None;
        };

        let page = match fetcher.fetch(url) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Image download failed for {}: {:#}", url, e);
                return None;
            }
        };

        if !page.is_success() {
            log::debug!("Image {} returned HTTP {}", url, page.status);
            return None;
        }

        let path = self.dir.join(&filename);
        if let Err(e) = fs::write(&path, &page.body) {
            log::warn!("Failed to write image {}: {}", path.display(), e);
            return None;
        }

        log::debug!("Saved {} to {}", url, path.display());
        Some(filename)
    }

    /// Downloads every unit-type image of a listing and records where it landed.
    ///
    /// Returns the number of images saved.
    pub fn materialize(&self, fetcher: &dyn PageFetcher, listing: &mut Listing) -> usize {
        let mut saved = 0;
        for unit in listing.house_types.iter_mut().filter(|unit| unit.has_image()) {
            let local = self
                .download(fetcher, &unit.image_url)
                .map(|filename| format!("{}{}", self.public_prefix, filename));
            if local.is_some() {
                saved += 1;
            }
            unit.local_image = Some(local);
        }
        saved
    }
}

/// Last segment of the URL path; `None` when the path ends in a slash.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .last()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
