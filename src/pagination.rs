use crate::http::PageFetcher;
use crate::parser::{self, selector};
use anyhow::{bail, Context, Result};
use scraper::Html;

const PAGE_LINK_SELECTOR: &str = "section.se-part .se-link-container a";

/// Base URL with exactly one trailing slash, so `<base>pg<i>/` stays well formed.
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim().trim_end_matches('/'))
}

pub fn page_urls(base_url: &str, max_page: usize) -> Vec<String> {
    let base = normalize_base_url(base_url);
    (1..=max_page).map(|page| format!("{}pg{}/", base, page)).collect()
}

/// Highest numeric pagination label in the document.
pub fn parse_max_page(html: &str) -> Result<usize> {
    let document = Html::parse_document(html);
    let link_selector = selector(PAGE_LINK_SELECTOR)?;

    let max_page = document
        .select(&link_selector)
        .filter_map(|link| parser::parse_page_label(&parser::clean_text(link)))
        .max();

    match max_page {
        Some(page) if page > 0 => Ok(page),
        _ => bail!("No numeric pagination links found; the page layout may have changed or the request was blocked"),
    }
}

pub fn discover_pages(fetcher: &dyn PageFetcher, base_url: &str) -> Result<Vec<String>> {
    let base = normalize_base_url(base_url);
    let page = fetcher
        .fetch(&base)
        .context("Failed to fetch listing index")?;
    log::info!("Listing index {} returned HTTP {}", base, page.status);

    let html = page.into_html().context("Listing index is unavailable")?;
    let max_page = parse_max_page(&html)
        .with_context(|| format!("Pagination discovery failed for {}", base))?;
    log::debug!("Discovered {} listing pages", max_page);

    Ok(page_urls(&base, max_page))
}
