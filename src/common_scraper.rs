use crate::detail_scraper;
use crate::http::PageFetcher;
use crate::images::ImageStore;
use crate::listing_scraper::{self, ListingCard};
use crate::models::Listing;
use crate::pagination;
use crate::tui::ScraperTUI;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://hanzhong.fang.ke.com/loupan/hantaiqu/";

#[derive(Debug, Clone)]
pub struct ScrapingOptions {
    pub base_url: String,
    pub output_file: PathBuf,
    pub images_dir: PathBuf,
    /// Prepended to a saved image's file name to form `local_image`.
    pub image_prefix: String,
    pub max_pages: Option<usize>,
    pub download_images: bool,
    /// Pause after each detail-page enrichment.
    pub detail_delay: Duration,
    /// Pause after each listing page.
    pub page_delay: Duration,
    pub timeout: Duration,
}

impl Default for ScrapingOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_file: PathBuf::from("public/hanzhong_loupan_data.json"),
            images_dir: PathBuf::from("public/images"),
            image_prefix: "/images/".to_string(),
            max_pages: None,
            download_images: true,
            detail_delay: Duration::from_secs(1),
            page_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct ScrapingResult {
    pub loupans: Vec<Listing>,
    pub pages: usize,
}

/// Walks every listing page in order, enriching each card from its detail page.
///
/// Only pagination discovery is fatal. Failed pages are skipped and failed detail
/// pages leave the listing with sentinel detail fields.
pub fn run_scraper(
    fetcher: &dyn PageFetcher,
    options: &ScrapingOptions,
    tui: &mut ScraperTUI,
) -> Result<ScrapingResult> {
    let mut page_urls = pagination::discover_pages(fetcher, &options.base_url)?;
    if let Some(max) = options.max_pages {
        page_urls.truncate(max);
    }
    tui.show_pages_found(page_urls.len());

    let images = if options.download_images {
        Some(ImageStore::new(&options.images_dir, options.image_prefix.clone())?)
    } else {
        None
    };

    let mut loupans = Vec::new();
    for (index, page_url) in page_urls.iter().enumerate() {
        tui.start_page(index + 1, page_url);

        match scrape_listing_page(fetcher, page_url, options, images.as_ref(), tui) {
            Ok(listings) => loupans.extend(listings),
            Err(e) => tui.fail_page(page_url, &e),
        }

        thread::sleep(options.page_delay);
    }

    Ok(ScrapingResult {
        loupans,
        pages: page_urls.len(),
    })
}

fn scrape_listing_page(
    fetcher: &dyn PageFetcher,
    page_url: &str,
    options: &ScrapingOptions,
    images: Option<&ImageStore>,
    tui: &mut ScraperTUI,
) -> Result<Vec<Listing>> {
    let page = fetcher.fetch(page_url)?;
    let status = page.status;
    let html = page.into_html()?;

    let cards = listing_scraper::parse_listing_page(&html, page_url)
        .context("Failed to parse listing page")?;
    tui.page_loaded(status, cards.len());

    let mut listings = Vec::with_capacity(cards.len());
    for card in cards {
        listings.push(enrich_listing(fetcher, card, options, images, tui));
    }
    Ok(listings)
}

fn enrich_listing(
    fetcher: &dyn PageFetcher,
    card: ListingCard,
    options: &ScrapingOptions,
    images: Option<&ImageStore>,
    tui: &mut ScraperTUI,
) -> Listing {
    let ListingCard {
        mut listing,
        detail_url,
    } = card;

    let Some(detail_url) = detail_url else {
        log::debug!("No detail link for {}, keeping listing fields only", listing.name);
        tui.keep_unlinked_listing(&listing.name);
        return listing;
    };

    match detail_scraper::scrape_details(fetcher, &detail_url) {
        Ok(details) => {
            listing.apply_details(details);
            let saved = images.map_or(0, |store| store.materialize(fetcher, &mut listing));
            tui.complete_listing(&listing.name, listing.house_types.len(), saved);
        }
        Err(e) => {
            log::warn!("Detail enrichment failed for {}: {:#}", detail_url, e);
            tui.fail_listing(&listing.name, &e);
        }
    }

    thread::sleep(options.detail_delay);
    listing
}
