use crate::http::PageFetcher;
use crate::models::{not_available, BuildingInfo, ListingDetails, UnitType};
use crate::parser::{self, selector};
use anyhow::{Context, Result};
use scraper::{ElementRef, Html};

const LATEST_OPENING_LABEL: &str = "最新开盘";
const GREEN_RATIO_LABEL: &str = "绿化率";
const PLOT_RATIO_LABEL: &str = "容积率";
const PROPERTY_FEE_LABEL: &str = "物业费";

/// What a detail page yields before the secondary info page is consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub latest_open_date: String,
    pub house_types: Vec<UnitType>,
    pub more_info_url: Option<String>,
}

/// Fetches a detail page and, when linked, its "more building info" page.
///
/// A failed detail fetch is an error for the caller to downgrade. A failed secondary
/// fetch only leaves the building fields empty.
pub fn scrape_details(fetcher: &dyn PageFetcher, detail_url: &str) -> Result<ListingDetails> {
    let html = fetcher
        .fetch(detail_url)
        .and_then(|page| page.into_html())
        .context("Failed to load detail page")?;

    let detail = parse_detail_page(&html, detail_url)?;
    let mut details = ListingDetails {
        latest_open_date: detail.latest_open_date,
        house_types: detail.house_types,
        building: BuildingInfo::default(),
    };

    if let Some(more_info_url) = detail.more_info_url {
        match fetcher.fetch(&more_info_url).and_then(|page| page.into_html()) {
            Ok(html) => details.building = parse_building_info(&html)?,
            Err(e) => log::warn!("Skipping building info {}: {:#}", more_info_url, e),
        }
    }

    Ok(details)
}

pub fn parse_detail_page(html: &str, page_url: &str) -> Result<DetailPage> {
    let document = Html::parse_document(html);

    let more_info_selector = selector("div.more-building a")?;
    let more_info_url = document
        .select(&more_info_selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| parser::resolve_url(page_url, href));

    Ok(DetailPage {
        latest_open_date: latest_open_date(&document)?,
        house_types: house_types(&document, page_url)?,
        more_info_url,
    })
}

fn latest_open_date(document: &Html) -> Result<String> {
    // Title and value spans are not siblings, so walk both in document order.
    let spans = selector("span.title, span.content")?;
    let mut label_seen = false;

    for span in document.select(&spans) {
        let classes: Vec<&str> = span.value().classes().collect();
        if !label_seen {
            label_seen = classes.contains(&"title") && parser::clean_text(span) == LATEST_OPENING_LABEL;
        } else if classes.contains(&"content") {
            return Ok(parser::clean_text(span));
        }
    }

    Ok(not_available())
}

fn house_types(document: &Html, page_url: &str) -> Result<Vec<UnitType>> {
    let container_selector = selector("div.houselist.frame-container.carousel")?;
    let item_selector = selector("li.item.top-item")?;

    let Some(container) = document.select(&container_selector).next() else {
        return Ok(Vec::new());
    };

    Ok(container
        .select(&item_selector)
        .map(|item| unit_type(item, page_url))
        .collect())
}

fn unit_type(item: ElementRef, page_url: &str) -> UnitType {
    UnitType {
        name: parser::text_or_sentinel(item, "div.content-title"),
        area: parser::text_or_sentinel(item, "div.content-area"),
        price: parser::text_or_sentinel(item, "div.content-price"),
        image_url: parser::extract_attr(item, "img.img", "src")
            .and_then(|src| parser::resolve_url(page_url, &src))
            .unwrap_or_else(not_available),
        local_image: None,
    }
}

/// Green ratio, plot ratio and property fee from the labeled boxes.
///
/// Labels match by substring. A label that appears more than once keeps its last value.
pub fn parse_building_info(html: &str) -> Result<BuildingInfo> {
    let document = Html::parse_document(html);
    let item_selector = selector("ul.x-box li")?;
    let mut info = BuildingInfo::default();

    for item in document.select(&item_selector) {
        let (Some(label), Some(value)) = (
            parser::extract_text(item, "span.label"),
            parser::extract_text(item, "span.label-val"),
        ) else {
            continue;
        };

        if label.contains(GREEN_RATIO_LABEL) {
            info.green_ratio = Some(value);
        } else if label.contains(PLOT_RATIO_LABEL) {
            info.plot_ratio = Some(value);
        } else if label.contains(PROPERTY_FEE_LABEL) {
            info.property_fee = Some(value);
        }
    }

    Ok(info)
}
