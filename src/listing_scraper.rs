use crate::models::Listing;
use crate::parser::{self, selector};
use anyhow::Result;
use scraper::{ElementRef, Html};

const CARD_SELECTOR: &str = "div.resblock-desc-wrapper";

/// One listing card: the fields read from the index page plus where its detail page lives.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub listing: Listing,
    pub detail_url: Option<String>,
}

/// Extracts every listing card on an index page. A page without cards yields an empty list.
pub fn parse_listing_page(html: &str, page_url: &str) -> Result<Vec<ListingCard>> {
    let document = Html::parse_document(html);
    let card_selector = selector(CARD_SELECTOR)?;

    let mut cards = Vec::new();
    for card in document.select(&card_selector) {
        cards.push(parse_card(card, page_url)?);
    }
    Ok(cards)
}

fn parse_card(card: ElementRef, page_url: &str) -> Result<ListingCard> {
    let mut listing = Listing::unavailable();
    let mut detail_url = None;

    let name_selector = selector("a.name")?;
    if let Some(name) = card.select(&name_selector).next() {
        listing.name = parser::clean_text(name);
        detail_url = name
            .value()
            .attr("href")
            .and_then(|href| parser::resolve_url(page_url, href));
    }

    // First badge is the sales status, second the property type.
    let badge_selector = selector("span.resblock-type")?;
    let badges: Vec<String> = card.select(&badge_selector).map(parser::clean_text).collect();
    if let Some(status) = badges.first() {
        listing.status = status.clone();
    }
    if let Some(kind) = badges.get(1) {
        listing.listing_type = kind.clone();
    }

    listing.location = parser::text_or_sentinel(card, "a.resblock-location");

    let room_selector = selector("a.resblock-room")?;
    if let Some(room) = card.select(&room_selector).next() {
        let span_selector = selector("span")?;
        let labels: Vec<String> = room.select(&span_selector).map(parser::clean_text).collect();
        listing.room_types = parser::join_room_types(&labels);
        listing.area = parser::text_or_sentinel(room, "span.area");
    }

    let tag_selector = selector("div.resblock-tag")?;
    if let Some(tags) = card.select(&tag_selector).next() {
        let span_selector = selector("span")?;
        let labels: Vec<String> = tags.select(&span_selector).map(parser::clean_text).collect();
        listing.tags = parser::join_tags(&labels);
    }

    let price_selector = selector("div.resblock-price")?;
    if let Some(price) = card.select(&price_selector).next() {
        listing.price = parser::text_or_sentinel(price, "span.number");
        listing.price_unit = parser::text_or_sentinel(price, "span.desc");
        listing.total_price = parser::text_or_sentinel(price, "div.second");
    }

    Ok(ListingCard { listing, detail_url })
}
