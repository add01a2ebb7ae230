use crate::models::not_available;
use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

/// Substring that marks a room-configuration span ("3室2厅").
pub const ROOM_MARKER: &str = "室";

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Failed to parse selector {:?}: {:?}", css, e))
}

/// Text content of an element with surrounding whitespace removed.
pub fn clean_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first descendant matching `css`, if any.
pub fn extract_text(node: ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    node.select(&selector).next().map(clean_text)
}

pub fn text_or_sentinel(node: ElementRef, css: &str) -> String {
    extract_text(node, css).unwrap_or_else(not_available)
}

pub fn extract_attr(node: ElementRef, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    node.select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
}

/// Keeps only room-count labels and joins them with `/`.
pub fn join_room_types<S: AsRef<str>>(labels: &[S]) -> String {
    let rooms: Vec<&str> = labels
        .iter()
        .map(|label| label.as_ref().trim())
        .filter(|label| label.contains(ROOM_MARKER))
        .collect();

    if rooms.is_empty() {
        not_available()
    } else {
        rooms.join("/")
    }
}

pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    let tags: Vec<&str> = tags
        .iter()
        .map(|tag| tag.as_ref().trim())
        .filter(|tag| !tag.is_empty())
        .collect();

    if tags.is_empty() {
        not_available()
    } else {
        tags.join(", ")
    }
}

/// Numeric pagination label, `None` for "next"/"prev" style links.
pub fn parse_page_label(label: &str) -> Option<usize> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"^\d+$").unwrap());

    let label = label.trim();
    if digits.is_match(label) {
        label.parse().ok()
    } else {
        None
    }
}

/// Resolves an href against the page it was found on.
pub fn resolve_url(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(page_url).ok()?;
    base.join(href).ok().map(String::from)
}
