use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// Progress lines for a scrape run, colored unless running in plain mode.
///
/// Output failures (closed pipe, full disk) are logged and never interrupt the run.
pub struct ScraperTUI {
    out: Box<dyn Write>,
    colored: bool,
    pages_total: usize,
    listings_completed: usize,
    listings_unlinked: usize,
    listings_failed: usize,
    pages_failed: usize,
}

impl ScraperTUI {
    pub fn new(colored: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), colored)
    }

    pub fn with_writer(out: Box<dyn Write>, colored: bool) -> Self {
        Self {
            out,
            colored,
            pages_total: 0,
            listings_completed: 0,
            listings_unlinked: 0,
            listings_failed: 0,
            pages_failed: 0,
        }
    }

    pub fn listings_completed(&self) -> usize {
        self.listings_completed
    }

    pub fn listings_failed(&self) -> usize {
        self.listings_failed
    }

    pub fn pages_failed(&self) -> usize {
        self.pages_failed
    }

    fn line(&mut self, color: Color, text: String) {
        let written = if self.colored {
            execute!(
                self.out,
                SetForegroundColor(color),
                Print(&text),
                Print("\n"),
                ResetColor
            )
        } else {
            writeln!(self.out, "{}", text).and_then(|_| self.out.flush())
        };

        if let Err(e) = written {
            log::warn!("Failed to write progress line {:?}: {}", text, e);
        }
    }

    pub fn show_pages_found(&mut self, total_pages: usize) {
        self.pages_total = total_pages;
        self.line(Color::DarkGrey, format!("📁 Found {} listing pages", total_pages));
    }

    pub fn start_page(&mut self, page: usize, url: &str) {
        let text = format!("⏳ [{}/{}] Scraping {}", page, self.pages_total, url);
        self.line(Color::White, text);
    }

    pub fn page_loaded(&mut self, status: u16, items: usize) {
        self.line(Color::DarkGrey, format!("   Status Code: {}", status));
        self.line(
            Color::White,
            format!("   Number of items found on this page: {}", items),
        );
    }

    pub fn fail_page(&mut self, url: &str, error: &anyhow::Error) {
        self.pages_failed += 1;
        self.line(Color::Red, format!("❌ Skipping page {}: {:#}", url, error));
    }

    /// A listing whose detail page was read successfully.
    pub fn complete_listing(&mut self, name: &str, unit_types: usize, images: usize) {
        self.listings_completed += 1;
        self.line(
            Color::Green,
            format!("  ✓ {} ({} unit types, {} images)", name, unit_types, images),
        );
    }

    /// A listing card without a detail link, kept with index-page fields only.
    pub fn keep_unlinked_listing(&mut self, name: &str) {
        self.listings_unlinked += 1;
        self.line(Color::DarkGrey, format!("  · {} (no detail page)", name));
    }

    /// A listing kept with sentinel detail fields because enrichment failed.
    pub fn fail_listing(&mut self, name: &str, error: &anyhow::Error) {
        self.listings_failed += 1;
        self.line(Color::Red, format!("  ✗ {}: {:#}", name, error));
    }

    pub fn show_final_summary(&mut self, items: usize, pages: usize) {
        self.line(Color::White, "─".repeat(80));
        self.line(
            Color::Green,
            format!("✅ Scraped {} items from {} pages.", items, pages),
        );
        if self.listings_failed > 0 || self.pages_failed > 0 {
            let text = format!(
                "   {} listings without details, {} pages skipped",
                self.listings_failed, self.pages_failed
            );
            self.line(Color::Red, text);
        }
        log::debug!(
            "{} listings enriched, {} without a detail link",
            self.listings_completed,
            self.listings_unlinked
        );
    }

    pub fn show_no_data(&mut self) {
        self.line(Color::Yellow, "No data was scraped.".to_string());
    }
}
