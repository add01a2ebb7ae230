use anyhow::{bail, Result};
use loupanfinder::common_scraper::{run_scraper, ScrapingOptions};
use loupanfinder::http::{FetchedPage, PageFetcher};
use loupanfinder::models::{ScrapeResult, NOT_AVAILABLE};
use loupanfinder::output;
use loupanfinder::tui::ScraperTUI;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const BASE: &str = "https://hanzhong.fang.ke.com/loupan/hantaiqu/";

/// Serves canned responses by URL and records every request.
#[derive(Default)]
struct MapFetcher {
    pages: HashMap<String, (u16, Vec<u8>)>,
    requests: RefCell<Vec<String>>,
}

impl MapFetcher {
    fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.as_bytes().to_vec()));
        self
    }

    fn bytes(mut self, url: &str, status: u16, body: &[u8]) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_vec()));
        self
    }

    fn requested(&self, url: &str) -> bool {
        self.requests.borrow().iter().any(|r| r == url)
    }
}

impl PageFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.requests.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some((status, body)) => Ok(FetchedPage {
                url: url.to_string(),
                status: *status,
                body: body.clone(),
            }),
            None => bail!("connection reset: {}", url),
        }
    }
}

fn options(images_dir: &Path) -> ScrapingOptions {
    ScrapingOptions {
        base_url: BASE.to_string(),
        output_file: images_dir.join("data.json"),
        images_dir: images_dir.join("images"),
        detail_delay: Duration::ZERO,
        page_delay: Duration::ZERO,
        ..ScrapingOptions::default()
    }
}

fn index(pages: usize) -> String {
    let links: String = (1..=pages)
        .map(|page| format!(r#"<a href="/loupan/hantaiqu/pg{page}/">{page}</a>"#))
        .collect();
    format!(
        r##"<html><body><section class="se-part"><div class="se-link-container">{links}<a href="#">下一页</a></div></section></body></html>"##
    )
}

fn card(name_html: &str) -> String {
    format!(
        r#"<div class="resblock-desc-wrapper">
             {name_html}
             <span class="resblock-type">在售</span><span class="resblock-type">住宅</span>
             <a class="resblock-location">汉台区/北关</a>
             <a class="resblock-room"><span>3室2厅</span><span>89㎡</span><span>2室1厅</span><span class="area">建面 89㎡</span></a>
             <div class="resblock-price"><span class="number">6500</span><span class="desc">元/㎡(均价)</span></div>
           </div>"#
    )
}

const DETAIL: &str = r#"
    <html><body>
    <span class="title">最新开盘</span><span class="content">2024-05-01</span>
    <div class="houselist frame-container carousel"><ul>
      <li class="item top-item">
        <img class="img" src="https://img.example.com/hx/a1.jpg">
        <div class="content-title">A户型</div><div class="content-area">建面 89㎡</div>
      </li>
      <li class="item top-item">
        <img class="img" src="https://img.example.com/hx/b2.jpg">
        <div class="content-title">B户型</div>
      </li>
    </ul></div>
    <div class="more-building"><a href="/loupan/p_tianhanfu/xiangqing/">更多</a></div>
    </body></html>
"#;

const MORE_INFO: &str = r#"
    <ul class="x-box">
      <li><span class="label">绿化率：</span><span class="label-val">35%</span></li>
      <li><span class="label">容积率：</span><span class="label-val">2.5</span></li>
      <li><span class="label">物业费：</span><span class="label-val">1.8元/月/㎡</span></li>
    </ul>
"#;

#[test]
fn single_card_without_detail_link() {
    let page = format!("<html><body>{}</body></html>", card(r#"<a class="name">Sunrise Gardens</a>"#));
    let fetcher = MapFetcher::default()
        .page(BASE, 200, &index(1))
        .page(&format!("{BASE}pg1/"), 200, &page);

    let dir = tempfile::tempdir().unwrap();
    let result = run_scraper(&fetcher, &options(dir.path()), &mut ScraperTUI::new(false)).unwrap();

    assert_eq!(result.pages, 1);
    assert_eq!(result.loupans.len(), 1);

    let listing = &result.loupans[0];
    assert_eq!(listing.name, "Sunrise Gardens");
    assert!(listing.house_types.is_empty());
    assert_eq!(listing.latest_open_date, NOT_AVAILABLE);
    assert_eq!(listing.green_ratio, None);
    assert_eq!(listing.plot_ratio, None);
    assert_eq!(listing.property_fee, None);
    assert_eq!(listing.room_types, "3室2厅/2室1厅");
    assert_eq!(listing.tags, NOT_AVAILABLE);
    assert_eq!(listing.total_price, NOT_AVAILABLE);
    assert_eq!(fetcher.requests.borrow().len(), 2);
}

#[test]
fn full_run_enriches_downloads_and_survives_failures() {
    let page1 = format!(
        "<html><body>{}{}</body></html>",
        card(r#"<a class="name" href="/loupan/p_tianhanfu/">天汉府</a>"#),
        card(r#"<a class="name" href="/loupan/p_broken/">汉江湾</a>"#),
    );
    let page3 = format!(
        "<html><body>{}</body></html>",
        card(r#"<a class="name">无链接楼盘</a>"#)
    );

    let fetcher = MapFetcher::default()
        .page(BASE, 200, &index(3))
        .page(&format!("{BASE}pg1/"), 200, &page1)
        .page(&format!("{BASE}pg2/"), 503, "busy")
        .page(&format!("{BASE}pg3/"), 200, &page3)
        .page("https://hanzhong.fang.ke.com/loupan/p_tianhanfu/", 200, DETAIL)
        .page("https://hanzhong.fang.ke.com/loupan/p_tianhanfu/xiangqing/", 200, MORE_INFO)
        .page("https://hanzhong.fang.ke.com/loupan/p_broken/", 404, "not found")
        .bytes("https://img.example.com/hx/a1.jpg", 200, b"\x89PNG")
        .bytes("https://img.example.com/hx/b2.jpg", 404, b"");

    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let mut tui = ScraperTUI::new(false);
    let result = run_scraper(&fetcher, &opts, &mut tui).unwrap();

    assert_eq!(result.pages, 3);
    assert_eq!(tui.pages_failed(), 1);
    assert_eq!(tui.listings_failed(), 1);
    assert_eq!(tui.listings_completed(), 1);

    let names: Vec<&str> = result.loupans.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["天汉府", "汉江湾", "无链接楼盘"]);

    let enriched = &result.loupans[0];
    assert_eq!(enriched.latest_open_date, "2024-05-01");
    assert_eq!(enriched.green_ratio.as_deref(), Some("35%"));
    assert_eq!(enriched.plot_ratio.as_deref(), Some("2.5"));
    assert_eq!(enriched.property_fee.as_deref(), Some("1.8元/月/㎡"));
    assert_eq!(enriched.house_types.len(), 2);
    assert_eq!(
        enriched.house_types[0].local_image,
        Some(Some("/images/a1.jpg".to_string()))
    );
    assert_eq!(enriched.house_types[1].local_image, Some(None));
    assert_eq!(
        fs::read(dir.path().join("images").join("a1.jpg")).unwrap(),
        b"\x89PNG".to_vec()
    );
    assert!(!dir.path().join("images").join("b2.jpg").exists());

    let broken = &result.loupans[1];
    assert_eq!(broken.status, "在售");
    assert_eq!(broken.latest_open_date, NOT_AVAILABLE);
    assert!(broken.house_types.is_empty());

    output::save_to_json(&output::new_scrape_result(result.loupans.clone()), &opts.output_file).unwrap();
    let saved: ScrapeResult =
        serde_json::from_str(&fs::read_to_string(&opts.output_file).unwrap()).unwrap();
    assert_eq!(saved.loupans, result.loupans);
}

#[test]
fn missing_pagination_aborts_the_run() {
    let fetcher = MapFetcher::default().page(BASE, 200, "<html><body>访问受限</body></html>");

    let dir = tempfile::tempdir().unwrap();
    let result = run_scraper(&fetcher, &options(dir.path()), &mut ScraperTUI::new(false));

    assert!(result.is_err());
    assert!(!fetcher.requested(&format!("{BASE}pg1/")));
}

#[test]
fn max_pages_limits_the_walk_and_skip_images_downloads_nothing() {
    let page = format!(
        "<html><body>{}</body></html>",
        card(r#"<a class="name" href="/loupan/p_tianhanfu/">天汉府</a>"#)
    );
    let fetcher = MapFetcher::default()
        .page(BASE, 200, &index(5))
        .page(&format!("{BASE}pg1/"), 200, &page)
        .page("https://hanzhong.fang.ke.com/loupan/p_tianhanfu/", 200, DETAIL)
        .page("https://hanzhong.fang.ke.com/loupan/p_tianhanfu/xiangqing/", 500, "");

    let dir = tempfile::tempdir().unwrap();
    let opts = ScrapingOptions {
        max_pages: Some(1),
        download_images: false,
        ..options(dir.path())
    };
    let result = run_scraper(&fetcher, &opts, &mut ScraperTUI::new(false)).unwrap();

    assert_eq!(result.pages, 1);
    assert!(!fetcher.requested(&format!("{BASE}pg2/")));
    assert!(!fetcher.requested("https://img.example.com/hx/a1.jpg"));

    let listing = &result.loupans[0];
    assert_eq!(listing.latest_open_date, "2024-05-01");
    assert_eq!(listing.green_ratio, None);
    assert!(listing.house_types.iter().all(|unit| unit.local_image.is_none()));
}

struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }
}

#[test]
fn unwritable_progress_output_does_not_abort_the_run() {
    let page = format!(
        "<html><body>{}{}</body></html>",
        card(r#"<a class="name">甲</a>"#),
        card(r#"<a class="name">乙</a>"#)
    );
    let fetcher = MapFetcher::default()
        .page(BASE, 200, &index(1))
        .page(&format!("{BASE}pg1/"), 200, &page);

    let dir = tempfile::tempdir().unwrap();
    let mut tui = ScraperTUI::with_writer(Box::new(ClosedPipe), true);
    let result = run_scraper(&fetcher, &options(dir.path()), &mut tui).unwrap();

    let names: Vec<&str> = result.loupans.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["甲", "乙"]);
}
