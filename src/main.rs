use anyhow::Result;
use clap::Parser;
use loupanfinder::common_scraper::{run_scraper, ScrapingOptions, DEFAULT_BASE_URL};
use loupanfinder::http::HttpFetcher;
use loupanfinder::output;
use loupanfinder::tui::ScraperTUI;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Loupanfinder - New-build property scraper for fang.ke.com")]
struct Args {
    /// Listing index to start from; pages are fetched as <base-url>pg<n>/
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Path to output JSON file
    #[clap(short, long, default_value = "public/hanzhong_loupan_data.json")]
    output: PathBuf,

    /// Directory that floor-plan images are downloaded into
    #[clap(long, default_value = "public/images")]
    images_dir: PathBuf,

    /// Prefix stored in local_image in front of the downloaded file name
    #[clap(long, default_value = "/images/")]
    image_prefix: String,

    /// Maximum number of listing pages to scrape (default: all discovered pages)
    #[clap(short, long)]
    max_pages: Option<usize>,

    /// Pause after each detail page, in milliseconds
    #[clap(long, default_value = "1000")]
    detail_delay_ms: u64,

    /// Pause after each listing page, in milliseconds
    #[clap(long, default_value = "2000")]
    page_delay_ms: u64,

    /// HTTP request timeout in seconds
    #[clap(long, default_value = "30")]
    timeout_secs: u64,

    /// Do not download floor-plan images
    #[clap(long)]
    skip_images: bool,

    /// Print progress without colors
    #[clap(long)]
    plain: bool,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    println!("Loupanfinder - New-build property scraper");
    println!("=========================================");

    let options = ScrapingOptions {
        base_url: args.base_url,
        output_file: args.output,
        images_dir: args.images_dir,
        image_prefix: args.image_prefix,
        max_pages: args.max_pages,
        download_images: !args.skip_images,
        detail_delay: Duration::from_millis(args.detail_delay_ms),
        page_delay: Duration::from_millis(args.page_delay_ms),
        timeout: Duration::from_secs(args.timeout_secs),
    };

    let fetcher = HttpFetcher::new(options.timeout)?;
    let mut tui = ScraperTUI::new(!args.plain);
    let result = run_scraper(&fetcher, &options, &mut tui)?;

    if result.loupans.is_empty() {
        tui.show_no_data();
        return Ok(());
    }

    let items = result.loupans.len();
    let scrape_result = output::new_scrape_result(result.loupans);
    output::save_to_json(&scrape_result, &options.output_file)?;

    tui.show_final_summary(items, result.pages);
    println!("Data saved to {}", options.output_file.display());

    Ok(())
}
