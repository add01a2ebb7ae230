use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// The raw outcome of a GET. Non-2xx responses are still `Ok`; transport failures are `Err`.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as text, or an error when the status is not 2xx.
    pub fn into_html(self) -> Result<String> {
        if !self.is_success() {
            bail!("{} returned HTTP {}", self.url, self.status);
        }
        Ok(self.text())
    }
}

pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedPage> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body: body.to_vec(),
        })
    }
}
