use std::time::Duration;

use image::DynamicImage;
use pixmark_core::decode::decode;
use pixmark_core::{Failure, PixmarkResult};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub no_proxy: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            no_proxy: false,
        }
    }
}

/// Blocking HTTP client for pulling a single image.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(options: &FetchOptions) -> PixmarkResult<Self> {
        let mut builder = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("pixmark/", env!("CARGO_PKG_VERSION")));
        if options.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| Failure::fetch(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body. Transport errors and non-2xx statuses
    /// are fetch failures.
    pub fn fetch(&self, url: &str) -> PixmarkResult<Vec<u8>> {
        info!(url, "fetching image");
        let t0 = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Failure::fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Failure::fetch(format!("HTTP {status} from {url}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        match content_type.as_deref() {
            Some(ct) if ct.starts_with("image/") => {}
            other => warn!(url, content_type = ?other, "response is not labelled as an image"),
        }

        let body = response
            .bytes()
            .map_err(|e| Failure::fetch(format!("reading body of {url}: {e}")))?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis(),
            size = body.len(),
            %status,
            "fetched"
        );
        Ok(body.to_vec())
    }

    /// Fetch and decode in one step.
    pub fn fetch_image(&self, url: &str) -> PixmarkResult<DynamicImage> {
        decode(&self.fetch(url)?)
    }
}
