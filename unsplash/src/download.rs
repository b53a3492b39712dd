use crate::Error;
use crate::error::Result;
use log::error;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, header};
use std::time::Duration;

/// Image fetches go straight to the CDN and carry no API credential, so they
/// get their own client instead of sharing the search one.
#[derive(Debug, Clone)]
pub struct DownloadClient {
    client: Client,
}

impl Default for DownloadClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadClient {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("image/avif,image/webp,image/apng,image/*,*/*;q=0.8"),
        );
        DownloadClient {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .timeout(Duration::from_secs(60))
                .default_headers(headers)
                .user_agent(concat!("unsplash-rs/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap(),
        }
    }

    pub async fn download(&self, url: &str) -> Result<Response> {
        let r = self.client.get(url).send().await?;
        let st = r.status();
        if st.is_success() || st.is_redirection() {
            Ok(r)
        } else {
            error!("download: {st:?} from {url}");
            Err(Error::Api(st.as_u16(), r.text().await?))
        }
    }
}
