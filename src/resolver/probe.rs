// HTTP prober for cover-art existence checks

use std::time::Duration;

use async_trait::async_trait;

use super::traits::UrlProber;

/// reqwest-backed `UrlProber` with a short timeout and optional proxy
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Self {
        Self::with_proxy(None)
    }

    pub fn with_proxy(proxy: Option<&str>) -> Self {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(10));

        if let Some(proxy_url) = proxy {
            if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            } else {
                eprintln!("[Probe] Invalid proxy URL: {}", proxy_url);
            }
        }

        let client = builder.build().unwrap_or_else(|e| {
            eprintln!("[Probe] Failed to build HTTP client: {}", e);
            reqwest::Client::new()
        });

        Self { client }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlProber for HttpProber {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().as_u16() == 200,
            Err(_) => false,
        }
    }
}
