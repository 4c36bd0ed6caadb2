use crate::error::NetError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Outbound JSON GET capability used by the geolocation resolver
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str, timeout: Duration) -> Result<Value, NetError>;
}

/// [`JsonFetcher`] backed by a shared reqwest client
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str, timeout: Duration) -> Result<Value, NetError> {
        let value = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fake fetcher answering from a table of URL prefixes
    #[derive(Default)]
    pub struct ScriptedFetcher {
        routes: Vec<(String, Result<Value, NetError>)>,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, prefix: &str, response: Result<Value, NetError>) -> Self {
            self.routes.push((prefix.to_string(), response));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JsonFetcher for ScriptedFetcher {
        async fn fetch_json(&self, url: &str, _timeout: Duration) -> Result<Value, NetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.routes
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Err(NetError::Transport(format!("no route for {}", url))))
        }
    }
}
