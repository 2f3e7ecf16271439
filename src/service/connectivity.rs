use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::ConnectivityChecker;

/// Reachability probe: a HEAD request to the API base URL. Any HTTP answer,
/// whatever the status, means the network path works.
#[derive(Clone)]
pub struct HttpConnectivityChecker {
    client: reqwest::Client,
    probe_url: Url,
    timeout: Duration,
}

impl HttpConnectivityChecker {
    pub fn new(client: reqwest::Client, probe_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            probe_url,
            timeout,
        }
    }
}

#[async_trait]
impl ConnectivityChecker for HttpConnectivityChecker {
    async fn is_internet_available(&self) -> bool {
        match self
            .client
            .head(self.probe_url.clone())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(resp) => {
                debug!(status = %resp.status(), "connectivity probe answered");
                true
            }
            Err(e) => {
                debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }
}

/// Fixed answer; used for `--offline` and in tests. Can be flipped at runtime.
#[derive(Clone, Default)]
pub struct StaticConnectivity {
    online: Arc<AtomicBool>,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityChecker for StaticConnectivity {
    async fn is_internet_available(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
