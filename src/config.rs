//! Timing constants for the browser flows and, on the host, the
//! environment-driven proxy configuration.

use std::time::Duration;

/// Quiet period after the last selection change before an upload starts.
pub const UPLOAD_DEBOUNCE: Duration = Duration::from_millis(300);

pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(5);
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

pub const UPLOAD_PATH: &str = "/app/upload";
pub const CHAT_PATH: &str = "/app/chat";

cfg_if::cfg_if! {
    if #[cfg(feature = "ssr")] {
        use anyhow::{anyhow, Context};
        use url::Url;

        pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
        pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 60;

        /// Where the host forwards `/app/*` requests.
        #[derive(Debug, Clone)]
        pub struct HostConfig {
            pub backend_url: Url,
            pub proxy_timeout: Duration,
        }

        impl HostConfig {
            pub fn from_env() -> anyhow::Result<Self> {
                Self::from_lookup(|key| std::env::var(key).ok())
            }

            pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
                let raw_url = lookup("DOCQA_BACKEND_URL")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
                let backend_url = Url::parse(raw_url.trim())
                    .with_context(|| format!("DOCQA_BACKEND_URL is not a valid url: {raw_url}"))?;
                if backend_url.cannot_be_a_base() {
                    return Err(anyhow!("DOCQA_BACKEND_URL must be an http(s) base url: {raw_url}"));
                }

                let timeout_secs = match lookup("DOCQA_PROXY_TIMEOUT_SECS") {
                    Some(v) => v
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("DOCQA_PROXY_TIMEOUT_SECS is not a number: {v}"))?,
                    None => DEFAULT_PROXY_TIMEOUT_SECS,
                };

                Ok(Self {
                    backend_url,
                    proxy_timeout: Duration::from_secs(timeout_secs),
                })
            }
        }

    }
}
