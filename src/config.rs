use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::pipeline::extraction::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::pipeline::orchestrator::DEFAULT_MAX_PDF_BYTES;
use crate::pipeline::rasterize::{DEFAULT_RENDER_SCALE, MIN_RENDER_SCALE};

/// Application-level constants
pub const APP_NAME: &str = "DeedVerify";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "deedverify_lib=debug,deedverify=debug,tower_http=info,info"
    } else {
        "deedverify_lib=info,deedverify=info,warn"
    }
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// `GEMINI_API_KEY`. Required by the production extractor.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub render_scale: f32,
    pub bind: SocketAddr,
    pub max_pdf_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            render_scale: DEFAULT_RENDER_SCALE,
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_pdf_bytes: DEFAULT_MAX_PDF_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Read settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Unset or blank values use the
    /// default; unparseable values use the default and log a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let render_scale = parsed(&read, "DEEDVERIFY_RENDER_SCALE", defaults.render_scale);
        let render_scale = if render_scale.is_finite() && render_scale >= MIN_RENDER_SCALE {
            render_scale
        } else {
            tracing::warn!(
                value = render_scale,
                "DEEDVERIFY_RENDER_SCALE below {MIN_RENDER_SCALE}, using {MIN_RENDER_SCALE}"
            );
            MIN_RENDER_SCALE
        };

        let timeout_secs = match parsed(&read, "DEEDVERIFY_TIMEOUT_SECS", defaults.timeout_secs) {
            0 => {
                tracing::warn!("DEEDVERIFY_TIMEOUT_SECS must be positive, using default");
                defaults.timeout_secs
            }
            secs => secs,
        };

        Self {
            api_key: read("GEMINI_API_KEY"),
            model: read("DEEDVERIFY_MODEL").unwrap_or(defaults.model),
            api_base: read("DEEDVERIFY_API_BASE").unwrap_or(defaults.api_base),
            timeout_secs,
            max_retries: parsed(&read, "DEEDVERIFY_MAX_RETRIES", defaults.max_retries),
            retry_backoff: Duration::from_millis(parsed(
                &read,
                "DEEDVERIFY_RETRY_BACKOFF_MS",
                DEFAULT_RETRY_BACKOFF_MS,
            )),
            render_scale,
            bind: parsed(&read, "DEEDVERIFY_BIND", defaults.bind),
            max_pdf_bytes: parsed(&read, "DEEDVERIFY_MAX_PDF_BYTES", defaults.max_pdf_bytes),
        }
    }
}

fn parsed<T: FromStr>(read: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match read(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
    }
}
