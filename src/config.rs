//! Configuration parsed from environment variables.
//!
//! Each subsystem gets a small `Copy`/`Clone` struct with a `from_env` constructor
//! and a `Default` that matches the documented defaults, so library callers can
//! build one directly without touching the environment.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_CAPACITY: usize = 5;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_CACHE_NAMESPACE: &str = "pdf-cache";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SNAP_THRESHOLD: f64 = 1.5;
pub const DEFAULT_FONT_SIZE_PT: f64 = 12.0;

// =============================================================================
// CACHE
// =============================================================================

/// Asset cache tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum entries held by the memory tier.
    pub capacity: usize,
    /// Age after which a persistent entry is discarded on read.
    pub ttl: Duration,
    /// Prefix applied to every persistent-tier key.
    pub namespace: String,
    /// Root directory for the file-backed persistent tier.
    pub dir: PathBuf,
}

impl CacheConfig {
    /// Build cache config from environment variables.
    ///
    /// - `FIELDCANVAS_CACHE_CAPACITY`: default 5
    /// - `FIELDCANVAS_CACHE_TTL_SECS`: default 604800 (7 days)
    /// - `FIELDCANVAS_CACHE_NAMESPACE`: default `pdf-cache`
    /// - `FIELDCANVAS_CACHE_DIR`: default `$TMPDIR/fieldcanvas-cache`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_parse("FIELDCANVAS_CACHE_CAPACITY", defaults.capacity).max(1),
            ttl: Duration::from_secs(env_parse("FIELDCANVAS_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
            namespace: std::env::var("FIELDCANVAS_CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            dir: std::env::var_os("FIELDCANVAS_CACHE_DIR").map_or(defaults.dir, PathBuf::from),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            dir: std::env::temp_dir().join("fieldcanvas-cache"),
        }
    }
}

// =============================================================================
// HTTP
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    /// - `FIELDCANVAS_HTTP_TIMEOUT_SECS`: default 60
    /// - `FIELDCANVAS_HTTP_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_secs: env_parse("FIELDCANVAS_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            connect_secs: env_parse("FIELDCANVAS_HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

// =============================================================================
// CANVAS
// =============================================================================

/// Drag and export tuning shared by the canvas engine and the CLI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Distance in percent points within which a dragged field snaps to a neighbour.
    pub snap_threshold: f64,
    /// Font size used when drawing text values into the output PDF.
    pub font_size_pt: f64,
}

impl CanvasConfig {
    /// - `FIELDCANVAS_SNAP_THRESHOLD`: default 1.5
    /// - `FIELDCANVAS_FONT_SIZE`: default 12
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            snap_threshold: env_parse("FIELDCANVAS_SNAP_THRESHOLD", DEFAULT_SNAP_THRESHOLD),
            font_size_pt: env_parse("FIELDCANVAS_FONT_SIZE", DEFAULT_FONT_SIZE_PT),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { snap_threshold: DEFAULT_SNAP_THRESHOLD, font_size_pt: DEFAULT_FONT_SIZE_PT }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
