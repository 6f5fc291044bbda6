use serde::Deserialize;

/// Main configuration structure for Noon-Harvest
///
/// All fields have defaults so a missing or partial config file still yields
/// a usable configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of concurrent page fetches (semaphore slot count)
    #[serde(rename = "connection-limiter")]
    pub connection_limiter: u32,

    /// Maximum number of result pages to fetch for one query
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Number of blocking workers used for parallel page parsing
    #[serde(rename = "max-workers")]
    pub max_workers: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_limiter: 5,
            max_pages: 10,
            max_workers: 12,
        }
    }
}
