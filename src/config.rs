use crate::constants;
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "SCRAPER_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub lang: String,
    pub category_path: String,
    pub first_page: u32,
    pub last_page: u32,
    /// Added to the built-in excluded keyword list.
    pub excluded_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub listing_delay_ms: u64,
    pub detail_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub checkpoint_every: usize,
    pub include_capacity: bool,
    /// Adds working hours, external website and social links.
    pub include_contact_extras: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub gallery_cap: usize,
    pub description_max: usize,
    pub hall_names_max: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            lang: constants::DEFAULT_LANG.to_string(),
            category_path: constants::DEFAULT_CATEGORY_PATH.to_string(),
            first_page: 1,
            last_page: 5,
            excluded_keywords: Vec::new(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            listing_delay_ms: 2000,
            detail_delay_ms: 1500,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output/shadliq_venues.csv"),
            checkpoint_path: PathBuf::from("output/shadliq_venues_progress.csv"),
            checkpoint_every: constants::CHECKPOINT_EVERY,
            include_capacity: false,
            include_contact_extras: false,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            gallery_cap: constants::GALLERY_CAP,
            description_max: constants::DESCRIPTION_MAX_CHARS,
            hall_names_max: constants::HALL_NAMES_MAX_CHARS,
        }
    }
}

impl Config {
    /// Loads from `$SCRAPER_CONFIG`, else `config.toml`. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&config_content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects an inverted page range, a zero checkpoint interval and an unparseable base URL.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.site.first_page > self.site.last_page {
            return Err(ScraperError::Config(format!(
                "first_page ({}) is after last_page ({})",
                self.site.first_page, self.site.last_page
            )));
        }
        if self.output.checkpoint_every == 0 {
            return Err(ScraperError::Config("checkpoint_every must be at least 1".into()));
        }
        url::Url::parse(&self.site.base_url)?;
        Ok(())
    }

    /// `{base}/{lang}/{category}/{page}/`
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}/{}/{}/{}/",
            self.site.base_url.trim_end_matches('/'),
            self.site.lang,
            self.site.category_path,
            page
        )
    }

    /// Built-in keywords, the category path, and any configured extras.
    pub fn excluded_keywords(&self) -> Vec<String> {
        constants::EXCLUDED_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .chain(std::iter::once(self.site.category_path.clone()))
            .chain(self.site.excluded_keywords.iter().cloned())
            .filter(|k| !k.is_empty())
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn listing_delay(&self) -> Duration {
        Duration::from_millis(self.http.listing_delay_ms)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.http.detail_delay_ms)
    }

    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = constants::COLUMNS.to_vec();
        if self.output.include_capacity {
            columns.extend(constants::CAPACITY_COLUMNS);
        }
        if self.output.include_contact_extras {
            columns.extend(constants::CONTACT_EXTRA_COLUMNS);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_layout() {
        let config = Config::default();
        assert_eq!(config.listing_url(3), "https://shadliq.az/az/saray-restoranlar/3/");
        assert_eq!(config.output.checkpoint_every, 10);
        assert_eq!(config.columns().len(), 16);
        assert!(config.excluded_keywords().contains(&"saray-restoranlar".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [site]
            last_page = 2
            excluded_keywords = ["blog"]

            [output]
            include_capacity = true
            "#,
        )
        .unwrap();
        assert_eq!(config.site.first_page, 1);
        assert_eq!(config.site.last_page, 2);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.columns().last(), Some(&"capacity_max"));
        assert!(config.excluded_keywords().contains(&"blog".to_string()));
    }

    #[test]
    fn test_contact_extras_follow_capacity() {
        let config = Config::from_toml(
            "[output]\ninclude_capacity = true\ninclude_contact_extras = true\n",
        )
        .unwrap();
        let columns = config.columns();
        assert_eq!(columns.len(), 21);
        assert_eq!(&columns[16..18], &["capacity_min", "capacity_max"]);
        assert_eq!(&columns[18..], &["working_hours", "website", "social_media"]);
    }

    #[test]
    fn test_rejects_inverted_page_range() {
        let result = Config::from_toml("[site]\nfirst_page = 4\nlast_page = 2\n");
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.site.base_url, "https://shadliq.az");
    }
}
