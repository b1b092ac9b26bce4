use crate::remote::protocol::ListQuery;
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9000";
pub const DEFAULT_CUSTOMER_ID: &str = "87";
pub const DEFAULT_RANGE_START: &str = "2025-07-20T00:00:00";
pub const DEFAULT_RANGE_END: &str = "2025-07-26T23:59:59";
pub const DEFAULT_LIST_LIMIT: usize = 100_000;

pub const TOKEN_VAR: &str = "ROADSCAN_TOKEN";
pub const BASE_URL_VAR: &str = "ROADSCAN_API_URL";
pub const IMAGE_URL_VAR: &str = "ROADSCAN_IMAGE_URL";
pub const CUSTOMER_ID_VAR: &str = "ROADSCAN_CUSTOMER_ID";
pub const RANGE_START_VAR: &str = "ROADSCAN_RANGE_START";
pub const RANGE_END_VAR: &str = "ROADSCAN_RANGE_END";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Connection settings for the scan API, resolved from the environment.
/// Everything has a development default except the bearer token, which must
/// always be supplied externally.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub image_base_url: String,
    pub token: String,
    pub customer_id: String,
    pub range_start: String,
    pub range_end: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var(TOKEN_VAR).map_err(|_| ConfigError::MissingVar(TOKEN_VAR))?;
        let base_url = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let image_base_url = env::var(IMAGE_URL_VAR).unwrap_or_else(|_| base_url.clone());
        Ok(Self {
            base_url,
            image_base_url,
            token,
            customer_id: env::var(CUSTOMER_ID_VAR)
                .unwrap_or_else(|_| DEFAULT_CUSTOMER_ID.to_string()),
            range_start: env::var(RANGE_START_VAR)
                .unwrap_or_else(|_| DEFAULT_RANGE_START.to_string()),
            range_end: env::var(RANGE_END_VAR).unwrap_or_else(|_| DEFAULT_RANGE_END.to_string()),
        })
    }

    pub fn list_query(&self, limit: usize) -> ListQuery {
        ListQuery {
            cust_id: self.customer_id.clone(),
            bgng_dt: self.range_start.clone(),
            end_dt: self.range_end.clone(),
            limit,
        }
    }

    pub fn detail_url(&self, scan_id: &str) -> String {
        format!("{}/scans/{}", self.base_url.trim_end_matches('/'), scan_id)
    }

    pub fn fleet_url(&self) -> String {
        format!("{}/fleet", self.base_url.trim_end_matches('/'))
    }

    /// Fully qualifies an image filename unless it already carries a scheme.
    pub fn image_url(&self, file_name: &str) -> String {
        if file_name.starts_with("http://") || file_name.starts_with("https://") {
            file_name.to_string()
        } else {
            format!(
                "{}/{}",
                self.image_base_url.trim_end_matches('/'),
                file_name.trim_start_matches('/')
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            base_url: "http://127.0.0.1:9000".into(),
            image_base_url: "https://images.example.com".into(),
            token: "test-token".into(),
            customer_id: "87".into(),
            range_start: DEFAULT_RANGE_START.into(),
            range_end: DEFAULT_RANGE_END.into(),
        }
    }

    #[test]
    fn image_url_prefixes_bare_filenames() {
        assert_eq!(
            config().image_url("scans/scan-0001.jpg"),
            "https://images.example.com/scans/scan-0001.jpg"
        );
    }

    #[test]
    fn image_url_leaves_qualified_urls_alone() {
        let qualified = "https://cdn.example.com/a.jpg";
        assert_eq!(config().image_url(qualified), qualified);
    }

    #[test]
    fn detail_url_targets_the_scan_id() {
        assert_eq!(
            config().detail_url("scan-12"),
            "http://127.0.0.1:9000/scans/scan-12"
        );
    }
}
