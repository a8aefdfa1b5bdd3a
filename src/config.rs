use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the media server
    #[serde(default = "default_media_server_url")]
    pub media_server_url: String,

    /// Access token sent with every media server request
    pub media_server_token: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TTL in seconds for cached item metadata and section listings
    #[serde(default = "default_item_cache_ttl")]
    pub item_cache_ttl: u64,

    /// Delay before re-fetching an on-deck rail after an item action
    #[serde(default = "default_on_deck_refresh_delay_ms")]
    pub on_deck_refresh_delay_ms: u64,

    /// Viewport width assumed when a client does not report one
    #[serde(default = "default_viewport_width")]
    pub default_viewport_width: u32,
}

fn default_media_server_url() -> String {
    "http://localhost:32400".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_item_cache_ttl() -> u64 {
    3600
}

fn default_on_deck_refresh_delay_ms() -> u64 {
    1000
}

fn default_viewport_width() -> u32 {
    1920
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_only_token_is_set() {
        let vars = vec![("MEDIA_SERVER_TOKEN".to_string(), "abc".to_string())];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.media_server_token, "abc");
        assert_eq!(config.media_server_url, "http://localhost:32400");
        assert_eq!(config.port, 3000);
        assert_eq!(config.item_cache_ttl, 3600);
        assert_eq!(config.on_deck_refresh_delay_ms, 1000);
        assert_eq!(config.default_viewport_width, 1920);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let vars: Vec<(String, String)> = vec![("PORT".to_string(), "8080".to_string())];
        let result = envy::from_iter::<_, Config>(vars);
        assert!(result.is_err());
    }
}
