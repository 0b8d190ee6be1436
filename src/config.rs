use std::env;

/// Separator for `EXTRA_LEAK_PATTERNS`; regexes may contain commas and pipes.
const PATTERN_SEPARATOR: &str = ";;";

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub json_payload_limit: usize,
    pub extra_leak_patterns: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            json_payload_limit: env::var("JSON_PAYLOAD_LIMIT")
                .ok()
                .and_then(|l| l.parse().ok())
                .unwrap_or(1024 * 1024),
            extra_leak_patterns: env::var("EXTRA_LEAK_PATTERNS")
                .map(|raw| parse_patterns(&raw))
                .unwrap_or_default(),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            json_payload_limit: 64 * 1024,
            extra_leak_patterns: Vec::new(),
        }
    }
}

fn parse_patterns(raw: &str) -> Vec<String> {
    raw.split(PATTERN_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
