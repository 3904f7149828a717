//! Origin negotiation for the browser client.
//!
//! `Access-Control-Allow-Origin` is either an allow-listed origin that
//! exactly matches the request or the configured default. Unknown origins are
//! never reflected and `*` is never emitted, since credentials are allowed.

use std::collections::BTreeMap;

use crate::config::ConfigError;

pub const ALLOW_HEADERS: &str = "Content-Type,X-Amz-Date,Authorization,X-Api-Key";
pub const ALLOW_METHODS: &str = "OPTIONS,POST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    default_origin: String,
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new<I, S>(default_origin: &str, allowed_origins: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let default_origin = normalize(default_origin);
        if default_origin.is_empty() || default_origin == "*" {
            return Err(ConfigError::InvalidDefaultOrigin(default_origin));
        }

        let mut allowed: Vec<String> = Vec::new();
        for origin in allowed_origins {
            let origin = normalize(origin.as_ref());
            if origin == "*" {
                return Err(ConfigError::WildcardOrigin);
            }
            if !origin.is_empty() && !allowed.iter().any(|o| o.eq_ignore_ascii_case(&origin)) {
                allowed.push(origin);
            }
        }

        Ok(Self {
            default_origin,
            allowed_origins: allowed,
        })
    }

    pub fn default_origin(&self) -> &str {
        &self.default_origin
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn allow_origin(&self, request_origin: Option<&str>) -> &str {
        let Some(origin) = request_origin.map(normalize) else {
            return &self.default_origin;
        };

        self.allowed_origins
            .iter()
            .find(|allowed| allowed.eq_ignore_ascii_case(&origin))
            .unwrap_or(&self.default_origin)
    }

    /// Full header set for a response to a request from `request_origin`.
    pub fn headers_for(&self, request_origin: Option<&str>) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "Access-Control-Allow-Origin".to_string(),
                self.allow_origin(request_origin).to_string(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                ALLOW_HEADERS.to_string(),
            ),
            (
                "Access-Control-Allow-Methods".to_string(),
                ALLOW_METHODS.to_string(),
            ),
            (
                "Access-Control-Allow-Credentials".to_string(),
                "true".to_string(),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Vary".to_string(), "Origin".to_string()),
        ])
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::new(
            "https://app.example.com",
            ["https://app.example.com", "http://localhost:5173"],
        )
        .unwrap()
    }

    #[test]
    fn allow_listed_origin_is_echoed() {
        assert_eq!(
            policy().allow_origin(Some("http://localhost:5173")),
            "http://localhost:5173"
        );
    }

    #[test]
    fn unknown_origin_gets_default_not_reflection() {
        let policy = policy();
        let origin = policy.allow_origin(Some("https://evil.example.net"));
        assert_eq!(origin, "https://app.example.com");
    }

    #[test]
    fn missing_origin_gets_default() {
        assert_eq!(policy().allow_origin(None), "https://app.example.com");
    }

    #[test]
    fn origin_match_ignores_case_and_trailing_slash() {
        assert_eq!(
            policy().allow_origin(Some("HTTP://LOCALHOST:5173/")),
            "http://localhost:5173"
        );
    }

    #[test]
    fn prefix_of_allowed_origin_does_not_match() {
        assert_eq!(
            policy().allow_origin(Some("http://localhost:5173.evil.net")),
            "https://app.example.com"
        );
    }

    #[test]
    fn headers_cover_required_set() {
        let headers = policy().headers_for(Some("http://localhost:5173"));

        assert_eq!(headers["Access-Control-Allow-Origin"], "http://localhost:5173");
        assert!(headers["Access-Control-Allow-Headers"].contains("Content-Type"));
        assert!(headers["Access-Control-Allow-Headers"].contains("Authorization"));
        assert!(headers["Access-Control-Allow-Headers"].contains("X-Api-Key"));
        assert!(headers["Access-Control-Allow-Headers"].contains("X-Amz-Date"));
        assert_eq!(headers["Access-Control-Allow-Methods"], "OPTIONS,POST");
        assert_eq!(headers["Access-Control-Allow-Credentials"], "true");
        assert_eq!(headers["Content-Type"], "application/json");
    }

    #[test]
    fn wildcard_is_rejected() {
        assert!(matches!(
            CorsPolicy::new("*", Vec::<String>::new()),
            Err(ConfigError::InvalidDefaultOrigin(_))
        ));
        assert!(matches!(
            CorsPolicy::new("https://app.example.com", ["*"]),
            Err(ConfigError::WildcardOrigin)
        ));
    }

    #[test]
    fn blank_and_duplicate_entries_are_dropped() {
        let policy = CorsPolicy::new(
            "https://app.example.com",
            ["", " https://a.example ", "https://A.example"],
        )
        .unwrap();
        assert_eq!(policy.allowed_origins(), ["https://a.example".to_string()]);
    }
}
