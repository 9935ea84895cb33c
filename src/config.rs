//! Configuration management for the annotator

use std::env;
use std::str::FromStr;

use serde::Deserialize;

use crate::annotations::{DocumentId, UserId};
use crate::error::ConfigError;
use crate::position::{OverlapPolicy, SelectionRules};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub selection: SelectionConfig,
    pub notices: NoticeConfig,
    pub viewer: ViewerConfig,
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    pub min_chars: usize,
    pub max_chars: usize,
    /// Characters of surrounding text stored with each annotation
    pub context_chars: usize,
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoticeConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    pub user_id: Option<UserId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub id: DocumentId,
    pub path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            base_url: "http://localhost:5000/text-documents/api".to_string(),
            csrf_token: None,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            min_chars: 3,
            max_chars: 1000,
            context_chars: 100,
            overlap: OverlapPolicy::Permit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig::default(),
            selection: SelectionConfig::default(),
            notices: NoticeConfig { ttl_secs: 5 },
            viewer: ViewerConfig {
                user_id: None,
                name: None,
            },
            document: DocumentConfig { id: 1, path: None },
        }
    }
}

impl SelectionConfig {
    pub fn rules(&self) -> SelectionRules {
        SelectionRules {
            min_chars: self.min_chars,
            max_chars: self.max_chars,
            overlap: self.overlap,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let selection = SelectionConfig {
            min_chars: parse_var("ANNOTATOR_MIN_CHARS", defaults.selection.min_chars)?,
            max_chars: parse_var("ANNOTATOR_MAX_CHARS", defaults.selection.max_chars)?,
            context_chars: parse_var("ANNOTATOR_CONTEXT_CHARS", defaults.selection.context_chars)?,
            overlap: parse_var("ANNOTATOR_OVERLAP_POLICY", defaults.selection.overlap)?,
        };
        if selection.min_chars > selection.max_chars {
            return Err(ConfigError::InvalidValue {
                key: "ANNOTATOR_MIN_CHARS",
                value: format!("{} exceeds maximum {}", selection.min_chars, selection.max_chars),
            });
        }

        Ok(Config {
            store: StoreConfig {
                base_url: env::var("ANNOTATOR_API_URL").unwrap_or(defaults.store.base_url),
                csrf_token: env::var("ANNOTATOR_CSRF_TOKEN").ok().filter(|t| !t.is_empty()),
            },
            selection,
            notices: NoticeConfig {
                ttl_secs: parse_var("ANNOTATOR_NOTICE_TTL_SECS", defaults.notices.ttl_secs)?,
            },
            viewer: ViewerConfig {
                user_id: parse_optional("ANNOTATOR_USER_ID")?,
                name: env::var("ANNOTATOR_USER_NAME").ok().filter(|n| !n.is_empty()),
            },
            document: DocumentConfig {
                id: parse_var("ANNOTATOR_DOCUMENT_ID", defaults.document.id)?,
                path: env::var("ANNOTATOR_DOCUMENT_PATH").ok(),
            },
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_optional(key)?.unwrap_or(default))
}

fn parse_optional<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let rules = config.selection.rules();

        assert_eq!(rules.min_chars, 3);
        assert_eq!(rules.max_chars, 1000);
        assert_eq!(rules.overlap, OverlapPolicy::Permit);
        assert_eq!(config.selection.context_chars, 100);
        assert_eq!(config.notices.ttl_secs, 5);
        assert!(config.store.csrf_token.is_none());
    }

    #[test]
    fn test_parse_optional_rejects_garbage() {
        env::set_var("ANNOTATOR_TEST_GARBAGE", "three");
        let result: Result<Option<usize>, _> = parse_optional("ANNOTATOR_TEST_GARBAGE");
        env::remove_var("ANNOTATOR_TEST_GARBAGE");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "ANNOTATOR_TEST_GARBAGE", .. })
        ));
    }

    #[test]
    fn test_from_env_reports_malformed_value() {
        env::set_var("ANNOTATOR_MAX_CHARS", "lots");
        let result = Config::from_env();
        env::remove_var("ANNOTATOR_MAX_CHARS");

        match result {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, "ANNOTATOR_MAX_CHARS");
                assert_eq!(value, "lots");
            }
            other => panic!("expected invalid value, got {:?}", other.map(|c| c.selection)),
        }
    }

    #[test]
    fn test_parse_var_falls_back() {
        assert_eq!(parse_var("ANNOTATOR_TEST_UNSET", 42usize).unwrap(), 42);

        env::set_var("ANNOTATOR_TEST_POLICY", "reject");
        let policy = parse_var("ANNOTATOR_TEST_POLICY", OverlapPolicy::Permit).unwrap();
        env::remove_var("ANNOTATOR_TEST_POLICY");
        assert_eq!(policy, OverlapPolicy::Reject);
    }
}
