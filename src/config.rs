use serde::{Deserialize, Serialize};

use crate::autocomplete::TokenMode;
use crate::error::PageError;

/// Tunables for one page load.
///
/// Pages may override any field through a JSON object in the
/// `data-page-config` attribute of the root element; missing fields keep
/// their defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub session_path: String,
    pub session_timeout_ms: u64,
    pub tag_index_path: String,
    pub tag_index_timeout_ms: u64,
    pub font_min: f64,
    pub font_max: f64,
    pub min_chars: u32,
    pub max_items: u32,
    pub token_mode: TokenMode,
    pub tag_input_selectors: Vec<String>,
    pub search_input_id: String,
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            session_path: "/../shaarligo.cgi/session/".to_string(),
            session_timeout_ms: 1000,
            tag_index_path: "/t/index.json".to_string(),
            tag_index_timeout_ms: 1000,
            font_min: 8.0,
            font_max: 32.0,
            min_chars: 3,
            max_items: 15,
            token_mode: TokenMode::Hash,
            tag_input_selectors: vec![
                "input[data-multiple]".to_string(),
                "textarea[data-multiple]".to_string(),
            ],
            search_input_id: "q".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PageConfig {
    /// Parses the `data-page-config` attribute value. A missing or blank
    /// attribute means defaults; malformed JSON is handed back so the caller
    /// can report it once logging is up.
    pub fn from_attribute(raw: Option<&str>) -> Result<Self, PageError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };
        Ok(serde_json::from_str(raw)?)
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_uses_defaults() {
        assert_eq!(PageConfig::from_attribute(None).unwrap(), PageConfig::default());
        assert_eq!(
            PageConfig::from_attribute(Some("  ")).unwrap(),
            PageConfig::default()
        );
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PageConfig::from_attribute(Some(
            r#"{"font_max": 48, "tag_index_path": "/tags/index.json"}"#,
        ))
        .unwrap();
        assert_eq!(config.font_max, 48.0);
        assert_eq!(config.font_min, 8.0);
        assert_eq!(config.tag_index_path, "/tags/index.json");
        assert_eq!(config.min_chars, 3);
    }

    #[test]
    fn malformed_attribute_is_reported() {
        let err = PageConfig::from_attribute(Some("{not json")).unwrap_err();
        assert!(matches!(err, PageError::Json(_)));
        assert!(err.to_string().starts_with("malformed json"));
    }

    #[test]
    fn font_range_is_kept_as_written() {
        let config =
            PageConfig::from_attribute(Some(r#"{"font_min": 40, "font_max": 10}"#)).unwrap();
        assert_eq!((config.font_min, config.font_max), (40.0, 10.0));
    }

    #[test]
    fn token_mode_parses_lowercase() {
        let config = PageConfig::from_attribute(Some(r#"{"token_mode": "whitespace"}"#)).unwrap();
        assert_eq!(config.token_mode, TokenMode::Whitespace);
    }

    #[test]
    fn unknown_log_level_is_info() {
        let config = PageConfig {
            log_level: "chatty".to_string(),
            ..PageConfig::default()
        };
        assert_eq!(config.log_level(), log::Level::Info);
    }
}
