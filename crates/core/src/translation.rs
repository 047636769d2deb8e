//! Translation Adapter
//!
//! `Translator` is the raw remote call and reports failures as errors.
//! `MultilingualSupport` is the user-facing layer that turns failures into a
//! readable message and handles single texts, lists and multi-language fan-in.

use crate::error::UpstreamError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, warn};

pub const DEFAULT_TRANSLATE_API_BASE: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_LANGUAGE: &str = "ur";
pub const DEFAULT_OUTPUT_LANGUAGES: [&str; 4] = ["ur", "fr", "de", "es"];

/// A service that translates text into a target language.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` (source language auto-detected) into `dest`.
    async fn translate(&self, text: &str, dest: &str) -> Result<String, UpstreamError>;
}

/// A `Translator` backed by the public Google Translate endpoint.
pub struct GoogleTranslator {
    http: reqwest::Client,
    api_base: String,
}

impl GoogleTranslator {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSLATE_API_BASE)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, dest: &str) -> Result<String, UpstreamError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        debug!(%dest, chars = text.len(), "Sending translation request");

        let response = self
            .http
            .get(&self.api_base)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", dest),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Translation(format!("{status}: {body}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Translation(e.to_string()))?;
        parse_translation(&payload)
    }
}

/// Joins the translated segments of a `translate_a/single` reply, which looks
/// like `[[["Bonjour","Hello",…],["le monde","world",…]],…]`.
fn parse_translation(payload: &Value) -> Result<String, UpstreamError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| UpstreamError::Translation("unexpected response shape".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

/// Either one text or a list of texts. Translation keeps the shape and order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Texts {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Texts {
    fn from(text: &str) -> Self {
        Texts::One(text.to_string())
    }
}

impl From<Vec<String>> for Texts {
    fn from(texts: Vec<String>) -> Self {
        Texts::Many(texts)
    }
}

/// Translation helpers that never fail: errors are reported inline as text.
#[derive(Clone)]
pub struct MultilingualSupport {
    translator: Arc<dyn Translator>,
    default_language: String,
}

impl MultilingualSupport {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Translates into `dest`, or the default language (Urdu) when `None`.
    pub async fn translate_text(&self, text: &str, dest: Option<&str>) -> String {
        let dest = dest.unwrap_or(self.default_language.as_str());
        match self.translator.translate(text, dest).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(%dest, error = %e, "Translation failed");
                format!("Translation error: {e}")
            }
        }
    }

    pub async fn translate_many(&self, texts: Texts, dest: Option<&str>) -> Texts {
        match texts {
            Texts::One(text) => Texts::One(self.translate_text(&text, dest).await),
            Texts::Many(list) => {
                let mut translated = Vec::with_capacity(list.len());
                for text in &list {
                    translated.push(self.translate_text(text, dest).await);
                }
                Texts::Many(translated)
            }
        }
    }

    /// Translates `content` into each language, keyed by language code.
    pub async fn translate_output(&self, content: &str, languages: &[&str]) -> BTreeMap<String, String> {
        let mut translations = BTreeMap::new();
        for &lang in languages {
            let translated = self.translate_text(content, Some(lang)).await;
            translations.insert(lang.to_string(), translated);
        }
        translations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tagging_translator() -> MockTranslator {
        let mut mock = MockTranslator::new();
        mock.expect_translate()
            .returning(|text, dest| Ok(format!("{dest}:{text}")));
        mock
    }

    #[tokio::test]
    async fn test_translate_text_defaults_to_urdu() {
        let support = MultilingualSupport::new(Arc::new(tagging_translator()));
        assert_eq!(support.translate_text("hello", None).await, "ur:hello");
        assert_eq!(support.translate_text("hello", Some("fr")).await, "fr:hello");
    }

    #[tokio::test]
    async fn test_translate_text_reports_errors_inline() {
        let mut mock = MockTranslator::new();
        mock.expect_translate()
            .returning(|_, _| Err(UpstreamError::Translation("429".into())));
        let support = MultilingualSupport::new(Arc::new(mock));

        assert_eq!(
            support.translate_text("hello", Some("de")).await,
            "Translation error: Translation request failed: 429"
        );
    }

    #[tokio::test]
    async fn test_translate_many_keeps_shape_and_order() {
        let support = MultilingualSupport::new(Arc::new(tagging_translator()));

        let many = support
            .translate_many(Texts::Many(vec!["a".into(), "b".into()]), Some("fr"))
            .await;
        assert_eq!(many, Texts::Many(vec!["fr:a".into(), "fr:b".into()]));

        let one = support.translate_many(Texts::from("a"), Some("fr")).await;
        assert_eq!(one, Texts::One("fr:a".into()));
    }

    #[tokio::test]
    async fn test_translate_output_covers_every_language() {
        let support = MultilingualSupport::new(Arc::new(tagging_translator()));
        let out = support
            .translate_output("hi", &DEFAULT_OUTPUT_LANGUAGES)
            .await;

        assert_eq!(out.len(), 4);
        assert_eq!(out["es"], "es:hi");
        assert_eq!(out["ur"], "ur:hi");
    }

    #[test]
    fn test_texts_deserialize_untagged() {
        let one: Texts = serde_json::from_str(r#""hola""#).unwrap();
        let many: Texts = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(one, Texts::One("hola".into()));
        assert_eq!(many, Texts::Many(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_parse_translation_joins_segments() {
        let payload = json!([[["Bonjour ", "Hello ", null], ["le monde", "world", null]], null, "en"]);
        assert_eq!(parse_translation(&payload).unwrap(), "Bonjour le monde");
    }

    #[test]
    fn test_parse_translation_rejects_unknown_shape() {
        let err = parse_translation(&json!({"error": "nope"})).unwrap_err();
        assert!(matches!(err, UpstreamError::Translation(_)));
    }

    #[tokio::test]
    async fn test_blank_text_is_not_sent() {
        let translator = GoogleTranslator::new("http://127.0.0.1:9/unreachable");
        assert_eq!(translator.translate("  ", "fr").await.unwrap(), "  ");
    }
}
