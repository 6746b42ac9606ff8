//! Internationalization (i18n) for pages and API messages.
//!
//! Messages live in TOML files under `locales/`, embedded at compile time.
//! Nested tables are flattened into dot-separated keys.
//!
//! # Usage
//!
//! ```
//! use intake::i18n::I18n;
//!
//! let i18n = I18n::embedded("fr").unwrap();
//! assert_eq!(i18n.t("status.accepted"), "Acceptée");
//!
//! let count = i18n.t_with("review.count", &[("count", "3")]);
//! assert!(count.starts_with('3'));
//! ```

use std::collections::HashMap;

use thiserror::Error;

/// Default locale.
pub const DEFAULT_LOCALE: &str = "fr";

/// Locales compiled into the binary.
pub const EMBEDDED_LOCALES: &[(&str, &str)] = &[
    ("fr", include_str!("../../locales/fr.toml")),
    ("en", include_str!("../../locales/en.toml")),
];

/// I18n-related errors.
#[derive(Error, Debug)]
pub enum I18nError {
    /// Failed to parse TOML.
    #[error("Failed to parse locale file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Locale not found.
    #[error("Locale not found: {0}")]
    LocaleNotFound(String),
}

/// Result type for i18n operations.
pub type Result<T> = std::result::Result<T, I18nError>;

/// Flattened messages for one locale.
#[derive(Debug, Clone)]
pub struct I18n {
    locale: String,
    messages: HashMap<String, String>,
}

impl I18n {
    /// Load one of the embedded locales.
    pub fn embedded(locale: &str) -> Result<Self> {
        let (_, content) = EMBEDDED_LOCALES
            .iter()
            .find(|(name, _)| *name == locale)
            .ok_or_else(|| I18nError::LocaleNotFound(locale.to_string()))?;
        Self::from_str(locale, content)
    }

    /// Create an I18n instance from a TOML string.
    pub fn from_str(locale: &str, content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;

        let mut messages = HashMap::new();
        flatten_toml("", &toml::Value::Table(table), &mut messages);

        Ok(Self {
            locale: locale.to_string(),
            messages,
        })
    }

    /// Create an empty I18n instance.
    ///
    /// All translations will return the key itself.
    pub fn empty(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            messages: HashMap::new(),
        }
    }

    /// Get the current locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Get all loaded message keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }

    /// Translate a key. Unknown keys are returned as-is.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(|s| s.as_str()).unwrap_or(key)
    }

    /// Translate a key, replacing `{{name}}` placeholders.
    ///
    /// ```
    /// # use intake::i18n::I18n;
    /// let i18n = I18n::from_str("en", r#"
    /// [error]
    /// missing_fields = "Missing: {{fields}}"
    /// "#).unwrap();
    ///
    /// let result = i18n.t_with("error.missing_fields", &[("fields", "nom, email")]);
    /// assert_eq!(result, "Missing: nom, email");
    /// ```
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut result = self.t(key).to_string();

        for (name, value) in params {
            let placeholder = format!("{{{{{name}}}}}");
            result = result.replace(&placeholder, value);
        }

        result
    }

    /// Check if a translation key exists.
    pub fn has_key(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::empty(DEFAULT_LOCALE)
    }
}

/// Flatten a TOML value into a HashMap with dot-separated keys.
fn flatten_toml(prefix: &str, value: &toml::Value, map: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_toml(&new_prefix, val, map);
            }
        }
        toml::Value::String(s) => {
            map.insert(prefix.to_string(), s.clone());
        }
        toml::Value::Integer(i) => {
            map.insert(prefix.to_string(), i.to_string());
        }
        toml::Value::Float(f) => {
            map.insert(prefix.to_string(), f.to_string());
        }
        toml::Value::Boolean(b) => {
            map.insert(prefix.to_string(), b.to_string());
        }
        // Arrays are not translations.
        toml::Value::Array(_) => {}
        toml::Value::Datetime(dt) => {
            map.insert(prefix.to_string(), dt.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationStatus;

    #[test]
    fn test_flatten_nested_tables() {
        let i18n = I18n::from_str(
            "en",
            r#"
[a]
b = "x"
[a.c]
d = "y"
n = 3
"#,
        )
        .unwrap();
        assert_eq!(i18n.t("a.b"), "x");
        assert_eq!(i18n.t("a.c.d"), "y");
        assert_eq!(i18n.t("a.c.n"), "3");
        assert_eq!(i18n.locale(), "en");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let i18n = I18n::empty("fr");
        assert_eq!(i18n.t("nope.missing"), "nope.missing");
        assert!(!i18n.has_key("nope.missing"));
        assert_eq!(i18n.t_with("x.{{a}}", &[("a", "b")]), "x.b");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            I18n::from_str("fr", "not = [valid"),
            Err(I18nError::Parse(_))
        ));
    }

    #[test]
    fn test_embedded_locales() {
        assert_eq!(I18n::embedded("fr").unwrap().t("status.interview"), "Entretien");
        assert_eq!(I18n::embedded("en").unwrap().t("status.interview"), "Interview");
        assert!(matches!(
            I18n::embedded("de"),
            Err(I18nError::LocaleNotFound(_))
        ));
    }

    #[test]
    fn test_embedded_locales_share_keys() {
        let fr = I18n::embedded("fr").unwrap();
        let en = I18n::embedded("en").unwrap();
        for key in fr.keys() {
            assert!(en.has_key(key), "en is missing {key}");
        }
        for key in en.keys() {
            assert!(fr.has_key(key), "fr is missing {key}");
        }
    }

    #[test]
    fn test_every_status_has_a_label() {
        for (locale, _) in EMBEDDED_LOCALES {
            let i18n = I18n::embedded(locale).unwrap();
            for status in ApplicationStatus::ALL {
                assert!(i18n.has_key(&status.label_key()), "{locale}: {status}");
            }
        }
    }
}
