// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "en";

// Idioma preferido do cliente, extraído do Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn is_portuguese(&self) -> bool {
        self.0 == "pt"
    }

    /// "pt-BR,pt;q=0.9" -> "pt"
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_primary_language_subtag() {
        assert_eq!(Locale::from_header("pt-PT,pt;q=0.9,en;q=0.8").0, "pt");
        assert_eq!(Locale::from_header("en-US").0, "en");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(Locale::from_header("").0, "en");
    }
}
