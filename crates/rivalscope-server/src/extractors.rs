use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub const GEMINI_KEY_HEADER: &str = "X-Gemini-Key";

/// API key taken from the `X-Gemini-Key` header, falling back to
/// `GEMINI_API_KEY`.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub gemini_key: Option<String>,
}

impl ApiKeys {
    pub fn gemini(&self) -> Result<String, AppError> {
        self.gemini_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::MissingApiKey("Gemini".into()))
    }
}

impl<S> FromRequestParts<S> for ApiKeys
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let gemini_key = parts
            .headers
            .get(GEMINI_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());

        Ok(ApiKeys { gemini_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_key_present() {
        let keys = ApiKeys {
            gemini_key: Some("gk".into()),
        };
        assert_eq!(keys.gemini().unwrap(), "gk");
    }

    #[test]
    fn missing_or_blank_key_is_err() {
        assert!(ApiKeys::default().gemini().is_err());
        let blank = ApiKeys {
            gemini_key: Some("  ".into()),
        };
        assert!(matches!(blank.gemini(), Err(AppError::MissingApiKey(_))));
    }

    #[tokio::test]
    async fn header_takes_priority_over_env_var() {
        // SAFETY: no other test in this crate reads GEMINI_API_KEY
        unsafe {
            std::env::set_var("GEMINI_API_KEY", "env-gemini");
        }

        let req = axum::http::Request::builder()
            .header(GEMINI_KEY_HEADER, "header-gemini")
            .body(())
            .unwrap();
        let (mut parts, _body) = req.into_parts();
        let keys = ApiKeys::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(keys.gemini_key.as_deref(), Some("header-gemini"));

        let req = axum::http::Request::builder().body(()).unwrap();
        let (mut parts, _body) = req.into_parts();
        let keys = ApiKeys::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(keys.gemini_key.as_deref(), Some("env-gemini"));

        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
        }
    }
}
