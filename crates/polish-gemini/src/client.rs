//! HTTP client implementing [`Corrector`]

use crate::config::GeminiConfig;
use crate::profile::{response_schema, system_instruction};
use crate::schema::ResponseValidator;
use crate::wire::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use polish_core::{CorrectionError, CorrectionMode, CorrectionResult, Corrector};
use tracing::{debug, error, instrument};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest raw error body echoed into a transport error
const MAX_ERROR_DETAIL: usize = 200;

/// Gemini-backed corrector
#[derive(Debug)]
pub struct GeminiCorrector {
    http: reqwest::Client,
    config: GeminiConfig,
    validator: ResponseValidator,
}

impl GeminiCorrector {
    /// Build a corrector from configuration
    ///
    /// A missing API key is accepted here and reported on each call.
    ///
    /// # Errors
    /// - `CorrectionError::Configuration` if the HTTP client or schema cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, CorrectionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CorrectionError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            http,
            config,
            validator: ResponseValidator::new()?,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Corrector for GeminiCorrector {
    #[instrument(skip(self, text), fields(model = %self.config.model, chars = text.len()))]
    async fn perform_correction(
        &self,
        text: &str,
        mode: CorrectionMode,
    ) -> Result<CorrectionResult, CorrectionError> {
        let key = self
            .config
            .api_key()
            .ok_or_else(|| CorrectionError::Configuration("no Gemini API key configured".into()))?;

        let body = GenerateContentRequest::single_turn(system_instruction(mode), text, response_schema());

        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CorrectionError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| CorrectionError::Transport(e.to_string()))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ApiErrorBody>(&raw) {
                Ok(body) => body.error.message,
                Err(_) => raw.chars().take(MAX_ERROR_DETAIL).collect(),
            };
            error!(status = status.as_u16(), %detail, "Gemini request failed");
            return Err(CorrectionError::Transport(format!(
                "HTTP {}: {detail}",
                status.as_u16()
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| CorrectionError::Schema(format!("response envelope: {e}")))?;
        let payload = parsed
            .text()
            .ok_or_else(|| CorrectionError::Schema("empty response from model".into()))?;

        let result = self.validator.parse(&payload)?;
        debug!(
            corrected_chars = result.corrected_text.len(),
            explained = result.explanation.is_some(),
            "Correction received"
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_endpoint_and_model() {
        let corrector = GeminiCorrector::new(
            GeminiConfig::new()
                .with_endpoint("http://localhost:9/v1beta/")
                .with_model("m"),
        )
        .unwrap();
        assert_eq!(corrector.url(), "http://localhost:9/v1beta/models/m:generateContent");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        // Port 9 (discard) is never contacted
        let corrector =
            GeminiCorrector::new(GeminiConfig::new().with_endpoint("http://127.0.0.1:9")).unwrap();
        let err = corrector
            .perform_correction("text", CorrectionMode::Basic)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.user_message(), polish_core::MISSING_API_KEY);
    }

    #[test]
    fn corrector_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiCorrector>();
    }
}
