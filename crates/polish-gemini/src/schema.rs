//! Payload validation against the derived `CorrectionResult` schema

use jsonschema::JSONSchema;
use polish_core::{CorrectionError, CorrectionResult};
use serde_json::Value;

/// Compiled validator for model payloads
pub struct ResponseValidator {
    schema: JSONSchema,
}

impl ResponseValidator {
    /// Compile the schema derived from `CorrectionResult`
    ///
    /// # Errors
    /// - `CorrectionError::Configuration` if the derived schema does not compile
    pub fn new() -> Result<Self, CorrectionError> {
        let root = schemars::schema_for!(CorrectionResult);
        let value = serde_json::to_value(&root)
            .map_err(|e| CorrectionError::Configuration(format!("schema serialization: {e}")))?;
        let schema = JSONSchema::compile(&value)
            .map_err(|e| CorrectionError::Configuration(format!("schema compilation: {e}")))?;
        Ok(Self { schema })
    }

    /// Parse and validate a model payload
    ///
    /// # Errors
    /// - `CorrectionError::Schema` if the payload is not JSON or breaks the schema
    pub fn parse(&self, payload: &str) -> Result<CorrectionResult, CorrectionError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| CorrectionError::Schema(format!("payload is not JSON: {e}")))?;

        if let Err(errors) = self.schema.validate(&value) {
            let detail = errors
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CorrectionError::Schema(detail));
        }

        serde_json::from_value(value).map_err(|e| CorrectionError::Schema(e.to_string()))
    }
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ResponseValidator {
        ResponseValidator::new().unwrap()
    }

    #[test]
    fn accepts_minimal_payload() {
        let result = validator()
            .parse(r#"{"correctedText":"I have gone to the store."}"#)
            .unwrap();
        assert_eq!(result, CorrectionResult::new("I have gone to the store."));
    }

    #[test]
    fn accepts_null_explanation_and_changes() {
        let result = validator()
            .parse(r#"{"correctedText":"Fine.","explanation":null,"changes":["a -> b"]}"#)
            .unwrap();
        assert_eq!(result.explanation, None);
        assert_eq!(result.changes, Some(vec!["a -> b".to_string()]));
    }

    #[test]
    fn rejects_missing_corrected_text() {
        let err = validator().parse(r#"{"explanation":"x"}"#).unwrap_err();
        assert!(matches!(err, CorrectionError::Schema(_)));
    }

    #[test]
    fn rejects_wrong_types() {
        let err = validator().parse(r#"{"correctedText":42}"#).unwrap_err();
        assert!(matches!(err, CorrectionError::Schema(_)));
    }

    #[test]
    fn rejects_non_json() {
        let err = validator().parse("Sure! Here is your text.").unwrap_err();
        assert!(matches!(err, CorrectionError::Schema(ref m) if m.contains("not JSON")));
    }
}
