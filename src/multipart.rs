// Multipart encoder for payroll submissions
// Each field is labeled by a pluggable classifier before it becomes a form part

use reqwest::multipart::{Form, Part};
use std::sync::Arc;

use crate::error::Result;

pub const JSON_MIME: &str = "application/json";

/// How a single form field is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// Part labeled `application/json`
    Json,
    /// Plain form-data text part
    Form,
}

/// Decides the content type of each multipart field
pub trait PartClassifier: Send + Sync {
    fn classify(&self, name: &str, value: &str) -> PartKind;
}

/// JSON if the value parses as JSON, form data otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProbeClassifier;

impl PartClassifier for JsonProbeClassifier {
    fn classify(&self, _name: &str, value: &str) -> PartKind {
        match serde_json::from_str::<serde_json::Value>(value) {
            Ok(_) => PartKind::Json,
            Err(_) => PartKind::Form,
        }
    }
}

/// Builds `multipart/form-data` bodies from ordered fields
#[derive(Clone)]
pub struct MultipartEncoder {
    classifier: Arc<dyn PartClassifier>,
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self::new(Arc::new(JsonProbeClassifier))
    }
}

impl std::fmt::Debug for MultipartEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartEncoder").finish_non_exhaustive()
    }
}

impl MultipartEncoder {
    pub fn new(classifier: Arc<dyn PartClassifier>) -> Self {
        Self { classifier }
    }

    /// Classification of each field, in order
    pub fn plan<'a, I>(&self, fields: I) -> Vec<(String, PartKind)>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), self.classifier.classify(name, value)))
            .collect()
    }

    /// Build the form; field order is kept
    pub fn encode<'a, I>(&self, fields: I) -> Result<Form>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Form::new();
        for (name, value) in fields {
            let kind = self.classifier.classify(name, value);
            tracing::trace!(field = name, kind = ?kind, "Encoding multipart field");

            let part = match kind {
                PartKind::Json => Part::text(value.to_string()).mime_str(JSON_MIME)?,
                PartKind::Form => Part::text(value.to_string()),
            };
            form = form.part(name.to_string(), part);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_classifier() {
        let classifier = JsonProbeClassifier;
        assert_eq!(classifier.classify("data", r#"{"a":1}"#), PartKind::Json);
        assert_eq!(classifier.classify("rows", "[1,2]"), PartKind::Json);
        assert_eq!(classifier.classify("note", "hello world"), PartKind::Form);
        assert_eq!(classifier.classify("broken", "{\"a\":"), PartKind::Form);
    }

    #[test]
    fn test_plan_keeps_order() {
        let encoder = MultipartEncoder::default();
        let plan = encoder.plan([("payload", r#"{"x":true}"#), ("comment", "ok then")]);
        assert_eq!(
            plan,
            vec![
                ("payload".to_string(), PartKind::Json),
                ("comment".to_string(), PartKind::Form),
            ]
        );
    }

    struct AlwaysForm;

    impl PartClassifier for AlwaysForm {
        fn classify(&self, _name: &str, _value: &str) -> PartKind {
            PartKind::Form
        }
    }

    #[test]
    fn test_custom_classifier() {
        let encoder = MultipartEncoder::new(Arc::new(AlwaysForm));
        let plan = encoder.plan([("payload", r#"{"x":true}"#)]);
        assert_eq!(plan[0].1, PartKind::Form);
    }

    #[test]
    fn test_encode_builds_form() {
        let encoder = MultipartEncoder::default();
        let form = encoder
            .encode([("payload", r#"{"x":true}"#), ("comment", "ok")])
            .unwrap();
        assert!(!form.boundary().is_empty());
    }
}
