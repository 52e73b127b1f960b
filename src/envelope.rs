// SPDX-License-Identifier: Apache-2.0

//! Uniform success/error response shared by every command.
//!
//! The wire form is a single JSON object: `succeed` is always present,
//! `data` only on success with a payload, `errorReason` only on failure.
//! The one sanctioned exception is the missing-supertype protocol, where a
//! failure additionally carries a [`SymbolSourceRequest`] payload so the
//! caller can retry with the supertype's source.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub succeed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(payload: T) -> Self {
        Self {
            succeed: true,
            data: Some(payload),
            error_reason: None,
        }
    }

    /// Success without a payload.
    pub fn empty() -> Self {
        Self {
            succeed: true,
            data: None,
            error_reason: None,
        }
    }

    /// Failure with a human-readable reason. The reason must be non-empty.
    pub fn error(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug_assert!(!reason.is_empty(), "error envelopes carry a reason");
        Self {
            succeed: false,
            data: None,
            error_reason: Some(reason),
        }
    }

    /// Failure that additionally carries a payload. Used only when the
    /// caller needs structured data to recover, e.g. a symbol-source request.
    pub fn error_with(reason: impl Into<String>, payload: T) -> Self {
        let mut envelope = Self::error(reason);
        envelope.data = Some(payload);
        envelope
    }

    pub fn exit_code(&self) -> u8 {
        if self.succeed { 0 } else { 1 }
    }
}

/// Failure payload asking the caller to supply the source of a type that is
/// referenced by the project but not part of it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSourceRequest {
    pub requires_symbol_source: bool,
    pub symbol: String,
}

impl SymbolSourceRequest {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            requires_symbol_source: true,
            symbol: symbol.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_error_reason() {
        let envelope = Envelope::success(42);
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"succeed":true,"data":42}"#);
    }

    #[test]
    fn empty_success_has_only_succeed() {
        let envelope = Envelope::<()>::empty();
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"succeed":true}"#);
    }

    #[test]
    fn error_omits_data() {
        let envelope = Envelope::<()>::error("boom");
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"succeed":false,"errorReason":"boom"}"#);
    }

    #[test]
    fn symbol_source_request_uses_camel_case() {
        let envelope = Envelope::error_with(
            "source for type 'Auditable' is not part of this project",
            SymbolSourceRequest::for_symbol("Auditable"),
        );
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""requiresSymbolSource":true"#));
        assert!(json.contains(r#""symbol":"Auditable""#));
    }
}
