#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_envelope_data() {
    let result: ActionResult<u32> = Ok(7).into();
    assert!(result.is_ok());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json, serde_json::json!({ "data": 7 }));
}

#[test]
fn test_envelope_error_with_fields() {
    let errors = FieldErrors::single("custom_source", FieldErrorKind::Required, "Name the source");
    let result: ActionResult<u32> = Err(LedgerError::from(errors)).into();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["kind"], "validation");
    assert_eq!(json["fields"][0]["field"], "custom_source");
    assert_eq!(json["fields"][0]["kind"], "required");
}

#[test]
fn test_envelope_error_without_fields() {
    let result: ActionResult<u32> = Err(LedgerError::NotFound(Entity::Month)).into();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["error"], "Month not found");
    assert!(json.get("fields").is_none());
}

#[test]
fn test_rate_limit_kind() {
    let err = LedgerError::from(StoreError::RateLimited("busy".into()));
    assert_eq!(err.kind(), "rate_limited");
    assert_eq!(LedgerError::from(StoreError::Backend("io".into())).kind(), "store");
}

#[test]
fn test_field_errors_display() {
    let mut errors = FieldErrors::new();
    errors.push("date", FieldErrorKind::InvalidDate, "bad date");
    errors.push("amount", FieldErrorKind::InvalidAmount, "too large");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.to_string(), "date: bad date; amount: too large");
    assert_eq!(errors.get("amount").unwrap().kind, FieldErrorKind::InvalidAmount);
}
