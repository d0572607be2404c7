//! Request validation for inbound call events.
//!
//! The pipeline itself never re-validates; everything past this point
//! assumes a well-formed event. Malformed `event_type` and `timestamp`
//! values are already rejected at JSON deserialization, so the checks
//! here cover the remaining shape rules.

use callwire_core::call_event::CallEvent;
use thiserror::Error;

/// Upper bound on `call_id` length, matching the `VARCHAR(255)` column,
/// so everything the validator accepts also fits the store.
pub const MAX_CALL_ID_LEN: usize = 255;

/// A rejected request field. Messages are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Call ID is required.")]
    MissingCallId,
    #[error("Call ID must be at most 255 characters.")]
    CallIdTooLong,
    #[error("Caller number must be a valid phone number.")]
    InvalidCallerNumber,
    #[error("Callee number must be a valid phone number.")]
    InvalidCalleeNumber,
    #[error("Duration is required when event type is call_ended.")]
    MissingDuration,
}

/// Validate an already-deserialized event against the request rules.
pub fn validate(event: &CallEvent) -> Result<(), ValidationError> {
    if event.call_id.trim().is_empty() {
        return Err(ValidationError::MissingCallId);
    }
    if event.call_id.len() > MAX_CALL_ID_LEN {
        return Err(ValidationError::CallIdTooLong);
    }
    if !is_phone_number(&event.caller_number) {
        return Err(ValidationError::InvalidCallerNumber);
    }
    if !is_phone_number(&event.callee_number) {
        return Err(ValidationError::InvalidCalleeNumber);
    }
    if event.event_type.requires_duration() && event.duration.is_none() {
        return Err(ValidationError::MissingDuration);
    }
    Ok(())
}

/// E.164-like number: 10-15 digits with an optional leading `+`.
fn is_phone_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (10..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> CallEvent {
        serde_json::from_value(value).unwrap()
    }

    fn valid_started() -> CallEvent {
        event(json!({
            "call_id": "CALL-1",
            "caller_number": "+994501234567",
            "callee_number": "+994551234567",
            "event_type": "call_started",
            "timestamp": "2025-12-04T10:30:00"
        }))
    }

    #[test]
    fn accepts_valid_call_started() {
        assert_eq!(validate(&valid_started()), Ok(()));
    }

    #[test]
    fn call_ended_without_duration_is_rejected() {
        let ended = event(json!({
            "call_id": "CALL-1",
            "caller_number": "+994501234567",
            "callee_number": "+994551234567",
            "event_type": "call_ended",
            "timestamp": "2025-12-04T10:35:00"
        }));
        assert_eq!(validate(&ended), Err(ValidationError::MissingDuration));
    }

    #[test]
    fn call_ended_with_duration_is_accepted() {
        let mut ended = valid_started();
        ended.event_type = callwire_core::call_event::CallEventType::CallEnded;
        ended.duration = Some(300);
        assert_eq!(validate(&ended), Ok(()));
    }

    #[test]
    fn duration_on_other_event_types_is_tolerated() {
        let mut started = valid_started();
        started.duration = Some(12);
        assert_eq!(validate(&started), Ok(()));
    }

    #[test]
    fn empty_call_id_is_rejected() {
        let mut bad = valid_started();
        bad.call_id = "   ".to_owned();
        assert_eq!(validate(&bad), Err(ValidationError::MissingCallId));
    }

    #[test]
    fn call_id_at_column_limit_is_accepted() {
        let mut edge = valid_started();
        edge.call_id = "x".repeat(MAX_CALL_ID_LEN);
        assert_eq!(validate(&edge), Ok(()));
    }

    #[test]
    fn overlong_call_id_is_rejected() {
        let mut bad = valid_started();
        bad.call_id = "x".repeat(MAX_CALL_ID_LEN + 1);
        assert_eq!(validate(&bad), Err(ValidationError::CallIdTooLong));
    }

    #[test]
    fn phone_number_rules() {
        assert!(is_phone_number("9945012345"));
        assert!(is_phone_number("+994501234567"));
        assert!(is_phone_number("994501234567890"));
        assert!(!is_phone_number("994501234")); // 9 digits
        assert!(!is_phone_number("+9945012345678901")); // 16 digits
        assert!(!is_phone_number("99450123456a"));
        assert!(!is_phone_number("++994501234567"));
        assert!(!is_phone_number(""));
    }

    #[test]
    fn bad_numbers_are_rejected_per_field() {
        let mut bad = valid_started();
        bad.caller_number = "12345".to_owned();
        assert_eq!(validate(&bad), Err(ValidationError::InvalidCallerNumber));

        let mut bad = valid_started();
        bad.callee_number = "not-a-number".to_owned();
        assert_eq!(validate(&bad), Err(ValidationError::InvalidCalleeNumber));
    }
}
