//! Call lifecycle event domain types.
//!
//! A [`CallEvent`] is the validated, immutable record of one call-lifecycle
//! occurrence as reported by the signaling server. The same canonical JSON
//! encoding ([`CallEvent::to_payload`]) is used for the stored payload blob
//! and for the broker message body, so the audit log and the downstream
//! queue always agree on the wire shape.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// The kind of call-lifecycle occurrence.
///
/// Stored in Postgres as the `call_event_type` enum and serialized in
/// snake_case on the wire (`call_started`, `call_ended`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case", type_name = "call_event_type")]
pub enum CallEventType {
    CallStarted,
    CallEnded,
    CallHeld,
    CallTransferred,
    CallMissed,
    CallAnswered,
}

impl CallEventType {
    /// All known event types, in declaration order.
    pub const ALL: [CallEventType; 6] = [
        CallEventType::CallStarted,
        CallEventType::CallEnded,
        CallEventType::CallHeld,
        CallEventType::CallTransferred,
        CallEventType::CallMissed,
        CallEventType::CallAnswered,
    ];

    /// The snake_case wire name of this event type.
    pub fn as_str(self) -> &'static str {
        match self {
            CallEventType::CallStarted => "call_started",
            CallEventType::CallEnded => "call_ended",
            CallEventType::CallHeld => "call_held",
            CallEventType::CallTransferred => "call_transferred",
            CallEventType::CallMissed => "call_missed",
            CallEventType::CallAnswered => "call_answered",
        }
    }

    /// Only `call_ended` events must carry a duration.
    pub fn requires_duration(self) -> bool {
        matches!(self, CallEventType::CallEnded)
    }
}

impl std::fmt::Display for CallEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call-lifecycle occurrence, validated upstream.
///
/// Immutable once constructed. The store's copy is the system of record;
/// the published copy is a best-effort downstream notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Caller-supplied correlation identifier. Not unique across retries;
    /// duplicates are stored as independent rows.
    pub call_id: String,
    pub caller_number: String,
    pub callee_number: String,
    pub event_type: CallEventType,
    /// Caller-supplied point in time, second precision, no offset.
    #[serde(with = "timestamp_format")]
    pub timestamp: PrimitiveDateTime,
    /// Call duration in seconds. Required when `event_type` is
    /// `call_ended`; tolerated but not required otherwise.
    #[serde(default)]
    pub duration: Option<u32>,
}

impl CallEvent {
    /// Canonical JSON encoding of this event.
    ///
    /// Fixed field set, `duration` encoded as `null` when absent. Used
    /// verbatim for both the `call_event_logs.payload` column and the
    /// broker message body.
    pub fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Serde format for the event timestamp.
///
/// Emits `2025-12-04T10:30:00`; accepts the same shape with either a `T`
/// or a space separator, since the signaling server sends both.
mod timestamp_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;

    const CANONICAL: &[BorrowedFormatItem<'_>] =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    const SPACE_SEPARATED: &[BorrowedFormatItem<'_>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    pub fn serialize<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = value.format(CANONICAL).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        PrimitiveDateTime::parse(&text, CANONICAL)
            .or_else(|_| PrimitiveDateTime::parse(&text, SPACE_SEPARATED))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_type_wire_names_round_trip() {
        for event_type in CallEventType::ALL {
            let encoded = serde_json::to_value(event_type).unwrap();
            assert_eq!(encoded, json!(event_type.as_str()));
            let decoded: CallEventType = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, event_type);
        }
    }

    #[test]
    fn duration_required_only_for_call_ended() {
        assert!(CallEventType::CallEnded.requires_duration());
        for event_type in CallEventType::ALL {
            if event_type != CallEventType::CallEnded {
                assert!(!event_type.requires_duration(), "{event_type}");
            }
        }
    }

    #[test]
    fn parses_iso_separator_timestamp() {
        let event: CallEvent = serde_json::from_value(json!({
            "call_id": "CALL-1",
            "caller_number": "+994501234567",
            "callee_number": "+994551234567",
            "event_type": "call_started",
            "timestamp": "2025-12-04T10:30:00"
        }))
        .unwrap();

        assert_eq!(event.call_id, "CALL-1");
        assert_eq!(event.event_type, CallEventType::CallStarted);
        assert_eq!(event.timestamp, time::macros::datetime!(2025-12-04 10:30:00));
        assert_eq!(event.duration, None);
    }

    #[test]
    fn parses_space_separator_timestamp() {
        let event: CallEvent = serde_json::from_value(json!({
            "call_id": "CALL-2",
            "caller_number": "994501234567",
            "callee_number": "994551234567",
            "event_type": "call_ended",
            "timestamp": "2025-12-04 10:35:00",
            "duration": 300
        }))
        .unwrap();

        assert_eq!(event.event_type, CallEventType::CallEnded);
        assert_eq!(event.duration, Some(300));
    }

    #[test]
    fn rejects_unknown_event_type() {
        let result: Result<CallEvent, _> = serde_json::from_value(json!({
            "call_id": "CALL-3",
            "caller_number": "994501234567",
            "callee_number": "994551234567",
            "event_type": "call_exploded",
            "timestamp": "2025-12-04T10:30:00"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn canonical_payload_has_fixed_field_set() {
        let event: CallEvent = serde_json::from_value(json!({
            "call_id": "CALL-1",
            "caller_number": "+994501234567",
            "callee_number": "+994551234567",
            "event_type": "call_started",
            "timestamp": "2025-12-04T10:30:00"
        }))
        .unwrap();

        let payload = event.to_payload().unwrap();
        assert_eq!(
            payload,
            json!({
                "call_id": "CALL-1",
                "caller_number": "+994501234567",
                "callee_number": "+994551234567",
                "event_type": "call_started",
                "timestamp": "2025-12-04T10:30:00",
                "duration": null
            })
        );
    }

    #[test]
    fn canonical_payload_carries_duration() {
        let event: CallEvent = serde_json::from_value(json!({
            "call_id": "CALL-9",
            "caller_number": "994501234567",
            "callee_number": "994551234567",
            "event_type": "call_ended",
            "timestamp": "2025-12-04 10:35:00",
            "duration": 300
        }))
        .unwrap();

        let payload = event.to_payload().unwrap();
        assert_eq!(payload["duration"], json!(300));
        assert_eq!(payload["timestamp"], json!("2025-12-04T10:35:00"));
    }
}
