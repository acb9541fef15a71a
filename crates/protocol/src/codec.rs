//! Encode/decode between wire JSON text frames and the DTOs in
//! `crate::messages` (spec.md §6, component C6).
//!
//! A minimal hand-written codec suffices per spec.md §9 "Serialisation" —
//! `serde_json` does the heavy lifting, this module only owns the envelope
//! (`{"type", "payload"}`) and the distinct parse-failure reasons spec.md §7
//! names.

use crate::ActionPayload;
use crate::InboundMessage;
use crate::JoinMatchPayload;
use crate::OutboundMessage;
use crate::ProtocolError;
use serde_json::Value;

/// Parses one inbound text frame into a typed [`InboundMessage`]. Every
/// failure mode spec.md §7 names under "Parse"/"Unknown type"/"Missing
/// parameter" is a distinct [`ProtocolError`] variant, never a panic.
pub fn decode(frame: &str) -> Result<InboundMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(frame).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingField("type"))?;
    let payload = value
        .get("payload")
        .cloned()
        .ok_or(ProtocolError::MissingField("payload"))?;
    match kind {
        "join_match" => {
            let payload: JoinMatchPayload = serde_json::from_value(payload)
                .map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
            if payload.match_id.0.is_empty() {
                return Err(ProtocolError::MissingField("matchId"));
            }
            Ok(InboundMessage::JoinMatch(payload))
        }
        "action" => {
            let payload: ActionPayload = serde_json::from_value(payload)
                .map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
            if payload.match_id.0.is_empty() {
                return Err(ProtocolError::MissingField("matchId"));
            }
            Ok(InboundMessage::Action(payload))
        }
        other => Err(ProtocolError::UnknownType(other.to_string())),
    }
}

/// Serializes an [`OutboundMessage`] into the `{"type", "payload"}` envelope
/// text frame. Infallible: every `OutboundMessage` variant is constructed
/// from data already known to be representable.
pub fn encode(message: &OutboundMessage) -> String {
    serde_json::to_string(message).expect("OutboundMessage always serializes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::WireActionType;

    #[test]
    fn decode_join_match() {
        let frame = r#"{"type":"join_match","payload":{"matchId":"m1"}}"#;
        match decode(frame).unwrap() {
            InboundMessage::JoinMatch(p) => assert_eq!(p.match_id.0, "m1"),
            _ => panic!("expected JoinMatch"),
        }
    }

    #[test]
    fn decode_action_end_turn() {
        let frame = r#"{"type":"action","payload":{"matchId":"m1","playerId":"P1","action":{"type":"END_TURN"}}}"#;
        match decode(frame).unwrap() {
            InboundMessage::Action(p) => {
                assert_eq!(p.action.action_type, WireActionType::EndTurn);
                assert!(p.action.unit_id.is_none());
            }
            _ => panic!("expected Action"),
        }
    }

    #[test]
    fn decode_action_with_target_and_choice() {
        let frame = r#"{"type":"action","payload":{"matchId":"m1","playerId":"P2","action":{"type":"DEATH_CHOICE","choice":"SPAWN_OBSTACLE"}}}"#;
        match decode(frame).unwrap() {
            InboundMessage::Action(p) => {
                assert_eq!(p.action.action_type, WireActionType::DeathChoice);
                assert_eq!(
                    p.action.choice,
                    Some(fbf_state::DeathChoiceKind::SpawnObstacle)
                );
            }
            _ => panic!("expected Action"),
        }
    }

    #[test]
    fn decode_malformed_json_is_parse_error() {
        let err = decode("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedJson(_)));
    }

    #[test]
    fn decode_missing_type_is_missing_field() {
        let err = decode(r#"{"payload":{}}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingField("type"));
    }

    #[test]
    fn decode_unknown_type_is_unknown_type() {
        let err = decode(r#"{"type":"spectate","payload":{}}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType("spectate".to_string()));
    }

    #[test]
    fn decode_empty_match_id_is_missing_field() {
        let frame = r#"{"type":"join_match","payload":{"matchId":""}}"#;
        let err = decode(frame).unwrap_err();
        assert_eq!(err, ProtocolError::MissingField("matchId"));
    }

    #[test]
    fn encode_roundtrips_tag_and_payload() {
        let msg = OutboundMessage::GameReady {
            message: "both players connected".to_string(),
        };
        let text = encode(&msg);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "game_ready");
        assert_eq!(value["payload"]["message"], "both players connected");
    }
}
