//! Hermes payloads exchanged with the dialogue manager.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::intents::IntentRequest;

/// `hermes/intent/<name>` payload. Only the fields Home Intent reads are
/// modelled; the rest is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HermesIntent {
    #[serde(default)]
    pub input: String,
    pub intent: IntentName,
    #[serde(default)]
    pub slots: Vec<HermesSlot>,
    #[serde(default = "default_site")]
    pub site_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentName {
    pub intent_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HermesSlot {
    pub slot_name: String,
    pub value: SlotValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotValue {
    pub value: Value,
}

fn default_site() -> String {
    "default".to_string()
}

impl HermesIntent {
    pub fn from_slice(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    /// Slot values are flattened to text; numbers and booleans keep their
    /// JSON spelling.
    pub fn into_request(self) -> IntentRequest {
        let slots: IndexMap<String, String> = self
            .slots
            .into_iter()
            .map(|slot| {
                let value = match slot.value.value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (slot.slot_name, value)
            })
            .collect();

        IntentRequest {
            intent: self.intent.intent_name,
            slots,
            site_id: self.site_id,
            session_id: self.session_id,
            input: self.input,
        }
    }
}

/// `hermes/tts/say`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsSay {
    pub text: String,
    pub site_id: String,
}

/// `hermes/dialogueManager/endSession`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSession {
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_intent_payload() {
        let payload = json!({
            "input": "set a timer for 5 minutes",
            "intent": {"intentName": "components.timer.set_timer", "confidenceScore": 1.0},
            "slots": [
                {"slotName": "duration", "value": {"kind": "Number", "value": 5}},
                {"slotName": "unit", "value": {"kind": "Unknown", "value": "minutes"}}
            ],
            "siteId": "kitchen",
            "sessionId": "abc"
        });

        let request = HermesIntent::from_slice(payload.to_string().as_bytes())
            .unwrap()
            .into_request();

        assert_eq!(request.intent, "components.timer.set_timer");
        assert_eq!(request.slot("duration"), Some("5"));
        assert_eq!(request.slot("unit"), Some("minutes"));
        assert_eq!(request.site_id, "kitchen");
        assert_eq!(request.session_id.as_deref(), Some("abc"));
        assert_eq!(request.input, "set a timer for 5 minutes");
    }

    #[test]
    fn test_minimal_payload_defaults() {
        let request = HermesIntent::from_slice(br#"{"intent": {"intentName": "a.b"}}"#)
            .unwrap()
            .into_request();
        assert_eq!(request.site_id, "default");
        assert!(request.slots.is_empty());
        assert_eq!(request.session_id, None);
    }

    #[test]
    fn test_end_session_omits_missing_text() {
        let end = EndSession {
            session_id: Some("s".to_string()),
            text: None,
        };
        assert_eq!(serde_json::to_value(&end).unwrap(), json!({"sessionId": "s"}));

        let say = TtsSay {
            text: "hi".to_string(),
            site_id: "default".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&say).unwrap(),
            json!({"text": "hi", "siteId": "default"})
        );
    }
}
