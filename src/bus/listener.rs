//! Intent listener: routes recognized intents to the frozen dispatch table.

use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use super::hermes::{EndSession, HermesIntent};
use super::{topics, BusError, BusMessage, MessageBus};
use crate::engine::{DispatchOutcome, DispatchTable};

#[derive(Clone)]
pub struct IntentListener {
    dispatch: Arc<DispatchTable>,
    bus: Arc<dyn MessageBus>,
}

impl IntentListener {
    pub fn new(dispatch: Arc<DispatchTable>, bus: Arc<dyn MessageBus>) -> Self {
        Self { dispatch, bus }
    }

    /// Handle one incoming message. Messages that are not intents, or whose
    /// payload does not parse, are skipped. Returns the dispatch outcome when
    /// an intent was routed.
    pub fn handle(&self, message: &BusMessage) -> Result<Option<DispatchOutcome>, BusError> {
        if !message.topic.starts_with(topics::INTENT_PREFIX) {
            debug!(topic = %message.topic, "not an intent, ignoring");
            return Ok(None);
        }

        let request = match HermesIntent::from_slice(&message.payload) {
            Ok(intent) => intent.into_request(),
            Err(e) => {
                warn!(topic = %message.topic, error = %e, "malformed intent payload");
                return Ok(None);
            }
        };

        let outcome = self.dispatch.dispatch(&request);
        let text = match &outcome {
            DispatchOutcome::Handled(text) => {
                info!(intent = %request.intent, responded = text.is_some(), "handled intent");
                text.clone()
            }
            DispatchOutcome::Unknown => {
                warn!(intent = %request.intent, "no handler registered for intent");
                None
            }
        };

        let end = EndSession {
            session_id: request.session_id,
            text,
        };
        let message = BusMessage::json(topics::END_SESSION, &end)?;
        self.bus.publish(&message.topic, message.payload)?;
        Ok(Some(outcome))
    }

    /// Handle messages until the channel disconnects. A failed publish
    /// stops the loop.
    pub fn run(&self, messages: Receiver<BusMessage>) -> Result<(), BusError> {
        for message in messages {
            self.handle(&message)?;
        }
        Ok(())
    }

    /// Run `workers` listener threads sharing one receiver
    pub fn serve(
        &self,
        messages: Receiver<BusMessage>,
        workers: usize,
    ) -> Vec<JoinHandle<Result<(), BusError>>> {
        (0..workers.max(1))
            .map(|_| {
                let listener = self.clone();
                let messages = messages.clone();
                thread::spawn(move || listener.run(messages))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ChannelBus;
    use crate::engine::IntentRegistry;
    use crate::intents::{Intents, Sentence};
    use serde_json::json;

    fn listener() -> (IntentListener, Receiver<BusMessage>) {
        let mut registry = IntentRegistry::new();
        registry
            .register(
                Intents::component("greeter")
                    .sentence(Sentence::new("greet", |req| {
                        Some(format!("Hello {}", req.slot("name").unwrap_or("there")))
                    }))
                    .sentence(Sentence::new("quiet", |_| None)),
            )
            .unwrap();
        let (_, dispatch) = registry.into_parts();
        let (bus, rx) = ChannelBus::new();
        (IntentListener::new(Arc::new(dispatch), Arc::new(bus)), rx)
    }

    fn intent(name: &str, session: &str) -> BusMessage {
        BusMessage::json(
            topics::intent(name),
            &json!({
                "intent": {"intentName": name},
                "slots": [{"slotName": "name", "value": {"value": "Ada"}}],
                "sessionId": session
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_handled_intent_ends_session_with_text() {
        let (listener, rx) = listener();
        let outcome = listener
            .handle(&intent("components.greeter.greet", "s1"))
            .unwrap();

        assert_eq!(outcome, Some(DispatchOutcome::Handled(Some("Hello Ada".to_string()))));
        let published = rx.try_recv().unwrap();
        assert_eq!(published.topic, topics::END_SESSION);
        assert_eq!(
            published.payload_json().unwrap(),
            json!({"sessionId": "s1", "text": "Hello Ada"})
        );
    }

    #[test]
    fn test_silent_and_unknown_intents_end_session_without_text() {
        let (listener, rx) = listener();

        listener.handle(&intent("components.greeter.quiet", "s2")).unwrap();
        assert_eq!(rx.try_recv().unwrap().payload_json().unwrap(), json!({"sessionId": "s2"}));

        let outcome = listener.handle(&intent("components.nobody.home", "s3")).unwrap();
        assert_eq!(outcome, Some(DispatchOutcome::Unknown));
        assert_eq!(rx.try_recv().unwrap().payload_json().unwrap(), json!({"sessionId": "s3"}));
    }

    #[test]
    fn test_non_intent_and_malformed_messages_skipped() {
        let (listener, rx) = listener();
        assert_eq!(listener.handle(&BusMessage::new("hermes/tts/say", Vec::new())).unwrap(), None);
        assert_eq!(
            listener.handle(&BusMessage::new("hermes/intent/x", b"not json".to_vec())).unwrap(),
            None
        );
        assert!(rx.try_recv().is_err());
    }
}
