//! Message Bus
//!
//! Home Intent talks to the rest of the voice stack over Hermes topics. The
//! transport is behind [`MessageBus`]; [`ChannelBus`] is the in-process
//! implementation built on crossbeam channels.

pub mod announce;
pub mod hermes;
pub mod listener;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use announce::Announcer;
pub use hermes::{EndSession, HermesIntent, TtsSay};
pub use listener::IntentListener;

/// Hermes topic names
pub mod topics {
    pub const TTS_SAY: &str = "hermes/tts/say";
    pub const END_SESSION: &str = "hermes/dialogueManager/endSession";
    pub const INTENT_PREFIX: &str = "hermes/intent/";

    /// Raw WAV playback on one site
    pub fn play_bytes(site_id: &str) -> String {
        format!("hermes/audioServer/{site_id}/playBytes/homeintent_audio")
    }

    /// Topic a recognized intent is published on
    pub fn intent(intent_name: &str) -> String {
        format!("{INTENT_PREFIX}{intent_name}")
    }
}

#[derive(Error, Debug)]
pub enum BusError {
    #[error("Message bus is closed")]
    Closed,

    #[error("Could not encode payload for {topic}: {message}")]
    Encode { topic: String, message: String },

    #[error("Message bus I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One published message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// Message with a JSON-encoded payload
    pub fn json<T: Serialize>(topic: impl Into<String>, payload: &T) -> Result<Self, BusError> {
        let topic = topic.into();
        let payload = serde_json::to_vec(payload).map_err(|e| BusError::Encode {
            topic: topic.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { topic, payload })
    }

    /// Payload parsed as JSON, if it is JSON
    pub fn payload_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.payload).ok()
    }
}

/// Publishing side of the bus
pub trait MessageBus: Send + Sync {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;

    fn publish_json<T: Serialize>(&self, topic: &str, payload: &T) -> Result<(), BusError>
    where
        Self: Sized,
    {
        let message = BusMessage::json(topic, payload)?;
        self.publish(&message.topic, message.payload)
    }
}

impl<T: MessageBus + ?Sized> MessageBus for Arc<T> {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        (**self).publish(topic, payload)
    }
}

/// In-process bus: everything published arrives on the paired receiver
#[derive(Debug, Clone)]
pub struct ChannelBus {
    sender: Sender<BusMessage>,
}

impl ChannelBus {
    pub fn new() -> (Self, Receiver<BusMessage>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl MessageBus for ChannelBus {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.sender
            .send(BusMessage::new(topic, payload))
            .map_err(|_| BusError::Closed)
    }
}
