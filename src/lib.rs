//! Home Intent - Intent Registration & Synchronization Engine
//!
//! Components declare voice commands as sentences (phrase templates bound to
//! handlers) and slots (named value lists). The engine validates every
//! declaration, decides which sentences are active, pushes a consistent
//! snapshot of slots and sentences to Rhasspy, retrains it, and routes
//! recognized intents back to the bound handlers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use home_intent::bus::ChannelBus;
//! use home_intent::config::Settings;
//! use home_intent::intents::{Disabled, Intents, Sentence};
//! use home_intent::rhasspy::RhasspyApi;
//! use home_intent::HomeIntent;
//!
//! # fn main() -> home_intent::Result<()> {
//! let settings = Settings::default();
//! let service = RhasspyApi::new(&settings.rhasspy.url);
//! let (bus, _published) = ChannelBus::new();
//!
//! let mut home_intent = HomeIntent::new(settings, service, Arc::new(bus))?;
//! home_intent.register(
//!     Intents::component("greeter").sentence(
//!         Sentence::new("greet", |_| Some("Hello!".to_string()))
//!             .phrase("hello")
//!             .disabled(Disabled::No),
//!     ),
//! )?;
//!
//! let runtime = home_intent.initialize()?;
//! assert!(runtime.dispatch().contains("components.greeter.greet"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  register()   ┌──────────────┐
//! │ Components │ ────────────> │ IntentRegistry│ validate, customize
//! └────────────┘               └──────┬───────┘
//!                                     │ initialize()
//!                                     ▼
//!                 ┌─────────────────────────────────────┐
//!                 │ profile convergence -> slots ->     │ ──HTTP──> Rhasspy
//!                 │ sentences.ini -> train (bounded)    │
//!                 └──────────────────┬──────────────────┘
//!                                    ▼
//!                 ┌─────────────────────────────────────┐
//!                 │ Runtime: Arc<DispatchTable>         │ <──bus── hermes/intent/#
//!                 └─────────────────────────────────────┘
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod intents;
pub mod rhasspy;

// Re-export commonly used types
pub use bus::{Announcer, BusMessage, ChannelBus, IntentListener, MessageBus};
pub use components::Component;
pub use config::Settings;
pub use engine::{
    DispatchOutcome, DispatchTable, EnablementPolicy, GlobalSlotTable, Grammar, HomeIntent,
    Runtime, Snapshot, TrainingOutcome,
};
pub use error::{HomeIntentError, Result};
pub use intents::{Disabled, IntentRequest, Intents, Sentence};
pub use rhasspy::{RecognitionService, RhasspyApi, RhasspyError};
