//! Intent Registration & Synchronization Engine
//!
//! # Lifecycle
//!
//! ```text
//! register() x N ──> initialize() ──> Runtime (frozen)
//!   validate            converge profile       Arc<DispatchTable>
//!   customize           aggregate slots  ──POST /api/slots
//!   record handlers     export grammar   ──POST /api/sentences
//!                       train (bounded)  ──POST /api/train
//! ```
//!
//! `initialize` consumes the engine, so no component can register once
//! synchronization has started. Everything runs on the calling thread.

pub mod convergence;
pub mod dispatch;
pub mod export;
pub mod policy;
pub mod registry;
pub mod slots;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::bus::{Announcer, IntentListener, MessageBus};
use crate::components::Component;
use crate::config::Settings;
use crate::error::Result;
use crate::intents::Intents;
use crate::rhasspy::{load_template, Arch, RecognitionService, RhasspyError};

pub use convergence::{ConvergenceReport, ProfileConvergence, ProfileState};
pub use dispatch::{DispatchOutcome, DispatchTable};
pub use export::{export_sentences, Grammar, GrammarSection};
pub use policy::EnablementPolicy;
pub use registry::{validate, IntentRegistry, RegisteredComponent};
pub use slots::{aggregate_slots, GlobalSlotTable};

/// Slots and grammar computed for one synchronization cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub slots: GlobalSlotTable,
    pub grammar: Grammar,
}

impl Snapshot {
    /// Aggregate slots, then export the grammar
    pub fn compute(components: &[RegisteredComponent], policy: &EnablementPolicy) -> Result<Self> {
        let slots = aggregate_slots(components)?;
        let grammar = export_sentences(components, &slots, policy);
        Ok(Self { slots, grammar })
    }
}

/// How the training request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingOutcome {
    Trained,
    /// The bounded wait elapsed; the previous model stays in effect
    TimedOut,
}

/// Request training, tolerating a timeout
pub fn train<S: RecognitionService + ?Sized>(
    service: &S,
    timeout: Duration,
) -> std::result::Result<TrainingOutcome, RhasspyError> {
    info!(timeout_secs = timeout.as_secs(), "training Rhasspy... (can take up to 1m if many devices)");
    match service.train(timeout) {
        Ok(()) => Ok(TrainingOutcome::Trained),
        Err(e) if e.is_timeout() => {
            warn!("timed out waiting for Rhasspy to train. Moving on, we will likely be okay.");
            Ok(TrainingOutcome::TimedOut)
        }
        Err(e) => Err(e),
    }
}

/// The engine during registration
pub struct HomeIntent<S: RecognitionService> {
    settings: Settings,
    service: S,
    arch: Arch,
    registry: IntentRegistry,
    announcer: Announcer,
}

impl<S: RecognitionService> HomeIntent<S> {
    /// Create an engine for the host architecture
    pub fn new(settings: Settings, service: S, bus: Arc<dyn MessageBus>) -> Result<Self> {
        let arch = Arch::detect()?;
        Ok(Self::with_arch(settings, service, bus, arch))
    }

    /// Create an engine for an explicit architecture
    pub fn with_arch(settings: Settings, service: S, bus: Arc<dyn MessageBus>, arch: Arch) -> Self {
        let registry = IntentRegistry::with_customizations(settings.customizations_dir());
        let announcer = Announcer::new(bus, &settings);
        Self {
            settings,
            service,
            arch,
            registry,
            announcer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    /// Handle components use to speak or play audio
    pub fn announcer(&self) -> Announcer {
        self.announcer.clone()
    }

    /// Resolve a component's configuration from `[components.<name>]`
    pub fn component_config<T: DeserializeOwned + Default>(&self, component: &str) -> Result<T> {
        Ok(self.settings.component_config(component)?)
    }

    /// Validate and register one declaration
    pub fn register(&mut self, intents: Intents) -> Result<()> {
        self.registry.register(intents)
    }

    /// Register a component's declaration
    pub fn register_component<C: Component>(&mut self, component: Arc<C>) -> Result<()> {
        self.register(component.intents())
    }

    pub fn policy(&self) -> EnablementPolicy {
        EnablementPolicy::from_settings(&self.settings.home_intent)
    }

    /// Slots and grammar as they would be pushed now, without contacting
    /// the service
    pub fn preview(&self) -> Result<Snapshot> {
        Snapshot::compute(self.registry.components(), &self.policy())
    }

    /// Synchronize Rhasspy and freeze the dispatch table
    pub fn initialize(self) -> Result<Runtime> {
        let policy = self.policy();
        let HomeIntent {
            settings,
            service,
            arch,
            registry,
            announcer,
        } = self;
        let (components, dispatch) = registry.into_parts();

        let template = load_template(arch, settings.paths.profile_dir.as_deref())?;
        let convergence = ProfileConvergence::new(&service, &settings.audio).converge(&template)?;

        let snapshot = Snapshot::compute(&components, &policy)?;
        info!(slots = snapshot.slots.len(), "updating all slots in Rhasspy");
        service.replace_slots(&snapshot.slots)?;
        info!(sentences = snapshot.grammar.len(), "updating all sentences in Rhasspy...");
        service.replace_sentences(&snapshot.grammar.render())?;

        let training = train(&service, settings.rhasspy.train_timeout())?;

        info!(intents = dispatch.len(), "Home Intent initialized");
        Ok(Runtime {
            dispatch: Arc::new(dispatch),
            snapshot,
            convergence,
            training,
            announcer,
        })
    }
}

/// Frozen result of [`HomeIntent::initialize`]
#[derive(Debug)]
pub struct Runtime {
    dispatch: Arc<DispatchTable>,
    snapshot: Snapshot,
    convergence: ConvergenceReport,
    training: TrainingOutcome,
    announcer: Announcer,
}

impl Runtime {
    pub fn dispatch(&self) -> Arc<DispatchTable> {
        Arc::clone(&self.dispatch)
    }

    pub fn slots(&self) -> &GlobalSlotTable {
        &self.snapshot.slots
    }

    pub fn grammar(&self) -> &Grammar {
        &self.snapshot.grammar
    }

    pub fn convergence(&self) -> &ConvergenceReport {
        &self.convergence
    }

    pub fn training(&self) -> TrainingOutcome {
        self.training
    }

    pub fn announcer(&self) -> Announcer {
        self.announcer.clone()
    }

    /// Listener routing recognized intents to the frozen table and
    /// publishing responses on `bus`
    pub fn listener(&self, bus: Arc<dyn MessageBus>) -> IntentListener {
        IntentListener::new(self.dispatch(), bus)
    }
}
