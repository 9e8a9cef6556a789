//! Intent Declarations
//!
//! A component describes what it can handle with an [`Intents`] declaration:
//! a set of [`Sentence`]s (phrase templates bound to a handler) and the slot
//! providers those phrases draw values from.
//!
//! # Example
//!
//! ```
//! use home_intent::intents::{Intents, Sentence};
//!
//! let intents = Intents::new("components.lights")
//!     .slot("room", || vec!["kitchen".to_string(), "office".to_string()])
//!     .sentence(
//!         Sentence::new("turn_on", |request| {
//!             Some(format!("Turning on the {}", request.slot("room")?))
//!         })
//!         .phrase("turn on the ($room){room} light"),
//!     );
//!
//! assert_eq!(intents.sentences()[0].slots().len(), 1);
//! ```
//!
//! Phrase templates use Rhasspy's `sentences.ini` syntax. A `$name`
//! reference makes the sentence depend on the slot `name`; built-in slot
//! programs such as `$rhasspy/number` are left to Rhasspy.

pub mod customization;

use indexmap::{IndexMap, IndexSet};
use regex_lite::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

pub use customization::{Customization, CustomizationError, SentenceCustomization};

/// Bound handler for a recognized sentence. The returned text is spoken back.
pub type Handler = Arc<dyn Fn(&IntentRequest) -> Option<String> + Send + Sync>;

/// Bound provider yielding the current values of one slot.
pub type SlotProvider = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

static SLOT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z0-9_\-]+)(/[A-Za-z0-9_./\-]*)?").expect("slot reference pattern")
});

/// Slot names a phrase template references, skipping built-in slot programs.
pub fn slot_references(phrase: &str) -> impl Iterator<Item = &str> {
    SLOT_REFERENCE
        .captures_iter(phrase)
        .filter(|caps| caps.get(2).is_none())
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Explicit activation override for a sentence.
///
/// `Unset` and `Yes` both leave a sentence inactive; only an explicit `No`
/// (the sentence is *not* disabled) activates a non-beta sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disabled {
    #[default]
    Unset,
    Yes,
    No,
}

impl Disabled {
    pub fn from_flag(disabled: bool) -> Self {
        if disabled {
            Disabled::Yes
        } else {
            Disabled::No
        }
    }
}

/// A recognized intent as handed to a [`Handler`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentRequest {
    /// Fully-qualified sentence name (`<declaration>.<sentence>`)
    pub intent: String,
    /// Recognized slot values by slot name
    pub slots: IndexMap<String, String>,
    /// Hermes site the request came from
    pub site_id: String,
    /// Dialogue session, if any
    pub session_id: Option<String>,
    /// Recognized text
    pub input: String,
}

impl IntentRequest {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            site_id: "default".to_string(),
            ..Default::default()
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }

    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }
}

/// One voice command: phrase templates bound to a handler
#[derive(Clone)]
pub struct Sentence {
    name: String,
    phrases: Vec<String>,
    slots: IndexSet<String>,
    beta: bool,
    disabled: Disabled,
    handler: Handler,
}

impl Sentence {
    /// Create a sentence bound to `handler`
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&IntentRequest) -> Option<String> + Send + Sync + 'static,
    {
        Sentence {
            name: name.into(),
            phrases: Vec::new(),
            slots: IndexSet::new(),
            beta: false,
            disabled: Disabled::Unset,
            handler: Arc::new(handler),
        }
    }

    /// Add a phrase template; `$slot` references are recorded
    pub fn phrase(mut self, phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        for slot in slot_references(&phrase) {
            self.slots.insert(slot.to_string());
        }
        self.phrases.push(phrase);
        self
    }

    /// Add several phrase templates
    pub fn phrases<I, P>(self, phrases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        phrases
            .into_iter()
            .fold(self, |sentence, phrase| sentence.phrase(phrase))
    }

    /// Declare a slot dependency not visible in the phrases
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slots.insert(slot.into());
        self
    }

    /// Mark as beta (activated fleet-wide by `enable_beta`)
    pub fn beta(mut self) -> Self {
        self.beta = true;
        self
    }

    pub fn disabled(mut self, disabled: Disabled) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phrase_templates(&self) -> &[String] {
        &self.phrases
    }

    pub fn slots(&self) -> &IndexSet<String> {
        &self.slots
    }

    pub fn is_beta(&self) -> bool {
        self.beta
    }

    pub fn disabled_state(&self) -> Disabled {
        self.disabled
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub(crate) fn set_disabled(&mut self, disabled: Disabled) {
        self.disabled = disabled;
    }
}

impl fmt::Debug for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentence")
            .field("name", &self.name)
            .field("phrases", &self.phrases)
            .field("slots", &self.slots)
            .field("beta", &self.beta)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

/// A named slot provider
#[derive(Clone)]
pub struct SlotDefinition {
    name: String,
    provider: SlotProvider,
}

impl SlotDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the provider
    pub fn values(&self) -> Vec<String> {
        (self.provider)()
    }
}

impl fmt::Debug for SlotDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Everything one component declares
#[derive(Clone, Debug)]
pub struct Intents {
    name: String,
    sentences: Vec<Sentence>,
    slots: Vec<SlotDefinition>,
}

impl Intents {
    /// Create an empty declaration with a hierarchical dotted name
    pub fn new(name: impl Into<String>) -> Self {
        Intents {
            name: name.into(),
            sentences: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Declaration for a component under the `components.` namespace
    pub fn component(component: &str) -> Self {
        Self::new(format!("components.{component}"))
    }

    /// Add a slot provider
    pub fn slot<F>(mut self, name: impl Into<String>, provider: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        self.slots.push(SlotDefinition {
            name: name.into(),
            provider: Arc::new(provider),
        });
        self
    }

    pub fn sentence(mut self, sentence: Sentence) -> Self {
        self.sentences.push(sentence);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn slots(&self) -> &[SlotDefinition] {
        &self.slots
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.iter().any(|slot| slot.name == name)
    }

    /// `<declaration>.<sentence>`, the key used for dispatch and export
    pub fn qualified_name(&self, sentence: &Sentence) -> String {
        format!("{}.{}", self.name, sentence.name)
    }

    /// Relative path stem of this declaration's customization file:
    /// the dotted name minus its first segment, joined with `/`.
    pub fn customization_stem(&self) -> Option<String> {
        let mut parts = self.name.split('.');
        parts.next();
        let rest: Vec<&str> = parts.filter(|p| !p.is_empty()).collect();
        (!rest.is_empty()).then(|| rest.join("/"))
    }

    pub(crate) fn sentence_mut(&mut self, name: &str) -> Option<&mut Sentence> {
        self.sentences.iter_mut().find(|s| s.name == name)
    }
}
