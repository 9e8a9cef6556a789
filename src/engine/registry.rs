//! Component registry and declaration validation.

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use super::dispatch::DispatchTable;
use crate::error::{HomeIntentError, Result};
use crate::intents::{Customization, Intents};

/// A validated declaration, in the order it was registered
#[derive(Debug, Clone)]
pub struct RegisteredComponent {
    intents: Intents,
}

impl RegisteredComponent {
    pub fn intents(&self) -> &Intents {
        &self.intents
    }

    pub fn name(&self) -> &str {
        self.intents.name()
    }
}

/// Check a declaration on its own: names unique within it, and every slot a
/// sentence references provided by the same declaration.
pub fn validate(intents: &Intents) -> Result<()> {
    let declaration = intents.name();

    let mut slots = HashSet::new();
    for slot in intents.slots() {
        if !slots.insert(slot.name()) {
            return Err(HomeIntentError::DuplicateSlotName {
                slot: slot.name().to_string(),
                declaration: declaration.to_string(),
            });
        }
    }

    let mut sentences = HashSet::new();
    for sentence in intents.sentences() {
        if !sentences.insert(sentence.name()) {
            return Err(HomeIntentError::DuplicateSentenceName {
                sentence: sentence.name().to_string(),
                declaration: declaration.to_string(),
            });
        }
        if let Some(missing) = sentence.slots().iter().find(|s| !slots.contains(s.as_str())) {
            return Err(HomeIntentError::UndefinedSlotReference {
                sentence: sentence.name().to_string(),
                slot: missing.clone(),
                declaration: declaration.to_string(),
            });
        }
    }

    Ok(())
}

/// Ordered store of registered declarations plus the dispatch table being
/// filled alongside it. Consumed by [`IntentRegistry::into_parts`].
#[derive(Debug, Default)]
pub struct IntentRegistry {
    components: Vec<RegisteredComponent>,
    dispatch: DispatchTable,
    customizations_dir: Option<PathBuf>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that applies overlays found under `dir` before validation
    pub fn with_customizations(dir: impl Into<PathBuf>) -> Self {
        Self {
            customizations_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Validate and append a declaration. On error nothing from the
    /// declaration is kept.
    pub fn register(&mut self, mut intents: Intents) -> Result<()> {
        info!(declaration = intents.name(), "verifying sentences' slots");

        if self.components.iter().any(|c| c.name() == intents.name()) {
            return Err(HomeIntentError::DuplicateDeclaration {
                declaration: intents.name().to_string(),
            });
        }

        if let Some(dir) = &self.customizations_dir {
            if let Some(overlay) = Customization::find(dir, &intents)? {
                overlay.apply(&mut intents);
            }
        }

        validate(&intents)?;

        // Dotted names can collide across declarations ("a" + "b.c" vs "a.b" + "c").
        if let Some(intent) = intents
            .sentences()
            .iter()
            .map(|sentence| intents.qualified_name(sentence))
            .find(|intent| self.dispatch.contains(intent))
        {
            return Err(HomeIntentError::DuplicateIntentName { intent });
        }

        for sentence in intents.sentences() {
            debug!(?sentence, "registering handler");
            self.dispatch
                .insert(intents.qualified_name(sentence), sentence.handler().clone());
        }

        info!(
            declaration = intents.name(),
            sentences = intents.sentences().len(),
            slots = intents.slots().len(),
            "sentences look good"
        );
        self.components.push(RegisteredComponent { intents });
        Ok(())
    }

    pub fn components(&self) -> &[RegisteredComponent] {
        &self.components
    }

    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Seal the registry
    pub fn into_parts(self) -> (Vec<RegisteredComponent>, DispatchTable) {
        (self.components, self.dispatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::{Disabled, Sentence};

    fn noop() -> impl Fn(&crate::intents::IntentRequest) -> Option<String> + Send + Sync {
        |_| None
    }

    #[test]
    fn test_register_valid_declaration() {
        let mut registry = IntentRegistry::new();
        registry
            .register(
                Intents::component("timer")
                    .slot("duration", || vec!["five minutes".to_string()])
                    .sentence(Sentence::new("set_timer", noop()).phrase("set a timer for ($duration)")),
            )
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.dispatch().contains("components.timer.set_timer"));
    }

    #[test]
    fn test_undefined_slot_reference() {
        let mut registry = IntentRegistry::new();
        let err = registry
            .register(
                Intents::component("timer")
                    .sentence(Sentence::new("greet", noop()).phrase("hello"))
                    .sentence(Sentence::new("set_timer", noop()).phrase("timer for ($duration)")),
            )
            .unwrap_err();

        match err {
            HomeIntentError::UndefinedSlotReference {
                sentence,
                slot,
                declaration,
            } => {
                assert_eq!(sentence, "set_timer");
                assert_eq!(slot, "duration");
                assert_eq!(declaration, "components.timer");
            }
            other => panic!("unexpected error: {other}"),
        }

        // The valid sentence of the failing declaration is not routable.
        assert!(registry.is_empty());
        assert!(registry.dispatch().is_empty());
    }

    #[test]
    fn test_slot_from_other_declaration_is_undefined() {
        let mut registry = IntentRegistry::new();
        registry
            .register(Intents::component("rooms").slot("room", Vec::new))
            .unwrap();
        let err = registry
            .register(
                Intents::component("lights")
                    .sentence(Sentence::new("on", noop()).phrase("turn on ($room)")),
            )
            .unwrap_err();
        assert!(matches!(err, HomeIntentError::UndefinedSlotReference { .. }));
    }

    #[test]
    fn test_duplicate_names_within_declaration() {
        let err = validate(
            &Intents::component("a")
                .sentence(Sentence::new("x", noop()))
                .sentence(Sentence::new("x", noop())),
        )
        .unwrap_err();
        assert!(matches!(err, HomeIntentError::DuplicateSentenceName { .. }));

        let err = validate(&Intents::component("a").slot("s", Vec::new).slot("s", Vec::new))
            .unwrap_err();
        assert!(matches!(err, HomeIntentError::DuplicateSlotName { .. }));
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut registry = IntentRegistry::new();
        registry.register(Intents::component("a")).unwrap();
        let err = registry.register(Intents::component("a")).unwrap_err();
        assert!(matches!(err, HomeIntentError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn test_colliding_qualified_names() {
        let mut registry = IntentRegistry::new();
        registry
            .register(
                Intents::new("components.a")
                    .sentence(Sentence::new("b.c", |_| Some("first".to_string())).phrase("one")),
            )
            .unwrap();

        let err = registry
            .register(
                Intents::new("components.a.b")
                    .sentence(Sentence::new("d", noop()).phrase("three"))
                    .sentence(Sentence::new("c", |_| Some("second".to_string())).phrase("two")),
            )
            .unwrap_err();

        match err {
            HomeIntentError::DuplicateIntentName { intent } => {
                assert_eq!(intent, "components.a.b.c");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing from the rejected declaration is kept, including its
        // non-colliding sentence.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.dispatch().len(), 1);
        assert!(!registry.dispatch().contains("components.a.b.d"));
    }

    #[test]
    fn test_customization_applied_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("greeter.toml"),
            "[sentences.greet]\ndisabled = false\n",
        )
        .unwrap();

        let mut registry = IntentRegistry::with_customizations(dir.path());
        registry
            .register(Intents::component("greeter").sentence(Sentence::new("greet", noop())))
            .unwrap();

        let sentence = &registry.components()[0].intents().sentences()[0];
        assert_eq!(sentence.disabled_state(), Disabled::No);
    }

    #[test]
    fn test_bad_customization_fails_registration() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("greeter.toml"), "not = [valid").unwrap();

        let mut registry = IntentRegistry::with_customizations(dir.path());
        let err = registry
            .register(Intents::component("greeter").sentence(Sentence::new("greet", noop())))
            .unwrap_err();
        assert!(matches!(err, HomeIntentError::Customization(_)));
        assert!(registry.is_empty());
    }
}
