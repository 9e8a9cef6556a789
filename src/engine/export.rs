//! Grammar export: the `sentences.ini` document taught to Rhasspy.

use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, info};

use super::policy::EnablementPolicy;
use super::registry::RegisteredComponent;
use super::slots::GlobalSlotTable;

/// One `[name]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSection {
    pub key: String,
    pub phrases: Vec<String>,
}

/// Ordered grammar snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    sections: Vec<GrammarSection>,
}

impl Grammar {
    /// Document name the sentences are posted under
    pub const DOCUMENT_NAME: &'static str = "sentences.ini";

    pub fn sections(&self) -> &[GrammarSection] {
        &self.sections
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sections.iter().any(|s| s.key == key)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render as `sentences.ini` text
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| format!("[{}]\n{}", section.key, section.phrases.join("\n")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `{"sentences.ini": <text>}` body for `/api/sentences`
    pub fn document(sentences_ini: &str) -> Value {
        let mut document = Map::new();
        document.insert(
            Self::DOCUMENT_NAME.to_string(),
            Value::String(sentences_ini.to_string()),
        );
        Value::Object(document)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build the grammar from every registered sentence that is active under
/// `policy` and whose slots all currently have values.
pub fn export_sentences(
    components: &[RegisteredComponent],
    slots: &GlobalSlotTable,
    policy: &EnablementPolicy,
) -> Grammar {
    let mut sections = Vec::new();

    for component in components {
        info!(declaration = component.name(), "getting sentences");
        let intents = component.intents();

        for sentence in intents.sentences() {
            if !policy.is_active(sentence) {
                debug!(sentence = sentence.name(), "inactive, not exported");
                continue;
            }
            // Rhasspy keeps slots no sentence uses; it just won't learn them.
            if let Some(empty) = sentence.slots().iter().find(|s| !slots.has_values(s)) {
                debug!(sentence = sentence.name(), slot = %empty, "slot has no values, not exported");
                continue;
            }

            sections.push(GrammarSection {
                key: intents.qualified_name(sentence),
                phrases: sentence.phrase_templates().to_vec(),
            });
        }
    }

    Grammar { sections }
}
