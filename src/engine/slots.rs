//! Global slot table.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use super::registry::RegisteredComponent;
use crate::error::{HomeIntentError, Result};

/// Every slot's current values, in registration then declaration order.
/// Serializes as the JSON object `/api/slots` expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GlobalSlotTable(IndexMap<String, Vec<String>>);

impl GlobalSlotTable {
    pub fn get(&self, slot: &str) -> Option<&[String]> {
        self.0.get(slot).map(Vec::as_slice)
    }

    /// True when the slot exists and currently has at least one value
    pub fn has_values(&self, slot: &str) -> bool {
        self.0.get(slot).is_some_and(|values| !values.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Evaluate every slot provider, in registration order, into one table.
///
/// A slot name defined by two declarations fails with `DuplicateSlotName`
/// naming the one registered later.
pub fn aggregate_slots(components: &[RegisteredComponent]) -> Result<GlobalSlotTable> {
    let mut table = IndexMap::new();

    for component in components {
        info!(declaration = component.name(), "getting slots");
        for slot in component.intents().slots() {
            if table.contains_key(slot.name()) {
                return Err(HomeIntentError::DuplicateSlotName {
                    slot: slot.name().to_string(),
                    declaration: component.name().to_string(),
                });
            }

            info!(slot = slot.name(), "getting slot values");
            table.insert(slot.name().to_string(), slot.values());
        }
    }

    Ok(GlobalSlotTable(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::registry::IntentRegistry;
    use crate::intents::Intents;

    fn registry(declarations: Vec<Intents>) -> IntentRegistry {
        let mut registry = IntentRegistry::new();
        for intents in declarations {
            registry.register(intents).unwrap();
        }
        registry
    }

    #[test]
    fn test_aggregate_in_registration_order() {
        let registry = registry(vec![
            Intents::component("b").slot("color", || vec!["red".to_string()]),
            Intents::component("a")
                .slot("room", || vec!["kitchen".to_string(), "office".to_string()])
                .slot("device", Vec::new),
        ]);

        let table = aggregate_slots(registry.components()).unwrap();
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["color", "room", "device"]);
        assert_eq!(table.get("room").unwrap(), ["kitchen", "office"]);
        assert!(table.has_values("room"));
        assert!(!table.has_values("device"));
        assert!(!table.has_values("missing"));
    }

    #[test]
    fn test_duplicate_slot_blames_later_declaration() {
        let registry = registry(vec![
            Intents::component("first").slot("room", Vec::new),
            Intents::component("second").slot("room", Vec::new),
        ]);

        let err = aggregate_slots(registry.components()).unwrap_err();
        match err {
            HomeIntentError::DuplicateSlotName { slot, declaration } => {
                assert_eq!(slot, "room");
                assert_eq!(declaration, "components.second");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serializes_as_object() {
        let registry = registry(vec![Intents::component("a")
            .slot("zone", || vec!["upstairs".to_string()])
            .slot("area", || vec!["garden".to_string()])]);
        let table = aggregate_slots(registry.components()).unwrap();
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"zone":["upstairs"],"area":["garden"]}"#
        );
    }
}
