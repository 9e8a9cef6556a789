//! Dispatch table: fully-qualified sentence name -> bound handler.
//!
//! Filled while components register, then frozen behind an `Arc` when the
//! engine initializes. Nothing mutates it afterwards, so lookups from any
//! number of listener threads need no locking.

use std::collections::HashMap;
use std::fmt;

use crate::intents::{Handler, IntentRequest};

/// Result of routing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran; its response text, if any
    Handled(Option<String>),
    /// No handler is registered under the request's intent name
    Unknown,
}

#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<String, Handler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handler; returns `false` if the name was already taken
    pub(crate) fn insert(&mut self, intent: String, handler: Handler) -> bool {
        if self.handlers.contains_key(&intent) {
            return false;
        }
        self.handlers.insert(intent, handler);
        true
    }

    pub fn get(&self, intent: &str) -> Option<&Handler> {
        self.handlers.get(intent)
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.handlers.contains_key(intent)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered intent names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke the handler bound to `request.intent`
    pub fn dispatch(&self, request: &IntentRequest) -> DispatchOutcome {
        match self.handlers.get(&request.intent) {
            Some(handler) => DispatchOutcome::Handled(handler(request)),
            None => DispatchOutcome::Unknown,
        }
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("intents", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_insert_and_dispatch() {
        let mut table = DispatchTable::new();
        assert!(table.insert(
            "components.a.greet".to_string(),
            Arc::new(|_: &IntentRequest| Some("hi".to_string()))
        ));
        assert!(!table.insert(
            "components.a.greet".to_string(),
            Arc::new(|_: &IntentRequest| None)
        ));

        assert_eq!(table.len(), 1);
        assert!(table.contains("components.a.greet"));
        assert_eq!(
            table.dispatch(&IntentRequest::new("components.a.greet")),
            DispatchOutcome::Handled(Some("hi".to_string()))
        );
        assert_eq!(
            table.dispatch(&IntentRequest::new("components.a.missing")),
            DispatchOutcome::Unknown
        );
    }

    #[test]
    fn test_concurrent_lookups() {
        let mut table = DispatchTable::new();
        table.insert(
            "components.echo.say".to_string(),
            Arc::new(|req: &IntentRequest| req.slot("text").map(str::to_string)),
        );
        let table = Arc::new(table);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    let request =
                        IntentRequest::new("components.echo.say").with_slot("text", i.to_string());
                    table.dispatch(&request)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(
                handle.join().unwrap(),
                DispatchOutcome::Handled(Some(i.to_string()))
            );
        }
    }
}
