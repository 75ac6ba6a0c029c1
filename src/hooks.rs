//! Named callback registry
//!
//! Collaborators register interest in a named event; the owner runs every
//! callback for that name synchronously, in registration order. No payload
//! is passed and the owner is mutably borrowed while callbacks run, so a
//! listener only records that the event happened (a flag or counter it
//! shares) and reads the new state once control returns to it.

use std::collections::HashMap;
use std::fmt;
use tracing::debug;

type Callback = Box<dyn FnMut()>;

#[derive(Default)]
pub struct Hooks {
    callbacks: HashMap<String, Vec<Callback>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .callbacks
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("Hooks").field("callbacks", &counts).finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`
    pub fn add<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.callbacks.entry(name.into()).or_default().push(Box::new(callback));
    }

    /// Run every callback registered under `name`, returns how many ran
    pub fn run(&mut self, name: &str) -> usize {
        let Some(list) = self.callbacks.get_mut(name) else {
            debug!(hook = name, "No listeners for hook");
            return 0;
        };
        for callback in list.iter_mut() {
            callback();
        }
        debug!(hook = name, listeners = list.len(), "Ran hook");
        list.len()
    }

    /// Drop all callbacks registered under `name`
    pub fn remove_all(&mut self, name: &str) {
        self.callbacks.remove(name);
    }

    pub fn len(&self, name: &str) -> usize {
        self.callbacks.get(name).map_or(0, Vec::len)
    }
}
