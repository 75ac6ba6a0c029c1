//! Active profile lookup
//!
//! The host application owns the notion of a signed-in profile. The store
//! only needs its name to namespace the `<profile>_last` key, and asks for
//! it on every access so a profile switch is picked up without reloading.

use crate::constants::keys::LAST_SUFFIX;

/// Supplies the name of the active host profile
pub trait ProfileSource {
    fn profile_name(&self) -> String;
}

/// Profile that never changes (CLI, tests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedProfile(pub String);

impl FixedProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ProfileSource for FixedProfile {
    fn profile_name(&self) -> String {
        self.0.clone()
    }
}

/// Document key remembering the last card model used by `profile`
pub fn last_model_key(profile: &str) -> String {
    format!("{profile}{LAST_SUFFIX}")
}
