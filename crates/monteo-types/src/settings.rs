//! Runtime engine settings: policy flags and automation rule overrides.
//!
//! Loaded from the settings repository at evaluation time and passed into
//! the automation engine and state machine as an explicit value, never read
//! as ambient global state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::process::RuleId;

/// Key of the installer-required policy flag.
pub const REQUIRE_INSTALLER_FOR_MEASUREMENT: &str = "require_installer_for_measurement";

/// Snapshot of process-wide configuration read at call time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Converting out of `lead` requires an assigned installer.
    #[serde(default)]
    pub require_installer_for_measurement: bool,
    /// Rule enablement overrides by rule key; absent rules are enabled.
    #[serde(default)]
    pub rule_overrides: HashMap<String, bool>,
}

impl EngineSettings {
    /// Whether the given rule may fire. Rules default to enabled; disabling
    /// a rule stops future firings but never undoes an applied status.
    pub fn rule_enabled(&self, rule: &RuleId) -> bool {
        self.rule_overrides.get(&rule.key()).copied().unwrap_or(true)
    }

    pub fn with_rule(mut self, rule: &RuleId, enabled: bool) -> Self {
        self.rule_overrides.insert(rule.key(), enabled);
        self
    }
}
