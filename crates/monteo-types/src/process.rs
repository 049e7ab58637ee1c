//! Process graph types: stages, checkpoints, satellite automations.
//!
//! The process graph itself is compiled in (see `monteo-core::process`);
//! these types describe its shape. Stages are totally ordered -- the order
//! is the sequence of lifecycle progression and determines what "ahead" and
//! "behind" mean for the automation engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of one node in the fixed lifecycle graph.
///
/// The variant order is the lifecycle order. Terminal states (`completed`,
/// `cancelled`) are not stages; see [`crate::job::JobStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Lead,
    BeforeMeasurement,
    BeforeFirstPayment,
    BeforeInstallation,
    BeforeInvoicing,
}

impl StageId {
    /// All stages in lifecycle order.
    pub const ALL: [StageId; 5] = [
        StageId::Lead,
        StageId::BeforeMeasurement,
        StageId::BeforeFirstPayment,
        StageId::BeforeInstallation,
        StageId::BeforeInvoicing,
    ];

    /// The stable string id used on the wire and in storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StageId::Lead => "lead",
            StageId::BeforeMeasurement => "before_measurement",
            StageId::BeforeFirstPayment => "before_first_payment",
            StageId::BeforeInstallation => "before_installation",
            StageId::BeforeInvoicing => "before_invoicing",
        }
    }

    /// Zero-based position in the lifecycle order.
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(StageId::Lead),
            "before_measurement" => Ok(StageId::BeforeMeasurement),
            "before_first_payment" => Ok(StageId::BeforeFirstPayment),
            "before_installation" => Ok(StageId::BeforeInstallation),
            "before_invoicing" => Ok(StageId::BeforeInvoicing),
            other => Err(format!("unknown stage id: '{other}'")),
        }
    }
}

/// Who acts during a stage (or who a checklist item is assigned to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Client,
    Office,
    Installer,
    System,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Client => write!(f, "client"),
            Actor::Office => write!(f, "office"),
            Actor::Installer => write!(f, "installer"),
            Actor::System => write!(f, "system"),
        }
    }
}

impl FromStr for Actor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Actor::Client),
            "office" => Ok(Actor::Office),
            "installer" => Ok(Actor::Installer),
            "system" => Ok(Actor::System),
            other => Err(format!("unknown actor: '{other}'")),
        }
    }
}

/// A named condition within a stage, satisfied when a linked checklist item
/// is completed for the job.
///
/// Definition types are compiled in and only ever serialized (for the API);
/// they are never read back, hence no `Deserialize`.
#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    /// Stable key linked from checklist templates (e.g. "protocol_signed").
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// A side-effecting rule attached to a stage (SMS, e-mail, calendar entry).
///
/// Informational to the engine: Monteo persists and exposes the enablement
/// state, the actual delivery lives behind the notification dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct Automation {
    /// Stable rule id (e.g. "measurement_reminder_sms").
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// Enabled unless overridden in settings.
    pub default_enabled: bool,
}

/// One node of the fixed process graph.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub id: StageId,
    pub label: &'static str,
    /// Who drives this stage forward.
    pub actor: Actor,
    /// Ordered conditions within the stage.
    pub checkpoints: Vec<Checkpoint>,
    /// Satellite automations attached to the stage.
    pub automations: Vec<Automation>,
    /// Whether completing all checklist items offers auto-advance.
    pub gate_to_next_stage: bool,
}

/// Identifier of an automation rule whose enablement the platform persists.
///
/// Either a stage automation's own id, or the synthesized auto-advance rule
/// for a stage (`auto_advance_<stage_id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleId {
    Automation(String),
    AutoAdvance(StageId),
}

impl RuleId {
    /// The persisted key form of the rule id.
    pub fn key(&self) -> String {
        match self {
            RuleId::Automation(id) => id.clone(),
            RuleId::AutoAdvance(stage) => format!("auto_advance_{}", stage.as_str()),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(stage) = s.strip_prefix("auto_advance_") {
            return Ok(RuleId::AutoAdvance(stage.parse()?));
        }
        if s.is_empty() {
            return Err("empty rule id".to_string());
        }
        Ok(RuleId::Automation(s.to_string()))
    }
}
