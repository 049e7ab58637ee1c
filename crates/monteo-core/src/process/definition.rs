//! Static stage graph: lead through invoicing, with per-stage actors,
//! checkpoints and satellite automations.

use std::sync::LazyLock;

use monteo_types::process::{Actor, Automation, Checkpoint, Stage, StageId};

static PROCESS: LazyLock<ProcessDefinition> = LazyLock::new(|| ProcessDefinition {
    stages: build_stages(),
});

/// The fixed, ordered lifecycle graph. Read-only; obtain the shared
/// instance via [`ProcessDefinition::get`].
#[derive(Debug)]
pub struct ProcessDefinition {
    stages: Vec<Stage>,
}

impl ProcessDefinition {
    pub fn get() -> &'static ProcessDefinition {
        &PROCESS
    }

    /// All stages in lifecycle order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, id: StageId) -> &Stage {
        &self.stages[id.position()]
    }

    /// The stage after `id`, `None` at the end of the chain.
    pub fn next_stage(&self, id: StageId) -> Option<StageId> {
        StageId::ALL.get(id.position() + 1).copied()
    }

    /// The stage before `id`, `None` at the start of the chain.
    pub fn previous_stage(&self, id: StageId) -> Option<StageId> {
        id.position().checked_sub(1).map(|p| StageId::ALL[p])
    }

    /// Whether `current` is strictly past `of` in lifecycle order.
    pub fn is_ahead(&self, current: StageId, of: StageId) -> bool {
        current.position() > of.position()
    }

    /// All satellite automations across stages, in stage order.
    pub fn automations(&self) -> impl Iterator<Item = (&Stage, &Automation)> {
        self.stages
            .iter()
            .flat_map(|s| s.automations.iter().map(move |a| (s, a)))
    }
}

fn build_stages() -> Vec<Stage> {
    vec![
        Stage {
            id: StageId::Lead,
            label: "Lead",
            actor: Actor::Office,
            checkpoints: vec![
                Checkpoint {
                    key: "contact_established",
                    label: "Contact established",
                },
                Checkpoint {
                    key: "measurement_scheduled",
                    label: "Measurement date agreed",
                },
            ],
            automations: vec![Automation {
                id: "lead_confirmation_sms",
                label: "Lead confirmation SMS",
                description: "Text the client that the enquiry was received",
                default_enabled: true,
            }],
            gate_to_next_stage: true,
        },
        Stage {
            id: StageId::BeforeMeasurement,
            label: "Measurement",
            actor: Actor::Installer,
            checkpoints: vec![
                Checkpoint {
                    key: "site_measured",
                    label: "Site measured",
                },
                Checkpoint {
                    key: "materials_specified",
                    label: "Materials specified",
                },
            ],
            automations: vec![Automation {
                id: "measurement_reminder_sms",
                label: "Measurement reminder SMS",
                description: "Text the client the day before the measurement visit",
                default_enabled: true,
            }],
            gate_to_next_stage: true,
        },
        Stage {
            id: StageId::BeforeFirstPayment,
            label: "First payment",
            actor: Actor::Client,
            checkpoints: vec![
                Checkpoint {
                    key: "offer_sent",
                    label: "Offer sent",
                },
                Checkpoint {
                    key: "deposit_received",
                    label: "Deposit received",
                },
            ],
            automations: vec![
                Automation {
                    id: "payment_request_email",
                    label: "Payment request e-mail",
                    description: "Mail the deposit invoice on stage entry",
                    default_enabled: true,
                },
                Automation {
                    id: "payment_reminder_email",
                    label: "Payment reminder e-mail",
                    description: "Mail a reminder when the deposit is overdue",
                    default_enabled: true,
                },
            ],
            gate_to_next_stage: true,
        },
        Stage {
            id: StageId::BeforeInstallation,
            label: "Installation",
            actor: Actor::Installer,
            checkpoints: vec![
                Checkpoint {
                    key: "materials_ordered",
                    label: "Materials ordered",
                },
                Checkpoint {
                    key: "installation_scheduled",
                    label: "Installation date scheduled",
                },
                Checkpoint {
                    key: "protocol_signed",
                    label: "Protocol signed",
                },
            ],
            automations: vec![Automation {
                id: "installation_calendar_entry",
                label: "Installation calendar entry",
                description: "Create a calendar entry for the installer team",
                default_enabled: true,
            }],
            gate_to_next_stage: true,
        },
        Stage {
            id: StageId::BeforeInvoicing,
            label: "Invoicing",
            actor: Actor::Office,
            checkpoints: vec![
                Checkpoint {
                    key: "invoice_issued",
                    label: "Invoice issued",
                },
                Checkpoint {
                    key: "invoice_paid",
                    label: "Invoice paid",
                },
            ],
            automations: vec![Automation {
                id: "invoice_email",
                label: "Invoice e-mail",
                description: "Mail the final invoice once the protocol is signed",
                default_enabled: true,
            }],
            gate_to_next_stage: false,
        },
    ]
}
