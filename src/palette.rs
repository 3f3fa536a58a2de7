//! Static catalog of draggable node templates.
//!
//! The palette is read-only configuration. Dragging a template serialises a
//! [`DragPayload`] that the canvas consumes on drop.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    common::Vars,
    model::{NodeKind, NodeType},
};

/// One draggable entry of the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteTemplate {
    pub node_type: NodeKind,
    pub label: &'static str,
    /// value stored under the kind's config key (`triggerType`, `actionType`, ...)
    pub config_value: &'static str,
}

/// A named group of templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteCategory {
    pub name: &'static str,
    pub templates: &'static [PaletteTemplate],
}

const fn template(
    node_type: NodeKind,
    label: &'static str,
    config_value: &'static str,
) -> PaletteTemplate {
    PaletteTemplate {
        node_type,
        label,
        config_value,
    }
}

const TRIGGERS: &[PaletteTemplate] = &[
    template(NodeKind::Trigger, "Form Submission", "form_submission"),
    template(NodeKind::Trigger, "Email Opened", "email_opened"),
    template(NodeKind::Trigger, "Page Visit", "page_visit"),
    template(NodeKind::Trigger, "Tag Added", "tag_added"),
];

const ACTIONS: &[PaletteTemplate] = &[
    template(NodeKind::Action, "Send Email", "send_email"),
    template(NodeKind::Action, "Send SMS", "send_sms"),
    template(NodeKind::Action, "Update Contact", "update_contact"),
    template(NodeKind::Action, "Add Tag", "add_tag"),
];

const DELAYS: &[PaletteTemplate] = &[
    template(NodeKind::Action, "Wait Hours", "wait_hours"),
    template(NodeKind::Action, "Wait Days", "wait_days"),
    template(NodeKind::Action, "Wait Until Date", "wait_until"),
];

const CONDITIONS: &[PaletteTemplate] = &[
    template(NodeKind::Condition, "If / Else", "if_else"),
    template(NodeKind::Condition, "Lead Score Check", "lead_score"),
    template(NodeKind::Condition, "Email Engagement", "email_engagement"),
];

const AI_ACTIONS: &[PaletteTemplate] = &[
    template(NodeKind::AiGenerateContent, "AI Generate Content", "generate_content"),
    template(NodeKind::AiScoreLead, "AI Score Lead", "score_lead"),
    template(NodeKind::AiAction, "AI Personalize", "personalize"),
];

const CATEGORIES: &[PaletteCategory] = &[
    PaletteCategory {
        name: "Triggers",
        templates: TRIGGERS,
    },
    PaletteCategory {
        name: "Actions",
        templates: ACTIONS,
    },
    PaletteCategory {
        name: "Delays",
        templates: DELAYS,
    },
    PaletteCategory {
        name: "Conditions",
        templates: CONDITIONS,
    },
    PaletteCategory {
        name: "AI Actions",
        templates: AI_ACTIONS,
    },
];

impl PaletteCategory {
    /// All palette categories in display order.
    pub fn all() -> &'static [PaletteCategory] {
        CATEGORIES
    }

    pub fn by_name(name: &str) -> Option<&'static PaletteCategory> {
        CATEGORIES.iter().find(|c| c.name == name)
    }
}

impl PaletteTemplate {
    /// Look a template up by node type and config value.
    pub fn find(
        node_type: NodeKind,
        config_value: &str,
    ) -> Option<&'static PaletteTemplate> {
        CATEGORIES.iter().flat_map(|c| c.templates.iter()).find(|t| t.node_type == node_type && t.config_value == config_value)
    }

    pub fn config_key(&self) -> &'static str {
        self.node_type.config_key()
    }

    /// Initial `data` of a node created from this template.
    pub fn seed_data(&self) -> Vars {
        Vars::new().with("label", self.label).with(self.config_key(), self.config_value)
    }

    pub fn payload(&self) -> DragPayload {
        DragPayload {
            node_type: self.node_type.into(),
            data: self.seed_data(),
        }
    }

    /// Transfer payload set on drag start.
    pub fn drag_payload(&self) -> String {
        self.payload().encode()
    }
}

/// `{type, data}` carried from the palette to the canvas by drag-and-drop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DragPayload {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub data: Vars,
}

impl DragPayload {
    pub fn encode(&self) -> String {
        serde_json::json!({
            "type": self.node_type.as_str(),
            "data": self.data,
        })
        .to_string()
    }

    /// Parse a transfer payload. Missing, unparseable or unregistered payloads yield `None`.
    pub fn parse(raw: &str) -> Option<DragPayload> {
        if raw.trim().is_empty() {
            debug!("drop ignored: empty payload");
            return None;
        }
        match serde_json::from_str::<DragPayload>(raw) {
            Ok(payload) if payload.node_type.is_registered() => Some(payload),
            Ok(payload) => {
                debug!("drop ignored: unregistered node type '{}'", payload.node_type);
                None
            }
            Err(e) => {
                debug!("drop ignored: {}", e);
                None
            }
        }
    }
}
