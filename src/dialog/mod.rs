//! Per-node configuration dialogs.
//!
//! A dialog holds a draft seeded from one node's `data`. Saving merges the draft back
//! into that node through the canvas; cancelling drops the draft.

mod ai_generate_content;
mod ai_score_lead;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    FlowError, Result,
    canvas::Canvas,
    common::Vars,
    model::{NodeId, NodeKind},
};

pub use ai_generate_content::AiGenerateContentConfig;
pub use ai_score_lead::AiScoreLeadConfig;

/// Reads configuration keys one at a time from node data.
///
/// A key that is missing or null takes its default. A key that is present but cannot be
/// read also takes its default and is recorded as unreadable, so it is never written back
/// unless the user changes it.
pub struct Seed<'a> {
    data: &'a Vars,
    unreadable: Vec<String>,
}

impl<'a> Seed<'a> {
    pub fn new(data: &'a Vars) -> Self {
        Self {
            data,
            unreadable: Vec::new(),
        }
    }

    pub fn field<T: DeserializeOwned>(
        &mut self,
        key: &str,
        default: T,
    ) -> T {
        match self.data.get(key) {
            None | Some(Value::Null) => default,
            Some(value) => serde_json::from_value::<T>(value.clone()).unwrap_or_else(|e| {
                warn!("unreadable config key '{}', using default: {}", key, e);
                self.unreadable.push(key.to_string());
                default
            }),
        }
    }

    pub fn unreadable(&self) -> &[String] {
        &self.unreadable
    }
}

/// Typed view of the configuration keys of one node kind.
pub trait NodeConfig: Serialize + Clone {
    /// The node kind this configuration edits.
    const NODE_KIND: NodeKind;

    /// Build a draft, reading every key through `seed`.
    fn seed(seed: &mut Seed<'_>) -> Self;

    fn from_data(data: &Vars) -> Self {
        Self::seed(&mut Seed::new(data))
    }

    /// Keys to merge into the node's `data`.
    fn to_patch(&self) -> Result<Vars> {
        Ok(Vars::from(serde_json::to_value(self)?))
    }
}

/// An open configuration dialog for a single node.
#[derive(Debug, Clone)]
pub struct ConfigDialog<T: NodeConfig> {
    node_id: NodeId,
    draft: T,
    /// patch of the draft as first seeded
    seeded: Vars,
    /// keys present on the node that could not be read
    unreadable: Vec<String>,
}

impl<T: NodeConfig> ConfigDialog<T> {
    /// Open the dialog for `node_id`, seeding the draft from the node's current data.
    pub fn open(
        canvas: &Canvas,
        node_id: &str,
    ) -> Result<Self> {
        let node = canvas.node(node_id).ok_or(FlowError::Node(format!("node {} not found", node_id)))?;
        if node.node_type.kind() != Some(T::NODE_KIND) {
            return Err(FlowError::Node(format!(
                "node {} is '{}', expected '{}'",
                node_id,
                node.node_type,
                T::NODE_KIND.as_ref()
            )));
        }
        let mut seed = Seed::new(&node.data);
        let draft = T::seed(&mut seed);
        let unreadable = seed.unreadable().to_vec();
        Ok(Self {
            node_id: node.id.clone(),
            seeded: draft.to_patch()?,
            draft,
            unreadable,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    /// Keys of the node's data that could not be read into the draft.
    pub fn unreadable(&self) -> &[String] {
        &self.unreadable
    }

    /// Apply the draft through `apply(node_id, patch)` and close.
    pub fn save_with<F>(
        self,
        apply: F,
    ) -> Result<()>
    where
        F: FnOnce(&str, &Vars) -> Result<()>,
    {
        let mut patch = self.draft.to_patch()?;
        // untouched unreadable keys keep the node's original value
        for key in self.unreadable.iter() {
            if patch.get(key) == self.seeded.get(key) {
                patch.remove(key);
            }
        }
        debug!("dialog::save({})", self.node_id);
        apply(&self.node_id, &patch)
    }

    /// Merge the draft into the node on `canvas` and close.
    pub fn save(
        self,
        canvas: &mut Canvas,
    ) -> Result<()> {
        self.save_with(|id, patch| canvas.apply_node_config(id, patch))
    }

    /// Close without touching the node.
    pub fn cancel(self) {
        debug!("dialog::cancel({})", self.node_id);
    }
}
