use uuid::Uuid;

use crate::model::{EdgeId, NodeId, NodeType};

/// Per-session id source.
///
/// Node ids are `"<type>-<n>"` with a monotonic counter; ids already present on the
/// canvas are skipped so loaded graphs never collide with new drops.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_id<F>(
        &mut self,
        node_type: &NodeType,
        taken: F,
    ) -> NodeId
    where
        F: Fn(&str) -> bool,
    {
        loop {
            self.counter += 1;
            let id = format!("{}-{}", node_type.as_str(), self.counter);
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn edge_id(&self) -> EdgeId {
        format!("edge-{}", Uuid::new_v4())
    }
}
