//! In-memory workflow graph being edited.
//!
//! The canvas is the single owner of the node and edge arrays. Every mutation goes
//! through it: load, connect, drop, remove, config write-back and the demo controls.
//! Saving is split into [`Canvas::begin_save`] and [`Canvas::finish_save`] so the
//! network call can run without holding the canvas.

mod demo;
mod ids;
mod viewport;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use petgraph::{Direction, graph::DiGraph, visit::EdgeRef};
use tracing::{debug, info, trace, warn};

use crate::{
    FlowError, Result,
    common::Vars,
    model::{Connection, Edge, EdgeId, GraphLoad, Node, NodeId, NodeType, Position, StepsConfig, Workflow, WorkflowId},
    palette::DragPayload,
};

pub use demo::demo_graph;
use ids::IdGenerator;
pub use viewport::{Bounds, Viewport};

/// What the canvas is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
pub enum CanvasMode {
    #[default]
    Uninitialized,
    /// The sample graph, with Clear/Reset available.
    Demo,
    /// A graph loaded from a workflow's `steps_config`.
    Workflow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
pub enum SavePhase {
    #[default]
    Idle,
    Saving,
}

/// Snapshot handed to the persistence layer by [`Canvas::begin_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub workflow_id: WorkflowId,
    pub steps: StepsConfig,
    /// server version the graph was loaded from, if known
    pub version: Option<DateTime<Utc>>,
    revision: u64,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    mode: CanvasMode,
    workflow_id: Option<WorkflowId>,
    version: Option<DateTime<Utc>>,
    save_phase: SavePhase,
    /// bumped on every graph mutation
    revision: u64,
    saved_revision: u64,
    /// bumped on every load
    generation: u64,
    viewport: Viewport,
    ids: IdGenerator,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canvas with a workflow's graph, or the demo graph when there is none.
    pub fn load(
        &mut self,
        workflow: Option<&Workflow>,
    ) {
        self.generation += 1;
        self.workflow_id = workflow.map(|w| w.id);
        self.version = workflow.and_then(|w| w.updated_at);

        let Some(workflow) = workflow else {
            debug!("canvas::load(none): showing demo graph");
            self.replace(demo_graph(), CanvasMode::Demo);
            return;
        };

        match workflow.graph() {
            GraphLoad::Graph(steps) => {
                info!("canvas::load({}): {} nodes, {} edges", workflow.id, steps.nodes.len(), steps.edges.len());
                for node in steps.nodes.iter().filter(|n| !n.node_type.is_registered()) {
                    warn!("node {} has unregistered type '{}' and will not render", node.id, node.node_type);
                }
                self.replace(steps, CanvasMode::Workflow);
            }
            GraphLoad::Absent => {
                debug!("canvas::load({}): workflow has no graph yet, showing demo graph", workflow.id);
                self.replace(demo_graph(), CanvasMode::Demo);
            }
            GraphLoad::Malformed(reason) => {
                warn!("canvas::load({}): malformed steps_config ({}), showing demo graph", workflow.id, reason);
                self.replace(demo_graph(), CanvasMode::Demo);
            }
        }
    }

    fn replace(
        &mut self,
        steps: StepsConfig,
        mode: CanvasMode,
    ) {
        self.nodes = steps.nodes;
        self.edges = steps.edges;
        self.mode = mode;
        self.revision += 1;
        self.saved_revision = self.revision;
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Append an edge for a user-drawn connection. No compatibility checks are made.
    pub fn connect(
        &mut self,
        connection: Connection,
    ) -> EdgeId {
        let mut edge = Edge::new(self.ids.edge_id(), connection.source, connection.target);
        edge.source_handle = connection.source_handle;
        edge.target_handle = connection.target_handle;
        trace!("canvas::connect({} -> {})", edge.source, edge.target);

        let id = edge.id.clone();
        self.edges.push(edge);
        self.touch();
        id
    }

    /// Handle a drop carrying a raw palette payload. Bad payloads are ignored.
    pub fn drop_payload(
        &mut self,
        raw: &str,
        screen: Position,
        bounds: Bounds,
    ) -> Option<NodeId> {
        let payload = DragPayload::parse(raw)?;
        Some(self.drop_node(payload.node_type, payload.data, screen, bounds))
    }

    /// Create a node at the canvas position under `screen`.
    pub fn drop_node(
        &mut self,
        node_type: NodeType,
        data: Vars,
        screen: Position,
        bounds: Bounds,
    ) -> NodeId {
        let position = self.viewport.screen_to_canvas(screen, bounds);
        let taken: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let id = self.ids.node_id(&node_type, |id| taken.contains(id));
        trace!("canvas::drop({}) at ({}, {})", id, position.x, position.y);

        self.nodes.push(Node::new(id.clone(), node_type, position, data));
        self.touch();
        id
    }

    /// Remove a node and every edge attached to it.
    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> Result<Node> {
        let idx = self.node_index(id)?;
        let node = self.nodes.remove(idx);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        debug!("canvas::remove_node({}): dropped {} edges", id, before - self.edges.len());
        self.touch();
        Ok(node)
    }

    pub fn remove_edge(
        &mut self,
        id: &str,
    ) -> Result<Edge> {
        let idx = self.edges.iter().position(|e| e.id == id).ok_or(FlowError::Edge(format!("edge {} not found", id)))?;
        let edge = self.edges.remove(idx);
        self.touch();
        Ok(edge)
    }

    pub fn move_node(
        &mut self,
        id: &str,
        position: Position,
    ) -> Result<()> {
        let idx = self.node_index(id)?;
        self.nodes[idx].position = position;
        self.touch();
        Ok(())
    }

    /// Merge a configuration patch into one node's `data`, leaving other nodes as they are.
    pub fn apply_node_config(
        &mut self,
        id: &str,
        patch: &Vars,
    ) -> Result<()> {
        self.node_index(id)?;
        self.nodes = self
            .nodes
            .iter()
            .map(|n| {
                if n.id != id {
                    return n.clone();
                }
                let mut node = n.clone();
                node.data.merge(patch);
                node
            })
            .collect();
        debug!("canvas::apply_node_config({}): {} keys", id, patch.len());
        self.touch();
        Ok(())
    }

    /// Empty the demo graph.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_demo("clear")?;
        self.nodes.clear();
        self.edges.clear();
        self.touch();
        Ok(())
    }

    /// Restore the demo graph.
    pub fn reset_demo(&mut self) -> Result<()> {
        self.ensure_demo("reset")?;
        let demo = demo_graph();
        self.nodes = demo.nodes;
        self.edges = demo.edges;
        self.touch();
        Ok(())
    }

    fn ensure_demo(
        &self,
        op: &str,
    ) -> Result<()> {
        if self.mode != CanvasMode::Demo {
            return Err(FlowError::Canvas(format!("{} is only available for the demo graph", op)));
        }
        Ok(())
    }

    /// Enter the saving phase and snapshot the live graph.
    pub fn begin_save(&mut self) -> Result<SaveTicket> {
        if self.save_phase == SavePhase::Saving {
            return Err(FlowError::SaveInProgress);
        }
        let workflow_id = self.workflow_id.ok_or(FlowError::NoWorkflowSelected)?;

        self.save_phase = SavePhase::Saving;
        Ok(SaveTicket {
            workflow_id,
            steps: self.steps(),
            version: self.version,
            revision: self.revision,
            generation: self.generation,
        })
    }

    /// Leave the saving phase. `saved` is the server's copy after a successful save.
    pub fn finish_save(
        &mut self,
        ticket: &SaveTicket,
        saved: Option<&Workflow>,
    ) {
        self.save_phase = SavePhase::Idle;

        let Some(saved) = saved else {
            return;
        };
        // a different workflow was loaded while the request was in flight
        if ticket.generation != self.generation {
            return;
        }
        self.version = saved.updated_at;
        self.saved_revision = self.saved_revision.max(ticket.revision);
    }

    fn node_index(
        &self,
        id: &str,
    ) -> Result<usize> {
        self.nodes.iter().position(|n| n.id == id).ok_or(FlowError::Node(format!("node {} not found", id)))
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn steps(&self) -> StepsConfig {
        StepsConfig::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    pub fn workflow_id(&self) -> Option<WorkflowId> {
        self.workflow_id
    }

    pub fn save_phase(&self) -> SavePhase {
        self.save_phase
    }

    pub fn is_saving(&self) -> bool {
        self.save_phase == SavePhase::Saving
    }

    /// True when the graph changed since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn shows_demo_controls(&self) -> bool {
        self.mode == CanvasMode::Demo
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Edges whose source or target node is not on the canvas.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges.iter().filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str())).collect()
    }

    /// Output a human-readable representation of the canvas graph
    pub fn outline(&self) -> String {
        let mut graph: DiGraph<&Node, &Edge> = DiGraph::new();
        let mut index = HashMap::new();
        for node in self.nodes.iter() {
            index.insert(node.id.as_str(), graph.add_node(node));
        }
        for edge in self.edges.iter() {
            if let (Some(s), Some(t)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                graph.add_edge(*s, *t, edge);
            }
        }

        let mut lines = Vec::new();
        lines.push(format!("=== Canvas ({}) ===", self.mode.as_ref()));
        lines.push(format!("Nodes: {}, Edges: {}", self.nodes.len(), self.edges.len()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for idx in graph.node_indices() {
            let node = graph[idx];
            lines.push(format!("[{}] {} (type: {})", node.id, node.label().unwrap_or("-"), node.node_type));
        }
        lines.push(String::new());

        lines.push("--- Graph Structure ---".to_string());
        for idx in graph.node_indices() {
            let outgoing: Vec<String> = graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| {
                    let target = &graph[e.target()].id;
                    match &e.weight().source_handle {
                        Some(handle) => format!("{}({})", target, handle.as_str()),
                        None => target.clone(),
                    }
                })
                .collect();
            let id = &graph[idx].id;
            if outgoing.is_empty() {
                lines.push(format!("{} -> (end)", id));
            } else {
                lines.push(format!("{} -> {}", id, outgoing.join(", ")));
            }
        }

        let dangling = self.dangling_edges();
        if !dangling.is_empty() {
            lines.push(String::new());
            lines.push("--- Dangling Edges ---".to_string());
            for edge in dangling {
                lines.push(format!("{}: {} -> {}", edge.id, edge.source, edge.target));
            }
        }

        lines.join("\n")
    }
}
