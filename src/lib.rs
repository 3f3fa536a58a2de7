//! # Flowcanvas
//!
//! Flowcanvas is the graph state core of the DigiSol.AI automation workflow editor.
//! It owns the in-memory node/edge graph being edited, the static node palette,
//! per-node configuration dialogs, and the REST client for the backend workflow resource.
//!
//! ## Core Features
//!
//! - **Canvas State**: load, connect, drag-and-drop placement, clear/reset of a demo graph
//! - **Explicit Saves**: full-document save of `steps_config` with a single outstanding save per canvas
//! - **Config Write-back**: node configuration dialogs merge their draft into the owning node
//! - **Execution Polling**: last-request-wins polling of workflow executions with cancellation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use flowcanvas::{Config, HttpWorkflowApi, WorkflowEditor};
//!
//! let config = Config::create("flowcanvas.toml")?;
//! let api = Arc::new(HttpWorkflowApi::new(&config.api)?);
//! let editor = WorkflowEditor::new(api, &config.editor);
//!
//! let workflows = editor.refresh_workflows().await?;
//! editor.select(workflows.into_iter().next());
//! editor.save().await?;
//! ```

mod canvas;
mod client;
mod common;
mod config;
mod dialog;
mod editor;
mod error;
mod model;
mod palette;

use std::sync::{Arc, RwLock};

pub use canvas::{Bounds, Canvas, CanvasMode, SavePhase, SaveTicket, Viewport, demo_graph};
pub use client::{HttpWorkflowApi, MemWorkflowApi, WorkflowApi};
pub use common::{Notice, NoticeLevel, NoticeQueue, Vars};
pub use config::{ApiConfig, Config, EditorConfig};
pub use dialog::{AiGenerateContentConfig, AiScoreLeadConfig, ConfigDialog, NodeConfig};
pub use editor::{ExecutionMonitor, WorkflowEditor};
pub use error::FlowError;
pub use model::*;
pub use palette::{DragPayload, PaletteCategory, PaletteTemplate};

/// Result type alias for Flowcanvas operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
