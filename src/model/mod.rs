mod edge;
mod execution;
mod node;
mod workflow;

pub use edge::{Connection, EDGE_TYPE_SMOOTHSTEP, Edge, EdgeId, FixedHandle, SourceHandle};
pub use execution::{ExecutionId, ExecutionStatus, TestRunRequest, WorkflowExecution};
pub use node::{Node, NodeId, NodeKind, NodeType, Position};
pub use workflow::{GraphLoad, NewWorkflow, StepsConfig, Workflow, WorkflowId, WorkflowStatus};
