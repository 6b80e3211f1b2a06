mod record;
mod workflow;

pub use record::Record;
pub use workflow::{CLASS_TYPE_KEY, INPUTS_KEY, NodeId, Workflow, WorkflowTemplate};
