//! Per-record substitution into a workflow copy.
//!
//! Each binding names a node id, the `class_type` that node must carry and the
//! input key to overwrite. A missing node or a different `class_type` skips
//! that binding without error; the remaining bindings still apply.

use rand::Rng;
use serde_json::Value;
use tracing::debug;

use crate::{
    NodeBinding, NodeBindings,
    model::{Record, Workflow},
};

/// What [`apply_record`] actually wrote into the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    pub text: bool,
    pub seed: Option<i64>,
    pub filename_prefix: Option<String>,
}

/// Draw a seed in `[0, 2^63 - 1]`.
pub fn random_seed() -> i64 {
    rand::thread_rng().gen_range(0..=i64::MAX)
}

/// Write the record's prompt, the given seed and the record's filename prefix
/// into the bound nodes of `workflow`.
pub fn apply_record(
    workflow: &mut Workflow,
    record: &Record,
    bindings: &NodeBindings,
    seed: i64,
) -> Substitutions {
    let mut applied = Substitutions::default();

    if bind(workflow, &bindings.text, Value::String(record.prompt.clone())) {
        applied.text = true;
    }

    if bind(workflow, &bindings.seed, Value::from(seed)) {
        applied.seed = Some(seed);
    }

    let filename_prefix = record.filename_prefix();
    if bind(workflow, &bindings.filename, Value::String(filename_prefix.clone())) {
        applied.filename_prefix = Some(filename_prefix);
    }

    applied
}

fn bind(
    workflow: &mut Workflow,
    binding: &NodeBinding,
    value: Value,
) -> bool {
    let found = workflow.class_type(&binding.node_id).map(str::to_string);
    match found {
        Some(class_type) if class_type == binding.class_type => workflow.set_input(&binding.node_id, &binding.input, value),
        Some(class_type) => {
            debug!(node_id = %binding.node_id, expected = %binding.class_type, found = %class_type, "class_type mismatch, skipping substitution");
            false
        }
        None => {
            debug!(node_id = %binding.node_id, "node not found, skipping substitution");
            false
        }
    }
}
