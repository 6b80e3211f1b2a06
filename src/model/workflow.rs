use std::{fs, path::Path};

use serde_json::{Map, Value};

use crate::{PromptBatchError, Result};

/// node id
pub type NodeId = String;

/// Key of the node discriminator.
pub const CLASS_TYPE_KEY: &str = "class_type";
/// Key of the node inputs mapping.
pub const INPUTS_KEY: &str = "inputs";

const PROMPT_KEY: &str = "prompt";
const CLIENT_ID_KEY: &str = "client_id";

/// Workflow node graph loaded from disk.
///
/// The template is never mutated. Each submission works on a [`Workflow`]
/// obtained from [`WorkflowTemplate::instantiate`], which owns a deep copy
/// of every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowTemplate {
    nodes: Map<NodeId, Value>,
}

impl WorkflowTemplate {
    pub fn load<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|err| PromptBatchError::Workflow(format!("failed to load workflow file {:?}: {}", path.as_ref(), err)))?;

        Self::from_json(&data)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let value = serde_json::from_str::<Value>(s).map_err(|e| PromptBatchError::Workflow(format!("invalid workflow template: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(nodes) => Ok(Self {
                nodes,
            }),
            other => Err(PromptBatchError::Workflow(format!(
                "workflow template must be a JSON object of nodes, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns a deep copy that can be mutated freely.
    pub fn instantiate(&self) -> Workflow {
        Workflow {
            nodes: self.nodes.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A per-record copy of the template.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    nodes: Map<NodeId, Value>,
}

impl Workflow {
    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Value> {
        self.nodes.get(id)
    }

    /// The node's `class_type`, if the node exists and carries a string discriminator.
    pub fn class_type(
        &self,
        id: &str,
    ) -> Option<&str> {
        self.nodes.get(id)?.get(CLASS_TYPE_KEY)?.as_str()
    }

    pub fn input(
        &self,
        id: &str,
        key: &str,
    ) -> Option<&Value> {
        self.nodes.get(id)?.get(INPUTS_KEY)?.get(key)
    }

    /// Set `inputs.<key>` on node `id`.
    ///
    /// Returns false when the node does not exist or is not an object. A node
    /// without an `inputs` object gets an empty one first.
    pub fn set_input(
        &mut self,
        id: &str,
        key: &str,
        value: Value,
    ) -> bool {
        let Some(Value::Object(node)) = self.nodes.get_mut(id) else {
            return false;
        };

        let inputs = node.entry(INPUTS_KEY).or_insert_with(|| Value::Object(Map::new()));
        if !inputs.is_object() {
            *inputs = Value::Object(Map::new());
        }
        if let Value::Object(inputs) = inputs {
            inputs.insert(key.to_string(), value);
        }
        true
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.nodes.clone())
    }

    /// Wraps the workflow into the request body: `{"prompt": <workflow>}`,
    /// plus `client_id` when given.
    pub fn into_payload(
        self,
        client_id: Option<&str>,
    ) -> Value {
        let mut payload = Map::new();
        payload.insert(PROMPT_KEY.to_string(), Value::Object(self.nodes));
        if let Some(client_id) = client_id {
            payload.insert(CLIENT_ID_KEY.to_string(), Value::String(client_id.to_string()));
        }
        Value::Object(payload)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
