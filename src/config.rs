use std::{collections::HashMap, fs, path::Path, path::PathBuf};

use serde::Deserialize;

use crate::{PromptBatchError, Result, submitter::AuthorizationConfig};

const DEFAULT_WORKFLOW_FILE: &str = "Workflowtest.json";
const DEFAULT_INPUT_FILE: &str = "Promt.csv";
const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:8188/prompt";
const DEFAULT_PROMPT_COLUMN: &str = "Promt(positive)";
const DEFAULT_NAME_COLUMN: &str = "Tên";
const DEFAULT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// workflow template (ComfyUI API format)
    pub workflow_file: PathBuf,
    /// delimited input file with a header row
    pub input_file: PathBuf,
    /// pause between two submissions in milliseconds, defaults to 1000
    pub delay_ms: u64,
    /// sent next to the workflow as `client_id` when set
    pub client_id: Option<String>,
    /// endpoint config
    pub endpoint: EndpointConfig,
    /// input column config
    pub columns: ColumnConfig,
    /// template nodes to substitute
    pub bindings: NodeBindings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// prompt endpoint url
    pub url: String,
    /// request timeout in milliseconds, 0 disables the timeout
    pub timeout: u64,
    /// extra request headers
    pub headers: HashMap<String, String>,
    /// authorization
    pub auth: AuthorizationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// column holding the positive prompt
    pub prompt: String,
    /// column holding the display name used for the filename prefix
    pub name: String,
    /// field delimiter, must be ASCII
    pub delimiter: char,
}

/// Locates one node input inside the workflow template.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NodeBinding {
    pub node_id: String,
    pub class_type: String,
    pub input: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeBindings {
    pub text: NodeBinding,
    pub seed: NodeBinding,
    pub filename: NodeBinding,
}

impl NodeBinding {
    pub fn new(
        node_id: &str,
        class_type: &str,
        input: &str,
    ) -> Self {
        Self {
            node_id: node_id.to_string(),
            class_type: class_type.to_string(),
            input: input.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workflow_file: PathBuf::from(DEFAULT_WORKFLOW_FILE),
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            delay_ms: DEFAULT_DELAY_MS,
            client_id: None,
            endpoint: EndpointConfig::default(),
            columns: ColumnConfig::default(),
            bindings: NodeBindings::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT_URL.to_string(),
            timeout: 0,
            headers: HashMap::new(),
            auth: AuthorizationConfig::default(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT_COLUMN.to_string(),
            name: DEFAULT_NAME_COLUMN.to_string(),
            delimiter: ',',
        }
    }
}

impl Default for NodeBindings {
    fn default() -> Self {
        Self {
            text: NodeBinding::new("6", "CLIPTextEncode", "text"),
            seed: NodeBinding::new("3", "KSampler", "seed"),
            filename: NodeBinding::new("9", "SaveImage", "filename_prefix"),
        }
    }
}

impl ColumnConfig {
    /// The delimiter as the single byte the csv reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PromptBatchError::Config(format!("delimiter '{}' is not an ASCII character", self.delimiter)))
        }
    }
}

impl Config {
    /// Read and validate the config file at `path`.
    pub fn load<T: AsRef<Path>>(path: T) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = Self::parse(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the config file at `path` without validating it, for callers that
    /// still adjust the values and call [`Config::validate`] themselves.
    pub fn read<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|err| PromptBatchError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), err)))?;

        Self::parse(data.as_str())
    }

    fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str::<Config>(toml_str)?)
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.endpoint.url).map_err(|err| PromptBatchError::Config(format!("invalid endpoint url '{}': {}", self.endpoint.url, err)))?;
        self.columns.delimiter_byte()?;
        Ok(())
    }
}
