use crate::utils::sanitize_filename;

/// One eligible row of the tabular input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// 1-based position among the eligible rows
    pub index: usize,
    /// trimmed prompt text, never empty
    pub prompt: String,
    /// trimmed display name, may be empty
    pub name: String,
}

impl Record {
    pub fn new(
        index: usize,
        prompt: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            name: name.into(),
        }
    }

    /// Filename prefix for the generated images.
    ///
    /// The sanitized name, or `img_<index>` when the name is empty.
    pub fn filename_prefix(&self) -> String {
        if self.name.is_empty() {
            format!("img_{}", self.index)
        } else {
            sanitize_filename(&self.name)
        }
    }
}
