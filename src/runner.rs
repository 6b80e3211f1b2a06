//! The batch loop.
//!
//! Records are processed strictly in order on the calling thread. Every
//! record gets its own copy of the template, one submission and one pause
//! before the next record. A failed submission is logged and the batch goes
//! on.

use std::{thread, time::Duration};

use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    NodeBindings, PromptBatchError,
    model::{Record, WorkflowTemplate},
    submitter::Submitter,
    template,
    utils::truncate,
};

/// Characters of the prompt shown in the success line.
const PROMPT_PREVIEW_CHARS: usize = 60;
/// Characters of the payload JSON shown when a submission fails.
const PAYLOAD_PREVIEW_CHARS: usize = 1000;

/// Outcome counts of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct BatchRunner {
    template: WorkflowTemplate,
    bindings: NodeBindings,
    client_id: Option<String>,
    submitter: Box<dyn Submitter>,
    delay: Duration,
}

impl BatchRunner {
    pub(crate) fn new(
        template: WorkflowTemplate,
        bindings: NodeBindings,
        client_id: Option<String>,
        submitter: Box<dyn Submitter>,
        delay: Duration,
    ) -> Self {
        Self {
            template,
            bindings,
            client_id,
            submitter,
            delay,
        }
    }

    pub fn template(&self) -> &WorkflowTemplate {
        &self.template
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Submit every record in order and report how many were accepted.
    pub fn run(
        &self,
        records: &[Record],
    ) -> BatchReport {
        let mut report = BatchReport {
            total: records.len(),
            ..BatchReport::default()
        };

        for (pos, record) in records.iter().enumerate() {
            if self.process(record, report.total) {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }

            if pos + 1 < records.len() && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        report
    }

    fn process(
        &self,
        record: &Record,
        total: usize,
    ) -> bool {
        let mut workflow = self.template.instantiate();
        let applied = template::apply_record(&mut workflow, record, &self.bindings, template::random_seed());
        debug!(index = record.index, text = applied.text, seed = ?applied.seed, filename_prefix = ?applied.filename_prefix, "workflow prepared");

        let filename_prefix = record.filename_prefix();
        let payload = workflow.into_payload(self.client_id.as_deref());

        match self.submitter.submit(&payload) {
            Ok(()) => {
                info!("{}", success_line(record, total, &filename_prefix));
                true
            }
            Err(err) => {
                for line in failure_lines(record, total, &err, &payload) {
                    error!("{}", line);
                }
                false
            }
        }
    }
}

/// `[i/total] Sent prompt: <first 60 chars>... Filename: <prefix> Success!`
fn success_line(
    record: &Record,
    total: usize,
    filename_prefix: &str,
) -> String {
    format!(
        "[{}/{}] Sent prompt: {}... Filename: {} Success!",
        record.index,
        total,
        truncate(&record.prompt, PROMPT_PREVIEW_CHARS),
        filename_prefix
    )
}

/// The error, the full prompt and the first 1000 chars of the payload JSON, one line each.
fn failure_lines(
    record: &Record,
    total: usize,
    err: &PromptBatchError,
    payload: &Value,
) -> [String; 3] {
    let payload_json = serde_json::to_string(payload).unwrap_or_default();
    [
        format!("[{}/{}] Error sending prompt: {}", record.index, total, err),
        format!("Prompt: {}", record.prompt),
        format!("Payload: {}...", truncate(&payload_json, PAYLOAD_PREVIEW_CHARS)),
    ]
}
