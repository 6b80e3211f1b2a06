use std::time::Duration;

use crate::{
    BatchRunner, Config, Result,
    model::WorkflowTemplate,
    submitter::{HttpSubmitter, Submitter},
};

/// Assembles a [`BatchRunner`].
///
/// Anything not set explicitly comes from the [`Config`]: the template is
/// loaded from `workflow_file`, the submitter posts to `endpoint` and the
/// delay is `delay_ms`.
#[derive(Default)]
pub struct RunnerBuilder {
    config: Option<Config>,
    template: Option<WorkflowTemplate>,
    submitter: Option<Box<dyn Submitter>>,
    delay: Option<Duration>,
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = Some(config);
        self
    }

    pub fn template(
        mut self,
        template: WorkflowTemplate,
    ) -> Self {
        self.template = Some(template);
        self
    }

    pub fn submitter(
        mut self,
        submitter: Box<dyn Submitter>,
    ) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn delay(
        mut self,
        delay: Duration,
    ) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn build(self) -> Result<BatchRunner> {
        let config = self.config.unwrap_or_default();

        let template = match self.template {
            Some(template) => template,
            None => WorkflowTemplate::load(&config.workflow_file)?,
        };

        let submitter = match self.submitter {
            Some(submitter) => submitter,
            None => Box::new(HttpSubmitter::new(&config.endpoint)?),
        };

        let delay = self.delay.unwrap_or(Duration::from_millis(config.delay_ms));

        Ok(BatchRunner::new(template, config.bindings, config.client_id, submitter, delay))
    }
}
