use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use promptbatch::{BatchReport, Config, RunnerBuilder, reader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Submit spreadsheet prompts to a ComfyUI workflow endpoint, one row at a time.
#[derive(Parser)]
#[command(name = "promptbatch", version, about)]
struct Cli {
    /// TOML configuration file; built-in defaults apply without it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Workflow template (API format JSON)
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Delimited input file with a header row
    #[arg(long)]
    input: Option<PathBuf>,
    /// Prompt endpoint URL
    #[arg(long)]
    url: Option<String>,
    /// Pause between submissions in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl Cli {
    fn into_config(self) -> promptbatch::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read(path)?,
            None => Config::default(),
        };

        if let Some(workflow) = self.workflow {
            config.workflow_file = workflow;
        }
        if let Some(input) = self.input {
            config.input_file = input;
        }
        if let Some(url) = self.url {
            config.endpoint.url = url;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(cli: Cli) -> promptbatch::Result<BatchReport> {
    let config = cli.into_config()?;

    let runner = RunnerBuilder::new().config(config.clone()).build()?;
    let records = reader::load_records(&config.input_file, &config.columns)?;
    info!("Loaded {} prompts from {:?}", records.len(), config.input_file);

    Ok(runner.run(&records))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(report) => {
            info!("Done: {} submitted, {} failed, {} total", report.succeeded, report.failed, report.total);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use clap::Parser;

    use super::Cli;

    #[test]
    fn test_overrides_apply_on_top_of_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "delay_ms = 10\ninput_file = \"a.csv\"\n[endpoint]\nurl = \"http://10.0.0.1:8188/prompt\"\n").unwrap();

        let cli = Cli::parse_from(["promptbatch", "--config", file.path().to_str().unwrap(), "--url", "http://127.0.0.1:9000/prompt", "--delay-ms", "0"]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.endpoint.url, "http://127.0.0.1:9000/prompt");
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.input_file.to_str(), Some("a.csv"));
    }

    #[test]
    fn test_url_override_fixes_invalid_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[endpoint]\nurl = \"not a url\"\n").unwrap();
        let path = file.path().to_str().unwrap();

        // validation runs once, after the overrides
        let cli = Cli::parse_from(["promptbatch", "--config", path, "--url", "http://127.0.0.1:8188/prompt"]);
        assert!(cli.into_config().is_ok());

        let cli = Cli::parse_from(["promptbatch", "--config", path]);
        assert!(cli.into_config().unwrap_err().to_string().contains("invalid endpoint url"));
    }

    #[test]
    fn test_invalid_url_flag() {
        let cli = Cli::parse_from(["promptbatch", "--url", "nope"]);
        assert!(cli.into_config().is_err());
    }
}
