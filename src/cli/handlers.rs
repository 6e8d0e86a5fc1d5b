use super::commands::{AnalyzeArgs, BatchesArgs};
use super::output::{format_batch_plan, format_report};
use crate::config::{default_model, parse_provider, ConfigError, LoglensConfig};
use crate::pipeline::{into_batches, load_logs, normalize, pacer_for, LogAnalyzer, Orchestrator};
use anyhow::{Context, Result};
use std::num::NonZeroUsize;
use tracing::{debug, error, info, warn};

/// Applies `analyze` flags on top of the environment configuration.
pub fn analyze_config(args: &AnalyzeArgs) -> Result<LoglensConfig, ConfigError> {
    let mut config = LoglensConfig::default();

    if let Some(ref provider) = args.provider {
        config.provider = parse_provider(provider)?;
        if args.model.is_none() && std::env::var("LOGLENS_MODEL").is_err() {
            config.model = default_model(config.provider).to_string();
        }
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if let Some(mode) = args.mode {
        config.result_mode = mode.into();
    }
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(delay_ms) = args.delay_ms {
        config.request_delay_ms = delay_ms;
    }
    if let Some(ref framework) = args.framework {
        config.threat_framework = Some(framework.clone()).filter(|f| !f.trim().is_empty());
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(max_entry_chars) = args.max_entry_chars {
        config.max_entry_chars = max_entry_chars;
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }

    config.validate()?;
    Ok(config)
}

pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    let config = match analyze_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    debug!("Configuration: {:?}", config);

    if let Some(var) = config.missing_credential() {
        warn!(
            "{} is not set; requests to {} will likely fail",
            var,
            config.provider.as_str()
        );
    }

    match run_analysis(args, &config).await {
        Ok(output) => {
            if !quiet && !args.no_print {
                if let Some(output) = output {
                    print!("{}", output);
                }
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

async fn run_analysis(args: &AnalyzeArgs, config: &LoglensConfig) -> Result<Option<String>> {
    let client = config
        .create_client()
        .context("Failed to create completion client")?;
    info!(
        "Using {} ({})",
        client.name(),
        client.model_info().unwrap_or_default()
    );

    let analyzer = LogAnalyzer::new(client, config.analysis_settings());
    let orchestrator = Orchestrator::new(
        config.run_settings()?,
        analyzer,
        pacer_for(config.request_delay()),
    );

    let report = orchestrator
        .run(&args.log_file)
        .await
        .with_context(|| format!("Analysis of {} failed", args.log_file.display()))?;

    Ok(report.output_path.is_some().then(|| format_report(&report)))
}

pub fn handle_batches(args: &BatchesArgs, quiet: bool) -> i32 {
    match plan_batches(args) {
        Ok(plan) => {
            if !quiet {
                print!("{}", plan);
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn plan_batches(args: &BatchesArgs) -> Result<String> {
    let mut config = LoglensConfig::default();
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(max_entry_chars) = args.max_entry_chars {
        config.max_entry_chars = max_entry_chars;
    }
    config.validate()?;

    let batch_size = NonZeroUsize::new(config.batch_size)
        .context("Batch size must be at least 1")?;
    let raw = load_logs(&args.log_file)
        .with_context(|| format!("Failed to read {}", args.log_file.display()))?;
    let batches = into_batches(normalize(&raw, config.max_entry_chars), batch_size);

    Ok(format_batch_plan(&batches, raw.len()))
}
