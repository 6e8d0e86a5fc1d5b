use crate::pipeline::{OutputFormat, ResultMode};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// LLM-assisted security review of plain-text log files
#[derive(Parser, Debug)]
#[command(
    name = "loglens",
    about = "LLM-assisted security review of plain-text log files",
    version,
    long_about = "loglens reads a log file, groups its entries into batches and asks a \
                  language model, acting as a security analyst, to review each batch. \
                  The analysis is saved to a timestamped JSON or text file."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a log file for security threats",
        long_about = "Loads the log file, normalizes and batches its entries, sends each batch \
                      to the configured model and writes the collected analysis to \
                      analysis_<MM>_<DD>_<YYYY>_<HH>_<MM>.<json|txt>.\n\n\
                      Examples:\n  \
                      loglens analyze auth.log\n  \
                      loglens analyze auth.log --batch-size 20 --format text --mode per-batch\n  \
                      loglens analyze auth.log --provider ollama --model qwen2.5:7b --delay-ms 0"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Show how a log file would be batched, without contacting any model",
        long_about = "Loads and normalizes the log file and prints the resulting batches. \
                      No request is sent and no result file is written.\n\n\
                      Examples:\n  \
                      loglens batches auth.log\n  \
                      loglens batches auth.log --batch-size 5"
    )]
    Batches(BatchesArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "FILE", help = "Log file to analyze (one entry per line)")]
    pub log_file: PathBuf,

    #[arg(short = 'b', long, value_name = "N", help = "Entries per request")]
    pub batch_size: Option<usize>,

    #[arg(short = 'f', long, value_enum, help = "Result file format")]
    pub format: Option<OutputFormatArg>,

    #[arg(long, value_enum, help = "Pair fragments with entries or keep one block per batch")]
    pub mode: Option<ResultModeArg>,

    #[arg(short = 'o', long, value_name = "DIR", help = "Directory for the result file")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_name = "MS", help = "Pause after each request, in milliseconds")]
    pub delay_ms: Option<u64>,

    #[arg(
        short = 'p',
        long,
        value_name = "PROVIDER",
        help = "Model provider (openai, ollama, claude, gemini, grok, groq)"
    )]
    pub provider: Option<String>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name (provider-specific)")]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Ask for each entry to be mapped to this threat framework, e.g. \"MITRE ATT&CK\""
    )]
    pub framework: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "N", help = "Maximum characters kept per entry")]
    pub max_entry_chars: Option<usize>,

    #[arg(long, value_name = "T", help = "Sampling temperature")]
    pub temperature: Option<f32>,

    #[arg(long, value_name = "N", help = "Maximum tokens per response")]
    pub max_tokens: Option<u32>,

    #[arg(long, help = "Do not print results to stdout")]
    pub no_print: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct BatchesArgs {
    #[arg(value_name = "FILE", help = "Log file to inspect")]
    pub log_file: PathBuf,

    #[arg(short = 'b', long, value_name = "N", help = "Entries per request")]
    pub batch_size: Option<usize>,

    #[arg(long, value_name = "N", help = "Maximum characters kept per entry")]
    pub max_entry_chars: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Text,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Text => OutputFormat::Text,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultModeArg {
    Paired,
    PerBatch,
}

impl From<ResultModeArg> for ResultMode {
    fn from(arg: ResultModeArg) -> Self {
        match arg {
            ResultModeArg::Paired => ResultMode::Paired,
            ResultModeArg::PerBatch => ResultMode::PerBatch,
        }
    }
}
