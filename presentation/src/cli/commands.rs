//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for dispatch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every provider's outcome, plus the selected answer
    Full,
    /// Only the answer text
    Answer,
    /// JSON output
    Json,
}

impl From<OutputFormat> for hotbox_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => hotbox_domain::OutputFormat::Full,
            OutputFormat::Answer => hotbox_domain::OutputFormat::Answer,
            OutputFormat::Json => hotbox_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for holly-hotbox
#[derive(Parser, Debug)]
#[command(name = "hotbox")]
#[command(author, version, about = "Holly Hot Box - ask several LLM providers at once")]
#[command(long_about = r#"
Holly Hot Box sends one prompt to several LLM providers and combines the answers.

Modes:
  single:<id>               Ask one provider
  fastest[:ids]             First successful answer wins, the rest are cancelled
  consensus[:ids]           Every answer, in the order listed
  parallel[:ids]            Like consensus, rendered side by side
  best[:ids][@arbiter]      Every answer, then an arbiter picks the best one
  <preset>                  A named mode from [presets] in the config file

Providers: openai, gemini, claude, deepseek, grok, huggingface
API keys are read from OPENAI_API_KEY, GEMINI_API_KEY, CLAUDE_API_KEY,
DEEPSEEK_API_KEY, GROK_API_KEY and HUGGINGFACE_API_KEY.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./hotbox.toml       Project-level config
3. ~/.config/holly-hotbox/config.toml   Global config
4. HOTBOX_* environment variables

Example:
  hotbox "What's the best way to handle errors in Rust?"
  hotbox --mode fastest -p gemini -p deepseek "Summarize RFC 9110"
  hotbox --mode best -p gemini -p claude --arbiter openai "Explain lifetimes"
  hotbox --chat --mode power_duo
"#)]
pub struct Cli {
    /// The prompt to send (not required in chat mode)
    pub prompt: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Mode: policy, preset name, or `policy:id,id[@arbiter]`
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Providers to query (can be specified multiple times)
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Vec<String>,

    /// Provider that judges the answers in `best` mode
    #[arg(long, value_name = "PROVIDER")]
    pub arbiter: Option<String>,

    /// Continue an existing chat session
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Per-call timeout in seconds (overrides the config file)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List registered providers and whether their API key is set, then exit
    #[arg(long)]
    pub list_providers: bool,

    /// Send a tiny live prompt to every provider with a key, then exit
    #[arg(long)]
    pub check_providers: bool,

    /// Do not record this conversation in the chat store
    #[arg(long)]
    pub no_store: bool,
}
