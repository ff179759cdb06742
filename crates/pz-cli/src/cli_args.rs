use clap::{Args, Parser, Subcommand};

pub(crate) const DEFAULT_FLAGS_FILE: &str = ".passcode-puzzles/flags.json";

#[derive(Debug, Parser)]
#[command(name = "pz-cli")]
#[command(about = "Passcode puzzle player and bundle tool")]
pub(crate) struct Cli {
    /// Where global flags and the completed marker are persisted.
    #[arg(long = "flags-file", global = true)]
    pub(crate) flags_file: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    Play(PlayArgs),
    Encode(EncodeArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(StartArgs),
    Text(TextArgs),
    Option(OptionArgs),
    Click(ClickArgs),
}

#[derive(Debug, Args)]
pub(crate) struct StartArgs {
    #[arg(long = "puzzles-dir")]
    pub(crate) puzzles_dir: String,
    #[arg(long = "assets-dir")]
    pub(crate) assets_dir: Option<String>,
    #[arg(long = "passcode")]
    pub(crate) passcode: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct TextArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "node-index")]
    pub(crate) node_index: usize,
    #[arg(long = "value")]
    pub(crate) value: String,
    /// Record a keystroke draft instead of submitting the answer.
    #[arg(long = "draft")]
    pub(crate) draft: bool,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct OptionArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "node-index")]
    pub(crate) node_index: usize,
    #[arg(long = "choice")]
    pub(crate) choice: usize,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ClickArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "node-index")]
    pub(crate) node_index: usize,
    #[arg(long = "x")]
    pub(crate) x: i64,
    #[arg(long = "y")]
    pub(crate) y: i64,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[arg(long = "puzzles-dir")]
    pub(crate) puzzles_dir: String,
    #[arg(long = "assets-dir")]
    pub(crate) assets_dir: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct EncodeArgs {
    /// Authoring bundle: a JSON object mapping passcodes to puzzles.
    #[arg(long = "source")]
    pub(crate) source: String,
    #[arg(long = "out")]
    pub(crate) out: String,
}
