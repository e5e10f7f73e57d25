//! Clap derive structures for the `restreamer` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so the build script can render man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// restreamer -- manage datarhei Restreamer daemons
#[derive(Debug, Parser)]
#[command(
    name = "restreamer",
    version,
    about = "Manage Restreamer processes, outputs and storage from the command line",
    long_about = "A CLI for administering datarhei Restreamer daemons.\n\n\
        Talks to the daemon's v3 REST API: restream processes, dynamic\n\
        outputs, playout inputs, filesystems, metrics and FFmpeg skills.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Daemon profile to use
    #[arg(long, short = 'p', env = "RESTREAMER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Daemon URL, e.g. http://localhost:8080 (overrides profile)
    #[arg(long, short = 'u', env = "RESTREAMER_URL", global = true)]
    pub url: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, env = "RESTREAMER_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password (overrides profile and keyring)
    #[arg(long, env = "RESTREAMER_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RESTREAMER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "RESTREAMER_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "RESTREAMER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the daemon is alive
    Ping,

    /// Show daemon name and version
    Info,

    /// Log in and report the token lifetime
    Login,

    /// Manage restream processes
    #[command(alias = "proc", alias = "ps")]
    Processes(ProcessesArgs),

    /// Manage dynamic outputs of a running process
    #[command(alias = "out")]
    Outputs(OutputsArgs),

    /// Publish one input to several platforms through one process
    #[command(alias = "ms")]
    Multistream(MultistreamArgs),

    /// Read and write stored metadata
    #[command(alias = "meta")]
    Metadata(MetadataArgs),

    /// Inspect and control process inputs
    Playout(PlayoutArgs),

    /// Browse and transfer files in daemon storages
    Fs(FsArgs),

    /// View live client sessions
    Sessions(SessionsArgs),

    /// Print the daemon log
    Logs,

    /// Query collected metrics
    Metrics(MetricsArgs),

    /// List streams on the built-in RTMP/SRT servers
    Streams(StreamsArgs),

    /// Show FFmpeg capabilities
    Skills(SkillsArgs),

    /// Read or replace the daemon configuration
    ServerConfig(ServerConfigArgs),

    /// Browse a local services.json streaming catalog
    Services(ServicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared arguments ─────────────────────────────────────────────────

/// Source of a JSON document: inline or from a file.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct JsonInput {
    /// Inline JSON document
    #[arg(long)]
    pub json: Option<String>,

    /// Read the JSON document from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROCESSES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProcessesArgs {
    #[command(subcommand)]
    pub command: ProcessesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProcessesCommand {
    /// List all processes
    #[command(alias = "ls")]
    List,

    /// Show one process
    Get {
        /// Process ID
        id: String,
    },

    /// Create a process restreaming one input to several destinations
    Create {
        /// Reference label for the process
        #[arg(long, short = 'r')]
        reference: String,

        /// Input URL (e.g. rtmp://localhost/live/obs)
        #[arg(long, short = 'i')]
        input: String,

        /// Destination URL (repeat for each destination)
        #[arg(long = "output", short = 'O', required = true)]
        outputs: Vec<String>,

        /// FFmpeg video filter applied before fan-out
        #[arg(long)]
        video_filter: Option<String>,
    },

    /// Replace a process configuration
    Update {
        /// Process ID
        id: String,

        #[command(flatten)]
        config: JsonInput,
    },

    /// Delete a process
    #[command(alias = "rm")]
    Delete {
        /// Process ID
        id: String,
    },

    /// Start a process
    Start {
        /// Process ID
        id: String,
    },

    /// Stop a process
    Stop {
        /// Process ID
        id: String,
    },

    /// Restart a process
    Restart {
        /// Process ID
        id: String,
    },

    /// Show live encoder telemetry
    State {
        /// Process ID
        id: String,
    },

    /// Probe the process input for streams
    Probe {
        /// Process ID
        id: String,
    },

    /// Show the process log
    Logs {
        /// Process ID
        id: String,
    },

    /// Show the stored process configuration
    Config {
        /// Process ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OUTPUTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OutputsArgs {
    #[command(subcommand)]
    pub command: OutputsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OutputsCommand {
    /// List the outputs of a process
    #[command(alias = "ls")]
    List {
        /// Process ID
        process: String,
    },

    /// Attach a new destination to a running process
    Add {
        /// Process ID
        process: String,

        /// New output ID
        output: String,

        /// Destination URL
        url: String,

        /// FFmpeg video filter for this output
        #[arg(long)]
        video_filter: Option<String>,
    },

    /// Change the URL or filter of an output
    Update {
        /// Process ID
        process: String,

        /// Output ID
        output: String,

        /// New destination URL
        #[arg(long)]
        url: Option<String>,

        /// New video filter
        #[arg(long)]
        video_filter: Option<String>,
    },

    /// Detach an output from a running process
    #[command(alias = "rm")]
    Remove {
        /// Process ID
        process: String,

        /// Output ID
        output: String,
    },

    /// Show the encoding settings of an output
    EncodingGet {
        /// Process ID
        process: String,

        /// Output ID
        output: String,
    },

    /// Change the encoding settings of an output (unset flags are kept)
    EncodingSet {
        /// Process ID
        process: String,

        /// Output ID
        output: String,

        #[command(flatten)]
        encoding: EncodingOpts,
    },
}

#[derive(Debug, Args)]
pub struct EncodingOpts {
    /// Video bitrate in kbit/s
    #[arg(long)]
    pub video_bitrate: Option<u32>,

    /// Audio bitrate in kbit/s
    #[arg(long)]
    pub audio_bitrate: Option<u32>,

    /// Output resolution as WIDTHxHEIGHT (e.g. 1280x720)
    #[arg(long)]
    pub resolution: Option<String>,

    /// Frame rate as NUM/DEN or an integer (e.g. 30000/1001, 60)
    #[arg(long)]
    pub fps: Option<String>,

    /// Encoder preset (e.g. veryfast)
    #[arg(long)]
    pub preset: Option<String>,

    /// Encoder profile (e.g. high)
    #[arg(long)]
    pub profile: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MULTISTREAM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MultistreamArgs {
    #[command(subcommand)]
    pub command: MultistreamCommand,
}

#[derive(Debug, Subcommand)]
pub enum MultistreamCommand {
    /// List the built-in platforms and their ingest URLs
    Platforms {
        /// Orientation used to pick the ingest URL
        #[arg(long, default_value = "auto")]
        orientation: OrientationArg,
    },

    /// Print the video filter that reframes one orientation for another
    Filter {
        /// Source orientation
        #[arg(long)]
        from: OrientationArg,

        /// Destination orientation
        #[arg(long)]
        to: OrientationArg,
    },

    /// Start one process publishing to every destination
    Start {
        /// Input URL
        #[arg(long)]
        input: String,

        /// Platform destination as PLATFORM=STREAM_KEY (repeatable)
        #[arg(long = "to", value_name = "PLATFORM=KEY")]
        destinations: Vec<String>,

        /// Full publish URL of a custom destination (repeatable)
        #[arg(long = "custom", value_name = "URL")]
        custom: Vec<String>,

        /// Orientation of every destination
        #[arg(long, default_value = "auto")]
        orientation: OrientationArg,

        /// Process reference (generated when omitted)
        #[arg(long)]
        reference: Option<String>,
    },

    /// Stop the process running under a reference
    Stop {
        /// Process reference
        reference: String,
    },

    /// Report whether the process under a reference is running
    Status {
        /// Process reference
        reference: String,
    },
}

impl MultistreamCommand {
    /// Whether the command runs without a daemon.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Platforms { .. } | Self::Filter { .. })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrientationArg {
    Auto,
    Horizontal,
    Vertical,
    Square,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  METADATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MetadataArgs {
    #[command(subcommand)]
    pub command: MetadataCommand,
}

#[derive(Debug, Subcommand)]
pub enum MetadataCommand {
    /// Read a metadata value
    Get {
        /// Metadata key
        key: String,

        /// Scope the key to a process
        #[arg(long)]
        process: Option<String>,
    },

    /// Store a metadata value
    Set {
        /// Metadata key
        key: String,

        /// Scope the key to a process
        #[arg(long)]
        process: Option<String>,

        #[command(flatten)]
        value: JsonInput,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLAYOUT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PlayoutArgs {
    #[command(subcommand)]
    pub command: PlayoutCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlayoutCommand {
    /// Show the connection status of an input
    Status {
        /// Process ID
        process: String,

        /// Input ID
        input: String,
    },

    /// Switch an input to a different source URL
    Switch {
        /// Process ID
        process: String,

        /// Input ID
        input: String,

        /// New source URL
        url: String,
    },

    /// Force an input to reconnect
    Reopen {
        /// Process ID
        process: String,

        /// Input ID
        input: String,
    },

    /// Save the latest keyframe of an input
    Keyframe {
        /// Process ID
        process: String,

        /// Input ID
        input: String,

        /// Keyframe name, selects the image format
        #[arg(long, default_value = "last.jpg")]
        name: String,

        /// Write to this file instead of stdout
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FILESYSTEM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FsArgs {
    #[command(subcommand)]
    pub command: FsCommand,
}

#[derive(Debug, Subcommand)]
pub enum FsCommand {
    /// List the configured storages
    Filesystems,

    /// List files in a storage
    #[command(alias = "ls")]
    List {
        /// Storage name (e.g. disk, mem)
        storage: String,

        /// Only list files matching this glob (e.g. "*.m3u8")
        #[arg(long, short = 'g')]
        glob: Option<String>,
    },

    /// Download a file
    Download {
        /// Storage name
        storage: String,

        /// Path inside the storage
        path: String,

        /// Write to this file instead of stdout
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Upload a local file
    Upload {
        /// Storage name
        storage: String,

        /// Path inside the storage
        path: String,

        /// Local file to upload
        file: PathBuf,
    },

    /// Delete a file
    #[command(alias = "rm")]
    Delete {
        /// Storage name
        storage: String,

        /// Path inside the storage
        path: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MONITORING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List live sessions
    #[command(alias = "ls")]
    List,

    /// Show totals over all active sessions
    Active,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    #[command(subcommand)]
    pub command: MetricsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MetricsCommand {
    /// Describe the collected metrics
    List,

    /// Run a metrics query
    Query {
        #[command(flatten)]
        query: JsonInput,
    },

    /// Print metrics in Prometheus text format
    Prometheus,
}

#[derive(Debug, Args)]
pub struct StreamsArgs {
    #[command(subcommand)]
    pub command: StreamsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StreamsCommand {
    /// Publishers on the RTMP server
    Rtmp,

    /// Streams on the SRT server
    Srt,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYSTEM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SkillsArgs {
    #[command(subcommand)]
    pub command: SkillsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SkillsCommand {
    /// Show the FFmpeg build and capability summary
    Show,

    /// Re-detect FFmpeg capabilities
    Reload,

    /// List available encoders
    Encoders {
        /// Codec kind
        #[arg(long, default_value = "video")]
        kind: CodecKindArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CodecKindArg {
    Audio,
    Video,
    Subtitle,
}

#[derive(Debug, Args)]
pub struct ServerConfigArgs {
    #[command(subcommand)]
    pub command: ServerConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServerConfigCommand {
    /// Show the active daemon configuration
    Get,

    /// Store a new daemon configuration
    Set {
        #[command(flatten)]
        config: JsonInput,

        /// Reload the daemon configuration after storing it
        #[arg(long)]
        reload: bool,
    },

    /// Apply the stored daemon configuration
    Reload,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServicesArgs {
    /// Path to an OBS-style services.json
    #[arg(long, short = 'f', env = "RESTREAMER_SERVICES_FILE")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List service names
    #[command(alias = "ls")]
    List {
        /// Only list common services
        #[arg(long)]
        common: bool,
    },

    /// Show the servers of one service
    Show {
        /// Service name (exact)
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Store a profile password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
