//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Show fleet counters
    Summary,

    /// Render metric graphs
    Graphs {
        /// Job GUID; global graphs when omitted
        #[arg(short, long)]
        job: Option<String>,
    },

    /// Manage agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Manage jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Inspect crashes
    Crashes {
        #[command(subcommand)]
        command: CrashCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List agents
    List {
        /// Only agents whose description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Register an agent
    Create {
        /// Agent description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Agent type (linux, windows)
        #[arg(short = 't', long = "type", default_value = "linux")]
        agent_type: String,

        /// Agent endpoint (host:port)
        endpoint: String,
    },

    /// Delete an agent
    Delete {
        /// Agent GUID
        guid: String,

        /// Accept the confirmation dialog without prompting
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum JobCommands {
    /// List jobs
    List {
        /// Case-insensitive search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a job with its agents, crashes and graphs
    Show {
        /// Job GUID
        guid: String,
    },

    /// Stop a running job
    Stop {
        /// Job GUID
        guid: String,
    },

    /// Create a job
    Create {
        #[arg(short, long, default_value = "")]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Agent type (linux, windows)
        #[arg(short = 't', long = "type", default_value = "linux")]
        agent_type: String,

        /// Container image, linux agents only
        #[arg(short, long, default_value = "")]
        image: String,

        #[arg(long, default_value = "")]
        cpus: String,

        #[arg(long, default_value = "")]
        ram: String,

        #[arg(long, default_value = "")]
        timeout: String,

        /// Target archive
        #[arg(long)]
        target: Option<PathBuf>,

        /// Corpus archive
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Analyze crashes as they are found
        #[arg(long)]
        crash_auto_analyze: bool,
    },
}

#[derive(Subcommand)]
pub enum CrashCommands {
    /// List crashes
    List {
        /// Only crashes of this job
        #[arg(short, long)]
        job: Option<String>,

        /// Case-insensitive search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a crash with its analysis
    Show {
        /// Crash GUID
        guid: String,
    },

    /// Hexdump the crashing input
    Dump {
        /// Crash GUID
        guid: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
