//! Fuzzdeck CLI entrypoint.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;
mod output;

use commands::{AgentCommands, Commands, ConfigCommands, CrashCommands, JobCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "fuzzdeck")]
#[command(author, version, about = "Fuzzing fleet control panel", long_about = None)]
struct Cli {
    /// Orchestrator URL, overrides the config file
    #[arg(long, global = true, env = "FUZZDECK_API_URL")]
    api_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,fuzzdeck=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = CliConfig::load().unwrap_or_default();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    config.log_toasts = cli.json_logs;

    match cli.command {
        Commands::Summary => handlers::summary(&config).await?,
        Commands::Graphs { job } => handlers::graphs(&config, job).await?,
        Commands::Agents { command } => match command {
            AgentCommands::List { search } => handlers::list_agents(&config, search).await?,
            AgentCommands::Create {
                description,
                agent_type,
                endpoint,
            } => handlers::create_agent(&config, description, &agent_type, endpoint).await?,
            AgentCommands::Delete { guid, yes } => {
                handlers::delete_agent(&config, &guid, yes).await?
            }
        },
        Commands::Jobs { command } => match command {
            JobCommands::List { search } => handlers::list_jobs(&config, search).await?,
            JobCommands::Show { guid } => handlers::show_job(&config, &guid).await?,
            JobCommands::Stop { guid } => handlers::stop_job(&config, &guid).await?,
            JobCommands::Create {
                name,
                description,
                agent_type,
                image,
                cpus,
                ram,
                timeout,
                target,
                corpus,
                crash_auto_analyze,
            } => {
                let draft = handlers::JobArgs {
                    name,
                    description,
                    agent_type,
                    image,
                    cpus,
                    ram,
                    timeout,
                    target,
                    corpus,
                    crash_auto_analyze,
                };
                handlers::create_job(&config, draft).await?
            }
        },
        Commands::Crashes { command } => match command {
            CrashCommands::List { job, search } => {
                handlers::list_crashes(&config, job, search).await?
            }
            CrashCommands::Show { guid } => handlers::show_crash(&config, &guid).await?,
            CrashCommands::Dump { guid } => handlers::dump_crash(&config, &guid).await?,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
