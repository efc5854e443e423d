//! Command handlers.

use crate::config::{CliConfig, OutputFormat};
use crate::output::{
    ConsoleNotifier, PromptConfirmer, print_field, print_table, print_unavailable, with_spinner,
};
use anyhow::{Context, bail};
use console::style;
use fuzzdeck_client::HttpFleetClient;
use fuzzdeck_console::detail::DetailField;
use fuzzdeck_console::timeseries::Graph;
use fuzzdeck_console::{
    AgentBoard, AgentDraft, Console, JobDraft, LiveTable, ModalForm, Outcome, Panel, TableBinding,
    Upload,
};
use fuzzdeck_core::agent::AgentType;
use fuzzdeck_core::ids::{AgentGuid, CrashGuid, JobGuid};
use fuzzdeck_notify::{Confirmer, Notifier, ScriptedConfirmer, TracingNotifier};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn connect(config: &CliConfig, confirmer: Arc<dyn Confirmer>) -> anyhow::Result<Console> {
    debug!(api_url = %config.api_url, log_toasts = config.log_toasts, "Connecting");
    let client = HttpFleetClient::new(&config.client())
        .with_context(|| format!("connecting to {}", config.api_url))?;
    let notifier: Arc<dyn Notifier> = if config.log_toasts {
        Arc::new(TracingNotifier)
    } else {
        Arc::new(ConsoleNotifier)
    };
    Ok(Console::new(Arc::new(client), notifier, confirmer))
}

fn console(config: &CliConfig) -> anyhow::Result<Console> {
    connect(config, Arc::new(PromptConfirmer))
}

fn emit<T: Serialize>(format: OutputFormat, value: &T) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value)?);
            Ok(true)
        }
    }
}

fn outcome(command: &str, outcome: Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Succeeded => {
            info!(command, "Command succeeded");
            Ok(())
        }
        Outcome::Dismissed => {
            info!(command, "Command cancelled");
            println!("{} Cancelled", style("!").yellow());
            Ok(())
        }
        Outcome::Failed => {
            warn!(command, "Command failed");
            bail!("{} was rejected", command)
        }
    }
}

fn print_fields(fields: &[DetailField]) {
    for field in fields {
        print_field(field.label, &field.value);
    }
}

fn print_graphs(graphs: &[Graph]) {
    for graph in graphs {
        let Some(chart) = &graph.chart else {
            println!("{} {} no data", style("!").yellow(), graph.id);
            continue;
        };
        println!("{}", style(&graph.id).bold());
        for dataset in &chart.datasets {
            let last = dataset
                .data
                .last()
                .map(|s| s.value.as_str())
                .unwrap_or("-");
            println!(
                "  {:<40} {:>12}  {} samples",
                dataset.label.as_deref().unwrap_or("(unlabelled)"),
                last,
                dataset.data.len()
            );
        }
    }
}

/// Rows as fetched, in display order, for machine-readable output.
fn raw_rows(table: &LiveTable) -> Vec<serde_json::Value> {
    table
        .view()
        .iter()
        .filter_map(|r| table.row(r.index).cloned())
        .collect()
}

fn show_table(
    config: &CliConfig,
    panel: Panel<LiveTable>,
    what: &str,
    search: Option<String>,
) -> anyhow::Result<()> {
    if print_unavailable(what, &panel) {
        return Ok(());
    }
    let Some(mut table) = panel.into_ready() else {
        return Ok(());
    };
    if let Some(query) = search {
        table.search(&query);
    }
    if !emit(config.output_format, &raw_rows(&table))? {
        print_table(&table);
    }
    Ok(())
}

/// Fleet counters.
pub async fn summary(config: &CliConfig) -> anyhow::Result<()> {
    let console = console(config)?;
    let summary = with_spinner("Loading summary", console.stats().load()).await;
    let widgets = summary.widgets();

    let values: serde_json::Map<String, serde_json::Value> = widgets
        .iter()
        .map(|w| (w.id.to_string(), w.value.ready().copied().into()))
        .collect();
    if emit(config.output_format, &values)? {
        return Ok(());
    }

    for widget in &widgets {
        let value = match widget.value.ready() {
            Some(v) => v.to_string(),
            None => style("…").dim().to_string(),
        };
        print_field(widget.label, &value);
    }
    Ok(())
}

/// Metric graphs.
pub async fn graphs(config: &CliConfig, job: Option<String>) -> anyhow::Result<()> {
    let console = console(config)?;
    let specs = match &job {
        Some(guid) => fuzzdeck_console::GraphSpec::for_job(&JobGuid::new(guid.as_str())),
        None => fuzzdeck_console::GraphSpec::dashboard(),
    };
    let graphs = with_spinner("Querying metrics", console.graphs().render_all(&specs)).await;
    print_graphs(&graphs);
    Ok(())
}

/// List agents.
pub async fn list_agents(config: &CliConfig, search: Option<String>) -> anyhow::Result<()> {
    let console = console(config)?;
    let panel = with_spinner("Loading agents", AgentBoard::load(console.api())).await;
    if print_unavailable("Agents", &panel) {
        return Ok(());
    }
    let Some(mut board) = panel.into_ready() else {
        return Ok(());
    };
    if let Some(query) = search {
        board.search(&query);
    }

    let visible = board.visible();
    if visible.is_empty() {
        println!("{} No agents registered", style("i").blue());
    }
    for card in visible {
        let title = match card.style {
            fuzzdeck_console::table::BadgeStyle::Primary => style(&card.title).blue().bold(),
            _ => style(&card.title).dim().bold(),
        };
        println!("[{}] {}", card.icon.label(), title);
        print_field("GUID", card.guid.as_str());
        print_field("Endpoint", &card.endpoint);
        print_field("CPUs", &card.cpus);
        print_field("RAM", &card.ram);
    }
    Ok(())
}

/// Register an agent.
pub async fn create_agent(
    config: &CliConfig,
    description: String,
    agent_type: &str,
    endpoint: String,
) -> anyhow::Result<()> {
    let console = console(config)?;
    let mut form = ModalForm::open(AgentDraft {
        description,
        agent_type: agent_type.parse::<AgentType>()?,
        endpoint,
    });
    outcome("agent create", console.gateway().create_agent(&mut form).await)
}

/// Delete an agent after confirmation.
pub async fn delete_agent(config: &CliConfig, guid: &str, yes: bool) -> anyhow::Result<()> {
    let confirmer: Arc<dyn Confirmer> = if yes {
        Arc::new(ScriptedConfirmer::accepting())
    } else {
        Arc::new(PromptConfirmer)
    };
    let console = connect(config, confirmer)?;
    let mut board = AgentBoard::load(console.api())
        .await
        .into_ready()
        .unwrap_or_default();
    outcome(
        "agent delete",
        console
            .gateway()
            .delete_agent(&AgentGuid::new(guid), &mut board)
            .await,
    )
}

/// List jobs.
pub async fn list_jobs(config: &CliConfig, search: Option<String>) -> anyhow::Result<()> {
    let console = console(config)?;
    let panel = with_spinner("Loading jobs", console.jobs()).await.table;
    show_table(config, panel, "Jobs", search)
}

/// Show one job.
pub async fn show_job(config: &CliConfig, guid: &str) -> anyhow::Result<()> {
    let console = console(config)?;
    let page = with_spinner("Loading job", console.job(&JobGuid::new(guid))).await;

    if !print_unavailable("Job", &page.detail) {
        if let Some(detail) = page.detail.ready() {
            println!("{}", style("Job").bold());
            print_fields(&detail.fields);
            if detail.stop.is_some() {
                println!("  {}", style(format!("stop with: fuzzdeck jobs stop {}", guid)).dim());
            }
            println!("{}", style("Assigned agents").bold());
            for row in detail.assigned.view() {
                println!("  {}", row.id.as_deref().unwrap_or("-"));
                if let Some(body) = detail.instance(row.index) {
                    for field in body {
                        println!("    {:<16} {}", style(field.label).dim(), field.value);
                    }
                }
            }
        }
    }

    println!("{}", style("Crashes").bold());
    show_table(config, page.crashes, "Crashes", None)?;
    print_graphs(&page.graphs);
    Ok(())
}

/// Stop a job. Only jobs that are still running offer the control.
pub async fn stop_job(config: &CliConfig, guid: &str) -> anyhow::Result<()> {
    let console = console(config)?;
    let panel = console.details().load_job(&JobGuid::new(guid)).await;
    let Some(detail) = panel.into_ready() else {
        bail!("job {} could not be loaded", guid);
    };
    match &detail.stop {
        Some(control) => outcome("job stop", console.gateway().stop_job(control).await),
        None => {
            println!(
                "{} Job {} is {}; nothing to stop",
                style("i").blue(),
                guid,
                detail.status.as_str()
            );
            Ok(())
        }
    }
}

/// Arguments of `jobs create`.
pub struct JobArgs {
    pub name: String,
    pub description: String,
    pub agent_type: String,
    pub image: String,
    pub cpus: String,
    pub ram: String,
    pub timeout: String,
    pub target: Option<PathBuf>,
    pub corpus: Option<PathBuf>,
    pub crash_auto_analyze: bool,
}

async fn read_upload(path: Option<&Path>) -> anyhow::Result<Option<Upload>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Some(Upload::new(file_name, content)))
}

/// Create a job.
pub async fn create_job(config: &CliConfig, args: JobArgs) -> anyhow::Result<()> {
    let console = console(config)?;
    let draft = JobDraft {
        name: args.name,
        description: args.description,
        agent_type: args.agent_type.parse::<AgentType>()?,
        image: args.image,
        cpus: args.cpus,
        ram: args.ram,
        timeout: args.timeout,
        target: read_upload(args.target.as_deref()).await?,
        corpus: read_upload(args.corpus.as_deref()).await?,
        crash_auto_analyze: args.crash_auto_analyze,
    };
    let mut form = ModalForm::open(draft);
    outcome(
        "job create",
        with_spinner("Submitting job", console.gateway().create_job(&mut form)).await,
    )
}

/// List crashes, optionally of one job.
pub async fn list_crashes(
    config: &CliConfig,
    job: Option<String>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let console = console(config)?;
    let binding = match &job {
        Some(guid) => TableBinding::job_crashes(&JobGuid::new(guid.as_str())),
        None => TableBinding::crashes(),
    };
    let panel = with_spinner("Loading crashes", LiveTable::load(console.api(), binding)).await;
    show_table(config, panel, "Crashes", search)
}

/// Show one crash.
pub async fn show_crash(config: &CliConfig, guid: &str) -> anyhow::Result<()> {
    let console = console(config)?;
    let page = with_spinner("Loading crash", console.crash(&CrashGuid::new(guid))).await;
    if print_unavailable("Crash", &page.detail) {
        return Ok(());
    }
    let Some(detail) = page.detail.ready() else {
        return Ok(());
    };

    println!("{}", style("Crash").bold());
    print_fields(&detail.fields);
    println!("  {}", style(&detail.hash_line).dim());
    match page.integrity() {
        Some(true) => println!("  {} content matches hash", style("✓").green()),
        Some(false) => println!("  {} content does not match hash", style("✗").red()),
        None => {}
    }

    for tab in &detail.tabs {
        if !tab.enabled {
            println!("{} {}", style(tab.title()).dim(), style("(no report)").dim());
            continue;
        }
        println!("{}", style(tab.title()).bold());
        print_fields(&tab.fields);
    }
    Ok(())
}

/// Hexdump a crash input.
pub async fn dump_crash(config: &CliConfig, guid: &str) -> anyhow::Result<()> {
    let console = console(config)?;
    let panel = console.details().load_hexdump(&CrashGuid::new(guid)).await;
    if let Some(dump) = panel.ready() {
        println!("{}", dump.text());
        eprintln!("{}", style(format!("sha256 - {}", dump.sha256)).dim());
    }
    Ok(())
}

/// Show configuration.
pub fn show_config(config: &CliConfig) -> anyhow::Result<()> {
    println!("Current configuration:");
    println!("  api_url: {}", config.api_url);
    println!(
        "  timeout_secs: {}",
        config
            .timeout_secs
            .map(|t| t.to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  output_format: {:?}", config.output_format);

    if let Ok(path) = CliConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }

    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = CliConfig::load().unwrap_or_default();
    config.set(key, value).map_err(anyhow::Error::msg)?;
    config.save()?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
