//! Single-entity detail views.
//!
//! Unlike aggregate widgets, a failed detail fetch is reported to the
//! operator through the notifier. The view itself stays `Loading`: its
//! placeholder is only removed once every field has been populated.

use crate::format::{format_bytes, format_date};
use crate::table::{LiveTable, TableBinding};
use crate::view::Panel;
use fuzzdeck_core::Error;
use fuzzdeck_core::crash::{Analysis, Crash, ReportKind};
use fuzzdeck_core::ids::{CrashGuid, JobGuid};
use fuzzdeck_core::job::{Job, JobInfo, JobStatus};
use fuzzdeck_core::ports::FleetApi;
use fuzzdeck_notify::{Notifier, Toast};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

/// One labelled value in a fixed detail layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailField {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
}

fn field(id: &'static str, label: &'static str, value: impl ToString) -> DetailField {
    DetailField {
        id,
        label,
        value: value.to_string(),
    }
}

fn optional(id: &'static str, label: &'static str, value: &Option<String>) -> DetailField {
    field(id, label, value.as_deref().unwrap_or_default())
}

/// Handle to a stoppable job.
///
/// Only [`StopControl::for_job`] creates one, and only for jobs in `init` or
/// `alive`; holding a control is what lets the gateway send the stop call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopControl {
    guid: JobGuid,
}

impl StopControl {
    pub fn for_job(guid: &JobGuid, status: JobStatus) -> Option<Self> {
        status.is_stoppable().then(|| Self { guid: guid.clone() })
    }

    pub fn guid(&self) -> &JobGuid {
        &self.guid
    }
}

#[derive(Debug, Clone)]
pub struct JobDetail {
    pub guid: JobGuid,
    pub fields: Vec<DetailField>,
    pub status: JobStatus,
    pub stop: Option<StopControl>,
    /// Expandable per-agent rows; bodies come from [`JobDetail::instance`].
    pub assigned: LiveTable,
    pub instances: Vec<Job>,
}

impl JobDetail {
    pub fn from_info(info: JobInfo) -> fuzzdeck_core::Result<Self> {
        let collection = &info.job_collection;
        let fields = vec![
            field("name", "Name", &collection.name),
            field("description", "Description", &collection.description),
            field("guid", "GUID", &collection.guid),
            field("created", "Created", format_date(&collection.creation_date)),
            field("cpus", "CPUs", collection.cpus),
            field("ram", "RAM", collection.ram),
            field("timeout", "Timeout", &collection.timeout),
            field("status", "Status", collection.status.as_str()),
        ];
        let rows = info
            .jobs
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            guid: collection.guid.clone(),
            stop: StopControl::for_job(&collection.guid, collection.status),
            status: collection.status,
            fields,
            assigned: LiveTable::from_rows(TableBinding::assigned_agents(), rows),
            instances: info.jobs,
        })
    }

    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.value.as_str())
    }

    /// Expanded body of the assigned-agent row at `index`.
    pub fn instance(&self, index: usize) -> Option<Vec<DetailField>> {
        let job = self.instances.get(index)?;
        let master = match job.master {
            Some(true) => "true",
            Some(false) => "false",
            None => "unknown",
        };
        Some(vec![
            field("collection_guid", "Collection GUID", &job.collection_guid),
            field("master", "Master", master),
            field("cpus", "CPUs", job.cpus),
            field("ram", "RAM", job.ram),
            field("last_msg", "Last message", &job.last_msg),
            field("status", "Status", job.status.as_str()),
            optional("log", "Log", &job.log),
        ])
    }
}

/// A navigation tab for one analysis sub-report.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTab {
    pub kind: ReportKind,
    pub enabled: bool,
    pub fields: Vec<DetailField>,
}

impl AnalysisTab {
    fn disabled(kind: ReportKind) -> Self {
        Self {
            kind,
            enabled: false,
            fields: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

fn report_tabs(analysis: &Analysis) -> Vec<AnalysisTab> {
    ReportKind::ALL
        .iter()
        .map(|&kind| {
            let fields = match kind {
                ReportKind::Gdb => analysis.gdb.as_ref().map(|r| {
                    vec![
                        optional("signal", "Signal", &r.signal),
                        optional("backtrace", "Backtrace", &r.backtrace),
                        optional("registers", "Registers", &r.registers),
                        optional("disassembly", "Disassembly", &r.disassembly),
                    ]
                }),
                ReportKind::Clusterfuzz => analysis.clusterfuzz.as_ref().map(|r| {
                    let security = match r.security_flag {
                        Some(true) => "yes",
                        Some(false) => "no",
                        None => "",
                    };
                    vec![
                        optional("crash_type", "Crash type", &r.crash_type),
                        optional("crash_address", "Crash address", &r.crash_address),
                        optional("crash_state", "Crash state", &r.crash_state),
                        field("security_flag", "Security issue", security),
                        optional("stacktrace", "Stacktrace", &r.stacktrace),
                    ]
                }),
                ReportKind::Casr => analysis.casr.as_ref().map(|r| {
                    vec![
                        optional("severity", "Severity", &r.severity),
                        optional("short_description", "Type", &r.short_description),
                        optional("description", "Description", &r.description),
                        optional("explanation", "Explanation", &r.explanation),
                        optional("stacktrace", "Stacktrace", &r.stacktrace),
                    ]
                }),
            };
            match fields {
                Some(fields) => AnalysisTab {
                    kind,
                    enabled: true,
                    fields,
                },
                None => AnalysisTab::disabled(kind),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrashDetail {
    pub guid: CrashGuid,
    pub fields: Vec<DetailField>,
    pub hash: String,
    pub hash_line: String,
    pub tabs: Vec<AnalysisTab>,
}

impl CrashDetail {
    /// Build the detail view. The second value is the decode error of an
    /// unreadable `analyzed` document; the view is still usable with every
    /// tab disabled.
    pub fn from_crash(crash: &Crash) -> (Self, Option<Error>) {
        let fields = vec![
            field("name", "Name", &crash.name),
            field("guid", "GUID", &crash.guid),
            field("created", "Created", format_date(&crash.creation_date)),
            field("size", "Size", format_bytes(crash.size)),
            field("collection", "Job", &crash.collection_guid),
        ];

        let (tabs, error) = match crash.analyzed.as_deref() {
            None => (ReportKind::ALL.map(AnalysisTab::disabled).to_vec(), None),
            Some(encoded) => match Analysis::decode(encoded) {
                Ok(decoded) => {
                    for kind in &decoded.rejected {
                        warn!(guid = %crash.guid, report = kind.key(), "Analysis sub-report has unexpected shape");
                    }
                    (report_tabs(&decoded.analysis), None)
                }
                Err(e) => (ReportKind::ALL.map(AnalysisTab::disabled).to_vec(), Some(e)),
            },
        };

        let detail = Self {
            guid: crash.guid.clone(),
            fields,
            hash: crash.hash.clone(),
            hash_line: format!("sha256 - {}", crash.hash),
            tabs,
        };
        (detail, error)
    }

    pub fn tab(&self, kind: ReportKind) -> Option<&AnalysisTab> {
        self.tabs.iter().find(|t| t.kind == kind)
    }

    pub fn enabled_tabs(&self) -> Vec<ReportKind> {
        self.tabs.iter().filter(|t| t.enabled).map(|t| t.kind).collect()
    }

    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.value.as_str())
    }
}

const HEXDUMP_WIDTH: usize = 16;

/// Crash input rendered as `offset  hex  |ascii|` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Hexdump {
    pub lines: Vec<String>,
    pub size: usize,
    pub sha256: String,
}

impl Hexdump {
    pub fn new(content: &[u8]) -> Self {
        let lines = content
            .chunks(HEXDUMP_WIDTH)
            .enumerate()
            .map(|(row, chunk)| {
                let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
                let ascii: String = chunk
                    .iter()
                    .map(|&b| {
                        if b.is_ascii_graphic() || b == b' ' {
                            b as char
                        } else {
                            '.'
                        }
                    })
                    .collect();
                format!(
                    "{:08x}  {:<width$}  |{}|",
                    row * HEXDUMP_WIDTH,
                    hex.join(" "),
                    ascii,
                    width = HEXDUMP_WIDTH * 3 - 1
                )
            })
            .collect();

        Self {
            lines,
            size: content.len(),
            sha256: hex::encode(Sha256::digest(content)),
        }
    }

    /// Compare against the hash the backend recorded. `None` when no hash is
    /// known.
    pub fn verify(&self, expected: &str) -> Option<bool> {
        let expected = expected.trim();
        if expected.is_empty() {
            return None;
        }
        Some(self.sha256.eq_ignore_ascii_case(expected))
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub struct EntityDetailLoader {
    api: Arc<dyn FleetApi>,
    notifier: Arc<dyn Notifier>,
}

impl EntityDetailLoader {
    pub fn new(api: Arc<dyn FleetApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    async fn report(&self, title: String, message: String) {
        if let Err(e) = self.notifier.notify(Toast::error(title, message)).await {
            warn!(error = %e, "Notification not delivered");
        }
    }

    async fn report_error(&self, error: &Error) {
        self.report(error.status_text(), error.detail()).await;
    }

    pub async fn load_job(&self, guid: &JobGuid) -> Panel<JobDetail> {
        let detail = match self.api.get_job(guid).await {
            Ok(info) => JobDetail::from_info(info),
            Err(e) => Err(e),
        };
        match detail {
            Ok(detail) => {
                debug!(guid = %guid, stoppable = detail.stop.is_some(), "Job detail loaded");
                Panel::Ready(detail)
            }
            Err(e) => {
                warn!(guid = %guid, error = %e, "Job detail failed");
                self.report_error(&e).await;
                Panel::Loading
            }
        }
    }

    /// Crash fields always populate once the crash arrives; an unreadable
    /// analysis document is reported but does not keep the view loading.
    pub async fn load_crash(&self, guid: &CrashGuid) -> Panel<CrashDetail> {
        match self.api.get_crash(guid).await {
            Ok(crash) => {
                let (detail, analysis_error) = CrashDetail::from_crash(&crash);
                if let Some(e) = analysis_error {
                    warn!(guid = %guid, error = %e, "Crash analysis unreadable");
                    self.report("Malformed analysis".to_string(), e.detail()).await;
                }
                debug!(guid = %guid, tabs = ?detail.enabled_tabs(), "Crash detail loaded");
                Panel::Ready(detail)
            }
            Err(e) => {
                warn!(guid = %guid, error = %e, "Crash detail failed");
                self.report_error(&e).await;
                Panel::Loading
            }
        }
    }

    pub async fn load_hexdump(&self, guid: &CrashGuid) -> Panel<Hexdump> {
        match self.api.crash_content(guid).await {
            Ok(content) => Panel::Ready(Hexdump::new(&content)),
            Err(e) => {
                warn!(guid = %guid, error = %e, "Crash content failed");
                self.report_error(&e).await;
                Panel::Loading
            }
        }
    }
}
