//! Crash types and the optional analysis payload.

use crate::ids::{CrashGuid, JobGuid};
use serde::{Deserialize, Serialize};

/// A recorded fuzzing finding.
///
/// `analyzed` is a JSON document encoded as a string by the backend; `None`
/// means no analysis has run yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crash {
    pub guid: CrashGuid,
    pub collection_guid: JobGuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub analyzed: Option<String>,
}

/// Body of `GET /api/crash`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashStats {
    pub total: u64,
}

/// Sub-reports the panel knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Debugger run over the crashing input.
    Gdb,
    /// ClusterFuzz-style stack triage.
    Clusterfuzz,
    /// CASR severity classification.
    Casr,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Gdb, ReportKind::Clusterfuzz, ReportKind::Casr];

    /// Key of the sub-report inside the `analyzed` document.
    pub fn key(&self) -> &'static str {
        match self {
            ReportKind::Gdb => "gdb",
            ReportKind::Clusterfuzz => "clusterfuzz",
            ReportKind::Casr => "casr",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Gdb => "GDB",
            ReportKind::Clusterfuzz => "ClusterFuzz",
            ReportKind::Casr => "CASR",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GdbReport {
    pub signal: Option<String>,
    pub backtrace: Option<String>,
    pub registers: Option<String>,
    pub disassembly: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterfuzzReport {
    pub crash_type: Option<String>,
    pub crash_address: Option<String>,
    pub crash_state: Option<String>,
    pub security_flag: Option<bool>,
    pub stacktrace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasrReport {
    pub severity: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub explanation: Option<String>,
    pub stacktrace: Option<String>,
}

/// Decoded `analyzed` document. Each sub-report is independently present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub gdb: Option<GdbReport>,
    pub clusterfuzz: Option<ClusterfuzzReport>,
    pub casr: Option<CasrReport>,
}

impl Analysis {
    /// Decode the encoded payload.
    ///
    /// Unrecognized keys are ignored and `null` sub-reports count as absent.
    /// A sub-report whose body does not have the expected shape is dropped
    /// and its key is returned in `rejected`.
    pub fn decode(encoded: &str) -> crate::Result<DecodedAnalysis> {
        let document: serde_json::Value = serde_json::from_str(encoded)?;
        let serde_json::Value::Object(map) = document else {
            // Anything but an object carries no recognizable sub-report.
            return Ok(DecodedAnalysis::default());
        };

        let mut decoded = DecodedAnalysis::default();
        for kind in ReportKind::ALL {
            let Some(body) = map.get(kind.key()).filter(|v| !v.is_null()) else {
                continue;
            };
            let ok = match kind {
                ReportKind::Gdb => serde_json::from_value(body.clone())
                    .map(|r| decoded.analysis.gdb = Some(r))
                    .is_ok(),
                ReportKind::Clusterfuzz => serde_json::from_value(body.clone())
                    .map(|r| decoded.analysis.clusterfuzz = Some(r))
                    .is_ok(),
                ReportKind::Casr => serde_json::from_value(body.clone())
                    .map(|r| decoded.analysis.casr = Some(r))
                    .is_ok(),
            };
            if !ok {
                decoded.rejected.push(kind);
            }
        }
        Ok(decoded)
    }

    pub fn has(&self, kind: ReportKind) -> bool {
        match kind {
            ReportKind::Gdb => self.gdb.is_some(),
            ReportKind::Clusterfuzz => self.clusterfuzz.is_some(),
            ReportKind::Casr => self.casr.is_some(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAnalysis {
    pub analysis: Analysis,
    pub rejected: Vec<ReportKind>,
}
