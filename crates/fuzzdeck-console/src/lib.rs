//! Fuzzdeck console layer.
//!
//! Pulls collections, single entities and metric queries from the
//! orchestrator, reshapes them into view models (summary counters, chart
//! datasets, table rows, detail panels) and performs the mutations an
//! operator can trigger. Nothing here knows about markup; presentation
//! adapters render the view models.
//!
//! Every component receives its collaborators explicitly: a
//! [`fuzzdeck_core::ports::FleetApi`] for the backend and, where outcomes are
//! reported, a [`fuzzdeck_notify::Notifier`].

pub mod cards;
pub mod detail;
pub mod format;
pub mod mutation;
pub mod pages;
pub mod stats;
pub mod table;
pub mod timeseries;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cards::{AgentBoard, AgentCard};
pub use detail::{CrashDetail, EntityDetailLoader, Hexdump, JobDetail, StopControl};
pub use mutation::{AgentDraft, JobDraft, ModalForm, MutationGateway, Outcome, Upload};
pub use pages::Console;
pub use stats::{StatsAggregator, Summary};
pub use table::{LiveTable, RenderMode, TableBinding, Transform};
pub use timeseries::{ChartData, Dataset, GraphSpec, TimeSeriesBridge};
pub use view::Panel;
