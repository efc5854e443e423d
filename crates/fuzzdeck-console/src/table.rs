//! Remote-data tables.
//!
//! A [`TableBinding`] declares where rows come from, which fields become
//! columns and how each value is rendered. Transforms take the raw JSON value
//! and a [`RenderMode`]: in `Display` mode they produce a [`Cell`] view model,
//! in every other mode they hand back the raw value so sorting and searching
//! work on the underlying data rather than on what is shown.

use crate::format::{escape_html, format_bytes, format_date, parse_timestamp};
use crate::view::Panel;
use fuzzdeck_core::ApiPath;
use fuzzdeck_core::ids::JobGuid;
use fuzzdeck_core::ports::FleetApi;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Display,
    Sort,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    Primary,
    Success,
    Danger,
    Secondary,
}

impl BadgeStyle {
    pub fn class(&self) -> &'static str {
        match self {
            BadgeStyle::Primary => "badge-primary",
            BadgeStyle::Success => "badge-success",
            BadgeStyle::Danger => "badge-danger",
            BadgeStyle::Secondary => "badge-secondary",
        }
    }
}

/// Which closed status enum a badge column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFamily {
    Job,
    Agent,
}

/// Badge style for a status string. Unmapped values get `Secondary`.
pub fn status_badge(family: StatusFamily, status: &str) -> BadgeStyle {
    match (family, status) {
        (StatusFamily::Job, "init" | "alive") => BadgeStyle::Primary,
        (StatusFamily::Job, "completed") => BadgeStyle::Success,
        (StatusFamily::Job, "error") => BadgeStyle::Danger,
        (StatusFamily::Agent, "up") => BadgeStyle::Primary,
        _ => BadgeStyle::Secondary,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Linux,
    Windows,
    Unknown,
}

impl Icon {
    pub fn for_agent_type(agent_type: &str) -> Self {
        match agent_type {
            "linux" => Icon::Linux,
            "windows" => Icon::Windows,
            _ => Icon::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Icon::Linux => "linux",
            Icon::Windows => "windows",
            Icon::Unknown => "unknown",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Icon::Linux => "fab fa-linux",
            Icon::Windows => "fab fa-windows",
            Icon::Unknown => "fas fa-question",
        }
    }
}

/// A rendered table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Underlying value, produced outside display mode.
    Raw(Value),
    /// Plain text; presentation escapes it.
    Text(String),
    Badge { style: BadgeStyle, text: String },
    IconText { icon: Icon, text: String },
}

impl Cell {
    /// Text content without decoration.
    pub fn text(&self) -> String {
        match self {
            Cell::Raw(value) => value_text(value),
            Cell::Text(text) | Cell::Badge { text, .. } | Cell::IconText { text, .. } => {
                text.clone()
            }
        }
    }

    /// Markup for HTML front ends. Text is always escaped.
    pub fn to_html(&self) -> String {
        match self {
            Cell::Raw(value) => escape_html(&value_text(value)),
            Cell::Text(text) => escape_html(text),
            Cell::Badge { style, text } => format!(
                r#"<span class="badge {}">{}</span>"#,
                style.class(),
                escape_html(text)
            ),
            Cell::IconText { icon, text } => {
                format!(r#"<i class="{}"></i> {}"#, icon.class(), escape_html(text))
            }
        }
    }
}

/// String form of a JSON value; `null` becomes empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Value as is.
    Plain,
    /// Escaped text.
    Text,
    /// Secondary badge, used for resource amounts.
    Badge,
    StatusBadge(StatusFamily),
    AgentType,
    /// `null -> "no"`, anything else `"yes"`.
    PresenceFlag,
    Date,
    Bytes,
}

impl Transform {
    pub fn render(&self, raw: &Value, mode: RenderMode) -> Cell {
        if mode != RenderMode::Display {
            return Cell::Raw(raw.clone());
        }
        let text = value_text(raw);
        match self {
            Transform::Plain => Cell::Raw(raw.clone()),
            Transform::Text => Cell::Text(text),
            Transform::Badge => Cell::Badge {
                style: BadgeStyle::Secondary,
                text,
            },
            Transform::StatusBadge(family) => Cell::Badge {
                style: status_badge(*family, &text),
                text,
            },
            Transform::AgentType => Cell::IconText {
                icon: Icon::for_agent_type(&text),
                text,
            },
            Transform::PresenceFlag => {
                Cell::Text(if raw.is_null() { "no" } else { "yes" }.to_string())
            }
            Transform::Date => Cell::Text(format_date(&text)),
            Transform::Bytes => match raw.as_u64() {
                Some(bytes) => Cell::Text(format_bytes(bytes)),
                None => Cell::Text(text),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub field: &'static str,
    pub title: &'static str,
    pub transform: Transform,
    pub centered: bool,
}

impl Column {
    pub fn new(field: &'static str, title: &'static str, transform: Transform) -> Self {
        Self {
            field,
            title,
            transform,
            centered: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    fn raw<'a>(&self, row: &'a Value) -> &'a Value {
        row.get(self.field).unwrap_or(&Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: "creation_date",
            direction: SortDirection::Desc,
        }
    }
}

/// What clicking a row does.
#[derive(Debug, Clone, PartialEq)]
pub enum RowAction {
    /// Go to `{prefix}{row.guid}`.
    Navigate { prefix: String },
    /// Toggle the row's nested body.
    Expand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Remote(ApiPath),
    /// Rows supplied by the owning view.
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBinding {
    pub id: &'static str,
    pub source: TableSource,
    pub columns: Vec<Column>,
    pub order: SortOrder,
    pub row_action: RowAction,
    pub id_field: &'static str,
}

impl TableBinding {
    pub fn remote(id: &'static str, source: ApiPath, columns: Vec<Column>) -> Self {
        Self {
            id,
            source: TableSource::Remote(source),
            columns,
            order: SortOrder::default(),
            row_action: RowAction::Expand,
            id_field: "guid",
        }
    }

    pub fn navigate_to(mut self, prefix: impl Into<String>) -> Self {
        self.row_action = RowAction::Navigate {
            prefix: prefix.into(),
        };
        self
    }

    pub fn ordered_by(mut self, field: &'static str, direction: SortDirection) -> Self {
        self.order = SortOrder { field, direction };
        self
    }

    /// Job collections list.
    pub fn jobs() -> Self {
        Self::remote(
            "jobs-table",
            ApiPath::api("jobs"),
            vec![
                Column::new("guid", "GUID", Transform::Plain),
                Column::new("name", "Name", Transform::Text),
                Column::new("description", "Description", Transform::Text),
                Column::new("creation_date", "Created", Transform::Plain),
                Column::new("agent_type", "Agent type", Transform::AgentType).centered(),
                Column::new("cpus", "CPUs", Transform::Badge).centered(),
                Column::new("ram", "RAM", Transform::Badge).centered(),
                Column::new("timeout", "Timeout", Transform::Text).centered(),
                Column::new("status", "Status", Transform::StatusBadge(StatusFamily::Job))
                    .centered(),
            ],
        )
        .navigate_to("/job/")
    }

    /// All crashes.
    pub fn crashes() -> Self {
        Self::remote(
            "crashes-table",
            ApiPath::api("crashes"),
            vec![
                Column::new("guid", "GUID", Transform::Plain),
                Column::new("collection_guid", "Job", Transform::Text),
                Column::new("creation_date", "Created", Transform::Date),
                Column::new("name", "Name", Transform::Text),
                Column::new("size", "Size", Transform::Bytes).centered(),
                Column::new("analyzed", "Analyzed", Transform::PresenceFlag),
            ],
        )
        .navigate_to("/crash/")
    }

    /// Crashes found by one job.
    pub fn job_crashes(guid: &JobGuid) -> Self {
        Self::remote(
            "crash-table",
            ApiPath::api("job").join(guid).join("crashes"),
            vec![
                Column::new("guid", "GUID", Transform::Plain),
                Column::new("name", "Name", Transform::Text),
                Column::new("analyzed", "Analyzed", Transform::PresenceFlag),
            ],
        )
        .navigate_to("/crash/")
    }

    /// Per-agent job instances on a job page; rows expand in place.
    pub fn assigned_agents() -> Self {
        Self {
            id: "assigned-agents",
            source: TableSource::Local,
            columns: vec![Column::new("agent_guid", "Agent", Transform::Plain).centered()],
            order: SortOrder {
                field: "idx",
                direction: SortDirection::Asc,
            },
            row_action: RowAction::Expand,
            id_field: "agent_guid",
        }
    }
}

/// Row as shown: `index` points back into the fetched rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub index: usize,
    pub id: Option<String>,
    pub cells: Vec<Cell>,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowClick {
    Navigate(String),
    Toggled { expanded: bool },
    Ignored,
}

/// Rows of one binding plus local interaction state.
#[derive(Debug, Clone)]
pub struct LiveTable {
    binding: TableBinding,
    rows: Vec<Value>,
    search: String,
    expanded: HashSet<usize>,
}

impl LiveTable {
    pub fn from_rows(binding: TableBinding, rows: Vec<Value>) -> Self {
        Self {
            binding,
            rows,
            search: String::new(),
            expanded: HashSet::new(),
        }
    }

    /// Fetch the binding's rows. A failed fetch leaves the table loading.
    pub async fn load(api: &dyn FleetApi, binding: TableBinding) -> Panel<LiveTable> {
        let TableSource::Remote(source) = &binding.source else {
            return Panel::Ready(Self::from_rows(binding, Vec::new()));
        };
        match api.fetch_rows(source).await {
            Ok(rows) => {
                debug!(table = binding.id, rows = rows.len(), "Table rows received");
                Panel::Ready(Self::from_rows(binding, rows))
            }
            Err(e) => {
                warn!(table = binding.id, error = %e, "Table rows unavailable");
                Panel::Loading
            }
        }
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Value> {
        self.rows.get(index)
    }

    pub fn titles(&self) -> Vec<&'static str> {
        self.binding.columns.iter().map(|c| c.title).collect()
    }

    pub fn search(&mut self, query: &str) {
        self.search = query.trim().to_lowercase();
    }

    fn matches(&self, row: &Value) -> bool {
        if self.search.is_empty() {
            return true;
        }
        self.binding.columns.iter().any(|column| {
            let cell = column.transform.render(column.raw(row), RenderMode::Filter);
            cell.text().to_lowercase().contains(&self.search)
        })
    }

    /// Visible rows: searched, then sorted by the binding's order.
    pub fn view(&self) -> Vec<RenderedRow> {
        let order = &self.binding.order;
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.matches(&self.rows[i]))
            .collect();
        indices.sort_by(|&a, &b| {
            let left = self.rows[a].get(order.field).unwrap_or(&Value::Null);
            let right = self.rows[b].get(order.field).unwrap_or(&Value::Null);
            let ord = compare_values(left, right);
            match order.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        indices
            .into_iter()
            .map(|index| {
                let row = &self.rows[index];
                RenderedRow {
                    index,
                    id: row.get(self.binding.id_field).map(value_text),
                    cells: self
                        .binding
                        .columns
                        .iter()
                        .map(|c| c.transform.render(c.raw(row), RenderMode::Display))
                        .collect(),
                    expanded: self.expanded.contains(&index),
                }
            })
            .collect()
    }

    /// Handle a click anywhere on the row at `index`.
    pub fn click(&mut self, index: usize) -> RowClick {
        let Some(row) = self.rows.get(index) else {
            return RowClick::Ignored;
        };
        match &self.binding.row_action {
            RowAction::Expand => {
                let expanded = if self.expanded.remove(&index) {
                    false
                } else {
                    self.expanded.insert(index);
                    true
                };
                RowClick::Toggled { expanded }
            }
            RowAction::Navigate { prefix } => match row.get(self.binding.id_field) {
                Some(id) if !id.is_null() => {
                    RowClick::Navigate(format!("{}{}", prefix, value_text(id)))
                }
                _ => RowClick::Ignored,
            },
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: nulls first, numbers numerically, mixed
/// types by kind. Strings that parse as timestamps compare by instant and
/// sort before other strings, which compare lexically.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(l), Some(r)) => l.cmp(&r),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| x.cmp(y))
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFleet, fixtures};
    use fuzzdeck_core::job::JobStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_badge_is_total() {
        assert_eq!(status_badge(StatusFamily::Job, "init"), BadgeStyle::Primary);
        assert_eq!(status_badge(StatusFamily::Job, "alive"), BadgeStyle::Primary);
        assert_eq!(status_badge(StatusFamily::Job, "completed"), BadgeStyle::Success);
        assert_eq!(status_badge(StatusFamily::Job, "error"), BadgeStyle::Danger);
        assert_eq!(status_badge(StatusFamily::Agent, "up"), BadgeStyle::Primary);
        assert_eq!(status_badge(StatusFamily::Agent, "down"), BadgeStyle::Secondary);
        for odd in ["", "ALIVE", "paused", "<script>", "up"] {
            assert_eq!(status_badge(StatusFamily::Job, odd), BadgeStyle::Secondary);
        }
    }

    #[test]
    fn test_status_badge_on_non_string_values() {
        let transform = Transform::StatusBadge(StatusFamily::Job);
        for raw in [json!(null), json!(3), json!({"a": 1}), json!([1])] {
            match transform.render(&raw, RenderMode::Display) {
                Cell::Badge { style, .. } => assert_eq!(style, BadgeStyle::Secondary),
                other => panic!("expected badge, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_presence_flag() {
        let flag = |raw: Value| Transform::PresenceFlag.render(&raw, RenderMode::Display).text();
        assert_eq!(flag(json!(null)), "no");
        assert_eq!(flag(json!(0)), "yes");
        assert_eq!(flag(json!(false)), "yes");
        assert_eq!(flag(json!("")), "yes");
        assert_eq!(flag(json!("{\"gdb\":null}")), "yes");
    }

    #[test]
    fn test_non_display_modes_return_raw_value() {
        let raw = json!("completed");
        for transform in [
            Transform::Text,
            Transform::StatusBadge(StatusFamily::Job),
            Transform::PresenceFlag,
            Transform::AgentType,
        ] {
            assert_eq!(transform.render(&raw, RenderMode::Sort), Cell::Raw(raw.clone()));
            assert_eq!(transform.render(&raw, RenderMode::Filter), Cell::Raw(raw.clone()));
        }
    }

    #[test]
    fn test_bytes_transform() {
        let cell = Transform::Bytes.render(&json!(1536), RenderMode::Display);
        assert_eq!(cell, Cell::Text("1.5 KB".to_string()));
        let odd = Transform::Bytes.render(&json!("n/a"), RenderMode::Display);
        assert_eq!(odd, Cell::Text("n/a".to_string()));
        assert_eq!(
            Transform::Bytes.render(&json!(1536), RenderMode::Sort),
            Cell::Raw(json!(1536))
        );
    }

    #[test]
    fn test_html_is_escaped() {
        let cell = Transform::Text.render(&json!("<b>x</b>"), RenderMode::Display);
        assert_eq!(cell.to_html(), "&lt;b&gt;x&lt;/b&gt;");

        let badge = Transform::StatusBadge(StatusFamily::Job).render(&json!("error"), RenderMode::Display);
        assert_eq!(badge.to_html(), r#"<span class="badge badge-danger">error</span>"#);

        let icon = Transform::AgentType.render(&json!("windows"), RenderMode::Display);
        assert_eq!(icon.to_html(), r#"<i class="fab fa-windows"></i> windows"#);
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let rows = vec![
            json!({"guid": "old", "creation_date": "2023-01-01 00:00:00"}),
            json!({"guid": "new", "creation_date": "2023-03-01 00:00:00"}),
            json!({"guid": "mid", "creation_date": "2023-02-01 00:00:00"}),
        ];
        let table = LiveTable::from_rows(TableBinding::jobs(), rows);
        let ids: Vec<_> = table.view().into_iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_dates_sort_by_instant_not_text() {
        let rows = vec![
            json!({"guid": "whole", "creation_date": "2023-04-01T10:00:00Z"}),
            json!({"guid": "half", "creation_date": "2023-04-01T10:00:00.5Z"}),
            json!({"guid": "east", "creation_date": "2023-04-01T11:30:00+02:00"}),
            json!({"guid": "sqlite", "creation_date": "2023-04-01 09:45:00"}),
        ];
        let table = LiveTable::from_rows(TableBinding::jobs(), rows);
        let ids: Vec<_> = table.view().into_iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec!["half", "whole", "sqlite", "east"]);
    }

    #[test]
    fn test_sort_uses_raw_numbers_not_rendered_text() {
        let binding = TableBinding::jobs().ordered_by("cpus", SortDirection::Asc);
        let rows = vec![
            json!({"guid": "a", "cpus": 16}),
            json!({"guid": "b", "cpus": 2}),
            json!({"guid": "c", "cpus": null}),
        ];
        let table = LiveTable::from_rows(binding, rows);
        let ids: Vec<_> = table.view().into_iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_search_matches_underlying_values() {
        let rows = vec![
            json!({"guid": "j1", "name": "libpng", "status": "alive", "creation_date": "1"}),
            json!({"guid": "j2", "name": "openssl", "status": "error", "creation_date": "2"}),
        ];
        let mut table = LiveTable::from_rows(TableBinding::jobs(), rows);

        table.search("  LIBPNG ");
        let ids: Vec<_> = table.view().into_iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec!["j1"]);

        table.search("badge");
        assert!(table.view().is_empty());

        table.search("");
        assert_eq!(table.view().len(), 2);
    }

    #[test]
    fn test_row_click_navigates_by_guid() {
        let rows = vec![json!({"guid": "c1", "name": "crash", "analyzed": null})];
        let mut table = LiveTable::from_rows(TableBinding::crashes(), rows);
        assert_eq!(table.click(0), RowClick::Navigate("/crash/c1".to_string()));
        assert_eq!(table.click(7), RowClick::Ignored);
    }

    #[test]
    fn test_expandable_rows_toggle_instead_of_navigating() {
        let rows = vec![
            serde_json::to_value(fixtures::job("a1", "j1", 0)).unwrap(),
            serde_json::to_value(fixtures::job("a2", "j1", 1)).unwrap(),
        ];
        let mut table = LiveTable::from_rows(TableBinding::assigned_agents(), rows);

        assert_eq!(table.click(1), RowClick::Toggled { expanded: true });
        let view = table.view();
        assert_eq!(view[0].id.as_deref(), Some("a1"));
        assert!(!view[0].expanded);
        assert!(view[1].expanded);

        assert_eq!(table.click(1), RowClick::Toggled { expanded: false });
        assert!(table.view().iter().all(|r| !r.expanded));
    }

    #[tokio::test]
    async fn test_load_from_backend() {
        let fleet = FakeFleet::new().with_jobs(vec![
            fixtures::job_collection("j1", JobStatus::Alive, "2023-01-01 00:00:00"),
            fixtures::job_collection("j2", JobStatus::Completed, "2023-02-01 00:00:00"),
        ]);
        let panel = LiveTable::load(&fleet, TableBinding::jobs()).await;
        let table = panel.ready().expect("table loaded");

        let view = table.view();
        assert_eq!(view[0].id.as_deref(), Some("j2"));
        assert_eq!(
            view[1].cells[8],
            Cell::Badge {
                style: BadgeStyle::Primary,
                text: "alive".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_load_stays_loading() {
        let fleet = FakeFleet::new().fail("GET /api/crashes");
        let panel = LiveTable::load(&fleet, TableBinding::crashes()).await;
        assert!(panel.is_loading());
    }
}
