//! Terminal presentation of console view models.

use async_trait::async_trait;
use console::{StyledObject, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use fuzzdeck_console::table::{BadgeStyle, Cell};
use fuzzdeck_console::{LiveTable, Panel};
use fuzzdeck_notify::{ConfirmDialog, Confirmer, DialogButton, Notifier, NotifyError, Toast, ToastLevel};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Prints toasts to stderr as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, toast: Toast) -> Result<(), NotifyError> {
        let mark = match toast.level {
            ToastLevel::Success => style("✓").green(),
            ToastLevel::Error => style("✗").red(),
        };
        eprintln!("{} {} {}", mark, style(&toast.title).bold(), toast.message);
        Ok(())
    }
}

/// Two-button prompt; `Ok` is preselected.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConfirmer;

#[async_trait]
impl Confirmer for PromptConfirmer {
    async fn confirm(&self, dialog: &ConfirmDialog) -> Result<DialogButton, NotifyError> {
        let dialog = dialog.clone();
        let picked = tokio::task::spawn_blocking(move || {
            let labels: Vec<&str> = dialog.buttons.iter().map(|b| b.label()).collect();
            let focused = dialog
                .buttons
                .iter()
                .position(|b| *b == dialog.focused())
                .unwrap_or(0);
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("{}: {}", dialog.title, dialog.message))
                .items(&labels)
                .default(focused)
                .interact_opt()
                .map(|choice| choice.map(|idx| dialog.buttons[idx]))
        })
        .await
        .map_err(|e| NotifyError::Dialog(e.to_string()))?
        .map_err(|e| NotifyError::Dialog(e.to_string()))?;

        // Escape closes the dialog.
        Ok(picked.unwrap_or(DialogButton::Close))
    }
}

/// Run `fut` behind a spinner.
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

fn styled_badge(style_class: BadgeStyle, text: String) -> StyledObject<String> {
    match style_class {
        BadgeStyle::Primary => style(text).blue(),
        BadgeStyle::Success => style(text).green(),
        BadgeStyle::Danger => style(text).red(),
        BadgeStyle::Secondary => style(text).dim(),
    }
}

fn paint(cell: &Cell, width: usize) -> String {
    let text = format!("{:<width$}", cell.text(), width = width);
    match cell {
        Cell::Badge { style: s, .. } => styled_badge(*s, text).to_string(),
        _ => text,
    }
}

/// Print the visible rows of a table with aligned columns.
pub fn print_table(table: &LiveTable) {
    let rows = table.view();
    let titles = table.titles();
    let widths: Vec<usize> = titles
        .iter()
        .enumerate()
        .map(|(col, title)| {
            rows.iter()
                .map(|r| r.cells[col].text().chars().count())
                .chain(std::iter::once(title.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = titles
        .iter()
        .zip(&widths)
        .map(|(t, w)| format!("{:<w$}", t, w = *w))
        .collect();
    println!("{}", style(header.join("  ")).bold());

    for row in &rows {
        let line: Vec<String> = row
            .cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| paint(cell, *w))
            .collect();
        println!("{}", line.join("  "));
    }
    if rows.is_empty() {
        println!("{} No rows", style("i").blue());
    }
}

pub fn print_unavailable<T>(what: &str, panel: &Panel<T>) -> bool {
    if panel.is_loading() {
        println!("{} {} unavailable", style("!").yellow(), what);
        return true;
    }
    false
}

pub fn print_field(label: &str, value: &str) {
    println!("  {:<16} {}", style(label).dim(), value);
}
