//! Output formatting utilities for the CLI
//!
//! Tables for the key registry, status lines, and colored status messages.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{settings::Style, Table, Tabled};

use gkm_core::paths::expand_home;
use gkm_core::{AgentStatus, KeyEntry};

/// Format the configured keys as an ASCII table
///
/// The FILE column shows whether the key file currently exists, which is the
/// same check `load` performs before calling the agent.
pub fn format_keys(keys: &[KeyEntry]) -> String {
    if keys.is_empty() {
        return "No keys configured".to_string();
    }

    #[derive(Tabled)]
    struct KeyRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "PATH")]
        path: String,
        #[tabled(rename = "FILE")]
        file: &'static str,
    }

    let rows: Vec<KeyRow> = keys
        .iter()
        .map(|k| KeyRow {
            name: k.name.clone(),
            path: k.path.clone(),
            file: if expand_home(&k.path).exists() {
                "ok"
            } else {
                "missing"
            },
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// One-line agent status
pub fn format_status(status: &AgentStatus) -> String {
    if status.has_keys() {
        format!("Status: ✓ {}", status.summary())
    } else {
        format!("Status: {}", status.summary())
    }
}

fn print_prefixed<W: Write>(mut out: W, color: Color, symbol: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(symbol),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_prefixed(std::io::stdout(), Color::Green, "✓ ", msg);
}

/// Print an error message to stderr in red
pub fn print_error(msg: &str) {
    print_prefixed(std::io::stderr(), Color::Red, "✗ ", msg);
}

/// Print a warning message to stderr in yellow
pub fn print_warning(msg: &str) {
    print_prefixed(std::io::stderr(), Color::Yellow, "⚠ ", msg);
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    print_prefixed(std::io::stdout(), Color::Cyan, "ℹ ", msg);
}
