//! Plain-text rendering of messages, tables and session summaries.

use refchat_core::{Message, Role, SessionSummary, Table};

/// Render a table as a pipe-delimited grid. Cells a row lacks show as `-`.
pub fn render_table(table: &Table) -> String {
    if table.columns.is_empty() {
        return String::new();
    }
    let hidden = table.undeclared_keys();
    if !hidden.is_empty() {
        tracing::debug!(keys = ?hidden, "Table cells outside declared columns are not shown");
    }

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| table.columns.iter().map(|c| Table::cell_text(row, c)).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(line(&table.columns[..]));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(format!("|-{}-|", rule.join("-|-")));
    for row in &cells {
        out.push(line(&row[..]));
    }
    out.join("\n")
}

pub fn render_message(message: &Message) -> String {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "AI",
    };
    let mut out = format!(
        "[{}] {}\n{}",
        message.timestamp.format("%H:%M:%S"),
        who,
        message.text
    );
    if let Some(table) = &message.table {
        let grid = render_table(table);
        if !grid.is_empty() {
            out.push_str("\n\n");
            out.push_str(&grid);
        }
    }
    out
}

pub fn render_summary(summary: &SessionSummary, active: bool) -> String {
    format!(
        "{} {}  {}  ({})",
        if active { "*" } else { " " },
        summary.session_id,
        summary.title,
        summary.last_updated.format("%Y-%m-%d")
    )
}
