use std::fmt::Write;

use routine_core::{DayStatus, TaskView};

const COLUMN_WIDTH: usize = 4;

pub fn status_glyph(status: DayStatus) -> char {
    match status {
        DayStatus::Completed => '✓',
        DayStatus::Missed => '×',
        DayStatus::Pending => '!',
        DayStatus::Future => '·',
    }
}

/// One block per task: a header line, then day numbers, month names and
/// status glyphs in seven aligned columns.
pub fn render_board(views: &[TaskView]) -> String {
    if views.is_empty() {
        return "No routines yet. Add one with `routine add <title>`.".to_string();
    }
    let mut out = String::new();
    for (idx, view) in views.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}  [{}]  ({})", view.title, view.frequency_label, view.id);
        let mut days = String::new();
        let mut months = String::new();
        let mut marks = String::new();
        for cell in &view.cells {
            let _ = write!(days, "{:>width$}", cell.label.day, width = COLUMN_WIDTH);
            let _ = write!(months, "{:>width$}", cell.label.month, width = COLUMN_WIDTH);
            let _ = write!(
                marks,
                "{:>width$}",
                status_glyph(cell.status),
                width = COLUMN_WIDTH
            );
        }
        let _ = writeln!(out, "{days}");
        let _ = writeln!(out, "{months}");
        let _ = writeln!(out, "{marks}");
    }
    out.trim_end().to_string()
}
