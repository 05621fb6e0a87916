use crate::pipeline::{ExportOutcome, RunReport};

pub fn print_row_summary(report: &RunReport) {
    println!("=== Tube Layout ===");
    println!("Run: {}", report.run_id);
    println!(
        "  Detected: {}  Added: {}  Removed: {}  Final: {}",
        report.session.initial, report.session.added, report.session.removed, report.session.remaining
    );
    println!("  Rows: {}  Tubes: {}", report.rows.len(), report.tube_count());
    match &report.export {
        ExportOutcome::Written { path } => println!("  Table: {}", path.display()),
        ExportOutcome::Cancelled => println!("  Table: not saved"),
    }
    println!();

    println!("| Row | Tubes | y range |");
    println!("|-----|-------|---------|");
    for row in &report.rows {
        let min_y = row.features.iter().map(|f| f.y).min().unwrap_or(0);
        let max_y = row.features.iter().map(|f| f.y).max().unwrap_or(0);
        println!("| {} | {} | {}..{} |", row.index, row.len(), min_y, max_y);
    }
}
