//! Markdown reports built from `task` and `timew` output.

pub mod tasks;
pub mod timew;

pub use tasks::{current_tasks_markdown, render_current_tasks};
pub use timew::{Period, TimewEntry, summarize, timew_summary};

/// Render a GitHub-flavoured Markdown table with padded columns.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {}{} ", c, " ".repeat(w - c.chars().count())))
            .collect();
        format!("|{}|\n", padded.join("|"))
    };

    let mut out = line(headers.to_vec());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    out.push_str(&format!("|{}|\n", rule.join("|")));
    for row in rows {
        let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
        cells.resize(headers.len(), "");
        out.push_str(&line(cells));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_table_pads_columns() {
        let table = markdown_table(
            &["A", "Long header"],
            &[vec!["value".into(), "x".into()], vec!["".into()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "| A     | Long header |");
        assert_eq!(lines[1], "|-------|-------------|");
        assert_eq!(lines[2], "| value | x           |");
        assert_eq!(lines[3], "|       |             |");
    }
}
