//! Terminal output.
//!
//! Status lines carry a bracketed tag (`[cmd]`, `[ok]`, `[info]`, `[warn]`,
//! `[error]`) so logs stay greppable with colours stripped. `Table` renders the
//! `--info` listing.

use colored::*;
use std::fmt::Display;

pub fn cmd(line: impl Display) {
    println!("{} {}", "[cmd]".dimmed(), line);
}

pub fn ok(msg: impl Display) {
    println!("{} {}", "[ok]".green(), msg);
}

pub fn info(msg: impl Display) {
    println!("{} {}", "[info]".cyan(), msg);
}

pub fn warn(msg: impl Display) {
    eprintln!("{} {}", "[warn]".yellow(), msg);
}

pub fn error(msg: impl Display) {
    eprintln!("{} {}", "[error]".red().bold(), msg);
}

pub fn hint(msg: impl Display) {
    eprintln!("{} {}", "[hint]".magenta(), msg);
}

/// Two-or-more column table with light box-drawing borders.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(console::measure_text_width(cell));
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.widths();
        let sep = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, cells.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut s = String::from("  │");
            for (cell, w) in cells.iter().zip(&widths) {
                let pad = w.saturating_sub(console::measure_text_width(cell));
                let text = if bold {
                    cell.bold().to_string()
                } else {
                    cell.clone()
                };
                s.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            s.push('\n');
            s
        };

        let mut out = sep("┌", "┬", "┐");
        out.push_str(&line(&self.headers, true));
        out.push_str(&sep("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row, false));
        }
        out.push_str(&sep("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_pad_to_widest_cell() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Key", "Value"]);
        table.add_row(vec!["build_type".into(), "debug".into()]);
        table.add_row(vec!["too".into(), "many".into(), "cells".into()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "  │ Key        │ Value │");
        assert_eq!(lines[3], "  │ build_type │ debug │");
        assert!(!rendered.contains("cells"));
    }
}
