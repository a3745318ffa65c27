use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;
use std::io::Write;

use weaviate_migrate::{ActionOutcome, ApplyAction, ChangeType, DeltaEntry};

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be rendered in every output format
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(self);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.options.no_color {
            text.to_string()
        } else {
            text.color(color).to_string()
        }
    }

    /// Status lines are suppressed in quiet mode and in JSON mode, where
    /// stdout is reserved for the document.
    fn status(&self, icon: &str, message: &str, color: Color) {
        if self.options.quiet || self.is_json() {
            return;
        }
        println!("{} {}", self.paint(icon, color), self.paint(message, color));
    }

    pub fn success(&self, message: &str) {
        self.status(ICONS.success, message, THEME.success);
    }

    pub fn warning(&self, message: &str) {
        self.status(ICONS.warning, message, THEME.warning);
    }

    pub fn info(&self, message: &str) {
        self.status(ICONS.info, message, THEME.info);
    }

    /// Errors always go to stderr, even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!(
            "{} {}",
            self.paint(ICONS.error, THEME.error),
            self.paint(message, THEME.error)
        );
    }

    /// Display verbose information (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!(
                "{} {}",
                self.paint(ICONS.arrow, THEME.muted),
                self.paint(message, THEME.muted)
            );
        }
    }

    pub fn heading(&self, text: &str) {
        if self.options.quiet || self.is_json() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(THEME.primary).bold());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if self.options.quiet || self.is_json() {
            return;
        }
        if self.options.no_color {
            println!("{key}: {value}");
        } else {
            println!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value));
        }
    }

    pub fn bullet(&self, text: &str) {
        self.indented(ICONS.bullet, text, THEME.muted);
    }

    fn indented(&self, icon: &str, text: &str, color: Color) {
        if self.options.quiet || self.is_json() {
            return;
        }
        println!("  {} {text}", self.paint(icon, color));
    }

    /// One delta line, marked `+`, `-` or `~`.
    pub fn change(&self, entry: &DeltaEntry) {
        let (icon, color) = match entry.change_type {
            ChangeType::Added => (ICONS.plus, THEME.added),
            ChangeType::Removed => (ICONS.minus, THEME.removed),
            ChangeType::Modified => (ICONS.changed, THEME.modified),
        };
        let subject = match &entry.property {
            Some(property) => format!("{}.{property}", entry.class),
            None => format!("class {}", entry.class),
        };
        self.indented(icon, &subject, color);
    }

    /// One applier action with its outcome.
    pub fn action(&self, action: &ApplyAction) {
        let (icon, color) = match action.outcome {
            ActionOutcome::Created => (ICONS.success, THEME.success),
            ActionOutcome::Planned => (ICONS.arrow, THEME.highlight),
            ActionOutcome::Skipped(_) => (ICONS.skipped, THEME.muted),
        };
        self.indented(icon, &format!("{} {}", action.target, action.outcome), color);
    }

    /// Create a themed table
    pub fn create_table(&self) -> Table {
        let mut table = Table::new();

        if !self.options.no_color {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        } else {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        }

        table
    }

    /// Add themed header to table
    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| {
                let cell = Cell::new(h).add_attribute(Attribute::Bold);
                if self.options.no_color {
                    cell
                } else {
                    cell.fg(TableColor::Cyan)
                }
            })
            .collect();
        table.set_header(header_cells);
    }

    /// Display progress indicator
    pub fn progress(&self, message: &str) {
        if self.options.quiet || self.is_json() {
            return;
        }

        let output = if self.options.no_color {
            format!("{} {message}...", ICONS.loading)
        } else {
            format!(
                "{} {}...",
                ICONS.loading.color(THEME.highlight).bold(),
                message.color(THEME.highlight)
            )
        };

        print!("\r{output}");
        std::io::stdout().flush().ok();
    }

    /// Clear the current line (useful after progress indicators)
    pub fn clear_line(&self) {
        if self.options.quiet || self.is_json() {
            return;
        }

        print!("\r{}", " ".repeat(80));
        print!("\r");
        std::io::stdout().flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        value: i32,
    }

    impl TableDisplay for Sample {
        fn to_table(&self, output: &OutputManager) -> Table {
            let mut table = output.create_table();
            output.add_table_header(&mut table, &["Name", "Value"]);
            table.add_row(vec![Cell::new(&self.name), Cell::new(self.value.to_string())]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.name, self.value)
        }
    }

    fn sample() -> Sample {
        Sample {
            name: "classes".to_string(),
            value: 3,
        }
    }

    #[test]
    fn test_display_json() {
        let manager = OutputManager::new(GlobalOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        });
        assert!(manager.is_json());
        assert!(manager.display(&sample()).is_ok());
    }

    #[test]
    fn test_display_quiet() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(manager.display(&sample()).is_ok());
    }

    #[test]
    fn test_table_without_color() {
        let manager = OutputManager::new(GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        let rendered = sample().to_table(&manager).to_string();
        assert!(rendered.contains("classes"));
        assert!(rendered.contains('+'));
        assert_eq!(sample().to_compact(), "classes=3");
    }
}
