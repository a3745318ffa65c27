//! Styled help: per-command examples plus an environment and exit code appendix.

use std::fmt::Write;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Command, CommandFactory, FromArgMatches};
use colored::Colorize;

use crate::Cli;
use crate::examples::{COMMAND_EXAMPLES, ExampleGroup};
use crate::theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("WEAVIATE_URL", "Store base URL (overrides the config file)"),
    ("WEAVIATE_API_KEY", "API key sent as a bearer token"),
    ("RUST_LOG", "Log filter, e.g. weaviate_migrate=debug"),
];

const EXIT_CODES: &[(&str, &str)] = &[
    ("0", "Success"),
    ("2", "Configuration error"),
    ("3", "Remote store error"),
    ("4", "Migration file could not be loaded"),
    ("5", "Target schema failed validation"),
    ("1", "Any other failure"),
];

/// Parse the process arguments, exiting on `--help`, `--version` or usage errors.
pub fn parse() -> Cli {
    let matches = command().get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

/// The CLI command with styles and long-help sections attached.
pub fn command() -> Command {
    let mut command = Cli::command().styles(styles()).after_long_help(appendix());
    for example in COMMAND_EXAMPLES {
        command = command.mut_subcommand(example.name, |sub| sub.after_long_help(examples(example.groups)));
    }
    command
}

fn styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .header(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().bold())
}

fn examples(groups: &[ExampleGroup]) -> String {
    let mut text = format!("{}\n", "Examples:".color(THEME.highlight).bold());
    for group in groups {
        let _ = writeln!(text, "\n  {}", group.title.color(THEME.primary).bold());
        for line in group.commands {
            let _ = writeln!(text, "    {} {line}", ICONS.arrow.color(THEME.muted));
        }
    }
    text
}

fn appendix() -> String {
    let mut text = String::new();
    for (heading, rows) in [("Environment Variables:", ENVIRONMENT_VARIABLES), ("Exit Codes:", EXIT_CODES)] {
        let _ = writeln!(text, "{}", heading.color(THEME.highlight).bold());
        for (key, description) in rows {
            let _ = writeln!(text, "  {}{description}", format!("{key:<18}").color(THEME.key).bold());
        }
        text.push('\n');
    }
    let _ = writeln!(
        text,
        "{} 'weaviate-migrate <command> --help' lists examples for each command.",
        "Tip:".color(THEME.highlight).bold()
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subcommand_gets_examples() {
        let command = command();
        for example in COMMAND_EXAMPLES {
            let sub = command.find_subcommand(example.name).unwrap();
            let help = sub.get_after_long_help().unwrap().to_string();
            assert!(help.contains(example.groups[0].title), "{}", example.name);
        }
    }

    #[test]
    fn test_appendix_lists_every_exit_code() {
        let text = appendix();
        for (code, description) in EXIT_CODES {
            assert!(text.contains(code) && text.contains(description));
        }
        assert!(text.contains("WEAVIATE_API_KEY"));
    }
}
