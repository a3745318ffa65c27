use crate::commands::{init, migrate, schema};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

/// Example groups shown in the long help of one subcommand
#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub const COMMAND_EXAMPLES: &[CommandExample] = &[
    CommandExample {
        name: "init",
        groups: init::EXAMPLES,
    },
    CommandExample {
        name: "migrate",
        groups: migrate::EXAMPLES,
    },
    CommandExample {
        name: "schema",
        groups: schema::EXAMPLES,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_every_example_names_a_subcommand() {
        let command = Cli::command();
        for example in COMMAND_EXAMPLES {
            assert!(
                command.find_subcommand(example.name).is_some(),
                "no subcommand named {}",
                example.name
            );
            for group in example.groups {
                for line in group.commands {
                    assert!(line.starts_with(&format!("weaviate-migrate {}", example.name)), "{line}");
                }
            }
        }
    }
}
