use crate::types::TodoCommand;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub fn build_cli() -> Command {
    Command::new("todo")
        .about("Interactive task list. Run without arguments to start the shell.")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("table")
                .about("Create the task table if it does not exist")
                .arg(
                    Arg::new("reset")
                        .long("reset")
                        .help("Drop every task and recreate an empty table")
                        .action(ArgAction::SetTrue),
                ),
        )
}

pub fn parse_command() -> TodoCommand {
    command_from_matches(&build_cli().get_matches())
}

fn command_from_matches(matches: &ArgMatches) -> TodoCommand {
    match matches.subcommand() {
        Some(("table", sub)) => TodoCommand::Table {
            reset: sub.get_flag("reset"),
        },
        _ => TodoCommand::Shell,
    }
}
