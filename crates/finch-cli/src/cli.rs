//! CLI definition.
//!
//! One command: `finch <FILE>`. The file may contain several programs
//! separated by `$`; each compiles independently.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("finch")
        .about("Compiler for a tiny statically-typed language targeting 256-byte 6502-style images")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Source file; programs are separated by `$`"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Print DEBUG diagnostics (token stream, tree dumps, emission trace)"),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .action(ArgAction::SetTrue)
                .help("Execute each compiled image on the bundled virtual machine"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Also render errors and warnings as annotated source snippets"),
        )
}

pub struct CompileParams {
    pub input: PathBuf,
    pub verbose: bool,
    pub run: bool,
    pub pretty: bool,
}

impl CompileParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            input: matches
                .get_one::<PathBuf>("input")
                .expect("clap enforces the required FILE argument")
                .clone(),
            verbose: matches.get_flag("verbose"),
            run: matches.get_flag("run"),
            pretty: matches.get_flag("pretty"),
        }
    }
}
