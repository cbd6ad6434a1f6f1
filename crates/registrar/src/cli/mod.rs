pub mod handlers;

use clap::{value_parser, Arg, Command};

pub fn build_cli() -> Command {
    Command::new("registrar")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Course registration: students, offerings and enrollments")
        .subcommand_required(true)
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Database file (overrides config and REGISTRAR_DB)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Extra config file applied after global and project config"),
        )
        .subcommand(cmd_student())
        .subcommand(cmd_offering())
        .subcommand(
            Command::new("enroll")
                .about("Enroll a student in an offering")
                .arg(id_arg("student"))
                .arg(id_arg("offering")),
        )
        .subcommand(
            Command::new("cancel")
                .about("Cancel a student's enrollment")
                .arg(id_arg("student"))
                .arg(id_arg("offering")),
        )
        .subcommand(
            Command::new("enrollments")
                .about("List the offerings a student is enrolled in")
                .arg(id_arg("student")),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Recount an offering's enrollments and repair its stored count")
                .arg(id_arg("offering")),
        )
        .subcommand(
            Command::new("batch")
                .about("Run a JSON array of enroll/cancel operations concurrently")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(std::path::PathBuf)),
                ),
        )
}

fn cmd_student() -> Command {
    Command::new("student")
        .about("Manage students")
        .subcommand_required(true)
        .subcommand(
            Command::new("register")
                .about("Register a student")
                .arg(id_arg("id")),
        )
        .subcommand(Command::new("show").about("Show a student").arg(id_arg("id")))
}

fn cmd_offering() -> Command {
    Command::new("offering")
        .about("Manage course offerings")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create an offering")
                .arg(required_flag("id").value_parser(value_parser!(i64)))
                .arg(required_flag("name"))
                .arg(required_flag("capacity").value_parser(value_parser!(i64)))
                .arg(required_flag("credit").value_parser(value_parser!(i64)))
                .arg(required_flag("day").help("MON, TUE, WED, THU or FRI"))
                .arg(required_flag("start").help("Start time, HH:MM"))
                .arg(required_flag("end").help("End time, HH:MM")),
        )
        .subcommand(Command::new("list").about("List offerings"))
        .subcommand(Command::new("show").about("Show an offering").arg(id_arg("id")))
        .subcommand(
            Command::new("delete")
                .about("Delete an offering and its enrollments")
                .arg(id_arg("id")),
        )
}

fn id_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .allow_negative_numbers(true)
        .value_parser(value_parser!(i64))
}

fn required_flag(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}
