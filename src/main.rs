use std::{path::PathBuf, process::ExitCode};

use clap::{Arg, ArgAction, Command};
use log::{error, info};

use scriptverify::{
    driver::load_program,
    verifier::{Verifier, VerifierOptions},
};

fn main() -> ExitCode {
    env_logger::init();

    let matches = Command::new("scriptverify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Static semantic verifier for ActionScript-like sources")
        .arg(
            Arg::new("INPUT")
                .help("Source files to verify")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("warnings-as-errors")
                .long("warnings-as-errors")
                .help("Treat warnings as errors")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let options = VerifierOptions {
        warnings_as_errors: matches.get_flag("warnings-as-errors"),
    };
    let mut verifier = Verifier::new(options);
    let mut failed = false;

    for path in matches.get_many::<PathBuf>("INPUT").into_iter().flatten() {
        let program = match load_program(path) {
            Ok(program) => program,
            Err(err) => {
                error!("{} could not be loaded", path.display());
                eprintln!("{}", err);
                failed = true;
                continue;
            }
        };

        let valid = verifier.verify_program(&program);
        for line in program.unit.render_nested_diagnostics() {
            println!("{}", line);
        }
        info!("{}: {}", path.display(), if valid { "valid" } else { "invalid" });
    }

    if failed || !verifier.all_programs_valid() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
