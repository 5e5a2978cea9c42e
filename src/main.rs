mod callstack;
mod frame;
mod globals;
mod loader;
mod machine;
mod program;
mod value;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use machine::Machine;

#[derive(Parser)]
#[command(name = "minijvm", version, about = "Executes textual JVM-subset assembly programs")]
struct Args {
    /// Program file to execute
    file: PathBuf,

    /// Print the loaded program image as JSON instead of running it
    #[arg(long)]
    dump: bool,

    /// Extra arguments are accepted and ignored with a warning
    #[arg(hide = true)]
    extra: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    for extra in &args.extra {
        eprintln!("Warning: ignoring extra argument: {extra}");
    }

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let image = match loader::load(&source) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.dump {
        match serde_json::to_string_pretty(&image) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    if let Err(e) = Machine::new(image).run() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
