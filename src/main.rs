use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use log::info;
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

use arbor::lang::context::{Limits, DEFAULT_MAX_CALL_DEPTH};
use arbor::lang::runtime::{RunResult, Runtime};

/// Exit code when the input is not a well-formed program
const EXIT_PARSE_FAILURE: u8 = 3;
/// Exit code when the program fails while running
const EXIT_EVAL_FAILURE: u8 = 4;

#[derive(Parser)]
#[command(version, about = "Evaluate a JSON-encoded syntax tree")]
struct Opt {
    /// Show debug output
    #[arg(short, long)]
    debug: bool,

    /// Maximum depth of nested function calls
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Program to run
    #[arg(value_name = "FILE", required_unless_present = "file", conflicts_with = "file")]
    path: Option<PathBuf>,

    /// Program to run, as an option
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,
}

impl Opt {
    fn program(&self) -> Result<&Path> {
        match (&self.path, &self.file) {
            (Some(p), None) | (None, Some(p)) => Ok(p.as_path()),
            (Some(_), Some(_)) => bail!("Give the program either as an argument or with --file"),
            (None, None) => bail!("No program file given"),
        }
    }
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn run(opts: &Opt) -> Result<ExitCode> {
    init_logging(opts.debug)?;

    let file = opts.program()?;
    let input =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    info!("read {} bytes from {}", input.len(), file.display());

    let runtime = Runtime::new(Limits {
        max_call_depth: opts.max_call_depth,
    });

    let code = match runtime.run_source(&input, file) {
        RunResult::Ok(Some(v)) => {
            println!("{}", v);
            ExitCode::SUCCESS
        }
        RunResult::Ok(None) => ExitCode::SUCCESS,
        RunResult::ParseErr(e) => {
            eprintln!("{}", e);
            ExitCode::from(EXIT_PARSE_FAILURE)
        }
        RunResult::EvalErr(e) => {
            eprintln!("{}", e);
            ExitCode::from(EXIT_EVAL_FAILURE)
        }
    };

    Ok(code)
}

fn main() -> ExitCode {
    let opts = Opt::parse();

    match run(&opts) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[test]
fn test_program_file_args() {
    let opts = Opt::try_parse_from(["arbor", "prog.json"]).unwrap();
    assert_eq!(opts.program().unwrap(), Path::new("prog.json"));

    let opts = Opt::try_parse_from(["arbor", "-f", "prog.json"]).unwrap();
    assert_eq!(opts.program().unwrap(), Path::new("prog.json"));

    let opts = Opt::try_parse_from(["arbor", "--debug", "--file", "prog.json"]).unwrap();
    assert!(opts.debug);
    assert_eq!(opts.program().unwrap(), Path::new("prog.json"));

    assert!(Opt::try_parse_from(["arbor"]).is_err());
    assert!(Opt::try_parse_from(["arbor", "-f", "a.json", "b.json"]).is_err());
}
