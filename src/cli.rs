use crate::config::load_config;
use crate::ir::Direction;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::oracle::{Oracle, ReplayOracle};
use crate::parser::RuleOracle;
use crate::session::Session;
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flowspine",
    version,
    about = "Lay out analyzed code flows around a straight main path"
)]
pub struct Args {
    /// Input file (oracle payload or flow rules) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Input format. Guessed from the file extension when omitted.
    #[arg(short = 'f', long = "inputFormat", value_enum)]
    pub input_format: Option<InputFormat>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Flow direction (TB or LR), overrides the config file
    #[arg(short = 'd', long = "direction", value_parser = parse_direction)]
    pub direction: Option<Direction>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Oracle JSON response: {nodes, edges, warnings}
    Payload,
    /// Line-oriented flow rules
    Rules,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(direction) = args.direction {
        config.direction = direction;
    }

    let source = read_input(args.input.as_deref())?;
    let format = resolve_format(args.input_format, args.input.as_deref());
    tracing::debug!(?format, direction = config.direction.as_token(), "input read");

    let oracle: Box<dyn Oracle> = match format {
        InputFormat::Payload => Box::new(ReplayOracle::new(source.clone())),
        InputFormat::Rules => Box::new(RuleOracle),
    };

    let mut session = Session::new(config.layout.clone(), config.direction);
    let rendered = session.analyze(oracle.as_ref(), &source)?;
    let dump = LayoutDump::from_layout(
        &rendered.layout,
        &rendered.warnings,
        &config.theme,
        &config.layout.weights,
    );
    write_layout_dump(args.output.as_deref(), &dump)?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("flowspine=debug"),
        _ => EnvFilter::new("flowspine=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_direction(token: &str) -> Result<Direction, String> {
    Direction::from_token(token).ok_or_else(|| format!("unknown direction `{token}` (expected TB or LR)"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn resolve_format(explicit: Option<InputFormat>, input: Option<&Path>) -> InputFormat {
    if let Some(format) = explicit {
        return format;
    }
    let Some(path) = input.filter(|path| *path != Path::new("-")) else {
        return InputFormat::Payload;
    };
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5") => {
            InputFormat::Payload
        }
        _ => InputFormat::Rules,
    }
}
