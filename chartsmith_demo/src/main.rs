// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lays out a JSON chart description with `chartsmith_layout` and writes an SVG preview.
//!
//! ```text
//! chartsmith_demo [INPUT.json] [--out OUT.svg] [--size WIDTHxHEIGHT] [--verbose]
//! ```

mod svg;

use std::path::PathBuf;
use std::process::ExitCode;

use chartsmith_layout::{ChartData, LayoutError, Size, prepare_chart};
use chartsmith_text::{FontsLoaded, TextMeasurer};

const DEFAULT_INPUT: &str = "demos/sample.json";
const DEFAULT_OUTPUT: &str = "chartsmith_demo.svg";

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid chart description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("cannot set up logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    size: Size,
    verbose: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, DemoError> {
        let mut parsed = Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            size: Size::new(800.0, 480.0),
            verbose: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" | "-v" => parsed.verbose = true,
                "--out" | "-o" => {
                    let path = args
                        .next()
                        .ok_or_else(|| DemoError::Usage("--out needs a path".into()))?;
                    parsed.output = PathBuf::from(path);
                }
                "--size" => {
                    let value = args
                        .next()
                        .ok_or_else(|| DemoError::Usage("--size needs WIDTHxHEIGHT".into()))?;
                    parsed.size = parse_size(&value)?;
                }
                flag if flag.starts_with('-') => {
                    return Err(DemoError::Usage(format!("unknown flag `{flag}`")));
                }
                path => parsed.input = PathBuf::from(path),
            }
        }
        Ok(parsed)
    }
}

fn parse_size(value: &str) -> Result<Size, DemoError> {
    let invalid = || DemoError::Usage(format!("invalid size `{value}`, expected WIDTHxHEIGHT"));
    let (w, h) = value.split_once('x').ok_or_else(invalid)?;
    let width: f64 = w.trim().parse().map_err(|_| invalid())?;
    let height: f64 = h.trim().parse().map_err(|_| invalid())?;
    Ok(Size::new(width, height))
}

fn setup_logger(verbose: bool) -> Result<(), DemoError> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn demo_measurer() -> Box<dyn TextMeasurer> {
    #[cfg(feature = "parley")]
    {
        Box::new(chartsmith_text_parley::ParleyTextMeasurer::new())
    }

    #[cfg(not(feature = "parley"))]
    {
        Box::new(chartsmith_text::HeuristicTextMeasurer)
    }
}

fn run(args: Args) -> Result<(), DemoError> {
    let json = std::fs::read_to_string(&args.input).map_err(|source| DemoError::Read {
        path: args.input.clone(),
        source,
    })?;
    let data: ChartData = serde_json::from_str(&json)?;
    log::info!(
        "loaded {} series from {}",
        data.series.len(),
        args.input.display()
    );

    let measurer = demo_measurer();
    let chart = pollster::block_on(prepare_chart(
        &data,
        args.size,
        None,
        &*measurer,
        &FontsLoaded,
    ))?;

    let out = svg::render(&data, &chart);
    std::fs::write(&args.output, out).map_err(|source| DemoError::Write {
        path: args.output.clone(),
        source,
    })?;
    println!("wrote {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let result = Args::parse(std::env::args().skip(1))
        .and_then(|args| setup_logger(args.verbose).map(|()| args))
        .and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("chartsmith_demo: {err}");
            ExitCode::FAILURE
        }
    }
}
