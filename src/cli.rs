use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::config::load_config;
use crate::dump::{LayoutDump, write_layout_dump};
use crate::engine::TreeViewEngine;
use crate::input::{parse_goals_json, parse_outline};
use crate::layout::visible_nodes;
use crate::measure::HeadlessMeasurer;
use crate::tree::ExpansionState;

#[derive(Parser, Debug)]
#[command(name = "treeline", version, about = "Card-tree layout and connector-line dump tool")]
pub struct Args {
    /// Input file (.json goals or .txt outline) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout dump. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Input format; guessed from the extension (then content) when omitted
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<InputFormat>,

    /// Config JSON file (layout sizes, JSON5 accepted)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Expand the node with this id (repeatable)
    #[arg(long = "expand")]
    pub expand: Vec<String>,

    /// Expand every node that has children
    #[arg(long = "expandAll")]
    pub expand_all: bool,

    /// Viewport width override
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Outline,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.viewport_width = width;
    }

    let (content, guessed) = read_input(args.input.as_deref())?;
    let format = match args.format {
        Some(format) => format,
        None => guessed.unwrap_or_else(|| sniff_format(&content)),
    };
    let roots = match format {
        InputFormat::Json => parse_goals_json(&content)?,
        InputFormat::Outline => parse_outline(&content)?,
    };

    let mut expanded = ExpansionState::new();
    if args.expand_all {
        expanded.expand_all(&roots);
    }
    for id in &args.expand {
        expanded.expand(id);
    }

    let mut measurer = HeadlessMeasurer::new(config);
    measurer.layout(&roots, &expanded);

    let mut engine = TreeViewEngine::new(None);
    engine.after_render(&roots, &expanded, &measurer);

    let visible = visible_nodes(&roots, &expanded);
    let container = engine
        .container()
        .ok_or_else(|| anyhow::anyhow!("measurement pass produced no container"))?;
    let dump = LayoutDump::from_pass(&visible, engine.rects(), container, engine.lines());

    write_dump(&dump, args.output.as_deref())
}

fn read_input(path: Option<&Path>) -> Result<(String, Option<InputFormat>)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, None));
        }
        let content = std::fs::read_to_string(path)?;
        let guessed = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(format_for_extension);
        return Ok((content, guessed));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, None))
}

fn format_for_extension(ext: &str) -> Option<InputFormat> {
    match ext {
        "json" => Some(InputFormat::Json),
        "txt" | "outline" => Some(InputFormat::Outline),
        _ => None,
    }
}

fn sniff_format(content: &str) -> InputFormat {
    match content.trim_start().chars().next() {
        Some('{') | Some('[') => InputFormat::Json,
        _ => InputFormat::Outline,
    }
}

fn write_dump(dump: &LayoutDump, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => write_layout_dump(path, dump),
        None => {
            let json = serde_json::to_string_pretty(dump)?;
            println!("{json}");
            Ok(())
        }
    }
}
