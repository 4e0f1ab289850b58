use std::fs;
use std::path::PathBuf;

use brushmap::api::{AtlasConfig, SessionFrame, ViewSession};
use brushmap::interaction::{BrushEvent, PixelExtent};
use brushmap::render::{Renderer, SvgRenderer};
use brushmap::source::{CsvFile, TopologyFile};

#[derive(Debug)]
struct CliArgs {
    topology_path: PathBuf,
    dataset_path: PathBuf,
    output_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    brush: Option<(f64, f64)>,
    print_snapshot: bool,
}

fn main() {
    let _ = brushmap::telemetry::init_tracing_with_filter("brushmap=warn");
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config = match &args.config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            AtlasConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => AtlasConfig::default(),
    };

    let topology = TopologyFile::new(&args.topology_path);
    let dataset = CsvFile::new(&args.dataset_path)
        .with_mapping(config.row_mapping.clone(), config.malformed_rows);
    let session = ViewSession::new(config).map_err(|err| err.to_string())?;
    futures::executor::block_on(session.load(&topology, &dataset));

    if let Some((x0, x1)) = args.brush {
        session.dispatch_brush(BrushEvent::DragEnd(Some(PixelExtent::new(x0, x1))));
    }

    let frame = match session.frame() {
        SessionFrame::Ready(frame) => frame,
        SessionFrame::Loading => return Err("inputs did not finish loading".to_owned()),
        SessionFrame::NoData => return Err("dataset has no dated records".to_owned()),
        SessionFrame::Failed(errors) => {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(reasons.join("; "));
        }
    };

    let mut renderer = SvgRenderer::new();
    renderer.render(&frame).map_err(|err| err.to_string())?;
    match &args.output_path {
        Some(path) => fs::write(path, renderer.document())
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?,
        None => print!("{}", renderer.document()),
    }

    if args.print_snapshot {
        let snapshot = session
            .snapshot()
            .ok_or_else(|| "session has no snapshot".to_owned())?;
        eprintln!("{}", snapshot.to_json_pretty().map_err(|err| err.to_string())?);
    }
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut output_path = None;
    let mut config_path = None;
    let mut brush = None;
    let mut print_snapshot = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --out".to_owned())?;
                output_path = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_owned())?;
                config_path = Some(PathBuf::from(value));
            }
            "--brush" => {
                let mut pixel = |name: &str| -> Result<f64, String> {
                    let value = args
                        .next()
                        .ok_or_else(|| format!("missing {name} for --brush"))?;
                    value
                        .parse::<f64>()
                        .map_err(|err| format!("invalid {name} `{value}`: {err}"))
                };
                let x0 = pixel("x0")?;
                let x1 = pixel("x1")?;
                brush = Some((x0, x1));
            }
            "--snapshot" => print_snapshot = true,
            "-h" | "--help" => {
                println!(
                    "Usage: cargo run --bin render_snapshot -- <topology.json> <events.csv> [--out <file.svg>] [--config <config.json>] [--brush <x0> <x1>] [--snapshot]"
                );
                std::process::exit(0);
            }
            _ if arg.starts_with("--") => {
                return Err(format!("unknown argument `{arg}`"));
            }
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(topology_path), Some(dataset_path), None) =
        (positional.next(), positional.next(), positional.next())
    else {
        return Err("expected <topology.json> and <events.csv>".to_owned());
    };

    Ok(CliArgs {
        topology_path,
        dataset_path,
        output_path,
        config_path,
        brush,
        print_snapshot,
    })
}
