use anyhow::{bail, Context};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strategist_core::{Decision, GamePhase, GameState};
use strategist_data::{load_assets, Assets};
use strategist_engine::{Engine, EngineError};
use strategist_memory::{JsonlStore, MemoryStore};
use tracing::{info, warn};

const DEFAULT_ASSETS_DIR: &str = "assets";

const USAGE: &str = "usage: strategist [options]
  --state <file|->     game states, one JSON object per line (default: stdin)
  --assets <dir>       strategy.json, synergy.json, jokers.json, hands.json
  --memory <path>      JSON-lines outcome log
  --risk <0..1>        risk tolerance
  --seed <n>           sampling seed
  --session <id>       session id recorded with outcomes
  --explain            print a decision report to stderr after each tick
  --verbose, -v        debug logging
  --help, -h";

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    state: Option<PathBuf>,
    assets: Option<PathBuf>,
    memory: Option<PathBuf>,
    risk: Option<f64>,
    seed: Option<u64>,
    session: Option<String>,
    explain: bool,
    verbose: bool,
    help: bool,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "--state" => options.state = Some(PathBuf::from(take_value(args, &mut idx, flag)?)),
            "--assets" => options.assets = Some(PathBuf::from(take_value(args, &mut idx, flag)?)),
            "--memory" => options.memory = Some(PathBuf::from(take_value(args, &mut idx, flag)?)),
            "--risk" => {
                let raw = take_value(args, &mut idx, flag)?;
                let risk: f64 = raw
                    .parse()
                    .with_context(|| format!("--risk expects a number, got {raw}"))?;
                if !(0.0..=1.0).contains(&risk) {
                    bail!("--risk must be within 0..=1, got {risk}");
                }
                options.risk = Some(risk);
            }
            "--seed" => {
                let raw = take_value(args, &mut idx, flag)?;
                options.seed = Some(
                    raw.parse()
                        .with_context(|| format!("--seed expects an integer, got {raw}"))?,
                );
            }
            "--session" => options.session = Some(take_value(args, &mut idx, flag)?.to_string()),
            "--explain" => options.explain = true,
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => options.help = true,
            other => bail!("unknown option {other}"),
        }
        idx += 1;
    }
    Ok(options)
}

fn take_value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> anyhow::Result<&'a str> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .with_context(|| format!("{flag} expects a value"))
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_cli_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return;
    }
    init_tracing(options.verbose);
    if let Err(err) = run(&options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let assets = resolve_assets(options)?;
    let (mut engine, memory) = build_engine(assets, options)?;

    let input: Box<dyn BufRead> = match &options.state {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(BufReader::new(io::stdin())),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ticks = process(&mut engine, input, &mut out, options.explain)?;

    info!(ticks, session = %engine.session_id(), "input exhausted");
    if let Some(memory) = memory {
        match memory.summary() {
            Ok(summary) => info!(
                sessions = summary.total_sessions,
                win_rate = summary.win_rate,
                rounds = summary.total_rounds,
                keys = summary.tracked_keys,
                "memory summary"
            ),
            Err(err) => warn!(error = %err, "memory summary unavailable"),
        }
    }
    Ok(())
}

/// Explicit `--assets` must load. Otherwise `./assets` is used when present
/// and the built-in defaults when not.
fn resolve_assets(options: &CliOptions) -> anyhow::Result<Assets> {
    let mut assets = match &options.assets {
        Some(dir) => load_assets(dir).with_context(|| format!("load assets {}", dir.display()))?,
        None if Path::new(DEFAULT_ASSETS_DIR).is_dir() => {
            load_assets(Path::new(DEFAULT_ASSETS_DIR))?
        }
        None => Assets::default(),
    };
    if let Some(risk) = options.risk {
        assets.config.risk_tolerance = risk;
    }
    if let Some(seed) = options.seed {
        assets.config.seed = seed;
    }
    if let Some(memory) = &options.memory {
        assets.config.memory_path = Some(memory.clone());
    }
    Ok(assets)
}

fn build_engine(
    assets: Assets,
    options: &CliOptions,
) -> anyhow::Result<(Engine, Option<Arc<dyn MemoryStore>>)> {
    let memory: Option<Arc<dyn MemoryStore>> = match &assets.config.memory_path {
        Some(path) => {
            let store = JsonlStore::open(path)
                .with_context(|| format!("open memory log {}", path.display()))?;
            info!(path = %path.display(), records = store.len(), "memory loaded");
            let store: Arc<dyn MemoryStore> = Arc::new(store);
            Some(store)
        }
        None => None,
    };
    let mut engine = Engine::new(assets.config)
        .with_catalog(Arc::new(assets.catalog))
        .with_table(Arc::new(assets.table))
        .with_synergy(Arc::new(assets.synergy));
    if let Some(memory) = &memory {
        engine = engine.with_memory(Arc::clone(memory));
    }
    if let Some(session) = &options.session {
        engine = engine.with_session_id(session.clone());
    }
    Ok((engine, memory))
}

/// Reads one state per line and writes one decision per line. `null` marks
/// a tick with nothing to do.
fn process(
    engine: &mut Engine,
    input: impl BufRead,
    out: &mut impl Write,
    explain: bool,
) -> anyhow::Result<u64> {
    let mut ticks = 0u64;
    for (idx, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("read state line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let state: GameState = serde_json::from_str(&line)
            .with_context(|| format!("parse state line {}", idx + 1))?;
        let decision = tick(engine, &state)?;
        writeln!(out, "{}", serde_json::to_string(&decision)?)?;
        out.flush()?;
        ticks += 1;
        if explain {
            if let Some(trace) = engine.last_trace() {
                eprintln!("{}", trace.to_text_report());
            }
        }
    }
    Ok(ticks)
}

fn tick(engine: &mut Engine, state: &GameState) -> anyhow::Result<Option<Decision>> {
    match engine.tick(state) {
        Ok(decision) => Ok(decision),
        // still looking at the final screen
        Err(EngineError::RunFinished) if state.phase == GamePhase::GameOver => Ok(None),
        Err(EngineError::RunFinished) => {
            engine.new_session();
            Ok(engine.tick(state)?)
        }
        Err(EngineError::NoDecision { phase, detail }) => {
            warn!(?phase, %detail, "no decision");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
