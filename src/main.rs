use std::path::PathBuf;

use mazechase::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

struct Options {
    seed: Option<u64>,
    episodes: u32,
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args
        .first()
        .is_some_and(|a| a == "--help" || a == "-h" || a == "help")
    {
        print_help();
        return;
    }

    let (command, rest) = match args.first().map(String::as_str) {
        Some(cmd @ ("demo" | "maze" | "snapshot")) => (cmd.to_string(), &args[1..]),
        _ => ("demo".to_string(), &args[..]),
    };

    let result = parse_options(rest).and_then(|opts| match command.as_str() {
        "maze" => run_maze(&opts),
        "snapshot" => run_snapshot(&opts),
        _ => run_demo(&opts),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        if matches!(e, CliError::Usage(_)) {
            print_help();
        }
        std::process::exit(2);
    }
}

fn print_help() {
    println!("mazechase (hider/hunter maze pursuit simulation)");
    println!("usage:");
    println!("  cargo run -- [demo] [--seed N] [--episodes N] [--config FILE]");
    println!("  cargo run -- maze [--seed N] [--config FILE]");
    println!("  cargo run -- snapshot [--seed N] [--config FILE]");
    println!("  cargo run -- --help");
}

fn parse_options(args: &[String]) -> Result<Options, CliError> {
    let mut opts = Options {
        seed: None,
        episodes: 5,
        config: None,
    };
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let mut value = || {
            it.next()
                .ok_or_else(|| CliError::Usage(format!("missing value for {flag}")))
        };
        match flag.as_str() {
            "--seed" => {
                let v = value()?;
                opts.seed = Some(
                    v.parse()
                        .map_err(|_| CliError::Usage(format!("bad seed: {v}")))?,
                );
            }
            "--episodes" => {
                let v = value()?;
                opts.episodes = v
                    .parse()
                    .map_err(|_| CliError::Usage(format!("bad episode count: {v}")))?;
            }
            "--config" => opts.config = Some(PathBuf::from(value()?)),
            other => return Err(CliError::Usage(format!("unknown argument: {other}"))),
        }
    }
    Ok(opts)
}

fn load_config(opts: &Options) -> Result<SimConfig, CliError> {
    let mut config = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str::<SimConfig>(&text)?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Play episodes with uniformly random actions for both sides.
fn run_demo(opts: &Options) -> Result<(), CliError> {
    let config = load_config(opts)?;
    let mut policy_rng = Prng::new(config.seed.map_or(0x5EED, |s| s ^ 0xA5A5_A5A5));
    let mut env = HiderHunterEnv::new(config)?;
    info!(
        width = env.map().width(),
        height = env.map().height(),
        obs_len = env.observation_len(),
        "demo started"
    );

    for episode in 0..opts.episodes {
        if episode > 0 {
            env.reset()?;
        }
        let (mut hider_return, mut hunter_return) = (0.0f32, 0.0f32);
        let mut steps;
        loop {
            let hider = policy_rng.gen_range_usize(0, Action::COUNT);
            let hunter = policy_rng.gen_range_usize(0, Action::COUNT);
            let r = env.step_indices(hider, hunter)?;
            hider_return += r.rewards.hider;
            hunter_return += r.rewards.hunter;
            steps = r.steps;
            if r.done {
                break;
            }
            if env.config().episode.max_steps.is_none() && steps >= 10_000 {
                warn!("episode has no step cap, stopping demo episode at {steps} steps");
                break;
            }
        }
        let outcome = env.phase().as_str();
        println!(
            "episode={episode:3} outcome={outcome:<9} steps={steps:4} \
             hider={hider_return:+8.2} hunter={hunter_return:+8.2}"
        );
    }

    let stats = env.stats();
    println!(
        "episodes={} captures={} timeouts={} capture_rate={:.3} mean_len={:.1}",
        stats.episodes,
        stats.captures,
        stats.timeouts,
        stats.capture_rate(),
        stats.mean_length()
    );
    Ok(())
}

fn run_maze(opts: &Options) -> Result<(), CliError> {
    let env = HiderHunterEnv::new(load_config(opts)?)?;
    print!("{}", Snapshot::capture(&env).ascii());
    Ok(())
}

fn run_snapshot(opts: &Options) -> Result<(), CliError> {
    let env = HiderHunterEnv::new(load_config(opts)?)?;
    println!("{}", serde_json::to_string_pretty(&Snapshot::capture(&env))?);
    Ok(())
}
