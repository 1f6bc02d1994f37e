use kestrel_scale::cli::CliOverrides;
use kestrel_scale::config::EngineConfig;
use kestrel_scale::tour::run_tour;
use kestrel_scale::ScaleEngine;

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES_PER_STEP: u32 = 60 * 30;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&cli) {
        log::error!("Tour failed: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: &CliOverrides) -> anyhow::Result<()> {
    let mut config = EngineConfig::load_or_default(cli.config_path());
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        log::info!("[cli] overriding {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);
    let tour = cli.tour()?;
    let mut engine = ScaleEngine::new(&config);
    let report = run_tour(&mut engine, &tour, FRAME_DT, MAX_FRAMES_PER_STEP);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
