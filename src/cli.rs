use crate::config::EngineConfigOverrides;
use crate::input::ScaleCommand;
use crate::quality::QualityTier;
use crate::scale::ScaleLevel;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/scale.json";
pub const DEFAULT_TOUR: &str = "up,up,down,back,mag:21,atomic";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    scale: Option<ScaleLevel>,
    duration: Option<f32>,
    quality: Option<QualityTier>,
    target_fps: Option<f32>,
    history: Option<usize>,
    tour: Option<Vec<ScaleCommand>>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name <value>.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "scale" => overrides.scale = Some(value.parse()?),
                "duration" => {
                    let seconds =
                        value.parse::<f32>().with_context(|| format!("Invalid duration '{value}'"))?;
                    if !seconds.is_finite() || seconds < 0.0 {
                        bail!("Duration must be a non-negative number of seconds, got '{value}'");
                    }
                    overrides.duration = Some(seconds);
                }
                "quality" => overrides.quality = Some(value.parse()?),
                "target-fps" => {
                    let fps = value.parse::<f32>().with_context(|| format!("Invalid target fps '{value}'"))?;
                    if !fps.is_finite() || fps <= 0.0 {
                        bail!("Target fps must be positive, got '{value}'");
                    }
                    overrides.target_fps = Some(fps);
                }
                "history" => {
                    overrides.history =
                        Some(value.parse::<usize>().with_context(|| format!("Invalid history size '{value}'"))?);
                }
                "tour" => overrides.tour = Some(parse_tour(&value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --scale, --duration, --quality, \
                     --target-fps, --history, --tour."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn tour(&self) -> Result<Vec<ScaleCommand>> {
        match &self.tour {
            Some(tour) => Ok(tour.clone()),
            None => parse_tour(DEFAULT_TOUR),
        }
    }

    pub fn config_overrides(&self) -> EngineConfigOverrides {
        EngineConfigOverrides {
            initial_scale: self.scale,
            transition_duration_secs: self.duration,
            quality: self.quality,
            target_fps: self.target_fps,
            max_history: self.history,
        }
    }
}

/// Parses a comma separated command list such as `up,down,back,mag:21,galactic`.
pub fn parse_tour(raw: &str) -> Result<Vec<ScaleCommand>> {
    raw.split(',').map(str::trim).filter(|step| !step.is_empty()).map(parse_step).collect()
}

fn parse_step(step: &str) -> Result<ScaleCommand> {
    let lowered = step.to_ascii_lowercase();
    let command = match lowered.as_str() {
        "up" | "+" => ScaleCommand::ScaleUp,
        "down" | "-" => ScaleCommand::ScaleDown,
        "back" => ScaleCommand::GoBack,
        "quality+" => ScaleCommand::QualityUp,
        "quality-" => ScaleCommand::QualityDown,
        other => match other.strip_prefix("mag:") {
            Some(magnitude) => ScaleCommand::JumpToMagnitude(
                magnitude.parse().with_context(|| format!("Invalid magnitude in tour step '{step}'"))?,
            ),
            None => ScaleCommand::JumpTo(other.parse().with_context(|| format!("Invalid tour step '{step}'"))?),
        },
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_overrides() {
        let args = ["app", "--scale", "galactic", "--duration", "0.5", "--quality", "low", "--target-fps", "144"];
        let cli = CliOverrides::parse(args).expect("parse overrides");
        let overrides = cli.config_overrides();
        assert_eq!(overrides.initial_scale, Some(ScaleLevel::Galactic));
        assert_eq!(overrides.transition_duration_secs, Some(0.5));
        assert_eq!(overrides.quality, Some(QualityTier::Low));
        assert_eq!(overrides.target_fps, Some(144.0));
        assert_eq!(cli.config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn latest_flag_wins() {
        let cli = CliOverrides::parse(["app", "--history", "4", "--history", "12"]).expect("parse overrides");
        assert_eq!(cli.config_overrides().max_history, Some(12));
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["app", "--scale"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_bad_values() {
        let err = CliOverrides::parse(["app", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
        assert!(CliOverrides::parse(["app", "--duration", "-1"]).is_err());
        assert!(CliOverrides::parse(["app", "--scale", "quasar"]).is_err());
    }

    #[test]
    fn tours_parse_into_commands() {
        let tour = parse_tour("up, down ,back,mag:-10,quality-,solar_system").expect("parse tour");
        assert_eq!(
            tour,
            vec![
                ScaleCommand::ScaleUp,
                ScaleCommand::ScaleDown,
                ScaleCommand::GoBack,
                ScaleCommand::JumpToMagnitude(-10),
                ScaleCommand::QualityDown,
                ScaleCommand::JumpTo(ScaleLevel::SolarSystem),
            ]
        );
        assert!(parse_tour("up,sideways").is_err());
        assert!(CliOverrides::default().tour().is_ok());
    }
}
