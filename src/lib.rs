pub mod camera;
pub mod cli;
pub mod config;
pub mod easing;
pub mod ecs;
pub mod engine;
pub mod events;
pub mod governor;
pub mod input;
pub mod navigator;
pub mod quality;
pub mod render_params;
pub mod scale;
pub mod tour;
pub mod transition;

pub use engine::{CommandOutcome, ScaleEngine};
pub use events::{ScaleEvent, ScaleEventKind, SubscriptionId};
pub use navigator::{NavigationOutcome, ScaleNavigator, ScaleSnapshot, ScaleState};
pub use quality::QualityTier;
pub use scale::{ScaleInfo, ScaleLevel, ScaleRegistry};
