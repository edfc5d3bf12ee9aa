//! mazechase: a two-agent pursuit simulation in procedurally generated mazes.
//!
//! A hider and a hunter move as circles through a grid maze carved by
//! randomized depth-first search. Each one perceives the world through a fan
//! of marched rays that report wall distance and the nearest body in view.
//! [`episode::HiderHunterEnv`] ties maze generation, movement, ray casting,
//! observation encoding and reward assignment into a step-able episode.
//!
//! Everything random flows through one seeded [`prng::Prng`], so a fixed
//! seed replays a run exactly.

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/maze.rs"]
pub mod maze;

#[path = "core/map.rs"]
pub mod map;

#[path = "core/agent.rs"]
pub mod agent;

#[path = "core/raycast.rs"]
pub mod raycast;

#[path = "core/observation.rs"]
pub mod observation;

#[path = "core/stats.rs"]
pub mod stats;

#[path = "core/episode.rs"]
pub mod episode;

#[path = "core/snapshot.rs"]
pub mod snapshot;

pub mod prelude {
    pub use crate::agent::{Agent, Body, EntityId, Wanderer};
    pub use crate::config::{
        AgentConfig, EpisodeConfig, MazeConfig, ResetMode, RewardConfig, RewardPair,
        SensorConfig, SimConfig, WandererConfig,
    };
    pub use crate::episode::{Action, EpisodePhase, HiderHunterEnv, Pose, Side, StepResult};
    pub use crate::error::{SimError, SimResult};
    pub use crate::map::GridMap;
    pub use crate::maze::{Cell, Grid};
    pub use crate::observation::{observation_len, ObservationLayout};
    pub use crate::prng::Prng;
    pub use crate::raycast::{ObjectHit, RayHit};
    pub use crate::snapshot::Snapshot;
    pub use crate::stats::EpisodeStats;
}
