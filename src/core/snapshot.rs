//! Serializable frame of an environment, for renderers and debugging.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, EntityId};
use crate::episode::{EpisodePhase, HiderHunterEnv, Side};
use crate::map::cell_of;
use crate::raycast::RayHit;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentView {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub radius: f32,
}

impl From<&Agent> for AgentView {
    fn from(a: &Agent) -> Self {
        Self {
            id: a.id,
            x: a.x,
            y: a.y,
            heading: a.heading,
            radius: a.radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// Maze rows, `#` for wall and space for floor.
    pub rows: Vec<String>,
    pub hider: AgentView,
    pub hunter: AgentView,
    /// Wanderer positions (heading is their current walking direction).
    pub wanderers: Vec<AgentView>,
    pub hider_rays: Vec<RayHit>,
    pub hunter_rays: Vec<RayHit>,
    pub steps: u32,
    pub phase: EpisodePhase,
}

impl Snapshot {
    pub fn capture(env: &HiderHunterEnv) -> Self {
        let wanderers = env
            .wanderers()
            .iter()
            .map(|w| AgentView {
                id: w.id,
                x: w.x,
                y: w.y,
                heading: w.target_dir,
                radius: w.radius,
            })
            .collect();

        Self {
            rows: env.map().grid().rows(),
            hider: env.hider().into(),
            hunter: env.hunter().into(),
            wanderers,
            hider_rays: env.rays_for(Side::Hider),
            hunter_rays: env.rays_for(Side::Hunter),
            steps: env.steps(),
            phase: env.phase(),
        }
    }

    /// Maze rows with `H` (hider), `C` (hunter) and `w` (wanderers) drawn in.
    /// The hunter wins a shared cell.
    pub fn ascii(&self) -> String {
        let mut canvas: Vec<Vec<char>> = self.rows.iter().map(|r| r.chars().collect()).collect();
        let mut mark = |view: &AgentView, ch: char| {
            let (cx, cy) = cell_of(view.x, view.y);
            if let Some(slot) = canvas.get_mut(cy).and_then(|row| row.get_mut(cx)) {
                *slot = ch;
            }
        };

        for w in &self.wanderers {
            mark(w, 'w');
        }
        mark(&self.hider, 'H');
        mark(&self.hunter, 'C');

        let mut out = String::new();
        for row in canvas {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::episode::Pose;
    use crate::map::GridMap;
    use crate::maze::Grid;

    fn env() -> HiderHunterEnv {
        let map = GridMap::new(Grid::open_room(6, 4));
        let mut env = HiderHunterEnv::with_map(SimConfig::default().with_seed(1), map).unwrap();
        env.reset_at(Pose::new(1.5, 1.5, 0.0), Pose::new(4.5, 2.5, 0.0)).unwrap();
        env
    }

    #[test]
    fn ascii_marks_agents() {
        let snap = Snapshot::capture(&env());
        assert_eq!(snap.ascii(), "######\n#H   #\n#   C#\n######\n");
        assert_eq!(snap.hider_rays.len(), 15);
        assert_eq!(snap.steps, 0);
        assert_eq!(snap.phase, EpisodePhase::Running);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_to_json() {
        let snap = Snapshot::capture(&env());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "running");
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["hider"]["id"], 0);
        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.rows, snap.rows);
    }
}
