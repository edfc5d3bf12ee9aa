//! Per-agent observation vectors.
//!
//! Layout for `n` rays (indices into the flat vector):
//!
//! ```text
//! [0, n)        wall distance per ray, min(d, max) / max
//! [n, 2n)       opponent distance per ray, 1.0 when the opponent is not the
//!               nearest body on that ray
//! 2n .. 2n+4    cos(own heading), sin(own heading),
//!               cos(opponent heading), sin(opponent heading)
//! 2n+4 .. 2n+6  velocity slots, always 0.0
//! ```

use core::ops::Range;

use crate::agent::{Agent, Body};
use crate::config::SensorConfig;
use crate::map::GridMap;
use crate::raycast::{cast_fan, RayHit};

const HEADING_SLOTS: usize = 4;
const VELOCITY_SLOTS: usize = 2;

/// `2 * num_rays + 6`.
pub const fn observation_len(num_rays: usize) -> usize {
    2 * num_rays + HEADING_SLOTS + VELOCITY_SLOTS
}

/// Channel ranges inside an observation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationLayout {
    pub num_rays: usize,
}

impl ObservationLayout {
    pub fn new(num_rays: usize) -> Self {
        Self { num_rays }
    }

    pub fn total_len(&self) -> usize {
        observation_len(self.num_rays)
    }

    pub fn walls(&self) -> Range<usize> {
        0..self.num_rays
    }

    pub fn opponent(&self) -> Range<usize> {
        self.num_rays..2 * self.num_rays
    }

    pub fn headings(&self) -> Range<usize> {
        let start = 2 * self.num_rays;
        start..start + HEADING_SLOTS
    }

    pub fn velocity(&self) -> Range<usize> {
        let start = 2 * self.num_rays + HEADING_SLOTS;
        start..start + VELOCITY_SLOTS
    }
}

/// Observation of `me` with `other` as the only body in view.
pub fn observe(me: &Agent, other: &Agent, map: &GridMap, sensor: &SensorConfig) -> Vec<f32> {
    observe_with(me, other, &[], map, sensor)
}

/// Observation of `me` where `bystanders` (e.g. wanderers) can also block
/// the opponent on a ray.
pub fn observe_with(
    me: &Agent,
    other: &Agent,
    bystanders: &[&dyn Body],
    map: &GridMap,
    sensor: &SensorConfig,
) -> Vec<f32> {
    let mut bodies: Vec<&dyn Body> = Vec::with_capacity(1 + bystanders.len());
    bodies.push(other);
    bodies.extend_from_slice(bystanders);

    let rays = cast_fan((me.x, me.y), me.heading, sensor, map, &bodies);
    encode(&rays, me, other, sensor)
}

/// Turn a ray fan into the flat feature vector.
pub fn encode(rays: &[RayHit], me: &Agent, other: &Agent, sensor: &SensorConfig) -> Vec<f32> {
    let max = sensor.max_distance;
    let mut obs = Vec::with_capacity(observation_len(rays.len()));

    obs.extend(rays.iter().map(|r| r.distance.min(max) / max));
    obs.extend(rays.iter().map(|r| match r.object {
        Some(hit) if hit.id == other.id => hit.distance.min(max) / max,
        _ => 1.0,
    }));

    let (my_sin, my_cos) = me.heading.sin_cos();
    let (other_sin, other_cos) = other.heading.sin_cos();
    obs.extend_from_slice(&[my_cos, my_sin, other_cos, other_sin]);
    obs.extend_from_slice(&[0.0; VELOCITY_SLOTS]);

    obs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{EntityId, Wanderer};
    use crate::config::{AgentConfig, WandererConfig};
    use crate::maze::Grid;
    use crate::prng::Prng;
    use core::f32::consts::PI;

    fn corridor() -> GridMap {
        GridMap::new(Grid::open_room(13, 3))
    }

    fn pair(hider_x: f32, hunter_x: f32) -> (Agent, Agent) {
        let cfg = AgentConfig::default();
        (
            Agent::new(EntityId::HIDER, hider_x, 1.5, 0.0, &cfg),
            Agent::new(EntityId::HUNTER, hunter_x, 1.5, PI, &cfg),
        )
    }

    #[test]
    fn length_matches_layout() {
        let map = corridor();
        let (hider, hunter) = pair(1.5, 6.5);
        for n in [1usize, 2, 15, 45] {
            let sensor = SensorConfig {
                num_rays: n,
                ..SensorConfig::default()
            };
            let obs = observe(&hider, &hunter, &map, &sensor);
            assert_eq!(obs.len(), 2 * n + 6);
            assert_eq!(ObservationLayout::new(n).total_len(), obs.len());
            assert_eq!(ObservationLayout::new(n).velocity().end, obs.len());
        }
    }

    #[test]
    fn opponent_straight_ahead_is_visible() {
        let map = corridor();
        let (hider, hunter) = pair(1.5, 6.5);
        let sensor = SensorConfig {
            num_rays: 3,
            fov: 0.2,
            ..SensorConfig::default()
        };
        let obs = observe(&hider, &hunter, &map, &sensor);
        let layout = ObservationLayout::new(3);

        // Center ray points along +x straight at the hunter.
        let center = obs[layout.opponent()][1];
        let expected = (5.0 - hunter.radius) / sensor.max_distance;
        assert!((center - expected).abs() <= 0.02 / sensor.max_distance + 1e-5);

        for v in &obs[layout.walls()] {
            assert!(*v > 0.0 && *v <= 1.0);
        }

        let h = &obs[layout.headings()];
        assert!((h[0] - 1.0).abs() < 1e-6);
        assert!(h[1].abs() < 1e-6);
        assert!((h[2] + 1.0).abs() < 1e-6);
        assert!(h[3].abs() < 1e-5);
        assert_eq!(&obs[layout.velocity()], &[0.0f32, 0.0][..]);
    }

    #[test]
    fn opponent_behind_is_reported_as_not_visible() {
        let map = corridor();
        let (hider, hunter) = pair(6.5, 2.5);
        let obs = observe(&hider, &hunter, &map, &SensorConfig::default());
        let layout = ObservationLayout::new(15);
        assert!(obs[layout.opponent()].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn bystander_in_front_hides_opponent() {
        let map = corridor();
        let (hider, hunter) = pair(1.5, 8.5);
        let mut rng = Prng::new(2);
        let blocker = Wanderer::new(
            EntityId::wanderer(0),
            4.5,
            1.5,
            &WandererConfig::default(),
            &mut rng,
        );
        let sensor = SensorConfig {
            num_rays: 1,
            fov: 0.0,
            ..SensorConfig::default()
        };
        let bystanders: [&dyn Body; 1] = [&blocker];
        let obs = observe_with(&hider, &hunter, &bystanders, &map, &sensor);
        assert_eq!(obs[1], 1.0);

        let clear = observe(&hider, &hunter, &map, &sensor);
        assert!(clear[1] < 1.0);
    }
}
