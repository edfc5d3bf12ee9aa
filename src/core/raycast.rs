//! Fixed-step 2D ray marching against the grid and circular bodies.
//!
//! Each ray walks outward from the origin in increments of
//! [`SensorConfig::step_size`]. At every sample point the dynamic bodies are
//! tested first, then the grid; the first wall sample ends the ray. This
//! means a body is only seen if some sample lands inside it before the ray
//! reaches a wall, and the reported wall distance overshoots the true
//! boundary by less than one step.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agent::{Body, EntityId};
use crate::config::SensorConfig;
use crate::map::GridMap;

/// Nearest dynamic body intersected along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectHit {
    pub id: EntityId,
    pub distance: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RayHit {
    /// Absolute ray angle (radians, not wrapped).
    pub angle: f32,
    /// Whether the ray ended on a wall (as opposed to running out of range).
    pub hit: bool,
    /// Wall sample point, or the max-range end point when `hit` is false.
    pub hit_x: f32,
    pub hit_y: f32,
    /// Wall distance, capped at the configured maximum.
    pub distance: f32,
    pub object: Option<ObjectHit>,
}

impl RayHit {
    /// Distance to the nearest body on this ray, if any.
    pub fn object_distance(&self) -> Option<f32> {
        self.object.map(|o| o.distance)
    }

    pub fn sees(&self, id: EntityId) -> bool {
        self.object.is_some_and(|o| o.id == id)
    }
}

/// Cast `sensor.num_rays` rays spread evenly across `sensor.fov`, centered on
/// `heading`, ordered from `heading - fov/2` to `heading + fov/2`.
///
/// A single ray points straight along `heading - fov/2`.
pub fn cast_fan(
    origin: (f32, f32),
    heading: f32,
    sensor: &SensorConfig,
    map: &GridMap,
    bodies: &[&dyn Body],
) -> Vec<RayHit> {
    let n = sensor.num_rays;
    let start = heading - sensor.fov / 2.0;
    let spacing = sensor.fov / (n.max(2) - 1) as f32;
    let angle_of = |i: usize| start + i as f32 * spacing;

    collect_rays(n, |i| cast_ray(origin, angle_of(i), sensor, map, bodies))
}

// Rays are independent; the map and bodies are only borrowed for the call.
#[cfg(feature = "parallel")]
fn collect_rays<F>(n: usize, cast: F) -> Vec<RayHit>
where
    F: Fn(usize) -> RayHit + Send + Sync,
{
    (0..n).into_par_iter().map(cast).collect()
}

#[cfg(not(feature = "parallel"))]
fn collect_rays<F>(n: usize, cast: F) -> Vec<RayHit>
where
    F: Fn(usize) -> RayHit,
{
    (0..n).map(cast).collect()
}

/// March a single ray.
pub fn cast_ray(
    origin: (f32, f32),
    angle: f32,
    sensor: &SensorConfig,
    map: &GridMap,
    bodies: &[&dyn Body],
) -> RayHit {
    let (x0, y0) = origin;
    let (sin, cos) = angle.sin_cos();
    let step = sensor.step_size;
    let max_distance = sensor.max_distance;
    // Sample index instead of an accumulated distance keeps samples exact.
    let max_steps = (max_distance / step).floor() as u32;

    let mut object: Option<ObjectHit> = None;

    for i in 0..=max_steps {
        let d = i as f32 * step;
        let x = x0 + cos * d;
        let y = y0 + sin * d;

        for body in bodies {
            let (bx, by) = body.position();
            if (x - bx).hypot(y - by) <= body.radius() {
                let closer = object.map_or(true, |o| d < o.distance);
                if closer {
                    object = Some(ObjectHit {
                        id: body.id(),
                        distance: d,
                        x,
                        y,
                    });
                }
            }
        }

        if map.is_wall(x, y) {
            return RayHit {
                angle,
                hit: true,
                hit_x: x,
                hit_y: y,
                distance: d,
                object,
            };
        }
    }

    RayHit {
        angle,
        hit: false,
        hit_x: x0 + cos * max_distance,
        hit_y: y0 + sin * max_distance,
        distance: max_distance,
        object,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, EntityId, Wanderer};
    use crate::config::{AgentConfig, WandererConfig};
    use crate::maze::Grid;
    use crate::prng::Prng;
    use core::f32::consts::{FRAC_PI_2, PI};

    fn sensor(num_rays: usize, fov: f32) -> SensorConfig {
        SensorConfig {
            fov,
            num_rays,
            ..SensorConfig::default()
        }
    }

    fn corridor() -> GridMap {
        // 11 floor cells between x=1 and x=11 on row 1.
        GridMap::new(Grid::open_room(13, 3))
    }

    #[test]
    fn fan_is_ordered_and_evenly_spaced() {
        let map = GridMap::new(Grid::open_room(9, 9));
        let fov = 60f32.to_radians();
        let rays = cast_fan((4.5, 4.5), 1.0, &sensor(5, fov), &map, &[]);
        assert_eq!(rays.len(), 5);
        assert!((rays[0].angle - (1.0 - fov / 2.0)).abs() < 1e-6);
        assert!((rays[4].angle - (1.0 + fov / 2.0)).abs() < 1e-5);
        for pair in rays.windows(2) {
            assert!((pair[1].angle - pair[0].angle - fov / 4.0).abs() < 1e-5);
        }

        let single = cast_fan((4.5, 4.5), 1.0, &sensor(1, fov), &map, &[]);
        assert_eq!(single.len(), 1);
        assert!((single[0].angle - (1.0 - fov / 2.0)).abs() < 1e-6);
    }

    #[test]
    fn adjacent_wall_within_one_step() {
        let map = GridMap::new(Grid::open_room(5, 5));
        let s = SensorConfig::default();
        // From the center of (1,1) the wall cell (1,0) starts 0.5 above.
        let up = cast_ray((1.5, 1.5), -FRAC_PI_2, &s, &map, &[]);
        assert!(up.hit);
        assert!(up.distance >= 0.5 - 1e-4);
        assert!(up.distance <= 0.5 + s.step_size + 1e-4);

        // East: wall cell (4,1) starts 2.5 away.
        let east = cast_ray((1.5, 1.5), 0.0, &s, &map, &[]);
        assert!(east.hit);
        assert!((east.distance - 2.5).abs() <= s.step_size + 1e-4);
        assert!(east.hit_x >= 4.0);
    }

    #[test]
    fn distance_saturates_at_max_range() {
        let map = corridor();
        let s = SensorConfig {
            max_distance: 3.0,
            ..SensorConfig::default()
        };
        let ray = cast_ray((1.5, 1.5), 0.0, &s, &map, &[]);
        assert!(!ray.hit);
        assert_eq!(ray.distance, 3.0);
        assert!((ray.hit_x - 4.5).abs() < 1e-5);
    }

    #[test]
    fn wall_distance_grows_with_range() {
        let map = corridor();
        let mut last = 0.0;
        for max in [1.0f32, 2.0, 4.0, 8.0, 16.0] {
            let s = SensorConfig {
                max_distance: max,
                ..SensorConfig::default()
            };
            let ray = cast_ray((1.5, 1.5), 0.0, &s, &map, &[]);
            assert!(ray.distance >= last);
            assert!(ray.distance <= max);
            last = ray.distance;
        }
        // Wall at x = 12 is 10.5 away.
        assert!((last - 10.5).abs() <= 0.02 + 1e-3);
    }

    #[test]
    fn reports_nearest_body_before_wall() {
        let map = corridor();
        let cfg = AgentConfig::default();
        let near = Agent::new(EntityId::HUNTER, 4.5, 1.5, 0.0, &cfg);
        let mut rng = Prng::new(1);
        let far = Wanderer::new(
            EntityId::wanderer(0),
            7.5,
            1.5,
            &WandererConfig::default(),
            &mut rng,
        );

        let bodies: [&dyn Body; 2] = [&far, &near];
        let ray = cast_ray((1.5, 1.5), 0.0, &SensorConfig::default(), &map, &bodies);
        let obj = ray.object.unwrap();
        assert_eq!(obj.id, EntityId::HUNTER);
        // Circle edge is at 3.0 - radius.
        assert!((obj.distance - (3.0 - cfg.radius)).abs() <= 0.02 + 1e-4);
        assert!(ray.sees(EntityId::HUNTER));
        // The wall scan keeps going past the body.
        assert!(ray.hit);
        assert!((ray.distance - 10.5).abs() <= 0.02 + 1e-3);
    }

    #[test]
    fn body_behind_wall_is_not_seen() {
        let map = GridMap::new(Grid::from_rows(&["#######", "#  #  #", "#######"]).unwrap());
        let hunter = Agent::new(EntityId::HUNTER, 4.5, 1.5, 0.0, &AgentConfig::default());
        let bodies: [&dyn Body; 1] = [&hunter];
        let ray = cast_ray((1.5, 1.5), 0.0, &SensorConfig::default(), &map, &bodies);
        assert!(ray.hit);
        assert!(ray.object.is_none());
        assert_eq!(ray.object_distance(), None);
    }

    #[test]
    fn ray_pointing_away_misses_body() {
        let map = corridor();
        let hunter = Agent::new(EntityId::HUNTER, 4.5, 1.5, 0.0, &AgentConfig::default());
        let bodies: [&dyn Body; 1] = [&hunter];
        let ray = cast_ray((3.5, 1.5), PI, &SensorConfig::default(), &map, &bodies);
        assert!(ray.object.is_none());
        assert!((ray.distance - 2.5).abs() <= 0.02 + 1e-4);
    }
}
