use std::collections::VecDeque;
use std::f64::consts::TAU;

use glam::DVec3;

use crate::config::TrailConfig;

// Speeds below this are treated as "not orbiting" for the period estimate
const MIN_ORBITAL_SPEED: f64 = 1e-9;

/// How many points a trail keeps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Retention {
    /// Fixed cap, used for bodies without a primary (stars).
    Fixed(usize),
    /// Capacity follows the instantaneous orbital period, bounded by `max`.
    Periodic { max: usize },
}

/// Distance to the gravitational primary and speed relative to it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSample {
    pub distance: f64,
    pub speed: f64,
}

impl OrbitSample {
    /// Instantaneous period estimate `2πr/v`, `None` when the body is not moving.
    pub fn period(&self) -> Option<f64> {
        if self.speed.is_finite() && self.speed > MIN_ORBITAL_SPEED && self.distance.is_finite() {
            Some(TAU * self.distance / self.speed)
        } else {
            None
        }
    }
}

/// Chronological history of past positions, oldest at the front.
#[derive(Debug, Clone)]
pub struct OrbitTrail {
    points: VecDeque<DVec3>,
    retention: Retention,
    capacity: usize,
    sample_interval: f64,
    last_sample: Option<f64>,
}

impl OrbitTrail {
    pub fn periodic(config: &TrailConfig) -> Self {
        Self::new(
            Retention::Periodic {
                max: config.max_capacity,
            },
            config.sample_interval,
        )
    }

    pub fn fixed(config: &TrailConfig) -> Self {
        Self::new(Retention::Fixed(config.star_capacity), config.sample_interval)
    }

    pub fn new(retention: Retention, sample_interval: f64) -> Self {
        let capacity = match retention {
            Retention::Fixed(cap) => cap,
            Retention::Periodic { max } => max,
        };
        Self {
            points: VecDeque::new(),
            retention,
            capacity,
            sample_interval,
            last_sample: None,
        }
    }

    /// Record `position` if a full sampling interval of simulation time has
    /// elapsed since the previous sample. Returns whether a sample was taken.
    ///
    /// A tick that spans several intervals still records a single sample.
    pub fn on_tick(&mut self, position: DVec3, orbit: Option<OrbitSample>, sim_time: f64) -> bool {
        match self.last_sample {
            Some(last) if sim_time - last < self.sample_interval => return false,
            Some(last) => {
                let elapsed = ((sim_time - last) / self.sample_interval).floor();
                self.last_sample = Some(last + elapsed * self.sample_interval);
            }
            None => self.last_sample = Some(sim_time),
        }

        if !position.is_finite() {
            log::trace!("skipping non-finite trail sample");
            return false;
        }
        self.points.push_back(position);

        if let Retention::Periodic { max } = self.retention {
            // Keep the previous capacity when no period can be estimated
            if let Some(period) = orbit.and_then(|o| o.period()) {
                let cap = (period / self.sample_interval).ceil();
                self.capacity = if cap.is_finite() { (cap as usize).clamp(1, max) } else { max };
            }
        }

        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        true
    }

    /// Drop the history; the next tick samples immediately and re-estimates capacity.
    pub fn retarget(&mut self) {
        self.points.clear();
        self.last_sample = None;
        if let Retention::Periodic { max } = self.retention {
            self.capacity = max;
        }
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &DVec3> + '_ {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than two points draw nothing.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(interval: f64) -> TrailConfig {
        TrailConfig {
            sample_interval: interval,
            star_capacity: 5,
            max_capacity: 10_000,
        }
    }

    #[test]
    fn samples_on_simulation_time_not_ticks() {
        let mut trail = OrbitTrail::periodic(&config(10.0));
        let mut taken = 0;
        for step in 0..100 {
            if trail.on_tick(DVec3::X * step as f64, None, step as f64) {
                taken += 1;
            }
        }
        // t = 0, 10, ..., 90
        assert_eq!(taken, 10);
        assert_eq!(trail.len(), 10);
    }

    #[test]
    fn periodic_capacity_follows_period() {
        let mut trail = OrbitTrail::periodic(&config(1.0));
        let orbit = OrbitSample {
            distance: 8.0,
            speed: TAU,
        };
        for t in 0..50 {
            trail.on_tick(DVec3::new(t as f64, 0.0, 0.0), Some(orbit), t as f64);
        }
        assert_eq!(trail.capacity(), 8);
        assert_eq!(trail.len(), 8);
        // Oldest evicted first
        assert_eq!(trail.points().next().unwrap().x, 42.0);
    }

    #[test]
    fn zero_speed_keeps_previous_capacity() {
        let mut trail = OrbitTrail::periodic(&config(1.0));
        let moving = OrbitSample {
            distance: 4.0,
            speed: TAU,
        };
        trail.on_tick(DVec3::ZERO, Some(moving), 0.0);
        assert_eq!(trail.capacity(), 4);
        let stalled = OrbitSample {
            distance: 4.0,
            speed: 0.0,
        };
        trail.on_tick(DVec3::ONE, Some(stalled), 1.0);
        assert_eq!(trail.capacity(), 4);
    }

    #[test]
    fn fixed_retention_ignores_period() {
        let mut trail = OrbitTrail::fixed(&config(1.0));
        assert_eq!(trail.retention(), Retention::Fixed(5));
        let orbit = OrbitSample {
            distance: 1000.0,
            speed: 1.0,
        };
        for t in 0..20 {
            trail.on_tick(DVec3::ZERO, Some(orbit), t as f64);
        }
        assert_eq!(trail.len(), 5);
    }

    #[test]
    fn single_point_is_not_drawable() {
        let mut trail = OrbitTrail::periodic(&config(1.0));
        assert!(!trail.is_drawable());
        trail.on_tick(DVec3::ZERO, None, 0.0);
        assert!(!trail.is_drawable());
        trail.on_tick(DVec3::ONE, None, 1.0);
        assert!(trail.is_drawable());
    }

    #[test]
    fn retarget_clears_history() {
        let mut trail = OrbitTrail::periodic(&config(1.0));
        for t in 0..5 {
            trail.on_tick(DVec3::ZERO, None, t as f64);
        }
        trail.retarget();
        assert!(trail.is_empty());
        assert!(trail.on_tick(DVec3::ZERO, None, 5.2));
    }
}
