use std::sync::Arc;

use glam::Vec2;
use log::{debug, error, info};

use crate::camera::{InputEvent, Key, OrbitCamera, PointerButton};
use crate::config::Config;
use crate::simulation::earth_moon::EarthMoonSimulation;
use crate::simulation::sagittarius::SagittariusSimulation;
use crate::simulation::solar_system::SolarSystemSimulation;
use crate::simulation::trait_def::{Simulation, World};

/// Per-run simulation state that used to be process-wide toggles.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationContext {
    /// Latched by the gravity key.
    pub gravity_enabled: bool,
    /// True while the gravity mouse button is held.
    pub gravity_held: bool,
    /// Simulated seconds per real second.
    pub time_scale: f64,
    pub sim_time: f64,
    pub frame: u64,
}

impl SimulationContext {
    fn new(gravity_enabled: bool, time_scale: f64) -> Self {
        Self {
            gravity_enabled,
            gravity_held: false,
            time_scale,
            sim_time: 0.0,
            frame: 0,
        }
    }

    pub fn gravity_active(&self) -> bool {
        self.gravity_enabled || self.gravity_held
    }
}

/// Owns the scenarios, the active world and camera, and drives one tick per frame.
pub struct SimulationManager {
    simulations: Vec<Arc<dyn Simulation + Send + Sync>>,
    current_simulation_index: usize,
    config: Config,
    time_scale_override: Option<f64>,
    context: SimulationContext,
    world: World,
    camera: OrbitCamera,
}

impl SimulationManager {
    /// Start with the scenario whose key is `scenario`, or the first one.
    pub fn new(config: Config, scenario: &str, time_scale_override: Option<f64>) -> Self {
        let simulations: Vec<Arc<dyn Simulation + Send + Sync>> = vec![
            Arc::new(SolarSystemSimulation),
            Arc::new(EarthMoonSimulation),
            Arc::new(SagittariusSimulation),
        ];
        let index = simulations.iter().position(|s| s.key() == scenario).unwrap_or_else(|| {
            error!("unknown scenario `{scenario}`, starting with the solar system");
            0
        });

        let simulation = simulations[index].clone();
        let world = simulation.build(&config).unwrap_or_else(|err| {
            error!("failed to build {}: {err}", simulation.name());
            World::Solar(crate::simulation::Scene::new(
                config.trail.clone(),
                config.simulation.min_separation,
            ))
        });
        let camera = simulation.camera(&config);
        let time_scale = time_scale_override.unwrap_or_else(|| simulation.time_scale(&config));
        info!("Starting {}: {}", simulation.name(), simulation.description());

        Self {
            simulations,
            current_simulation_index: index,
            context: SimulationContext::new(!world.is_black_hole(), time_scale),
            config,
            time_scale_override,
            world,
            camera,
        }
    }

    pub fn get_current_simulation(&self) -> Arc<dyn Simulation + Send + Sync> {
        self.simulations[self.current_simulation_index].clone()
    }

    pub fn get_current_index(&self) -> usize {
        self.current_simulation_index
    }

    pub fn get_simulation_count(&self) -> usize {
        self.simulations.len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn next_simulation(&mut self) -> bool {
        if self.current_simulation_index + 1 < self.get_simulation_count() {
            self.switch_to_simulation(self.current_simulation_index + 1)
        } else {
            false
        }
    }

    pub fn previous_simulation(&mut self) -> bool {
        if self.current_simulation_index > 0 {
            self.switch_to_simulation(self.current_simulation_index - 1)
        } else {
            false
        }
    }

    /// Rebuild the world for scenario `index`. A scenario that fails to
    /// build leaves the current one running.
    pub fn switch_to_simulation(&mut self, index: usize) -> bool {
        let Some(simulation) = self.simulations.get(index).cloned() else {
            return false;
        };
        match simulation.build(&self.config) {
            Ok(world) => {
                self.current_simulation_index = index;
                self.context = SimulationContext::new(
                    !world.is_black_hole(),
                    self.time_scale_override
                        .unwrap_or_else(|| simulation.time_scale(&self.config)),
                );
                self.world = world;
                self.camera = simulation.camera(&self.config);
                info!("Switched to {}: {}", simulation.name(), simulation.description());
                true
            }
            Err(err) => {
                error!("failed to build {}: {err}", simulation.name());
                false
            }
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = self.get_current_simulation().camera(&self.config);
        info!("Camera reset");
    }

    pub fn set_time_scale(&mut self, time_scale: f64) {
        if time_scale > 0.0 && time_scale.is_finite() {
            self.context.time_scale = time_scale;
            info!("Time scale: {time_scale} simulated seconds per second");
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => {
                self.camera.handle_mouse_move(Vec2::new(x, y));
            }
            InputEvent::Button { button, pressed } => {
                let consumed = if pressed {
                    self.camera.handle_mouse_press(button)
                } else {
                    self.camera.handle_mouse_release(button)
                };
                if !consumed && button == PointerButton::Right && self.world.is_black_hole() {
                    self.context.gravity_held = pressed;
                    debug!("Gravity held: {pressed}");
                }
            }
            InputEvent::Scroll { amount } => self.camera.handle_mouse_wheel(amount),
            InputEvent::Key { key, pressed: true } => self.handle_key(key),
            InputEvent::Key { pressed: false, .. } => {}
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::Tab => {
                if let Some(index) = self.camera.cycle_focus(&self.world) {
                    info!("Focus: registry entry {index}");
                }
            }
            Key::G => {
                if self.world.is_black_hole() {
                    self.context.gravity_enabled = !self.context.gravity_enabled;
                    info!("Gravity turned {}", if self.context.gravity_enabled { "ON" } else { "OFF" });
                }
            }
            Key::R => {
                if let World::Solar(scene) = &mut self.world {
                    scene.retarget_trails();
                    info!("Trails cleared; capacities follow the current orbits");
                }
            }
            Key::C => self.reset_camera(),
            Key::I => {
                let simulation = self.get_current_simulation();
                info!(
                    "{} ({}/{}): {}; t = {:.0} s, x{}",
                    simulation.name(),
                    self.current_simulation_index + 1,
                    self.simulations.len(),
                    simulation.description(),
                    self.context.sim_time,
                    self.context.time_scale
                );
            }
            Key::BracketRight => self.set_time_scale(self.context.time_scale * 2.0),
            Key::BracketLeft => self.set_time_scale(self.context.time_scale * 0.5),
            Key::Digit(n) if n >= 1 => {
                self.switch_to_simulation(n as usize - 1);
            }
            Key::ArrowRight | Key::N => {
                self.next_simulation();
            }
            Key::ArrowLeft | Key::P => {
                self.previous_simulation();
            }
            Key::Digit(_) | Key::Other => {}
        }
    }

    /// Advance one frame of `wall_dt` real seconds: physics, trails, camera
    /// follow, then the warp grid and GPU table in black-hole mode.
    ///
    /// Returns the simulated seconds that elapsed.
    pub fn tick(&mut self, wall_dt: f64) -> f64 {
        let wall_dt = if wall_dt.is_finite() {
            wall_dt.clamp(0.0, self.config.simulation.max_frame_seconds)
        } else {
            0.0
        };
        let dt = wall_dt * self.context.time_scale;
        self.context.frame += 1;
        self.context.sim_time += dt;

        match &mut self.world {
            World::Solar(scene) => {
                scene.step(dt);
                scene.sample_trails(self.context.sim_time);
            }
            World::BlackHole(system) => {
                system.step(dt, self.context.gravity_active());
            }
        }
        self.camera.follow(&self.world);
        if let World::BlackHole(system) = &mut self.world {
            system.refresh();
        }
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(scenario: &str) -> SimulationManager {
        SimulationManager::new(Config::default(), scenario, None)
    }

    fn press(manager: &mut SimulationManager, key: Key) {
        manager.handle_input(InputEvent::Key { key, pressed: true });
    }

    #[test]
    fn starts_with_requested_scenario() {
        assert_eq!(manager("earth-moon").get_current_index(), 1);
        assert_eq!(manager("black-hole").get_current_simulation().key(), "black-hole");
        assert_eq!(manager("nonsense").get_current_index(), 0);
    }

    #[test]
    fn scenario_switching_stays_in_range() {
        let mut manager = manager("solar");
        assert!(!manager.previous_simulation());
        press(&mut manager, Key::Digit(3));
        assert!(manager.world().is_black_hole());
        assert!(!manager.next_simulation());
        press(&mut manager, Key::Digit(9));
        assert_eq!(manager.get_current_index(), 2);
        press(&mut manager, Key::P);
        assert_eq!(manager.get_current_index(), 1);
    }

    #[test]
    fn gravity_key_and_button_in_black_hole_mode() {
        let mut manager = manager("black-hole");
        assert!(!manager.context().gravity_active());

        manager.handle_input(InputEvent::Button {
            button: PointerButton::Right,
            pressed: true,
        });
        assert!(manager.context().gravity_held);
        manager.handle_input(InputEvent::Button {
            button: PointerButton::Right,
            pressed: false,
        });
        assert!(!manager.context().gravity_active());

        press(&mut manager, Key::G);
        assert!(manager.context().gravity_enabled);
    }

    #[test]
    fn black_hole_stars_only_move_with_gravity() {
        let mut manager = manager("black-hole");
        let start = match manager.world() {
            World::BlackHole(system) => system.objects()[0].position,
            World::Solar(_) => unreachable!(),
        };
        manager.tick(0.016);
        let World::BlackHole(system) = manager.world() else { unreachable!() };
        assert_eq!(system.objects()[0].position, start);

        press(&mut manager, Key::G);
        manager.tick(0.016);
        let World::BlackHole(system) = manager.world() else { unreachable!() };
        assert_ne!(system.objects()[0].position, start);
    }

    #[test]
    fn wall_clock_delta_is_clamped() {
        let mut manager = manager("solar");
        let dt = manager.tick(5.0);
        assert_eq!(dt, 0.1 * 86_400.0);
        assert_eq!(manager.tick(f64::NAN), 0.0);
        assert_eq!(manager.context().frame, 2);
    }

    #[test]
    fn time_scale_keys_double_and_halve() {
        let mut manager = manager("solar");
        press(&mut manager, Key::BracketRight);
        assert_eq!(manager.context().time_scale, 172_800.0);
        press(&mut manager, Key::BracketLeft);
        press(&mut manager, Key::BracketLeft);
        assert_eq!(manager.context().time_scale, 43_200.0);
    }

    #[test]
    fn camera_follows_focused_planet() {
        let mut manager = manager("earth-moon");
        press(&mut manager, Key::Tab);
        press(&mut manager, Key::Tab);
        assert_eq!(manager.camera().focus(), Some(1));
        for _ in 0..30 {
            manager.tick(0.05);
        }
        let World::Solar(scene) = manager.world() else { unreachable!() };
        let earth = scene.iter().nth(1).map(|(_, body)| body.position.as_vec3()).unwrap();
        assert_eq!(manager.camera().target(), earth);
    }
}
