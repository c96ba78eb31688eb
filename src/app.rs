use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::{InputEvent, Key, PointerButton};
use crate::rendering::{FrameData, Renderer};
use crate::simulation::SimulationManager;

// Touchpad pixel deltas are much larger than wheel notches
const PIXEL_SCROLL_SCALE: f32 = 0.003;

pub struct App {
    manager: SimulationManager,
    state: Option<Renderer>,
    last_frame: Option<Instant>,
}

impl App {
    pub fn new(manager: SimulationManager) -> Self {
        Self {
            manager,
            state: None,
            last_frame: None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let now = Instant::now();
        let wall_dt = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.last_frame = Some(now);
        self.manager.tick(wall_dt);

        let frame = FrameData::new(
            self.manager.world(),
            self.manager.camera(),
            self.manager.config(),
            state.aspect(),
        );
        match state.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU is out of memory; stopping");
                event_loop.exit();
            }
            Err(err) => warn!("skipped frame: {err}"),
        }
        // Emits a new redraw requested event.
        state.get_window().request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let attributes = Window::default_attributes().with_title("Gravity Playground");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone())) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                error!("failed to initialise the renderer: {err:#}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::Resized(size) => {
                // Reconfigures the size of the surface. We do not re-render
                // here as this event is always followed up by redraw request.
                if let Some(state) = self.state.as_mut() {
                    state.resize(size);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 * PIXEL_SCROLL_SCALE,
                };
                self.manager.handle_input(InputEvent::Scroll { amount });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Left,
                    MouseButton::Right => PointerButton::Right,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                self.manager.handle_input(InputEvent::Button {
                    button,
                    pressed: state == ElementState::Pressed,
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.manager.handle_input(InputEvent::PointerMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.manager.handle_input(InputEvent::Key {
                    key: map_key(key_code),
                    pressed: key_state == ElementState::Pressed,
                });
            }
            _ => (),
        }
    }
}

fn map_key(key_code: KeyCode) -> Key {
    match key_code {
        KeyCode::Tab => Key::Tab,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyI => Key::I,
        KeyCode::BracketLeft => Key::BracketLeft,
        KeyCode::BracketRight => Key::BracketRight,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Digit1 => Key::Digit(1),
        KeyCode::Digit2 => Key::Digit(2),
        KeyCode::Digit3 => Key::Digit(3),
        KeyCode::Digit4 => Key::Digit(4),
        KeyCode::Digit5 => Key::Digit(5),
        KeyCode::Digit6 => Key::Digit(6),
        KeyCode::Digit7 => Key::Digit(7),
        KeyCode::Digit8 => Key::Digit(8),
        KeyCode::Digit9 => Key::Digit(9),
        _ => Key::Other,
    }
}

pub fn run(manager: SimulationManager) -> anyhow::Result<()> {
    // Create event loop
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(manager);
    event_loop.run_app(&mut app)?;
    Ok(())
}
