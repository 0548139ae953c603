use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::input::{InputState, KeyCode, NamedKey};
use crate::render::GpuDevice;
use crate::scene::SceneComposer;
use crate::view::{create_display_window, ViewComposer};

pub const WINDOW_TITLE: &str = "Garden Scene";

// Scroll pixels that count as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

/// Opens the window and runs the event loop until the user quits.
pub fn run(texture_dir: PathBuf) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GardenApp::new(texture_dir);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.last_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    device: GpuDevice,
}

/// winit handler for the garden viewer.
pub struct GardenApp {
    texture_dir: PathBuf,
    running: Option<Running>,
    scene: Option<SceneComposer>,
    view: ViewComposer,
    input: InputState,
    last_error: Option<anyhow::Error>,
}

impl GardenApp {
    pub fn new(texture_dir: PathBuf) -> Self {
        Self {
            texture_dir,
            running: None,
            scene: None,
            view: ViewComposer::new(),
            input: InputState::new(),
            last_error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = create_display_window(event_loop, WINDOW_TITLE)?;
        let mut device = block_on(GpuDevice::new(Arc::clone(&window)))?;
        let size = window.inner_size();
        self.view.resize(size.width, size.height);

        let mut scene = SceneComposer::new(&self.texture_dir);
        if let Err(err) = scene.prepare_scene(&mut device) {
            // Keep running so the rest of the garden is still visible.
            error!("scene setup aborted: {err}");
        }

        self.scene = Some(scene);
        self.running = Some(Running { window, device });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.input.set_key_down(key),
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (Some(running), Some(scene)) = (self.running.as_mut(), self.scene.as_mut()) else {
            return Ok(());
        };

        self.view
            .prepare_scene_view(&mut running.device, &self.input, Instant::now());
        if self.view.close_requested() {
            event_loop.exit();
            return Ok(());
        }

        scene.render_scene(&mut running.device, self.view.is_orthographic());
        match running.device.present() {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = running.window.inner_size();
                running.device.resize(size);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
                Ok(())
            }
            Err(other) => {
                warn!("skipping frame: {other}");
                Ok(())
            }
        }
    }

    fn shutdown(&mut self) {
        if let (Some(running), Some(scene)) = (self.running.as_mut(), self.scene.as_mut()) {
            scene.release_textures(&mut running.device);
        }
    }
}

impl ApplicationHandler for GardenApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.device.window_id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                running.device.resize(size);
                self.view.resize(size.width, size.height);
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.view
                    .handle_mouse_move(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.view.handle_scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.as_ref() {
            running.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

pub fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::Escape => KeyCode::Named(NamedKey::Escape),
        WinitKey::NumpadAdd => KeyCode::Named(NamedKey::NumpadAdd),
        WinitKey::NumpadSubtract => KeyCode::Named(NamedKey::NumpadSubtract),
        WinitKey::KeyW => KeyCode::Character('W'),
        WinitKey::KeyA => KeyCode::Character('A'),
        WinitKey::KeyS => KeyCode::Character('S'),
        WinitKey::KeyD => KeyCode::Character('D'),
        WinitKey::KeyQ => KeyCode::Character('Q'),
        WinitKey::KeyE => KeyCode::Character('E'),
        WinitKey::KeyO => KeyCode::Character('O'),
        WinitKey::KeyP => KeyCode::Character('P'),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_navigation_keys() {
        assert_eq!(map_keycode(WinitKey::KeyW), Some(KeyCode::letter('w')));
        assert_eq!(
            map_keycode(WinitKey::NumpadSubtract),
            Some(KeyCode::Named(NamedKey::NumpadSubtract))
        );
        assert_eq!(map_keycode(WinitKey::F5), None);
    }
}
