use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};
use log::info;
use serde::{Deserialize, Serialize};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::camera::{Camera, CameraMovement};
use crate::error::SceneError;
use crate::input::{InputState, KeyCode, NamedKey};
use crate::shader::ShaderState;

pub const WINDOW_WIDTH: u32 = 1000;
pub const WINDOW_HEIGHT: u32 = 800;

const INITIAL_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 10.0, 30.0);
const INITIAL_CAMERA_FRONT: Vec3 = Vec3::new(0.0, -0.3, -1.0);

const PERSPECTIVE_NEAR: f32 = 0.1;
const PERSPECTIVE_FAR: f32 = 100.0;

const ORTHO_HALF_EXTENT: f32 = 30.0;
const ORTHO_NEAR: f32 = 20.0;
const ORTHO_FAR: f32 = 100.0;
const ORTHO_EYE: Vec3 = Vec3::new(0.0, 50.0, 0.0);

const SENSITIVITY_STEP: f32 = 0.01;
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// How the scene is projected onto the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionMode::Perspective => f.write_str("perspective"),
            ProjectionMode::Orthographic => f.write_str("orthographic"),
        }
    }
}

/// Remembers the previous cursor sample so motion can be turned into deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseTracker {
    last_x: f32,
    last_y: f32,
    first_sample_taken: bool,
}

impl MouseTracker {
    /// Records a cursor sample and returns `(dx, dy)` with `dy` positive
    /// when the cursor moves up. The first sample only primes the tracker.
    pub fn sample(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let delta = self
            .first_sample_taken
            .then(|| (x - self.last_x, self.last_y - y));
        self.last_x = x;
        self.last_y = y;
        self.first_sample_taken = true;
        delta
    }
}

/// Measures the time between consecutive frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    /// Seconds since the previous tick; zero on the first one.
    ///
    /// Long stalls are clamped to 0.25 s so the camera does not jump.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_DELTA))
            .unwrap_or_default();
        self.last = Some(now);
        dt.as_secs_f32()
    }
}

/// Owns the navigable camera and turns input into view and projection
/// matrices each frame.
#[derive(Debug)]
pub struct ViewComposer {
    camera: Camera,
    mouse: MouseTracker,
    clock: FrameClock,
    projection_mode: ProjectionMode,
    viewport: (u32, u32),
    close_requested: bool,
}

impl Default for ViewComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewComposer {
    pub fn new() -> Self {
        Self {
            camera: Camera::looking_along(INITIAL_CAMERA_POSITION, INITIAL_CAMERA_FRONT, Vec3::Y),
            mouse: MouseTracker::default(),
            clock: FrameClock::default(),
            projection_mode: ProjectionMode::default(),
            viewport: (WINDOW_WIDTH, WINDOW_HEIGHT),
            close_requested: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection_mode
    }

    pub fn is_orthographic(&self) -> bool {
        self.projection_mode == ProjectionMode::Orthographic
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        if self.projection_mode != mode {
            self.projection_mode = mode;
            info!("switched to {mode} projection");
        }
    }

    /// Tracks the window size used for the aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn aspect_ratio(&self) -> f32 {
        match self.viewport {
            (_, 0) | (0, _) => 1.0,
            (width, height) => width as f32 / height as f32,
        }
    }

    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        if let Some((dx, dy)) = self.mouse.sample(x, y) {
            self.camera.process_mouse_movement(dx, dy);
        }
    }

    pub fn handle_scroll(&mut self, y_offset: f32) {
        self.camera.process_mouse_scroll(y_offset);
    }

    /// Applies every held key for a frame lasting `dt` seconds.
    pub fn process_keyboard_events(&mut self, input: &InputState, dt: f32) {
        if input.is_key_down(KeyCode::Named(NamedKey::Escape)) {
            self.close_requested = true;
        }

        let speed = dt * self.camera.movement_speed;
        let moves = [
            ('W', CameraMovement::Forward),
            ('S', CameraMovement::Backward),
            ('A', CameraMovement::Left),
            ('D', CameraMovement::Right),
            ('Q', CameraMovement::Down),
            ('E', CameraMovement::Up),
        ];
        for (letter, direction) in moves {
            if input.is_letter_down(letter) {
                self.camera.process_keyboard(direction, speed);
            }
        }

        if input.is_letter_down('O') {
            self.set_projection_mode(ProjectionMode::Orthographic);
        }
        if input.is_letter_down('P') {
            self.set_projection_mode(ProjectionMode::Perspective);
        }

        if input.is_key_down(KeyCode::Named(NamedKey::NumpadAdd)) {
            self.camera.adjust_mouse_sensitivity(SENSITIVITY_STEP);
        }
        if input.is_key_down(KeyCode::Named(NamedKey::NumpadSubtract)) {
            self.camera.adjust_mouse_sensitivity(-SENSITIVITY_STEP);
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect_ratio();
        match self.projection_mode {
            ProjectionMode::Perspective => Mat4::perspective_rh(
                self.camera.zoom.to_radians(),
                aspect,
                PERSPECTIVE_NEAR,
                PERSPECTIVE_FAR,
            ),
            ProjectionMode::Orthographic => {
                let (half_width, half_height) = if aspect >= 1.0 {
                    (ORTHO_HALF_EXTENT * aspect, ORTHO_HALF_EXTENT)
                } else {
                    (ORTHO_HALF_EXTENT, ORTHO_HALF_EXTENT / aspect)
                };
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    ORTHO_NEAR,
                    ORTHO_FAR,
                )
            }
        }
    }

    /// The orthographic view is a fixed overhead pose, independent of the
    /// navigable camera.
    pub fn view_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => self.camera.view_matrix(),
            ProjectionMode::Orthographic => {
                Mat4::look_at_rh(ORTHO_EYE, ORTHO_EYE + Vec3::NEG_Y, Vec3::NEG_Z)
            }
        }
    }

    /// Advances the frame clock, processes input and pushes `view`,
    /// `projection` and `viewPosition` into the shader.
    pub fn prepare_scene_view<S>(&mut self, shader: &mut S, input: &InputState, now: Instant)
    where
        S: ShaderState + ?Sized,
    {
        let dt = self.clock.tick(now);
        self.process_keyboard_events(input, dt);

        shader.set_mat4("view", self.view_matrix());
        shader.set_mat4("projection", self.projection_matrix());
        shader.set_vec3("viewPosition", self.camera.position);
    }
}

/// Opens the 1000x800 display window.
pub fn create_display_window(
    event_loop: &ActiveEventLoop,
    title: &str,
) -> Result<Arc<Window>, SceneError> {
    let attributes = Window::default_attributes()
        .with_title(title)
        .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
    let window = event_loop
        .create_window(attributes)
        .map_err(|err| SceneError::WindowCreation(err.to_string()))?;
    info!("created {WINDOW_WIDTH}x{WINDOW_HEIGHT} window {title:?}");
    Ok(Arc::new(window))
}
