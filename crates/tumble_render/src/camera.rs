//! Free/orbit 3D camera with switchable perspective and orthographic
//! projection.
//!
//! World up is +Y. Mouse deltas are in window pixels with y growing downward,
//! as winit reports them.

use glam::{Mat4, Quat, Vec2, Vec3};
use tumble_core::{CameraMode, CameraSettings, ProjectionKind};

const MAX_PITCH_DEG: f32 = 89.0;
const ORBIT_DEG_PER_PIXEL: f32 = 0.25;
const ORBIT_POLE_LIMIT: f32 = 0.99;
/// World units crossed when dragging across the full window in perspective.
const PERSPECTIVE_PAN_SPAN: f32 = 20.0;
const MIN_FOV_DEG: f32 = 1.0;
const MAX_FOV_DEG: f32 = 120.0;
const MIN_ORTHO_ZOOM: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Level-triggered movement intent for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraMotion {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

pub struct Camera3D {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub orbit_target: Vec3,
    yaw_deg: f32,
    pitch_deg: f32,
    pub fov_deg: f32,
    pub ortho_zoom: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub mouse_sensitivity: f32,
    pub mode: CameraMode,
    pub projection: ProjectionKind,
    pub viewport: (u32, u32),
}

impl Camera3D {
    /// Camera at `settings.start_position` looking at the world origin.
    pub fn new(settings: &CameraSettings, viewport_width: u32, viewport_height: u32) -> Self {
        let position = Vec3::from_array(settings.start_position);
        let front = (-position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let mut camera = Self {
            position,
            front,
            up: Vec3::Y,
            orbit_target: Vec3::ZERO,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            fov_deg: settings.fov_deg,
            ortho_zoom: settings.ortho_zoom,
            near: settings.near,
            far: settings.far,
            speed: settings.speed,
            mouse_sensitivity: settings.mouse_sensitivity,
            mode: CameraMode::default(),
            projection: ProjectionKind::default(),
            viewport: (viewport_width, viewport_height),
        };
        camera.sync_angles();
        camera
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0.max(1) as f32 / self.viewport.1.max(1) as f32
    }

    pub fn ortho_height(&self) -> f32 {
        self.ortho_zoom
    }

    pub fn ortho_width(&self) -> f32 {
        self.aspect_ratio() * self.ortho_zoom
    }

    pub fn right(&self) -> Vec3 {
        self.front.cross(self.up).normalize_or_zero()
    }

    /// Up vector of the view plane (perpendicular to `front`).
    pub fn view_up(&self) -> Vec3 {
        self.right().cross(self.front).normalize_or_zero()
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        if mode == CameraMode::Orbit {
            self.retarget_orbit();
        }
        log::info!("Camera mode: {}", self.mode);
    }

    pub fn set_projection(&mut self, projection: ProjectionKind) {
        if projection == self.projection {
            return;
        }
        self.projection = projection;
        log::info!("Camera projection: {}", self.projection);
    }

    pub fn update(&mut self, dt: f32, motion: CameraMotion) {
        let offset = self.speed * dt.max(0.0);
        let flat_front = Vec3::new(self.front.x, 0.0, self.front.z).normalize_or_zero();
        let right = self.right();
        let ortho = self.projection == ProjectionKind::Orthographic;

        let mut delta = Vec3::ZERO;
        // Moving along the view axis does nothing visible in orthographic
        // projection, so forward/back slide the view up and down instead.
        if motion.forward {
            delta += if ortho { Vec3::Y } else { flat_front };
        }
        if motion.backward {
            delta -= if ortho { Vec3::Y } else { flat_front };
        }
        if motion.left {
            delta -= right;
        }
        if motion.right {
            delta += right;
        }
        if motion.up {
            delta += Vec3::Y;
        }
        if motion.down {
            delta -= Vec3::Y;
        }
        let delta = delta * offset;
        self.position += delta;
        self.orbit_target += delta;
    }

    /// Fly-mode mouse look.
    pub fn turn(&mut self, dx: f32, dy: f32) {
        self.yaw_deg = (self.yaw_deg + dx * self.mouse_sensitivity).rem_euclid(360.0);
        self.pitch_deg =
            (self.pitch_deg - dy * self.mouse_sensitivity).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);

        let (yaw, pitch) = (self.yaw_deg.to_radians(), self.pitch_deg.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
    }

    /// Rotate the camera around `orbit_target`. Vertical motion that would
    /// carry the view over a pole is dropped.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let yaw = Quat::from_axis_angle(self.up, (-dx * ORBIT_DEG_PER_PIXEL).to_radians());
        let pitch = Quat::from_axis_angle(self.right(), (-dy * ORBIT_DEG_PER_PIXEL).to_radians());

        let arm = self.position - self.orbit_target;
        let pitched = pitch * arm;
        let pitched_front = (-pitched).normalize_or_zero();
        let arm = if pitched_front.dot(self.up).abs() > ORBIT_POLE_LIMIT {
            yaw * arm
        } else {
            yaw * pitched
        };

        self.position = self.orbit_target + arm;
        if let Some(front) = (-arm).try_normalize() {
            self.front = front;
        }
        self.sync_angles();
    }

    /// Slide position and orbit target together in the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (width, height) = (self.viewport.0.max(1) as f32, self.viewport.1.max(1) as f32);
        let (x, y) = match self.projection {
            ProjectionKind::Perspective => (
                -dx / width * PERSPECTIVE_PAN_SPAN,
                dy / height * PERSPECTIVE_PAN_SPAN,
            ),
            ProjectionKind::Orthographic => (
                -dx * self.ortho_width() / width,
                dy * self.ortho_height() / height,
            ),
        };
        let offset = self.right() * x + self.view_up() * y;
        self.position += offset;
        self.orbit_target += offset;
    }

    /// Wheel zoom: narrows the field of view or shrinks the orthographic
    /// height. Positive `scroll` zooms in.
    pub fn zoom(&mut self, scroll: f32) {
        match self.projection {
            ProjectionKind::Perspective => {
                self.fov_deg = (self.fov_deg - scroll).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
            }
            ProjectionKind::Orthographic => {
                self.ortho_zoom = (self.ortho_zoom - scroll).max(MIN_ORTHO_ZOOM);
            }
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionKind::Perspective => Mat4::perspective_rh(
                self.fov_deg.to_radians(),
                self.aspect_ratio(),
                self.near,
                self.far,
            ),
            ProjectionKind::Orthographic => {
                let half_w = self.ortho_width() * 0.5;
                let half_h = self.ortho_height() * 0.5;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
        }
    }

    /// World-space ray `(origin, direction)` through a window pixel.
    pub fn cursor_ray(&self, cursor_px: Vec2) -> (Vec3, Vec3) {
        let (width, height) = (self.viewport.0.max(1) as f32, self.viewport.1.max(1) as f32);
        let ndc = Vec2::new(
            2.0 * cursor_px.x / width - 1.0,
            1.0 - 2.0 * cursor_px.y / height,
        );
        let right = self.right();
        let up = self.view_up();

        match self.projection {
            ProjectionKind::Perspective => {
                let tan_half = (self.fov_deg.to_radians() * 0.5).tan();
                let dir = self.front
                    + right * (ndc.x * tan_half * self.aspect_ratio())
                    + up * (ndc.y * tan_half);
                (self.position, dir.normalize())
            }
            ProjectionKind::Orthographic => {
                let origin = self.position
                    + right * (ndc.x * self.ortho_width() * 0.5)
                    + up * (ndc.y * self.ortho_height() * 0.5);
                (origin, self.front)
            }
        }
    }

    /// Aim the orbit target at the ground point under the view center, or a
    /// fixed distance ahead when looking at the horizon.
    fn retarget_orbit(&mut self) {
        self.orbit_target = if self.front.y < -1e-3 {
            self.position + self.front * (self.position.y / -self.front.y)
        } else {
            self.position + self.front * self.position.length().max(1.0)
        };
    }

    fn sync_angles(&mut self) {
        self.yaw_deg = self.front.z.atan2(self.front.x).to_degrees().rem_euclid(360.0);
        self.pitch_deg = self
            .front
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
    }
}
