//! Tumble -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. Everything
//! runs inside `RedrawRequested` with a variable timestep:
//!
//!   1. `begin_frame()` -- measure wall-clock delta (capped)
//!   2. Apply edge-triggered commands (roll, mode flips, editor clicks)
//!   3. Advance the roll animation and camera by `dt`
//!   4. Rebuild CPU meshes: the board only when tiles or the selection changed,
//!      the cube and editor lines every frame
//!   5. Upload camera uniform, draw triangles then lines, composite egui overlay
//!
//! The level is loaded from the configured path at startup (a fresh empty board
//! when it is missing or broken) and saved back on F5, from the editor panel and
//! on exit.

mod mesh;

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use mesh::SceneMesh;
use tumble_core::input::{InputState, Key, MouseBtn};
use tumble_core::time::TimeState;
use tumble_core::{
    load_level_from_path, pick_tile, save_level_to_path, CameraMode, GameConfig, GameState,
    LevelEditor, LevelState, RollConfig, RollController, TileType,
};
use tumble_devtools::{DebugOverlay, OverlayActions, OverlayStats};
use tumble_platform::window::PlatformConfig;
use tumble_render::{Camera3D, CameraMotion, GpuContext, MeshPipeline, MeshVertex};

const CONFIG_PATH: &str = "assets/config/game.json";
/// Pixels per wheel "line" for touchpads that report pixel deltas.
const PIXELS_PER_SCROLL_LINE: f32 = 40.0;

/// GPU buffers for one `SceneMesh`. Buffers grow (power-of-two) but never
/// shrink.
struct GpuMesh {
    label: &'static str,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    line_capacity: usize,
    index_count: u32,
    line_vertex_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            label,
            vertex_buffer: create_vertex_buffer(device, 1, label),
            index_buffer: create_index_buffer(device, 1, label),
            line_buffer: create_vertex_buffer(device, 1, label),
            vertex_capacity: 1,
            index_capacity: 1,
            line_capacity: 1,
            index_count: 0,
            line_vertex_count: 0,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, mesh: &SceneMesh) {
        if mesh.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = mesh.vertices.len().next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity, self.label);
        }
        if mesh.indices.len() > self.index_capacity {
            self.index_capacity = mesh.indices.len().next_power_of_two();
            self.index_buffer = create_index_buffer(device, self.index_capacity, self.label);
        }
        if mesh.line_vertices.len() > self.line_capacity {
            self.line_capacity = mesh.line_vertices.len().next_power_of_two();
            self.line_buffer = create_vertex_buffer(device, self.line_capacity, self.label);
        }

        if !mesh.vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&mesh.vertices));
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        }
        if !mesh.line_vertices.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&mesh.line_vertices));
        }
        self.index_count = mesh.indices.len() as u32;
        self.line_vertex_count = mesh.line_vertices.len() as u32;
    }

    fn draw_triangles(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn draw_lines(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.line_vertex_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
        render_pass.draw(0..self.line_vertex_count, 0..1);
    }
}

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera3D,
    mesh_pipeline: MeshPipeline,
    debug_overlay: DebugOverlay,

    // --- Puzzle ---------------------------------------------------------------
    config: GameConfig,
    game: GameState,
    roll_controller: RollController,
    editor: LevelEditor,

    // --- Per-frame mesh state ---------------------------------------------------
    // Board geometry (tiles + selection) is only rebuilt when dirty; the cube
    // and editor lines are rebuilt every frame.
    board_mesh: SceneMesh,
    dynamic_mesh: SceneMesh,
    board_gpu: GpuMesh,
    dynamic_gpu: GpuMesh,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Self {
        use wgpu::util::DeviceExt;

        let gpu = GpuContext::new(window.clone());
        let time = TimeState::new();
        let input = InputState::new();
        let mesh_pipeline = MeshPipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let config = GameConfig::load_or_default(Path::new(CONFIG_PATH)).unwrap_or_else(|err| {
            log::error!("{}; using default config", err);
            GameConfig::default()
        });
        let game = load_initial_level(&config);
        let roll_controller = RollController::new(RollConfig::from(&config));
        let camera = Camera3D::new(&config.camera, gpu.size.0, gpu.size.1);

        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = mesh_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let board_gpu = GpuMesh::new(&gpu.device, "Board Mesh");
        let dynamic_gpu = GpuMesh::new(&gpu.device, "Dynamic Mesh");

        let state = Self {
            window,
            gpu,
            time,
            input,
            camera,
            mesh_pipeline,
            debug_overlay,
            config,
            game,
            roll_controller,
            editor: LevelEditor::new(),
            board_mesh: SceneMesh::default(),
            dynamic_mesh: SceneMesh::default(),
            board_gpu,
            dynamic_gpu,
            camera_buffer,
            camera_bind_group,
        };
        apply_cursor_mode(&state.window, state.camera.mode);
        state
    }

    /// Snap an in-flight roll to its end so the saved level is consistent.
    fn finish_roll(&mut self) {
        self.roll_controller.complete(&mut self.game);
    }

    fn save_level(&mut self) {
        self.finish_roll();
        let path = &self.config.level_path;
        match save_level_to_path(path, &self.game.to_level()) {
            Ok(()) => log::info!("Saved level to {}", path.display()),
            Err(err) => log::error!("{}", err),
        }
    }

    fn reload_level(&mut self) {
        match load_level_from_path(&self.config.level_path, self.config.board_side) {
            Ok(level) => {
                self.game = GameState::from_level(level);
                self.roll_controller = RollController::new(RollConfig::from(&self.config));
                self.editor.clear_selection();
                log::info!("Reloaded level {}", self.config.level_path.display());
            }
            Err(err) => log::error!("Reload failed, keeping current level: {}", err),
        }
    }

    fn apply_overlay_actions(&mut self, actions: OverlayActions) {
        if actions.cycle_camera_mode {
            self.camera.set_mode(self.camera.mode.next());
            apply_cursor_mode(&self.window, self.camera.mode);
        }
        if actions.cycle_projection {
            self.camera.set_projection(self.camera.projection.next());
        }
        if let Some(tile) = actions.paint {
            self.editor.paint_selected(tile, &mut self.game);
        }
        if actions.clear_selection {
            self.editor.clear_selection();
        }
        if actions.save_level {
            self.save_level();
        }
        if actions.reload_level {
            self.reload_level();
        }
    }

    /// Consume this frame's input. Returns false when the app should quit.
    fn update(&mut self) -> bool {
        let dt = self.time.dt_secs();

        if self.input.is_just_pressed(Key::Escape) {
            return false;
        }
        if self.input.is_just_pressed(Key::F3) {
            self.debug_overlay.toggle();
        }
        if self.input.is_just_pressed(Key::F5) {
            self.save_level();
        }
        if self.input.is_just_pressed(Key::E) {
            self.editor.toggle();
            if !self.editor.enabled {
                self.editor.set_casted(None);
            }
        }
        if self.input.is_just_pressed(Key::M) {
            self.camera.set_mode(self.camera.mode.next());
            apply_cursor_mode(&self.window, self.camera.mode);
        }
        if self.input.is_just_pressed(Key::C) {
            self.camera.set_projection(self.camera.projection.next());
        }

        if let Some(direction) = self.input.roll_request() {
            self.roll_controller.request_roll(direction, &mut self.game);
        }
        if let Some(outcome) = self.roll_controller.step(dt, &mut self.game) {
            if outcome.flipped && self.game.board().count(self.config.flip_from) == 0 {
                log::info!("Every {} tile flipped", self.config.flip_from.label());
            }
        }

        self.camera.update(
            dt,
            CameraMotion {
                forward: self.input.is_held(Key::W),
                backward: self.input.is_held(Key::S),
                left: self.input.is_held(Key::A),
                right: self.input.is_held(Key::D),
                up: self.input.is_held(Key::Space),
                down: self.input.is_held(Key::LControl),
            },
        );

        let pointer_free = !self.debug_overlay.pointer_captured();
        let (dx, dy) = look_delta(&self.input, self.camera.mode);
        match self.camera.mode {
            CameraMode::Fly => self.camera.turn(dx, dy),
            CameraMode::Orbit => {
                if pointer_free && self.input.is_mouse_held(MouseBtn::Middle) {
                    if self.input.is_held(Key::LShift) {
                        self.camera.pan(dx, dy);
                    } else {
                        self.camera.orbit(dx, dy);
                    }
                }
            }
        }
        if pointer_free && self.input.scroll() != 0.0 {
            self.camera.zoom(self.input.scroll());
        }

        if self.editor.enabled {
            let (x, y) = self.input.mouse_position;
            let (origin, dir) = self.camera.cursor_ray(Vec2::new(x as f32, y as f32));
            self.editor
                .set_casted(pick_tile(origin, dir, self.game.board()));
            if pointer_free && self.input.is_mouse_just_pressed(MouseBtn::Left) {
                self.editor.add_casted_to_selected();
            }
            if pointer_free && self.input.is_mouse_just_pressed(MouseBtn::Right) {
                self.editor.remove_casted_from_selected();
            }
        }
        true
    }

    fn rebuild_meshes(&mut self) {
        // Both flags must be taken every frame.
        let tiles_dirty = self.game.take_tiles_dirty();
        let selection_dirty = self.editor.take_selection_dirty();
        if tiles_dirty || selection_dirty {
            self.board_mesh.clear();
            mesh::build_tiles(&mut self.board_mesh, self.game.board());
            mesh::build_selection(&mut self.board_mesh, self.game.board(), self.editor.selected());
            self.board_gpu
                .upload(&self.gpu.device, &self.gpu.queue, &self.board_mesh);
        }

        self.dynamic_mesh.clear();
        mesh::build_cube(&mut self.dynamic_mesh, self.game.current_model_transform());
        if self.editor.enabled {
            mesh::build_grid(&mut self.dynamic_mesh, self.game.board());
            if let Some(index) = self.editor.casted() {
                mesh::build_hover_outline(&mut self.dynamic_mesh, self.game.board(), index);
            }
        }
        self.dynamic_gpu
            .upload(&self.gpu.device, &self.gpu.queue, &self.dynamic_mesh);
    }

    fn overlay_stats(&self) -> OverlayStats {
        let board = self.game.board();
        let position = self.game.position();
        OverlayStats {
            cube_position: (position.x, position.z),
            orientation_label: self.game.current_orientation().to_string(),
            down_face_label: format!("{:?}", self.game.down_face()),
            roll_progress: self.roll_controller.progress(),
            camera_mode_label: self.camera.mode.label().to_string(),
            projection_label: self.camera.projection.label().to_string(),
            dark_tiles: board.count(TileType::Dark),
            light_tiles: board.count(TileType::Light),
            vertex_count: (self.board_mesh.vertices.len()
                + self.dynamic_mesh.vertices.len()
                + self.dynamic_mesh.line_vertices.len()) as u32,
            editor_enabled: self.editor.enabled,
            selected_tiles: self.editor.selected().len(),
            hovered_tile: self.editor.casted().and_then(|i| board.coords_of(i)),
        }
    }

    fn render(&mut self) {
        let camera_uniform = self.camera.build_uniform();
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay
                .prepare(&self.window, &self.time, &stats);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.08,
                            g: 0.09,
                            b: 0.12,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.mesh_pipeline.triangle_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            self.board_gpu.draw_triangles(&mut render_pass);
            self.dynamic_gpu.draw_triangles(&mut render_pass);

            render_pass.set_pipeline(&self.mesh_pipeline.line_pipeline);
            self.dynamic_gpu.draw_lines(&mut render_pass);
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Overlay buttons act on the next frame's state.
        self.apply_overlay_actions(overlay_actions);
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = tumble_platform::window::create_window(event_loop, &self.config);
        self.state = Some(EngineState::new(window));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let (Some(state), DeviceEvent::MouseMotion { delta }) = (self.state.as_mut(), event) {
            state.input.add_raw_motion(delta.0, delta.1);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            if state.config.save_on_exit {
                state.save_level();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed if !egui_consumed => {
                                state.input.key_down(game_key)
                            }
                            ElementState::Pressed => {}
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if let Some(btn) = map_mouse_button(button) {
                    match button_state {
                        ElementState::Pressed if !egui_consumed => state.input.mouse_down(btn),
                        ElementState::Pressed => {}
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.cursor_moved(position.x, position.y);
            }

            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_SCROLL_LINE,
                };
                state.input.add_scroll(lines);
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                if !state.update() {
                    event_loop.exit();
                    return;
                }
                state.rebuild_meshes();
                state.render();

                // Variable step: every frame consumes its edges.
                state.input.end_frame();
            }

            _ => {}
        }
    }
}

fn load_initial_level(config: &GameConfig) -> GameState {
    let path = &config.level_path;
    if !path.exists() {
        log::warn!(
            "Level file {} not found, starting with an empty {}x{} board",
            path.display(),
            config.board_side,
            config.board_side
        );
        return GameState::from_level(LevelState::fresh(config.board_side));
    }
    match load_level_from_path(path, config.board_side) {
        Ok(level) => {
            log::info!("Loaded level {}", path.display());
            GameState::from_level(level)
        }
        Err(err) => {
            log::error!("{}; starting with an empty board", err);
            GameState::from_level(LevelState::fresh(config.board_side))
        }
    }
}

/// Fly mode looks with raw device motion, which keeps coming once the hidden
/// cursor is pinned. Orbit drags follow the visible cursor.
fn look_delta(input: &InputState, mode: CameraMode) -> (f32, f32) {
    let (dx, dy) = match mode {
        CameraMode::Fly => input.raw_motion(),
        CameraMode::Orbit => input.mouse_delta(),
    };
    (dx as f32, dy as f32)
}

/// Fly mode hides and locks the cursor. Platforms without locking get a
/// confined cursor instead.
fn apply_cursor_mode(window: &Window, mode: CameraMode) {
    let fly = mode == CameraMode::Fly;
    let result = if fly {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(err) = result {
        log::warn!("Cursor grab not available: {}", err);
    }
    window.set_cursor_visible(!fly);
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize, label: &str) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<MeshVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize, label: &str) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::ControlLeft => Some(Key::LControl),
        KeyCode::ShiftLeft => Some(Key::LShift),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F5 => Some(Key::F5),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyC => Some(Key::C),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::KeyM => Some(Key::M),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Tumble starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
