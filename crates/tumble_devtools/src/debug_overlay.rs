//! Debug overlay and tile editor panel rendered via egui on top of the board.
//!
//! egui needs a four-phase render split because
//! `egui_wgpu::Renderer::render()` wants a `RenderPass<'static>` while
//! `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The stats window only runs while `visible` is true (F3). The editor panel
//! runs whenever the editor is enabled.

use tumble_core::time::TimeState;
use tumble_core::TileType;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub cube_position: (i32, i32),
    /// Orientation as the six face labels in slot order.
    pub orientation_label: String,
    pub down_face_label: String,
    /// `None` when the cube is resting.
    pub roll_progress: Option<f32>,
    pub camera_mode_label: String,
    pub projection_label: String,
    pub dark_tiles: usize,
    pub light_tiles: usize,
    pub vertex_count: u32,
    pub editor_enabled: bool,
    pub selected_tiles: usize,
    pub hovered_tile: Option<(i32, i32)>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub cycle_camera_mode: bool,
    pub cycle_projection: bool,
    /// Paint the current selection with this tile.
    pub paint: Option<TileType>,
    pub clear_selection: bool,
    pub save_level: bool,
    pub reload_level: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    /// True while the pointer is over an egui window, so board clicks and
    /// camera drags should be ignored.
    pub fn pointer_captured(&self) -> bool {
        self.egui_ctx.wants_pointer_input() || self.egui_ctx.is_pointer_over_area()
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let visible = self.visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if visible {
                show_stats_window(ctx, time, stats, &mut actions);
            }
            if stats.editor_enabled {
                show_editor_panel(ctx, stats, &mut actions);
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn show_stats_window(
    ctx: &egui::Context,
    time: &TimeState,
    stats: &OverlayStats,
    actions: &mut OverlayActions,
) {
    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
            ui.label(format!("Frame: {}", time.frame_count));
            ui.label(format!("Vertices: {}", stats.vertex_count));

            ui.separator();
            ui.label(format!(
                "Cube: ({}, {})",
                stats.cube_position.0, stats.cube_position.1
            ));
            ui.label(format!("Orientation: {}", stats.orientation_label));
            ui.label(format!("Down face: {}", stats.down_face_label));
            match stats.roll_progress {
                Some(progress) => ui.label(format!("Rolling: {:.0}%", progress * 100.0)),
                None => ui.label("Resting"),
            };
            ui.label(format!(
                "Tiles: {} dark / {} light",
                stats.dark_tiles, stats.light_tiles
            ));

            ui.separator();
            ui.horizontal(|ui| {
                ui.label(format!("Camera: {}", stats.camera_mode_label));
                if ui.button("Switch").clicked() {
                    actions.cycle_camera_mode = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label(format!("Projection: {}", stats.projection_label));
                if ui.button("Switch").clicked() {
                    actions.cycle_projection = true;
                }
            });
        });
}

fn show_editor_panel(ctx: &egui::Context, stats: &OverlayStats, actions: &mut OverlayActions) {
    egui::Window::new("Level Editor")
        .default_pos([10.0, 320.0])
        .show(ctx, |ui| {
            match stats.hovered_tile {
                Some((x, z)) => ui.label(format!("Hovered: ({}, {})", x, z)),
                None => ui.label("Hovered: -"),
            };
            ui.label(format!("Selected: {}", stats.selected_tiles));

            ui.separator();
            ui.horizontal(|ui| {
                for tile in TileType::ALL {
                    if ui.button(tile.label()).clicked() {
                        actions.paint = Some(tile);
                    }
                }
            });
            if ui.button("Clear selection").clicked() {
                actions.clear_selection = true;
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save level").clicked() {
                    actions.save_level = true;
                }
                if ui.button("Reload level").clicked() {
                    actions.reload_level = true;
                }
            });
        });
}
