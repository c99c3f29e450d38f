//! Interactive procedural tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the generation state
//! (config, generated tree, effector rig) and implements [`eframe::App`]
//! to draw the instances with their pulse animation applied.

use eframe::App;
use glam::{DVec2, DVec3, Vec2, Vec3};
use rand::Rng;
use std::time::Instant;
use tree_core::{
    GeneratedTree, TreeConfig,
    config::{MAX_DEPTH_LIMIT, TreeParams},
    pulse::{self, EffectorRig},
    types::SegmentId,
};

/// Hover radius around a skeleton segment, in pixels.
const HOVER_PIXELS: f32 = 8.0;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The generation core: [`TreeConfig`], [`GeneratedTree`], [`EffectorRig`].
/// - View state (orbit yaw, pan/zoom, focus point, pulse clock).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions; parameter edits regenerate the tree.
/// 2. If `running` is `true`, advance the pulse clock.
/// 3. Draw the skeleton and the animated instances.
///
/// ### Fields
/// - `cfg` - Seed and shape parameters of the current tree.
/// - `tree` - Output of the last successful generation.
/// - `rig` - Effector sweeps driving the pulse animation.
///
/// - `rng` - Random number generator used by the random-seed button.
///
/// - `running` - Whether the pulse clock is advancing.
/// - `clock` - Pulse animation time in seconds.
/// - `last_frame_time` - egui time of the previous frame.
///
/// - `zoom` - Pixels per world unit.
/// - `yaw` - Orbit angle around the vertical axis, radians.
/// - `pan` - Screen-space pan offset in pixels.
/// - `focus` - Projected world point drawn at the center of the view.
/// - `show_skeleton` - Whether segment lines are drawn under the instances.
///
/// - `hovered` - Skeleton segment under the cursor.
/// - `last_gen_ms` - Wall time of the last generation (for display only).
/// - `param_error` - Validation error for the current parameters, if any.
pub struct Viewer {
    cfg: TreeConfig,
    tree: GeneratedTree,
    rig: EffectorRig,

    rng: rand::rngs::ThreadRng,

    running: bool,
    clock: f64,
    last_frame_time: f64,

    zoom: f32,
    yaw: f32,
    pan: egui::Vec2,
    focus: Vec2,
    show_skeleton: bool,

    hovered: Option<SegmentId>,
    last_gen_ms: f64,
    param_error: Option<String>,
}

impl Viewer {
    /// Creates a viewer and generates the tree described by `cfg`.
    ///
    /// Invalid parameters fall back to [`TreeParams::default`] so the viewer
    /// always starts with a tree on screen.
    ///
    /// ### Parameters
    /// - `cfg` - Initial seed and shape parameters.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new(mut cfg: TreeConfig) -> Self {
        if let Err(e) = cfg.params.validate() {
            log::warn!("invalid start parameters ({e}), using defaults");
            cfg.params = TreeParams::default();
        }

        let mut viewer = Self {
            cfg,
            tree: GeneratedTree::default(),
            rig: EffectorRig::default(),
            rng: rand::rng(),
            running: true,
            clock: 0.0,
            last_frame_time: 0.0,
            zoom: 6.0,
            yaw: 0.0,
            pan: egui::vec2(0.0, 0.0),
            focus: Vec2::ZERO,
            show_skeleton: false,
            hovered: None,
            last_gen_ms: 0.0,
            param_error: None,
        };
        viewer.regenerate();
        viewer.frame_tree();
        viewer
    }

    /// Regenerates the tree from the current config.
    ///
    /// If the parameters do not validate, the previous tree is kept and the
    /// error is stored in `param_error` for the config panel.
    fn regenerate(&mut self) {
        if let Err(e) = self.cfg.params.validate() {
            log::warn!("skipping generation: {e}");
            self.param_error = Some(e.to_string());
            return;
        }
        self.param_error = None;

        let started = Instant::now();
        self.tree = tree_core::generate(self.cfg.seed, &self.cfg.params);
        self.last_gen_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.hovered = None;

        log::info!(
            "seed {}: {} instances, {} segments in {:.2} ms",
            self.cfg.seed,
            self.tree.buffers.len(),
            self.tree.skeleton.len(),
            self.last_gen_ms
        );
    }

    /// Picks a fresh random seed and regenerates.
    fn randomize_seed(&mut self) {
        self.cfg.seed = self.rng.random_range(0..100_000);
        self.regenerate();
    }

    /// Centers the view on the projected bounds of the current tree and
    /// clears the pan offset.
    fn frame_tree(&mut self) {
        self.pan = egui::vec2(0.0, 0.0);
        self.focus = match self.tree.buffers.bounds() {
            Some((lo, hi)) => self.project((lo + hi) * 0.5),
            None => Vec2::ZERO,
        };
    }

    /// Advances the pulse clock by the egui time elapsed since the last frame.
    ///
    /// ### Parameters
    /// - `now` - Current egui time in seconds.
    fn advance_clock(&mut self, now: f64) {
        let dt = (now - self.last_frame_time).max(0.0);
        self.last_frame_time = now;
        if self.running {
            self.clock += dt;
        }
    }

    /// Orbit projection: rotates around the vertical axis by `yaw` and
    /// drops the depth axis.
    fn project(&self, p: Vec3) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(p.x * c + p.z * s, p.y)
    }

    /// Converts a projected world position to screen-space.
    ///
    /// World coordinates are offset by `focus`, scaled by `zoom`, offset by
    /// `pan`, and then centered inside the given `rect`. The y-axis is
    /// flipped so that positive y goes up in world space.
    ///
    /// ### Parameters
    /// - `p` - Projected world position.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The corresponding egui position in screen-space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let d = p - self.focus;
        egui::pos2(
            center.x + d.x * self.zoom + self.pan.x,
            center.y - d.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to projected world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y) + self.focus
    }

    /// Skeleton segment under a projected world point, within
    /// [`HOVER_PIXELS`] on screen.
    fn segment_near(&self, world: Vec2) -> Option<SegmentId> {
        let project = |p: DVec3| self.project(p.as_vec3()).as_dvec2();
        let (id, d2) = self
            .tree
            .skeleton
            .find_nearest_segment(DVec2::new(world.x as f64, world.y as f64), project)?;
        let limit = (HOVER_PIXELS / self.zoom) as f64;
        (d2 <= limit * limit).then_some(id)
    }

    /// Helper to draw a labeled [`egui::DragValue`].
    ///
    /// ### Returns
    /// `true` if the value was edited this frame.
    fn labeled_drag<N: egui::emath::Numeric>(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut N,
        range: std::ops::RangeInclusive<N>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    /// Builds the top panel UI (animation, generation, view controls).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Regenerate").clicked() {
                    self.regenerate();
                }

                if ui.button("Random seed").clicked() {
                    self.randomize_seed();
                }

                if ui.button("Frame").clicked() {
                    self.frame_tree();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.5..=40.0).text("Zoom"));
                ui.add(
                    egui::Slider::new(&mut self.yaw, -std::f32::consts::PI..=std::f32::consts::PI)
                        .text("Yaw"),
                );
                ui.checkbox(&mut self.show_skeleton, "Skeleton");
            });
        });
    }

    /// Builds the bottom status bar (counts, timing, hovered segment).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("gen = {:.2} ms", self.last_gen_ms));
                ui.label(format!("t = {:.1} s", self.clock));
                ui.separator();
                ui.label(format!("instances = {}", self.tree.buffers.len()));
                ui.label(format!("segments = {}", self.tree.skeleton.len()));
                ui.label(format!("draws = {}", self.tree.seeds_consumed));
                if let Some(seg) = self.hovered.and_then(|id| self.tree.skeleton.segments.get(id)) {
                    ui.separator();
                    ui.label(format!(
                        "hover: depth {} len {:.2} children {}",
                        seg.depth,
                        seg.length(),
                        seg.children.len()
                    ));
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for generation parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");
                let mut changed = false;

                ui.separator();
                changed |=
                    Self::labeled_drag(ui, "seed:", &mut self.cfg.seed, 0..=u64::MAX, 1.0);

                ui.separator();
                ui.label("Recursion");
                let p = &mut self.cfg.params;
                changed |=
                    Self::labeled_drag(ui, "max_depth:", &mut p.max_depth, 0..=MAX_DEPTH_LIMIT, 0.1);
                changed |= Self::labeled_drag(ui, "branch_factor:", &mut p.branch_factor, 0..=12, 0.1);
                changed |=
                    Self::labeled_drag(ui, "length_decay:", &mut p.length_decay, 0.0..=1.5, 0.01);

                ui.separator();
                ui.label("Trunk");
                changed |=
                    Self::labeled_drag(ui, "initial_length:", &mut p.initial_length, 0.1..=100.0, 0.2);
                changed |= Self::labeled_drag(
                    ui,
                    "initial_angle:",
                    &mut p.initial_angle,
                    0.0..=std::f64::consts::TAU,
                    0.01,
                );

                ui.separator();
                ui.label("Sampling");
                changed |= Self::labeled_drag(
                    ui,
                    "samples_per_segment:",
                    &mut p.samples_per_segment,
                    0..=240,
                    1.0,
                );

                if let Some(err) = &self.param_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = TreeConfig::default();
                    changed = true;
                }

                if changed {
                    self.regenerate();
                }
            });
    }

    /// Builds the small floating readout of the effector positions.
    fn ui_effector_overlay(&self, ctx: &egui::Context) {
        let values = self.rig.values_at(self.clock as f32);
        egui::Area::new("effectors".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 40.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            for (i, v) in values.iter().enumerate() {
                                ui.label(format!("effector {} = {:+.2}", i + 1, v));
                            }
                        });
                    });
            });
    }

    /// Builds the central panel where the tree is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));
            self.hovered = hover_world.and_then(|w| self.segment_near(w));

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.5, 40.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            if self.show_skeleton {
                for (id, seg) in self.tree.skeleton.segments.iter().enumerate() {
                    let a = self.world_to_screen(self.project(seg.start.as_vec3()), rect);
                    let b = self.world_to_screen(self.project(seg.end.as_vec3()), rect);
                    let stroke = if self.hovered == Some(id) {
                        egui::Stroke::new(2.0, egui::Color32::YELLOW)
                    } else {
                        egui::Stroke::new(1.0, egui::Color32::DARK_GRAY)
                    };
                    painter.line_segment([a, b], stroke);
                }
            }

            let [e1, e2, _] = self.rig.values_at(self.clock as f32);
            let clock = self.clock as f32;
            let highlight = self
                .hovered
                .and_then(|id| self.tree.skeleton.segments.get(id))
                .map(|seg| seg.instances.clone());

            for (i, inst) in self.tree.buffers.iter().enumerate() {
                let pose = pulse::pose(&inst, e1, e2, clock);
                let p = self.world_to_screen(self.project(pose.center), rect);
                let r = (pose.extent * self.zoom * 0.5).max(1.0);

                let color = if highlight.as_ref().is_some_and(|h| h.contains(&i)) {
                    egui::Color32::YELLOW
                } else {
                    to_color32(inst.color + pulse::emissive(&inst, e1, e2, clock))
                };
                painter.circle_filled(p, r, color);
            }

            if self.running {
                ctx.request_repaint();
            }
        });
    }
}

/// Clamps a linear color into an opaque [`egui::Color32`].
fn to_color32(c: Vec3) -> egui::Color32 {
    let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    egui::Color32::from_rgb(c.x as u8, c.y as u8, c.z as u8)
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Advances the pulse clock.
    /// - Renders the top control bar and status bar.
    /// - Renders the config side panel and effector overlay.
    /// - Draws the central tree view and handles interactions.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.advance_clock(ctx.input(|i| i.time));
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_effector_overlay(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn small_config() -> TreeConfig {
        let mut cfg = TreeConfig::default();
        cfg.params.max_depth = 2;
        cfg.params.branch_factor = 3;
        cfg
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::new(small_config());
        // Use non-trivial zoom, pan and focus to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        viewer.focus = Vec2::new(3.0, 12.0);
        let rect = test_rect();

        let world_points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, -5.0),
            Vec2::new(-3.5, 8.25),
        ];

        let eps = 1e-4;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn focus_lands_at_rect_center() {
        let mut viewer = Viewer::new(small_config());
        viewer.focus = Vec2::new(4.0, 20.0);
        let rect = test_rect();
        assert_eq!(viewer.world_to_screen(viewer.focus, rect), rect.center());
    }

    #[test]
    fn project_rotates_around_vertical_axis() {
        let mut viewer = Viewer::new(small_config());
        let p = Vec3::new(1.0, 2.0, 3.0);

        viewer.yaw = 0.0;
        assert_eq!(viewer.project(p), Vec2::new(1.0, 2.0));

        viewer.yaw = std::f32::consts::FRAC_PI_2;
        let q = viewer.project(p);
        assert!((q.x - 3.0).abs() < 1e-5);
        assert_eq!(q.y, 2.0);
    }

    #[test]
    fn new_generates_the_configured_tree() {
        let viewer = Viewer::new(small_config());
        // Golden count for seed 45, depth 2, three branches.
        assert_eq!(viewer.tree.buffers.len(), 120);
        assert!(viewer.param_error.is_none());
    }

    #[test]
    fn new_falls_back_to_defaults_on_invalid_params() {
        let mut cfg = TreeConfig::default();
        cfg.params.initial_length = -1.0;
        let viewer = Viewer::new(cfg);
        assert_eq!(viewer.cfg.params, TreeParams::default());
        assert_eq!(viewer.tree.buffers.len(), 9540);
    }

    #[test]
    fn regenerate_with_invalid_params_keeps_previous_tree() {
        let mut viewer = Viewer::new(small_config());
        let before = viewer.tree.buffers.clone();

        viewer.cfg.params.max_depth = MAX_DEPTH_LIMIT + 1;
        viewer.regenerate();

        assert!(viewer.param_error.is_some());
        assert_eq!(viewer.tree.buffers, before);

        // Fixing the parameters clears the error.
        viewer.cfg.params.max_depth = 1;
        viewer.regenerate();
        assert!(viewer.param_error.is_none());
        assert_eq!(viewer.tree.buffers.len(), 60);
    }

    #[test]
    fn randomize_seed_regenerates_with_new_seed() {
        let mut viewer = Viewer::new(small_config());
        viewer.randomize_seed();
        let expected = tree_core::generate(viewer.cfg.seed, &viewer.cfg.params);
        assert_eq!(viewer.tree.buffers, expected.buffers);
    }

    #[test]
    fn advance_clock_only_runs_when_running() {
        let mut viewer = Viewer::new(small_config());
        viewer.running = true;
        viewer.advance_clock(1.0);
        viewer.advance_clock(1.5);
        assert!((viewer.clock - 1.5).abs() < 1e-9);

        viewer.running = false;
        viewer.advance_clock(3.0);
        assert!((viewer.clock - 1.5).abs() < 1e-9);

        // Time spent paused is not replayed on resume.
        viewer.running = true;
        viewer.advance_clock(3.25);
        assert!((viewer.clock - 1.75).abs() < 1e-9);
    }

    #[test]
    fn segment_near_finds_the_trunk() {
        let mut viewer = Viewer::new(small_config());
        viewer.yaw = 0.0;
        viewer.zoom = 4.0;
        // Midpoint of the vertical trunk.
        assert_eq!(viewer.segment_near(Vec2::new(0.0, 13.5)), Some(0));
        // Far away from every branch.
        assert_eq!(viewer.segment_near(Vec2::new(500.0, -500.0)), None);
    }

    #[test]
    fn to_color32_clamps_channels() {
        assert_eq!(
            to_color32(Vec3::new(2.0, -1.0, 0.5)),
            egui::Color32::from_rgb(255, 0, 127)
        );
    }
}
