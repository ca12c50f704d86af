//! Interactive garden viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Garden`] together with the
//! camera and run controls, and implements [`eframe::App`] to render the grid
//! and drive the simulation from an egui UI.

use eframe::App;
use egui::Color32;
use garden_core::{Cell, Garden, GardenConfig, PlantId, SimError};
use glam::Vec2;
use rand::{Rng, rng};
use tracing::{error, info};

/// Grid width in slots.
pub const GARDEN_WIDTH: usize = 100;
/// Grid height in slots.
pub const GARDEN_HEIGHT: usize = 70;

const BACKGROUND: Color32 = Color32::from_rgb(0x1d, 0x2b, 0x53);
const SKY: Color32 = Color32::from_rgb(0xc2, 0xc3, 0xc7);
const NAVY: Color32 = Color32::from_rgb(0x2b, 0x33, 0x5f);
const PURPLE: Color32 = Color32::from_rgb(0x7e, 0x20, 0x72);
const YELLOW: Color32 = Color32::from_rgb(0xe9, 0xc3, 0x5b);
const SEED: Color32 = Color32::from_rgb(0xd4, 0x8a, 0x3c);

const STRUCTURAL_TILES: [Color32; 7] = [
    Color32::from_rgb(0x1f, 0x6e, 0x34),
    Color32::from_rgb(0x27, 0x7f, 0x3c),
    Color32::from_rgb(0x2f, 0x8f, 0x45),
    Color32::from_rgb(0x3a, 0x9e, 0x4b),
    Color32::from_rgb(0x5b, 0x7a, 0x2e),
    Color32::from_rgb(0x6b, 0x4a, 0x2b),
    Color32::from_rgb(0x7a, 0x58, 0x33),
];

const TIP_TILES: [Color32; 3] = [
    Color32::from_rgb(0x9b, 0xe5, 0x64),
    Color32::from_rgb(0xb8, 0xf0, 0x7a),
    Color32::from_rgb(0xe4, 0xf8, 0x8c),
];

const PLANT_PALETTE: [Color32; 14] = [
    Color32::from_rgb(0xff, 0x00, 0x4d),
    Color32::from_rgb(0xff, 0xa3, 0x00),
    Color32::from_rgb(0xff, 0xec, 0x27),
    Color32::from_rgb(0x00, 0xe4, 0x36),
    Color32::from_rgb(0x29, 0xad, 0xff),
    Color32::from_rgb(0x83, 0x76, 0x9c),
    Color32::from_rgb(0xff, 0x77, 0xa8),
    Color32::from_rgb(0xff, 0xcc, 0xaa),
    Color32::from_rgb(0x00, 0x87, 0x51),
    Color32::from_rgb(0xab, 0x52, 0x36),
    Color32::from_rgb(0x7e, 0x25, 0x53),
    Color32::from_rgb(0x5f, 0x57, 0x4f),
    Color32::from_rgb(0x1d, 0x2b, 0x53),
    Color32::from_rgb(0xff, 0xf1, 0xe8),
];

/// What the central panel paints for each slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Tile colour per cell kind.
    Plants,
    /// Light multiplier each occupied slot receives.
    Energy,
    /// Slots at or below the first occupant of their column.
    Shadow,
    /// One colour per owning plant.
    PlantId,
}

impl DrawMode {
    pub const ALL: [DrawMode; 4] = [
        DrawMode::Plants,
        DrawMode::Energy,
        DrawMode::Shadow,
        DrawMode::PlantId,
    ];

    pub fn next(self) -> Self {
        match self {
            DrawMode::Plants => DrawMode::Energy,
            DrawMode::Energy => DrawMode::Shadow,
            DrawMode::Shadow => DrawMode::PlantId,
            DrawMode::PlantId => DrawMode::Plants,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DrawMode::Plants => "Plants",
            DrawMode::Energy => "Energy",
            DrawMode::Shadow => "Shadow",
            DrawMode::PlantId => "Plant id",
        }
    }
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle keyboard shortcuts and panel widgets.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Paint the grid in the current [`DrawMode`].
///
/// ### Fields
/// - `garden` - The simulation being shown.
/// - `cfg` - Configuration every reset rebuilds the garden from.
/// - `size` - Grid dimensions as `(width, height)`.
/// - `seed` - Seed the current garden was built with.
///
/// - `rng` - Draws a fresh seed on reset when `cfg.rng_seed` is unset.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `tile_size` - Side of one slot in screen pixels (the zoom level).
/// - `pan` - Screen-space pan offset in pixels.
/// - `draw_mode` - Current rendering of the grid.
/// - `hovered` - Slot under the pointer during the last frame.
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps.
/// - `last_error` - Error that paused the run, if any.
pub struct Viewer {
    garden: Garden,
    cfg: GardenConfig,
    size: (usize, usize),
    seed: u64,

    rng: rand::rngs::ThreadRng,

    running: bool,
    tile_size: f32,
    pan: egui::Vec2,
    draw_mode: DrawMode,
    hovered: Option<(i32, i32)>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
    last_error: Option<SimError>,
}

impl Viewer {
    /// Creates a viewer over a [`GARDEN_WIDTH`] x [`GARDEN_HEIGHT`] garden.
    pub fn new(cfg: GardenConfig) -> Result<Self, SimError> {
        Self::with_size(cfg, GARDEN_WIDTH, GARDEN_HEIGHT)
    }

    /// Creates a viewer over a `width` x `height` garden seeded with one
    /// plant in the middle.
    ///
    /// ### Returns
    /// The viewer, or the error [`Garden::new`] reports for the
    /// configuration or dimensions.
    pub fn with_size(cfg: GardenConfig, width: usize, height: usize) -> Result<Self, SimError> {
        let mut rng = rng();
        let seed = cfg.rng_seed.unwrap_or_else(|| rng.random());
        let garden = Garden::new(width, height, seeded(&cfg, seed))?;

        Ok(Self {
            garden,
            cfg,
            size: (width, height),
            seed,
            rng,
            running: false,
            tile_size: 8.0,
            pan: egui::vec2(0.0, 0.0),
            draw_mode: DrawMode::Plants,
            hovered: None,
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
            last_error: None,
        })
    }

    /// Rebuilds the garden from the stored configuration and stops running.
    ///
    /// A fixed `rng_seed` reproduces the previous run; otherwise a fresh
    /// seed is drawn. Camera and draw mode are kept.
    fn reset(&mut self) {
        let seed = self.cfg.rng_seed.unwrap_or_else(|| self.rng.random());
        let (width, height) = self.size;

        match Garden::new(width, height, seeded(&self.cfg, seed)) {
            Ok(garden) => {
                info!(seed, "garden reset");
                self.garden = garden;
                self.seed = seed;
                self.last_error = None;
            }
            Err(err) => {
                error!(%err, "failed to reset garden");
                self.last_error = Some(err);
            }
        }
        self.running = false;
    }

    /// Advances the garden by one tick.
    ///
    /// A failed tick pauses the run and keeps the error for the status bar.
    fn step_once(&mut self) {
        if let Err(err) = self.garden.update() {
            error!(%err, tick = self.garden.tick(), "tick failed, pausing");
            self.running = false;
            self.last_error = Some(err);
        }
    }

    /// Steps once and records timing for the status bar.
    fn step_at(&mut self, now: f64) {
        if self.last_step_time > 0.0 {
            self.last_step_dt = now - self.last_step_time;
        }
        self.step_once();
        self.last_step_time = now;
    }

    /// Screen position of the grid's top-left corner.
    ///
    /// The grid is centred in `rect` and then shifted by `pan`.
    fn grid_origin(&self, rect: egui::Rect) -> egui::Pos2 {
        let extent = egui::vec2(self.garden.width() as f32, self.garden.height() as f32)
            * self.tile_size;
        rect.center() - extent * 0.5 + self.pan
    }

    /// Converts a position in slot units to screen-space.
    ///
    /// ### Parameters
    /// - `p` - Grid position; `(x, y)` is the top-left corner of slot `(x, y)`.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    fn grid_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let origin = self.grid_origin(rect);
        egui::pos2(
            origin.x + p.x * self.tile_size,
            origin.y + p.y * self.tile_size,
        )
    }

    /// Converts a screen-space position to slot units.
    ///
    /// This is the inverse of [`Viewer::grid_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_grid(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let origin = self.grid_origin(rect);
        Vec2::new(p.x - origin.x, p.y - origin.y) / self.tile_size
    }

    /// Screen rectangle covered by slot `(x, y)`.
    fn cell_rect(&self, x: i32, y: i32, rect: egui::Rect) -> egui::Rect {
        let min = self.grid_to_screen(Vec2::new(x as f32, y as f32), rect);
        egui::Rect::from_min_size(min, egui::Vec2::splat(self.tile_size))
    }

    /// Slot under a screen position, if the position lies on the grid.
    fn slot_at(&self, p: egui::Pos2, rect: egui::Rect) -> Option<(i32, i32)> {
        let g = self.screen_to_grid(p, rect).floor();
        let (x, y) = (g.x as i32, g.y as i32);
        let inside = x >= 0
            && y >= 0
            && (x as usize) < self.garden.width()
            && (y as usize) < self.garden.height();
        inside.then_some((x, y))
    }

    /// One-line description of a slot and, for plant cells, their plant.
    fn describe_slot(&self, x: i32, y: i32) -> String {
        let Some(cell) = self.garden.get_cell(x, y) else {
            return format!("({x}, {y}) empty");
        };

        let local = match cell {
            Cell::GrowthTip(tip) => format!(", local energy {}", tip.energy()),
            Cell::Dispersal(seed) => format!(", energy {}", seed.energy()),
            Cell::Structural(_) => String::new(),
        };

        let owner = cell
            .plant()
            .and_then(|id| self.garden.plant(id).map(|plant| (id, plant)))
            .map(|(id, plant)| {
                format!(
                    " | plant #{id}: energy {}/{}, age {}",
                    plant.energy(),
                    plant.capacity(),
                    plant.age()
                )
            })
            .unwrap_or_default();

        format!("({x}, {y}) {:?}{local}{owner}", cell.kind())
    }

    /// Reacts to `Space`, `F`, `R` and `T`.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (toggle, step, reset, cycle, now) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::F),
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::T),
                i.time,
            )
        });

        if toggle {
            self.running = !self.running;
        }
        if step && !self.running {
            self.step_at(now);
        }
        if reset {
            self.reset();
        }
        if cycle {
            self.draw_mode = self.draw_mode.next();
        }
    }

    /// Builds the top panel UI (run controls, stepping, draw mode, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    self.step_at(now);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                for mode in DrawMode::ALL {
                    if ui
                        .selectable_label(self.draw_mode == mode, mode.label())
                        .clicked()
                    {
                        self.draw_mode = mode;
                    }
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.tile_size, 1.0..=32.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (tick, plant counts, hovered slot).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("tick = {}", self.garden.tick()));
                ui.label(format!("plants = {}", self.garden.plant_count()));
                ui.label(format!("occupied = {}", self.garden.cells().count()));
                ui.label(format!(
                    "grid = {}x{}",
                    self.garden.width(),
                    self.garden.height()
                ));
                ui.label(format!("seed = {}", self.seed));
                if !self.garden.has_plants() {
                    ui.colored_label(Color32::LIGHT_RED, "no living plants");
                }
                if let Some(err) = &self.last_error {
                    ui.colored_label(Color32::RED, err.to_string());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                    if let Some((x, y)) = self.hovered {
                        ui.separator();
                        ui.label(self.describe_slot(x, y));
                    }
                });
            });
        });
    }

    /// Builds the right-hand panel listing the active configuration.
    fn ui_config_panel(&self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");
                ui.separator();

                egui::Grid::new("config_grid").striped(true).show(ui, |ui| {
                    for (name, value) in config_rows(&self.cfg) {
                        ui.label(name);
                        ui.label(value);
                        ui.end_row();
                    }
                });

                ui.separator();
                ui.label("Space run/pause, F step, R reset, T draw mode");
            });
    }

    /// Builds the central panel where the grid is painted.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let grid_before = self.screen_to_grid(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.tile_size = (self.tile_size * factor).clamp(1.0, 32.0);

                let screen_after = self.grid_to_screen(grid_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            self.hovered = response.hover_pos().and_then(|p| self.slot_at(p, rect));

            self.paint_grid(&painter, rect);

            if let Some((x, y)) = self.hovered {
                painter.rect_stroke(
                    self.cell_rect(x, y, rect),
                    0.0,
                    egui::Stroke::new(1.0, Color32::WHITE),
                    egui::StrokeKind::Outside,
                );
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                if now - self.last_step_time >= self.step_interval {
                    self.step_at(now);
                }
                ctx.request_repaint();
            }
        });
    }

    /// Paints every slot according to the current draw mode.
    fn paint_grid(&self, painter: &egui::Painter, rect: egui::Rect) {
        let bounds = egui::Rect::from_min_max(
            self.grid_to_screen(Vec2::ZERO, rect),
            self.grid_to_screen(
                Vec2::new(self.garden.width() as f32, self.garden.height() as f32),
                rect,
            ),
        );
        painter.rect_filled(bounds, 0.0, BACKGROUND);

        match self.draw_mode {
            DrawMode::Plants => {
                for (x, y, cell) in self.garden.cells() {
                    painter.rect_filled(self.cell_rect(x, y, rect), 0.0, plant_colour(cell));
                }
            }
            DrawMode::Energy => {
                let sun_level = self.garden.config().sun_level;
                for (index, light) in self.garden.light_map().into_iter().enumerate() {
                    if let Some(multiplier) = light {
                        let (x, y) = self.slot_of(index);
                        painter.rect_filled(
                            self.cell_rect(x, y, rect),
                            0.0,
                            energy_colour(multiplier, sun_level),
                        );
                    }
                }
            }
            DrawMode::Shadow => {
                for (index, shaded) in shadow_mask(&self.garden).into_iter().enumerate() {
                    let (x, y) = self.slot_of(index);
                    let colour = if shaded { NAVY } else { SKY };
                    painter.rect_filled(self.cell_rect(x, y, rect), 0.0, colour);
                }
            }
            DrawMode::PlantId => {
                for (x, y, cell) in self.garden.cells() {
                    let colour = cell.plant().map_or(SEED, plant_id_colour);
                    painter.rect_filled(self.cell_rect(x, y, rect), 0.0, colour);
                }
            }
        }
    }

    /// Slot coordinates of a row-major index.
    fn slot_of(&self, index: usize) -> (i32, i32) {
        let width = self.garden.width();
        ((index % width) as i32, (index / width) as i32)
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

fn seeded(cfg: &GardenConfig, seed: u64) -> GardenConfig {
    GardenConfig {
        rng_seed: Some(seed),
        ..cfg.clone()
    }
}

fn plant_colour(cell: &Cell) -> Color32 {
    let tile = usize::from(cell.tile());
    match cell {
        Cell::Structural(_) => STRUCTURAL_TILES[tile % STRUCTURAL_TILES.len()],
        Cell::GrowthTip(_) => TIP_TILES[tile % TIP_TILES.len()],
        Cell::Dispersal(_) => SEED,
    }
}

fn plant_id_colour(id: PlantId) -> Color32 {
    PLANT_PALETTE[(id % PLANT_PALETTE.len() as u64) as usize]
}

/// Buckets a light multiplier in `0..=sun_level` into three colours.
fn energy_colour(multiplier: u32, sun_level: u32) -> Color32 {
    const BUCKETS: [Color32; 3] = [NAVY, PURPLE, YELLOW];
    if sun_level == 0 {
        return BUCKETS[0];
    }
    let bucket = (u64::from(multiplier) * 2 / u64::from(sun_level)).min(2);
    BUCKETS[bucket as usize]
}

/// Row-major flags marking slots at or below the first occupant of their
/// column.
fn shadow_mask(garden: &Garden) -> Vec<bool> {
    let (width, height) = (garden.width(), garden.height());
    let mut mask = vec![false; width * height];
    for x in 0..width {
        let mut shaded = false;
        for y in 0..height {
            shaded |= garden.get_cell(x as i32, y as i32).is_some();
            mask[y * width + x] = shaded;
        }
    }
    mask
}

fn config_rows(cfg: &GardenConfig) -> Vec<(&'static str, String)> {
    vec![
        ("genome_size", cfg.genome_size.to_string()),
        ("plant_max_age", cfg.plant_max_age.to_string()),
        ("plant_energy_per_cell", cfg.plant_energy_per_cell.to_string()),
        ("sun_level", cfg.sun_level.to_string()),
        ("density_factor", cfg.density_factor.to_string()),
        ("mutation_rate", cfg.mutation_rate.to_string()),
        ("mutation_chance", format!("{:.2}", cfg.mutation_chance)),
        ("initial_energy", cfg.initial_energy.to_string()),
        ("gene_active_chance", format!("{:.2}", cfg.gene_active_chance)),
        (
            "growth_energy_threshold",
            cfg.growth_energy_threshold.to_string(),
        ),
        (
            "rng_seed",
            cfg.rng_seed
                .map_or_else(|| "fresh per reset".to_owned(), |seed| seed.to_string()),
        ),
    ]
}
