use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Math;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config;
use crate::dom;
use crate::theme::Theme;

const CANVAS_STYLE: &str = "position: absolute; top: 0; left: 0; width: 100%; height: 100%;";
const MAX_SPEED: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette([&'static str; 3]);

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self([
                "rgba(99, 102, 241, 0.3)",
                "rgba(139, 92, 246, 0.25)",
                "rgba(6, 182, 212, 0.2)",
            ]),
            Theme::Light => Self([
                "rgba(99, 102, 241, 0.2)",
                "rgba(139, 92, 246, 0.15)",
                "rgba(6, 182, 212, 0.1)",
            ]),
        }
    }

    /// Maps a roll in `[0, 1)` onto one of the colours.
    pub fn pick(&self, roll: f64) -> &'static str {
        let index = (roll * self.0.len() as f64).floor() as usize;
        self.0[index.min(self.0.len() - 1)]
    }

    #[cfg(test)]
    pub fn contains(&self, color: &str) -> bool {
        self.0.contains(&color)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
    pub speed_x: f64,
    pub speed_y: f64,
    pub opacity: f64,
}

impl Particle {
    fn spawn(width: f64, height: f64, palette: &Palette, rng: &mut impl FnMut() -> f64) -> Self {
        Self {
            x: rng() * width,
            y: rng() * height,
            radius: rng() * 3.0 + 1.0,
            color: palette.pick(rng()),
            speed_x: (rng() - 0.5) * MAX_SPEED,
            speed_y: (rng() - 0.5) * MAX_SPEED,
            opacity: rng() * 0.5 + 0.2,
        }
    }

    /// Moves one tick and wraps to the opposite edge when leaving the canvas.
    fn step(&mut self, width: f64, height: f64) {
        self.x += self.speed_x;
        self.y += self.speed_y;

        if self.x < 0.0 {
            self.x = width;
        } else if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        } else if self.y > height {
            self.y = 0.0;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            particles: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Replaces every particle with a fresh one inside the current bounds.
    pub fn populate(&mut self, count: usize, palette: &Palette, rng: &mut impl FnMut() -> f64) {
        let (width, height) = (self.width, self.height);
        self.particles = (0..count)
            .map(|_| Particle::spawn(width, height, palette, &mut *rng))
            .collect();
    }

    pub fn recolor(&mut self, palette: &Palette, rng: &mut impl FnMut() -> f64) {
        for particle in &mut self.particles {
            particle.color = palette.pick(rng());
        }
    }

    pub fn step(&mut self) {
        let (width, height) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.step(width, height);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

struct Scene {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    field: ParticleField,
    theme: Theme,
}

impl Scene {
    fn draw_next(&mut self) {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        self.context.clear_rect(0.0, 0.0, width, height);

        self.field.step();
        for particle in self.field.particles() {
            self.context.begin_path();
            if self
                .context
                .arc(particle.x, particle.y, particle.radius, 0.0, TAU)
                .is_err()
            {
                continue;
            }
            self.context.set_global_alpha(particle.opacity);
            self.context.set_fill_style_str(particle.color);
            self.context.fill();
        }
        self.context.set_global_alpha(1.0);
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle to the running particle canvas. Clones share the same canvas.
#[derive(Clone)]
pub struct ParticleSystem {
    scene: Rc<RefCell<Scene>>,
    frame: FrameSlot,
    animation_id: Rc<Cell<Option<i32>>>,
}

impl ParticleSystem {
    /// Mounts into `#particles`. `Ok(None)` when the page has no container.
    pub fn mount(theme: Theme) -> Result<Option<Self>, JsValue> {
        let Some(document) = dom::document() else {
            return Ok(None);
        };
        let Some(container) = document.get_element_by_id("particles") else {
            debug!("No #particles container, skipping particle background");
            return Ok(None);
        };

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.style().set_css_text(CANVAS_STYLE);
        container.append_child(&canvas)?;

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d canvas context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let system = Self {
            scene: Rc::new(RefCell::new(Scene {
                canvas,
                context,
                field: ParticleField::new(0.0, 0.0),
                theme,
            })),
            frame: Rc::new(RefCell::new(None)),
            animation_id: Rc::new(Cell::new(None)),
        };
        system.resize();
        system.install_frame();
        system.start();

        info!("Particle background running with {} particles", config::PARTICLE_COUNT);
        Ok(Some(system))
    }

    fn install_frame(&self) {
        let scene = self.scene.clone();
        let frame = self.frame.clone();
        let animation_id = self.animation_id.clone();
        *self.frame.borrow_mut() = Some(Closure::new(move || {
            scene.borrow_mut().draw_next();
            animation_id.set(request_frame(&frame));
        }));
    }

    /// Matches the canvas to the viewport and regenerates the particles.
    pub fn resize(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let (width, height) = dom::viewport_size(&window);

        let mut scene = self.scene.borrow_mut();
        scene.canvas.set_width(width as u32);
        scene.canvas.set_height(height as u32);

        let palette = Palette::for_theme(scene.theme);
        scene.field.resize(width, height);
        scene
            .field
            .populate(config::PARTICLE_COUNT, &palette, &mut Math::random);
    }

    pub fn update_colors(&self, theme: Theme) {
        let mut scene = self.scene.borrow_mut();
        scene.theme = theme;
        scene
            .field
            .recolor(&Palette::for_theme(theme), &mut Math::random);
    }

    pub fn start(&self) {
        if self.animation_id.get().is_none() {
            self.animation_id.set(request_frame(&self.frame));
        }
    }

    pub fn stop(&self) {
        if let Some(id) = self.animation_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }
}

fn request_frame(frame: &FrameSlot) -> Option<i32> {
    let window = web_sys::window()?;
    let frame = frame.borrow();
    let callback = frame.as_ref()?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cycles through fixed rolls so spawns are reproducible.
    fn rolls(values: &'static [f64]) -> impl FnMut() -> f64 {
        let mut i = 0;
        move || {
            let v = values[i % values.len()];
            i += 1;
            v
        }
    }

    #[test]
    fn palette_follows_theme() {
        let dark = Palette::for_theme(Theme::Dark);
        let light = Palette::for_theme(Theme::Light);
        assert_eq!(dark.pick(0.0), "rgba(99, 102, 241, 0.3)");
        assert_eq!(light.pick(0.0), "rgba(99, 102, 241, 0.2)");
        assert_eq!(light.pick(0.5), "rgba(139, 92, 246, 0.15)");
        assert_eq!(dark.pick(0.99), "rgba(6, 182, 212, 0.2)");
    }

    #[test]
    fn palette_pick_clamps_a_roll_of_one() {
        let palette = Palette::for_theme(Theme::Dark);
        assert_eq!(palette.pick(1.0), "rgba(6, 182, 212, 0.2)");
    }

    #[test]
    fn spawned_particles_respect_ranges() {
        let mut field = ParticleField::new(800.0, 600.0);
        let palette = Palette::for_theme(Theme::Light);
        field.populate(30, &palette, &mut rolls(&[0.0, 0.25, 0.5, 0.75, 0.999]));

        assert_eq!(field.particles().len(), 30);
        for p in field.particles() {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
            assert!((1.0..4.0).contains(&p.radius));
            assert!(p.speed_x.abs() <= 0.15 && p.speed_y.abs() <= 0.15);
            assert!((0.2..0.7).contains(&p.opacity));
            assert!(palette.contains(p.color));
        }
    }

    #[test]
    fn step_moves_by_speed() {
        let mut field = ParticleField::new(100.0, 100.0);
        field.particles = vec![Particle {
            x: 10.0,
            y: 20.0,
            radius: 2.0,
            color: "red",
            speed_x: 0.1,
            speed_y: -0.1,
            opacity: 0.5,
        }];
        field.step();
        let p = &field.particles()[0];
        assert!((p.x - 10.1).abs() < 1e-9);
        assert!((p.y - 19.9).abs() < 1e-9);
    }

    #[test]
    fn particles_wrap_to_opposite_edge() {
        let mut field = ParticleField::new(100.0, 50.0);
        let base = Particle {
            x: 0.0,
            y: 0.0,
            radius: 1.0,
            color: "red",
            speed_x: 0.0,
            speed_y: 0.0,
            opacity: 0.5,
        };
        field.particles = vec![
            Particle { x: 0.05, speed_x: -0.1, ..base.clone() },
            Particle { x: 99.95, speed_x: 0.1, ..base.clone() },
            Particle { y: 0.05, speed_y: -0.1, ..base.clone() },
            Particle { y: 49.95, speed_y: 0.1, ..base },
        ];
        field.step();

        let p = field.particles();
        assert_eq!(p[0].x, 100.0);
        assert_eq!(p[1].x, 0.0);
        assert_eq!(p[2].y, 50.0);
        assert_eq!(p[3].y, 0.0);
    }

    #[test]
    fn positions_stay_in_bounds_over_many_frames() {
        let mut field = ParticleField::new(320.0, 240.0);
        let palette = Palette::for_theme(Theme::Dark);
        field.populate(30, &palette, &mut rolls(&[0.01, 0.9, 0.4, 0.0, 0.99, 0.3, 0.7]));
        for _ in 0..5_000 {
            field.step();
            for p in field.particles() {
                assert!((0.0..=320.0).contains(&p.x));
                assert!((0.0..=240.0).contains(&p.y));
            }
        }
    }

    #[test]
    fn recolor_switches_palette_and_keeps_motion() {
        let mut field = ParticleField::new(200.0, 200.0);
        field.populate(10, &Palette::for_theme(Theme::Light), &mut rolls(&[0.3, 0.6, 0.9]));
        let before: Vec<(f64, f64)> = field.particles().iter().map(|p| (p.x, p.y)).collect();

        let dark = Palette::for_theme(Theme::Dark);
        field.recolor(&dark, &mut rolls(&[0.1, 0.5, 0.8]));

        for (p, (x, y)) in field.particles().iter().zip(before) {
            assert!(dark.contains(p.color));
            assert_eq!((p.x, p.y), (x, y));
        }
    }
}
