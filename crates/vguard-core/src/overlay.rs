//! On-screen overlay composition.
//!
//! The controller decides what to draw; a [`Renderer`] decides how. Nothing
//! drawn here feeds back into control decisions.

use std::time::Duration;
use vguard_models::{MatchRect, Mode, TemplateId};

/// Grayscale level used for ordinary matches and HUD text.
pub const NORMAL_COLOR: u8 = 255;
/// Grayscale level used for the danger target.
pub const DANGER_COLOR: u8 = 0;

/// Gap between a match box and its label.
const TEXT_OFFSET: i32 = 5;

/// Stroke parameters for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub color: u8,
    /// Line thickness in pixels
    pub thickness: u32,
    /// Cross marker half-size in pixels
    pub size: u32,
    /// Text scale factor
    pub scale: f32,
}

impl DrawStyle {
    pub const fn normal() -> Self {
        Self {
            color: NORMAL_COLOR,
            thickness: 1,
            size: 3,
            scale: 1.0,
        }
    }

    pub const fn danger() -> Self {
        Self {
            color: DANGER_COLOR,
            thickness: 3,
            size: 7,
            scale: 1.2,
        }
    }
}

/// Overlay drawing primitives.
pub trait Renderer {
    fn draw_rectangle(&mut self, rect: MatchRect, style: &DrawStyle);
    fn draw_text(&mut self, x: i32, y: i32, text: &str, style: &DrawStyle);
    fn draw_cross(&mut self, x: i32, y: i32, style: &DrawStyle);
}

/// Renderer that discards everything, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_rectangle(&mut self, _rect: MatchRect, _style: &DrawStyle) {}
    fn draw_text(&mut self, _x: i32, _y: i32, _text: &str, _style: &DrawStyle) {}
    fn draw_cross(&mut self, _x: i32, _y: i32, _style: &DrawStyle) {}
}

/// Box, label and center cross for one match.
pub fn draw_match(renderer: &mut dyn Renderer, id: &TemplateId, rect: MatchRect, danger: bool) {
    let style = if danger {
        DrawStyle::danger()
    } else {
        DrawStyle::normal()
    };
    let (cx, cy) = rect.center();
    let text_y = if rect.y > TEXT_OFFSET {
        rect.y - TEXT_OFFSET
    } else {
        0
    };

    renderer.draw_rectangle(rect, &style);
    renderer.draw_text(rect.x, text_y, id.as_str(), &style);
    renderer.draw_cross(cx, cy, &style);
}

/// Mode-specific status line drawn below the HUD header.
pub fn draw_status(renderer: &mut dyn Renderer, text: &str) {
    renderer.draw_text(5, 35, text, &DrawStyle::normal());
}

/// Heads-up display contents for one frame.
#[derive(Debug, Clone)]
pub struct Hud<'a> {
    pub mode: Mode,
    pub target: Option<&'a TemplateId>,
    /// Time left in a delay mode
    pub countdown: Option<Duration>,
    pub fps: Option<f32>,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Draw mode, armed target, countdown and frame rate.
pub fn draw_hud(renderer: &mut dyn Renderer, hud: &Hud<'_>) {
    let normal = DrawStyle::normal();
    let width = hud.frame_width as i32;
    let height = hud.frame_height as i32;

    renderer.draw_text(5, 5, &format!("STATE:{}", hud.mode.label()), &normal);

    if let Some(target) = hud.target {
        let style = DrawStyle {
            color: DANGER_COLOR,
            ..normal
        };
        renderer.draw_text(5, 20, &format!("TRACK:{}", target), &style);
    }

    if let Some(remaining) = hud.countdown {
        renderer.draw_text(
            width / 2 - 20,
            height / 2 - 10,
            &format!("{:.1}s", remaining.as_secs_f32()),
            &normal,
        );
    }

    if let Some(fps) = hud.fps {
        renderer.draw_text(width - 72, 5, &format!("FPS:{:.1}", fps), &normal);
    }
}
