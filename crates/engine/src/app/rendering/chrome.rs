use crate::app::{
    ControlsLayout, DialogStatus, FrameStats, GameMode, GameSession, Vec2, VirtualStick,
    STICK_BASE_RADIUS_PX, STICK_KNOB_RADIUS_PX,
};

use super::canvas::with_alpha;
use super::text::{
    draw_text, draw_text_centered, glyph_advance, glyph_height, line_height, text_width, wrap_text,
};
use super::Canvas;

const MENU_BACKGROUND: [u8; 4] = [17, 24, 39, 255];
const MENU_TITLE_COLOR: [u8; 4] = [129, 140, 248, 255];
const MENU_SUBTITLE_COLOR: [u8; 4] = [156, 163, 175, 255];
const MENU_FOOTER_COLOR: [u8; 4] = [75, 85, 99, 255];
const TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const DIM_TEXT_COLOR: [u8; 4] = [148, 163, 184, 255];
const SPEAKER_COLOR: [u8; 4] = [251, 191, 36, 255];
const PANEL_COLOR: [u8; 4] = [15, 23, 42, 235];
const PANEL_BORDER_COLOR: [u8; 4] = [71, 85, 105, 255];
const INTERACT_BUTTON_COLOR: [u8; 4] = [59, 130, 246, 205];
const ATTACK_BUTTON_COLOR: [u8; 4] = [239, 68, 68, 205];

const TITLE: &str = "Aetheria";
const SUBTITLE: &str = "The Lost Chronicles - Tech Demo";
const START_HINT: &str = "Press Enter or tap to start";
const MENU_FOOTER: &str = "Powered by Rust, winit & Gemini";
const PAUSED_TITLE: &str = "Paused";
const PAUSED_HINT: &str = "Press P to resume";
const LOADING_TEXT: &str = "Thinking...";
const CONTINUE_HINT: &str = "Enter: continue";

const PANEL_MARGIN: i32 = 16;
const PANEL_PADDING: i32 = 16;
const DIALOG_PANEL_HEIGHT: i32 = 168;
const BODY_SCALE: i32 = 2;
const OVERLAY_SCALE: i32 = 2;

/// Host-side state the chrome needs besides the session.
#[derive(Debug, Clone, Copy)]
pub struct HudView<'a> {
    pub controls: &'a ControlsLayout,
    pub stick: &'a VirtualStick,
    /// Present when the debug overlay is visible.
    pub stats: Option<FrameStats>,
}

/// Mode-dependent overlays drawn on top of the scene.
pub fn draw_chrome(canvas: &mut Canvas<'_>, session: &GameSession, hud: &HudView<'_>) {
    match session.mode() {
        GameMode::Menu => {}
        GameMode::Playing => draw_controls(canvas, hud.controls, hud.stick),
        GameMode::Paused => draw_paused(canvas),
        GameMode::Dialog(state) => draw_dialog(canvas, &state.speaker_name, &state.status),
    }
    if let Some(notice) = session.notice() {
        draw_notice(canvas, &notice.text);
    }
    if let Some(stats) = hud.stats {
        draw_debug_overlay(canvas, &overlay_lines(session, stats));
    }
}

pub fn draw_menu(canvas: &mut Canvas<'_>) {
    canvas.clear(MENU_BACKGROUND);
    let center_x = canvas.width() as i32 / 2;
    let middle = canvas.height() as i32 / 2;
    draw_text_centered(canvas, center_x, middle - 120, TITLE, 8, MENU_TITLE_COLOR);
    draw_text_centered(canvas, center_x, middle - 60, SUBTITLE, 3, MENU_SUBTITLE_COLOR);
    draw_text_centered(canvas, center_x, middle + 10, START_HINT, 3, TEXT_COLOR);
    draw_text_centered(
        canvas,
        center_x,
        canvas.height() as i32 - 48,
        MENU_FOOTER,
        2,
        MENU_FOOTER_COLOR,
    );
}

fn draw_paused(canvas: &mut Canvas<'_>) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    canvas.fill_rect(0, 0, width, height, [0, 0, 0, 128]);
    draw_text_centered(canvas, width / 2, height / 2 - 40, PAUSED_TITLE, 6, TEXT_COLOR);
    draw_text_centered(canvas, width / 2, height / 2 + 10, PAUSED_HINT, 3, DIM_TEXT_COLOR);
}

fn draw_dialog(canvas: &mut Canvas<'_>, speaker: &str, status: &DialogStatus) {
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;
    let panel_width = width - PANEL_MARGIN * 2;
    let panel_height = DIALOG_PANEL_HEIGHT.min(height - PANEL_MARGIN * 2);
    if panel_width <= PANEL_PADDING * 2 || panel_height <= PANEL_PADDING * 2 {
        return;
    }
    let left = PANEL_MARGIN;
    let top = height - PANEL_MARGIN - panel_height;
    canvas.fill_rect(left, top, panel_width, panel_height, PANEL_COLOR);
    canvas.stroke_rect(left, top, panel_width, panel_height, PANEL_BORDER_COLOR);

    let text_left = left + PANEL_PADDING;
    let mut y = top + PANEL_PADDING;
    draw_text(canvas, text_left, y, speaker, 3, SPEAKER_COLOR);
    y += line_height(3) + 4;

    let bottom = top + panel_height - PANEL_PADDING - line_height(BODY_SCALE);
    match status {
        DialogStatus::Loading => {
            draw_text(canvas, text_left, y, LOADING_TEXT, BODY_SCALE, DIM_TEXT_COLOR);
        }
        DialogStatus::Ready(text) => {
            let max_chars =
                ((panel_width - PANEL_PADDING * 2) / glyph_advance(BODY_SCALE)) as usize;
            for line in wrap_text(text, max_chars) {
                if y > bottom - line_height(BODY_SCALE) {
                    break;
                }
                draw_text(canvas, text_left, y, &line, BODY_SCALE, TEXT_COLOR);
                y += line_height(BODY_SCALE);
            }
            let hint_x = left + panel_width - PANEL_PADDING - text_width(CONTINUE_HINT, BODY_SCALE);
            draw_text(canvas, hint_x, bottom, CONTINUE_HINT, BODY_SCALE, DIM_TEXT_COLOR);
        }
    }
}

fn draw_controls(canvas: &mut Canvas<'_>, layout: &ControlsLayout, stick: &VirtualStick) {
    let base = layout.stick.center;
    canvas.fill_circle(base, STICK_BASE_RADIUS_PX, [255, 255, 255, 26]);
    canvas.stroke_circle(base, STICK_BASE_RADIUS_PX, 2.0, [255, 255, 255, 77]);
    let offset = stick.knob_offset_px();
    let knob = Vec2::new(base.x + offset.x, base.y + offset.y);
    let knob_alpha = if stick.is_active() { 0.7 } else { 0.45 };
    canvas.fill_circle(
        knob,
        STICK_KNOB_RADIUS_PX,
        with_alpha([255, 255, 255, 255], knob_alpha),
    );

    draw_button(
        canvas,
        layout.interact_button.center,
        layout.interact_button.radius,
        INTERACT_BUTTON_COLOR,
        "E",
    );
    draw_button(
        canvas,
        layout.attack_button.center,
        layout.attack_button.radius,
        ATTACK_BUTTON_COLOR,
        "X",
    );
}

fn draw_button(canvas: &mut Canvas<'_>, center: Vec2, radius: f32, color: [u8; 4], label: &str) {
    canvas.fill_circle(center, radius, color);
    canvas.stroke_circle(center, radius, 2.0, [255, 255, 255, 90]);
    let scale = 3;
    draw_text_centered(
        canvas,
        center.x.round() as i32,
        center.y.round() as i32 - glyph_height(scale) / 2,
        label,
        scale,
        TEXT_COLOR,
    );
}

fn draw_notice(canvas: &mut Canvas<'_>, text: &str) {
    let scale = 2;
    let width = text_width(text, scale) + PANEL_PADDING * 2;
    let height = glyph_height(scale) + PANEL_PADDING;
    let left = canvas.width() as i32 / 2 - width / 2;
    let top = PANEL_MARGIN * 2;
    canvas.fill_rect(left, top, width, height, PANEL_COLOR);
    canvas.stroke_rect(left, top, width, height, PANEL_BORDER_COLOR);
    draw_text(canvas, left + PANEL_PADDING, top + PANEL_PADDING / 2, text, scale, TEXT_COLOR);
}

fn draw_debug_overlay(canvas: &mut Canvas<'_>, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let longest = lines
        .iter()
        .map(|line| text_width(line, OVERLAY_SCALE))
        .max()
        .unwrap_or(0);
    let inset = 4 * OVERLAY_SCALE;
    let width = longest + inset * 2;
    let height = lines.len() as i32 * line_height(OVERLAY_SCALE) + inset * 2;
    canvas.fill_rect(PANEL_MARGIN / 2, PANEL_MARGIN / 2, width, height, [10, 12, 16, 210]);
    canvas.stroke_rect(PANEL_MARGIN / 2, PANEL_MARGIN / 2, width, height, PANEL_BORDER_COLOR);

    let mut y = PANEL_MARGIN / 2 + inset;
    for line in lines {
        draw_text(canvas, PANEL_MARGIN / 2 + inset, y, line, OVERLAY_SCALE, TEXT_COLOR);
        y += line_height(OVERLAY_SCALE);
    }
}

pub fn overlay_lines(session: &GameSession, stats: FrameStats) -> Vec<String> {
    let player = session.player();
    let closest = match session.closest_interactable() {
        Some(closest) => format!(
            "Closest: {} {:.2}{}",
            closest.entity.name,
            closest.distance,
            if closest.in_range() { " (in range)" } else { "" }
        ),
        None => "Closest: none".to_string(),
    };
    vec![
        format!("FPS: {:.1}", stats.fps),
        format!("Frame: {:.2} ms", stats.frame_time_ms),
        format!("Steps/s: {:.1}", stats.steps_per_second),
        format!("Mode: {:?}", session.mode().kind()),
        format!("Player: {:.2}, {:.2}", player.x, player.y),
        closest,
    ]
}
