use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Entity, GameMode, GameSession, Tile, Vec2, WorldMap};

use super::canvas::{brighten, with_alpha};
use super::chrome::{draw_chrome, draw_menu, HudView};
use super::text::{draw_text_centered, glyph_height};
use super::{Camera, Canvas, Viewport};

const BACKGROUND_COLOR: [u8; 4] = [15, 23, 42, 255];
const CHECKER_BRIGHTNESS: f32 = 1.05;
const TREE_CANOPY_COLOR: [u8; 4] = [6, 78, 59, 255];
const WATER_HIGHLIGHT_ALPHA: f32 = 0.2;
const ENTITY_SHADOW_ALPHA: f32 = 0.3;
const ENTITY_BODY_SCALE: f32 = 0.35;
const ENTITY_GLYPH_COLOR: [u8; 4] = [15, 23, 42, 255];
const PLAYER_SHADOW_ALPHA: f32 = 0.4;
const PLAYER_BODY_COLOR: [u8; 4] = [239, 68, 68, 255];
const PLAYER_EYE_COLOR: [u8; 4] = [255, 255, 255, 255];
const HINT_COLOR: [u8; 4] = [255, 255, 255, 255];
const SHADOW_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Software renderer over a `pixels` surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    tile_px: f32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, tile_px: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            tile_px: tile_px.max(1) as f32,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Rebuilds the surface for a new window size. Zero-sized and repeated
    /// resizes are no-ops.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if self.viewport.width == width && self.viewport.height == height {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub fn render(&mut self, session: &GameSession, hud: &HudView<'_>) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let mut canvas = Canvas::new(
            self.pixels.frame_mut(),
            self.viewport.width,
            self.viewport.height,
        );
        draw_frame(&mut canvas, session, hud, self.tile_px);
        self.pixels.render()
    }
}

/// Composes one full frame for the session's current mode.
pub fn draw_frame(canvas: &mut Canvas<'_>, session: &GameSession, hud: &HudView<'_>, tile_px: f32) {
    if matches!(session.mode(), GameMode::Menu) {
        draw_menu(canvas);
    } else {
        let viewport = Viewport {
            width: canvas.width(),
            height: canvas.height(),
        };
        let camera = Camera::follow(session.player(), viewport, tile_px);
        draw_scene(
            canvas,
            session.world(),
            &camera,
            session.player(),
            session.interaction_target(),
        );
    }
    draw_chrome(canvas, session, hud);
}

/// Tiles, entities, the player and the interaction hint.
pub fn draw_scene(
    canvas: &mut Canvas<'_>,
    world: &WorldMap,
    camera: &Camera,
    player: Vec2,
    hint_target: Option<&Entity>,
) {
    canvas.clear(BACKGROUND_COLOR);
    draw_tiles(canvas, world, camera);
    for entity in world.entities() {
        draw_entity(canvas, camera, entity);
    }
    draw_player(canvas, camera, player);
    if let Some(target) = hint_target {
        draw_hint(canvas, camera, target.position);
    }
}

fn draw_tiles(canvas: &mut Canvas<'_>, world: &WorldMap, camera: &Camera) {
    let tile_px = camera.tile_px();
    let size = tile_px as i32;
    let span = camera.visible_tiles();

    for y in span.y_min..=span.y_max {
        for x in span.x_min..=span.x_max {
            let Some(tile) = world.get(x, y) else {
                continue;
            };
            let top_left = camera.world_to_screen_px(Vec2::new(x as f32, y as f32));
            let left = top_left.x.floor() as i32;
            let top = top_left.y.floor() as i32;

            let color = if (x + y).rem_euclid(2) == 0 {
                brighten(tile.color(), CHECKER_BRIGHTNESS)
            } else {
                tile.color()
            };
            // One extra pixel hides seams between fractional tile edges.
            canvas.fill_rect(left, top, size + 1, size + 1, color);

            match tile {
                Tile::Tree => {
                    let center = Vec2::new(top_left.x + tile_px / 2.0, top_left.y + tile_px / 2.0);
                    canvas.fill_circle(center, tile_px / 3.0, TREE_CANOPY_COLOR);
                }
                Tile::Water => canvas.fill_rect(
                    left + 4,
                    top + 8,
                    size - 20,
                    4,
                    with_alpha([255, 255, 255, 255], WATER_HIGHLIGHT_ALPHA),
                ),
                _ => {}
            }
        }
    }
}

fn draw_entity(canvas: &mut Canvas<'_>, camera: &Camera, entity: &Entity) {
    let tile_px = camera.tile_px();
    let center = camera.world_to_screen_px(entity.position);
    canvas.fill_ellipse(
        Vec2::new(center.x, center.y + tile_px / 2.0 - 4.0),
        tile_px / 3.0,
        tile_px / 6.0,
        with_alpha(SHADOW_COLOR, ENTITY_SHADOW_ALPHA),
    );
    canvas.fill_circle(center, tile_px * ENTITY_BODY_SCALE, entity.color);

    let scale = glyph_scale(tile_px);
    let mut glyph = [0; 4];
    draw_text_centered(
        canvas,
        center.x.round() as i32,
        center.y.round() as i32 - glyph_height(scale) / 2,
        entity.glyph.encode_utf8(&mut glyph),
        scale,
        ENTITY_GLYPH_COLOR,
    );
}

fn draw_player(canvas: &mut Canvas<'_>, camera: &Camera, player: Vec2) {
    let tile_px = camera.tile_px();
    let center = camera.world_to_screen_px(player);
    canvas.fill_ellipse(
        Vec2::new(center.x, center.y + tile_px / 2.0 - 2.0),
        tile_px / 3.0,
        tile_px / 6.0,
        with_alpha(SHADOW_COLOR, PLAYER_SHADOW_ALPHA),
    );
    canvas.fill_circle(
        Vec2::new(center.x, center.y - 4.0),
        tile_px / 3.0,
        PLAYER_BODY_COLOR,
    );

    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    canvas.fill_rect(cx - 6, cy - 8, 4, 4, PLAYER_EYE_COLOR);
    canvas.fill_rect(cx + 2, cy - 8, 4, 4, PLAYER_EYE_COLOR);
}

fn draw_hint(canvas: &mut Canvas<'_>, camera: &Camera, target: Vec2) {
    let center = camera.world_to_screen_px(target);
    let top = center.y - camera.tile_px() / 2.0;
    canvas.fill_triangle(
        Vec2::new(center.x, top - 10.0),
        Vec2::new(center.x - 5.0, top - 20.0),
        Vec2::new(center.x + 5.0, top - 20.0),
        HINT_COLOR,
    );
}

fn glyph_scale(tile_px: f32) -> i32 {
    ((tile_px * 0.8) / 12.0).round().max(1.0) as i32
}
