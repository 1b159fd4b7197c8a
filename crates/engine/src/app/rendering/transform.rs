use crate::app::Vec2;

/// Surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn size_in_tiles(self, tile_px: f32) -> Vec2 {
        Vec2::new(self.width as f32 / tile_px, self.height as f32 / tile_px)
    }
}

/// World-space top-left corner of the view for a player at `player`.
/// The view is never clamped to the map edges.
pub fn camera_offset(player: Vec2, viewport_tiles: Vec2) -> Vec2 {
    Vec2::new(
        player.x - viewport_tiles.x / 2.0,
        player.y - viewport_tiles.y / 2.0,
    )
}

/// Inclusive tile range that covers the view plus one tile of margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

/// Camera for one frame, derived from the player position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    offset: Vec2,
    viewport_tiles: Vec2,
    tile_px: f32,
}

impl Camera {
    pub fn follow(player: Vec2, viewport: Viewport, tile_px: f32) -> Self {
        let viewport_tiles = viewport.size_in_tiles(tile_px);
        Self {
            offset: camera_offset(player, viewport_tiles),
            viewport_tiles,
            tile_px,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn tile_px(&self) -> f32 {
        self.tile_px
    }

    pub fn world_to_screen_px(&self, world: Vec2) -> Vec2 {
        world_to_screen_px(world, self.offset, self.tile_px)
    }

    pub fn visible_tiles(&self) -> TileSpan {
        let x_min = self.offset.x.floor() as i32;
        let y_min = self.offset.y.floor() as i32;
        TileSpan {
            x_min,
            x_max: x_min + self.viewport_tiles.x.ceil() as i32 + 1,
            y_min,
            y_max: y_min + self.viewport_tiles.y.ceil() as i32 + 1,
        }
    }
}

pub fn world_to_screen_px(world: Vec2, camera_offset: Vec2, tile_px: f32) -> Vec2 {
    Vec2::new(
        (world.x - camera_offset.x) * tile_px,
        (world.y - camera_offset.y) * tile_px,
    )
}
