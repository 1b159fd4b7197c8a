use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn distance(self, other: Vec2) -> f32 {
        Vec2::new(other.x - self.x, other.y - self.y).length()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Grass,
    Water,
    Wall,
    Floor,
    Tree,
    Sand,
}

const TILE_GRASS_COLOR: [u8; 4] = [74, 222, 128, 255];
const TILE_WATER_COLOR: [u8; 4] = [96, 165, 250, 255];
const TILE_WALL_COLOR: [u8; 4] = [100, 116, 139, 255];
const TILE_FLOOR_COLOR: [u8; 4] = [214, 211, 209, 255];
const TILE_TREE_COLOR: [u8; 4] = [22, 101, 52, 255];
const TILE_SAND_COLOR: [u8; 4] = [253, 224, 71, 255];

impl Tile {
    pub const fn is_solid(self) -> bool {
        matches!(self, Tile::Water | Tile::Wall | Tile::Tree)
    }

    pub const fn color(self) -> [u8; 4] {
        match self {
            Tile::Grass => TILE_GRASS_COLOR,
            Tile::Water => TILE_WATER_COLOR,
            Tile::Wall => TILE_WALL_COLOR,
            Tile::Floor => TILE_FLOOR_COLOR,
            Tile::Tree => TILE_TREE_COLOR,
            Tile::Sand => TILE_SAND_COLOR,
        }
    }
}

/// Tile value reported for coordinates outside the map. Out-of-bounds
/// lookups fail closed as solid.
pub const OUT_OF_BOUNDS_TILE: Tile = Tile::Wall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Npc,
    Item,
    Hero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub glyph: char,
    pub color: [u8; 4],
    pub name: String,
    pub interactable: bool,
    pub dialogue_context: Option<String>,
}

/// Static grid of tiles plus the entities placed on it.
///
/// Tile `(x, y)` covers the half-open square `[x, x + 1) x [y, y + 1)` in
/// tile units, with `y` growing downward. Tiles are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldMapError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("entity {name} at ({x}, {y}) lies outside the {width}x{height} map")]
    EntityOutOfBounds {
        name: String,
        x: f32,
        y: f32,
        width: u32,
        height: u32,
    },
}

impl WorldMap {
    pub fn new(
        width: u32,
        height: u32,
        tiles: Vec<Tile>,
        entities: Vec<Entity>,
    ) -> Result<Self, WorldMapError> {
        if width == 0 || height == 0 {
            return Err(WorldMapError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(WorldMapError::TileCountMismatch { expected, actual });
        }
        for entity in &entities {
            let Vec2 { x, y } = entity.position;
            let inside = x >= 0.0 && y >= 0.0 && x < width as f32 && y < height as f32;
            if !inside {
                return Err(WorldMapError::EntityOutOfBounds {
                    name: entity.name.clone(),
                    x,
                    y,
                    width,
                    height,
                });
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
            entities,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.tiles.get(index).copied()
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        self.get(x, y).unwrap_or(OUT_OF_BOUNDS_TILE)
    }

    /// Whether the tile containing the continuous point `(x, y)` blocks
    /// movement. Non-finite coordinates are treated as blocked.
    pub fn blocks_point(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return true;
        }
        self.tile_at(x.floor() as i32, y.floor() as i32).is_solid()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }
}
