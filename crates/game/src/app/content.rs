use engine::{Entity, EntityId, EntityKind, Tile, Vec2, WorldMap, WorldMapError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub(crate) const MAP_WIDTH: u32 = 20;
pub(crate) const MAP_HEIGHT: u32 = 20;
pub(crate) const PLAYER_START: Vec2 = Vec2 { x: 3.0, y: 3.0 };

const ELDER_ID: EntityId = EntityId(1);
const GUARD_ID: EntityId = EntityId(2);
const CHEST_ID: EntityId = EntityId(3);

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WorldGenConfig {
    /// Chance that a grass tile left over after the fixed layout turns into a tree.
    pub(crate) tree_chance: f64,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self { tree_chance: 0.1 }
    }
}

pub(crate) fn generate_world(seed: u64) -> Result<WorldMap, WorldMapError> {
    generate_world_with(seed, WorldGenConfig::default())
}

pub(crate) fn generate_world_with(
    seed: u64,
    config: WorldGenConfig,
) -> Result<WorldMap, WorldMapError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let tree_chance = config.tree_chance.clamp(0.0, 1.0);
    let entities = seed_entities();
    let reserved = reserved_tiles(&entities);
    let mut tiles = Vec::with_capacity(MAP_WIDTH as usize * MAP_HEIGHT as usize);

    for y in 0..MAP_HEIGHT {
        for x in 0..MAP_WIDTH {
            let tile = match layout_tile(x, y) {
                Tile::Grass if !reserved.contains(&(x, y)) && rng.gen_bool(tree_chance) => {
                    Tile::Tree
                }
                tile => tile,
            };
            tiles.push(tile);
        }
    }

    WorldMap::new(MAP_WIDTH, MAP_HEIGHT, tiles, entities)
}

/// Tiles the random trees must leave open: the player start and every
/// entity's tile.
fn reserved_tiles(entities: &[Entity]) -> Vec<(u32, u32)> {
    std::iter::once(PLAYER_START)
        .chain(entities.iter().map(|entity| entity.position))
        .map(|position| (position.x.floor() as u32, position.y.floor() as u32))
        .collect()
}

/// Hand-placed terrain before the random tree pass. Later rules win.
fn layout_tile(x: u32, y: u32) -> Tile {
    let border = x == 0 || y == 0 || x == MAP_WIDTH - 1 || y == MAP_HEIGHT - 1;
    let river_column = (6..=8).contains(&x);
    let house = (13..=16).contains(&x) && (13..=16).contains(&y);
    let interior = (14..=15).contains(&x) && (14..=15).contains(&y);

    if interior || (x, y) == (14, 12) {
        Tile::Floor
    } else if house {
        Tile::Wall
    } else if river_column && y == 10 {
        Tile::Floor
    } else if river_column && (3..=17).contains(&y) {
        Tile::Water
    } else if border {
        Tile::Tree
    } else {
        Tile::Grass
    }
}

fn seed_entities() -> Vec<Entity> {
    vec![
        Entity {
            id: ELDER_ID,
            kind: EntityKind::Npc,
            position: Vec2::new(14.5, 14.5),
            glyph: 'E',
            color: [168, 85, 247, 255],
            name: "Elder Oric".to_string(),
            interactable: true,
            dialogue_context: Some(
                "You are Elder Oric, the wise keeper of the village. You are worried about \
                 the dark clouds gathering over the Whispering Woods. You need the player to \
                 find the Crystal of Dawn."
                    .to_string(),
            ),
        },
        Entity {
            id: GUARD_ID,
            kind: EntityKind::Npc,
            position: Vec2::new(9.5, 10.5),
            glyph: 'G',
            color: [148, 163, 184, 255],
            name: "Guard".to_string(),
            interactable: true,
            dialogue_context: Some(
                "You are a tired guard watching the bridge. You have heard rumors of slimes \
                 in the north."
                    .to_string(),
            ),
        },
        Entity {
            id: CHEST_ID,
            kind: EntityKind::Item,
            position: Vec2::new(2.5, 2.5),
            glyph: 'C',
            color: [245, 158, 11, 255],
            name: "Old Chest".to_string(),
            interactable: true,
            dialogue_context: Some(
                "You are an ancient chest describing your contents: a rusty sword and a \
                 healing potion."
                    .to_string(),
            ),
        },
    ]
}
