use super::{Entity, Vec2};

/// Entities strictly closer than this (in tiles) can be interacted with.
pub const INTERACTION_RADIUS: f32 = 1.5;

#[derive(Debug, Clone, Copy)]
pub struct ClosestInteractable<'a> {
    pub entity: &'a Entity,
    pub distance: f32,
}

impl ClosestInteractable<'_> {
    pub fn in_range(&self) -> bool {
        self.distance < INTERACTION_RADIUS
    }
}

/// Nearest interactable entity to `player`, at any distance.
///
/// Ties keep the first entity in list order, so the result depends on the
/// order entities were authored in.
pub fn closest_interactable(player: Vec2, entities: &[Entity]) -> Option<ClosestInteractable<'_>> {
    let mut best: Option<ClosestInteractable<'_>> = None;
    for entity in entities.iter().filter(|entity| entity.interactable) {
        let distance = player.distance(entity.position);
        match best {
            Some(current) if current.distance <= distance => {}
            _ => best = Some(ClosestInteractable { entity, distance }),
        }
    }
    best
}

/// The interaction target, if one lies inside [`INTERACTION_RADIUS`].
pub fn interaction_target(player: Vec2, entities: &[Entity]) -> Option<&Entity> {
    closest_interactable(player, entities)
        .filter(ClosestInteractable::in_range)
        .map(|closest| closest.entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{EntityId, EntityKind};

    fn entity(id: u64, x: f32, y: f32, interactable: bool) -> Entity {
        Entity {
            id: EntityId(id),
            kind: EntityKind::Npc,
            position: Vec2::new(x, y),
            glyph: 'N',
            color: [255, 255, 255, 255],
            name: format!("npc_{id}"),
            interactable,
            dialogue_context: None,
        }
    }

    #[test]
    fn empty_list_yields_none() {
        assert!(closest_interactable(Vec2::ZERO, &[]).is_none());
    }

    #[test]
    fn picks_minimum_euclidean_distance() {
        let entities = vec![
            entity(1, 5.0, 5.0, true),
            entity(2, 1.0, 2.0, true),
            entity(3, 3.0, 0.0, true),
        ];
        let closest = closest_interactable(Vec2::new(0.0, 0.0), &entities).expect("closest");
        assert_eq!(closest.entity.id, EntityId(2));
        assert!((closest.distance - 5.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn skips_non_interactable_entities() {
        let entities = vec![entity(1, 0.5, 0.0, false), entity(2, 4.0, 0.0, true)];
        let closest = closest_interactable(Vec2::ZERO, &entities).expect("closest");
        assert_eq!(closest.entity.id, EntityId(2));
        assert!(!closest.in_range());
    }

    #[test]
    fn only_non_interactables_yields_none() {
        let entities = vec![entity(1, 0.5, 0.0, false)];
        assert!(closest_interactable(Vec2::ZERO, &entities).is_none());
    }

    #[test]
    fn ties_resolve_to_first_in_list_order() {
        let entities = vec![
            entity(7, 1.0, 0.0, true),
            entity(3, -1.0, 0.0, true),
            entity(5, 0.0, 1.0, true),
        ];
        let closest = closest_interactable(Vec2::ZERO, &entities).expect("closest");
        assert_eq!(closest.entity.id, EntityId(7));
    }

    #[test]
    fn range_threshold_is_strict() {
        let entities = vec![entity(1, 1.5, 0.0, true)];
        assert!(interaction_target(Vec2::ZERO, &entities).is_none());
        assert!(interaction_target(Vec2::new(0.01, 0.0), &entities).is_some());
    }
}
