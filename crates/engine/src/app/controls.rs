use super::Vec2;

pub const STICK_BASE_RADIUS_PX: f32 = 50.0;
pub const STICK_KNOB_RADIUS_PX: f32 = 24.0;
const STICK_TRAVEL_PX: f32 = STICK_BASE_RADIUS_PX - STICK_KNOB_RADIUS_PX;
const STICK_AREA_RADIUS_PX: f32 = 64.0;
const CONTROLS_MARGIN_PX: f32 = 32.0;
const INTERACT_BUTTON_RADIUS_PX: f32 = 32.0;
const ATTACK_BUTTON_RADIUS_PX: f32 = 24.0;
const BUTTON_GAP_PX: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleControl {
    pub center: Vec2,
    pub radius: f32,
}

impl CircleControl {
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance(point) <= self.radius
    }
}

/// Screen placement of the touch controls, derived from the window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsLayout {
    pub stick: CircleControl,
    pub interact_button: CircleControl,
    pub attack_button: CircleControl,
}

impl ControlsLayout {
    pub fn for_window(width: u32, height: u32) -> Self {
        let width = width as f32;
        let height = height as f32;
        let stick = CircleControl {
            center: Vec2::new(
                CONTROLS_MARGIN_PX + STICK_AREA_RADIUS_PX,
                height - CONTROLS_MARGIN_PX - STICK_AREA_RADIUS_PX,
            ),
            radius: STICK_AREA_RADIUS_PX,
        };
        let interact_button = CircleControl {
            center: Vec2::new(
                width - CONTROLS_MARGIN_PX - ATTACK_BUTTON_RADIUS_PX * 2.0
                    - BUTTON_GAP_PX
                    - INTERACT_BUTTON_RADIUS_PX,
                height - CONTROLS_MARGIN_PX - INTERACT_BUTTON_RADIUS_PX,
            ),
            radius: INTERACT_BUTTON_RADIUS_PX,
        };
        let attack_button = CircleControl {
            center: Vec2::new(
                width - CONTROLS_MARGIN_PX - ATTACK_BUTTON_RADIUS_PX,
                height - CONTROLS_MARGIN_PX - ATTACK_BUTTON_RADIUS_PX,
            ),
            radius: ATTACK_BUTTON_RADIUS_PX,
        };
        Self {
            stick,
            interact_button,
            attack_button,
        }
    }
}

/// Analog stick driven by a pointer. The knob travels at most
/// `STICK_BASE_RADIUS_PX - STICK_KNOB_RADIUS_PX` pixels from the centre and
/// the reported vector is that offset divided by the travel, so its
/// magnitude never exceeds 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualStick {
    center: Vec2,
    knob_offset_px: Vec2,
    active: bool,
}

impl VirtualStick {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn knob_offset_px(&self) -> Vec2 {
        self.knob_offset_px
    }

    pub fn begin(&mut self, center: Vec2, pointer: Vec2) -> Vec2 {
        self.center = center;
        self.active = true;
        self.track(pointer)
    }

    pub fn update(&mut self, pointer: Vec2) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        Some(self.track(pointer))
    }

    pub fn end(&mut self) {
        self.active = false;
        self.knob_offset_px = Vec2::ZERO;
    }

    fn track(&mut self, pointer: Vec2) -> Vec2 {
        let mut dx = pointer.x - self.center.x;
        let mut dy = pointer.y - self.center.y;
        let distance = Vec2::new(dx, dy).length();
        if distance > STICK_TRAVEL_PX {
            let angle = dy.atan2(dx);
            dx = angle.cos() * STICK_TRAVEL_PX;
            dy = angle.sin() * STICK_TRAVEL_PX;
        }
        self.knob_offset_px = Vec2::new(dx, dy);
        Vec2::new(dx / STICK_TRAVEL_PX, dy / STICK_TRAVEL_PX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    None,
    StickMoved(Vec2),
    StickReleased,
    InteractPressed,
    AttackPressed,
}

/// Routes raw pointer gestures to the stick or to the on-screen buttons.
/// Only one pointer at a time owns the stick.
#[derive(Debug, Clone, Default)]
pub struct PointerRouter {
    stick: VirtualStick,
    stick_owner: Option<PointerId>,
}

impl PointerRouter {
    pub fn stick(&self) -> &VirtualStick {
        &self.stick
    }

    pub fn press(
        &mut self,
        id: PointerId,
        position: Vec2,
        layout: &ControlsLayout,
    ) -> PointerOutcome {
        if self.stick_owner.is_none() && layout.stick.contains(position) {
            self.stick_owner = Some(id);
            return PointerOutcome::StickMoved(self.stick.begin(layout.stick.center, position));
        }
        if layout.interact_button.contains(position) {
            return PointerOutcome::InteractPressed;
        }
        if layout.attack_button.contains(position) {
            return PointerOutcome::AttackPressed;
        }
        PointerOutcome::None
    }

    pub fn moved(&mut self, id: PointerId, position: Vec2) -> PointerOutcome {
        if self.stick_owner != Some(id) {
            return PointerOutcome::None;
        }
        match self.stick.update(position) {
            Some(vector) => PointerOutcome::StickMoved(vector),
            None => PointerOutcome::None,
        }
    }

    pub fn released(&mut self, id: PointerId) -> PointerOutcome {
        if self.stick_owner != Some(id) {
            return PointerOutcome::None;
        }
        self.stick_owner = None;
        self.stick.end();
        PointerOutcome::StickReleased
    }

    pub fn cancel(&mut self) -> PointerOutcome {
        if self.stick_owner.take().is_none() {
            return PointerOutcome::None;
        }
        self.stick.end();
        PointerOutcome::StickReleased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ControlsLayout {
        ControlsLayout::for_window(800, 600)
    }

    #[test]
    fn stick_output_is_normalized_by_travel() {
        let mut stick = VirtualStick::default();
        let center = Vec2::new(100.0, 100.0);
        let v = stick.begin(center, Vec2::new(113.0, 100.0));
        assert!((v.x - 0.5).abs() < 1e-5);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn stick_clamps_far_pointer_to_unit_circle() {
        let mut stick = VirtualStick::default();
        let v = stick.begin(Vec2::new(0.0, 0.0), Vec2::new(300.0, 400.0));
        assert!((v.length() - 1.0).abs() < 1e-4);
        assert!((v.x - 0.6).abs() < 1e-4);
        assert!((v.y - 0.8).abs() < 1e-4);
        assert!((stick.knob_offset_px().length() - STICK_TRAVEL_PX).abs() < 1e-3);
    }

    #[test]
    fn inactive_stick_ignores_updates() {
        let mut stick = VirtualStick::default();
        assert!(stick.update(Vec2::new(5.0, 5.0)).is_none());
        stick.begin(Vec2::ZERO, Vec2::new(5.0, 0.0));
        stick.end();
        assert!(!stick.is_active());
        assert_eq!(stick.knob_offset_px(), Vec2::ZERO);
    }

    #[test]
    fn press_inside_stick_area_claims_stick() {
        let layout = layout();
        let mut router = PointerRouter::default();
        let outcome = router.press(PointerId::Mouse, layout.stick.center, &layout);
        assert_eq!(outcome, PointerOutcome::StickMoved(Vec2::ZERO));
        assert!(router.stick().is_active());

        let drag = Vec2::new(layout.stick.center.x, layout.stick.center.y - 100.0);
        let PointerOutcome::StickMoved(vector) = router.moved(PointerId::Mouse, drag) else {
            panic!("drag should move the stick");
        };
        assert!(vector.x.abs() < 1e-4);
        assert!((vector.y + 1.0).abs() < 1e-4);
        assert_eq!(router.released(PointerId::Mouse), PointerOutcome::StickReleased);
        assert!(!router.stick().is_active());
    }

    #[test]
    fn second_pointer_cannot_steal_stick() {
        let layout = layout();
        let mut router = PointerRouter::default();
        router.press(PointerId::Touch(1), layout.stick.center, &layout);
        assert_eq!(
            router.press(PointerId::Touch(2), layout.stick.center, &layout),
            PointerOutcome::None
        );
        assert_eq!(
            router.moved(PointerId::Touch(2), Vec2::ZERO),
            PointerOutcome::None
        );
        assert_eq!(router.released(PointerId::Touch(2)), PointerOutcome::None);
        assert!(router.stick().is_active());
    }

    #[test]
    fn buttons_are_hit_tested() {
        let layout = layout();
        let mut router = PointerRouter::default();
        assert_eq!(
            router.press(PointerId::Mouse, layout.interact_button.center, &layout),
            PointerOutcome::InteractPressed
        );
        assert_eq!(
            router.press(PointerId::Mouse, layout.attack_button.center, &layout),
            PointerOutcome::AttackPressed
        );
        assert_eq!(
            router.press(PointerId::Mouse, Vec2::new(400.0, 100.0), &layout),
            PointerOutcome::None
        );
    }

    #[test]
    fn controls_do_not_overlap() {
        let layout = layout();
        let gap = layout
            .interact_button
            .center
            .distance(layout.attack_button.center);
        assert!(gap > layout.interact_button.radius + layout.attack_button.radius);
        assert!(!layout.stick.contains(layout.interact_button.center));
    }
}
