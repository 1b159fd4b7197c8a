use super::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Pause,
    Attack,
    ToggleOverlay,
    Quit,
}

const ACTION_COUNT: usize = 9;

/// Joystick vectors shorter than this are treated as noise.
pub const STICK_DEAD_ZONE: f32 = 0.15;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Interact => 4,
            InputAction::Pause => 5,
            InputAction::Attack => 6,
            InputAction::ToggleOverlay => 7,
            InputAction::Quit => 8,
        }
    }

    pub const fn is_movement(self) -> bool {
        matches!(
            self,
            InputAction::MoveUp
                | InputAction::MoveDown
                | InputAction::MoveLeft
                | InputAction::MoveRight
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputSource {
    #[default]
    Keyboard,
    Stick,
}

/// Merges held movement keys and the virtual stick into one movement
/// vector.
///
/// Arbitration: the most recent source wins. A movement-key edge
/// recomputes the held-key vector and takes ownership. A stick move inside
/// [`STICK_DEAD_ZONE`] is dropped without taking ownership. Releasing the
/// stick hands the vector back to whatever keys are still held.
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    held: ActionStates,
    keyboard_vector: Vec2,
    vector: Vec2,
    owner: InputSource,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector(&self) -> Vec2 {
        self.vector
    }

    pub fn owner(&self) -> InputSource {
        self.owner
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn set_movement_held(&mut self, action: InputAction, is_down: bool) {
        if !action.is_movement() {
            return;
        }
        self.held.set(action, is_down);
        self.keyboard_vector = keyboard_vector(&self.held);
        self.vector = self.keyboard_vector;
        self.owner = InputSource::Keyboard;
    }

    pub fn stick_moved(&mut self, stick: Vec2) {
        if !stick.x.is_finite() || !stick.y.is_finite() || stick.length() < STICK_DEAD_ZONE {
            return;
        }
        self.vector = clamp_to_unit(stick);
        self.owner = InputSource::Stick;
    }

    pub fn stick_stopped(&mut self) {
        self.vector = self.keyboard_vector;
        self.owner = InputSource::Keyboard;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Sums one unit per held direction and normalizes the result, so diagonal
/// movement is never faster than axis-aligned movement.
pub(crate) fn keyboard_vector(held: &ActionStates) -> Vec2 {
    let mut x = 0.0;
    let mut y = 0.0;
    if held.is_down(InputAction::MoveUp) {
        y -= 1.0;
    }
    if held.is_down(InputAction::MoveDown) {
        y += 1.0;
    }
    if held.is_down(InputAction::MoveLeft) {
        x -= 1.0;
    }
    if held.is_down(InputAction::MoveRight) {
        x += 1.0;
    }
    normalize_or_zero(Vec2::new(x, y))
}

pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length = v.length();
    if length == 0.0 || !length.is_finite() {
        return Vec2::ZERO;
    }
    Vec2::new(v.x / length, v.y / length)
}

fn clamp_to_unit(v: Vec2) -> Vec2 {
    let x = v.x.clamp(-1.0, 1.0);
    let y = v.y.clamp(-1.0, 1.0);
    let clamped = Vec2::new(x, y);
    if clamped.length() > 1.0 {
        normalize_or_zero(clamped)
    } else {
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn hold(aggregator: &mut InputAggregator, actions: &[InputAction]) {
        for action in actions {
            aggregator.set_movement_held(*action, true);
        }
    }

    #[test]
    fn single_direction_has_unit_length() {
        for action in [
            InputAction::MoveUp,
            InputAction::MoveDown,
            InputAction::MoveLeft,
            InputAction::MoveRight,
        ] {
            let mut aggregator = InputAggregator::new();
            hold(&mut aggregator, &[action]);
            assert!(approx(aggregator.vector().length(), 1.0), "{action:?}");
        }
    }

    #[test]
    fn up_right_normalizes_diagonal() {
        let mut aggregator = InputAggregator::new();
        hold(&mut aggregator, &[InputAction::MoveUp, InputAction::MoveRight]);
        let v = aggregator.vector();
        assert!(approx(v.x, std::f32::consts::FRAC_1_SQRT_2));
        assert!(approx(v.y, -std::f32::consts::FRAC_1_SQRT_2));
        assert!(approx(v.length(), 1.0));
    }

    #[test]
    fn opposing_keys_cancel_to_zero() {
        let mut aggregator = InputAggregator::new();
        hold(&mut aggregator, &[InputAction::MoveLeft, InputAction::MoveRight]);
        assert!(aggregator.vector().is_zero());
    }

    #[test]
    fn every_key_combination_stays_within_unit_length() {
        let actions = [
            InputAction::MoveUp,
            InputAction::MoveDown,
            InputAction::MoveLeft,
            InputAction::MoveRight,
        ];
        for mask in 0u8..16 {
            let mut aggregator = InputAggregator::new();
            for (bit, action) in actions.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    aggregator.set_movement_held(*action, true);
                }
            }
            assert!(aggregator.vector().length() <= 1.0 + EPSILON, "mask {mask}");
        }
    }

    #[test]
    fn releasing_key_recomputes_vector() {
        let mut aggregator = InputAggregator::new();
        hold(&mut aggregator, &[InputAction::MoveUp, InputAction::MoveRight]);
        aggregator.set_movement_held(InputAction::MoveUp, false);
        assert_eq!(aggregator.vector(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn non_movement_actions_are_ignored() {
        let mut aggregator = InputAggregator::new();
        aggregator.stick_moved(Vec2::new(0.5, 0.0));
        aggregator.set_movement_held(InputAction::Interact, true);
        assert_eq!(aggregator.owner(), InputSource::Stick);
        assert_eq!(aggregator.vector(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn most_recent_source_wins() {
        let mut aggregator = InputAggregator::new();
        hold(&mut aggregator, &[InputAction::MoveRight]);
        aggregator.stick_moved(Vec2::new(0.0, -0.8));
        assert_eq!(aggregator.owner(), InputSource::Stick);
        assert_eq!(aggregator.vector(), Vec2::new(0.0, -0.8));

        aggregator.set_movement_held(InputAction::MoveDown, true);
        assert_eq!(aggregator.owner(), InputSource::Keyboard);
        assert!(approx(aggregator.vector().length(), 1.0));
        assert!(aggregator.vector().y > 0.0);
    }

    #[test]
    fn stick_inside_dead_zone_does_not_take_ownership() {
        let mut aggregator = InputAggregator::new();
        hold(&mut aggregator, &[InputAction::MoveLeft]);
        aggregator.stick_moved(Vec2::new(0.05, 0.05));
        assert_eq!(aggregator.owner(), InputSource::Keyboard);
        assert_eq!(aggregator.vector(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn stick_stop_falls_back_to_held_keys() {
        let mut aggregator = InputAggregator::new();
        aggregator.stick_moved(Vec2::new(1.0, 0.0));
        aggregator.stick_stopped();
        assert!(aggregator.vector().is_zero());

        hold(&mut aggregator, &[InputAction::MoveDown]);
        aggregator.stick_moved(Vec2::new(1.0, 0.0));
        aggregator.stick_stopped();
        assert_eq!(aggregator.vector(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn stick_vector_is_clamped_to_unit_magnitude() {
        let mut aggregator = InputAggregator::new();
        aggregator.stick_moved(Vec2::new(3.0, 3.0));
        assert!(approx(aggregator.vector().length(), 1.0));
        aggregator.stick_moved(Vec2::new(f32::NAN, 0.5));
        assert!(approx(aggregator.vector().length(), 1.0));
    }

    #[test]
    fn normalize_guards_zero_vector() {
        assert_eq!(normalize_or_zero(Vec2::ZERO), Vec2::ZERO);
    }
}
