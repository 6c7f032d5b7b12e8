#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Primary,
    Quit,
}

const ACTION_COUNT: usize = 6;

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

    /// Resultant of the four movement actions, before normalisation.
    /// Screen convention: +y points down.
    pub(crate) fn raw_move_axis(&self) -> (f32, f32) {
        let mut x = 0.0;
        let mut y = 0.0;
        if self.is_down(InputAction::MoveUp) {
            y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            y += 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            x += 1.0;
        }
        (x, y)
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Primary => 4,
            InputAction::Quit => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::MoveRight, true);
        states.set(InputAction::MoveUp, true);

        assert_eq!(states.raw_move_axis(), (0.0, -1.0));
    }

    #[test]
    fn release_clears_action() {
        let mut states = ActionStates::default();
        states.set(InputAction::Primary, true);
        states.set(InputAction::Primary, false);

        assert!(!states.is_down(InputAction::Primary));
    }
}
