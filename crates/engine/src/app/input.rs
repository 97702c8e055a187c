use std::cell::Cell;
use std::rc::Rc;

use super::object::{GameObject, InputController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Fire,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
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
            InputAction::Fire => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Latest key state, written by the window runner before each frame and read
/// by controllers during it. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct InputHandle {
    states: Rc<Cell<ActionStates>>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> ActionStates {
        self.states.get()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.states.get().is_down(action)
    }

    pub fn publish(&self, states: ActionStates) {
        self.states.set(states);
    }

    pub fn set(&self, action: InputAction, is_down: bool) {
        let mut states = self.states.get();
        states.set(action, is_down);
        self.states.set(states);
    }
}

/// Moves its object by `speed` per frame along the held direction keys and
/// records the dominant action as the object's command.
#[derive(Debug, Clone)]
pub struct KeyboardController {
    input: InputHandle,
    speed: f32,
}

impl KeyboardController {
    pub fn new(input: InputHandle, speed: f32) -> Self {
        Self { input, speed }
    }
}

impl InputController for KeyboardController {
    fn update(&mut self, object: &mut GameObject) {
        let states = self.input.states();
        let mut command = "";
        if states.is_down(InputAction::MoveLeft) {
            object.x -= self.speed;
            command = "left";
        }
        if states.is_down(InputAction::MoveRight) {
            object.x += self.speed;
            command = "right";
        }
        if states.is_down(InputAction::MoveUp) {
            object.y -= self.speed;
            command = "up";
        }
        if states.is_down(InputAction::MoveDown) {
            object.y += self.speed;
            command = "down";
        }
        if states.is_down(InputAction::Fire) {
            command = "fire";
        }
        if object.command != command {
            object.command = command.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_clones_share_state() {
        let input = InputHandle::new();
        let reader = input.clone();

        input.set(InputAction::Fire, true);
        assert!(reader.is_down(InputAction::Fire));

        input.publish(ActionStates::default());
        assert!(!reader.is_down(InputAction::Fire));
    }

    #[test]
    fn idle_keyboard_clears_command_and_keeps_position() {
        let input = InputHandle::new();
        let mut controller = KeyboardController::new(input, 3.0);
        let mut object = GameObject::new(10.0, 10.0, 4.0, 4.0);
        object.command = "left".to_string();

        controller.update(&mut object);

        assert_eq!((object.x, object.y), (10.0, 10.0));
        assert_eq!(object.command, "");
    }

    #[test]
    fn held_directions_move_object_and_set_command() {
        let input = InputHandle::new();
        let mut controller = KeyboardController::new(input.clone(), 3.0);
        let mut object = GameObject::new(10.0, 10.0, 4.0, 4.0);

        input.set(InputAction::MoveRight, true);
        controller.update(&mut object);
        assert_eq!(object.x, 13.0);
        assert_eq!(object.command, "right");

        input.set(InputAction::MoveUp, true);
        controller.update(&mut object);
        assert_eq!((object.x, object.y), (16.0, 7.0));
        assert_eq!(object.command, "up");
    }

    #[test]
    fn fire_takes_command_priority_without_moving() {
        let input = InputHandle::new();
        let mut controller = KeyboardController::new(input.clone(), 3.0);
        let mut object = GameObject::new(0.0, 0.0, 4.0, 4.0);

        input.set(InputAction::Fire, true);
        controller.update(&mut object);

        assert_eq!((object.x, object.y), (0.0, 0.0));
        assert_eq!(object.command, "fire");
    }
}
