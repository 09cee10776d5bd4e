#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Unpressed,
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Forward,
    Backward,
    Left,
    Right,
    Restart,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Forward,
        Control::Backward,
        Control::Left,
        Control::Right,
        Control::Restart,
    ];

    /// Map a `KeyboardEvent.key` value to a control.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" | "W" | "ArrowUp" => Some(Control::Forward),
            "s" | "S" | "ArrowDown" => Some(Control::Backward),
            "a" | "A" | "ArrowLeft" => Some(Control::Left),
            "d" | "D" | "ArrowRight" => Some(Control::Right),
            "r" | "R" => Some(Control::Restart),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "forward" => Some(Control::Forward),
            "backward" => Some(Control::Backward),
            "left" => Some(Control::Left),
            "right" => Some(Control::Right),
            "restart" => Some(Control::Restart),
            _ => None,
        }
    }
}

/// Key state for one frame, filled by the platform layer and passed into the
/// game update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    keys: [KeyState; 5],
}

impl InputState {
    pub fn press(&mut self, control: Control) {
        self.keys[control as usize] = KeyState::Pressed;
    }

    pub fn release(&mut self, control: Control) {
        self.keys[control as usize] = KeyState::Released;
    }

    pub fn state(&self, control: Control) -> KeyState {
        self.keys[control as usize]
    }

    pub fn is_pressed(&self, control: Control) -> bool {
        self.state(control) == KeyState::Pressed
    }

    pub fn is_released(&self, control: Control) -> bool {
        self.state(control) == KeyState::Released
    }

    /// End of frame: released keys go back to unpressed.
    pub fn clear(&mut self) {
        for key in &mut self.keys {
            if *key == KeyState::Released {
                *key = KeyState::Unpressed;
            }
        }
    }
}
