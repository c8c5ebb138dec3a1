//! Host controls to board input ports.
//!
//! Both ports are active-low: a released control reads back as a set bit, so
//! an idle cabinet reports `0xFF` on IN0 and IN1.

/// Analog stick travel beyond which a direction is considered held.
pub const ANALOG_THRESHOLD: i8 = 20;

/// Controls held by one player, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    /// Bitmask of `PlayerInput::UP` and friends.
    pub buttons: u8,
    /// Stick position; positive x is right, positive y is up.
    pub analog: (i8, i8),
}

impl PlayerInput {
    pub const UP: u8 = 1 << 0;
    pub const DOWN: u8 = 1 << 1;
    pub const LEFT: u8 = 1 << 2;
    pub const RIGHT: u8 = 1 << 3;
    pub const COIN: u8 = 1 << 4;
    pub const START: u8 = 1 << 5;

    pub fn with_buttons(buttons: u8) -> Self {
        Self {
            buttons,
            analog: (0, 0),
        }
    }

    pub fn held(&self, mask: u8) -> bool {
        self.buttons & mask != 0
    }

    /// Button mask with the stick folded in as digital directions.
    pub fn effective_buttons(&self) -> u8 {
        let (x, y) = self.analog;
        let mut buttons = self.buttons;
        if x < -ANALOG_THRESHOLD {
            buttons |= Self::LEFT;
        } else if x > ANALOG_THRESHOLD {
            buttons |= Self::RIGHT;
        }
        if y < -ANALOG_THRESHOLD {
            buttons |= Self::DOWN;
        } else if y > ANALOG_THRESHOLD {
            buttons |= Self::UP;
        }
        buttons
    }
}

/// Anything that can report the current controls of a player.
pub trait InputSource {
    /// `player` is 0 or 1.
    fn poll(&mut self, player: usize) -> PlayerInput;
}

impl InputSource for [PlayerInput; 2] {
    fn poll(&mut self, player: usize) -> PlayerInput {
        self.get(player).copied().unwrap_or_default()
    }
}

/// Raw values of the two joystick/button ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPorts {
    pub in0: u8,
    pub in1: u8,
}

impl Default for InputPorts {
    fn default() -> Self {
        Self::IDLE
    }
}

impl InputPorts {
    pub const IDLE: InputPorts = InputPorts {
        in0: 0xFF,
        in1: 0xFF,
    };

    pub fn from_players(players: &[PlayerInput; 2]) -> Self {
        let p1 = players[0].effective_buttons();
        let p2 = players[1].effective_buttons();
        let mut ports = Self::IDLE;

        press(&mut ports.in0, 0, p1 & PlayerInput::UP != 0);
        press(&mut ports.in0, 1, p1 & PlayerInput::LEFT != 0);
        press(&mut ports.in0, 2, p1 & PlayerInput::RIGHT != 0);
        press(&mut ports.in0, 3, p1 & PlayerInput::DOWN != 0);
        press(&mut ports.in0, 5, (p1 | p2) & PlayerInput::COIN != 0);

        press(&mut ports.in1, 0, p2 & PlayerInput::UP != 0);
        press(&mut ports.in1, 1, p2 & PlayerInput::LEFT != 0);
        press(&mut ports.in1, 2, p2 & PlayerInput::RIGHT != 0);
        press(&mut ports.in1, 3, p2 & PlayerInput::DOWN != 0);
        press(&mut ports.in1, 5, p1 & PlayerInput::START != 0);
        press(&mut ports.in1, 6, p2 & PlayerInput::START != 0);

        ports
    }

    pub fn poll(source: &mut dyn InputSource) -> Self {
        Self::from_players(&[source.poll(0), source.poll(1)])
    }
}

#[inline]
fn press(port: &mut u8, bit: u8, pressed: bool) {
    if pressed {
        *port &= !(1 << bit);
    }
}
