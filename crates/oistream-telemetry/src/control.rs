/// First byte of a joystick control message.
pub const CONTROL_PREFIX: u8 = b'$';

/// Second byte of a joystick control message.
pub const JOYSTICK_COMMAND: u8 = 5;

/// Joystick deflection decoded from a control message.
///
/// Axis bytes are centred on 100, so `100` maps to `0.0`, `0` to `1.0`
/// and `200` to `-1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickPosition {
    /// Horizontal axis, 0.0 when centred.
    pub x: f32,
    /// Vertical axis, 0.0 when centred.
    pub y: f32,
}

impl JoystickPosition {
    /// Decode one axis byte.
    pub fn axis(raw: u8) -> f32 {
        -(i32::from(raw) - 100) as f32 / 100.0
    }
}

/// Decode a `'$', 5, x, y` control payload.
///
/// Returns `None` for any other command or a payload shorter than four bytes.
pub fn parse_control(payload: &[u8]) -> Option<JoystickPosition> {
    match payload {
        [CONTROL_PREFIX, JOYSTICK_COMMAND, x, y, ..] => Some(JoystickPosition {
            x: JoystickPosition::axis(*x),
            y: JoystickPosition::axis(*y),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_is_zero() {
        let pos = parse_control(b"$\x05dd").unwrap();
        assert_eq!(pos, JoystickPosition { x: 0.0, y: 0.0 });
    }

    #[test]
    fn axes_are_inverted() {
        let pos = parse_control(&[b'$', 5, 0, 200]).unwrap();
        assert_eq!(pos.x, 1.0);
        assert_eq!(pos.y, -1.0);

        let pos = parse_control(&[b'$', 5, 150, 75]).unwrap();
        assert_eq!(pos.x, -0.5);
        assert_eq!(pos.y, 0.25);
    }

    #[test]
    fn ignores_other_messages() {
        assert!(parse_control(b"").is_none());
        assert!(parse_control(&[b'$', 5, 100]).is_none());
        assert!(parse_control(&[b'$', 6, 100, 100]).is_none());
        assert!(parse_control(b"TS;1;2").is_none());
    }
}
