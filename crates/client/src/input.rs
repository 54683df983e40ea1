use coil::{ControllerInput, Direction};
use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Control(ControllerInput),
}

pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    let input = match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            ControllerInput::Direction(Direction::Up)
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            ControllerInput::Direction(Direction::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            ControllerInput::Direction(Direction::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            ControllerInput::Direction(Direction::Right)
        }
        KeyCode::Char(' ') => ControllerInput::ConnectNow,
        KeyCode::Char('o') | KeyCode::Char('O') => ControllerInput::RequestOnline,
        KeyCode::Char('c') | KeyCode::Char('C') => ControllerInput::StayOnline,
        KeyCode::Char('l') | KeyCode::Char('L') => ControllerInput::PlayLocal,
        KeyCode::Char('r') | KeyCode::Char('R') => ControllerInput::RestartLocal,
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        _ => return KeyAction::None,
    };

    KeyAction::Control(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_agree() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(KeyCode::Up, none), map_key(KeyCode::Char('w'), none));
        assert_eq!(map_key(KeyCode::Left, none), map_key(KeyCode::Char('a'), none));
        assert_eq!(
            map_key(KeyCode::Char('d'), none),
            KeyAction::Control(ControllerInput::Direction(Direction::Right))
        );
    }

    #[test]
    fn session_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(
            map_key(KeyCode::Char(' '), none),
            KeyAction::Control(ControllerInput::ConnectNow)
        );
        assert_eq!(map_key(KeyCode::Esc, none), KeyAction::Quit);
        assert_eq!(map_key(KeyCode::Char('c'), KeyModifiers::CONTROL), KeyAction::Quit);
        assert_eq!(map_key(KeyCode::Char('x'), none), KeyAction::None);
    }
}
