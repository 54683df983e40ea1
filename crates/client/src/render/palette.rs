use coil::net::{LOCAL_PLAYER_COLOR, Rgb, SnakeColor};
use ratatui::style::Color;

pub const GRID: Color = Color::Rgb(48, 48, 48);
pub const FOOD: Color = Color::Rgb(239, 68, 68);
pub const FOOD_LEAF: Color = Color::Rgb(34, 197, 94);
pub const BOMB: Color = Color::Rgb(120, 113, 108);
pub const STAR: Color = Color::Rgb(250, 204, 21);
pub const EYE_BLINK: Color = Color::Rgb(0xff, 0x6b, 0x6b);

pub const LOCAL_MODE: Color = Color::Rgb(100, 255, 100);
pub const ONLINE_MODE: Color = Color::Rgb(100, 150, 255);
pub const COUNTDOWN: Color = Color::Rgb(255, 200, 0);

pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn local_snake() -> SnakeColor {
    LOCAL_PLAYER_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_channels_in_order() {
        assert_eq!(color(Rgb(1, 2, 3)), Color::Rgb(1, 2, 3));
        assert_eq!(color(local_snake().body), Color::Rgb(0x4a, 0xde, 0x80));
    }
}
