//! Deterministic per-participant snake colors.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    pub fn to_rgb(self) -> Rgb {
        let h = f32::from(self.hue % 360) / 60.0;
        let s = f32::from(self.saturation.min(100)) / 100.0;
        let l = f32::from(self.lightness.min(100)) / 100.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb(channel(r), channel(g), channel(b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeColor {
    pub body: Rgb,
    pub head: Rgb,
    pub border: Rgb,
}

pub const LOCAL_PLAYER_COLOR: SnakeColor = SnakeColor {
    body: Rgb::from_hex(0x4ade80),
    head: Rgb::from_hex(0x86efac),
    border: Rgb::from_hex(0x166534),
};

/// Rolling hash over the UTF-16 units of `"{id}:{name}"`, wrapping at 32 bits.
pub fn seed_hash(id: &str, name: &str) -> i32 {
    let seed = format!("{id}:{name}");
    seed.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// Body hue, saturation and lightness for a participant.
pub fn base_hsl(id: &str, name: &str) -> Hsl {
    let hash = seed_hash(id, name);
    let hue = (hash % 360).unsigned_abs() as u16;
    let saturation = 60 + ((hash >> 3) % 15).unsigned_abs() as u8;
    let lightness = 52 + ((hash >> 7) % 10).unsigned_abs() as u8;
    Hsl::new(hue, saturation, lightness)
}

pub fn player_color(id: &str, name: &str, is_me: bool) -> SnakeColor {
    if is_me {
        return LOCAL_PLAYER_COLOR;
    }

    let base = base_hsl(id, name);
    let head = Hsl {
        lightness: (base.lightness + 14).min(85),
        ..base
    };
    let border = Hsl {
        lightness: base.lightness.saturating_sub(26).max(25),
        ..base
    };

    SnakeColor {
        body: base.to_rgb(),
        head: head.to_rgb(),
        border: border.to_rgb(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(seed_hash("a", ""), 3065);
        assert_eq!(base_hsl("a", ""), Hsl::new(185, 68, 55));
    }

    #[test]
    fn hash_wraps_instead_of_overflowing() {
        let long_id = "x".repeat(64);
        let first = seed_hash(&long_id, "someone");
        assert_eq!(first, seed_hash(&long_id, "someone"));

        let hsl = base_hsl(&long_id, "someone");
        assert!(hsl.hue < 360);
        assert!((60..75).contains(&hsl.saturation));
        assert!((52..62).contains(&hsl.lightness));
    }

    #[test]
    fn color_depends_on_name_too() {
        assert_ne!(seed_hash("p1", "alice"), seed_hash("p1", "bob"));
        assert_eq!(player_color("p1", "alice", false), player_color("p1", "alice", false));
    }

    #[test]
    fn local_player_is_always_green() {
        assert_eq!(player_color("anything", "me", true), LOCAL_PLAYER_COLOR);
        assert_eq!(LOCAL_PLAYER_COLOR.body, Rgb(0x4a, 0xde, 0x80));
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(Hsl::new(0, 100, 50).to_rgb(), Rgb(255, 0, 0));
        assert_eq!(Hsl::new(120, 100, 50).to_rgb(), Rgb(0, 255, 0));
        assert_eq!(Hsl::new(240, 100, 50).to_rgb(), Rgb(0, 0, 255));
        assert_eq!(Hsl::new(0, 0, 100).to_rgb(), Rgb(255, 255, 255));
    }
}
