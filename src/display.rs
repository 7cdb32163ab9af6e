use core::{fmt, str::FromStr};

use serde::Deserialize;

const COLOR_MASK: u8 = 0x0F;
const EFFECT_MASK: u8 = 0xF0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Color {
    #[default]
    Off = 0x00,
    Red = 0x01,
    Green = 0x02,
    Yellow = 0x03,
    Blue = 0x04,
    Purple = 0x05,
    Cyan = 0x06,
    White = 0x07,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Off,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Purple,
        Color::Cyan,
        Color::White,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }

    const fn from_nibble(raw: u8) -> Self {
        match raw {
            0x01 => Self::Red,
            0x02 => Self::Green,
            0x03 => Self::Yellow,
            0x04 => Self::Blue,
            0x05 => Self::Purple,
            0x06 => Self::Cyan,
            0x07 => Self::White,
            _ => Self::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Effect {
    #[default]
    None = 0x00,
    Dim = 0x10,
    FastPulse = 0x20,
    SlowPulse = 0x30,
}

impl Effect {
    pub const ALL: [Effect; 4] = [
        Effect::None,
        Effect::Dim,
        Effect::FastPulse,
        Effect::SlowPulse,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Dim => "dim",
            Self::FastPulse => "fast-pulse",
            Self::SlowPulse => "slow-pulse",
        }
    }

    const fn from_nibble(raw: u8) -> Self {
        match raw & EFFECT_MASK {
            0x10 => Self::Dim,
            0x20 => Self::FastPulse,
            0x30 => Self::SlowPulse,
            _ => Self::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{name}`")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl FromStr for Color {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.label() == wanted)
            .ok_or(UnknownName {
                kind: "color",
                name: s.to_string(),
            })
    }
}

impl FromStr for Effect {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|effect| effect.label() == wanted)
            .ok_or(UnknownName {
                kind: "effect",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the button LED shows: colour in the low nibble, effect in the high one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub color: Color,
    pub effect: Effect,
}

impl DisplayState {
    pub const OFF: Self = Self {
        color: Color::Off,
        effect: Effect::None,
    };

    pub const fn new(color: Color, effect: Effect) -> Self {
        Self { color, effect }
    }

    pub const fn to_byte(self) -> u8 {
        (self.color as u8 & COLOR_MASK) | (self.effect as u8 & EFFECT_MASK)
    }

    pub const fn from_byte(raw: u8) -> Self {
        Self {
            color: Color::from_nibble(raw & COLOR_MASK),
            effect: Effect::from_nibble(raw),
        }
    }

    pub const fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub const fn with_effect(self, effect: Effect) -> Self {
        Self { effect, ..self }
    }
}
