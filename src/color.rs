//! Color values and their textual encodings.
//!
//! Colors are stored at the canonical 16-bit-per-channel depth. Theme files and
//! backends exchange them in three forms:
//!
//! * low depth hex, `#rrggbb`, where a byte `b` expands to `b * 256 + b`;
//! * high depth hex, `#rrrrggggbbbb`, channels taken verbatim;
//! * decimal triplets, `r,g,b`, on the low depth scale.
//!
//! Every down-conversion truncates (`channel / 256`).

use std::fmt;

use thiserror::Error;

/// Largest value a canonical channel can hold.
pub const CHANNEL_MAX: i64 = 65535;

/// Errors raised while decoding color text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid low depth hex color '{0}'")]
    InvalidLow(String),

    #[error("invalid high depth hex color '{0}'")]
    InvalidHigh(String),

    #[error("invalid decimal color '{0}'")]
    InvalidDecimal(String),

    #[error("expected 3 color channels, found {0}")]
    ChannelCount(usize),

    #[error("color channel {0} is outside 0..=65535")]
    ChannelRange(i64),
}

/// An RGB color at 16 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color([u16; 3]);

impl Color {
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self([red, green, blue])
    }

    /// Expand 8-bit channels to the canonical depth.
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self([
            double(bytes[0]),
            double(bytes[1]),
            double(bytes[2]),
        ])
    }

    /// Build a color from loosely typed channels, as stored by backends.
    pub fn from_channels(channels: &[i64]) -> Result<Self, ColorError> {
        let [red, green, blue] = channels else {
            return Err(ColorError::ChannelCount(channels.len()));
        };
        Ok(Self([checked(*red)?, checked(*green)?, checked(*blue)?]))
    }

    pub const fn channels(self) -> [u16; 3] {
        self.0
    }

    /// Truncate every channel to 8 bits.
    pub const fn to_bytes(self) -> [u8; 3] {
        [
            (self.0[0] / 256) as u8,
            (self.0[1] / 256) as u8,
            (self.0[2] / 256) as u8,
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_high(*self))
    }
}

const fn double(byte: u8) -> u16 {
    byte as u16 * 256 + byte as u16
}

fn checked(channel: i64) -> Result<u16, ColorError> {
    u16::try_from(channel).map_err(|_| ColorError::ChannelRange(channel))
}

/// Split `#`-optional text into three groups of `width` hex digits.
fn hex_groups(text: &str, width: usize) -> Option<[u16; 3]> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    if digits.len() != width * 3 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let mut out = [0u16; 3];
    for (slot, chunk) in out.iter_mut().zip(digits.as_bytes().chunks(width)) {
        // chunk is ASCII hex, so both conversions are infallible here
        let chunk = std::str::from_utf8(chunk).ok()?;
        *slot = u16::from_str_radix(chunk, 16).ok()?;
    }
    Some(out)
}

fn decimal_bytes(text: &str) -> Option<[u8; 3]> {
    let mut out = [0u8; 3];
    let mut parts = text.split(',');

    for (index, slot) in out.iter_mut().enumerate() {
        let part = parts.next()?;
        let part = if index == 0 { part } else { part.trim_start() };
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse::<u8>().ok()?;
    }

    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Parse `#rrggbb` (the `#` is optional).
pub fn parse_low(text: &str) -> Result<Color, ColorError> {
    let [red, green, blue] =
        hex_groups(text, 2).ok_or_else(|| ColorError::InvalidLow(text.to_string()))?;
    Ok(Color::from_bytes([red as u8, green as u8, blue as u8]))
}

/// Render as `#rrggbb`.
pub fn to_low(color: Color) -> String {
    let [red, green, blue] = color.to_bytes();
    format!("#{red:02x}{green:02x}{blue:02x}")
}

/// Parse `#rrrrggggbbbb` (the `#` is optional).
pub fn parse_high(text: &str) -> Result<Color, ColorError> {
    hex_groups(text, 4)
        .map(Color)
        .ok_or_else(|| ColorError::InvalidHigh(text.to_string()))
}

/// Render as `#rrrrggggbbbb`.
pub fn to_high(color: Color) -> String {
    let [red, green, blue] = color.channels();
    format!("#{red:04x}{green:04x}{blue:04x}")
}

/// Parse `r,g,b` with each component in 0..=255.
pub fn parse_decimal(text: &str) -> Result<Color, ColorError> {
    decimal_bytes(text)
        .map(Color::from_bytes)
        .ok_or_else(|| ColorError::InvalidDecimal(text.to_string()))
}

/// Render as `r,g,b` on the 8-bit scale.
pub fn to_decimal(color: Color) -> String {
    let [red, green, blue] = color.to_bytes();
    format!("{red},{green},{blue}")
}

/// Pick the hex depth by length: anything longer than `#rrggbb` is high depth.
pub fn parse_hex_auto(text: &str) -> Result<Color, ColorError> {
    if text.len() > 7 {
        parse_high(text)
    } else {
        parse_low(text)
    }
}

pub fn is_low(text: &str) -> bool {
    hex_groups(text, 2).is_some()
}

pub fn is_high(text: &str) -> bool {
    hex_groups(text, 4).is_some()
}

pub fn is_decimal(text: &str) -> bool {
    decimal_bytes(text).is_some()
}

/// True when `channels` holds exactly three values within the canonical range.
pub fn is_color(channels: &[i64]) -> bool {
    channels.len() == 3 && channels.iter().all(|ch| (0..=CHANNEL_MAX).contains(ch))
}
