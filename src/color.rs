//! Display colours for acquisition channels.
//!
//! Colours are stored as hex codes and returned as float RGB triples scaled so
//! that the brightest component is `1.0`.

use crate::error::ColorError;

/// Channel name to display colour.
pub const FLOAT_COLORS: [(&str, &str); 5] = [
    ("DAPI", "#007fff"),
    ("RFP", "#ffe600"),
    ("GFP", "#00ff00"),
    ("Cy5", "#ff0000"),
    ("white_light", "#ffffff"),
];

/// Parse `#rrggbb` (the `#` is optional) into RGB divided by its largest
/// component. Black stays `[0, 0, 0]`.
pub fn hex_to_float_rgb(hexcode: &str) -> Result<[f32; 3], ColorError> {
    let digits = hexcode.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColorError::InvalidHex(hexcode.to_string()));
    }

    let mut rgb = [0u8; 3];
    for (i, component) in rgb.iter_mut().enumerate() {
        *component = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16)
            .map_err(|_| ColorError::InvalidHex(hexcode.to_string()))?;
    }

    let max = rgb.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return Ok([0.0; 3]);
    }
    Ok(rgb.map(|c| c as f32 / max as f32))
}

/// Display colour of `channel`.
pub fn get_float_color(channel: &str) -> Result<[f32; 3], ColorError> {
    let (_, hexcode) = FLOAT_COLORS
        .iter()
        .find(|(name, _)| *name == channel)
        .ok_or_else(|| ColorError::UnknownChannel(channel.to_string()))?;
    hex_to_float_rgb(hexcode)
}
