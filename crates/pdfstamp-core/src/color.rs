// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web color parsing — names, hex notation and rgb() triples.

use std::str::FromStr;

use crate::error::StampError;

/// An opaque RGB color with 0.0–1.0 components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::from_bytes(0, 0, 0);

    pub const fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Components as an array, in PDF operand order.
    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = StampError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let text = spec.trim().to_ascii_lowercase();
        let invalid = || StampError::Render(format!("invalid color: {spec:?}"));

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(inner) = text.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            return parse_rgb_triple(inner).ok_or_else(invalid);
        }
        named_color(&text).ok_or_else(invalid)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut it = hex.chars().filter_map(|c| c.to_digit(16)).map(|d| (d * 17) as u8);
            Some(Rgb::from_bytes(it.next()?, it.next()?, it.next()?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgb::from_bytes(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

/// `r,g,b` with 0–255 integers or percentages.
fn parse_rgb_triple(inner: &str) -> Option<Rgb> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut out = [0.0f32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = match part.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => part.parse::<f32>().ok()? / 255.0,
        }
        .clamp(0.0, 1.0);
    }
    Some(Rgb {
        r: out[0],
        g: out[1],
        b: out[2],
    })
}

fn named_color(name: &str) -> Option<Rgb> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "dimgray" | "dimgrey" => (105, 105, 105),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "orange" => (255, 165, 0),
        "darkorange" => (255, 140, 0),
        "gold" => (255, 215, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "crimson" => (220, 20, 60),
        "darkred" => (139, 0, 0),
        "firebrick" => (178, 34, 34),
        "tomato" => (255, 99, 71),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "darkblue" => (0, 0, 139),
        "royalblue" => (65, 105, 225),
        "steelblue" => (70, 130, 180),
        "skyblue" => (135, 206, 235),
        "lightblue" => (173, 216, 230),
        "darkgreen" => (0, 100, 0),
        "forestgreen" => (34, 139, 34),
        "lightgreen" => (144, 238, 144),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "khaki" => (240, 230, 140),
        "tan" => (210, 180, 140),
        "chocolate" => (210, 105, 30),
        "whitesmoke" => (245, 245, 245),
        "gainsboro" => (220, 220, 220),
        _ => return None,
    };
    Some(Rgb::from_bytes(r, g, b))
}
