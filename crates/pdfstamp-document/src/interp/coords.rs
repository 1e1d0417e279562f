// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate resolution — page-relative offsets with the reversed-edge sign
// convention, and reference corners for boxes.

use std::str::FromStr;

use pdfstamp_core::Value;
use pdfstamp_core::error::{Result, StampError};

/// Resolve a raw coordinate against the page extent along its axis.
///
/// Text starting with `-` is measured back from the far edge, so `-0` is the
/// far edge itself. Anything else is an absolute offset.
pub fn resolve(value: &Value, extent: f64) -> Result<f64> {
    let number = value.as_f64()?;
    if value.is_negative() {
        Ok(extent - number.abs())
    } else {
        Ok(number)
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Resolve an X coordinate (against the width).
    pub fn x(&self, value: &Value) -> Result<f64> {
        resolve(value, self.width)
    }

    /// Resolve a Y coordinate (against the height).
    pub fn y(&self, value: &Value) -> Result<f64> {
        resolve(value, self.height)
    }

    /// Resolve an `x:y` pair.
    pub fn point(&self, x: &Value, y: &Value) -> Result<(f64, f64)> {
        Ok((self.x(x)?, self.y(y)?))
    }
}

/// Which corner of a box the given position names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    #[default]
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
}

impl Corner {
    /// Corner from an optional `c` keyword; absent means lower-left.
    pub fn from_keyword(value: Option<&Value>) -> Result<Self> {
        value.map_or(Ok(Self::LowerLeft), |v| v.as_str().parse())
    }

    /// Lower-left corner of a `width` × `height` box whose `self` corner
    /// sits at (`x`, `y`).
    pub fn lower_left(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        match self {
            Self::LowerLeft => (x, y),
            Self::LowerRight => (x - width, y),
            Self::UpperLeft => (x, y - height),
            Self::UpperRight => (x - width, y - height),
        }
    }
}

impl FromStr for Corner {
    type Err = StampError;

    fn from_str(text: &str) -> Result<Self> {
        match text.trim() {
            "ll" => Ok(Self::LowerLeft),
            "lr" => Ok(Self::LowerRight),
            "ul" => Ok(Self::UpperLeft),
            "ur" => Ok(Self::UpperRight),
            other => Err(StampError::Render(format!("invalid corner: {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> Value {
        Value::new(raw)
    }

    #[test]
    fn sign_selects_the_far_edge() {
        assert_eq!(resolve(&v("5"), 200.0).unwrap(), 5.0);
        assert_eq!(resolve(&v("-5"), 200.0).unwrap(), 195.0);
        assert_eq!(resolve(&v("-0"), 200.0).unwrap(), 200.0);
        assert_eq!(resolve(&v("0"), 200.0).unwrap(), 0.0);
        assert_eq!(resolve(&v("-12.5"), 100.0).unwrap(), 87.5);
    }

    #[test]
    fn axes_use_their_own_extent() {
        let page = PageBox::new(200.0, 300.0);
        assert_eq!(page.point(&v("-10"), &v("-10")).unwrap(), (190.0, 290.0));
        assert_eq!(page.x(&v("7")).unwrap(), 7.0);
    }

    #[test]
    fn malformed_numbers_fail() {
        assert!(resolve(&v("ten"), 100.0).is_err());
        assert!(resolve(&v("-"), 100.0).is_err());
    }

    #[test]
    fn corners_reanchor_to_lower_left() {
        assert_eq!(Corner::LowerLeft.lower_left(100.0, 100.0, 20.0, 10.0), (100.0, 100.0));
        assert_eq!(Corner::LowerRight.lower_left(100.0, 100.0, 20.0, 10.0), (80.0, 100.0));
        assert_eq!(Corner::UpperLeft.lower_left(100.0, 100.0, 20.0, 10.0), (100.0, 90.0));
        assert_eq!(Corner::UpperRight.lower_left(100.0, 100.0, 20.0, 10.0), (80.0, 90.0));
    }

    #[test]
    fn corner_keyword_defaults_and_rejects_unknown() {
        assert_eq!(Corner::from_keyword(None).unwrap(), Corner::LowerLeft);
        assert_eq!(Corner::from_keyword(Some(&v("ur"))).unwrap(), Corner::UpperRight);
        let err = Corner::from_keyword(Some(&v("middle"))).unwrap_err();
        assert!(err.to_string().contains("invalid corner"));
    }
}
