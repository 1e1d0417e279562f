// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compound path shapes built from Bézier segments: circles, rounded
// rectangles, elliptical arcs and ellipses.

use std::f64::consts::PI;

use super::surface::DrawingSurface;

/// Control-point factor approximating a quarter circle.
const CIRCLE_KAPPA: f64 = 0.5523;
/// Corner factor for rounded rectangles (1 - kappa).
const CORNER_CURVE: f64 = 0.4477;

/// One path-construction step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo([f64; 6]),
}

/// Replay segments onto a surface.
pub fn replay(segments: &[Segment], surface: &mut dyn DrawingSurface) {
    for segment in segments {
        match *segment {
            Segment::MoveTo(x, y) => surface.move_to(x, y),
            Segment::LineTo(x, y) => surface.line_to(x, y),
            Segment::CurveTo([x1, y1, x2, y2, x3, y3]) => surface.curve_to(x1, y1, x2, y2, x3, y3),
        }
    }
}

/// Circle around (`x`, `y`), four quarter curves counter-clockwise from
/// the rightmost point.
pub fn circle(x: f64, y: f64, r: f64) -> Vec<Segment> {
    let k = r * CIRCLE_KAPPA;
    vec![
        Segment::MoveTo(x + r, y),
        Segment::CurveTo([x + r, y + k, x + k, y + r, x, y + r]),
        Segment::CurveTo([x - k, y + r, x - r, y + k, x - r, y]),
        Segment::CurveTo([x - r, y - k, x - k, y - r, x, y - r]),
        Segment::CurveTo([x + k, y - r, x + r, y - k, x + r, y]),
    ]
}

/// Rectangle with rounded corners. Negative extents flip the box.
pub fn round_rectangle(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Vec<Segment> {
    let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
    let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
    let r = radius.abs();
    let c = r * CORNER_CURVE;
    let (right, top) = (x + width, y + height);

    vec![
        Segment::MoveTo(x + r, y),
        Segment::LineTo(right - r, y),
        Segment::CurveTo([right - c, y, right, y + c, right, y + r]),
        Segment::LineTo(right, top - r),
        Segment::CurveTo([right, top - c, right - c, top, right - r, top]),
        Segment::LineTo(x + r, top),
        Segment::CurveTo([x + c, top, x, top - c, x, top - r]),
        Segment::LineTo(x, y + r),
        Segment::CurveTo([x, y + c, x + c, y, x + r, y]),
    ]
}

/// Elliptical arc inscribed in the box (`x1`, `y1`)–(`x2`, `y2`), from
/// `start` degrees sweeping `extent` degrees (counter-clockwise when
/// positive). Split into fragments of at most 90°. Sweeps beyond a full
/// turn are clamped to ±360°.
pub fn arc(x1: f64, y1: f64, x2: f64, y2: f64, start: f64, extent: f64) -> Vec<Segment> {
    if extent == 0.0 {
        return Vec::new();
    }
    let extent = extent.clamp(-360.0, 360.0);
    let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
    let (y1, y2) = if y2 > y1 { (y2, y1) } else { (y1, y2) };

    let (fragment, count) = if extent.abs() <= 90.0 {
        (extent, 1)
    } else {
        let count = (extent.abs() / 90.0).ceil() as usize;
        (extent / count as f64, count)
    };

    let cx = (x1 + x2) / 2.0;
    let cy = (y1 + y2) / 2.0;
    let rx = (x2 - x1) / 2.0;
    let ry = (y2 - y1) / 2.0;
    let half = fragment * PI / 360.0;
    let kappa = (4.0 / 3.0 * (1.0 - half.cos()) / half.sin()).abs();
    // Clockwise fragments bend the control points the other way.
    let k = if fragment > 0.0 { kappa } else { -kappa };

    let mut segments = Vec::with_capacity(count + 1);
    for i in 0..count {
        let theta0 = (start + i as f64 * fragment).to_radians();
        let theta1 = (start + (i + 1) as f64 * fragment).to_radians();
        let (sin0, cos0) = theta0.sin_cos();
        let (sin1, cos1) = theta1.sin_cos();

        if i == 0 {
            segments.push(Segment::MoveTo(cx + rx * cos0, cy - ry * sin0));
        }
        segments.push(Segment::CurveTo([
            cx + rx * (cos0 - k * sin0),
            cy - ry * (sin0 + k * cos0),
            cx + rx * (cos1 + k * sin1),
            cy - ry * (sin1 - k * cos1),
            cx + rx * cos1,
            cy - ry * sin1,
        ]));
    }
    segments
}

/// Full ellipse inscribed in the box (`x1`, `y1`)–(`x2`, `y2`).
pub fn ellipse(x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<Segment> {
    arc(x1, y1, x2, y2, 0.0, 360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_point(segment: &Segment) -> (f64, f64) {
        match *segment {
            Segment::MoveTo(x, y) | Segment::LineTo(x, y) => (x, y),
            Segment::CurveTo([.., x, y]) => (x, y),
        }
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn circle_passes_through_the_four_extremes() {
        let path = circle(50.0, 50.0, 10.0);
        assert_eq!(path.len(), 5);
        let ends: Vec<_> = path.iter().map(end_point).collect();
        assert_eq!(ends, [(60.0, 50.0), (50.0, 60.0), (40.0, 50.0), (50.0, 40.0), (60.0, 50.0)]);
    }

    #[test]
    fn round_rectangle_normalises_negative_extents() {
        let flipped = round_rectangle(110.0, 60.0, -100.0, -50.0, -5.0);
        let plain = round_rectangle(10.0, 10.0, 100.0, 50.0, 5.0);
        assert_eq!(flipped, plain);
        assert_eq!(plain[0], Segment::MoveTo(15.0, 10.0));
        assert_eq!(plain[1], Segment::LineTo(105.0, 10.0));
        assert!(close(end_point(&plain[8]), (15.0, 10.0)));
    }

    #[test]
    fn arcs_split_into_quarter_fragments() {
        assert_eq!(arc(0.0, 0.0, 100.0, 100.0, 0.0, 90.0).len(), 2);
        assert_eq!(arc(0.0, 0.0, 100.0, 100.0, 0.0, 91.0).len(), 3);
        assert_eq!(arc(0.0, 0.0, 100.0, 100.0, 0.0, -270.0).len(), 4);
        assert!(arc(0.0, 0.0, 100.0, 100.0, 30.0, 0.0).is_empty());
    }

    #[test]
    fn quarter_arc_runs_counter_clockwise() {
        let path = arc(0.0, 0.0, 100.0, 100.0, 0.0, 90.0);
        assert!(close(end_point(&path[0]), (100.0, 50.0)));
        assert!(close(end_point(&path[1]), (50.0, 100.0)));

        let clockwise = arc(0.0, 0.0, 100.0, 100.0, 0.0, -90.0);
        assert!(close(end_point(&clockwise[1]), (50.0, 0.0)));
    }

    #[test]
    fn ellipse_closes_on_its_start() {
        let path = ellipse(0.0, 0.0, 200.0, 100.0);
        assert_eq!(path.len(), 5);
        assert!(close(end_point(&path[0]), (200.0, 50.0)));
        assert!(close(end_point(&path[1]), (100.0, 100.0)));
        assert!(close(end_point(&path[2]), (0.0, 50.0)));
        assert!(close(end_point(&path[4]), (200.0, 50.0)));
    }

    #[test]
    fn oversized_sweeps_stop_at_one_turn() {
        let huge = arc(0.0, 0.0, 100.0, 100.0, 0.0, 1e300);
        assert_eq!(huge, ellipse(0.0, 0.0, 100.0, 100.0));

        let backwards = arc(0.0, 0.0, 100.0, 100.0, 0.0, -1e12);
        assert_eq!(backwards.len(), 5);
        assert!(close(end_point(&backwards[4]), (100.0, 50.0)));
    }
}
