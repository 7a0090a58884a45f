//! Radial auto-layout
//!
//! Pure placement math for new nodes: the root sits in the canvas center,
//! main concepts form an even ring around it, sub-concepts fan out along
//! their parent's outward angle, and expansion children spread evenly
//! around a caller-supplied base angle. Everything is deterministic given
//! its inputs; the only randomness (the expansion base angle) is drawn by
//! the caller.

use crate::types::{Canvas, Point, Tier};
use std::f64::consts::TAU;

/// Angular gap between adjacent sub-concepts, in radians
pub const SPREAD_FACTOR: f64 = 0.4;

/// Distance of expansion children from their parent
pub const EXPANSION_RADIUS: f64 = 120.0;

/// Minimum distance between any node box and the canvas edge
pub const MIN_MARGIN: f64 = 24.0;

/// First-tier ring radius, scaled down on constrained canvases
pub fn main_radius(canvas: &Canvas) -> f64 {
    (canvas.width.min(canvas.height) * 0.25).clamp(120.0, 260.0)
}

/// Second-tier fan radius, always inside the main ring
pub fn sub_radius(canvas: &Canvas) -> f64 {
    main_radius(canvas) * 0.6
}

/// Outward angle of main concept `i` out of `n`
pub fn main_angle(i: usize, n: usize) -> f64 {
    i as f64 * TAU / n as f64
}

/// Root position: the root box centered in the canvas
pub fn center_root(canvas: &Canvas) -> Point {
    let (w, h) = Tier::Root.footprint();
    let c = canvas.center();
    clamp_position(canvas, Tier::Root, Point::new(c.x - w / 2.0, c.y - h / 2.0))
}

/// Even ring of `n` main concepts around the root position.
/// Returns an empty vec for `n = 0`.
pub fn place_main_concepts(canvas: &Canvas, root: Point, n: usize) -> Vec<Point> {
    let radius = main_radius(canvas);
    (0..n)
        .map(|i| radial(canvas, root, main_angle(i, n), radius))
        .collect()
}

/// Fan of `m` sub-concepts centered on the parent's outward angle
pub fn place_sub_concepts(canvas: &Canvas, parent: Point, parent_angle: f64, m: usize) -> Vec<Point> {
    let radius = sub_radius(canvas);
    (0..m)
        .map(|j| {
            let angle = parent_angle + (j as f64 - m as f64 / 2.0 + 0.5) * SPREAD_FACTOR;
            radial(canvas, parent, angle, radius)
        })
        .collect()
}

/// Even spread of `k` expansion children starting from `base_angle`,
/// anchored at the expanding node's current position
pub fn place_expansion(canvas: &Canvas, parent: Point, k: usize, base_angle: f64) -> Vec<Point> {
    (0..k)
        .map(|idx| {
            let angle = base_angle + idx as f64 * TAU / k as f64;
            radial(canvas, parent, angle, EXPANSION_RADIUS)
        })
        .collect()
}

fn radial(canvas: &Canvas, origin: Point, angle: f64, radius: f64) -> Point {
    let p = Point::new(origin.x + angle.cos() * radius, origin.y + angle.sin() * radius);
    clamp_position(canvas, Tier::Concept, p)
}

/// Keeps a node's top-left corner inside the canvas minus footprint and margin
pub fn clamp_position(canvas: &Canvas, tier: Tier, p: Point) -> Point {
    let (w, h) = tier.footprint();
    let max_x = (canvas.width - w - MIN_MARGIN).max(MIN_MARGIN);
    let max_y = (canvas.height - h - MIN_MARGIN).max(MIN_MARGIN);
    Point::new(p.x.min(max_x).max(MIN_MARGIN), p.y.min(max_y).max(MIN_MARGIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_canvas() -> Canvas {
        Canvas::new(1280.0, 800.0)
    }

    #[test]
    fn test_main_ring_is_evenly_spaced() {
        let canvas = wide_canvas();
        let root = center_root(&canvas);
        for n in 1..=8 {
            let ring = place_main_concepts(&canvas, root, n);
            assert_eq!(ring.len(), n);
            let radius = main_radius(&canvas);
            for (i, p) in ring.iter().enumerate() {
                let expect = Point::new(
                    root.x + main_angle(i, n).cos() * radius,
                    root.y + main_angle(i, n).sin() * radius,
                );
                assert!((p.x - expect.x).abs() < 1e-9, "n={} i={}", n, i);
                assert!((p.y - expect.y).abs() < 1e-9, "n={} i={}", n, i);
            }
            // adjacent angular deltas are all 2pi/n
            for i in 1..n {
                let d = main_angle(i, n) - main_angle(i - 1, n);
                assert!((d - TAU / n as f64).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_main_concepts_place_nothing() {
        let canvas = wide_canvas();
        assert!(place_main_concepts(&canvas, center_root(&canvas), 0).is_empty());
    }

    #[test]
    fn test_sub_fan_centers_on_parent_angle() {
        let canvas = wide_canvas();
        let parent = Point::new(600.0, 400.0);
        // three subs at parent_angle 0: middle one points straight along the x axis
        let fan = place_sub_concepts(&canvas, parent, 0.0, 3);
        assert_eq!(fan.len(), 3);
        assert!((fan[1].y - parent.y).abs() < 1e-9);
        assert!((fan[1].x - (parent.x + sub_radius(&canvas))).abs() < 1e-9);
        // outer pair mirrors around the axis
        assert!(((fan[0].y - parent.y) + (fan[2].y - parent.y)).abs() < 1e-9);
        assert!((fan[0].x - fan[2].x).abs() < 1e-9);
    }

    #[test]
    fn test_expansion_spreads_evenly_from_base_angle() {
        let canvas = wide_canvas();
        let parent = Point::new(500.0, 350.0);
        let base = 0.7;
        let spread = place_expansion(&canvas, parent, 4, base);
        assert_eq!(spread.len(), 4);
        for (k, p) in spread.iter().enumerate() {
            let angle = base + k as f64 * TAU / 4.0;
            assert!((p.x - (parent.x + angle.cos() * EXPANSION_RADIUS)).abs() < 1e-9);
            assert!((p.y - (parent.y + angle.sin() * EXPANSION_RADIUS)).abs() < 1e-9);
            let dist = ((p.x - parent.x).powi(2) + (p.y - parent.y).powi(2)).sqrt();
            assert!((dist - EXPANSION_RADIUS).abs() < 1e-9);
        }
    }

    #[test]
    fn test_expansion_is_deterministic_given_base_angle() {
        let canvas = wide_canvas();
        let parent = Point::new(500.0, 350.0);
        let a = place_expansion(&canvas, parent, 3, 1.25);
        let b = place_expansion(&canvas, parent, 3, 1.25);
        assert_eq!(a, b);
    }

    #[test]
    fn test_clamp_keeps_footprint_inside_canvas() {
        let canvas = wide_canvas();
        let p = clamp_position(&canvas, Tier::Concept, Point::new(-50.0, 9000.0));
        let (_, h) = Tier::Concept.footprint();
        assert_eq!(p.x, MIN_MARGIN);
        assert_eq!(p.y, canvas.height - h - MIN_MARGIN);
        let q = clamp_position(&canvas, Tier::Root, Point::new(canvas.width, 0.0));
        let (rw, _) = Tier::Root.footprint();
        assert_eq!(q.x, canvas.width - rw - MIN_MARGIN);
        assert_eq!(q.y, MIN_MARGIN);
    }

    #[test]
    fn test_main_radius_scales_with_canvas() {
        assert_eq!(main_radius(&Canvas::new(1280.0, 800.0)), 200.0);
        // floor canvas bottoms out at the minimum radius
        assert_eq!(main_radius(&Canvas::new(480.0, 320.0)), 120.0);
        assert_eq!(main_radius(&Canvas::new(4000.0, 3000.0)), 260.0);
        let c = Canvas::new(1280.0, 800.0);
        assert!(sub_radius(&c) < main_radius(&c));
    }
}
