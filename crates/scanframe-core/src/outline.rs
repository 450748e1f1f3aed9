use nalgebra::{Point2, Vector2};

/// Scale a corner polygon about its center by `fraction`.
///
/// For quads the center is the intersection of the diagonals (`0-2` and
/// `1-3`), which stays inside the code under perspective; other polygons, and
/// quads with parallel diagonals, use the centroid.
pub fn expand_outline(points: &[Point2<f32>], fraction: f32) -> Vec<Point2<f32>> {
    if points.is_empty() {
        return Vec::new();
    }
    let center = match points {
        [a, b, c, d] => diagonal_intersection(*a, *c, *b, *d).unwrap_or_else(|| centroid(points)),
        _ => centroid(points),
    };
    points
        .iter()
        .map(|&p| center + (p - center) * fraction)
        .collect()
}

fn centroid(points: &[Point2<f32>]) -> Point2<f32> {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    Point2::new((sx / n) as f32, (sy / n) as f32)
}

/// Intersection of segment lines `a-c` and `b-d`.
fn diagonal_intersection(
    a: Point2<f32>,
    c: Point2<f32>,
    b: Point2<f32>,
    d: Point2<f32>,
) -> Option<Point2<f32>> {
    let v1: Vector2<f32> = c - a;
    let v2: Vector2<f32> = d - b;
    let v: Vector2<f32> = b - a;
    let det = v1.x * v2.y - v1.y * v2.x;
    if det.abs() < f32::EPSILON {
        return None;
    }
    let t = (v.x * v2.y - v.y * v2.x) / det;
    Some(a + v1 * t)
}
