use crate::triangulation::TriangulationError;
use crate::types::{Float, Point, Vertex2d};

#[cfg(feature = "more_profile_traces")]
use tracing::{span, Level};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Orientation {
    Colinear,
    Clockwise,
    CounterClockwise,
}

/// Euclidean distance between `p` and `q`
#[inline]
pub fn distance(p: Point, q: Point) -> Float {
    (q - p).length()
}

#[inline]
pub fn midpoint(p: Point, q: Point) -> Point {
    (p + q) * 0.5
}

/// Slope of the line going through `p` and `q`.
///
/// Infinite (with a sign) for a vertical segment, NaN if `p` and `q` are the same point.
#[inline]
pub fn slope(p: Point, q: Point) -> Float {
    (q.y - p.y) / (q.x - p.x)
}

/// 2d cross product (z component of the 3d cross product)
#[inline]
pub fn cross(u: Point, v: Point) -> Float {
    u.x * v.y - u.y * v.x
}

/// Returns `true` if `p` and `q` are closer than `tolerance` on both axes.
///
/// The tolerance is absolute: it should be chosen relatively to the characteristic length of the mesh.
#[inline]
pub fn points_coincide(p: Point, q: Point, tolerance: Float) -> bool {
    (p.x - q.x).abs() < tolerance && (p.y - q.y).abs() < tolerance
}

/// Infinite line defined by a point and a direction
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Line {
    pub point: Point,
    pub direction: Point,
}

impl Line {
    /// Creates a line from a point and a slope.
    ///
    /// An infinite slope gives a vertical line. Returns [`None`] for a NaN slope.
    pub fn from_point_slope(point: Point, slope: Float) -> Option<Self> {
        let direction = if slope.is_nan() {
            return None;
        } else if slope.is_infinite() {
            Point::new(0., 1.)
        } else {
            Point::new(1., slope)
        };
        Some(Self { point, direction })
    }
}

/// Intersection point of two lines. [`None`] if they are parallel.
pub fn line_intersection(line_1: &Line, line_2: &Line) -> Option<Point> {
    let denominator = cross(line_1.direction, line_2.direction);
    let parallel_threshold =
        Float::EPSILON * line_1.direction.length() * line_2.direction.length();
    if denominator.abs() <= parallel_threshold {
        return None;
    }
    let t = cross(line_2.point - line_1.point, line_2.direction) / denominator;
    Some(line_1.point + line_1.direction * t)
}

/// Perpendicular bisector of the segment `pq`: goes through the midpoint, with the negative reciprocal
/// of the segment slope.
///
/// Returns [`None`] if `p` and `q` are the same point.
#[inline]
pub fn perpendicular_bisector(p: Point, q: Point) -> Option<Line> {
    Line::from_point_slope(midpoint(p, q), -1. / slope(p, q))
}

/// Circumcenter of the triangle `abc`, as the intersection of the perpendicular bisectors of `ab` and `bc`.
///
/// Returns [`None`] for collinear (or coincident) points, which have no circumcenter.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    #[cfg(feature = "more_profile_traces")]
    let _span = span!(Level::TRACE, "circumcenter").entered();

    let bisector_ab = perpendicular_bisector(a, b)?;
    let bisector_bc = perpendicular_bisector(b, c)?;
    let center = line_intersection(&bisector_ab, &bisector_bc)?;
    match center.is_finite() {
        true => Some(center),
        false => None,
    }
}

/// Returns the orientation of an ordered triplet (p, q, r).
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);

    if val == 0. {
        Orientation::Colinear
    } else if val > 0. {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Returns `true` if `p` is strictly inside the triangle `abc`, whatever the orientation of `abc`.
pub fn is_point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let o1 = orientation(a, b, p);
    let o2 = orientation(b, c, p);
    let o3 = orientation(c, a, p);
    o1 != Orientation::Colinear && o1 == o2 && o2 == o3
}

/// Axis-aligned bounding box
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

/// Axis-aligned bounding box of `points`. Returns [`None`] if there are no points
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<BoundingBox> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.x, first.y, first.x, first.y);

    for point in points {
        if point.x < x_min {
            x_min = point.x;
        }
        if point.x > x_max {
            x_max = point.x;
        }
        if point.y < y_min {
            y_min = point.y;
        }
        if point.y > y_max {
            y_max = point.y;
        }
    }
    Some(BoundingBox {
        min: Point::new(x_min, y_min),
        max: Point::new(x_max, y_max),
    })
}

impl BoundingBox {
    #[inline]
    pub fn extent(&self) -> Point {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point {
        midpoint(self.min, self.max)
    }

    /// Grows the box to include `point`
    pub fn extend(&mut self, point: Point) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns `true` if `point` is inside the box or closer than `tolerance` to it
    #[inline]
    pub fn contains(&self, point: Point, tolerance: Float) -> bool {
        point.x > self.min.x - tolerance
            && point.x < self.max.x + tolerance
            && point.y > self.min.y - tolerance
            && point.y < self.max.y + tolerance
    }
}

/// Checks that all the vertices have finite coordinates (no NaN nor infinity)
pub fn validate_points<T: Vertex2d>(vertices: &[T]) -> Result<(), TriangulationError> {
    for (index, vertex) in vertices.iter().enumerate() {
        if !vertex.x().is_finite() || !vertex.y().is_finite() {
            return Err(TriangulationError::NonFiniteCoordinate { index });
        }
    }
    Ok(())
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use crate::{
        triangulation::TriangulationError,
        types::{Float, Node, Point, Triangle},
        utils::{
            bounding_box, circumcenter, distance, is_point_in_triangle, line_intersection,
            midpoint, orientation, points_coincide, slope, validate_points, Line, Orientation,
        },
    };

    #[test]
    fn vertex_in_triangle_circumcircle() {
        let unit_circle = Triangle::new(
            Node::new(-1., 0., 0),
            Node::new(1., 0., 1),
            Node::new(0., 1., 2),
        )
        .expect("Triangle should be valid");

        let step = 100;
        for i in -step..step {
            for j in -step..step {
                let p = Point::new(i as Float / step as Float, j as Float / step as Float);
                let p_length = p.length();
                let p_in_circle = unit_circle.circumscribe_point(p);
                if p_length < 1. - 1e-12 {
                    assert_eq!(true, p_in_circle, "p_length < 1, p should be in the circle");
                } else if p_length > 1. + 1e-12 {
                    assert_eq!(
                        false, p_in_circle,
                        "p_length > 1, p should be out of the circle"
                    );
                }
            }
        }
    }

    #[test]
    fn geometry_primitives() {
        let p1 = Point::new(-1., 3.);
        let p2 = Point::new(4., 5.);
        let p3 = Point::new(4., -7.);

        assert!((distance(p1, p2) - 5.38516480713).abs() < 1e-10);
        assert_eq!(12., distance(p2, p3));
        assert_eq!(Point::new(1.5, 4.), midpoint(p1, p2));
        assert_eq!(0.4, slope(p1, p2));
    }

    #[test]
    fn vertical_slope_is_infinite() {
        let up = slope(Point::new(4., -7.), Point::new(4., 5.));
        let down = slope(Point::new(4., 5.), Point::new(4., -7.));

        assert_eq!(Float::INFINITY, up);
        assert_eq!(Float::NEG_INFINITY, down);
        assert!(slope(Point::new(1., 1.), Point::new(1., 1.)).is_nan());
    }

    #[test]
    fn line_from_infinite_slope_is_vertical() {
        let line = Line::from_point_slope(Point::new(2., 0.), Float::INFINITY)
            .expect("An infinite slope is valid");
        assert_eq!(Point::new(0., 1.), line.direction);

        assert_eq!(None, Line::from_point_slope(Point::ZERO, Float::NAN));
    }

    #[test]
    fn lines_intersection() {
        let vertical = Line::from_point_slope(Point::new(2., 0.), Float::INFINITY)
            .expect("Line should be valid");
        let diagonal =
            Line::from_point_slope(Point::new(0., 0.), 1.).expect("Line should be valid");

        assert_eq!(
            Some(Point::new(2., 2.)),
            line_intersection(&vertical, &diagonal)
        );
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let line_1 = Line::from_point_slope(Point::new(0., 0.), 2.).expect("Line should be valid");
        let line_2 = Line::from_point_slope(Point::new(0., 1.), 2.).expect("Line should be valid");

        assert_eq!(None, line_intersection(&line_1, &line_2));
    }

    #[test]
    fn circumcenter_of_reference_triangle() {
        let center = circumcenter(
            Point::new(-1., 3.),
            Point::new(4., 5.),
            Point::new(4., -7.),
        );

        assert_eq!(Some(Point::new(3.5, -1.)), center);
    }

    #[test]
    fn circumcenter_of_collinear_points() {
        let center = circumcenter(Point::new(0., 0.), Point::new(1., 2.), Point::new(3., 6.));
        assert_eq!(None, center);

        let center = circumcenter(Point::new(0., 1.), Point::new(0., 2.), Point::new(0., 5.));
        assert_eq!(None, center);
    }

    #[test]
    fn triplet_orientation() {
        let p = Point::new(0., 0.);
        let q = Point::new(3., 0.);

        assert_eq!(
            Orientation::CounterClockwise,
            orientation(p, q, Point::new(1., 1.))
        );
        assert_eq!(
            Orientation::Clockwise,
            orientation(p, q, Point::new(1., -1.))
        );
        assert_eq!(
            Orientation::Colinear,
            orientation(p, q, Point::new(5., 0.))
        );
    }

    #[test]
    fn point_in_triangle() {
        let (a, b, c) = (Point::new(0., 0.), Point::new(4., 0.), Point::new(0., 4.));

        assert_eq!(
            true,
            is_point_in_triangle(Point::new(1., 1.), a, b, c)
        );
        assert_eq!(
            true,
            is_point_in_triangle(Point::new(1., 1.), a, c, b)
        );
        assert_eq!(
            false,
            is_point_in_triangle(Point::new(3., 3.), a, b, c)
        );
        assert_eq!(
            false,
            is_point_in_triangle(Point::new(2., 0.), a, b, c)
        );
    }

    #[test]
    fn coincident_points() {
        let p = Point::new(1., 1.);

        assert!(points_coincide(p, Point::new(1. + 1e-10, 1.), 1e-9));
        assert!(!points_coincide(p, Point::new(1. + 1e-8, 1.), 1e-9));
        assert!(points_coincide(p, Point::new(1.05, 0.95), 0.1));
    }

    #[test]
    fn points_bounding_box() {
        let bounds = bounding_box([
            Point::new(3., 2.),
            Point::new(-1., 2.),
            Point::new(-1., -2.),
            Point::new(3., -2.),
        ])
        .expect("There are points");

        assert_eq!(Point::new(-1., -2.), bounds.min);
        assert_eq!(Point::new(3., 2.), bounds.max);
        assert_eq!(Point::new(4., 4.), bounds.extent());
        assert!(bounds.contains(Point::new(3., 0.), 1e-9));
        assert!(!bounds.contains(Point::new(3.1, 0.), 1e-9));

        assert_eq!(None, bounding_box(Vec::<Point>::new()));
    }

    #[test]
    fn non_finite_vertices_are_rejected() {
        assert_eq!(Ok(()), validate_points(&[[0., 0.], [1., 2.]]));
        assert_eq!(
            Err(TriangulationError::NonFiniteCoordinate { index: 1 }),
            validate_points(&[[0., 0.], [Float::NAN, 2.]])
        );
        assert_eq!(
            Err(TriangulationError::NonFiniteCoordinate { index: 0 }),
            validate_points(&[(Float::INFINITY, 0.)])
        );
    }
}
