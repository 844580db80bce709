use std::f64::consts::PI;

use hashbrown::HashSet;
use tracing::debug;

use crate::refinement::RefinementReport;
use crate::triangulation::{Triangulation, TriangulationConfiguration, TriangulationError};
use crate::types::{Edge, Float, Node, Point, Triangle, Vertex2d};
use crate::utils::{distance, points_coincide};

#[cfg(feature = "profile_traces")]
use tracing::{span, Level};

/// Minimum angle enforced by [`Mesh::generate`]: 30°
pub const DEFAULT_MESH_MIN_ANGLE: Float = PI / 6.;

/// Discretized domain boundary: nodes and segments between them.
///
/// Closed loops of segments delimit the domain. A loop inside another one is a hole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boundary {
    nodes: Vec<Point>,
    /// Pairs of indexes in `nodes`
    segments: Vec<[usize; 2]>,
}

fn check_spacing(h: Float) -> Result<(), TriangulationError> {
    match h.is_finite() && h > 0. {
        true => Ok(()),
        false => Err(TriangulationError::InvalidSpacing { spacing: h }),
    }
}

impl Boundary {
    /// Fails with [`TriangulationError::InvalidSegment`] if a segment references a missing node
    pub fn new(nodes: Vec<Point>, segments: Vec<[usize; 2]>) -> Result<Self, TriangulationError> {
        if let Some(segment) = segments
            .iter()
            .find(|s| s[0] >= nodes.len() || s[1] >= nodes.len())
        {
            return Err(TriangulationError::InvalidSegment {
                segment: *segment,
                len: nodes.len(),
            });
        }
        Ok(Self { nodes, segments })
    }

    /// Connects each point to the next one. If `closed`, also connects the last point to the first one
    /// (requires at least 3 points).
    pub fn from_polyline<T: Vertex2d>(points: &[T], closed: bool) -> Self {
        let nodes: Vec<Point> = points.iter().map(|p| p.to_point()).collect();
        let mut segments: Vec<[usize; 2]> = (1..nodes.len()).map(|i| [i - 1, i]).collect();
        if closed && nodes.len() > 2 {
            segments.push([nodes.len() - 1, 0]);
        }
        Self { nodes, segments }
    }

    /// Open polyline from `p0` to `p1`, split in `⌊|p0p1| / h⌋` segments (at least 1)
    pub fn line(p0: Point, p1: Point, h: Float) -> Result<Self, TriangulationError> {
        check_spacing(h)?;
        let count = ((distance(p0, p1) / h).floor() as usize).max(1);
        let nodes: Vec<Point> = (0..=count)
            .map(|i| p0 + (p1 - p0) * (i as Float / count as Float))
            .collect();
        Ok(Self::from_polyline(&nodes, false))
    }

    /// Closed loop of `⌊2πr / h⌋` nodes (at least 3) on the circle of center `center` and radius `radius`
    pub fn circle(center: Point, radius: Float, h: Float) -> Result<Self, TriangulationError> {
        check_spacing(h)?;
        if !radius.is_finite() || radius <= 0. {
            return Err(TriangulationError::InvalidRadius { radius });
        }
        let count = ((2. * PI * radius / h).floor() as usize).max(3);
        let nodes: Vec<Point> = (0..count)
            .map(|i| {
                let angle = 2. * PI * i as Float / count as Float;
                center + radius * Point::new(angle.cos(), angle.sin())
            })
            .collect();
        Ok(Self::from_polyline(&nodes, true))
    }

    /// Union of two boundaries. Nodes of `other` coinciding (within `tolerance`) with an existing node
    /// are merged into it.
    pub fn combine(&self, other: &Boundary, tolerance: Float) -> Boundary {
        let mut nodes = self.nodes.clone();
        let mut segments = self.segments.clone();

        let mut remap = Vec::with_capacity(other.nodes.len());
        for point in other.nodes.iter() {
            match nodes
                .iter()
                .position(|n| points_coincide(*n, *point, tolerance))
            {
                Some(existing) => remap.push(existing),
                None => {
                    remap.push(nodes.len());
                    nodes.push(*point);
                }
            }
        }
        for [from, to] in other.segments.iter() {
            let segment = [remap[*from], remap[*to]];
            if segment[0] != segment[1] {
                segments.push(segment);
            }
        }
        Boundary { nodes, segments }
    }

    /// Combines all the `boundaries`, in order
    pub fn combine_all<'a>(
        boundaries: impl IntoIterator<Item = &'a Boundary>,
        tolerance: Float,
    ) -> Boundary {
        boundaries
            .into_iter()
            .fold(Boundary::default(), |acc, b| acc.combine(b, tolerance))
    }

    #[inline]
    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    #[inline]
    pub fn segments(&self) -> &[[usize; 2]] {
        &self.segments
    }

    /// Even-odd test: casts a horizontal ray from `p` towards -x and counts the crossed segments.
    ///
    /// A segment is crossed if exactly one of its ends is strictly above `p`, so that a ray going
    /// through a node shared by two segments counts once.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for [from, to] in self.segments.iter() {
            let (a, b) = (self.nodes[*from], self.nodes[*to]);
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if x < p.x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Refined triangulation of the domain delimited by a [`Boundary`]
#[derive(Debug, Clone)]
pub struct Mesh {
    boundary: Boundary,
    triangulation: Triangulation,
    report: RefinementReport,
    /// Refined triangles with their centroid inside the domain
    triangles: Vec<Triangle>,
    /// Boundary nodes and refined nodes inside the domain
    nodes: Vec<Node>,
}

impl Mesh {
    /// Same as [`Mesh::generate_with_angle`] with a [`DEFAULT_MESH_MIN_ANGLE`] minimum angle
    pub fn generate(
        boundary: Boundary,
        h: Float,
        config: TriangulationConfiguration,
    ) -> Result<Self, TriangulationError> {
        Self::generate_with_angle(boundary, h, DEFAULT_MESH_MIN_ANGLE, config)
    }

    /// Triangulates the boundary nodes, refines the triangulation with `min_angle` and a maximum
    /// area of `0.5 * h²`, then only keeps what is inside the domain.
    pub fn generate_with_angle(
        boundary: Boundary,
        h: Float,
        min_angle: Float,
        config: TriangulationConfiguration,
    ) -> Result<Self, TriangulationError> {
        #[cfg(feature = "profile_traces")]
        let _span = span!(Level::TRACE, "generate_mesh").entered();

        check_spacing(h)?;

        let mut triangulation = Triangulation::build(boundary.nodes(), config)?;
        triangulation.compute()?;
        let report = triangulation.refine(min_angle, h)?;

        let triangles: Vec<Triangle> = triangulation
            .get_triangles()
            .into_iter()
            .filter(|t| boundary.contains(t.centroid()))
            .collect();

        // Build nodes come first, with the boundary indexes as identities
        let boundary_nodes_count = boundary.nodes().len();
        let nodes: Vec<Node> = triangulation
            .get_nodes()
            .iter()
            .filter(|n| (n.id as usize) < boundary_nodes_count || boundary.contains(n.point))
            .copied()
            .collect();

        debug!(
            "Mesh generated: {} triangles and {} nodes kept out of {} and {}",
            triangles.len(),
            nodes.len(),
            report.triangles.len(),
            triangulation.get_nodes().len()
        );

        Ok(Self {
            boundary,
            triangulation,
            report,
            triangles,
            nodes,
        })
    }

    #[inline]
    pub fn inside_domain(&self, p: Point) -> bool {
        self.boundary.contains(p)
    }

    #[inline]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Whole refined triangulation, before the domain filtering
    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    #[inline]
    pub fn report(&self) -> &RefinementReport {
        &self.report
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges of the kept triangles, without duplicates, in canonical ascending order
    pub fn edges(&self) -> Vec<Edge> {
        let unique_edges: HashSet<Edge> = self
            .triangles
            .iter()
            .flat_map(|t| t.edges().iter().copied())
            .collect();
        let mut edges: Vec<Edge> = unique_edges.into_iter().collect();
        edges.sort_unstable();
        edges
    }
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
