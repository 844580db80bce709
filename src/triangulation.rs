use arrayvec::ArrayVec;
use hashbrown::{HashMap, HashSet};
use tracing::{debug, error};

#[cfg(feature = "parallel_filtering")]
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::container::{container_nodes, is_inside_container, DEFAULT_CONTAINER_MARGIN};
use crate::types::{Edge, Float, Node, NodeId, Point, Triangle, Vertex2d};
use crate::utils::{bounding_box, distance, validate_points, BoundingBox};

#[cfg(feature = "progress_log")]
use tracing::info;

#[cfg(feature = "debug_context")]
use crate::debug::{DebugConfiguration, DebugContext, Phase};

#[cfg(feature = "profile_traces")]
use tracing::{span, Level};

/// Two points closer than this on both axes are considered to be the same point.
pub const DEFAULT_TOLERANCE: Float = 1e-9;
/// Maximum number of refinement passes, shared by the angle and size phases.
pub const DEFAULT_MAX_REFINEMENT_STEPS: usize = 100_000;
pub const DEFAULT_CONFINE_STEINER_POINTS: bool = true;

pub const DEFAULT_FILTER_PARALLEL_TRI_COUNT_THRESHOLD: usize = 100_000;
pub const DEFAULT_FILTER_PARALLEL_MIN_BATCH_LEN: usize = 1000;

#[derive(Clone, Debug)]
pub struct TriangulationConfiguration {
    /// Absolute tolerance used to detect coincident points and Delaunay violations.
    ///
    /// Not scale-invariant: should be chosen relatively to the characteristic length of the input.
    pub tolerance: Float,
    /// The container triangle encloses the bounding box of the nodes, inflated on each side by this
    /// factor of its largest extent.
    pub container_margin: Float,
    /// Budget of refinement passes. Each pass inserts at most one Steiner point.
    pub max_refinement_steps: usize,
    /// If `true`, refinement skips the triangles whose circumcenter is outside of the bounding box of
    /// the input nodes.
    pub confine_steiner_points: bool,
    /// Above this count of live triangles, output filtering is done in parallel (requires the
    /// `parallel_filtering` feature)
    pub filter_parallel_tri_count_threshold: usize,
    pub filter_parallel_min_batch_len: usize,
    #[cfg(feature = "debug_context")]
    pub debug_config: DebugConfiguration,
}
impl Default for TriangulationConfiguration {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            container_margin: DEFAULT_CONTAINER_MARGIN,
            max_refinement_steps: DEFAULT_MAX_REFINEMENT_STEPS,
            confine_steiner_points: DEFAULT_CONFINE_STEINER_POINTS,
            filter_parallel_tri_count_threshold: DEFAULT_FILTER_PARALLEL_TRI_COUNT_THRESHOLD,
            filter_parallel_min_batch_len: DEFAULT_FILTER_PARALLEL_MIN_BATCH_LEN,
            #[cfg(feature = "debug_context")]
            debug_config: DebugConfiguration::default(),
        }
    }
}

/// Reason of a rejected insertion. The triangulation is left untouched.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertionFailure {
    #[error("coincides with node {0}")]
    CoincidentNode(NodeId),
    #[error("outside of the container triangle")]
    OutsideContainer,
    #[error("no triangle circumscribes it")]
    EmptyCavity,
    #[error("the cavity has no boundary edges")]
    NoBoundaryEdges,
    #[error("a new triangle would be degenerate")]
    DegenerateFan,
    #[error("no identity left for a new node")]
    IdOverflow,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("vertex index {index} is out of range for an {entity} with {len} vertices")]
    IndexOutOfRange {
        entity: &'static str,
        index: usize,
        len: usize,
    },
    #[error("cannot insert a node at ({x}, {y}): {reason}")]
    DegenerateInsertion {
        x: Float,
        y: Float,
        reason: InsertionFailure,
    },
    #[error("nodes {ids:?} are repeated or collinear")]
    DegenerateGeometry { ids: [NodeId; 3] },
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("invalid refinement parameters: min_angle {min_angle}, max_edge {max_edge}")]
    InvalidRefinementParameters { min_angle: Float, max_edge: Float },
    #[error("invalid boundary spacing {spacing}")]
    InvalidSpacing { spacing: Float },
    #[error("invalid circle radius {radius}")]
    InvalidRadius { radius: Float },
    #[error("segment {segment:?} references a node out of the {len} boundary nodes")]
    InvalidSegment { segment: [usize; 2], len: usize },
}

/// Delaunay triangulation of a set of nodes, built by incremental insertion inside a container
/// triangle.
///
/// The live triangles include the ones connected to the container vertices. Queries such as
/// [`Triangulation::get_triangles`] and [`Triangulation::get_edges`] filter them out.
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// Node identity is the index in this list
    nodes: Vec<Node>,
    triangles: Vec<Triangle>,
    container: Option<[Node; 3]>,
    /// Bounding box of the input nodes (built with, or added with [`Triangulation::add_point`])
    input_bounds: Option<BoundingBox>,
    config: TriangulationConfiguration,

    #[cfg(feature = "debug_context")]
    pub debug_context: DebugContext,
}

/// Builds and computes the Delaunay triangulation of `vertices`
pub fn triangulation_from_2d_vertices<T: Vertex2d>(
    vertices: &[T],
    config: TriangulationConfiguration,
) -> Result<Triangulation, TriangulationError> {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "triangulation_from_2d_vertices").entered();

    let mut triangulation = Triangulation::build(vertices, config)?;
    triangulation.compute()?;
    Ok(triangulation)
}

impl Triangulation {
    /// Creates the nodes from `vertices` (identity = index), without triangulating them.
    ///
    /// Fails with [`TriangulationError::NonFiniteCoordinate`] on NaN or infinite coordinates.
    pub fn build<T: Vertex2d>(
        vertices: &[T],
        config: TriangulationConfiguration,
    ) -> Result<Self, TriangulationError> {
        validate_points(vertices)?;

        let nodes: Vec<Node> = vertices
            .iter()
            .enumerate()
            .map(|(index, v)| Node::from_point(v.to_point(), index as NodeId))
            .collect();
        let input_bounds = bounding_box(nodes.iter().map(|n| n.point));

        Ok(Self {
            nodes,
            triangles: Vec::new(),
            container: None,
            input_bounds,
            #[cfg(feature = "debug_context")]
            debug_context: DebugContext::new(config.debug_config.clone()),
            config,
        })
    }

    /// Container triangle enclosing all the current nodes. [`None`] if there are no nodes.
    pub fn super_triangle(&self) -> Result<Option<Triangle>, TriangulationError> {
        let Some(bounds) = bounding_box(self.nodes.iter().map(|n| n.point)) else {
            return Ok(None);
        };
        let [v1, v2, v3] = container_nodes(&bounds, self.config.container_margin);
        Triangle::new(v1, v2, v3).map(Some)
    }

    /// Triangulates all the nodes from scratch, in their identity order.
    ///
    /// Returns the filtered triangles as identity triples, in canonical order. On error, the
    /// triangulation is left empty.
    pub fn compute(&mut self) -> Result<Vec<[NodeId; 3]>, TriangulationError> {
        #[cfg(feature = "profile_traces")]
        let _span = span!(Level::TRACE, "compute").entered();

        self.triangles.clear();
        self.container = None;
        #[cfg(feature = "debug_context")]
        self.debug_context.reset();

        let Some(container_triangle) = self.super_triangle()? else {
            return Ok(Vec::new());
        };
        self.container = Some(*container_triangle.nodes());
        self.triangles.reserve(2 * self.nodes.len() + 1);
        self.triangles.push(container_triangle);

        #[cfg(feature = "debug_context")]
        self.debug_context.push_snapshot(
            Phase::ContainerTriangle,
            &self.triangles,
            &[container_triangle],
            None,
        );

        for index in 0..self.nodes.len() {
            #[cfg(feature = "debug_context")]
            {
                let force_end = self.debug_context.advance_step();
                if force_end {
                    break;
                }
            }

            let node = self.nodes[index];
            if let Err(err) = self.insert_node(
                node,
                #[cfg(feature = "debug_context")]
                Phase::CavityInsertion,
            ) {
                error!("Failed to insert node {}: {}", node.id, err);
                self.triangles.clear();
                self.container = None;
                return Err(err);
            }

            #[cfg(feature = "progress_log")]
            {
                if index % ((self.nodes.len() / 50) + 1) == 0 {
                    let progress = 100. * index as f32 / self.nodes.len() as f32;
                    info!(
                        "Triangulation progress, step n°{}, {}%: {}/{}",
                        self.debug_context.current_step,
                        progress,
                        index,
                        self.nodes.len()
                    );
                }
            }
        }

        self.triangles.sort_unstable();

        let filtered = self.filtered_triangles();
        #[cfg(feature = "debug_context")]
        self.debug_context
            .push_snapshot(Phase::FilterTriangles, &filtered, &[], None);

        Ok(filtered.iter().map(|t| t.ids()).collect())
    }

    /// Inserts a new node at (`x`, `y`) in the current triangulation.
    ///
    /// The node is appended (with the next identity) only if the insertion succeeds. Returns the
    /// last triangle created by the insertion.
    pub fn add_point(&mut self, x: Float, y: Float) -> Result<Triangle, TriangulationError> {
        let point = Point::new(x, y);
        if !point.is_finite() {
            return Err(TriangulationError::NonFiniteCoordinate {
                index: self.nodes.len(),
            });
        }
        let (_, triangle) = self.insert_point(
            point,
            #[cfg(feature = "debug_context")]
            Phase::CavityInsertion,
        )?;
        match &mut self.input_bounds {
            Some(bounds) => bounds.extend(point),
            None => {
                self.input_bounds = Some(BoundingBox {
                    min: point,
                    max: point,
                })
            }
        }
        Ok(triangle)
    }

    /// Inserts a new node at `point` and appends it to the nodes if successful. Returns the identity
    /// of the new node and the last triangle created.
    pub(crate) fn insert_point(
        &mut self,
        point: Point,
        #[cfg(feature = "debug_context")] phase: Phase,
    ) -> Result<(NodeId, Triangle), TriangulationError> {
        let id = NodeId::try_from(self.nodes.len()).map_err(|_| {
            TriangulationError::DegenerateInsertion {
                x: point.x,
                y: point.y,
                reason: InsertionFailure::IdOverflow,
            }
        })?;
        let node = Node::from_point(point, id);
        let triangle = self.insert_node(
            node,
            #[cfg(feature = "debug_context")]
            phase,
        )?;
        self.nodes.push(node);
        Ok((id, triangle))
    }

    /// Bowyer-Watson insertion of `node`: removes every triangle whose circumcircle contains the
    /// node, and connects the node to each edge of the boundary of this cavity.
    ///
    /// Nothing is modified if the insertion fails.
    fn insert_node(
        &mut self,
        node: Node,
        #[cfg(feature = "debug_context")] phase: Phase,
    ) -> Result<Triangle, TriangulationError> {
        #[cfg(feature = "more_profile_traces")]
        let _span = span!(Level::TRACE, "insert_node").entered();

        let failure = |reason| TriangulationError::DegenerateInsertion {
            x: node.x(),
            y: node.y(),
            reason,
        };

        match &self.container {
            Some(container) if is_inside_container(container, node.point) => (),
            _ => return Err(failure(InsertionFailure::OutsideContainer)),
        }

        let tolerance = self.config.tolerance;
        let mut in_cavity = Vec::with_capacity(self.triangles.len());
        // Edges of the cavity triangles, in discovery order
        let mut cavity_edges = Vec::new();
        for triangle in self.triangles.iter() {
            let circumscribed = triangle.circumscribe(&node);
            in_cavity.push(circumscribed);
            if !circumscribed {
                continue;
            }
            if let Some(existing) = triangle
                .nodes()
                .iter()
                .find(|n| !n.is_container() && n.coincides(&node, tolerance))
            {
                return Err(failure(InsertionFailure::CoincidentNode(existing.id)));
            }
            cavity_edges.extend_from_slice(triangle.edges());
        }

        if cavity_edges.is_empty() {
            // A node exactly on top of another one is not strictly inside any circumcircle
            if let Some(existing) = self.find_coincident_node(&node) {
                return Err(failure(InsertionFailure::CoincidentNode(existing)));
            }
            return Err(failure(InsertionFailure::EmptyCavity));
        }

        // Edges shared by two cavity triangles are interior to the cavity
        let mut edges_count: HashMap<Edge, u8> = HashMap::with_capacity(cavity_edges.len());
        for edge in cavity_edges.iter() {
            *edges_count.entry(*edge).or_insert(0) += 1;
        }

        let mut fan = Vec::new();
        for edge in cavity_edges.iter() {
            if edges_count.get(edge) != Some(&1) {
                continue;
            }
            let triangle = Triangle::new(node, edge.from(), edge.to())
                .map_err(|_| failure(InsertionFailure::DegenerateFan))?;
            fan.push(triangle);
        }
        let Some(&last_triangle) = fan.last() else {
            return Err(failure(InsertionFailure::NoBoundaryEdges));
        };

        let mut cavity_mask = in_cavity.into_iter();
        self.triangles
            .retain(|_| !cavity_mask.next().unwrap_or(false));

        #[cfg(feature = "debug_context")]
        let created_count = fan.len();

        self.triangles.extend(fan);

        #[cfg(feature = "debug_context")]
        self.debug_context.push_snapshot(
            phase,
            &self.triangles,
            &self.triangles[self.triangles.len() - created_count..],
            Some(node.id),
        );

        Ok(last_triangle)
    }

    /// Returns the identity of an earlier node coinciding with `node`, if any
    fn find_coincident_node(&self, node: &Node) -> Option<NodeId> {
        let earlier_count = (node.id.max(0) as usize).min(self.nodes.len());
        self.nodes[..earlier_count]
            .iter()
            .find(|n| n.coincides(node, self.config.tolerance))
            .map(|n| n.id)
    }

    /// Live triangles without any container vertex, in the live collection order
    pub(crate) fn filtered_triangles(&self) -> Vec<Triangle> {
        #[cfg(feature = "profile_traces")]
        let _span = span!(Level::TRACE, "filtered_triangles").entered();

        #[cfg(feature = "parallel_filtering")]
        if self.triangles.len() > self.config.filter_parallel_tri_count_threshold {
            return self
                .triangles
                .par_iter()
                .with_min_len(self.config.filter_parallel_min_batch_len)
                .filter(|t| !t.has_container_vertex())
                .copied()
                .collect();
        }

        self.triangles
            .iter()
            .filter(|t| !t.has_container_vertex())
            .copied()
            .collect()
    }

    #[inline]
    pub fn get_nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Triangles without any container vertex, in canonical ascending order
    pub fn get_triangles(&self) -> Vec<Triangle> {
        let mut triangles = self.filtered_triangles();
        triangles.sort_unstable();
        triangles
    }

    pub fn get_triangles_index(&self) -> Vec<[NodeId; 3]> {
        self.get_triangles().iter().map(|t| t.ids()).collect()
    }

    /// Edges of the filtered triangles, without duplicates, in canonical ascending order
    pub fn get_edges(&self) -> Vec<Edge> {
        let triangles = self.filtered_triangles();
        let mut unique_edges = HashSet::with_capacity(triangles.len() * 2);
        for triangle in triangles.iter() {
            unique_edges.extend(triangle.edges().iter().copied());
        }
        let mut edges: Vec<Edge> = unique_edges.into_iter().collect();
        edges.sort_unstable();
        edges
    }

    pub fn get_edges_index(&self) -> Vec<[NodeId; 2]> {
        self.get_edges().iter().map(|e| e.ids()).collect()
    }

    /// Live triangles sharing an edge with `triangle`, paired with the shared edge.
    pub fn get_neighbors(&self, triangle: &Triangle) -> ArrayVec<(Triangle, Edge), 3> {
        let mut neighbors = ArrayVec::new();
        for other in self.triangles.iter() {
            if other == triangle {
                continue;
            }
            if let Some(shared) = triangle.edges().iter().find(|e| other.has_edge(e)) {
                neighbors.push((*other, *shared));
                if neighbors.is_full() {
                    break;
                }
            }
        }
        neighbors
    }

    /// Maps each edge of the filtered triangles to the (1 or 2) filtered triangles it belongs to
    pub fn edge_adjacency(&self) -> HashMap<Edge, ArrayVec<Triangle, 2>> {
        let mut adjacency: HashMap<Edge, ArrayVec<Triangle, 2>> = HashMap::new();
        for triangle in self.get_triangles() {
            for edge in triangle.edges() {
                let triangles = adjacency.entry(*edge).or_default();
                if !triangles.is_full() {
                    triangles.push(triangle);
                }
            }
        }
        adjacency
    }

    /// Brute-force check: returns a filtered triangle and a node strictly inside its circumcircle
    /// (beyond the tolerance), if any.
    pub fn find_delaunay_violation(&self) -> Option<(Triangle, Node)> {
        #[cfg(feature = "profile_traces")]
        let _span = span!(Level::TRACE, "find_delaunay_violation").entered();

        for triangle in self.filtered_triangles() {
            for node in self.nodes.iter() {
                if triangle.contains(node.id) {
                    continue;
                }
                let dist = distance(triangle.circumcenter(), node.point);
                if dist < triangle.circumradius() - self.config.tolerance {
                    debug!(
                        "Node {} is inside the circumcircle of triangle {:?}",
                        node.id,
                        triangle.ids()
                    );
                    return Some((triangle, *node));
                }
            }
        }
        None
    }

    pub fn is_delaunay(&self) -> bool {
        self.find_delaunay_violation().is_none()
    }

    /// All the live triangles, including those connected to the container vertices
    #[inline]
    pub fn live_triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Vertices of the container triangle of the last [`Triangulation::compute`]
    #[inline]
    pub fn container(&self) -> Option<&[Node; 3]> {
        self.container.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &TriangulationConfiguration {
        &self.config
    }

    #[inline]
    pub(crate) fn input_bounds(&self) -> Option<BoundingBox> {
        self.input_bounds
    }
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::{
        container::is_inside_container,
        triangulation::{
            InsertionFailure, Triangulation, TriangulationConfiguration, TriangulationError,
        },
        types::{Float, NodeId, Point},
    };

    fn triangulation(vertices: &[[Float; 2]]) -> Triangulation {
        let mut triangulation =
            Triangulation::build(vertices, TriangulationConfiguration::default())
                .expect("Vertices should be valid");
        triangulation
            .compute()
            .expect("Triangulation should succeed");
        triangulation
    }

    #[test]
    fn empty_triangulation() {
        let mut triangulation =
            Triangulation::build::<Point>(&[], TriangulationConfiguration::default())
                .expect("No vertices is valid");

        assert_eq!(None, triangulation.super_triangle().expect("No error"));
        assert_eq!(
            Vec::<[NodeId; 3]>::new(),
            triangulation.compute().expect("Triangulation should succeed")
        );
        assert!(triangulation.get_edges().is_empty());
        assert!(triangulation.container().is_none());
    }

    #[test]
    fn single_node() {
        let triangulation = triangulation(&[[2., 3.]]);

        assert_eq!(3, triangulation.live_triangles().len());
        assert!(triangulation.get_triangles().is_empty());
        assert!(triangulation.get_edges().is_empty());
    }

    #[test]
    fn super_triangle_encloses_the_nodes() {
        let vertices = [[1., 4.], [3., 2.], [5., 8.], [-10., 0.]];
        let triangulation = Triangulation::build(&vertices, TriangulationConfiguration::default())
            .expect("Vertices should be valid");

        let container = triangulation
            .super_triangle()
            .expect("No error")
            .expect("There are nodes");
        assert_eq!([-3, -2, -1], container.ids());
        for v in vertices {
            assert!(is_inside_container(
                container.nodes(),
                Point::from_array(v)
            ));
        }
    }

    #[test]
    fn non_finite_vertices_are_rejected() {
        let result = Triangulation::build(
            &[[0., 0.], [1., Float::NAN]],
            TriangulationConfiguration::default(),
        );

        assert_eq!(
            Some(TriangulationError::NonFiniteCoordinate { index: 1 }),
            result.err()
        );
    }

    #[test]
    fn add_point_inside() {
        let mut triangulation = triangulation(&[[0., 0.], [4., 0.], [0., 4.]]);

        let triangle = triangulation
            .add_point(1., 1.)
            .expect("Insertion should succeed");

        assert!(triangle.contains(3));
        assert_eq!(4, triangulation.get_nodes().len());
        assert_eq!(
            vec![[0, 1, 3], [0, 2, 3], [1, 2, 3]],
            triangulation.get_triangles_index()
        );
        assert!(triangulation.is_delaunay());
    }

    #[test]
    fn add_point_before_compute() {
        let mut triangulation =
            Triangulation::build(&[[0., 0.], [4., 0.]], TriangulationConfiguration::default())
                .expect("Vertices should be valid");

        assert_eq!(
            Err(TriangulationError::DegenerateInsertion {
                x: 1.,
                y: 1.,
                reason: InsertionFailure::OutsideContainer
            }),
            triangulation.add_point(1., 1.)
        );
        assert_eq!(2, triangulation.get_nodes().len());
    }

    #[test]
    fn add_point_outside_container() {
        let mut triangulation = triangulation(&[[0., 0.], [4., 0.], [0., 4.]]);
        let live_before = triangulation.live_triangles().to_vec();

        let result = triangulation.add_point(1000., 1000.);

        assert_eq!(
            Err(TriangulationError::DegenerateInsertion {
                x: 1000.,
                y: 1000.,
                reason: InsertionFailure::OutsideContainer
            }),
            result
        );
        assert_eq!(3, triangulation.get_nodes().len());
        assert_eq!(live_before, triangulation.live_triangles());
    }

    #[test]
    fn add_coincident_point() {
        let mut triangulation = triangulation(&[[0., 0.], [4., 0.], [0., 4.]]);
        let live_before = triangulation.live_triangles().to_vec();

        assert_eq!(
            Err(TriangulationError::DegenerateInsertion {
                x: 4.,
                y: 0.,
                reason: InsertionFailure::CoincidentNode(1)
            }),
            triangulation.add_point(4., 0.)
        );
        assert_eq!(
            Err(TriangulationError::DegenerateInsertion {
                x: 4. + 1e-12,
                y: 0.,
                reason: InsertionFailure::CoincidentNode(1)
            }),
            triangulation.add_point(4. + 1e-12, 0.)
        );
        assert_eq!(3, triangulation.get_nodes().len());
        assert_eq!(live_before, triangulation.live_triangles());
    }

    #[test]
    fn add_non_finite_point() {
        let mut triangulation = triangulation(&[[0., 0.], [4., 0.], [0., 4.]]);

        assert_eq!(
            Err(TriangulationError::NonFiniteCoordinate { index: 3 }),
            triangulation.add_point(Float::INFINITY, 0.)
        );
    }

    #[test]
    fn duplicated_input_fails() {
        let mut triangulation = Triangulation::build(
            &[[0., 0.], [4., 0.], [0., 4.], [4., 0.]],
            TriangulationConfiguration::default(),
        )
        .expect("Vertices should be valid");

        assert_eq!(
            Err(TriangulationError::DegenerateInsertion {
                x: 4.,
                y: 0.,
                reason: InsertionFailure::CoincidentNode(1)
            }),
            triangulation.compute()
        );
        assert!(triangulation.live_triangles().is_empty());
        assert!(triangulation.container().is_none());
    }

    #[test]
    fn neighbors() {
        // 2 ----- 3
        // |  \    |
        // |    \  |
        // 0 ----- 1
        let triangulation = triangulation(&[[0., 0.], [4., 0.5], [0.5, 3.], [4., 4.]]);
        assert_eq!(
            vec![[0, 1, 2], [1, 2, 3]],
            triangulation.get_triangles_index()
        );

        let triangles = triangulation.get_triangles();
        let neighbors = triangulation.get_neighbors(&triangles[0]);

        assert_eq!(3, neighbors.len());
        assert!(neighbors
            .iter()
            .any(|(t, e)| *t == triangles[1] && e.ids() == [1, 2]));
        for (neighbor, edge) in neighbors.iter() {
            assert!(neighbor.has_edge(edge));
            assert!(triangles[0].has_edge(edge));
        }
    }

    #[test]
    fn edge_adjacency() {
        let triangulation = triangulation(&[[0., 0.], [4., 0.5], [0.5, 3.], [4., 4.]]);

        let adjacency = triangulation.edge_adjacency();

        assert_eq!(5, adjacency.len());
        let interior: Vec<[NodeId; 2]> = adjacency
            .iter()
            .filter(|(_, triangles)| triangles.len() == 2)
            .map(|(edge, _)| edge.ids())
            .collect();
        assert_eq!(vec![[1, 2]], interior);
    }

    #[test]
    fn recompute_after_insertions() {
        let mut triangulation = triangulation(&[[0., 0.], [4., 0.5], [0.5, 3.], [4., 4.]]);
        triangulation
            .add_point(2., 2.)
            .expect("Insertion should succeed");
        triangulation
            .add_point(3., 1.)
            .expect("Insertion should succeed");
        let incremental = triangulation.get_triangles_index();

        let recomputed = triangulation
            .compute()
            .expect("Triangulation should succeed");

        assert_eq!(incremental, recomputed);
        assert!(triangulation.is_delaunay());
    }
}
