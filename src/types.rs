use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use glam::DVec2;

use crate::container::is_container_id;
use crate::triangulation::TriangulationError;
use crate::utils::{
    circumcenter, distance, midpoint, perpendicular_bisector, points_coincide, slope, Line,
};

pub mod vertex;
pub use vertex::Vertex2d;

/// The float type used in the algorithm's computations
pub type Float = f64;
/// The point type used in the algorithm's computations
pub type Point = DVec2;

#[cfg(not(feature = "i64_ids"))]
pub type IndexType = i32;
#[cfg(feature = "i64_ids")]
pub type IndexType = i64;

/// Identity of a node. Real nodes are non-negative, container nodes are negative.
pub type NodeId = IndexType;

pub type TriangleVertexIndex = u8;
pub const VERT_1: TriangleVertexIndex = 0;
pub const VERT_2: TriangleVertexIndex = 1;
pub const VERT_3: TriangleVertexIndex = 2;

pub type EdgeVertexIndex = u8;
pub const EDGE_FROM: EdgeVertexIndex = 0;
pub const EDGE_TO: EdgeVertexIndex = 1;

pub type TriangleEdgeIndex = u8;
pub const EDGE_12: TriangleEdgeIndex = 0;
pub const EDGE_13: TriangleEdgeIndex = 1;
pub const EDGE_23: TriangleEdgeIndex = 2;

/// From a TriangleEdgeIndex, gives the corresponding pair of TriangleVertexIndex.
///
/// Pairs are listed so that the edges of a canonical triangle are themselves in canonical order.
pub const EDGE_TO_VERTS: [[TriangleVertexIndex; 2]; 3] =
    [[VERT_1, VERT_2], [VERT_1, VERT_3], [VERT_2, VERT_3]];

/// A point with a stable identity.
///
/// Equality, ordering and hashing only consider the identity. Use [`Node::coincides`] to compare positions.
#[derive(Debug, Copy, Clone)]
pub struct Node {
    pub point: Point,
    pub id: NodeId,
}

impl Node {
    #[inline]
    pub fn new(x: Float, y: Float, id: NodeId) -> Self {
        Self {
            point: Point::new(x, y),
            id,
        }
    }

    #[inline]
    pub fn from_point(point: Point, id: NodeId) -> Self {
        Self { point, id }
    }

    #[inline]
    pub fn x(&self) -> Float {
        self.point.x
    }
    #[inline]
    pub fn y(&self) -> Float {
        self.point.y
    }

    /// Returns `true` for the synthetic vertices of the container triangle
    #[inline]
    pub fn is_container(&self) -> bool {
        is_container_id(self.id)
    }

    /// Returns `true` if both nodes are at the same position, within `tolerance` on each axis
    #[inline]
    pub fn coincides(&self, other: &Node, tolerance: Float) -> bool {
        points_coincide(self.point, other.point, tolerance)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Node {}
impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// Unordered pair of nodes, stored with the lowest identity first.
///
/// An edge and its reverse compare and hash identically.
#[derive(Debug, Copy, Clone)]
pub struct Edge {
    nodes: [Node; 2],
}

impl Edge {
    #[inline]
    pub fn new(a: Node, b: Node) -> Self {
        if a.id <= b.id {
            Self { nodes: [a, b] }
        } else {
            Self { nodes: [b, a] }
        }
    }

    #[inline]
    pub fn from(&self) -> Node {
        self.nodes[EDGE_FROM as usize]
    }
    #[inline]
    pub fn to(&self) -> Node {
        self.nodes[EDGE_TO as usize]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node; 2] {
        &self.nodes
    }

    #[inline]
    pub fn ids(&self) -> [NodeId; 2] {
        [self.nodes[0].id, self.nodes[1].id]
    }

    pub fn vertex(&self, index: usize) -> Result<Node, TriangulationError> {
        self.nodes
            .get(index)
            .copied()
            .ok_or(TriangulationError::IndexOutOfRange {
                entity: "edge",
                index,
                len: self.nodes.len(),
            })
    }

    #[inline]
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes[0].id == node_id || self.nodes[1].id == node_id
    }

    /// Returns `true` if one of the nodes is a container node
    #[inline]
    pub fn touches_container(&self) -> bool {
        self.nodes[0].is_container() || self.nodes[1].is_container()
    }

    #[inline]
    pub fn length(&self) -> Float {
        distance(self.from().point, self.to().point)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        midpoint(self.from().point, self.to().point)
    }

    #[inline]
    pub fn slope(&self) -> Float {
        slope(self.from().point, self.to().point)
    }

    /// Line through the midpoint, with the negative reciprocal of the edge slope.
    ///
    /// [`None`] if both ends are at the same position.
    pub fn perpendicular_bisector(&self) -> Option<Line> {
        perpendicular_bisector(self.from().point, self.to().point)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.ids() == other.ids()
    }
}
impl Eq for Edge {}
impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ids().hash(state);
    }
}
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids().cmp(&other.ids())
    }
}

/// Triangle with its vertices sorted by identity.
///
/// Edges, circumcenter and circumradius are computed once at construction. Equality, ordering and
/// hashing only consider the identity triple.
#[derive(Debug, Copy, Clone)]
pub struct Triangle {
    nodes: [Node; 3],
    edges: [Edge; 3],
    circumcenter: Point,
    circumradius: Float,
}

impl Triangle {
    /// Fails with [`TriangulationError::DegenerateGeometry`] if two vertices share an identity or if
    /// the vertices are collinear (no circumcenter).
    pub fn new(a: Node, b: Node, c: Node) -> Result<Self, TriangulationError> {
        let mut nodes = [a, b, c];
        nodes.sort_unstable();
        let ids = [nodes[0].id, nodes[1].id, nodes[2].id];
        if ids[0] == ids[1] || ids[1] == ids[2] {
            return Err(TriangulationError::DegenerateGeometry { ids });
        }

        let edges = EDGE_TO_VERTS.map(|[v1, v2]| Edge::new(nodes[v1 as usize], nodes[v2 as usize]));

        let center = circumcenter(
            nodes[VERT_1 as usize].point,
            nodes[VERT_2 as usize].point,
            nodes[VERT_3 as usize].point,
        )
        .ok_or(TriangulationError::DegenerateGeometry { ids })?;

        Ok(Self {
            nodes,
            edges,
            circumcenter: center,
            circumradius: distance(center, nodes[VERT_1 as usize].point),
        })
    }

    #[inline]
    pub fn v1(&self) -> Node {
        self.nodes[VERT_1 as usize]
    }
    #[inline]
    pub fn v2(&self) -> Node {
        self.nodes[VERT_2 as usize]
    }
    #[inline]
    pub fn v3(&self) -> Node {
        self.nodes[VERT_3 as usize]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node; 3] {
        &self.nodes
    }

    #[inline]
    pub fn ids(&self) -> [NodeId; 3] {
        [self.nodes[0].id, self.nodes[1].id, self.nodes[2].id]
    }

    pub fn vertex(&self, index: usize) -> Result<Node, TriangulationError> {
        self.nodes
            .get(index)
            .copied()
            .ok_or(TriangulationError::IndexOutOfRange {
                entity: "triangle",
                index,
                len: self.nodes.len(),
            })
    }

    #[inline]
    pub fn edges(&self) -> &[Edge; 3] {
        &self.edges
    }

    #[inline]
    pub fn edge(&self, edge_index: TriangleEdgeIndex) -> Edge {
        self.edges[edge_index as usize]
    }

    #[inline]
    pub fn has_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    #[inline]
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == node_id)
    }

    /// Returns `true` if one of the vertices is a container node
    #[inline]
    pub fn has_container_vertex(&self) -> bool {
        // Nodes are sorted, container ids are the negative ones
        self.nodes[VERT_1 as usize].is_container()
    }

    #[inline]
    pub fn circumcenter(&self) -> Point {
        self.circumcenter
    }

    #[inline]
    pub fn circumradius(&self) -> Float {
        self.circumradius
    }

    /// Returns `true` if `node` is strictly inside the circumcircle. A node on the circle is outside.
    #[inline]
    pub fn circumscribe(&self, node: &Node) -> bool {
        self.circumscribe_point(node.point)
    }

    #[inline]
    pub fn circumscribe_point(&self, point: Point) -> bool {
        distance(self.circumcenter, point) < self.circumradius
    }

    /// Edge lengths, sorted in ascending order
    pub fn edge_lengths(&self) -> [Float; 3] {
        let mut lengths = self.edges.map(|e| e.length());
        lengths.sort_unstable_by(|a, b| a.total_cmp(b));
        lengths
    }

    /// Smallest interior angle, in radians.
    ///
    /// Law of cosines on the angle opposite to the shortest edge.
    pub fn alpha(&self) -> Float {
        let [a, b, c] = self.edge_lengths();
        let cos_alpha = (b * b + c * c - a * a) / (2. * b * c);
        cos_alpha.clamp(-1., 1.).acos()
    }

    /// Heron's formula, with the edge lengths ordered for numerical stability (a >= b >= c)
    pub fn area(&self) -> Float {
        let [c, b, a] = self.edge_lengths();
        let product = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
        0.25 * product.max(0.).sqrt()
    }

    #[inline]
    pub fn centroid(&self) -> Point {
        (self.nodes[0].point + self.nodes[1].point + self.nodes[2].point) / 3.
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.ids() == other.ids()
    }
}
impl Eq for Triangle {}
impl Hash for Triangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ids().hash(state);
    }
}
impl PartialOrd for Triangle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Triangle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids().cmp(&other.ids())
    }
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
