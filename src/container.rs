use crate::{
    types::{Float, Node, NodeId, Point, VERT_1, VERT_2, VERT_3},
    utils::{is_point_in_triangle, BoundingBox},
};

#[cfg(feature = "more_profile_traces")]
use tracing::{span, Level};

pub const CONTAINER_V1_ID: NodeId = -1;
pub const CONTAINER_V2_ID: NodeId = -2;
pub const CONTAINER_V3_ID: NodeId = -3;

/// Each side of the input bounding box is pushed away by this factor of its largest extent before
/// building the container triangle around it.
pub const DEFAULT_CONTAINER_MARGIN: Float = 3.;

#[inline]
/// From a node id, returns true if it represents a vertex of the container triangle
pub fn is_container_id(node_id: NodeId) -> bool {
    node_id < 0
}

/// Returns the 3 vertices of a triangle enclosing `bounds` inflated by `margin` times its largest extent.
///
/// A zero extent (single point) is replaced by a unit extent.
pub fn container_nodes(bounds: &BoundingBox, margin: Float) -> [Node; 3] {
    #[cfg(feature = "more_profile_traces")]
    let _span = span!(Level::TRACE, "container_nodes").entered();

    let extent = bounds.extent();
    let mut span = extent.x.max(extent.y);
    if span <= 0. {
        span = 1.;
    }
    let inflation = Point::splat(margin.max(0.) * span);
    let (min, max) = (bounds.min - inflation, bounds.max + inflation);
    let (width, height) = (max.x - min.x, max.y - min.y);
    let center_x = 0.5 * (min.x + max.x);

    [
        Node::new(min.x - width, min.y - height, CONTAINER_V1_ID),
        Node::new(max.x + width, min.y - height, CONTAINER_V2_ID),
        Node::new(center_x, max.y + 2. * height, CONTAINER_V3_ID),
    ]
}

/// Returns `true` if `point` is strictly inside the container triangle
#[inline]
pub fn is_inside_container(container: &[Node; 3], point: Point) -> bool {
    is_point_in_triangle(
        point,
        container[VERT_1 as usize].point,
        container[VERT_2 as usize].point,
        container[VERT_3 as usize].point,
    )
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
