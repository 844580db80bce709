use ghx_delaunay_mesher::glam::DVec2;
use ghx_delaunay_mesher::triangulation::{TriangulationConfiguration, DEFAULT_TOLERANCE};
use ghx_delaunay_mesher::{Boundary, Mesh};
use tracing_subscriber::{layer::SubscriberExt, Registry};
use tracing_tracy::TracyLayer;

const CHANNEL_LENGTH: f64 = 10.;
const CHANNEL_WIDTH: f64 = 5.;
const CYLINDER_RADIUS: f64 = 1.;
const WALL_SPACING: f64 = 0.5;
const CYLINDER_SPACING: f64 = 0.2;

fn main() {
    let subscriber = Registry::default().with(TracyLayer::default());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let (half_length, half_width) = (CHANNEL_LENGTH / 2., CHANNEL_WIDTH / 2.);
    let corners = [
        DVec2::new(-half_length, -half_width),
        DVec2::new(half_length, -half_width),
        DVec2::new(half_length, half_width),
        DVec2::new(-half_length, half_width),
    ];

    let mut parts = Vec::new();
    for i in 0..corners.len() {
        parts.push(
            Boundary::line(corners[i], corners[(i + 1) % corners.len()], WALL_SPACING)
                .expect("Wall should be valid"),
        );
    }
    parts.push(
        Boundary::circle(DVec2::ZERO, CYLINDER_RADIUS, CYLINDER_SPACING)
            .expect("Cylinder should be valid"),
    );
    let boundary = Boundary::combine_all(&parts, DEFAULT_TOLERANCE);

    let mesh = Mesh::generate(
        boundary,
        WALL_SPACING,
        TriangulationConfiguration {
            max_refinement_steps: 20_000,
            ..Default::default()
        },
    )
    .expect("Mesh generation should succeed");

    tracing::info!(
        "{} triangles, {} nodes, {} edges. Refinement: {:?} / {:?}",
        mesh.triangles().len(),
        mesh.nodes().len(),
        mesh.edges().len(),
        mesh.report().angle_phase,
        mesh.report().size_phase
    );
}
