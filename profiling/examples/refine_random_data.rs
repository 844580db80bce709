use ghx_delaunay_mesher::triangulation::TriangulationConfiguration;
use ghx_delaunay_mesher::triangulation_from_2d_vertices;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, Registry};
use tracing_tracy::TracyLayer;

pub const SEED: &[u8; 32] = b"\x3a\x91\x0c\x5e\xd4\x17\x6b\x22\xe8\x4f\x90\x03\xb7\x5d\x61\xaa
\x0e\x7c\x38\x9d\xf1\x26\x44\xc0\x1b\x85\x6e\xd9\x52\x0f\xb3";

pub fn walk_f64() -> impl Iterator<Item = [f64; 2]> {
    random_walk_distribution(1.0, *SEED)
}

pub fn random_walk_distribution(step_size: f64, seed: [u8; 32]) -> impl Iterator<Item = [f64; 2]> {
    let range = rand::distributions::Uniform::new_inclusive(-step_size, step_size);
    let mut last_x = 0.;
    let mut last_y = 1.;

    let mut rng = StdRng::from_seed(seed);
    let step_fn = move || {
        last_x = last_x + rng.sample(range);
        last_y = last_y + rng.sample(range);

        Some([last_x, last_y])
    };
    core::iter::from_fn(step_fn)
}

const VERTICES_COUNT: usize = 1_000;
const MIN_ANGLE_DEGREES: f64 = 20.;
const MAX_EDGE: f64 = 1.;

fn main() {
    let subscriber = Registry::default().with(TracyLayer::default());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let vertices: Vec<[f64; 2]> = walk_f64().take(VERTICES_COUNT).collect();

    let mut triangulation = triangulation_from_2d_vertices(
        &vertices,
        TriangulationConfiguration {
            max_refinement_steps: 20_000,
            ..Default::default()
        },
    )
    .expect("Triangulation should succeed");

    let report = triangulation
        .refine(MIN_ANGLE_DEGREES.to_radians(), MAX_EDGE)
        .expect("Refinement should succeed");

    tracing::info!(
        "Angle phase: {:?}, size phase: {:?}, {} Steiner points in {} steps",
        report.angle_phase,
        report.size_phase,
        report.inserted_nodes.len(),
        report.steps
    );
}
