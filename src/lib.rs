pub mod container;
pub mod mesh;
pub mod refinement;
pub mod triangulation;
pub mod types;
pub mod utils;

#[cfg(feature = "debug_context")]
pub mod debug;

pub use glam;
pub use hashbrown;

pub use mesh::{Boundary, Mesh};
pub use refinement::{PhaseOutcome, RefinementReport};
pub use triangulation::{
    triangulation_from_2d_vertices, InsertionFailure, Triangulation, TriangulationConfiguration,
    TriangulationError,
};

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
