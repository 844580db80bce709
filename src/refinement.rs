use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::triangulation::{Triangulation, TriangulationError};
use crate::types::{Float, NodeId, Triangle};

#[cfg(feature = "progress_log")]
use tracing::info;

#[cfg(feature = "debug_context")]
use crate::debug::Phase;

#[cfg(feature = "profile_traces")]
use tracing::{span, Level};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RefinementPhase {
    /// Inserts circumcenters of triangles with a small minimum angle
    Angle,
    /// Inserts circumcenters of triangles with a large area
    Size,
}

/// How a refinement phase ended
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// No bad triangle left
    Converged,
    /// Every remaining bad triangle was skipped: its circumcenter could not be inserted
    Stalled { remaining: usize },
    /// The refinement steps budget ran out with bad triangles left
    AbortedByBudget { remaining: usize },
}

impl PhaseOutcome {
    #[inline]
    pub fn converged(&self) -> bool {
        matches!(self, PhaseOutcome::Converged)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementReport {
    pub angle_phase: PhaseOutcome,
    pub size_phase: PhaseOutcome,
    /// Identities of the inserted Steiner nodes, in insertion order
    pub inserted_nodes: Vec<NodeId>,
    /// Number of candidate circumcenters that were rejected
    pub skipped_candidates: usize,
    /// Number of refinement passes used, over all the rounds
    pub steps: usize,
    /// Number of angle then size rounds
    pub rounds: usize,
    /// Filtered triangles after the refinement, as identity triples in canonical order
    pub triangles: Vec<[NodeId; 3]>,
}

impl RefinementReport {
    /// Returns `true` if both phases ended without any bad triangle
    pub fn converged(&self) -> bool {
        self.angle_phase.converged() && self.size_phase.converged()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum QualityCriterion {
    /// Bad if the smallest angle is below (radians)
    MinAngle(Float),
    /// Bad if the area is above
    MaxArea(Float),
}

impl QualityCriterion {
    /// Badness of `triangle`. [`None`] if it satisfies the criterion, else a positive value, the
    /// greater the worse.
    #[inline]
    fn badness(&self, triangle: &Triangle) -> Option<Float> {
        match *self {
            QualityCriterion::MinAngle(min_angle) => {
                let alpha = triangle.alpha();
                (alpha < min_angle).then_some(min_angle - alpha)
            }
            QualityCriterion::MaxArea(max_area) => {
                let area = triangle.area();
                (area > max_area).then_some(area)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RefinementState {
    Scanning,
    /// Bad triangles, worst first
    Inserting(Vec<Triangle>),
    Done(PhaseOutcome),
}

/// Bookkeeping shared by all the phases of all the rounds
struct RefinementRun {
    budget: usize,
    steps: usize,
    inserted_nodes: Vec<NodeId>,
    skipped_candidates: usize,
}

impl Triangulation {
    /// Inserts Steiner points (circumcenters) until every filtered triangle has a minimum angle of at
    /// least `min_angle` (radians), then until every filtered triangle has an area of at most
    /// `0.5 * max_edge²`.
    ///
    /// Insertions of the size phase can create new small angles, so the angle phase and the size
    /// phase are repeated in rounds until a size phase inserts nothing. The outcomes of the report
    /// are those of the last round and hold for the final triangulation.
    ///
    /// Each phase ends when no bad triangle is left, when none of the bad triangles can be refined,
    /// or when the `max_refinement_steps` budget of the configuration (shared by all the rounds) is
    /// exhausted. The report tells which one happened. Use [`Float::INFINITY`] as `max_edge` to only
    /// enforce the angle.
    ///
    /// With `confine_steiner_points` (the default), an unconstrained point cloud normally ends with
    /// a [`PhaseOutcome::Stalled`] angle phase: the slivers along its convex hull have their
    /// circumcenters outside of the input bounds and are never refined.
    ///
    /// Only [`TriangulationError::InvalidRefinementParameters`] or an unexpected error during an
    /// insertion are returned as errors. Rejected insertions are skipped.
    pub fn refine(
        &mut self,
        min_angle: Float,
        max_edge: Float,
    ) -> Result<RefinementReport, TriangulationError> {
        #[cfg(feature = "profile_traces")]
        let _span = span!(Level::TRACE, "refine").entered();

        if !min_angle.is_finite() || min_angle < 0. || max_edge.is_nan() || max_edge <= 0. {
            return Err(TriangulationError::InvalidRefinementParameters {
                min_angle,
                max_edge,
            });
        }

        let mut run = RefinementRun {
            budget: self.config().max_refinement_steps,
            steps: 0,
            inserted_nodes: Vec::new(),
            skipped_candidates: 0,
        };

        let mut rounds = 0;
        let (angle_phase, size_phase) = loop {
            rounds += 1;
            let angle_phase = self.run_refinement_phase(
                RefinementPhase::Angle,
                QualityCriterion::MinAngle(min_angle),
                &mut run,
            )?;
            let inserted_before_size = run.inserted_nodes.len();
            let size_phase = self.run_refinement_phase(
                RefinementPhase::Size,
                QualityCriterion::MaxArea(0.5 * max_edge * max_edge),
                &mut run,
            )?;
            // Nothing changed since the angle phase: both outcomes hold
            if run.inserted_nodes.len() == inserted_before_size {
                break (angle_phase, size_phase);
            }
            debug!(
                "Refinement round {} inserted {} nodes during the size phase",
                rounds,
                run.inserted_nodes.len() - inserted_before_size
            );
        };

        debug!(
            "Refinement done in {} rounds and {} steps, {} nodes inserted, {} candidates skipped",
            rounds,
            run.steps,
            run.inserted_nodes.len(),
            run.skipped_candidates
        );

        Ok(RefinementReport {
            angle_phase,
            size_phase,
            inserted_nodes: run.inserted_nodes,
            skipped_candidates: run.skipped_candidates,
            steps: run.steps,
            rounds,
            triangles: self.get_triangles_index(),
        })
    }

    fn run_refinement_phase(
        &mut self,
        phase: RefinementPhase,
        criterion: QualityCriterion,
        run: &mut RefinementRun,
    ) -> Result<PhaseOutcome, TriangulationError> {
        #[cfg(feature = "profile_traces")]
        let _span = span!(Level::TRACE, "run_refinement_phase").entered();

        let mut state = RefinementState::Scanning;
        loop {
            state = match state {
                RefinementState::Scanning => {
                    let candidates = self.bad_triangles(criterion);
                    if candidates.is_empty() {
                        RefinementState::Done(PhaseOutcome::Converged)
                    } else if run.steps >= run.budget {
                        warn!(
                            "{:?} refinement aborted: budget of {} steps exhausted with {} bad triangles left",
                            phase,
                            run.budget,
                            candidates.len()
                        );
                        RefinementState::Done(PhaseOutcome::AbortedByBudget {
                            remaining: candidates.len(),
                        })
                    } else {
                        RefinementState::Inserting(candidates)
                    }
                }
                RefinementState::Inserting(candidates) => {
                    run.steps += 1;
                    match self.refine_one(phase, &candidates, run)? {
                        Some(node_id) => {
                            run.inserted_nodes.push(node_id);
                            #[cfg(feature = "progress_log")]
                            {
                                if run.steps % 100 == 0 {
                                    info!(
                                        "{:?} refinement progress, step n°{}: {} bad triangles, {} nodes",
                                        phase,
                                        run.steps,
                                        candidates.len(),
                                        self.get_nodes().len()
                                    );
                                }
                            }
                            RefinementState::Scanning
                        }
                        None => {
                            warn!(
                                "{:?} refinement stalled: none of the {} bad triangles can be refined",
                                phase,
                                candidates.len()
                            );
                            RefinementState::Done(PhaseOutcome::Stalled {
                                remaining: candidates.len(),
                            })
                        }
                    }
                }
                RefinementState::Done(outcome) => return Ok(outcome),
            };
        }
    }

    /// Filtered triangles failing `criterion`, worst first
    fn bad_triangles(&self, criterion: QualityCriterion) -> Vec<Triangle> {
        let mut bad: Vec<(Float, Triangle)> = self
            .filtered_triangles()
            .into_iter()
            .filter_map(|t| criterion.badness(&t).map(|badness| (badness, t)))
            .collect();
        bad.sort_unstable_by(|(badness_a, a), (badness_b, b)| {
            match badness_b.total_cmp(badness_a) {
                Ordering::Equal => a.cmp(b),
                ordering => ordering,
            }
        });
        bad.into_iter().map(|(_, t)| t).collect()
    }

    /// Inserts the circumcenter of the first candidate that accepts it. Returns the inserted node
    /// identity, or [`None`] if every candidate was skipped.
    fn refine_one(
        &mut self,
        _phase: RefinementPhase,
        candidates: &[Triangle],
        run: &mut RefinementRun,
    ) -> Result<Option<NodeId>, TriangulationError> {
        #[cfg(feature = "more_profile_traces")]
        let _span = span!(Level::TRACE, "refine_one").entered();

        #[cfg(feature = "debug_context")]
        {
            if self.debug_context.advance_step() {
                return Ok(None);
            }
        }

        let confinement = match self.config().confine_steiner_points {
            true => self.input_bounds(),
            false => None,
        };
        let tolerance = self.config().tolerance;

        for candidate in candidates {
            let center = candidate.circumcenter();
            if let Some(bounds) = confinement {
                if !bounds.contains(center, tolerance) {
                    debug!(
                        "Skipped triangle {:?}: circumcenter {} is out of the input bounds",
                        candidate.ids(),
                        center
                    );
                    run.skipped_candidates += 1;
                    continue;
                }
            }

            match self.insert_point(
                center,
                #[cfg(feature = "debug_context")]
                match _phase {
                    RefinementPhase::Angle => Phase::AngleRefinement,
                    RefinementPhase::Size => Phase::SizeRefinement,
                },
            ) {
                Ok((node_id, _)) => return Ok(Some(node_id)),
                Err(err @ TriangulationError::DegenerateInsertion { .. }) => {
                    debug!("Skipped triangle {:?}: {}", candidate.ids(), err);
                    run.skipped_candidates += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use crate::{
        refinement::{PhaseOutcome, RefinementReport},
        triangulation::{Triangulation, TriangulationConfiguration, TriangulationError},
        types::Float,
    };

    const DEG: Float = PI / 180.;

    fn triangulation(vertices: &[[Float; 2]], config: TriangulationConfiguration) -> Triangulation {
        let mut triangulation =
            Triangulation::build(vertices, config).expect("Vertices should be valid");
        triangulation
            .compute()
            .expect("Triangulation should succeed");
        triangulation
    }

    /// Checks that the outcomes of `report` match the bad triangles of the final triangulation
    fn assert_outcomes_hold(
        triangulation: &Triangulation,
        report: &RefinementReport,
        min_angle: Float,
        max_edge: Float,
    ) {
        let triangles = triangulation.get_triangles();
        let too_sharp = triangles.iter().filter(|t| t.alpha() < min_angle).count();
        let too_large = triangles
            .iter()
            .filter(|t| t.area() > 0.5 * max_edge * max_edge)
            .count();
        for (outcome, bad_count) in [
            (report.angle_phase, too_sharp),
            (report.size_phase, too_large),
        ] {
            match outcome {
                PhaseOutcome::Converged => assert_eq!(0, bad_count, "{report:?}"),
                PhaseOutcome::Stalled { remaining }
                | PhaseOutcome::AbortedByBudget { remaining } => {
                    assert_eq!(bad_count, remaining, "{report:?}")
                }
            }
        }
    }

    fn unit_square() -> Triangulation {
        triangulation(
            &[[0., 0.], [1., 0.], [1., 1.], [0., 1.]],
            TriangulationConfiguration::default(),
        )
    }

    #[test]
    fn invalid_parameters() {
        let mut triangulation = unit_square();

        for (min_angle, max_edge) in [
            (-1., 1.),
            (Float::NAN, 1.),
            (Float::INFINITY, 1.),
            (0.3, 0.),
            (0.3, -2.),
            (0.3, Float::NAN),
        ] {
            let result = triangulation.refine(min_angle, max_edge);
            assert!(
                matches!(
                    result,
                    Err(TriangulationError::InvalidRefinementParameters { .. })
                ),
                "({min_angle}, {max_edge}) should be rejected"
            );
        }
        assert_eq!(4, triangulation.get_nodes().len());
    }

    #[test]
    fn already_good_triangulation() {
        let mut triangulation = unit_square();
        let before = triangulation.get_triangles_index();

        let report = triangulation
            .refine(20. * DEG, Float::INFINITY)
            .expect("Refinement should succeed");

        assert!(report.converged());
        assert_eq!(0, report.steps);
        assert_eq!(1, report.rounds);
        assert!(report.inserted_nodes.is_empty());
        assert_eq!(before, report.triangles);
    }

    #[test]
    fn size_refinement_of_a_square() {
        let mut triangulation = unit_square();

        let report = triangulation
            .refine(20. * DEG, 0.6)
            .expect("Refinement should succeed");

        assert!(report.converged(), "{report:?}");
        assert_eq!(vec![4, 5, 6, 7, 8], report.inserted_nodes);
        assert_eq!(2, report.rounds);
        assert_eq!(8, report.triangles.len());
        for triangle in triangulation.get_triangles() {
            assert!((triangle.area() - 0.125).abs() < 1e-9);
            assert!((triangle.alpha() - 45. * DEG).abs() < 1e-9);
        }
        assert!(triangulation.is_delaunay());
    }

    #[test]
    fn early_stops_report_the_remaining_bad_triangles() {
        let vertices = [
            [0., 0.],
            [10., 0.],
            [10., 10.],
            [0., 10.],
            [3., 4.],
            [7., 2.],
            [6., 8.],
        ];
        let mut triangulation = triangulation(&vertices, TriangulationConfiguration::default());
        let (min_angle, max_edge) = (20. * DEG, 3.);

        let report = triangulation
            .refine(min_angle, max_edge)
            .expect("Refinement should succeed");

        assert_outcomes_hold(&triangulation, &report, min_angle, max_edge);
        if !report.angle_phase.converged() {
            assert!(report.skipped_candidates > 0);
        }
        assert!(report.inserted_nodes.len() > 0);
        assert!(report.steps >= report.inserted_nodes.len());
        assert_eq!(
            vertices.len() + report.inserted_nodes.len(),
            triangulation.get_nodes().len()
        );
        assert_eq!(triangulation.get_triangles_index(), report.triangles);
        assert!(triangulation.is_delaunay());
    }

    #[test]
    fn refinement_budget() {
        let config = TriangulationConfiguration {
            max_refinement_steps: 3,
            ..Default::default()
        };
        let mut triangulation = triangulation(&[[0., 0.], [10., 0.], [10., 10.], [0., 10.]], config);

        let report = triangulation
            .refine(20. * DEG, 0.5)
            .expect("Refinement should succeed");

        assert_eq!(PhaseOutcome::Converged, report.angle_phase);
        assert!(matches!(
            report.size_phase,
            PhaseOutcome::AbortedByBudget { remaining } if remaining > 0
        ));
        assert_eq!(3, report.steps);
        assert_eq!(3, report.inserted_nodes.len());
        assert_eq!(2, report.rounds);
        assert!(!report.converged());
    }

    #[test]
    fn steiner_points_confinement() {
        // The circumcenter of this flat triangle is far below the input
        let vertices = [[0., 0.], [10., 0.], [5., 0.5]];
        let mut triangulation = triangulation(&vertices, TriangulationConfiguration::default());

        let report = triangulation
            .refine(20. * DEG, Float::INFINITY)
            .expect("Refinement should succeed");

        assert_eq!(
            PhaseOutcome::Stalled { remaining: 1 },
            report.angle_phase
        );
        assert_eq!(1, report.skipped_candidates);
        assert!(report.inserted_nodes.is_empty());
        assert_eq!(1, report.rounds);
        assert_eq!(PhaseOutcome::Converged, report.size_phase);
        assert_eq!(3, triangulation.get_nodes().len());
    }

    #[test]
    fn size_refinement_revisits_small_angles() {
        // Rectangle boundary with a spacing of twice the maximum edge length
        let vertices = [
            [0., 0.],
            [1.5, 0.],
            [3., 0.],
            [3., 2.],
            [1.5, 2.],
            [0., 2.],
        ];
        let mut triangulation = triangulation(&vertices, TriangulationConfiguration::default());
        let (min_angle, max_edge) = (30. * DEG, 0.7);

        let report = triangulation
            .refine(min_angle, max_edge)
            .expect("Refinement should succeed");

        // Size insertions along the boundary leave slivers with circumcenters out of the input
        assert_eq!(PhaseOutcome::Stalled { remaining: 9 }, report.angle_phase);
        assert_eq!(PhaseOutcome::Converged, report.size_phase);
        assert!(!report.converged());
        assert_eq!(2, report.rounds);
        assert_eq!(17, report.inserted_nodes.len());
        assert_outcomes_hold(&triangulation, &report, min_angle, max_edge);
        assert!(triangulation.is_delaunay());
    }
}
