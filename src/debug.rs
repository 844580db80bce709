use hashbrown::HashSet;

use crate::types::{NodeId, Triangle};

/// Defines debug recording of the Triangulation
#[derive(Debug, Clone)]
pub enum PhaseRecord {
    /// Records all the phases
    All,
    /// Records the steps during the specified phase
    In(Phase),
    /// Records the steps during the specified phases
    InAny(HashSet<Phase>),
}

/// Defines debug recording of the Triangulation
#[derive(Debug, Clone)]
pub enum StepsRecord {
    /// Records all the steps
    All,
    /// Records all the steps after the specified one (inclusive)
    From(usize),
    /// Records all the steps until the specified one (inclusive)
    Until(usize),
    /// Records all the steps between the specified ones (inclusive)
    Between(usize, usize),
}

#[derive(Debug, Clone)]
pub struct DebugConfiguration {
    pub phase_record: PhaseRecord,
    pub steps_record: StepsRecord,
    /// [None] means that it won't force an early exit
    pub force_end_at_step: Option<usize>,
}
impl Default for DebugConfiguration {
    fn default() -> Self {
        Self {
            phase_record: PhaseRecord::All,
            steps_record: StepsRecord::All,
            force_end_at_step: Default::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebugSnapshot {
    pub step: usize,
    pub phase: Phase,
    /// Node inserted during this step, if any
    pub inserted_node: Option<NodeId>,
    /// Triangles created during this step
    pub changed_ids: Vec<[NodeId; 3]>,
    /// All the live triangles, container triangles included
    pub triangles: Vec<Triangle>,
}

#[derive(Debug, Clone)]
pub struct DebugContext {
    pub config: DebugConfiguration,
    pub snapshots: Vec<DebugSnapshot>,
    pub current_step: usize,
}

impl DebugContext {
    pub(crate) fn new(config: DebugConfiguration) -> Self {
        Self {
            config,
            snapshots: Vec::new(),
            current_step: 0,
        }
    }

    fn records(&self, phase: Phase) -> bool {
        let record_phase = match &self.config.phase_record {
            PhaseRecord::All => true,
            PhaseRecord::InAny(phases) => phases.contains(&phase),
            PhaseRecord::In(rec_phase) => phase == *rec_phase,
        };
        record_phase
            && match self.config.steps_record {
                StepsRecord::All => true,
                StepsRecord::From(from) => self.current_step >= from,
                StepsRecord::Until(to) => self.current_step <= to,
                StepsRecord::Between(from, to) => {
                    self.current_step >= from && self.current_step <= to
                }
            }
    }

    pub(crate) fn push_snapshot(
        &mut self,
        phase: Phase,
        triangles: &[Triangle],
        changed: &[Triangle],
        inserted_node: Option<NodeId>,
    ) {
        if !self.records(phase) {
            return;
        }
        self.snapshots.push(DebugSnapshot {
            step: self.current_step,
            phase,
            inserted_node,
            changed_ids: changed.iter().map(|t| t.ids()).collect(),
            triangles: triangles.to_vec(),
        });
    }

    /// Moves to the next step. Returns true if the algorithm should stop
    pub(crate) fn advance_step(&mut self) -> bool {
        self.current_step += 1;
        match self.config.force_end_at_step {
            Some(end_step) => self.current_step >= end_step,
            None => false,
        }
    }

    /// Forgets the recorded snapshots and restarts the step count
    pub(crate) fn reset(&mut self) {
        self.snapshots.clear();
        self.current_step = 0;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    ContainerTriangle,
    CavityInsertion,
    AngleRefinement,
    SizeRefinement,
    FilterTriangles,
}
