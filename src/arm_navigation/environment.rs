//! Lattice environment for an arm planning request
//!
//! Built fresh for every request by [`ArmLatticeEnvironment::setup_for_motion_plan`]:
//! the obstacle grid, heuristic field, state table and primitive set all
//! live and die with it. An external graph search then drives it through
//! [`GraphSearchEnvironment`].

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, trace};

use crate::arm_navigation::config::{CellBoundsPolicy, LatticeParams};
use crate::arm_navigation::discretization::{shortest_angular_distance, CoordinateDiscretizer};
use crate::arm_navigation::motion_primitives::{MotionPrimitive, MotionPrimitiveSet};
use crate::arm_navigation::motion_validity::MotionValidityChecker;
use crate::arm_navigation::shortcut::TrajectoryShortcutter;
use crate::arm_navigation::state_hash::{DiscreteState, StateHashTable};
use crate::arm_navigation::statistics::PlanningStatistics;
use crate::common::{
    CancellationToken, CollisionChecker, ConstraintOracle, ForwardKinematics, GraphSearchEnvironment, GridCell,
    JointTrajectory, MotionValidator, Point3D, RoboticsError, RoboticsResult, SetupFailure, StateId,
};
use crate::mapping::{ObstacleGrid, WorldObjects};
use crate::path_planning::{HeuristicField, INFINITE_DISTANCE};

/// Heuristic of a state whose end-effector cell the BFS never reached.
/// Finite so searches that add costs do not overflow.
pub const UNREACHABLE_COST: u32 = 1 << 30;

/// Collaborators describing the robot and its surroundings
pub struct PlanningScene {
    pub collision_checker: Arc<dyn CollisionChecker>,
    pub kinematics: Arc<dyn ForwardKinematics>,
    pub world: WorldObjects,
}

impl PlanningScene {
    pub fn new(collision_checker: Arc<dyn CollisionChecker>, kinematics: Arc<dyn ForwardKinematics>) -> Self {
        Self {
            collision_checker,
            kinematics,
            world: WorldObjects::new(),
        }
    }

    pub fn with_world(mut self, world: WorldObjects) -> Self {
        self.world = world;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointConstraint {
    pub joint_name: String,
    pub position: f64,
    pub tolerance: f64,
}

/// End-effector position target
#[derive(Debug, Clone, PartialEq)]
pub struct PositionConstraint {
    pub link_name: String,
    pub target: Point3D,
    pub tolerance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalConstraints {
    pub joint_constraints: Vec<JointConstraint>,
    pub position_constraints: Vec<PositionConstraint>,
}

impl GoalConstraints {
    /// Joint-space goal with one tolerance for every joint
    pub fn joint_goal(names: &[String], positions: &[f64], tolerance: f64) -> Self {
        Self {
            joint_constraints: names
                .iter()
                .zip(positions.iter())
                .map(|(name, &position)| JointConstraint {
                    joint_name: name.clone(),
                    position,
                    tolerance,
                })
                .collect(),
            position_constraints: Vec::new(),
        }
    }

    pub fn position_goal(link_name: &str, target: Point3D, tolerance: f64) -> Self {
        Self {
            joint_constraints: Vec::new(),
            position_constraints: vec![PositionConstraint {
                link_name: link_name.to_string(),
                target,
                tolerance,
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.joint_constraints.is_empty() && self.position_constraints.is_empty()
    }
}

pub struct MotionPlanRequest {
    pub group_name: String,
    pub start_state: Vec<f64>,
    pub goal: GoalConstraints,
    /// Must hold along the whole path; unconstrained when None
    pub path_constraints: Option<Arc<dyn ConstraintOracle>>,
}

impl MotionPlanRequest {
    pub fn new(group_name: &str, start_state: Vec<f64>, goal: GoalConstraints) -> Self {
        Self {
            group_name: group_name.to_string(),
            start_state,
            goal,
            path_constraints: None,
        }
    }

    pub fn with_path_constraints(mut self, path_constraints: Arc<dyn ConstraintOracle>) -> Self {
        self.path_constraints = Some(path_constraints);
        self
    }
}

/// Joint goal resolved to joint indices: (index, position, tolerance)
type JointGoal = Vec<(usize, f64, f64)>;

pub struct ArmLatticeEnvironment {
    params: LatticeParams,
    joint_names: Vec<String>,
    continuous: Vec<bool>,
    discretizer: CoordinateDiscretizer,
    kinematics: Arc<dyn ForwardKinematics>,
    validity: MotionValidityChecker,
    primitives: MotionPrimitiveSet,
    states: StateHashTable,
    heuristic_field: Option<HeuristicField>,
    joint_goal: JointGoal,
    /// Lattice cell owned by the joint goal; None for position goals
    goal_coords: Option<Vec<i32>>,
    position_goal: Vec<PositionConstraint>,
    goal_cell: GridCell,
    start_id: StateId,
    goal_id: StateId,
    statistics: PlanningStatistics,
}

impl ArmLatticeEnvironment {
    /// Build the environment for one planning request.
    ///
    /// Fails with a [`SetupFailure`] when the start or goal cannot be used;
    /// nothing outlives a failed call.
    pub fn setup_for_motion_plan(
        scene: &PlanningScene,
        request: &MotionPlanRequest,
        params: LatticeParams,
    ) -> RoboticsResult<Self> {
        let setup_start = Instant::now();
        params.validate()?;

        let num_joints = params.num_joints();
        let start = request.start_state.clone();
        if start.len() != num_joints {
            return Err(SetupFailure::InvalidRobotState(format!(
                "start state has {} joint values, group '{}' has {} joints",
                start.len(),
                request.group_name,
                num_joints
            ))
            .into());
        }

        let mut validity = MotionValidityChecker::new(
            scene.collision_checker.clone(),
            &request.group_name,
            params.interpolation_deltas(),
            params.continuous_joints(),
        );
        if let Some(path_constraints) = &request.path_constraints {
            validity = validity.with_path_constraints(path_constraints.clone());
        }
        if validity.in_collision(&start) {
            return Err(SetupFailure::StartInCollision.into());
        }

        let mut primitives = MotionPrimitiveSet::new();
        for p in &params.primitives {
            primitives.add_primitive(MotionPrimitive::Static {
                name: p.name.clone(),
                delta: p.delta.clone(),
            });
        }
        if params.use_standard_primitives {
            for p in MotionPrimitiveSet::standard(&params.lattice_resolutions()).iter() {
                primitives.add_primitive(p.clone());
            }
        }

        let mut env = Self {
            joint_names: params.joint_names(),
            continuous: params.continuous_joints(),
            discretizer: CoordinateDiscretizer::new(
                params.lattice_resolutions(),
                params.grid.origin,
                params.grid.resolution,
            )?,
            kinematics: scene.kinematics.clone(),
            validity,
            primitives,
            states: StateHashTable::new(),
            heuristic_field: None,
            joint_goal: Vec::new(),
            goal_coords: None,
            position_goal: Vec::new(),
            goal_cell: GridCell::default(),
            start_id: 0,
            goal_id: 0,
            statistics: PlanningStatistics::new(),
            params,
        };

        let start_coords = env.discretizer.to_lattice_coords(&start)?;
        let start_tip = env.kinematics.end_effector_position(&start);
        let start_cell = env.place_cell(&start_tip).ok_or_else(|| {
            SetupFailure::InvalidRobotState(format!("start end effector {:?} outside the obstacle grid", start_tip))
        })?;
        env.start_id = env.states.add_hash_entry(start_coords, start.clone(), start_cell, 0);

        let goal = &request.goal;
        let goal_state = if !goal.joint_constraints.is_empty() {
            let mut goal_angles = start.clone();
            for c in &goal.joint_constraints {
                let idx = env
                    .joint_names
                    .iter()
                    .position(|name| *name == c.joint_name)
                    .ok_or_else(|| SetupFailure::InvalidGoal(format!("unknown joint '{}'", c.joint_name)))?;
                goal_angles[idx] = c.position;
                env.joint_goal.push((idx, c.position, c.tolerance));
            }
            if env.validity.in_collision(&goal_angles) {
                return Err(SetupFailure::GoalInCollision.into());
            }
            let goal_tip = env.kinematics.end_effector_position(&goal_angles);
            env.goal_cell = env.place_cell(&goal_tip).ok_or_else(|| {
                SetupFailure::InvalidGoal(format!("goal end effector {:?} outside the obstacle grid", goal_tip))
            })?;
            if env.params.use_joint_snap {
                env.primitives.add_primitive(MotionPrimitive::SnapToGoal {
                    goal: goal_angles.clone(),
                    threshold: env.params.joint_snap_threshold,
                });
            }
            GoalState::Joints(goal_angles)
        } else if let Some(target) = goal.position_constraints.first() {
            env.goal_cell = env.place_cell(&target.target).ok_or_else(|| {
                SetupFailure::InvalidGoal(format!("goal position {:?} outside the obstacle grid", target.target))
            })?;
            GoalState::Position
        } else {
            return Err(SetupFailure::InvalidGoal("no joint or position goal constraints".to_string()).into());
        };
        env.position_goal = goal.position_constraints.clone();

        if env.params.use_bfs {
            env.build_heuristic(&scene.world)?;
        }

        env.goal_id = match goal_state {
            // Detached so a start sharing the goal cell keeps its own entry
            GoalState::Joints(angles) => {
                let coords = env.discretizer.to_lattice_coords(&angles)?;
                env.goal_coords = Some(coords.clone());
                env.states.add_detached_entry(coords, angles, env.goal_cell, 0)
            }
            // Placeholder joint values nothing can alias
            GoalState::Position => {
                env.states
                    .add_detached_entry(vec![0; num_joints], vec![0.0; num_joints], env.goal_cell, 0)
            }
        };

        env.statistics.total_setup_time = setup_start.elapsed();
        info!(
            "[ArmLattice] setup for '{}': {} joints, {} primitives, goal cell ({},{},{}), {} heuristic in {:?}",
            request.group_name,
            num_joints,
            env.primitives.len(),
            env.goal_cell.x,
            env.goal_cell.y,
            env.goal_cell.z,
            if env.heuristic_field.is_some() { "bfs" } else { "euclidean" },
            env.statistics.total_setup_time
        );
        Ok(env)
    }

    fn build_heuristic(&mut self, world: &WorldObjects) -> RoboticsResult<()> {
        let grid_start = Instant::now();
        let grid = ObstacleGrid::from_world(&self.params.grid, world)?;
        self.statistics.obstacle_grid_setup_time = grid_start.elapsed();
        self.statistics.percent_occupied = grid.percent_occupied();

        let heuristic_start = Instant::now();
        let field = HeuristicField::compute(&grid, self.goal_cell, self.params.bfs_connectivity)?;
        self.statistics.heuristic_setup_time = heuristic_start.elapsed();
        self.statistics.heuristic_run_time = field.run_time();
        debug!(
            "[ArmLattice] obstacle grid {:?}, {:.2}% occupied, bfs reached {} cells",
            grid.dims(),
            grid.percent_occupied() * 100.0,
            field.reached_cells()
        );
        self.heuristic_field = Some(field);
        Ok(())
    }

    /// Grid cell of a workspace point after applying the bounds policy
    fn place_cell(&self, p: &Point3D) -> Option<GridCell> {
        let cell = self.discretizer.to_grid_cell(p);
        if self.cell_in_grid(cell) {
            return Some(cell);
        }
        match self.params.bounds_policy {
            CellBoundsPolicy::Reject => None,
            CellBoundsPolicy::Clamp => Some(self.clamp_cell(cell)),
        }
    }

    fn cell_in_grid(&self, cell: GridCell) -> bool {
        let g = &self.params.grid;
        let inside = |v: i32, n: usize| v >= 0 && (v as usize) < n;
        inside(cell.x, g.cells_x) && inside(cell.y, g.cells_y) && inside(cell.z, g.cells_z)
    }

    fn clamp_cell(&self, cell: GridCell) -> GridCell {
        let g = &self.params.grid;
        let clamp = |v: i32, n: usize| v.max(0).min(n as i32 - 1);
        GridCell::new(clamp(cell.x, g.cells_x), clamp(cell.y, g.cells_y), clamp(cell.z, g.cells_z))
    }

    pub fn start_state_id(&self) -> StateId {
        self.start_id
    }

    pub fn goal_state_id(&self) -> StateId {
        self.goal_id
    }

    pub fn state(&self, id: StateId) -> RoboticsResult<&DiscreteState> {
        self.states.resolve(id)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn goal_cell(&self) -> GridCell {
        self.goal_cell
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn params(&self) -> &LatticeParams {
        &self.params
    }

    /// BFS field, None in Euclidean mode
    pub fn heuristic_field(&self) -> Option<&HeuristicField> {
        self.heuristic_field.as_ref()
    }

    pub fn primitives(&self) -> &MotionPrimitiveSet {
        &self.primitives
    }

    /// Cost-to-go estimate of an end-effector cell
    pub fn end_effector_heuristic(&self, cell: GridCell) -> u32 {
        match &self.heuristic_field {
            Some(field) => {
                let distance = field.distance(cell);
                if distance == INFINITE_DISTANCE {
                    UNREACHABLE_COST
                } else {
                    distance.saturating_mul(self.params.cost_per_cell).min(UNREACHABLE_COST)
                }
            }
            None => {
                let meters = cell.euclidean_distance(&self.goal_cell) * self.params.grid.resolution;
                ((meters * self.params.cost_per_meter) as u32).min(UNREACHABLE_COST)
            }
        }
    }

    pub fn heuristic(&self, id: StateId) -> RoboticsResult<u32> {
        if id == self.goal_id {
            return Ok(0);
        }
        let state = self.states.resolve(id)?;
        Ok(self.end_effector_heuristic(state.end_effector))
    }

    /// Heuristic query that first honours a cancellation request
    pub fn heuristic_interruptible(&self, id: StateId, token: &CancellationToken) -> RoboticsResult<u32> {
        if token.is_cancelled() {
            return Err(RoboticsError::Cancelled);
        }
        self.heuristic(id)
    }

    pub fn is_goal(&self, id: StateId) -> RoboticsResult<bool> {
        if id == self.goal_id {
            return Ok(true);
        }
        let state = self.states.resolve(id)?;
        Ok(self.satisfies_goal(&state.angles))
    }

    /// Joint tolerances, then end-effector position tolerances
    fn satisfies_goal(&self, angles: &[f64]) -> bool {
        let joints_ok = self.joint_goal.iter().all(|&(idx, position, tolerance)| {
            let diff = if self.continuous[idx] {
                shortest_angular_distance(angles[idx], position)
            } else {
                position - angles[idx]
            };
            diff.abs() <= tolerance
        });
        if !joints_ok {
            return false;
        }
        if self.position_goal.is_empty() {
            return true;
        }
        let tip = self.kinematics.end_effector_position(angles);
        self.position_goal.iter().all(|c| tip.distance(&c.target) <= c.tolerance)
    }

    /// Valid successors of a state with their edge costs.
    ///
    /// A successor landing in a known lattice cell becomes that state, so the
    /// motion checked is the one to the stored joint values.
    pub fn expand(&mut self, id: StateId) -> RoboticsResult<Vec<(StateId, u32)>> {
        let parent = self.states.resolve(id)?.clone();
        let mut candidates: Vec<Vec<f64>> = Vec::with_capacity(self.primitives.len());
        for primitive in self.primitives.iter() {
            let mut angles = match primitive.successor(&parent.angles, &self.continuous) {
                Some(angles) => angles,
                None => continue,
            };
            // Cell 0 spans (-res, res): one step from inside it may not leave it
            if let MotionPrimitive::Static { .. } = primitive {
                if self.discretizer.to_lattice_coords(&angles)? == parent.coords {
                    if let Some(further) = primitive.successor(&angles, &self.continuous) {
                        angles = further;
                    }
                }
            }
            candidates.push(angles);
        }

        let mut successors: Vec<(StateId, u32)> = Vec::with_capacity(candidates.len());
        for angles in candidates {
            let coords = self.discretizer.to_lattice_coords(&angles)?;
            let known = self.known_state(&coords);
            if known == Some(id) {
                continue;
            }
            let target = match known {
                Some(existing) => self.states.resolve(existing)?.angles.clone(),
                None => angles.clone(),
            };
            if !self.validity.check_motion(&parent.angles, &target).is_valid() {
                if let Some(existing) = known {
                    trace!("[ArmLattice] motion {} -> {} blocked at stored joint values", id, existing);
                }
                continue;
            }
            let succ = match known {
                Some(existing) => existing,
                None => {
                    let tip = self.kinematics.end_effector_position(&angles);
                    let cell = match self.place_cell(&tip) {
                        Some(cell) => cell,
                        None => {
                            trace!("[ArmLattice] successor of {} leaves the grid at {:?}", id, tip);
                            continue;
                        }
                    };
                    self.states.add_hash_entry(coords, angles, cell, 0)
                }
            };
            if !successors.iter().any(|&(s, _)| s == succ) {
                successors.push((succ, self.params.cost_per_action));
            }
        }

        trace!("[ArmLattice] expanded {}: {} successors", id, successors.len());
        Ok(successors)
    }

    /// State already owning `coords`; the joint goal claims its cell
    fn known_state(&self, coords: &[i32]) -> Option<StateId> {
        match &self.goal_coords {
            Some(goal) if goal.as_slice() == coords => Some(self.goal_id),
            _ => self.states.lookup(coords),
        }
    }

    /// Joint values of each state in turn. Unknown IDs fail the whole call.
    pub fn reconstruct_trajectory(&self, ids: &[StateId]) -> RoboticsResult<JointTrajectory> {
        let mut trajectory = JointTrajectory::new(self.joint_names.clone());
        for &id in ids {
            trajectory.push(self.states.resolve(id)?.angles.clone());
        }
        Ok(trajectory)
    }

    pub fn shortcut_trajectory(&mut self, trajectory: &JointTrajectory) -> JointTrajectory {
        let start = Instant::now();
        let shortcutter = TrajectoryShortcutter::new(self.params.interpolate_path);
        let shortened = shortcutter.shortcut_trajectory(trajectory, &mut self.validity);
        self.statistics.shortcutting_time += start.elapsed();
        shortened
    }

    /// Reconstruct a found path and shortcut it when enabled
    pub fn extract_trajectory(&mut self, ids: &[StateId]) -> RoboticsResult<JointTrajectory> {
        let trajectory = self.reconstruct_trajectory(ids)?;
        if self.params.shortcut_path {
            Ok(self.shortcut_trajectory(&trajectory))
        } else {
            Ok(trajectory)
        }
    }

    pub fn statistics(&self) -> PlanningStatistics {
        let mut stats = self.statistics.clone();
        stats.num_collision_checks = self.validity.num_collision_checks();
        stats.total_collision_check_time = self.validity.collision_check_time();
        stats.num_states = self.states.len();
        stats
    }
}

enum GoalState {
    Joints(Vec<f64>),
    Position,
}

impl GraphSearchEnvironment for ArmLatticeEnvironment {
    fn start_state_id(&self) -> StateId {
        self.start_id
    }

    fn goal_state_id(&self) -> StateId {
        self.goal_id
    }

    fn heuristic(&self, id: StateId) -> RoboticsResult<u32> {
        ArmLatticeEnvironment::heuristic(self, id)
    }

    fn is_goal(&self, id: StateId) -> RoboticsResult<bool> {
        ArmLatticeEnvironment::is_goal(self, id)
    }

    fn expand(&mut self, id: StateId) -> RoboticsResult<Vec<(StateId, u32)>> {
        ArmLatticeEnvironment::expand(self, id)
    }

    fn reconstruct_trajectory(&self, ids: &[StateId]) -> RoboticsResult<JointTrajectory> {
        ArmLatticeEnvironment::reconstruct_trajectory(self, ids)
    }
}
