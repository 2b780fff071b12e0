// Lattice planning for a planar two-link arm
//
// Plans from the stretched-out pose to a random collision-free goal around a
// spherical obstacle, then shortcuts the path and plots the joint angles.
//
// Usage: arm_lattice_demo [params.yaml]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::f64::consts::PI;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rand::Rng;

use arm_lattice::arm_navigation::{GoalConstraints, LatticeParams, MotionPlanRequest, PlanningScene};
use arm_lattice::common::{CollisionChecker, ForwardKinematics, Point3D, RoboticsResult, StateId};
use arm_lattice::mapping::{GridParams, Shape, WorldObject, WorldObjects};
use arm_lattice::utils::visualization::{colors, compare_trajectories};
use arm_lattice::utils::Visualizer;
use arm_lattice::ArmLatticeEnvironment;

// Link lengths
const L1: f64 = 1.0;
const L2: f64 = 1.0;

// Search limits
const MAX_EXPANSIONS: usize = 200_000;
const HEURISTIC_WEIGHT: u64 = 2;

struct TwoLinkArm;

impl TwoLinkArm {
    fn elbow(joints: &[f64]) -> Point3D {
        Point3D::new(L1 * joints[0].cos(), L1 * joints[0].sin(), 0.0)
    }
}

impl ForwardKinematics for TwoLinkArm {
    fn end_effector_position(&self, joints: &[f64]) -> Point3D {
        let elbow = Self::elbow(joints);
        Point3D::new(
            elbow.x + L2 * (joints[0] + joints[1]).cos(),
            elbow.y + L2 * (joints[0] + joints[1]).sin(),
            0.0,
        )
    }
}

/// Samples points along both links against the world shapes
struct LinkCollisionChecker {
    world: WorldObjects,
    samples_per_link: usize,
}

impl CollisionChecker for LinkCollisionChecker {
    fn in_collision(&self, joints: &[f64], _group: &str) -> bool {
        let shoulder = Point3D::origin();
        let elbow = TwoLinkArm::elbow(joints);
        let tip = TwoLinkArm.end_effector_position(joints);
        [(shoulder, elbow), (elbow, tip)].iter().any(|(a, b)| {
            (0..=self.samples_per_link).any(|i| {
                let t = i as f64 / self.samples_per_link as f64;
                let p = Point3D::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y), 0.0);
                self.world.is_point_occupied(&p, 0.0)
            })
        })
    }
}

/// Weighted best-first search over the lattice
fn search(env: &mut ArmLatticeEnvironment) -> RoboticsResult<Option<Vec<StateId>>> {
    let start = env.start_state_id();
    let mut open = BinaryHeap::new();
    let mut cost_so_far: HashMap<StateId, u64> = HashMap::new();
    let mut parent: HashMap<StateId, StateId> = HashMap::new();
    let mut closed = HashSet::new();

    cost_so_far.insert(start, 0);
    open.push(Reverse((HEURISTIC_WEIGHT * env.heuristic(start)? as u64, start)));

    while let Some(Reverse((_, id))) = open.pop() {
        if env.is_goal(id)? {
            let mut path = vec![id];
            let mut current = id;
            while let Some(&prev) = parent.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            info!("search expanded {} states", closed.len());
            return Ok(Some(path));
        }
        if !closed.insert(id) {
            continue;
        }
        if closed.len() > MAX_EXPANSIONS {
            break;
        }

        let g = cost_so_far.get(&id).copied().unwrap_or(0);
        for (succ, cost) in env.expand(id)? {
            let candidate = g + cost as u64;
            if cost_so_far.get(&succ).map_or(true, |&old| candidate < old) {
                cost_so_far.insert(succ, candidate);
                parent.insert(succ, id);
                open.push(Reverse((candidate + HEURISTIC_WEIGHT * env.heuristic(succ)? as u64, succ)));
            }
        }
    }
    Ok(None)
}

fn default_params() -> LatticeParams {
    let mut params = LatticeParams::for_joints(&["shoulder", "elbow"], 0.05);
    params.interpolation_distance = 0.02;
    params.grid = GridParams::for_volume(4.4, 4.4, 0.2, 0.1, Point3D::new(-2.2, -2.2, -0.1));
    params.joint_snap_threshold = 0.1;
    params
}

fn main() -> RoboticsResult<()> {
    env_logger::init();
    std::fs::create_dir_all("img/arm_navigation")?;

    let params = match std::env::args().nth(1) {
        Some(path) => LatticeParams::from_yaml_file(Path::new(&path))?,
        None => default_params(),
    };

    let world = WorldObjects::from_objects(vec![WorldObject::with_shape(
        "ball",
        Shape::sphere(0.3),
        Point3D::new(1.0, 1.0, 0.0),
    )]);
    let checker = Arc::new(LinkCollisionChecker {
        world: world.clone(),
        samples_per_link: 20,
    });
    let scene = PlanningScene::new(checker.clone(), Arc::new(TwoLinkArm)).with_world(world.clone());

    // Random collision-free goal, coarse enough that the lattice can reach it
    let mut rng = rand::thread_rng();
    let start = vec![0.0, 0.0];
    let goal = loop {
        let candidate = vec![rng.gen_range(-PI..PI), rng.gen_range(-2.5..2.5)];
        if !checker.in_collision(&candidate, "arm") && (candidate[0].abs() + candidate[1].abs()) > 0.5 {
            break candidate;
        }
    };
    info!("goal joints: ({:.3}, {:.3})", goal[0], goal[1]);

    let request = MotionPlanRequest::new(
        "arm",
        start,
        GoalConstraints::joint_goal(&params.joint_names(), &goal, 0.05),
    );
    let mut env = ArmLatticeEnvironment::setup_for_motion_plan(&scene, &request, params)?;

    let path = match search(&mut env)? {
        Some(path) => path,
        None => {
            warn!("no path found within {} expansions", MAX_EXPANSIONS);
            env.statistics().log_summary();
            return Ok(());
        }
    };

    let raw = env.reconstruct_trajectory(&path)?;
    let shortcut = env.shortcut_trajectory(&raw);
    env.statistics().log_summary();
    info!("raw path {} waypoints, shortcut {} waypoints", raw.len(), shortcut.len());

    let mut joint_plot = compare_trajectories(&raw, &shortcut, "Arm lattice plan - joint angles");
    joint_plot.save_png("img/arm_navigation/arm_lattice_joints.png", 800, 600)?;

    let tip_path = |points: &[Vec<f64>]| -> Vec<Point3D> {
        points.iter().map(|p| TwoLinkArm.end_effector_position(p)).collect()
    };
    let obstacle_cells: Vec<Point3D> = (0..=60)
        .flat_map(|i| (0..=60).map(move |j| Point3D::new(-1.5 + i as f64 * 0.05, -1.5 + j as f64 * 0.05, 0.0)))
        .filter(|p| world.is_point_occupied(p, 0.0))
        .collect();

    let mut workspace = Visualizer::workspace();
    workspace
        .set_title("Arm lattice plan - end effector")
        .set_x_range(-2.2, 2.2)
        .set_y_range(-2.2, 2.2)
        .plot_obstacles(&obstacle_cells)
        .plot_workspace_path(&tip_path(&raw.points), "raw", colors::RAW_PATH)
        .plot_workspace_path(&tip_path(&shortcut.points), "shortcut", colors::RED)
        .plot_marker(TwoLinkArm.end_effector_position(&raw.points[0]), "Start", colors::START)
        .plot_marker(TwoLinkArm.end_effector_position(&goal), "Goal", colors::GOAL);
    workspace.save_png("img/arm_navigation/arm_lattice_workspace.png", 800, 800)?;

    println!("Plots saved to img/arm_navigation/arm_lattice_*.png");
    Ok(())
}
