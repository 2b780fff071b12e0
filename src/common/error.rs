//! Error types for arm_lattice

use thiserror::Error;

/// Reason a planning request could not be set up.
///
/// These are fatal to the request only; the environment is rebuilt for the
/// next request, so a failed setup leaves nothing behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupFailure {
    /// Start configuration collides with the world or the robot itself
    #[error("start state is in collision")]
    StartInCollision,
    /// Joint-space goal collides
    #[error("goal state is in collision")]
    GoalInCollision,
    /// Goal constraints unusable (no joint or position target, unknown joint, out of grid)
    #[error("invalid goal: {0}")]
    InvalidGoal(String),
    /// Start state malformed or its end effector cannot be discretized
    #[error("invalid robot state: {0}")]
    InvalidRobotState(String),
}

/// Main error type for lattice planning
#[derive(Error, Debug)]
pub enum RoboticsError {
    /// Request setup failed
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupFailure),
    /// A state ID that was never assigned
    #[error("State id {id} out of range ({len} states assigned)")]
    OutOfRange { id: usize, len: usize },
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(String),
    /// Cancellation token was set by the caller
    #[error("Planning cancelled")]
    Cancelled,
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

/// Result type alias for robotics operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoboticsError::OutOfRange { id: 7, len: 2 };
        assert_eq!(format!("{}", err), "State id 7 out of range (2 states assigned)");
    }

    #[test]
    fn test_setup_failure_display() {
        let err: RoboticsError = SetupFailure::GoalInCollision.into();
        assert_eq!(format!("{}", err), "Setup failed: goal state is in collision");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoboticsError = io_err.into();
        assert!(matches!(err, RoboticsError::IoError(_)));
    }
}
