use thiserror::Error;

/// Error type for MDP validation and solver operations.
///
/// States and actions are reported through their `Debug` rendering so the
/// error stays independent of the domain types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The model violates the MDP contract (probabilities, rewards, outcomes).
    #[error("malformed MDP: {message}")]
    Domain { message: String },

    /// A state or action was used that the MDP does not declare.
    #[error("unknown {kind} '{entity}'")]
    UnknownEntity { kind: &'static str, entity: String },

    /// A state exposes no applicable action.
    #[error("state '{state}' has no applicable action")]
    NoApplicableActions { state: String },

    /// A numeric solver parameter is out of range.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// A fixed-point loop exhausted its iteration budget.
    #[error("{algorithm} did not converge within {sweeps} sweeps (last residual {residual})")]
    Convergence {
        algorithm: &'static str,
        sweeps: usize,
        residual: f64,
    },
}

impl SolverError {
    pub(crate) fn unknown_state(state: &impl std::fmt::Debug) -> Self {
        SolverError::UnknownEntity {
            kind: "state",
            entity: format!("{state:?}"),
        }
    }

    pub(crate) fn unknown_action(action: &impl std::fmt::Debug) -> Self {
        SolverError::UnknownEntity {
            kind: "action",
            entity: format!("{action:?}"),
        }
    }

    pub(crate) fn no_applicable_actions(state: &impl std::fmt::Debug) -> Self {
        SolverError::NoApplicableActions {
            state: format!("{state:?}"),
        }
    }
}

/// Check that `gamma` is a usable discount factor.
///
/// Values of 1 or more are accepted but the fixed-point loops are then no
/// longer guaranteed to terminate.
pub(crate) fn check_gamma(gamma: f64) -> Result<(), SolverError> {
    if !gamma.is_finite() || gamma < 0.0 {
        return Err(SolverError::InvalidParameter {
            name: "gamma",
            message: format!("must be finite and >= 0, got {gamma}"),
        });
    }
    if gamma >= 1.0 {
        tracing::warn!(gamma, "discount factor >= 1, convergence is not guaranteed");
    }
    Ok(())
}

pub(crate) fn check_tolerance(name: &'static str, value: f64) -> Result<(), SolverError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SolverError::InvalidParameter {
            name,
            message: format!("must be finite and > 0, got {value}"),
        });
    }
    Ok(())
}

pub(crate) fn check_subopt_epsilon(value: f64) -> Result<(), SolverError> {
    if !(0.0..1.0).contains(&value) {
        return Err(SolverError::InvalidParameter {
            name: "subopt_epsilon",
            message: format!("must lie in [0, 1), got {value}"),
        });
    }
    Ok(())
}
