use thiserror::Error;
use valuegraph_core::SolverError;

/// Failures of the model crate.
///
/// Structural problems of a state-machine description (ids and references)
/// are reported here. Probabilities, rewards and outcome lists are checked by
/// the solver contract on the compiled model and surface as
/// [`MdpError::Solver`].
#[derive(Debug, Error)]
pub enum MdpError {
    #[error("cannot read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("model has no start state")]
    MissingStart,

    #[error("start state '{0}' is not declared")]
    UnknownStart(String),

    #[error("state '{0}' is declared more than once")]
    DuplicateState(String),

    #[error("state '{state}' declares action '{action}' more than once")]
    DuplicateAction { state: String, action: String },

    /// Absorbing states must loop on themselves explicitly.
    #[error("state '{0}' has no action")]
    NoActions(String),

    #[error("state '{state}' action '{action}' leads to undeclared state '{next}'")]
    UnknownNext {
        state: String,
        action: String,
        next: String,
    },

    #[error("builder has no state '{0}'")]
    BuilderState(String),

    #[error("builder state '{state}' has no action '{action}'")]
    BuilderAction { state: String, action: String },

    #[error("no outcome of action {action} in state {state} could be sampled")]
    Sampling { state: String, action: String },
}
