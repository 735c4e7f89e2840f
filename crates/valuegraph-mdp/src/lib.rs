mod builder;
mod compiled;
mod error;
mod explicit;
mod history;
mod interner;
mod io;
mod simulator;
mod spec;
mod transform;

pub use builder::MdpBuilder;
pub use compiled::{ActionKey, CompiledMdp, StateKey};
pub use error::MdpError;
pub use explicit::{Explicitation, TranslatedPolicy, explicit_from_mdp};
pub use history::History;
pub use interner::Interner;
pub use io::{compile_yaml, load_yaml, parse_yaml};
pub use simulator::Simulator;
pub use spec::{ActionSpec, MdpSpec, OutcomeSpec, StateSpec};
pub use transform::{
    ActionCost, ForbiddenActions, StateActionPenalty, add_cost_to_actions,
    forbid_actions_in_states, penalise_state_action,
};
