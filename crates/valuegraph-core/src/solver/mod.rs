mod arena;
pub mod bellman;
pub mod ccgraph;
pub mod config;
pub mod error;
pub mod ids;
pub mod iteration;
pub mod mdp;
pub mod nondet;
pub mod policy;
pub mod scc;
pub mod topological;
pub mod values;

#[cfg(test)]
mod tests;
