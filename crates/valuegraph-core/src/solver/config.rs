use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::solver::{
    bellman::GreedyResult,
    ccgraph::CCGraph,
    error::{SolverError, check_gamma, check_subopt_epsilon, check_tolerance},
    iteration::{run_policy_iteration, run_value_iteration},
    mdp::{Mdp, PROB_TOLERANCE, validate_mdp},
    nondet::run_non_augmentable_policy,
    policy::{ExplicitPolicy, NdPolicy},
    topological::run_topological_vi,
    values::StateValueFunction,
};

const DEFAULT_SOLVER_CONFIG_YAML: &str = include_str!("../../config/solver.default.yaml");

/// Upper bound on the number of sweeps a fixed-point loop may perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IterationBudget {
    /// Iterate until convergence, however long it takes.
    #[default]
    Unbounded,
    /// Give up after this many sweeps.
    Sweeps(usize),
}

impl IterationBudget {
    /// Whether another sweep may start after `done` sweeps.
    pub fn allows(self, done: usize) -> bool {
        match self {
            IterationBudget::Unbounded => true,
            IterationBudget::Sweeps(limit) => done < limit,
        }
    }
}

impl From<Option<usize>> for IterationBudget {
    fn from(value: Option<usize>) -> Self {
        value.map_or(IterationBudget::Unbounded, IterationBudget::Sweeps)
    }
}

/// Numeric parameters shared by the solvers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Discount factor, expected in `[0, 1)`.
    pub gamma: f64,
    /// Convergence tolerance of value iteration and near-greediness margin.
    pub epsilon: f64,
    /// Residual under which policy evaluation stops.
    pub stopping_threshold: f64,
    /// Fraction of optimal value a non-deterministic policy may lose.
    pub subopt_epsilon: f64,
    /// Sweep bound of worst-case evaluation and of the repair loop.
    pub nd_max_iterations: usize,
    /// Sweep budget of the deterministic solvers, `None` for unbounded.
    pub max_sweeps: Option<usize>,
    /// Tolerance on outcome probability sums when validating a model.
    pub probability_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            gamma: 0.9,
            epsilon: 1e-6,
            stopping_threshold: 1e-6,
            subopt_epsilon: 0.1,
            nd_max_iterations: 1000,
            max_sweeps: None,
            probability_tolerance: PROB_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Parse a solver config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SolverConfigError> {
        let config: SolverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a solver config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SolverConfigError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_SOLVER_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, SolverConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Sweep budget of the deterministic solvers.
    pub fn budget(&self) -> IterationBudget {
        IterationBudget::from(self.max_sweeps)
    }

    fn validate(&self) -> Result<(), SolverConfigError> {
        if !self.gamma.is_finite() || !(0.0..1.0).contains(&self.gamma) {
            return Err(SolverConfigError::Invalid(
                "gamma must lie in [0, 1)".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SolverConfigError::Invalid(
                "epsilon must be finite and > 0".to_string(),
            ));
        }
        if !self.stopping_threshold.is_finite() || self.stopping_threshold <= 0.0 {
            return Err(SolverConfigError::Invalid(
                "stopping_threshold must be finite and > 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.subopt_epsilon) {
            return Err(SolverConfigError::Invalid(
                "subopt_epsilon must lie in [0, 1)".to_string(),
            ));
        }
        if self.nd_max_iterations == 0 {
            return Err(SolverConfigError::Invalid(
                "nd_max_iterations must be greater than 0".to_string(),
            ));
        }
        if self.max_sweeps == Some(0) {
            return Err(SolverConfigError::Invalid(
                "max_sweeps must be greater than 0 when set".to_string(),
            ));
        }
        if !self.probability_tolerance.is_finite() || self.probability_tolerance < 0.0 {
            return Err(SolverConfigError::Invalid(
                "probability_tolerance must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Re-check the parameters, since the fields are public and may have
    /// changed after loading.
    fn check_parameters(&self) -> Result<(), SolverError> {
        check_gamma(self.gamma)?;
        check_tolerance("epsilon", self.epsilon)?;
        check_tolerance("stopping_threshold", self.stopping_threshold)?;
        check_subopt_epsilon(self.subopt_epsilon)
    }

    /// Check `mdp` against the configured probability tolerance.
    pub fn validate_mdp<M>(&self, mdp: &M) -> Result<(), SolverError>
    where
        M: Mdp + ?Sized,
    {
        validate_mdp(mdp, self.probability_tolerance)
    }

    /// Run value iteration with the configured parameters.
    pub fn value_iteration<M>(&self, mdp: &M) -> Result<GreedyResult<M>, SolverError>
    where
        M: Mdp + ?Sized,
    {
        self.check_parameters()?;
        self.validate_mdp(mdp)?;
        run_value_iteration(mdp, self.gamma, self.epsilon, self.budget())
    }

    /// Run policy iteration with the configured parameters.
    pub fn policy_iteration<M>(
        &self,
        mdp: &M,
        initial_policy: Option<ExplicitPolicy<M::State, M::Action>>,
    ) -> Result<ExplicitPolicy<M::State, M::Action>, SolverError>
    where
        M: Mdp + ?Sized,
    {
        self.check_parameters()?;
        self.validate_mdp(mdp)?;
        run_policy_iteration(
            mdp,
            self.gamma,
            self.epsilon,
            self.stopping_threshold,
            initial_policy,
            self.budget(),
        )
    }

    /// Run topological value iteration over `graph`.
    pub fn topological_vi<M>(
        &self,
        mdp: &M,
        graph: &CCGraph<M::State>,
    ) -> Result<StateValueFunction<M::State>, SolverError>
    where
        M: Mdp + ?Sized,
    {
        self.check_parameters()?;
        self.validate_mdp(mdp)?;
        run_topological_vi(mdp, self.gamma, self.epsilon, graph, self.budget())
    }

    /// Synthesize a non-augmentable conservative policy.
    pub fn non_augmentable_policy<M>(
        &self,
        mdp: &M,
    ) -> Result<NdPolicy<M::State, M::Action>, SolverError>
    where
        M: Mdp + ?Sized,
    {
        self.check_parameters()?;
        self.validate_mdp(mdp)?;
        run_non_augmentable_policy(
            mdp,
            self.gamma,
            self.epsilon,
            self.subopt_epsilon,
            self.nd_max_iterations,
        )
    }
}

/// Error type for loading and validating `SolverConfig`.
#[derive(Debug, Error)]
pub enum SolverConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid solver config: {0}")]
    Invalid(String),
}
