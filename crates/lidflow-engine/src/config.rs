//! Parameter limits, service configuration, and validation errors.
//!
//! The solver core trusts its input. Everything a caller submits passes
//! through [`ParameterLimits::validate()`] first.

use std::error::Error;
use std::fmt;

use lidflow_core::constants::MIN_GRID_NODES;
use lidflow_core::SimulationParameters;

// ── ConfigError ────────────────────────────────────────────────────

/// A submitted parameter set or service configuration is out of bounds.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Reynolds number outside `(0, max)`.
    ReynoldsOutOfRange {
        /// The rejected value.
        value: f64,
        /// Exclusive upper bound.
        max: f64,
    },
    /// A grid node count outside `[min, max]`.
    GridOutOfRange {
        /// `"nx"` or `"ny"`.
        axis: &'static str,
        /// The rejected value.
        value: usize,
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound.
        max: usize,
    },
    /// A relaxation factor outside `(0, 1]`.
    RelaxationOutOfRange {
        /// `"alpha_u"` or `"alpha_p"`.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Iteration budget outside `[min, max]`.
    IterationsOutOfRange {
        /// The rejected value.
        value: usize,
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound.
        max: usize,
    },
    /// Tolerance outside `(0, 1)`.
    ToleranceOutOfRange {
        /// The rejected value.
        value: f64,
    },
    /// Lid velocity not finite and positive.
    LidVelocityOutOfRange {
        /// The rejected value.
        value: f64,
    },
    /// The limits themselves are inconsistent.
    InvalidLimits {
        /// Which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReynoldsOutOfRange { value, max } => {
                write!(f, "reynolds_number must be in (0, {max}), got {value}")
            }
            Self::GridOutOfRange {
                axis,
                value,
                min,
                max,
            } => write!(f, "{axis} must be in [{min}, {max}], got {value}"),
            Self::RelaxationOutOfRange { name, value } => {
                write!(f, "{name} must be in (0, 1], got {value}")
            }
            Self::IterationsOutOfRange { value, min, max } => {
                write!(f, "max_iter must be in [{min}, {max}], got {value}")
            }
            Self::ToleranceOutOfRange { value } => {
                write!(f, "tolerance must be in (0, 1), got {value}")
            }
            Self::LidVelocityOutOfRange { value } => {
                write!(f, "lid_velocity must be finite and positive, got {value}")
            }
            Self::InvalidLimits { reason } => write!(f, "invalid limits: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── ParameterLimits ────────────────────────────────────────────────

/// Accepted ranges for submitted [`SimulationParameters`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterLimits {
    /// Exclusive upper bound on the Reynolds number. Default: 100000.
    pub reynolds_max: f64,
    /// Smallest node count per direction. Default: 10.
    pub grid_min: usize,
    /// Largest node count per direction. Default: 200.
    pub grid_max: usize,
    /// Smallest iteration budget. Default: 100.
    pub max_iter_min: usize,
    /// Largest iteration budget. Default: 100000.
    pub max_iter_max: usize,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            reynolds_max: 100_000.0,
            grid_min: 10,
            grid_max: 200,
            max_iter_min: 100,
            max_iter_max: 100_000,
        }
    }
}

impl ParameterLimits {
    /// Check the limits are usable.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.grid_min < MIN_GRID_NODES {
            return Err(ConfigError::InvalidLimits {
                reason: format!(
                    "grid_min {} is below the solver minimum of {MIN_GRID_NODES}",
                    self.grid_min
                ),
            });
        }
        if self.grid_min > self.grid_max {
            return Err(ConfigError::InvalidLimits {
                reason: format!(
                    "grid_min ({}) exceeds grid_max ({})",
                    self.grid_min, self.grid_max
                ),
            });
        }
        if self.max_iter_min > self.max_iter_max {
            return Err(ConfigError::InvalidLimits {
                reason: format!(
                    "max_iter_min ({}) exceeds max_iter_max ({})",
                    self.max_iter_min, self.max_iter_max
                ),
            });
        }
        if !self.reynolds_max.is_finite() || self.reynolds_max <= 0.0 {
            return Err(ConfigError::InvalidLimits {
                reason: format!(
                    "reynolds_max must be finite and positive, got {}",
                    self.reynolds_max
                ),
            });
        }
        Ok(())
    }

    /// Validate `params` against these limits.
    ///
    /// Fields are checked in declaration order; the first violation wins.
    /// NaN fails every range check.
    pub fn validate(&self, params: &SimulationParameters) -> Result<(), ConfigError> {
        // 1. Reynolds number.
        let re = params.reynolds_number;
        if !(re > 0.0 && re < self.reynolds_max) {
            return Err(ConfigError::ReynoldsOutOfRange {
                value: re,
                max: self.reynolds_max,
            });
        }
        // 2. Grid counts.
        for (axis, value) in [("nx", params.nx), ("ny", params.ny)] {
            if !(self.grid_min..=self.grid_max).contains(&value) {
                return Err(ConfigError::GridOutOfRange {
                    axis,
                    value,
                    min: self.grid_min,
                    max: self.grid_max,
                });
            }
        }
        // 3. Relaxation factors.
        for (name, value) in [("alpha_u", params.alpha_u), ("alpha_p", params.alpha_p)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::RelaxationOutOfRange { name, value });
            }
        }
        // 4. Iteration budget.
        if !(self.max_iter_min..=self.max_iter_max).contains(&params.max_iter) {
            return Err(ConfigError::IterationsOutOfRange {
                value: params.max_iter,
                min: self.max_iter_min,
                max: self.max_iter_max,
            });
        }
        // 5. Tolerance.
        let tol = params.tolerance;
        if !(tol > 0.0 && tol < 1.0) {
            return Err(ConfigError::ToleranceOutOfRange { value: tol });
        }
        // 6. Lid velocity.
        let lid = params.lid_velocity;
        if !(lid.is_finite() && lid > 0.0) {
            return Err(ConfigError::LidVelocityOutOfRange { value: lid });
        }
        Ok(())
    }
}

// ── ServiceConfig ──────────────────────────────────────────────────

/// Configuration for [`SolverService`](crate::SolverService).
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Bounds applied to every submitted job.
    pub limits: ParameterLimits,
    /// Events buffered per subscriber before new ones are dropped.
    /// Default: 256.
    pub subscriber_capacity: usize,
    /// Worker threads are named `{prefix}-{job_id}`. Default: `"lidflow-solve"`.
    pub thread_name_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            limits: ParameterLimits::default(),
            subscriber_capacity: 256,
            thread_name_prefix: "lidflow-solve".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Check all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.check()?;
        if self.subscriber_capacity == 0 {
            return Err(ConfigError::InvalidLimits {
                reason: "subscriber_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
