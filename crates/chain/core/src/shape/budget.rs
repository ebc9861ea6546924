use std::time::{Duration, Instant};

use super::SearchLimit;
use crate::error::{ChainError, ErrorSeverity};

/// Limits bounding one target search.
///
/// Every numeric field is strictly positive. `timeout` and `max_iterations`
/// only bound worst-case work on pathological grids; hitting them truncates
/// the search without failing the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBudget {
    max_count: u32,
    max_distance: u32,
    timeout: Duration,
    max_iterations: u32,
    allow_diagonal: bool,
}

impl SearchBudget {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2_000);
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

    /// # Errors
    ///
    /// Returns [`BudgetError::Zero`] if either limit is zero.
    pub fn new(max_count: u32, max_distance: u32) -> Result<Self, BudgetError> {
        Ok(Self {
            max_count: positive("max_count", max_count)?,
            max_distance: positive("max_distance", max_distance)?,
            timeout: Self::DEFAULT_TIMEOUT,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            allow_diagonal: false,
        })
    }

    pub fn with_max_count(self, max_count: u32) -> Result<Self, BudgetError> {
        Ok(Self {
            max_count: positive("max_count", max_count)?,
            ..self
        })
    }

    pub fn with_max_distance(self, max_distance: u32) -> Result<Self, BudgetError> {
        Ok(Self {
            max_distance: positive("max_distance", max_distance)?,
            ..self
        })
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, BudgetError> {
        if timeout.is_zero() {
            return Err(BudgetError::Zero("timeout"));
        }
        Ok(Self { timeout, ..self })
    }

    pub fn with_max_iterations(self, max_iterations: u32) -> Result<Self, BudgetError> {
        Ok(Self {
            max_iterations: positive("max_iterations", max_iterations)?,
            ..self
        })
    }

    #[must_use]
    pub fn with_diagonal(self, allow_diagonal: bool) -> Self {
        Self {
            allow_diagonal,
            ..self
        }
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn allow_diagonal(&self) -> bool {
        self.allow_diagonal
    }

    pub(crate) fn max_count_usize(&self) -> usize {
        usize::try_from(self.max_count).unwrap_or(usize::MAX)
    }

    /// Starts the cooperative clock for one search.
    pub fn start(&self) -> SearchMeter {
        SearchMeter {
            started: Instant::now(),
            timeout: self.timeout,
            iterations: 0,
            max_iterations: self.max_iterations,
        }
    }
}

fn positive(field: &'static str, value: u32) -> Result<u32, BudgetError> {
    if value == 0 {
        Err(BudgetError::Zero(field))
    } else {
        Ok(value)
    }
}

/// Iteration and wall-clock accounting polled once per search step.
#[derive(Debug)]
pub struct SearchMeter {
    started: Instant,
    timeout: Duration,
    iterations: u32,
    max_iterations: u32,
}

impl SearchMeter {
    /// Counts one step. Returns the limit that forbids it, if any.
    pub fn tick(&mut self) -> Option<SearchLimit> {
        if self.iterations >= self.max_iterations {
            return Some(SearchLimit::IterationCap);
        }
        if self.started.elapsed() > self.timeout {
            return Some(SearchLimit::Timeout);
        }
        self.iterations += 1;
        None
    }

    /// Checks the clock only. Scans over a fixed box poll this instead of
    /// [`tick`](Self::tick) since their cell count is already bounded.
    pub fn poll_timeout(&self) -> Option<SearchLimit> {
        (self.started.elapsed() > self.timeout).then_some(SearchLimit::Timeout)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BudgetError {
    #[error("search budget field `{0}` must be greater than zero")]
    Zero(&'static str),
}

impl ChainError for BudgetError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "BUDGET_ZERO_LIMIT"
    }
}
