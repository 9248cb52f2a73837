mod algorithm;
mod cbs;
mod comm;

pub use cbs::CBS;

use crate::common::Solution;
use std::fmt;

/// Outcomes of a search that ends without a solution. Infeasibility of a
/// single branch is routine inside the loop and never surfaces here; these
/// are terminal results for the whole invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// The constraint tree was exhausted: no conflict-free node exists.
    Exhausted,
    /// The high-level expansion budget ran out before the search decided
    /// either way. Distinct from proven infeasibility.
    BudgetExceeded { expanded: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Exhausted => write!(f, "no solution exists"),
            SolveError::BudgetExceeded { expanded } => {
                write!(f, "no solution within budget ({expanded} nodes expanded)")
            }
        }
    }
}

impl std::error::Error for SolveError {}

pub trait Solver {
    fn solve(&mut self) -> Result<Solution, SolveError>;
}
