use thiserror::Error;

/// Failures a placer reports instead of an arithmetic fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// Too few points, or a bounding box with zero extent on some axis.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// More clusters requested than points available, or no demand data.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// Every candidate was disqualified by a gate.
    #[error("no feasible candidate: {0}")]
    NoFeasibleCandidate(String),
    #[error("invalid location: {0}")]
    InvalidLocation(String),
}

pub type PlacementResult<T> = Result<T, PlacementError>;
