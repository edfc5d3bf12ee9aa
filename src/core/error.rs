use thiserror::Error;

/// Errors surfaced by the simulation.
///
/// Movement and ray casting never fail; everything here is either a
/// configuration problem or an exhausted map during placement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Every floor cell is excluded, so nothing can be placed.
    #[error("no free floor cell left for placement")]
    NoFreeCell,

    #[error("maze dimensions must be odd and >= 3 (got {width}x{height})")]
    InvalidMazeDimensions { width: usize, height: usize },

    #[error("corridor widening factor must be >= 1 (got {0})")]
    InvalidWidenFactor(usize),

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),

    /// Discrete action index outside `0..Action::COUNT`.
    #[error("action index {0} out of range")]
    InvalidAction(usize),
}

pub type SimResult<T> = Result<T, SimError>;
