// src/error.rs

//! Error types for the tile compositor.

use crate::display::DisplayError;
use crate::geometry::{Position, Size};

/// Errors surfaced by tiles, the manager and the animation scheduler.
///
/// Out-of-range pixel writes inside a tile are never an error; they are
/// dropped by the tile's canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum TilesError {
    /// Construction parameters are missing or inconsistent.
    Configuration(String),
    /// A registered tile's footprint runs past the edge of the matrix.
    Placement {
        tile: String,
        offset: Position,
        tile_size: Size,
        matrix: Size,
    },
    /// A property was assigned a value of the wrong type or out of range.
    /// The property keeps its previous value.
    InvalidArgument { name: &'static str, reason: String },
    /// The display driver rejected an operation.
    Display(DisplayError),
    /// The animation thread could not be started or died abnormally.
    Scheduler(String),
}

impl TilesError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        TilesError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for TilesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TilesError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            TilesError::Placement {
                tile,
                offset,
                tile_size,
                matrix,
            } => write!(
                f,
                "cannot render tile {}: a {} tile at offset {} does not fit in the {} matrix",
                tile, tile_size, offset, matrix
            ),
            TilesError::InvalidArgument { name, reason } => {
                write!(f, "invalid value for {}: {}", name, reason)
            }
            TilesError::Display(e) => write!(f, "display driver error: {}", e),
            TilesError::Scheduler(msg) => write!(f, "animation scheduler: {}", msg),
        }
    }
}

impl std::error::Error for TilesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TilesError::Display(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DisplayError> for TilesError {
    fn from(err: DisplayError) -> Self {
        TilesError::Display(err)
    }
}

pub type Result<T, E = TilesError> = std::result::Result<T, E>;
