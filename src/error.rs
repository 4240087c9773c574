use thiserror::Error;

use crate::tile::TileState;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("tile {index} returned in state {state:?}")]
    InvalidTransition { index: usize, state: TileState },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type TileResult<T> = Result<T, TileError>;
