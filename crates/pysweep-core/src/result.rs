//! Result alias used throughout the engine

use crate::error::SweepError;

pub type Result<T> = std::result::Result<T, SweepError>;
