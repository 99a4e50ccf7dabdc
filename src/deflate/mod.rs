//! The DEFLATE compression engine.
//!
//! This module contains the LZ77 matcher, the strategy drivers and the
//! streaming orchestrator, ported from deflate.c / deflate.h v1.3.1.

pub mod api;
pub mod compress;
pub mod search;
pub mod state;
pub mod types;
pub mod window;

// Re-export the most important public API items at the module level.
pub use api::{compress_bound, compress_to_vec, Deflated, DeflateStream};
pub use state::DeflateState;
pub use types::{DataType, Flush, Status, Strategy, ZlibError};
