//! Huffman coding and block emission.
//!
//! Ported from trees.c / trees.h v1.3.1.

pub mod encode;
pub mod huffman;
pub mod tables;

// Re-export key items at the module level.
pub use encode::BitWriter;
pub use tables::{static_tables, CtData, StaticTreeDesc, TreeKind};
