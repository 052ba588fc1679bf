//! Business operations, one module per trigger kind.

pub mod api;
pub mod pick;
pub mod picture;
