//! Removal operations for fsgc.
//!
//! A [`Remover`] performs the actual removal of one path. The [`Deleter`]
//! wraps a remover, logs every removal and turns failures into warnings so
//! that one locked file never stops a collection run.

mod deleter;
mod remover;

pub use deleter::{Deleter, DeletionSummary};
pub use remover::{FsRemover, Remover, TrashRemover};
