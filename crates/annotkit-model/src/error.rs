use thiserror::Error;

use crate::{GeometryKind, ItemId, LayerId};

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("no item with id {0}")]
    UnknownItem(ItemId),

    #[error("no layer with id {0}")]
    UnknownLayer(LayerId),

    #[error("geometry variant mismatch: expected a {expected}, found a {found}")]
    VariantMismatch {
        expected: GeometryKind,
        found: GeometryKind,
    },
}
