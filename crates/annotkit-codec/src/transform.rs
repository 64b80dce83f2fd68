//! Affine matrices in documents.
//!
//! Written as a 3×3 row-major nested array `[[a, c, tx], [b, d, ty], [0, 0, 1]]`. The flat
//! six-element form `[a, b, c, d, tx, ty]` is also accepted on decode.

use annotkit_core::{DAffine2, DVec2};
use annotkit_model::raster::MIN_DETERMINANT;
use serde_json::{Value, json};

use crate::error::FormatError;
use crate::value::{as_array, index, number};

#[must_use]
pub fn encode_matrix(m: &DAffine2) -> Value {
    let [a, b, c, d, tx, ty] = m.to_cols_array();
    json!([[a, c, tx], [b, d, ty], [0.0, 0.0, 1.0]])
}

pub fn decode_matrix(v: &Value, path: &str) -> Result<DAffine2, FormatError> {
    let rows = as_array(v, path)?;
    let m = match rows.len() {
        6 => {
            let mut flat = [0.0; 6];
            for (i, slot) in flat.iter_mut().enumerate() {
                *slot = number(&rows[i], &index(path, i))?;
            }
            DAffine2::from_cols_array(&flat)
        }
        2 | 3 => {
            let mut cells = [[0.0; 3]; 2];
            for (r, cells_row) in cells.iter_mut().enumerate() {
                let row_path = index(path, r);
                let row = as_array(&rows[r], &row_path)?;
                if row.len() != 3 {
                    return Err(FormatError::invalid(row_path, "expected three columns"));
                }
                for (c, cell) in cells_row.iter_mut().enumerate() {
                    *cell = number(&row[c], &index(&row_path, c))?;
                }
            }
            let [[a, c, tx], [b, d, ty]] = cells;
            DAffine2::from_cols_array(&[a, b, c, d, tx, ty])
        }
        n => {
            return Err(FormatError::invalid(
                path,
                format!("expected a 3x3 or 6-element matrix, got {n} entries"),
            ));
        }
    };
    if m.matrix2.determinant().abs() < MIN_DETERMINANT {
        return Err(FormatError::NonInvertibleTransform {
            path: path.to_string(),
        });
    }
    Ok(m)
}

/// Reject a raster scaling that would collapse the image onto a line or a point.
pub fn check_scaling(scaling: DVec2, path: &str) -> Result<(), FormatError> {
    if scaling.x.abs() < MIN_DETERMINANT || scaling.y.abs() < MIN_DETERMINANT {
        return Err(FormatError::NonInvertibleTransform {
            path: path.to_string(),
        });
    }
    Ok(())
}
