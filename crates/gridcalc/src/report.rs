//! Presentation of results: number formatting, sheet listings and error reports

use gridcalc_core::Cell;
use serde::{Serialize, Serializer};

/// Marker stored in place of a result when a formula is rejected
pub const ERROR_RESULT: &str = "ERROR";

/// Format an evaluation result for storage and display.
///
/// The value is narrowed to single precision and printed with the fewest
/// digits that round-trip, without an exponent: `4`, `0.3`, `-4`.
/// Non-finite values print as `+Inf`, `-Inf` and `NaN`.
pub fn format_result(value: f64) -> String {
    let narrowed = value as f32;
    if narrowed.is_nan() {
        "NaN".to_string()
    } else if narrowed == f32::INFINITY {
        "+Inf".to_string()
    } else if narrowed == f32::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{}", narrowed)
    }
}

/// All cells of one sheet, ordered by cell id
///
/// Serializes as an object keyed by cell id.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub id: String,
    pub cells: Vec<Cell>,
}

impl Sheet {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cell_id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.cell_id == cell_id)
    }
}

impl Serialize for Sheet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.cells.iter().map(|cell| (&cell.cell_id, cell)))
    }
}

/// What a rejected upsert reports back: the error, the formula as entered,
/// and [`ERROR_RESULT`] in place of a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub value: String,
    pub result: String,
}

impl ErrorReport {
    pub fn new(value: &str, error: &impl std::fmt::Display) -> Self {
        Self {
            message: error.to_string(),
            value: value.to_string(),
            result: ERROR_RESULT.to_string(),
        }
    }
}
