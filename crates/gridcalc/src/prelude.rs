//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    // Storage
    CellStore,
    // Service
    CellService,
    ErrorReport,
    // Error types
    FormulaError,
    JsonFileStore,
    MemoryStore,
    ServiceError,
    ServiceOptions,
    ServiceResult,
    Sheet,
};
