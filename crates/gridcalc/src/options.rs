//! Service options

/// Options for [`CellService`](crate::CellService)
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Maximum number of cell lookups a single evaluation may perform.
    ///
    /// The evaluator re-evaluates every reference from its raw formula and
    /// does not detect cycles; this bound turns a cycle into
    /// [`ServiceError::ResolutionLimit`](crate::ServiceError::ResolutionLimit)
    /// instead of a stack overflow. `None` removes the bound.
    pub max_resolutions: Option<usize>,
    /// Maximum nesting of groups and references in a single evaluation.
    ///
    /// Parsing and evaluation recurse once per level, so deeply nested input
    /// fails with [`FormulaError::NestingLimit`](gridcalc_formula::FormulaError::NestingLimit)
    /// instead of exhausting the stack. `None` removes the bound.
    pub max_depth: Option<usize>,
    /// Lowercase sheet and cell identifiers, including references inside formulas
    pub normalize_ids: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            max_resolutions: Some(256),
            max_depth: Some(512),
            normalize_ids: true,
        }
    }
}

impl ServiceOptions {
    /// Builder-style setter for [`ServiceOptions::max_resolutions`]
    pub fn with_max_resolutions(mut self, max: Option<usize>) -> Self {
        self.max_resolutions = max;
        self
    }

    /// Builder-style setter for [`ServiceOptions::max_depth`]
    pub fn with_max_depth(mut self, max: Option<usize>) -> Self {
        self.max_depth = max;
        self
    }

    /// Builder-style setter for [`ServiceOptions::normalize_ids`]
    pub fn with_normalize_ids(mut self, normalize: bool) -> Self {
        self.normalize_ids = normalize;
        self
    }
}
