//! Formula evaluator
//!
//! Folds the siblings of a [`Tree`] left to right. Groups are evaluated
//! recursively; cell references are resolved to their raw formula text,
//! parsed and evaluated again on every occurrence. Nothing is cached, and
//! reference cycles are not detected: a self-referencing cell recurses until
//! the stack is exhausted, so callers that expose this to untrusted input
//! must bound the number of lookups in their [`FormulaSource`] and use
//! [`evaluate_with_max_depth`] to bound nesting.

use crate::error::{FormulaError, FormulaResult};
use crate::node::{Node, Operator, Tree};
use crate::parser::{parse, parse_within, DepthLimit};

/// Capability that maps a cell to its raw stored formula text
pub trait FormulaSource {
    /// Return the formula stored for `cell` in `sheet`.
    ///
    /// A missing cell must be reported as [`FormulaError::NotFound`].
    fn formula(&self, sheet: &str, cell: &str) -> FormulaResult<String>;
}

/// A [`FormulaSource`] backed by a closure
pub struct FnSource<F>(F);

/// Create a [`FormulaSource`] from a closure
///
/// # Example
/// ```rust
/// use gridcalc_formula::{evaluate_formula, source_fn, FormulaError};
///
/// let source = source_fn(|_sheet: &str, cell: &str| match cell {
///     "X" => Ok("2+2".to_string()),
///     other => Err(FormulaError::NotFound(other.to_string())),
/// });
/// assert_eq!(evaluate_formula("X+(X-1)", "sheet1", &source).unwrap(), 7.0);
/// ```
pub fn source_fn<F>(f: F) -> FnSource<F>
where
    F: Fn(&str, &str) -> FormulaResult<String>,
{
    FnSource(f)
}

impl<F> FormulaSource for FnSource<F>
where
    F: Fn(&str, &str) -> FormulaResult<String>,
{
    fn formula(&self, sheet: &str, cell: &str) -> FormulaResult<String> {
        (self.0)(sheet, cell)
    }
}

/// Parse and evaluate a formula in one step
pub fn evaluate_formula<S>(formula: &str, sheet: &str, source: &S) -> FormulaResult<f64>
where
    S: FormulaSource + ?Sized,
{
    let tree = parse(formula)?;
    evaluate(&tree, sheet, source)
}

/// Evaluate a parsed tree, resolving references within `sheet`
pub fn evaluate<S>(tree: &Tree, sheet: &str, source: &S) -> FormulaResult<f64>
where
    S: FormulaSource + ?Sized,
{
    Evaluation::new(sheet, source, None).nodes(tree.nodes(), 0)
}

/// Evaluate a parsed tree with at most `max_depth` nested levels.
///
/// Groups and resolved references each count as one level, and the count
/// carries through references: a cell referenced from three groups deep
/// starts at level four. Exceeding the bound fails with
/// [`FormulaError::NestingLimit`].
pub fn evaluate_with_max_depth<S>(
    tree: &Tree,
    sheet: &str,
    source: &S,
    max_depth: usize,
) -> FormulaResult<f64>
where
    S: FormulaSource + ?Sized,
{
    Evaluation::new(sheet, source, Some(max_depth)).nodes(tree.nodes(), 0)
}

/// One evaluation: the sheet references resolve in and the nesting bound
struct Evaluation<'a, S: ?Sized> {
    sheet: &'a str,
    source: &'a S,
    max_depth: Option<usize>,
}

impl<'a, S> Evaluation<'a, S>
where
    S: FormulaSource + ?Sized,
{
    fn new(sheet: &'a str, source: &'a S, max_depth: Option<usize>) -> Self {
        Self {
            sheet,
            source,
            max_depth,
        }
    }

    fn nodes(&self, nodes: &[Node], level: usize) -> FormulaResult<f64> {
        let mut fold = Fold::AwaitingOperand;

        for node in nodes {
            let operand = match node {
                Node::FormulaMarker => continue,
                Node::Plus | Node::Minus | Node::Multiply | Node::Divide => {
                    if let Some(op) = node.operator() {
                        fold = fold.operator(op);
                    }
                    continue;
                }
                Node::Group(children) => self.nodes(children, self.descend(level)?)?,
                Node::Variable(cell) => self.resolve(cell, level)?,
                Node::Integer(text) | Node::Float(text) => parse_literal(text)?,
            };

            fold = fold.operand(operand);
        }

        Ok(fold.finish())
    }

    fn descend(&self, level: usize) -> FormulaResult<usize> {
        let next = level + 1;
        match self.max_depth {
            Some(max) if next > max => Err(FormulaError::NestingLimit(max)),
            _ => Ok(next),
        }
    }

    fn resolve(&self, cell: &str, level: usize) -> FormulaResult<f64> {
        let level = self.descend(level)?;
        tracing::trace!(sheet = self.sheet, cell, level, "resolving reference");
        let formula = self.source.formula(self.sheet, cell)?;

        let limit = self.max_depth.map(|max| DepthLimit {
            max,
            remaining: max - level,
        });
        let tree = parse_within(&formula, limit)?;
        self.nodes(tree.nodes(), level)
    }
}

fn parse_literal(text: &str) -> FormulaResult<f64> {
    text.parse::<f64>()
        .map_err(|source| FormulaError::NumericParse {
            literal: text.to_string(),
            source,
        })
}

/// Fold state over one sibling sequence
#[derive(Debug, Clone, Copy, PartialEq)]
enum Fold {
    /// Nothing seen yet
    AwaitingOperand,
    /// A running result and no pending operator
    HaveOperand(f64),
    /// A running result and an operator waiting for its right-hand side
    HaveOperandAwaitingRhs(f64, Operator),
}

impl Fold {
    fn operator(self, op: Operator) -> Fold {
        match self {
            // An operator before any operand applies to zero
            Fold::AwaitingOperand => Fold::HaveOperandAwaitingRhs(0.0, op),
            Fold::HaveOperand(result) | Fold::HaveOperandAwaitingRhs(result, _) => {
                Fold::HaveOperandAwaitingRhs(result, op)
            }
        }
    }

    fn operand(self, value: f64) -> Fold {
        match self {
            Fold::AwaitingOperand | Fold::HaveOperand(_) => Fold::HaveOperand(value),
            Fold::HaveOperandAwaitingRhs(result, op) => Fold::HaveOperand(op.apply(result, value)),
        }
    }

    fn finish(self) -> f64 {
        match self {
            Fold::AwaitingOperand => 0.0,
            Fold::HaveOperand(result) | Fold::HaveOperandAwaitingRhs(result, _) => result,
        }
    }
}
