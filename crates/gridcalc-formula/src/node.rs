//! Formula tree types
//!
//! A parsed formula is a flat [`Tree`] of sibling [`Node`]s. Precedence is
//! carried by structure: `*` and `/` live inside synthetic [`Node::Group`]s
//! of the shape `[lhs, op, rhs]`, so a left-to-right fold over siblings is
//! enough to evaluate a tree.

use std::fmt;

/// A single node of a formula tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Leading `=`; carries no value
    FormulaMarker,
    Plus,
    Minus,
    Multiply,
    Divide,
    /// Nested sibling sequence, from parentheses or precedence rewriting
    Group(Vec<Node>),
    /// Integer literal, kept as written
    Integer(String),
    /// Float literal, kept as written
    Float(String),
    /// Reference to another cell
    Variable(String),
}

/// Arithmetic operator carried by an operator node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Apply the operator with IEEE-754 semantics (division by zero is not an error)
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
        }
    }

    /// The character this operator is written with
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

impl Node {
    /// Build a literal or reference node from a scanned token.
    ///
    /// A token starting with a letter or `_` is a [`Node::Variable`];
    /// anything else is numeric, and a `.` anywhere makes it a [`Node::Float`].
    pub fn operand(token: String) -> Node {
        let starts_with_letter = token
            .chars()
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_');

        if starts_with_letter {
            Node::Variable(token)
        } else if token.contains('.') {
            Node::Float(token)
        } else {
            Node::Integer(token)
        }
    }

    /// The pending group a unary minus is rewritten into: `[-1, *]`
    pub fn negation() -> Node {
        Node::Group(vec![Node::Integer("-1".into()), Node::Multiply])
    }

    /// Children of a group; empty for every other kind
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group(children) => children.as_slice(),
            _ => &[],
        }
    }

    /// The arithmetic operator this node stands for, if any
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Node::Plus => Some(Operator::Add),
            Node::Minus => Some(Operator::Subtract),
            Node::Multiply => Some(Operator::Multiply),
            Node::Divide => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Operators and the formula marker: nodes after which an operand is expected
    pub fn is_operator(&self) -> bool {
        matches!(self, Node::FormulaMarker) || self.operator().is_some()
    }

    /// Whether this is a `*`/`/` group still waiting for its right operand.
    ///
    /// `[lhs, op]` is pending; `[lhs, op, rhs]` is pending only while `rhs`
    /// is itself pending (a unary minus right after `*` or `/`).
    pub fn awaits_operand(&self) -> bool {
        let mut node = self;
        loop {
            match node.children() {
                [_, op] => return matches!(op, Node::Multiply | Node::Divide),
                [_, op, rhs] if matches!(op, Node::Multiply | Node::Divide) => node = rhs,
                _ => return false,
            }
        }
    }

    /// Complete the innermost pending group with `node`.
    ///
    /// Only meaningful when [`Node::awaits_operand`] holds.
    fn complete(&mut self, node: Node) {
        let mut current = self;
        while let Node::Group(children) = current {
            if children.len() == 2 {
                children.push(node);
                return;
            }
            match children.last_mut() {
                Some(rhs) => current = rhs,
                None => return,
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::FormulaMarker => write!(f, "="),
            Node::Group(children) => {
                write!(f, "(")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Node::Integer(text) | Node::Float(text) | Node::Variable(text) => write!(f, "{}", text),
            op => match op.operator() {
                Some(op) => write!(f, "{}", op.symbol()),
                None => Ok(()),
            },
        }
    }
}

/// An ordered sequence of sibling nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree(Vec<Node>);

impl Tree {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most recently completed node
    pub fn last(&self) -> Option<&Node> {
        self.0.last()
    }

    /// Whether the next node at this level has to be an operand.
    ///
    /// False only when the last node is a finished operand: a literal, a
    /// reference, or a group that is not waiting for a right operand.
    pub fn expects_operand(&self) -> bool {
        match self.last() {
            None => true,
            Some(node) => node.is_operator() || node.awaits_operand(),
        }
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.0.push(node);
    }

    /// Append an operand, completing a pending `*`/`/` group if there is one
    pub(crate) fn attach(&mut self, node: Node) {
        match self.0.last_mut() {
            Some(last) if last.awaits_operand() => last.complete(node),
            _ => self.0.push(node),
        }
    }

    /// Replace the last node with the pending group `[last, op]`.
    ///
    /// Returns false when there is nothing to wrap.
    pub(crate) fn wrap_last(&mut self, op: Node) -> bool {
        match self.0.pop() {
            Some(last) => {
                self.0.push(Node::Group(vec![last, op]));
                true
            }
            None => false,
        }
    }
}

impl From<Vec<Node>> for Tree {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.0 {
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}
