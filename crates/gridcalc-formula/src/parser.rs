//! Formula parser
//!
//! A single left-to-right scan that builds a [`Tree`] without a precedence
//! table. `+` and binary `-` are appended as they come; `*` and `/` wrap the
//! previous operand into a pending group that the next operand completes;
//! unary `-` becomes the pending group `[-1, *]`. Parenthesised text is
//! captured verbatim and parsed recursively into a [`Node::Group`].

use crate::error::{FormulaError, FormulaResult};
use crate::node::{Node, Tree};

/// Parse a formula string into a tree
///
/// The leading `=` is optional. Nesting is not bounded; see
/// [`parse_with_max_depth`] for input that is not trusted.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse;
///
/// assert_eq!(parse("=2+2").unwrap().len(), 4);
/// assert!(parse("A1*(-A2+A3)/0.5").is_ok());
/// assert!(parse("2+((-4").is_err());
/// ```
pub fn parse(formula: &str) -> FormulaResult<Tree> {
    parse_within(formula, None)
}

/// Parse a formula, failing with [`FormulaError::NestingLimit`] once the tree
/// would be more than `max_depth` groups deep
///
/// Parentheses, `*`/`/` chains and unary minus all add group levels. The
/// check runs during the scan, so over-deep input is rejected before it can
/// exhaust the stack.
///
/// ```rust
/// use gridcalc_formula::{parse_with_max_depth, FormulaError};
///
/// assert!(parse_with_max_depth("((1))", 2).is_ok());
/// assert_eq!(
///     parse_with_max_depth("(((1)))", 2),
///     Err(FormulaError::NestingLimit(2))
/// );
/// ```
pub fn parse_with_max_depth(formula: &str, max_depth: usize) -> FormulaResult<Tree> {
    parse_within(formula, Some(DepthLimit::new(max_depth)))
}

pub(crate) fn parse_within(formula: &str, limit: Option<DepthLimit>) -> FormulaResult<Tree> {
    FormulaParser::new(true, limit)
        .parse(formula)
        .map(|(tree, _)| tree)
}

/// Group levels still available, and the bound they were carved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DepthLimit {
    pub max: usize,
    pub remaining: usize,
}

impl DepthLimit {
    pub fn new(max: usize) -> Self {
        Self { max, remaining: max }
    }

    fn check(self, depth: usize) -> FormulaResult<()> {
        if depth > self.remaining {
            return Err(FormulaError::NestingLimit(self.max));
        }
        Ok(())
    }

    /// The limit one group level down, if there is room for one
    fn inner(self) -> FormulaResult<DepthLimit> {
        self.check(1)?;
        Ok(DepthLimit {
            max: self.max,
            remaining: self.remaining - 1,
        })
    }
}

/// Scanner state for one nesting level
struct FormulaParser {
    /// Whether a leading `=` is accepted at this level
    allow_marker: bool,
    limit: Option<DepthLimit>,
    tree: Tree,
    /// Literal or identifier being scanned
    token: String,
    /// Text captured between the outermost `(` and its matching `)`
    group: String,
    /// Open parentheses while capturing
    open: usize,
    /// Pending `*`/`/` groups chained through the last node
    pending: usize,
    /// Group depth of the last node
    last_depth: usize,
    /// Group depth of the whole tree
    depth: usize,
}

impl FormulaParser {
    fn new(allow_marker: bool, limit: Option<DepthLimit>) -> Self {
        Self {
            allow_marker,
            limit,
            tree: Tree::new(),
            token: String::new(),
            group: String::new(),
            open: 0,
            pending: 0,
            last_depth: 0,
            depth: 0,
        }
    }

    /// Scan `input`, returning the tree and its group depth
    fn parse(mut self, input: &str) -> FormulaResult<(Tree, usize)> {
        for c in input.trim().chars() {
            if self.open > 0 {
                self.capture(c)?;
                continue;
            }

            // Whitespace is dropped without ending the token: `1 2` is `12`
            if c.is_whitespace() {
                continue;
            }

            if is_token_char(c) || (c == '.' && self.in_number()) {
                self.token.push(c);
                continue;
            }

            self.flush_token()?;

            match c {
                '=' => self.marker()?,
                '+' => self.binary(Node::Plus)?,
                '-' => self.minus()?,
                '*' => self.wrap(Node::Multiply)?,
                '/' => self.wrap(Node::Divide)?,
                '(' => self.open = 1,
                ')' => return Err(FormulaError::InvalidParentheses),
                _ => return Err(FormulaError::InvalidOperation),
            }
        }

        if self.open > 0 {
            return Err(FormulaError::InvalidParentheses);
        }

        self.flush_token()?;

        // Trailing operator, empty input, or a bare `=`
        if self.tree.expects_operand() {
            return Err(FormulaError::InvalidOperation);
        }

        Ok((self.tree, self.depth))
    }

    /// Whether the token being scanned is a number (so `.` may continue it)
    fn in_number(&self) -> bool {
        self.token.chars().next().map_or(false, |c| c.is_numeric())
    }

    fn capture(&mut self, c: char) -> FormulaResult<()> {
        match c {
            '(' => {
                self.open += 1;
                self.group.push(c);
            }
            ')' if self.open == 1 => {
                self.open = 0;
                self.close_group()?;
            }
            ')' => {
                self.open -= 1;
                self.group.push(c);
            }
            _ => self.group.push(c),
        }
        Ok(())
    }

    fn close_group(&mut self) -> FormulaResult<()> {
        if !self.tree.expects_operand() {
            return Err(FormulaError::InvalidOperation);
        }

        let inner = self.limit.map(DepthLimit::inner).transpose()?;
        let text = std::mem::take(&mut self.group);
        let (children, depth) = FormulaParser::new(false, inner).parse(&text)?;
        self.attach(Node::Group(children.into_nodes()), depth + 1)
    }

    fn flush_token(&mut self) -> FormulaResult<()> {
        if self.token.is_empty() {
            return Ok(());
        }

        if !self.tree.expects_operand() {
            return Err(FormulaError::InvalidOperation);
        }

        let token = std::mem::take(&mut self.token);
        self.attach(Node::operand(token), 0)
    }

    /// Attach an operand `depth` groups deep, completing any pending group
    fn attach(&mut self, node: Node, depth: usize) -> FormulaResult<()> {
        let reached = if self.pending > 0 {
            self.last_depth.max(self.pending + depth)
        } else {
            depth
        };
        self.reach(reached)?;

        self.tree.attach(node);
        self.pending = 0;
        Ok(())
    }

    /// Record the depth of the last node after a change to it
    fn reach(&mut self, depth: usize) -> FormulaResult<()> {
        if let Some(limit) = self.limit {
            limit.check(depth)?;
        }
        self.last_depth = depth;
        self.depth = self.depth.max(depth);
        Ok(())
    }

    fn push_operator(&mut self, op: Node) {
        self.tree.push(op);
        self.pending = 0;
        self.last_depth = 0;
    }

    fn marker(&mut self) -> FormulaResult<()> {
        if !self.allow_marker || !self.tree.is_empty() {
            return Err(FormulaError::InvalidOperation);
        }
        self.push_operator(Node::FormulaMarker);
        Ok(())
    }

    fn binary(&mut self, op: Node) -> FormulaResult<()> {
        if self.tree.expects_operand() {
            return Err(FormulaError::InvalidOperation);
        }
        self.push_operator(op);
        Ok(())
    }

    fn minus(&mut self) -> FormulaResult<()> {
        if !self.tree.expects_operand() {
            self.push_operator(Node::Minus);
            return Ok(());
        }

        // Negation nests inside the innermost pending group, if any
        let reached = if self.pending > 0 {
            self.last_depth.max(self.pending + 1)
        } else {
            1
        };
        self.reach(reached)?;

        self.tree.attach(Node::negation());
        self.pending += 1;
        Ok(())
    }

    fn wrap(&mut self, op: Node) -> FormulaResult<()> {
        if self.tree.expects_operand() {
            return Err(FormulaError::InvalidOperation);
        }
        self.reach(self.last_depth + 1)?;

        if !self.tree.wrap_last(op) {
            return Err(FormulaError::InvalidOperation);
        }
        self.pending = 1;
        Ok(())
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(text: &str) -> Node {
        Node::Integer(text.into())
    }

    fn var(text: &str) -> Node {
        Node::Variable(text.into())
    }

    fn group(children: Vec<Node>) -> Node {
        Node::Group(children)
    }

    #[test]
    fn test_parse_simple_sum() {
        let tree = parse("2+2").unwrap();
        assert_eq!(tree.nodes(), &[int("2"), Node::Plus, int("2")]);
    }

    #[test]
    fn test_parse_marker() {
        let tree = parse("=A1").unwrap();
        assert_eq!(tree.nodes(), &[Node::FormulaMarker, var("A1")]);

        let tree = parse("  = 7 ").unwrap();
        assert_eq!(tree.nodes(), &[Node::FormulaMarker, int("7")]);
    }

    #[test]
    fn test_parse_marker_only_at_start() {
        assert_eq!(parse("2=3"), Err(FormulaError::InvalidOperation));
        assert_eq!(parse("==2"), Err(FormulaError::InvalidOperation));
        assert_eq!(parse("(=2)"), Err(FormulaError::InvalidOperation));
    }

    #[test]
    fn test_parse_precedence_grouping() {
        let tree = parse("1+2*3").unwrap();
        assert_eq!(
            tree.nodes(),
            &[int("1"), Node::Plus, group(vec![int("2"), Node::Multiply, int("3")])]
        );

        // Left associative: (8/4)*2
        let tree = parse("8/4*2").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![
                group(vec![int("8"), Node::Divide, int("4")]),
                Node::Multiply,
                int("2"),
            ])]
        );
    }

    #[test]
    fn test_parse_parenthesised_operand_completes_group() {
        let tree = parse("(a+b)*c").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![
                group(vec![var("a"), Node::Plus, var("b")]),
                Node::Multiply,
                var("c"),
            ])]
        );

        let tree = parse("c*(a+b)").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![
                var("c"),
                Node::Multiply,
                group(vec![var("a"), Node::Plus, var("b")]),
            ])]
        );
    }

    #[test]
    fn test_parse_unary_minus() {
        let tree = parse("-5").unwrap();
        assert_eq!(tree.nodes(), &[group(vec![int("-1"), Node::Multiply, int("5")])]);

        let tree = parse("2--5").unwrap();
        assert_eq!(
            tree.nodes(),
            &[
                int("2"),
                Node::Minus,
                group(vec![int("-1"), Node::Multiply, int("5")]),
            ]
        );
    }

    #[test]
    fn test_parse_minus_after_group_is_binary() {
        let tree = parse("(1+1)-1").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![int("1"), Node::Plus, int("1")]), Node::Minus, int("1")]
        );

        let tree = parse("2*3-1").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![int("2"), Node::Multiply, int("3")]), Node::Minus, int("1")]
        );
    }

    #[test]
    fn test_parse_unary_minus_after_multiply() {
        let tree = parse("2*-3").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![
                int("2"),
                Node::Multiply,
                group(vec![int("-1"), Node::Multiply, int("3")]),
            ])]
        );
    }

    #[test]
    fn test_parse_double_unary_minus() {
        let tree = parse("--3").unwrap();
        assert_eq!(
            tree.nodes(),
            &[group(vec![
                int("-1"),
                Node::Multiply,
                group(vec![int("-1"), Node::Multiply, int("3")]),
            ])]
        );
    }

    #[test]
    fn test_parse_reference_formula() {
        let tree = parse("=A1*(-A2+cell_3)/0.5").unwrap();
        assert_eq!(
            tree.nodes(),
            &[
                Node::FormulaMarker,
                group(vec![
                    group(vec![
                        var("A1"),
                        Node::Multiply,
                        group(vec![
                            group(vec![int("-1"), Node::Multiply, var("A2")]),
                            Node::Plus,
                            var("cell_3"),
                        ]),
                    ]),
                    Node::Divide,
                    Node::Float("0.5".into()),
                ]),
            ]
        );
    }

    #[test]
    fn test_parse_nested_parentheses() {
        let tree = parse("((2))").unwrap();
        assert_eq!(tree.nodes(), &[group(vec![group(vec![int("2")])])]);
    }

    #[test]
    fn test_parse_whitespace() {
        let tree = parse(" 12 +\tx_1 ").unwrap();
        assert_eq!(tree.nodes(), &[int("12"), Node::Plus, var("x_1")]);

        // Whitespace does not end a token
        assert_eq!(parse("1 2").unwrap().nodes(), &[int("12")]);
        assert_eq!(parse("A 1").unwrap().nodes(), &[var("A1")]);
        assert_eq!(parse("0. 5").unwrap().nodes(), &[Node::Float("0.5".into())]);
        assert_eq!(
            parse("1 0 + 2").unwrap().nodes(),
            &[int("10"), Node::Plus, int("2")]
        );
    }

    #[test]
    fn test_parse_invalid_parentheses() {
        for input in ["2+((-4", "2+(4/2(", "(", "2+)", ")(", "(1+2))"] {
            assert_eq!(
                parse(input),
                Err(FormulaError::InvalidParentheses),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_parse_invalid_operations() {
        let inputs = [
            "5+", "5-", "*5", "5*", "/5", "5/", "5(2+2)", "(2+2)5", "*(3+3)", "+5", "2++3", "2*/3",
            "2-*3", "-", "", "=", "a (b)",
        ];
        for input in inputs {
            assert_eq!(parse(input), Err(FormulaError::InvalidOperation), "input: {input}");
        }
    }

    #[test]
    fn test_parse_stray_characters() {
        for input in ["2^3", "10%", ".5", "A1.5", "(1$)", "a;b"] {
            assert_eq!(parse(input), Err(FormulaError::InvalidOperation), "input: {input}");
        }
    }

    #[test]
    fn test_parse_empty_group_rejected() {
        // An empty group has no value to contribute
        for input in ["()", "2+()", "(())", "-()"] {
            assert_eq!(parse(input), Err(FormulaError::InvalidOperation), "input: {input}");
        }
    }

    #[test]
    fn test_parse_max_depth_counts_every_group() {
        // Two parenthesis levels
        assert!(parse_with_max_depth("((1))", 2).is_ok());
        assert_eq!(parse_with_max_depth("((1))", 1), Err(FormulaError::NestingLimit(1)));

        // `2*3` is one group, `--3` is two
        assert!(parse_with_max_depth("2*3+4", 1).is_ok());
        assert!(parse_with_max_depth("--3", 2).is_ok());
        assert_eq!(parse_with_max_depth("--3", 1), Err(FormulaError::NestingLimit(1)));

        // A left-leaning `*` chain nests once per operator
        assert!(parse_with_max_depth("1*2*3", 2).is_ok());
        assert_eq!(parse_with_max_depth("1*2*3", 1), Err(FormulaError::NestingLimit(1)));

        // A group completing a pending `*` sits one level below it
        assert!(parse_with_max_depth("2*(3)", 2).is_ok());
        assert_eq!(parse_with_max_depth("2*(3)", 1), Err(FormulaError::NestingLimit(1)));

        assert_eq!(parse_with_max_depth("1", 0).unwrap(), parse("1").unwrap());
        assert_eq!(parse_with_max_depth("(1)", 0), Err(FormulaError::NestingLimit(0)));
    }

    #[test]
    fn test_parse_max_depth_rejects_deep_input() {
        let n = 20_000;
        let parens = format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse_with_max_depth(&parens, 256), Err(FormulaError::NestingLimit(256)));

        let negations = format!("{}1", "-".repeat(n));
        assert_eq!(parse_with_max_depth(&negations, 256), Err(FormulaError::NestingLimit(256)));

        let product = format!("1{}", "*1".repeat(n));
        assert_eq!(parse_with_max_depth(&product, 256), Err(FormulaError::NestingLimit(256)));
    }

    #[test]
    fn test_parse_max_depth_matches_unbounded_parse() {
        for formula in ["=A1*(-A2+cell_3)/0.5", "2*-3*4", "(a+b)*c-(1)", "8/4*2"] {
            assert_eq!(parse_with_max_depth(formula, 64), parse(formula), "{formula}");
        }
    }

    #[test]
    fn test_parse_numeric_tokens() {
        assert_eq!(parse("0.25").unwrap().nodes(), &[Node::Float("0.25".into())]);
        assert_eq!(parse("5.").unwrap().nodes(), &[Node::Float("5.".into())]);
        // Digit-first tokens stay numeric even with letters inside
        assert_eq!(parse("2e3").unwrap().nodes(), &[int("2e3")]);
        assert_eq!(parse("1a").unwrap().nodes(), &[int("1a")]);
        assert_eq!(parse("1.2.3").unwrap().nodes(), &[Node::Float("1.2.3".into())]);
        assert_eq!(parse("_1").unwrap().nodes(), &[var("_1")]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let formula = "=A1*(-A2+A3)/0.5 - 7*(b-2)";
        assert_eq!(parse(formula).unwrap(), parse(formula).unwrap());
    }
}
