//! The evaluation engine for executing a parsed XPath AST against a `Navigator`.

use super::ast::{Axis, Expression, LocationPath, NodeTest, NodeTypeTest, Step, UnaryOperator};
use super::axes::AxisIter;
use super::{functions, operators};
use crate::error::XPathError;
use crate::navigator::{Navigator, NodeType};
use std::fmt;

/// Represents the possible result types of an XPath expression evaluation.
#[derive(Debug, Clone)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<N: Navigator> XPathValue<N> {
    /// Coerces the XPath value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the XPath value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => parse_number(s),
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map(|n| parse_number(&string_value(n)))
                .unwrap_or(f64::NAN),
        }
    }
}

impl<N: Navigator> fmt::Display for XPathValue<N> {
    /// Coerces the XPath value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(string_value).unwrap_or_default()
            ),
            XPathValue::String(s) => write!(f, "{}", s),
            XPathValue::Number(n) => write!(f, "{}", format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Parses a string the way `number()` does: surrounding whitespace is allowed,
/// anything but an optional minus and a decimal is NaN.
pub fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if valid {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Formats a number the way `string()` does: integers without a fraction,
/// `NaN` and `Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The string-value of the node under a cursor. The root's string-value is
/// the concatenation of every text node in the document.
pub fn string_value<N: Navigator>(node: &N) -> String {
    if node.node_type() == NodeType::Root {
        AxisIter::new(Axis::Descendant, node)
            .filter(|n| n.node_type() == NodeType::Text)
            .map(|n| n.value())
            .collect()
    } else {
        node.value()
    }
}

/// A container for all state needed during expression evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationContext<N> {
    pub context_node: N,
    pub context_position: usize, // 1-based index
    pub context_size: usize,
}

impl<N: Navigator> EvaluationContext<N> {
    pub fn new(context_node: N, context_position: usize, context_size: usize) -> Self {
        Self {
            context_node,
            context_position,
            context_size,
        }
    }
}

/// Evaluates an expression and returns a concrete `XPathValue`.
pub fn evaluate<N: Navigator>(
    expr: &Expression,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            let nodes = evaluate_location_path(path, e_ctx)?;
            Ok(XPathValue::NodeSet(nodes))
        }
        Expression::Filter { expr, predicates } => {
            let nodes = expect_node_set(evaluate(expr, e_ctx)?, "filter expression")?;
            Ok(XPathValue::NodeSet(apply_predicates(nodes, predicates)?))
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, e_ctx)?);
            }
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::BinaryOp { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            let right_val = evaluate(right, e_ctx)?;
            operators::evaluate(*op, left_val, right_val)
        }
        Expression::UnaryOp { op, expr } => {
            let val = evaluate(expr, e_ctx)?;
            match op {
                UnaryOperator::Minus => Ok(XPathValue::Number(-val.to_number())),
            }
        }
    }
}

fn expect_node_set<N: Navigator>(value: XPathValue<N>, what: &str) -> Result<Vec<N>, XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        v => Err(XPathError::TypeError(format!(
            "{} must be a node-set, got {:?}",
            what, v
        ))),
    }
}

/// The node-set a location path starts from, before any of its steps.
pub(crate) fn initial_context<N: Navigator>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError> {
    if let Some(start_expr) = &path.start_point {
        expect_node_set(evaluate(start_expr, e_ctx)?, "start of a location path")
    } else if path.is_absolute {
        let mut root = e_ctx.context_node.clone();
        root.move_to_root();
        Ok(vec![root])
    } else {
        Ok(vec![e_ctx.context_node.clone()])
    }
}

fn evaluate_location_path<N: Navigator>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError> {
    let mut current_nodes = initial_context(path, e_ctx)?;
    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes)?;
    }
    Ok(current_nodes)
}

/// Evaluates a single step for every context node. The result is in document
/// order without duplicates.
pub(crate) fn evaluate_step<N: Navigator>(
    step: &Step,
    context_nodes: &[N],
) -> Result<Vec<N>, XPathError> {
    let mut results = Vec::new();
    for node in context_nodes {
        results.extend(select_from(step, node)?);
    }
    if context_nodes.len() > 1 {
        return Ok(sort_document_order(results));
    }
    if step.axis.is_reverse() {
        results.reverse();
    }
    Ok(results)
}

/// Applies one step to one context node, keeping axis order so that predicate
/// positions are proximity positions.
fn select_from<N: Navigator>(step: &Step, node: &N) -> Result<Vec<N>, XPathError> {
    let candidates = AxisIter::new(step.axis, node)
        .filter(|n| matches_node_test(n, &step.node_test, step.axis))
        .collect();
    apply_predicates(candidates, &step.predicates)
}

pub(crate) fn matches_node_test<N: Navigator>(node: &N, test: &NodeTest, axis: Axis) -> bool {
    let principal = if axis == Axis::Attribute {
        NodeType::Attribute
    } else {
        NodeType::Element
    };
    match test {
        NodeTest::Wildcard => node.node_type() == principal,
        NodeTest::Name(name) => {
            node.node_type() == principal
                && match name.split_once(':') {
                    Some((prefix, local)) => node.prefix() == prefix && node.local_name() == local,
                    None => node.local_name() == name,
                }
        }
        NodeTest::NodeType(ntt) => match ntt {
            NodeTypeTest::Text => node.node_type() == NodeType::Text,
            NodeTypeTest::Comment => node.node_type() == NodeType::Comment,
            NodeTypeTest::ProcessingInstruction => false,
            NodeTypeTest::Node => true,
        },
    }
}

/// Filters a set of nodes by applying a series of predicates in turn.
fn apply_predicates<N: Navigator>(
    nodes: Vec<N>,
    predicates: &[Expression],
) -> Result<Vec<N>, XPathError> {
    let mut final_nodes = nodes;
    for predicate in predicates {
        let context_size = final_nodes.len();
        let mut predicate_results = Vec::new();
        for (i, node) in final_nodes.into_iter().enumerate() {
            let predicate_e_ctx = EvaluationContext::new(node, i + 1, context_size);
            let keep = match evaluate(predicate, &predicate_e_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                result => result.to_bool(),
            };
            if keep {
                predicate_results.push(predicate_e_ctx.context_node);
            }
        }
        final_nodes = predicate_results;
    }
    Ok(final_nodes)
}

/// The position of a node in document order as a path of sibling indexes.
/// Children count from 1 so that attributes, keyed `[0, i]` under their
/// element, sort between the element and its first child.
pub fn order_key<N: Navigator>(node: &N) -> Vec<usize> {
    let mut key = Vec::new();
    let mut cur = node.clone();
    if cur.node_type() == NodeType::Attribute {
        let mut probe = cur.clone();
        probe.move_to_parent();
        let owner = probe.clone();
        let mut index = 0;
        while probe.move_to_next_attribute() && !probe.is_same_node(&cur) {
            index += 1;
        }
        key.push(index);
        key.push(0);
        cur = owner;
    }
    loop {
        let mut probe = cur.clone();
        let mut index = 0;
        while probe.move_to_previous() {
            index += 1;
        }
        if !cur.move_to_parent() {
            break;
        }
        key.push(index + 1);
    }
    key.reverse();
    key
}

/// Sorts cursors into document order and drops duplicates.
pub fn sort_document_order<N: Navigator>(nodes: Vec<N>) -> Vec<N> {
    let mut keyed: Vec<(Vec<usize>, N)> = nodes.into_iter().map(|n| (order_key(&n), n)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    keyed.into_iter().map(|(_, n)| n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::tests::{MockNavigator, MockTree, create_test_tree};

    fn eval<'a>(tree: &'a MockTree, context_id: usize, xpath: &str) -> XPathValue<MockNavigator<'a>> {
        let expr = crate::parser::parse_expression(xpath).unwrap();
        let e_ctx = EvaluationContext::new(tree.nav(context_id), 1, 1);
        evaluate(&expr, &e_ctx).unwrap()
    }

    fn node_ids(value: XPathValue<MockNavigator>) -> Vec<usize> {
        match value {
            XPathValue::NodeSet(nodes) => nodes.iter().map(|n| n.id).collect(),
            other => panic!("Expected a NodeSet, got {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_functions_individually() {
        let tree = create_test_tree();
        let root = tree.nav(0);
        let para = tree.nav(1);
        let text = tree.nav(2);

        let all = vec![root, para, text];
        let elements: Vec<_> = all
            .iter()
            .filter(|n| matches_node_test(*n, &NodeTest::Wildcard, Axis::Child))
            .map(|n| n.id)
            .collect();
        assert_eq!(elements, vec![1]);
        let text_nodes: Vec<_> = all
            .iter()
            .filter(|n| matches_node_test(*n, &NodeTest::NodeType(NodeTypeTest::Text), Axis::Child))
            .map(|n| n.id)
            .collect();
        assert_eq!(text_nodes, vec![2]);

        let predicate_expr = crate::parser::parse_expression("position()=2").unwrap();
        let filtered = apply_predicates(all, &[predicate_expr]).unwrap();
        assert_eq!(filtered.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_predicate_by_attribute() {
        let tree = create_test_tree();
        assert_eq!(node_ids(eval(&tree, 0, "child::para[@id='p1']")), vec![1]);
        assert_eq!(node_ids(eval(&tree, 0, "para[@xml:lang]")), vec![1]);
    }

    #[test]
    fn test_predicate_by_position() {
        let tree = create_test_tree();
        assert_eq!(node_ids(eval(&tree, 0, "child::para[1]")), vec![1]);
        assert_eq!(node_ids(eval(&tree, 0, "para[position()=2]")), vec![7]);
        assert_eq!(node_ids(eval(&tree, 0, "*[last()]")), vec![7]);
    }

    #[test]
    fn test_reverse_axis_positions_and_result_order() {
        let tree = create_test_tree();
        // Position 1 on a reverse axis is the nearest node.
        assert_eq!(node_ids(eval(&tree, 6, "ancestor::*[1]")), vec![5]);
        // The node-set itself still comes back in document order.
        assert_eq!(node_ids(eval(&tree, 6, "ancestor::node()")), vec![0, 4, 5]);
        assert_eq!(node_ids(eval(&tree, 7, "preceding-sibling::*[1]")), vec![4]);
    }

    #[test]
    fn test_descendant_paths_are_deduplicated_in_document_order() {
        let tree = create_test_tree();
        assert_eq!(
            node_ids(eval(&tree, 0, "//text()")),
            vec![2, 6, 8]
        );
        assert_eq!(node_ids(eval(&tree, 0, "//*/..")), vec![0, 4]);
        assert_eq!(node_ids(eval(&tree, 5, "/para")), vec![1, 7]);
    }

    #[test]
    fn test_abbreviated_steps() {
        let tree = create_test_tree();
        assert_eq!(node_ids(eval(&tree, 5, ".")), vec![5]);
        assert_eq!(node_ids(eval(&tree, 5, "..")), vec![4]);
        assert_eq!(node_ids(eval(&tree, 0, "/")), vec![0]);
    }

    #[test]
    fn test_attribute_values_and_order() {
        let tree = create_test_tree();
        let value = eval(&tree, 1, "@*");
        if let XPathValue::NodeSet(nodes) = &value {
            let names: Vec<_> = nodes.iter().map(|n| n.local_name().to_string()).collect();
            assert_eq!(names, vec!["id", "lang"]);
            assert_eq!(order_key(&nodes[1]), vec![1, 0, 1]);
        } else {
            panic!("Expected a NodeSet");
        }
        assert_eq!(value.to_string(), "p1");
    }

    #[test]
    fn test_filter_expression() {
        let tree = create_test_tree();
        assert_eq!(node_ids(eval(&tree, 0, "(//para)[2]")), vec![7]);
        assert_eq!(node_ids(eval(&tree, 0, "(//para | //div)[last()]/text()")), vec![8]);
    }

    #[test]
    fn test_string_values() {
        let tree = create_test_tree();
        assert_eq!(eval(&tree, 0, "string(/)").to_string(), "HelloxWorld");
        assert_eq!(eval(&tree, 0, "string(//comment())").to_string(), " comment node ");
        assert!(eval(&tree, 0, "//para = 'World'").to_bool());
    }

    #[test]
    fn test_number_formatting_and_parsing() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert_eq!(parse_number("-3"), -3.0);
        assert!(parse_number("1e3").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("").is_nan());
    }

    #[test]
    fn test_path_from_non_node_set_is_a_type_error() {
        let tree = create_test_tree();
        let expr = crate::parser::parse_expression("(1 + 1)/foo").unwrap();
        let e_ctx = EvaluationContext::new(tree.nav(0), 1, 1);
        assert!(matches!(
            evaluate(&expr, &e_ctx),
            Err(XPathError::TypeError(_))
        ));
    }
}
