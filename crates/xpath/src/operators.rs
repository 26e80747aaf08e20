//! Contains pure functions for evaluating XPath binary operators.

use super::ast::BinaryOperator;
use super::engine::{XPathValue, parse_number, sort_document_order, string_value};
use crate::error::XPathError;
use crate::navigator::Navigator;

pub fn evaluate<N: Navigator>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    use BinaryOperator::*;
    match op {
        Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),
        Equals | NotEquals | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => {
            Ok(XPathValue::Boolean(compare(op, &left, &right)))
        }
        Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        Union => evaluate_union(left, right),
    }
}

/// Node-set comparisons are existential: true if any member satisfies the
/// comparison.
fn compare<N: Navigator>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
            let right_values: Vec<XPathValue<N>> = r
                .iter()
                .map(|n| XPathValue::String(string_value(n)))
                .collect();
            l.iter().any(|n| {
                let lv = XPathValue::String(string_value(n));
                right_values.iter().any(|rv| compare_scalars(op, &lv, rv))
            })
        }
        (XPathValue::NodeSet(l), other) => node_set_matches(op, l, other),
        (other, XPathValue::NodeSet(r)) => node_set_matches(flip(op), r, other),
        _ => compare_scalars(op, left, right),
    }
}

fn node_set_matches<N: Navigator>(op: BinaryOperator, nodes: &[N], other: &XPathValue<N>) -> bool {
    match other {
        XPathValue::Boolean(_) => {
            compare_scalars(op, &XPathValue::Boolean(!nodes.is_empty()), other)
        }
        XPathValue::Number(_) => nodes.iter().any(|n| {
            compare_scalars(op, &XPathValue::Number(parse_number(&string_value(n))), other)
        }),
        _ => nodes
            .iter()
            .any(|n| compare_scalars(op, &XPathValue::String(string_value(n)), other)),
    }
}

fn compare_scalars<N: Navigator>(
    op: BinaryOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    use BinaryOperator::*;
    match op {
        Equals | NotEquals => {
            let equal = match (left, right) {
                (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
                    left.to_bool() == right.to_bool()
                }
                (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
                    left.to_number() == right.to_number()
                }
                _ => left.to_string() == right.to_string(),
            };
            if op == Equals { equal } else { !equal }
        }
        LessThan => left.to_number() < right.to_number(),
        LessThanOrEqual => left.to_number() <= right.to_number(),
        GreaterThan => left.to_number() > right.to_number(),
        GreaterThanOrEqual => left.to_number() >= right.to_number(),
        _ => false,
    }
}

/// The operator that gives the same answer with its operands swapped.
fn flip(op: BinaryOperator) -> BinaryOperator {
    use BinaryOperator::*;
    match op {
        LessThan => GreaterThan,
        LessThanOrEqual => GreaterThanOrEqual,
        GreaterThan => LessThan,
        GreaterThanOrEqual => LessThanOrEqual,
        other => other,
    }
}

fn evaluate_union<N: Navigator>(
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    let l_nodes = if let XPathValue::NodeSet(n) = left {
        n
    } else {
        return Err(XPathError::TypeError(
            "Left-hand side of '|' must be a node-set.".to_string(),
        ));
    };
    let r_nodes = if let XPathValue::NodeSet(n) = right {
        n
    } else {
        return Err(XPathError::TypeError(
            "Right-hand side of '|' must be a node-set.".to_string(),
        ));
    };

    let mut merged = l_nodes;
    merged.extend(r_nodes);
    Ok(XPathValue::NodeSet(sort_document_order(merged)))
}
