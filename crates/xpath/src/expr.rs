//! Compiled expressions and the node iterator returned by `Expr::select`.

use crate::ast::{Axis, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use crate::axes::AxisIter;
use crate::engine::{self, EvaluationContext, XPathValue};
use crate::error::XPathError;
use crate::functions;
use crate::navigator::Navigator;
use crate::parser::parse_expression;

/// A parsed and optimised XPath expression, reusable across documents and
/// threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    source: String,
    ast: Expression,
}

impl Expr {
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let ast = optimize(parse_expression(source)?);
        check_calls(&ast, source)?;
        log::debug!("Compiled XPath expression '{}'", source);
        Ok(Expr {
            source: source.to_string(),
            ast,
        })
    }

    /// The expression text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expression {
        &self.ast
    }

    /// Evaluates the expression with `nav` as the context node.
    pub fn evaluate<N: Navigator>(&self, nav: &N) -> Result<XPathValue<N>, XPathError> {
        engine::evaluate(&self.ast, &EvaluationContext::new(nav.clone(), 1, 1))
    }

    /// Selects the nodes the expression matches, relative to `nav`.
    ///
    /// Every step but the last is evaluated up front. When the last step runs
    /// from a single context node along a forward axis without predicates,
    /// its nodes are produced on demand, so taking only the first match does
    /// not walk the rest of the axis. Expressions that do not produce a
    /// node-set select nothing.
    pub fn select<'e, N: Navigator>(&'e self, nav: &N) -> Result<NodeIter<'e, N>, XPathError> {
        let e_ctx = EvaluationContext::new(nav.clone(), 1, 1);
        let path = match &self.ast {
            Expression::LocationPath(path) => path,
            other => {
                let nodes = match engine::evaluate(other, &e_ctx)? {
                    XPathValue::NodeSet(nodes) => nodes,
                    _ => Vec::new(),
                };
                return Ok(NodeIter::buffered(nodes));
            }
        };

        let mut nodes = engine::initial_context(path, &e_ctx)?;
        let Some((last, init)) = path.steps.split_last() else {
            return Ok(NodeIter::buffered(nodes));
        };
        for step in init {
            nodes = engine::evaluate_step(step, &nodes)?;
        }
        match nodes.as_slice() {
            [context] if last.predicates.is_empty() && !last.axis.is_reverse() => Ok(NodeIter {
                source: Source::Axis {
                    iter: AxisIter::new(last.axis, context),
                    step: last,
                },
            }),
            _ => Ok(NodeIter::buffered(engine::evaluate_step(last, &nodes)?)),
        }
    }
}

#[derive(Debug)]
enum Source<'e, N> {
    Buffered(std::vec::IntoIter<N>),
    Axis { iter: AxisIter<N>, step: &'e Step },
}

/// The nodes selected by an expression, in document order.
#[derive(Debug)]
pub struct NodeIter<'e, N> {
    source: Source<'e, N>,
}

impl<N> NodeIter<'_, N> {
    fn buffered(nodes: Vec<N>) -> Self {
        NodeIter {
            source: Source::Buffered(nodes.into_iter()),
        }
    }
}

impl<N: Navigator> Iterator for NodeIter<'_, N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        match &mut self.source {
            Source::Buffered(nodes) => nodes.next(),
            Source::Axis { iter, step } => iter
                .by_ref()
                .find(|n| engine::matches_node_test(n, &step.node_test, step.axis)),
        }
    }
}

/// Rejects calls to functions outside the core library and calls with the
/// wrong number of arguments, wherever they appear in the expression.
fn check_calls(expr: &Expression, source: &str) -> Result<(), XPathError> {
    let invalid = |message: String| XPathError::XPathParse(source.to_string(), message);
    match expr {
        Expression::Literal(_) | Expression::Number(_) => Ok(()),
        Expression::FunctionCall { name, args } => {
            let (min, max) = functions::arity(name)
                .ok_or_else(|| invalid(format!("unknown function '{}()'", name)))?;
            if !(min..=max).contains(&args.len()) {
                return Err(invalid(format!(
                    "{}(): {}",
                    name,
                    functions::arity_message(min, max, args.len())
                )));
            }
            args.iter().try_for_each(|arg| check_calls(arg, source))
        }
        Expression::LocationPath(path) => {
            if let Some(start) = &path.start_point {
                check_calls(start, source)?;
            }
            path.steps
                .iter()
                .flat_map(|step| &step.predicates)
                .try_for_each(|pred| check_calls(pred, source))
        }
        Expression::Filter { expr, predicates } => {
            check_calls(expr, source)?;
            predicates
                .iter()
                .try_for_each(|pred| check_calls(pred, source))
        }
        Expression::BinaryOp { left, right, .. } => {
            check_calls(left, source)?;
            check_calls(right, source)
        }
        Expression::UnaryOp { expr, .. } => check_calls(expr, source),
    }
}

/// Rewrites `descendant-or-self::node()/child::x` into `descendant::x` wherever
/// neither step has predicates. The two select the same nodes, but the
/// rewritten form is a single axis walk that can stop at the first match.
fn optimize(expr: Expression) -> Expression {
    match expr {
        Expression::LocationPath(path) => Expression::LocationPath(optimize_path(path)),
        Expression::Filter { expr, predicates } => Expression::Filter {
            expr: Box::new(optimize(*expr)),
            predicates: predicates.into_iter().map(optimize).collect(),
        },
        Expression::FunctionCall { name, args } => Expression::FunctionCall {
            name,
            args: args.into_iter().map(optimize).collect(),
        },
        Expression::BinaryOp { left, op, right } => Expression::BinaryOp {
            left: Box::new(optimize(*left)),
            op,
            right: Box::new(optimize(*right)),
        },
        Expression::UnaryOp { op, expr } => Expression::UnaryOp {
            op,
            expr: Box::new(optimize(*expr)),
        },
        leaf => leaf,
    }
}

fn optimize_path(path: LocationPath) -> LocationPath {
    let mut steps: Vec<Step> = Vec::with_capacity(path.steps.len());
    for step in path.steps {
        let step = Step {
            predicates: step.predicates.into_iter().map(optimize).collect(),
            ..step
        };
        let mergeable = step.axis == Axis::Child
            && step.predicates.is_empty()
            && steps.last().is_some_and(is_bare_descendant_or_self);
        if mergeable {
            steps.pop();
            steps.push(Step {
                axis: Axis::Descendant,
                ..step
            });
        } else {
            steps.push(step);
        }
    }
    LocationPath {
        start_point: path.start_point.map(|start| Box::new(optimize(*start))),
        is_absolute: path.is_absolute,
        steps,
    }
}

fn is_bare_descendant_or_self(step: &Step) -> bool {
    step.axis == Axis::DescendantOrSelf
        && step.node_test == NodeTest::NodeType(NodeTypeTest::Node)
        && step.predicates.is_empty()
}
