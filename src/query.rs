//! Running XPath expressions against document trees.
//!
//! Every operation takes the node to evaluate from. That node is also the
//! root of the query: `/` and `move_to_root` resolve to it, not to the
//! document node, unless the document node is what was passed in.
//!
//! Results are tree nodes, not cursors. A match on an attribute yields the
//! element that owns it.

use crate::cache::{CacheConfig, QueryCache};
use crate::error::QueryError;
use crate::navigator::TreeNavigator;
use crate::tree::TreeNode;
use std::sync::Arc;
use xquery_xpath::{Expr, NodeIter, XPathValue};

/// The result of evaluating an expression for its value rather than its nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    Nodes(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<N> Value<N> {
    pub fn as_nodes(&self) -> Option<&[N]> {
        match self {
            Value::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl<N: TreeNode> From<XPathValue<TreeNavigator<N>>> for Value<N> {
    fn from(value: XPathValue<TreeNavigator<N>>) -> Self {
        match value {
            XPathValue::NodeSet(navs) => Value::Nodes(navs.iter().map(|n| n.current()).collect()),
            XPathValue::String(s) => Value::String(s),
            XPathValue::Number(n) => Value::Number(n),
            XPathValue::Boolean(b) => Value::Boolean(b),
        }
    }
}

/// The nodes matched by a compiled expression, produced on demand.
#[derive(Debug)]
pub struct Selection<'e, N> {
    inner: NodeIter<'e, TreeNavigator<N>>,
}

impl<N: TreeNode> Iterator for Selection<'_, N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        self.inner.next().map(|nav| nav.current())
    }
}

/// Compiles `expr`. Compiled expressions can be reused across documents.
pub fn compile(expr: &str) -> Result<Expr, QueryError> {
    Expr::compile(expr).map_err(|e| QueryError::invalid(expr, e))
}

/// Starts matching a compiled expression from `root`.
pub fn select<N: TreeNode>(root: N, expr: &Expr) -> Result<Selection<'_, N>, QueryError> {
    let inner = expr.select(&TreeNavigator::new(root))?;
    Ok(Selection { inner })
}

/// All nodes matching `expr`, in document order.
pub fn find<N: TreeNode>(root: N, expr: &str) -> Result<Vec<N>, QueryError> {
    let compiled = compile(expr)?;
    Ok(select(root, &compiled)?.collect())
}

/// The first node matching `expr`. Evaluation stops at the first match where
/// the expression allows it.
pub fn find_one<N: TreeNode>(root: N, expr: &str) -> Result<Option<N>, QueryError> {
    let compiled = compile(expr)?;
    Ok(select(root, &compiled)?.next())
}

/// Calls `f` with the zero-based index and node of every match, in order.
pub fn find_each<N, F>(root: N, expr: &str, f: F) -> Result<(), QueryError>
where
    N: TreeNode,
    F: FnMut(usize, N),
{
    let compiled = compile(expr)?;
    for_each_match(root, &compiled, f)
}

/// Evaluates `expr` for its value, e.g. `count(//item)` or `string(@id)`.
pub fn evaluate<N: TreeNode>(root: N, expr: &str) -> Result<Value<N>, QueryError> {
    let compiled = compile(expr)?;
    evaluate_compiled(root, &compiled)
}

fn for_each_match<N, F>(root: N, expr: &Expr, mut f: F) -> Result<(), QueryError>
where
    N: TreeNode,
    F: FnMut(usize, N),
{
    for (i, node) in select(root, expr)?.enumerate() {
        f(i, node);
    }
    Ok(())
}

fn evaluate_compiled<N: TreeNode>(root: N, expr: &Expr) -> Result<Value<N>, QueryError> {
    let value = expr.evaluate(&TreeNavigator::new(root))?;
    Ok(value.into())
}

/// Runs queries through a shared `QueryCache`, so repeated expressions are
/// compiled once. Safe to share between threads.
#[derive(Debug, Default)]
pub struct QueryEngine {
    cache: QueryCache,
}

impl QueryEngine {
    pub fn new(config: CacheConfig) -> Self {
        QueryEngine {
            cache: QueryCache::new(config),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn compile(&self, expr: &str) -> Result<Arc<Expr>, QueryError> {
        self.cache.get_or_compile(expr)
    }

    pub fn find<N: TreeNode>(&self, root: N, expr: &str) -> Result<Vec<N>, QueryError> {
        let compiled = self.compile(expr)?;
        Ok(select(root, &compiled)?.collect())
    }

    pub fn find_one<N: TreeNode>(&self, root: N, expr: &str) -> Result<Option<N>, QueryError> {
        let compiled = self.compile(expr)?;
        Ok(select(root, &compiled)?.next())
    }

    pub fn find_each<N, F>(&self, root: N, expr: &str, f: F) -> Result<(), QueryError>
    where
        N: TreeNode,
        F: FnMut(usize, N),
    {
        let compiled = self.compile(expr)?;
        for_each_match(root, &compiled, f)
    }

    pub fn evaluate<N: TreeNode>(&self, root: N, expr: &str) -> Result<Value<N>, QueryError> {
        let compiled = self.compile(expr)?;
        evaluate_compiled(root, &compiled)
    }
}
