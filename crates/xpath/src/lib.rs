pub mod ast;
pub mod axes;
pub mod engine;
pub mod error;
pub mod expr;
pub mod functions;
pub mod navigator;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use expr::{Expr, NodeIter};
pub use navigator::{Navigator, NodeType};

// Re-export test utilities for integration testing in downstream crates
pub use error::XPathError;
pub use navigator::tests;
pub use parser::parse_expression;
