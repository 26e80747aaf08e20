//! A `nom`-based parser for the XPath 1.0 expression language.

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, opt, peek, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    if input.trim().is_empty() {
        return Err(XPathError::XPathParse(
            input.to_string(),
            "Empty expression".to_string(),
        ));
    }
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::XPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(XPathError::XPathParse(input.to_string(), e.to_string())),
    }
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn build_binary_expr_parser<'a, F, G>(
    sub_expr_parser: F,
    op_parser: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(pair(ws(op_parser.clone()), sub_expr_parser.clone())).parse(input)?;

        for (op, right) in remainder {
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(tag("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(tag("and"), |_| BinaryOperator::And).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(equality_expr, and_op)(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("="), |_| BinaryOperator::Equals),
        map(tag("!="), |_| BinaryOperator::NotEquals),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("<="), |_| BinaryOperator::LessThanOrEqual),
        map(tag(">="), |_| BinaryOperator::GreaterThanOrEqual),
        map(tag("<"), |_| BinaryOperator::LessThan),
        map(tag(">"), |_| BinaryOperator::GreaterThan),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('+'), |_| BinaryOperator::Plus),
        map(char('-'), |_| BinaryOperator::Minus),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('*'), |_| BinaryOperator::Multiply),
        map(tag("div"), |_| BinaryOperator::Divide),
        map(tag("mod"), |_| BinaryOperator::Modulo),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(char('|'), |_| BinaryOperator::Union).parse(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(relational_expr, equality_op)(input)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(additive_expr, relational_op)(input)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(multiplicative_expr, additive_op)(input)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(unary_expr, multiplicative_op)(input)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    let (i, neg_op) = opt(ws(char('-'))).parse(input)?;
    let (i, expr) = union_expr(i)?;

    if neg_op.is_some() {
        Ok((
            i,
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(expr),
            },
        ))
    } else {
        Ok((i, expr))
    }
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(path_expr, union_op)(input)
}

/// Handles the ambiguity between location paths and primary expressions
/// (optionally filtered by predicates) that might be followed by a path.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    // Primary expressions go first so that `position()` is not read as a step named `position`.
    let (i, start_expr) = ws(alt((
        filter_expr,
        map(location_path, Expression::LocationPath),
    )))
    .parse(input)?;

    let (i, remainder_steps) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;
    let (i, _) = multispace0(i)?;

    if remainder_steps.is_empty() {
        return Ok((i, start_expr));
    }

    let (start_point, is_absolute, mut steps) = match start_expr {
        Expression::LocationPath(lp) => (lp.start_point, lp.is_absolute, lp.steps),
        other => (Some(Box::new(other)), false, vec![]),
    };

    for (sep, next_step) in remainder_steps {
        if sep == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next_step);
    }

    Ok((
        i,
        Expression::LocationPath(LocationPath {
            start_point,
            is_absolute,
            steps,
        }),
    ))
}

fn filter_expr(input: &str) -> IResult<&str, Expression> {
    let (i, primary) = primary_expr(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    if predicates.is_empty() {
        Ok((i, primary))
    } else {
        Ok((
            i,
            Expression::Filter {
                expr: Box::new(primary),
                predicates,
            },
        ))
    }
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    ))
    .parse(input)
}

/// XPath numbers are plain decimals; exponents, `inf` and `nan` are not part of the grammar.
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.'),
    ))
    .parse(input)
}

fn q_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(nc_name, opt(pair(tag(":"), nc_name)))),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        terminated(
            alt((
                tag("text"),
                tag("node"),
                tag("comment"),
                tag("processing-instruction"),
            )),
            pair(ws(char('(')), char(')')),
        ),
        |node_type: &str| match node_type {
            "text" => NodeTest::NodeType(NodeTypeTest::Text),
            "comment" => NodeTest::NodeType(NodeTypeTest::Comment),
            "processing-instruction" => NodeTest::NodeType(NodeTypeTest::ProcessingInstruction),
            _ => NodeTest::NodeType(NodeTypeTest::Node),
        },
    )
    .parse(input)
}

pub fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(tag("*"), |_| NodeTest::Wildcard),
        node_type_test,
        map(q_name, NodeTest::Name),
    ))
    .parse(input)
}

fn axis(input: &str) -> IResult<&str, Axis> {
    map(
        pair(
            alt((
                tag("child"),
                tag("descendant-or-self"),
                tag("descendant"),
                tag("attribute"),
                tag("parent"),
                tag("ancestor-or-self"),
                tag("ancestor"),
                tag("self"),
                tag("following-sibling"),
                tag("preceding-sibling"),
                tag("following"),
                tag("preceding"),
            )),
            ws(tag("::")),
        ),
        |(axis_str, _)| match axis_str {
            "descendant-or-self" => Axis::DescendantOrSelf,
            "descendant" => Axis::Descendant,
            "attribute" => Axis::Attribute,
            "parent" => Axis::Parent,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "ancestor" => Axis::Ancestor,
            "self" => Axis::SelfAxis,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "following" => Axis::Following,
            "preceding" => Axis::Preceding,
            _ => Axis::Child,
        },
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let (i, (axis, node_test)) = alt((
        map(tag(".."), |_| {
            (Axis::Parent, NodeTest::NodeType(NodeTypeTest::Node))
        }),
        map(tag("."), |_| {
            (Axis::SelfAxis, NodeTest::NodeType(NodeTypeTest::Node))
        }),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    ))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, (is_absolute, first_steps)) =
        if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("//").parse(input) {
            let (rem, step) = step(rem)?;
            (rem, (true, vec![Step::descendant_or_self(), step]))
        } else if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("/").parse(input) {
            if let Ok((rem, first_step)) = step(rem) {
                (rem, (true, vec![first_step]))
            } else {
                (rem, (true, vec![]))
            }
        } else {
            let (rem, first_step) = step(input)?;
            (rem, (false, vec![first_step]))
        };

    let mut steps = first_steps;
    let (i, remainder) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;

    for (sep, next_step) in remainder {
        if sep == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next_step);
    }

    Ok((
        i,
        LocationPath {
            start_point: None,
            is_absolute,
            steps,
        },
    ))
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    // A function call must be a QName followed by '('. This lookahead avoids
    // parsing a simple step name (like 'foo' in 'foo/bar') as a function.
    let (i, name) = q_name(input)?;
    let (i, _) = peek(ws(char('('))).parse(i)?;

    // `text()`, `node()` and friends are node tests.
    if name == "text" || name == "node" || name == "comment" || name == "processing-instruction" {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (i, _) = multispace0(i)?;
    let (i, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(i)?;

    Ok((i, Expression::FunctionCall { name, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(name: &str) -> Step {
        Step {
            axis: Axis::Child,
            node_test: NodeTest::Name(name.into()),
            predicates: vec![],
        }
    }

    #[test]
    fn test_parse_simple_path() {
        let result = parse_expression("foo/bar").unwrap();
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: false,
                steps: vec![child("foo"), child("bar")]
            })
        );
    }

    #[test]
    fn test_parse_unary_minus() {
        let result = parse_expression("-5").unwrap();
        assert_eq!(
            result,
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(Expression::Number(5.0))
            }
        );

        let result2 = parse_expression("10 - -5").unwrap();
        if let Expression::BinaryOp { left, op, right } = result2 {
            assert_eq!(op, BinaryOperator::Minus);
            assert_eq!(*left, Expression::Number(10.0));
            assert_eq!(
                *right,
                Expression::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: Box::new(Expression::Number(5.0))
                }
            );
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_axes() {
        let result = parse_expression("following-sibling::foo").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps[0].axis, Axis::FollowingSibling);
        } else {
            panic!("Expected location path");
        }

        let result = parse_expression("ancestor-or-self::*").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps[0].axis, Axis::AncestorOrSelf);
            assert_eq!(lp.steps[0].node_test, NodeTest::Wildcard);
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_predicate() {
        let result = parse_expression("foo[@id = 'a']").unwrap();
        let expected_predicate_path = LocationPath {
            start_point: None,
            is_absolute: false,
            steps: vec![Step {
                axis: Axis::Attribute,
                node_test: NodeTest::Name("id".into()),
                predicates: vec![],
            }],
        };
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: false,
                steps: vec![Step {
                    axis: Axis::Child,
                    node_test: NodeTest::Name("foo".into()),
                    predicates: vec![Expression::BinaryOp {
                        left: Box::new(Expression::LocationPath(expected_predicate_path)),
                        op: BinaryOperator::Equals,
                        right: Box::new(Expression::Literal("a".into())),
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_parse_numeric_predicate() {
        let result = parse_expression("foo[1]").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps[0].predicates, vec![Expression::Number(1.0)]);
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_function_in_predicate() {
        let Expression::LocationPath(lp) = parse_expression("para[position()=1]").unwrap() else {
            panic!("Expected location path");
        };
        assert_eq!(lp.steps.len(), 1);
        assert_eq!(lp.steps[0].predicates.len(), 1);
        assert!(matches!(
            lp.steps[0].predicates[0],
            Expression::BinaryOp { op: BinaryOperator::Equals, .. }
        ));
    }

    #[test]
    fn test_parse_text_node_test() {
        let result = parse_expression("foo/text()").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps.len(), 2);
            assert_eq!(lp.steps[1].node_test, NodeTest::NodeType(NodeTypeTest::Text));
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_abbreviated_steps() {
        let result = parse_expression("./..").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps.len(), 2);
            assert_eq!(lp.steps[0].axis, Axis::SelfAxis);
            assert_eq!(lp.steps[1].axis, Axis::Parent);
            assert_eq!(lp.steps[1].node_test, NodeTest::NodeType(NodeTypeTest::Node));
        } else {
            panic!("Expected location path for './..'");
        }
    }

    #[test]
    fn test_parse_names_that_look_like_numbers() {
        // `info` must stay a step name, not the float literal `inf` followed by garbage.
        let result = parse_expression("//info").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps[1], child("info"));
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_operator_precedence() {
        let result = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            result,
            Expression::BinaryOp {
                left: Box::new(Expression::Number(1.0)),
                op: BinaryOperator::Plus,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Number(2.0)),
                    op: BinaryOperator::Multiply,
                    right: Box::new(Expression::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_parse_descendant_or_self() {
        let result = parse_expression("//foo").unwrap();
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: true,
                steps: vec![Step::descendant_or_self(), child("foo")]
            })
        );
    }

    #[test]
    fn test_parse_filter_expression() {
        let result = parse_expression("(//a)[2]/b").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps, vec![child("b")]);
            let start = lp.start_point.expect("filter start point");
            assert!(matches!(*start, Expression::Filter { .. }));
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_union_and_function() {
        let result = parse_expression("count(//a | //b)").unwrap();
        if let Expression::FunctionCall { name, args } = result {
            assert_eq!(name, "count");
            assert_eq!(args.len(), 1);
            assert!(matches!(
                args[0],
                Expression::BinaryOp {
                    op: BinaryOperator::Union,
                    ..
                }
            ));
        } else {
            panic!("Expected function call");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("//a[").is_err());
        assert!(parse_expression("///").is_err());
        assert!(matches!(
            parse_expression("a b"),
            Err(XPathError::XPathParse(_, _))
        ));
    }
}
