//! Built-in implementations of the XPath 1.0 core function library.

use super::engine::{EvaluationContext, XPathValue, parse_number, string_value};
use crate::error::XPathError;
use crate::navigator::{Navigator, NodeType};

/// The accepted argument counts of a core library function, or `None` if
/// `name` is not one. `usize::MAX` means no upper bound.
pub fn arity(name: &str) -> Option<(usize, usize)> {
    let range = match name {
        "last" | "position" | "true" | "false" => (0, 0),
        "local-name" | "name" | "string" | "string-length" | "normalize-space" | "number" => {
            (0, 1)
        }
        "count" | "boolean" | "not" | "lang" | "sum" | "floor" | "ceiling" | "round" => (1, 1),
        "starts-with" | "ends-with" | "contains" | "substring-before" | "substring-after" => {
            (2, 2)
        }
        "substring" => (2, 3),
        "concat" => (2, usize::MAX),
        "translate" => (3, 3),
        _ => return None,
    };
    Some(range)
}

/// Describes an argument count outside `min..=max`.
pub fn arity_message(min: usize, max: usize, got: usize) -> String {
    if min == max {
        format!("Expected {} argument(s), got {}", min, got)
    } else if max == usize::MAX {
        format!("Expected at least {} arguments, got {}", min, got)
    } else {
        format!("Expected {} to {} arguments, got {}", min, max, got)
    }
}

/// Dispatches a function call to the correct implementation.
pub fn evaluate_function<N: Navigator>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    log::trace!("calling {}() with {} argument(s)", name, args.len());
    if let Some((min, max)) = arity(name)
        && !(min..=max).contains(&args.len())
    {
        return Err(XPathError::FunctionError {
            function: format!("{}()", name),
            message: arity_message(min, max, args.len()),
        });
    }
    match name {
        // Node-Set
        "last" => func_last(e_ctx),
        "position" => func_position(e_ctx),
        "count" => func_count(args),
        "local-name" => func_local_name(args, e_ctx),
        "name" => func_name(args, e_ctx),

        // String
        "string" => func_string(args, e_ctx),
        "concat" => func_concat(args),
        "starts-with" => func_starts_with(args),
        "ends-with" => func_ends_with(args),
        "contains" => func_contains(args),
        "substring-before" => func_substring_before(args),
        "substring-after" => func_substring_after(args),
        "substring" => func_substring(args),
        "string-length" => func_string_length(args, e_ctx),
        "normalize-space" => func_normalize_space(args, e_ctx),
        "translate" => func_translate(args),

        // Boolean
        "boolean" => func_boolean(args),
        "not" => func_not(args),
        "true" => Ok(XPathValue::Boolean(true)),
        "false" => Ok(XPathValue::Boolean(false)),
        "lang" => func_lang(args, e_ctx),

        // Number
        "number" => func_number(args, e_ctx),
        "sum" => func_sum(args),
        "floor" => func_floor(args),
        "ceiling" => func_ceiling(args),
        "round" => func_round(args),

        _ => Err(XPathError::FunctionError {
            function: name.to_string(),
            message: "Unknown XPath function".to_string(),
        }),
    }
}

/// The argument as a string, or the context node's string-value when omitted.
fn string_or_context<N: Navigator>(
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> String {
    if args.is_empty() {
        string_value(&e_ctx.context_node)
    } else {
        args.remove(0).to_string()
    }
}

/// The first node of the argument, or the context node when omitted.
fn node_or_context<N: Navigator>(
    function: &str,
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<Option<N>, XPathError> {
    if args.is_empty() {
        return Ok(Some(e_ctx.context_node.clone()));
    }
    match args.remove(0) {
        XPathValue::NodeSet(nodes) => Ok(nodes.into_iter().next()),
        v => Err(XPathError::TypeError(format!(
            "{}() argument must be a node-set, got {:?}",
            function, v
        ))),
    }
}

fn two_strings<N: Navigator>(mut args: Vec<XPathValue<N>>) -> (String, String) {
    let s2 = args.remove(1).to_string();
    let s1 = args.remove(0).to_string();
    (s1, s2)
}

// --- Node-Set Functions ---

fn func_last<N: Navigator>(
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Number(e_ctx.context_size as f64))
}

fn func_position<N: Navigator>(
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Number(e_ctx.context_position as f64))
}

fn func_count<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let count = match args.remove(0) {
        XPathValue::NodeSet(nodes) => nodes.len() as f64,
        v => {
            return Err(XPathError::TypeError(format!(
                "count() argument must be a node-set, got {:?}",
                v
            )));
        }
    };
    Ok(XPathValue::Number(count))
}

fn func_local_name<N: Navigator>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    let name = node_or_context("local-name", args, e_ctx)?
        .map(|n| n.local_name().to_string())
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

fn func_name<N: Navigator>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    let name = node_or_context("name", args, e_ctx)?
        .map(|n| {
            if n.prefix().is_empty() {
                n.local_name().to_string()
            } else {
                format!("{}:{}", n.prefix(), n.local_name())
            }
        })
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

// --- String Functions ---

fn func_string<N: Navigator>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::String(string_or_context(args, e_ctx)))
}

fn func_concat<N: Navigator>(args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let result = args.iter().map(|v| v.to_string()).collect::<String>();
    Ok(XPathValue::String(result))
}

fn func_starts_with<N: Navigator>(args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let (s1, s2) = two_strings(args);
    Ok(XPathValue::Boolean(s1.starts_with(&s2)))
}

fn func_ends_with<N: Navigator>(args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let (s1, s2) = two_strings(args);
    Ok(XPathValue::Boolean(s1.ends_with(&s2)))
}

fn func_contains<N: Navigator>(args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let (s1, s2) = two_strings(args);
    Ok(XPathValue::Boolean(s1.contains(&s2)))
}

fn func_substring_before<N: Navigator>(
    args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    let (s1, s2) = two_strings(args);
    let result = s1.find(&s2).map(|index| s1[..index].to_string());
    Ok(XPathValue::String(result.unwrap_or_default()))
}

fn func_substring_after<N: Navigator>(
    args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    let (s1, s2) = two_strings(args);
    let result = s1.find(&s2).map(|index| s1[index + s2.len()..].to_string());
    Ok(XPathValue::String(result.unwrap_or_default()))
}

fn func_substring<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let length_val = if args.len() == 3 {
        Some(args.remove(2).to_number())
    } else {
        None
    };
    let start_val = args.remove(1).to_number();
    let s = args.remove(0).to_string();

    // XPath rounding rules for start/length
    let first = (start_val + 0.5).floor();
    let last = match length_val {
        Some(l) => first + (l + 0.5).floor(),
        None => f64::INFINITY,
    };

    let result = s
        .chars()
        .enumerate()
        .filter_map(|(i, c)| {
            let pos = (i + 1) as f64; // XPath positions are 1-based
            (pos >= first && pos < last).then_some(c)
        })
        .collect::<String>();
    Ok(XPathValue::String(result))
}

fn func_string_length<N: Navigator>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    let s = string_or_context(args, e_ctx);
    Ok(XPathValue::Number(s.chars().count() as f64))
}

fn func_normalize_space<N: Navigator>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    let s = string_or_context(args, e_ctx);
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(XPathValue::String(normalized))
}

fn func_translate<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let to_str: Vec<char> = args.remove(2).to_string().chars().collect();
    let from_str: Vec<char> = args.remove(1).to_string().chars().collect();
    let source_str = args.remove(0).to_string();
    let result = source_str
        .chars()
        .filter_map(|c| match from_str.iter().position(|&fc| fc == c) {
            Some(pos) => to_str.get(pos).copied(),
            None => Some(c),
        })
        .collect::<String>();
    Ok(XPathValue::String(result))
}

// --- Boolean Functions ---

fn func_boolean<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Boolean(args.remove(0).to_bool()))
}

fn func_not<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Boolean(!args.remove(0).to_bool()))
}

/// Finds the nearest `xml:lang` (or, for HTML trees, plain `lang`) attribute on
/// the context node or its ancestors.
fn func_lang<N: Navigator>(
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    let test_lang = args.remove(0).to_string().to_lowercase();
    let mut current = e_ctx.context_node.clone();

    // If the context node is not an element, start with its parent.
    if current.node_type() != NodeType::Element && !current.move_to_parent() {
        return Ok(XPathValue::Boolean(false));
    }

    loop {
        let mut attr = current.clone();
        while attr.move_to_next_attribute() {
            let is_lang = attr.local_name() == "lang"
                && (attr.prefix() == "xml" || attr.prefix().is_empty());
            if is_lang {
                let node_lang = attr.value().to_lowercase();
                // Exact match or subcode match (e.g., "en" matches "en-GB")
                let matched =
                    node_lang == test_lang || node_lang.starts_with(&format!("{}-", test_lang));
                return Ok(XPathValue::Boolean(matched));
            }
        }
        if !current.move_to_parent() {
            return Ok(XPathValue::Boolean(false));
        }
    }
}

// --- Number Functions ---

fn func_number<N: Navigator>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    let n = match args.into_iter().next() {
        Some(v) => v.to_number(),
        None => parse_number(&string_value(&e_ctx.context_node)),
    };
    Ok(XPathValue::Number(n))
}

fn func_sum<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let sum = match args.remove(0) {
        XPathValue::NodeSet(nodes) => nodes
            .iter()
            .map(|node| parse_number(&string_value(node)))
            .sum(),
        v => {
            return Err(XPathError::TypeError(format!(
                "sum() argument must be a node-set, got {:?}",
                v
            )));
        }
    };
    Ok(XPathValue::Number(sum))
}

fn func_floor<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Number(args.remove(0).to_number().floor()))
}

fn func_ceiling<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Number(args.remove(0).to_number().ceil()))
}

fn func_round<N: Navigator>(mut args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let n = args.remove(0).to_number();
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        return Ok(XPathValue::Number(n));
    }
    // Halves round towards positive infinity.
    Ok(XPathValue::Number((n + 0.5).floor()))
}
