//! Rules for function, lambda and class definitions.

use tree_sitter::Node;

use super::{elements, Judgment};
use crate::level::Level;

const FUNCTION: Judgment = Judgment::new("Function", Level::A1);
const FUNCTION_DEFAULT_ARG: Judgment = Judgment::new("Function with Default argument", Level::A2);
const FUNCTION_STAR_ARG: Judgment = Judgment::new("Function with * argument", Level::B1);
const LAMBDA: Judgment = Judgment::new("Lambda", Level::B1);
const SIMPLE_CLASS: Judgment = Judgment::new("Simple Class", Level::B1);
const INHERITED_CLASS: Judgment = Judgment::new("Inherited Class", Level::B1);

/// Parameter features that drive the function rule.
#[derive(Debug, Default, PartialEq, Eq)]
struct ParameterShape {
    defaults: bool,
    vararg: bool,
    kwarg: bool,
}

impl ParameterShape {
    fn of(parameters: Node) -> Self {
        let mut shape = ParameterShape::default();
        for param in elements(parameters) {
            match param.kind() {
                "default_parameter" | "typed_default_parameter" => shape.defaults = true,
                "list_splat_pattern" => shape.vararg = true,
                "dictionary_splat_pattern" => shape.kwarg = true,
                // `*args: int` and `**kwargs: str` wrap the splat in a typed parameter.
                "typed_parameter" => {
                    for inner in elements(param) {
                        match inner.kind() {
                            "list_splat_pattern" => shape.vararg = true,
                            "dictionary_splat_pattern" => shape.kwarg = true,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        shape
    }
}

/// Functions are leveled by their parameter list. Combinations outside the
/// known cases (any `**kwargs`, or `*args` together with defaults) are left
/// unmatched.
pub(super) fn level_function(node: Node) -> Option<Judgment> {
    let parameters = node.child_by_field_name("parameters")?;
    let shape = ParameterShape::of(parameters);

    match shape {
        ParameterShape { kwarg: true, .. } => None,
        ParameterShape {
            vararg: true,
            defaults: true,
            ..
        } => None,
        ParameterShape { vararg: true, .. } => Some(FUNCTION_STAR_ARG),
        ParameterShape { defaults: true, .. } => Some(FUNCTION_DEFAULT_ARG),
        _ => Some(FUNCTION),
    }
}

pub(super) fn level_lambda(_node: Node) -> Option<Judgment> {
    Some(LAMBDA)
}

/// Classes are inherited when they name at least one positional base.
/// Keyword arguments such as `metaclass=` are not bases.
pub(super) fn level_class(node: Node) -> Option<Judgment> {
    let bases = node
        .child_by_field_name("superclasses")
        .map(|args| {
            elements(args)
                .into_iter()
                .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat"))
                .count()
        })
        .unwrap_or(0);

    if bases > 0 {
        Some(INHERITED_CLASS)
    } else {
        Some(SIMPLE_CLASS)
    }
}
