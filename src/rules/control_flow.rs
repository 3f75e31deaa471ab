//! Rules for branches, loops, exception handling and context managers.

use tree_sitter::Node;

use super::{has_child_kind, Judgment};
use crate::catalog::ConstructKind;
use crate::level::Level;

const SIMPLE_IF: Judgment = Judgment::new("Simple If statements", Level::A1);
const IF_EXPRESSION: Judgment = Judgment::new("If statements expression", Level::B1);
const SIMPLE_FOR: Judgment = Judgment::new("Simple For Loop", Level::A1);
const NESTED_FOR: Judgment = Judgment::new("Nested For Loop", Level::A2);
const SIMPLE_WHILE: Judgment = Judgment::new("Simple While Loop", Level::B1);
const WHILE_ELSE: Judgment = Judgment::new("While with Else Loop", Level::B1);
const TRY_EXCEPT: Judgment = Judgment::new("Exception --> try/except", Level::B1);
const TRY_FINALLY: Judgment = Judgment::new("Exception --> try/finally", Level::B2);
const WITH: Judgment = Judgment::new("With", Level::B1);

/// Scopes a nested loop search does not enter.
const SCOPE_BOUNDARIES: &[&str] = &[
    "function_definition",
    "class_definition",
    "decorated_definition",
    "lambda",
];

/// `if` statements and `elif` clauses. Each `elif` is its own branch, the
/// same way Python's own AST nests it as a separate `If`.
pub(super) fn level_if(_node: Node) -> Option<Judgment> {
    Some(SIMPLE_IF)
}

pub(super) fn level_if_expression(_node: Node) -> Option<Judgment> {
    Some(IF_EXPRESSION)
}

/// A for-loop is nested when its body holds another for-loop, at any depth
/// of compound statements but not inside a nested definition.
pub(super) fn level_for(node: Node) -> Option<Judgment> {
    let body = node.child_by_field_name("body")?;
    if contains_for_loop(body) {
        Some(NESTED_FOR)
    } else {
        Some(SIMPLE_FOR)
    }
}

fn contains_for_loop(node: Node) -> bool {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().any(|child| {
        if ConstructKind::of(child) == Some(ConstructKind::For) {
            return true;
        }
        if SCOPE_BOUNDARIES.contains(&child.kind()) {
            return false;
        }
        contains_for_loop(child)
    })
}

pub(super) fn level_while(node: Node) -> Option<Judgment> {
    if has_child_kind(node, "else_clause") {
        Some(WHILE_ELSE)
    } else {
        Some(SIMPLE_WHILE)
    }
}

/// Only pure try/except and pure try/finally are leveled; a statement with
/// both handlers and a finally clause is left unmatched.
pub(super) fn level_try(node: Node) -> Option<Judgment> {
    let has_except = has_child_kind(node, "except_clause");
    let has_finally = has_child_kind(node, "finally_clause");

    match (has_except, has_finally) {
        (true, false) => Some(TRY_EXCEPT),
        (false, true) => Some(TRY_FINALLY),
        _ => None,
    }
}

pub(super) fn level_with(_node: Node) -> Option<Judgment> {
    Some(WITH)
}
