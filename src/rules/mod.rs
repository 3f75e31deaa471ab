//! Leveling rules: one decision function per ruled construct kind.
//!
//! Every rule is a pure function of a single node's structure. Rules look at
//! children by their parsed kind and never at source text, so a string
//! literal that happens to spell a construct name cannot change a verdict.
//! Rules never consult siblings or earlier observations, so traversal order
//! cannot affect a judgment.
//!
//! A rule returns `None` when the node's shape matches none of its known
//! cases; the walker counts those as unmatched instead of guessing a level.

mod comprehensions;
mod control_flow;
mod functions;
mod literals;
mod modules;

use tree_sitter::Node;

use crate::catalog::ConstructKind;
use crate::level::Level;

/// A (label, level) verdict for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judgment {
    pub label: &'static str,
    pub level: Level,
}

impl Judgment {
    pub const fn new(label: &'static str, level: Level) -> Self {
        Self { label, level }
    }
}

/// A leveling rule.
pub type Rule = fn(Node) -> Option<Judgment>;

/// The rule for a construct kind, if one exists.
pub fn rule_for(kind: ConstructKind) -> Option<Rule> {
    let rule: Rule = match kind {
        ConstructKind::List => literals::level_list,
        ConstructKind::Dict => literals::level_dict,
        ConstructKind::IfExp => control_flow::level_if_expression,
        ConstructKind::ListComp => comprehensions::level_list_comprehension,
        ConstructKind::GeneratorExp => comprehensions::level_generator_expression,
        ConstructKind::Import => modules::level_import,
        ConstructKind::ImportFrom => modules::level_import_from,
        ConstructKind::If => control_flow::level_if,
        ConstructKind::For => control_flow::level_for,
        ConstructKind::While => control_flow::level_while,
        ConstructKind::Try => control_flow::level_try,
        ConstructKind::With => control_flow::level_with,
        ConstructKind::FunctionDef => functions::level_function,
        ConstructKind::Lambda => functions::level_lambda,
        ConstructKind::ClassDef => functions::level_class,
        ConstructKind::Tuple
        | ConstructKind::Name
        | ConstructKind::Call
        | ConstructKind::Attribute
        | ConstructKind::DictComp
        | ConstructKind::Assign
        | ConstructKind::AugAssign
        | ConstructKind::Raise
        | ConstructKind::Assert
        | ConstructKind::Pass
        | ConstructKind::Break
        | ConstructKind::Continue
        | ConstructKind::Return
        | ConstructKind::Yield => return None,
    };
    Some(rule)
}

/// Level a node of a known construct kind.
pub fn judge(kind: ConstructKind, node: Node) -> Option<Judgment> {
    rule_for(kind).and_then(|rule| rule(node))
}

/// Named children, skipping comments.
fn elements(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Whether any direct child has the given kind.
fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// Look through redundant parentheses: `((x))` -> `x`.
fn unwrap_parens(mut node: Node) -> Node {
    while node.kind() == "parenthesized_expression" {
        match elements(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}
