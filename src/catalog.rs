//! Catalog of monitored Python constructs.
//!
//! Maps tree-sitter-python node kinds to the closed set of construct kinds the
//! classifier watches, and each construct kind to its semantic group. The map
//! is a compile-time perfect hash; there is no runtime registration.

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Semantic group of a monitored construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructGroup {
    Literals,
    Variables,
    Expressions,
    Comprehensions,
    Statements,
    Imports,
    ControlFlow,
    FunctionsClass,
}

impl ConstructGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructGroup::Literals => "literals",
            ConstructGroup::Variables => "variables",
            ConstructGroup::Expressions => "expressions",
            ConstructGroup::Comprehensions => "comprehensions",
            ConstructGroup::Statements => "statements",
            ConstructGroup::Imports => "imports",
            ConstructGroup::ControlFlow => "control_flow",
            ConstructGroup::FunctionsClass => "functions_class",
        }
    }
}

impl std::fmt::Display for ConstructGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monitored syntactic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstructKind {
    // Literals
    List,
    Tuple,
    Dict,
    // Variables
    Name,
    // Expressions
    Call,
    IfExp,
    Attribute,
    // Comprehensions
    ListComp,
    GeneratorExp,
    DictComp,
    // Statements
    Assign,
    AugAssign,
    Raise,
    Assert,
    Pass,
    // Imports
    Import,
    ImportFrom,
    // Control flow
    If,
    For,
    While,
    Break,
    Continue,
    Try,
    With,
    // Functions and classes
    FunctionDef,
    Lambda,
    Return,
    Yield,
    ClassDef,
}

/// tree-sitter-python node kind -> monitored construct.
static NODE_KINDS: phf::Map<&'static str, ConstructKind> = phf_map! {
    "list" => ConstructKind::List,
    "list_pattern" => ConstructKind::List,
    "tuple" => ConstructKind::Tuple,
    "tuple_pattern" => ConstructKind::Tuple,
    "expression_list" => ConstructKind::Tuple,
    "pattern_list" => ConstructKind::Tuple,
    "dictionary" => ConstructKind::Dict,
    "identifier" => ConstructKind::Name,
    "call" => ConstructKind::Call,
    "conditional_expression" => ConstructKind::IfExp,
    "attribute" => ConstructKind::Attribute,
    "list_comprehension" => ConstructKind::ListComp,
    "generator_expression" => ConstructKind::GeneratorExp,
    "dictionary_comprehension" => ConstructKind::DictComp,
    "assignment" => ConstructKind::Assign,
    "augmented_assignment" => ConstructKind::AugAssign,
    "raise_statement" => ConstructKind::Raise,
    "assert_statement" => ConstructKind::Assert,
    "pass_statement" => ConstructKind::Pass,
    "import_statement" => ConstructKind::Import,
    "import_from_statement" => ConstructKind::ImportFrom,
    "future_import_statement" => ConstructKind::ImportFrom,
    "if_statement" => ConstructKind::If,
    "elif_clause" => ConstructKind::If,
    "for_statement" => ConstructKind::For,
    "while_statement" => ConstructKind::While,
    "break_statement" => ConstructKind::Break,
    "continue_statement" => ConstructKind::Continue,
    "try_statement" => ConstructKind::Try,
    "with_statement" => ConstructKind::With,
    "function_definition" => ConstructKind::FunctionDef,
    "lambda" => ConstructKind::Lambda,
    "return_statement" => ConstructKind::Return,
    "yield" => ConstructKind::Yield,
    "class_definition" => ConstructKind::ClassDef,
};

impl ConstructKind {
    /// Every construct kind, grouped in catalog order.
    pub const ALL: [ConstructKind; 29] = [
        ConstructKind::List,
        ConstructKind::Tuple,
        ConstructKind::Dict,
        ConstructKind::Name,
        ConstructKind::Call,
        ConstructKind::IfExp,
        ConstructKind::Attribute,
        ConstructKind::ListComp,
        ConstructKind::GeneratorExp,
        ConstructKind::DictComp,
        ConstructKind::Assign,
        ConstructKind::AugAssign,
        ConstructKind::Raise,
        ConstructKind::Assert,
        ConstructKind::Pass,
        ConstructKind::Import,
        ConstructKind::ImportFrom,
        ConstructKind::If,
        ConstructKind::For,
        ConstructKind::While,
        ConstructKind::Break,
        ConstructKind::Continue,
        ConstructKind::Try,
        ConstructKind::With,
        ConstructKind::FunctionDef,
        ConstructKind::Lambda,
        ConstructKind::Return,
        ConstructKind::Yield,
        ConstructKind::ClassDef,
    ];

    /// Look up the monitored construct for a tree-sitter node kind.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        NODE_KINDS.get(kind).copied()
    }

    /// Classify a node, if it is monitored.
    ///
    /// `async def`, `async for`, `async with` and `try`/`except*` are separate
    /// statements in Python's grammar and are not monitored, even though
    /// tree-sitter shares the node kind with their plain forms. Sequence
    /// patterns of a `match` case are not list or tuple displays either.
    pub fn of(node: tree_sitter::Node) -> Option<Self> {
        // Keyword tokens such as `lambda` and `yield` share their node's kind name.
        if !node.is_named() {
            return None;
        }
        let kind = Self::from_node_kind(node.kind())?;
        if kind.may_be_async() && is_async(node) {
            return None;
        }
        if kind == ConstructKind::Try && is_try_star(node) {
            return None;
        }
        if matches!(kind, ConstructKind::List | ConstructKind::Tuple) && in_case_pattern(node) {
            return None;
        }
        Some(kind)
    }

    pub fn group(&self) -> ConstructGroup {
        match self {
            ConstructKind::List | ConstructKind::Tuple | ConstructKind::Dict => {
                ConstructGroup::Literals
            }
            ConstructKind::Name => ConstructGroup::Variables,
            ConstructKind::Call | ConstructKind::IfExp | ConstructKind::Attribute => {
                ConstructGroup::Expressions
            }
            ConstructKind::ListComp | ConstructKind::GeneratorExp | ConstructKind::DictComp => {
                ConstructGroup::Comprehensions
            }
            ConstructKind::Assign
            | ConstructKind::AugAssign
            | ConstructKind::Raise
            | ConstructKind::Assert
            | ConstructKind::Pass => ConstructGroup::Statements,
            ConstructKind::Import | ConstructKind::ImportFrom => ConstructGroup::Imports,
            ConstructKind::If
            | ConstructKind::For
            | ConstructKind::While
            | ConstructKind::Break
            | ConstructKind::Continue
            | ConstructKind::Try
            | ConstructKind::With => ConstructGroup::ControlFlow,
            ConstructKind::FunctionDef
            | ConstructKind::Lambda
            | ConstructKind::Return
            | ConstructKind::Yield
            | ConstructKind::ClassDef => ConstructGroup::FunctionsClass,
        }
    }

    /// Whether a leveling rule exists for this kind.
    ///
    /// Kinds without a rule are still monitored so that coverage audits can
    /// report how often they occur.
    pub fn has_rule(&self) -> bool {
        crate::rules::rule_for(*self).is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructKind::List => "list",
            ConstructKind::Tuple => "tuple",
            ConstructKind::Dict => "dict",
            ConstructKind::Name => "name",
            ConstructKind::Call => "call",
            ConstructKind::IfExp => "if_exp",
            ConstructKind::Attribute => "attribute",
            ConstructKind::ListComp => "list_comp",
            ConstructKind::GeneratorExp => "generator_exp",
            ConstructKind::DictComp => "dict_comp",
            ConstructKind::Assign => "assign",
            ConstructKind::AugAssign => "aug_assign",
            ConstructKind::Raise => "raise",
            ConstructKind::Assert => "assert",
            ConstructKind::Pass => "pass",
            ConstructKind::Import => "import",
            ConstructKind::ImportFrom => "import_from",
            ConstructKind::If => "if",
            ConstructKind::For => "for",
            ConstructKind::While => "while",
            ConstructKind::Break => "break",
            ConstructKind::Continue => "continue",
            ConstructKind::Try => "try",
            ConstructKind::With => "with",
            ConstructKind::FunctionDef => "function_def",
            ConstructKind::Lambda => "lambda",
            ConstructKind::Return => "return",
            ConstructKind::Yield => "yield",
            ConstructKind::ClassDef => "class_def",
        }
    }

    /// The tree-sitter node kinds that map to this construct.
    pub fn node_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = NODE_KINDS
            .entries()
            .filter(|(_, k)| *k == self)
            .map(|(name, _)| *name)
            .collect();
        kinds.sort_unstable();
        kinds
    }

    fn may_be_async(&self) -> bool {
        matches!(
            self,
            ConstructKind::For | ConstructKind::With | ConstructKind::FunctionDef
        )
    }
}

impl std::fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An `async` keyword, when present, is the node's first child.
fn is_async(node: tree_sitter::Node) -> bool {
    node.child(0).map(|c| c.kind() == "async").unwrap_or(false)
}

/// `try` with `except*` handlers.
fn is_try_star(node: tree_sitter::Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == "except_group_clause");
    found
}

fn in_case_pattern(node: tree_sitter::Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "case_pattern" => return true,
            "block" | "module" => return false,
            _ => current = parent.parent(),
        }
    }
    false
}
