//! Rules for comprehensions and generator expressions.

use tree_sitter::Node;

use super::Judgment;
use crate::level::Level;

const LIST_COMPREHENSION: Judgment = Judgment::new("Simple List Comprehension", Level::C1);
const GENERATOR_EXPRESSION: Judgment = Judgment::new("Generator Expression", Level::C1);

pub(super) fn level_list_comprehension(_node: Node) -> Option<Judgment> {
    Some(LIST_COMPREHENSION)
}

pub(super) fn level_generator_expression(_node: Node) -> Option<Judgment> {
    Some(GENERATOR_EXPRESSION)
}
