//! Rules for literal containers.

use tree_sitter::Node;

use super::{elements, unwrap_parens, Judgment};
use crate::level::Level;

const SIMPLE_LIST: Judgment = Judgment::new("Simple List", Level::A1);
const NESTED_LIST: Judgment = Judgment::new("Nested List", Level::A2);
const SIMPLE_DICTIONARY: Judgment = Judgment::new("Simple Dictionary", Level::A2);

/// Container literals that make an enclosing list "nested". Assignment
/// targets nest through their pattern forms.
const CONTAINER_LITERALS: &[&str] = &[
    "list",
    "tuple",
    "dictionary",
    "list_pattern",
    "tuple_pattern",
];

/// A list is nested when one of its elements is itself a list, tuple or
/// dict literal.
pub(super) fn level_list(node: Node) -> Option<Judgment> {
    let nested = elements(node)
        .into_iter()
        .any(|element| CONTAINER_LITERALS.contains(&unwrap_parens(element).kind()));

    if nested {
        Some(NESTED_LIST)
    } else {
        Some(SIMPLE_LIST)
    }
}

// Nested dictionaries are not distinguished.
pub(super) fn level_dict(_node: Node) -> Option<Judgment> {
    Some(SIMPLE_DICTIONARY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::judge_first;

    #[test]
    fn test_simple_list() {
        assert_eq!(judge_first("[1, 2, 3]\n", "list"), Some(SIMPLE_LIST));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(judge_first("x = []\n", "list"), Some(SIMPLE_LIST));
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(judge_first("[[1, 2], [3, 4]]\n", "list"), Some(NESTED_LIST));
    }

    #[test]
    fn test_list_of_tuples_and_dicts_is_nested() {
        assert_eq!(judge_first("[(1, 2)]\n", "list"), Some(NESTED_LIST));
        assert_eq!(judge_first("[1, {'a': 1}]\n", "list"), Some(NESTED_LIST));
    }

    #[test]
    fn test_parenthesized_element_is_looked_through() {
        assert_eq!(judge_first("[([1])]\n", "list"), Some(NESTED_LIST));
        assert_eq!(judge_first("[(x)]\n", "list"), Some(SIMPLE_LIST));
    }

    #[test]
    fn test_strings_naming_constructs_stay_simple() {
        assert_eq!(judge_first("['ast.List']\n", "list"), Some(SIMPLE_LIST));
        assert_eq!(
            judge_first("['list', 'tuple', 'dictionary', '[1]']\n", "list"),
            Some(SIMPLE_LIST)
        );
    }

    #[test]
    fn test_comprehension_element_is_not_a_literal() {
        assert_eq!(
            judge_first("[1, [x for x in y]]\n", "list"),
            Some(SIMPLE_LIST)
        );
    }

    #[test]
    fn test_list_targets() {
        assert_eq!(judge_first("[a, b] = 1, 2\n", "list_pattern"), Some(SIMPLE_LIST));
        assert_eq!(
            judge_first("for [x, y] in z:\n    pass\n", "list_pattern"),
            Some(SIMPLE_LIST)
        );
    }

    #[test]
    fn test_nested_list_targets() {
        assert_eq!(
            judge_first("[a, [b, c]] = x\n", "list_pattern"),
            Some(NESTED_LIST)
        );
        assert_eq!(
            judge_first("[a, (b, c)] = x\n", "list_pattern"),
            Some(NESTED_LIST)
        );
    }

    #[test]
    fn test_dictionary() {
        assert_eq!(judge_first("{'a': 1}\n", "dictionary"), Some(SIMPLE_DICTIONARY));
        assert_eq!(
            judge_first("{'a': {'b': 1}}\n", "dictionary"),
            Some(SIMPLE_DICTIONARY)
        );
    }
}
