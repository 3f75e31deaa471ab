//! Tree-sitter parsing of Python sources.

use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::AnalysisError;

static PYTHON: Lazy<Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

/// A successfully parsed source file.
///
/// The tree is guaranteed to be free of `ERROR` and `MISSING` nodes.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: Tree,
    /// The file name (for error reporting).
    pub file: String,
}

impl ParsedFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// Parse Python source text.
///
/// tree-sitter recovers from syntax errors by inserting `ERROR`/`MISSING`
/// nodes; such trees are rejected here so that a malformed file is a
/// per-file failure rather than a source of bogus observations. Python 2
/// statements the grammar tolerates are rejected the same way.
pub fn parse_source(file: &str, source: &str) -> Result<ParsedFile, AnalysisError> {
    let mut parser = Parser::new();
    parser.set_language(&PYTHON)?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::SourceUnparseable {
            file: file.to_string(),
            line: 1,
            column: 1,
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let at = first_error(root).unwrap_or(root);
        let pos = at.start_position();
        return Err(AnalysisError::SourceUnparseable {
            file: file.to_string(),
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    if let Some(at) = first_python2_node(root) {
        let pos = at.start_position();
        return Err(AnalysisError::SourceUnparseable {
            file: file.to_string(),
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    Ok(ParsedFile {
        tree,
        file: file.to_string(),
    })
}

/// First statement that only parses under Python 2.
///
/// The grammar still accepts `print x`, `exec code` and `raise E, msg`
/// without error nodes, but none of them is valid Python 3.
fn first_python2_node(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if is_python2_only(node) {
            return Some(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn is_python2_only(node: Node) -> bool {
    match node.kind() {
        "print_statement" | "exec_statement" => true,
        "raise_statement" => {
            let mut cursor = node.walk();
            let raised = node
                .named_children(&mut cursor)
                .find(|c| c.kind() != "comment");
            matches!(raised, Some(c) if c.kind() == "expression_list")
        }
        _ => false,
    }
}

/// First `ERROR` or `MISSING` node in source order.
fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        // Only descend into subtrees that contain an error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        let parsed = parse_source("ok.py", "def hello():\n    return 42\n").unwrap();
        assert_eq!(parsed.root().kind(), "module");
        assert_eq!(parsed.file, "ok.py");
    }

    #[test]
    fn test_parse_empty_source() {
        let parsed = parse_source("empty.py", "").unwrap();
        assert_eq!(parsed.root().named_child_count(), 0);
    }

    #[test]
    fn test_parse_error_reports_position() {
        let err = parse_source("bad.py", "x = 1\ndef broken(:\n    pass\n")
            .err()
            .unwrap();
        match err {
            AnalysisError::SourceUnparseable { file, line, .. } => {
                assert_eq!(file, "bad.py");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unclosed_bracket_is_unparseable() {
        let result = parse_source("bad.py", "items = [1, 2,\n");
        assert!(matches!(
            result,
            Err(AnalysisError::SourceUnparseable { .. })
        ));
    }

    fn unparseable_at(source: &str) -> (usize, usize) {
        match parse_source("py2.py", source) {
            Err(AnalysisError::SourceUnparseable { line, column, .. }) => (line, column),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("{:?} should be rejected", source),
        }
    }

    #[test]
    fn test_python2_print_is_unparseable() {
        assert_eq!(unparseable_at("x = [1]\nprint \"hello\"\n"), (2, 1));
        assert_eq!(unparseable_at("print >>sys.stderr, \"x\"\n"), (1, 1));
    }

    #[test]
    fn test_python2_exec_is_unparseable() {
        assert_eq!(unparseable_at("def f():\n    exec \"x = 1\"\n"), (2, 5));
    }

    #[test]
    fn test_python2_raise_with_message_is_unparseable() {
        assert_eq!(unparseable_at("raise ValueError, \"m\"\n"), (1, 1));
    }

    #[test]
    fn test_python3_forms_still_parse() {
        let source = "print(\"hi\")\nexec(\"x = 1\")\nraise ValueError(\"m\") from None\nraise (A, B)\n";
        assert!(parse_source("ok.py", source).is_ok());
    }
}
