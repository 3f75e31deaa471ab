//! Rules for import statements.

use tree_sitter::Node;

use super::Judgment;
use crate::level::Level;

const IMPORT: Judgment = Judgment::new("Import", Level::A2);
const FROM: Judgment = Judgment::new("From", Level::A2);

pub(super) fn level_import(_node: Node) -> Option<Judgment> {
    Some(IMPORT)
}

/// Also covers `from __future__ import ...`.
pub(super) fn level_import_from(_node: Node) -> Option<Judgment> {
    Some(FROM)
}
