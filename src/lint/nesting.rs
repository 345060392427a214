//! Element nesting rule
//!
//! Each element may only contain the children listed for its tag. The tree
//! is walked with an explicit worklist so the depth bound is a plain number
//! rather than the call stack.

use super::{Violation, ViolationCode};
use crate::xml::XmlElement;

/// Children each parent tag may contain. Tags not listed may not have children.
pub static ALLOWED_CHILDREN: &[(&str, &[&str])] = &[
    ("OpenGLAPI", &["category", "OpenGLAPI"]),
    ("category", &["enum", "type", "function"]),
    ("function", &["param", "glx", "return"]),
    ("enum", &["size"]),
];

pub fn allowed_children(parent_tag: &str) -> &'static [&'static str] {
    ALLOWED_CHILDREN
        .iter()
        .find(|(parent, _)| *parent == parent_tag)
        .map(|(_, children)| *children)
        .unwrap_or(&[])
}

pub fn is_allowed(parent_tag: &str, child_tag: &str) -> bool {
    allowed_children(parent_tag).contains(&child_tag)
}

/// Check every parent/child pairing below `root`.
///
/// Violations come out in the same order a depth-first walk would find them.
/// Elements deeper than `max_depth` are reported once and not descended into.
pub fn check_nesting(root: &XmlElement, max_depth: usize) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut worklist: Vec<(&XmlElement, &XmlElement, usize)> =
        root.children.iter().rev().map(|child| (root, child, 1)).collect();

    while let Some((parent, element, depth)) = worklist.pop() {
        if !is_allowed(&parent.tag, &element.tag) {
            violations.push(Violation::new(
                ViolationCode::InvalidNesting,
                element.short_desc(),
                format!(
                    "{} nested inside {}",
                    element.short_desc(),
                    parent.short_desc()
                ),
            ));
        }

        if depth > max_depth {
            violations.push(Violation::new(
                ViolationCode::NestingTooDeep,
                element.short_desc(),
                format!(
                    "{} is nested {} levels deep (limit {})",
                    element.short_desc(),
                    depth,
                    max_depth
                ),
            ));
            continue;
        }

        worklist.extend(
            element
                .children
                .iter()
                .rev()
                .map(|child| (element, child, depth + 1)),
        );
    }

    violations
}
