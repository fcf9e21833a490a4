//! Selected-properties projection tree
//!
//! The client-requested projection, mirroring the resource shape. Scopes
//! descend into the tree by link name; a link missing from a partial node
//! means its sub-tree is validated but not emitted.

use std::collections::HashMap;

/// A node in the projection tree
#[derive(Debug, Clone)]
pub enum SelectedProperties {
    /// Everything below this point is selected
    EntireSubtree,
    /// Only the named children are selected
    Partial(HashMap<String, SelectedProperties>),
}

impl Default for SelectedProperties {
    fn default() -> Self {
        SelectedProperties::EntireSubtree
    }
}

impl SelectedProperties {
    #[must_use]
    pub fn entire() -> Self {
        SelectedProperties::EntireSubtree
    }

    /// Build a partial tree from slash-separated paths, e.g.
    /// `["Name", "Orders/Amount"]`.
    #[must_use]
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root: HashMap<String, SelectedProperties> = HashMap::new();
        for path in paths {
            let mut node = &mut root;
            let mut segments = path.as_ref().split('/').peekable();
            while let Some(segment) = segments.next() {
                if segments.peek().is_none() {
                    node.insert(segment.to_owned(), SelectedProperties::EntireSubtree);
                    break;
                }
                let child = node
                    .entry(segment.to_owned())
                    .or_insert_with(|| SelectedProperties::Partial(HashMap::new()));
                match child {
                    SelectedProperties::EntireSubtree => break,
                    SelectedProperties::Partial(inner) => node = inner,
                }
            }
        }
        SelectedProperties::Partial(root)
    }

    /// Descend by link name. Returns the child node and whether the link
    /// is selected at all.
    #[must_use]
    pub fn descend(&self, name: &str) -> (SelectedProperties, bool) {
        match self {
            SelectedProperties::EntireSubtree => (SelectedProperties::EntireSubtree, true),
            SelectedProperties::Partial(children) => match children.get(name) {
                Some(child) => (child.clone(), true),
                None => (SelectedProperties::Partial(HashMap::new()), false),
            },
        }
    }

    #[must_use]
    pub fn is_entire(&self) -> bool {
        matches!(self, SelectedProperties::EntireSubtree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entire_subtree_selects_everything() {
        let tree = SelectedProperties::entire();
        let (child, selected) = tree.descend("Anything");
        assert!(selected);
        assert!(child.is_entire());
    }

    #[test]
    fn partial_tree_descends_by_segment() {
        let tree = SelectedProperties::from_paths(["Name", "Orders/Amount"]);
        let (orders, selected) = tree.descend("Orders");
        assert!(selected);
        let (_, amount_selected) = orders.descend("Amount");
        assert!(amount_selected);
        let (_, other_selected) = orders.descend("Other");
        assert!(!other_selected);

        let (_, missing) = tree.descend("Missing");
        assert!(!missing);
    }
}
