//! Utility functions for navigating owned XML trees.

use super::tree::{Element, Node, NodePath};

/// Locate a field below `element` and return its path relative to `element`.
///
/// The first segment of `path` is matched at any depth below `element`
/// (in document order), the remaining segments are direct children of it.
/// The first anchor that has the full path wins.
///
/// # Examples
/// ```
/// use zipsplit::xml::{find_field, Element};
///
/// let register = Element::new("Register")
///     .with_child(Element::new("Name"))
///     .with_child(
///         Element::new("Block")
///             .with_child(Element::new("Adr").with_child(Element::new("Zip"))),
///     );
///
/// assert_eq!(find_field(&register, "Adr/Zip"), Some(vec![1, 0, 0]));
/// assert_eq!(find_field(&register, "Adr/Street"), None);
/// ```
pub fn find_field(element: &Element, path: &str) -> Option<NodePath> {
    let (anchor, rest) = match path.split_once('/') {
        Some((anchor, rest)) => (anchor, Some(rest)),
        None => (path, None),
    };

    element.descendant_paths(anchor).into_iter().find_map(|mut anchor_path| {
        let Some(rest) = rest else {
            return Some(anchor_path);
        };
        let mut current = element.element_at(&anchor_path)?;
        for part in rest.split('/') {
            let index = current
                .children
                .iter()
                .position(|child| matches!(child, Node::Element(e) if e.name == part))?;
            anchor_path.push(index);
            current = current.element_at(&[index])?;
        }
        Some(anchor_path)
    })
}

/// Check if a string is empty or only XML whitespace.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}
