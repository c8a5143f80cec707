//! Liveness diff
//!
//! Keeps the `mounted` flag of every node in sync with the current tree.
//! This is a positional walk, not a reconciliation: children are paired by
//! index until the first pair from different families, after which the
//! remaining new children are mounted and the remaining old children are
//! unmounted. Identical subtrees are skipped without recursion, so the cost
//! is linear in the size of what changed.
//!
//! Within a pair of the same family, the new snapshot is mounted before the
//! old one is unmounted. An observer can then tell a remount from an
//! unmount followed by an unrelated mount.

use crate::node::SharedShadowNode;
use arbor_event::DispatchGuard;
use std::sync::Arc;

/// Update `mounted` flags going from `old_children` to `new_children`
///
/// Requires the dispatch lock, so that no event is dispatched for a node
/// in the middle of its transition.
pub(crate) fn update_mounted_flag(
    old_children: &[SharedShadowNode],
    new_children: &[SharedShadowNode],
    guard: &DispatchGuard<'_>,
) {
    if std::ptr::eq(old_children, new_children) {
        return;
    }
    if old_children.is_empty() && new_children.is_empty() {
        return;
    }

    let mut index = 0;

    // Stage 1: updated children
    while index < old_children.len() && index < new_children.len() {
        let old_child = &old_children[index];
        let new_child = &new_children[index];

        if Arc::ptr_eq(old_child, new_child) {
            index += 1;
            continue;
        }
        if !old_child.same_family(new_child) {
            break;
        }

        mount(new_child, guard);
        old_child.set_mounted(false, guard);
        update_mounted_flag(old_child.children(), new_child.children(), guard);
        index += 1;
    }

    // Stage 2: inserted children
    for new_child in &new_children[index..] {
        mount(new_child, guard);
        update_mounted_flag(&[], new_child.children(), guard);
    }

    // Stage 3: removed children
    for old_child in &old_children[index..] {
        old_child.set_mounted(false, guard);
        update_mounted_flag(old_child.children(), &[], guard);
    }
}

fn mount(node: &SharedShadowNode, guard: &DispatchGuard<'_>) {
    node.set_mounted(true, guard);
    if let Some(state) = node.state() {
        state.commit(node);
    }
}
