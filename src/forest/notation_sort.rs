//! Recursive notation ranking.
//!
//! Every sibling set is ranked by notation. With [`SortAxis::Label`] the
//! label order stays and each node gets a `notation_rank`; with
//! [`SortAxis::Notation`] siblings are physically re-ordered and the rank is
//! dropped. Sibling sets carrying declared positions (ordered collections)
//! keep their order and get no rank.
//!
//! Both passes walk the forest with an explicit stack. All notations are
//! parsed before anything is touched, so a malformed value leaves the forest
//! exactly as it was.

use crate::config::{NotationSortConfig, SortAxis};
use crate::notation::{NotationError, NotationKey, compare_optional};

use super::TreeNode;

/// Notation order of one sibling set; `None` for positioned sets.
type Plan = Option<Vec<usize>>;

/// Rank (or re-order) every sibling set below and including `roots`.
pub fn apply(roots: &mut Vec<TreeNode>, config: &NotationSortConfig) -> Result<(), NotationError> {
    let plans = plan(roots, config)?;
    rearrange(roots, config.default_axis, plans);
    Ok(())
}

/// Orders for every non-empty sibling set, in the pre-order in which
/// [`rearrange`] meets them.
fn plan(roots: &[TreeNode], config: &NotationSortConfig) -> Result<Vec<Plan>, NotationError> {
    let mut plans = Vec::new();
    let mut stack = vec![roots];
    while let Some(siblings) = stack.pop() {
        let order = notation_order(siblings, config)?;
        let visit: Vec<usize> = match (&order, config.default_axis) {
            (Some(order), SortAxis::Notation) => order.clone(),
            _ => (0..siblings.len()).collect(),
        };
        stack.extend(
            visit
                .into_iter()
                .map(|i| siblings[i].children.as_slice())
                .filter(|children| !children.is_empty()),
        );
        plans.push(order);
    }
    Ok(plans)
}

fn notation_order(siblings: &[TreeNode], config: &NotationSortConfig) -> Result<Plan, NotationError> {
    if siblings.iter().any(|n| n.position.is_some()) {
        return Ok(None);
    }
    let keys = siblings
        .iter()
        .map(|n| {
            n.view
                .notation
                .as_deref()
                .map(|raw| config.format.parse(raw, n.iri()))
                .transpose()
        })
        .collect::<Result<Vec<Option<NotationKey>>, _>>()?;

    // Stable: equal notations keep label order.
    let mut order: Vec<usize> = (0..siblings.len()).collect();
    order.sort_by(|&a, &b| compare_optional(keys[a].as_ref(), keys[b].as_ref()));
    Ok(Some(order))
}

fn rearrange(roots: &mut Vec<TreeNode>, axis: SortAxis, plans: Vec<Plan>) {
    let by_notation = axis == SortAxis::Notation;
    let mut plans = plans.into_iter();
    let mut stack = vec![roots];
    while let Some(siblings) = stack.pop() {
        if let Some(order) = plans.next().flatten() {
            if by_notation {
                let mut slots: Vec<Option<TreeNode>> = siblings.drain(..).map(Some).collect();
                siblings.extend(order.iter().filter_map(|&idx| slots[idx].take()));
            } else {
                for (rank, &idx) in order.iter().enumerate() {
                    siblings[idx].notation_rank = Some(rank);
                }
            }
        }
        for node in siblings.iter_mut() {
            node.sort_by_notation = by_notation;
            if by_notation {
                node.notation_rank = None;
            }
            if !node.children.is_empty() {
                stack.push(&mut node.children);
            }
        }
    }
}
