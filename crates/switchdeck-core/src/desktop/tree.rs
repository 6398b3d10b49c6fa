//! Parent/child process hierarchy from a flat process list.

use std::collections::{HashMap, HashSet};

use crate::desktop::types::ProcessInfo;

/// Build a forest from a flat list, preserving input order.
///
/// A process is attached under its parent when the parent is present and
/// walking up from the parent never reaches the process again. Everything
/// else (orphans, self-parented, cycle members) becomes a root. Duplicate
/// ids keep their first occurrence. Childless nodes carry an empty
/// `children`, which is omitted when serialized.
pub fn build_tree(flat: Vec<ProcessInfo>) -> Vec<ProcessInfo> {
    let mut order: Vec<u32> = Vec::with_capacity(flat.len());
    let mut nodes: HashMap<u32, ProcessInfo> = HashMap::with_capacity(flat.len());
    for mut process in flat {
        if nodes.contains_key(&process.id) {
            continue;
        }
        process.children = Vec::new();
        order.push(process.id);
        nodes.insert(process.id, process);
    }

    let parent_of = |id: u32| -> Option<u32> {
        nodes
            .get(&id)
            .and_then(|p| p.parent_id)
            .filter(|&parent| parent != 0 && parent != id && nodes.contains_key(&parent))
    };

    let mut child_ids: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut roots: Vec<u32> = Vec::new();

    for &id in &order {
        match parent_of(id) {
            Some(parent) if !chain_reaches(parent, id, &parent_of) => {
                child_ids.entry(parent).or_default().push(id);
            }
            _ => roots.push(id),
        }
    }

    roots
        .into_iter()
        .filter_map(|id| assemble(id, &mut nodes, &child_ids))
        .collect()
}

/// Walk the parent chain from `start` and report whether `target` appears.
/// Stops on any repeat, so a cycle not involving `target` still terminates.
fn chain_reaches(start: u32, target: u32, parent_of: &impl Fn(u32) -> Option<u32>) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if id == target {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = parent_of(id);
    }
    false
}

fn assemble(
    id: u32,
    nodes: &mut HashMap<u32, ProcessInfo>,
    child_ids: &HashMap<u32, Vec<u32>>,
) -> Option<ProcessInfo> {
    let mut node = nodes.remove(&id)?;
    if let Some(children) = child_ids.get(&id) {
        node.children = children
            .iter()
            .filter_map(|&child| assemble(child, nodes, child_ids))
            .collect();
    }
    Some(node)
}
