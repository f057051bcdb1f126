//! Cycle detection over target dependency edges.

use std::collections::HashMap;

use indexmap::IndexMap;

/// Tracks the visitation state of a node during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Find a dependency cycle among `edges` (full path -> dependency full
/// paths), if any. The reported cycle is canonicalised to start at its
/// smallest member so error text is stable regardless of traversal order.
pub(crate) fn find_cycle(edges: &IndexMap<String, Vec<String>>) -> Option<Vec<String>> {
    let mut detector = CycleDetector::new(edges);
    for node in edges.keys() {
        if detector.is_visited(node) {
            continue;
        }
        if let Some(cycle) = detector.visit(node.clone()) {
            return Some(cycle);
        }
    }
    None
}

struct CycleDetector<'a> {
    edges: &'a IndexMap<String, Vec<String>>,
    stack: Vec<String>,
    states: HashMap<String, VisitState>,
}

impl<'a> CycleDetector<'a> {
    fn new(edges: &'a IndexMap<String, Vec<String>>) -> Self {
        Self {
            edges,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn is_visited(&self, node: &str) -> bool {
        matches!(self.states.get(node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: String) -> Option<Vec<String>> {
        match self.states.get(&node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                // A node revisited while still on the stack closes a cycle.
                let idx = self.stack.iter().position(|n| n == &node).unwrap_or(0);
                let mut cycle: Vec<String> = self.stack.iter().skip(idx).cloned().collect();
                cycle.push(node);
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node.clone(), VisitState::Visiting);
            }
        }

        self.stack.push(node.clone());

        if let Some(deps) = self.edges.get(&node) {
            for dep in deps {
                // Unknown references are rejected before detection runs;
                // treat them as leaves here.
                if !self.edges.contains_key(dep) {
                    continue;
                }
                if let Some(cycle) = self.visit(dep.clone()) {
                    return Some(cycle);
                }
            }
        }

        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }
}

fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        slot.clone_from(&first);
    }
    cycle
}
