use crate::algorithms::common::Cost;
use crate::grid::NodeId;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Sort key of a frontier entry.
///
/// Ascending `f`, then ascending `g`. Among equal `(f, g)` the most recently
/// inserted entry comes first, so a new node lands in front of the first
/// existing entry that is not cheaper than it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierKey {
    f: Cost,
    g: Cost,
    order: Reverse<u64>,
    node: NodeId,
}

/// Open set of the search, ordered by `(f, g)` with decrease-key support.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    ordered: BTreeSet<FrontierKey>,
    index: FxHashMap<NodeId, FrontierKey>,
    next_order: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node`, or moves it to its new place if it is already queued.
    pub fn push(&mut self, node: NodeId, g: Cost, h: Cost) {
        self.remove(node);
        let key = FrontierKey {
            f: g.saturating_add(h),
            g,
            order: Reverse(self.next_order),
            node,
        };
        self.next_order += 1;
        self.ordered.insert(key);
        self.index.insert(node, key);
    }

    pub fn pop_min(&mut self) -> Option<NodeId> {
        let key = self.ordered.pop_first()?;
        self.index.remove(&key.node);
        Some(key.node)
    }

    pub fn peek_min(&self) -> Option<NodeId> {
        self.ordered.first().map(|key| key.node)
    }

    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.index.remove(&node) {
            Some(key) => self.ordered.remove(&key),
            None => false,
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Queued nodes, cheapest first.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ordered.iter().map(|key| key.node)
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.index.clear();
        self.next_order = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_f_then_g() {
        let mut frontier = Frontier::new();
        frontier.push(1, 4, 4); // f = 8
        frontier.push(2, 2, 4); // f = 6, g = 2
        frontier.push(3, 1, 5); // f = 6, g = 1
        frontier.push(4, 0, 9); // f = 9

        assert_eq!(frontier.iter().collect::<Vec<_>>(), vec![3, 2, 1, 4]);
        assert_eq!(frontier.pop_min(), Some(3));
        assert_eq!(frontier.peek_min(), Some(2));
        assert_eq!(frontier.len(), 3);
    }

    #[test]
    fn test_equal_keys_put_newest_first() {
        let mut frontier = Frontier::new();
        frontier.push(7, 3, 3);
        frontier.push(8, 3, 3);
        assert_eq!(frontier.pop_min(), Some(8));
        assert_eq!(frontier.pop_min(), Some(7));
        assert_eq!(frontier.pop_min(), None);
    }

    #[test]
    fn test_push_again_reorders_without_duplicates() {
        let mut frontier = Frontier::new();
        frontier.push(1, 5, 5);
        frontier.push(2, 4, 4);
        frontier.push(1, 1, 5);

        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(frontier.remove(1));
        assert!(!frontier.remove(1));
        assert!(!frontier.contains(1));
        assert!(frontier.contains(2));
    }
}
