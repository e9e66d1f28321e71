//! Union-find forest with path compression and union by rank.

use crate::error::{Error, Result};

/// A forest of disjoint sets over the elements `0..len`.
///
/// Each element starts in its own singleton set. Representatives are
/// element indices; two elements share a set exactly when their
/// representatives are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl DisjointSet {
    /// Create a structure holding `n` singleton sets.
    pub fn make(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets: n,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the structure holds no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of distinct sets.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.parent.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.parent.len(),
            })
        }
    }

    /// Find the representative of `x`'s set.
    ///
    /// Every node visited on the way up is repointed directly at the root.
    pub fn find(&mut self, x: usize) -> Result<usize> {
        self.check(x)?;

        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        Ok(root)
    }

    /// Merge the sets containing `x` and `y`.
    ///
    /// Returns `Ok(false)` without changing anything when both are already
    /// in the same set. The root of lower rank is attached under the other;
    /// on equal rank `x`'s root wins and its rank grows by one.
    pub fn union(&mut self, x: usize, y: usize) -> Result<bool> {
        let rx = self.find(x)?;
        let ry = self.find(y)?;
        if rx == ry {
            return Ok(false);
        }

        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = ry,
            std::cmp::Ordering::Greater => self.parent[ry] = rx,
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx;
                self.rank[rx] += 1;
            }
        }
        self.sets -= 1;
        Ok(true)
    }

    /// Whether `x` and `y` are in the same set.
    pub fn connected(&mut self, x: usize, y: usize) -> Result<bool> {
        Ok(self.find(x)? == self.find(y)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn make_creates_singletons() {
        let mut set = DisjointSet::make(5);
        assert_eq!(set.len(), 5);
        for i in 0..5 {
            assert_eq!(set.find(i).unwrap(), i);
        }
    }

    #[test]
    fn empty_set() {
        let mut set = DisjointSet::make(0);
        assert!(set.is_empty());
        assert_eq!(set.set_count(), 0);
        assert!(set.find(0).is_err());
    }

    #[test]
    fn union_twice_is_noop() {
        let mut set = DisjointSet::make(3);
        assert!(set.union(0, 1).unwrap());
        assert!(!set.union(1, 0).unwrap());
        assert_eq!(set.set_count(), 2);
    }

    #[test]
    fn union_rejects_out_of_range() {
        let mut set = DisjointSet::make(3);
        assert_eq!(
            set.union(0, 3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        );
        // Failed union leaves the structure untouched
        assert_eq!(set.set_count(), 3);
    }

    #[test]
    fn find_compresses_paths() {
        let mut set = DisjointSet::make(4);
        // Build a chain by hand: 3 -> 2 -> 1 -> 0
        set.parent = vec![0, 0, 1, 2];

        assert_eq!(set.find(3).unwrap(), 0);
        assert_eq!(set.parent, vec![0, 0, 0, 0]);
    }

    #[test]
    fn rank_keeps_trees_shallow() {
        let mut set = DisjointSet::make(8);
        for i in (0..8).step_by(2) {
            set.union(i, i + 1).unwrap();
        }
        set.union(0, 2).unwrap();
        set.union(4, 6).unwrap();
        set.union(0, 4).unwrap();

        assert_eq!(set.set_count(), 1);
        assert!(set.rank.iter().all(|&r| r <= 3), "rank bounded by log2(8)");
    }

    /// Naive component labelling used as a reference.
    fn naive_components(n: usize, unions: &[(usize, usize)]) -> Vec<usize> {
        let mut label: Vec<usize> = (0..n).collect();
        for &(a, b) in unions {
            let (la, lb) = (label[a], label[b]);
            if la != lb {
                for l in label.iter_mut() {
                    if *l == lb {
                        *l = la;
                    }
                }
            }
        }
        label
    }

    proptest! {
        #[test]
        fn agrees_with_naive_reference(
            n in 1usize..24,
            raw in proptest::collection::vec((0usize..24, 0usize..24), 0..40),
        ) {
            let unions: Vec<_> = raw.into_iter().map(|(a, b)| (a % n, b % n)).collect();
            let mut set = DisjointSet::make(n);
            for &(a, b) in &unions {
                set.union(a, b).unwrap();
            }

            let labels = naive_components(n, &unions);
            for a in 0..n {
                for b in 0..n {
                    prop_assert_eq!(set.connected(a, b).unwrap(), labels[a] == labels[b]);
                }
            }

            let mut distinct = labels.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(set.set_count(), distinct.len());
        }
    }
}
