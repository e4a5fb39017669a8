//! Disjoint-set union over node IDs.
//!
//! Each ID is assigned a stable index once at construction; parent and size
//! live in flat arrays indexed by it.

use std::collections::HashMap;

pub struct UnionFind {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// Create a new UnionFind with each ID as its own component.
    /// Duplicate IDs share one slot.
    pub fn new<S: AsRef<str>>(ids: &[S]) -> Self {
        let mut uf = UnionFind {
            ids: Vec::with_capacity(ids.len()),
            index: HashMap::with_capacity(ids.len()),
            parent: Vec::with_capacity(ids.len()),
            size: Vec::with_capacity(ids.len()),
        };
        for id in ids {
            let id = id.as_ref();
            if uf.index.contains_key(id) {
                continue;
            }
            let i = uf.ids.len();
            uf.ids.push(id.to_string());
            uf.index.insert(id.to_string(), i);
            uf.parent.push(i);
            uf.size.push(1);
        }
        uf
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Root index of the set containing `i`, halving the path on the way up.
    pub fn find_index(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Representative ID of the set containing `id`, or `None` for unknown IDs.
    pub fn find(&mut self, id: &str) -> Option<&str> {
        let i = self.index_of(id)?;
        let root = self.find_index(i);
        Some(self.ids[root].as_str())
    }

    /// Union by size. Returns true if the two sets were separate.
    pub fn union_index(&mut self, a: usize, b: usize) -> bool {
        let mut root_a = self.find_index(a);
        let mut root_b = self.find_index(b);
        if root_a == root_b {
            return false;
        }
        if self.size[root_a] < self.size[root_b] {
            std::mem::swap(&mut root_a, &mut root_b);
        }
        self.parent[root_b] = root_a;
        self.size[root_a] += self.size[root_b];
        true
    }

    /// Merge the sets containing `a` and `b`. Unknown IDs are ignored.
    pub fn union(&mut self, a: &str, b: &str) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(ia), Some(ib)) => self.union_index(ia, ib),
            _ => false,
        }
    }

    /// Size of the set containing `id`.
    pub fn component_size(&mut self, id: &str) -> usize {
        match self.index_of(id) {
            Some(i) => {
                let root = self.find_index(i);
                self.size[root]
            }
            None => 0,
        }
    }

    /// All sets, keyed by representative ID. Members keep construction order.
    pub fn components(&mut self) -> HashMap<String, Vec<String>> {
        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..self.ids.len() {
            let root = self.find_index(i);
            groups.entry(root).or_default().push(i);
        }
        groups
            .into_iter()
            .map(|(root, members)| {
                (
                    self.ids[root].clone(),
                    members.into_iter().map(|m| self.ids[m].clone()).collect(),
                )
            })
            .collect()
    }

    /// Sizes of all sets, without materializing member lists.
    pub fn component_sizes(&mut self) -> Vec<usize> {
        let roots: Vec<usize> = (0..self.ids.len())
            .filter(|&i| self.find_index(i) == i)
            .collect();
        roots.into_iter().map(|i| self.size[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut uf = UnionFind::new(&["a", "b", "c"]);
        assert_eq!(uf.len(), 3);
        assert_eq!(uf.components().len(), 3);
        assert_eq!(uf.find("a"), Some("a"));
        assert_eq!(uf.find("zzz"), None);
    }

    #[test]
    fn test_union_merges_and_reports() {
        let mut uf = UnionFind::new(&["a", "b", "c", "d"]);
        assert!(uf.union("a", "b"));
        assert!(uf.union("c", "d"));
        assert!(!uf.union("b", "a"), "already merged");
        assert!(uf.union("b", "d"));

        let rep = uf.find("a").map(|s| s.to_string());
        assert_eq!(uf.find("d").map(|s| s.to_string()), rep);
        assert_eq!(uf.component_size("c"), 4);
        assert_eq!(uf.component_sizes(), vec![4]);
    }

    #[test]
    fn test_component_sizes_after_unions() {
        let mut uf = UnionFind::new(&["a", "b", "c", "d", "e"]);
        uf.union("a", "b");
        uf.union("b", "c");
        let mut sizes = uf.component_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 1, 3]);
        assert_eq!(sizes.iter().sum::<usize>(), uf.len());
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let mut uf = UnionFind::new(&["a"]);
        assert!(!uf.union("a", "ghost"));
        assert_eq!(uf.component_size("ghost"), 0);
    }

    #[test]
    fn test_components_partition_every_id_once() {
        let ids: Vec<String> = (0..50).map(|i| format!("n{}", i)).collect();
        let mut uf = UnionFind::new(&ids);
        for i in (0..50).step_by(5) {
            for j in i + 1..i + 5 {
                uf.union(&ids[i], &ids[j]);
            }
        }
        let comps = uf.components();
        assert_eq!(comps.len(), 10);

        let mut all: Vec<String> = comps.values().flatten().cloned().collect();
        all.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(all, expected);

        for (rep, members) in &comps {
            assert!(members.contains(rep), "representative belongs to its own set");
        }
    }

    #[test]
    fn test_long_chain_no_recursion() {
        let ids: Vec<String> = (0..200_000).map(|i| i.to_string()).collect();
        let mut uf = UnionFind::new(&ids);
        for w in ids.windows(2) {
            uf.union(&w[0], &w[1]);
        }
        assert_eq!(uf.component_size("0"), 200_000);
    }
}
