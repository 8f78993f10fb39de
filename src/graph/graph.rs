use std::collections::BTreeSet;

use crate::types::AreaId;

/// Undirected adjacency between live areas, in compressed sparse row format.
/// Nodes are area ids in ascending order; each neighbor list is sorted.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    ids: Vec<AreaId>,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl AdjacencyGraph {
    /// Construct a graph from sorted node ids and symmetric adjacency lists.
    pub(crate) fn new(ids: Vec<AreaId>, adjacencies: &[Vec<u32>]) -> Self {
        assert!(adjacencies.len() == ids.len(), "adjacencies.len() must equal ids.len()");
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must be sorted and unique");

        let sorted = adjacencies.iter()
            .map(|list| {
                let mut list = list.clone();
                list.sort_unstable();
                list.dedup();
                list
            })
            .collect::<Vec<_>>();

        Self {
            offsets: std::iter::once(0u32).chain(
                sorted.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| { *acc += len; Some(*acc) })
            ).collect(),
            edges: sorted.into_iter().flatten().collect(),
            ids,
        }
    }

    /// Build a graph from explicit id pairs (edges are made symmetric).
    pub fn from_edges(ids: impl IntoIterator<Item = AreaId>, edges: &[(AreaId, AreaId)]) -> Self {
        let ids = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect::<Vec<_>>();
        let mut adjacencies = vec![Vec::new(); ids.len()];
        for (a, b) in edges {
            let (Ok(i), Ok(j)) = (ids.binary_search(a), ids.binary_search(b)) else { continue };
            if i == j { continue }
            adjacencies[i].push(j as u32);
            adjacencies[j].push(i as u32);
        }
        Self::new(ids, &adjacencies)
    }

    /// Get the number of areas in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.ids.len() }

    /// Get the number of (directed) edge entries in the graph.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Area ids, ascending.
    #[inline] pub fn ids(&self) -> &[AreaId] { &self.ids }

    /// Index of an area, if it is live in this graph.
    #[inline] pub fn index_of(&self, id: &AreaId) -> Option<usize> { self.ids.binary_search(id).ok() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbor indices of a given node.
    #[inline]
    pub fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Areas sharing a boundary segment with `id`, ascending.
    /// Empty for an isolated or unknown area.
    pub fn neighbors(&self, id: &AreaId) -> Vec<&AreaId> {
        self.index_of(id)
            .map(|node| self.edges(node).map(|v| &self.ids[v]).collect())
            .unwrap_or_default()
    }

    /// True if the two areas share a boundary segment.
    pub fn are_adjacent(&self, a: &AreaId, b: &AreaId) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.edges(i).any(|v| v == j),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<AreaId> { names.iter().map(|&n| AreaId::new(n)).collect() }

    fn make_test_graph() -> AdjacencyGraph {
        AdjacencyGraph::new(
            ids(&["a", "b", "c", "d"]),
            &[
                vec![2, 1],       // a
                vec![0, 2],       // b
                vec![0, 1, 3],    // c
                vec![2],          // d
            ],
        )
    }

    #[test]
    fn csr_graph_construction() {
        let graph = make_test_graph();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 8);
        assert_eq!(graph.offsets, vec![0, 2, 4, 7, 8]);

        // Neighbor lists are sorted
        assert_eq!(graph.edges, vec![1, 2, 0, 2, 0, 1, 3, 2]);

        for window in graph.offsets.windows(2) { assert!(window[0] <= window[1]) }
    }

    #[test]
    fn neighbors_by_id() {
        let graph = make_test_graph();
        assert_eq!(graph.neighbors(&AreaId::new("c")), vec![&AreaId::new("a"), &AreaId::new("b"), &AreaId::new("d")]);
        assert!(graph.are_adjacent(&AreaId::new("d"), &AreaId::new("c")));
        assert!(!graph.are_adjacent(&AreaId::new("a"), &AreaId::new("d")));
    }

    #[test]
    fn unknown_and_isolated_areas_have_no_neighbors() {
        let graph = AdjacencyGraph::from_edges(ids(&["x", "y", "z"]), &[(AreaId::new("x"), AreaId::new("y"))]);
        assert!(graph.neighbors(&AreaId::new("z")).is_empty());
        assert!(graph.neighbors(&AreaId::new("missing")).is_empty());
        assert_eq!(graph.degree(2), 0);
    }

    #[test]
    fn from_edges_is_symmetric_and_deduplicated() {
        let graph = AdjacencyGraph::from_edges(
            ids(&["b", "a"]),
            &[(AreaId::new("a"), AreaId::new("b")), (AreaId::new("b"), AreaId::new("a"))],
        );
        assert_eq!(graph.ids(), ids(&["a", "b"]).as_slice());
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.are_adjacent(&AreaId::new("b"), &AreaId::new("a")));
    }

    #[test]
    #[should_panic(expected = "adjacencies.len() must equal ids.len()")]
    fn new_panics_when_lengths_mismatch() {
        AdjacencyGraph::new(ids(&["a"]), &[]);
    }
}
