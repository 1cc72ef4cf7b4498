/*!
Graph traversals and the measures derived from them.

All searches visit neighbours in key order and keep their frontier on an explicit stack or queue.
*/
use super::{edge, Graph};
use crate::error::{DigraphError, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use roaring::RoaringBitmap;
use std::collections::VecDeque;

/// Result of a [depth first search][Graph::depth_first_search].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFirstSearch {
    /// One tree per connected component, as vertex positions in discovery order.
    pub trees: Vec<Vec<usize>>,
    /// Discovery time of every vertex.
    pub enter: Vec<usize>,
    /// Finishing time of every vertex.
    pub exit: Vec<usize>,
}

impl Graph {
    /// Vertex positions sorted by key.
    fn key_order(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = (0..self.order()).collect();
        positions.sort_by(|&x, &y| self.vertices.key(x).cmp(self.vertices.key(y)));
        positions
    }

    fn sorted_neighbours(&self, x: usize) -> Vec<usize> {
        let mut result: Vec<usize> = self.neighbours()[x].iter().map(|y| y as usize).collect();
        result.sort_by(|&a, &b| self.vertices.key(a).cmp(self.vertices.key(b)));
        result
    }

    /// Depth first search from every unvisited vertex in key order.
    pub fn depth_first_search(&self) -> DepthFirstSearch {
        let n = self.order();
        let mut result = DepthFirstSearch {
            trees: Vec::new(),
            enter: vec![0; n],
            exit: vec![0; n],
        };
        let mut visited = vec![false; n];
        let mut time = 0;
        for root in self.key_order() {
            if visited[root] {
                continue;
            }
            let mut tree = vec![root];
            visited[root] = true;
            result.enter[root] = time;
            time += 1;
            let mut stack = vec![(root, self.sorted_neighbours(root), 0usize)];
            while let Some((x, candidates, next)) = stack.last_mut() {
                match candidates.get(*next) {
                    Some(&y) => {
                        *next += 1;
                        if !visited[y] {
                            visited[y] = true;
                            tree.push(y);
                            result.enter[y] = time;
                            time += 1;
                            let candidates = self.sorted_neighbours(y);
                            stack.push((y, candidates, 0));
                        }
                    }
                    None => {
                        result.exit[*x] = time;
                        time += 1;
                        stack.pop();
                    }
                }
            }
            log::trace!("dfs tree {:?}", self.vertices.choice_keys(&to_set(&tree)));
            result.trees.push(tree);
        }
        result
    }

    /// Breadth first search from `root`: reachable vertex keys with their distance, by increasing
    /// distance and then key. Logs a warning if some vertex is not reachable.
    pub fn breadth_first_search(&self, root: &str) -> Result<Vec<(String, usize)>> {
        let root = self.vertices.require(root)?;
        let depths = self.distances(root);
        if depths.iter().any(Option::is_none) {
            log::warn!(
                "graph {} is not connected, not every vertex is reachable from {}",
                self.name,
                self.vertices.key(root)
            );
        }
        let mut result: Vec<(String, usize)> = depths
            .iter()
            .enumerate()
            .filter_map(|(x, depth)| depth.map(|depth| (self.vertices.key(x).to_string(), depth)))
            .collect();
        result.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(result)
    }

    /// Edge distances from `root`, `None` for unreachable vertices.
    fn distances(&self, root: usize) -> Vec<Option<usize>> {
        let mut depths = vec![None; self.order()];
        depths[root] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(x) = queue.pop_front() {
            let depth = depths[x].unwrap_or(0);
            for y in self.sorted_neighbours(x) {
                if depths[y].is_none() {
                    depths[y] = Some(depth + 1);
                    queue.push_back(y);
                }
            }
        }
        depths
    }

    /// The connected components, as vertex sets.
    pub fn components(&self) -> Vec<RoaringBitmap> {
        self.depth_first_search()
            .trees
            .iter()
            .map(|tree| to_set(tree))
            .collect()
    }

    /// Returns true if there is at most one connected component.
    pub fn is_connected(&self) -> bool {
        self.depth_first_search().trees.len() <= 1
    }

    /// Returns true for connected graphs with `order - 1` edges.
    pub fn is_tree(&self) -> bool {
        self.order() <= 1 || (self.size() + 1 == self.order() && self.is_connected())
    }

    /// Number of vertices per degree, indexed by degree.
    pub fn degree_distribution(&self) -> Vec<usize> {
        let mut result = vec![0; self.order().max(1)];
        for neighbours in self.neighbours() {
            result[neighbours.len() as usize] += 1;
        }
        result
    }

    /// Number of vertices per neighbourhood depth, i.e. the largest distance to another vertex.
    /// The last entry, at index `order`, counts the vertices which do not reach every other one.
    pub fn neighbourhood_depth_distribution(&self) -> Vec<usize> {
        let n = self.order();
        let mut result = vec![0; n + 1];
        for x in 0..n {
            result[self.eccentricity(x).unwrap_or(n)] += 1;
        }
        result
    }

    fn eccentricity(&self, x: usize) -> Option<usize> {
        self.distances(x)
            .into_iter()
            .try_fold(0, |depth, distance| distance.map(|d| depth.max(d)))
    }

    /// The largest neighbourhood depth, `None` for a disconnected graph.
    pub fn diameter(&self) -> Option<usize> {
        (0..self.order())
            .map(|x| self.eccentricity(x))
            .try_fold(0, |diameter, depth| depth.map(|d| diameter.max(d)))
    }

    /// A uniformly drawn spanning tree, sampled by loop-erased random walks (Wilson).
    ///
    /// Fails with [IsolatedVertex][DigraphError::IsolatedVertex] on a disconnected graph.
    pub fn random_spanning_tree(&self, seed: u64) -> Result<Graph> {
        log::info!("[Start] random spanning tree of {}", self.name);
        let n = self.order();
        let mut tree = Graph::empty(self.vertices.clone(), self.domain);
        tree.name = format!("spanning-tree-{}", self.name);
        if n == 0 {
            return Ok(tree);
        }
        if let Some(component) = self.components().get(1) {
            let isolated = component.min().unwrap_or_default() as usize;
            log::warn!("graph {} is not connected", self.name);
            return Err(DigraphError::IsolatedVertex(
                self.vertices.key(isolated).to_string(),
            ));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let neighbours: Vec<Vec<usize>> = (0..n).map(|x| self.sorted_neighbours(x)).collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);
        let mut in_tree = vec![false; n];
        let mut next = vec![0usize; n];
        in_tree[order[0]] = true;
        for &start in order.iter().skip(1) {
            let mut u = start;
            while !in_tree[u] {
                match neighbours[u].choose(&mut rng) {
                    Some(&v) => {
                        next[u] = v;
                        u = v;
                    }
                    None => {
                        return Err(DigraphError::IsolatedVertex(
                            self.vertices.key(u).to_string(),
                        ))
                    }
                }
            }
            let mut u = start;
            while !in_tree[u] {
                in_tree[u] = true;
                tree.edges.insert(edge(u, next[u]), self.domain.max());
                u = next[u];
            }
        }
        log::info!("[Done] random spanning tree");
        Ok(tree)
    }
}

fn to_set(positions: &[usize]) -> RoaringBitmap {
    positions.iter().map(|&x| x as u32).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        datatypes::{ActionContainer, Decimal, ValuationDomain},
        random::random_graph,
    };
    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn two_paths() -> Graph {
        let mut graph =
            Graph::empty(ActionContainer::numbered("v", 5), ValuationDomain::normalized());
        for (x, y) in [("v1", "v2"), ("v2", "v3"), ("v4", "v5")] {
            graph.set_edge_value(x, y, Decimal::ONE).unwrap();
        }
        graph
    }

    #[test]
    fn depth_first() {
        let graph = two_paths();
        let dfs = graph.depth_first_search();
        assert_eq!(dfs.trees, vec![vec![0, 1, 2], vec![3, 4]]);
        assert_eq!(dfs.enter, vec![0, 1, 2, 6, 7]);
        assert_eq!(dfs.exit, vec![5, 4, 3, 9, 8]);
        assert_eq!(graph.components().len(), 2);
        assert!(!graph.is_connected());
        assert!(!graph.is_tree());
    }

    #[test]
    fn breadth_first() {
        let graph = Graph::cycle(5);
        let bfs = graph.breadth_first_search("v1").unwrap();
        let keys: Vec<&str> = bfs.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["v1", "v2", "v5", "v3", "v4"]);
        assert_eq!(bfs[4].1, 2);
        assert_eq!(two_paths().breadth_first_search("v4").unwrap().len(), 2);
        assert!(graph.breadth_first_search("x").is_err());
    }

    #[test]
    fn distributions() {
        let graph = two_paths();
        assert_eq!(graph.degree_distribution(), vec![0, 4, 1, 0, 0]);
        assert_eq!(graph.neighbourhood_depth_distribution(), vec![0, 0, 0, 0, 0, 5]);
        assert_eq!(graph.diameter(), None);

        let cycle = Graph::cycle(5);
        assert_eq!(cycle.degree_distribution(), vec![0, 0, 5, 0, 0]);
        assert_eq!(cycle.neighbourhood_depth_distribution(), vec![0, 0, 5, 0, 0, 0]);
        assert_eq!(cycle.diameter(), Some(2));
        assert_eq!(Graph::cycle(6).diameter(), Some(3));
    }

    #[test]
    fn trees() {
        let mut path =
            Graph::empty(ActionContainer::numbered("v", 3), ValuationDomain::normalized());
        path.set_edge_value("v1", "v2", Decimal::ONE).unwrap();
        path.set_edge_value("v2", "v3", Decimal::ONE).unwrap();
        assert!(path.is_tree());
        assert!(!Graph::cycle(3).is_tree());
        assert_eq!(
            two_paths().random_spanning_tree(1),
            Err(DigraphError::IsolatedVertex(String::from("v4")))
        );
        let tree = Graph::cycle(6).random_spanning_tree(3).unwrap();
        assert_eq!(tree.size(), 5);
        assert!(tree.is_tree());
    }

    #[quickcheck]
    fn spanning_trees_span(seed: u64) -> bool {
        let graph = random_graph(7, 60, seed);
        match graph.random_spanning_tree(seed) {
            Ok(tree) => {
                graph.is_connected()
                    && tree.is_tree()
                    && tree
                        .edges()
                        .filter(|&(_, value)| value > Decimal::ZERO)
                        .all(|((x, y), _)| graph.neighbours()[x].contains(y as u32))
            }
            Err(_) => !graph.is_connected(),
        }
    }
}
