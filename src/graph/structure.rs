/*!
Recognition of comparability, interval, and permutation graphs.

Edges are oriented class by class following Golumbic's Γ-forcing: orienting `(i, j)` forces
`(i, m)` for every `m` adjacent to `i` but not to `j`, and `(m, j)` for every `m` adjacent to `j`
but not to `i`. Edges of earlier classes count as absent. A graph is a comparability graph iff no
forced orientation ever contradicts an earlier one of the same class.
*/
use super::Graph;
use crate::{algebra::Fusion, datatypes::Decimal, digraph::Digraph};

const UNORIENTED: i64 = i64::MAX;

/// Signed implication class labels of the ordered vertex pairs.
///
/// `label(x, y) = k > 0` orients the edge `{x, y}` as `x → y` in class `k`, `-k` as `y → x`, and
/// `0` marks a missing edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orientation {
    labels: Vec<Vec<i64>>,
    classes: i64,
    comparability: bool,
}

impl Orientation {
    fn compute(graph: &Graph) -> Self {
        log::info!("[Start] edge orientation of {}", graph.name);
        let n = graph.order();
        let neighbours = graph.neighbours();
        let mut result = Self {
            labels: vec![vec![0; n]; n],
            classes: 0,
            comparability: true,
        };
        for (x, out) in neighbours.iter().enumerate() {
            for y in out.iter() {
                result.labels[x][y as usize] = UNORIENTED;
            }
        }
        let edges: Vec<(usize, usize)> = graph
            .edges()
            .filter(|&(_, value)| value > graph.domain.med())
            .map(|(edge, _)| edge)
            .collect();
        for (i, j) in edges {
            if result.labels[i][j] != UNORIENTED {
                continue;
            }
            result.classes += 1;
            let k = result.classes;
            result.labels[i][j] = k;
            result.labels[j][i] = -k;
            result.explore(graph, (i, j));
        }
        log::info!(
            "[Done] {} implication classes, comparability: {}",
            result.classes,
            result.comparability
        );
        result
    }

    /// Edge absent from the current class's remaining graph.
    fn is_free(&self, x: usize, y: usize) -> bool {
        self.labels[x][y].abs() < self.classes
    }

    fn force(&mut self, from: usize, to: usize, stack: &mut Vec<(usize, usize)>) {
        let k = self.classes;
        let label = self.labels[from][to];
        if label == UNORIENTED {
            self.labels[from][to] = k;
            self.labels[to][from] = -k;
            stack.push((from, to));
        } else if label == -k {
            log::trace!("conflicting orientation of ({from}, {to}) in class {k}");
            self.labels[from][to] = k;
            self.comparability = false;
            stack.push((from, to));
        }
    }

    fn explore(&mut self, graph: &Graph, arc: (usize, usize)) {
        let neighbours = graph.neighbours();
        let mut stack = vec![arc];
        while let Some((i, j)) = stack.pop() {
            for m in neighbours[i].iter().map(|m| m as usize) {
                if !neighbours[j].contains(m as u32) || self.is_free(j, m) {
                    self.force(i, m, &mut stack);
                }
            }
            for m in neighbours[j].iter().map(|m| m as usize) {
                if !neighbours[i].contains(m as u32) || self.is_free(i, m) {
                    self.force(m, j, &mut stack);
                }
            }
        }
    }

    /// Label of the ordered pair `(x, y)`.
    pub fn label(&self, x: usize, y: usize) -> i64 {
        self.labels[x][y]
    }

    /// Number of implication classes.
    pub fn classes(&self) -> usize {
        self.classes as usize
    }

    /// Returns true if no forced orientation conflicted.
    pub fn is_transitive(&self) -> bool {
        self.comparability
    }
}

impl Graph {
    /// The implication class orientation of the edges, computed on first use after a mutation.
    pub fn orientation(&self) -> &Orientation {
        self.cache
            .orientation
            .get_or_init(|| Orientation::compute(self))
    }

    /// Returns true if the edges admit a transitive orientation.
    pub fn is_comparability_graph(&self) -> bool {
        self.orientation().is_transitive()
    }

    /// The transitively oriented digraph: oriented edges at `Max` resp. `Min`, missing edges at
    /// `Med`, and `Min` on the diagonal. `None` if the graph is no comparability graph.
    pub fn transitive_orientation(&self) -> Option<Digraph> {
        let orientation = self.orientation();
        if !orientation.is_transitive() {
            log::debug!("{} does not admit a transitive orientation", self.name);
            return None;
        }
        let n = self.order();
        let relation = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| match orientation.label(x, y) {
                        _ if x == y => self.domain.min(),
                        0 => self.domain.med(),
                        label if label > 0 => self.domain.max(),
                        _ => self.domain.min(),
                    })
                    .collect()
            })
            .collect();
        Some(Digraph::from_parts(
            format!("trans_oriented_{}", self.name),
            self.vertices.clone(),
            self.domain,
            relation,
        ))
    }

    /// Returns true if the graph is triangulated and its dual is a comparability graph.
    pub fn is_interval_graph(&self) -> bool {
        self.is_triangulated() && self.dual().is_comparability_graph()
    }

    /// Returns true if both the graph and its dual are comparability graphs.
    pub fn is_permutation_graph(&self) -> bool {
        self.is_comparability_graph() && self.dual().is_comparability_graph()
    }

    /// A permutation whose [permutation graph][Graph::from_permutation] is isomorphic to the graph.
    ///
    /// The transitive orientations of the graph and of its dual are fused into two linear
    /// orders, once with the graph orientation reversed; the permutation maps the ranks of the
    /// first order onto the second. `None` if the graph is no permutation graph.
    pub fn compute_permutation(&self) -> Option<Vec<usize>> {
        let oriented = self.transitive_orientation()?;
        let dual_oriented = self.dual().transitive_orientation()?;
        if oriented.transitivity_degree() < Decimal::ONE
            || dual_oriented.transitivity_degree() < Decimal::ONE
        {
            log::debug!("orientations of {} are not transitive", self.name);
            return None;
        }
        let first = oriented.fusion(&dual_oriented, Fusion::OMax).ok()?;
        let second = oriented.dual().fusion(&dual_oriented, Fusion::OMax).ok()?;
        let first = first.copeland_ranking().ranking;
        let second = second.copeland_ranking().ranking;
        log::debug!("linear orders {:?} and {:?}", first, second);
        let mut permutation = vec![0; self.order()];
        for (rank, key) in first.iter().enumerate() {
            let position = second.iter().position(|other| other == key)?;
            permutation[position] = rank + 1;
        }
        Some(permutation)
    }
}
