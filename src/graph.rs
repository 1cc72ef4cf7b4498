/*!
This module describes the bipolar-valued undirected graph.

 - edge-keyed storage with one characteristic value per unordered pair
 - the bridge to and from [Digraph]
 - independent sets, cliques, and matchings
*/

pub mod cycles;
pub mod structure;
pub mod traversal;

use crate::{
    datatypes::{Action, ActionContainer, Decimal, ValuationDomain},
    digraph::{
        choices::{IndependentChoices, MisGenerator},
        ActionsDescription, Digraph,
    },
    error::{DigraphError, Result},
};
use derivative::Derivative;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::{cell::OnceCell, collections::BTreeMap, ops::Neg};
use strum::{Display, EnumString, EnumVariantNames};

use self::structure::Orientation;

/// An unordered pair of vertex positions, smaller position first.
pub type Edge = (usize, usize);

fn edge(x: usize, y: usize) -> Edge {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// A stored edge.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EdgeDescription {
    /// Keys of both end points.
    pub vertices: (String, String),
    /// Characteristic value.
    pub value: Decimal,
}

/// Stored description of a [Graph]. Missing edges are read as `Med`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphDescription {
    /// Name of the instance.
    #[serde(default)]
    pub name: String,
    /// The vertices.
    pub vertices: ActionsDescription,
    /// The valuation domain.
    #[serde(rename = "valuationdomain")]
    pub valuation_domain: ValuationDomain,
    /// The characteristic value of the edges.
    #[serde(default)]
    pub edges: Vec<EdgeDescription>,
}

/// How a [Digraph] is folded into a [Graph].
#[derive(
    EnumString, EnumVariantNames, Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    /// `min(r(x,y), r(y,x))`
    Conjunctive,
    /// `max(r(x,y), r(y,x))`
    Disjunctive,
}

#[derive(Debug, Clone, Default)]
struct GraphCache {
    neighbours: OnceCell<Vec<RoaringBitmap>>,
    orientation: OnceCell<Orientation>,
}

#[derive(Derivative, Clone, Serialize, Deserialize)]
#[derivative(Debug, PartialEq)]
#[serde(try_from = "GraphDescription", into = "GraphDescription")]
/// A bipolar-valued graph: keyed vertices, a [valuation domain][ValuationDomain], and one
/// characteristic value per unordered pair of distinct vertices.
///
/// Every mutation of an edge invalidates the cached neighbourhoods and the edge orientation.
pub struct Graph {
    name: String,
    vertices: ActionContainer,
    domain: ValuationDomain,
    edges: BTreeMap<Edge, Decimal>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    cache: GraphCache,
}

impl TryFrom<GraphDescription> for Graph {
    type Error = DigraphError;

    fn try_from(value: GraphDescription) -> Result<Self> {
        Graph::from_description(value)
    }
}

impl From<Graph> for GraphDescription {
    fn from(value: Graph) -> Self {
        value.description()
    }
}

impl Graph {
    pub(crate) fn from_parts(
        name: String,
        vertices: ActionContainer,
        domain: ValuationDomain,
        edges: BTreeMap<Edge, Decimal>,
    ) -> Self {
        Self {
            name,
            vertices,
            domain,
            edges,
            cache: GraphCache::default(),
        }
    }

    fn filled(vertices: ActionContainer, domain: ValuationDomain, fill: Decimal) -> Self {
        let n = vertices.len();
        let edges = (0..n)
            .flat_map(|x| (x + 1..n).map(move |y| ((x, y), fill)))
            .collect();
        Self::from_parts(String::from("graph"), vertices, domain, edges)
    }

    /// Instantiates a graph where every edge carries `fill`.
    pub fn with_value(
        vertices: ActionContainer,
        domain: ValuationDomain,
        fill: Decimal,
    ) -> Result<Self> {
        domain.check(fill)?;
        Ok(Self::filled(vertices, domain, fill))
    }

    /// Every edge at `Max`.
    pub fn complete(vertices: ActionContainer, domain: ValuationDomain) -> Self {
        let mut result = Self::filled(vertices, domain, domain.max());
        result.name = String::from("complete");
        result
    }

    /// Every edge at `Min`.
    pub fn empty(vertices: ActionContainer, domain: ValuationDomain) -> Self {
        let mut result = Self::filled(vertices, domain, domain.min());
        result.name = String::from("empty");
        result
    }

    /// The cycle `v1 - v2 - … - vn - v1` on `[-1, 1]`.
    pub fn cycle(order: usize) -> Self {
        let mut result = Self::empty(
            ActionContainer::numbered("v", order),
            ValuationDomain::normalized(),
        );
        if order > 1 {
            for x in 0..order {
                result.edges.insert(edge(x, (x + 1) % order), Decimal::ONE);
            }
        }
        result.name = format!("cycleGraph{order}");
        result
    }

    /// The permutation graph of `π` on the vertices `1 … n`: `i` and `j` are linked iff
    /// `(i - j)(π⁻¹(i) - π⁻¹(j)) < 0`.
    pub fn from_permutation(permutation: &[usize]) -> Result<Self> {
        let n = permutation.len();
        let mut inverse = vec![0usize; n + 1];
        for (position, &value) in permutation.iter().enumerate() {
            if value == 0 || value > n || inverse[value] != 0 {
                return Err(DigraphError::DomainMismatch(format!(
                    "{permutation:?} is not a permutation of 1..={n}"
                )));
            }
            inverse[value] = position + 1;
        }
        let vertices =
            ActionContainer::from_actions((1..=n).map(|i| Action::new(i.to_string())))?;
        let mut result = Self::empty(vertices, ValuationDomain::normalized());
        for i in 1..=n {
            for j in i + 1..=n {
                if inverse[i] > inverse[j] {
                    result.edges.insert((i - 1, j - 1), Decimal::ONE);
                }
            }
        }
        result.name = String::from("permutationGraph");
        Ok(result)
    }

    /// Instantiates a graph from a [stored description][GraphDescription].
    pub fn from_description(description: GraphDescription) -> Result<Self> {
        let vertices = match description.vertices {
            ActionsDescription::Keys(keys) => ActionContainer::from_keys(keys)?,
            ActionsDescription::Described(described) => ActionContainer::from_actions(
                described
                    .into_iter()
                    .map(|(key, meta)| Action::with_meta(key, meta)),
            )?,
        };
        let mut result = Self::with_value(
            vertices,
            description.valuation_domain,
            description.valuation_domain.med(),
        )?;
        for stored in description.edges {
            let (x, y) = (
                result.vertices.require(&stored.vertices.0)?,
                result.vertices.require(&stored.vertices.1)?,
            );
            if x == y {
                return Err(DigraphError::DomainMismatch(format!(
                    "loop on vertex {}",
                    stored.vertices.0
                )));
            }
            result
                .edges
                .insert(edge(x, y), result.domain.check(stored.value)?);
        }
        result.name = if description.name.is_empty() {
            String::from("graph")
        } else {
            description.name
        };
        log::debug!("loaded graph {} with {} vertices", result.name, result.order());
        Ok(result)
    }

    /// The [stored description][GraphDescription] of the graph.
    pub fn description(&self) -> GraphDescription {
        GraphDescription {
            name: self.name.clone(),
            vertices: ActionsDescription::Described(
                self.vertices
                    .iter()
                    .map(|vertex| (vertex.key().to_string(), vertex.meta().clone()))
                    .collect(),
            ),
            valuation_domain: self.domain,
            edges: self
                .edges
                .iter()
                .map(|(&(x, y), &value)| EdgeDescription {
                    vertices: (
                        self.vertices.key(x).to_string(),
                        self.vertices.key(y).to_string(),
                    ),
                    value,
                })
                .collect(),
        }
    }

    /// Serializes the stored description to JSON.
    #[cfg(feature = "importexport")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Loads a graph from a JSON stored description.
    #[cfg(feature = "importexport")]
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Name of the instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the instance.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The vertices.
    pub fn vertices(&self) -> &ActionContainer {
        &self.vertices
    }

    /// The valuation domain.
    pub fn domain(&self) -> &ValuationDomain {
        &self.domain
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.vertices.len()
    }

    /// Characteristic value of the edge `{x, y}`; `Med` on the diagonal.
    pub fn edge_value(&self, x: &str, y: &str) -> Result<Decimal> {
        let (x, y) = (self.vertices.require(x)?, self.vertices.require(y)?);
        Ok(self.edge_value_at(x, y))
    }

    /// Characteristic value of the edge between two positions.
    pub fn edge_value_at(&self, x: usize, y: usize) -> Decimal {
        self.edges
            .get(&edge(x, y))
            .copied()
            .unwrap_or_else(|| self.domain.med())
    }

    /// All edges with their value, in position order.
    pub fn edges(&self) -> impl Iterator<Item = (Edge, Decimal)> + '_ {
        self.edges.iter().map(|(&edge, &value)| (edge, value))
    }

    /// Sets the characteristic value of the edge `{x, y}`, bounds checked.
    pub fn set_edge_value(&mut self, x: &str, y: &str, value: Decimal) -> Result<()> {
        let (x, y) = (self.vertices.require(x)?, self.vertices.require(y)?);
        if x == y {
            return Err(DigraphError::DomainMismatch(format!(
                "loop on vertex {}",
                self.vertices.key(x)
            )));
        }
        self.edges.insert(edge(x, y), self.domain.check(value)?);
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.cache = GraphCache::default();
    }

    /// Strict neighbourhoods `{ y | r({x,y}) > Med }`, computed on first use after a mutation.
    pub fn neighbours(&self) -> &[RoaringBitmap] {
        self.cache.neighbours.get_or_init(|| {
            let med = self.domain.med();
            let mut result = vec![RoaringBitmap::new(); self.order()];
            for (&(x, y), &value) in self.edges.iter() {
                if value > med {
                    result[x].insert(y as u32);
                    result[y].insert(x as u32);
                }
            }
            result
        })
    }

    /// Number of edges with `r({x,y}) > Med`.
    pub fn size(&self) -> usize {
        let med = self.domain.med();
        self.edges.values().filter(|&&value| value > med).count()
    }

    /// Keys of the vertices in a set.
    pub fn choice_keys(&self, choice: &RoaringBitmap) -> Vec<String> {
        self.vertices.choice_keys(choice)
    }

    /// The dual graph: every edge value is negated.
    pub fn dual(&self) -> Graph {
        let edges = self
            .edges
            .iter()
            .map(|(&edge, &value)| (edge, self.domain.negate(value)))
            .collect();
        Self::from_parts(
            format!("dual-{}", self.name),
            self.vertices.clone(),
            self.domain,
            edges,
        )
    }

    /// The symmetric digraph with `r(x,y) = r(y,x) = r({x,y})` and `Med` on the diagonal.
    pub fn to_digraph(&self) -> Digraph {
        let n = self.order();
        let relation = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| {
                        if x == y {
                            self.domain.med()
                        } else {
                            self.edge_value_at(x, y)
                        }
                    })
                    .collect()
            })
            .collect();
        Digraph::from_parts(
            self.name.clone(),
            self.vertices.clone(),
            self.domain,
            relation,
        )
    }

    /// Lazy enumeration of the independent vertex sets.
    pub fn independent_choices(&self) -> IndependentChoices {
        IndependentChoices::new(self.neighbours().to_vec(), false)
    }

    /// All maximal independent vertex sets, in enumeration order.
    pub fn maximal_independent_sets(&self) -> Vec<RoaringBitmap> {
        log::info!("[Start] maximal independent sets of {}", self.name);
        let result: Vec<RoaringBitmap> = IndependentChoices::new(self.neighbours().to_vec(), true)
            .map(|independent| independent.choice)
            .collect();
        log::info!("[Done] {} maximal independent sets", result.len());
        result
    }

    /// Maximal independent vertex sets over a random vertex permutation.
    pub fn mis_generator(&self, seed: Option<u64>) -> MisGenerator {
        MisGenerator::new(self.neighbours().to_vec(), seed)
    }

    /// Size of a largest independent vertex set.
    pub fn stability_number(&self) -> usize {
        self.maximal_independent_sets()
            .iter()
            .map(|mis| mis.len() as usize)
            .max()
            .unwrap_or(0)
    }

    /// All maximal cliques, as the maximal independent sets of the dual.
    pub fn cliques(&self) -> Vec<RoaringBitmap> {
        self.dual().maximal_independent_sets()
    }

    /// A maximum matching, as a largest maximal independent set of the line graph. Ties go to the
    /// first one enumerated.
    pub fn maximum_matching(&self) -> Vec<Edge> {
        let med = self.domain.med();
        let lines: Vec<Edge> = self
            .edges
            .iter()
            .filter(|(_, &value)| value > med)
            .map(|(&edge, _)| edge)
            .collect();
        let adjacency = lines
            .iter()
            .map(|&(a, b)| {
                lines
                    .iter()
                    .enumerate()
                    .filter(|(_, &(c, d))| {
                        (a, b) != (c, d) && (a == c || a == d || b == c || b == d)
                    })
                    .map(|(i, _)| i as u32)
                    .collect()
            })
            .collect();
        let mut best = RoaringBitmap::new();
        for mis in IndependentChoices::new(adjacency, true).map(|independent| independent.choice) {
            if mis.len() > best.len() {
                best = mis;
            }
        }
        log::debug!("maximum matching of {} edges", best.len());
        best.iter().map(|i| lines[i as usize]).collect()
    }
}

impl Neg for &Graph {
    type Output = Graph;

    /// Dual graph.
    fn neg(self) -> Self::Output {
        self.dual()
    }
}

impl Digraph {
    /// Folds the digraph into a graph, combining both directions of every pair.
    pub fn to_graph(&self, conjunction: Conjunction) -> Graph {
        let n = self.order();
        let edges = (0..n)
            .flat_map(|x| (x + 1..n).map(move |y| (x, y)))
            .map(|(x, y)| {
                let (forward, backward) = (self.value_at(x, y), self.value_at(y, x));
                let value = match conjunction {
                    Conjunction::Conjunctive => forward.min(backward),
                    Conjunction::Disjunctive => forward.max(backward),
                };
                ((x, y), value)
            })
            .collect();
        Graph::from_parts(
            self.name().to_string(),
            self.actions().clone(),
            *self.domain(),
            edges,
        )
    }
}
