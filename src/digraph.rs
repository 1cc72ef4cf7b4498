/*!
This module describes the bipolar-valued digraph.

 - the relation store with keyed actions and a characteristic valuation
 - neighbourhood sets at the median cut, cached until the relation changes
 - closures, recoding, and descriptive statistics
*/

pub mod choices;
pub mod choosing;
pub mod circuits;
pub mod coca;
pub mod correlation;
pub mod derived;
pub mod ranking;
pub mod rubis;
pub mod show;

use crate::{
    algebra,
    datatypes::{Action, ActionContainer, ActionMeta, Decimal, KeyOrder, ValuationDomain},
    error::{DigraphError, Result},
};
use derivative::Derivative;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::{cell::OnceCell, collections::BTreeMap};

use self::circuits::Circuit;

/// Actions of a stored description, either plain keys or keys with metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ActionsDescription {
    /// Plain keys, in the intended order.
    Keys(Vec<String>),
    /// Keys with metadata, ordered lexicographically.
    Described(BTreeMap<String, ActionMeta>),
}

/// Stored description of a [Digraph].
///
/// Missing off-diagonal pairs are read as `Med`, missing reflexive pairs as `Min`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DigraphDescription {
    /// Name of the instance.
    #[serde(default)]
    pub name: String,
    /// The actions.
    pub actions: ActionsDescription,
    /// The valuation domain.
    #[serde(rename = "valuationdomain")]
    pub valuation_domain: ValuationDomain,
    /// Characteristic values keyed by source, then target.
    #[serde(default)]
    pub relation: BTreeMap<String, BTreeMap<String, Decimal>>,
}

/// Neighbourhood sets of every action at the median cut.
/// Reflexive pairs are never part of any set.
#[derive(Debug, Clone)]
pub struct Neighbourhoods {
    out_strict: Vec<RoaringBitmap>,
    in_strict: Vec<RoaringBitmap>,
    out_weak: Vec<RoaringBitmap>,
    in_weak: Vec<RoaringBitmap>,
    not_out: Vec<RoaringBitmap>,
    not_in: Vec<RoaringBitmap>,
}

impl Neighbourhoods {
    fn compute(digraph: &Digraph) -> Self {
        log::trace!("computing neighbourhoods of {}", digraph.name);
        let n = digraph.order();
        let med = digraph.domain.med();
        let mut result = Self {
            out_strict: vec![RoaringBitmap::new(); n],
            in_strict: vec![RoaringBitmap::new(); n],
            out_weak: vec![RoaringBitmap::new(); n],
            in_weak: vec![RoaringBitmap::new(); n],
            not_out: vec![RoaringBitmap::new(); n],
            not_in: vec![RoaringBitmap::new(); n],
        };
        for (x, y) in digraph.pairs() {
            let value = digraph.relation[x][y];
            if value > med {
                result.out_strict[x].insert(y as u32);
                result.in_strict[y].insert(x as u32);
            }
            if value >= med {
                result.out_weak[x].insert(y as u32);
                result.in_weak[y].insert(x as u32);
            }
            if value < med {
                result.not_out[x].insert(y as u32);
                result.not_in[y].insert(x as u32);
            }
        }
        result
    }

    /// `Γ⁺(x)`
    pub fn out(&self, x: usize) -> &RoaringBitmap {
        &self.out_strict[x]
    }

    /// `Γ⁻(x)`
    pub fn incoming(&self, x: usize) -> &RoaringBitmap {
        &self.in_strict[x]
    }

    /// `Γ⁺_w(x)`
    pub fn weak_out(&self, x: usize) -> &RoaringBitmap {
        &self.out_weak[x]
    }

    /// `Γ⁻_w(x)`
    pub fn weak_incoming(&self, x: usize) -> &RoaringBitmap {
        &self.in_weak[x]
    }

    /// `¬Γ⁺(x)`
    pub fn not_out(&self, x: usize) -> &RoaringBitmap {
        &self.not_out[x]
    }

    /// `¬Γ⁻(x)`
    pub fn not_incoming(&self, x: usize) -> &RoaringBitmap {
        &self.not_in[x]
    }

    /// `Γ⁺(x) ∪ Γ⁻(x)`
    pub fn symmetric(&self, x: usize) -> RoaringBitmap {
        &self.out_strict[x] | &self.in_strict[x]
    }

    /// `Γ⁺_w(x) ∪ Γ⁻_w(x)`
    pub fn weak_symmetric(&self, x: usize) -> RoaringBitmap {
        &self.out_weak[x] | &self.in_weak[x]
    }
}

#[derive(Debug, Clone, Default)]
struct DerivedCache {
    gamma: OnceCell<Neighbourhoods>,
    circuits: OnceCell<Vec<Circuit>>,
}

/// Arc density and polarity shares of the off-diagonal pairs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Densities {
    /// `size / n(n-1)`
    pub arc_density: Decimal,
    /// Share of pairs with `r(x,y) > Med`.
    pub positive: Decimal,
    /// Share of pairs with `r(x,y) < Med`.
    pub negative: Decimal,
    /// Share of pairs with `r(x,y) = Med`.
    pub indeterminate: Decimal,
}

#[derive(Derivative, Clone, Serialize, Deserialize)]
#[derivative(Debug, PartialEq)]
#[serde(try_from = "DigraphDescription", into = "DigraphDescription")]
/// A bipolar-valued digraph: keyed actions, a [valuation domain][ValuationDomain], and a dense
/// characteristic table `r(x,y)` indexed by action positions.
///
/// Every mutation of the table invalidates the cached [neighbourhoods][Neighbourhoods] and
/// [circuits][Circuit].
pub struct Digraph {
    name: String,
    actions: ActionContainer,
    domain: ValuationDomain,
    relation: Vec<Vec<Decimal>>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    cache: DerivedCache,
}

impl TryFrom<DigraphDescription> for Digraph {
    type Error = DigraphError;

    fn try_from(value: DigraphDescription) -> Result<Self> {
        Digraph::from_description(value)
    }
}

impl From<Digraph> for DigraphDescription {
    fn from(value: Digraph) -> Self {
        value.description()
    }
}

impl Digraph {
    /// Instantiates a digraph from a full characteristic table.
    /// Every value is checked against the valuation domain.
    pub fn new(
        actions: ActionContainer,
        domain: ValuationDomain,
        relation: Vec<Vec<Decimal>>,
    ) -> Result<Self> {
        let n = actions.len();
        if relation.len() != n || relation.iter().any(|row| row.len() != n) {
            return Err(DigraphError::DomainMismatch(format!(
                "relation table does not match {n} actions"
            )));
        }
        for value in relation.iter().flatten() {
            domain.check(*value)?;
        }
        Ok(Self::from_parts(String::from("rel"), actions, domain, relation))
    }

    /// Instantiates a digraph where every off-diagonal pair carries `fill` and every reflexive pair `Min`.
    pub fn with_value(
        actions: ActionContainer,
        domain: ValuationDomain,
        fill: Decimal,
    ) -> Result<Self> {
        domain.check(fill)?;
        let n = actions.len();
        let relation = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| if x == y { domain.min() } else { fill })
                    .collect()
            })
            .collect();
        Ok(Self::from_parts(String::from("rel"), actions, domain, relation))
    }

    /// Instantiates an empty relation: every off-diagonal pair at `Med`.
    pub fn empty(actions: ActionContainer, domain: ValuationDomain) -> Self {
        let mut result = Self::from_parts(String::from("empty"), actions, domain, Vec::new());
        let n = result.order();
        result.relation = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| if x == y { domain.min() } else { domain.med() })
                    .collect()
            })
            .collect();
        result
    }

    pub(crate) fn from_parts(
        name: String,
        actions: ActionContainer,
        domain: ValuationDomain,
        relation: Vec<Vec<Decimal>>,
    ) -> Self {
        Self {
            name,
            actions,
            domain,
            relation,
            cache: DerivedCache::default(),
        }
    }

    /// Instantiates a digraph from a [stored description][DigraphDescription].
    pub fn from_description(description: DigraphDescription) -> Result<Self> {
        log::debug!("[Start] loading description {}", description.name);
        let actions = match description.actions {
            ActionsDescription::Keys(keys) => ActionContainer::from_keys(keys)?,
            ActionsDescription::Described(described) => ActionContainer::from_actions(
                described
                    .into_iter()
                    .map(|(key, meta)| Action::with_meta(key, meta)),
            )?,
        };
        let mut result = Self::with_value(
            actions,
            description.valuation_domain,
            description.valuation_domain.med(),
        )?;
        for (source, targets) in description.relation {
            let x = result.actions.require(&source)?;
            for (target, value) in targets {
                let y = result.actions.require(&target)?;
                result.relation[x][y] = result.domain.check(value)?;
            }
        }
        result.name = if description.name.is_empty() {
            String::from("rel")
        } else {
            description.name
        };
        log::debug!("[Done] loaded {} actions", result.order());
        Ok(result)
    }

    /// The [stored description][DigraphDescription] of the digraph.
    pub fn description(&self) -> DigraphDescription {
        DigraphDescription {
            name: self.name.clone(),
            actions: ActionsDescription::Described(
                self.actions
                    .iter()
                    .map(|action| (action.key().to_string(), action.meta().clone()))
                    .collect(),
            ),
            valuation_domain: self.domain,
            relation: self
                .actions
                .keys()
                .enumerate()
                .map(|(x, source)| {
                    (
                        source.to_string(),
                        self.actions
                            .keys()
                            .enumerate()
                            .map(|(y, target)| (target.to_string(), self.relation[x][y]))
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    /// Serializes the stored description to JSON.
    #[cfg(feature = "importexport")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Loads a digraph from a JSON stored description.
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

    /// The actions.
    pub fn actions(&self) -> &ActionContainer {
        &self.actions
    }

    /// The valuation domain.
    pub fn domain(&self) -> &ValuationDomain {
        &self.domain
    }

    /// Number of actions.
    pub fn order(&self) -> usize {
        self.actions.len()
    }

    /// `r(x,y)` for two keys.
    pub fn value(&self, x: &str, y: &str) -> Result<Decimal> {
        Ok(self.relation[self.actions.require(x)?][self.actions.require(y)?])
    }

    /// `r(x,y)` for two positions.
    ///
    /// # Panics
    /// If a position is out of bounds.
    pub fn value_at(&self, x: usize, y: usize) -> Decimal {
        self.relation[x][y]
    }

    /// The row `r(x, ·)` of a position.
    pub fn row(&self, x: usize) -> &[Decimal] {
        &self.relation[x]
    }

    /// Iterates over all ordered pairs of distinct positions.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.order();
        (0..n).flat_map(move |x| (0..n).filter(move |&y| y != x).map(move |y| (x, y)))
    }

    /// Sets `r(x,y)` after checking keys and bounds.
    pub fn set_edge_value(&mut self, x: &str, y: &str, value: Decimal) -> Result<()> {
        let (x, y) = (self.actions.require(x)?, self.actions.require(y)?);
        self.relation[x][y] = self.domain.check(value)?;
        self.invalidate();
        Ok(())
    }

    /// Drops all cached derivations of the relation.
    fn invalidate(&mut self) {
        self.cache = DerivedCache::default();
    }

    /// The neighbourhood sets, computed on first use after a mutation.
    pub fn gamma(&self) -> &Neighbourhoods {
        self.cache.gamma.get_or_init(|| Neighbourhoods::compute(self))
    }

    /// Number of ordered pairs `x ≠ y` with `r(x,y) > Med`.
    pub fn size(&self) -> usize {
        let med = self.domain.med();
        self.pairs()
            .filter(|&(x, y)| self.relation[x][y] > med)
            .count()
    }

    /// Arc density and polarity shares.
    pub fn densities(&self) -> Densities {
        let n = self.order() as i64;
        let pairs = n * (n - 1);
        let med = self.domain.med();
        let (mut positive, mut negative) = (0i64, 0i64);
        for (x, y) in self.pairs() {
            let value = self.relation[x][y];
            if value > med {
                positive += 1;
            } else if value < med {
                negative += 1;
            }
        }
        let share = |count: i64| Decimal::from_ratio(count, pairs).unwrap_or_default();
        let dd = share(positive);
        Densities {
            arc_density: dd,
            positive: dd,
            negative: share(negative),
            indeterminate: share(pairs - positive - negative),
        }
    }

    /// Mean normalized distance of the off-diagonal values to `Med`, in `[0,1]`.
    pub fn determinateness(&self) -> Decimal {
        let n = self.order() as i64;
        let total: Decimal = self
            .pairs()
            .map(|(x, y)| self.domain.determination(self.relation[x][y]))
            .sum();
        total
            .checked_div(Decimal::from_int(n * (n - 1)))
            .unwrap_or_default()
    }

    /// Share of strict 2-paths `x→y→z` (with `x ≠ z`) which are closed by `x→z`; `1` without 2-paths.
    pub fn transitivity_degree(&self) -> Decimal {
        let gamma = self.gamma();
        let (mut paths, mut closed) = (0i64, 0i64);
        for x in 0..self.order() {
            for y in gamma.out(x) {
                for z in gamma.out(y as usize).iter().filter(|&z| z as usize != x) {
                    paths += 1;
                    if gamma.out(x).contains(z) {
                        closed += 1;
                    }
                }
            }
        }
        Decimal::from_ratio(closed, paths).unwrap_or(Decimal::ONE)
    }

    /// Share of linked unordered pairs which are linked in both directions; `1` without links.
    pub fn symmetry_degree(&self) -> Decimal {
        let gamma = self.gamma();
        let (mut linked, mut symmetric) = (0i64, 0i64);
        for x in 0..self.order() {
            for y in gamma.symmetric(x).iter().filter(|&y| y as usize > x) {
                linked += 1;
                if gamma.out(x).contains(y) && gamma.incoming(x).contains(y) {
                    symmetric += 1;
                }
            }
        }
        Decimal::from_ratio(symmetric, linked).unwrap_or(Decimal::ONE)
    }

    /// Number of actions per strict out-degree, indexed by degree.
    pub fn out_degree_distribution(&self) -> Vec<usize> {
        let gamma = self.gamma();
        Self::distribution(self.order(), (0..self.order()).map(|x| gamma.out(x).len() as usize))
    }

    /// Number of actions per strict in-degree, indexed by degree.
    pub fn in_degree_distribution(&self) -> Vec<usize> {
        let gamma = self.gamma();
        Self::distribution(
            self.order(),
            (0..self.order()).map(|x| gamma.incoming(x).len() as usize),
        )
    }

    fn distribution(n: usize, degrees: impl Iterator<Item = usize>) -> Vec<usize> {
        let mut result = vec![0; n.max(1)];
        degrees.for_each(|degree| result[degree] += 1);
        result
    }

    /// Max-min transitive closure; reflexive pairs are reset to `Min`.
    pub fn close_transitive(&mut self) {
        log::info!("[Start] transitive closure");
        let n = self.order();
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let path = self.relation[i][k].min(self.relation[k][j]);
                    if path > self.relation[i][j] {
                        self.relation[i][j] = path;
                    }
                }
            }
        }
        (0..n).for_each(|x| self.relation[x][x] = self.domain.min());
        self.invalidate();
        log::info!("[Done] transitive closure");
    }

    /// Sets both directions of every pair to `max(r(x,y), r(y,x))`.
    pub fn close_symmetric(&mut self) {
        let n = self.order();
        for x in 0..n {
            for y in x + 1..n {
                let value = self.relation[x][y].max(self.relation[y][x]);
                self.relation[x][y] = value;
                self.relation[y][x] = value;
            }
        }
        self.invalidate();
    }

    /// Recodes all values onto `[new_min, new_max]`, see [recode_value][algebra::recode_value].
    /// The recoded domain is integer-valued iff `ndigits` is zero.
    pub fn recode_valuation(
        &mut self,
        new_min: Decimal,
        new_max: Decimal,
        ndigits: u32,
    ) -> Result<()> {
        let target = ValuationDomain::new(new_min, new_max)?.with_integer_valuation(ndigits == 0);
        for value in self.relation.iter_mut().flatten() {
            *value = algebra::recode_value(*value, &self.domain, &target, ndigits);
        }
        log::debug!("recoded {:?} onto {:?}", self.domain, target);
        self.domain = target;
        self.invalidate();
        Ok(())
    }

    /// A copy recoded onto the normalized domain `[-1, 1]`.
    pub fn normalized(&self) -> Digraph {
        let mut result = self.clone();
        if self.domain.min() != Decimal::MINUS_ONE || self.domain.max() != Decimal::ONE {
            let target = ValuationDomain::normalized().with_integer_valuation(false);
            for value in result.relation.iter_mut().flatten() {
                *value = algebra::recode_value(*value, &self.domain, &target, 6);
            }
            result.domain = target;
            result.invalidate();
        }
        result
    }

    /// Reorders the actions.
    pub fn sort_actions(&mut self, order: KeyOrder) {
        let permutation = self.actions.sort(order);
        self.relation = permutation
            .iter()
            .map(|&x| permutation.iter().map(|&y| self.relation[x][y]).collect())
            .collect();
        self.invalidate();
    }

    /// The partial digraph on a subset of the actions, keeping their order.
    pub fn restricted(&self, choice: &RoaringBitmap) -> Digraph {
        let positions: Vec<usize> = choice
            .iter()
            .map(|x| x as usize)
            .filter(|&x| x < self.order())
            .collect();
        let actions = self.actions.subset(&positions);
        let relation = positions
            .iter()
            .map(|&x| positions.iter().map(|&y| self.relation[x][y]).collect())
            .collect();
        Self::from_parts(
            format!("{}_restricted", self.name),
            actions,
            self.domain,
            relation,
        )
    }

    /// Keys of the actions in a choice.
    pub fn choice_keys(&self, choice: &RoaringBitmap) -> Vec<String> {
        self.actions.choice_keys(choice)
    }
}
