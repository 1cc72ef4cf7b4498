/*!
Choice generators and choice degrees.

 - [IndependentChoices] enumerates independent choices with their neighbourhood and remainder
 - [MisGenerator] enumerates maximal independent choices over a random vertex permutation
 - dominant and absorbent prekernels
*/
use super::Digraph;
use crate::datatypes::Decimal;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, ops::ControlFlow};
use strum::{Display, EnumString, EnumVariantNames};

/// An independent choice `C`, its neighbourhood `Γ(C)`, and the remainder `A \ (C ∪ Γ(C))`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndependentChoice {
    /// The choice.
    pub choice: RoaringBitmap,
    /// Union of the neighbourhoods of its members.
    pub neighbourhood: RoaringBitmap,
    /// Actions neither chosen nor neighbouring the choice.
    pub remaining: RoaringBitmap,
}

impl IndependentChoice {
    /// Returns true if no action can be added without breaking independence.
    pub fn is_maximal(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[derive(Debug)]
struct Partial {
    next: usize,
    choice: RoaringBitmap,
    neighbourhood: RoaringBitmap,
    remaining: RoaringBitmap,
}

/// Exhaustive enumeration of independent choices by include/exclude branching in position order.
///
/// In `maximal_only` mode, branches which can no longer become maximal are cut and only maximal
/// choices are reported.
#[derive(Debug)]
pub struct IndependentChoices {
    adjacency: Vec<RoaringBitmap>,
    maximal_only: bool,
    stack: Vec<Partial>,
}

impl IndependentChoices {
    /// Enumerates the independent choices of a symmetric adjacency.
    pub fn new(adjacency: Vec<RoaringBitmap>, maximal_only: bool) -> Self {
        let n = adjacency.len();
        Self {
            stack: vec![Partial {
                next: 0,
                choice: RoaringBitmap::new(),
                neighbourhood: RoaringBitmap::new(),
                remaining: (0..n as u32).collect(),
            }],
            adjacency,
            maximal_only,
        }
    }

    fn coverable(&self, partial: &Partial, excluded: usize) -> bool {
        let neighbours = &self.adjacency[excluded];
        partial.neighbourhood.contains(excluded as u32)
            || neighbours
                .iter()
                .any(|w| w as usize > excluded && partial.remaining.contains(w))
    }
}

impl Iterator for IndependentChoices {
    type Item = IndependentChoice;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(partial) = self.stack.pop() {
            if partial.next == self.adjacency.len() {
                if self.maximal_only && !partial.remaining.is_empty() {
                    continue;
                }
                return Some(IndependentChoice {
                    choice: partial.choice,
                    neighbourhood: partial.neighbourhood,
                    remaining: partial.remaining,
                });
            }
            let x = partial.next;
            let neighbours = &self.adjacency[x];
            let include = if partial.remaining.contains(x as u32) {
                let mut choice = partial.choice.clone();
                choice.insert(x as u32);
                let neighbourhood = &partial.neighbourhood | neighbours;
                let mut remaining = &partial.remaining - neighbours;
                remaining.remove(x as u32);
                Some(Partial {
                    next: x + 1,
                    choice,
                    neighbourhood,
                    remaining,
                })
            } else {
                None
            };
            if !self.maximal_only || self.coverable(&partial, x) {
                self.stack.push(Partial {
                    next: x + 1,
                    ..partial
                });
            }
            if let Some(include) = include {
                self.stack.push(include);
            }
        }
        None
    }
}

/// Enumeration of maximal independent choices by branching over a random permutation of the
/// actions. Results are memoised, so every maximal choice is reported once.
#[derive(Debug)]
pub struct MisGenerator {
    adjacency: Vec<RoaringBitmap>,
    permutation: Vec<u32>,
    stack: Vec<(RoaringBitmap, RoaringBitmap)>,
    found: HashSet<Vec<u32>>,
}

impl MisGenerator {
    /// Maximal independent choices of a symmetric adjacency; `seed` fixes the permutation.
    pub fn new(adjacency: Vec<RoaringBitmap>, seed: Option<u64>) -> Self {
        let mut permutation: Vec<u32> = (0..adjacency.len() as u32).collect();
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        permutation.shuffle(&mut rng);
        log::trace!("vertex permutation {:?}", permutation);
        Self {
            stack: vec![(permutation.iter().copied().collect(), RoaringBitmap::new())],
            adjacency,
            permutation,
            found: HashSet::new(),
        }
    }

    fn is_maximal(&self, choice: &RoaringBitmap) -> bool {
        (0..self.adjacency.len() as u32)
            .filter(|x| !choice.contains(*x))
            .all(|x| !self.adjacency[x as usize].is_disjoint(choice))
    }

    /// Number of maximal choices reported so far.
    pub fn found(&self) -> usize {
        self.found.len()
    }
}

impl Iterator for MisGenerator {
    type Item = RoaringBitmap;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((candidates, choice)) = self.stack.pop() {
            let pivot = self
                .permutation
                .iter()
                .copied()
                .find(|x| candidates.contains(*x));
            match pivot {
                None => {
                    if self.is_maximal(&choice) && self.found.insert(choice.iter().collect()) {
                        return Some(choice);
                    }
                }
                Some(v) => {
                    let mut rest = candidates;
                    rest.remove(v);
                    let neighbours = &self.adjacency[v as usize];
                    if !neighbours.is_disjoint(&rest) || !neighbours.is_disjoint(&choice) {
                        self.stack.push((rest.clone(), choice.clone()));
                    }
                    let mut extended = choice;
                    extended.insert(v);
                    self.stack.push((&rest - neighbours, extended));
                }
            }
        }
        None
    }
}

/// Kinds of prekernels.
#[derive(
    EnumString, EnumVariantNames, Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "lowercase")]
pub enum KernelKind {
    /// The choice outranks every other action.
    Dominant,
    /// The choice is outranked by every other action.
    Absorbent,
}

impl Digraph {
    /// Lazy enumeration of all independent choices with respect to `Γ⁺ ∪ Γ⁻`.
    pub fn independent_choices(&self) -> IndependentChoices {
        let gamma = self.gamma();
        IndependentChoices::new((0..self.order()).map(|x| gamma.symmetric(x)).collect(), false)
    }

    /// All maximal independent choices with respect to `Γ⁺ ∪ Γ⁻`.
    pub fn maximal_independent_choices(&self) -> Vec<RoaringBitmap> {
        let gamma = self.gamma();
        IndependentChoices::new((0..self.order()).map(|x| gamma.symmetric(x)).collect(), true)
            .map(|independent| independent.choice)
            .collect()
    }

    /// Maximal independent choices in the order of a seeded random permutation.
    pub fn mis_generator(&self, seed: Option<u64>) -> MisGenerator {
        let gamma = self.gamma();
        MisGenerator::new((0..self.order()).map(|x| gamma.symmetric(x)).collect(), seed)
    }

    /// Returns true if the choice is a prekernel of the given kind.
    pub fn is_prekernel(&self, choice: &RoaringBitmap, kind: KernelKind) -> bool {
        let med = self.domain.med();
        !choice.is_empty() && self.independence(choice) > med && self.covers(choice, kind)
    }

    fn covers(&self, choice: &RoaringBitmap, kind: KernelKind) -> bool {
        let gamma = self.gamma();
        let covered = choice
            .iter()
            .fold(RoaringBitmap::new(), |acc, x| match kind {
                KernelKind::Dominant => acc | gamma.out(x as usize),
                KernelKind::Absorbent => acc | gamma.incoming(x as usize),
            });
        (0..self.order() as u32)
            .filter(|x| !choice.contains(*x))
            .all(|x| covered.contains(x))
    }

    /// Visits every prekernel of the given kind until the visitor breaks.
    pub fn visit_prekernels<F>(&self, kind: KernelKind, mut visitor: F)
    where
        F: FnMut(&RoaringBitmap) -> ControlFlow<()>,
    {
        let gamma = self.gamma();
        let weak = (0..self.order()).map(|x| gamma.weak_symmetric(x)).collect();
        for independent in IndependentChoices::new(weak, true) {
            if self.covers(&independent.choice, kind) && visitor(&independent.choice).is_break() {
                return;
            }
        }
    }

    /// All prekernels of the given kind.
    pub fn prekernels(&self, kind: KernelKind) -> Vec<RoaringBitmap> {
        log::info!("[Start] {} prekernels", kind);
        let mut result = Vec::new();
        self.visit_prekernels(kind, |choice| {
            log::debug!("{} prekernel {}", kind, self.actions.print_choice(choice));
            result.push(choice.clone());
            ControlFlow::Continue(())
        });
        log::info!("[Done] {} {} prekernels", result.len(), kind);
        result
    }

    /// All dominant prekernels.
    pub fn dominant_prekernels(&self) -> Vec<RoaringBitmap> {
        self.prekernels(KernelKind::Dominant)
    }

    /// All absorbent prekernels.
    pub fn absorbent_prekernels(&self) -> Vec<RoaringBitmap> {
        self.prekernels(KernelKind::Absorbent)
    }

    /// `i(C) = Max - max_{x≠y ∈ C} r(x,y) + Min`
    pub fn independence(&self, choice: &RoaringBitmap) -> Decimal {
        let strongest = choice
            .iter()
            .flat_map(|x| {
                choice
                    .iter()
                    .filter(move |&y| y != x)
                    .map(move |y| self.relation[x as usize][y as usize])
            })
            .max()
            .unwrap_or_else(|| self.domain.min());
        self.domain.negate(strongest)
    }

    fn outside(&self, choice: &RoaringBitmap) -> impl Iterator<Item = usize> + '_ {
        let choice = choice.clone();
        (0..self.order()).filter(move |&a| !choice.contains(a as u32))
    }

    fn linkage(&self, choice: &RoaringBitmap, kind: KernelKind) -> Decimal {
        self.outside(choice)
            .map(|a| {
                choice
                    .iter()
                    .map(|b| match kind {
                        KernelKind::Dominant => self.relation[b as usize][a],
                        KernelKind::Absorbent => self.relation[a][b as usize],
                    })
                    .max()
                    .unwrap_or_else(|| self.domain.min())
            })
            .min()
            .unwrap_or_else(|| self.domain.max())
    }

    /// `d(C) = min_{a∉C} max_{b∈C} r(b,a)`
    pub fn dominance(&self, choice: &RoaringBitmap) -> Decimal {
        self.linkage(choice, KernelKind::Dominant)
    }

    /// `ab(C) = min_{a∉C} max_{b∈C} r(a,b)`
    pub fn absorbency(&self, choice: &RoaringBitmap) -> Decimal {
        self.linkage(choice, KernelKind::Absorbent)
    }

    /// Valued irredundancy: every member keeps a private neighbour (possibly itself) which no other
    /// member links to.
    pub fn irredundancy(&self, choice: &RoaringBitmap, kind: KernelKind) -> Decimal {
        let value = |from: usize, to: usize| -> Decimal {
            if from == to {
                self.domain.max()
            } else {
                match kind {
                    KernelKind::Dominant => self.relation[from][to],
                    KernelKind::Absorbent => self.relation[to][from],
                }
            }
        };
        choice
            .iter()
            .map(|x| x as usize)
            .map(|x| {
                (0..self.order())
                    .filter(|&a| a == x || !choice.contains(a as u32))
                    .map(|a| {
                        choice
                            .iter()
                            .map(|z| z as usize)
                            .filter(|&z| z != x)
                            .map(|z| self.domain.negate(value(z, a)))
                            .fold(value(x, a), Decimal::min)
                    })
                    .max()
                    .unwrap_or_else(|| self.domain.min())
            })
            .min()
            .unwrap_or_else(|| self.domain.max())
    }

    /// Dominant irredundancy, see [irredundancy][Digraph::irredundancy].
    pub fn dominant_irredundancy(&self, choice: &RoaringBitmap) -> Decimal {
        self.irredundancy(choice, KernelKind::Dominant)
    }

    /// Absorbent irredundancy, see [irredundancy][Digraph::irredundancy].
    pub fn absorbent_irredundancy(&self, choice: &RoaringBitmap) -> Decimal {
        self.irredundancy(choice, KernelKind::Absorbent)
    }

    /// Mean share of the members which strictly link to (resp. from) an outside action.
    pub fn covering(&self, choice: &RoaringBitmap, kind: KernelKind) -> Decimal {
        let gamma = self.gamma();
        let members = choice.len() as i64;
        let (mut links, mut outside) = (0i64, 0i64);
        for a in self.outside(choice) {
            outside += 1;
            let linked = match kind {
                KernelKind::Dominant => gamma.incoming(a),
                KernelKind::Absorbent => gamma.out(a),
            };
            links += (linked & choice).len() as i64;
        }
        Decimal::from_ratio(links, outside * members).unwrap_or(Decimal::ONE)
    }
}
