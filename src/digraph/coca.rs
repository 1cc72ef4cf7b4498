/*!
Chordless odd circuit augmentation (CoCA) and elimination (CoCE).

The augmentation adds one hub action per chordless odd circuit, so that the circuit may be chosen
as a whole. The elimination polarizes at rising cut levels until no chordless circuit survives.
*/
use super::Digraph;
use crate::{
    algebra::Polarization,
    datatypes::{Action, ActionMeta, Decimal},
    error::{DigraphError, Result},
};
use roaring::RoaringBitmap;
use std::collections::BTreeMap;

/// A digraph augmented with circuit hubs.
///
/// The first actions keep the positions of the original digraph, hubs follow.
#[derive(Debug, Clone)]
pub struct CocaDigraph {
    digraph: Digraph,
    original_order: usize,
    hubs: BTreeMap<usize, RoaringBitmap>,
}

impl CocaDigraph {
    /// The augmented digraph.
    pub fn digraph(&self) -> &Digraph {
        &self.digraph
    }

    /// Consumes the augmentation.
    pub fn into_digraph(self) -> Digraph {
        self.digraph
    }

    /// Hub positions with the original actions they stand for.
    pub fn hubs(&self) -> &BTreeMap<usize, RoaringBitmap> {
        &self.hubs
    }

    /// Returns true if the position is a hub.
    pub fn is_hub(&self, x: usize) -> bool {
        self.hubs.contains_key(&x)
    }

    /// Number of actions of the original digraph.
    pub fn original_order(&self) -> usize {
        self.original_order
    }

    /// Replaces every hub of a choice by the original actions it stands for.
    pub fn flatten_choice(&self, choice: &RoaringBitmap) -> RoaringBitmap {
        choice.iter().fold(RoaringBitmap::new(), |mut acc, x| {
            match self.hubs.get(&(x as usize)) {
                Some(members) => acc |= members,
                None => {
                    acc.insert(x);
                }
            }
            acc
        })
    }

    fn is_covered(&self, circuit: &RoaringBitmap) -> bool {
        let flat = self.flatten_choice(circuit);
        self.hubs.values().any(|members| flat.is_subset(members))
    }

    fn add_hub(&mut self, members: &RoaringBitmap) -> Result<usize> {
        let digraph = &mut self.digraph;
        let stem = format!(
            "_{}_",
            members
                .iter()
                .map(|x| digraph.actions.key(x as usize))
                .collect::<Vec<_>>()
                .join("_")
        );
        let mut key = stem.clone();
        let mut suffix = 1;
        while digraph.actions.contains(&key) {
            key = format!("{stem}{suffix}");
            suffix += 1;
        }
        let meta = ActionMeta {
            name: Some(format!(
                "chordless odd circuit {}",
                digraph.actions.print_choice(members)
            )),
            short_name: None,
            comment: Some(String::from("hub")),
        };
        log::debug!("adding hub {key}");
        let hub = digraph.actions.push(Action::with_meta(key, meta))?;
        let (min, max) = (digraph.domain.min(), digraph.domain.max());
        let incoming: Vec<Decimal> = (0..hub)
            .map(|x| {
                if members.contains(x as u32) {
                    max
                } else {
                    members
                        .iter()
                        .map(|y| digraph.relation[x][y as usize])
                        .fold(min, Decimal::max)
                }
            })
            .collect();
        let outgoing: Vec<Decimal> = (0..hub)
            .map(|x| {
                if members.contains(x as u32) {
                    max
                } else {
                    members
                        .iter()
                        .map(|y| digraph.relation[y as usize][x])
                        .fold(min, Decimal::max)
                }
            })
            .collect();
        for (row, value) in digraph.relation.iter_mut().zip(incoming) {
            row.push(value);
        }
        let mut row = outgoing;
        row.push(min);
        digraph.relation.push(row);
        digraph.invalidate();

        let flat = self.flatten_choice(members);
        self.hubs.insert(hub, flat);
        Ok(hub)
    }
}

/// Result of a circuit elimination.
#[derive(Debug, Clone)]
pub struct CoceOutcome {
    /// The last polarization reached.
    pub digraph: Digraph,
    /// Its strict cut level.
    pub level: Decimal,
    /// False if chordless circuits survive.
    pub resolved: bool,
}

impl Digraph {
    /// Adds a hub for every chordless odd circuit not yet covered by a hub, until a fixed point.
    ///
    /// A hub `c` is linked to every other action `x` by `r(x,c) = max_{y∈c} r(x,y)` and
    /// `r(c,x) = max_{y∈c} r(y,x)`, and to its members by `Max` in both directions.
    /// The number of rounds is bounded by the order of the digraph.
    pub fn coca_digraph(&self) -> Result<CocaDigraph> {
        log::info!("[Start] chordless odd circuits augmentation of {}", self.name);
        let mut digraph = self.clone();
        digraph.set_name(format!("coca-{}", self.name));
        let mut result = CocaDigraph {
            digraph,
            original_order: self.order(),
            hubs: BTreeMap::new(),
        };
        let rounds = self.order().max(1);
        let mut fixpoint = false;
        for round in 1..=rounds {
            let circuits: Vec<RoaringBitmap> = result
                .digraph
                .compute_chordless_circuits(true)
                .into_iter()
                .map(|circuit| circuit.set().clone())
                .filter(|set| !result.is_covered(set))
                .collect();
            log::debug!("round {round}: {} uncovered odd circuits", circuits.len());
            if circuits.is_empty() {
                fixpoint = true;
                break;
            }
            for circuit in circuits {
                if !result.is_covered(&circuit) {
                    result.add_hub(&circuit)?;
                }
            }
        }
        if !fixpoint {
            let uncovered = result
                .digraph
                .compute_chordless_circuits(true)
                .iter()
                .any(|circuit| !result.is_covered(circuit.set()));
            if uncovered {
                log::warn!(
                    "augmentation stopped after {rounds} rounds with uncovered odd circuits"
                );
            }
        }
        log::info!("[Done] {} hubs added", result.hubs.len());
        Ok(result)
    }

    /// Polarizes at the successive minimum elimination levels until no chordless circuit survives
    /// or the level stops rising.
    pub fn coce_digraph_outcome(&self) -> Result<CoceOutcome> {
        log::info!("[Start] chordless circuits elimination of {}", self.name);
        let mut level = self.domain.med();
        let mut current = self.clone();
        let outcome = loop {
            let circuits = current.compute_chordless_circuits(false);
            let candidate = match current.minimum_elimination_level(&circuits) {
                None => break (true, level),
                Some(candidate) => candidate,
            };
            log::debug!(
                "{} circuits, elimination level {}",
                circuits.len(),
                candidate
            );
            if candidate <= level {
                log::warn!("elimination level does not rise above {level}");
                break (false, level);
            }
            level = candidate.min(self.domain.max());
            current = self.polarized(&Polarization::at(level).strict(true))?;
        };
        current.set_name(format!("coce-{}", self.name));
        let (resolved, level) = outcome;
        log::info!("[Done] circuits elimination at level {level}, resolved: {resolved}");
        Ok(CoceOutcome {
            digraph: current,
            level,
            resolved,
        })
    }

    /// The circuit-free polarization of [coce_digraph_outcome][Digraph::coce_digraph_outcome].
    /// Fails with [DigraphError::UnresolvableCircuits] if circuits survive.
    pub fn coce_digraph(&self) -> Result<Digraph> {
        let outcome = self.coce_digraph_outcome()?;
        if outcome.resolved {
            Ok(outcome.digraph)
        } else {
            Err(DigraphError::UnresolvableCircuits(outcome.level))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        datatypes::ValuationDomain,
        random::random_valuation_digraph,
        test::{crisp, valued},
    };
    use quickcheck_macros::quickcheck;
    use test_log::test;

    #[test]
    fn triangle_hub() {
        let digraph = crisp(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let coca = digraph.coca_digraph().unwrap();
        assert_eq!(coca.original_order(), 3);
        assert_eq!(coca.digraph().order(), 4);
        assert!(coca.is_hub(3));
        assert_eq!(coca.digraph().actions().key(3), "_a_b_c_");
        assert_eq!(coca.digraph().value("_a_b_c_", "a"), Ok(Decimal::ONE));
        assert_eq!(coca.digraph().value("b", "_a_b_c_"), Ok(Decimal::ONE));
        assert_eq!(coca.digraph().value("_a_b_c_", "_a_b_c_"), Ok(Decimal::MINUS_ONE));
        let hub: RoaringBitmap = [3].into_iter().collect();
        assert_eq!(coca.flatten_choice(&hub), digraph.actions().all());
        assert_eq!(
            coca.digraph().dominant_prekernels(),
            vec![hub.clone()]
        );
        assert_eq!(coca.digraph().absorbent_prekernels(), vec![hub]);
        assert_eq!(digraph.order(), 3);
    }

    #[test]
    fn hub_aggregates_outside_links() {
        let digraph = crisp(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a"), ("b", "d")],
        );
        let coca = digraph.coca_digraph().unwrap();
        let key = "_a_b_c_";
        assert_eq!(coca.digraph().value("d", key), Ok(Decimal::ONE));
        assert_eq!(coca.digraph().value(key, "d"), Ok(Decimal::ONE));
        assert!(coca
            .digraph()
            .compute_chordless_circuits(true)
            .iter()
            .all(|circuit| coca.is_covered(circuit.set())));
    }

    #[test]
    fn even_circuits_are_left_alone() {
        let digraph = crisp(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")],
        );
        let coca = digraph.coca_digraph().unwrap();
        assert!(coca.hubs().is_empty());
        assert_eq!(coca.into_digraph().order(), 4);
    }

    #[test]
    fn elimination() {
        let digraph = valued(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", 600_000),
                ("b", "c", 800_000),
                ("c", "a", 1_000_000),
                ("c", "d", 900_000),
            ],
        );
        let outcome = digraph.coce_digraph_outcome().unwrap();
        assert!(outcome.resolved);
        assert_eq!(outcome.level, Decimal::from_units(600_000));
        assert_eq!(outcome.digraph.value("a", "b"), Ok(Decimal::ZERO));
        assert_eq!(outcome.digraph.value("c", "d"), Ok(Decimal::from_units(900_000)));
        assert!(!outcome.digraph.detect_chordless_circuits());
        assert_eq!(outcome.digraph.name(), "coce-rel");

        let acyclic = crisp(&["a", "b"], &[("a", "b")]);
        let outcome = acyclic.coce_digraph_outcome().unwrap();
        assert!(outcome.resolved);
        assert_eq!(outcome.level, Decimal::ZERO);
        assert_eq!(acyclic.coce_digraph().unwrap().value("a", "b"), Ok(Decimal::ONE));
    }

    #[quickcheck]
    fn coca_covers_odd_circuits(seed: u64) -> bool {
        let digraph = random_valuation_digraph(5, ValuationDomain::normalized(), 1, seed);
        match digraph.coca_digraph() {
            Ok(coca) => {
                coca.digraph().order() >= digraph.order()
                    && coca.hubs().values().all(|members| members.len() >= 3)
                    && digraph
                        .compute_chordless_circuits(true)
                        .iter()
                        .all(|circuit| coca.is_covered(circuit.set()))
            }
            Err(_) => false,
        }
    }

    #[quickcheck]
    fn coce_eliminates_circuits(seed: u64) -> bool {
        let digraph = random_valuation_digraph(5, ValuationDomain::normalized(), 2, seed);
        match digraph.coce_digraph() {
            Ok(result) => !result.detect_chordless_circuits(),
            Err(_) => false,
        }
    }
}
