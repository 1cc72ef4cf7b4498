/*!
Seeded generators of valid instances.

Every generator is deterministic for a given seed. Keys are numbered from `1` and zero-padded to a
common width, so the lexicographic key order is the numbering order.
*/
use crate::{
    datatypes::{ActionContainer, Decimal, ValuationDomain},
    digraph::Digraph,
    graph::Graph,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Digraph with uniformly drawn values on the grid of `domain` with `ndigits` fractional digits.
pub fn random_valuation_digraph(
    order: usize,
    domain: ValuationDomain,
    ndigits: u32,
    seed: u64,
) -> Digraph {
    log::debug!("random valuation digraph of order {order}, seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let step = 10i64.pow(6 - ndigits.min(6));
    let steps = (domain.amplitude().units() / step).max(1);
    let min = domain.min().units();
    let relation = (0..order)
        .map(|x| {
            (0..order)
                .map(|y| {
                    if x == y {
                        domain.min()
                    } else {
                        let units = min + rng.gen_range(0..=steps) * step;
                        Decimal::from_units(units.min(domain.max().units()))
                    }
                })
                .collect()
        })
        .collect();
    let domain = domain.with_integer_valuation(ndigits == 0 && domain.has_integer_valuation());
    Digraph::from_parts(
        String::from("randomValuationDigraph"),
        ActionContainer::numbered("a", order),
        domain,
        relation,
    )
}

/// Crisp complete tournament on `[-1, 1]`: exactly one direction of every pair is asserted.
pub fn random_tournament(order: usize, seed: u64) -> Digraph {
    log::debug!("random tournament of order {order}, seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut relation = vec![vec![Decimal::MINUS_ONE; order]; order];
    for x in 0..order {
        for y in x + 1..order {
            if rng.gen_bool(0.5) {
                relation[x][y] = Decimal::ONE;
            } else {
                relation[y][x] = Decimal::ONE;
            }
        }
    }
    Digraph::from_parts(
        String::from("randomTournament"),
        ActionContainer::numbered("a", order),
        ValuationDomain::normalized(),
        relation,
    )
}

/// Crisp graph on `[-1, 1]` where every edge is present with the given probability in percent.
pub fn random_graph(order: usize, edge_probability_percent: u8, seed: u64) -> Graph {
    log::debug!("random graph of order {order}, seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let probability = f64::from(edge_probability_percent.min(100)) / 100.0;
    let mut edges = Vec::new();
    for x in 0..order {
        for y in x + 1..order {
            let value = if rng.gen_bool(probability) {
                Decimal::ONE
            } else {
                Decimal::MINUS_ONE
            };
            edges.push(((x, y), value));
        }
    }
    Graph::from_parts(
        String::from("randomGraph"),
        ActionContainer::numbered("v", order),
        ValuationDomain::normalized(),
        edges.into_iter().collect(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;
    use test_log::test;

    #[test]
    fn keys() {
        let digraph = random_tournament(12, 0);
        assert_eq!(digraph.actions().key(0), "a01");
        assert_eq!(random_graph(3, 50, 0).vertices().key(2), "v3");
    }

    #[test]
    fn deterministic() {
        let first = random_valuation_digraph(5, ValuationDomain::normalized(), 2, 42);
        let second = random_valuation_digraph(5, ValuationDomain::normalized(), 2, 42);
        assert_eq!(first, second);
        assert_eq!(random_graph(6, 50, 7), random_graph(6, 50, 7));
        assert_eq!(random_graph(4, 100, 1).size(), 6);
        assert_eq!(random_graph(4, 0, 1).size(), 0);
    }

    #[quickcheck]
    fn valuations_stay_on_the_grid(seed: u64) -> bool {
        let digraph = random_valuation_digraph(4, ValuationDomain::normalized(), 1, seed);
        digraph.pairs().all(|(x, y)| {
            let value = digraph.value_at(x, y);
            digraph.domain().contains(value) && value.units() % 100_000 == 0
        })
    }

    #[quickcheck]
    fn tournaments_are_total(seed: u64) -> bool {
        let tournament = random_tournament(5, seed);
        tournament
            .pairs()
            .all(|(x, y)| tournament.value_at(x, y) == -tournament.value_at(y, x))
            && tournament.size() == 10
    }
}
