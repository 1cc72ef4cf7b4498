use bipolar_digraphs::{
    algebra::Polarization,
    datatypes::{ActionContainer, Decimal, ValuationDomain},
    digraph::{choices::KernelKind, ranking::KemenyConfig, ranking::RankingRule, Digraph},
    error::DigraphError,
    graph::Graph,
    random::{random_tournament, random_valuation_digraph},
};
use quickcheck_macros::quickcheck;
use test_log::test;

fn actions(keys: &[&str]) -> ActionContainer {
    ActionContainer::from_keys(keys.iter().copied()).unwrap()
}

fn digraph(keys: &[&str], fill: Decimal, arcs: &[(&str, &str, Decimal)]) -> Digraph {
    let mut result =
        Digraph::with_value(actions(keys), ValuationDomain::normalized(), fill).unwrap();
    for (x, y, value) in arcs {
        result.set_edge_value(x, y, *value).unwrap();
    }
    result
}

/// `r(a,b) = r(b,c) = 1`, `r(a,c) = -1`, every other pair at `0`.
fn chain() -> Digraph {
    digraph(
        &["a", "b", "c"],
        Decimal::ZERO,
        &[
            ("a", "b", Decimal::ONE),
            ("b", "c", Decimal::ONE),
            ("a", "c", Decimal::MINUS_ONE),
        ],
    )
}

/// Crisp linear order following the key order.
fn transitive_tournament(keys: &[&str]) -> Digraph {
    let arcs: Vec<(&str, &str, Decimal)> = keys
        .iter()
        .enumerate()
        .flat_map(|(i, x)| keys[i + 1..].iter().map(move |y| (*x, *y, Decimal::ONE)))
        .collect();
    digraph(keys, Decimal::MINUS_ONE, &arcs)
}

fn same_relation(first: &Digraph, second: &Digraph) -> bool {
    first.order() == second.order()
        && first
            .pairs()
            .all(|(x, y)| first.value_at(x, y) == second.value_at(x, y))
}

#[test]
fn converse_symmetry() {
    let converse = chain().converse();
    assert_eq!(converse.value("b", "a"), Ok(Decimal::ONE));
    assert_eq!(converse.value("c", "b"), Ok(Decimal::ONE));
    assert_eq!(converse.value("c", "a"), Ok(Decimal::MINUS_ONE));
    assert_eq!(converse.value("a", "b"), Ok(Decimal::ZERO));
}

#[test]
fn median_cut() {
    let half = Decimal::from_ratio(1, 2).unwrap();
    let cut = chain()
        .polarized(&Polarization::at(half).strict(true).keep_values(false).alpha(true))
        .unwrap();
    for (x, y) in cut.pairs() {
        let expected = match (cut.actions().key(x), cut.actions().key(y)) {
            ("a", "b") | ("b", "c") => Decimal::ONE,
            _ => Decimal::MINUS_ONE,
        };
        assert_eq!(cut.value_at(x, y), expected);
    }
    assert_eq!(cut.size(), 2);
    assert_eq!(
        chain().polarized(&Polarization::at(Decimal::from_int(2))),
        Err(DigraphError::InvalidLevel {
            level: Decimal::from_int(2),
            med: Decimal::ZERO,
            max: Decimal::ONE,
        })
    );
}

#[test]
fn kohler_on_a_three_cycle() {
    let cycle = digraph(
        &["a", "b", "c"],
        Decimal::MINUS_ONE,
        &[
            ("a", "b", Decimal::ONE),
            ("b", "c", Decimal::ONE),
            ("c", "a", Decimal::ONE),
        ],
    );
    let ranking = cycle.kohler_ranking();
    assert_eq!(ranking.ranking, vec!["a", "b", "c"]);
    assert_eq!(ranking.rank_of("a"), Some(1));
    assert_eq!(ranking.order(), vec!["c", "b", "a"]);
}

#[test]
fn bipolar_correlation() {
    let relation = chain();
    let itself = relation.bipolar_correlation(&relation, false).unwrap();
    assert_eq!(itself.correlation, Decimal::ONE);
    assert!(itself.determination > Decimal::ZERO);
    let dual = relation.bipolar_correlation(&relation.dual(), false).unwrap();
    assert_eq!(dual.correlation, Decimal::MINUS_ONE);
    assert_eq!(dual.determination, itself.determination);

    let other = transitive_tournament(&["a", "b", "d"]);
    assert!(matches!(
        relation.bipolar_correlation(&other, false),
        Err(DigraphError::DomainMismatch(_))
    ));
}

#[test]
fn chordless_cycles_of_c5() {
    let odd: Vec<_> = Graph::cycle(5)
        .chordless_cycles(false)
        .into_iter()
        .filter(|cycle| cycle.is_odd())
        .collect();
    assert_eq!(odd.len(), 1);
    assert_eq!(odd[0].len(), 5);
    let mut members: Vec<u32> = odd[0].set().iter().collect();
    members.sort_unstable();
    assert_eq!(members, vec![0, 1, 2, 3, 4]);
}

#[test]
fn comparability_of_p3() {
    let mut path = Graph::empty(actions(&["v1", "v2", "v3"]), ValuationDomain::normalized());
    path.set_edge_value("v1", "v2", Decimal::ONE).unwrap();
    path.set_edge_value("v2", "v3", Decimal::ONE).unwrap();
    assert!(path.is_comparability_graph());
    let orientation = path.orientation();
    assert_eq!(orientation.classes(), 1);
    assert_eq!(
        orientation.label(0, 1).abs(),
        orientation.label(1, 2).abs()
    );
    let oriented = path.transitive_orientation().unwrap();
    assert_eq!(oriented.transitivity_degree(), Decimal::ONE);
    assert_eq!(oriented.size(), 2);
}

#[test]
fn single_action() {
    let single = digraph(&["a"], Decimal::ZERO, &[]);
    for rule in [
        RankingRule::Kohler,
        RankingRule::ArrowRaynaud,
        RankingRule::RankedPairs,
        RankingRule::Kemeny,
        RankingRule::Slater,
        RankingRule::Copeland,
        RankingRule::NetFlows,
    ] {
        assert_eq!(single.ranking(rule).unwrap().ranking, vec!["a"]);
    }
    let correlation = single.bipolar_correlation(&single, false).unwrap();
    assert_eq!(correlation.correlation, Decimal::ONE);
    let ranking = single.ranking_by_choosing(false).unwrap();
    assert_eq!(ranking.weak_order(), vec![vec!["a"]]);
}

#[test]
fn terminal_pair() {
    let pair = transitive_tournament(&["a", "b"]);
    let ranking = pair.ranking_by_choosing(false).unwrap();
    assert_eq!(ranking.result.len(), 1);
    assert_eq!(ranking.weak_order(), vec![vec!["a"], vec!["b"]]);

    let tie = digraph(&["a", "b"], Decimal::ZERO, &[]);
    assert_eq!(
        tie.ranking_by_choosing(false).unwrap().weak_order(),
        vec![vec!["a", "b"]]
    );
}

#[test]
fn tournament_rankings_agree() {
    let keys = ["a", "b", "c", "d", "e"];
    let tournament = transitive_tournament(&keys);
    let config = KemenyConfig::default();
    let kemeny = tournament.kemeny_ranking(&config).unwrap();
    let slater = tournament.slater_ranking(&config).unwrap();
    let ranked_pairs = tournament.ranked_pairs_ranking();
    assert_eq!(kemeny.ranking, keys);
    assert_eq!(slater.ranking, kemeny.ranking);
    assert_eq!(ranked_pairs.ranking, kemeny.ranking);
    let correlation = tournament.correlation_with_ranking(&kemeny).unwrap();
    assert_eq!(correlation.correlation, Decimal::ONE);
}

#[quickcheck]
fn kemeny_and_slater_agree_on_tournaments(seed: u64) -> bool {
    let tournament = random_tournament(5, seed);
    let config = KemenyConfig::default();
    tournament.kemeny_ranking(&config).unwrap().ranking
        == tournament.slater_ranking(&config).unwrap().ranking
}

#[quickcheck]
fn valuations_stay_in_bounds(seed: u64) -> bool {
    let relation = random_valuation_digraph(5, ValuationDomain::normalized(), 2, seed);
    let domain = *relation.domain();
    [relation.dual(), relation.codual(), relation.symmetric_part()]
        .iter()
        .all(|derived| {
            derived
                .pairs()
                .all(|(x, y)| domain.contains(derived.value_at(x, y)))
        })
}

#[quickcheck]
fn duality_involutions(seed: u64) -> bool {
    let relation = random_valuation_digraph(5, ValuationDomain::normalized(), 2, seed);
    same_relation(&relation.dual().dual(), &relation)
        && same_relation(&relation.converse().converse(), &relation)
        && same_relation(&relation.codual(), &relation.dual().converse())
        && same_relation(&relation.codual(), &relation.converse().dual())
}

#[quickcheck]
fn polarization_is_monotone(seed: u64) -> bool {
    let relation = random_valuation_digraph(6, ValuationDomain::normalized(), 2, seed);
    let size = |tenths: i64| {
        relation
            .polarized(&Polarization::at(Decimal::from_ratio(tenths, 10).unwrap_or_default()))
            .map(|cut| cut.size())
            .unwrap_or_default()
    };
    (0..10).all(|tenths| size(tenths + 1) <= size(tenths))
}

#[quickcheck]
fn correlation_reflexivity(seed: u64) -> bool {
    let relation = random_valuation_digraph(5, ValuationDomain::normalized(), 2, seed);
    let itself = relation.bipolar_correlation(&relation, false).unwrap();
    if !itself.is_defined() {
        return true;
    }
    let dual = relation.bipolar_correlation(&relation.dual(), false).unwrap();
    itself.correlation == Decimal::ONE && dual.correlation == Decimal::MINUS_ONE
}

#[quickcheck]
fn prekernels_are_independent(seed: u64) -> bool {
    let relation = random_valuation_digraph(6, ValuationDomain::normalized(), 1, seed);
    let med = relation.domain().med();
    [KernelKind::Dominant, KernelKind::Absorbent]
        .into_iter()
        .flat_map(|kind| relation.prekernels(kind))
        .all(|kernel| relation.independence(&kernel) > med)
}

#[quickcheck]
fn ranked_pairs_are_acyclic(seed: u64) -> bool {
    let relation = random_valuation_digraph(6, ValuationDomain::normalized(), 2, seed);
    !relation.ranked_pairs_digraph().detect_chordless_circuits()
}

#[quickcheck]
fn circuit_closures(seed: u64) -> bool {
    let relation = random_valuation_digraph(5, ValuationDomain::normalized(), 1, seed);
    let coca = relation.coca_digraph().unwrap();
    let augmented = coca.digraph().order() == relation.order() + coca.hubs().len()
        && coca.original_order() == relation.order();
    let outcome = relation.coce_digraph_outcome().unwrap();
    let eliminated = !outcome.resolved || !outcome.digraph.detect_chordless_circuits();
    augmented && eliminated && outcome.level >= relation.domain().med()
}
