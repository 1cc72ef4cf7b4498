use crate::{
    datatypes::{ActionContainer, Decimal, ValuationDomain},
    digraph::Digraph,
};

/// Crisp digraph on `[-1, 1]`: the given arcs at `1`, every other pair at `-1`.
pub(crate) fn crisp(keys: &[&str], arcs: &[(&str, &str)]) -> Digraph {
    let actions = ActionContainer::from_keys(keys.iter().copied()).unwrap();
    let mut digraph =
        Digraph::with_value(actions, ValuationDomain::normalized(), Decimal::MINUS_ONE).unwrap();
    for (x, y) in arcs {
        digraph.set_edge_value(x, y, Decimal::ONE).unwrap();
    }
    digraph
}

/// Valued digraph on `[-1, 1]`: the given pairs at the given millionths, every other pair at `0`.
pub(crate) fn valued(keys: &[&str], values: &[(&str, &str, i64)]) -> Digraph {
    let actions = ActionContainer::from_keys(keys.iter().copied()).unwrap();
    let mut digraph =
        Digraph::with_value(actions, ValuationDomain::normalized(), Decimal::ZERO).unwrap();
    for (x, y, units) in values {
        digraph
            .set_edge_value(x, y, Decimal::from_units(*units))
            .unwrap();
    }
    digraph
}
