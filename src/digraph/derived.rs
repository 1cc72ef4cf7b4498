/*!
Derived constructions.

Every construction returns a fresh, independent [Digraph]; nothing is shared with the parent.
*/
use super::Digraph;
use crate::{
    algebra::{Fusion, Polarization},
    datatypes::{Action, ActionContainer, Decimal},
    error::{DigraphError, Result},
};
use roaring::RoaringBitmap;
use std::ops::{Neg, Not};

impl Digraph {
    fn derive<F>(&self, name: &str, value: F) -> Digraph
    where
        F: Fn(usize, usize) -> Decimal,
    {
        let n = self.order();
        let relation = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| {
                        if x == y {
                            self.relation[x][x]
                        } else {
                            value(x, y)
                        }
                    })
                    .collect()
            })
            .collect();
        Digraph::from_parts(
            format!("{}-{}", name, self.name),
            self.actions.clone(),
            self.domain,
            relation,
        )
    }

    /// `r_d(x,y) = ¬r(x,y)`
    pub fn dual(&self) -> Digraph {
        self.derive("dual", |x, y| self.domain.negate(self.relation[x][y]))
    }

    /// `r_c(x,y) = r(y,x)`
    pub fn converse(&self) -> Digraph {
        self.derive("converse", |x, y| self.relation[y][x])
    }

    /// `r_cd(x,y) = ¬r(y,x)`, the dual of the converse.
    pub fn codual(&self) -> Digraph {
        self.derive("codual", |x, y| self.domain.negate(self.relation[y][x]))
    }

    /// Polarization of every off-diagonal pair, see [Polarization].
    pub fn polarized(&self, polarization: &Polarization) -> Result<Digraph> {
        let level = polarization.checked_level(&self.domain)?;
        log::debug!("polarizing {} at {}", self.name, level);
        Ok(self.derive("cut", |x, y| {
            polarization.apply(&self.domain, level, self.relation[x][y])
        }))
    }

    /// Positions of `other`'s actions in the order of `self`, after checking that both digraphs are
    /// valued on the same domain.
    fn aligned(&self, other: &Digraph) -> Result<Vec<usize>> {
        if self.domain.min() != other.domain.min() || self.domain.max() != other.domain.max() {
            return Err(DigraphError::DomainMismatch(format!(
                "valuation domains {:?} and {:?} differ",
                self.domain, other.domain
            )));
        }
        self.actions.alignment(&other.actions)
    }

    fn combine<F>(&self, other: &Digraph, name: &str, value: F) -> Result<Digraph>
    where
        F: Fn(Decimal, Decimal) -> Decimal,
    {
        let position = self.aligned(other)?;
        Ok(self.derive(name, |x, y| {
            value(self.relation[x][y], other.relation[position[x]][position[y]])
        }))
    }

    /// `r⊕(x,y) = max(min(r₁, ¬r₂), min(r₂, ¬r₁))` on a common domain and action set.
    pub fn xor(&self, other: &Digraph) -> Result<Digraph> {
        let domain = self.domain;
        self.combine(other, "xor", |r1, r2| {
            r1.min(domain.negate(r2)).max(r2.min(domain.negate(r1)))
        })
    }

    /// `r≡(x,y) = min(max(¬r₁, r₂), max(¬r₂, r₁))`, the negation of [xor][Digraph::xor].
    pub fn equivalence(&self, other: &Digraph) -> Result<Digraph> {
        let domain = self.domain;
        self.combine(other, "equiv", |r1, r2| {
            domain.negate(r1).max(r2).min(domain.negate(r2).max(r1))
        })
    }

    /// Epistemic fusion with another digraph on a common domain and action set.
    pub fn fusion(&self, other: &Digraph, operator: Fusion) -> Result<Digraph> {
        let domain = self.domain;
        self.combine(other, "fusion", |r1, r2| operator.apply(&domain, r1, r2))
    }

    /// Keeps `r(x,y)` where `r(x,y)` and `r(y,x)` have opposite polarities, `Med` elsewhere.
    pub fn asymmetric_part(&self) -> Digraph {
        self.derive("asymmetric", |x, y| {
            let (forward, backward) = (self.relation[x][y], self.relation[y][x]);
            if (self.domain.is_positive(forward) && self.domain.is_negative(backward))
                || (self.domain.is_negative(forward) && self.domain.is_positive(backward))
            {
                forward
            } else {
                self.domain.med()
            }
        })
    }

    /// Keeps `r(x,y)` where `r(x,y)` and `r(y,x)` have the same strict polarity, `Med` elsewhere.
    pub fn symmetric_part(&self) -> Digraph {
        self.derive("symmetric", |x, y| {
            let (forward, backward) = (self.relation[x][y], self.relation[y][x]);
            if (self.domain.is_positive(forward) && self.domain.is_positive(backward))
                || (self.domain.is_negative(forward) && self.domain.is_negative(backward))
            {
                forward
            } else {
                self.domain.med()
            }
        })
    }

    /// The digraph of all `k`-subsets of the actions with
    /// `r(K₁,K₂) = max_{x∈K₁\K₂, y∈K₂\K₁} r(x,y)`.
    ///
    /// Subsets are keyed by their printed choice, e.g. `{a, b}`.
    pub fn k_choices(&self, k: usize) -> Result<Digraph> {
        let n = self.order();
        if k == 0 || k > n {
            return Err(DigraphError::InvalidChoiceSize { k, order: n });
        }
        log::info!("[Start] {k}-choices of {} actions", n);
        let mut subsets: Vec<RoaringBitmap> = Vec::new();
        let mut stack: Vec<(usize, RoaringBitmap)> = vec![(0, RoaringBitmap::new())];
        while let Some((next, subset)) = stack.pop() {
            if subset.len() as usize == k {
                subsets.push(subset);
                continue;
            }
            if next >= n || n - next < k - subset.len() as usize {
                continue;
            }
            stack.push((next + 1, subset.clone()));
            let mut extended = subset;
            extended.insert(next as u32);
            stack.push((next + 1, extended));
        }
        let actions = ActionContainer::from_actions(
            subsets
                .iter()
                .map(|subset| Action::new(self.actions.print_choice(subset).to_string())),
        )?;
        let relation = subsets
            .iter()
            .map(|first| {
                subsets
                    .iter()
                    .map(|second| {
                        if first == second {
                            return self.domain.min();
                        }
                        let (left, right) = (first - second, second - first);
                        left.iter()
                            .flat_map(|x| right.iter().map(move |y| (x as usize, y as usize)))
                            .map(|(x, y)| self.relation[x][y])
                            .max()
                            .unwrap_or_else(|| self.domain.med())
                    })
                    .collect()
            })
            .collect();
        log::info!("[Done] {} {k}-choices", subsets.len());
        Ok(Digraph::from_parts(
            format!("{k}-choices-{}", self.name),
            actions,
            self.domain,
            relation,
        ))
    }
}

impl Neg for &Digraph {
    type Output = Digraph;

    /// The [dual][Digraph::dual].
    fn neg(self) -> Self::Output {
        self.dual()
    }
}

impl Not for &Digraph {
    type Output = Digraph;

    /// The [converse][Digraph::converse].
    fn not(self) -> Self::Output {
        self.converse()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{datatypes::ValuationDomain, random::random_valuation_digraph, test::valued};
    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn abc() -> Digraph {
        valued(
            &["a", "b", "c"],
            &[("a", "b", 1_000_000), ("b", "c", 1_000_000), ("a", "c", -1_000_000)],
        )
    }

    #[test]
    fn converse_and_dual() {
        let digraph = abc();
        let converse = digraph.converse();
        assert_eq!(converse.value("b", "a"), Ok(Decimal::ONE));
        assert_eq!(converse.value("c", "b"), Ok(Decimal::ONE));
        assert_eq!(converse.value("c", "a"), Ok(Decimal::MINUS_ONE));
        assert_eq!(converse.value("a", "a"), Ok(Decimal::MINUS_ONE));
        let dual = -&digraph;
        assert_eq!(dual.value("a", "b"), Ok(Decimal::MINUS_ONE));
        assert_eq!(dual.value("b", "a"), Ok(Decimal::ZERO));
        assert_eq!(digraph.codual(), (!&digraph).dual());
        assert_eq!(digraph.codual(), (-&digraph).converse());
        assert_eq!(converse.name(), "converse-rel");
    }

    #[test]
    fn polarize() {
        let digraph = valued(
            &["a", "b", "c"],
            &[("a", "b", 700_000), ("b", "c", 300_000), ("c", "a", -800_000)],
        );
        let cut = digraph
            .polarized(&Polarization::at(Decimal::from_units(500_000)).keep_values(false))
            .unwrap();
        assert_eq!(cut.value("a", "b"), Ok(Decimal::ONE));
        assert_eq!(cut.value("b", "c"), Ok(Decimal::ZERO));
        assert_eq!(cut.value("c", "a"), Ok(Decimal::MINUS_ONE));
        assert_eq!(cut.value("a", "a"), Ok(Decimal::MINUS_ONE));
        assert!(matches!(
            digraph.polarized(&Polarization::at(Decimal::from_int(2))),
            Err(DigraphError::InvalidLevel { .. })
        ));
    }

    #[test]
    fn xor_and_equivalence() {
        let digraph = abc();
        let xor = digraph.xor(&digraph).unwrap();
        let equivalence = digraph.equivalence(&digraph).unwrap();
        assert_eq!(xor.value("a", "b"), Ok(Decimal::MINUS_ONE));
        assert_eq!(xor.value("b", "a"), Ok(Decimal::ZERO));
        assert_eq!(equivalence.value("a", "b"), Ok(Decimal::ONE));
        assert_eq!(equivalence.value("a", "c"), Ok(Decimal::ONE));
        let dual_xor = digraph.xor(&digraph.dual()).unwrap();
        assert_eq!(dual_xor.value("a", "c"), Ok(Decimal::ONE));

        let other = valued(&["a", "b"], &[]);
        assert!(matches!(
            digraph.xor(&other),
            Err(DigraphError::DomainMismatch(_))
        ));
        let mut recoded = abc();
        recoded
            .recode_valuation(Decimal::ZERO, Decimal::from_int(10), 0)
            .unwrap();
        assert!(digraph.equivalence(&recoded).is_err());
    }

    #[test]
    fn fusion() {
        let digraph = abc();
        let mut other = abc();
        other
            .set_edge_value("a", "b", Decimal::from_units(500_000))
            .unwrap();
        let fused = digraph.fusion(&other, Fusion::OMin).unwrap();
        assert_eq!(fused.value("a", "b"), Ok(Decimal::from_units(500_000)));
        assert_eq!(fused.value("a", "c"), Ok(Decimal::MINUS_ONE));
        let fused = digraph.fusion(&other, Fusion::OMax).unwrap();
        assert_eq!(fused.value("a", "b"), Ok(Decimal::ONE));
        let fused = digraph.fusion(&digraph.dual(), Fusion::OMax).unwrap();
        assert_eq!(fused.value("a", "b"), Ok(Decimal::ZERO));
    }

    #[test]
    fn partial_relations() {
        let mut digraph = abc();
        digraph.set_edge_value("c", "a", Decimal::ONE).unwrap();
        digraph
            .set_edge_value("c", "b", Decimal::from_units(-400_000))
            .unwrap();
        let asymmetric = digraph.asymmetric_part();
        assert_eq!(asymmetric.value("a", "c"), Ok(Decimal::MINUS_ONE));
        assert_eq!(asymmetric.value("c", "a"), Ok(Decimal::ONE));
        assert_eq!(asymmetric.value("b", "c"), Ok(Decimal::ONE));
        assert_eq!(asymmetric.value("a", "b"), Ok(Decimal::ZERO));
        let symmetric = digraph.symmetric_part();
        assert_eq!(symmetric.value("a", "c"), Ok(Decimal::ZERO));
        assert_eq!(symmetric.value("b", "c"), Ok(Decimal::ZERO));
        assert_eq!(symmetric.size(), 0);
    }

    #[test]
    fn k_choices() {
        let digraph = abc();
        let pairs = digraph.k_choices(2).unwrap();
        assert_eq!(pairs.order(), 3);
        assert_eq!(pairs.actions().keys().collect::<Vec<_>>(), vec!["{a, b}", "{a, c}", "{b, c}"]);
        // {a,b} → {a,c}: r(b,c)
        assert_eq!(pairs.value("{a, b}", "{a, c}"), Ok(Decimal::ONE));
        // {a,c} → {a,b}: r(c,b)
        assert_eq!(pairs.value("{a, c}", "{a, b}"), Ok(Decimal::ZERO));
        assert_eq!(digraph.k_choices(1).unwrap().order(), 3);
        assert!(matches!(
            digraph.k_choices(4),
            Err(DigraphError::InvalidChoiceSize { k: 4, order: 3 })
        ));
        assert!(digraph.k_choices(0).is_err());
    }

    #[quickcheck]
    fn involutions(seed: u64) -> bool {
        let digraph = random_valuation_digraph(5, ValuationDomain::normalized(), 1, seed);
        let codual = digraph.codual();
        digraph.dual().dual().description().relation == digraph.description().relation
            && digraph.converse().converse().description().relation
                == digraph.description().relation
            && codual.description().relation
                == digraph.converse().dual().description().relation
            && codual.description().relation == digraph.dual().converse().description().relation
    }

    #[quickcheck]
    fn polarization_is_monotone(seed: u64, first: u8, second: u8) -> bool {
        let digraph = random_valuation_digraph(5, ValuationDomain::normalized(), 2, seed);
        let (first, second) = (first % 101, second % 101);
        let (low, high) = (first.min(second), first.max(second));
        let at = |level: u8| {
            digraph
                .polarized(&Polarization::at(Decimal::from_units(level as i64 * 10_000)))
                .map(|cut| cut.size())
        };
        match (at(low), at(high)) {
            (Ok(low), Ok(high)) => high <= low,
            _ => false,
        }
    }
}
