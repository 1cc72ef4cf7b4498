/*!
Kernel fixpoint vectors and the Rubis best-choice recommendation.
*/
use super::{choices::KernelKind, coca::CocaDigraph, Digraph};
use crate::{algebra::sharp, datatypes::Decimal, error::Result};
use roaring::RoaringBitmap;
use std::{cmp::Ordering, fmt::Display};

/// Bipolar characteristic vector of a choice, obtained by the sharp kernel fixpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceVector {
    /// One value per action position.
    pub values: Vec<Decimal>,
    /// Mean normalized distance of the values to `Med`.
    pub determinateness: Decimal,
    /// Number of iterations performed.
    pub iterations: usize,
    /// False if the iteration cap was hit.
    pub fixpoint: bool,
}

/// Every degree of a scored choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceScore {
    /// The prekernel in the positions of the augmented digraph.
    pub kernel: RoaringBitmap,
    /// The choice in the positions of the original digraph.
    pub choice: RoaringBitmap,
    /// The keys of the choice.
    pub keys: Vec<String>,
    /// Determinateness of the kernel fixpoint vector.
    pub determinateness: Decimal,
    /// Dominant resp. absorbent irredundancy.
    pub irredundancy: Decimal,
    /// Independence.
    pub independence: Decimal,
    /// Dominance.
    pub dominance: Decimal,
    /// Absorbency.
    pub absorbency: Decimal,
    /// Dominant resp. absorbent covering.
    pub covering: Decimal,
    /// The kernel fixpoint vector.
    pub vector: ChoiceVector,
}

impl Display for ChoiceScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}} det {:.2}, irr {:.2}, ind {:.2}, dom {:.2}, abs {:.2}, cov {:.2}",
            self.keys.join(", "),
            self.determinateness,
            self.irredundancy,
            self.independence,
            self.dominance,
            self.absorbency,
            self.covering
        )
    }
}

/// Outcome of the Rubis best-choice recommendation.
#[derive(Debug, Clone, Default)]
pub struct RubisChoice {
    /// The first robust good choice.
    pub best: Option<ChoiceScore>,
    /// The first robust bad choice.
    pub worst: Option<ChoiceScore>,
    /// Robust potentially good choices, best first.
    pub good: Vec<ChoiceScore>,
    /// Robust potentially bad choices, worst first.
    pub bad: Vec<ChoiceScore>,
    /// Prekernels which are as dominant as absorbent.
    pub null: Vec<ChoiceScore>,
    /// Good or bad choices with a member not asserted by its own fixpoint vector.
    pub non_robust: Vec<ChoiceScore>,
}

impl Digraph {
    fn kernel_product(
        &self,
        choice: &RoaringBitmap,
        kind: KernelKind,
        vector: &[Decimal],
    ) -> Vec<Decimal> {
        let min = self.domain.min();
        (0..self.order())
            .map(|i| {
                let linked = choice
                    .iter()
                    .map(|j| j as usize)
                    .filter(|&j| j != i)
                    .map(|j| {
                        let value = match kind {
                            KernelKind::Dominant => self.relation[j][i],
                            KernelKind::Absorbent => self.relation[i][j],
                        };
                        value.min(vector[j])
                    })
                    .fold(min, Decimal::max);
                self.domain.negate(linked)
            })
            .collect()
    }

    /// Sharp fixpoint of the kernel equation restricted to a choice.
    ///
    /// Only links from (resp. into) the members of the choice are kept, all other pairs count as
    /// `Min`. Starting from `Min` and `Max` vectors, both bounds are refined by the negated max-min
    /// product until neither changes, for at most `2n²` iterations.
    pub fn choice_vector(&self, choice: &RoaringBitmap, kind: KernelKind) -> ChoiceVector {
        let n = self.order();
        let mut low = vec![self.domain.min(); n];
        let mut high = vec![self.domain.max(); n];
        let cap = (2 * n * n).max(1);
        let mut iterations = 0;
        let mut fixpoint = false;
        while iterations < cap {
            iterations += 1;
            let next_low = self.kernel_product(choice, kind, &high);
            let next_high = self.kernel_product(choice, kind, &next_low);
            if next_low == low && next_high == high {
                fixpoint = true;
                break;
            }
            low = next_low;
            high = next_high;
        }
        if !fixpoint {
            log::warn!("kernel fixpoint not reached after {cap} iterations");
        }
        let values: Vec<Decimal> = low
            .iter()
            .zip(high.iter())
            .map(|(&l, &h)| sharp(&self.domain, l, h))
            .collect();
        let total: Decimal = values.iter().map(|&v| self.domain.determination(v)).sum();
        let determinateness = total
            .checked_div(Decimal::from_int(n as i64))
            .unwrap_or_default();
        log::trace!("choice vector {:?} after {iterations} iterations", values);
        ChoiceVector {
            values,
            determinateness,
            iterations,
            fixpoint,
        }
    }

    /// Rubis best-choice recommendation on the chordless odd circuits augmented digraph.
    ///
    /// A prekernel with `d > ab` is potentially good, one with `d < ab` potentially bad, and one
    /// with `d = ab` null. Good choices are ranked by decreasing determinateness, irredundancy,
    /// independence, and dominance, then by increasing absorbency, then by decreasing covering;
    /// bad choices by the mirrored order.
    pub fn rubis_best_choice(&self) -> Result<RubisChoice> {
        log::info!("[Start] Rubis best choice of {}", self.name);
        let coca = self.coca_digraph()?;
        let digraph = coca.digraph();
        let mut kernels: Vec<RoaringBitmap> = digraph.dominant_prekernels();
        for kernel in digraph.absorbent_prekernels() {
            if !kernels.contains(&kernel) {
                kernels.push(kernel);
            }
        }
        let mut result = RubisChoice::default();
        for kernel in kernels {
            let dominance = digraph.dominance(&kernel);
            let absorbency = digraph.absorbency(&kernel);
            let kind = match dominance.cmp(&absorbency) {
                Ordering::Greater => KernelKind::Dominant,
                Ordering::Less => KernelKind::Absorbent,
                Ordering::Equal => {
                    let score = self.score(&coca, kernel, KernelKind::Dominant);
                    log::debug!("null choice {}", score);
                    result.null.push(score);
                    continue;
                }
            };
            let score = self.score(&coca, kernel, kind);
            let robust = score
                .kernel
                .iter()
                .all(|x| digraph.domain.is_positive(score.vector.values[x as usize]));
            log::debug!("{} choice {} robust: {}", kind, score, robust);
            match (robust, kind) {
                (false, _) => result.non_robust.push(score),
                (true, KernelKind::Dominant) => result.good.push(score),
                (true, KernelKind::Absorbent) => result.bad.push(score),
            }
        }
        result.good.sort_by(|a, b| {
            (b.determinateness, b.irredundancy, b.independence, b.dominance)
                .cmp(&(a.determinateness, a.irredundancy, a.independence, a.dominance))
                .then(a.absorbency.cmp(&b.absorbency))
                .then(b.covering.cmp(&a.covering))
                .then(a.keys.cmp(&b.keys))
        });
        result.bad.sort_by(|a, b| {
            (b.determinateness, b.irredundancy, b.independence, b.absorbency)
                .cmp(&(a.determinateness, a.irredundancy, a.independence, a.absorbency))
                .then(a.dominance.cmp(&b.dominance))
                .then(b.covering.cmp(&a.covering))
                .then(a.keys.cmp(&b.keys))
        });
        result.best = result.good.first().cloned();
        result.worst = result.bad.first().cloned();
        log::info!(
            "[Done] {} good, {} bad, {} null, {} non-robust choices",
            result.good.len(),
            result.bad.len(),
            result.null.len(),
            result.non_robust.len()
        );
        Ok(result)
    }

    fn score(&self, coca: &CocaDigraph, kernel: RoaringBitmap, kind: KernelKind) -> ChoiceScore {
        let digraph = coca.digraph();
        let choice = coca.flatten_choice(&kernel);
        let vector = digraph.choice_vector(&kernel, kind);
        ChoiceScore {
            keys: self.choice_keys(&choice),
            choice,
            determinateness: vector.determinateness,
            irredundancy: digraph.irredundancy(&kernel, kind),
            independence: digraph.independence(&kernel),
            dominance: digraph.dominance(&kernel),
            absorbency: digraph.absorbency(&kernel),
            covering: digraph.covering(&kernel, kind),
            vector,
            kernel,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{crisp, valued};
    use test_log::test;

    #[test]
    fn crisp_kernel_vector() {
        let digraph = crisp(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        let choice = digraph.actions().choice(["a", "c"]).unwrap();
        let vector = digraph.choice_vector(&choice, KernelKind::Dominant);
        assert!(vector.fixpoint);
        assert_eq!(
            vector.values,
            vec![Decimal::ONE, Decimal::MINUS_ONE, Decimal::ONE, Decimal::MINUS_ONE]
        );
        assert_eq!(vector.determinateness, Decimal::ONE);

        let choice = digraph.actions().choice(["b", "d"]).unwrap();
        let vector = digraph.choice_vector(&choice, KernelKind::Absorbent);
        assert_eq!(
            vector.values,
            vec![Decimal::MINUS_ONE, Decimal::ONE, Decimal::MINUS_ONE, Decimal::ONE]
        );
    }

    #[test]
    fn valued_kernel_vector() {
        let digraph = valued(&["a", "b"], &[("a", "b", 400_000), ("b", "a", -400_000)]);
        let choice = digraph.actions().choice(["a"]).unwrap();
        let vector = digraph.choice_vector(&choice, KernelKind::Dominant);
        assert_eq!(
            vector.values,
            vec![Decimal::ONE, Decimal::from_units(-400_000)]
        );
        assert_eq!(vector.determinateness, Decimal::from_units(700_000));
    }

    #[test]
    fn best_and_worst() {
        let digraph = crisp(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        let rubis = digraph.rubis_best_choice().unwrap();
        let best = rubis.best.unwrap();
        assert_eq!(best.keys, vec!["a", "c"]);
        assert_eq!(best.dominance, Decimal::ONE);
        assert_eq!(best.absorbency, Decimal::MINUS_ONE);
        assert_eq!(rubis.worst.unwrap().keys, vec!["b", "d"]);
        assert!(rubis.null.is_empty());
        assert!(rubis.non_robust.is_empty());
        assert_eq!(rubis.good.len(), 1);
    }

    #[test]
    fn odd_circuit_is_null() {
        let digraph = crisp(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let rubis = digraph.rubis_best_choice().unwrap();
        assert!(rubis.best.is_none());
        assert!(rubis.worst.is_none());
        assert_eq!(rubis.null.len(), 1);
        assert_eq!(rubis.null[0].keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn dominant_circuit() {
        // the circuit a, b, c dominates d
        let digraph = crisp(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("a", "d"), ("b", "d"), ("c", "d")],
        );
        let rubis = digraph.rubis_best_choice().unwrap();
        assert_eq!(rubis.best.unwrap().keys, vec!["a", "b", "c"]);
        assert_eq!(rubis.worst.unwrap().keys, vec!["d"]);
    }
}
