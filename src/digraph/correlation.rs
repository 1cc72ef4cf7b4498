/*!
Bipolar ordinal correlation between relations on the same actions.
*/
use super::{ranking::Ranking, Digraph};
use crate::{algebra::Polarization, datatypes::Decimal, error::Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Ordinal correlation `K` and determination `D` of two relations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correlation {
    /// `K` in `[-1, 1]`.
    pub correlation: Decimal,
    /// `D` in `[0, 1]`.
    pub determination: Decimal,
}

impl Correlation {
    /// Reported when no pair is determined in both relations.
    pub const UNDEFINED: Correlation = Correlation {
        correlation: Decimal::ZERO,
        determination: Decimal::ZERO,
    };

    /// Returns false for [Correlation::UNDEFINED].
    pub fn is_defined(&self) -> bool {
        *self != Self::UNDEFINED
    }
}

impl Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "correlation {:+.3}, determination {:.3}",
            self.correlation, self.determination
        )
    }
}

impl Digraph {
    /// Normalized copy, polarized at the strict median cut if requested.
    fn correlation_operand(&self, median_cut: bool) -> Result<Digraph> {
        let normalized = self.normalized();
        if median_cut {
            normalized.polarized(&Polarization::default().keep_values(false).strict(true))
        } else {
            Ok(normalized)
        }
    }

    /// Bipolar ordinal correlation on the normalized domain `[-1, 1]`:
    ///
    /// `K = Σ min(max(¬r₁, r₂), max(r₁, ¬r₂)) / Σ min(|r₁|, |r₂|)` and
    /// `D = Σ min(|r₁|, |r₂|) / n(n-1)`, summed over all pairs `x ≠ y`.
    ///
    /// Fails with [DomainMismatch][crate::error::DigraphError::DomainMismatch] if the actions
    /// differ. Without any determined pair the result is [Correlation::UNDEFINED]. Relations on a
    /// single action have no pair to disagree on and correlate at `(1, 0)`.
    pub fn bipolar_correlation(&self, other: &Digraph, median_cut: bool) -> Result<Correlation> {
        let position = self.actions.alignment(&other.actions)?;
        if self.order() < 2 {
            return Ok(Correlation {
                correlation: Decimal::ONE,
                determination: Decimal::ZERO,
            });
        }
        let (first, second) = (
            self.correlation_operand(median_cut)?,
            other.correlation_operand(median_cut)?,
        );
        let (mut agreement, mut determined) = (Decimal::ZERO, Decimal::ZERO);
        for (x, y) in self.pairs() {
            let r1 = first.relation[x][y];
            let r2 = second.relation[position[x]][position[y]];
            agreement += (-r1).max(r2).min(r1.max(-r2));
            determined += r1.abs().min(r2.abs());
        }
        if determined == Decimal::ZERO {
            log::debug!("no determined pair, correlation undefined");
            return Ok(Correlation::UNDEFINED);
        }
        let n = self.order() as i64;
        let result = Correlation {
            correlation: agreement.checked_div(determined).unwrap_or_default(),
            determination: determined
                .checked_div(Decimal::from_int(n * (n - 1)))
                .unwrap_or_default(),
        };
        log::debug!("{} against {}: {}", self.name, other.name, result);
        Ok(result)
    }

    /// Same as [bipolar_correlation][Digraph::bipolar_correlation].
    pub fn ordinal_correlation(&self, other: &Digraph, median_cut: bool) -> Result<Correlation> {
        self.bipolar_correlation(other, median_cut)
    }

    /// Kemeny index `Σ_{x≠y} sign(r₂(x,y)) · r₁(x,y)` on the normalized domain, where `other`
    /// is read as a crisp relation.
    pub fn kemeny_index(&self, other: &Digraph) -> Result<Decimal> {
        let position = self.actions.alignment(&other.actions)?;
        let (first, second) = (self.normalized(), other.normalized());
        Ok(self
            .pairs()
            .map(|(x, y)| {
                let sign = second.relation[position[x]][position[y]].signum();
                sign * first.relation[x][y]
            })
            .sum())
    }

    /// Correlation with the linear order of a ranking.
    pub fn correlation_with_ranking(&self, ranking: &Ranking) -> Result<Correlation> {
        let order = ranking.to_digraph(&self.actions)?;
        self.bipolar_correlation(&order, false)
    }
}
