/*!
The bipolar-valued relational algebra.

 - epistemic conjunction [omin] and disjunction [omax]
 - the [sharp] combination of a lower and an upper bound
 - order-preserving [recoding][recode_value] between valuation domains
 - [polarization][Polarization] by α- or β-cuts
*/
use crate::{
    datatypes::{Decimal, ValuationDomain},
    error::{DigraphError, Result},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

#[derive(Default)]
struct Polarity {
    lowest: Option<Decimal>,
    highest: Option<Decimal>,
    positive: bool,
    negative: bool,
}

impl Polarity {
    fn scan<I: IntoIterator<Item = Decimal>>(domain: &ValuationDomain, values: I) -> Self {
        values.into_iter().fold(Self::default(), |mut acc, value| {
            acc.lowest = Some(acc.lowest.map_or(value, |low| low.min(value)));
            acc.highest = Some(acc.highest.map_or(value, |high| high.max(value)));
            acc.positive |= domain.is_positive(value);
            acc.negative |= domain.is_negative(value);
            acc
        })
    }
}

/// Epistemic conjunction.
///
/// Conflicting polarities collapse to `Med`, otherwise the result is the minimum of non-negative
/// terms, resp. the maximum of non-positive terms. An empty list yields `Med`.
pub fn omin<I: IntoIterator<Item = Decimal>>(domain: &ValuationDomain, values: I) -> Decimal {
    let polarity = Polarity::scan(domain, values);
    match (polarity.positive, polarity.negative) {
        (true, true) => domain.med(),
        (_, false) => polarity.lowest.unwrap_or_else(|| domain.med()),
        (false, true) => polarity.highest.unwrap_or_else(|| domain.med()),
    }
}

/// Epistemic disjunction, the dual of [omin].
pub fn omax<I: IntoIterator<Item = Decimal>>(domain: &ValuationDomain, values: I) -> Decimal {
    let polarity = Polarity::scan(domain, values);
    match (polarity.positive, polarity.negative) {
        (true, true) => domain.med(),
        (_, false) => polarity.highest.unwrap_or_else(|| domain.med()),
        (false, true) => polarity.lowest.unwrap_or_else(|| domain.med()),
    }
}

/// `max(a,b)` if both are `>= Med`, `min(a,b)` if both are `<= Med`, `Med` otherwise.
pub fn sharp(domain: &ValuationDomain, low: Decimal, high: Decimal) -> Decimal {
    let med = domain.med();
    if low >= med && high >= med {
        low.max(high)
    } else if low <= med && high <= med {
        low.min(high)
    } else {
        med
    }
}

/// Maps a value of `from` onto `to`, preserving order.
/// The extrema and the median are mapped exactly, any other value is rounded to `ndigits`.
pub fn recode_value(
    value: Decimal,
    from: &ValuationDomain,
    to: &ValuationDomain,
    ndigits: u32,
) -> Decimal {
    if value == from.min() {
        to.min()
    } else if value == from.max() {
        to.max()
    } else if value == from.med() {
        to.med()
    } else {
        let shifted = (value - from.min())
            .checked_mul_div(to.amplitude(), from.amplitude())
            .unwrap_or_else(|| to.med() - to.min());
        (to.min() + shifted).round_dp(ndigits)
    }
}

/// Binary epistemic fusion operators.
#[derive(
    EnumString, EnumVariantNames, Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Fusion {
    /// Conjunctive fusion by [omin].
    #[strum(serialize = "o-min", serialize = "omin")]
    OMin,
    /// Disjunctive fusion by [omax].
    #[strum(serialize = "o-max", serialize = "omax")]
    OMax,
}

impl Fusion {
    /// Fuses two characteristic values.
    pub fn apply(self, domain: &ValuationDomain, left: Decimal, right: Decimal) -> Decimal {
        match self {
            Fusion::OMin => omin(domain, [left, right]),
            Fusion::OMax => omax(domain, [left, right]),
        }
    }
}

/// Settings of a polarization.
///
/// A β-cut (the default) sends values at or beyond the level `λ` to `Max`, values at or below the
/// mirrored level `Max - λ + Min` to `Min`, and everything in between to `Med`.
/// An α-cut is crisp: values at or beyond `λ` become `Max`, all others `Min`.
/// `strict_cut` replaces the inclusive comparisons by strict ones and `keep_values` keeps the original
/// value instead of the extremum for every non-`Med` outcome.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polarization {
    /// The cut level, `Med` if unset.
    pub level: Option<Decimal>,
    /// Keep original values for asserted (resp. denied) pairs.
    pub keep_values: bool,
    /// Use strict comparisons.
    pub strict_cut: bool,
    /// Crisp α-cut instead of a β-cut.
    pub alpha_cut: bool,
}

impl Default for Polarization {
    fn default() -> Self {
        Self {
            level: None,
            keep_values: true,
            strict_cut: false,
            alpha_cut: false,
        }
    }
}

impl Polarization {
    /// β-cut at the given level, keeping values.
    pub fn at(level: Decimal) -> Self {
        Self {
            level: Some(level),
            ..Default::default()
        }
    }

    /// Sets `keep_values`.
    pub fn keep_values(mut self, keep_values: bool) -> Self {
        self.keep_values = keep_values;
        self
    }

    /// Sets `strict_cut`.
    pub fn strict(mut self, strict_cut: bool) -> Self {
        self.strict_cut = strict_cut;
        self
    }

    /// Sets `alpha_cut`.
    pub fn alpha(mut self, alpha_cut: bool) -> Self {
        self.alpha_cut = alpha_cut;
        self
    }

    /// The effective level, failing with [DigraphError::InvalidLevel] outside of `[Med, Max]`.
    pub fn checked_level(&self, domain: &ValuationDomain) -> Result<Decimal> {
        let level = self.level.unwrap_or_else(|| domain.med());
        if level < domain.med() || level > domain.max() {
            Err(DigraphError::InvalidLevel {
                level,
                med: domain.med(),
                max: domain.max(),
            })
        } else {
            Ok(level)
        }
    }

    /// Polarizes a single value at an already checked level.
    pub fn apply(&self, domain: &ValuationDomain, level: Decimal, value: Decimal) -> Decimal {
        let above = if self.strict_cut {
            value > level
        } else {
            value >= level
        };
        if self.alpha_cut {
            return match (above, self.keep_values) {
                (true, true) => value,
                (true, false) => domain.max(),
                (false, _) => domain.min(),
            };
        }
        let mirrored = domain.negate(level);
        let below = if self.strict_cut {
            value < mirrored
        } else {
            value <= mirrored
        };
        match (above, below) {
            (true, _) if self.keep_values => value,
            (true, _) => domain.max(),
            (false, true) if self.keep_values => value,
            (false, true) => domain.min(),
            (false, false) => domain.med(),
        }
    }
}
