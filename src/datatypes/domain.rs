//! The three-valued bipolar valuation domain.
use super::Decimal;
use crate::error::{DigraphError, Result};
use serde::{Deserialize, Serialize};

/// Bipolar characteristic domain `Min < Med < Max`.
///
/// Values above `Med` assert a relation, values below deny it, and `Med` itself stands for
/// indeterminacy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "DomainDescription", into = "DomainDescription")]
pub struct ValuationDomain {
    min: Decimal,
    med: Decimal,
    max: Decimal,
    integer: bool,
}

#[derive(Serialize, Deserialize)]
struct DomainDescription {
    min: Decimal,
    #[serde(default)]
    med: Option<Decimal>,
    max: Decimal,
    #[serde(rename = "hasIntegerValuation", default)]
    has_integer_valuation: Option<bool>,
}

impl TryFrom<DomainDescription> for ValuationDomain {
    type Error = DigraphError;

    fn try_from(value: DomainDescription) -> Result<Self> {
        let mut domain = ValuationDomain::new(value.min, value.max)?;
        if let Some(med) = value.med {
            if med != domain.med {
                return Err(DigraphError::DomainMismatch(format!(
                    "median {med} is not the midpoint of [{}, {}]",
                    value.min, value.max
                )));
            }
        }
        if let Some(integer) = value.has_integer_valuation {
            domain.integer = integer;
        }
        Ok(domain)
    }
}

impl From<ValuationDomain> for DomainDescription {
    fn from(value: ValuationDomain) -> Self {
        Self {
            min: value.min,
            med: Some(value.med),
            max: value.max,
            has_integer_valuation: Some(value.integer),
        }
    }
}

impl Default for ValuationDomain {
    fn default() -> Self {
        Self::normalized()
    }
}

impl ValuationDomain {
    /// Creates the domain `[min, max]` with `med` at the rounded midpoint.
    ///
    /// Fails with [DigraphError::InvalidDomain] unless `min < med < max`, which excludes a domain
    /// only one unit wide.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self> {
        let med = min.midpoint(max);
        if !(min < med && med < max) {
            return Err(DigraphError::InvalidDomain(min, max));
        }
        Ok(Self {
            min,
            med,
            max,
            integer: min.is_integer() && max.is_integer() && med.is_integer(),
        })
    }

    /// The normalized integer domain `[-1, 0, 1]`.
    pub fn normalized() -> Self {
        Self {
            min: Decimal::MINUS_ONE,
            med: Decimal::ZERO,
            max: Decimal::ONE,
            integer: true,
        }
    }

    /// Sets the representation flag (integer vs. fixed-precision decimal).
    pub fn with_integer_valuation(mut self, integer: bool) -> Self {
        self.integer = integer;
        self
    }

    /// Lower bound.
    pub fn min(&self) -> Decimal {
        self.min
    }

    /// Indeterminate midpoint.
    pub fn med(&self) -> Decimal {
        self.med
    }

    /// Upper bound.
    pub fn max(&self) -> Decimal {
        self.max
    }

    /// `Max - Min`
    pub fn amplitude(&self) -> Decimal {
        self.max - self.min
    }

    /// Returns true if the values are rendered as integers.
    pub fn has_integer_valuation(&self) -> bool {
        self.integer
    }

    /// Dualization `Max - v + Min`.
    pub fn negate(&self, value: Decimal) -> Decimal {
        self.max - value + self.min
    }

    /// `v > Med`
    pub fn is_positive(&self, value: Decimal) -> bool {
        value > self.med
    }

    /// `v < Med`
    pub fn is_negative(&self, value: Decimal) -> bool {
        value < self.med
    }

    /// Returns true if `Min <= v <= Max`.
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }

    /// Bounds check, returning the value if it lies within the domain.
    pub fn check(&self, value: Decimal) -> Result<Decimal> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(DigraphError::ValueOutOfRange {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Normalized distance `|v - Med| / (Max - Med)` of a value to the indeterminate midpoint.
    pub fn determination(&self, value: Decimal) -> Decimal {
        (value - self.med)
            .abs()
            .checked_div(self.max - self.med)
            .unwrap_or_default()
    }

    /// Number of digits used when rendering values of this domain.
    pub fn display_digits(&self) -> usize {
        if self.integer {
            0
        } else {
            2
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn construct() {
        let domain = ValuationDomain::new(Decimal::ZERO, Decimal::ONE).unwrap();
        assert_eq!(domain.med(), Decimal::from_units(500_000));
        assert!(!domain.has_integer_valuation());
        assert_eq!(domain.negate(Decimal::from_units(200_000)), Decimal::from_units(800_000));

        let domain = ValuationDomain::new(Decimal::from_int(-100), Decimal::from_int(100)).unwrap();
        assert!(domain.has_integer_valuation());
        assert_eq!(domain.med(), Decimal::ZERO);

        assert_eq!(
            ValuationDomain::new(Decimal::ONE, Decimal::ONE),
            Err(DigraphError::InvalidDomain(Decimal::ONE, Decimal::ONE))
        );
        let unit = Decimal::from_units(1);
        assert_eq!(
            ValuationDomain::new(Decimal::ZERO, unit),
            Err(DigraphError::InvalidDomain(Decimal::ZERO, unit))
        );
        let narrow = ValuationDomain::new(Decimal::ZERO, Decimal::from_units(2)).unwrap();
        assert_eq!(narrow.med(), unit);
        assert_eq!(narrow.determination(Decimal::ZERO), Decimal::ONE);
    }

    #[test]
    fn bounds() {
        let domain = ValuationDomain::normalized();
        assert!(domain.check(Decimal::ONE).is_ok());
        assert!(matches!(
            domain.check(Decimal::from_int(2)),
            Err(DigraphError::ValueOutOfRange { .. })
        ));
        assert!(domain.is_positive(Decimal::from_units(1)));
        assert!(domain.is_negative(Decimal::from_units(-1)));
        assert!(!domain.is_positive(Decimal::ZERO) && !domain.is_negative(Decimal::ZERO));
        assert_eq!(domain.determination(Decimal::from_units(-500_000)), Decimal::from_units(500_000));
    }

    #[test]
    fn serialize() {
        let domain = ValuationDomain::normalized();
        let serialized = serde_json::to_string(&domain).unwrap();
        assert_eq!(
            serialized,
            r#"{"min":"-1","med":"0","max":"1","hasIntegerValuation":true}"#
        );
        let parsed: ValuationDomain = serde_json::from_str(r#"{"min":0,"max":"10"}"#).unwrap();
        assert_eq!(parsed.med(), Decimal::from_int(5));
        assert!(serde_json::from_str::<ValuationDomain>(r#"{"min":0,"med":"4","max":"10"}"#).is_err());
        assert!(serde_json::from_str::<ValuationDomain>(r#"{"min":0,"max":10000000000000}"#).is_err());
        assert!(serde_json::from_str::<ValuationDomain>(r#"{"min":"0","max":"0.000001"}"#).is_err());
    }
}
