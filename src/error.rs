//! Error kinds shared by all bipolar-valued constructions.

use crate::datatypes::Decimal;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DigraphError>;

/// Failures which abort a call.
///
/// Degenerate outcomes which callers are expected to react to (an undefined correlation, a circuit
/// elimination which stalls) are reported as structured values instead, see
/// [Correlation][crate::digraph::correlation::Correlation] and
/// [CoceOutcome][crate::digraph::coca::CoceOutcome].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigraphError {
    /// The cut level of a polarization lies outside of `[Med, Max]`.
    #[error("cut level {level} lies outside of [{med}, {max}]")]
    InvalidLevel {
        /// requested level
        level: Decimal,
        /// median of the valuation domain
        med: Decimal,
        /// maximum of the valuation domain
        max: Decimal,
    },
    /// Two relations do not share their actions or their valuation domain.
    #[error("domain mismatch: {0}")]
    DomainMismatch(String),
    /// An exhaustive enumeration was requested above its configured cap.
    #[error("order {order} exceeds the exhaustive enumeration limit {limit}")]
    OrderLimitExceeded {
        /// order of the instance
        order: usize,
        /// configured limit
        limit: usize,
    },
    /// Circuit elimination did not reach a circuit-free polarization.
    #[error("chordless circuits survive the polarization at level {0}")]
    UnresolvableCircuits(Decimal),
    /// A tree construction met a vertex which is not reachable from the root.
    #[error("vertex {0} is not connected to the rest of the graph")]
    IsolatedVertex(String),
    /// A key does not name an action (resp. vertex) of the instance.
    #[error("unknown action {0}")]
    UnknownAction(String),
    /// A characteristic value lies outside of `[Min, Max]`.
    #[error("value {value} lies outside of [{min}, {max}]")]
    ValueOutOfRange {
        /// offending value
        value: Decimal,
        /// minimum of the valuation domain
        min: Decimal,
        /// maximum of the valuation domain
        max: Decimal,
    },
    /// A valuation domain which does not satisfy `Min < Med < Max`.
    #[error("invalid valuation domain [{0}, {1}]")]
    InvalidDomain(Decimal, Decimal),
    /// A literal which is no exact decimal with at most six fractional digits.
    #[error("invalid decimal literal {0:?}")]
    InvalidValue(String),
    /// The k-choices lift was asked for subsets of an impossible size.
    #[error("choice size {k} is not within 1..={order}")]
    InvalidChoiceSize {
        /// requested subset size
        k: usize,
        /// order of the instance
        order: usize,
    },
}
