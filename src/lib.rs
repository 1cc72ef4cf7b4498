//! This library contains an exact representation of `bipolar-valued digraphs and graphs` together with the choice, ranking, and recognition algorithms built on them.
//!
//! # Bipolar-valued digraphs
//! A `bipolar-valued digraph` relates a finite set of keyed actions by a characteristic valuation `r(x,y)` taken from a valuation domain `[Min; Med; Max]`.
//! Values above the median assert the relation, values below deny it, and the median itself expresses indeterminacy.
//! All values are exact fixed-point decimals, so comparisons against the median never suffer from rounding.
//!
//! Neighbourhood sets at the median cut are computed on first use and cached until the relation changes.
//! Derived constructions (dual, converse, codual, polarisation, symmetric and asymmetric parts) are independent digraphs.
//!
//! # Choices and rankings
//! On top of the relation store the library offers
//! - independent choices, dominant and absorbent prekernels, and their bipolar fixpoint characteristics,
//! - chordless circuit enumeration and the chordless odd circuit augmentation and elimination closures,
//! - the Rubis best-choice recommendation,
//! - rankings by choosing, Kohler, Arrow–Raynaud, ranked pairs, Copeland, Kemeny, and Slater,
//! - the bipolar ordinal correlation between two relations on the same actions.
//!
//! # Graphs
//! A [graph::Graph] holds one value per unordered pair of vertices. It provides maximal independent sets, chordless cycles, traversals,
//! and the recognition of triangulated, comparability, interval, permutation, split, and perfect graphs.
//!
//! ## Example description:
//! ```json
//! {
//!   "name": "path",
//!   "vertices": ["a", "b", "c"],
//!   "valuationdomain": {"min": "-1", "med": "0", "max": "1"},
//!   "edges": [{"vertices": ["a", "b"], "value": "1"}, {"vertices": ["b", "c"], "value": "1"}]
//! }
//! ```
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod algebra;
pub mod datatypes;
pub mod digraph;
pub mod error;
pub mod graph;
pub mod random;

#[cfg(test)]
mod test;
