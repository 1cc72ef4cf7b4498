//! Datatypes shared by digraphs and graphs: exact values, the valuation domain, and keyed actions.
pub mod actions;
pub mod decimal;
pub mod domain;

pub use actions::{Action, ActionContainer, ActionMeta, KeyOrder, PrintableChoice};
pub use decimal::Decimal;
pub use domain::ValuationDomain;
