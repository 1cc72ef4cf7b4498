/*!
Chordless cycles of a graph and the recognitions built on them.
*/
use super::Graph;
use crate::digraph::circuits::{ChordlessCircuits, Circuit};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

/// Which cycles a [girth][Graph::girth] is taken over.
#[derive(
    EnumString, EnumVariantNames, Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GirthKind {
    /// Every cycle.
    Any,
    /// Cycles of odd length.
    Odd,
    /// Cycles of even length.
    Even,
}

impl Graph {
    /// Lazy enumeration of the chordless cycles; triangles only if `cycle3` is set.
    pub fn chordless_cycles_iter(&self, cycle3: bool) -> ChordlessCircuits {
        ChordlessCircuits::undirected(self.neighbours().to_vec(), cycle3)
    }

    /// All chordless cycles, each reported once per vertex set.
    pub fn chordless_cycles(&self, cycle3: bool) -> Vec<Circuit> {
        log::info!("[Start] chordless cycles of {}", self.name);
        let result: Vec<Circuit> = self.chordless_cycles_iter(cycle3).collect();
        log::info!("[Done] {} chordless cycles", result.len());
        result
    }

    /// Length of a shortest cycle of the given kind, `None` if there is none.
    pub fn girth(&self, kind: GirthKind) -> Option<usize> {
        self.chordless_cycles_iter(true)
            .map(|cycle| cycle.len())
            .filter(|&length| match kind {
                GirthKind::Any => true,
                GirthKind::Odd => length % 2 == 1,
                GirthKind::Even => length % 2 == 0,
            })
            .min()
    }

    /// True if no chordless cycle of length at least four exists.
    pub fn is_triangulated(&self) -> bool {
        self.chordless_cycles_iter(false).next().is_none()
    }

    /// True if neither the graph nor its dual contains an odd chordless cycle of length at
    /// least five.
    pub fn is_perfect_graph(&self) -> bool {
        let has_odd_hole = |graph: &Graph| graph.chordless_cycles_iter(false).any(|cycle| cycle.is_odd());
        if has_odd_hole(self) {
            log::debug!("{} contains an odd chordless cycle", self.name);
            return false;
        }
        if has_odd_hole(&self.dual()) {
            log::debug!("the dual of {} contains an odd chordless cycle", self.name);
            return false;
        }
        true
    }

    /// True if both the graph and its dual are triangulated.
    pub fn is_split_graph(&self) -> bool {
        self.is_triangulated() && self.dual().is_triangulated()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::{ActionContainer, ValuationDomain};
    use test_log::test;

    #[test]
    fn cycle_graph() {
        let c5 = Graph::cycle(5);
        let cycles = c5.chordless_cycles(false);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 5);
        assert!(cycles[0].is_odd());
        assert_eq!(c5.girth(GirthKind::Any), Some(5));
        assert_eq!(c5.girth(GirthKind::Odd), Some(5));
        assert_eq!(c5.girth(GirthKind::Even), None);
        assert!(!c5.is_triangulated());
        assert!(!c5.is_perfect_graph());
    }

    #[test]
    fn triangles() {
        let complete =
            Graph::complete(ActionContainer::numbered("v", 4), ValuationDomain::normalized());
        assert_eq!(complete.chordless_cycles(true).len(), 4);
        assert!(complete.chordless_cycles(false).is_empty());
        assert_eq!(complete.girth(GirthKind::Any), Some(3));
        assert_eq!(complete.girth(GirthKind::Even), None);
        assert!(complete.is_triangulated());
        assert!(complete.is_split_graph());
        assert!(complete.is_perfect_graph());
    }

    #[test]
    fn even_cycles() {
        let c4 = Graph::cycle(4);
        assert_eq!(c4.girth(GirthKind::Even), Some(4));
        assert!(!c4.is_triangulated());
        assert!(!c4.is_split_graph());
        assert!(c4.is_perfect_graph());
        // the dual of C5 is C5 again
        assert!(Graph::cycle(5).dual().chordless_cycles(false)[0].len() == 5);
        assert_eq!("odd".parse(), Ok(GirthKind::Odd));
    }
}
