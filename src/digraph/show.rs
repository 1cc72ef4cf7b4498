//! Textual views of a [Digraph] for output purposes.
use super::Digraph;
use std::fmt::Display;

/// The characteristic table, one row per source action.
#[derive(Debug, Clone, Copy)]
pub struct RelationTable<'a> {
    digraph: &'a Digraph,
    ndigits: usize,
}

impl Display for RelationTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digraph = self.digraph;
        let names: Vec<&str> = digraph.actions.iter().map(|a| a.short_name()).collect();
        let width = names
            .iter()
            .map(|name| name.len())
            .max()
            .unwrap_or(1)
            .max(self.ndigits + 3)
            .max("r(x,y)".len());
        writeln!(f, "* ---- Relation Table -----")?;
        write!(f, "{:>width$} |", "r(x,y)")?;
        for name in names.iter() {
            write!(f, " {name:>width$}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat((width + 1) * (names.len() + 1) + 1))?;
        for (x, name) in names.iter().enumerate() {
            write!(f, "{name:>width$} |")?;
            for value in digraph.row(x) {
                write!(f, " {:>width$.prec$}", value, prec = self.ndigits)?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "Valuation domain: [{}; {}]",
            digraph.domain.min(),
            digraph.domain.max()
        )
    }
}

/// Order, size, densities, and the structural degrees.
#[derive(Debug, Clone, Copy)]
pub struct Statistics<'a> {
    digraph: &'a Digraph,
}

impl Display for Statistics<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digraph = self.digraph;
        let densities = digraph.densities();
        writeln!(f, "*----- general statistics -------------*")?;
        writeln!(f, "  for digraph              : <{}>", digraph.name)?;
        writeln!(f, "  order                    : {} nodes", digraph.order())?;
        writeln!(f, "  size                     : {} arcs", digraph.size())?;
        writeln!(f, "  arc density              : {:.2}", densities.arc_density)?;
        writeln!(
            f,
            "  positive/negative/med    : {:.2} / {:.2} / {:.2}",
            densities.positive, densities.negative, densities.indeterminate
        )?;
        writeln!(
            f,
            "  determinateness          : {:.3}",
            digraph.determinateness()
        )?;
        writeln!(
            f,
            "  transitivity degree      : {:.3}",
            digraph.transitivity_degree()
        )?;
        writeln!(
            f,
            "  symmetry degree          : {:.3}",
            digraph.symmetry_degree()
        )?;
        writeln!(
            f,
            "  outdegrees distribution  : {:?}",
            digraph.out_degree_distribution()
        )?;
        writeln!(
            f,
            "  indegrees distribution   : {:?}",
            digraph.in_degree_distribution()
        )
    }
}

/// Name, actions, and valuation domain.
#[derive(Debug, Clone, Copy)]
pub struct Short<'a> {
    digraph: &'a Digraph,
}

impl Display for Short<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digraph = self.digraph;
        writeln!(f, "*----- show short --------------*")?;
        writeln!(f, "Digraph          : {}", digraph.name)?;
        writeln!(
            f,
            "Actions          : [{}]",
            digraph.actions.keys().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "Valuation domain : [{}; {}; {}]",
            digraph.domain.min(),
            digraph.domain.med(),
            digraph.domain.max()
        )
    }
}

impl Digraph {
    /// The characteristic table with `ndigits` fractional digits.
    pub fn relation_table(&self, ndigits: usize) -> RelationTable<'_> {
        RelationTable {
            digraph: self,
            ndigits,
        }
    }

    /// Descriptive statistics.
    pub fn statistics(&self) -> Statistics<'_> {
        Statistics { digraph: self }
    }

    /// Short description.
    pub fn short(&self) -> Short<'_> {
        Short { digraph: self }
    }

    /// Prints the [relation table][Digraph::relation_table] to stdout.
    pub fn show_relation_table(&self, ndigits: usize) {
        print!("{}", self.relation_table(ndigits));
    }

    /// Prints the [statistics][Digraph::statistics] to stdout.
    pub fn show_statistics(&self) {
        print!("{}", self.statistics());
    }

    /// Prints the [short description][Digraph::short] to stdout.
    pub fn show_short(&self) {
        print!("{}", self.short());
    }
}
