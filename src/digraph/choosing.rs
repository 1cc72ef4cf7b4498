/*!
Ranking by iteratively choosing best and rejecting worst choices.
*/
use super::{choices::KernelKind, Digraph};
use crate::{algebra::omin, datatypes::Decimal, error::Result};
use roaring::RoaringBitmap;
use std::fmt::Display;

/// A choice together with its credibility.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChoice {
    /// Credibility of the choice.
    pub credibility: Decimal,
    /// Positions of the chosen actions.
    pub choice: RoaringBitmap,
    /// Keys of the chosen actions.
    pub keys: Vec<String>,
}

impl RankedChoice {
    fn new(digraph: &Digraph, credibility: Decimal, choice: RoaringBitmap) -> Self {
        Self {
            credibility,
            keys: digraph.choice_keys(&choice),
            choice,
        }
    }

    /// Returns true if nothing was chosen.
    pub fn is_empty(&self) -> bool {
        self.choice.is_empty()
    }
}

/// Result of [Digraph::ranking_by_choosing]: one `(best, worst)` pair per step.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingByChoosing {
    /// True if the codual relation was used.
    pub codual: bool,
    /// Best and worst choice of every step.
    pub result: Vec<(RankedChoice, RankedChoice)>,
}

impl RankingByChoosing {
    /// Equivalence classes of keys, from the best to the worst.
    pub fn weak_order(&self) -> Vec<Vec<String>> {
        let mut head: Vec<Vec<String>> = Vec::new();
        let mut tail: Vec<Vec<String>> = Vec::new();
        for (best, worst) in self.result.iter() {
            if best.choice == worst.choice {
                if !best.is_empty() {
                    head.push(best.keys.clone());
                }
                continue;
            }
            if !best.is_empty() {
                head.push(best.keys.clone());
            }
            if !worst.is_empty() {
                tail.push(worst.keys.clone());
            }
        }
        head.extend(tail.into_iter().rev());
        head
    }
}

fn ordinal(rank: usize) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    };
    format!("{rank}{suffix}")
}

impl Display for RankingByChoosing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ranking by Choosing and Rejecting")?;
        if self.codual {
            writeln!(f, " (codual relation)")?;
        }
        for (step, (best, _)) in self.result.iter().enumerate() {
            writeln!(
                f,
                "{:indent$}{} ranked {:?} ({:.2})",
                "",
                ordinal(step + 1),
                best.keys,
                best.credibility,
                indent = 2 * (step + 1)
            )?;
        }
        for (step, (_, worst)) in self.result.iter().enumerate().rev() {
            writeln!(
                f,
                "{:indent$}{} last ranked {:?} ({:.2})",
                "",
                ordinal(step + 1),
                worst.keys,
                worst.credibility,
                indent = 2 * (step + 1)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Candidate {
    credibility: Decimal,
    choice: RoaringBitmap,
    name: String,
    determinateness: Decimal,
}

impl Digraph {
    /// Ranks the actions by repeatedly extracting the best and the worst choice of the remaining
    /// actions.
    ///
    /// Candidates are the prekernels of the chordless odd circuits augmentation of the remaining
    /// actions. The best choice maximises `omin(d, ¬ab)` among dominant ones, the worst
    /// `omin(ab, ¬d)` among absorbent ones; ties go to the smaller choice string, then to the
    /// higher determinateness.
    pub fn ranking_by_choosing(&self, codual: bool) -> Result<RankingByChoosing> {
        log::info!("[Start] ranking by choosing of {}", self.name);
        let digraph = if codual { self.codual() } else { self.clone() };
        let domain = self.domain;
        let mut remaining = self.actions.all();
        let mut result = Vec::new();
        loop {
            match remaining.len() {
                0 => break,
                1 => {
                    let single = RankedChoice::new(self, domain.max(), remaining.clone());
                    result.push((single.clone(), single));
                    break;
                }
                2 => {
                    let pair: Vec<usize> = remaining.iter().map(|x| x as usize).collect();
                    let (a, b) = (pair[0], pair[1]);
                    let (forward, backward) = (digraph.relation[a][b], digraph.relation[b][a]);
                    let step = if forward == backward {
                        let block = RankedChoice::new(self, domain.med(), remaining.clone());
                        (block.clone(), block)
                    } else {
                        let (winner, loser) = if forward > backward { (a, b) } else { (b, a) };
                        let credibility = omin(
                            &domain,
                            [
                                digraph.relation[winner][loser],
                                domain.negate(digraph.relation[loser][winner]),
                            ],
                        );
                        (
                            RankedChoice::new(self, credibility, single(winner)),
                            RankedChoice::new(self, credibility, single(loser)),
                        )
                    };
                    result.push(step);
                    break;
                }
                _ => {}
            }
            let positions: Vec<u32> = remaining.iter().collect();
            let coca = digraph.restricted(&remaining).coca_digraph()?;
            let augmented = coca.digraph();
            let original = |kernel: &RoaringBitmap| -> RoaringBitmap {
                coca.flatten_choice(kernel)
                    .iter()
                    .map(|x| positions[x as usize])
                    .collect()
            };
            let candidates = |kind: KernelKind| -> Option<Candidate> {
                augmented
                    .prekernels(kind)
                    .into_iter()
                    .map(|kernel| {
                        let (d, ab) = (augmented.dominance(&kernel), augmented.absorbency(&kernel));
                        let credibility = match kind {
                            KernelKind::Dominant => omin(&domain, [d, domain.negate(ab)]),
                            KernelKind::Absorbent => omin(&domain, [ab, domain.negate(d)]),
                        };
                        let choice = original(&kernel);
                        Candidate {
                            credibility,
                            name: self.actions.print_choice(&choice).to_string(),
                            determinateness: augmented.choice_vector(&kernel, kind).determinateness,
                            choice,
                        }
                    })
                    .min_by(|a, b| {
                        b.credibility
                            .cmp(&a.credibility)
                            .then(a.name.cmp(&b.name))
                            .then(b.determinateness.cmp(&a.determinateness))
                    })
            };
            let best = candidates(KernelKind::Dominant);
            let worst = candidates(KernelKind::Absorbent);
            let (best, worst) = match (best, worst) {
                (None, None) => {
                    log::debug!("no prekernels left, ambiguous block");
                    let block = RankedChoice::new(self, domain.med(), remaining.clone());
                    result.push((block.clone(), block));
                    break;
                }
                (best, worst) => (best, worst),
            };
            let best = match best {
                Some(best) => RankedChoice::new(self, best.credibility, best.choice),
                None => RankedChoice::new(self, domain.med(), RoaringBitmap::new()),
            };
            let worst = match worst {
                Some(worst) => {
                    RankedChoice::new(self, worst.credibility, &worst.choice - &best.choice)
                }
                None => RankedChoice::new(self, domain.med(), RoaringBitmap::new()),
            };
            log::debug!(
                "best {:?} ({}), worst {:?} ({})",
                best.keys,
                best.credibility,
                worst.keys,
                worst.credibility
            );
            remaining -= &best.choice;
            remaining -= &worst.choice;
            let stalled = best.is_empty() && worst.is_empty();
            result.push((best, worst));
            if stalled {
                let block = RankedChoice::new(self, domain.med(), remaining.clone());
                result.push((block.clone(), block));
                break;
            }
        }
        log::info!("[Done] ranking by choosing in {} steps", result.len());
        Ok(RankingByChoosing { codual, result })
    }
}

fn single(x: usize) -> RoaringBitmap {
    [x as u32].into_iter().collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{crisp, valued};
    use test_log::test;

    #[test]
    fn linear_order() {
        let digraph = crisp(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("a", "d"), ("b", "c"), ("b", "d"), ("c", "d")],
        );
        let ranking = digraph.ranking_by_choosing(false).unwrap();
        assert_eq!(ranking.result.len(), 2);
        assert_eq!(ranking.result[0].0.keys, vec!["a"]);
        assert_eq!(ranking.result[0].0.credibility, Decimal::ONE);
        assert_eq!(ranking.result[0].1.keys, vec!["d"]);
        assert_eq!(ranking.result[1].0.keys, vec!["b"]);
        assert_eq!(ranking.result[1].1.keys, vec!["c"]);
        assert_eq!(
            ranking.weak_order(),
            vec![vec!["a"], vec!["b"], vec!["c"], vec!["d"]]
        );
        let printed = ranking.to_string();
        assert!(printed.contains("1st ranked [\"a\"] (1.00)"));
        assert!(printed.contains("1st last ranked [\"d\"]"));
    }

    #[test]
    fn terminal_pairs() {
        let digraph = valued(&["a", "b"], &[("b", "a", 600_000), ("a", "b", -200_000)]);
        let ranking = digraph.ranking_by_choosing(false).unwrap();
        assert_eq!(ranking.result.len(), 1);
        assert_eq!(ranking.result[0].0.keys, vec!["b"]);
        assert_eq!(ranking.result[0].1.keys, vec!["a"]);
        assert_eq!(ranking.result[0].0.credibility, Decimal::from_units(200_000));

        let tied = valued(&["a", "b"], &[]);
        let ranking = tied.ranking_by_choosing(false).unwrap();
        assert_eq!(ranking.weak_order(), vec![vec!["a", "b"]]);
        assert_eq!(ranking.result[0].0.credibility, Decimal::ZERO);
    }

    #[test]
    fn single_action() {
        let digraph = crisp(&["a"], &[]);
        let ranking = digraph.ranking_by_choosing(true).unwrap();
        assert!(ranking.codual);
        assert_eq!(ranking.result.len(), 1);
        assert_eq!(ranking.result[0].0.credibility, Decimal::ONE);
        assert_eq!(ranking.weak_order(), vec![vec!["a"]]);
    }

    #[test]
    fn odd_circuit_is_ambiguous() {
        let digraph = crisp(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let ranking = digraph.ranking_by_choosing(false).unwrap();
        assert_eq!(ranking.weak_order(), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
    }
}
