/*!
Ranking rules.

Each rule yields a [Ranking] from the best to the worst action. [Digraph::ranking] selects a rule by
its [RankingRule] name.
*/
use super::Digraph;
use crate::{
    algebra::Polarization,
    datatypes::{ActionContainer, Decimal, ValuationDomain},
    error::{DigraphError, Result},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumString, EnumVariantNames};

/// Available ranking rules.
#[derive(
    EnumString, EnumVariantNames, Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RankingRule {
    /// Leximin: repeatedly rank first the action whose weakest outgoing value is strongest.
    Kohler,
    /// Leximax: repeatedly rank last the action whose strongest outgoing value is weakest.
    ArrowRaynaud,
    /// Greedy acyclic insertion of the strongest pairs.
    RankedPairs,
    /// Maximal agreement with the relation over all permutations.
    Kemeny,
    /// Kemeny on the crisp median cut.
    Slater,
    /// Net number of asserted arcs.
    Copeland,
    /// Net sum of characteristic values.
    NetFlows,
}

/// Settings of the Kemeny and Slater rules.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct KemenyConfig {
    /// Largest order enumerated exhaustively.
    pub order_limit: usize,
    /// Sample random permutations above the limit instead of failing.
    pub probabilistic: bool,
    /// Number of sampled permutations.
    pub sample_size: usize,
    /// Seed of the sampler.
    pub seed: Option<u64>,
}

impl Default for KemenyConfig {
    fn default() -> Self {
        Self {
            order_limit: 7,
            probabilistic: false,
            sample_size: 1000,
            seed: None,
        }
    }
}

/// A linear ranking of keys, best first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    /// The rule which produced the ranking.
    pub rule: RankingRule,
    /// Keys from the best to the worst.
    pub ranking: Vec<String>,
    /// Rule specific score of every ranked key, aligned with `ranking`.
    pub scores: Vec<Decimal>,
}

impl Ranking {
    fn from_positions(
        rule: RankingRule,
        actions: &ActionContainer,
        positions: &[usize],
        scores: Vec<Decimal>,
    ) -> Self {
        Self {
            rule,
            ranking: positions
                .iter()
                .map(|&x| actions.key(x).to_string())
                .collect(),
            scores,
        }
    }

    /// Keys from the worst to the best.
    pub fn order(&self) -> Vec<String> {
        self.ranking.iter().rev().cloned().collect()
    }

    /// 1-based rank of a key.
    pub fn rank_of(&self, key: &str) -> Option<usize> {
        self.ranking.iter().position(|k| k == key).map(|x| x + 1)
    }

    /// The crisp linear order on `[-1, 1]`, with `r(x,y) = 1` iff `x` is ranked before `y`.
    pub fn to_digraph(&self, actions: &ActionContainer) -> Result<Digraph> {
        let mut result = Digraph::with_value(
            actions.clone(),
            ValuationDomain::normalized(),
            Decimal::MINUS_ONE,
        )?;
        for (i, x) in self.ranking.iter().enumerate() {
            for y in self.ranking.iter().skip(i + 1) {
                result.set_edge_value(x, y, Decimal::ONE)?;
            }
        }
        result.set_name(format!("{}-ranking", self.rule));
        Ok(result)
    }
}

impl Digraph {
    /// Ranks the actions by the given rule; Kemeny and Slater use [KemenyConfig::default].
    pub fn ranking(&self, rule: RankingRule) -> Result<Ranking> {
        match rule {
            RankingRule::Kohler => Ok(self.kohler_ranking()),
            RankingRule::ArrowRaynaud => Ok(self.arrow_raynaud_ranking()),
            RankingRule::RankedPairs => Ok(self.ranked_pairs_ranking()),
            RankingRule::Kemeny => self.kemeny_ranking(&KemenyConfig::default()),
            RankingRule::Slater => self.slater_ranking(&KemenyConfig::default()),
            RankingRule::Copeland => Ok(self.copeland_ranking()),
            RankingRule::NetFlows => Ok(self.net_flows_ranking()),
        }
    }

    fn by_key(&self, x: usize, y: usize) -> Ordering {
        self.actions.key(x).cmp(self.actions.key(y))
    }

    /// Kohler's leximin rule; ties go to the smallest key.
    /// The score of an action is its weakest outgoing value among the actions not yet ranked.
    pub fn kohler_ranking(&self) -> Ranking {
        log::info!("[Start] Kohler ranking");
        let mut remaining: Vec<usize> = (0..self.order()).collect();
        let (mut ranked, mut scores) = (Vec::new(), Vec::new());
        while !remaining.is_empty() {
            let weakest = |x: usize| {
                remaining
                    .iter()
                    .filter(|&&y| y != x)
                    .map(|&y| self.relation[x][y])
                    .min()
                    .unwrap_or_else(|| self.domain.max())
            };
            let (slot, score) = remaining
                .iter()
                .enumerate()
                .map(|(slot, &x)| (slot, weakest(x)))
                .min_by(|&(a, sa), &(b, sb)| {
                    sb.cmp(&sa).then(self.by_key(remaining[a], remaining[b]))
                })
                .unwrap_or((0, self.domain.max()));
            let x = remaining.remove(slot);
            log::debug!("ranking {} with {}", self.actions.key(x), score);
            ranked.push(x);
            scores.push(score);
        }
        log::info!("[Done] Kohler ranking");
        Ranking::from_positions(RankingRule::Kohler, &self.actions, &ranked, scores)
    }

    /// Arrow and Raynaud's leximax rule, filled from the tail; ties send the smallest key last.
    /// The score of an action is its strongest outgoing value among the actions not yet ranked.
    pub fn arrow_raynaud_ranking(&self) -> Ranking {
        log::info!("[Start] Arrow-Raynaud ranking");
        let mut remaining: Vec<usize> = (0..self.order()).collect();
        let (mut ranked, mut scores) = (Vec::new(), Vec::new());
        while !remaining.is_empty() {
            let strongest = |x: usize| {
                remaining
                    .iter()
                    .filter(|&&y| y != x)
                    .map(|&y| self.relation[x][y])
                    .max()
                    .unwrap_or_else(|| self.domain.min())
            };
            let (slot, score) = remaining
                .iter()
                .enumerate()
                .map(|(slot, &x)| (slot, strongest(x)))
                .min_by(|&(a, sa), &(b, sb)| {
                    sa.cmp(&sb).then(self.by_key(remaining[a], remaining[b]))
                })
                .unwrap_or((0, self.domain.min()));
            let x = remaining.remove(slot);
            log::debug!("ranking {} last with {}", self.actions.key(x), score);
            ranked.push(x);
            scores.push(score);
        }
        ranked.reverse();
        scores.reverse();
        log::info!("[Done] Arrow-Raynaud ranking");
        Ranking::from_positions(RankingRule::ArrowRaynaud, &self.actions, &ranked, scores)
    }

    /// The crisp acyclic relation of the ranked pairs rule.
    ///
    /// Pairs are visited by decreasing `r(x,y)`, then by decreasing margin `r(x,y) - r(y,x)`,
    /// then in key order. A pair is inserted as `x → y` unless one of its directions is already
    /// decided or the insertion creates a circuit.
    pub fn ranked_pairs_digraph(&self) -> Digraph {
        log::info!("[Start] ranked pairs");
        let mut pairs: Vec<(usize, usize)> = self.pairs().collect();
        pairs.sort_by(|&(x1, y1), &(x2, y2)| {
            let margin = |x: usize, y: usize| self.relation[x][y] - self.relation[y][x];
            self.relation[x2][y2]
                .cmp(&self.relation[x1][y1])
                .then(margin(x2, y2).cmp(&margin(x1, y1)))
                .then(self.by_key(x1, x2))
                .then(self.by_key(y1, y2))
        });
        let domain = ValuationDomain::normalized();
        let mut result = Digraph::empty(self.actions.clone(), domain);
        result.set_name(format!("ranked-pairs-{}", self.name));
        for (x, y) in pairs {
            if result.relation[x][y] != domain.med() {
                continue;
            }
            result.relation[x][y] = domain.max();
            result.relation[y][x] = domain.min();
            result.invalidate();
            if result.detect_chordless_circuits() {
                log::trace!(
                    "skipping {} → {}",
                    self.actions.key(x),
                    self.actions.key(y)
                );
                result.relation[x][y] = domain.med();
                result.relation[y][x] = domain.med();
                result.invalidate();
            }
        }
        log::info!("[Done] ranked pairs");
        result
    }

    /// Ranked pairs rule; actions are ranked by decreasing out-degree of
    /// [ranked_pairs_digraph][Digraph::ranked_pairs_digraph], ties in key order.
    pub fn ranked_pairs_ranking(&self) -> Ranking {
        let relation = self.ranked_pairs_digraph();
        let gamma = relation.gamma();
        let mut positions: Vec<usize> = (0..self.order()).collect();
        positions.sort_by(|&x, &y| {
            gamma
                .out(y)
                .len()
                .cmp(&gamma.out(x).len())
                .then(self.by_key(x, y))
        });
        let scores = positions
            .iter()
            .map(|&x| Decimal::from_int(gamma.out(x).len() as i64))
            .collect();
        Ranking::from_positions(RankingRule::RankedPairs, &self.actions, &positions, scores)
    }

    /// Contribution `Σ_{y after x} r(x,y) - r(y,x)` of every position of a sequence.
    fn kemeny_contributions(&self, sequence: &[usize]) -> Vec<Decimal> {
        sequence
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                sequence[i + 1..]
                    .iter()
                    .map(|&y| self.relation[x][y] - self.relation[y][x])
                    .sum()
            })
            .collect()
    }

    fn kemeny_value(&self, sequence: &[usize]) -> Decimal {
        self.kemeny_contributions(sequence).into_iter().sum()
    }

    fn key_sequence_cmp(&self, first: &[usize], second: &[usize]) -> Ordering {
        first
            .iter()
            .zip(second.iter())
            .map(|(&x, &y)| self.by_key(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Kemeny rule: the permutation maximising `Σ_{i<j} r(aᵢ,aⱼ) - r(aⱼ,aᵢ)`.
    ///
    /// Orders up to `order_limit` are enumerated exhaustively and ties go to the lexicographically
    /// smallest key sequence. Larger orders are sampled when `probabilistic` is set and fail with
    /// [DigraphError::OrderLimitExceeded] otherwise.
    pub fn kemeny_ranking(&self, config: &KemenyConfig) -> Result<Ranking> {
        self.kemeny_like(RankingRule::Kemeny, config)
    }

    /// Slater rule: Kemeny on the strict crisp median cut.
    pub fn slater_ranking(&self, config: &KemenyConfig) -> Result<Ranking> {
        let cut = self.polarized(&Polarization::default().keep_values(false).strict(true))?;
        cut.kemeny_like(RankingRule::Slater, config)
    }

    fn kemeny_like(&self, rule: RankingRule, config: &KemenyConfig) -> Result<Ranking> {
        let n = self.order();
        log::info!("[Start] {} ranking of {} actions", rule, n);
        let mut start: Vec<usize> = (0..n).collect();
        start.sort_by(|&x, &y| self.by_key(x, y));
        let best = if n <= config.order_limit {
            self.exhaustive_kemeny(start)
        } else if config.probabilistic {
            log::warn!(
                "order {} exceeds {}, sampling {} permutations",
                n,
                config.order_limit,
                config.sample_size
            );
            self.sampled_kemeny(start, config)
        } else {
            return Err(DigraphError::OrderLimitExceeded {
                order: n,
                limit: config.order_limit,
            });
        };
        let scores = self.kemeny_contributions(&best);
        log::info!("[Done] {} ranking", rule);
        Ok(Ranking::from_positions(rule, &self.actions, &best, scores))
    }

    /// Visits all permutations in lexicographic order of the key sequence, so that the first
    /// maximum found is the smallest one.
    fn exhaustive_kemeny(&self, sorted: Vec<usize>) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..sorted.len()).collect();
        let sequence = |indices: &[usize]| -> Vec<usize> { indices.iter().map(|&i| sorted[i]).collect() };
        let mut best = sorted.clone();
        let mut best_value = self.kemeny_value(&best);
        while next_permutation(&mut indices) {
            let candidate = sequence(&indices);
            let value = self.kemeny_value(&candidate);
            if value > best_value {
                best_value = value;
                best = candidate;
            }
        }
        log::debug!("exhaustive Kemeny value {}", best_value);
        best
    }

    fn sampled_kemeny(&self, mut sequence: Vec<usize>, config: &KemenyConfig) -> Vec<usize> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut best = sequence.clone();
        let mut best_value = self.kemeny_value(&sequence);
        for _ in 0..config.sample_size {
            sequence.shuffle(&mut rng);
            let value = self.kemeny_value(&sequence);
            if value > best_value
                || (value == best_value && self.key_sequence_cmp(&sequence, &best).is_lt())
            {
                best_value = value;
                best = sequence.clone();
            }
        }
        log::debug!("sampled Kemeny value {}", best_value);
        best
    }

    /// Copeland rule: number of asserted outgoing minus incoming arcs, ties in key order.
    pub fn copeland_ranking(&self) -> Ranking {
        let gamma = self.gamma();
        self.score_ranking(RankingRule::Copeland, |x| {
            Decimal::from_int(gamma.out(x).len() as i64 - gamma.incoming(x).len() as i64)
        })
    }

    /// Net flows rule: `Σ_y r(x,y) - r(y,x)`, ties in key order.
    pub fn net_flows_ranking(&self) -> Ranking {
        self.score_ranking(RankingRule::NetFlows, |x| {
            (0..self.order())
                .filter(|&y| y != x)
                .map(|y| self.relation[x][y] - self.relation[y][x])
                .sum()
        })
    }

    fn score_ranking<F>(&self, rule: RankingRule, score: F) -> Ranking
    where
        F: Fn(usize) -> Decimal,
    {
        let scores: Vec<Decimal> = (0..self.order()).map(score).collect();
        let mut positions: Vec<usize> = (0..self.order()).collect();
        positions.sort_by(|&x, &y| scores[y].cmp(&scores[x]).then(self.by_key(x, y)));
        let ranked_scores = positions.iter().map(|&x| scores[x]).collect();
        Ranking::from_positions(rule, &self.actions, &positions, ranked_scores)
    }

    /// The set of the first `k` actions of a ranking, as positions.
    pub fn ranking_head(&self, ranking: &Ranking, k: usize) -> Result<RoaringBitmap> {
        self.actions
            .choice(ranking.ranking.iter().take(k).map(String::as_str))
    }
}

/// Rearranges into the next lexicographically greater permutation; false after the last one.
fn next_permutation(sequence: &mut [usize]) -> bool {
    let n = sequence.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && sequence[i - 1] >= sequence[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while sequence[j] <= sequence[i - 1] {
        j -= 1;
    }
    sequence.swap(i - 1, j);
    sequence[i..].reverse();
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        random::random_tournament,
        test::{crisp, valued},
    };
    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn cycle() -> Digraph {
        crisp(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")])
    }

    fn chain() -> Digraph {
        valued(
            &["a", "b", "c", "d"],
            &[
                ("b", "a", 800_000),
                ("a", "b", -800_000),
                ("a", "c", 600_000),
                ("c", "a", -200_000),
                ("b", "c", 700_000),
                ("c", "b", -700_000),
                ("c", "d", 500_000),
                ("d", "c", -500_000),
                ("a", "d", 900_000),
                ("b", "d", 900_000),
            ],
        )
    }

    #[test]
    fn kohler_on_cycle() {
        let ranking = cycle().kohler_ranking();
        assert_eq!(ranking.ranking, vec!["a", "b", "c"]);
        assert_eq!(ranking.rank_of("b"), Some(2));
        assert_eq!(ranking.order(), vec!["c", "b", "a"]);
        assert_eq!(ranking.scores[0], Decimal::MINUS_ONE);
        assert_eq!(ranking.scores[2], Decimal::ONE);
    }

    #[test]
    fn arrow_raynaud_on_cycle() {
        let ranking = cycle().arrow_raynaud_ranking();
        // all three tie at the first step, so the smallest key goes last
        assert_eq!(ranking.ranking, vec!["b", "c", "a"]);
        assert_eq!(ranking.scores[2], Decimal::ONE);
        assert_eq!(ranking.rule, RankingRule::ArrowRaynaud);
    }

    #[test]
    fn rules_agree_on_a_chain() {
        let digraph = chain();
        for rule in [
            RankingRule::Kohler,
            RankingRule::ArrowRaynaud,
            RankingRule::RankedPairs,
            RankingRule::Kemeny,
            RankingRule::Slater,
            RankingRule::Copeland,
            RankingRule::NetFlows,
        ] {
            let ranking = digraph.ranking(rule).unwrap();
            assert_eq!(ranking.ranking, vec!["b", "a", "c", "d"], "{}", rule);
        }
    }

    #[test]
    fn rule_names() {
        assert_eq!("ranked-pairs".parse::<RankingRule>(), Ok(RankingRule::RankedPairs));
        assert_eq!(RankingRule::ArrowRaynaud.to_string(), "arrow-raynaud");
        assert!("borda".parse::<RankingRule>().is_err());
    }

    #[test]
    fn ranked_pairs_break_cycles() {
        let relation = cycle().ranked_pairs_digraph();
        assert!(!relation.detect_chordless_circuits());
        assert_eq!(relation.value("a", "b"), Ok(Decimal::ONE));
        assert_eq!(relation.value("b", "c"), Ok(Decimal::ONE));
        assert_eq!(relation.value("c", "a"), Ok(Decimal::MINUS_ONE));
        assert_eq!(cycle().ranked_pairs_ranking().ranking, vec!["a", "b", "c"]);
    }

    #[test]
    fn kemeny_limits() {
        let digraph = chain();
        let config = KemenyConfig {
            order_limit: 3,
            ..Default::default()
        };
        assert_eq!(
            digraph.kemeny_ranking(&config),
            Err(DigraphError::OrderLimitExceeded { order: 4, limit: 3 })
        );
        let sampled = digraph
            .kemeny_ranking(&KemenyConfig {
                probabilistic: true,
                seed: Some(7),
                ..config
            })
            .unwrap();
        assert_eq!(sampled.ranking, vec!["b", "a", "c", "d"]);
        let ties = cycle().kemeny_ranking(&KemenyConfig::default()).unwrap();
        assert_eq!(ties.ranking, vec!["a", "b", "c"]);
        assert_eq!(ties.scores.iter().copied().sum::<Decimal>(), Decimal::from_int(2));
    }

    #[test]
    fn linear_order_digraph() {
        let digraph = chain();
        let ranking = digraph.kohler_ranking();
        let order = ranking.to_digraph(digraph.actions()).unwrap();
        assert_eq!(order.value("b", "d"), Ok(Decimal::ONE));
        assert_eq!(order.value("d", "b"), Ok(Decimal::MINUS_ONE));
        assert_eq!(order.size(), 6);
        assert_eq!(
            digraph.ranking_head(&ranking, 2).unwrap(),
            digraph.actions().choice(["a", "b"]).unwrap()
        );
    }

    #[test]
    fn permutations() {
        let mut sequence = vec![0, 1, 2];
        let mut count = 1;
        while next_permutation(&mut sequence) {
            count += 1;
        }
        assert_eq!(count, 6);
        assert_eq!(sequence, vec![2, 1, 0]);
    }

    #[quickcheck]
    fn ranked_pairs_are_acyclic(seed: u64) -> bool {
        !random_tournament(6, seed)
            .ranked_pairs_digraph()
            .detect_chordless_circuits()
    }

    #[quickcheck]
    fn kemeny_equals_slater_on_tournaments(seed: u64) -> bool {
        let tournament = random_tournament(5, seed);
        let config = KemenyConfig::default();
        match (
            tournament.kemeny_ranking(&config),
            tournament.slater_ranking(&config),
        ) {
            (Ok(kemeny), Ok(slater)) => kemeny.ranking == slater.ranking,
            _ => false,
        }
    }
}
