/*!
Chordless circuit enumeration.

The search follows the degree-labelling scheme of Dias, Castonguay, Longo, and Jradi:
vertices are labelled by repeatedly removing one of minimal remaining degree, every chordless
circuit is rooted at its vertex of smallest label, and it is grown from an initial triple
`(x, u, y)` with the help of a per-vertex `blocked` counter which forbids chords.
All state lives in the [ChordlessCircuits] iterator; the path extension uses an explicit stack.
*/
use super::Digraph;
use crate::datatypes::{ActionContainer, Decimal};
use roaring::RoaringBitmap;
use std::collections::{HashSet, VecDeque};

/// A chordless circuit, as ordered path and as set of action positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    path: Vec<usize>,
    set: RoaringBitmap,
}

impl Circuit {
    pub(crate) fn new(path: Vec<usize>) -> Self {
        let set = path.iter().map(|&x| x as u32).collect();
        Self { path, set }
    }

    /// Positions in circuit order; the last one links back to the first one.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Positions as set.
    pub fn set(&self) -> &RoaringBitmap {
        &self.set
    }

    /// Length of the circuit.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Always false, a circuit has at least three vertices.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns true for circuits of odd length.
    pub fn is_odd(&self) -> bool {
        self.path.len() % 2 == 1
    }

    /// Consecutive pairs of the circuit, including the closing one.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.path
            .iter()
            .zip(self.path.iter().cycle().skip(1))
            .map(|(&x, &y)| (x, y))
    }

    /// Keys of the circuit in path order.
    pub fn keys(&self, actions: &ActionContainer) -> Vec<String> {
        self.path
            .iter()
            .map(|&x| actions.key(x).to_string())
            .collect()
    }
}

#[derive(Debug)]
struct Frame {
    path: Vec<usize>,
    candidates: Vec<usize>,
    next: usize,
}

/// Lazy enumeration of chordless circuits (resp. cycles of an undirected graph).
///
/// Circuits are reported once per vertex set.
#[derive(Debug)]
pub struct ChordlessCircuits {
    successors: Vec<RoaringBitmap>,
    adjacent: Vec<RoaringBitmap>,
    labelling: Vec<usize>,
    blocked: Vec<usize>,
    triplets: VecDeque<(usize, usize, usize)>,
    found: VecDeque<Circuit>,
    stack: Vec<Frame>,
    root: Option<usize>,
    seen: HashSet<Vec<u32>>,
}

impl ChordlessCircuits {
    /// Directed circuits along `successors`; a pair is a chord if it is linked in either direction.
    pub(crate) fn directed(successors: Vec<RoaringBitmap>) -> Self {
        let mut predecessors = vec![RoaringBitmap::new(); successors.len()];
        for (x, out) in successors.iter().enumerate() {
            for y in out {
                predecessors[y as usize].insert(x as u32);
            }
        }
        let adjacent = successors
            .iter()
            .zip(predecessors.iter())
            .map(|(out, inc)| out | inc)
            .collect();
        Self::build(successors, predecessors, adjacent, true, true)
    }

    /// Undirected cycles of a symmetric neighbourhood; triangles only if `cycle3` is set.
    pub(crate) fn undirected(neighbours: Vec<RoaringBitmap>, cycle3: bool) -> Self {
        Self::build(
            neighbours.clone(),
            neighbours.clone(),
            neighbours,
            false,
            cycle3,
        )
    }

    fn build(
        successors: Vec<RoaringBitmap>,
        predecessors: Vec<RoaringBitmap>,
        adjacent: Vec<RoaringBitmap>,
        directed: bool,
        cycle3: bool,
    ) -> Self {
        let labelling = Self::degree_labelling(&adjacent);
        log::trace!("degree labelling {:?}", labelling);
        let mut triplets = VecDeque::new();
        let mut found = VecDeque::new();
        for u in 0..successors.len() {
            for x in predecessors[u].iter().map(|x| x as usize) {
                if labelling[x] <= labelling[u] {
                    continue;
                }
                for y in successors[u].iter().map(|y| y as usize) {
                    if y == x
                        || labelling[y] <= labelling[u]
                        || (!directed && labelling[y] <= labelling[x])
                    {
                        continue;
                    }
                    if adjacent[x].contains(y as u32) {
                        if cycle3 && successors[y].contains(x as u32) {
                            found.push_back(Circuit::new(vec![x, u, y]));
                        }
                    } else {
                        triplets.push_back((x, u, y));
                    }
                }
            }
        }
        log::debug!(
            "{} initial triplets, {} triangles",
            triplets.len(),
            found.len()
        );
        let n = successors.len();
        Self {
            successors,
            adjacent,
            labelling,
            blocked: vec![0; n],
            triplets,
            found,
            stack: Vec::new(),
            root: None,
            seen: HashSet::new(),
        }
    }

    /// Repeatedly labels a vertex of minimal remaining degree; ties go to the smaller position.
    fn degree_labelling(adjacent: &[RoaringBitmap]) -> Vec<usize> {
        let n = adjacent.len();
        let mut degree: Vec<usize> = adjacent.iter().map(|set| set.len() as usize).collect();
        let mut labelled = vec![false; n];
        let mut labelling = vec![0; n];
        for label in 1..=n {
            let next = (0..n)
                .filter(|&v| !labelled[v])
                .min_by_key(|&v| (degree[v], v));
            if let Some(v) = next {
                labelled[v] = true;
                labelling[v] = label;
                for w in adjacent[v].iter().map(|w| w as usize) {
                    if !labelled[w] {
                        degree[w] = degree[w].saturating_sub(1);
                    }
                }
            }
        }
        labelling
    }

    fn block(&mut self, v: usize) {
        for w in self.adjacent[v].iter() {
            self.blocked[w as usize] += 1;
        }
    }

    fn unblock(&mut self, v: usize) {
        for w in self.adjacent[v].iter() {
            let count = &mut self.blocked[w as usize];
            *count = count.saturating_sub(1);
        }
    }

    fn frame(&self, path: Vec<usize>) -> Frame {
        let tail = path[path.len() - 1];
        Frame {
            candidates: self.successors[tail].iter().map(|v| v as usize).collect(),
            path,
            next: 0,
        }
    }

    fn is_new(&mut self, circuit: &Circuit) -> bool {
        self.seen.insert(circuit.set().iter().collect())
    }

    /// Advances the search until the next circuit is certified.
    fn search(&mut self) -> Option<Circuit> {
        loop {
            if self.stack.is_empty() {
                if let Some(root) = self.root.take() {
                    self.unblock(root);
                }
                let (x, u, y) = self.triplets.pop_front()?;
                log::trace!("visiting triplet ({x}, {u}, {y})");
                self.root = Some(u);
                self.block(u);
                self.block(y);
                let frame = self.frame(vec![x, u, y]);
                self.stack.push(frame);
                continue;
            }
            let root = self.root?;
            let top = self.stack.len() - 1;
            let frame = &mut self.stack[top];
            if frame.next >= frame.candidates.len() {
                let tail = frame.path[frame.path.len() - 1];
                self.stack.pop();
                self.unblock(tail);
                continue;
            }
            let v = frame.candidates[frame.next];
            frame.next += 1;
            if self.labelling[v] <= self.labelling[root] || self.blocked[v] != 1 {
                continue;
            }
            let head = frame.path[0];
            let mut path = frame.path.clone();
            path.push(v);
            if self.adjacent[head].contains(v as u32) {
                if self.successors[v].contains(head as u32) {
                    return Some(Circuit::new(path));
                }
            } else {
                self.block(v);
                let frame = self.frame(path);
                self.stack.push(frame);
            }
        }
    }
}

impl Iterator for ChordlessCircuits {
    type Item = Circuit;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let circuit = match self.found.pop_front() {
                Some(circuit) => circuit,
                None => self.search()?,
            };
            if self.is_new(&circuit) {
                return Some(circuit);
            }
        }
    }
}

impl Digraph {
    /// Lazy enumeration of the chordless circuits of the strict median cut, triangles included.
    pub fn chordless_circuits(&self) -> ChordlessCircuits {
        let gamma = self.gamma();
        ChordlessCircuits::directed((0..self.order()).map(|x| gamma.out(x).clone()).collect())
    }

    /// All chordless circuits, resp. only the odd ones.
    /// The full enumeration is cached until the relation changes.
    pub fn compute_chordless_circuits(&self, odd: bool) -> Vec<Circuit> {
        let circuits = self.cache.circuits.get_or_init(|| {
            log::info!("[Start] chordless circuits of {}", self.name);
            let result: Vec<Circuit> = self.chordless_circuits().collect();
            for circuit in result.iter() {
                log::debug!("chordless circuit {:?}", circuit.keys(&self.actions));
            }
            log::info!("[Done] {} chordless circuits", result.len());
            result
        });
        circuits
            .iter()
            .filter(|circuit| !odd || circuit.is_odd())
            .cloned()
            .collect()
    }

    /// Returns true if the strict median cut contains any chordless circuit.
    pub fn detect_chordless_circuits(&self) -> bool {
        match self.cache.circuits.get() {
            Some(circuits) => !circuits.is_empty(),
            None => self.chordless_circuits().next().is_some(),
        }
    }

    /// Smallest cut level whose strict polarization breaks every given circuit:
    /// `max_c min_{(x,y) ∈ c} max(r(x,y), ¬r(y,x))`.
    /// Returns [None] for an empty list.
    pub fn minimum_elimination_level(&self, circuits: &[Circuit]) -> Option<Decimal> {
        circuits
            .iter()
            .filter_map(|circuit| {
                circuit
                    .arcs()
                    .map(|(x, y)| {
                        self.relation[x][y].max(self.domain.negate(self.relation[y][x]))
                    })
                    .min()
            })
            .max()
    }
}
