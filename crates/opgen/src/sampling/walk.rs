//! One random walk, independent of direction.
//!
//! A step draws applicable operators in random order without replacement and
//! keeps the first usable candidate. With a bias function every candidate is
//! scored and one is chosen by score. Undo steps (back to the node two steps
//! ago) are only taken when nothing else is available, if configured.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::task::OperatorId;

/// Knobs of a single walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkCfg {
    /// Prefer candidates that differ from the node two steps back.
    pub deprioritize_undoing_steps: bool,
    /// Sample proportionally to bias (`true`) or uniformly among the maximum.
    pub probabilistic_bias: bool,
    /// Weight `adapt^(b - b_current)` instead of `b` in probabilistic mode.
    pub adapt_bias: Option<f64>,
}

impl Default for WalkCfg {
    fn default() -> Self {
        Self {
            deprioritize_undoing_steps: false,
            probabilistic_bias: true,
            adapt_bias: None,
        }
    }
}

/// Optional callbacks evaluated on candidate nodes.
pub struct WalkHooks<'h, N> {
    pub is_dead_end: Option<&'h dyn Fn(&N) -> bool>,
    pub is_valid: Option<&'h dyn Fn(&N) -> bool>,
    pub bias: Option<&'h dyn Fn(&N) -> f64>,
}

impl<N> Default for WalkHooks<'_, N> {
    fn default() -> Self {
        Self {
            is_dead_end: None,
            is_valid: None,
            bias: None,
        }
    }
}

impl<N> Clone for WalkHooks<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for WalkHooks<'_, N> {}

impl<'h, N> WalkHooks<'h, N> {
    pub fn with_dead_end(mut self, f: &'h dyn Fn(&N) -> bool) -> Self {
        self.is_dead_end = Some(f);
        self
    }

    pub fn with_valid(mut self, f: &'h dyn Fn(&N) -> bool) -> Self {
        self.is_valid = Some(f);
        self
    }

    pub fn with_bias(mut self, f: &'h dyn Fn(&N) -> f64) -> Self {
        self.bias = Some(f);
        self
    }

    fn dead_end(&self, node: &N) -> bool {
        self.is_dead_end.is_some_and(|f| f(node))
    }

    fn usable(&self, node: &N) -> bool {
        self.is_valid.map_or(true, |f| f(node)) && !self.dead_end(node)
    }

    fn score(&self, node: &N) -> f64 {
        self.bias.map_or(1.0, |f| f(node))
    }
}

/// The graph a walk moves through.
pub(crate) trait WalkSpace {
    type Node: Clone + PartialEq;

    fn applicable(&self, node: &Self::Node, out: &mut Vec<OperatorId>);

    /// Node reached from `node` through `op`; `op` is applicable.
    fn candidate(&self, node: &Self::Node, op: OperatorId) -> Self::Node;
}

struct Cursor<N> {
    current: N,
    previous: N,
    pre_previous: N,
    current_bias: f64,
}

/// Walk up to `length` steps from `start` and return the last node.
///
/// A stuck walk restarts from `start` if its current node is a dead end and
/// stops otherwise.
pub(crate) fn random_walk<S, R>(
    space: &S,
    start: &S::Node,
    length: usize,
    cfg: &WalkCfg,
    hooks: &WalkHooks<'_, S::Node>,
    rng: &mut R,
) -> S::Node
where
    S: WalkSpace,
    R: Rng,
{
    let initial_bias = hooks.score(start);
    let mut cursor = Cursor {
        current: start.clone(),
        previous: start.clone(),
        pre_previous: start.clone(),
        current_bias: initial_bias,
    };
    let mut ops = Vec::new();
    for _ in 0..length {
        if step(space, &mut cursor, cfg, hooks, rng, &mut ops) {
            continue;
        }
        if hooks.dead_end(&cursor.current) {
            cursor.current = start.clone();
            cursor.current_bias = initial_bias;
        } else {
            break;
        }
    }
    cursor.current
}

/// Advance one step. Returns `false` (leaving `current` in place) if no
/// usable candidate exists.
fn step<S, R>(
    space: &S,
    cursor: &mut Cursor<S::Node>,
    cfg: &WalkCfg,
    hooks: &WalkHooks<'_, S::Node>,
    rng: &mut R,
    ops: &mut Vec<OperatorId>,
) -> bool
where
    S: WalkSpace,
    R: Rng,
{
    cursor.pre_previous = std::mem::replace(&mut cursor.previous, cursor.current.clone());
    ops.clear();
    space.applicable(&cursor.previous, ops);

    let biased = hooks.bias.is_some();
    let mut candidates: Vec<S::Node> = Vec::new();
    let mut scores: Vec<f64> = Vec::new();
    let mut best: Option<f64> = None;
    let mut found_non_reversing = false;
    while !ops.is_empty() {
        // Biased walks score everything, so the draw order does not matter.
        let idx = if biased { 0 } else { rng.gen_range(0..ops.len()) };
        let op = ops.remove(idx);
        let candidate = space.candidate(&cursor.previous, op);
        if !hooks.usable(&candidate) {
            continue;
        }

        let non_reversing = !cfg.deprioritize_undoing_steps || candidate != cursor.pre_previous;
        if found_non_reversing && !non_reversing {
            continue;
        }
        if non_reversing && !found_non_reversing {
            candidates.clear();
            scores.clear();
            best = None;
            found_non_reversing = true;
        }

        let score = hooks.score(&candidate);
        if !cfg.probabilistic_bias {
            match best {
                Some(b) if score < b => continue,
                Some(b) if score == b => {}
                _ => {
                    candidates.clear();
                    scores.clear();
                    best = Some(score);
                }
            }
        }
        candidates.push(candidate);
        scores.push(score);

        if non_reversing && !biased {
            break;
        }
    }

    let Some(index) = choose(cfg, cursor.current_bias, &scores, rng) else {
        return false;
    };
    cursor.current_bias = scores[index];
    cursor.current = candidates.swap_remove(index);
    true
}

fn choose<R: Rng>(cfg: &WalkCfg, current_bias: f64, scores: &[f64], rng: &mut R) -> Option<usize> {
    match scores.len() {
        0 => None,
        1 => Some(0),
        n if cfg.probabilistic_bias => {
            let weights: Vec<f64> = match cfg.adapt_bias {
                Some(adapt) if adapt > 0.0 => scores
                    .iter()
                    .map(|&b| adapt.powf(b - current_bias))
                    .collect(),
                _ => scores.to_vec(),
            };
            // All-zero or negative weights: fall back to the last candidate.
            Some(
                WeightedIndex::new(&weights)
                    .map(|dist| dist.sample(rng))
                    .unwrap_or(n - 1),
            )
        }
        n => Some(rng.gen_range(0..n)),
    }
}

/// Upper bound on the Bernoulli trials of `walk_length`.
pub const MAX_WALK_TRIALS: usize = 1 << 20;

/// Walk length for an estimated solution cost `init_h`.
///
/// `n = 4 * round(init_h / average_cost)` trials (10 if `init_h` is zero),
/// each adding one step with probability 1/2, so the expected length is twice
/// the estimated number of steps. `n` is capped at `MAX_WALK_TRIALS`.
pub fn walk_length<R: Rng>(init_h: u64, average_cost: f64, rng: &mut R) -> usize {
    let n = if init_h == 0 || average_cost <= 0.0 {
        10
    } else {
        // Float-to-int `as` saturates, so only the multiplication can overflow.
        let steps = (init_h as f64 / average_cost).round() as usize;
        steps.saturating_mul(4).min(MAX_WALK_TRIALS)
    };
    (0..n).filter(|_| rng.gen_bool(0.5)).count()
}
