//! Crossing minimization by rank reordering.
//!
//! Reorders the nodes within each level of a [`RankView`] to reduce the number of
//! straight-line edge crossings between adjacent levels. The heuristic alternates
//! weighted-median sorting with adjacent-pair transposition and keeps the best
//! order found.

use std::cmp::Ordering;

use derive_builder::Builder;
use lnir::{NodeId, RankView};
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

use crate::Result;

/// The largest number of transposition sweeps per call to the transpose step.
const MAX_TRANSPOSE_ITERATIONS: usize = 1000;

/// Median value of a node without neighbors on the adjacent level.
const NO_NEIGHBORS: f64 = -1.0;

/// Parameters of the crossing minimizer.
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", default)]
#[serde(default)]
pub struct MincrossParams {
    /// Do not reorder the primary inputs.
    pub fixed_pis: bool,
    /// Reorder the network. If unset, only the current number of crossings is reported.
    pub optimize: bool,
    /// The largest number of iterations of the final search phase.
    pub max_iter: usize,
    /// The number of iterations without sufficient improvement after which a phase stops.
    pub min_quit: usize,
    /// An improvement counts as sufficient if the new count is below
    /// `convergence` times the best count so far.
    pub convergence: f64,
    /// The largest number of iterations of the initialization and refinement phases.
    pub init_refine_max_iters: usize,
}

impl Default for MincrossParams {
    fn default() -> Self {
        Self {
            fixed_pis: false,
            optimize: true,
            max_iter: 24,
            min_quit: 8,
            convergence: 0.995,
            init_refine_max_iters: 4,
        }
    }
}

impl MincrossParams {
    /// Creates a new [`MincrossParamsBuilder`].
    pub fn builder() -> MincrossParamsBuilder {
        Default::default()
    }
}

/// Statistics of a crossing minimization run.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct MincrossStats {
    /// The number of crossings in the final rank order.
    pub num_crossings: u64,
}

/// Counts the edge crossings between adjacent levels in the current rank order.
///
/// Only edges connecting adjacent levels are considered.
pub fn count_crossings(view: &RankView) -> u64 {
    let mut total = 0;
    for r in 0..view.depth() {
        let mut penalty = vec![0u64; view.rank_width(r + 1) + 1];
        let mut max_pos = 0;
        for node in view.rank(r) {
            let targets = neighbor_positions(view, *node, r + 1);
            for pos in targets.iter() {
                total += penalty[pos + 1..=max_pos.max(*pos)].iter().sum::<u64>();
            }
            for pos in targets {
                max_pos = max_pos.max(pos);
                penalty[pos] += 1;
            }
        }
    }
    total
}

/// Minimizes crossings by reordering the ranks of `view` in place.
///
/// If [`MincrossParams::optimize`] is unset, the view is left unchanged
/// and the current number of crossings is reported.
pub fn mincross(view: &mut RankView, params: &MincrossParams) -> Result<MincrossStats> {
    let _guard = span!(Level::INFO, "minimizing crossings", depth = view.depth()).entered();
    if !params.optimize || view.depth() == 0 {
        return Ok(MincrossStats {
            num_crossings: count_crossings(view),
        });
    }
    Minimizer::new(view, params).run()
}

struct Minimizer<'a> {
    view: &'a mut RankView,
    params: &'a MincrossParams,
}

impl<'a> Minimizer<'a> {
    fn new(view: &'a mut RankView, params: &'a MincrossParams) -> Self {
        Self { view, params }
    }

    fn run(mut self) -> Result<MincrossStats> {
        let mut cur = count_crossings(self.view);
        let mut best = cur;
        let mut best_ranks = self.view.all_ranks();
        tracing::event!(Level::DEBUG, crossings = cur, "initial rank order");

        for pass in 0..=2 {
            let max_this_pass = if pass <= 1 {
                self.params.init_refine_max_iters.min(self.params.max_iter)
            } else {
                self.params.max_iter
            };
            let mut trying = 0;
            for iter in 0..max_this_pass {
                if trying >= self.params.min_quit || cur == 0 {
                    break;
                }
                trying += 1;
                self.step(iter);
                cur = count_crossings(self.view);
                if cur <= best {
                    best_ranks = self.view.all_ranks();
                    if (cur as f64) < self.params.convergence * best as f64 {
                        trying = 0;
                    }
                    best = cur;
                }
            }
            self.view.set_all_ranks(best_ranks.clone())?;
            tracing::event!(Level::DEBUG, pass, best, "finished pass");
            if cur == 0 {
                break;
            }
        }

        if best > 0 {
            self.transpose(false);
            cur = count_crossings(self.view);
            if cur < best {
                best_ranks = self.view.all_ranks();
            }
            self.view.set_all_ranks(best_ranks)?;
        }

        let num_crossings = count_crossings(self.view);
        if num_crossings > 0 {
            tracing::event!(Level::DEBUG, num_crossings, "crossings remain after minimization");
        }
        Ok(MincrossStats { num_crossings })
    }

    fn step(&mut self, iter: usize) {
        let ascending = iter % 4 < 2;
        let depth = self.view.depth();
        if iter % 2 == 0 {
            for r in 1..=depth {
                self.reorder(r, r - 1, ascending);
            }
        } else {
            let lowest = if self.params.fixed_pis { 1 } else { 0 };
            for r in (lowest..depth).rev() {
                self.reorder(r, r + 1, ascending);
            }
        }
        self.transpose(!ascending);
    }

    /// Sorts `level` by the medians of its nodes' neighbors on `adjacent`.
    fn reorder(&mut self, level: u32, adjacent: u32, ascending: bool) {
        let mut medians = vec![NO_NEIGHBORS; self.view.size()];
        for node in self.view.rank(level) {
            let positions = neighbor_positions(self.view, *node, adjacent);
            medians[node.index()] = median_value(&positions);
        }
        self.view.sort_rank_by(level, |a, b| {
            compare_medians(medians[a.index()], medians[b.index()], ascending)
        });
    }

    fn transpose(&mut self, reverse: bool) {
        let depth = self.view.depth();
        let mut candidate = vec![true; depth as usize + 1];
        let mut delta = 1;
        let mut iterations = 0;
        while delta >= 1 && iterations < MAX_TRANSPOSE_ITERATIONS {
            iterations += 1;
            delta = 0;
            for r in 0..=depth {
                if r == 0 && self.params.fixed_pis {
                    continue;
                }
                if candidate[r as usize] {
                    let d = self.transpose_step(r, reverse);
                    delta += d;
                    candidate[r as usize] = d > 0;
                }
            }
        }
    }

    fn transpose_step(&mut self, r: u32, reverse: bool) -> u64 {
        let depth = self.view.depth();
        let mut delta = 0;
        for i in 0..self.view.rank_width(r).saturating_sub(1) {
            let v = self.view.at_rank_position(r, i);
            let w = self.view.at_rank_position(r, i + 1);
            let (mut c0, mut c1) = (0, 0);
            if r > 0 {
                let (pv, pw) = (
                    neighbor_positions(self.view, v, r - 1),
                    neighbor_positions(self.view, w, r - 1),
                );
                c0 += pair_crossings(&pv, &pw);
                c1 += pair_crossings(&pw, &pv);
            }
            if r < depth {
                let (pv, pw) = (
                    neighbor_positions(self.view, v, r + 1),
                    neighbor_positions(self.view, w, r + 1),
                );
                c0 += pair_crossings(&pv, &pw);
                c1 += pair_crossings(&pw, &pv);
            }
            if c1 < c0 || (c0 > 0 && reverse && c1 == c0) {
                // Same level by construction.
                if self.view.swap(v, w).is_ok() {
                    delta += c0 - c1;
                }
            }
        }
        delta
    }
}

/// The rank positions of the neighbors of `node` on `level`, in ascending order.
fn neighbor_positions(view: &RankView, node: NodeId, level: u32) -> Vec<usize> {
    let node_level = view.level(node);
    let neighbors = if level + 1 == node_level {
        view.fanins(node)
    } else if level == node_level + 1 {
        view.fanouts(node)
    } else {
        &[]
    };
    let mut positions: Vec<usize> = neighbors
        .iter()
        .filter(|n| view.level(**n) == level)
        .map(|n| view.rank_position(*n))
        .collect();
    positions.sort_unstable();
    positions
}

/// The number of crossings between the edges of a left node ending at `left`
/// and the edges of a right node ending at `right`.
fn pair_crossings(left: &[usize], right: &[usize]) -> u64 {
    left.iter()
        .map(|x| right.iter().filter(|y| x > y).count() as u64)
        .sum()
}

/// The weighted median of sorted neighbor positions.
///
/// Returns `-1` if there are no neighbors. For an even number of neighbors,
/// the two central positions are interpolated, weighted by the spread of the
/// positions on the opposite side.
pub(crate) fn median_value(positions: &[usize]) -> f64 {
    let p: Vec<f64> = positions.iter().map(|p| *p as f64).collect();
    let n = p.len();
    match n {
        0 => NO_NEIGHBORS,
        1 => p[0],
        2 => (p[0] + p[1]) / 2.0,
        _ if n % 2 == 1 => p[n / 2],
        _ => {
            let (lm, rm) = (n / 2 - 1, n / 2);
            let lspan = p[lm] - p[0];
            let rspan = p[n - 1] - p[rm];
            if lspan == rspan {
                (p[lm] + p[rm]) / 2.0
            } else {
                (p[lm] * rspan + p[rm] * lspan) / (lspan + rspan)
            }
        }
    }
}

/// Orders medians ascending or descending. Nodes without neighbors sort last.
fn compare_medians(a: f64, b: f64, ascending: bool) -> Ordering {
    match (a < 0.0, b < 0.0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if ascending => a.total_cmp(&b),
        (false, false) => b.total_cmp(&a),
    }
}
