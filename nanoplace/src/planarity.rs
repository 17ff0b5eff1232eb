//! Planarity of rank orders.

use lnir::RankView;
use tracing::Level;

use crate::{Error, Result};

/// Returns `true` if no two edges between adjacent levels cross in the current rank order.
///
/// Every fanin of every node must lie exactly one level above it.
/// Otherwise, [`Error::UnbalancedNetwork`] is returned.
pub fn check_planarity(view: &RankView) -> Result<bool> {
    for node in view.nodes() {
        for fanin in view.fanins(node) {
            if view.level(*fanin) + 1 != view.level(node) {
                return Err(Error::UnbalancedNetwork {
                    node,
                    fanin: *fanin,
                });
            }
        }
    }

    for level in 1..view.num_levels() as u32 {
        // Largest fanin position consumed by the nodes seen so far on this level.
        let mut max_consumed: Option<usize> = None;
        for node in view.rank(level) {
            let positions: Vec<usize> = view
                .sorted_by_rank(view.fanins(*node))
                .iter()
                .map(|n| view.rank_position(*n))
                .collect();
            if let (Some(first), Some(max)) = (positions.first(), max_consumed) {
                if *first < max {
                    tracing::event!(Level::DEBUG, %node, level, "edge crossing found");
                    return Ok(false);
                }
            }
            if let Some(last) = positions.last() {
                max_consumed = Some(max_consumed.map_or(*last, |m| m.max(*last)));
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use lnir::Network;
    use test_log::test;

    use super::*;

    fn two_levels(crossed: bool) -> RankView {
        let mut ntk = Network::new();
        let a = ntk.create_pi("a");
        let b = ntk.create_pi("b");
        let (na, nb) = if crossed {
            let nb = ntk.create_not(b);
            (ntk.create_not(a), nb)
        } else {
            let na = ntk.create_not(a);
            (na, ntk.create_not(b))
        };
        let f = ntk.create_and(na, nb);
        ntk.create_po(f, "f");
        RankView::new(ntk)
    }

    #[test]
    fn crossed_predecessors_are_not_planar() {
        assert!(!check_planarity(&two_levels(true)).unwrap());
        assert!(check_planarity(&two_levels(false)).unwrap());
    }

    #[test]
    fn shared_fanins_are_planar() {
        let mut ntk = Network::new();
        let a = ntk.create_pi("a");
        let b = ntk.create_pi("b");
        let c = ntk.create_pi("c");
        let f = ntk.create_and(a, b);
        let g = ntk.create_or(b, c);
        ntk.create_po(f, "f");
        ntk.create_po(g, "g");
        assert!(check_planarity(&RankView::new(ntk)).unwrap());
    }

    #[test]
    fn unbalanced_networks_are_rejected() {
        let mut ntk = Network::new();
        let a = ntk.create_pi("a");
        let b = ntk.create_pi("b");
        let ba = ntk.create_buf(a);
        let f = ntk.create_and(ba, b);
        ntk.create_po(f, "f");
        assert_eq!(
            check_planarity(&RankView::new(ntk)),
            Err(Error::UnbalancedNetwork { node: f, fanin: b })
        );
    }
}
