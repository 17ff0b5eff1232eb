//! Routing offsets of a level.

/// Computes the eastward and southward offsets of every node of a level.
///
/// `new_lines` holds the routing lines opened by each node in rank order.
/// `two_input` lists the rank positions of the two-input nodes in ascending order,
/// and `two_input_gaps` the number of rows between the two predecessors of each.
///
/// The level is split into clusters at the two-input nodes. Offsets accumulate
/// within a cluster; leftover spacing is passed on to the following clusters
/// and back to the preceding ones. Finally, every node is padded so that all
/// routing paths of the level end on the same diagonal.
///
/// # Example
///
/// ```
/// # use nanoplace::plane::compute_wiring;
/// let (x, y) = compute_wiring(&[0, 1, 0, 1], &[], &[]);
/// assert_eq!(x, vec![2, 1, 1, 0]);
/// assert_eq!(y, vec![0, 1, 1, 2]);
/// ```
pub fn compute_wiring(
    new_lines: &[u64],
    two_input: &[usize],
    two_input_gaps: &[u64],
) -> (Vec<u64>, Vec<u64>) {
    let width = new_lines.len();
    let mut x = vec![0; width];
    let mut y = vec![0; width];

    if two_input.is_empty() {
        stack_cluster(new_lines, &mut x, &mut y, 0, width, 0);
        return (x, y);
    }

    let gap = |i: usize| two_input_gaps.get(i).copied().unwrap_or(0);

    // Lines opened inside each cluster, including those of its first node.
    let mut cluster_lines = vec![0; two_input.len() + 1];
    let mut carry = 0;
    let mut start = 0;
    for i in 0..=two_input.len() {
        let end = two_input.get(i).copied().unwrap_or(width);
        stack_cluster(new_lines, &mut x, &mut y, start, end, carry);
        if start != 0 {
            y[start - 1] += carry;
        }
        if start != end {
            cluster_lines[i] = x[start] + new_lines[start];
        }
        carry = (carry + cluster_lines[i]).saturating_sub(gap(i));
        start = end + 1;
    }

    let mut carry = 0;
    for i in (1..=two_input.len()).rev() {
        let end = two_input[i - 1];
        let start = if i == 1 { 0 } else { two_input[i - 2] + 1 };
        carry = (carry + cluster_lines[i]).saturating_sub(gap(i - 1));
        if end + 1 != width {
            x[end] += carry;
        }
        for xj in &mut x[start..end] {
            *xj += carry;
        }
    }

    equalize(&mut x, &mut y, two_input, two_input_gaps);
    (x, y)
}

/// Accumulates the offsets of the nodes in `start..end`.
fn stack_cluster(
    new_lines: &[u64],
    x: &mut [u64],
    y: &mut [u64],
    start: usize,
    end: usize,
    carry: u64,
) {
    for j in start..end {
        x[j] = new_lines[j + 1..end].iter().sum();
        y[j] = if j == 0 {
            new_lines[0]
        } else {
            y[j - 1] + new_lines[j]
        };
        if j == start {
            y[j] += carry;
        }
    }
}

/// Pads every node's combined offset to the largest demand of the level.
///
/// Nodes before the widest one grow southwards, nodes after it grow eastwards.
fn equalize(x: &mut [u64], y: &mut [u64], two_input: &[usize], two_input_gaps: &[u64]) {
    let (widest_gap, widest_gap_index) = two_input_gaps
        .iter()
        .enumerate()
        .fold((0, 0), |(max, at), (i, g)| {
            if *g > max {
                (*g, i)
            } else {
                (max, at)
            }
        });

    let mut widest_offset = 0;
    let mut widest_offset_index = 0;
    for i in 0..x.len() {
        let offset = x[i] + y[i];
        if i == 0 || offset > widest_offset {
            widest_offset = offset;
            widest_offset_index = i;
        }
    }

    let (center, target) = if widest_offset > widest_gap {
        (widest_offset_index, widest_offset)
    } else {
        (
            two_input.get(widest_gap_index).copied().unwrap_or(0),
            widest_gap,
        )
    };

    for i in 0..x.len() {
        let own_gap = two_input
            .iter()
            .position(|t| *t == i)
            .and_then(|k| two_input_gaps.get(k))
            .copied()
            .unwrap_or(0);
        let diff = target.saturating_sub(x[i] + y[i] + own_gap);
        if i < center {
            y[i] += diff;
        } else if i > center {
            x[i] += diff;
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn lines_stack_without_two_input_nodes() {
        assert_eq!(
            compute_wiring(&[0, 1, 0, 1], &[], &[]),
            (vec![2, 1, 1, 0], vec![0, 1, 1, 2])
        );
        assert_eq!(compute_wiring(&[], &[], &[]), (vec![], vec![]));
    }

    #[test]
    fn two_input_nodes_split_clusters() {
        assert_eq!(
            compute_wiring(&[0, 1, 0, 1, 0], &[2], &[1]),
            (vec![1, 0, 0, 0, 0], vec![0, 1, 0, 1, 1])
        );
        assert_eq!(
            compute_wiring(&[1, 0, 1, 0, 1], &[1, 3], &[0, 2]),
            (vec![1, 1, 0, 0, 1], vec![1, 1, 2, 0, 1])
        );
    }

    #[test]
    fn wide_gaps_set_the_diagonal() {
        assert_eq!(
            compute_wiring(&[0, 1, 1], &[0], &[3]),
            (vec![0, 2, 1], vec![0, 1, 2])
        );
        assert_eq!(
            compute_wiring(&[1, 1, 0], &[2], &[0]),
            (vec![1, 0, 0], vec![1, 2, 2])
        );
    }

    #[test]
    fn lines_after_two_input_nodes_reach_later_clusters() {
        // The buffer behind the first gate opens a line, so the second gate moves
        // south with it and everything above moves east.
        assert_eq!(
            compute_wiring(&[0, 0, 0, 1, 0], &[2, 4], &[0, 0]),
            (vec![1, 1, 1, 0, 0], vec![0, 0, 0, 1, 1])
        );
    }
}
