use test_log::test;

use crate::*;

/// Majority of three inputs, planarized with two virtual inputs.
pub(crate) fn majority() -> Network {
    let mut ntk = Network::with_name("maj");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let a2 = ntk.create_virtual_pi(a).unwrap();
    let b2 = ntk.create_virtual_pi(b).unwrap();
    let c = ntk.create_pi("c");
    let and = ntk.create_and(a, b);
    let or = ntk.create_or(a2, b2);
    let bc = ntk.create_buf(c);
    let band = ntk.create_buf(and);
    let and2 = ntk.create_and(or, bc);
    let f = ntk.create_or(band, and2);
    ntk.create_po(f, "f");
    ntk
}

#[test]
fn levels_follow_longest_path() {
    let ntk = majority();
    let levels = ntk.levels();
    assert_eq!(ntk.depth(), 3);
    assert_eq!(&levels[..5], &[0, 0, 0, 0, 0]);
    assert_eq!(&levels[5..], &[1, 1, 1, 2, 2, 3]);
    assert!(ntk.is_balanced(true));
}

#[test]
fn detects_unbalanced_edges() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let ba = ntk.create_buf(a);
    let g = ntk.create_and(ba, b);
    ntk.create_po(g, "f");
    assert!(!ntk.is_balanced(false));

    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let g = ntk.create_and(a, b);
    let h = ntk.create_buf(g);
    ntk.create_po(g, "f");
    ntk.create_po(h, "g");
    assert!(ntk.is_balanced(false));
    assert!(!ntk.is_balanced(true));
}

#[test]
fn fanout_size_counts_outputs() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let f = ntk.create_buf(a);
    let x = ntk.create_not(f);
    ntk.create_po(f, "f");
    ntk.create_po(x, "x");

    assert_eq!(ntk.fanout_size(f), 2);
    assert_eq!(ntk.fanouts(f), &[x]);
    assert!(ntk.is_fanout(f));
    assert!(!ntk.is_fanout(x));
    assert!(ntk.is_po(f));
    assert_eq!(ntk.num_po_refs(f), 1);
    assert_eq!(ntk.num_gates(), 1);
}

#[test]
fn virtual_inputs_share_their_name() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let v = ntk.create_virtual_pi(a).unwrap();

    assert!(ntk.is_pi(v));
    assert!(ntk.is_virtual_pi(v));
    assert_eq!(ntk.real_pi(v), a);
    assert_eq!(ntk.node_name(v).map(|n| n.as_str()), Some("a"));
    assert_eq!(ntk.num_pis(), 2);
    assert_eq!(ntk.real_pis().collect::<Vec<_>>(), vec![a]);
    assert_eq!(ntk.create_virtual_pi(v), Err(Error::NotARealInput(v)));
}

#[test]
fn create_node_checks_arity() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    assert_eq!(
        ntk.create_node(NodeKind::And, &[a]),
        Err(Error::ArityMismatch {
            kind: NodeKind::And,
            expected: 2,
            actual: 1
        })
    );
    assert!(ntk.create_node(NodeKind::Pi, &[]).is_err());
    let g = ntk.create_node(NodeKind::Maj, &[a, a, a]).unwrap();
    assert_eq!(ntk.kind(g), NodeKind::Maj);
    assert_eq!(ntk.find_high_degree_fanin(2), Some(g));
    assert_eq!(ntk.find_high_degree_fanin(3), None);
}

#[test]
fn rank_view_orders_by_creation() {
    let view = RankView::new(majority());
    assert_eq!(view.num_levels(), 4);
    assert_eq!(view.depth(), 3);
    assert_eq!(view.width(), 5);
    assert_eq!(view.rank_width(1), 3);
    let l2 = view.rank(2).to_vec();
    assert_eq!(view.rank_position(l2[1]), 1);
    assert_eq!(view.at_rank_position(2, 0), l2[0]);
    assert!(view.is_valid());
}

#[test]
fn rank_view_swaps_and_sorts() {
    let mut view = RankView::new(majority());
    let l1 = view.rank(1).to_vec();
    view.swap(l1[0], l1[2]).unwrap();
    assert_eq!(view.rank(1), &[l1[2], l1[1], l1[0]]);
    assert_eq!(view.rank_position(l1[0]), 2);
    assert!(view.is_valid());

    let l0 = view.rank(0)[0];
    assert_eq!(view.swap(l0, l1[0]), Err(Error::LevelMismatch(l0, l1[0])));

    view.sort_rank_by(1, |a, b| a.cmp(b));
    assert_eq!(view.rank(1), &l1[..]);
    assert_eq!(
        view.sorted_by_rank(&[l1[2], l1[0]]),
        vec![l1[0], l1[2]]
    );
    assert!(view.is_valid());
}

#[test]
fn rank_view_rejects_invalid_orders() {
    let mut view = RankView::new(majority());
    let l1 = view.rank(1).to_vec();
    let before = view.all_ranks();

    assert!(view.set_rank(1, vec![l1[0], l1[0], l1[1]]).is_err());
    assert!(view.set_rank(1, vec![l1[0], l1[1]]).is_err());
    assert!(view.set_rank(1, vec![l1[0], l1[1], view.rank(0)[0]]).is_err());
    assert!(view.set_rank(7, Vec::new()).is_err());
    assert_eq!(view.all_ranks(), before);

    let mut bad = before.clone();
    bad[1].reverse();
    bad[2].pop();
    assert!(view.set_all_ranks(bad).is_err());
    assert_eq!(view.all_ranks(), before);

    view.set_rank(1, vec![l1[1], l1[2], l1[0]]).unwrap();
    assert_eq!(view.rank_position(l1[0]), 2);
    assert!(view.is_valid());
}

#[test]
fn rank_view_derefs_to_network() {
    let view = RankView::from(majority());
    assert_eq!(view.num_pos(), 1);
    assert_eq!(view.name().map(|n| n.as_str()), Some("maj"));
    let ntk = view.into_network();
    assert_eq!(ntk.size(), 11);
}

#[test]
fn simulates_majority() {
    let tts = majority().simulate().unwrap();
    assert_eq!(tts.len(), 1);
    assert_eq!(tts[0].num_vars(), 3);
    assert_eq!(tts[0].to_hex(), "e8");
    assert_eq!(tts[0], TruthTable::from_hex(3, "e8").unwrap());
}

#[test]
fn simulates_inverting_gates() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let nand = ntk.create_nand(a, b);
    let nor = ntk.create_nor(a, b);
    let xnor = ntk.create_xnor(a, b);
    let inv = ntk.create_not(a);
    ntk.create_po(nand, "nand");
    ntk.create_po(nor, "nor");
    ntk.create_po(xnor, "xnor");
    ntk.create_unnamed_po(inv);

    let tts: Vec<String> = ntk.simulate().unwrap().iter().map(|t| t.to_hex()).collect();
    assert_eq!(tts, vec!["7", "1", "9", "5"]);
    assert_eq!(ntk.output_name(3), None);
}

#[test]
fn simulates_more_than_six_inputs() {
    let mut ntk = Network::new();
    let pis: Vec<_> = (0..8).map(|i| ntk.create_pi(format!("x{i}"))).collect();
    let mut acc = pis[0];
    for pi in &pis[1..] {
        acc = ntk.create_and(acc, *pi);
    }
    ntk.create_po(acc, "all");

    let tt = &ntk.simulate().unwrap()[0];
    assert_eq!(tt.num_bits(), 256);
    assert!(tt.bit(255));
    assert_eq!((0..256).filter(|i| tt.bit(*i)).count(), 1);
}

#[test]
fn rejects_malformed_hex() {
    assert!(TruthTable::from_hex(3, "e").is_none());
    assert!(TruthTable::from_hex(3, "g8").is_none());
    assert!(TruthTable::from_hex(1, "4").is_none());
    assert_eq!(TruthTable::from_hex(1, "2").map(|t| t.to_hex()), Some("2".to_string()));
}
