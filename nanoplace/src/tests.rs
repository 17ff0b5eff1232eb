use lnir::{Network, RankView};
use test_log::test;
use tiles::AspectRatio;

use crate::config::PhysicalDesignConfig;
use crate::mincross::{count_crossings, mincross, MincrossParams};
use crate::planarity::check_planarity;
use crate::plane::plane;
use crate::{drv, Error};

fn hex(tts: &[lnir::TruthTable]) -> Vec<String> {
    tts.iter().map(|tt| tt.to_hex()).collect()
}

/// Majority of three whose gates are created in crossing order.
fn scrambled_majority() -> Network {
    let mut ntk = Network::with_name("maj");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let a2 = ntk.create_virtual_pi(a).unwrap();
    let b2 = ntk.create_virtual_pi(b).unwrap();
    let c = ntk.create_pi("c");
    let bc = ntk.create_buf(c);
    let a2b2 = ntk.create_or(a2, b2);
    let ab = ntk.create_and(a, b);
    let g = ntk.create_and(a2b2, bc);
    let bab = ntk.create_buf(ab);
    let f = ntk.create_or(bab, g);
    ntk.create_po(f, "f");
    ntk
}

/// Runs the complete flow.
fn flow(ntk: Network, config: &PhysicalDesignConfig) -> crate::Result<crate::layout::GateLevelLayout> {
    let mut view = RankView::new(ntk);
    let stats = mincross(&mut view, &config.mincross)?;
    assert!(view.is_valid());
    assert_eq!(stats.num_crossings, count_crossings(&view));
    let (layout, _) = plane(&view, &config.plane)?;
    Ok(layout)
}

#[test]
fn scrambled_majority_is_untangled_and_placed() {
    let ntk = scrambled_majority();
    let expected = hex(&ntk.simulate().unwrap());
    assert_eq!(expected, vec!["e8"]);

    let mut view = RankView::new(ntk.clone());
    assert!(count_crossings(&view) > 0);
    assert!(!check_planarity(&view).unwrap());
    assert!(matches!(
        plane(&view, &Default::default()),
        Err(Error::NotPlanar { .. })
    ));

    let stats = mincross(&mut view, &MincrossParams::default()).unwrap();
    assert_eq!(stats.num_crossings, 0);
    assert!(check_planarity(&view).unwrap());

    let layout = flow(ntk, &PhysicalDesignConfig::default()).unwrap();
    assert!(!drv::validate(&layout).has_error());
    assert_eq!(layout.num_crossings(), 0);
    assert_eq!(hex(&layout.simulate().unwrap()), expected);
}

#[test]
fn crossed_inverters_are_placed_after_reordering() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let nb = ntk.create_not(b);
    let na = ntk.create_not(a);
    let f = ntk.create_and(na, nb);
    ntk.create_po(f, "f");

    let layout = flow(ntk, &PhysicalDesignConfig::default()).unwrap();
    assert!(!drv::validate(&layout).has_error());
    assert_eq!(layout.aspect_ratio(), AspectRatio::new(3, 1));
    assert_eq!(hex(&layout.simulate().unwrap()), vec!["1"]);
}

#[test]
fn count_only_configs_leave_crossings_in_place() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let nb = ntk.create_not(b);
    let na = ntk.create_not(a);
    let f = ntk.create_and(na, nb);
    ntk.create_po(f, "f");

    let config = PhysicalDesignConfig::from_toml_str("[mincross]\noptimize = false\n").unwrap();
    assert_eq!(
        flow(ntk, &config).unwrap_err(),
        Error::NotPlanar { crossings: 1 }
    );
}

#[test]
fn complete_bipartite_levels_stay_unplaceable() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let f = ntk.create_and(a, b);
    let g = ntk.create_or(a, b);
    ntk.create_po(f, "f");
    ntk.create_po(g, "g");

    let err = flow(ntk, &PhysicalDesignConfig::default()).unwrap_err();
    assert_eq!(err, Error::NotPlanar { crossings: 1 });
}

#[test]
fn swappable_gates_are_untangled() {
    let mut ntk = Network::new();
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let c = ntk.create_pi("c");
    let f = ntk.create_and(b, c);
    let g = ntk.create_or(a, b);
    ntk.create_po(f, "f");
    ntk.create_po(g, "g");

    let mut view = RankView::new(ntk);
    assert_eq!(count_crossings(&view), 3);
    assert!(!check_planarity(&view).unwrap());

    let stats = mincross(&mut view, &MincrossParams::default()).unwrap();
    assert_eq!(stats.num_crossings, 0);
    assert_eq!(count_crossings(&view), 0);
    assert!(view.is_valid());
    assert!(check_planarity(&view).unwrap());
}
