//! Clocking schemes.
//!
//! A clocking scheme assigns every tile of a layout one of `num_clocks` clock numbers.
//! Information may only flow from a tile with clock number `c` to an adjacent tile
//! with clock number `(c + 1) % num_clocks`.
//!
//! Regular schemes replicate a small cutout of clock numbers across the plane.
//! Individual tiles may be overridden, which makes the scheme irregular.

use std::fmt::Display;

use arcstr::ArcStr;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use tiles::Tile;
use tracing::Level;
use unicase::UniCase;

/// A clock number in `0..num_clocks`.
pub type ClockNumber = u8;

/// A number of incoming or outgoing connections of a clock zone.
pub type Degree = u8;

/// The name of the open scheme.
pub const OPEN: &str = "OPEN";
/// The name of the columnar scheme.
pub const COLUMNAR: &str = "COLUMNAR";
/// The name of the 2DDWave scheme.
pub const TWODDWAVE: &str = "2DDWAVE";
/// The name of the hexagonal 2DDWave scheme.
pub const TWODDWAVE_HEX: &str = "2DDWAVEHEX";
/// The name of the USE scheme.
pub const USE: &str = "USE";
/// The name of the RES scheme.
pub const RES: &str = "RES";
/// The name of the BANCS scheme.
pub const BANCS: &str = "BANCS";

type Cutout = &'static [&'static [ClockNumber]];

static COLUMNAR_3: Cutout = &[&[0, 1, 2], &[0, 1, 2], &[0, 1, 2]];
static COLUMNAR_4: Cutout = &[&[0, 1, 2, 3], &[0, 1, 2, 3], &[0, 1, 2, 3], &[0, 1, 2, 3]];
static TWODDWAVE_3: Cutout = &[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]];
static TWODDWAVE_4: Cutout = &[&[0, 1, 2, 3], &[1, 2, 3, 0], &[2, 3, 0, 1], &[3, 0, 1, 2]];
static TWODDWAVE_HEX_3: Cutout = &[
    &[0, 1, 2],
    &[0, 1, 2],
    &[1, 2, 0],
    &[1, 2, 0],
    &[2, 0, 1],
    &[2, 0, 1],
];
static TWODDWAVE_HEX_4: Cutout = &[
    &[0, 1, 2, 3],
    &[0, 1, 2, 3],
    &[1, 2, 3, 0],
    &[1, 2, 3, 0],
    &[2, 3, 0, 1],
    &[2, 3, 0, 1],
    &[3, 0, 1, 2],
    &[3, 0, 1, 2],
];
static USE_4: Cutout = &[&[0, 1, 2, 3], &[3, 2, 1, 0], &[2, 3, 0, 1], &[1, 0, 3, 2]];
static RES_4: Cutout = &[&[3, 0, 1, 2], &[0, 1, 0, 3], &[1, 2, 3, 0], &[0, 3, 2, 1]];
static BANCS_3: Cutout = &[
    &[0, 1, 2],
    &[2, 1, 0],
    &[2, 0, 1],
    &[1, 0, 2],
    &[1, 2, 0],
    &[0, 2, 1],
];

/// The largest fanin of a tile in a Cartesian layout.
const CARTESIAN_MAX_FANIN: Degree = 3;

/// The number of phases of a clocking scheme family.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum NumClocks {
    /// Three phases.
    Three,
    /// Four phases.
    #[default]
    Four,
}

impl NumClocks {
    /// Converts a phase count to a [`NumClocks`], if it is supported.
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum ClockFunction {
    Constant(ClockNumber),
    Cutout(Cutout),
}

impl ClockFunction {
    fn eval(&self, tile: Tile) -> ClockNumber {
        match self {
            Self::Constant(c) => *c,
            Self::Cutout(rows) => {
                let row = rows[(tile.y % rows.len() as u64) as usize];
                row[(tile.x % row.len() as u64) as usize]
            }
        }
    }
}

/// A named clocking scheme.
///
/// # Example
///
/// ```
/// # use nanoplace::clocking::get_clocking_scheme;
/// # use tiles::Tile;
/// let scheme = get_clocking_scheme("2ddwave").unwrap();
/// assert_eq!(scheme.clock_number(Tile::new(1, 2)), 3);
/// assert!(scheme.is_incoming_clocked(Tile::new(1, 1), Tile::new(0, 1)));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClockingScheme {
    name: ArcStr,
    max_in_degree: Degree,
    max_out_degree: Degree,
    num_clocks: ClockNumber,
    regular: bool,
    function: ClockFunction,
    overrides: IndexMap<Tile, ClockNumber>,
}

impl ClockingScheme {
    /// Creates a regular scheme that replicates `cutout` across the plane.
    ///
    /// The clock number of tile `(x, y)` is `cutout[y % rows][x % columns]`.
    pub fn from_cutout(
        name: impl Into<ArcStr>,
        cutout: &'static [&'static [ClockNumber]],
        max_in_degree: Degree,
        max_out_degree: Degree,
        num_clocks: ClockNumber,
    ) -> Self {
        Self {
            name: name.into(),
            max_in_degree,
            max_out_degree,
            num_clocks,
            regular: true,
            function: ClockFunction::Cutout(cutout),
            overrides: IndexMap::new(),
        }
    }

    /// Creates an irregular scheme that assigns clock number 0 to every tile
    /// until overridden.
    pub fn open(num_clocks: NumClocks) -> Self {
        Self {
            name: arcstr::literal!("OPEN"),
            max_in_degree: CARTESIAN_MAX_FANIN,
            max_out_degree: CARTESIAN_MAX_FANIN,
            num_clocks: num_clocks.count(),
            regular: false,
            function: ClockFunction::Constant(0),
            overrides: IndexMap::new(),
        }
    }

    /// The columnar scheme, in which clock numbers increase from west to east.
    pub fn columnar(num_clocks: NumClocks) -> Self {
        let cutout = match num_clocks {
            NumClocks::Three => COLUMNAR_3,
            NumClocks::Four => COLUMNAR_4,
        };
        Self::from_cutout(COLUMNAR, cutout, 3, 2, num_clocks.count())
    }

    /// The 2DDWave scheme, in which clock numbers increase diagonally towards the south east.
    pub fn twoddwave(num_clocks: NumClocks) -> Self {
        let cutout = match num_clocks {
            NumClocks::Three => TWODDWAVE_3,
            NumClocks::Four => TWODDWAVE_4,
        };
        Self::from_cutout(TWODDWAVE, cutout, 2, 2, num_clocks.count())
    }

    /// The 2DDWave scheme adapted to hexagonal layouts.
    pub fn twoddwave_hex(num_clocks: NumClocks) -> Self {
        let cutout = match num_clocks {
            NumClocks::Three => TWODDWAVE_HEX_3,
            NumClocks::Four => TWODDWAVE_HEX_4,
        };
        Self::from_cutout(TWODDWAVE_HEX, cutout, 2, 2, num_clocks.count())
    }

    /// The 4-phase USE scheme.
    pub fn use_scheme() -> Self {
        Self::from_cutout(USE, USE_4, 2, 2, 4)
    }

    /// The 4-phase RES scheme.
    pub fn res() -> Self {
        Self::from_cutout(RES, RES_4, 3, 3, 4)
    }

    /// The 3-phase BANCS scheme.
    pub fn bancs() -> Self {
        Self::from_cutout(BANCS, BANCS_3, 2, 2, 3)
    }

    /// The name of the scheme.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The number of distinct clock numbers.
    #[inline]
    pub fn num_clocks(&self) -> ClockNumber {
        self.num_clocks
    }

    /// The largest number of incoming connections per clock zone.
    #[inline]
    pub fn max_in_degree(&self) -> Degree {
        self.max_in_degree
    }

    /// The largest number of outgoing connections per clock zone.
    #[inline]
    pub fn max_out_degree(&self) -> Degree {
        self.max_out_degree
    }

    /// Returns `true` if no tile has been overridden and the scheme is not open.
    #[inline]
    pub fn is_regular(&self) -> bool {
        self.regular
    }

    /// Returns `true` if the scheme's name equals `name`, ignoring case.
    pub fn is_scheme(&self, name: &str) -> bool {
        UniCase::new(self.name.as_str()) == UniCase::new(name)
    }

    /// The clock number of a tile.
    ///
    /// Tiles on the crossing layer share the clock number of the ground tile below them.
    pub fn clock_number(&self, tile: Tile) -> ClockNumber {
        let ground = tile.ground();
        if !self.regular {
            if let Some(clock) = self.overrides.get(&ground) {
                return *clock;
            }
        }
        self.function.eval(ground)
    }

    /// Assigns a clock number to a tile, making the scheme irregular.
    ///
    /// The clock number is reduced modulo [`ClockingScheme::num_clocks`].
    pub fn override_clock_number(&mut self, tile: Tile, clock: ClockNumber) {
        self.regular = false;
        self.overrides.insert(tile.ground(), clock % self.num_clocks);
    }

    /// Returns `true` if information can flow from `t2` into `t1`.
    ///
    /// Adjacency is not checked.
    pub fn is_incoming_clocked(&self, t1: Tile, t2: Tile) -> bool {
        t1 != t2 && (self.clock_number(t2) + 1) % self.num_clocks == self.clock_number(t1)
    }

    /// Returns `true` if information can flow from `t1` into `t2`.
    ///
    /// Adjacency is not checked.
    pub fn is_outgoing_clocked(&self, t1: Tile, t2: Tile) -> bool {
        t1 != t2 && (self.clock_number(t1) + 1) % self.num_clocks == self.clock_number(t2)
    }
}

impl NumClocks {
    /// The number of phases.
    pub const fn count(&self) -> ClockNumber {
        match *self {
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

impl Display for ClockingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} phases)", self.name, self.num_clocks)
    }
}

lazy_static! {
    static ref CATALOG: IndexMap<UniCase<ArcStr>, ClockingScheme> = {
        use NumClocks::*;
        IndexMap::from_iter(
            [
                (OPEN, ClockingScheme::open(Four)),
                ("OPEN3", ClockingScheme::open(Three)),
                ("OPEN4", ClockingScheme::open(Four)),
                (COLUMNAR, ClockingScheme::columnar(Four)),
                ("COLUMNAR3", ClockingScheme::columnar(Three)),
                ("COLUMNAR4", ClockingScheme::columnar(Four)),
                (TWODDWAVE, ClockingScheme::twoddwave(Four)),
                ("TWODDWAVE3", ClockingScheme::twoddwave(Three)),
                ("TWODDWAVE4", ClockingScheme::twoddwave(Four)),
                (TWODDWAVE_HEX, ClockingScheme::twoddwave_hex(Four)),
                ("TWODDWAVEHEX3", ClockingScheme::twoddwave_hex(Three)),
                ("TWODDWAVEHEX4", ClockingScheme::twoddwave_hex(Four)),
                (USE, ClockingScheme::use_scheme()),
                (RES, ClockingScheme::res()),
                (BANCS, ClockingScheme::bancs()),
            ]
            .map(|(name, scheme)| (UniCase::new(ArcStr::from(name)), scheme)),
        )
    };
}

/// Looks up a clocking scheme by name, ignoring case.
///
/// Returns `None` if no scheme with the given name exists.
pub fn get_clocking_scheme(name: &str) -> Option<ClockingScheme> {
    let scheme = CATALOG.get(&UniCase::new(ArcStr::from(name))).cloned();
    if scheme.is_none() {
        tracing::event!(Level::WARN, name, "unknown clocking scheme");
    }
    scheme
}

/// The names under which clocking schemes can be looked up.
pub fn catalog_names() -> impl Iterator<Item = &'static str> {
    CATALOG.keys().map(|k| k.as_str())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn twoddwave_follows_diagonals() {
        let scheme = ClockingScheme::twoddwave(NumClocks::Four);
        for x in 0..8 {
            for y in 0..8 {
                assert_eq!(
                    scheme.clock_number(Tile::new(x, y)) as u64,
                    (x + y) % 4,
                    "clock of ({x}, {y})"
                );
            }
        }
        assert_eq!(
            scheme.clock_number(Tile::new(2, 1).above()),
            scheme.clock_number(Tile::new(2, 1))
        );
    }

    #[test]
    fn flow_is_symmetric() {
        for name in catalog_names() {
            let scheme = get_clocking_scheme(name).unwrap();
            for x1 in 0..6 {
                for y1 in 0..6 {
                    let t1 = Tile::new(x1, y1);
                    assert!(!scheme.is_incoming_clocked(t1, t1));
                    assert!(!scheme.is_outgoing_clocked(t1, t1));
                    for t2 in t1.neighbors() {
                        assert_eq!(
                            scheme.is_incoming_clocked(t1, t2),
                            scheme.is_outgoing_clocked(t2, t1),
                            "{name}: {t1} {t2}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn catalog_lookup_ignores_case() {
        let scheme = get_clocking_scheme("twoddwave3").unwrap();
        assert!(scheme.is_scheme("2ddwave"));
        assert_eq!(scheme.num_clocks(), 3);
        assert_eq!(get_clocking_scheme("Res").unwrap().max_in_degree(), 3);
        assert_eq!(get_clocking_scheme("bancs").unwrap().num_clocks(), 3);
        assert_eq!(get_clocking_scheme("columnar").unwrap().max_out_degree(), 2);
        assert!(get_clocking_scheme("2DDWAVE5").is_none());
        assert!(get_clocking_scheme("").is_none());
        assert_eq!(catalog_names().count(), 15);
    }

    #[test]
    fn cutouts_repeat() {
        let scheme = ClockingScheme::bancs();
        for x in 0..3 {
            for y in 0..6 {
                let t = Tile::new(x, y);
                assert_eq!(
                    scheme.clock_number(t),
                    scheme.clock_number(Tile::new(x + 3, y + 12))
                );
            }
        }
        assert_eq!(scheme.clock_number(Tile::new(0, 1)), 2);
        assert_eq!(ClockingScheme::res().clock_number(Tile::new(2, 1)), 0);
        assert_eq!(
            ClockingScheme::use_scheme().clock_number(Tile::new(3, 1)),
            0
        );
    }

    #[test]
    fn overrides_make_scheme_irregular() {
        let mut scheme = ClockingScheme::columnar(NumClocks::Three);
        assert!(scheme.is_regular());
        scheme.override_clock_number(Tile::new(0, 0), 5);
        assert!(!scheme.is_regular());
        assert_eq!(scheme.clock_number(Tile::new(0, 0)), 2);
        assert_eq!(scheme.clock_number(Tile::new(3, 0)), 0);
    }

    #[test]
    fn open_scheme_defaults_to_zero() {
        let mut scheme = ClockingScheme::open(NumClocks::Three);
        assert!(!scheme.is_regular());
        assert_eq!(scheme.max_in_degree(), 3);
        assert_eq!(scheme.clock_number(Tile::new(7, 9)), 0);
        scheme.override_clock_number(Tile::new(7, 9), 1);
        assert!(scheme.is_incoming_clocked(Tile::new(7, 9), Tile::new(7, 8)));
    }
}
