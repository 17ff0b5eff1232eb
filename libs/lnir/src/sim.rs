//! Exhaustive simulation with truth tables.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, Network, Result};

/// The largest number of variables accepted by exhaustive simulation.
pub const MAX_SIMULATION_VARS: usize = 20;

/// A complete truth table over `num_vars` variables.
///
/// Bit `i` holds the function value for the input assignment in which
/// variable `j` is set iff bit `j` of `i` is set.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TruthTable {
    num_vars: usize,
    words: Vec<u64>,
}

impl TruthTable {
    /// Creates the constant-0 truth table over `num_vars` variables.
    pub fn new(num_vars: usize) -> Self {
        let num_words = if num_vars <= 6 {
            1
        } else {
            1 << (num_vars - 6)
        };
        Self {
            num_vars,
            words: vec![0; num_words],
        }
    }

    /// Creates the projection onto variable `var`.
    pub fn nth_var(num_vars: usize, var: usize) -> Self {
        let mut tt = Self::new(num_vars);
        for bit in 0..tt.num_bits() {
            tt.set_bit(bit, (bit >> var) & 1 == 1);
        }
        tt
    }

    /// Parses a truth table from hexadecimal digits, most significant digit first.
    ///
    /// # Example
    ///
    /// ```
    /// # use lnir::TruthTable;
    /// let maj = TruthTable::from_hex(3, "e8").unwrap();
    /// assert!(maj.bit(7));
    /// assert!(!maj.bit(1));
    /// ```
    pub fn from_hex(num_vars: usize, hex: &str) -> Option<Self> {
        let mut tt = Self::new(num_vars);
        let digits: Vec<u32> = hex
            .chars()
            .rev()
            .map(|c| c.to_digit(16))
            .collect::<Option<_>>()?;
        if digits.len() != tt.num_hex_digits() {
            return None;
        }
        for (i, digit) in digits.into_iter().enumerate() {
            for j in 0..4 {
                let bit = 4 * i + j;
                if bit < tt.num_bits() {
                    tt.set_bit(bit, (digit >> j) & 1 == 1);
                } else if (digit >> j) & 1 == 1 {
                    return None;
                }
            }
        }
        Some(tt)
    }

    /// The number of variables.
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// The number of bits, ie. `2^num_vars`.
    #[inline]
    pub fn num_bits(&self) -> usize {
        1 << self.num_vars
    }

    fn num_hex_digits(&self) -> usize {
        (self.num_bits() / 4).max(1)
    }

    fn mask(&self) -> u64 {
        if self.num_vars >= 6 {
            u64::MAX
        } else {
            (1u64 << self.num_bits()) - 1
        }
    }

    /// The value of bit `index`.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Sets the value of bit `index`.
    pub fn set_bit(&mut self, index: usize, value: bool) {
        let word = &mut self.words[index / 64];
        if value {
            *word |= 1 << (index % 64);
        } else {
            *word &= !(1 << (index % 64));
        }
    }

    /// Formats the table as hexadecimal digits, most significant digit first.
    ///
    /// # Example
    ///
    /// ```
    /// # use lnir::TruthTable;
    /// let a = TruthTable::nth_var(2, 0);
    /// assert_eq!(a.to_hex(), "a");
    /// ```
    pub fn to_hex(&self) -> String {
        (0..self.num_hex_digits())
            .rev()
            .map(|i| {
                let digit = (0..4)
                    .filter(|j| 4 * i + j < self.num_bits() && self.bit(4 * i + j))
                    .fold(0u32, |acc, j| acc | (1 << j));
                char::from_digit(digit, 16).unwrap_or('0')
            })
            .collect()
    }

    /// Combines truth tables word by word with the given function.
    ///
    /// Every operand must have `num_vars` variables.
    pub fn combine(
        num_vars: usize,
        operands: &[&TruthTable],
        f: impl Fn(&[u64]) -> u64,
    ) -> Self {
        let mut tt = Self::new(num_vars);
        let mut buf = Vec::with_capacity(operands.len());
        for w in 0..tt.words.len() {
            buf.clear();
            buf.extend(operands.iter().map(|op| op.words[w]));
            tt.words[w] = f(&buf);
        }
        let mask = tt.mask();
        if let Some(first) = tt.words.first_mut() {
            *first &= mask;
        }
        tt
    }
}

impl Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Network {
    /// Simulates the network for every input assignment.
    ///
    /// Returns one truth table per primary output. The variables are the real
    /// primary inputs in creation order; virtual inputs take the value of the
    /// input they duplicate.
    pub fn simulate(&self) -> Result<Vec<TruthTable>> {
        let reals: Vec<_> = self.real_pis().collect();
        if reals.len() > MAX_SIMULATION_VARS {
            return Err(Error::TooManyInputs(reals.len()));
        }
        let num_vars = reals.len();
        let mut tables: Vec<Option<TruthTable>> = vec![None; self.size()];
        for (var, pi) in reals.iter().enumerate() {
            tables[pi.index()] = Some(TruthTable::nth_var(num_vars, var));
        }
        for node in self.nodes() {
            if self.is_virtual_pi(node) {
                tables[node.index()] = tables[self.real_pi(node).index()].clone();
            } else if !self.is_pi(node) {
                let operands: Vec<&TruthTable> = self
                    .fanins(node)
                    .iter()
                    .filter_map(|f| tables[f.index()].as_ref())
                    .collect();
                let kind = self.kind(node);
                let tt = TruthTable::combine(num_vars, &operands, |words| kind.eval(words));
                tables[node.index()] = Some(tt);
            }
        }
        Ok(self
            .outputs()
            .iter()
            .map(|o| {
                tables[o.driver.index()]
                    .clone()
                    .unwrap_or_else(|| TruthTable::new(num_vars))
            })
            .collect())
    }
}
