//! Chemical formula parsing.
//!
//! ThermoHub substances carry GEMS-style formulas such as `Ca2Al3Si3O12(OH)`,
//! `Fe|3|+3`, `/18/O2` or `H2O@`. [`parse_formula`] turns one into its element
//! composition; [`parse_moieties`] reads the sublattice notation (`{Fe}:{Mg}2:Va`)
//! used by solid-solution end members.

pub mod moiety;
pub mod parser;

pub use moiety::{Moiety, parse_moieties};
pub use parser::{
    CHARGE_CLASS, CHARGE_SYMBOL, FormulaElement, NO_ISOTOPE_CLASS, formula_symbols, parse_formula,
};

use crate::error::{HubError, HubResult};

/// Cursor over the unparsed tail of a formula.
#[derive(Debug)]
pub(crate) struct Scanner<'a> {
    formula: &'a str,
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    /// Scan `rest`, reporting errors against the full `formula`.
    pub(crate) fn new(formula: &'a str, rest: &'a str) -> Self {
        Self { formula, rest }
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.rest
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    pub(crate) fn peek_second(&self) -> Option<char> {
        self.rest.chars().nth(1)
    }

    /// Skip `n` bytes.
    pub(crate) fn advance(&mut self, n: usize) {
        self.rest = &self.rest[n.min(self.rest.len())..];
    }

    /// Skip the next character, if any.
    pub(crate) fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.advance(c.len_utf8());
        }
    }

    pub(crate) fn skip_blanks(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\n', '\t', '\r']);
    }

    /// Read a non-negative real (`2`, `0.5`, `.25`, `1e-3`) if one starts here.
    pub(crate) fn scan_real(&mut self) -> HubResult<Option<f64>> {
        self.skip_blanks();
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => {}
            _ => return Ok(None),
        }

        let bytes = self.rest.as_bytes();
        let digits = |from: usize| {
            bytes[from..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };

        let mut end = digits(0);
        if bytes.get(end) == Some(&b'.') {
            end += 1 + digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
            let exponent = digits(end + 1 + sign);
            if exponent > 0 {
                end += 1 + sign + exponent;
            }
        }

        let text = &self.rest[..end];
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("Number scan error at '{}'", text)))?;
        self.advance(end);
        Ok(Some(value))
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> HubError {
        HubError::formula(self.formula, reason)
    }
}
