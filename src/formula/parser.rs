use super::Scanner;
use crate::error::HubResult;
use std::collections::BTreeSet;

/// Pseudo-element carrying the charge of a species.
pub const CHARGE_SYMBOL: &str = "Zz";
/// Isotope class of the charge pseudo-element.
pub const CHARGE_CLASS: &str = "z";
/// Isotope class of elements written without an explicit isotope.
pub const NO_ISOTOPE_CLASS: &str = "n";

const MAX_SYMBOL_LEN: usize = 10;
const MAX_VALENCE_LEN: usize = 3;

/// One element of a parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaElement {
    pub symbol: String,
    pub isotope: String,
    pub valence: Option<i32>,
    pub stoich: f64,
}

impl FormulaElement {
    fn charge(charge: f64) -> Self {
        Self {
            symbol: CHARGE_SYMBOL.to_string(),
            isotope: CHARGE_CLASS.to_string(),
            valence: Some(1),
            stoich: charge,
        }
    }
}

/// Parse a formula into its elements, sorted by symbol then valence.
///
/// Repeated elements are merged. A trailing charge (`+2`, `-`, `@`) becomes the
/// [`CHARGE_SYMBOL`] entry; `@` marks a neutral aqueous species and yields a zero charge.
pub fn parse_formula(formula: &str) -> HubResult<Vec<FormulaElement>> {
    let (body, charge) = split_charge(formula);

    let mut scanner = Scanner::new(formula, body);
    let mut elements = Vec::new();
    scan_term(&mut scanner, &mut elements, None)?;

    if let Some(charge) = charge {
        let value = parse_charge(formula, charge)?;
        add_element(&mut elements, FormulaElement::charge(value));
    }
    Ok(elements)
}

/// Distinct element symbols with a non-zero coefficient.
pub fn formula_symbols(formula: &str) -> HubResult<BTreeSet<String>> {
    Ok(parse_formula(formula)?
        .into_iter()
        .filter(|e| e.stoich != 0.0)
        .map(|e| e.symbol)
        .collect())
}

/// Split off the charge, found at the last `+`, `-` or `@` unless a valence bar follows it.
fn split_charge(formula: &str) -> (&str, Option<&str>) {
    match formula.rfind(['+', '-', '@']) {
        Some(at) if !formula[at..].contains('|') => (&formula[..at], Some(&formula[at..])),
        _ => (formula, None),
    }
}

fn parse_charge(formula: &str, charge: &str) -> HubResult<f64> {
    let mut scanner = Scanner::new(formula, charge);
    let sign = match scanner.peek() {
        Some('@') => return Ok(0.0),
        Some('-') => -1.0,
        _ => 1.0,
    };
    scanner.bump();
    let magnitude = scanner.scan_real()?.unwrap_or(1.0);
    Ok(sign * magnitude)
}

/// Scan terms until the input ends or `close` is reached.
fn scan_term(
    scanner: &mut Scanner<'_>,
    elements: &mut Vec<FormulaElement>,
    close: Option<char>,
) -> HubResult<()> {
    loop {
        scanner.skip_blanks();
        if scanner.is_empty() || (close.is_some() && scanner.peek() == close) {
            return Ok(());
        }

        let mut group = Vec::new();
        scan_element(scanner, &mut group)?;
        if let Some(coefficient) = scanner.scan_real()? {
            for element in &mut group {
                element.stoich *= coefficient;
            }
        }
        for element in group {
            add_element(elements, element);
        }
    }
}

fn scan_element(scanner: &mut Scanner<'_>, group: &mut Vec<FormulaElement>) -> HubResult<()> {
    scanner.skip_blanks();
    let Some(first) = scanner.peek() else {
        return Ok(());
    };

    match first {
        '(' | '[' | '{' => {
            let close = match first {
                '(' => ')',
                '[' => ']',
                _ => '}',
            };
            scanner.bump();
            scan_term(scanner, group, Some(close))?;
            if scanner.peek() != Some(close) {
                return Err(scanner.error(format!("Missing closing '{}'", close)));
            }
            scanner.bump();
        }
        ':' => scanner.bump(),
        'V' if scanner.peek_second() == Some('a') => scanner.advance(2),
        _ => {
            let isotope = scan_isotope(scanner)?;
            let symbol = scan_symbol(scanner)?;
            let valence = scan_valence(scanner)?;
            add_element(
                group,
                FormulaElement {
                    symbol,
                    isotope: isotope.unwrap_or_else(|| NO_ISOTOPE_CLASS.to_string()),
                    valence,
                    stoich: 1.0,
                },
            );
        }
    }
    Ok(())
}

/// `/18/` isotope mass prefix.
fn scan_isotope(scanner: &mut Scanner<'_>) -> HubResult<Option<String>> {
    if scanner.peek() != Some('/') {
        return Ok(None);
    }
    scanner.bump();
    match scanner.rest().find('/') {
        Some(end) if end < MAX_SYMBOL_LEN => {
            let isotope = scanner.rest()[..end].to_string();
            scanner.advance(end + 1);
            Ok(Some(isotope))
        }
        _ => Err(scanner.error("Unterminated isotope mass")),
    }
}

/// Uppercase letter (or `$`) followed by lowercase letters or `_`.
fn scan_symbol(scanner: &mut Scanner<'_>) -> HubResult<String> {
    match scanner.peek() {
        Some(c) if c.is_ascii_uppercase() || c == '$' => {}
        Some(c) => return Err(scanner.error(format!("Element symbol expected at '{}'", c))),
        None => return Err(scanner.error("Element symbol expected after isotope")),
    }

    let len = 1 + scanner.rest()[1..]
        .bytes()
        .take_while(|b| b.is_ascii_lowercase() || *b == b'_')
        .count();
    if len >= MAX_SYMBOL_LEN {
        return Err(scanner.error("Element symbol is too long"));
    }

    let symbol = scanner.rest()[..len].to_string();
    scanner.advance(len);
    Ok(symbol)
}

/// `|3|` valence suffix.
fn scan_valence(scanner: &mut Scanner<'_>) -> HubResult<Option<i32>> {
    scanner.skip_blanks();
    if scanner.peek() != Some('|') {
        return Ok(None);
    }
    scanner.bump();
    let end = match scanner.rest().find('|') {
        Some(end) if end < MAX_VALENCE_LEN => end,
        _ => return Err(scanner.error("Unterminated valence")),
    };
    let text = scanner.rest()[..end].trim();
    let valence = text
        .parse::<i32>()
        .map_err(|_| scanner.error(format!("Invalid valence '{}'", text)))?;
    scanner.advance(end + 1);
    Ok(Some(valence))
}

/// Insert keeping (symbol, valence) order, merging a repeated element.
fn add_element(elements: &mut Vec<FormulaElement>, element: FormulaElement) {
    let key = (element.symbol.as_str(), element.valence);
    let at = elements.partition_point(|e| (e.symbol.as_str(), e.valence) < key);
    match elements.get_mut(at) {
        Some(existing) if existing.symbol == element.symbol && existing.valence == element.valence => {
            existing.stoich += element.stoich;
        }
        _ => elements.insert(at, element),
    }
}
