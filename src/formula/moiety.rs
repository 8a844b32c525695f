use super::Scanner;
use crate::error::HubResult;

/// Site occupancy of one moiety in a sublattice formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Moiety {
    /// `{name}` followed by the site index, e.g. `{Fe}0`, `{Va}1`.
    pub name: String,
    pub site: u32,
    pub occupancy: f64,
}

/// Read the moieties of a sublattice formula such as `{Fe}:{Mg}2:Va`.
///
/// Sites are separated by `:`. Returns the number of separators seen and the moieties in
/// formula order; characters outside `{...}` and `Va` are ignored.
pub fn parse_moieties(formula: &str) -> HubResult<(u32, Vec<Moiety>)> {
    let mut scanner = Scanner::new(formula, formula);
    let mut site = 0u32;
    let mut moieties = Vec::new();

    while let Some(c) = scanner.peek() {
        match c {
            ':' => {
                site += 1;
                scanner.bump();
            }
            '{' => {
                scanner.bump();
                let Some(end) = scanner.rest().find('}') else {
                    return Err(scanner.error("Missing closing '}' in moiety"));
                };
                let name = scanner.rest()[..end].to_string();
                scanner.advance(end + 1);
                let occupancy = scanner.scan_real()?.unwrap_or(1.0);
                moieties.push(Moiety {
                    name: format!("{{{}}}{}", name, site),
                    site,
                    occupancy,
                });
            }
            'V' if scanner.peek_second() == Some('a') => {
                scanner.advance(2);
                let occupancy = scanner.scan_real()?.unwrap_or(1.0);
                moieties.push(Moiety {
                    name: format!("{{Va}}{}", site),
                    site,
                    occupancy,
                });
            }
            _ => scanner.bump(),
        }
    }

    Ok((site, moieties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HubError;

    #[test]
    fn test_sublattice_moieties() {
        let (sites, moieties) = parse_moieties("{Fe}:{Mg}2:Va").unwrap();
        assert_eq!(sites, 2);
        let names: Vec<_> = moieties.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["{Fe}0", "{Mg}1", "{Va}2"]);
        assert_eq!(moieties[1].occupancy, 2.0);
        assert_eq!(moieties[2].site, 2);
    }

    #[test]
    fn test_plain_formula_has_no_moieties() {
        let (sites, moieties) = parse_moieties("CaCO3").unwrap();
        assert_eq!(sites, 0);
        assert!(moieties.is_empty());
    }

    #[test]
    fn test_fractional_occupancy() {
        let (_, moieties) = parse_moieties("{Ca}0.5Va0.5:O").unwrap();
        assert_eq!(moieties.len(), 2);
        assert_eq!(moieties[0].occupancy, 0.5);
        assert_eq!(moieties[1].name, "{Va}0");
    }

    #[test]
    fn test_unclosed_moiety() {
        for formula in ["{Fe", "Mg:{"] {
            let err = parse_moieties(formula).unwrap_err();
            assert!(matches!(err, HubError::Formula { .. }));
        }
    }
}
