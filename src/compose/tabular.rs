//! Table column specifications: `|l|c|r|`, `p{3cm}`, `*{3}{c|}`.
//!
//! Grammar (whitespace is ignored):
//!
//! ```text
//! spec   := item*
//! item   := 'l' | 'c' | 'r' | '|'
//!         | ('p' | 'm' | 'b') group          fixed width column
//!         | '*' group group                  repeat group (not nestable)
//!         | ('@' | '!' | '>' | '<') group    ignored decorations
//!         | group                            transparent braces
//! group  := '{' balanced '}'
//! ```

use rustc_hash::FxHashSet;

use crate::error::{CompositeError, CompositeResult};
use crate::shape::{Align, CellBorders};
use crate::units::Length;

/// Upper bound on columns produced by one specification.
pub const MAX_COLUMNS: usize = 256;

/// One column of a specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub align: Align,
    /// Fixed width (`p{...}`)
    pub width: Option<Length>,
}

/// Parsed column specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularSpec {
    pub columns: Vec<ColumnSpec>,
    /// Vertical borders; `i` is the line left of column `i`
    pub borders: FxHashSet<usize>,
}

impl TabularSpec {
    /// Parse a column specification.
    pub fn parse(spec: &str) -> CompositeResult<TabularSpec> {
        let chars: Vec<char> = spec.chars().filter(|c| !c.is_whitespace()).collect();
        let mut parser = Parser {
            chars: &chars,
            pos: 0,
            out: TabularSpec::default(),
        };
        parser.items(true, false)?;
        Ok(parser.out)
    }

    /// Parse the one-column specification of a `\multicolumn` cell.
    pub fn parse_cell(spec: &str) -> CompositeResult<(ColumnSpec, CellBorders)> {
        let parsed = Self::parse(spec)?;
        let Some(&column) = parsed.columns.first() else {
            return Err(CompositeError::structural(format!(
                "multicolumn specification {spec:?} has no column"
            )));
        };
        if parsed.columns.len() > 1 {
            log::debug!("multicolumn specification {spec:?} has extra columns");
        }
        let borders = CellBorders {
            left: Some(parsed.borders.contains(&0)),
            right: Some(parsed.borders.contains(&1)),
        };
        Ok((column, borders))
    }
}

struct Parser<'s> {
    chars: &'s [char],
    pos: usize,
    out: TabularSpec,
}

impl Parser<'_> {
    /// Parse items until the end of input (top level) or a closing brace.
    fn items(&mut self, allow_repeat: bool, nested: bool) -> CompositeResult<()> {
        while let Some(&ch) = self.chars.get(self.pos) {
            self.pos += 1;
            match ch {
                '|' => {
                    self.out.borders.insert(self.out.columns.len());
                }
                'l' => self.push(Align::Left, None)?,
                'c' => self.push(Align::Center, None)?,
                'r' => self.push(Align::Right, None)?,
                'p' | 'm' | 'b' => {
                    let group = self.group(ch)?;
                    let width = Length::parse(&group).ok_or_else(|| {
                        CompositeError::structural(format!("invalid column width {group:?}"))
                    })?;
                    self.push(Align::Left, Some(width))?;
                }
                '*' => {
                    if !allow_repeat {
                        return Err(CompositeError::structural("nested repeat group"));
                    }
                    let count = self.group('*')?;
                    let count: usize = count.parse().map_err(|_| {
                        CompositeError::structural(format!("invalid repeat count {count:?}"))
                    })?;
                    if count > MAX_COLUMNS {
                        return Err(CompositeError::structural(format!(
                            "repeat count {count} exceeds {MAX_COLUMNS}"
                        )));
                    }
                    let inner: Vec<char> = self.group('*')?.chars().collect();
                    for _ in 0..count {
                        let mut sub = Parser {
                            chars: &inner,
                            pos: 0,
                            out: std::mem::take(&mut self.out),
                        };
                        let result = sub.items(false, false);
                        self.out = sub.out;
                        result?;
                    }
                }
                '@' | '!' | '>' | '<' => {
                    self.group(ch)?;
                }
                '{' => self.items(allow_repeat, true)?,
                '}' if nested => return Ok(()),
                '}' => return Err(CompositeError::structural("unbalanced '}'")),
                other => log::debug!("ignoring column specifier {other:?}"),
            }
        }

        if nested {
            return Err(CompositeError::structural("unbalanced '{'"));
        }
        Ok(())
    }

    fn push(&mut self, align: Align, width: Option<Length>) -> CompositeResult<()> {
        if self.out.columns.len() >= MAX_COLUMNS {
            return Err(CompositeError::structural(format!(
                "more than {MAX_COLUMNS} columns"
            )));
        }
        self.out.columns.push(ColumnSpec { align, width });
        Ok(())
    }

    /// Read a brace group following `owner`, returning its inner text.
    fn group(&mut self, owner: char) -> CompositeResult<String> {
        if self.chars.get(self.pos) != Some(&'{') {
            return Err(CompositeError::structural(format!(
                "expected '{{' after '{owner}'"
            )));
        }
        self.pos += 1;

        let start = self.pos;
        let mut depth = 1usize;
        while let Some(&ch) = self.chars.get(self.pos) {
            self.pos += 1;
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.chars[start..self.pos - 1].iter().collect());
                    }
                }
                _ => {}
            }
        }
        Err(CompositeError::structural(format!(
            "unterminated group after '{owner}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::PT_PER_CM;

    fn aligns(spec: &TabularSpec) -> Vec<Align> {
        spec.columns.iter().map(|c| c.align).collect()
    }

    #[test]
    fn test_simple_columns_and_borders() {
        let spec = TabularSpec::parse("|l|c r|").unwrap();
        assert_eq!(aligns(&spec), vec![Align::Left, Align::Center, Align::Right]);
        let mut borders: Vec<_> = spec.borders.iter().copied().collect();
        borders.sort_unstable();
        assert_eq!(borders, vec![0, 1, 3]);
    }

    #[test]
    fn test_fixed_width() {
        let spec = TabularSpec::parse("p{2cm}|l").unwrap();
        assert_eq!(spec.columns.len(), 2);
        assert_eq!(spec.columns[0].width, Some(Length::Points(2.0 * PT_PER_CM)));
        assert!(spec.borders.contains(&1));
    }

    #[test]
    fn test_repeat_group() {
        let spec = TabularSpec::parse("|*{3}{c|}").unwrap();
        assert_eq!(spec.columns.len(), 3);
        let mut borders: Vec<_> = spec.borders.iter().copied().collect();
        borders.sort_unstable();
        assert_eq!(borders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_repeat_group_with_width() {
        let spec = TabularSpec::parse("{l*{2}{rp{1cm}}l}").unwrap();
        assert_eq!(
            aligns(&spec),
            vec![Align::Left, Align::Right, Align::Left, Align::Right, Align::Left, Align::Left]
        );
        assert_eq!(spec.columns[2].width, Some(Length::Points(PT_PER_CM)));
        assert_eq!(spec.columns[1].width, None);
    }

    #[test]
    fn test_decorations_are_skipped() {
        let spec = TabularSpec::parse("@{}l>{\\bfseries}c@{}").unwrap();
        assert_eq!(aligns(&spec), vec![Align::Left, Align::Center]);
    }

    #[test]
    fn test_malformed_specs() {
        for spec in ["*{x}{c}", "*{2}c", "*{2}{*{2}{c}}", "p{abc}", "p{2cm", "l}", "{l", "p"] {
            assert!(
                matches!(TabularSpec::parse(spec), Err(CompositeError::Structural(_))),
                "{spec}"
            );
        }
    }

    #[test]
    fn test_repeat_count_is_bounded() {
        for spec in ["*{18446744073709551615}{|}", "*{1000}{@{}}", "*{257}{}"] {
            assert!(
                matches!(TabularSpec::parse(spec), Err(CompositeError::Structural(_))),
                "{spec}"
            );
        }
        let spec = TabularSpec::parse("*{256}{|}").unwrap();
        assert!(spec.columns.is_empty());
        assert_eq!(spec.borders.len(), 1);
    }

    #[test]
    fn test_cell_spec() {
        let (column, borders) = TabularSpec::parse_cell("|c|").unwrap();
        assert_eq!(column.align, Align::Center);
        assert_eq!(borders, CellBorders { left: Some(true), right: Some(true) });

        let (_, borders) = TabularSpec::parse_cell("r").unwrap();
        assert_eq!(borders, CellBorders { left: Some(false), right: Some(false) });

        assert!(TabularSpec::parse_cell("|").is_err());
    }
}
