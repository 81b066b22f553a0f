//! `range` and `length` argument parsing.
//!
//! Syntax: `part ("|" part)*`, each part a single bound or `lo .. hi`.
//! The sentinels `min`/`max` resolve against the parent type's range at
//! parse time. Parsing yields a sorted, coalesced list of disjoint closed
//! intervals; adjacency for coalescing is one quantum of the type's
//! fraction digits.

use super::number::Number;

/// One closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeInterval {
    pub min: Number,
    pub max: Number,
}

/// An ordered set of disjoint, non-overlapping closed intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YangRange(pub Vec<RangeInterval>);

impl YangRange {
    /// A single-interval range.
    pub fn span(min: Number, max: Number) -> Self {
        Self(vec![RangeInterval { min, max }])
    }

    /// The smallest admitted value.
    pub fn low(&self) -> Number {
        self.0.first().expect("range is never empty").min
    }

    /// The largest admitted value.
    pub fn high(&self) -> Number {
        self.0.last().expect("range is never empty").max
    }

    /// Parse a range argument. `parent` supplies `min`/`max` and the
    /// containment bound; `fraction_digits` is 0 except for decimal64.
    pub fn parse(argument: &str, parent: &YangRange, fraction_digits: u8) -> Result<Self, String> {
        let mut intervals = Vec::new();
        for part in argument.split('|') {
            let part = part.trim();
            if part.is_empty() {
                return Err(format!("empty part in range {argument:?}"));
            }
            let (lo, hi) = match part.split_once("..") {
                Some((lo, hi)) => {
                    let lo = parse_bound(lo.trim(), parent, fraction_digits)?;
                    let hi = parse_bound(hi.trim(), parent, fraction_digits)?;
                    (lo, hi)
                }
                None => {
                    let bound = parse_bound(part, parent, fraction_digits)?;
                    (bound, bound)
                }
            };
            if lo > hi {
                return Err(format!("range boundaries out of order in {part:?}"));
            }
            intervals.push(RangeInterval { min: lo, max: hi });
        }

        intervals.sort_by(|a, b| a.min.cmp(&b.min).then(a.max.cmp(&b.max)));
        let mut coalesced: Vec<RangeInterval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match coalesced.last_mut() {
                // adjacent or overlapping intervals merge; adjacency is one
                // quantum at the current fraction-digit count
                Some(last) if interval.min <= last.max.succ() => {
                    if interval.max > last.max {
                        last.max = interval.max;
                    }
                }
                _ => coalesced.push(interval),
            }
        }
        Ok(Self(coalesced))
    }

    /// Whether every interval of `other` fits inside one of ours.
    pub fn contains_range(&self, other: &YangRange) -> bool {
        other.0.iter().all(|needle| {
            self.0
                .iter()
                .any(|hay| hay.min <= needle.min && needle.max <= hay.max)
        })
    }

    /// Whether a single value is admitted.
    pub fn contains(&self, n: Number) -> bool {
        self.0.iter().any(|i| i.min <= n && n <= i.max)
    }
}

impl std::fmt::Display for YangRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, interval) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            if interval.min == interval.max {
                write!(f, "{}", interval.min)?;
            } else {
                write!(f, "{}..{}", interval.min, interval.max)?;
            }
        }
        Ok(())
    }
}

fn parse_bound(s: &str, parent: &YangRange, fraction_digits: u8) -> Result<Number, String> {
    match s {
        "min" => Ok(parent.low()),
        "max" => Ok(parent.high()),
        _ => Number::parse(s, fraction_digits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_i8() -> YangRange {
        YangRange::span(Number::from_i64(-128), Number::from_i64(127))
    }

    fn parse(arg: &str) -> YangRange {
        YangRange::parse(arg, &parent_i8(), 0).unwrap()
    }

    #[test]
    fn single_values_and_spans() {
        assert_eq!(parse("1..5 | 10").to_string(), "1..5 | 10");
        assert_eq!(parse("7").to_string(), "7");
    }

    #[test]
    fn sorts_and_coalesces() {
        assert_eq!(parse("10..20 | 1..5").to_string(), "1..5 | 10..20");
        assert_eq!(parse("1..5 | 6..9").to_string(), "1..9");
        assert_eq!(parse("1..5 | 4..9").to_string(), "1..9");
        assert_eq!(parse("1..5 | 7..9").to_string(), "1..5 | 7..9");
    }

    #[test]
    fn min_max_resolve_against_parent() {
        assert_eq!(parse("min..0").to_string(), "-128..0");
        assert_eq!(parse("0..max").to_string(), "0..127");
    }

    #[test]
    fn decimal_adjacency_uses_quantum() {
        let parent = YangRange::span(
            Number::parse("-10.0", 1).unwrap(),
            Number::parse("10.0", 1).unwrap(),
        );
        let merged = YangRange::parse("1.0..2.0 | 2.1..3.0", &parent, 1).unwrap();
        assert_eq!(merged.to_string(), "1.0..3.0");
        let split = YangRange::parse("1.0..2.0 | 2.2..3.0", &parent, 1).unwrap();
        assert_eq!(split.0.len(), 2);
    }

    #[test]
    fn out_of_order_bounds_fail() {
        assert!(YangRange::parse("5..1", &parent_i8(), 0).is_err());
    }

    #[test]
    fn containment() {
        let parent = parse("1..10 | 20..30");
        assert!(parent.contains_range(&parse("2..5 | 25")));
        assert!(!parent.contains_range(&parse("5..25")));
    }

    #[test]
    fn whitespace_tolerant() {
        assert_eq!(parse("  1 ..  5|7 .. 9 ").to_string(), "1..5 | 7..9");
    }
}
