//! Exact numbers for range and length arithmetic.
//!
//! A [`Number`] stores a sign, an unsigned 64-bit magnitude, and a
//! fraction-digit count (0 for integers, 1-18 for decimal64). The
//! magnitude is the value scaled by `10^fraction_digits`, so `3.14` with
//! two fraction digits is `{value: 314, fraction_digits: 2}`. Ordering
//! scales both sides to a common digit count in 128-bit space, which
//! cannot overflow for any representable pair.

/// A signed decimal number with fixed fraction digits.
#[derive(Debug, Clone, Copy)]
pub struct Number {
    pub negative: bool,
    /// Magnitude, scaled by `10^fraction_digits`.
    pub value: u64,
    pub fraction_digits: u8,
}

impl Number {
    pub fn zero() -> Self {
        Self {
            negative: false,
            value: 0,
            fraction_digits: 0,
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self {
            negative: false,
            value,
            fraction_digits: 0,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        Self {
            negative: value < 0,
            value: value.unsigned_abs(),
            fraction_digits: 0,
        }
    }

    /// A magnitude with explicit sign and fraction digits, `-0` normalised
    /// away.
    pub fn new(negative: bool, value: u64, fraction_digits: u8) -> Self {
        Self {
            negative: negative && value != 0,
            value,
            fraction_digits,
        }
    }

    /// Parse a decimal string with exactly the given fraction digits.
    ///
    /// With `fraction_digits == 0` only plain integers are accepted. A
    /// fractional part may not be longer than `fraction_digits`; shorter
    /// parts are right-padded with zeros.
    pub fn parse(s: &str, fraction_digits: u8) -> Result<Self, String> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if digits.is_empty() {
            return Err(format!("invalid number {s:?}"));
        }

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if fraction_digits == 0 && !frac_part.is_empty() {
            return Err(format!("{s:?} is not an integer"));
        }
        if frac_part.len() > fraction_digits as usize {
            return Err(format!(
                "{s:?} has more than {fraction_digits} fraction digits"
            ));
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid number {s:?}"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(format!("invalid number {s:?}"));
        }

        let mut value: u64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| format!("number {s:?} is out of range"))?
        };
        for _ in 0..fraction_digits {
            value = value
                .checked_mul(10)
                .ok_or_else(|| format!("number {s:?} is out of range"))?;
        }
        if !frac_part.is_empty() {
            let mut frac: u64 = frac_part
                .parse()
                .map_err(|_| format!("number {s:?} is out of range"))?;
            for _ in 0..(fraction_digits as usize - frac_part.len()) {
                frac *= 10;
            }
            value = value
                .checked_add(frac)
                .ok_or_else(|| format!("number {s:?} is out of range"))?;
        }

        Ok(Self::new(negative, value, fraction_digits))
    }

    /// The next representable value with the same fraction digits.
    pub fn succ(self) -> Self {
        if self.negative {
            Self::new(true, self.value - 1, self.fraction_digits)
        } else {
            Self::new(false, self.value.saturating_add(1), self.fraction_digits)
        }
    }

    /// Magnitude scaled to `fraction_digits`, sign applied.
    fn scaled(&self, fraction_digits: u8) -> i128 {
        debug_assert!(fraction_digits >= self.fraction_digits);
        let mut v = self.value as i128;
        for _ in 0..(fraction_digits - self.fraction_digits) {
            v *= 10;
        }
        if self.negative { -v } else { v }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let digits = self.fraction_digits.max(other.fraction_digits);
        self.scaled(digits).cmp(&other.scaled(digits))
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        if self.fraction_digits == 0 {
            return write!(f, "{}", self.value);
        }
        let scale = 10u64.pow(self.fraction_digits as u32);
        write!(
            f,
            "{}.{:0width$}",
            self.value / scale,
            self.value % scale,
            width = self.fraction_digits as usize
        )
    }
}
