//! `Roman Numerals`: convert a numeral in 1..=3999 to decimal.

use rand::Rng;

const NUMERALS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

pub(crate) fn generate(rng: &mut impl Rng) -> String {
    to_roman(rng.random_range(1..=3999))
}

pub(crate) fn to_roman(mut n: u32) -> String {
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Reads right to left, subtracting a symbol smaller than the one read
/// just before it.
pub(crate) fn solve(numeral: &str) -> Result<u32, String> {
    if numeral.is_empty() {
        return Err("empty numeral".into());
    }

    let mut total: i64 = 0;
    let mut prev = 0;
    for c in numeral.chars().rev() {
        let value = symbol_value(c).ok_or_else(|| format!("{c:?} is not a roman digit"))?;
        if value < prev {
            total -= value;
        } else {
            total += value;
        }
        prev = value;
    }

    u32::try_from(total).map_err(|_| format!("{numeral} does not denote a non-negative number"))
}

fn symbol_value(c: char) -> Option<i64> {
    Some(match c {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => return None,
    })
}
