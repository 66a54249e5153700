//! `Mathematics`: additions and subtractions evaluated left to right.

use rand::Rng;

const MIN_OPERANDS: usize = 2;
const MAX_OPERANDS: usize = 5;
const OPERAND_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

pub(crate) fn generate(rng: &mut impl Rng) -> String {
    let operands = rng.random_range(MIN_OPERANDS..=MAX_OPERANDS);
    let mut expr = rng.random_range(OPERAND_RANGE).to_string();
    for _ in 1..operands {
        let op = if rng.random_bool(0.5) { '+' } else { '-' };
        let n = rng.random_range(OPERAND_RANGE);
        expr.push_str(&format!(" {op} {n}"));
    }
    expr
}

/// Evaluates `a op b op c ...` with `op` in `+`/`-`, no precedence.
pub(crate) fn solve(expr: &str) -> Result<i64, String> {
    let mut tokens = expr.split_whitespace();
    let mut total = parse_operand(tokens.next())?;

    while let Some(op) = tokens.next() {
        let operand = parse_operand(tokens.next())?;
        total = match op {
            "+" => total.checked_add(operand),
            "-" => total.checked_sub(operand),
            other => return Err(format!("unsupported operator {other:?}")),
        }
        .ok_or("result overflows")?;
    }
    Ok(total)
}

fn parse_operand(token: Option<&str>) -> Result<i64, String> {
    let token = token.ok_or("missing operand")?;
    token
        .parse()
        .map_err(|_| format!("operand {token:?} is not an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_evaluates_left_to_right() {
        assert_eq!(solve("5 + 3 - 2").unwrap(), 6);
        assert_eq!(solve("10 - 20 + 5").unwrap(), -5);
        assert_eq!(solve("42").unwrap(), 42);
    }

    #[test]
    fn test_solve_rejects_bad_input() {
        assert!(solve("").is_err());
        assert!(solve("1 +").is_err());
        assert!(solve("1 * 2").is_err());
        assert!(solve("one + 2").is_err());
    }

    #[test]
    fn test_generate_shape() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let expr = generate(&mut rng);
            let tokens: Vec<_> = expr.split(' ').collect();
            let operands = tokens.len().div_ceil(2);
            assert!((MIN_OPERANDS..=MAX_OPERANDS).contains(&operands), "{expr}");
            for (i, t) in tokens.iter().enumerate() {
                if i % 2 == 0 {
                    let n: i64 = t.parse().unwrap();
                    assert!(OPERAND_RANGE.contains(&n));
                } else {
                    assert!(*t == "+" || *t == "-");
                }
            }
        }
    }
}
