//! Placeholder substitution for configured message texts.
//!
//! Templates use brace placeholders:
//!
//! - `{}` — the next positional argument
//! - `{0}`, `{1}` — a positional argument by index
//! - `{name}` — a named argument
//! - `{{` and `}}` — literal braces
//!
//! A placeholder with no matching argument is copied through unchanged,
//! so a typo in a configuration file shows up verbatim in the client
//! instead of failing the session.

/// Renders `template` with the given arguments.
///
/// ```rust
/// use trivia_round::templates::render;
///
/// assert_eq!(render("Winner: {}", &["alice"], &[]), "Winner: alice");
/// assert_eq!(
///     render("Wrong! It was {correct_answer}", &[], &[("correct_answer", "7")]),
///     "Wrong! It was 7"
/// );
/// ```
pub fn render(template: &str, positional: &[&str], named: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_positional = 0;
    let mut rest = template;

    while let Some(i) = rest.find(['{', '}']) {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        let key = &tail[1..close];
        let placeholder = &tail[..=close];

        let value = if key.is_empty() {
            let value = positional.get(next_positional).copied();
            next_positional += 1;
            value
        } else if let Ok(index) = key.parse::<usize>() {
            positional.get(index).copied()
        } else {
            named.iter().find(|(name, _)| *name == key).map(|(_, v)| *v)
        };

        out.push_str(value.unwrap_or(placeholder));
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_positional_in_order() {
        assert_eq!(render("{} and {}", &["a", "b"], &[]), "a and b");
    }

    #[test]
    fn test_render_indexed_positional() {
        assert_eq!(render("{1} before {0}", &["a", "b"], &[]), "b before a");
    }

    #[test]
    fn test_render_named() {
        assert_eq!(
            render(
                "Game starts in {question_interval_seconds} seconds!",
                &[],
                &[("question_interval_seconds", "3")]
            ),
            "Game starts in 3 seconds!"
        );
    }

    #[test]
    fn test_render_mixes_named_and_repeated() {
        assert_eq!(
            render(
                "{answer} is not {correct_answer} ({answer})",
                &[],
                &[("answer", "5"), ("correct_answer", "6")]
            ),
            "5 is not 6 (5)"
        );
    }

    #[test]
    fn test_render_escaped_braces() {
        assert_eq!(render("{{literal}} {}", &["x"], &[]), "{literal} x");
    }

    #[test]
    fn test_render_unknown_placeholder_is_kept() {
        assert_eq!(render("Hi {nobody} {}", &[], &[]), "Hi {nobody} {}");
    }

    #[test]
    fn test_render_unclosed_brace_is_kept() {
        assert_eq!(render("oops {", &[], &[]), "oops {");
    }

    #[test]
    fn test_render_multiline_value() {
        assert_eq!(render("Calculate: {}", &["1 + 2"], &[]), "Calculate: 1 + 2");
        assert_eq!(render("{}\n{}", &["a", "b"], &[]), "a\nb");
    }
}
