//! Complexity scoring.
//!
//! Cyclomatic complexity approximated from lexical tokens: 1 plus one per
//! branching construct. Precise extractors tally the same construct set by
//! walking the syntax tree (`score_branches`); heuristic extractors have no
//! tree, so their bodies go through the token path (`score_tokens`). Both
//! paths score the same constructs, so a given semantic shape gets the same
//! number either way.

use phf::phf_set;

/// Branch keywords counted by the token path.
///
/// Conditionals, loops, exception handlers, case arms, and the word forms
/// of short-circuit operators. `else` is deliberately absent: an
/// `else if` / `elif` chain is counted through its condition keyword.
static BRANCH_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "if",
    "elif",
    "for",
    "while",
    "case",
    "when",
    "catch",
    "except",
    "and",
    "or",
};

/// Score a body token stream.
///
/// Deterministic and pure; an empty body (stub or declaration-only) scores
/// the baseline 1.
pub fn score_tokens(body: &str) -> u32 {
    let mut score: u32 = 1;

    for token in body.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if BRANCH_KEYWORDS.contains(token) {
            score += 1;
        }
    }

    score += count_occurrences(body, "&&");
    score += count_occurrences(body, "||");
    score += count_occurrences(body, "? ");

    score
}

/// Score from a precise branch tally.
pub fn score_branches(branches: u32) -> u32 {
    1 + branches
}

fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    haystack.matches(needle).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_scores_one() {
        assert_eq!(score_tokens(""), 1);
        assert_eq!(score_tokens("   \n  "), 1);
    }

    #[test]
    fn test_straight_line_scores_one() {
        assert_eq!(score_tokens("x = compute(a, b)\nreturn x"), 1);
    }

    #[test]
    fn test_conditionals_and_loops() {
        let body = r#"
if x > 0:
    for item in items:
        while item:
            item -= 1
elif y:
    pass
"#;
        // 1 + if + for + while + elif
        assert_eq!(score_tokens(body), 5);
    }

    #[test]
    fn test_short_circuit_operators() {
        assert_eq!(score_tokens("if (a && b || c) { }"), 4);
        assert_eq!(score_tokens("if a and b or c:"), 4);
    }

    #[test]
    fn test_exception_handlers_and_cases() {
        let body = "try { f() } catch (e) { } switch (x) { case 1: case 2: }";
        // 1 + catch + case + case
        assert_eq!(score_tokens(body), 4);
    }

    #[test]
    fn test_ternary() {
        assert_eq!(score_tokens("const y = x ? 1 : 2;"), 2);
    }

    #[test]
    fn test_branch_tally_agrees_with_tokens() {
        // Same construct set through both paths: 2 ifs, 1 loop, 1 catch.
        let body = "if a { } if b { } for x in xs { } catch e { }";
        assert_eq!(score_tokens(body), score_branches(4));
    }

    #[test]
    fn test_identifier_containing_keyword_not_counted() {
        assert_eq!(score_tokens("modifier = 1\nformat(ordering)"), 1);
    }
}
