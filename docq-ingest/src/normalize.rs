//! Normalization of extracted text before chunking.
//!
//! Scientific PDFs arrive full of Unicode super/subscripts and symbol
//! glyphs that embedding tokenizers mangle; chemical formulae in
//! particular lose their meaning when `H₂O` becomes `H O`. Normalization
//! transliterates those to ASCII, collapses whitespace runs, and strips
//! control characters.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Transliterate one special character, or `None` to keep it as-is.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        // Superscripts (common in chemistry and math)
        '⁰' => "0",
        '¹' => "1",
        '²' => "2",
        '³' => "3",
        '⁴' => "4",
        '⁵' => "5",
        '⁶' => "6",
        '⁷' => "7",
        '⁸' => "8",
        '⁹' => "9",
        '⁺' => "+",
        '⁻' => "-",
        // Subscripts (common in chemical formulas)
        '₀' => "0",
        '₁' => "1",
        '₂' => "2",
        '₃' => "3",
        '₄' => "4",
        '₅' => "5",
        '₆' => "6",
        '₇' => "7",
        '₈' => "8",
        '₉' => "9",
        '₊' => "+",
        '₋' => "-",
        // Greek letters (common in equations)
        'α' => "alpha",
        'β' => "beta",
        'γ' => "gamma",
        'δ' => "delta",
        'ε' => "epsilon",
        'θ' => "theta",
        'λ' => "lambda",
        'μ' => "mu",
        'π' => "pi",
        'ρ' => "rho",
        'σ' => "sigma",
        'φ' => "phi",
        'ω' => "omega",
        // Mathematical symbols
        '×' => "x",
        '÷' => "/",
        '≈' => "~",
        '≡' => "=",
        '≠' => "!=",
        '≤' => "<=",
        '≥' => ">=",
        '∞' => "infinity",
        _ => return None,
    };
    Some(mapped)
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// Clean extracted text while preserving its word content.
///
/// Applies, in order: special-character transliteration, whitespace-run
/// collapse, control-character removal, and trimming. The result is
/// suitable input for word-window chunking; an empty result means the
/// document had no usable text.
pub fn normalize(text: &str) -> String {
    let mut converted = String::with_capacity(text.len());
    for c in text.chars() {
        match transliterate(c) {
            Some(replacement) => converted.push_str(replacement),
            None if is_stripped_control(c) => {}
            None => converted.push(c),
        }
    }

    WHITESPACE_RUN.replace_all(&converted, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("a  b\t\tc\n\nd"), "a b c d");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(normalize("ab\u{01}cd\u{7F}e"), "abcde");
    }

    #[test]
    fn transliterates_chemical_notation() {
        assert_eq!(normalize("H₂O and E = mc²"), "H2O and E = mc2");
        assert_eq!(normalize("SO₄²⁻"), "SO42-");
    }

    #[test]
    fn transliterates_greek_and_math_symbols() {
        assert_eq!(normalize("λ ≥ 3 × α"), "lambda >= 3 x alpha");
    }

    #[test]
    fn blank_input_normalizes_to_empty() {
        assert_eq!(normalize(" \n\t "), "");
    }
}
