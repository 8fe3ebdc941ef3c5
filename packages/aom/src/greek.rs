use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Recognized Greek-letter commands and their glyphs, case-sensitive
pub const GREEK: &[(&str, char)] = &[
    ("alpha", 'α'),
    ("beta", 'β'),
    ("gamma", 'γ'),
    ("delta", 'δ'),
    ("epsilon", 'ε'),
    ("zeta", 'ζ'),
    ("eta", 'η'),
    ("theta", 'θ'),
    ("iota", 'ι'),
    ("kappa", 'κ'),
    ("lambda", 'λ'),
    ("mu", 'μ'),
    ("nu", 'ν'),
    ("xi", 'ξ'),
    ("omicron", 'ο'),
    ("pi", 'π'),
    ("rho", 'ρ'),
    ("sigma", 'σ'),
    ("tau", 'τ'),
    ("upsilon", 'υ'),
    ("phi", 'φ'),
    ("chi", 'χ'),
    ("psi", 'ψ'),
    ("omega", 'ω'),
];

static BY_NAME: Lazy<HashMap<&'static str, char>> =
    Lazy::new(|| GREEK.iter().copied().collect());

static BY_GLYPH: Lazy<HashMap<char, &'static str>> =
    Lazy::new(|| GREEK.iter().map(|(name, glyph)| (*glyph, *name)).collect());

/// The glyph for a Greek-letter command name, if recognized
pub fn glyph_for(name: &str) -> Option<char> {
    BY_NAME.get(name).copied()
}

/// The command name for a Greek glyph, if recognized
pub fn command_for(glyph: char) -> Option<&'static str> {
    BY_GLYPH.get(&glyph).copied()
}
