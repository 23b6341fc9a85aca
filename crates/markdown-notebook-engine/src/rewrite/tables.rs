//! Ready-made literal substitution tables.

/// `^0`..`^9`, `^n` and `^i` to Unicode superscripts.
pub const POWERS: &[(&str, &str)] = &[
    ("^0", "⁰"),
    ("^1", "¹"),
    ("^2", "²"),
    ("^3", "³"),
    ("^4", "⁴"),
    ("^5", "⁵"),
    ("^6", "⁶"),
    ("^7", "⁷"),
    ("^8", "⁸"),
    ("^9", "⁹"),
    ("^n", "ⁿ"),
    ("^i", "ⁱ"),
];

/// Common fractions to their vulgar fraction characters.
pub const FRACTIONS: &[(&str, &str)] = &[
    ("1/10", "⅒"),
    ("1/2", "½"),
    ("1/3", "⅓"),
    ("1/4", "¼"),
    ("1/5", "⅕"),
    ("1/6", "⅙"),
    ("1/7", "⅐"),
    ("1/8", "⅛"),
    ("1/9", "⅑"),
    ("2/3", "⅔"),
    ("3/4", "¾"),
];
