#![warn(missing_docs)]
//! Line styling vocabulary and the format-string mini-language.
//!
//! A format string is a short token containing at most one color letter, one
//! line-style token and one marker letter in any order (`"r--o"`, `"o--r"` and
//! `"-r-o"` all mean the same thing). Unrecognized characters map to the
//! default for their slot and never raise an error.

use plotters::style::RGBAColor;

/// Enumerated curve colors (the MATLAB one-letter color vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// `r`
    Red,
    /// `g`
    Green,
    /// `b`
    Blue,
    /// `c`
    Cyan,
    /// `m`
    Magenta,
    /// `y`
    Yellow,
    /// `k`
    Black,
    /// `w`
    White,
}

impl Color {
    /// Return the color for a single format letter, if it is one.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'r' => Some(Self::Red),
            'g' => Some(Self::Green),
            'b' => Some(Self::Blue),
            'c' => Some(Self::Cyan),
            'm' => Some(Self::Magenta),
            'y' => Some(Self::Yellow),
            'k' => Some(Self::Black),
            'w' => Some(Self::White),
            _ => None,
        }
    }
    /// Return the format letter of this color.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Cyan => 'c',
            Self::Magenta => 'm',
            Self::Yellow => 'y',
            Self::Black => 'k',
            Self::White => 'w',
        }
    }
    /// Translate into an opaque plotters color.
    #[must_use]
    pub const fn rgba(self) -> RGBAColor {
        match self {
            Self::Red => RGBAColor(255, 0, 0, 1.),
            Self::Green => RGBAColor(0, 160, 0, 1.),
            Self::Blue => RGBAColor(0, 0, 255, 1.),
            Self::Cyan => RGBAColor(0, 200, 200, 1.),
            Self::Magenta => RGBAColor(220, 0, 220, 1.),
            Self::Yellow => RGBAColor(210, 190, 0, 1.),
            Self::Black => RGBAColor(0, 0, 0, 1.),
            Self::White => RGBAColor(255, 255, 255, 1.),
        }
    }
}

/// Enumerated line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// `-`
    Solid,
    /// `:`
    Dotted,
    /// `-.`
    DashDot,
    /// `--`
    Dashed,
}

impl LineStyle {
    /// Return the format token of this line style.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Solid => "-",
            Self::Dotted => ":",
            Self::DashDot => "-.",
            Self::Dashed => "--",
        }
    }
}

/// Enumerated point markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `.`
    Point,
    /// `o`
    Circle,
    /// `x`
    Cross,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// `s`
    Square,
    /// `d`
    Diamond,
    /// `v`
    TriangleDown,
    /// `^`
    TriangleUp,
    /// `<`
    TriangleLeft,
    /// `>`
    TriangleRight,
    /// `p`
    Pentagram,
    /// `h`
    Hexagram,
}

impl Marker {
    /// Return the marker for a single format letter, if it is one.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            '.' => Some(Self::Point),
            'o' => Some(Self::Circle),
            'x' => Some(Self::Cross),
            '+' => Some(Self::Plus),
            '*' => Some(Self::Star),
            's' => Some(Self::Square),
            'd' => Some(Self::Diamond),
            'v' => Some(Self::TriangleDown),
            '^' => Some(Self::TriangleUp),
            '<' => Some(Self::TriangleLeft),
            '>' => Some(Self::TriangleRight),
            'p' => Some(Self::Pentagram),
            'h' => Some(Self::Hexagram),
            _ => None,
        }
    }
    /// Return the format letter of this marker.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Point => '.',
            Self::Circle => 'o',
            Self::Cross => 'x',
            Self::Plus => '+',
            Self::Star => '*',
            Self::Square => 's',
            Self::Diamond => 'd',
            Self::TriangleDown => 'v',
            Self::TriangleUp => '^',
            Self::TriangleLeft => '<',
            Self::TriangleRight => '>',
            Self::Pentagram => 'p',
            Self::Hexagram => 'h',
        }
    }
}

/// Parsed form of a format string. Missing parts stay `None` and fall back to
/// per-command defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatSpec {
    /// curve color, if the string named one
    pub color: Option<Color>,
    /// line style, if the string named one
    pub style: Option<LineStyle>,
    /// point marker, if the string named one
    pub marker: Option<Marker>,
}

impl FormatSpec {
    /// Parse a format string. The parser is one-shot over the fixed alphabet:
    /// adjacent style pairs (`--`, `-.`) are consumed first, then color and
    /// marker letters. Lone dashes are tallied across the whole string, so two
    /// dashes separated by other letters (`"-r-o"`) still mean `--`. When a
    /// slot is named twice the last occurrence wins; unknown characters are
    /// skipped.
    #[must_use]
    pub fn parse(fmt: &str) -> Self {
        let mut spec = Self::default();
        let chars: Vec<char> = fmt.chars().filter(|c| !c.is_whitespace()).collect();
        let mut lone_dashes = 0;
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '-' {
                if i + 1 < chars.len() && chars[i + 1] == '-' {
                    spec.style = Some(LineStyle::Dashed);
                    i += 2;
                    continue;
                }
                if i + 1 < chars.len() && chars[i + 1] == '.' {
                    spec.style = Some(LineStyle::DashDot);
                    i += 2;
                    continue;
                }
                lone_dashes += 1;
                i += 1;
                continue;
            }
            if chars[i] == ':' {
                spec.style = Some(LineStyle::Dotted);
            } else if let Some(color) = Color::from_letter(chars[i]) {
                spec.color = Some(color);
            } else if let Some(marker) = Marker::from_letter(chars[i]) {
                spec.marker = Some(marker);
            }
            i += 1;
        }
        if lone_dashes >= 2 {
            spec.style = Some(LineStyle::Dashed);
        } else if lone_dashes == 1 && spec.style.is_none() {
            spec.style = Some(LineStyle::Solid);
        }
        spec
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn parse_order_independent() {
        let expected = FormatSpec {
            color: Some(Color::Red),
            style: Some(LineStyle::Dashed),
            marker: Some(Marker::Circle),
        };
        assert_eq!(FormatSpec::parse("r--o"), expected);
        assert_eq!(FormatSpec::parse("o--r"), expected);
        assert_eq!(FormatSpec::parse("--or"), expected);
        // the dashes need not be adjacent
        assert_eq!(FormatSpec::parse("-r-o"), expected);
        assert_eq!(FormatSpec::parse("o-r-"), expected);
    }
    #[test]
    fn parse_solid_and_dashdot() {
        assert_eq!(FormatSpec::parse("-").style, Some(LineStyle::Solid));
        assert_eq!(FormatSpec::parse("-.").style, Some(LineStyle::DashDot));
        assert_eq!(FormatSpec::parse(":").style, Some(LineStyle::Dotted));
    }
    #[test]
    fn parse_point_marker_vs_dashdot() {
        // a lone '.' is the point marker, '-.' is a line style
        assert_eq!(FormatSpec::parse(".").marker, Some(Marker::Point));
        assert_eq!(FormatSpec::parse(".").style, None);
        let spec = FormatSpec::parse("-.k");
        assert_eq!(spec.style, Some(LineStyle::DashDot));
        assert_eq!(spec.marker, None);
        assert_eq!(spec.color, Some(Color::Black));
    }
    #[test]
    fn parse_unknown_letters_never_error() {
        let spec = FormatSpec::parse("q#z");
        assert_eq!(spec, FormatSpec::default());
    }
    #[test]
    fn parse_last_occurrence_wins() {
        assert_eq!(FormatSpec::parse("rb").color, Some(Color::Blue));
    }
    #[test]
    fn parse_whitespace_is_ignored() {
        let spec = FormatSpec::parse(" b o ");
        assert_eq!(spec.color, Some(Color::Blue));
        assert_eq!(spec.marker, Some(Marker::Circle));
    }
    #[test]
    fn letters_round_trip() {
        for letter in ['r', 'g', 'b', 'c', 'm', 'y', 'k', 'w'] {
            assert_eq!(Color::from_letter(letter).unwrap().letter(), letter);
        }
        for letter in [
            '.', 'o', 'x', '+', '*', 's', 'd', 'v', '^', '<', '>', 'p', 'h',
        ] {
            assert_eq!(Marker::from_letter(letter).unwrap().letter(), letter);
        }
    }
}
