//! CSS color text parsing.
//!
//! [`Parsers`] dispatches on the syntax prefix of the input (`#`, a function
//! name such as `rgb` or `oklch`, or the first argument of `color(...)`) to
//! the parsers registered for that prefix, trying each in registration order
//! and rewinding the [`Cursor`] between attempts. Malformed text never
//! panics or errors; it yields `None`.
//!
//! A hex or `rgb()` color followed by `icc-color(...)` parses as an ICC
//! color whose RGB part is kept as the fallback:
//!
//! ```rust
//! use pigment_color::{Parsers, SpaceType};
//!
//! let parsed = Parsers::get().parse("#ff0000 icc-color(press, 0, 1, 1, 0)").unwrap();
//! assert_eq!(parsed.space_type, SpaceType::Cms);
//! assert_eq!(parsed.cms_name.as_deref(), Some("press"));
//! assert_eq!(parsed.values, vec![0.0, 1.0, 1.0, 0.0]);
//! assert_eq!(parsed.fallback, Some(vec![1.0, 0.0, 0.0]));
//! ```

use crate::spaces::{
    HslParser, HwbParser, IccColorParser, LabParser, LchParser, NameParser, OkLabParser, OkLchParser,
    RgbParser,
};
use crate::SpaceType;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

/// Everything read from one color string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedColor {
    /// Space the values belong to.
    pub space_type: SpaceType,
    /// ICC profile name from `icc-color(name, ...)`.
    pub cms_name: Option<String>,
    /// Channel values, optionally followed by opacity.
    pub values: Vec<f64>,
    /// sRGB values given ahead of an `icc-color(...)`.
    pub fallback: Option<Vec<f64>>,
}

/// Output of a single [`ColorParser`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    /// Channel values, optionally followed by opacity.
    pub values: Vec<f64>,
    /// Profile name, for `icc-color`.
    pub cms_name: Option<String>,
    /// An `icc-color(...)` follows.
    pub more: bool,
}

impl From<Vec<f64>> for Parsed {
    fn from(values: Vec<f64>) -> Self {
        Self { values, ..Self::default() }
    }
}

/// Reads one color syntax.
pub trait ColorParser: Send + Sync {
    /// Prefix this parser is registered under (`"#"`, `"rgb"`, `""` for bare words).
    fn prefix(&self) -> &str;

    /// Space the parsed values belong to.
    fn space_type(&self) -> SpaceType;

    /// Reads the arguments after the prefix. `None` when the text does not
    /// match; the caller rewinds the cursor.
    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed>;
}

/// Position in the input text with mark/reset checkpoints.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Starts at the beginning of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Current position, for [`reset`](Self::reset).
    pub fn mark(&self) -> usize {
        self.pos
    }

    /// Rewinds to a position from [`mark`](Self::mark).
    pub fn reset(&mut self, mark: usize) {
        self.pos = mark.min(self.text.len());
    }

    /// Unread text.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    /// Consumes and returns the next byte.
    pub fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Skips ASCII whitespace.
    pub fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Skips whitespace, then reads up to the next whitespace.
    pub fn word(&mut self) -> &'a str {
        self.skip_ws();
        self.take_while(|c| !c.is_ascii_whitespace())
    }

    /// Reads a decimal number with optional sign, fraction and exponent.
    fn number(&mut self) -> Option<f64> {
        self.skip_ws();
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let int = self.take_while(|c| c.is_ascii_digit()).len();
        let mut frac = 0;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            frac = self.take_while(|c| c.is_ascii_digit()).len();
        }
        if int + frac == 0 {
            self.pos = start;
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                self.pos = mark;
            }
        }
        match self.text[start..self.pos].parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// Reads a number and its unit up to the separator `sep`, whitespace or
    /// the closing `)`, which sets `end`.
    pub fn css_number(&mut self, sep: Option<u8>, end: &mut bool) -> Option<(f64, String)> {
        let value = self.number()?;
        let mut unit = String::new();
        if matches!(self.peek(), Some(b'.' | b'0'..=b'9')) {
            return Some((value, unit));
        }
        while let Some(c) = self.bump() {
            if c == b')' {
                *end = true;
                break;
            }
            if Some(c) == sep {
                break;
            }
            if c.is_ascii_whitespace() {
                match self.peek() {
                    Some(p) if p.is_ascii_whitespace() || p == b')' || Some(p) == sep => continue,
                    _ => break,
                }
            }
            unit.push(c as char);
        }
        Some((value, unit))
    }

    /// Reads one CSS value and appends it to `output` normalized.
    ///
    /// Unitless values are divided by `scale`, percentages by `pc_scale`,
    /// `deg` by 360 and `turn` is kept. Unknown units fail.
    pub fn append_value(
        &mut self,
        output: &mut Vec<f64>,
        end: &mut bool,
        sep: Option<u8>,
        scale: f64,
        pc_scale: f64,
    ) -> bool {
        if *end {
            return false;
        }
        let Some((value, unit)) = self.css_number(sep, end) else {
            return false;
        };
        let value = match unit.as_str() {
            "" => value / scale,
            "%" => value / pc_scale,
            "deg" => value / 360.0,
            "turn" => value,
            other => {
                warn!(unit = other, "unknown unit in css color");
                return false;
            }
        };
        output.push(value);
        true
    }
}

/// Reads up to three channels plus optional opacity from a function body.
///
/// `scales` gives the unitless scale of each channel; opacity is unscaled.
/// In `legacy` mode channels and opacity are comma separated, otherwise
/// space separated with `/` before the opacity. Succeeds only when the
/// closing parenthesis is reached.
pub(crate) fn function_values(
    cursor: &mut Cursor<'_>,
    scales: [f64; 3],
    legacy: bool,
    max_count: usize,
) -> Option<Vec<f64>> {
    let (sep0, sep1) = if legacy { (Some(b','), Some(b',')) } else { (None, Some(b'/')) };
    let mut output = Vec::with_capacity(4);
    let mut end = false;
    while !end && output.len() < max_count {
        let scale = scales.get(output.len()).copied().unwrap_or(1.0);
        let sep = if output.len() == 2 { sep1 } else { sep0 };
        if !cursor.append_value(&mut output, &mut end, sep, scale, 100.0) {
            break;
        }
    }
    end.then_some(output)
}

/// Reads three channels and an optional `/` opacity, each channel with its
/// own `(unitless, percent)` scale.
pub(crate) fn scaled_values(cursor: &mut Cursor<'_>, scales: [(f64, f64); 3]) -> Option<Vec<f64>> {
    let mut output = Vec::with_capacity(4);
    let mut end = false;
    for (i, (scale, pc_scale)) in scales.into_iter().enumerate() {
        let sep = if i == 2 { Some(b'/') } else { Some(b',') };
        if !cursor.append_value(&mut output, &mut end, sep, scale, pc_scale) {
            return None;
        }
    }
    if !end && !cursor.append_value(&mut output, &mut end, None, 1.0, 100.0) {
        return None;
    }
    end.then_some(output)
}

/// True when the function body at the cursor uses the comma syntax.
pub(crate) fn is_legacy(cursor: &Cursor<'_>) -> bool {
    cursor.rest().split(')').next().is_some_and(|body| body.contains(','))
}

/// True when an `icc-color(...)` follows. Consumes leading whitespace.
pub(crate) fn icc_follows(cursor: &mut Cursor<'_>) -> bool {
    cursor.skip_ws();
    cursor.peek() == Some(b'i')
}

/// Reads the syntax prefix: `#`, a lower-cased function name, the first
/// argument of `color(...)`, or `""` when there is no parenthesis.
pub(crate) fn css_prefix(cursor: &mut Cursor<'_>) -> String {
    cursor.skip_ws();
    if cursor.peek() == Some(b'#') {
        cursor.bump();
        return "#".to_string();
    }
    let Some(paren) = cursor.rest().find('(') else {
        return String::new();
    };
    let mut token = &cursor.rest()[..paren];
    cursor.reset(cursor.mark() + paren + 1);
    if token.eq_ignore_ascii_case("color") {
        token = cursor.word();
    }
    token.to_ascii_lowercase()
}

/// `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`.
struct HexParser;

impl ColorParser for HexParser {
    fn prefix(&self) -> &str {
        "#"
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Rgb
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let digits = cursor.take_while(|c| c.is_ascii_hexdigit());
        if digits.len() > 8 {
            return None;
        }
        let hex = u32::from_str_radix(digits, 16).ok()?;
        let values = match digits.len() {
            3 | 4 => (0..digits.len())
                .rev()
                .map(|i| {
                    let nibble = (hex >> (4 * i)) & 0xf;
                    ((nibble << 4) | nibble) as f64 / 255.0
                })
                .collect(),
            6 => crate::utils::rgba_to_values(hex << 8, false),
            8 => crate::utils::rgba_to_values(hex, true),
            _ => return None,
        };
        let more = icc_follows(cursor);
        Some(Parsed { values, cms_name: None, more })
    }
}

/// Space separated channels with `/` before opacity, e.g. `color(xyz ...)`.
struct CssParser {
    prefix: &'static str,
    space_type: SpaceType,
    channels: usize,
}

impl ColorParser for CssParser {
    fn prefix(&self) -> &str {
        self.prefix
    }

    fn space_type(&self) -> SpaceType {
        self.space_type
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let mut output = Vec::with_capacity(self.channels + 1);
        let mut end = false;
        while !end && output.len() < self.channels + 1 {
            let sep = if output.len() + 1 == self.channels { Some(b'/') } else { None };
            if !cursor.append_value(&mut output, &mut end, sep, 1.0, 100.0) {
                break;
            }
        }
        end.then(|| output.into())
    }
}

/// Registry of color parsers keyed by prefix.
pub struct Parsers {
    parsers: HashMap<String, Vec<Box<dyn ColorParser>>>,
}

impl Parsers {
    /// A registry with no parsers.
    pub fn empty() -> Self {
        Self { parsers: HashMap::new() }
    }

    /// A registry with every built-in syntax.
    pub fn new() -> Self {
        let mut parsers = Self::empty();
        parsers.add_parser(Box::new(HexParser));
        parsers.add_parser(Box::new(NameParser));
        parsers.add_parser(Box::new(IccColorParser));
        parsers.add_parser(Box::new(RgbParser { alpha: false }));
        parsers.add_parser(Box::new(RgbParser { alpha: true }));
        parsers.add_parser(Box::new(HslParser { alpha: false }));
        parsers.add_parser(Box::new(HslParser { alpha: true }));
        parsers.add_parser(Box::new(HwbParser { alpha: false }));
        parsers.add_parser(Box::new(HwbParser { alpha: true }));
        parsers.add_parser(Box::new(LabParser));
        parsers.add_parser(Box::new(LchParser));
        parsers.add_parser(Box::new(OkLabParser));
        parsers.add_parser(Box::new(OkLchParser));
        for (prefix, space_type, channels) in [
            ("srgb", SpaceType::Rgb, 3),
            ("srgb-linear", SpaceType::LinearRgb, 3),
            ("device-cmyk", SpaceType::Cmyk, 4),
            ("xyz", SpaceType::Xyz, 3),
            ("xyz-d65", SpaceType::Xyz, 3),
            ("xyz-d50", SpaceType::Xyz50, 3),
        ] {
            parsers.add_parser(Box::new(CssParser { prefix, space_type, channels }));
        }
        parsers
    }

    /// The shared built-in registry.
    pub fn get() -> &'static Parsers {
        static PARSERS: OnceLock<Parsers> = OnceLock::new();
        PARSERS.get_or_init(Parsers::new)
    }

    /// Adds a parser after those already registered for its prefix.
    pub fn add_parser(&mut self, parser: Box<dyn ColorParser>) {
        self.parsers.entry(parser.prefix().to_string()).or_default().push(parser);
    }

    /// Parses a color string.
    pub fn parse(&self, text: &str) -> Option<ParsedColor> {
        self.parse_at(&mut Cursor::new(text))
    }

    fn parse_at(&self, cursor: &mut Cursor<'_>) -> Option<ParsedColor> {
        let prefix = css_prefix(cursor);
        let candidates = self.parsers.get(&prefix)?;
        for parser in candidates {
            let mark = cursor.mark();
            if let Some(parsed) = parser.parse(cursor).filter(|p| !p.values.is_empty()) {
                if parsed.more {
                    let after = cursor.mark();
                    if let Some(icc) = self.parse_at(cursor).filter(|icc| icc.space_type == SpaceType::Cms) {
                        return Some(ParsedColor { fallback: Some(parsed.values), ..icc });
                    }
                    cursor.reset(after);
                }
                return Some(ParsedColor {
                    space_type: parser.space_type(),
                    cms_name: parsed.cms_name,
                    values: parsed.values,
                    fallback: None,
                });
            }
            cursor.reset(mark);
        }
        None
    }
}

impl Default for Parsers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut prefixes: Vec<&String> = self.parsers.keys().collect();
        prefixes.sort();
        f.debug_struct("Parsers").field("prefixes", &prefixes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parse(text: &str) -> Option<ParsedColor> {
        Parsers::get().parse(text)
    }

    fn assert_values(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_css_prefix() {
        let mut c = Cursor::new("  #fff");
        assert_eq!(css_prefix(&mut c), "#");
        assert_eq!(c.rest(), "fff");

        let mut c = Cursor::new("RGB(1 2 3)");
        assert_eq!(css_prefix(&mut c), "rgb");
        assert_eq!(c.rest(), "1 2 3)");

        let mut c = Cursor::new("color(srgb-linear 1 0 0)");
        assert_eq!(css_prefix(&mut c), "srgb-linear");

        let mut c = Cursor::new("red");
        assert_eq!(css_prefix(&mut c), "");
        assert_eq!(c.rest(), "red");
    }

    #[test]
    fn test_css_number_units() {
        let mut c = Cursor::new("50% 0.5turn 90deg 2em)");
        let mut end = false;
        let mut out = Vec::new();
        assert!(c.append_value(&mut out, &mut end, None, 1.0, 100.0));
        assert!(c.append_value(&mut out, &mut end, None, 1.0, 100.0));
        assert!(c.append_value(&mut out, &mut end, None, 1.0, 100.0));
        assert!(!c.append_value(&mut out, &mut end, None, 1.0, 100.0));
        assert_values(&out, &[0.5, 0.5, 0.25]);
    }

    #[test]
    fn test_css_number_end_and_separator() {
        let mut c = Cursor::new("1 , 2 / 3)");
        let mut end = false;
        let mut out = Vec::new();
        assert!(c.append_value(&mut out, &mut end, Some(b','), 1.0, 100.0));
        assert!(c.append_value(&mut out, &mut end, Some(b'/'), 1.0, 100.0));
        assert!(!end);
        assert!(c.append_value(&mut out, &mut end, None, 1.0, 100.0));
        assert!(end);
        assert!(!c.append_value(&mut out, &mut end, None, 1.0, 100.0));
        assert_values(&out, &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_number_forms() {
        for (text, expected) in [("-.5)", -0.5), ("+2)", 2.0), ("1e2)", 100.0), ("5.)", 5.0)] {
            let mut end = false;
            let (value, unit) = Cursor::new(text).css_number(None, &mut end).unwrap();
            assert_abs_diff_eq!(value, expected);
            assert!(unit.is_empty() && end, "{text}");
        }
        let mut end = false;
        assert!(Cursor::new("x)").css_number(None, &mut end).is_none());
    }

    #[test]
    fn test_hex() {
        let p = parse("#ff0000").unwrap();
        assert_eq!(p.space_type, SpaceType::Rgb);
        assert_values(&p.values, &[1.0, 0.0, 0.0]);

        assert_values(&parse("#f0c").unwrap().values, &[1.0, 0.0, 0.8]);
        assert_values(&parse("#f0c8").unwrap().values, &[1.0, 0.0, 0.8, 0x88 as f64 / 255.0]);
        assert_values(&parse("#11223380").unwrap().values, &[
            0x11 as f64 / 255.0,
            0x22 as f64 / 255.0,
            0x33 as f64 / 255.0,
            0x80 as f64 / 255.0,
        ]);
        assert!(parse("#12345").is_none());
        assert!(parse("#").is_none());
        assert!(parse("#123456789").is_none());
    }

    #[test]
    fn test_hex_with_icc_fallback() {
        let p = parse("#112233 icc-color(myprofile, 0.1, 0.2, 0.3)").unwrap();
        assert_eq!(p.space_type, SpaceType::Cms);
        assert_eq!(p.cms_name.as_deref(), Some("myprofile"));
        assert_values(&p.values, &[0.1, 0.2, 0.3]);
        assert_values(p.fallback.as_deref().unwrap(), &[
            0x11 as f64 / 255.0,
            0x22 as f64 / 255.0,
            0x33 as f64 / 255.0,
        ]);
    }

    #[test]
    fn test_bare_icc_color() {
        let p = parse("icc-color(Some-Profile, 1, 0.5, 0%, 25%)").unwrap();
        assert_eq!(p.space_type, SpaceType::Cms);
        assert_eq!(p.cms_name.as_deref(), Some("Some-Profile"));
        assert_values(&p.values, &[1.0, 0.5, 0.0, 0.25]);
        assert!(p.fallback.is_none());
    }

    #[test]
    fn test_color_function() {
        let p = parse("color(srgb 1 0.5 0 / 50%)").unwrap();
        assert_eq!(p.space_type, SpaceType::Rgb);
        assert_values(&p.values, &[1.0, 0.5, 0.0, 0.5]);

        let p = parse("color(xyz-d50 0.9642 1 0.8249)").unwrap();
        assert_eq!(p.space_type, SpaceType::Xyz50);

        let p = parse("color(xyz 0.1 0.2 0.3)").unwrap();
        assert_eq!(p.space_type, SpaceType::Xyz);

        let p = parse("device-cmyk(0 20% 0.2 0.2)").unwrap();
        assert_eq!(p.space_type, SpaceType::Cmyk);
        assert_values(&p.values, &[0.0, 0.2, 0.2, 0.2]);

        assert!(parse("color(unknown 1 2 3)").is_none());
        assert!(parse("color(srgb 1 0.5").is_none());
    }

    #[test]
    fn test_unknown_prefix_and_garbage() {
        assert!(parse("").is_none());
        assert!(parse("notacolor").is_none());
        assert!(parse("foo(1 2 3)").is_none());
        assert!(parse("rgb(1 2 3").is_none());
    }

    #[test]
    fn test_custom_parser() {
        struct Always;
        impl ColorParser for Always {
            fn prefix(&self) -> &str {
                "gray"
            }
            fn space_type(&self) -> SpaceType {
                SpaceType::Gray
            }
            fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
                let mut out = Vec::new();
                let mut end = false;
                cursor.append_value(&mut out, &mut end, None, 100.0, 100.0);
                end.then(|| out.into())
            }
        }
        let mut parsers = Parsers::empty();
        parsers.add_parser(Box::new(Always));
        let p = parsers.parse("gray(50)").unwrap();
        assert_eq!(p.space_type, SpaceType::Gray);
        assert_values(&p.values, &[0.5]);
        assert!(parsers.parse("#fff").is_none());
    }
}
