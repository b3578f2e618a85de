//! CSS color text output.

use tracing::error;

/// Builds CSS color function text such as `lab(50 20 -30 / 50%)`.
///
/// Push exactly the declared number of channels. One value pushed past
/// that becomes the opacity, printed as a `/ NN%` suffix. A printer that
/// did not receive its channels prints nothing.
///
/// # Example
///
/// ```rust
/// use pigment_color::CssPrinter;
///
/// let css = CssPrinter::func("hsl", 3).push(120.0).push(50.0).push(25.0).push(0.5).finish();
/// assert_eq!(css, "hsl(120 50 25 / 50%)");
///
/// let css = CssPrinter::icc_color("press", 2).values(&[0.1, 1.0]).finish();
/// assert_eq!(css, "icc-color(press, 0.1, 1)");
/// ```
#[derive(Debug, Clone)]
pub struct CssPrinter {
    head: String,
    sep: &'static str,
    channels: usize,
    values: Vec<f64>,
    opacity: Option<f64>,
}

impl CssPrinter {
    fn with_head(head: String, sep: &'static str, channels: usize) -> Self {
        Self { head, sep, channels, values: Vec::with_capacity(channels), opacity: None }
    }

    /// `name(c1 c2 c3)`.
    pub fn func(name: &str, channels: usize) -> Self {
        Self::with_head(format!("{name}("), " ", channels)
    }

    /// `color(ident c1 c2 c3)`.
    pub fn color(ident: &str, channels: usize) -> Self {
        Self::with_head(format!("color({ident} "), " ", channels)
    }

    /// `icc-color(name, c1, c2, ...)`.
    pub fn icc_color(name: &str, channels: usize) -> Self {
        Self::with_head(format!("icc-color({name}, "), ", ", channels)
    }

    /// Appends a channel, or the opacity once every channel is in.
    pub fn push(mut self, value: f64) -> Self {
        if self.values.len() < self.channels {
            self.values.push(value);
        } else {
            self.opacity = Some(value);
        }
        self
    }

    /// Appends several values with [`push`](Self::push).
    pub fn values(self, values: &[f64]) -> Self {
        values.iter().fold(self, |p, v| p.push(*v))
    }

    /// Sets or clears the opacity suffix.
    pub fn opacity(mut self, opacity: Option<f64>) -> Self {
        self.opacity = opacity;
        self
    }

    /// The finished text, or empty when channels are missing.
    pub fn finish(self) -> String {
        if self.values.len() != self.channels {
            error!(
                head = %self.head,
                expected = self.channels,
                actual = self.values.len(),
                "incomplete css color"
            );
            return String::new();
        }
        let body: Vec<String> = self.values.iter().map(|v| format_number(*v)).collect();
        let mut out = self.head;
        out.push_str(&body.join(self.sep));
        if let Some(opacity) = self.opacity {
            out.push_str(" / ");
            out.push_str(&format_number(opacity * 100.0));
            out.push('%');
        }
        out.push(')');
        out
    }
}

/// Formats with at most three decimals, without trailing zeros or `-0`.
pub fn format_number(value: f64) -> String {
    let mut rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 || !rounded.is_finite() {
        rounded = 0.0;
    }
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.12345), "0.123");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(-12.5), "-12.5");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_func() {
        let css = CssPrinter::func("lab", 3).values(&[50.0, -20.0, 30.5]).finish();
        assert_eq!(css, "lab(50 -20 30.5)");
    }

    #[test]
    fn test_color_with_opacity() {
        let css = CssPrinter::color("srgb-linear", 3).values(&[1.0, 0.0, 0.25]).opacity(Some(0.333)).finish();
        assert_eq!(css, "color(srgb-linear 1 0 0.25 / 33.3%)");
    }

    #[test]
    fn test_missing_channels_print_nothing() {
        assert_eq!(CssPrinter::func("hsl", 3).push(1.0).finish(), "");
    }
}
