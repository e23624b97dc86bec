/// Convert a CSS hex color plus an opacity into KML's `aabbggrr` hex order.
///
/// Alpha is `round(opacity * 255)` after clamping opacity to `[0, 1]`; each
/// channel is 2-digit lowercase hex. Accepts `#rrggbb`, `rrggbb`, or the
/// 3-digit shorthand; unparsable channels fall back to `00` rather than
/// erroring (a wrong color beats a failed export).
pub fn kml_color(hex: &str, opacity: f64) -> String {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String;
    let digits = if digits.len() == 3 {
        expanded = digits.chars().flat_map(|c| [c, c]).collect();
        &expanded
    } else {
        digits
    };

    let channel = |at: usize| {
        digits
            .get(at..at + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0)
    };
    let (r, g, b) = (channel(0), channel(2), channel(4));

    let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    let a = (opacity * 255.0).round() as u8;

    format!("{a:02x}{b:02x}{g:02x}{r:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_conversions() {
        assert_eq!(kml_color("#ff0000", 1.0), "ff0000ff");
        assert_eq!(kml_color("#00ff00", 0.5), "8000ff00");
        assert_eq!(kml_color("#0000ff", 0.0), "00ff0000");
        assert_eq!(kml_color("#10b981", 0.25), "4081b910");
    }

    #[test]
    fn accepts_bare_and_shorthand_hex() {
        assert_eq!(kml_color("ff0000", 1.0), "ff0000ff");
        assert_eq!(kml_color("#f00", 1.0), "ff0000ff");
        assert_eq!(kml_color("#ABC", 1.0), "ffccbbaa");
    }

    #[test]
    fn degrades_on_bad_input() {
        assert_eq!(kml_color("", 1.0), "ff000000");
        assert_eq!(kml_color("#zzzzzz", 1.0), "ff000000");
        assert_eq!(kml_color("#ffffff", 7.0), "ffffffff");
        assert_eq!(kml_color("#ffffff", -1.0), "00ffffff");
        assert_eq!(kml_color("#ffffff", f64::NAN), "ffffffff");
    }

    #[test]
    fn always_eight_lowercase_hex() {
        for (hex, op) in [("#AABBCC", 0.33), ("#123456", 0.77), ("#FEDCBA", 1.0)] {
            let out = kml_color(hex, op);
            assert_eq!(out.len(), 8);
            assert!(out.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
