use serde::Serialize;

use crate::{error::ValidationError, reference::hex_digits, serialize_compact};

/// A color in the normalized form the variables API expects: every channel in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    #[serde(serialize_with = "serialize_compact")]
    pub r: f64,
    #[serde(serialize_with = "serialize_compact")]
    pub g: f64,
    #[serde(serialize_with = "serialize_compact")]
    pub b: f64,
    #[serde(serialize_with = "serialize_compact")]
    pub a: f64,
}

/// Converts `#RRGGBB` into [`Rgba`]. Alpha is always fully opaque.
///
/// `token` only names the offending entry in the error.
pub fn hex_to_rgba(token: &str, hex: &str) -> Result<Rgba, ValidationError> {
    let malformed = || ValidationError::MalformedHex {
        token: token.to_string(),
        value: hex.to_string(),
    };
    let digits = hex_digits(hex).ok_or_else(malformed)?;
    let color = csscolorparser::parse(&format!("#{digits}")).map_err(|_| malformed())?;
    Ok(Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_black() {
        assert_eq!(
            hex_to_rgba("white", "#FFFFFF").unwrap(),
            Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
        );
        assert_eq!(
            hex_to_rgba("black", "#000000").unwrap(),
            Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
        );
    }

    #[test]
    fn channels_are_bytes_over_255() {
        let color = hex_to_rgba("ember/500", "#D4854A").unwrap();
        assert!((color.r - 212.0 / 255.0).abs() < 1e-12);
        assert!((color.g - 133.0 / 255.0).abs() < 1e-12);
        assert!((color.b - 74.0 / 255.0).abs() < 1e-12);
        assert_eq!(color.a, 1.0);

        let lower = hex_to_rgba("ember/500", "#d4854a").unwrap();
        assert_eq!(lower, color);
    }

    #[test]
    fn channels_stay_in_unit_range() {
        for hex in ["#FAFAF8", "#1A1917", "#3D8E40", "#0F0F0F", "#F0F0F0", "#7F8081"] {
            let color = hex_to_rgba("sample", hex).unwrap();
            for channel in [color.r, color.g, color.b] {
                assert!((0.0..=1.0).contains(&channel), "{hex} gave {channel}");
            }
            assert_eq!(color.a, 1.0);
        }
    }

    #[test]
    fn malformed_hex_is_rejected() {
        for hex in ["FAFAF8", "#FFF", "#FAFAF8FF", "#XYZXYZ", "", "red"] {
            assert_eq!(
                hex_to_rgba("carbon/50", hex),
                Err(ValidationError::MalformedHex {
                    token: "carbon/50".to_string(),
                    value: hex.to_string(),
                })
            );
        }
    }

    #[test]
    fn whole_channels_serialize_as_integers() {
        let json = serde_json::to_string(&hex_to_rgba("white", "#FFFFFF").unwrap()).unwrap();
        assert_eq!(json, r#"{"r":1,"g":1,"b":1,"a":1}"#);
        let json = serde_json::to_string(&hex_to_rgba("black", "#000000").unwrap()).unwrap();
        assert_eq!(json, r#"{"r":0,"g":0,"b":0,"a":1}"#);
    }
}
