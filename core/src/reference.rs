use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};

/// A pointer from a semantic alias into a color scale, written `scale/step`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorRef {
    pub scale: String,
    pub step: String,
}
impl ColorRef {
    pub fn new(scale: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            scale: scale.into(),
            step: step.into(),
        }
    }
    pub fn parse(value: &str) -> Result<Self, peg::error::ParseError<peg::str::LineCol>> {
        token_parser::reference(value)
    }
}
impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scale, self.step)
    }
}

/// Returns the six hex digits of a strict `#RRGGBB` color.
pub(crate) fn hex_digits(value: &str) -> Option<&str> {
    token_parser::hex_color(value).ok()
}

peg::parser! {
  grammar token_parser() for str {
    rule segment() -> &'input str = $((!"/" [_])+)

    pub(crate) rule reference() -> ColorRef
        = scale:segment() "/" step:segment() { ColorRef::new(scale, step) }

    pub(crate) rule hex_color() -> &'input str
        = "#" v:$(['0'..='9' | 'a'..='f' | 'A'..='F']*<6>) { v }
  }
}

#[test]
fn test() {
    assert_eq!(
        ColorRef::parse("carbon/50").unwrap(),
        ColorRef::new("carbon", "50")
    );
    assert_eq!(
        ColorRef::parse("ember/950").unwrap().to_string(),
        "ember/950"
    );
    assert!(ColorRef::parse("carbon").is_err());
    assert!(ColorRef::parse("carbon/").is_err());
    assert!(ColorRef::parse("/50").is_err());
    assert!(ColorRef::parse("bg/primary/50").is_err());

    assert_eq!(hex_digits("#FAFAF8"), Some("FAFAF8"));
    assert_eq!(hex_digits("#d4854a"), Some("d4854a"));
    assert_eq!(hex_digits("FAFAF8"), None);
    assert_eq!(hex_digits("#FFF"), None);
    assert_eq!(hex_digits("#FAFAF80"), None);
    assert_eq!(hex_digits("#GGGGGG"), None);
}

struct ColorRefVisitor;

impl<'de> Visitor<'de> for ColorRefVisitor {
    type Value = ColorRef;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a color reference of the form `scale/step`")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match token_parser::reference(value) {
            Ok(reference) => Ok(reference),
            Err(err) => Err(E::custom(format!(
                "Invalid reference {value:?}: {}",
                err
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for ColorRef {
    fn deserialize<D>(deserializer: D) -> Result<ColorRef, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ColorRefVisitor)
    }
}
