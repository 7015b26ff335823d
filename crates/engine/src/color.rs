use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Display color of a budget, from a fixed palette.
///
/// The wire tags are the CSS utility classes the stored records already use,
/// so existing documents keep decoding as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    #[default]
    #[serde(rename = "bg-gray-500")]
    Gray,
    #[serde(rename = "bg-blue-500")]
    Blue,
    #[serde(rename = "bg-green-500")]
    Green,
    #[serde(rename = "bg-yellow-500")]
    Yellow,
    #[serde(rename = "bg-purple-500")]
    Purple,
    #[serde(rename = "bg-red-500")]
    Red,
}

impl Color {
    /// Returns the canonical tag stored on budget records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "bg-gray-500",
            Self::Blue => "bg-blue-500",
            Self::Green => "bg-green-500",
            Self::Yellow => "bg-yellow-500",
            Self::Purple => "bg-purple-500",
            Self::Red => "bg-red-500",
        }
    }
}

impl TryFrom<&str> for Color {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bg-gray-500" => Ok(Self::Gray),
            "bg-blue-500" => Ok(Self::Blue),
            "bg-green-500" => Ok(Self::Green),
            "bg-yellow-500" => Ok(Self::Yellow),
            "bg-purple-500" => Ok(Self::Purple),
            "bg-red-500" => Ok(Self::Red),
            other => Err(EngineError::Validation(format!("invalid color: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_wire_tags() {
        for tag in [
            "bg-gray-500",
            "bg-blue-500",
            "bg-green-500",
            "bg-yellow-500",
            "bg-purple-500",
            "bg-red-500",
        ] {
            let color = Color::try_from(tag).unwrap();
            assert_eq!(color.as_str(), tag);
        }
    }

    #[test]
    fn rejects_unknown_tag() {
        assert!(Color::try_from("bg-pink-500").is_err());
    }
}
