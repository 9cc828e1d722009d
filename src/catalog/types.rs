use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use tracing::warn;

/// Minimum product name length accepted by the product forms.
pub const MIN_NAME_CHARS: usize = 3;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stl: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub filament_type: String,
    #[serde(default)]
    pub color: String,
    /// Stored by the API either as an array or as a JSON-encoded string.
    #[serde(
        default,
        deserialize_with = "deserialize_gallery",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub image_gallery: Vec<String>,
}

impl Product {
    /// Checks the fields the add/edit forms require before anything is sent.
    ///
    /// # Errors
    /// Returns a human readable message for the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            return Err(format!(
                "Name must be at least {MIN_NAME_CHARS} characters"
            ));
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        if self.stl.trim().is_empty() {
            return Err("STL file is required".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Price must be zero or more".to_string());
        }
        if self.filament_type.parse::<FilamentType>().is_err() {
            return Err(format!("Unknown filament type: {}", self.filament_type));
        }
        if self.color.trim().is_empty() {
            return Err("Color is required".to_string());
        }
        Ok(())
    }
}

fn deserialize_gallery<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(gallery_from_value).unwrap_or_default())
}

fn gallery_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        Value::String(encoded) if encoded.trim().is_empty() => Vec::new(),
        Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
            Ok(decoded @ Value::Array(_)) => gallery_from_value(decoded),
            _ => {
                warn!("Ignoring malformed image gallery");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum FilamentType {
    #[default]
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "PETG")]
    Petg,
}

impl FilamentType {
    pub const ALL: [Self; 2] = [Self::Pla, Self::Petg];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pla => "PLA",
            Self::Petg => "PETG",
        }
    }
}

impl fmt::Display for FilamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilamentType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLA" => Ok(Self::Pla),
            "PETG" => Ok(Self::Petg),
            other => Err(format!("unsupported filament type: {other}")),
        }
    }
}

/// One color entry as returned by `/colors`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilamentColor {
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub available: bool,
    /// Filament type the color belongs to (`PLA`, `PETG`).
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub hex_value: String,
    #[serde(default)]
    pub public_id: String,
}

/// Color option shape the product forms work with.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Filament {
    pub filament: String,
    pub hex_color: String,
    pub color_tag: String,
}

impl From<&FilamentColor> for Filament {
    fn from(color: &FilamentColor) -> Self {
        let hex = color.hex_value.trim();
        let hex_color = if hex.is_empty() || hex.starts_with('#') {
            hex.to_string()
        } else {
            format!("#{hex}")
        };

        Self {
            filament: color.color.clone(),
            hex_color,
            color_tag: color.public_id.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
