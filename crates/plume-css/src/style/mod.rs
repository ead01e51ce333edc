//! Resolved style of a view: the typed property sink of the view tree.

mod values;

use serde::Serialize;

pub use values::{
    Color, Length, Visibility, parse_font_size, parse_font_weight, parse_opacity,
};

use crate::error::PropertyError;
use crate::node::PropertySink;

/// Property values a view ends up with after the apply step.
///
/// `None` means no rule set the property. Nothing is inherited.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedStyle {
    /// `color`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// `background-color`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    /// `opacity`, in `0..=1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// `font-size` in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// `font-weight`, 100 to 900
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    /// `width`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    /// `height`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Length>,
    /// `visibility`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Run `parse`, mapping failure to an [`PropertyError::InvalidValue`].
fn coerce<T>(
    property: &str,
    value: &str,
    expected: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, PropertyError> {
    parse(value).ok_or_else(|| PropertyError::invalid(property, value, format!("expected {expected}")))
}

impl PropertySink for ResolvedStyle {
    fn set_property(&mut self, property: &str, value: &str) -> Result<(), PropertyError> {
        match property {
            "color" => self.color = Some(coerce(property, value, "a color", Color::parse)?),
            "background-color" => {
                self.background_color = Some(coerce(property, value, "a color", Color::parse)?);
            }
            "opacity" => {
                self.opacity = Some(coerce(property, value, "a number from 0 to 1", parse_opacity)?);
            }
            "font-size" => {
                self.font_size = Some(coerce(property, value, "a positive size", parse_font_size)?);
            }
            "font-weight" => {
                self.font_weight = Some(coerce(
                    property,
                    value,
                    "normal, bold or 100 to 900",
                    parse_font_weight,
                )?);
            }
            "width" => self.width = Some(coerce(property, value, "auto, px or %", Length::parse)?),
            "height" => {
                self.height = Some(coerce(property, value, "auto, px or %", Length::parse)?);
            }
            "visibility" => {
                self.visibility = Some(coerce(
                    property,
                    value,
                    "visible, hidden or collapse",
                    |v| v.trim().parse().ok(),
                )?);
            }
            _ => {
                return Err(PropertyError::UnknownProperty {
                    property: property.to_string(),
                });
            }
        }
        Ok(())
    }
}
