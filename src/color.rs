use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::sites::{self, Marker, Rgb, SiteStyle};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

pub fn rgb_to_color32(rgb: Rgb) -> Color32 {
    to_color32(Srgb::from(rgb))
}

// ---------------------------------------------------------------------------
// Resolved site styles
// ---------------------------------------------------------------------------

/// A site style in egui colours, ready for the plot and legend.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub label: String,
    pub edge: Color32,
    pub filled: bool,
    pub marker: Marker,
}

impl PointStyle {
    fn from_site(style: &SiteStyle) -> Self {
        PointStyle {
            label: style.site.to_string(),
            edge: rgb_to_color32(style.edge),
            filled: style.filled,
            marker: style.marker,
        }
    }
}

/// Styles for the configured sites, in site order. Sites without a
/// registered style get a hollow circle in a generated colour.
pub fn site_styles(sites: &[String]) -> Vec<PointStyle> {
    let unknown = sites.iter().filter(|s| sites::style_for(s).is_none()).count();
    let mut extra = generate_palette(unknown).into_iter();

    sites
        .iter()
        .map(|site| match sites::style_for(site) {
            Some(style) => PointStyle::from_site(style),
            None => PointStyle {
                label: site.clone(),
                edge: extra.next().unwrap_or(Color32::GRAY),
                filled: false,
                marker: Marker::Circle,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
    }

    #[test]
    fn registered_and_generated_styles() {
        let sites = vec!["StreamSite_1".to_string(), "Lab blank".to_string()];
        let styles = site_styles(&sites);
        assert_eq!(styles[0].edge, Color32::from_rgb(0, 0, 0));
        assert!(styles[0].filled);
        assert_eq!(styles[0].marker, Marker::Plus);
        assert_eq!(styles[1].label, "Lab blank");
        assert!(!styles[1].filled);
    }

    #[test]
    fn groundwater_is_filled_surface_water_is_hollow() {
        let sites: Vec<String> = ["WShed1_SW", "WShed1_GW"].map(String::from).to_vec();
        let styles = site_styles(&sites);
        assert_eq!(styles[0].edge, styles[1].edge);
        assert!(!styles[0].filled);
        assert!(styles[1].filled);
    }

    #[test]
    fn unit_rgb_maps_to_bytes() {
        assert_eq!(rgb_to_color32([1.0, 0.0, 0.0]), Color32::from_rgb(255, 0, 0));
    }
}
