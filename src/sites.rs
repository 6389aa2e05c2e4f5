/// Sampling-site registry.
///
/// The canonical list of sites in the central Pennsylvania dataset: two
/// instrumented catchments with paired surface water / groundwater samples,
/// a third catchment, three locations along a larger stream and NADP
/// precipitation. The order here is the imputation order, the legend order
/// and the draw order of the score plot (later sites are drawn on top).

// ---------------------------------------------------------------------------
// Plot style per site
// ---------------------------------------------------------------------------

/// Marker glyph used for a site's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Star,
    Plus,
    Triangle,
    Square,
}

/// sRGB components in `0.0..=1.0`.
pub type Rgb = [f32; 3];

pub const BLACK: Rgb = [0.0, 0.0, 0.0];
const WSHED1: Rgb = [0.0, 0.3, 0.7];
const WSHED2: Rgb = [0.0, 0.6, 0.0];
const WSHED3: Rgb = [1.0, 0.5, 0.0];
const RAIN: Rgb = [0.0, 0.6, 1.0];

/// How one site is drawn. Surface water sites are hollow, groundwater
/// sites are filled with their edge colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteStyle {
    pub site: &'static str,
    pub edge: Rgb,
    /// Filled markers take the edge colour; otherwise the marker is hollow.
    pub filled: bool,
    pub marker: Marker,
}

pub static SITE_STYLES: &[SiteStyle] = &[
    SiteStyle { site: "WShed1_SW", edge: WSHED1, filled: false, marker: Marker::Circle },
    SiteStyle { site: "WShed1_GW", edge: WSHED1, filled: true, marker: Marker::Circle },
    SiteStyle { site: "WShed2_SW", edge: WSHED2, filled: false, marker: Marker::Circle },
    SiteStyle { site: "WShed2_GW1", edge: WSHED2, filled: true, marker: Marker::Circle },
    SiteStyle { site: "WShed2_GW2", edge: WSHED2, filled: true, marker: Marker::Star },
    SiteStyle { site: "WShed3_SW", edge: WSHED3, filled: false, marker: Marker::Circle },
    SiteStyle { site: "WShed3_GW", edge: WSHED3, filled: true, marker: Marker::Circle },
    SiteStyle { site: "StreamSite_1", edge: BLACK, filled: true, marker: Marker::Plus },
    SiteStyle { site: "StreamSite_2", edge: BLACK, filled: false, marker: Marker::Triangle },
    SiteStyle { site: "StreamSite_3", edge: BLACK, filled: false, marker: Marker::Square },
    SiteStyle { site: "Precipitation", edge: RAIN, filled: true, marker: Marker::Circle },
];

/// Look up the registered style of a site.
pub fn style_for(site: &str) -> Option<&'static SiteStyle> {
    SITE_STYLES.iter().find(|s| s.site == site)
}
