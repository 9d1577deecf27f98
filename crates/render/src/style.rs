use crate::rgb::Color;

/// Colours and sizes shared by every minimap rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Fill used where there is no background image.
    pub background: Color,
    pub grid: Color,
    pub building: Color,
    pub cylinder: Color,
    pub sphere: Color,
    pub tree: Color,
    pub track: Color,
    pub marker: Color,
    pub label: Color,
    pub highlight: Color,
    pub crosshair: Color,
    pub tram: Color,
    /// Tree disc radius, in pixels.
    pub tree_radius: f64,
    pub marker_radius: f64,
    pub tram_marker: f64,
    pub stroke: f64,
    pub highlight_stroke: f64,
    /// Polygon vertices used for circles.
    pub circle_segments: usize,
}

impl Default for Style {
    fn default() -> Style {
        Style {
            background: Color::new(0x3a, 0x4a, 0x3a),
            grid: Color::new(0x55, 0x66, 0x55),
            building: Color::new(0xb0, 0x6a, 0x4f),
            cylinder: Color::new(0x8c, 0x8c, 0x9c),
            sphere: Color::new(0x6f, 0x8f, 0xbf),
            tree: Color::new(0x2e, 0x8b, 0x3e),
            track: Color::new(0x30, 0x30, 0x30),
            marker: Color::new(0xe0, 0xe0, 0x40),
            label: Color::new_white(),
            highlight: Color::new(0xff, 0x30, 0xd0),
            crosshair: Color::new(0xff, 0x40, 0x40),
            tram: Color::new(0xff, 0xd0, 0x00),
            tree_radius: 2.0,
            marker_radius: 3.0,
            tram_marker: 8.0,
            stroke: 2.0,
            highlight_stroke: 4.0,
            circle_segments: 24,
        }
    }
}
