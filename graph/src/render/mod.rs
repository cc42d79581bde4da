pub mod style;
pub mod svg;
pub mod measure;
pub mod text;

pub use style::{NodeShape, NodeStyle};
pub use svg::{RenderConfig, SvgRenderer};
pub use text::{Charset, TextRenderer};

/// Default colors assigned to lanes, cycled by lane index
pub const LANE_COLORS: [&str; 6] = [
    "#57606a",
    "#0969da",
    "#1a7f37",
    "#bf8700",
    "#8250df",
    "#cf222e",
];

/// Escape text for embedding in SVG content or attribute values
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
