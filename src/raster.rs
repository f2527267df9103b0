//! PNG previews of rendered symbols.

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let opts = usvg::Options::default();
    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let width = (tree.size().width() * scale).ceil().max(1.0) as u32;
    let height = (tree.size().height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or("Failed to create pixmap")?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

#[cfg(test)]
mod tests {
    use super::svg_to_png;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20mm" height="20mm" viewBox="0 0 1000 1000"><path d="M100 100 L900 100 L900 900 Z" fill="#4f8a3a"/></svg>"##;

    #[test]
    fn writes_png_bytes() {
        let png = svg_to_png(SQUARE, 1.0).expect("rasterizes");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn rejects_bad_scale() {
        assert!(svg_to_png(SQUARE, 0.0).is_err());
        assert!(svg_to_png(SQUARE, f32::NAN).is_err());
    }
}
