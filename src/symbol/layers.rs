use std::f64::consts::TAU;
use std::fmt::Write;

use super::SymbolGeometry;
use super::types::{
    CrownTexture, LeafHabit, PlantSymbolData, RenderOptions, Season, SymbolStyle, WinterInterest,
};
use crate::error::Result;
use crate::geometry::{ClusterPoint, Point, VIEWBOX_SIZE};
use crate::palette::{self, ColorPalette};
use crate::random::{ChaChaRandom, RandomStream, SeededRandom};
use crate::xml::{escape_attr, num, polygon_path};

const BLOB_STEPS: usize = 20;
const STEM_STRIDE: usize = 4;
const WHITE_BARK_EDGE: &str = "#8a8478";
const FLOWER_EDGE: &str = "#c9b8a8";

/// Per-style line weights and opacity factors.
struct StyleSpec {
    canopy_opacity: f64,
    texture_opacity: f64,
    texture_width: f64,
    outline_width: f64,
    outline_dash: Option<&'static str>,
}

fn style_spec(style: SymbolStyle) -> StyleSpec {
    match style {
        SymbolStyle::Scientific => StyleSpec {
            canopy_opacity: 0.35,
            texture_opacity: 0.9,
            texture_width: 1.2,
            outline_width: 3.0,
            outline_dash: Some("14 9"),
        },
        SymbolStyle::Watercolor => StyleSpec {
            canopy_opacity: 1.0,
            texture_opacity: 0.35,
            texture_width: 1.6,
            outline_width: 2.5,
            outline_dash: None,
        },
        SymbolStyle::Marker => StyleSpec {
            canopy_opacity: 1.0,
            texture_opacity: 0.5,
            texture_width: 2.4,
            outline_width: 5.0,
            outline_dash: None,
        },
        SymbolStyle::HandDrawn => StyleSpec {
            canopy_opacity: 0.6,
            texture_opacity: 0.7,
            texture_width: 2.0,
            outline_width: 3.5,
            outline_dash: None,
        },
    }
}

struct Ids {
    clip: String,
    gradient: String,
    dots: String,
    hatch: String,
}

impl Ids {
    fn new(options: &RenderOptions) -> Self {
        let prefix = format!(
            "canopy-{}-{}-{:x}",
            options.style.as_str().replace('_', "-"),
            options.season,
            options.seed
        );
        Self {
            clip: format!("{prefix}-clip"),
            gradient: format!("{prefix}-fill"),
            dots: format!("{prefix}-dots"),
            hatch: format!("{prefix}-hatch"),
        }
    }
}

/// Build the standalone SVG document for one style and season.
///
/// Layers, bottom to top: canopy mass, clusters, texture overlay, winter
/// overlay (bare deciduous only), spread outline. Everything but the
/// outline is clipped to the canopy.
pub fn compose_symbol(
    plant: &PlantSymbolData,
    geometry: &SymbolGeometry,
    options: &RenderOptions,
) -> Result<String> {
    let size_mm = options.scale.physical_mm(geometry.spread_cm)?;
    let params = &geometry.params;
    let palette = palette::apply_winter_interest(
        palette::resolve(params.leaf_habit, options.season),
        params.winter_interest,
        options.season,
    );
    let spec = style_spec(options.style);
    let ids = Ids::new(options);
    let outline_d = polygon_path(&geometry.outline);
    let has_clusters = !geometry.clusters.is_empty();
    let bare = params.leaf_habit == LeafHabit::Deciduous && options.season == Season::Winter;

    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}mm" height="{size}mm" viewBox="0 0 {vb} {vb}" data-botanical-name="{name}" data-spread-cm="{spread}" data-scale="{scale}" data-season="{season}" data-style="{style}" data-leaf-habit="{habit}" data-cluster-count="{count}">"#,
        size = num(size_mm),
        vb = num(VIEWBOX_SIZE),
        name = escape_attr(&plant.botanical_name),
        spread = num(geometry.spread_cm),
        scale = options.scale,
        season = options.season,
        style = options.style,
        habit = params.leaf_habit,
        count = geometry.clusters.len(),
    );

    svg.push_str("<defs>");
    let _ = write!(
        svg,
        r#"<clipPath id="{}"><path d="{}"/></clipPath>"#,
        ids.clip, outline_d
    );
    match options.style {
        SymbolStyle::Watercolor => push_gradient(&mut svg, &ids, &palette),
        SymbolStyle::Marker if has_clusters => push_dot_pattern(&mut svg, &ids, geometry, &palette),
        SymbolStyle::HandDrawn if has_clusters => {
            push_hatch_pattern(&mut svg, &ids, geometry, &palette)
        }
        _ => {}
    }
    svg.push_str("</defs>");

    push_canopy(&mut svg, &ids, &outline_d, options.style, &spec, &palette);
    if has_clusters {
        push_clusters(&mut svg, &ids, geometry, options, &palette);
        push_texture(&mut svg, &ids, geometry, &spec, &palette);
    }
    if bare {
        if let Some(feature) = params.winter_interest {
            push_winter_overlay(&mut svg, &ids, geometry, feature);
        }
    }
    if options.show_outline {
        push_outline(&mut svg, &outline_d, &spec, &palette);
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn push_gradient(svg: &mut String, ids: &Ids, palette: &ColorPalette) {
    let _ = write!(
        svg,
        r#"<radialGradient id="{}" cx="45%" cy="40%" r="65%"><stop offset="0%" stop-color="{}"/><stop offset="55%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></radialGradient>"#,
        ids.gradient,
        palette.canopy_gradient_start,
        palette.canopy_fill,
        palette.canopy_gradient_end
    );
}

fn push_dot_pattern(
    svg: &mut String,
    ids: &Ids,
    geometry: &SymbolGeometry,
    palette: &ColorPalette,
) {
    let cell = geometry.sampling.min_distance * 0.6;
    let r = geometry.sampling.radius_min * 0.35;
    let _ = write!(
        svg,
        r#"<pattern id="{id}" width="{c}" height="{c}" patternUnits="userSpaceOnUse"><circle cx="{h}" cy="{h}" r="{r}" fill="{fill}"/></pattern>"#,
        id = ids.dots,
        c = num(cell),
        h = num(cell / 2.0),
        r = num(r),
        fill = palette.cluster_fill,
    );
}

fn push_hatch_pattern(
    svg: &mut String,
    ids: &Ids,
    geometry: &SymbolGeometry,
    palette: &ColorPalette,
) {
    let cell = geometry.sampling.min_distance * 0.4;
    let _ = write!(
        svg,
        r#"<pattern id="{id}" width="{c}" height="{c}" patternUnits="userSpaceOnUse" patternTransform="rotate(35)"><line x1="{h}" y1="0" x2="{h}" y2="{c}" stroke="{stroke}" stroke-width="{w}"/></pattern>"#,
        id = ids.hatch,
        c = num(cell),
        h = num(cell / 2.0),
        stroke = palette.texture_color,
        w = num((cell * 0.12).max(1.0)),
    );
}

fn push_canopy(
    svg: &mut String,
    ids: &Ids,
    outline_d: &str,
    style: SymbolStyle,
    spec: &StyleSpec,
    palette: &ColorPalette,
) {
    let fill = match style {
        SymbolStyle::Watercolor => format!("url(#{})", ids.gradient),
        _ => palette.canopy_fill.to_string(),
    };
    let _ = write!(
        svg,
        r#"<g data-layer="canopy" clip-path="url(#{})"><path d="{}" fill="{}" fill-opacity="{}"/></g>"#,
        ids.clip,
        outline_d,
        fill,
        num(palette.canopy_opacity * spec.canopy_opacity)
    );
}

fn push_clusters(
    svg: &mut String,
    ids: &Ids,
    geometry: &SymbolGeometry,
    options: &RenderOptions,
    palette: &ColorPalette,
) {
    let body = match options.style {
        SymbolStyle::Scientific => return,
        SymbolStyle::Watercolor => watercolor_blobs(&geometry.clusters, options.seed, palette),
        SymbolStyle::Marker => format!(
            r#"<rect x="0" y="0" width="{vb}" height="{vb}" fill="url(#{})" fill-opacity="{}"/>"#,
            ids.dots,
            num(palette.cluster_opacity),
            vb = num(VIEWBOX_SIZE),
        ),
        SymbolStyle::HandDrawn => format!(
            r#"<rect x="0" y="0" width="{vb}" height="{vb}" fill="url(#{})" fill-opacity="{}"/>"#,
            ids.hatch,
            num(palette.cluster_opacity),
            vb = num(VIEWBOX_SIZE),
        ),
    };
    let _ = write!(
        svg,
        r#"<g data-layer="clusters" clip-path="url(#{})">{}</g>"#,
        ids.clip, body
    );
}

/// Irregular 20-point blobs cycling base, highlight and deep tones.
fn watercolor_blobs(clusters: &[ClusterPoint], seed: u64, palette: &ColorPalette) -> String {
    let tones = [
        palette.cluster_fill,
        palette.canopy_gradient_start,
        palette.canopy_gradient_end,
    ];
    let mut rng = ChaChaRandom::new(seed, RandomStream::Blobs);
    let mut out = String::with_capacity(clusters.len() * 320);
    for (i, c) in clusters.iter().enumerate() {
        let ring: Vec<Point> = (0..BLOB_STEPS)
            .map(|k| {
                let angle = k as f64 / BLOB_STEPS as f64 * TAU;
                let r = c.radius * rng.range(0.75, 1.25);
                Point::new(c.x + r * angle.cos(), c.y + r * angle.sin())
            })
            .collect();
        let opacity = palette.cluster_opacity * rng.range(0.35, 0.65);
        let _ = write!(
            out,
            r#"<path d="{}" fill="{}" fill-opacity="{}"/>"#,
            polygon_path(&ring),
            tones[i % tones.len()],
            num(opacity)
        );
    }
    out
}

fn push_texture(
    svg: &mut String,
    ids: &Ids,
    geometry: &SymbolGeometry,
    spec: &StyleSpec,
    palette: &ColorPalette,
) {
    let opacity = num(palette.cluster_opacity * spec.texture_opacity);
    let texture = geometry.params.crown_texture;
    let _ = write!(svg, r#"<g data-layer="texture" clip-path="url(#{})">"#, ids.clip);

    if texture == CrownTexture::Fine {
        let _ = write!(
            svg,
            r#"<g fill="{}" fill-opacity="{}">"#,
            palette.texture_color, opacity
        );
        for c in &geometry.clusters {
            let _ = write!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{}"/>"#,
                num(c.x),
                num(c.y),
                num(c.radius * 0.18)
            );
        }
        svg.push_str("</g>");
    } else {
        let center = geometry.bbox().center();
        let mut d = String::with_capacity(geometry.clusters.len() * 48);
        for c in &geometry.clusters {
            texture_mark(&mut d, texture, c, &center);
        }
        let _ = write!(
            svg,
            r#"<path d="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linecap="round"/>"#,
            d.trim_end(),
            palette.texture_color,
            opacity,
            num(spec.texture_width)
        );
    }

    svg.push_str("</g>");
}

fn texture_mark(d: &mut String, texture: CrownTexture, c: &ClusterPoint, center: &Point) {
    let (x, y, r) = (c.x, c.y, c.radius);
    match texture {
        CrownTexture::Medium => {
            let _ = write!(
                d,
                "M{} {} Q{} {} {} {} ",
                num(x - r * 0.6),
                num(y + r * 0.2),
                num(x),
                num(y - r * 0.5),
                num(x + r * 0.6),
                num(y + r * 0.2)
            );
        }
        CrownTexture::Coarse => {
            let half = num(r / 2.0);
            let _ = write!(
                d,
                "M{} {} A{h} {h} 0 0 1 {} {} A{h} {h} 0 0 1 {} {} ",
                num(x - r),
                num(y),
                num(x),
                num(y),
                num(x + r),
                num(y),
                h = half
            );
        }
        CrownTexture::Needle => {
            let (dx, dy) = (x - center.x, y - center.y);
            let len = (dx * dx + dy * dy).sqrt();
            let (ux, uy) = if len > f64::EPSILON {
                (dx / len, dy / len)
            } else {
                (1.0, 0.0)
            };
            let _ = write!(
                d,
                "M{} {} L{} {} ",
                num(x - ux * r * 0.4),
                num(y - uy * r * 0.4),
                num(x + ux * r * 0.8),
                num(y + uy * r * 0.8)
            );
        }
        CrownTexture::Fine => {}
    }
}

/// Dormant-season ornament drawn over the faded canopy.
fn push_winter_overlay(
    svg: &mut String,
    ids: &Ids,
    geometry: &SymbolGeometry,
    feature: WinterInterest,
) {
    let body = match feature {
        WinterInterest::RedStems => {
            let d = stem_skeleton(geometry);
            format!(
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="4" stroke-linecap="round"/>"#,
                d,
                palette::RED_STEM
            )
        }
        WinterInterest::WhiteBark => {
            let d = stem_skeleton(geometry);
            format!(
                r#"<path d="{d}" fill="none" stroke="{}" stroke-width="8" stroke-linecap="round"/><path d="{d}" fill="none" stroke="{}" stroke-width="5" stroke-linecap="round"/>"#,
                WHITE_BARK_EDGE,
                palette::WHITE_BARK,
            )
        }
        WinterInterest::Berries => discs(geometry, palette::BERRY_RED, None),
        WinterInterest::Flowers => discs(geometry, palette::WINTER_FLOWER, Some(FLOWER_EDGE)),
        WinterInterest::Evergreen => return,
    };
    if body.is_empty() {
        return;
    }
    let _ = write!(
        svg,
        r#"<g data-layer="winter-interest" data-feature="{}" clip-path="url(#{})">{}</g>"#,
        feature, ids.clip, body
    );
}

/// Stems from the crown centre towards every fourth outline vertex, each
/// with one side shoot.
fn stem_skeleton(geometry: &SymbolGeometry) -> String {
    let center = geometry.bbox().center();
    let mut d = String::new();
    for (i, tip) in geometry.outline.iter().step_by(STEM_STRIDE).enumerate() {
        let end = Point::new(
            center.x + (tip.x - center.x) * 0.85,
            center.y + (tip.y - center.y) * 0.85,
        );
        let _ = write!(
            d,
            "M{} {} L{} {} ",
            num(center.x),
            num(center.y),
            num(end.x),
            num(end.y)
        );

        let fork = Point::new(
            center.x + (end.x - center.x) * 0.55,
            center.y + (end.y - center.y) * 0.55,
        );
        let (dx, dy) = (end.x - center.x, end.y - center.y);
        let turn: f64 = if i % 2 == 0 { 0.45 } else { -0.45 };
        let (sin, cos) = turn.sin_cos();
        let shoot = Point::new(
            fork.x + (dx * cos - dy * sin) * 0.3,
            fork.y + (dx * sin + dy * cos) * 0.3,
        );
        let _ = write!(
            d,
            "M{} {} L{} {} ",
            num(fork.x),
            num(fork.y),
            num(shoot.x),
            num(shoot.y)
        );
    }
    d.trim_end().to_string()
}

/// Small discs on every other cluster point.
fn discs(geometry: &SymbolGeometry, fill: &str, edge: Option<&str>) -> String {
    let mut out = String::new();
    let stroke = edge
        .map(|e| format!(r#" stroke="{}" stroke-width="1""#, e))
        .unwrap_or_default();
    for c in geometry.clusters.iter().step_by(2) {
        let _ = write!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"{}/>"#,
            num(c.x),
            num(c.y),
            num((c.radius * 0.35).clamp(4.0, 10.0)),
            fill,
            stroke
        );
    }
    out
}

fn push_outline(svg: &mut String, outline_d: &str, spec: &StyleSpec, palette: &ColorPalette) {
    let dash = spec
        .outline_dash
        .map(|d| format!(r#" stroke-dasharray="{}""#, d))
        .unwrap_or_default();
    let _ = write!(
        svg,
        r#"<g data-layer="outline"><path d="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linejoin="round"{}/></g>"#,
        outline_d,
        palette.outline_stroke,
        num(palette.outline_opacity),
        num(spec.outline_width),
        dash
    );
}
