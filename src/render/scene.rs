use std::sync::Arc;

use vello::kurbo::{Affine, Rect, Stroke};
use vello::peniko::{Blob, Color, Fill, Image, ImageFormat};
use vello::Scene;

use super::colors::{label_ink, AppColor, ColorScale, FALLBACK};
use super::text::{TextRenderResult, TextRenderer};
use crate::layout::LayoutTree;
use crate::settings::Settings;
use crate::tree::arena::{Hierarchy, NodeId};
use crate::ui::labels::{wrap_label, LabelStyle};
use crate::ui::legend::{category_of, legend_entries, LegendStyle};
use crate::ui::tooltip::build_tooltip;

const FONT: &str = "default";
const BACKGROUND: AppColor = AppColor::new(1.0, 1.0, 1.0);
const INK: AppColor = AppColor::new(0.1, 0.1, 0.12);

/// Everything needed to paint one frame.
pub struct SceneInputs<'a> {
    pub tree: &'a Hierarchy,
    pub layout: &'a LayoutTree,
    pub colors: &'a ColorScale,
    pub settings: &'a Settings,
    pub title: &'a str,
    pub description: &'a str,
    pub hover: Option<NodeId>,
    /// Cursor position in window pixels
    pub cursor: Option<(f64, f64)>,
    /// Canvas → window scale factor
    pub scale: f64,
}

/// Build a Vello scene: title band, tiles with labels, legend, hover tooltip.
pub fn build_scene(scene: &mut Scene, inputs: &SceneInputs<'_>, text: &mut TextRenderer) {
    scene.reset();

    let canvas = &inputs.settings.canvas;
    let s = inputs.scale;
    let base = Affine::scale(s);

    scene.fill(
        Fill::NonZero,
        base,
        BACKGROUND.to_peniko(),
        None,
        &Rect::new(0.0, 0.0, canvas.width, canvas.height),
    );

    // Title band
    draw_centered(scene, text, inputs.title, 16.0, canvas.width / 2.0, canvas.padding / 2.0 - 16.0, s);
    draw_centered(scene, text, inputs.description, 11.0, canvas.width / 2.0, canvas.padding / 2.0 + 6.0, s);

    // Tiles
    let origin = Affine::translate((0.0, canvas.padding));
    let label_style = (inputs.settings.show_labels && text.has_font(FONT))
        .then(|| LabelStyle::for_font_size(inputs.settings.label_font_size));
    for leaf in inputs.layout.leaves() {
        let fill = inputs
            .colors
            .get(category_of(inputs.tree, leaf.node))
            .unwrap_or(FALLBACK);
        let rect = Rect::new(leaf.x0, leaf.y0, leaf.x1, leaf.y1);
        scene.fill(Fill::NonZero, base * origin, fill.to_peniko(), None, &rect);

        if let Some(style) = &label_style {
            let name = &inputs.tree.get(leaf.node).name;
            let words = wrap_label(name);
            let lines = style.fit_lines(&words, leaf.width(), leaf.height());
            let ink = label_ink(fill);
            for (i, line) in lines.iter().enumerate() {
                let x = leaf.x0 + style.inset_x;
                // Baseline to top-of-box
                let y = canvas.padding + leaf.y0 + style.baseline(i) - style.font_size;
                if let Some(result) = text.render_text(
                    line,
                    FONT,
                    (style.font_size * s) as f32,
                    Some(((leaf.width() - style.inset_x) * s) as f32),
                    ink,
                ) {
                    draw_text_to_scene(scene, result, x * s, y * s);
                }
            }
        }
    }

    // Hover outline on top of the neighbouring tiles
    if let Some(hovered) = inputs.hover.and_then(|node| inputs.layout.get(node)) {
        let fill = inputs
            .colors
            .get(category_of(inputs.tree, hovered.node))
            .unwrap_or(FALLBACK);
        scene.stroke(
            &Stroke::new(1.5),
            base * origin,
            fill.darken(0.45).to_peniko(),
            None,
            &Rect::new(hovered.x0, hovered.y0, hovered.x1, hovered.y1).inset(-0.75),
        );
    }

    // Legend
    let legend = LegendStyle::default();
    let (lx, ly) = canvas.legend_origin();
    let entries = legend_entries(
        inputs.tree,
        inputs.colors,
        canvas.width - canvas.padding,
        &legend,
    );
    for entry in &entries {
        let (x, y) = (lx + entry.x, ly + entry.y);
        let swatch = Rect::new(x, y, x + legend.swatch_size, y + legend.swatch_size);
        scene.fill(Fill::NonZero, base, entry.color.to_peniko(), None, &swatch);
        if let Some(result) = text.render_text(&entry.name, FONT, (10.0 * s) as f32, None, INK) {
            draw_text_to_scene(
                scene,
                result,
                (x + legend.swatch_size + legend.gap) * s,
                y * s,
            );
        }
    }

    if let (Some(node), Some(cursor)) = (inputs.hover, inputs.cursor) {
        draw_tooltip(scene, text, inputs.tree, node, cursor);
    }
}

/// Tooltip box next to the cursor, in window pixels.
fn draw_tooltip(
    scene: &mut Scene,
    text: &mut TextRenderer,
    tree: &Hierarchy,
    node: NodeId,
    (cx, cy): (f64, f64),
) {
    let info = build_tooltip(tree, node);
    let rendered: Vec<TextRenderResult> = info
        .lines()
        .iter()
        .filter_map(|line| text.render_text(line, FONT, 13.0, None, AppColor::new(1.0, 1.0, 1.0)))
        .collect();
    if rendered.is_empty() {
        return;
    }

    let pad = 6.0;
    let line_h = 17.0;
    let w = rendered.iter().map(|r| r.width).max().unwrap_or(0) as f64 + pad * 2.0;
    let h = rendered.len() as f64 * line_h + pad * 2.0;
    let (x, y) = (cx + 10.0, cy - 10.0);

    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        Color::new([0.0, 0.0, 0.0, 0.78]),
        None,
        &Rect::new(x, y, x + w, y + h),
    );
    for (i, result) in rendered.into_iter().enumerate() {
        draw_text_to_scene(scene, result, x + pad, y + pad + i as f64 * line_h);
    }
}

fn draw_centered(
    scene: &mut Scene,
    text: &mut TextRenderer,
    label: &str,
    size: f64,
    cx: f64,
    top: f64,
    s: f64,
) {
    if let Some(result) = text.render_text(label, FONT, (size * s) as f32, None, INK) {
        let x = cx * s - result.width as f64 / 2.0;
        draw_text_to_scene(scene, result, x, top * s);
    }
}

/// Draw rendered text to a Vello scene at window position (`x`, `y`).
fn draw_text_to_scene(scene: &mut Scene, text_result: TextRenderResult, x: f64, y: f64) {
    for glyph in text_result.glyphs {
        if glyph.bitmap.is_empty() {
            continue;
        }

        let glyph_image = Image::new(
            Blob::new(Arc::new(glyph.bitmap)),
            ImageFormat::Rgba8,
            glyph.width as u32,
            glyph.height as u32,
        );

        let transform = Affine::translate((x + glyph.x as f64, y + glyph.y as f64));
        scene.draw_image(&glyph_image, transform);
    }
}

/// Uniform scale that fits the canvas inside a window, anchored top-left.
pub fn fit_scale(canvas_w: f64, canvas_h: f64, window_w: f64, window_h: f64) -> f64 {
    if canvas_w <= 0.0 || canvas_h <= 0.0 {
        return 1.0;
    }
    (window_w / canvas_w).min(window_h / canvas_h).max(0.01)
}
