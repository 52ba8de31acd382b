//! Standalone SVG export of a laid-out treemap.
//!
//! Tiles carry `data-name`, `data-category` and `data-value` attributes and a
//! `<title>` child, which browsers show as the hover tooltip.

use std::fmt::{self, Write};

use crate::layout::LayoutTree;
use crate::render::colors::{label_ink, ColorScale, FALLBACK};
use crate::settings::Canvas;
use crate::tree::arena::Hierarchy;
use crate::ui::labels::{wrap_label, LabelStyle};
use crate::ui::legend::{category_of, legend_entries, LegendStyle};
use crate::ui::tooltip::build_tooltip;

/// Everything about the page that is not the layout itself.
#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub title: String,
    pub description: String,
    pub canvas: Canvas,
    pub labels: Option<LabelStyle>,
    pub legend: LegendStyle,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            canvas: Canvas::default(),
            labels: Some(LabelStyle::for_font_size(8.0)),
            legend: LegendStyle::default(),
        }
    }
}

/// Render the full document into a `String`.
pub fn render_svg(
    tree: &Hierarchy,
    layout: &LayoutTree,
    colors: &ColorScale,
    options: &SvgOptions,
) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(256 + layout.len() * 320);
    write_svg(&mut out, tree, layout, colors, options)?;
    Ok(out)
}

pub fn write_svg<W: Write>(
    out: &mut W,
    tree: &Hierarchy,
    layout: &LayoutTree,
    colors: &ColorScale,
    options: &SvgOptions,
) -> fmt::Result {
    let canvas = &options.canvas;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" preserveAspectRatio="xMinYMin meet" class="svg-content" font-family="sans-serif">"#,
        num(canvas.width),
        num(canvas.height)
    )?;

    // Title band
    writeln!(
        out,
        r#"  <g transform="translate({},{})">"#,
        num(canvas.width / 2.0),
        num(canvas.padding / 2.0)
    )?;
    writeln!(
        out,
        r#"    <text id="title" text-anchor="middle">{}</text>"#,
        escape(&options.title)
    )?;
    writeln!(
        out,
        r#"    <text id="description" y="20" text-anchor="middle" font-size="small">{}</text>"#,
        escape(&options.description)
    )?;
    writeln!(out, "  </g>")?;

    // Tiles
    writeln!(
        out,
        r#"  <g id="treemap" transform="translate(0,{})">"#,
        num(canvas.padding)
    )?;
    for leaf in layout.leaves() {
        let node = tree.get(leaf.node);
        let category = category_of(tree, leaf.node);
        let fill = colors.get(category).unwrap_or(FALLBACK);
        let tip = build_tooltip(tree, leaf.node);

        writeln!(
            out,
            r#"    <g transform="translate({},{})">"#,
            num(leaf.x0),
            num(leaf.y0)
        )?;
        writeln!(
            out,
            r#"      <rect class="tile" id="{}" width="{}" height="{}" fill="{}" data-name="{}" data-category="{}" data-value="{}">"#,
            escape(&node.id),
            num(leaf.width()),
            num(leaf.height()),
            fill.to_hex(),
            escape(&node.name),
            escape(category),
            num(leaf.value)
        )?;
        let [name, cat, value] = tip.lines();
        writeln!(
            out,
            "        <title>{}\n{}\n{}</title>",
            escape(&name),
            escape(&cat),
            escape(&value)
        )?;
        writeln!(out, "      </rect>")?;

        if let Some(style) = &options.labels {
            let words = wrap_label(&node.name);
            let lines = style.fit_lines(&words, leaf.width(), leaf.height());
            if !lines.is_empty() {
                writeln!(
                    out,
                    r#"      <text class="tile-text" font-size="{}px" fill="{}">"#,
                    num(style.font_size),
                    label_ink(fill).to_hex()
                )?;
                for (i, line) in lines.iter().enumerate() {
                    writeln!(
                        out,
                        r#"        <tspan x="{}" y="{}">{}</tspan>"#,
                        num(style.inset_x),
                        num(style.baseline(i)),
                        escape(line)
                    )?;
                }
                writeln!(out, "      </text>")?;
            }
        }
        writeln!(out, "    </g>")?;
    }
    writeln!(out, "  </g>")?;

    // Legend
    let (lx, ly) = canvas.legend_origin();
    let legend = &options.legend;
    let entries = legend_entries(tree, colors, canvas.width - canvas.padding, legend);
    writeln!(
        out,
        r#"  <g id="legend" transform="translate({},{})">"#,
        num(lx),
        num(ly)
    )?;
    for entry in &entries {
        writeln!(
            out,
            r#"    <g class="legend-entry" transform="translate({},{})">"#,
            num(entry.x),
            num(entry.y)
        )?;
        writeln!(
            out,
            r#"      <rect class="legend-item" width="{}" height="{}" fill="{}" data-category="{}"/>"#,
            num(legend.swatch_size),
            num(legend.swatch_size),
            entry.color.to_hex(),
            escape(&entry.category)
        )?;
        writeln!(
            out,
            r#"      <text x="{}" y="{}" font-size="10px">{}</text>"#,
            num(legend.swatch_size + legend.gap),
            num(legend.swatch_size - 2.0),
            escape(&entry.name)
        )?;
        writeln!(out, "    </g>")?;
    }
    writeln!(out, "  </g>")?;
    writeln!(out, "</svg>")
}

/// Shortest decimal form: integers without a fraction, others to 3 places.
fn num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::settings::Settings;
    use crate::tree::TreeNode;
    use crate::ui::legend::category_colors;

    fn document() -> String {
        let root = TreeNode::branch(
            "games",
            vec![
                TreeNode::branch(
                    "Wii",
                    vec![
                        TreeNode::leaf("Wii Sports", 82.53),
                        TreeNode::leaf("Mario & Sonic", 10.0),
                    ],
                ),
                TreeNode::branch("NES", vec![TreeNode::leaf("Duck Hunt", 28.31)]),
            ],
        );
        let settings = Settings::default();
        let (w, h) = settings.canvas.treemap_size();
        let (tree, layout) = compute_layout(&root, w, h, &settings.layout).unwrap();
        let colors = category_colors(&tree, &layout);
        let options = SvgOptions {
            title: "Video Game Sales".into(),
            description: "Top 100 Most Sold Video Games Grouped by Platform".into(),
            canvas: settings.canvas.clone(),
            ..SvgOptions::default()
        };
        render_svg(&tree, &layout, &colors, &options).unwrap()
    }

    #[test]
    fn one_tile_per_leaf_with_data_attributes() {
        let svg = document();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="tile""#).count(), 3);
        assert!(svg.contains(r#"data-name="Wii Sports""#));
        assert!(svg.contains(r#"data-category="games.Wii""#));
        assert!(svg.contains(r#"data-value="82.53""#));
        assert!(svg.contains(r#"<text id="title" text-anchor="middle">Video Game Sales</text>"#));
    }

    #[test]
    fn text_is_escaped() {
        let svg = document();
        assert!(svg.contains("Mario &amp; Sonic"));
        assert!(!svg.contains("Mario & Sonic"));
    }

    #[test]
    fn legend_lists_first_level_categories() {
        let svg = document();
        assert_eq!(svg.matches(r#"class="legend-item""#).count(), 2);
        assert!(svg.contains(">Wii</text>"));
        assert!(svg.contains(">NES</text>"));
    }

    #[test]
    fn labels_stack_words_in_tspans() {
        let svg = document();
        assert!(svg.contains(r#"<tspan x="4" y="8">Wii</tspan>"#));
        assert!(svg.contains(r#"<tspan x="4" y="16">Sports</tspan>"#));
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(600.0), "600");
        assert_eq!(num(473.33333), "473.333");
        assert_eq!(num(0.5), "0.5");
    }
}
