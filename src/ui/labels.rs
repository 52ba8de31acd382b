/// Split a tile name on whitespace into stacked label lines.
pub fn wrap_label(name: &str) -> Vec<&str> {
    name.split_whitespace().collect()
}

/// Placement of label lines inside a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    /// Offset of the text from the tile's left edge
    pub inset_x: f64,
    /// Baseline of the first line below the tile's top edge
    pub first_baseline: f64,
    /// Distance between baselines
    pub line_height: f64,
    pub font_size: f64,
}

impl LabelStyle {
    pub fn for_font_size(font_size: f64) -> Self {
        Self {
            inset_x: 4.0,
            first_baseline: font_size,
            line_height: font_size,
            font_size,
        }
    }

    /// Baseline of line `i`, relative to the tile's top edge.
    pub fn baseline(&self, i: usize) -> f64 {
        self.first_baseline + i as f64 * self.line_height
    }

    /// Keep the lines whose baseline still falls inside a tile of `tile_height`.
    /// Tiles narrower than the inset get no label at all.
    pub fn fit_lines<'a>(&self, lines: &[&'a str], tile_width: f64, tile_height: f64) -> Vec<&'a str> {
        if tile_width <= self.inset_x * 2.0 {
            return Vec::new();
        }
        lines
            .iter()
            .enumerate()
            .take_while(|(i, _)| self.baseline(*i) <= tile_height)
            .map(|(_, line)| *line)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_any_whitespace() {
        assert_eq!(wrap_label("Grand Theft  Auto\tV"), vec!["Grand", "Theft", "Auto", "V"]);
        assert!(wrap_label("   ").is_empty());
    }

    #[test]
    fn fit_lines_clips_to_tile_height() {
        let style = LabelStyle::for_font_size(8.0);
        let lines = wrap_label("Grand Theft Auto V");
        assert_eq!(style.fit_lines(&lines, 50.0, 20.0), vec!["Grand", "Theft"]);
        assert_eq!(style.fit_lines(&lines, 50.0, 100.0).len(), 4);
        assert!(style.fit_lines(&lines, 50.0, 5.0).is_empty());
        assert!(style.fit_lines(&lines, 6.0, 100.0).is_empty());
    }
}
