//! Tiling functions: split a rectangle among weighted siblings.
//!
//! Every function takes sibling values in layout order and returns one cell per
//! value, in the same order. Cells exactly tile the input rectangle: the last
//! cell of each run is snapped to the far edge so float drift cannot leave a gap.

/// The golden ratio, the default target aspect ratio for squarified rows.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// An axis-aligned rectangle given by its edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Cell {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Squarified layout (Bruls, Huizing & van Wijk) with a target aspect `ratio`.
///
/// Greedily grows a row of siblings along the shorter side of the remaining
/// space while the worst aspect ratio in the row does not get worse, lays the
/// row out, removes its thickness from the free space and repeats.
pub fn squarify(values: &[f64], ratio: f64, area: Cell) -> Vec<Cell> {
    let n = values.len();
    let mut cells = Vec::with_capacity(n);
    let Cell { mut x0, mut y0, x1, y1 } = area;
    let mut remaining: f64 = values.iter().sum();
    let (mut i0, mut i1) = (0, 0);

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Seed the row with the next non-empty value.
        let mut sum = 0.0;
        while i1 < n {
            sum = values[i1];
            i1 += 1;
            if sum > 0.0 {
                break;
            }
        }

        let (mut min_v, mut max_v) = (sum, sum);
        let alpha = (dy / dx).max(dx / dy) / (remaining * ratio);
        let mut min_ratio = row_ratio(sum, min_v, max_v, alpha);

        // Keep adding values while the worst aspect ratio holds or improves.
        while i1 < n {
            let v = values[i1];
            let next_min = min_v.min(v);
            let next_max = max_v.max(v);
            let next_ratio = row_ratio(sum + v, next_min, next_max, alpha);
            if next_ratio > min_ratio {
                break;
            }
            sum += v;
            min_v = next_min;
            max_v = next_max;
            min_ratio = next_ratio;
            i1 += 1;
        }

        let last_row = i1 >= n;
        let row = &values[i0..i1];
        if dx < dy {
            // Row spans the (shorter) width and consumes height.
            let y_end = if last_row || remaining <= 0.0 {
                y1
            } else {
                y0 + dy * sum / remaining
            };
            cells.extend(dice(row, Cell::new(x0, y0, x1, y_end)));
            y0 = y_end;
        } else {
            let x_end = if last_row || remaining <= 0.0 {
                x1
            } else {
                x0 + dx * sum / remaining
            };
            cells.extend(slice(row, Cell::new(x0, y0, x_end, y1)));
            x0 = x_end;
        }

        remaining -= sum;
        i0 = i1;
    }

    cells
}

/// Worst aspect ratio of a row, in the scaled form used by `squarify`.
fn row_ratio(sum: f64, min_v: f64, max_v: f64, alpha: f64) -> f64 {
    let beta = sum * sum * alpha;
    (max_v / beta).max(beta / min_v)
}

/// Split horizontally: cells share the full height, widths follow values.
pub fn dice(values: &[f64], area: Cell) -> Vec<Cell> {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { area.width() / total } else { 0.0 };
    let mut x = area.x0;
    let last = values.len().saturating_sub(1);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x_end = if i == last { area.x1 } else { x + v * k };
            let cell = Cell::new(x, area.y0, x_end, area.y1);
            x = x_end;
            cell
        })
        .collect()
}

/// Split vertically: cells share the full width, heights follow values.
pub fn slice(values: &[f64], area: Cell) -> Vec<Cell> {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { area.height() / total } else { 0.0 };
    let mut y = area.y0;
    let last = values.len().saturating_sub(1);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let y_end = if i == last { area.y1 } else { y + v * k };
            let cell = Cell::new(area.x0, y, area.x1, y_end);
            y = y_end;
            cell
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn single_item_fills_viewport_without_axis_swap() {
        let cells = squarify(&[1.0], GOLDEN_RATIO, Cell::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(cells, vec![Cell::new(0.0, 0.0, 1920.0, 1080.0)]);
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let values = [400.0, 300.0, 200.0, 100.0];
        let cells = squarify(&values, GOLDEN_RATIO, Cell::new(0.0, 0.0, 50.0, 20.0));
        assert_eq!(cells.len(), values.len());

        let total_out: f64 = cells.iter().map(Cell::area).sum();
        assert_close(total_out, 1000.0);
        for (cell, v) in cells.iter().zip(values) {
            assert_close(cell.area(), v);
        }
    }

    #[test]
    fn first_row_runs_along_the_short_side() {
        // Tall area: the first row spans the full width.
        let cells = squarify(&[6.0, 4.0], GOLDEN_RATIO, Cell::new(0.0, 0.0, 10.0, 20.0));
        assert_close(cells[0].x0, 0.0);
        assert_close(cells[0].x1, 10.0);
        assert_close(cells[0].area(), 120.0);
        assert_close(cells[1].area(), 80.0);
    }

    #[test]
    fn squarified_cells_stay_reasonably_square() {
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let cells = squarify(&values, 1.0, Cell::new(0.0, 0.0, 6.0, 4.0));
        for c in &cells {
            let aspect = (c.width() / c.height()).max(c.height() / c.width());
            assert!(aspect < 4.0, "aspect {aspect} for {c:?}");
        }
    }

    #[test]
    fn dice_and_slice_split_along_one_axis() {
        let area = Cell::new(0.0, 0.0, 10.0, 4.0);
        let d = dice(&[1.0, 3.0], area);
        assert_eq!(d[0], Cell::new(0.0, 0.0, 2.5, 4.0));
        assert_eq!(d[1], Cell::new(2.5, 0.0, 10.0, 4.0));

        let s = slice(&[1.0, 3.0], area);
        assert_eq!(s[0], Cell::new(0.0, 0.0, 10.0, 1.0));
        assert_eq!(s[1], Cell::new(0.0, 1.0, 10.0, 4.0));
    }

    #[test]
    fn zero_sized_area_yields_empty_cells_not_nan() {
        let cells = squarify(&[2.0, 1.0], GOLDEN_RATIO, Cell::new(5.0, 5.0, 5.0, 5.0));
        assert_eq!(cells.len(), 2);
        for c in cells {
            assert!(c.x0.is_finite() && c.y1.is_finite());
            assert_eq!(c.area(), 0.0);
        }
    }
}
