/// Bin packing: assigns every glyph a page and position and returns the
/// canvas sizes. Two strategies: a greedy first-fit rectangle packer with
/// an expanding used box, and a uniform fixed-cell grid.

use crate::atlas::descriptor::{AtlasDescriptor, GlyphAlignment};
use crate::atlas::glyph::GlyphCollection;
use crate::cancel::CancelToken;
use crate::error::BuildError;
use crate::geom::Vec2i;

/// Places all glyphs according to the descriptor's alignment, mutating
/// each glyph's page/x/y. Grid output lands in `desc.grid_size` and
/// `desc.grid_cells`.
pub fn place_glyphs(
    glyphs: &mut GlyphCollection,
    desc: &mut AtlasDescriptor,
    progress: Option<&mut dyn FnMut(f32)>,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Vec2i>, BuildError> {
    let mut sizes = Vec::new();

    match desc.alignment {
        GlyphAlignment::Grid => {
            glyphs.sort_by_code();
            let size = grid_position(glyphs, desc, progress, cancel)?;
            sizes.push(size);
        }
        GlyphAlignment::BestFit => {
            // largest first minimizes fragmentation
            glyphs.sort_by_area();
            slot_position(glyphs, desc, &mut sizes, progress, cancel)?;
        }
    }

    Ok(sizes)
}

/// Boolean occupancy grid over one canvas.
struct OccupancyGrid {
    cells: Vec<bool>,
    stride: usize,
}

impl OccupancyGrid {
    fn new(max_size: i32) -> Self {
        let stride = max_size.max(0) as usize;
        Self {
            cells: vec![false; stride * stride],
            stride,
        }
    }

    fn clear(&mut self) {
        self.cells.fill(false);
    }

    fn is_free(&self, x: i32, y: i32, width: i32, height: i32) -> bool {
        for cy in y..y + height {
            let row = cy as usize * self.stride;
            for cx in x..x + width {
                if self.cells[row + cx as usize] {
                    return false;
                }
            }
        }
        true
    }

    fn mark(&mut self, x: i32, y: i32, width: i32, height: i32) {
        for cy in y..y + height {
            let row = cy as usize * self.stride;
            for cx in x..x + width {
                self.cells[row + cx as usize] = true;
            }
        }
    }
}

fn slot_position(
    glyphs: &mut GlyphCollection,
    desc: &AtlasDescriptor,
    sizes: &mut Vec<Vec2i>,
    mut progress: Option<&mut dyn FnMut(f32)>,
    cancel: Option<&CancelToken>,
) -> Result<(), BuildError> {
    let max_size = desc.max_size;
    let total = glyphs.len();
    let mut scan = OccupancyGrid::new(max_size);
    let mut used = Vec2i::ZERO;
    let mut page = 0usize;
    let mut current = 0usize;

    for glyph in glyphs.iter_mut() {
        let mut slot = find_slot(&scan, glyph.width, glyph.height, &mut used, max_size);

        if slot.is_none() && desc.multi_texture {
            // finalize this canvas and retry on a fresh one
            sizes.push(used);
            page += 1;
            scan.clear();
            used = Vec2i::ZERO;
            slot = find_slot(&scan, glyph.width, glyph.height, &mut used, max_size);
        }

        let position = slot.ok_or(BuildError::CanvasFull {
            glyphs: total,
            pages: page + 1,
            max_size,
        })?;

        glyph.page = page;
        glyph.x = position.x;
        glyph.y = position.y;
        scan.mark(position.x, position.y, glyph.width, glyph.height);

        current += 1;
        if let Some(report) = progress.as_deref_mut() {
            report(current as f32 / total as f32);
        }
        if let Some(token) = cancel {
            token.check()?;
        }
    }

    // the final canvas (or the only one) has not been recorded yet
    if sizes.len() <= page {
        sizes.push(used);
    }

    if desc.power_two {
        for size in sizes.iter_mut() {
            let edge = high_pow2(size.x.max(size.y));
            *size = Vec2i::new(edge, edge);
        }
    } else {
        // the used box grows a whole glyph dimension at a time and can
        // overshoot; report the tight bounding box instead
        for size in sizes.iter_mut() {
            *size = Vec2i::ZERO;
        }
        for glyph in glyphs.iter() {
            let size = &mut sizes[glyph.page];
            size.x = size.x.max(glyph.x + glyph.width);
            size.y = size.y.max(glyph.y + glyph.height);
        }
    }

    Ok(())
}

/// First-fit scan for a `req_width` x `req_height` rectangle inside the
/// current used box, in row-major order. When nothing fits, the smaller
/// edge of the box grows by the requested dimension (clamped to
/// `max_size - 1`, which keeps the canvas close to square) and the scan
/// repeats. `None` once the box cannot grow any further.
fn find_slot(
    scan: &OccupancyGrid,
    req_width: i32,
    req_height: i32,
    used: &mut Vec2i,
    max_size: i32,
) -> Option<Vec2i> {
    if req_width == 0 || req_height == 0 {
        return Some(Vec2i::ZERO);
    }

    loop {
        for y in 0..(used.y - req_height).max(0) {
            for x in 0..(used.x - req_width).max(0) {
                if scan.is_free(x, y, req_width, req_height) {
                    return Some(Vec2i::new(x, y));
                }
            }
        }

        // ties grow the width
        if used.x <= used.y {
            if used.x == max_size - 1 {
                return None;
            }
            used.x = (used.x + req_width).min(max_size - 1);
        } else {
            if used.y == max_size - 1 {
                return None;
            }
            used.y = (used.y + req_height).min(max_size - 1);
        }
    }
}

fn grid_position(
    glyphs: &mut GlyphCollection,
    desc: &mut AtlasDescriptor,
    mut progress: Option<&mut dyn FnMut(f32)>,
    cancel: Option<&CancelToken>,
) -> Result<Vec2i, BuildError> {
    let mut max_width = 0;
    let mut max_height = 0;
    for glyph in glyphs.iter() {
        max_width = max_width.max(glyph.width);
        max_height = max_height.max(glyph.height);
    }

    let count = glyphs.len() as i32;
    // an all-empty collection degenerates to unit cells
    let cell = max_width.max(max_height).max(1);

    // smallest square multiple of the cell size that holds every glyph
    let mut dim = cell;
    let mut cols = 0;
    while dim <= desc.max_size {
        cols = dim / cell;
        if count <= cols * cols {
            break;
        }
        dim += cell;
    }

    if dim > desc.max_size {
        return Err(BuildError::GridFull {
            glyphs: count as usize,
            max_size: desc.max_size,
        });
    }

    if desc.power_two {
        // dim + 1 guards against an exact power-of-two cell boundary
        dim = high_pow2(dim + 1);
    }

    let total = count as f32;
    for (index, glyph) in glyphs.iter_mut().enumerate() {
        let index = index as i32;
        glyph.page = 0;
        glyph.x = (index % cols) * cell;
        glyph.y = (index / cols) * cell;

        if let Some(report) = progress.as_deref_mut() {
            report((index + 1) as f32 / total);
        }
        if let Some(token) = cancel {
            token.check()?;
        }
    }

    desc.grid_cells = Vec2i::new(cols, (count - 1) / cols + 1);
    desc.grid_size = Vec2i::new(cell, cell);

    if desc.power_two {
        Ok(Vec2i::new(dim, dim))
    } else {
        let mut size = Vec2i::ZERO;
        for glyph in glyphs.iter() {
            size.x = size.x.max(glyph.x + glyph.width);
            size.y = size.y.max(glyph.y + glyph.height);
        }
        Ok(size)
    }
}

/// Smallest power of two >= n.
fn high_pow2(n: i32) -> i32 {
    (n.max(1) as u32).next_power_of_two() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::glyph::{Abc, GlyphDescriptor};
    use image::RgbaImage;

    fn glyph(code: u32, width: u32, height: u32) -> GlyphDescriptor {
        GlyphDescriptor::new(code, Abc::default(), RgbaImage::new(width, height), 0)
    }

    fn squares(count: u32, edge: u32) -> GlyphCollection {
        let mut glyphs = GlyphCollection::new();
        for code in 0..count {
            glyphs.push(glyph(code, edge, edge));
        }
        glyphs
    }

    fn descriptor(alignment: GlyphAlignment, max_size: i32) -> AtlasDescriptor {
        let mut desc = AtlasDescriptor::new();
        desc.alignment = alignment;
        desc.max_size = max_size;
        desc.set_spacing(0);
        desc
    }

    fn assert_no_overlap(glyphs: &GlyphCollection) {
        let rects: Vec<(usize, i32, i32, i32, i32)> = glyphs
            .iter()
            .map(|g| (g.page, g.x, g.y, g.width, g.height))
            .collect();
        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                if a.0 != b.0 {
                    continue;
                }
                let disjoint =
                    a.1 + a.3 <= b.1 || b.1 + b.3 <= a.1 || a.2 + a.4 <= b.2 || b.2 + b.4 <= a.2;
                assert!(disjoint, "glyphs overlap: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_bestfit_end_to_end() {
        // ten 20x20 glyphs need a fourth 20-cell row/column, so the tight
        // box can reach 3x4 cells but never more
        let mut glyphs = squares(10, 20);
        let mut desc = descriptor(GlyphAlignment::BestFit, 128);
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();

        assert_eq!(sizes.len(), 1);
        assert_no_overlap(&glyphs);
        assert!(sizes[0].x <= 80 && sizes[0].y <= 80);
        assert!(sizes[0].x as i64 * sizes[0].y as i64 >= 10 * 400);
        for g in glyphs.iter() {
            assert!(g.x + g.width <= sizes[0].x);
            assert!(g.y + g.height <= sizes[0].y);
        }
    }

    #[test]
    fn test_bestfit_respects_max_size() {
        let mut glyphs = squares(30, 16);
        let mut desc = descriptor(GlyphAlignment::BestFit, 256);
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();
        assert_no_overlap(&glyphs);
        for g in glyphs.iter() {
            assert!(g.x + g.width <= desc.max_size);
            assert!(g.y + g.height <= desc.max_size);
        }
        assert!(sizes[0].x <= desc.max_size && sizes[0].y <= desc.max_size);
    }

    #[test]
    fn test_bestfit_capacity_error() {
        // only nine 20x20 cells fit inside a 64-limit canvas
        let mut glyphs = squares(10, 20);
        let mut desc = descriptor(GlyphAlignment::BestFit, 64);
        let result = place_glyphs(&mut glyphs, &mut desc, None, None);
        assert!(matches!(result, Err(BuildError::CanvasFull { .. })));
    }

    #[test]
    fn test_multi_texture_spills() {
        let mut glyphs = squares(10, 20);
        let mut desc = descriptor(GlyphAlignment::BestFit, 64);
        desc.multi_texture = true;
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();

        assert!(sizes.len() > 1);
        assert_no_overlap(&glyphs);
        let max_page = glyphs.iter().map(|g| g.page).max().unwrap();
        assert_eq!(max_page + 1, sizes.len());
        for g in glyphs.iter() {
            assert!(g.x + g.width <= desc.max_size);
            assert!(g.y + g.height <= desc.max_size);
        }
    }

    #[test]
    fn test_oversized_glyph_fails_even_with_multi_texture() {
        let mut glyphs = GlyphCollection::new();
        glyphs.push(glyph(0, 100, 100));
        let mut desc = descriptor(GlyphAlignment::BestFit, 64);
        desc.multi_texture = true;
        let result = place_glyphs(&mut glyphs, &mut desc, None, None);
        assert!(matches!(result, Err(BuildError::CanvasFull { .. })));
    }

    #[test]
    fn test_power_two_sizes() {
        let mut glyphs = squares(5, 20);
        let mut desc = descriptor(GlyphAlignment::BestFit, 256);
        desc.power_two = true;
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();

        for size in &sizes {
            assert_eq!(size.x, size.y);
            assert!(size.x > 0 && (size.x & (size.x - 1)) == 0);
        }
        // the square must cover every glyph
        for g in glyphs.iter() {
            assert!(g.x + g.width <= sizes[g.page].x);
            assert!(g.y + g.height <= sizes[g.page].y);
        }
    }

    #[test]
    fn test_zero_size_glyph_places_at_origin() {
        let mut glyphs = GlyphCollection::new();
        glyphs.push(glyph(1, 8, 8));
        glyphs.push(GlyphDescriptor::empty(32, Abc::new(0, 4, 0)));
        let mut desc = descriptor(GlyphAlignment::BestFit, 64);
        place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();
        let space = glyphs.find(32).unwrap();
        assert_eq!((space.x, space.y), (0, 0));
    }

    #[test]
    fn test_grid_reading_order() {
        let mut glyphs = GlyphCollection::new();
        // shuffled insertion; grid must re-sort by code
        for code in [67u32, 65, 69, 66, 68] {
            glyphs.push(glyph(code, 10, 10));
        }
        let mut desc = descriptor(GlyphAlignment::Grid, 256);
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();

        assert_eq!(desc.grid_size, Vec2i::new(10, 10));
        assert_eq!(desc.grid_cells, Vec2i::new(3, 2));
        assert_eq!(sizes.len(), 1);

        let ordered: Vec<(u32, i32, i32)> = glyphs.iter().map(|g| (g.code, g.x, g.y)).collect();
        assert_eq!(
            ordered,
            vec![
                (65, 0, 0),
                (66, 10, 0),
                (67, 20, 0),
                (68, 0, 10),
                (69, 10, 10),
            ]
        );
    }

    #[test]
    fn test_grid_is_deterministic() {
        let place = || {
            let mut glyphs = squares(7, 12);
            let mut desc = descriptor(GlyphAlignment::Grid, 256);
            place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();
            glyphs
                .iter()
                .map(|g| (g.code, g.x, g.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(place(), place());
    }

    #[test]
    fn test_grid_tight_size() {
        // 5 glyphs in 3 columns: two rows, last row short
        let mut glyphs = squares(5, 10);
        let mut desc = descriptor(GlyphAlignment::Grid, 256);
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();
        assert_eq!(sizes[0], Vec2i::new(30, 20));
    }

    #[test]
    fn test_grid_power_two() {
        let mut glyphs = squares(4, 16);
        let mut desc = descriptor(GlyphAlignment::Grid, 256);
        desc.power_two = true;
        let sizes = place_glyphs(&mut glyphs, &mut desc, None, None).unwrap();
        // 2x2 cells of 16 = 32 exactly; the +1 guard pushes to 64
        assert_eq!(sizes[0], Vec2i::new(64, 64));
    }

    #[test]
    fn test_grid_overflow_error() {
        let mut glyphs = squares(100, 20);
        let mut desc = descriptor(GlyphAlignment::Grid, 64);
        let result = place_glyphs(&mut glyphs, &mut desc, None, None);
        assert!(matches!(result, Err(BuildError::GridFull { .. })));
    }

    #[test]
    fn test_placement_progress_and_cancel() {
        let mut glyphs = squares(5, 8);
        let mut desc = descriptor(GlyphAlignment::BestFit, 128);
        let mut reports = Vec::new();
        let mut on_progress = |f: f32| reports.push(f);
        place_glyphs(&mut glyphs, &mut desc, Some(&mut on_progress), None).unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(*reports.last().unwrap(), 1.0);

        let token = CancelToken::new();
        token.cancel();
        let mut glyphs = squares(5, 8);
        let result = place_glyphs(&mut glyphs, &mut desc, None, Some(&token));
        assert!(matches!(result, Err(BuildError::Cancelled)));
    }

    #[test]
    fn test_high_pow2() {
        assert_eq!(high_pow2(1), 1);
        assert_eq!(high_pow2(2), 2);
        assert_eq!(high_pow2(3), 4);
        assert_eq!(high_pow2(33), 64);
        assert_eq!(high_pow2(64), 64);
    }
}
