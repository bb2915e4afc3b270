//! Connected component labeling using union-find over horizontal runs.
//!
//! Each row is split into runs of foreground pixels. A run takes the label
//! of the runs it touches in the row above (merging them when it touches
//! several) or starts a new provisional label. Labels are then flattened to
//! 1..=K in the row-major order of each component's first pixel.

use crate::config::Connectivity;
use crate::mask::BinaryMask;
use ndarray::{s, Array2, ArrayView1};

/// A horizontal run of foreground pixels.
#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize, // inclusive
    end: usize,   // exclusive
    label: u32,
}

impl Run {
    /// Columns of the previous row that can touch this run. End is exclusive.
    fn search_window(&self, connectivity: Connectivity) -> (usize, usize) {
        match connectivity {
            Connectivity::Four => (self.start, self.end),
            Connectivity::Eight => (self.start.saturating_sub(1), self.end + 1),
        }
    }
}

fn extract_runs(row: ArrayView1<'_, bool>, runs: &mut Vec<Run>) {
    let mut run_start = None;
    for (x, &foreground) in row.iter().enumerate() {
        match (foreground, run_start) {
            (true, None) => run_start = Some(x),
            (false, Some(start)) => {
                runs.push(Run {
                    start,
                    end: x,
                    label: 0,
                });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push(Run {
            start,
            end: row.len(),
            label: 0,
        });
    }
}

/// Component ID per pixel: 0 is background, 1..=K are components
#[derive(Debug, Clone)]
pub struct LabelGrid {
    labels: Array2<u32>,
    sizes: Vec<usize>,
}

impl LabelGrid {
    pub fn from_mask(mask: &BinaryMask, connectivity: Connectivity) -> Self {
        let (width, height) = mask.dimensions();
        let mut labels = Array2::<u32>::zeros((height, width));

        let mut uf = UnionFind::new();
        let mut prev_runs: Vec<Run> = Vec::with_capacity(width / 4);
        let mut curr_runs: Vec<Run> = Vec::with_capacity(width / 4);

        for (y, row) in mask.view().rows().into_iter().enumerate() {
            curr_runs.clear();
            extract_runs(row, &mut curr_runs);

            let mut prev_idx = 0;
            for run in &mut curr_runs {
                let (search_start, search_end) = run.search_window(connectivity);

                while prev_idx < prev_runs.len() && prev_runs[prev_idx].end <= search_start {
                    prev_idx += 1;
                }

                let mut assigned = None;
                let mut check_idx = prev_idx;
                while check_idx < prev_runs.len() && prev_runs[check_idx].start < search_end {
                    let prev_label = prev_runs[check_idx].label;
                    match assigned {
                        Some(label) if label != prev_label => uf.union(label, prev_label),
                        None => assigned = Some(prev_label),
                        _ => {}
                    }
                    check_idx += 1;
                }

                run.label = assigned.unwrap_or_else(|| uf.make_set());
                uf.add_pixels(run.label, run.end - run.start);
                labels
                    .slice_mut(s![y, run.start..run.end])
                    .fill(run.label);
            }

            std::mem::swap(&mut prev_runs, &mut curr_runs);
        }

        let sizes = uf.flatten(&mut labels);
        Self { labels, sizes }
    }

    /// Number of components (excluding background)
    pub fn num_labels(&self) -> usize {
        self.sizes.len()
    }

    /// Pixel count per component; index 0 holds label 1
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn label(&self, x: usize, y: usize) -> u32 {
        self.labels.get((y, x)).copied().unwrap_or(0)
    }

    /// Label of the component with the most pixels
    ///
    /// Ties go to the lowest label, i.e. the component whose first pixel
    /// comes first in row-major order.
    pub fn largest(&self) -> Option<u32> {
        let mut best: Option<(usize, usize)> = None;
        for (idx, &size) in self.sizes.iter().enumerate() {
            if best.map_or(true, |(_, best_size)| size > best_size) {
                best = Some((idx, size));
            }
        }
        best.map(|(idx, _)| idx as u32 + 1)
    }

    /// Binary mask of the pixels carrying `label`
    pub fn component_mask(&self, label: u32) -> BinaryMask {
        BinaryMask::from_array(self.labels.mapv(|l| label != 0 && l == label))
    }
}

/// Keep only the largest connected component of `mask`
///
/// Also returns how many components the input had.
pub fn keep_largest(mask: &BinaryMask, connectivity: Connectivity) -> (BinaryMask, usize) {
    let _span = tracing::debug_span!("components", ?connectivity).entered();

    let grid = LabelGrid::from_mask(mask, connectivity);
    let kept = match grid.largest() {
        Some(label) => grid.component_mask(label),
        None => BinaryMask::new(mask.width(), mask.height()),
    };
    (kept, grid.num_labels())
}

/// Sequential union-find keyed by provisional label; slot 0 is background.
struct UnionFind {
    parent: Vec<u32>,
    pixels: Vec<usize>,
}

impl UnionFind {
    fn new() -> Self {
        Self {
            parent: vec![0],
            pixels: vec![0],
        }
    }

    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        self.pixels.push(0);
        label
    }

    fn add_pixels(&mut self, label: u32, count: usize) {
        self.pixels[label as usize] += count;
    }

    /// Find root with path halving.
    fn find(&mut self, label: u32) -> u32 {
        let mut current = label as usize;
        while self.parent[current] as usize != current {
            let grandparent = self.parent[self.parent[current] as usize];
            self.parent[current] = grandparent;
            current = grandparent as usize;
        }
        current as u32
    }

    /// Union two sets (smaller root wins).
    fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (smaller, larger) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[larger as usize] = smaller;
        }
    }

    /// Renumber roots to 1..=K, rewrite `labels`, and return component sizes.
    fn flatten(&mut self, labels: &mut Array2<u32>) -> Vec<usize> {
        let mut final_label = vec![0u32; self.parent.len()];
        let mut sizes = Vec::new();

        // Smaller root wins, so every root precedes the labels it absorbed
        for label in 1..self.parent.len() {
            let root = self.find(label as u32) as usize;
            if root == label {
                sizes.push(0);
                final_label[label] = sizes.len() as u32;
            }
            let assigned = final_label[root];
            final_label[label] = assigned;
            sizes[assigned as usize - 1] += self.pixels[label];
        }

        labels.mapv_inplace(|l| final_label[l as usize]);
        sizes
    }
}
