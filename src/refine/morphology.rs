//! Binary morphology for foreground masks
//!
//! Erosion and dilation are computed separably with a sliding-window
//! count per row and per column, so the cost is O(W×H) regardless of the
//! kernel size. Pixels outside the frame count as background.

use crate::config::KernelShape;
use crate::mask::BinaryMask;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis, Zip};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Erode,
    Dilate,
}

/// Morphological opening: erosion followed by dilation
///
/// Removes foreground features smaller than the kernel while leaving
/// larger regions essentially unchanged. Opening is idempotent.
pub fn open(mask: &BinaryMask, kernel_size: usize, shape: KernelShape) -> BinaryMask {
    let _span = tracing::debug_span!("morphology", kernel_size, ?shape).entered();

    let eroded = erode(mask, kernel_size, shape);
    dilate(&eroded, kernel_size, shape)
}

/// A pixel stays foreground only if its whole neighborhood is foreground
///
/// Even kernel sizes are treated as the next odd size.
pub fn erode(mask: &BinaryMask, kernel_size: usize, shape: KernelShape) -> BinaryMask {
    apply(mask, kernel_size / 2, shape, Operation::Erode)
}

/// A pixel becomes foreground if any pixel in its neighborhood is foreground
pub fn dilate(mask: &BinaryMask, kernel_size: usize, shape: KernelShape) -> BinaryMask {
    apply(mask, kernel_size / 2, shape, Operation::Dilate)
}

fn apply(mask: &BinaryMask, radius: usize, shape: KernelShape, op: Operation) -> BinaryMask {
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }

    let src = mask.view();
    let output = match shape {
        KernelShape::Square => {
            let rows = filter_lanes(src, Axis(1), radius, op);
            filter_lanes(rows.view(), Axis(0), radius, op)
        }
        KernelShape::Cross => {
            // The cross is the union of one horizontal and one vertical segment
            let rows = filter_lanes(src, Axis(1), radius, op);
            let cols = filter_lanes(src, Axis(0), radius, op);
            match op {
                Operation::Erode => Zip::from(&rows).and(&cols).map_collect(|&a, &b| a && b),
                Operation::Dilate => Zip::from(&rows).and(&cols).map_collect(|&a, &b| a || b),
            }
        }
    };

    BinaryMask::from_array(output)
}

/// Run the 1-D filter along every lane of `axis`
fn filter_lanes(src: ArrayView2<'_, bool>, axis: Axis, radius: usize, op: Operation) -> Array2<bool> {
    let mut output = Array2::from_elem(src.raw_dim(), false);
    Zip::from(src.lanes(axis))
        .and(output.lanes_mut(axis))
        .for_each(|lane, out| sliding_window(lane, out, radius, op));
    output
}

/// Window [i - radius, i + radius] over one lane, tracking the foreground count
fn sliding_window(
    src: ArrayView1<'_, bool>,
    mut dst: ArrayViewMut1<'_, bool>,
    radius: usize,
    op: Operation,
) {
    let len = src.len();
    let window = 2 * radius + 1;
    let mut count = src.iter().take(radius + 1).filter(|&&v| v).count();

    for i in 0..len {
        dst[i] = match op {
            Operation::Erode => count == window,
            Operation::Dilate => count > 0,
        };

        let entering = i + radius + 1;
        if entering < len && src[entering] {
            count += 1;
        }
        if i >= radius && src[i - radius] {
            count -= 1;
        }
    }
}
