use derive_more::Deref;
use std::f64::consts::TAU;

/// A ring item placed on the dial.
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct LayoutItem<T> {
    #[deref]
    pub item: T,
    pub start_angle: f64,
    pub end_angle: f64,
    pub index: usize,
}

impl<T> LayoutItem<T> {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn center_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// Width of one wedge when `count` items share the full turn.
pub fn angle_step(count: usize) -> Option<f64> {
    (count > 0).then(|| TAU / count as f64)
}

/// Splits the full turn into equal contiguous wedges, one per item, in order.
pub fn compute_ring_layout<T: Clone>(items: &[T]) -> Vec<LayoutItem<T>> {
    let Some(step) = angle_step(items.len()) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| LayoutItem {
            item: item.clone(),
            start_angle: index as f64 * step,
            end_angle: (index + 1) as f64 * step,
            index,
        })
        .collect()
}
