//! Заполнение впадин (priority-flood)

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::Grid;

/// Элемент очереди: `BinaryHeap` является max-кучей, поэтому порядок перевёрнут
#[derive(Clone, Copy, Debug)]
struct FloodEntry {
    level: f32,
    idx: usize,
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Первым извлекается наименьший уровень, при равенстве меньший индекс
        other
            .level
            .total_cmp(&self.level)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Строит «водонепроницаемую» поверхность без замкнутых впадин.
///
/// Граница засевается значением `max(высота, уровень моря)`, дальше вода
/// разливается от самого низкого фронта: каждая клетка получает
/// `max(своя высота, уровень, с которого до неё дошли)`. Каждая клетка
/// посещается ровно один раз, O(N log N).
#[must_use]
pub fn fill_depressions(elevation: &Grid<f32>, sea_level: f32) -> Grid<f32> {
    let mut filled = elevation.map(|&h| h.max(sea_level));
    if filled.is_empty() {
        return filled;
    }

    let mut visited = vec![false; filled.len()];
    let mut heap = BinaryHeap::new();

    for idx in 0..filled.len() {
        if filled.is_boundary(idx) {
            visited[idx] = true;
            heap.push(FloodEntry {
                level: filled.data[idx],
                idx,
            });
        }
    }

    while let Some(FloodEntry { level, idx }) = heap.pop() {
        for (_, n) in elevation.neighbors8(idx) {
            if visited[n] {
                continue;
            }
            visited[n] = true;
            let raised = elevation.data[n].max(level);
            filled.data[n] = raised;
            heap.push(FloodEntry { level: raised, idx: n });
        }
    }

    filled
}
