//! Реки, притоки, устья и болотная кайма

use std::collections::VecDeque;

use super::TerrainType;
use super::flow::downstream;
use crate::config::WaterRules;
use crate::grid::Grid;
use crate::hydrology::FlowDir;

/// Максимальная глубина расширения русла от устья
const MOUTH_MAX_DEPTH: usize = 4;
/// Минимальный вес клетки каймы, при котором она становится болотом
const MARSH_MIN_WEIGHT: f32 = 0.4;

/// Накопление и граф стока для классификации рек
pub struct FlowNetwork<'a> {
    pub flow: &'a Grid<Option<FlowDir>>,
    pub accumulation: &'a Grid<f32>,
    pub upstream: &'a [Vec<usize>],
}

/// Стадии 1–2: исходные реки по порогу стока и достройка притоков.
///
/// Возвращает число клеток, ставших рекой.
pub fn seed_rivers(types: &mut Grid<TerrainType>, network: &FlowNetwork<'_>, rules: &WaterRules) -> usize {
    let river_threshold = rules.river_flow_threshold * rules.flow_multiplier;
    let tributary_threshold = rules.tributary_threshold * rules.flow_multiplier;

    let mut stack = Vec::new();
    for idx in 0..types.len() {
        if types.data[idx] == TerrainType::Land && network.accumulation.data[idx] >= river_threshold {
            types.data[idx] = TerrainType::River;
            stack.push(idx);
        }
    }
    let mut promoted = stack.len();

    // Обход в глубину вниз и вверх по течению: связывает разрозненные участки в русла
    while let Some(idx) = stack.pop() {
        let below = downstream(network.flow, idx);
        for next in below.into_iter().chain(network.upstream[idx].iter().copied()) {
            if types.data[next] == TerrainType::Land
                && network.accumulation.data[next] >= tributary_threshold
            {
                types.data[next] = TerrainType::River;
                promoted += 1;
                stack.push(next);
            }
        }
    }

    promoted
}

/// Стадия 3: расширение русла у устьев (реки, впадающие в океан или озеро).
///
/// Порог затухает с удалением от устья, так что дельта расходится веером.
pub fn widen_mouths(types: &mut Grid<TerrainType>, network: &FlowNetwork<'_>, rules: &WaterRules) -> usize {
    let mouths: Vec<usize> = (0..types.len())
        .filter(|&idx| types.data[idx] == TerrainType::River)
        .filter(|&idx| {
            downstream(network.flow, idx)
                .is_some_and(|t| matches!(types.data[t], TerrainType::Ocean | TerrainType::Lake))
        })
        .collect();

    let mut widened = 0;
    let mut depth_of = vec![usize::MAX; types.len()];
    let mut queue = VecDeque::new();

    for mouth in mouths {
        depth_of[mouth] = 0;
        queue.push_back(mouth);

        while let Some(idx) = queue.pop_front() {
            let depth = depth_of[idx] + 1;
            if depth > MOUTH_MAX_DEPTH {
                continue;
            }
            let threshold = rules.mouth_threshold * (1.0 - depth as f32 * 0.2).max(0.25);

            let neighbors: Vec<usize> = types.neighbors8(idx).map(|(_, n)| n).collect();
            for n in neighbors {
                if depth_of[n] <= depth
                    || types.data[n] != TerrainType::Land
                    || network.accumulation.data[n] < threshold
                {
                    continue;
                }
                depth_of[n] = depth;
                types.data[n] = TerrainType::River;
                widened += 1;
                queue.push_back(n);
            }
        }
    }

    widened
}

/// Стадия 4: болотная кайма вокруг воды.
///
/// Клетка суши на расстоянии `d` от воды становится болотом, если
/// `(1 - d / (ring + 0.5)) * marshiness >= 0.4`.
pub fn lay_marsh_fringe(types: &mut Grid<TerrainType>, rules: &WaterRules) -> usize {
    if rules.marshiness <= 0.0 || rules.marsh_ring == 0 {
        return 0;
    }

    let ring = rules.marsh_ring as i32;
    let reach = rules.marsh_ring as f32 + 0.5;

    // Смещения, которые проходят порог веса, не зависят от клетки
    let offsets: Vec<(i32, i32)> = (-ring..=ring)
        .flat_map(|dy| (-ring..=ring).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| (dx, dy) != (0, 0))
        .filter(|&(dx, dy)| {
            let d = ((dx * dx + dy * dy) as f32).sqrt();
            (1.0 - d / reach) * rules.marshiness >= MARSH_MIN_WEIGHT
        })
        .collect();

    let mut marsh = Vec::new();
    for idx in 0..types.len() {
        if !types.data[idx].is_water() {
            continue;
        }
        for &(dx, dy) in &offsets {
            if let Some(n) = types.offset(idx, dx, dy) {
                if types.data[n] == TerrainType::Land {
                    marsh.push(n);
                }
            }
        }
    }

    let mut converted = 0;
    for idx in marsh {
        if types.data[idx] == TerrainType::Land {
            types.data[idx] = TerrainType::Marsh;
            converted += 1;
        }
    }
    converted
}
