//! Разделение воды на океан и озёра по заполненной поверхности

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{EPSILON, TerrainType};
use crate::config::WaterRules;
use crate::grid::Grid;

/// Порог мягкой глубины, с которого клетка может начать котловину
const SOFT_DEPTH_FACTOR: f32 = 0.6;
const SOFT_DEPTH_FLOOR: f32 = 0.006;
/// Во сколько раз глубже минимума должна быть малая котловина, чтобы остаться озером
const DEEP_LAKE_FACTOR: f32 = 1.35;

/// Принятая котловина озера
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeBasin {
    /// Уровень перелива (заполненная высота котловины)
    pub spill_level: f32,
    pub cells: usize,
    pub max_depth: f32,
    /// Индекс самой глубокой клетки
    pub deepest: usize,
}

#[derive(Debug, Clone)]
pub struct Drainage {
    pub types: Grid<TerrainType>,
    pub basins: Vec<LakeBasin>,
}

/// Размечает океан, озёра и сушу.
///
/// Сначала от границы разливается океан по клеткам не выше уровня моря
/// (ортогональная связность), затем оставшиеся впадины проверяются на озёра.
/// Малые и мелкие котловины остаются сушей: обычно это артефакты шума.
#[must_use]
pub fn classify_drainage(
    elevation: &Grid<f32>,
    filled: &Grid<f32>,
    sea_level: f32,
    rules: &WaterRules,
) -> Drainage {
    let mut types = Grid::new_with(elevation.width, elevation.height, TerrainType::Land);
    let mut visited = vec![false; elevation.len()];

    flood_ocean(elevation, sea_level, &mut types, &mut visited);
    let basins = find_lakes(elevation, filled, rules, &mut types, &mut visited);

    Drainage { types, basins }
}

fn flood_ocean(
    elevation: &Grid<f32>,
    sea_level: f32,
    types: &mut Grid<TerrainType>,
    visited: &mut [bool],
) {
    let mut queue = VecDeque::new();

    for idx in 0..elevation.len() {
        if elevation.is_boundary(idx) && elevation.data[idx] <= sea_level {
            visited[idx] = true;
            types.data[idx] = TerrainType::Ocean;
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        for n in elevation.neighbors4(idx) {
            if !visited[n] && elevation.data[n] <= sea_level {
                visited[n] = true;
                types.data[n] = TerrainType::Ocean;
                queue.push_back(n);
            }
        }
    }
}

fn find_lakes(
    elevation: &Grid<f32>,
    filled: &Grid<f32>,
    rules: &WaterRules,
    types: &mut Grid<TerrainType>,
    visited: &mut [bool],
) -> Vec<LakeBasin> {
    let soft_depth = (SOFT_DEPTH_FACTOR * rules.lake_min_depth).max(SOFT_DEPTH_FLOOR);
    let deep_enough = DEEP_LAKE_FACTOR * rules.lake_min_depth;
    let depth = |idx: usize| filled.data[idx] - elevation.data[idx];

    let mut basins = Vec::new();
    let mut stack = Vec::new();
    let mut members = Vec::new();

    for start in 0..elevation.len() {
        if visited[start] || depth(start) < soft_depth {
            continue;
        }

        let target = filled.data[start];
        members.clear();
        visited[start] = true;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            members.push(idx);
            for (_, n) in elevation.neighbors8(idx) {
                if visited[n] || (filled.data[n] - target).abs() > EPSILON || depth(n) <= EPSILON {
                    continue;
                }
                visited[n] = true;
                stack.push(n);
            }
        }

        let (deepest, max_depth) = members
            .iter()
            .map(|&idx| (idx, depth(idx)))
            .fold((start, f32::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });

        if members.len() >= rules.lake_min_area || max_depth >= deep_enough {
            for &idx in &members {
                types.data[idx] = TerrainType::Lake;
            }
            basins.push(LakeBasin {
                spill_level: target,
                cells: members.len(),
                max_depth,
                deepest,
            });
        }
    }

    basins
}
