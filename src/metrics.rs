// src/metrics.rs
//! Оценка готовой карты по целевым долям

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::TargetRatios;
use crate::grid::Grid;
use crate::hydrology::{HydrologyMap, TerrainType};
use crate::solver::Metrics;

/// Доли типов местности и признаки удачной карты
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapMetrics {
    /// Суша, включая болота
    pub land_ratio: f64,
    pub water_ratio: f64,
    pub ocean_ratio: f64,
    pub lake_ratio: f64,
    pub river_ratio: f64,
    pub marsh_ratio: f64,
    /// Доля клеток суши не ниже рудной высоты
    pub ore_ratio: f64,
    pub lake_count: usize,
    /// Центр карты (точка высадки) оказался в воде
    pub origin_is_water: bool,
    pub satisfied: bool,
    pub score: f64,
}

/// Насколько `value` выходит за `[min, max]`
fn gap(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// Считает доли по результату гидрологии.
///
/// Оценка равна 1 минус суммарный выход долей суши и руды за целевые
/// диапазоны, со штрафом 0.25 за воду в центре.
#[must_use]
pub fn measure_map(hydrology: &HydrologyMap, elevation: &Grid<f32>, targets: &TargetRatios) -> MapMetrics {
    let types = &hydrology.types;
    if types.is_empty() {
        return MapMetrics::default();
    }

    let stats = hydrology.stats();
    let total = types.len() as f64;
    let ratio = |count: usize| count as f64 / total;

    let ore_cells = types
        .data
        .iter()
        .zip(&elevation.data)
        .filter(|(t, h)| matches!(t, TerrainType::Land | TerrainType::Marsh) && **h >= targets.ore_elevation)
        .count();

    let origin = types.index(types.width / 2, types.height / 2);
    let origin_is_water = types.data[origin].is_water();

    let land_ratio = ratio(stats.land_tiles + stats.marsh_tiles);
    let ore_ratio = ratio(ore_cells);
    let land_gap = gap(land_ratio, targets.min_land_ratio, targets.max_land_ratio);
    let ore_gap = gap(ore_ratio, targets.min_ore_ratio, targets.max_ore_ratio);

    let satisfied = land_gap == 0.0 && ore_gap == 0.0 && !origin_is_water;
    let origin_penalty = if origin_is_water { 0.25 } else { 0.0 };

    MapMetrics {
        land_ratio,
        water_ratio: ratio(stats.total_water_tiles()),
        ocean_ratio: ratio(stats.ocean_tiles),
        lake_ratio: ratio(stats.lake_tiles),
        river_ratio: ratio(stats.river_tiles),
        marsh_ratio: ratio(stats.marsh_tiles),
        ore_ratio,
        lake_count: stats.lake_count,
        origin_is_water,
        satisfied,
        score: 1.0 - land_gap - ore_gap - origin_penalty,
    }
}

impl From<&MapMetrics> for Metrics {
    fn from(m: &MapMetrics) -> Self {
        let values = BTreeMap::from([
            ("water_ratio".to_owned(), m.water_ratio),
            ("ocean_ratio".to_owned(), m.ocean_ratio),
            ("lake_ratio".to_owned(), m.lake_ratio),
            ("river_ratio".to_owned(), m.river_ratio),
            ("marsh_ratio".to_owned(), m.marsh_ratio),
            ("lake_count".to_owned(), m.lake_count as f64),
        ]);
        Metrics {
            satisfied: m.satisfied,
            score: Some(m.score),
            land_ratio: m.land_ratio,
            ore_ratio: m.ore_ratio,
            origin_is_water: m.origin_is_water,
            values,
        }
    }
}
