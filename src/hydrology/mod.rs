// src/hydrology/mod.rs
//! Гидрология региона: от карты высот до классифицированной местности
//!
//! Конвейер одного прохода:
//! 1. Заполнение впадин ([`fill`])
//! 2. Разметка океана и озёр ([`drainage`])
//! 3. Направления и накопление стока D8 ([`flow`])
//! 4. Реки, притоки, устья и болотная кайма ([`rivers`])
//! 5. Чистка артефактов: диагонали, береговая линия, одиночные клетки ([`cleanup`])
//!
//! Проход детерминирован: одинаковые высоты, сид и правила дают побайтно
//! одинаковый результат.

pub mod cleanup;
pub mod drainage;
pub mod fill;
pub mod flow;
pub mod rivers;

use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::config::{WaterRules, WorldSettings, resolve_water_rules};
use crate::grid::{D8, Grid};
use crate::heightmap::sanitize_heightmap;
use crate::seed::Seed;

pub use drainage::LakeBasin;

/// Допуск при сравнении высот
pub const EPSILON: f32 = 1e-6;

/// Тип местности клетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    #[default]
    Land,
    Ocean,
    Lake,
    River,
    Marsh,
}

impl TerrainType {
    /// Открытая вода: океан, озеро или река. Болото водой не считается.
    #[must_use]
    pub fn is_water(self) -> bool {
        matches!(self, TerrainType::Ocean | TerrainType::Lake | TerrainType::River)
    }
}

/// Направление стока к одному из восьми соседей
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowDir {
    pub dx: i8,
    pub dy: i8,
}

impl FlowDir {
    /// Направление по номеру слота в [`D8`]
    #[must_use]
    pub fn from_slot(slot: usize) -> Self {
        let (dx, dy) = D8[slot % D8.len()];
        // Компоненты D8 лежат в {-1, 0, 1}
        Self {
            dx: i8::try_from(dx.signum()).unwrap_or(0),
            dy: i8::try_from(dy.signum()).unwrap_or(0),
        }
    }
}

/// Результат одного прохода гидрологии
#[derive(Debug, Clone, Serialize)]
pub struct HydrologyMap {
    pub width: usize,
    pub height: usize,
    pub types: Grid<TerrainType>,
    pub flow_directions: Grid<Option<FlowDir>>,
    pub flow_accumulation: Grid<f32>,
    pub filled_elevation: Grid<f32>,
    pub basins: Vec<LakeBasin>,
    pub rules: WaterRules,
    pub sea_level: f32,
}

/// Сводка по типам местности
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HydrologyStats {
    pub land_tiles: usize,
    pub ocean_tiles: usize,
    pub lake_tiles: usize,
    pub river_tiles: usize,
    pub marsh_tiles: usize,
    pub lake_count: usize,
}

impl HydrologyStats {
    #[must_use]
    pub fn total_water_tiles(&self) -> usize {
        self.ocean_tiles + self.lake_tiles + self.river_tiles
    }
}

impl HydrologyMap {
    #[must_use]
    pub fn stats(&self) -> HydrologyStats {
        let mut stats = HydrologyStats {
            lake_count: self.basins.len(),
            ..HydrologyStats::default()
        };
        for t in &self.types.data {
            match t {
                TerrainType::Land => stats.land_tiles += 1,
                TerrainType::Ocean => stats.ocean_tiles += 1,
                TerrainType::Lake => stats.lake_tiles += 1,
                TerrainType::River => stats.river_tiles += 1,
                TerrainType::Marsh => stats.marsh_tiles += 1,
            }
        }
        stats
    }

    /// Типы местности построчно: `rows[y][x]`
    #[must_use]
    pub fn type_rows(&self) -> Vec<Vec<TerrainType>> {
        self.types.to_rows()
    }
}

/// Гидрология с правилами, выведенными из биома и настроек мира
#[must_use]
pub fn generate_hydrology(
    elevation: &Grid<f32>,
    seed: &Seed,
    biome: Biome,
    world: &WorldSettings,
) -> HydrologyMap {
    let rules = resolve_water_rules(biome, world, elevation.width, elevation.height);
    generate_hydrology_with_rules(elevation, seed.to_u64(), rules)
}

/// Полный проход гидрологии с готовыми правилами
#[must_use]
pub fn generate_hydrology_with_rules(elevation: &Grid<f32>, seed: u64, rules: WaterRules) -> HydrologyMap {
    let sea_level = rules.sea_level;
    let elevation = sanitize_heightmap(elevation);
    let (width, height) = (elevation.width, elevation.height);

    if elevation.is_empty() {
        log::warn!("гидрология: пустая сетка {width}×{height}");
    }

    let filled = fill::fill_depressions(&elevation, sea_level);

    let drainage::Drainage { mut types, mut basins } =
        drainage::classify_drainage(&elevation, &filled, sea_level, &rules);
    log::debug!(
        "гидрология: котловин {}, клеток океана {}",
        basins.len(),
        types.data.iter().filter(|t| **t == TerrainType::Ocean).count()
    );

    let mut flow_directions = flow::route_flow(&elevation, &filled, &types, seed);
    let flow_accumulation = flow::accumulate_flow(&flow_directions);
    let upstream = flow::upstream_adjacency(&flow_directions);

    let network = rivers::FlowNetwork {
        flow: &flow_directions,
        accumulation: &flow_accumulation,
        upstream: &upstream,
    };
    let river_cells = rivers::seed_rivers(&mut types, &network, &rules);
    let mouth_cells = rivers::widen_mouths(&mut types, &network, &rules);
    log::debug!("гидрология: рек {river_cells}, расширение устьев {mouth_cells}");

    let marsh_cells = rivers::lay_marsh_fringe(&mut types, &rules);
    let bridged = cleanup::bridge_diagonals(&mut types);
    log::debug!("гидрология: болотная кайма {marsh_cells}, диагональные перемычки {bridged}");

    let mut flooded = cleanup::normalize_coastline(&mut types);
    let pruned = cleanup::prune_singletons(&mut types, &filled, rules.max_singleton_fraction);
    if pruned > 0 {
        // Осушенная одиночная клетка океана у края могла разорвать берег
        flooded += cleanup::normalize_coastline(&mut types);
    }

    // Затопленные клетки стали океаном и больше никуда не стекают
    for (dir, t) in flow_directions.data.iter_mut().zip(&types.data) {
        if *t == TerrainType::Ocean {
            *dir = None;
        }
    }
    log::debug!("гидрология: затоплено островов {flooded}, убрано одиночных клеток {pruned}");

    // Котловины, ушедшие под океан или вернувшиеся в сушу, больше не озёра
    basins.retain(|basin| types.data[basin.deepest] == TerrainType::Lake);

    HydrologyMap {
        width,
        height,
        types,
        flow_directions,
        flow_accumulation,
        filled_elevation: filled,
        basins,
        rules,
        sea_level,
    }
}
