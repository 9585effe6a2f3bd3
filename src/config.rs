// src/config.rs
//! Конфигурация генерации и правила воды
//!
//! Этот модуль определяет все параметры, управляющие построением карты:
//! - Настройки мира (уровень моря, влажность)
//! - Параметры рельефа и формы (сдвиг начала координат, масштаб)
//! - Целевые доли суши и руды для решателя
//! - Настройки решателя (число итераций, размер чанков)
//! - Правила воды, выводимые из биома, мира и размера сетки
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::biome::Biome;
use crate::error::HydromapError;
use crate::seed::Seed;

/// Глобальные настройки мира
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSettings {
    /// Уровень моря в нормированных высотах `[0, 1]`
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,

    /// Глобальный множитель влажности (1.0 = как задано биомом)
    #[serde(default = "default_wetness")]
    pub wetness: f32,

    /// Минимальная глубина озера (в долях высоты)
    #[serde(default = "default_lake_min_depth")]
    pub lake_min_depth: f32,

    /// Допустимая доля одиночных водных клеток от всей карты
    #[serde(default = "default_max_singleton_fraction")]
    pub max_singleton_fraction: f32,
}

fn default_sea_level() -> f32 {
    0.3
}
fn default_wetness() -> f32 {
    1.0
}
fn default_lake_min_depth() -> f32 {
    0.02
}
fn default_max_singleton_fraction() -> f32 {
    0.002
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            sea_level: 0.3,
            wetness: 1.0,
            lake_min_depth: 0.02,
            max_singleton_fraction: 0.002,
        }
    }
}

/// Правила воды для одного прохода гидрологии.
///
/// Пересчитываются для каждого прохода функцией [`resolve_water_rules`];
/// гидрология только читает их.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterRules {
    pub sea_level: f32,
    /// Минимальная глубина котловины, чтобы она считалась озером
    pub lake_min_depth: f32,
    /// Минимальная площадь озера в клетках
    pub lake_min_area: usize,
    /// Накопление стока, с которого клетка становится рекой
    pub river_flow_threshold: f32,
    /// Порог для притоков, достраиваемых от уже найденных рек
    pub tributary_threshold: f32,
    /// Порог расширения русла у устья
    pub mouth_threshold: f32,
    /// Общий множитель порогов стока
    pub flow_multiplier: f32,
    /// Радиус болотной каймы
    pub marsh_ring: usize,
    /// Сила заболачивания; `<= 0` отключает болота
    pub marshiness: f32,
    /// Допустимая доля одиночных водных клеток
    pub max_singleton_fraction: f32,
}

impl Default for WaterRules {
    fn default() -> Self {
        Self {
            sea_level: 0.3,
            lake_min_depth: 0.02,
            lake_min_area: 6,
            river_flow_threshold: 40.0,
            tributary_threshold: 16.0,
            mouth_threshold: 24.0,
            flow_multiplier: 1.0,
            marsh_ring: 1,
            marshiness: 0.55,
            max_singleton_fraction: 0.002,
        }
    }
}

/// Выводит правила воды из биома, настроек мира и размера сетки.
///
/// Пороги стока растут с линейным размером карты (`sqrt(клеток)`), чтобы
/// густота речной сети не зависела от разрешения.
#[must_use]
pub fn resolve_water_rules(
    biome: Biome,
    world: &WorldSettings,
    width: usize,
    height: usize,
) -> WaterRules {
    let traits = biome.water_traits();
    let cells = (width * height) as f32;
    let span = cells.sqrt();

    let wetness = (traits.wetness * world.wetness).max(0.05);
    let river_flow_threshold = (span * 1.6).max(30.0);
    let lake_min_area = ((cells / 900.0) * traits.lake_affinity).round().max(4.0) as usize;

    WaterRules {
        sea_level: world.sea_level.clamp(0.0, 1.0),
        lake_min_depth: world.lake_min_depth.max(0.0),
        lake_min_area,
        river_flow_threshold,
        tributary_threshold: river_flow_threshold * 0.4,
        mouth_threshold: river_flow_threshold * 0.6,
        flow_multiplier: 1.0 / wetness,
        marsh_ring: traits.marsh_ring,
        marshiness: traits.marshiness,
        max_singleton_fraction: world.max_singleton_fraction.max(0.0),
    }
}

/// Настройки рельефа для генератора высот
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainSettings {
    /// Степень нелинейности высоты:
    /// - `<1.0` → сглаживает рельеф (меньше гор, больше равнин),
    /// - `=1.0` → линейно,
    /// - `>1.0` → усиливает рельеф (более резкие горы и долины).
    ///
    /// `None`: взять значение биома.
    #[serde(default)]
    pub elevation_power: Option<f32>,

    /// Радиус сглаживания в клетках (0 = без сглаживания)
    #[serde(default = "default_smooth_radius")]
    pub smooth_radius: usize,

    /// Число октав фрактального шума
    #[serde(default = "default_octaves")]
    pub octaves: i32,

    /// Базовая частота шума при `world_scale = 1`
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Сила спада высоты к краям региона (0.0 = без спада)
    #[serde(default = "default_edge_falloff")]
    pub edge_falloff: f32,
}

fn default_smooth_radius() -> usize {
    1
}
fn default_octaves() -> i32 {
    4
}
fn default_frequency() -> f32 {
    0.02
}
fn default_edge_falloff() -> f32 {
    0.35
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            elevation_power: None,
            smooth_radius: 1,
            octaves: 4,
            frequency: 0.02,
            edge_falloff: 0.35,
        }
    }
}

/// Подбираемые решателем параметры формы рельефа
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShapeParams {
    /// Сдвиг окна выборки шума по X
    pub origin_x: f32,
    /// Сдвиг окна выборки шума по Y
    pub origin_y: f32,
    /// Масштаб мира: >1.0 даёт более крупные континенты
    pub world_scale: f32,
    /// Смещение всех высот до нормализации уровня суши
    pub elevation_bias: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            world_scale: 1.0,
            elevation_bias: 0.0,
        }
    }
}

/// Целевые доли, при которых карта считается удачной
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetRatios {
    #[serde(default = "default_min_land")]
    pub min_land_ratio: f64,
    #[serde(default = "default_max_land")]
    pub max_land_ratio: f64,
    #[serde(default = "default_min_ore")]
    pub min_ore_ratio: f64,
    #[serde(default = "default_max_ore")]
    pub max_ore_ratio: f64,
    /// Высота, начиная с которой на суше залегает руда
    #[serde(default = "default_ore_elevation")]
    pub ore_elevation: f32,
}

fn default_min_land() -> f64 {
    0.55
}
fn default_max_land() -> f64 {
    0.8
}
fn default_min_ore() -> f64 {
    0.02
}
fn default_max_ore() -> f64 {
    0.2
}
fn default_ore_elevation() -> f32 {
    0.72
}

impl Default for TargetRatios {
    fn default() -> Self {
        Self {
            min_land_ratio: 0.55,
            max_land_ratio: 0.8,
            min_ore_ratio: 0.02,
            max_ore_ratio: 0.2,
            ore_elevation: 0.72,
        }
    }
}

/// Настройки решателя
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverSettings {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Размер чанка перерисовки в клетках
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_count")]
    pub chunk_rows: usize,
    #[serde(default = "default_chunk_count")]
    pub chunk_columns: usize,
}

fn default_max_iterations() -> usize {
    5
}
fn default_chunk_size() -> usize {
    16
}
fn default_chunk_count() -> usize {
    1
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            chunk_size: 16,
            chunk_rows: 1,
            chunk_columns: 1,
        }
    }
}

/// Полная конфигурация генерации одной карты. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Сид (число или строка)
    #[serde(default)]
    pub seed: Seed,

    /// Ширина карты в клетках (по умолчанию 128)
    #[serde(default = "default_width")]
    pub width: usize,

    /// Высота карты в клетках (по умолчанию 128)
    #[serde(default = "default_height")]
    pub height: usize,

    #[serde(default)]
    pub biome: Biome,

    #[serde(default)]
    pub world: WorldSettings,

    #[serde(default)]
    pub terrain: TerrainSettings,

    /// Начальные параметры формы; решатель стартует с них
    #[serde(default)]
    pub shape: ShapeParams,

    #[serde(default)]
    pub targets: TargetRatios,

    #[serde(default)]
    pub solver: SolverSettings,
}

fn default_width() -> usize {
    128
}
fn default_height() -> usize {
    128
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: Seed::default(),
            width: 128,
            height: 128,
            biome: Biome::default(),
            world: WorldSettings::default(),
            terrain: TerrainSettings::default(),
            shape: ShapeParams::default(),
            targets: TargetRatios::default(),
            solver: SolverSettings::default(),
        }
    }
}

impl GenerationConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = "atlas"
    /// width = 96
    /// height = 96
    /// biome = "swamp"
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self, HydromapError> {
        let contents = fs::read_to_string(path).map_err(|source| HydromapError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, HydromapError> {
        Ok(toml::from_str(contents)?)
    }

    /// Правила воды для текущего биома и размера
    #[must_use]
    pub fn water_rules(&self) -> WaterRules {
        resolve_water_rules(self.biome, &self.world, self.width, self.height)
    }
}
