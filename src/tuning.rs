// src/tuning.rs
//! Подбор формы рельефа решателем
//!
//! [`TerrainAdjuster`] связывает генератор высот, гидрологию и оценку карты
//! с [`AdjustmentSolver`]: каждая оценка строит карту заново, а перепредложение
//! двигает начало координат, смещение высот и масштаб мира.

use std::io::Write;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::Value;

use crate::config::{GenerationConfig, ShapeParams};
use crate::error::HydromapError;
use crate::grid::Grid;
use crate::heightmap::{Heightmap, generate_heightmap};
use crate::hydrology::{HydrologyMap, TerrainType, generate_hydrology};
use crate::metrics::{MapMetrics, measure_map};
use crate::seed::derive_seed;
use crate::solver::{
    Adjuster, AdjustmentSolver, EvaluateInput, Metrics, Parameters, RegenUpdate, RegenerateInput, SolveResult,
    SolverOptions,
};

/// Пределы смещения высот
const BIAS_LIMIT: f32 = 0.5;
/// Пределы масштаба мира
const SCALE_RANGE: (f32, f32) = (0.25, 4.0);

/// Карта, построенная для одного набора параметров формы
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub shape: ShapeParams,
    pub heightmap: Heightmap,
    pub hydrology: HydrologyMap,
    pub metrics: MapMetrics,
}

/// Строит карту высот и гидрологию для заданной формы и оценивает результат
#[must_use]
pub fn evaluate_shape(config: &GenerationConfig, shape: &ShapeParams) -> Evaluation {
    let heightmap = generate_heightmap(
        config.seed.to_u64(),
        config.width,
        config.height,
        config.biome,
        &config.terrain,
        shape,
    );
    let hydrology = generate_hydrology(&heightmap, &config.seed, config.biome, &config.world);
    let metrics = measure_map(&hydrology, &heightmap, &config.targets);
    Evaluation {
        shape: *shape,
        heightmap,
        hydrology,
        metrics,
    }
}

/// Параметры решателя из формы рельефа
#[must_use]
pub fn shape_to_parameters(shape: &ShapeParams) -> Parameters {
    match serde_json::to_value(shape) {
        Ok(Value::Object(map)) => map,
        _ => Parameters::new(),
    }
}

/// Форма рельефа из параметров решателя; нечитаемые параметры заменяются `fallback`
#[must_use]
pub fn parameters_to_shape(parameters: &Parameters, fallback: &ShapeParams) -> ShapeParams {
    match serde_json::from_value(Value::Object(parameters.clone())) {
        Ok(shape) => shape,
        Err(err) => {
            log::warn!("подбор: параметры формы не читаются ({err}), используются исходные");
            *fallback
        }
    }
}

/// Оценка и перепредложение формы рельефа
pub struct TerrainAdjuster {
    rng: ChaCha8Rng,
    previous: Option<Grid<TerrainType>>,
    changed: Vec<(usize, usize)>,
    last: Option<Evaluation>,
}

impl TerrainAdjuster {
    #[must_use]
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(derive_seed(config.seed.to_u64(), "solver")),
            previous: None,
            changed: Vec::new(),
            last: None,
        }
    }

    /// Забирает последнюю построенную карту
    pub fn take_last_evaluation(&mut self) -> Option<Evaluation> {
        self.last.take()
    }

    /// Клетки, сменившие тип между двумя последними оценками
    #[must_use]
    pub fn changed_tiles(&self) -> &[(usize, usize)] {
        &self.changed
    }

    fn track_changes(&mut self, types: &Grid<TerrainType>) {
        self.changed.clear();
        if let Some(previous) = &self.previous {
            if previous.width == types.width && previous.height == types.height {
                self.changed.extend(
                    (0..types.len())
                        .filter(|&i| previous.data[i] != types.data[i])
                        .map(|i| types.coords(i)),
                );
            }
        }
        self.previous = Some(types.clone());
    }
}

impl Adjuster<GenerationConfig> for TerrainAdjuster {
    fn evaluate(&mut self, input: EvaluateInput<'_, GenerationConfig>) -> Option<Metrics> {
        let config = input.context;
        let shape = parameters_to_shape(input.parameters, &config.shape);
        let evaluation = evaluate_shape(config, &shape);

        self.track_changes(&evaluation.hydrology.types);
        let metrics = Metrics::from(&evaluation.metrics);
        log::debug!(
            "подбор: итерация {}, суша {:.3}, руда {:.3}, центр в воде: {}",
            input.iteration,
            evaluation.metrics.land_ratio,
            evaluation.metrics.ore_ratio,
            evaluation.metrics.origin_is_water
        );
        self.last = Some(evaluation);
        Some(metrics)
    }

    fn regenerate(&mut self, input: RegenerateInput<'_, GenerationConfig>) -> Option<RegenUpdate> {
        let config = input.context;
        let targets = &config.targets;
        let metrics = input.metrics;
        let mut shape = parameters_to_shape(input.parameters, &config.shape);
        let mut update = RegenUpdate::default();

        // Точка высадки в воде: окно шума сдвигается, старые чанки бесполезны
        if metrics.origin_is_water {
            let span = (config.width.max(config.height) as f32 * 0.75).max(1.0);
            let dx = self.rng.gen_range(-span..=span);
            let dy = self.rng.gen_range(-span..=span);
            shape.origin_x += dx;
            shape.origin_y += dy;
            update.mark_all_dirty = true;
            update
                .messages
                .push(format!("центр карты в воде: сдвиг начала координат на ({dx:.1}, {dy:.1})"));
        }

        let mut adjusted = update.mark_all_dirty;

        let land_gap = if metrics.land_ratio < targets.min_land_ratio {
            targets.min_land_ratio - metrics.land_ratio
        } else if metrics.land_ratio > targets.max_land_ratio {
            targets.max_land_ratio - metrics.land_ratio
        } else {
            0.0
        };
        if land_gap != 0.0 {
            let step = (land_gap.abs() as f32 * 0.6).clamp(0.02, 0.15).copysign(land_gap as f32);
            let bias = (shape.elevation_bias + step).clamp(-BIAS_LIMIT, BIAS_LIMIT);
            if (bias - shape.elevation_bias).abs() > f32::EPSILON {
                update
                    .messages
                    .push(format!("доля суши {:.3}: смещение высот {bias:+.3}", metrics.land_ratio));
                shape.elevation_bias = bias;
                adjusted = true;
            }
        }

        // Руда: вершины после нормализации; их долю меняет крупность рельефа
        let scale = if metrics.ore_ratio < targets.min_ore_ratio {
            shape.world_scale * 0.85
        } else if metrics.ore_ratio > targets.max_ore_ratio {
            shape.world_scale * 1.15
        } else {
            shape.world_scale
        };
        let scale = scale.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        if (scale - shape.world_scale).abs() > f32::EPSILON {
            update
                .messages
                .push(format!("доля руды {:.3}: масштаб мира {scale:.3}", metrics.ore_ratio));
            shape.world_scale = scale;
            adjusted = true;
        }

        if !adjusted {
            update.message = Some("параметры формы достигли пределов".to_owned());
            update.stop = true;
            return Some(update);
        }

        update.mark_tiles = self.changed.clone();
        update.parameters = Some(shape_to_parameters(&shape));
        Some(update)
    }
}

/// Итог подбора: результат решателя и карта для итоговых параметров
#[derive(Debug, Clone, Serialize)]
pub struct TuningOutcome {
    pub solve: SolveResult,
    pub map: Evaluation,
}

impl TuningOutcome {
    /// Записывает итог в JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), HydromapError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

/// Полный подбор параметров формы по конфигурации
#[must_use]
pub fn run_solver(config: &GenerationConfig) -> TuningOutcome {
    let options = SolverOptions::from(&config.solver).with_grid(config.width, config.height);
    let solver = AdjustmentSolver::new(options).with_parameters(shape_to_parameters(&config.shape));
    let mut adjuster = TerrainAdjuster::new(config);
    let solve = solver.solve(&mut adjuster, config);

    let shape = parameters_to_shape(&solve.parameters, &config.shape);
    let map = match adjuster.take_last_evaluation() {
        Some(last) if last.shape == shape => last,
        _ => evaluate_shape(config, &shape),
    };

    TuningOutcome { solve, map }
}
