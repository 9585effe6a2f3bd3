// src/solver.rs
//! Итеративный подбор параметров генерации
//!
//! Решатель не знает, как устроена карта: он вызывает внешнюю оценку
//! ([`Adjuster::evaluate`]) и внешнее перепредложение параметров
//! ([`Adjuster::regenerate`]), помнит лучшее решение и отмечает, какие чанки
//! нужно перерисовать. Если последняя итерация хуже лучшей, параметры
//! откатываются к лучшей.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::SolverSettings;

/// Открытый набор параметров генерации (объект JSON)
pub type Parameters = Map<String, Value>;

/// Метрики одной оценки карты
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub satisfied: bool,
    /// Явная оценка; если её нет или она не конечна, считается по долям
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub land_ratio: f64,
    #[serde(default)]
    pub ore_ratio: f64,
    #[serde(default)]
    pub origin_is_water: bool,
    /// Дополнительные числовые показатели
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Итоговая оценка метрик
#[must_use]
pub fn resolve_score(metrics: &Metrics) -> f64 {
    match metrics.score {
        Some(score) if score.is_finite() => score,
        _ => {
            let origin_penalty = if metrics.origin_is_water { 0.25 } else { 0.0 };
            metrics.land_ratio - 0.2 * metrics.ore_ratio - origin_penalty
        }
    }
}

/// Строго ли `(satisfied, score)` лучше `(incumbent_satisfied, incumbent_score)`.
///
/// Удовлетворяющее решение всегда лучше неудовлетворяющего, при равном статусе
/// побеждает большая оценка. Равный ранг не вытесняет действующее.
#[must_use]
pub fn outranks(satisfied: bool, score: f64, incumbent_satisfied: bool, incumbent_score: f64) -> bool {
    if satisfied != incumbent_satisfied {
        return satisfied;
    }
    score > incumbent_score
}

/// Лучшее решение за проход
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSolution {
    pub score: f64,
    pub metrics: Metrics,
    pub parameters: Parameters,
}

impl BestSolution {
    fn is_beaten_by(&self, metrics: &Metrics, score: f64) -> bool {
        outranks(metrics.satisfied, score, self.metrics.satisfied, self.score)
    }
}

/// Координаты чанка перерисовки
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub row: usize,
    pub column: usize,
}

/// Что нужно перерисовать после прохода
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirtyRegion {
    pub full: bool,
    /// Отсортированы по `(row, column)`; пусто, если `full`
    pub chunks: Vec<ChunkCoord>,
}

/// Настройки решателя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub max_iterations: usize,
    pub chunk_size: usize,
    pub chunk_rows: usize,
    pub chunk_columns: usize,
    /// Размер сетки в клетках; 0, если неизвестен
    pub grid_width: usize,
    pub grid_height: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            chunk_size: 16,
            chunk_rows: 1,
            chunk_columns: 1,
            grid_width: 0,
            grid_height: 0,
        }
    }
}

impl SolverOptions {
    /// Копия, в которой счётчики и размеры не меньше 1
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.max_iterations = self.max_iterations.max(1);
        self.chunk_size = self.chunk_size.max(1);
        self.chunk_rows = self.chunk_rows.max(1);
        self.chunk_columns = self.chunk_columns.max(1);
        self
    }

    #[must_use]
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }
}

impl From<&SolverSettings> for SolverOptions {
    fn from(settings: &SolverSettings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            chunk_size: settings.chunk_size,
            chunk_rows: settings.chunk_rows,
            chunk_columns: settings.chunk_columns,
            ..Self::default()
        }
    }
}

/// Отметки перерисовки
#[derive(Debug)]
struct DirtyTracker {
    full: bool,
    chunks: BTreeSet<ChunkCoord>,
    chunk_size: usize,
    grid_width: usize,
    grid_height: usize,
    rows: usize,
    columns: usize,
}

impl DirtyTracker {
    fn new(options: &SolverOptions) -> Self {
        let cs = options.chunk_size;
        Self {
            full: false,
            chunks: BTreeSet::new(),
            chunk_size: cs,
            grid_width: options.grid_width,
            grid_height: options.grid_height,
            rows: options.chunk_rows.max(options.grid_height.div_ceil(cs)),
            columns: options.chunk_columns.max(options.grid_width.div_ceil(cs)),
        }
    }

    /// Полная перерисовка до конца прохода; отдельные отметки больше не нужны
    fn mark_all(&mut self) {
        self.full = true;
        self.chunks.clear();
    }

    fn mark_tile(&mut self, x: usize, y: usize) {
        if self.grid_width > 0 && x >= self.grid_width {
            return;
        }
        if self.grid_height > 0 && y >= self.grid_height {
            return;
        }
        self.mark_chunk(y / self.chunk_size, x / self.chunk_size);
    }

    fn mark_chunk(&mut self, row: usize, column: usize) {
        if self.full || row >= self.rows || column >= self.columns {
            return;
        }
        self.chunks.insert(ChunkCoord { row, column });
    }

    fn region(&self) -> DirtyRegion {
        DirtyRegion {
            full: self.full,
            chunks: self.chunks.iter().copied().collect(),
        }
    }
}

/// Аргументы оценки
#[derive(Debug, Clone, Copy)]
pub struct EvaluateInput<'a, C> {
    pub parameters: &'a Parameters,
    pub iteration: usize,
    pub context: &'a C,
}

/// Аргументы перепредложения параметров
#[derive(Debug, Clone, Copy)]
pub struct RegenerateInput<'a, C> {
    pub parameters: &'a Parameters,
    pub metrics: &'a Metrics,
    pub iteration: usize,
    pub context: &'a C,
}

/// Ответ `regenerate`: новые параметры и указания решателю
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegenUpdate {
    /// Сливаются с текущими по верхнему уровню
    pub parameters: Option<Parameters>,
    pub messages: Vec<String>,
    pub message: Option<String>,
    pub mark_all_dirty: bool,
    /// Клетки `(x, y)`
    pub mark_tiles: Vec<(usize, usize)>,
    pub mark_chunks: Vec<ChunkCoord>,
    pub stop: bool,
}

/// Внешние оценка и перепредложение параметров.
///
/// `None` из любого метода служит штатным сигналом завершить проход.
pub trait Adjuster<C> {
    fn evaluate(&mut self, input: EvaluateInput<'_, C>) -> Option<Metrics>;
    fn regenerate(&mut self, input: RegenerateInput<'_, C>) -> Option<RegenUpdate>;
}

/// [`Adjuster`] из двух замыканий
pub struct FnAdjuster<E, R> {
    evaluate: E,
    regenerate: R,
}

impl<E, R> FnAdjuster<E, R> {
    pub fn new(evaluate: E, regenerate: R) -> Self {
        Self { evaluate, regenerate }
    }
}

impl<C, E, R> Adjuster<C> for FnAdjuster<E, R>
where
    E: FnMut(EvaluateInput<'_, C>) -> Option<Metrics>,
    R: FnMut(RegenerateInput<'_, C>) -> Option<RegenUpdate>,
{
    fn evaluate(&mut self, input: EvaluateInput<'_, C>) -> Option<Metrics> {
        (self.evaluate)(input)
    }

    fn regenerate(&mut self, input: RegenerateInput<'_, C>) -> Option<RegenUpdate> {
        (self.regenerate)(input)
    }
}

/// Чем закончился цикл итераций
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Satisfied,
    Exhausted,
    NoMetrics,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    pub parameters: Parameters,
    pub metrics: Option<Metrics>,
    pub history: Vec<Metrics>,
    pub messages: Vec<String>,
    pub iterations: usize,
    pub dirty: DirtyRegion,
    pub status: SolveStatus,
    pub best_score: Option<f64>,
    /// Параметры откатились к лучшей итерации
    pub rolled_back: bool,
}

/// Решатель: владеет начальными параметрами и настройками
#[derive(Debug, Clone)]
pub struct AdjustmentSolver {
    options: SolverOptions,
    parameters: Parameters,
}

impl AdjustmentSolver {
    #[must_use]
    pub fn new(options: SolverOptions) -> Self {
        Self {
            options: options.normalized(),
            parameters: Parameters::new(),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Прогоняет итерации оценки и перепредложения.
    ///
    /// Возвращается не позже чем через `max_iterations` вызовов `evaluate`.
    pub fn solve<C, A>(&self, adjuster: &mut A, context: &C) -> SolveResult
    where
        A: Adjuster<C> + ?Sized,
    {
        let mut parameters = self.parameters.clone();
        let mut dirty = DirtyTracker::new(&self.options);
        let mut history = Vec::new();
        let mut messages = Vec::new();
        let mut best: Option<BestSolution> = None;
        let mut metrics: Option<Metrics> = None;
        let mut status = SolveStatus::Exhausted;

        for iteration in 0..self.options.max_iterations {
            let Some(mut current) = adjuster.evaluate(EvaluateInput {
                parameters: &parameters,
                iteration,
                context,
            }) else {
                metrics = None;
                status = SolveStatus::NoMetrics;
                break;
            };

            let score = resolve_score(&current);
            current.score = Some(score);
            history.push(current.clone());
            log::debug!(
                "решатель: итерация {iteration}, оценка {score:.4}, удовлетворено: {}",
                current.satisfied
            );

            if best.as_ref().is_none_or(|b| b.is_beaten_by(&current, score)) {
                best = Some(BestSolution {
                    score,
                    metrics: current.clone(),
                    parameters: parameters.clone(),
                });
            }

            if current.satisfied {
                metrics = Some(current);
                status = SolveStatus::Satisfied;
                break;
            }

            let update = adjuster.regenerate(RegenerateInput {
                parameters: &parameters,
                metrics: &current,
                iteration,
                context,
            });
            metrics = Some(current);
            let Some(update) = update else {
                status = SolveStatus::Stopped;
                break;
            };

            if let Some(patch) = update.parameters {
                parameters.extend(patch);
            }
            messages.extend(update.messages);
            messages.extend(update.message);
            if update.mark_all_dirty {
                dirty.mark_all();
            }
            for (x, y) in update.mark_tiles {
                dirty.mark_tile(x, y);
            }
            for chunk in update.mark_chunks {
                dirty.mark_chunk(chunk.row, chunk.column);
            }
            if update.stop {
                status = SolveStatus::Stopped;
                break;
            }
        }

        let mut rolled_back = false;
        if let Some(best) = &best {
            let keep_final = metrics.as_ref().is_some_and(|m| {
                m.satisfied && !outranks(best.metrics.satisfied, best.score, m.satisfied, resolve_score(m))
            });
            if !keep_final {
                if origin_changed(&best.parameters, &parameters) {
                    log::warn!("решатель: откат сдвигает начало координат, нужна полная перерисовка");
                    dirty.mark_all();
                }
                parameters.clone_from(&best.parameters);
                metrics = Some(best.metrics.clone());
                rolled_back = true;
            }
        }

        let best_score = best.as_ref().map(|b| b.score);
        log::info!(
            "решатель: {:?} за {} итераций, лучшая оценка {:?}{}",
            status,
            history.len(),
            best_score,
            if rolled_back { ", откат к лучшей" } else { "" }
        );

        SolveResult {
            parameters,
            metrics,
            iterations: history.len(),
            history,
            messages,
            dirty: dirty.region(),
            status,
            best_score,
            rolled_back,
        }
    }
}

/// Отличаются ли наборы в ключах сдвига начала координат (`*origin*`, `*shift*`)
fn origin_changed(a: &Parameters, b: &Parameters) -> bool {
    a.keys()
        .chain(b.keys())
        .filter(|key| {
            let key = key.to_ascii_lowercase();
            key.contains("origin") || key.contains("shift")
        })
        .any(|key| a.get(key) != b.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => Parameters::new(),
        }
    }

    fn metrics(satisfied: bool, score: f64) -> Metrics {
        Metrics {
            satisfied,
            score: Some(score),
            ..Metrics::default()
        }
    }

    /// Оценки по сценарию и заранее заданные ответы `regenerate`
    struct Scripted {
        scores: Vec<Option<Metrics>>,
        updates: Vec<Option<RegenUpdate>>,
        evaluations: usize,
        regenerations: usize,
        seen: Vec<Parameters>,
    }

    impl Scripted {
        fn new(scores: Vec<Option<Metrics>>, updates: Vec<Option<RegenUpdate>>) -> Self {
            Self {
                scores,
                updates,
                evaluations: 0,
                regenerations: 0,
                seen: Vec::new(),
            }
        }
    }

    impl Adjuster<()> for Scripted {
        fn evaluate(&mut self, input: EvaluateInput<'_, ()>) -> Option<Metrics> {
            self.evaluations += 1;
            self.seen.push(input.parameters.clone());
            self.scores.get(input.iteration).cloned().flatten()
        }

        fn regenerate(&mut self, input: RegenerateInput<'_, ()>) -> Option<RegenUpdate> {
            self.regenerations += 1;
            self.updates.get(input.iteration).cloned().flatten()
        }
    }

    fn shift_to(x: i64) -> Option<RegenUpdate> {
        Some(RegenUpdate {
            parameters: Some(params(json!({ "origin_x": x }))),
            ..RegenUpdate::default()
        })
    }

    #[test]
    fn test_immediately_satisfied() {
        let mut adjuster = Scripted::new(vec![Some(metrics(true, 1.0))], vec![]);
        let result = AdjustmentSolver::new(SolverOptions::default()).solve(&mut adjuster, &());

        assert_eq!(result.iterations, 1);
        assert_eq!(result.status, SolveStatus::Satisfied);
        assert!(!result.dirty.full);
        assert!(result.dirty.chunks.is_empty());
        assert_eq!(adjuster.regenerations, 0);
        assert!(!result.rolled_back);
    }

    #[test]
    fn test_exhausts_iterations() {
        let scores = (0..10).map(|i| Some(metrics(false, f64::from(i)))).collect();
        let updates = (0..10).map(|_| Some(RegenUpdate::default())).collect();
        let mut adjuster = Scripted::new(scores, updates);
        let options = SolverOptions {
            max_iterations: 4,
            ..SolverOptions::default()
        };
        let result = AdjustmentSolver::new(options).solve(&mut adjuster, &());

        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.iterations, 4);
        assert_eq!(result.iterations, result.history.len());
        assert_eq!(adjuster.evaluations, 4);
        assert_eq!(result.best_score, Some(3.0));
    }

    #[test]
    fn test_zero_iterations_clamped_to_one() {
        let mut adjuster = Scripted::new(vec![Some(metrics(false, 0.0))], vec![Some(RegenUpdate::default())]);
        let options = SolverOptions {
            max_iterations: 0,
            chunk_size: 0,
            ..SolverOptions::default()
        };
        let solver = AdjustmentSolver::new(options);
        assert_eq!(solver.options().chunk_size, 1);
        let result = solver.solve(&mut adjuster, &());
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_rollback_to_best_forces_full_redraw() {
        let scores = vec![
            Some(metrics(false, 0.5)),
            Some(metrics(false, 0.9)),
            Some(metrics(false, 0.3)),
        ];
        let updates = vec![shift_to(10), shift_to(20), shift_to(30)];
        let mut adjuster = Scripted::new(scores, updates);
        let options = SolverOptions {
            max_iterations: 3,
            ..SolverOptions::default()
        };
        let solver = AdjustmentSolver::new(options).with_parameters(params(json!({ "origin_x": 0, "seed": 7 })));
        let result = solver.solve(&mut adjuster, &());

        assert!(result.rolled_back);
        assert_eq!(result.parameters.get("origin_x"), Some(&json!(10)));
        assert_eq!(result.parameters.get("seed"), Some(&json!(7)));
        assert_eq!(result.metrics.as_ref().and_then(|m| m.score), Some(0.9));
        assert!(result.dirty.full);
        // История хранит все итерации, а не только лучшую
        assert_eq!(result.history.len(), 3);
    }

    #[test]
    fn test_rollback_without_origin_change_keeps_chunks() {
        let scores = vec![Some(metrics(false, 0.8)), Some(metrics(false, 0.1))];
        let updates = vec![
            Some(RegenUpdate {
                parameters: Some(params(json!({ "elevation_bias": 0.1 }))),
                mark_tiles: vec![(3, 3)],
                ..RegenUpdate::default()
            }),
            Some(RegenUpdate {
                parameters: Some(params(json!({ "elevation_bias": 0.2 }))),
                ..RegenUpdate::default()
            }),
        ];
        let mut adjuster = Scripted::new(scores, updates);
        let options = SolverOptions {
            max_iterations: 2,
            ..SolverOptions::default()
        };
        let result = AdjustmentSolver::new(options).solve(&mut adjuster, &());

        assert!(result.rolled_back);
        assert!(result.parameters.get("elevation_bias").is_none());
        assert!(!result.dirty.full);
        assert_eq!(result.dirty.chunks, vec![ChunkCoord { row: 0, column: 0 }]);
    }

    #[test]
    fn test_satisfied_snapshot_is_never_displaced() {
        assert!(outranks(true, 0.1, false, 5.0));
        assert!(!outranks(false, 5.0, true, 0.1));
        assert!(outranks(false, 0.6, false, 0.5));
        // Равный ранг оставляет действующее решение
        assert!(!outranks(false, 0.5, false, 0.5));
        assert!(!outranks(false, f64::NAN, false, 0.5));
    }

    #[test]
    fn test_mark_all_is_sticky() {
        let scores = (0..3).map(|_| Some(metrics(false, 0.0))).collect();
        let updates = vec![
            Some(RegenUpdate {
                mark_tiles: vec![(1, 1)],
                ..RegenUpdate::default()
            }),
            Some(RegenUpdate {
                mark_all_dirty: true,
                ..RegenUpdate::default()
            }),
            Some(RegenUpdate {
                mark_tiles: vec![(2, 2)],
                mark_chunks: vec![ChunkCoord { row: 0, column: 0 }],
                ..RegenUpdate::default()
            }),
        ];
        let mut adjuster = Scripted::new(scores, updates);
        let options = SolverOptions {
            max_iterations: 3,
            ..SolverOptions::default()
        };
        let result = AdjustmentSolver::new(options).solve(&mut adjuster, &());
        assert!(result.dirty.full);
        assert!(result.dirty.chunks.is_empty());
    }

    #[test]
    fn test_tiles_map_to_sorted_chunks_within_grid() {
        // Первая оценка не удовлетворяет, вторая удовлетворяет, отметки первой сохраняются
        let scores = vec![Some(metrics(false, 0.0)), Some(metrics(true, 0.0))];
        let updates = vec![Some(RegenUpdate {
            mark_tiles: vec![(40, 17), (17, 40), (70, 1), (0, 0)],
            mark_chunks: vec![ChunkCoord { row: 9, column: 9 }, ChunkCoord { row: 3, column: 3 }],
            ..RegenUpdate::default()
        })];
        let mut adjuster = Scripted::new(scores, updates);
        let options = SolverOptions::default().with_grid(64, 64);
        let result = AdjustmentSolver::new(options).solve(&mut adjuster, &());

        assert_eq!(result.status, SolveStatus::Satisfied);
        assert_eq!(
            result.dirty.chunks,
            vec![
                ChunkCoord { row: 0, column: 0 },
                ChunkCoord { row: 1, column: 2 },
                ChunkCoord { row: 2, column: 1 },
                ChunkCoord { row: 3, column: 3 },
            ]
        );
    }

    #[test]
    fn test_missing_metrics_stops_and_reverts() {
        let scores = vec![Some(metrics(false, 0.4)), None];
        let updates = vec![shift_to(5)];
        let mut adjuster = Scripted::new(scores, updates);
        let result = AdjustmentSolver::new(SolverOptions::default()).solve(&mut adjuster, &());

        assert_eq!(result.status, SolveStatus::NoMetrics);
        assert_eq!(result.iterations, 1);
        assert!(result.rolled_back);
        assert!(result.parameters.get("origin_x").is_none());
        assert!(result.dirty.full);
    }

    #[test]
    fn test_regenerate_none_or_stop_ends_pass() {
        let mut adjuster = Scripted::new(vec![Some(metrics(false, 0.2)); 5], vec![None]);
        let result = AdjustmentSolver::new(SolverOptions::default()).solve(&mut adjuster, &());
        assert_eq!(result.status, SolveStatus::Stopped);
        assert_eq!(result.iterations, 1);

        let stop = Some(RegenUpdate {
            message: Some("хватит".to_owned()),
            messages: vec!["сдвиг".to_owned()],
            stop: true,
            ..RegenUpdate::default()
        });
        let mut adjuster = Scripted::new(vec![Some(metrics(false, 0.2)); 5], vec![stop]);
        let result = AdjustmentSolver::new(SolverOptions::default()).solve(&mut adjuster, &());
        assert_eq!(result.status, SolveStatus::Stopped);
        assert_eq!(result.messages, vec!["сдвиг".to_owned(), "хватит".to_owned()]);
    }

    #[test]
    fn test_parameters_merge_shallowly() {
        let scores = vec![Some(metrics(false, 0.0)), Some(metrics(true, 1.0))];
        let updates = vec![Some(RegenUpdate {
            parameters: Some(params(json!({ "shape": { "scale": 2 }, "bias": 0.1 }))),
            ..RegenUpdate::default()
        })];
        let mut adjuster = Scripted::new(scores, updates);
        let initial = params(json!({ "shape": { "scale": 1, "octaves": 4 }, "seed": 3 }));
        let result = AdjustmentSolver::new(SolverOptions::default())
            .with_parameters(initial)
            .solve(&mut adjuster, &());

        assert_eq!(result.status, SolveStatus::Satisfied);
        assert_eq!(result.parameters.get("shape"), Some(&json!({ "scale": 2 })));
        assert_eq!(result.parameters.get("seed"), Some(&json!(3)));
        assert_eq!(result.parameters.get("bias"), Some(&json!(0.1)));
        // Оценка видела копию параметров на каждой итерации
        assert_eq!(adjuster.seen.len(), 2);
        assert!(adjuster.seen[0].get("bias").is_none());
    }

    #[test]
    fn test_score_fallback() {
        let m = Metrics {
            land_ratio: 0.6,
            ore_ratio: 0.1,
            origin_is_water: true,
            score: Some(f64::INFINITY),
            ..Metrics::default()
        };
        assert!((resolve_score(&m) - 0.33).abs() < 1e-9);
        assert!((resolve_score(&metrics(false, 0.7)) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_flatten_extra_values() {
        let m: Metrics = serde_json::from_value(json!({
            "satisfied": false,
            "land_ratio": 0.5,
            "lake_ratio": 0.04,
        }))
        .unwrap();
        assert_eq!(m.values.get("lake_ratio"), Some(&0.04));
        assert_eq!(m.score, None);
    }

    #[test]
    fn test_closure_adjuster() {
        let mut adjuster = FnAdjuster::new(
            |input: EvaluateInput<'_, f64>| Some(metrics(input.iteration >= 2, *input.context)),
            |_: RegenerateInput<'_, f64>| Some(RegenUpdate::default()),
        );
        let result = AdjustmentSolver::new(SolverOptions::default()).solve(&mut adjuster, &0.25);
        assert_eq!(result.status, SolveStatus::Satisfied);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.best_score, Some(0.25));
    }
}
