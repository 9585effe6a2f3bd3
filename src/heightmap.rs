use crate::biome::Biome;
use crate::config::{ShapeParams, TerrainSettings};
use crate::error::HydromapError;
use crate::grid::{Grid, clamp_unit};
use crate::seed::derive_seed;
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Двумерная карта высот: значения от 0.0 (дно) до 1.0 (высокие горы)
pub type Heightmap = Grid<f32>;

/// Собирает карту высот из строк, зажимая некорректные значения в `[0, 1]`
pub fn heightmap_from_rows(rows: &[Vec<f32>]) -> Result<Heightmap, HydromapError> {
    Ok(sanitize_heightmap(&Grid::from_rows(rows)?))
}

/// Копия карты, в которой каждое значение приведено к `[0, 1]` (`NaN` → 0)
#[must_use]
pub fn sanitize_heightmap(heightmap: &Heightmap) -> Heightmap {
    heightmap.map(|&v| clamp_unit(v))
}

/// Генерирует карту высот региона.
///
/// `shape` задаёт окно выборки шума: сдвиг начала координат и масштаб мира.
/// Именно эти параметры подбирает решатель.
#[must_use]
pub fn generate_heightmap(
    seed: u64,
    width: usize,
    height: usize,
    biome: Biome,
    terrain: &TerrainSettings,
    shape: &ShapeParams,
) -> Heightmap {
    if width == 0 || height == 0 {
        return Grid::new_with(0, 0, 0.0);
    }

    // === 1. Базовый шум ===
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(derive_seed(seed, "heightmap") as i32));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(terrain.octaves.max(1)));
    noise.set_frequency(Some(terrain.frequency / shape.world_scale.max(0.05)));

    let half_span = (width.min(height) as f32 / 2.0).max(1.0);
    let falloff = terrain.edge_falloff.max(0.0);

    let sample = |i: usize| {
        let x = (i % width) as f32;
        let y = (i / width) as f32;

        let mut value = noise.get_noise_2d(x + shape.origin_x, y + shape.origin_y);
        value = (value + 1.0) * 0.5;

        // Спад к краям: край региона чаще оказывается морем
        let edge = x.min(width as f32 - 1.0 - x).min(y).min(height as f32 - 1.0 - y);
        let d = (edge / half_span).min(1.0);
        value - falloff * (1.0 - d) * (1.0 - d)
    };

    #[cfg(feature = "parallel")]
    let mut data: Vec<f32> = (0..width * height).into_par_iter().map(sample).collect();
    #[cfg(not(feature = "parallel"))]
    let mut data: Vec<f32> = (0..width * height).map(sample).collect();

    // === 2. Сглаживание ===
    if terrain.smooth_radius > 0 {
        smooth_heightmap(&mut data, width, height, terrain.smooth_radius);
    }

    // === 3. Нормализация ===
    let min_h = data.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max_h = data.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let range = max_h - min_h;

    // === 4. Экспонента рельефа и смещение ===
    let power = terrain.elevation_power.unwrap_or_else(|| biome.relief_power());
    for h in &mut data {
        let normalized = if range > f32::EPSILON { (*h - min_h) / range } else { 0.5 };
        *h = clamp_unit(normalized.powf(power) + shape.elevation_bias);
    }

    Grid {
        width,
        height,
        data,
    }
}

/// Сглаживание через среднее (3×3, 5×5 и т.д.), края ограничиваются
pub fn smooth_heightmap(data: &mut [f32], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }

    let mut temp = vec![0.0; data.len()];
    let r = radius as i32;
    let count = (2 * r + 1) as f32;

    // 1. Горизонтальный проход
    for y in 0..height {
        let row_offset = y * width;
        let mut window_sum = 0.0;

        for dx in -r..=r {
            let x = dx.clamp(0, width as i32 - 1) as usize;
            window_sum += data[row_offset + x];
        }

        for x in 0..width {
            temp[row_offset + x] = window_sum / count;

            // Сдвигаем окно: убираем левый пиксель, добавляем правый
            let left = (x as i32 - r).clamp(0, width as i32 - 1) as usize;
            let right = (x as i32 + r + 1).clamp(0, width as i32 - 1) as usize;

            window_sum = window_sum - data[row_offset + left] + data[row_offset + right];
        }
    }

    // 2. Вертикальный проход
    for x in 0..width {
        let mut window_sum = 0.0;

        for dy in -r..=r {
            let y = dy.clamp(0, height as i32 - 1) as usize;
            window_sum += temp[y * width + x];
        }

        for y in 0..height {
            data[y * width + x] = window_sum / count;

            let top = (y as i32 - r).clamp(0, height as i32 - 1) as usize;
            let bottom = (y as i32 + r + 1).clamp(0, height as i32 - 1) as usize;

            window_sum = window_sum - temp[top * width + x] + temp[bottom * width + x];
        }
    }
}
