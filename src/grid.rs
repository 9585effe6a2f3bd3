//! Прямоугольные растры и окрестность D8
//!
//! Все карты (высоты, типы местности, направления стока) хранятся построчно:
//! ячейка `(x, y)` лежит по индексу `y * width + x`. В отличие от карты мира,
//! регион генерации не зациклен по долготе, края являются настоящими границами.

use serde::{Deserialize, Serialize};

use crate::error::HydromapError;

/// Смещения восьми соседей по часовой стрелке, начиная с севера.
///
/// Номер элемента задаёт «слот» соседа; он участвует в хэше разрешения ничьих при маршрутизации стока.
pub const D8: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Ортогональное подмножество D8 (слоты 0, 2, 4, 6)
pub const D4: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Двумерная сетка значений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Собирает сетку из вложенных строк `[height][width]`.
    ///
    /// Все строки обязаны иметь одинаковую длину.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, HydromapError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);

        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(HydromapError::RaggedRows {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }

        Ok(Self {
            width: if height == 0 { 0 } else { width },
            height: if width == 0 { 0 } else { height },
            data,
        })
    }

    /// Разворачивает сетку обратно во вложенные строки
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.width == 0 {
            return Vec::new();
        }
        self.data.chunks(self.width).map(<[T]>::to_vec).collect()
    }
}

impl<T> Grid<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[must_use]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Индекс соседа со смещением `(dx, dy)` или `None` за пределами сетки
    #[must_use]
    pub fn offset(&self, idx: usize, dx: i32, dy: i32) -> Option<usize> {
        let (x, y) = self.coords(idx);
        let nx = x as i64 + i64::from(dx);
        let ny = y as i64 + i64::from(dy);
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some(ny as usize * self.width + nx as usize)
    }

    /// Соседи D8 в виде пар `(слот, индекс)`
    pub fn neighbors8(&self, idx: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        D8.iter()
            .enumerate()
            .filter_map(move |(slot, &(dx, dy))| self.offset(idx, dx, dy).map(|n| (slot, n)))
    }

    /// Ортогональные соседи
    pub fn neighbors4(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        D4.iter().filter_map(move |&(dx, dy)| self.offset(idx, dx, dy))
    }

    #[must_use]
    pub fn is_boundary(&self, idx: usize) -> bool {
        let (x, y) = self.coords(idx);
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

/// Приводит значение к `[0, 1]`; `NaN` превращается в `0`.
#[must_use]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
