//! Сиды генерации
//!
//! Сид может прийти из конфигурации как число или как строка (название мира,
//! которым делятся игроки). Строки сворачиваются в `u64` через FNV-1a: в отличие от
//! `DefaultHasher`, результат не зависит от версии компилятора и платформы.

use serde::{Deserialize, Serialize};
use std::fmt;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Сид в том виде, в каком его задал пользователь
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(u64),
    Text(String),
}

impl Seed {
    /// Числовое значение сида
    #[must_use]
    pub fn to_u64(&self) -> u64 {
        match self {
            Seed::Number(n) => *n,
            Seed::Text(s) => match s.trim().parse::<u64>() {
                Ok(n) => n,
                Err(_) => fnv1a(s.as_bytes()),
            },
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Number(0)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Seed::Number(value)
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_owned())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Number(n) => write!(f, "{n}"),
            Seed::Text(s) => write!(f, "{s}"),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Выводит независимый под-сид для отдельной подсистемы (рельеф, руда, сдвиги начала координат)
#[must_use]
pub fn derive_seed(master: u64, label: &str) -> u64 {
    mix_hash(master, fnv1a(label.as_bytes()), 0)
}

/// Чистая целочисленная хэш-функция от трёх аргументов (финализатор splitmix64).
///
/// Используется для детерминированного разрешения ничьих при маршрутизации стока:
/// `mix_hash(seed, cell_index, neighbor_slot)`.
#[must_use]
pub fn mix_hash(seed: u64, a: u64, b: u64) -> u64 {
    let mut z = seed
        .wrapping_add(a.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add(b.wrapping_mul(0xc2b2_ae3d_27d4_eb4f));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
