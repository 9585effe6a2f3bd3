use serde::{Deserialize, Serialize};

/// Биом региона, для которого строится карта.
///
/// Внутри гидрологии биом непрозрачен: он влияет только на правила воды
/// (см. [`crate::config::resolve_water_rules`]) и на форму рельефа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Temperate,
    Desert,
    Swamp,
    Tundra,
    Tropical,
    Highland,
}

/// Водные характеристики биома
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterTraits {
    /// Влажность: чем больше, тем больше рек (пороги стока делятся на неё)
    pub wetness: f32,
    /// Склонность к заболачиванию берегов (0.0 означает никогда)
    pub marshiness: f32,
    /// Множитель минимальной площади озера: при <1.0 мелкие озёра чаще выживают
    pub lake_affinity: f32,
    /// Ширина болотной каймы в клетках
    pub marsh_ring: usize,
}

impl Biome {
    #[must_use]
    pub fn water_traits(self) -> WaterTraits {
        match self {
            Biome::Temperate => WaterTraits {
                wetness: 1.0,
                marshiness: 0.55,
                lake_affinity: 1.0,
                marsh_ring: 1,
            },
            // В пустыне реки редки, болот нет
            Biome::Desert => WaterTraits {
                wetness: 0.45,
                marshiness: 0.0,
                lake_affinity: 1.6,
                marsh_ring: 1,
            },
            Biome::Swamp => WaterTraits {
                wetness: 1.3,
                marshiness: 1.0,
                lake_affinity: 0.6,
                marsh_ring: 2,
            },
            Biome::Tundra => WaterTraits {
                wetness: 0.8,
                marshiness: 0.7,
                lake_affinity: 0.7,
                marsh_ring: 1,
            },
            Biome::Tropical => WaterTraits {
                wetness: 1.4,
                marshiness: 0.8,
                lake_affinity: 0.9,
                marsh_ring: 2,
            },
            Biome::Highland => WaterTraits {
                wetness: 0.9,
                marshiness: 0.3,
                lake_affinity: 1.2,
                marsh_ring: 1,
            },
        }
    }

    /// Степень нелинейности рельефа по умолчанию: горы резче, болота площе
    #[must_use]
    pub fn relief_power(self) -> f32 {
        match self {
            Biome::Swamp => 1.4,
            Biome::Desert | Biome::Tropical => 1.0,
            Biome::Tundra | Biome::Temperate => 0.9,
            Biome::Highland => 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biome_parses_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            biome: Biome,
        }
        let w: Wrapper = toml::from_str("biome = \"highland\"").unwrap();
        assert_eq!(w.biome, Biome::Highland);
    }

    #[test]
    fn test_desert_never_grows_marsh() {
        assert!(Biome::Desert.water_traits().marshiness <= 0.0);
        assert!(Biome::Swamp.water_traits().marshiness > Biome::Temperate.water_traits().marshiness);
    }
}
