//! Чистка артефактов после классификации рек

use petgraph::unionfind::UnionFind;

use super::TerrainType;
use crate::grid::Grid;

/// Стадия 5: диагональные перемычки.
///
/// Если две водные клетки касаются только углом, клетки суши на другой
/// диагонали того же квадрата 2×2 становятся болотом.
pub fn bridge_diagonals(types: &mut Grid<TerrainType>) -> usize {
    if types.width < 2 || types.height < 2 {
        return 0;
    }

    let mut converted = 0;
    for y in 0..types.height - 1 {
        for x in 0..types.width - 1 {
            let a = types.index(x, y);
            let b = types.index(x + 1, y);
            let c = types.index(x, y + 1);
            let d = types.index(x + 1, y + 1);
            let water = |i: usize| types.data[i].is_water();

            let mut targets = [None, None];
            if water(a) && water(d) {
                targets = [Some(b), Some(c)];
            } else if water(b) && water(c) {
                targets = [Some(a), Some(d)];
            }

            for idx in targets.into_iter().flatten() {
                if types.data[idx] == TerrainType::Land {
                    types.data[idx] = TerrainType::Marsh;
                    converted += 1;
                }
            }
        }
    }
    converted
}

/// Стадия 6: нормализация береговой линии.
///
/// Береговые клетки: не-океанские клетки с соседом-океаном. Из их связных (D8)
/// компонент остаётся только крупнейшая (при равенстве первая по индексу),
/// остальные уходят под воду. Затопление открывает новые береговые клетки,
/// поэтому проход повторяется, пока компонента не останется одна. Озеро,
/// задетое затоплением, становится океаном целиком.
/// Возвращает число затопленных клеток.
pub fn normalize_coastline(types: &mut Grid<TerrainType>) -> usize {
    let mut flooded = 0;
    loop {
        let step = flood_detached_coast(types);
        if step == 0 {
            return flooded;
        }
        flooded += step;
    }
}

/// Один проход: топит все береговые компоненты, кроме крупнейшей
fn flood_detached_coast(types: &mut Grid<TerrainType>) -> usize {
    let n = types.len();
    let is_ocean = |t: &Grid<TerrainType>, i: usize| t.data[i] == TerrainType::Ocean;

    let coastal: Vec<bool> = (0..n)
        .map(|i| !is_ocean(types, i) && types.neighbors8(i).any(|(_, nb)| is_ocean(types, nb)))
        .collect();

    let mut coast = UnionFind::new(n);
    for i in (0..n).filter(|&i| coastal[i]) {
        for (_, nb) in types.neighbors8(i) {
            if nb > i && coastal[nb] {
                coast.union(i, nb);
            }
        }
    }

    let labels = coast.into_labeling();
    let mut sizes = vec![0usize; n];
    for i in (0..n).filter(|&i| coastal[i]) {
        sizes[labels[i]] += 1;
    }

    // Первая по индексу клетка крупнейшей компоненты
    let mut keep: Option<usize> = None;
    for i in (0..n).filter(|&i| coastal[i]) {
        match keep {
            Some(k) if sizes[labels[k]] >= sizes[labels[i]] => {}
            _ => keep = Some(i),
        }
    }
    let Some(keep) = keep else {
        return 0;
    };

    let main = labels[keep];
    let mut flooded = 0;
    let mut breached = Vec::new();
    for i in (0..n).filter(|&i| coastal[i] && labels[i] != main) {
        if types.data[i] == TerrainType::Lake {
            breached.push(i);
        }
        types.data[i] = TerrainType::Ocean;
        flooded += 1;
    }

    // Озеро, до которого дошло море, уходит под воду целиком
    while let Some(idx) = breached.pop() {
        let neighbors: Vec<usize> = types.neighbors8(idx).map(|(_, nb)| nb).collect();
        for nb in neighbors {
            if types.data[nb] == TerrainType::Lake {
                types.data[nb] = TerrainType::Ocean;
                flooded += 1;
                breached.push(nb);
            }
        }
    }
    flooded
}

/// Стадия 7: одиночные водные клетки.
///
/// Не-сухопутная клетка, все соседи которой суша, скорее всего артефакт.
/// Допускается `floor(max_fraction * клеток)` таких клеток (настоящие пруды);
/// лишние с наименьшей заполненной высотой возвращаются в сушу.
pub fn prune_singletons(types: &mut Grid<TerrainType>, filled: &Grid<f32>, max_fraction: f32) -> usize {
    let mut singletons: Vec<usize> = (0..types.len())
        .filter(|&i| types.data[i] != TerrainType::Land)
        .filter(|&i| {
            let mut neighbors = types.neighbors8(i).peekable();
            neighbors.peek().is_some()
                && neighbors.all(|(_, nb)| types.data[nb] == TerrainType::Land)
        })
        .collect();

    let allowance = (max_fraction.max(0.0) * types.len() as f32).floor() as usize;
    if singletons.len() <= allowance {
        return 0;
    }

    singletons.sort_by(|&a, &b| filled.data[a].total_cmp(&filled.data[b]).then_with(|| a.cmp(&b)));
    let excess = singletons.len() - allowance;
    for &idx in &singletons[..excess] {
        types.data[idx] = TerrainType::Land;
    }
    excess
}
