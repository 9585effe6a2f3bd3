//! Направления стока D8 и накопление стока

use std::cmp::Ordering;
use std::collections::VecDeque;

use super::{EPSILON, FlowDir, TerrainType};
use crate::grid::{D8, Grid};
use crate::seed::mix_hash;

/// Порядок клеток по ключу `(заполненная высота, высота)`.
///
/// Вне плато ключ строго убывает вдоль пути стока, поэтому циклов нет.
fn routing_key_cmp(filled: &Grid<f32>, elevation: &Grid<f32>, a: usize, b: usize) -> Ordering {
    filled.data[a]
        .total_cmp(&filled.data[b])
        .then_with(|| elevation.data[a].total_cmp(&elevation.data[b]))
}

/// Назначает каждой не-океанской клетке одно направление стока.
///
/// Выбирается сосед с наибольшим перепадом заполненной высоты. Ничьи (в пределах `EPSILON`)
/// решаются сначала по меньшей исходной высоте, затем по хэшу `(seed, клетка, слот)`,
/// чтобы не было перекоса в сторону порядка обхода. Если строгого перепада нет,
/// сток идёт к соседу того же уровня с меньшей исходной высотой. Клетки идеально
/// ровного плато получают направление к ближайшему выходу с плато (см. [`drain_flats`]).
#[must_use]
pub fn route_flow(
    elevation: &Grid<f32>,
    filled: &Grid<f32>,
    types: &Grid<TerrainType>,
    seed: u64,
) -> Grid<Option<FlowDir>> {
    let mut flow = Grid::new_with(elevation.width, elevation.height, None);

    for idx in 0..elevation.len() {
        if types.data[idx] == TerrainType::Ocean {
            continue;
        }

        let mut best: Option<(usize, usize)> = None;
        for (slot, n) in elevation.neighbors8(idx) {
            if routing_key_cmp(filled, elevation, n, idx) != Ordering::Less {
                continue;
            }
            best = match best {
                Some(current) if !prefers(elevation, filled, seed, idx, (slot, n), current) => {
                    Some(current)
                }
                _ => Some((slot, n)),
            };
        }

        flow.data[idx] = best.map(|(slot, _)| FlowDir::from_slot(slot));
    }

    drain_flats(&mut flow, elevation, filled, types);
    flow
}

/// Сток с плато, где у клеток нет ни одного строго более низкого соседа.
///
/// Выходы плато: клетки с уже назначенным направлением и клетки на краю сетки
/// (они стекают за край). Поиск в ширину от выходов по соседям с тем же ключом
/// `(заполненная высота, высота)` направляет каждую клетку к соседу, от которого
/// её достигли. Получается лес с корнями в выходах, так что граф остаётся ацикличным.
/// Замкнутое плато без выхода (дно котловины) остаётся без направления.
fn drain_flats(
    flow: &mut Grid<Option<FlowDir>>,
    elevation: &Grid<f32>,
    filled: &Grid<f32>,
    types: &Grid<TerrainType>,
) {
    let open = |idx: usize| types.data[idx] != TerrainType::Ocean;

    let mut reached = vec![false; flow.len()];
    let mut queue = VecDeque::new();
    for idx in (0..flow.len()).filter(|&i| open(i)) {
        if flow.data[idx].is_some() || flow.is_boundary(idx) {
            reached[idx] = true;
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        for (slot, n) in filled.neighbors8(idx) {
            if reached[n] || !open(n) || routing_key_cmp(filled, elevation, n, idx) != Ordering::Equal {
                continue;
            }
            reached[n] = true;
            // Обратный слот: от `n` к `idx`
            flow.data[n] = Some(FlowDir::from_slot(slot + D8.len() / 2));
            queue.push_back(n);
        }
    }
}

/// Лучше ли кандидат `(slot, n)` текущего выбора
fn prefers(
    elevation: &Grid<f32>,
    filled: &Grid<f32>,
    seed: u64,
    idx: usize,
    (slot, n): (usize, usize),
    (best_slot, best): (usize, usize),
) -> bool {
    let drop = filled.data[idx] - filled.data[n];
    let best_drop = filled.data[idx] - filled.data[best];
    if drop > best_drop + EPSILON {
        return true;
    }
    if drop < best_drop - EPSILON {
        return false;
    }

    let e = elevation.data[n];
    let best_e = elevation.data[best];
    if e < best_e - EPSILON {
        return true;
    }
    if e > best_e + EPSILON {
        return false;
    }

    mix_hash(seed, idx as u64, slot as u64) > mix_hash(seed, idx as u64, best_slot as u64)
}

/// Индекс клетки, в которую стекает `idx`
#[must_use]
pub fn downstream(flow: &Grid<Option<FlowDir>>, idx: usize) -> Option<usize> {
    flow.data[idx].and_then(|dir| flow.offset(idx, i32::from(dir.dx), i32::from(dir.dy)))
}

/// Накопление стока: сколько клеток (включая саму) стекает через каждую клетку.
///
/// Клетки обходятся в топологическом порядке графа стока (от истоков к устьям),
/// поэтому каждый приток учтён до того, как его значение передаётся ниже.
#[must_use]
pub fn accumulate_flow(flow: &Grid<Option<FlowDir>>) -> Grid<f32> {
    let mut accumulation = Grid::new_with(flow.width, flow.height, 1.0f32);

    let mut inflow = vec![0usize; flow.len()];
    for idx in 0..flow.len() {
        if let Some(target) = downstream(flow, idx) {
            inflow[target] += 1;
        }
    }

    let mut ready: VecDeque<usize> = (0..flow.len()).filter(|&i| inflow[i] == 0).collect();
    while let Some(idx) = ready.pop_front() {
        if let Some(target) = downstream(flow, idx) {
            accumulation.data[target] += accumulation.data[idx];
            inflow[target] -= 1;
            if inflow[target] == 0 {
                ready.push_back(target);
            }
        }
    }

    accumulation
}

/// Обратный граф стока: для каждой клетки список клеток, стекающих в неё
#[must_use]
pub fn upstream_adjacency(flow: &Grid<Option<FlowDir>>) -> Vec<Vec<usize>> {
    let mut upstream = vec![Vec::new(); flow.len()];
    for idx in 0..flow.len() {
        if let Some(target) = downstream(flow, idx) {
            upstream[target].push(idx);
        }
    }
    upstream
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::fill::fill_depressions;

    fn land(width: usize, height: usize) -> Grid<TerrainType> {
        Grid::new_with(width, height, TerrainType::Land)
    }

    #[test]
    fn test_flow_follows_steepest_drop() {
        #[rustfmt::skip]
        let elevation = Grid {
            width: 3,
            height: 3,
            data: vec![
                0.9, 0.8, 0.7,
                0.8, 0.6, 0.5,
                0.7, 0.5, 0.1,
            ],
        };
        let filled = fill_depressions(&elevation, 0.0);
        let flow = route_flow(&elevation, &filled, &land(3, 3), 1);
        assert_eq!(flow.get(1, 1), &Some(FlowDir { dx: 1, dy: 1 }));
        assert_eq!(flow.get(0, 0), &Some(FlowDir { dx: 1, dy: 1 }));
        // Самая низкая клетка стекает за край
        assert_eq!(flow.get(2, 2), &None);
    }

    #[test]
    fn test_ties_prefer_lower_raw_elevation_then_hash() {
        let mut elevation = Grid::new_with(3, 3, 0.5);
        elevation.set(1, 1, 0.9);
        let filled = elevation.clone();
        // Все соседи центра равны: выбор определяется хэшем и стабилен
        let a = route_flow(&elevation, &filled, &land(3, 3), 11);
        let b = route_flow(&elevation, &filled, &land(3, 3), 11);
        assert_eq!(a, b);
        assert!(a.get(1, 1).is_some());

        // Фальшивая «заполненная» поверхность: перепад одинаков, но исходная высота у (0, 1) ниже
        let mut raw = elevation.clone();
        raw.set(0, 1, 0.2);
        let mut flat_filled = Grid::new_with(3, 3, 0.5);
        flat_filled.set(1, 1, 0.9);
        let flow = route_flow(&raw, &flat_filled, &land(3, 3), 11);
        assert_eq!(flow.get(1, 1), &Some(FlowDir { dx: -1, dy: 0 }));
    }

    #[test]
    fn test_tie_break_varies_with_seed() {
        let mut elevation = Grid::new_with(3, 3, 0.5);
        elevation.set(1, 1, 0.9);
        let directions: std::collections::HashSet<_> = (0..64u64)
            .filter_map(|seed| *route_flow(&elevation, &elevation, &land(3, 3), seed).get(1, 1))
            .collect();
        assert!(directions.len() > 1);
    }

    #[test]
    fn test_flat_plateau_drains_to_edges() {
        let elevation = Grid::new_with(5, 5, 0.5);
        let flow = route_flow(&elevation, &elevation, &land(5, 5), 3);
        for idx in 0..flow.len() {
            assert_eq!(flow.data[idx].is_none(), flow.is_boundary(idx));
        }

        // Каждая внутренняя клетка за конечное число шагов доходит до края
        for start in 0..flow.len() {
            let mut idx = start;
            let mut steps = 0;
            while let Some(next) = downstream(&flow, idx) {
                idx = next;
                steps += 1;
                assert!(steps <= 2);
            }
            assert!(flow.is_boundary(idx));
        }

        let acc = accumulate_flow(&flow);
        let outflow: f32 = (0..acc.len()).filter(|&i| flow.is_boundary(i)).map(|i| acc.data[i]).sum();
        assert!((outflow - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_enclosed_flat_floor_keeps_no_direction() {
        let mut elevation = Grid::new_with(5, 5, 0.9);
        for y in 1..4 {
            for x in 1..4 {
                elevation.set(x, y, 0.2);
            }
        }
        let flow = route_flow(&elevation, &elevation, &land(5, 5), 3);
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(flow.get(x, y), &None);
            }
        }
        // Склон стекает внутрь котловины
        assert_eq!(flow.get(0, 2), &Some(FlowDir { dx: 1, dy: 0 }));
    }

    #[test]
    fn test_flat_shelf_drains_through_its_outlet() {
        // Ровная полка 0.5 с единственным спуском в правом нижнем углу
        let mut elevation = Grid::new_with(4, 4, 0.5);
        elevation.set(3, 3, 0.1);
        let mut types = land(4, 4);
        // Край сетки кроме угла закрыт океаном, чтобы выходом был только спуск
        for idx in 0..16 {
            if elevation.is_boundary(idx) && idx != 15 {
                types.data[idx] = TerrainType::Ocean;
            }
        }
        let flow = route_flow(&elevation, &elevation, &types, 1);
        assert_eq!(flow.get(2, 2), &Some(FlowDir { dx: 1, dy: 1 }));
        assert_eq!(flow.get(1, 1), &Some(FlowDir { dx: 1, dy: 1 }));
        let exit = elevation.index(2, 2);
        assert_eq!(downstream(&flow, elevation.index(2, 1)), Some(exit));
        assert_eq!(downstream(&flow, elevation.index(1, 2)), Some(exit));

        let acc = accumulate_flow(&flow);
        assert!((acc.get(3, 3) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ocean_cells_have_no_direction() {
        let elevation = Grid {
            width: 3,
            height: 1,
            data: vec![0.9, 0.5, 0.1],
        };
        let mut types = land(3, 1);
        types.data[2] = TerrainType::Ocean;
        let flow = route_flow(&elevation, &elevation, &types, 0);
        assert_eq!(flow.data[2], None);
        assert_eq!(flow.data[1], Some(FlowDir { dx: 1, dy: 0 }));
    }

    #[test]
    fn test_accumulation_counts_catchment() {
        // Наклонная плоскость: всё стекает по строкам к правому краю
        let mut elevation = Grid::new_with(4, 3, 0.0);
        for y in 0..3 {
            for x in 0..4 {
                elevation.set(x, y, 0.9 - x as f32 * 0.2 + y as f32 * 0.01);
            }
        }
        let filled = fill_depressions(&elevation, 0.0);
        let flow = route_flow(&elevation, &filled, &land(4, 3), 5);
        let acc = accumulate_flow(&flow);

        assert!(acc.data.iter().all(|&a| a >= 1.0));
        let total_outflow: f32 = (0..acc.len())
            .filter(|&i| downstream(&flow, i).is_none())
            .map(|i| acc.data[i])
            .sum();
        assert!((total_outflow - 12.0).abs() < 1e-4);

        for idx in 0..acc.len() {
            if let Some(d) = downstream(&flow, idx) {
                assert!(acc.data[d] > acc.data[idx]);
            }
        }
    }

    #[test]
    fn test_upstream_adjacency_inverts_flow() {
        let elevation = Grid {
            width: 3,
            height: 1,
            data: vec![0.9, 0.5, 0.1],
        };
        let flow = route_flow(&elevation, &elevation, &land(3, 1), 0);
        let upstream = upstream_adjacency(&flow);
        assert_eq!(upstream[1], vec![0]);
        assert_eq!(upstream[2], vec![1]);
        assert!(upstream[0].is_empty());
    }
}
