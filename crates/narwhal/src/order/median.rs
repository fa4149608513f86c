use crate::util::XorShift64Star;

/// Weighted median of neighbour positions. For an even count above two the median is pulled
/// toward the side where the neighbours are packed more tightly.
pub(crate) fn weighted_median(positions: &mut [usize]) -> Option<f64> {
    let p = positions.len();
    if p == 0 {
        return None;
    }
    positions.sort_unstable();
    let m = p / 2;
    if p % 2 == 1 {
        return Some(positions[m] as f64);
    }
    if p == 2 {
        return Some(0.5 * (positions[0] + positions[1]) as f64);
    }
    let left = (positions[m - 1] - positions[0]) as f64;
    let right = (positions[p - 1] - positions[m]) as f64;
    if left + right == 0.0 {
        return Some(0.5 * (positions[m - 1] + positions[m]) as f64);
    }
    Some((positions[m - 1] as f64 * left + positions[m] as f64 * right) / (left + right))
}

/// Reorders `layer` by median. Nodes without a median keep their slot; the others fill the
/// remaining slots in median order, with equal medians shuffled by `rng`.
pub(crate) fn sort_by_medians(
    layer: &[usize],
    medians: &[Option<f64>],
    rng: &mut XorShift64Star,
) -> Vec<usize> {
    let mut movable: Vec<(f64, usize)> = layer
        .iter()
        .zip(medians)
        .filter_map(|(&v, m)| m.map(|m| (m, v)))
        .collect();
    movable.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ordered: Vec<usize> = Vec::with_capacity(movable.len());
    let mut i = 0;
    while i < movable.len() {
        let mut j = i + 1;
        while j < movable.len() && movable[j].0 == movable[i].0 {
            j += 1;
        }
        let start = ordered.len();
        ordered.push(movable[i].1);
        for &(_, v) in &movable[i + 1..j] {
            let group = ordered.len() - start;
            if rng.next_bool() {
                ordered.push(v);
            } else if group == 1 {
                ordered.insert(start, v);
            } else {
                let k = start + rng.next_usize(group);
                let displaced = std::mem::replace(&mut ordered[k], v);
                ordered.push(displaced);
            }
        }
        i = j;
    }

    let mut next = ordered.into_iter();
    layer
        .iter()
        .zip(medians)
        .map(|(&v, m)| match m {
            Some(_) => next.next().unwrap_or(v),
            None => v,
        })
        .collect()
}
