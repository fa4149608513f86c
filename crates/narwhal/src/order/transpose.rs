//! Adjacent exchanges: swap neighbours in a layer while that removes crossings.

use super::Orderer;

const MAX_ADJACENT_EXCHANGE_ROUNDS: usize = 50;

/// Weighted crossings between the edges of `u` and `v` toward one layer when `u` is left of
/// `v`. Both slices hold `(position, crossing weight)` sorted by position.
fn count_on_arrays(u: &[(usize, u64)], v: &[(usize, u64)]) -> u64 {
    let mut ret = 0u64;
    let mut j = 0usize;
    let mut seen = 0u64;
    for &(xu, wu) in u {
        while j < v.len() && v[j].0 < xu {
            seen += v[j].1;
            j += 1;
        }
        ret += seen * wu;
    }
    ret
}

impl Orderer<'_> {
    fn neighbors(&self, v: usize, below: bool) -> Vec<(usize, u64)> {
        let x = self.la.x();
        let mut out: Vec<(usize, u64)> = if below {
            self.graph
                .out_edges(v)
                .map(|e| (x[e.target], e.crossing_weight.max(0) as u64))
                .collect()
        } else {
            self.graph
                .in_edges(v)
                .map(|e| (x[e.source], e.crossing_weight.max(0) as u64))
                .collect()
        };
        out.sort_unstable();
        out
    }

    /// `(crossings with u left of v, crossings with v left of u)`.
    fn calc_pair(&self, u: usize, v: usize) -> (u64, u64) {
        let (su, sv) = (self.neighbors(u, true), self.neighbors(v, true));
        let (pu, pv) = (self.neighbors(u, false), self.neighbors(v, false));
        let cuv = count_on_arrays(&su, &sv) + count_on_arrays(&pu, &pv);
        let cvu = count_on_arrays(&sv, &su) + count_on_arrays(&pv, &pu);
        (cuv, cvu)
    }

    fn swap_gain(&self, u: usize, v: usize) -> i64 {
        if let Some(h) = self.horizontal {
            if !h.can_swap(u, v) {
                return i64::MIN;
            }
        }
        let (cuv, cvu) = self.calc_pair(u, v);
        cuv as i64 - cvu as i64
    }

    pub(super) fn adjacent_exchange(&mut self) {
        let h = self.la.layer_count();
        let mut round = 0;
        let mut progress = true;
        while progress && round < MAX_ADJACENT_EXCHANGE_ROUNDS {
            round += 1;
            progress = false;
            for i in 0..h {
                progress = self.exchange_layer(i) || progress;
            }
            for i in (0..h.saturating_sub(1)).rev() {
                progress = self.exchange_layer(i) || progress;
            }
        }
    }

    fn exchange_layer(&mut self, layer: usize) -> bool {
        if self.exchange_while_gain(layer) {
            return true;
        }
        self.disturb(layer);
        self.exchange_while_gain(layer)
    }

    fn exchange_while_gain(&mut self, layer: usize) -> bool {
        let mut any = false;
        while self.exchange_with_gain(layer) {
            any = true;
        }
        any
    }

    /// Swaps the first pair with a strict gain, then lets the rest of the layer settle.
    fn exchange_with_gain(&mut self, layer: usize) -> bool {
        let len = self.la.layer(layer).len();
        for i in 0..len.saturating_sub(1) {
            let (u, v) = (self.la.layer(layer)[i], self.la.layer(layer)[i + 1]);
            if self.swap_gain(u, v) > 0 {
                self.la.swap_in_layer(layer, i, i + 1);
                for j in (0..i).rev() {
                    self.swap_to_the_right(layer, j);
                }
                for j in i + 1..len - 1 {
                    self.swap_to_the_right(layer, j);
                }
                return true;
            }
        }
        false
    }

    fn disturb(&mut self, layer: usize) {
        let len = self.la.layer(layer).len();
        for i in 0..len.saturating_sub(1) {
            self.swap_to_the_right(layer, i);
        }
    }

    /// Swaps positions `i` and `i + 1` on a gain, or on a coin flip when nothing changes.
    fn swap_to_the_right(&mut self, layer: usize, i: usize) {
        let (u, v) = (self.la.layer(layer)[i], self.la.layer(layer)[i + 1]);
        let gain = self.swap_gain(u, v);
        if gain > 0 || (gain == 0 && self.rng.next_bool()) {
            self.la.swap_in_layer(layer, i, i + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::count_on_arrays;

    #[test]
    fn counts_inversions() {
        // u reaches positions 2 and 3, v reaches 0: both u edges cross the v edge.
        assert_eq!(count_on_arrays(&[(2, 1), (3, 1)], &[(0, 1)]), 2);
        assert_eq!(count_on_arrays(&[(0, 1)], &[(2, 1), (3, 1)]), 0);
        assert_eq!(count_on_arrays(&[(1, 2)], &[(0, 3)]), 6);
    }
}
