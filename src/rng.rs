#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.next_f32() * span).floor() as i32).min(max)
    }

    pub fn bool(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.pick_index(i + 1);
            items.swap(i, j);
        }
    }

    pub fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| *w as u64).sum();
        if total == 0 {
            return None;
        }
        let roll = (self.next_f32() as f64 * total as f64).floor() as u64;
        let mut acc = 0u64;
        for (idx, weight) in weights.iter().enumerate() {
            acc += *weight as u64;
            if roll < acc {
                return Some(idx);
            }
        }
        weights.iter().rposition(|w| *w > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn same_seed_replays_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..64 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = Rng::new(7);
        let mut values: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut values);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(values, sorted);
    }

    #[test]
    fn int_stays_within_inclusive_bounds() {
        let mut rng = Rng::new(9);
        for _ in 0..1_000 {
            let value = rng.int(-2, 2);
            assert!((-2..=2).contains(&value));
        }
    }

    #[test]
    fn weighted_index_never_picks_zero_weight() {
        let mut rng = Rng::new(11);
        for _ in 0..1_000 {
            let idx = rng.weighted_index(&[0, 5, 0, 1]).expect("non-zero total");
            assert!(idx == 1 || idx == 3);
        }
        assert_eq!(rng.weighted_index(&[0, 0]), None);
        assert_eq!(rng.weighted_index(&[]), None);
    }

    #[test]
    fn weighted_index_follows_bias() {
        let mut rng = Rng::new(13);
        let mut heavy = 0;
        for _ in 0..2_000 {
            if rng.weighted_index(&[90, 10]) == Some(0) {
                heavy += 1;
            }
        }
        assert!(heavy > 1_500, "heavy picks = {heavy}");
    }
}
