//! Детерминированный шум для огрубления рельефа.
//!
//! Основной источник — [`NoiseField`]: value-noise на хеше из банка простых чисел
//! с косинусной интерполяцией и суммой октав. Альтернативный источник
//! [`SimplexField`] строится на `fastnoise-lite` и следует тому же контракту октав.

use crate::config::{NoiseKind, NoiseSettings};
use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Количество октав по умолчанию.
pub const DEFAULT_OCTAVES: u32 = 7;
/// Затухание амплитуды между октавами по умолчанию.
pub const DEFAULT_PERSISTENCE: f64 = 0.5;

/// Банк тройек простых чисел, по одной на октаву.
const PRIMES: [[u64; 3]; 10] = [
    [995_615_039, 600_173_719, 701_464_987],
    [831_731_269, 162_318_869, 136_250_887],
    [174_329_291, 946_737_083, 245_679_977],
    [362_489_573, 795_918_041, 350_777_237],
    [457_025_711, 880_830_799, 909_678_923],
    [787_070_341, 177_340_217, 593_320_781],
    [405_493_717, 291_031_019, 391_950_901],
    [458_904_767, 676_625_681, 424_452_397],
    [531_736_441, 939_683_957, 810_651_871],
    [997_169_939, 842_027_887, 423_882_827],
];

/// Источник скалярного шума в произвольной дробной точке.
pub trait NoiseSource: Send + Sync {
    /// Сумма октав в точке `(x, y)`.
    ///
    /// Амплитуда каждой следующей октавы умножается на `persistence`.
    fn sample(&self, x: f64, y: f64, amplitude: f64, persistence: f64) -> f64;
}

/// Value-noise на банке простых чисел.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseField {
    octaves: u32,
    /// С какой тройки банка начинается первая октава.
    bank_offset: usize,
    /// Сдвиг решётки, чтобы разные сиды давали разные поля.
    shift: (i64, i64),
}

impl NoiseField {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_octaves(seed, DEFAULT_OCTAVES)
    }

    #[must_use]
    pub fn with_octaves(seed: u64, octaves: u32) -> Self {
        Self {
            octaves: octaves.max(1),
            bank_offset: (seed % PRIMES.len() as u64) as usize,
            shift: (((seed >> 8) & 0xfff) as i64, ((seed >> 20) & 0xfff) as i64),
        }
    }

    #[must_use]
    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    /// Сумма октав: частота уменьшается вдвое, амплитуда умножается на `persistence`.
    /// Итог делится на конечную частоту.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, amplitude: f64, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 2f64.powi(self.octaves as i32);
        let mut amplitude = amplitude;
        for octave in 0..self.octaves as usize {
            frequency /= 2.0;
            amplitude *= persistence;
            let bank = (self.bank_offset + octave) % PRIMES.len();
            total += self.interpolated(bank, x / frequency, y / frequency) * amplitude;
        }
        total / frequency
    }

    /// Псевдослучайное значение в узле решётки, диапазон `[-1, 1]`.
    fn lattice(&self, bank: usize, x: i64, y: i64) -> f64 {
        let [a, b, c] = PRIMES[bank];
        let x = (x + self.shift.0) as u64;
        let y = (y + self.shift.1) as u64;
        let mut n = x.wrapping_add(y.wrapping_mul(57));
        n = (n << 13) ^ n;
        let t = n
            .wrapping_mul(n.wrapping_mul(n).wrapping_mul(a).wrapping_add(b))
            .wrapping_add(c)
            & 0x7fff_ffff;
        1.0 - t as f64 / 1_073_741_824.0
    }

    /// Сглаживание по соседям: углы 1/16, стороны 1/8, центр 1/4.
    fn smoothed(&self, bank: usize, x: i64, y: i64) -> f64 {
        let corners = (self.lattice(bank, x - 1, y - 1)
            + self.lattice(bank, x + 1, y - 1)
            + self.lattice(bank, x - 1, y + 1)
            + self.lattice(bank, x + 1, y + 1))
            / 16.0;
        let sides = (self.lattice(bank, x - 1, y)
            + self.lattice(bank, x + 1, y)
            + self.lattice(bank, x, y - 1)
            + self.lattice(bank, x, y + 1))
            / 8.0;
        let center = self.lattice(bank, x, y) / 4.0;
        corners + sides + center
    }

    fn interpolated(&self, bank: usize, x: f64, y: f64) -> f64 {
        let (ix, iy) = (x.floor(), y.floor());
        let (fx, fy) = (x - ix, y - iy);
        let (ix, iy) = (ix as i64, iy as i64);

        let v1 = self.smoothed(bank, ix, iy);
        let v2 = self.smoothed(bank, ix + 1, iy);
        let v3 = self.smoothed(bank, ix, iy + 1);
        let v4 = self.smoothed(bank, ix + 1, iy + 1);

        let i1 = cosine_interpolate(v1, v2, fx);
        let i2 = cosine_interpolate(v3, v4, fx);
        cosine_interpolate(i1, i2, fy)
    }
}

impl NoiseSource for NoiseField {
    fn sample(&self, x: f64, y: f64, amplitude: f64, persistence: f64) -> f64 {
        NoiseField::sample(self, x, y, amplitude, persistence)
    }
}

fn cosine_interpolate(a: f64, b: f64, t: f64) -> f64 {
    let f = (1.0 - (t * std::f64::consts::PI).cos()) * 0.5;
    a * (1.0 - f) + b * f
}

/// OpenSimplex2 из `fastnoise-lite`, октавы суммируются вручную.
pub struct SimplexField {
    noise: FastNoiseLite,
    octaves: u32,
}

impl SimplexField {
    #[must_use]
    pub fn new(seed: u64, octaves: u32) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(seed as i32));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(1.0));
        Self {
            noise,
            octaves: octaves.max(1),
        }
    }
}

impl NoiseSource for SimplexField {
    fn sample(&self, x: f64, y: f64, amplitude: f64, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 2f64.powi(self.octaves as i32);
        let mut amplitude = amplitude;
        for _ in 0..self.octaves {
            frequency /= 2.0;
            amplitude *= persistence;
            let value = self
                .noise
                .get_noise_2d((x / frequency) as f32, (y / frequency) as f32);
            total += f64::from(value) * amplitude;
        }
        total / frequency
    }
}

/// Создаёт источник шума согласно настройкам.
#[must_use]
pub fn build_noise(settings: &NoiseSettings, seed: u64) -> Box<dyn NoiseSource> {
    match settings.kind {
        NoiseKind::Value => Box::new(NoiseField::with_octaves(seed, settings.octaves)),
        NoiseKind::OpenSimplex => Box::new(SimplexField::new(seed, settings.octaves)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = NoiseField::new(7);
        let b = NoiseField::new(7);
        for i in 0..50 {
            let x = f64::from(i) * 1.37;
            let y = f64::from(i) * 0.73;
            assert_eq!(a.sample(x, y, 10.0, 0.5), b.sample(x, y, 10.0, 0.5));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(4242);
        let differs = (0..50).any(|i| {
            let x = f64::from(i) * 3.1;
            a.sample(x, x, 1.0, 0.5) != b.sample(x, x, 1.0, 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn bounded_by_amplitude() {
        // Каждая октава даёт значение в [-1, 1], сумма амплитуд меньше исходной
        let field = NoiseField::new(3);
        for i in -40..40 {
            let v = field.sample(f64::from(i) * 2.5, f64::from(i) * -1.5, 10.0, 0.5);
            assert!(v.is_finite());
            assert!(v.abs() <= 10.0, "{v}");
        }
    }

    #[test]
    fn continuous_between_lattice_points() {
        let field = NoiseField::new(11);
        let mut prev = field.sample(10.0, 10.0, 1.0, 0.5);
        for step in 1..=100 {
            let x = 10.0 + f64::from(step) * 0.01;
            let v = field.sample(x, 10.0, 1.0, 0.5);
            assert!((v - prev).abs() < 0.05, "jump at {x}: {prev} -> {v}");
            prev = v;
        }
    }

    #[test]
    fn simplex_source_is_deterministic() {
        let settings = NoiseSettings {
            kind: NoiseKind::OpenSimplex,
            ..NoiseSettings::default()
        };
        let a = build_noise(&settings, 99);
        let b = build_noise(&settings, 99);
        assert_eq!(a.sample(12.5, 3.25, 10.0, 0.5), b.sample(12.5, 3.25, 10.0, 0.5));
    }
}
