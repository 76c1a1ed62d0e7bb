use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::noise::{NoiseSource, build_noise};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Нижняя граница нормализованной высоты
pub const MIN_HEIGHT: f64 = 0.0;
/// Верхняя граница нормализованной высоты
pub const MAX_HEIGHT: f64 = 100.0;

/// Двумерная карта высот до классификации
pub type HeightField = Grid<f64>;

/// Проверяет размеры карты и радиусы гор.
pub fn validate(config: &GenerationConfig) -> Result<(), GenerationError> {
    // Индексы сетки считаются в u32, поэтому число ячеек обязано в него влезать
    let cells = config.width.checked_mul(config.height);
    if config.width == 0 || config.height == 0 || cells.is_none() {
        return Err(GenerationError::InvalidDimensions {
            width: config.width,
            height: config.height,
        });
    }
    if config.min_mountain_radius >= config.max_mountain_radius {
        return Err(GenerationError::InvalidMountainRadius {
            min: config.min_mountain_radius,
            max: config.max_mountain_radius,
        });
    }
    Ok(())
}

/// Генерирует карту высот: горы, затем шум, затем нормализация в `[0, 100]`
pub fn generate_heightmap<R: Rng + ?Sized>(
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<HeightField, GenerationError> {
    validate(config)?;

    let mut field = HeightField::new(config.width, config.height, 0.0);

    // === 1. Горы ===
    for _ in 0..config.num_mountains {
        drop_mountain(
            &mut field,
            rng,
            config.min_mountain_radius,
            config.max_mountain_radius,
        );
    }

    // === 2. Шум ===
    if config.noise.enabled {
        let noise = build_noise(&config.noise, config.seed);
        apply_noise(
            &mut field,
            noise.as_ref(),
            config.noise.amplitude,
            config.noise.persistence,
        );
    }

    // === 3. Нормализация ===
    normalize(&mut field)?;
    Ok(field)
}

/// Сбрасывает одну круглую гору.
///
/// Центр может лежать за краем карты не дальше радиуса, так что гора бывает обрезана.
/// Вклад `r² - d²` прибавляется к уже накопленной высоте.
pub fn drop_mountain<R: Rng + ?Sized>(
    field: &mut HeightField,
    rng: &mut R,
    min_radius: u32,
    max_radius: u32,
) {
    let radius = i64::from(rng.gen_range(min_radius..=max_radius));
    let width = i64::from(field.width);
    let height = i64::from(field.height);

    let x_center = rng.gen_range(-radius..=width + radius);
    let y_center = rng.gen_range(-radius..=height + radius);

    let x_min = (x_center - radius - 1).max(0);
    let x_max = (x_center + radius + 1).min(width - 1);
    let y_min = (y_center - radius - 1).max(0);
    let y_max = (y_center + radius + 1).min(height - 1);

    // Квадраты в i128: радиус до u32::MAX не переполняет
    let square_radius = i128::from(radius).pow(2);
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let distance = i128::from(x_center - x).pow(2) + i128::from(y_center - y).pow(2);
            let impulse = square_radius - distance;
            if impulse > 0 {
                *field.get_mut(x as u32, y as u32) += impulse as f64;
            }
        }
    }
}

/// Вычитает модуль шума из каждой ячейки, чтобы огрубить силуэт гор
pub fn apply_noise(
    field: &mut HeightField,
    noise: &dyn NoiseSource,
    amplitude: f64,
    persistence: f64,
) {
    let width = field.width as usize;
    let roughen = |(i, h): (usize, &mut f64)| {
        let x = (i % width) as f64;
        let y = (i / width) as f64;
        *h -= noise.sample(x, y, amplitude, persistence).abs();
    };

    #[cfg(feature = "parallel")]
    field.data.par_iter_mut().enumerate().for_each(roughen);
    #[cfg(not(feature = "parallel"))]
    field.data.iter_mut().enumerate().for_each(roughen);
}

/// Минимум и максимум по всей карте
#[must_use]
pub fn extremes(data: &[f64]) -> (f64, f64) {
    let init = (f64::INFINITY, f64::NEG_INFINITY);
    let merge = |(lo, hi): (f64, f64), (a, b): (f64, f64)| (lo.min(a), hi.max(b));

    #[cfg(feature = "parallel")]
    let result = data
        .par_iter()
        .map(|&v| (v, v))
        .reduce(|| init, merge);
    #[cfg(not(feature = "parallel"))]
    let result = data.iter().map(|&v| (v, v)).fold(init, merge);

    result
}

/// Линейно переводит высоты в диапазон `[0, 100]`.
///
/// Идеально плоская карта — фатальная ошибка: растягивать нечего.
pub fn normalize(field: &mut HeightField) -> Result<(), GenerationError> {
    let (min_h, max_h) = extremes(&field.data);
    if max_h - min_h <= f64::EPSILON {
        return Err(GenerationError::FlatMap(min_h));
    }
    let scale = (MAX_HEIGHT - MIN_HEIGHT) / (max_h - min_h);
    for h in &mut field.data {
        *h = (*h - min_h) * scale + MIN_HEIGHT;
    }
    Ok(())
}

/// Округляет нормализованные высоты до целых уровней
#[must_use]
pub fn to_levels(field: &HeightField) -> Grid<i32> {
    field.map(|_, _, &h| h.round().clamp(MIN_HEIGHT, MAX_HEIGHT) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> GenerationConfig {
        GenerationConfig {
            seed: 17,
            width: 40,
            height: 30,
            num_mountains: 20,
            min_mountain_radius: 3,
            max_mountain_radius: 9,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn normalized_range_is_full() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let field = generate_heightmap(&config(), &mut rng).unwrap();
        let (lo, hi) = extremes(&field.data);
        assert!(lo.abs() < 1e-9);
        assert!((hi - 100.0).abs() < 1e-9);

        let levels = to_levels(&field);
        assert!(levels.data.iter().all(|&h| (0..=100).contains(&h)));
        assert!(levels.data.contains(&0));
        assert!(levels.data.contains(&100));
    }

    #[test]
    fn same_seed_same_field() {
        let a = generate_heightmap(&config(), &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let b = generate_heightmap(&config(), &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flat_map_is_fatal() {
        let flat = GenerationConfig {
            num_mountains: 0,
            noise: crate::config::NoiseSettings {
                enabled: false,
                ..Default::default()
            },
            ..config()
        };
        let err = generate_heightmap(&flat, &mut ChaCha8Rng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, GenerationError::FlatMap(0.0));
    }

    #[test]
    fn radius_bounds_are_checked() {
        let bad = GenerationConfig {
            min_mountain_radius: 9,
            max_mountain_radius: 9,
            ..config()
        };
        assert_eq!(
            validate(&bad),
            Err(GenerationError::InvalidMountainRadius { min: 9, max: 9 })
        );
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let huge = GenerationConfig {
            width: u32::MAX,
            height: 2,
            ..config()
        };
        assert_eq!(
            validate(&huge),
            Err(GenerationError::InvalidDimensions {
                width: u32::MAX,
                height: 2
            })
        );
        let widest = GenerationConfig {
            width: 1 << 16,
            height: 1 << 16,
            ..config()
        };
        assert!(validate(&widest).is_err());
    }

    #[test]
    fn huge_radius_does_not_overflow() {
        let mut field = HeightField::new(3, 3, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..4 {
            drop_mountain(&mut field, &mut rng, u32::MAX - 1, u32::MAX);
        }
        assert!(field.data.iter().all(|&h| h.is_finite() && h >= 0.0));
    }

    #[test]
    fn mountains_accumulate() {
        let mut field = HeightField::new(21, 21, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        drop_mountain(&mut field, &mut rng, 4, 5);
        let after_one: f64 = field.data.iter().sum();
        drop_mountain(&mut field, &mut rng, 4, 5);
        let after_two: f64 = field.data.iter().sum();
        assert!(after_two >= after_one);
        assert!(field.data.iter().all(|&h| h >= 0.0));
    }
}
