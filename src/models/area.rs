use rand::Rng;

use crate::models::common::{Position2D, math_utils};
use crate::scenario::AreaConfig;

/// 防衛エリア（居住区域）
///
/// 起動時に一度だけランダムな位置と大きさで生成され、
/// シミュレーション中は着弾記録以外変化しません。
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 一度でも着弾したか
    pub hit: bool,
    /// 着弾回数
    pub hit_count: u32,
}

impl Area {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            hit: false,
            hit_count: 0,
        }
    }

    /// 点がエリア内（境界を含む）にあるか
    pub fn contains(&self, point: &Position2D) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// 着弾を記録
    pub fn register_hit(&mut self) {
        self.hit = true;
        self.hit_count += 1;
    }
}

/// 設定された範囲からランダムに防衛エリアを生成
pub fn generate_areas<R: Rng + ?Sized>(config: &AreaConfig, rng: &mut R) -> Vec<Area> {
    (0..config.count)
        .map(|_| {
            let x = math_utils::random_range(rng, config.x[0], config.x[1]);
            let y = math_utils::random_range(rng, config.y[0], config.y[1]);
            let width = math_utils::random_range(rng, config.width[0], config.width[1]);
            let height = math_utils::random_range(rng, config.height[0], config.height[1]);
            Area::new(x, y, width, height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_contains_includes_edges() {
        let area = Area::new(100.0, 100.0, 20.0, 10.0);
        assert!(area.contains(&Position2D::new(100.0, 100.0)));
        assert!(area.contains(&Position2D::new(120.0, 110.0)));
        assert!(area.contains(&Position2D::new(110.0, 105.0)));
        assert!(!area.contains(&Position2D::new(99.9, 105.0)));
        assert!(!area.contains(&Position2D::new(110.0, 110.1)));
    }

    #[test]
    fn test_register_hit_is_observable() {
        let mut area = Area::new(0.0, 0.0, 1.0, 1.0);
        assert!(!area.hit);
        area.register_hit();
        area.register_hit();
        assert!(area.hit);
        assert_eq!(area.hit_count, 2);
    }

    #[test]
    fn test_generate_areas_respects_ranges() {
        let config = AreaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let areas = generate_areas(&config, &mut rng);

        assert_eq!(areas.len(), config.count);
        for area in &areas {
            assert!((100.0..=200.0).contains(&area.x));
            assert!((100.0..=200.0).contains(&area.y));
            assert!((10.0..=50.0).contains(&area.width));
            assert!((10.0..=50.0).contains(&area.height));
            assert!(!area.hit);
        }
    }
}
