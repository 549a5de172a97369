//! # World モジュール
//!
//! ミサイル・迎撃機・防衛エリアと集計カウンタをすべて所有する
//! エンティティアリーナです。監視タスクだけがこの構造体を保持し、
//! 攻撃タスク・防衛タスクはコマンド経由でのみ状態を変更します。
//!
//! ## 1ティックの処理順序
//!
//! 1. **ミサイル**: 位置更新 → 領域外判定 → 防衛エリア着弾判定
//! 2. **迎撃機**: 位置更新 → 領域外判定 → ミサイルとの近接判定
//!
//! 着弾判定は迎撃判定より先に評価されるため、同一ティックで両方の
//! 条件を満たしたミサイルは着弾として数えられます。

use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::models::{Position2D as ModelPosition2D, *};
use crate::scenario::{ScenarioConfig, TargetingMode};

/// 予測弾道の最大追跡ティック数
const TRAJECTORY_HORIZON: usize = 10_000;

/// 集計カウンタ（単調増加、リセットなし）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub missiles_launched: u64,
    pub interceptors_launched: u64,
    pub area_hits: u64,
    pub intercepts: u64,
}

/// 1ティックで発生したイベント
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// (ミサイルスロット, エリア番号)
    pub area_hits: Vec<(usize, usize)>,
    /// (ミサイルスロット, 迎撃機スロット)
    pub intercepts: Vec<(usize, usize)>,
    pub out_of_bounds: usize,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.area_hits.is_empty() && self.intercepts.is_empty() && self.out_of_bounds == 0
    }
}

pub struct World {
    pub width: f64,
    pub height: f64,
    pub gravity: f64,
    pub intercept_tolerance: f64,
    pub targeting: TargetingMode,
    pub missile_origin: ModelPosition2D,
    pub interceptor_origin: ModelPosition2D,

    pub missiles: Vec<Entity>,
    pub interceptors: Vec<Entity>,
    pub areas: Vec<Area>,
    pub stats: WorldStats,
    pub tick_count: u64,
}

impl World {
    /// 設定から世界を構築し、防衛エリアを乱数で生成
    pub fn new<R: Rng + ?Sized>(config: &ScenarioConfig, rng: &mut R) -> Self {
        let areas = generate_areas(&config.areas, rng);
        Self::with_areas(config, areas)
    }

    /// 防衛エリアを指定して世界を構築
    pub fn with_areas(config: &ScenarioConfig, areas: Vec<Area>) -> Self {
        Self {
            width: config.world.width,
            height: config.world.height,
            gravity: config.world.gravity,
            intercept_tolerance: config.world.intercept_tolerance,
            targeting: config.attacker.targeting,
            missile_origin: ModelPosition2D::new(
                config.attacker.origin.x,
                config.attacker.origin.y,
            ),
            interceptor_origin: ModelPosition2D::new(
                config.defender.launch_point.x,
                config.defender.launch_point.y,
            ),
            missiles: vec![Entity::inactive(EntityRole::Missile); config.attacker.max_missiles],
            interceptors: vec![
                Entity::inactive(EntityRole::Interceptor);
                config.defender.max_interceptors
            ],
            areas,
            stats: WorldStats::default(),
            tick_count: 0,
        }
    }

    /// 指定スロットのミサイルを発射点から発射
    pub fn launch_missile(
        &mut self,
        slot: usize,
        angle_deg: f64,
        speed: f64,
    ) -> Result<(), SimError> {
        let capacity = self.missiles.len();
        let origin = self.missile_origin;
        let targeted = match self.targeting {
            TargetingMode::Origin => self.is_in_any_area(&origin),
            TargetingMode::Trajectory => self.trajectory_crosses_area(origin, angle_deg, speed),
        };

        let missile = self
            .missiles
            .get_mut(slot)
            .ok_or(SimError::SlotOutOfRange { index: slot, capacity })?;
        missile.launch(origin, angle_deg, speed);
        missile.targeted = targeted;
        self.stats.missiles_launched += 1;

        debug!(
            slot,
            angle_deg,
            speed,
            targeted,
            "MISSILE_LAUNCH: ミサイルを発射しました"
        );

        Ok(())
    }

    /// 空いている最初のスロットから迎撃機を発射
    pub fn launch_interceptor(&mut self, angle_deg: f64, speed: f64) -> Result<usize, SimError> {
        let origin = self.interceptor_origin;
        let slot = self
            .interceptors
            .iter()
            .position(|i| !i.is_active())
            .ok_or(SimError::NoFreeSlot)?;

        self.interceptors[slot].launch(origin, angle_deg, speed);
        self.stats.interceptors_launched += 1;

        debug!(
            slot,
            angle_deg,
            speed,
            "INTERCEPTOR_LAUNCH: 迎撃機を発射しました"
        );

        Ok(slot)
    }

    /// スロット 0..count のミサイルのスナップショット（容量で切り詰め）
    pub fn missile_snapshots(&self, count: usize) -> Vec<EntitySnapshot> {
        self.missiles
            .iter()
            .take(count)
            .enumerate()
            .map(|(slot, m)| m.snapshot(slot))
            .collect()
    }

    pub fn active_missiles(&self) -> usize {
        self.missiles.iter().filter(|m| m.is_active()).count()
    }

    pub fn active_interceptors(&self) -> usize {
        self.interceptors.iter().filter(|i| i.is_active()).count()
    }

    fn is_in_any_area(&self, point: &ModelPosition2D) -> bool {
        self.areas.iter().any(|a| a.contains(point))
    }

    /// 予測弾道（領域外に出るまで）が防衛エリアを通過するか
    fn trajectory_crosses_area(&self, origin: ModelPosition2D, angle_deg: f64, speed: f64) -> bool {
        let mut probe = Entity::inactive(EntityRole::Missile);
        probe.launch(origin, angle_deg, speed);

        if self.is_in_any_area(&probe.get_position()) {
            return true;
        }
        for _ in 0..TRAJECTORY_HORIZON {
            probe.integrate(self.gravity);
            let position = probe.get_position();
            if !position.is_within(self.width, self.height) {
                return false;
            }
            if self.is_in_any_area(&position) {
                return true;
            }
        }
        false
    }

    /// 物理更新を1ティック進める
    pub fn step(&mut self) -> TickReport {
        self.tick_count += 1;
        let mut report = TickReport {
            tick: self.tick_count,
            ..TickReport::default()
        };

        self.step_missiles(&mut report);
        self.step_interceptors(&mut report);

        trace!(
            tick = self.tick_count,
            active_missiles = self.active_missiles(),
            active_interceptors = self.active_interceptors(),
            "WORLD_TICK"
        );

        report
    }

    fn step_missiles(&mut self, report: &mut TickReport) {
        for (slot, missile) in self.missiles.iter_mut().enumerate() {
            if !missile.is_active() {
                continue;
            }

            missile.integrate(self.gravity);
            let position = missile.get_position();

            if !position.is_within(self.width, self.height) {
                missile.deactivate(EndReason::OutOfBounds);
                report.out_of_bounds += 1;
                continue;
            }

            for (area_index, area) in self.areas.iter_mut().enumerate() {
                if area.contains(&position) {
                    area.register_hit();
                    self.stats.area_hits += 1;
                    missile.deactivate(EndReason::AreaHit);
                    report.area_hits.push((slot, area_index));

                    info!(
                        missile_slot = slot,
                        area_index,
                        position_x = position.x,
                        position_y = position.y,
                        area_hit_count = area.hit_count,
                        "AREA_HIT: ミサイルが防衛エリアに着弾しました"
                    );
                }
            }
        }
    }

    fn step_interceptors(&mut self, report: &mut TickReport) {
        for (slot, interceptor) in self.interceptors.iter_mut().enumerate() {
            if !interceptor.is_active() {
                continue;
            }

            interceptor.integrate(self.gravity);
            let position = interceptor.get_position();

            if !position.is_within(self.width, self.height) {
                interceptor.deactivate(EndReason::OutOfBounds);
                report.out_of_bounds += 1;
                continue;
            }

            let tolerance = self.intercept_tolerance;
            let hit = self.missiles.iter_mut().enumerate().find(|(_, m)| {
                m.is_active() && m.targeted && m.get_position().distance(&position) <= tolerance
            });

            if let Some((missile_slot, missile)) = hit {
                missile.deactivate(EndReason::Intercepted);
                interceptor.deactivate(EndReason::Intercepted);
                self.stats.intercepts += 1;
                report.intercepts.push((missile_slot, slot));

                info!(
                    missile_slot,
                    interceptor_slot = slot,
                    position_x = position.x,
                    position_y = position.y,
                    "INTERCEPT: 迎撃に成功しました"
                );
            }
        }
    }

    /// 集計結果をログ出力
    pub fn log_summary(&self) {
        info!(
            ticks = self.tick_count,
            missiles_launched = self.stats.missiles_launched,
            interceptors_launched = self.stats.interceptors_launched,
            area_hits = self.stats.area_hits,
            intercepts = self.stats.intercepts,
            "WORLD_SUMMARY: シミュレーション集計"
        );
        for (index, area) in self.areas.iter().enumerate() {
            if area.hit {
                warn!(area_index = index, hit_count = area.hit_count, "防衛エリアが被弾しています");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world(areas: Vec<Area>) -> World {
        World::with_areas(&ScenarioConfig::default(), areas)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_targeted_when_origin_inside_area() {
        let mut world = test_world(vec![Area::new(-10.0, 590.0, 20.0, 20.0)]);
        world.launch_missile(0, 45.0, 150.0).unwrap();
        assert!(world.missiles[0].targeted);

        let mut world = test_world(vec![Area::new(100.0, 100.0, 20.0, 20.0)]);
        world.launch_missile(0, 45.0, 150.0).unwrap();
        assert!(!world.missiles[0].targeted);
    }

    #[test]
    fn test_trajectory_targeting_predicts_crossing() {
        let mut config = ScenarioConfig::default();
        config.attacker.targeting = TargetingMode::Trajectory;
        config.attacker.origin.x = 0.0;
        config.attacker.origin.y = 300.0;
        config.world.gravity = 0.0;

        // 水平に 50/ティック で進む → x=100 で (90..110, 290..310) に入る
        let mut world = World::with_areas(&config, vec![Area::new(90.0, 290.0, 20.0, 20.0)]);
        world.launch_missile(0, 0.0, 50.0).unwrap();
        assert!(world.missiles[0].targeted);

        let mut world = World::with_areas(&config, vec![Area::new(90.0, 100.0, 20.0, 20.0)]);
        world.launch_missile(0, 0.0, 50.0).unwrap();
        assert!(!world.missiles[0].targeted);
    }

    #[test]
    fn test_launch_beyond_capacity_is_rejected() {
        let mut world = test_world(Vec::new());
        let result = world.launch_missile(10, 45.0, 150.0);
        assert_eq!(result, Err(SimError::SlotOutOfRange { index: 10, capacity: 10 }));
        assert_eq!(world.stats.missiles_launched, 0);
    }

    #[test]
    fn test_interceptor_slots_exhaust() {
        let mut world = test_world(Vec::new());
        for expected in 0..5 {
            assert_eq!(world.launch_interceptor(120.0, 10.0), Ok(expected));
        }
        assert_eq!(world.launch_interceptor(120.0, 10.0), Err(SimError::NoFreeSlot));
        assert_eq!(world.stats.interceptors_launched, 5);

        world.interceptors[2].deactivate(EndReason::OutOfBounds);
        assert_eq!(world.launch_interceptor(120.0, 10.0), Ok(2));
    }

    #[test]
    fn test_step_integrates_position_then_velocity() {
        let mut world = test_world(Vec::new());
        world.missile_origin = ModelPosition2D::new(100.0, 100.0);
        world.launch_missile(0, 45.0, 10.0).unwrap();
        let v0 = world.missiles[0].get_velocity();

        world.step();

        let missile = &world.missiles[0];
        assert!(missile.is_active());
        assert!(approx(missile.position.x, 100.0 + v0.x));
        assert!(approx(missile.position.y, 100.0 + v0.y));
        assert!(approx(missile.velocity.y, v0.y + 9.8));
        assert_eq!(missile.velocity.x, v0.x);
    }

    #[test]
    fn test_default_launch_leaves_viewport_after_one_tick() {
        let mut world = test_world(Vec::new());
        world.launch_missile(0, 45.0, 150.0).unwrap();

        let report = world.step();

        let missile = &world.missiles[0];
        let component = 150.0 * 45f64.to_radians().cos();
        assert!(approx(missile.position.x, component));
        assert!(approx(missile.position.y, 600.0 + 150.0 * 45f64.to_radians().sin()));
        assert!(!missile.is_active());
        assert_eq!(missile.end_reason, Some(EndReason::OutOfBounds));
        assert_eq!(report.out_of_bounds, 1);
    }

    #[test]
    fn test_area_hit_deactivates_and_counts() {
        let mut world = test_world(vec![Area::new(140.0, 140.0, 20.0, 20.0)]);
        world.missile_origin = ModelPosition2D::new(100.0, 100.0);
        world.gravity = 0.0;
        world.launch_missile(0, 45.0, 50.0 * std::f64::consts::SQRT_2).unwrap();

        let report = world.step();

        assert_eq!(report.area_hits, vec![(0, 0)]);
        assert!(!world.missiles[0].is_active());
        assert_eq!(world.missiles[0].end_reason, Some(EndReason::AreaHit));
        assert_eq!(world.stats.area_hits, 1);
        assert!(world.areas[0].hit);
        assert_eq!(world.areas[0].hit_count, 1);
    }

    fn place(entity: &mut Entity, x: f64, y: f64) {
        entity.launch(ModelPosition2D::new(x, y), 0.0, 0.0);
    }

    #[test]
    fn test_intercept_within_tolerance() {
        let mut world = test_world(Vec::new());
        world.gravity = 0.0;
        place(&mut world.missiles[0], 300.0, 300.0);
        world.missiles[0].targeted = true;
        place(&mut world.interceptors[0], 306.0, 308.0);

        let report = world.step();

        assert_eq!(report.intercepts, vec![(0, 0)]);
        assert_eq!(world.stats.intercepts, 1);
        assert!(!world.missiles[0].is_active());
        assert!(!world.interceptors[0].is_active());
        assert_eq!(world.missiles[0].end_reason, Some(EndReason::Intercepted));
    }

    #[test]
    fn test_intercept_ignores_untargeted_and_distant() {
        let mut world = test_world(Vec::new());
        world.gravity = 0.0;
        place(&mut world.missiles[0], 300.0, 300.0);
        place(&mut world.missiles[1], 500.0, 500.0);
        world.missiles[1].targeted = true;
        place(&mut world.interceptors[0], 300.0, 300.0);
        place(&mut world.interceptors[1], 511.0, 500.0);

        let report = world.step();

        assert!(report.intercepts.is_empty());
        assert_eq!(world.stats.intercepts, 0);
        assert_eq!(world.active_missiles(), 2);
        assert_eq!(world.active_interceptors(), 2);
    }

    #[test]
    fn test_one_interceptor_kills_one_missile() {
        let mut world = test_world(Vec::new());
        world.gravity = 0.0;
        for slot in 0..2 {
            place(&mut world.missiles[slot], 300.0, 300.0);
            world.missiles[slot].targeted = true;
        }
        place(&mut world.interceptors[0], 300.0, 305.0);

        let report = world.step();

        assert_eq!(report.intercepts, vec![(0, 0)]);
        assert_eq!(world.stats.intercepts, 1);
        assert!(world.missiles[1].is_active());
    }

    #[test]
    fn test_area_hit_wins_over_intercept() {
        let mut world = test_world(vec![Area::new(290.0, 290.0, 20.0, 20.0)]);
        world.gravity = 0.0;
        place(&mut world.missiles[0], 300.0, 300.0);
        world.missiles[0].targeted = true;
        place(&mut world.interceptors[0], 300.0, 300.0);

        let report = world.step();

        assert_eq!(report.area_hits, vec![(0, 0)]);
        assert!(report.intercepts.is_empty());
        assert_eq!(world.stats.area_hits, 1);
        assert_eq!(world.stats.intercepts, 0);
        assert!(world.interceptors[0].is_active());
    }

    #[test]
    fn test_snapshots_are_clamped_to_capacity() {
        let mut world = test_world(Vec::new());
        world.missile_origin = ModelPosition2D::new(100.0, 100.0);
        world.launch_missile(1, 0.0, 1.0).unwrap();

        let snapshots = world.missile_snapshots(50);
        assert_eq!(snapshots.len(), 10);
        assert!(!snapshots[0].active);
        assert_eq!(snapshots[1].position, Some(ModelPosition2D::new(100.0, 100.0)));
    }
}
