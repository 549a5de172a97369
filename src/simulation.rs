//! # Simulation モジュール
//!
//! ミサイル攻撃／防衛デモの3つのタスクを起動し、協調動作させます。
//!
//! - **攻撃タスク**: 発射数を決めてキューへ送り、ミサイル発射コマンドを送信後、
//!   ランダムな時間待機します。
//! - **防衛タスク**: キューから発射数を受け取り、照準対象のミサイルごとに
//!   迎撃解を計算して迎撃機発射コマンドを送信後、一定時間待機します。
//! - **監視タスク**: `World` を単独で所有し、固定周期のティックごとに
//!   届いたコマンドを適用してから物理更新を1ステップ進めます。
//!
//! タスク間で可変状態を共有せず、`mpsc` のコマンドと `oneshot` の応答で
//! やり取りします。コマンドはティック境界でまとめて適用されます。
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use interceptsim::scenario::ScenarioConfig;
//! use interceptsim::simulation::SimulationEngine;
//!
//! # async fn demo() {
//! let engine = SimulationEngine::new(ScenarioConfig::default());
//! let stats = engine.run(Some(1000)).await;
//! println!("迎撃数: {}", stats.intercepts);
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::models::{Position2D as ModelPosition2D, *};
use crate::queue::{attack_queue, LaunchCountReceiver, LaunchCountSender};
use crate::scenario::*;
use crate::world::{World, WorldStats};

/// 監視タスクへのコマンドバッファ容量
const COMMAND_BUFFER: usize = 64;

/// 監視タスク（World の所有者）へのコマンド
#[derive(Debug)]
pub enum WorldCommand {
    /// スロット番号ごとのミサイル発射
    LaunchMissiles { launches: Vec<MissileLaunch> },
    /// スロット 0..count のスナップショット要求
    SnapshotMissiles {
        count: usize,
        reply: oneshot::Sender<Vec<EntitySnapshot>>,
    },
    /// 迎撃機の発射
    LaunchInterceptor { solution: InterceptSolution },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissileLaunch {
    pub slot: usize,
    pub angle_deg: f64,
    pub speed: f64,
}

pub struct SimulationEngine {
    pub config: ScenarioConfig,
    pub world: World,
}

impl SimulationEngine {
    /// 設定のシード値で防衛エリアを生成してエンジンを作成
    pub fn new(config: ScenarioConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.sim.seed);
        let world = World::new(&config, &mut rng);
        Self { config, world }
    }

    /// 3タスクを起動し、`max_ticks` に達するか Ctrl-C を受けるまで実行して集計を返す
    ///
    /// `max_ticks` が None の場合は Ctrl-C を受け取るまで実行します。
    pub async fn run(self, max_ticks: Option<u64>) -> WorldStats {
        self.run_until(max_ticks, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("停止要求を受信しました"),
                Err(e) => {
                    warn!(error = %e, "Ctrl-C の待ち受けに失敗しました");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// `shutdown` が完了した時点、または `max_ticks` に達した時点で停止する
    pub async fn run_until<F>(self, max_ticks: Option<u64>, shutdown: F) -> WorldStats
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let SimulationEngine { config, world } = self;

        info!("=== シミュレーション実行開始 ===");
        for (index, area) in world.areas.iter().enumerate() {
            info!(
                area_index = index,
                x = area.x,
                y = area.y,
                width = area.width,
                height = area.height,
                "防衛エリア"
            );
        }

        let (count_tx, count_rx) = attack_queue(config.queue.capacity);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let attacker = tokio::spawn(attack_task(
            config.attacker.clone(),
            config.sim.seed.wrapping_add(1),
            count_tx,
            command_tx.clone(),
        ));
        let defender = tokio::spawn(defense_task(
            config.defender.clone(),
            config.world.gravity,
            count_rx,
            command_tx,
        ));
        let (stop_tx, stop_rx) = watch::channel(false);
        let stop_signal = tokio::spawn(async move {
            shutdown.await;
            let _ = stop_tx.send(true);
        });

        let world = monitor_task(
            world,
            Duration::from_millis(config.sim.tick_ms),
            command_rx,
            max_ticks,
            stop_rx,
        )
        .await;

        stop_signal.abort();
        attacker.abort();
        defender.abort();

        world.log_summary();
        info!("=== シミュレーション完了 ===");
        world.stats
    }
}

/// 攻撃タスク
///
/// 発射数を決定 → キューへ送信 → ミサイル発射 → ランダム待機 を繰り返します。
pub async fn attack_task(
    config: AttackerConfig,
    seed: u64,
    queue: LaunchCountSender,
    commands: mpsc::Sender<WorldCommand>,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let send_timeout = config.queue_send_timeout_ms.map(Duration::from_millis);

    loop {
        let count = rng.random_range(1..=config.max_missiles);

        let published = match send_timeout {
            Some(timeout) => queue.send_timeout(count, timeout).await,
            None => queue.send(count).await,
        };

        match published {
            Ok(()) => {
                let launches = (0..count)
                    .map(|slot| {
                        let [angle_min, angle_max] = config.angle_deg;
                        let [speed_min, speed_max] = config.speed;
                        MissileLaunch {
                            slot,
                            angle_deg: math_utils::random_range(&mut rng, angle_min, angle_max),
                            speed: math_utils::random_range(&mut rng, speed_min, speed_max),
                        }
                    })
                    .collect();

                if commands.send(WorldCommand::LaunchMissiles { launches }).await.is_err() {
                    debug!("監視タスクが終了したため攻撃タスクを終了します");
                    return;
                }

                info!(count, "ATTACK: ミサイル{}発の攻撃を開始しました", count);
            }
            Err(SimError::ChannelClosed) => {
                debug!("攻撃キューが閉じられたため攻撃タスクを終了します");
                return;
            }
            Err(e) => {
                warn!(count, error = %e, "ATTACK_SKIPPED: 攻撃を見送りました");
            }
        }

        let wait_ms = math_utils::random_range(&mut rng, 1.0, config.interval_ms as f64);
        tokio::time::sleep(Duration::from_millis(wait_ms as u64)).await;
    }
}

/// 防衛タスク
///
/// 発射数を受信 → 照準対象ミサイルへ迎撃機発射 → 一定時間待機 を繰り返します。
pub async fn defense_task(
    config: DefenderConfig,
    gravity: f64,
    queue: LaunchCountReceiver,
    commands: mpsc::Sender<WorldCommand>,
) {
    defense_task_with(config, gravity, queue, commands, intercept::solve).await
}

/// 迎撃解の計算方法を指定して防衛タスクを実行
pub async fn defense_task_with<S>(
    config: DefenderConfig,
    gravity: f64,
    mut queue: LaunchCountReceiver,
    commands: mpsc::Sender<WorldCommand>,
    solver: S,
) where
    S: Fn(ModelPosition2D, ModelPosition2D, f64) -> Result<InterceptSolution, SimError>,
{
    let launch_point = ModelPosition2D::new(config.launch_point.x, config.launch_point.y);
    let interval = Duration::from_millis(config.interval_ms);

    while let Some(count) = queue.recv().await {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = WorldCommand::SnapshotMissiles { count, reply: reply_tx };
        if commands.send(request).await.is_err() {
            break;
        }
        let Ok(snapshots) = reply_rx.await else {
            break;
        };

        let mut dispatched = 0;
        for snapshot in snapshots.iter().filter(|s| s.targeted) {
            let Some(target) = snapshot.position else {
                continue;
            };

            match solver(launch_point, target, gravity) {
                Ok(solution) => {
                    if commands.send(WorldCommand::LaunchInterceptor { solution }).await.is_err() {
                        return;
                    }
                    dispatched += 1;
                }
                Err(e) => {
                    warn!(
                        missile_slot = snapshot.slot,
                        target_x = target.x,
                        target_y = target.y,
                        error = %e,
                        "INTERCEPT_SKIPPED: 迎撃機の発射を見送りました"
                    );
                }
            }
        }

        info!(
            count,
            dispatched,
            "DEFENSE: {}発のミサイルに対し迎撃機{}機を指令しました",
            count,
            dispatched
        );

        tokio::time::sleep(interval).await;
    }

    debug!("攻撃キューが閉じられたため防衛タスクを終了します");
}

/// 監視タスク
///
/// 固定周期でティックし、届いたコマンドを適用してから物理更新を行います。
/// `max_ticks` に達するか停止要求を受けると World を返して終了します。
pub async fn monitor_task(
    mut world: World,
    period: Duration,
    mut commands: mpsc::Receiver<WorldCommand>,
    max_ticks: Option<u64>,
    mut stop: watch::Receiver<bool>,
) -> World {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if max_ticks.is_some_and(|limit| world.tick_count >= limit) {
            break;
        }

        tokio::select! {
            _ = interval.tick() => {}
            _ = stop.changed() => {
                info!(tick = world.tick_count, "監視タスクを停止します");
                break;
            }
        }

        while let Ok(command) = commands.try_recv() {
            apply_command(&mut world, command);
        }

        let report = world.step();
        if !report.is_quiet() {
            debug!(
                tick = report.tick,
                area_hits = report.area_hits.len(),
                intercepts = report.intercepts.len(),
                out_of_bounds = report.out_of_bounds,
                "MONITOR_TICK"
            );
        }
        if world.tick_count % 1000 == 0 {
            info!(
                tick = world.tick_count,
                missiles_launched = world.stats.missiles_launched,
                interceptors_launched = world.stats.interceptors_launched,
                area_hits = world.stats.area_hits,
                intercepts = world.stats.intercepts,
                "進行状況"
            );
        }
    }

    world
}

/// コマンドを World に適用
pub fn apply_command(world: &mut World, command: WorldCommand) {
    match command {
        WorldCommand::LaunchMissiles { launches } => {
            for launch in launches {
                if let Err(e) = world.launch_missile(launch.slot, launch.angle_deg, launch.speed) {
                    warn!(slot = launch.slot, error = %e, "MISSILE_LAUNCH_REJECTED: ミサイル発射を拒否しました");
                }
            }
        }
        WorldCommand::SnapshotMissiles { count, reply } => {
            // 要求側が既に終了している場合は破棄
            let _ = reply.send(world.missile_snapshots(count));
        }
        WorldCommand::LaunchInterceptor { solution } => {
            if let Err(e) = world.launch_interceptor(solution.angle_deg, solution.speed) {
                warn!(
                    angle_deg = solution.angle_deg,
                    speed = solution.speed,
                    error = %e,
                    "INTERCEPTOR_LAUNCH_REJECTED: 迎撃機の発射を見送りました"
                );
            }
        }
    }
}
