use serde::{Deserialize, Serialize};
use std::path::Path;
use std::fs;

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "default".to_string(),
            description: "ミサイル攻撃／防衛デモ（組み込み既定値）".to_string(),
        }
    }
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 監視タスクの物理更新周期 [ms]
    pub tick_ms: u64,
    /// 最大ティック数（None の場合は Ctrl-C まで実行）
    pub max_ticks: Option<u64>,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            max_ticks: None,
            seed: 42,
        }
    }
}

/// 世界設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// 1ティックあたりの鉛直加速度（画面座標系で下向き正）
    pub gravity: f64,
    /// 迎撃判定距離
    pub intercept_tolerance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            gravity: 9.8,
            intercept_tolerance: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

/// ミサイルが防衛エリアを狙っているかの判定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// 発射点がエリア内にあるか
    #[default]
    Origin,
    /// 予測弾道がエリアを通過するか
    Trajectory,
}

/// 攻撃側設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttackerConfig {
    /// 同時に存在できるミサイル数（1回の攻撃の最大発射数）
    pub max_missiles: usize,
    /// 攻撃間隔の上限 [ms]（1〜この値の乱数）
    pub interval_ms: u64,
    pub origin: Position2D,
    pub angle_deg: [f64; 2],
    pub speed: [f64; 2],
    pub targeting: TargetingMode,
    /// キュー送信のタイムアウト [ms]（None の場合は空くまで待つ）
    pub queue_send_timeout_ms: Option<u64>,
}

impl Default for AttackerConfig {
    fn default() -> Self {
        Self {
            max_missiles: 10,
            interval_ms: 5000,
            origin: Position2D { x: 0.0, y: 600.0 },
            angle_deg: [10.0, 80.0],
            speed: [100.0, 200.0],
            targeting: TargetingMode::Origin,
            queue_send_timeout_ms: None,
        }
    }
}

/// 防衛側設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefenderConfig {
    /// 同時に存在できる迎撃機数
    pub max_interceptors: usize,
    /// 防衛間隔 [ms]
    pub interval_ms: u64,
    /// 迎撃機の発射点（ミサイル発射点の反対側の画面端）
    pub launch_point: Position2D,
}

impl Default for DefenderConfig {
    fn default() -> Self {
        Self {
            max_interceptors: 5,
            interval_ms: 1000,
            launch_point: Position2D { x: 800.0, y: 600.0 },
        }
    }
}

/// 防衛エリア生成設定（各値は [min, max]）
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AreaConfig {
    pub count: usize,
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub width: [f64; 2],
    pub height: [f64; 2],
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            count: 3,
            x: [100.0, 200.0],
            y: [100.0, 200.0],
            width: [10.0, 50.0],
            height: [10.0, 50.0],
        }
    }
}

/// 攻撃キュー設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    pub world: WorldConfig,
    pub attacker: AttackerConfig,
    pub defender: DefenderConfig,
    pub areas: AreaConfig,
    pub queue: QueueConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.sim.tick_ms == 0 {
            return Err(ScenarioError::ValidationError("tick_ms must be positive".to_string()));
        }

        let world = &self.world;
        if !(world.width > 0.0 && world.height > 0.0) {
            return Err(ScenarioError::ValidationError("Invalid world bounds".to_string()));
        }
        if !world.gravity.is_finite() {
            return Err(ScenarioError::ValidationError("gravity must be finite".to_string()));
        }
        if !(world.intercept_tolerance >= 0.0) {
            return Err(ScenarioError::ValidationError(
                "intercept_tolerance must be non-negative".to_string(),
            ));
        }

        if self.attacker.max_missiles == 0 {
            return Err(ScenarioError::ValidationError("max_missiles must be positive".to_string()));
        }
        if self.attacker.interval_ms == 0 {
            return Err(ScenarioError::ValidationError(
                "attacker interval_ms must be positive".to_string(),
            ));
        }
        if self.defender.max_interceptors == 0 {
            return Err(ScenarioError::ValidationError(
                "max_interceptors must be positive".to_string(),
            ));
        }
        if self.queue.capacity == 0 {
            return Err(ScenarioError::ValidationError(
                "queue capacity must be positive".to_string(),
            ));
        }

        let ranges = [
            ("attacker.angle_deg", self.attacker.angle_deg),
            ("attacker.speed", self.attacker.speed),
            ("areas.x", self.areas.x),
            ("areas.y", self.areas.y),
            ("areas.width", self.areas.width),
            ("areas.height", self.areas.height),
        ];
        for (name, [min, max]) in ranges {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(ScenarioError::ValidationError(
                    format!("{} must be a finite [min, max] range (got [{}, {}])", name, min, max)
                ));
            }
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("更新周期: {}ms", self.sim.tick_ms);
        match self.sim.max_ticks {
            Some(ticks) => println!("最大ティック数: {}", ticks),
            None => println!("最大ティック数: 無制限 (Ctrl-C で終了)"),
        }
        println!("シード値: {}", self.sim.seed);
        println!("表示領域: {:.0} x {:.0}", self.world.width, self.world.height);
        println!("重力: {:.2}", self.world.gravity);
        println!();

        println!("=== 攻撃側 ===");
        println!("最大ミサイル数: {}発", self.attacker.max_missiles);
        println!("攻撃間隔: 1〜{}ms", self.attacker.interval_ms);
        println!("照準判定: {:?}", self.attacker.targeting);
        println!();

        println!("=== 防衛側 ===");
        println!("最大迎撃機数: {}機", self.defender.max_interceptors);
        println!("防衛間隔: {}ms", self.defender.interval_ms);
        println!("防衛エリア数: {}", self.areas.count);
        println!("キュー容量: {}", self.queue.capacity);
    }
}

/// シナリオ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(std::path::PathBuf),
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "シナリオファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_constants() {
        let config = ScenarioConfig::default();
        assert_eq!(config.attacker.max_missiles, 10);
        assert_eq!(config.defender.max_interceptors, 5);
        assert_eq!(config.attacker.interval_ms, 5000);
        assert_eq!(config.defender.interval_ms, 1000);
        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.world.height, 600.0);
        assert_eq!(config.world.gravity, 9.8);
        assert_eq!(config.world.intercept_tolerance, 10.0);
        assert_eq!(config.queue.capacity, 10);
        assert_eq!(config.areas.count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "sim:\n  tick_ms: 5\n  max_ticks: 100\nattacker:\n  targeting: trajectory\n";
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sim.tick_ms, 5);
        assert_eq!(config.sim.max_ticks, Some(100));
        assert_eq!(config.sim.seed, 42);
        assert_eq!(config.attacker.targeting, TargetingMode::Trajectory);
        assert_eq!(config.attacker.max_missiles, 10);
        assert_eq!(config.defender.launch_point.x, 800.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScenarioConfig::default();
        config.queue.capacity = 0;
        assert!(matches!(config.validate(), Err(ScenarioError::ValidationError(_))));

        let mut config = ScenarioConfig::default();
        config.attacker.speed = [200.0, 100.0];
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.world.width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bundled_scenarios_load() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios");

        let default = ScenarioConfig::from_file(format!("{}/default.yaml", dir)).unwrap();
        assert_eq!(default.sim.max_ticks, Some(3000));
        assert_eq!(default.attacker.queue_send_timeout_ms, None);
        assert_eq!(default.defender.max_interceptors, 5);

        let slow_arc = ScenarioConfig::from_file(format!("{}/slow_arc.yaml", dir)).unwrap();
        assert_eq!(slow_arc.attacker.targeting, TargetingMode::Trajectory);
        assert_eq!(slow_arc.world.width, 800.0);
        assert_eq!(slow_arc.attacker.angle_deg, [-60.0, -30.0]);
    }

    #[test]
    fn test_missing_file() {
        let result = ScenarioConfig::from_file("does/not/exist.yaml");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
    }
}
