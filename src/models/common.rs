use std::ops::{Add, Sub};

/// 2次元位置を表す構造体（画面座標系、y軸は下向き）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// ユークリッド距離を計算
    pub fn distance(&self, other: &Position2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// 矩形 [0, width] × [0, height] の内側かどうか
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.x <= width && self.y >= 0.0 && self.y <= height
    }
}

impl Add<Velocity2D> for Position2D {
    type Output = Self;

    fn add(self, velocity: Velocity2D) -> Self::Output {
        Self::new(self.x + velocity.x, self.y + velocity.y)
    }
}

impl Sub for Position2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// 2次元速度（1ティックあたりの移動量）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity2D {
    pub x: f64,
    pub y: f64,
}

impl Velocity2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2)).sqrt()
    }
}

/// エンティティの種類（ミサイルと迎撃機は同じ属性を持つ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    Missile,
    Interceptor,
}

/// エンティティが非アクティブになった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// 表示領域外に出た
    OutOfBounds,
    /// 防衛エリアに着弾した
    AreaHit,
    /// 迎撃した／迎撃された
    Intercepted,
}

/// シミュレーション実行時のエラー
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// 弾道方程式に実数解がない（迎撃機の発射を見送る）
    InvalidGeometry { dx: f64, dy: f64 },
    /// キューが満杯
    QueueFull,
    /// キュー送信のタイムアウト
    QueueTimeout,
    /// 通信相手のタスクが終了している
    ChannelClosed,
    /// 固定長スロットの範囲外
    SlotOutOfRange { index: usize, capacity: usize },
    /// 空いている迎撃機スロットがない
    NoFreeSlot,
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidGeometry { dx, dy } => {
                write!(f, "迎撃解が存在しません (dx: {:.3}, dy: {:.3})", dx, dy)
            }
            SimError::QueueFull => write!(f, "攻撃キューが満杯です"),
            SimError::QueueTimeout => write!(f, "攻撃キューへの送信がタイムアウトしました"),
            SimError::ChannelClosed => write!(f, "通信チャネルが閉じられています"),
            SimError::SlotOutOfRange { index, capacity } => {
                write!(f, "スロット番号が範囲外です: {} (容量: {})", index, capacity)
            }
            SimError::NoFreeSlot => write!(f, "空いている迎撃機スロットがありません"),
        }
    }
}

impl std::error::Error for SimError {}

/// 数学ユーティリティ関数
pub mod math_utils {
    use rand::Rng;

    /// 度をラジアンに変換
    pub fn to_radians(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }

    /// ラジアンを度に変換
    pub fn to_degrees(radians: f64) -> f64 {
        radians * 180.0 / std::f64::consts::PI
    }

    /// [min, max] の一様乱数
    pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
        let f: f64 = rng.random();
        (min + f * (max - min)).clamp(min.min(max), min.max(max))
    }
}
