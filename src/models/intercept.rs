//! # 迎撃照準計算
//!
//! 迎撃機の発射点から、指令発出時点のミサイル位置を狙う発射角と
//! 発射速度を一度だけ計算します。発射後の再照準（ホーミング）は行いません。
//!
//! 発射速度は、与えられた発射角で放物線軌道が目標点を通るための
//! 初速を弾道方程式から求めます。
//!
//! ```text
//! v = sqrt( g·dx² / (2·(dy − dx·tan θ)·cos²θ) )
//! ```
//!
//! 発射角を視線角（atan2(dy, dx)）にとると `dy − dx·tan θ` はほぼ 0 となり、
//! 解は特異点に張り付きます。非有限値・非正値・特異点近傍はすべて
//! `SimError::InvalidGeometry` として扱い、呼び出し側は発射を見送ります。

use crate::models::common::{Position2D, SimError, math_utils};

/// 分母がこの値以下の場合は特異点とみなす（|dx|,|dy| のスケールに対する相対値）
const SINGULARITY_EPSILON: f64 = 1e-9;

/// 迎撃機の発射パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptSolution {
    pub angle_deg: f64,
    pub speed: f64,
}

/// 発射点から目標への水平・鉛直距離 (dx, dy)
///
/// dy は画面座標（下向き正）を上向き正に読み替えた値。
fn offsets(launch: Position2D, target: Position2D) -> (f64, f64) {
    (target.x - launch.x, launch.y - target.y)
}

/// 発射点から目標への発射角（度）
pub fn calculate_angle(launch: Position2D, target: Position2D) -> f64 {
    let (dx, dy) = offsets(launch, target);
    math_utils::to_degrees(dy.atan2(dx))
}

/// 発射角 `angle_rad` で (dx, dy) を通る放物線の初速
pub fn ballistic_speed(dx: f64, dy: f64, angle_rad: f64, gravity: f64) -> Result<f64, SimError> {
    let cos = angle_rad.cos();
    let denominator = 2.0 * (dy - dx * angle_rad.tan()) * cos * cos;
    let scale = dx.abs().max(dy.abs()).max(1.0);

    if !denominator.is_finite() || denominator.abs() <= SINGULARITY_EPSILON * scale {
        return Err(SimError::InvalidGeometry { dx, dy });
    }

    let radicand = gravity * dx * dx / denominator;
    if !radicand.is_finite() || radicand <= 0.0 {
        return Err(SimError::InvalidGeometry { dx, dy });
    }

    let speed = radicand.sqrt();
    if speed.is_finite() {
        Ok(speed)
    } else {
        Err(SimError::InvalidGeometry { dx, dy })
    }
}

/// 発射点から目標を狙う発射速度
pub fn calculate_speed(
    launch: Position2D,
    target: Position2D,
    gravity: f64,
) -> Result<f64, SimError> {
    let (dx, dy) = offsets(launch, target);
    let angle_rad = math_utils::to_radians(calculate_angle(launch, target));
    ballistic_speed(dx, dy, angle_rad, gravity)
}

/// 迎撃解を求める
pub fn solve(
    launch: Position2D,
    target: Position2D,
    gravity: f64,
) -> Result<InterceptSolution, SimError> {
    let angle_deg = calculate_angle(launch, target);
    let speed = calculate_speed(launch, target, gravity)?;
    Ok(InterceptSolution { angle_deg, speed })
}
