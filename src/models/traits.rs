use crate::models::common::*;

/// 重力下で移動するエンティティのインターフェース
pub trait IMovable {
    /// 1ティック分の移動（位置 += 速度、その後 鉛直速度 += 重力）
    fn integrate(&mut self, gravity: f64);

    /// 現在位置の取得
    fn get_position(&self) -> Position2D;

    /// 現在速度の取得
    fn get_velocity(&self) -> Velocity2D;

    /// 物理更新の対象かどうか
    fn is_active(&self) -> bool;

    /// 非アクティブ化
    fn deactivate(&mut self, reason: EndReason);
}
