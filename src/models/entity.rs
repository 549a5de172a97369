use crate::models::{
    traits::IMovable,
    common::{Position2D, Velocity2D, EntityRole, EndReason, math_utils},
};

/// ミサイル／迎撃機エンティティ
///
/// ミサイルと迎撃機は同じ属性を持ち、固定長スロットに格納されて
/// インデックス単位で再利用されます。非アクティブなエンティティの
/// 位置と速度は古い値であり、再発射されるまで参照してはいけません。
#[derive(Debug, Clone)]
pub struct Entity {
    pub role: EntityRole,
    pub position: Position2D,
    pub velocity: Velocity2D,
    /// 発射角（度）
    pub launch_angle: f64,
    /// 発射速度（1ティックあたり）
    pub launch_speed: f64,
    pub active: bool,
    /// 防衛エリアを狙っているか（ミサイルのみ）
    pub targeted: bool,
    pub end_reason: Option<EndReason>,
}

/// 他タスクへ渡すための読み取り専用コピー
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub slot: usize,
    pub active: bool,
    pub targeted: bool,
    /// アクティブな場合のみ Some
    pub position: Option<Position2D>,
}

impl Entity {
    /// 未使用スロット用の非アクティブなエンティティ
    pub fn inactive(role: EntityRole) -> Self {
        Self {
            role,
            position: Position2D::default(),
            velocity: Velocity2D::default(),
            launch_angle: 0.0,
            launch_speed: 0.0,
            active: false,
            targeted: false,
            end_reason: None,
        }
    }

    /// エンティティを発射する
    ///
    /// 位置を発射点に設定し、角度と速度から速度ベクトルを求めます。
    /// 迎撃機は反対側の画面端から発射されるため水平成分の符号が反転します。
    /// 入力値の検証は行いません。`targeted` はここでは解除のみ行い、
    /// 判定は防衛エリアを知っている呼び出し側が行います。
    pub fn launch(&mut self, origin: Position2D, angle_deg: f64, speed: f64) {
        let angle_rad = math_utils::to_radians(angle_deg);
        let direction = match self.role {
            EntityRole::Missile => 1.0,
            EntityRole::Interceptor => -1.0,
        };

        self.position = origin;
        self.launch_angle = angle_deg;
        self.launch_speed = speed;
        self.velocity = Velocity2D::new(
            direction * speed * angle_rad.cos(),
            speed * angle_rad.sin(),
        );
        self.active = true;
        self.targeted = false;
        self.end_reason = None;
    }

    pub fn snapshot(&self, slot: usize) -> EntitySnapshot {
        EntitySnapshot {
            slot,
            active: self.active,
            targeted: self.active && self.targeted,
            position: self.active.then_some(self.position),
        }
    }
}

impl IMovable for Entity {
    fn integrate(&mut self, gravity: f64) {
        self.position = self.position + self.velocity;
        self.velocity.y += gravity;
    }

    fn get_position(&self) -> Position2D {
        self.position
    }

    fn get_velocity(&self) -> Velocity2D {
        self.velocity
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self, reason: EndReason) {
        self.active = false;
        self.end_reason = Some(reason);
    }
}
