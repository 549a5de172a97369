//! ミサイル攻撃／防衛デモ
//!
//! 攻撃・防衛・監視の3タスクが有界キューとコマンドチャネルで協調し、
//! ミサイルと迎撃機の弾道・着弾・迎撃を固定周期で模擬します。

pub mod logging;
pub mod models;
pub mod queue;
pub mod scenario;
pub mod simulation;
pub mod world;
