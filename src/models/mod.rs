// 基本的なデータ型と数学ユーティリティ
pub mod common;

// 移動エンティティのインターフェース（trait）定義
pub mod traits;

// ミサイル／迎撃機、防衛エリア、迎撃照準計算
pub mod entity;
pub mod area;
pub mod intercept;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use entity::{Entity, EntitySnapshot};
pub use area::{Area, generate_areas};
pub use intercept::InterceptSolution;
