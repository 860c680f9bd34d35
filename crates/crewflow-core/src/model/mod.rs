//! モデル定義
//!
//! crewflowで使用されるデータモデルを定義します。

mod account;
mod roster;

// Re-exports
pub use account::*;
pub use roster::*;
