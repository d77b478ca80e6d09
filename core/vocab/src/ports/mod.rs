//! ポート（usecase と外界の境界）

pub mod inbound;
pub mod outbound;
