//! 難易度（レコード単位の tier と、リクエスト単位の指定）

use common::error::Error;
use serde::{Serialize, Serializer};

/// レコードが持つ難易度。文字列表現は完全一致のみ受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Professional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Professional => "Professional",
        }
    }

    /// 応答中のリテラルを解釈する（大文字小文字・前後空白の違いも不可）
    pub fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DifficultyTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// リクエストで指定する難易度。Progressive は 4 段階を混ぜて出させる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedDifficulty {
    Tier(DifficultyTier),
    Progressive,
}

impl RequestedDifficulty {
    pub const PROGRESSIVE_LABEL: &'static str = "From Beginner to Professional";

    /// CLI / バッチファイルの値を解釈する（こちらは大文字小文字を区別しない）
    pub fn parse(s: &str) -> Result<Self, Error> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("progressive") || t.eq_ignore_ascii_case(Self::PROGRESSIVE_LABEL)
        {
            return Ok(Self::Progressive);
        }
        DifficultyTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(t))
            .map(Self::Tier)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "Invalid difficulty: '{}'. Expected one of: Beginner, Intermediate, Advanced, Professional, Progressive",
                    s
                ))
            })
    }
}

impl Default for RequestedDifficulty {
    fn default() -> Self {
        Self::Tier(DifficultyTier::Intermediate)
    }
}

impl From<DifficultyTier> for RequestedDifficulty {
    fn from(t: DifficultyTier) -> Self {
        Self::Tier(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_literal_is_exact() {
        assert_eq!(DifficultyTier::from_literal("Advanced"), Some(DifficultyTier::Advanced));
        assert_eq!(DifficultyTier::from_literal("advanced"), None);
        assert_eq!(DifficultyTier::from_literal(" Advanced"), None);
        assert_eq!(DifficultyTier::from_literal("Expert"), None);
    }

    #[test]
    fn test_serialize_as_literal() {
        let v = serde_json::to_value(DifficultyTier::Professional).unwrap();
        assert_eq!(v, serde_json::json!("Professional"));
    }

    #[test]
    fn test_requested_difficulty_parse() {
        assert_eq!(
            RequestedDifficulty::parse("beginner").unwrap(),
            RequestedDifficulty::Tier(DifficultyTier::Beginner)
        );
        assert_eq!(
            RequestedDifficulty::parse("From Beginner to Professional").unwrap(),
            RequestedDifficulty::Progressive
        );
        assert_eq!(
            RequestedDifficulty::parse("progressive").unwrap(),
            RequestedDifficulty::Progressive
        );
        let err = RequestedDifficulty::parse("hard").unwrap_err();
        assert!(err.is_usage());
    }
}
