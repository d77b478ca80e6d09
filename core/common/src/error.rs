//! エラーハンドリング
//!
//! 全レイヤー共通のエラー型。終了コードは sysexits.h に合わせる。

use thiserror::Error as ThisError;

/// エラー型
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// 引数・パラメータ不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    /// 環境変数・設定の不足
    #[error("{0}")]
    Env(String),
    /// ファイル I/O
    #[error("{0}")]
    Io(String),
    /// JSON のシリアライズ／パース
    #[error("{0}")]
    Json(String),
    /// HTTP / ネットワーク（上流への到達失敗や非 2xx）
    #[error("{0}")]
    Http(String),
    /// 上流の応答にテキストが含まれていない
    #[error("{0}")]
    EmptyResponse(String),
    /// 呼び出し側からの中断（Ctrl+C 等）
    #[error("interrupted")]
    Interrupted,
    /// その他のシステムエラー
    #[error("{0}")]
    System(String),
}

impl Error {
    /// 引数不正エラー
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// usage を併せて表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// 上流との通信に起因するエラーか（リトライ対象）
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::EmptyResponse(_) | Self::Interrupted)
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Json(_) => 65,
            Self::Http(_) | Self::EmptyResponse(_) => 69,
            Self::System(_) => 70,
            Self::Io(_) => 74,
            Self::Env(_) => 78,
            Self::Interrupted => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = Error::invalid_argument("test");
        assert_eq!(err.to_string(), "test");
        assert_eq!(err.exit_code(), 64);
        assert!(err.is_usage());

        let err = Error::system("test");
        assert_eq!(err.to_string(), "test");
        assert_eq!(err.exit_code(), 70);
        assert!(!err.is_usage());
    }

    #[test]
    fn test_transport_classification() {
        assert!(Error::http("503").is_transport());
        assert!(Error::empty_response("no text").is_transport());
        assert!(Error::Interrupted.is_transport());
        assert!(!Error::json("bad").is_transport());
        assert!(!Error::env("GEMINI_API_KEY").is_transport());
    }

    #[test]
    fn test_interrupted_exit_code() {
        let err = Error::Interrupted;
        assert!(err.is_interrupted());
        assert_eq!(err.exit_code(), 130);
        assert_eq!(err.to_string(), "interrupted");
    }
}
