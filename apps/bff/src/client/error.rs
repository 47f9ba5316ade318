//! プロバイダクライアントのエラー型

use thiserror::Error;

/// プロバイダ呼び出しのエラー
///
/// メッセージはそのままレスポンスの `detail` に含まれる場合があるため英語で記述する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// 認証情報・トークンが無効（400 invalid_grant / invalid_credentials）
    #[error("invalid credentials")]
    InvalidCredentials,

    /// リソースが見つからない（404）
    #[error("resource not found")]
    NotFound,

    /// 競合（409）
    #[error("conflict: {0}")]
    Conflict(String),

    /// プロバイダがリクエストを拒否した（その他の 4xx）
    #[error("{0}")]
    Rejected(String),

    /// プロバイダに到達できない、または一時的に利用不可（接続失敗・タイムアウト・502/503/504）
    #[error("provider is unavailable")]
    Unavailable,

    /// 成功レスポンスだが期待した形式ではない
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// 予期しないエラー
    #[error("unexpected provider error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// プロバイダ側・経路側の障害か
    ///
    /// `true` の場合、呼び出し元は `error` レベルでログを出す。
    /// 入力や認証情報に起因するエラーは `false`。
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::MalformedResponse(_) | Self::Unexpected(_)
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ProviderError::Unavailable
        } else if err.is_decode() {
            ProviderError::MalformedResponse(err.to_string())
        } else {
            ProviderError::Unexpected(err.to_string())
        }
    }
}
