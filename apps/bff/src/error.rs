//! # BFF エラーハンドリング
//!
//! HTTP API のエラー定義と、axum レスポンスへの変換。
//!
//! ハンドラ・ミドルウェア・エクストラクタはすべて [`ApiError`] を返し、
//! レスポンスへの変換は [`IntoResponse`] の 1 箇所で行う。
//!
//! | 種別 | HTTP ステータス | `type` |
//! |------|----------------|--------|
//! | `Authentication` | 401 | `.../authentication-failed` |
//! | `Validation` | 400 | `.../validation-error` |
//! | `Resource` | 400 | `.../resource-error` |

use std::fmt::Display;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tally_shared::{ErrorResponse, event_log::error as log_error};
use thiserror::Error;

use crate::client::ProviderError;

/// レスポンスの `detail` に載る固定メッセージ
pub mod detail {
    pub const AUTHENTICATION_FAILED: &str = "Authentication failed";
    pub const NO_REFRESH_TOKEN: &str = "No refresh token provided";
    pub const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
    pub const NOT_AUTHENTICATED: &str = "Not authenticated";
    pub const GET_ITEMS_FAILED: &str = "GET items failed";
    pub const GET_TRANSACTIONS_FAILED: &str = "GET transactions failed";
    pub const GET_CATEGORIES_FAILED: &str = "GET categories failed";
    pub const GET_SPEND_LIMITS_FAILED: &str = "GET category spend limits failed";
}

/// BFF の API エラー
///
/// 値は `detail` に載るメッセージ。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 認証・セッション関連の失敗（401）
    #[error("{0}")]
    Authentication(String),

    /// リクエストボディの形状・値の不正（400）
    #[error("{0}")]
    Validation(String),

    /// 外部データストアの失敗（400）
    #[error("{0}")]
    Resource(String),
}

impl ApiError {
    /// 資格情報・セッション発行の失敗
    pub fn authentication_failed() -> Self {
        Self::Authentication(detail::AUTHENTICATION_FAILED.to_string())
    }

    /// Bearer トークンが無い、または形式が不正
    pub fn not_authenticated() -> Self {
        Self::Authentication(detail::NOT_AUTHENTICATED.to_string())
    }

    /// Bearer トークンをプロバイダが受け付けなかった
    pub fn invalid_token(reason: impl Display) -> Self {
        Self::Authentication(format!("Invalid or expired token: {reason}"))
    }

    /// リクエストボディを解釈できなかった
    pub fn invalid_request_body(reason: impl Display) -> Self {
        Self::Validation(format!("Invalid request body: {reason}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Resource(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Authentication(detail) => ErrorResponse::authentication_failed(detail),
            Self::Validation(detail) => ErrorResponse::validation_error(detail),
            Self::Resource(detail) => ErrorResponse::resource_error(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_response())).into_response()
    }
}

impl From<tally_domain::DomainError> for ApiError {
    fn from(err: tally_domain::DomainError) -> Self {
        Self::invalid_request_body(err)
    }
}

// --- 共通ヘルパー関数 ---

/// `Authorization: Bearer <token>` からトークンを取り出す
///
/// スキーム名は大文字小文字を区別しない。ヘッダーが無い、スキームが違う、
/// トークンが空の場合は `None`。
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// プロバイダエラーをログに出す
///
/// プロバイダ側・経路側の障害は `error.category` / `error.kind` 付きで `error` レベル、
/// 入力や認証情報に起因するものは `debug` レベルで出力する。
pub fn log_provider_error(context: &str, kind: &'static str, err: &ProviderError) {
    if err.is_server_side() {
        tracing::error!(
            error.category = log_error::category::EXTERNAL_SERVICE,
            error.kind = kind,
            "{}で外部サービスエラー: {}",
            context,
            err
        );
    } else {
        tracing::debug!(error.kind = kind, "{}でプロバイダが拒否: {}", context, err);
    }
}
