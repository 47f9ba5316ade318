//! プロバイダレスポンスの共通ハンドリング

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::error::ProviderError;

/// 認証情報の誤りを表すエラーコード（GoTrue の `error` / `error_code`）
const INVALID_CREDENTIAL_CODES: [&str; 2] = ["invalid_grant", "invalid_credentials"];

/// プロバイダレスポンスの共通ハンドリング
///
/// 成功時はレスポンスボディを `T` にデシリアライズし、
/// エラー時はステータスコードに応じた `ProviderError` を返す。
pub(super) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_error(status, &body))
}

/// ボディを読まずに成否のみを判定する
///
/// サインアウト（204）やヘルスチェックのように、ボディに意味がない呼び出しに使う。
pub(super) async fn handle_empty_response(
    response: reqwest::Response,
) -> Result<(), ProviderError> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_error(status, &body))
}

/// 失敗ステータスとボディから `ProviderError` を組み立てる
fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::BAD_REQUEST if parsed.as_ref().is_some_and(is_invalid_credential) => {
            ProviderError::InvalidCredentials
        }
        StatusCode::NOT_FOUND => ProviderError::NotFound,
        StatusCode::CONFLICT => ProviderError::Conflict(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::Unavailable
        }
        status if status.is_client_error() => ProviderError::Rejected(message),
        status => ProviderError::Unexpected(format!("status {status}: {message}")),
    }
}

/// エラーボディから人間可読なメッセージを取り出す
///
/// GoTrue は `msg` / `error_description`、PostgREST は `message` を使う。
fn error_message(body: &serde_json::Value) -> Option<String> {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn is_invalid_credential(body: &serde_json::Value) -> bool {
    ["error", "error_code"].iter().any(|key| {
        body.get(*key)
            .and_then(|v| v.as_str())
            .is_some_and(|code| INVALID_CREDENTIAL_CODES.contains(&code))
    })
}
