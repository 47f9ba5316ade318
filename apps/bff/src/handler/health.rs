//! # ヘルスチェックハンドラ
//!
//! BFF の稼働状態を確認するためのエンドポイント。
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（認証プロバイダとデータストアの疎通を確認）
//!
//! レスポンス型は [`tally_shared::HealthResponse`] / [`tally_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tally_shared::{CheckStatus, HealthResponse, ReadinessResponse};

use crate::client::{AuthProviderClient, ItemStoreClient, ProviderError};

/// 依存サービス 1 件あたりのチェック上限
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// BFF のヘルスチェックエンドポイント
#[utoipa::path(
   get,
   path = "/health",
   tag = "health",
   responses(
      (status = 200, description = "サーバー稼働中", body = HealthResponse)
   )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub auth_provider: Arc<dyn AuthProviderClient>,
    pub item_store:    Arc<dyn ItemStoreClient>,
}

/// BFF の Readiness Check エンドポイント
///
/// 認証プロバイダとデータストアを並行チェックする。
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[utoipa::path(
   get,
   path = "/health/ready",
   tag = "health",
   responses(
      (status = 200, description = "全依存サービス稼働中", body = ReadinessResponse),
      (status = 503, description = "一部の依存サービスが利用不可", body = ReadinessResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let (auth_result, store_result) = tokio::join!(
        check("auth_provider", state.auth_provider.check_health()),
        check("data_store", state.item_store.check_health()),
    );

    let mut checks = HashMap::new();
    checks.insert("auth_provider".to_string(), auth_result);
    checks.insert("data_store".to_string(), store_result);

    let response = ReadinessResponse::from_checks(checks);
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

/// 個別チェックをタイムアウト付きで実行する
async fn check(
    name: &'static str,
    request: impl Future<Output = Result<(), ProviderError>>,
) -> CheckStatus {
    match tokio::time::timeout(CHECK_TIMEOUT, request).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(check = name, error = %e, "readiness check failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!(check = name, "readiness check timed out");
            CheckStatus::Error
        }
    }
}
