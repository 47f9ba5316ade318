//! カテゴリ・支出上限ハンドラ

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use tally_domain::category::{CategoryName, SpendLimit};
use tally_shared::{
    ApiResponse,
    ErrorResponse,
    event_log::{error::kind, event},
    log_business_event,
};
use utoipa::ToSchema;

use super::{LedgerState, MoneyInput};
use crate::{
    client::StoreRow,
    error::{ApiError, detail, log_provider_error},
    middleware::{ValidatedJson, VerifiedUser},
};

/// 支出上限の作成・更新リクエスト
#[derive(Debug, Deserialize, ToSchema)]
pub struct SpendLimitRequest {
    #[serde(default)]
    pub id:         Option<i64>,
    pub category:   String,
    #[schema(value_type = String, example = "300.00")]
    pub limit:      MoneyInput,
    /// `Yearly` / `Monthly` / `Weekly` / `Daily`
    pub time_frame: String,
}

/// GET /categories
#[utoipa::path(
   get,
   path = "/categories",
   tag = "categories",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "カテゴリ一覧", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "データストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_categories(
    State(state): State<Arc<LedgerState>>,
    user: VerifiedUser,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    match state.ledger_store.list_categories(&user.access_token).await {
        Ok(rows) => Ok(Json(ApiResponse::new(rows))),
        Err(e) => {
            log_provider_error("カテゴリ一覧取得", kind::LEDGER_STORE, &e);
            Err(ApiError::Resource(detail::GET_CATEGORIES_FAILED.to_string()))
        }
    }
}

/// GET /category-spend-limits
#[utoipa::path(
   get,
   path = "/category-spend-limits",
   tag = "categories",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "呼び出し元の支出上限一覧", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "データストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_spend_limits(
    State(state): State<Arc<LedgerState>>,
    user: VerifiedUser,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    match state
        .ledger_store
        .list_spend_limits(&user.access_token, &user.id)
        .await
    {
        Ok(rows) => Ok(Json(ApiResponse::new(rows))),
        Err(e) => {
            log_provider_error("支出上限一覧取得", kind::LEDGER_STORE, &e);
            Err(ApiError::Resource(detail::GET_SPEND_LIMITS_FAILED.to_string()))
        }
    }
}

/// PUT /category-spend-limits
///
/// `id` を指定すると、呼び出し元が所有する既存の上限の更新になる。
#[utoipa::path(
   put,
   path = "/category-spend-limits",
   tag = "categories",
   security(("bearer_auth" = [])),
   request_body = SpendLimitRequest,
   responses(
      (status = 200, description = "書き込まれた支出上限", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "リクエストボディ不正、またはデータストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_spend_limit(
    State(state): State<Arc<LedgerState>>,
    user: VerifiedUser,
    ValidatedJson(req): ValidatedJson<SpendLimitRequest>,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    let limit = SpendLimit::new(
        req.id,
        &user.id,
        CategoryName::new(req.category)?,
        &req.limit.into_price()?,
        req.time_frame.parse()?,
    );

    let rows = match state
        .ledger_store
        .upsert_spend_limit(&user.access_token, &limit)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            log_provider_error("支出上限保存", kind::LEDGER_STORE, &e);
            return Err(ApiError::Resource(format!(
                "PUT category spend limit failed: {e}"
            )));
        }
    };

    log_business_event!(
        event.category = event::category::CATEGORY,
        event.action = event::action::SPEND_LIMIT_SAVED,
        event.entity_type = event::entity_type::SPEND_LIMIT,
        event.entity_id = %limit.category(),
        event.actor_id = %user.id,
        event.result = event::result::SUCCESS,
        "支出上限保存"
    );

    Ok(Json(ApiResponse::new(rows)))
}
