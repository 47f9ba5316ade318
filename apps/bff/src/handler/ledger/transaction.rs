//! 取引ハンドラ

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use tally_domain::{
    category::CategoryName,
    transaction::{TransactionDate, TransactionDescription, TransactionDraft},
};
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

/// 取引の作成・更新リクエスト
///
/// `id` を指定すると、呼び出し元が所有する既存取引の更新になる。
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionRequest {
    #[serde(default)]
    pub id:          Option<i64>,
    /// 文字列（桁区切り可）または数値
    #[schema(value_type = String, example = "1,250.00")]
    pub amount:      MoneyInput,
    pub category:    String,
    #[schema(example = "2026-04-01")]
    pub date:        String,
    pub description: String,
    #[serde(default)]
    pub merchant:    Option<String>,
    #[serde(default)]
    pub notes:       Option<String>,
    /// `Pending` / `Complete` / `Canceled`
    pub status:      String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub subtotal:    Option<MoneyInput>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub tax:         Option<MoneyInput>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub tip:         Option<MoneyInput>,
    /// `Income` / `Expense`
    #[serde(rename = "type")]
    pub kind:        String,
}

impl TransactionRequest {
    fn into_draft(self) -> Result<TransactionDraft, ApiError> {
        Ok(TransactionDraft {
            id:          self.id,
            amount:      self.amount.into_price()?,
            category:    CategoryName::new(self.category)?,
            date:        TransactionDate::new(self.date)?,
            description: TransactionDescription::new(self.description)?,
            merchant:    self.merchant,
            notes:       self.notes,
            status:      self.status.parse()?,
            subtotal:    MoneyInput::into_optional_price(self.subtotal)?,
            tax:         MoneyInput::into_optional_price(self.tax)?,
            tip:         MoneyInput::into_optional_price(self.tip)?,
            kind:        self.kind.parse()?,
        })
    }
}

/// GET /transactions
#[utoipa::path(
   get,
   path = "/transactions",
   tag = "transactions",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "呼び出し元の取引一覧（日付順、カテゴリ名付き）", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "データストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_transactions(
    State(state): State<Arc<LedgerState>>,
    user: VerifiedUser,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    match state
        .ledger_store
        .list_transactions(&user.access_token, &user.id)
        .await
    {
        Ok(rows) => Ok(Json(ApiResponse::new(rows))),
        Err(e) => {
            log_provider_error("取引一覧取得", kind::LEDGER_STORE, &e);
            Err(ApiError::Resource(detail::GET_TRANSACTIONS_FAILED.to_string()))
        }
    }
}

/// PUT /transactions
///
/// ## リクエストボディ
///
/// ```json
/// {
///   "amount": "1,250.00",
///   "category": "groceries",
///   "date": "2026-04-01",
///   "description": "Weekly shop",
///   "status": "Complete",
///   "type": "Expense"
/// }
/// ```
///
/// `user_id` と `updated_at` は BFF が埋める。
#[utoipa::path(
   put,
   path = "/transactions",
   tag = "transactions",
   security(("bearer_auth" = [])),
   request_body = TransactionRequest,
   responses(
      (status = 200, description = "書き込まれた取引", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "リクエストボディ不正、またはデータストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_transaction(
    State(state): State<Arc<LedgerState>>,
    user: VerifiedUser,
    ValidatedJson(req): ValidatedJson<TransactionRequest>,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    let row = req.into_draft()?.into_upsert(&user.id, Utc::now());

    let rows = match state
        .ledger_store
        .upsert_transaction(&user.access_token, &row)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            log_provider_error("取引保存", kind::LEDGER_STORE, &e);
            return Err(ApiError::Resource(format!("PUT transaction failed: {e}")));
        }
    };

    let entity_id = rows
        .first()
        .and_then(|row| row.field("id"))
        .map(ToString::to_string)
        .unwrap_or_default();
    log_business_event!(
        event.category = event::category::TRANSACTION,
        event.action = event::action::TRANSACTION_SAVED,
        event.entity_type = event::entity_type::TRANSACTION,
        event.entity_id = %entity_id,
        event.actor_id = %user.id,
        event.result = event::result::SUCCESS,
        "取引保存"
    );

    Ok(Json(ApiResponse::new(rows)))
}

/// DELETE /transactions
///
/// ボディは削除する取引 ID の配列（例: `[3, 5]`）。呼び出し元が所有しない ID は
/// 無視され、実際に削除された行だけを返す。
#[utoipa::path(
   delete,
   path = "/transactions",
   tag = "transactions",
   security(("bearer_auth" = [])),
   request_body = Vec<i64>,
   responses(
      (status = 200, description = "削除された取引", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "ID が空、またはデータストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn delete_transactions(
    State(state): State<Arc<LedgerState>>,
    user: VerifiedUser,
    ValidatedJson(ids): ValidatedJson<Vec<i64>>,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    if ids.is_empty() {
        return Err(ApiError::invalid_request_body(
            "at least one transaction id is required",
        ));
    }

    let rows = match state
        .ledger_store
        .delete_transactions(&user.access_token, &user.id, &ids)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            log_provider_error("取引削除", kind::LEDGER_STORE, &e);
            return Err(ApiError::Resource(format!(
                "DELETE transactions failed: {e}"
            )));
        }
    };

    log_business_event!(
        event.category = event::category::TRANSACTION,
        event.action = event::action::TRANSACTIONS_DELETED,
        event.entity_type = event::entity_type::TRANSACTION,
        event.actor_id = %user.id,
        event.result = event::result::SUCCESS,
        deleted = rows.len(),
        "取引削除"
    );

    Ok(Json(ApiResponse::new(rows)))
}
