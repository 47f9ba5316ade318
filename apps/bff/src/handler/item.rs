//! # アイテムハンドラ
//!
//! `items` コレクションの一覧・作成を外部データストアへ転送する。
//!
//! ## エンドポイント
//!
//! - `GET /items` - 全件取得
//! - `POST /items` - 1 件作成
//!
//! どちらも Bearer 検証済みの呼び出し元のみが利用できる。
//! コレクションは検証済みユーザー全員で共有する（所有者による絞り込みはしない）。

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use tally_domain::item::NewItem;
use tally_shared::{
    ApiResponse,
    ErrorResponse,
    event_log::{error::kind, event},
    log_business_event,
};
use utoipa::ToSchema;

use crate::{
    client::{StoreRow, ItemStoreClient},
    error::{ApiError, detail, log_provider_error},
    middleware::{ValidatedJson, VerifiedUser},
};

/// アイテムハンドラの共有状態
pub struct ItemState {
    pub item_store: Arc<dyn ItemStoreClient>,
}

/// アイテム作成リクエスト
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name:        String,
    pub description: String,
    /// 十進数の文字列（例: `"1.50"`）。受け取った表記のまま保存する
    #[schema(example = "1.50")]
    pub price:       String,
}

/// GET /items
#[utoipa::path(
   get,
   path = "/items",
   tag = "items",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "アイテム一覧", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "データストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_items(
    State(state): State<Arc<ItemState>>,
    user: VerifiedUser,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    match state.item_store.list_items(&user.access_token).await {
        Ok(rows) => Ok(Json(ApiResponse::new(rows))),
        Err(e) => {
            log_provider_error("アイテム一覧取得", kind::ITEM_STORE, &e);
            Err(ApiError::Resource(detail::GET_ITEMS_FAILED.to_string()))
        }
    }
}

/// POST /items
///
/// ## リクエストボディ
///
/// ```json
/// {
///   "name": "Pen",
///   "description": "Blue ink",
///   "price": "1.50"
/// }
/// ```
///
/// ボディが不正な場合はデータストアを呼ばずに 400 を返す。
#[utoipa::path(
   post,
   path = "/items",
   tag = "items",
   security(("bearer_auth" = [])),
   request_body = CreateItemRequest,
   responses(
      (status = 200, description = "作成されたアイテム", body = ApiResponse<Vec<StoreRow>>),
      (status = 400, description = "リクエストボディ不正、またはデータストアの失敗", body = ErrorResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_item(
    State(state): State<Arc<ItemState>>,
    user: VerifiedUser,
    ValidatedJson(req): ValidatedJson<CreateItemRequest>,
) -> Result<Json<ApiResponse<Vec<StoreRow>>>, ApiError> {
    let item = NewItem::new(req.name, req.description, req.price)?;

    let rows = match state.item_store.insert_item(&user.access_token, &item).await {
        Ok(rows) => rows,
        Err(e) => {
            log_provider_error("アイテム作成", kind::ITEM_STORE, &e);
            return Err(ApiError::Resource(format!("POST item failed: {e}")));
        }
    };

    log_business_event!(
        event.category = event::category::ITEM,
        event.action = event::action::ITEM_CREATED,
        event.entity_type = event::entity_type::ITEM,
        event.actor_id = %user.id,
        event.result = event::result::SUCCESS,
        "アイテム作成"
    );

    Ok(Json(ApiResponse::new(rows)))
}
