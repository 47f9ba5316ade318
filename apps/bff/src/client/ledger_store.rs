//! # 家計簿ストアクライアント
//!
//! 呼び出し元ユーザーが所有する取引・支出上限と、共有のカテゴリを
//! データ API（Supabase PostgREST）で読み書きする。
//!
//! ## エンドポイント
//!
//! - `GET /rest/v1/transaction?select=*,category(name)&user_id=eq.<id>&order=date`
//! - `POST /rest/v1/transaction` - 新規取引（`id` なし）
//! - `PATCH /rest/v1/transaction?id=eq.<id>&user_id=eq.<id>` - 既存取引の更新
//! - `DELETE /rest/v1/transaction?user_id=eq.<id>&id=in.(...)`
//! - `GET /rest/v1/category?select=*`
//! - `GET /rest/v1/category_spend_limit?user_id=eq.<id>`
//! - `POST` / `PATCH /rest/v1/category_spend_limit` - 支出上限の作成・更新
//!
//! 所有者で絞り込む呼び出しは、行レベルポリシーとは別に必ず `user_id` の
//! フィルタを付ける。更新で対象行が 1 件も無ければ [`ProviderError::NotFound`]。

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use tally_domain::{category::SpendLimit, transaction::TransactionUpsert};

use super::{
    endpoint::ProviderEndpoint,
    error::ProviderError,
    response::handle_response,
    row::StoreRow,
};

const TRANSACTION_PATH: &str = "/rest/v1/transaction";
const CATEGORY_PATH: &str = "/rest/v1/category";
const SPEND_LIMIT_PATH: &str = "/rest/v1/category_spend_limit";

/// 取引行に付けるカテゴリの埋め込み
const TRANSACTION_SELECT: &str = "*,category(name)";
const SPEND_LIMIT_SELECT: &str = "id,category,limit,time_frame";

/// 家計簿ストアクライアントトレイト
///
/// `user_id` は Bearer 検証で解決した呼び出し元ユーザー。
#[async_trait]
pub trait LedgerStoreClient: Send + Sync {
    /// 呼び出し元の取引を日付順に取得する
    async fn list_transactions(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<StoreRow>, ProviderError>;

    /// 取引を作成または更新し、書き込まれた行を返す
    async fn upsert_transaction(
        &self,
        access_token: &str,
        row: &TransactionUpsert,
    ) -> Result<Vec<StoreRow>, ProviderError>;

    /// 呼び出し元の取引のうち `ids` に含まれるものを削除し、削除された行を返す
    async fn delete_transactions(
        &self,
        access_token: &str,
        user_id: &str,
        ids: &[i64],
    ) -> Result<Vec<StoreRow>, ProviderError>;

    /// カテゴリの全件を取得する
    async fn list_categories(&self, access_token: &str) -> Result<Vec<StoreRow>, ProviderError>;

    /// 呼び出し元の支出上限を取得する
    async fn list_spend_limits(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<StoreRow>, ProviderError>;

    /// 支出上限を作成または更新し、書き込まれた行を返す
    async fn upsert_spend_limit(
        &self,
        access_token: &str,
        limit: &SpendLimit,
    ) -> Result<Vec<StoreRow>, ProviderError>;
}

/// Supabase PostgREST クライアント実装
#[derive(Debug, Clone)]
pub struct SupabaseLedgerStore {
    endpoint: ProviderEndpoint,
}

impl SupabaseLedgerStore {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    fn list_transactions_request(&self, access_token: &str, user_id: &str) -> RequestBuilder {
        self.endpoint
            .request(Method::GET, TRANSACTION_PATH, Some(access_token))
            .query(&[
                ("select", TRANSACTION_SELECT.to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "date".to_string()),
            ])
    }

    /// `id` があれば所有者で絞り込んだ PATCH、なければ POST
    fn upsert_transaction_request(
        &self,
        access_token: &str,
        row: &TransactionUpsert,
    ) -> RequestBuilder {
        let builder = match row.id {
            Some(id) => self
                .endpoint
                .request(Method::PATCH, TRANSACTION_PATH, Some(access_token))
                .query(&owned_row_filter(id, &row.user_id))
                .json(row),
            None => self
                .endpoint
                .request(Method::POST, TRANSACTION_PATH, Some(access_token))
                .json(&[row]),
        };

        builder
            .query(&[("select", TRANSACTION_SELECT)])
            .header("Prefer", "return=representation")
    }

    fn delete_transactions_request(
        &self,
        access_token: &str,
        user_id: &str,
        ids: &[i64],
    ) -> RequestBuilder {
        let ids = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        self.endpoint
            .request(Method::DELETE, TRANSACTION_PATH, Some(access_token))
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("id", format!("in.({ids})")),
            ])
            .header("Prefer", "return=representation")
    }

    fn upsert_spend_limit_request(&self, access_token: &str, limit: &SpendLimit) -> RequestBuilder {
        let builder = match limit.id() {
            Some(id) => self
                .endpoint
                .request(Method::PATCH, SPEND_LIMIT_PATH, Some(access_token))
                .query(&owned_row_filter(id, limit.user_id()))
                .json(limit),
            None => self
                .endpoint
                .request(Method::POST, SPEND_LIMIT_PATH, Some(access_token))
                .json(&[limit]),
        };

        builder
            .query(&[("select", SPEND_LIMIT_SELECT)])
            .header("Prefer", "return=representation")
    }
}

/// 行 ID と所有者の両方で絞り込むフィルタ
fn owned_row_filter(id: i64, user_id: &str) -> [(&'static str, String); 2] {
    [("id", format!("eq.{id}")), ("user_id", format!("eq.{user_id}"))]
}

/// 更新で対象行が無かった場合は `NotFound`
fn require_written(rows: Vec<StoreRow>) -> Result<Vec<StoreRow>, ProviderError> {
    if rows.is_empty() {
        return Err(ProviderError::NotFound);
    }
    Ok(rows)
}

#[async_trait]
impl LedgerStoreClient for SupabaseLedgerStore {
    async fn list_transactions(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .list_transactions_request(access_token, user_id)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn upsert_transaction(
        &self,
        access_token: &str,
        row: &TransactionUpsert,
    ) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .upsert_transaction_request(access_token, row)
            .send()
            .await?;

        require_written(handle_response(response).await?)
    }

    async fn delete_transactions(
        &self,
        access_token: &str,
        user_id: &str,
        ids: &[i64],
    ) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .delete_transactions_request(access_token, user_id, ids)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn list_categories(&self, access_token: &str) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .endpoint
            .request(Method::GET, CATEGORY_PATH, Some(access_token))
            .query(&[("select", "*")])
            .send()
            .await?;

        handle_response(response).await
    }

    async fn list_spend_limits(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .endpoint
            .request(Method::GET, SPEND_LIMIT_PATH, Some(access_token))
            .query(&[
                ("select", SPEND_LIMIT_SELECT.to_string()),
                ("user_id", format!("eq.{user_id}")),
            ])
            .send()
            .await?;

        handle_response(response).await
    }

    async fn upsert_spend_limit(
        &self,
        access_token: &str,
        limit: &SpendLimit,
    ) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .upsert_spend_limit_request(access_token, limit)
            .send()
            .await?;

        require_written(handle_response(response).await?)
    }
}
