//! # アイテムストアクライアント
//!
//! BFF からデータ API（Supabase PostgREST）の `items` コレクションへの通信を担当する。
//!
//! ## エンドポイント
//!
//! - `GET /rest/v1/items?select=*` - 全件取得
//! - `POST /rest/v1/items` - 1 件挿入（挿入行を返す）
//! - `GET /rest/v1/` - 稼働確認
//!
//! 行はプロバイダのスキーマのまま [`StoreRow`] で受け渡す。

use async_trait::async_trait;
use reqwest::Method;
use tally_domain::item::NewItem;

use super::{
    endpoint::ProviderEndpoint,
    error::ProviderError,
    response::{handle_empty_response, handle_response},
    row::StoreRow,
};

/// アイテムストアクライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
/// `access_token` は検証済みの呼び出し元トークンで、プロバイダ側の行レベル
/// ポリシーはこのトークンで評価される。
#[async_trait]
pub trait ItemStoreClient: Send + Sync {
    /// コレクションの全行を取得する
    async fn list_items(&self, access_token: &str) -> Result<Vec<StoreRow>, ProviderError>;

    /// 1 件挿入し、挿入された行を返す
    async fn insert_item(
        &self,
        access_token: &str,
        item: &NewItem,
    ) -> Result<Vec<StoreRow>, ProviderError>;

    /// 稼働確認
    async fn check_health(&self) -> Result<(), ProviderError>;
}

/// Supabase PostgREST クライアント実装
#[derive(Debug, Clone)]
pub struct SupabaseItemStore {
    endpoint: ProviderEndpoint,
}

impl SupabaseItemStore {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    /// 挿入リクエスト（1 要素の配列ボディ、挿入行を返させる `Prefer` 付き）
    fn insert_request(&self, access_token: &str, item: &NewItem) -> reqwest::RequestBuilder {
        self.endpoint
            .request(Method::POST, "/rest/v1/items", Some(access_token))
            .header("Prefer", "return=representation")
            .json(&[item])
    }
}

#[async_trait]
impl ItemStoreClient for SupabaseItemStore {
    async fn list_items(&self, access_token: &str) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self
            .endpoint
            .request(Method::GET, "/rest/v1/items?select=*", Some(access_token))
            .send()
            .await?;

        handle_response(response).await
    }

    async fn insert_item(
        &self,
        access_token: &str,
        item: &NewItem,
    ) -> Result<Vec<StoreRow>, ProviderError> {
        let response = self.insert_request(access_token, item).send().await?;

        handle_response(response).await
    }

    async fn check_health(&self) -> Result<(), ProviderError> {
        let response = self
            .endpoint
            .request(Method::GET, "/rest/v1/", None)
            .send()
            .await?;

        handle_empty_response(response).await
    }
}
