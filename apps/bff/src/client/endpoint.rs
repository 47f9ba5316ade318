//! プロバイダ接続情報とリクエストビルダー

use reqwest::{Method, RequestBuilder};

use crate::middleware::request_id::inject_request_id;

/// プロバイダの接続先
///
/// 認証 API とデータ API は同じプロジェクト URL・API キーを共有するため、
/// 両クライアントでこの構造体を使い回す。`reqwest::Client` は内部で
/// コネクションプールを持つので clone して共有する。
#[derive(Clone)]
pub struct ProviderEndpoint {
    base_url: String,
    api_key:  String,
    client:   reqwest::Client,
}

impl ProviderEndpoint {
    /// 新しい接続先を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: プロジェクト URL（例: `https://xyzcompany.supabase.co`）
    /// - `api_key`: プロジェクトの API キー
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key:  api_key.to_string(),
            client:   reqwest::Client::new(),
        }
    }

    /// プロバイダ向けリクエストを組み立てる
    ///
    /// `apikey` ヘッダーは常に付与する。`Authorization: Bearer` には
    /// ユーザーのアクセストークンがあればそれを、なければ API キーを使う。
    /// task-local の Request ID があれば `X-Request-Id` として伝播する。
    pub(super) fn request(
        &self,
        method: Method,
        path: &str,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let bearer = access_token.unwrap_or(&self.api_key);

        let builder = self
            .client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer);

        inject_request_id(builder)
    }
}

impl std::fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
