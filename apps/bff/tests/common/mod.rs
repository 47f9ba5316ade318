//! テスト共通フィクスチャ
//!
//! 認証プロバイダとデータストアをまとめて模したインメモリ実装と、
//! 本番と同じ構成のルーターを組み立てるヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::{
   collections::HashMap,
   sync::{
      Arc,
      Mutex,
      atomic::{AtomicUsize, Ordering},
   },
};

use async_trait::async_trait;
use axum::{
   Router,
   body::{Body, to_bytes},
   http::{Method, Request, Response, header},
};
use tally_bff::{
   app_builder::build_router,
   client::{
      AuthProviderClient,
      AuthResponse,
      ItemStoreClient,
      LedgerStoreClient,
      ProviderError,
      ProviderSession,
      ProviderUser,
      StoreRow,
   },
   config::BffConfig,
   middleware::request_id::current_request_id,
};
use tally_domain::{
   category::SpendLimit,
   credentials::Credentials,
   item::NewItem,
   transaction::TransactionUpsert,
};

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Default)]
struct State {
   /// email → (user_id, password)
   users:          HashMap<String, (String, String)>,
   /// access_token → user_id
   access_tokens:  HashMap<String, String>,
   /// refresh_token → user_id
   refresh_tokens: HashMap<String, String>,
   items:          Vec<StoreRow>,
   transactions:   Vec<serde_json::Value>,
   spend_limits:   Vec<serde_json::Value>,
   next_row_id:    i64,
}

/// Supabase を模したインメモリプロバイダ
///
/// リフレッシュトークンは一度使うと失効し、サインアウトでそのユーザーの
/// トークンはすべて失効する。
#[derive(Default)]
pub struct InMemorySupabase {
   state:           Mutex<State>,
   sequence:        AtomicUsize,
   /// データストアへの呼び出し回数
   pub store_calls: AtomicUsize,
   /// プロバイダ呼び出し時に見えていた Request ID
   pub request_ids: Mutex<Vec<Option<String>>>,
   /// メール確認なしでサインアップ時にセッションを発行する
   autoconfirm:     bool,
}

impl InMemorySupabase {
   pub fn new() -> Arc<Self> {
      Arc::new(Self::default())
   }

   /// サインアップ応答にセッションを含めるプロバイダ
   pub fn autoconfirm() -> Arc<Self> {
      Arc::new(Self {
         autoconfirm: true,
         ..Self::default()
      })
   }

   /// 登録済みユーザーを用意する
   pub fn with_user(self: Arc<Self>, email: &str, password: &str) -> Arc<Self> {
      let id = self.next_id("user");
      self
         .state
         .lock()
         .unwrap()
         .users
         .insert(email.to_string(), (id, password.to_string()));
      self
   }

   pub fn item_count(&self) -> usize {
      self.state.lock().unwrap().items.len()
   }

   fn next_id(&self, prefix: &str) -> String {
      let n = self.sequence.fetch_add(1, Ordering::SeqCst);
      format!("{prefix}-{n}")
   }

   fn record_request_id(&self) {
      self.request_ids.lock().unwrap().push(current_request_id());
   }

   fn issue_session(&self, state: &mut State, user_id: &str) -> ProviderSession {
      let session = ProviderSession {
         access_token:  self.next_id("access"),
         refresh_token: self.next_id("refresh"),
         expires_in:    3600,
         expires_at:    1_900_000_000,
      };
      state
         .access_tokens
         .insert(session.access_token.clone(), user_id.to_string());
      state
         .refresh_tokens
         .insert(session.refresh_token.clone(), user_id.to_string());
      session
   }

   fn user_by_id(state: &State, user_id: &str) -> ProviderUser {
      let email = state
         .users
         .iter()
         .find(|(_, (id, _))| id == user_id)
         .map(|(email, _)| email.clone());
      ProviderUser {
         id: user_id.to_string(),
         email,
      }
   }

   fn authorize(&self, access_token: &str) -> Result<(), ProviderError> {
      self.owner_of(access_token).map(|_| ())
   }

   /// トークンの持ち主（行レベルポリシーで評価されるユーザー）
   fn owner_of(&self, access_token: &str) -> Result<String, ProviderError> {
      self
         .state
         .lock()
         .unwrap()
         .access_tokens
         .get(access_token)
         .cloned()
         .ok_or_else(|| ProviderError::Rejected("JWT expired".to_string()))
   }

   /// 所有者付きの行を挿入・更新する
   ///
   /// 他人の行として書き込もうとすると行レベルポリシー違反、
   /// 更新対象が呼び出し元の行に無ければ `NotFound`。
   fn write_owned_row(
      &self,
      access_token: &str,
      mut row: serde_json::Value,
      rows: impl Fn(&mut State) -> &mut Vec<serde_json::Value>,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      self.store_calls.fetch_add(1, Ordering::SeqCst);
      self.record_request_id();
      let owner = self.owner_of(access_token)?;
      if row["user_id"] != owner.as_str() {
         return Err(ProviderError::Rejected(
            "new row violates row-level security policy".to_string(),
         ));
      }

      let mut state = self.state.lock().unwrap();
      match row["id"].as_i64() {
         Some(id) => {
            let existing = rows(&mut *state)
               .iter_mut()
               .find(|r| r["id"] == id && r["user_id"] == owner.as_str())
               .ok_or(ProviderError::NotFound)?;
            *existing = row.clone();
         }
         None => {
            state.next_row_id += 1;
            row["id"] = serde_json::json!(state.next_row_id);
            rows(&mut *state).push(row.clone());
         }
      }
      Ok(vec![StoreRow(row)])
   }

   fn owned_rows(
      &self,
      access_token: &str,
      user_id: &str,
      rows: impl Fn(&State) -> &Vec<serde_json::Value>,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      self.store_calls.fetch_add(1, Ordering::SeqCst);
      self.record_request_id();
      self.authorize(access_token)?;
      let state = self.state.lock().unwrap();
      Ok(rows(&*state)
         .iter()
         .filter(|r| r["user_id"] == user_id)
         .cloned()
         .map(StoreRow)
         .collect())
   }
}

#[async_trait]
impl AuthProviderClient for InMemorySupabase {
   async fn sign_up(&self, credentials: &Credentials) -> Result<serde_json::Value, ProviderError> {
      self.record_request_id();
      let email = credentials.email().as_str().to_string();
      let id = self.next_id("user");

      let mut state = self.state.lock().unwrap();
      if state.users.contains_key(&email) {
         return Err(ProviderError::Rejected("User already registered".to_string()));
      }
      state.users.insert(
         email.clone(),
         (id.clone(), credentials.password().as_str().to_string()),
      );

      if !self.autoconfirm {
         return Ok(serde_json::json!({ "id": id, "email": email }));
      }

      let session = self.issue_session(&mut state, &id);
      Ok(serde_json::json!({
         "access_token": session.access_token,
         "token_type": "bearer",
         "expires_in": session.expires_in,
         "expires_at": session.expires_at,
         "refresh_token": session.refresh_token,
         "user": { "id": id, "email": email }
      }))
   }

   async fn sign_in_with_password(
      &self,
      credentials: &Credentials,
   ) -> Result<AuthResponse, ProviderError> {
      self.record_request_id();
      let mut state = self.state.lock().unwrap();
      let user_id = match state.users.get(credentials.email().as_str()) {
         Some((id, password)) if password == credentials.password().as_str() => id.clone(),
         _ => return Err(ProviderError::InvalidCredentials),
      };

      let session = self.issue_session(&mut state, &user_id);
      Ok(AuthResponse {
         user:    Some(Self::user_by_id(&state, &user_id)),
         session: Some(session),
      })
   }

   async fn refresh_session(&self, refresh_token: &str) -> Result<AuthResponse, ProviderError> {
      self.record_request_id();
      let mut state = self.state.lock().unwrap();
      let user_id = state
         .refresh_tokens
         .remove(refresh_token)
         .ok_or(ProviderError::InvalidCredentials)?;

      let session = self.issue_session(&mut state, &user_id);
      Ok(AuthResponse {
         user:    Some(Self::user_by_id(&state, &user_id)),
         session: Some(session),
      })
   }

   async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
      self.record_request_id();
      let mut state = self.state.lock().unwrap();
      let user_id = state
         .access_tokens
         .get(access_token)
         .cloned()
         .ok_or_else(|| ProviderError::Rejected("invalid JWT".to_string()))?;

      state.access_tokens.retain(|_, id| *id != user_id);
      state.refresh_tokens.retain(|_, id| *id != user_id);
      Ok(())
   }

   async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
      self.record_request_id();
      let state = self.state.lock().unwrap();
      match state.access_tokens.get(access_token) {
         Some(user_id) => Ok(Self::user_by_id(&state, user_id)),
         None => Err(ProviderError::Rejected("invalid JWT".to_string())),
      }
   }

   async fn check_health(&self) -> Result<(), ProviderError> {
      Ok(())
   }
}

#[async_trait]
impl ItemStoreClient for InMemorySupabase {
   async fn list_items(&self, access_token: &str) -> Result<Vec<StoreRow>, ProviderError> {
      self.store_calls.fetch_add(1, Ordering::SeqCst);
      self.record_request_id();
      self.authorize(access_token)?;
      Ok(self.state.lock().unwrap().items.clone())
   }

   async fn insert_item(
      &self,
      access_token: &str,
      item: &NewItem,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      self.store_calls.fetch_add(1, Ordering::SeqCst);
      self.record_request_id();
      self.authorize(access_token)?;

      let mut state = self.state.lock().unwrap();
      let mut row = serde_json::to_value(item)
         .map_err(|e| ProviderError::Unexpected(e.to_string()))?;
      row["id"] = serde_json::json!(state.items.len() + 1);
      let row = StoreRow(row);
      state.items.push(row.clone());
      Ok(vec![row])
   }

   async fn check_health(&self) -> Result<(), ProviderError> {
      Ok(())
   }
}

#[async_trait]
impl LedgerStoreClient for InMemorySupabase {
   async fn list_transactions(
      &self,
      access_token: &str,
      user_id: &str,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      let mut rows = self.owned_rows(access_token, user_id, |s| &s.transactions)?;
      rows.sort_by(|a, b| a.0["date"].as_str().cmp(&b.0["date"].as_str()));
      Ok(rows)
   }

   async fn upsert_transaction(
      &self,
      access_token: &str,
      row: &TransactionUpsert,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      let row = serde_json::to_value(row).map_err(|e| ProviderError::Unexpected(e.to_string()))?;
      self.write_owned_row(access_token, row, |s| &mut s.transactions)
   }

   async fn delete_transactions(
      &self,
      access_token: &str,
      user_id: &str,
      ids: &[i64],
   ) -> Result<Vec<StoreRow>, ProviderError> {
      self.store_calls.fetch_add(1, Ordering::SeqCst);
      self.record_request_id();
      self.authorize(access_token)?;

      let mut state = self.state.lock().unwrap();
      let (deleted, kept): (Vec<_>, Vec<_>) =
         state.transactions.drain(..).partition(|r| {
            r["user_id"] == user_id && r["id"].as_i64().is_some_and(|id| ids.contains(&id))
         });
      state.transactions = kept;
      Ok(deleted.into_iter().map(StoreRow).collect())
   }

   async fn list_categories(&self, access_token: &str) -> Result<Vec<StoreRow>, ProviderError> {
      self.store_calls.fetch_add(1, Ordering::SeqCst);
      self.authorize(access_token)?;
      Ok(["groceries", "salary"]
         .into_iter()
         .map(|name| StoreRow(serde_json::json!({ "name": name, "parent": null })))
         .collect())
   }

   async fn list_spend_limits(
      &self,
      access_token: &str,
      user_id: &str,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      self.owned_rows(access_token, user_id, |s| &s.spend_limits)
   }

   async fn upsert_spend_limit(
      &self,
      access_token: &str,
      limit: &SpendLimit,
   ) -> Result<Vec<StoreRow>, ProviderError> {
      let row =
         serde_json::to_value(limit).map_err(|e| ProviderError::Unexpected(e.to_string()))?;
      self.write_owned_row(access_token, row, |s| &mut s.spend_limits)
   }
}

pub fn test_config() -> BffConfig {
   BffConfig::from_lookup(|name| match name {
      "SUPABASE_PROJECT_URL" => Some("http://supabase.invalid".to_string()),
      "SUPABASE_API_KEY" => Some("anon-key".to_string()),
      "CORS_ALLOWED_ORIGIN" => Some(ALLOWED_ORIGIN.to_string()),
      _ => None,
   })
   .unwrap()
}

/// 本番と同じレイヤー構成のルーターをインメモリプロバイダで組み立てる
pub fn test_app(provider: Arc<InMemorySupabase>) -> Router {
   build_router(&test_config(), provider.clone(), provider.clone(), provider).unwrap()
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
   Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
}

/// Bearer 付きの JSON リクエスト
pub fn bearer_json_request(
   method: Method,
   uri: &str,
   access_token: &str,
   body: serde_json::Value,
) -> Request<Body> {
   let mut request = json_request(method, uri, body);
   request.headers_mut().insert(
      header::AUTHORIZATION,
      format!("Bearer {access_token}").parse().unwrap(),
   );
   request
}

pub fn bearer_request(method: Method, uri: &str, access_token: &str) -> Request<Body> {
   Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
      .body(Body::empty())
      .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
   let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
   serde_json::from_slice(&bytes).unwrap()
}

/// `Set-Cookie` から `refresh_token` の属性付き文字列を取り出す
pub fn refresh_cookie(response: &Response<Body>) -> Option<String> {
   response
      .headers()
      .get_all(header::SET_COOKIE)
      .iter()
      .filter_map(|v| v.to_str().ok())
      .find(|v| v.starts_with("refresh_token="))
      .map(str::to_string)
}

/// `Set-Cookie` の値部分（`name=value`）だけを返す
pub fn cookie_pair(set_cookie: &str) -> &str {
   set_cookie.split(';').next().unwrap_or_default().trim()
}
