//! # BFF 設定
//!
//! 環境変数から BFF サーバーの設定を読み込む。
//!
//! | 変数名 | 必須 | デフォルト |
//! |--------|------|-----------|
//! | `SUPABASE_PROJECT_URL` | **Yes** | - |
//! | `SUPABASE_API_KEY` | **Yes** | - |
//! | `BFF_HOST` | No | `0.0.0.0` |
//! | `BFF_PORT` | No | `8000` |
//! | `CORS_ALLOWED_ORIGIN` | No | `http://localhost:3000` |

use std::{env, net::SocketAddr};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
   /// 必須の環境変数が未設定、または空
   #[error("{0} が設定されていません")]
   Missing(&'static str),

   /// 値を解釈できない
   #[error("{name} の値が不正です: {value:?}")]
   Invalid { name: &'static str, value: String },
}

/// BFF サーバーの設定
#[derive(Clone)]
pub struct BffConfig {
   /// バインドアドレス
   pub host:                String,
   /// ポート番号
   pub port:                u16,
   /// Supabase プロジェクトのベース URL（末尾スラッシュなし）
   pub supabase_url:        String,
   /// Supabase の API キー（anon キー）
   pub supabase_api_key:    String,
   /// CORS で許可するオリジン（1 つのみ）
   pub cors_allowed_origin: String,
}

impl std::fmt::Debug for BffConfig {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("BffConfig")
         .field("host", &self.host)
         .field("port", &self.port)
         .field("supabase_url", &self.supabase_url)
         .field("supabase_api_key", &"[REDACTED]")
         .field("cors_allowed_origin", &self.cors_allowed_origin)
         .finish()
   }
}

impl BffConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|name| env::var(name).ok())
   }

   /// 任意の参照関数から設定を読み込む
   ///
   /// テストでプロセスの環境変数を書き換えずに検証するために使う。
   pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
      let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

      let port = match optional("BFF_PORT") {
         Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
               name: "BFF_PORT",
               value,
            })?,
         None => DEFAULT_PORT,
      };

      Ok(Self {
         host: optional("BFF_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
         port,
         supabase_url: required("SUPABASE_PROJECT_URL")?
            .trim_end_matches('/')
            .to_string(),
         supabase_api_key: required("SUPABASE_API_KEY")?,
         cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string()),
      })
   }

   /// バインドするソケットアドレス
   pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
      format!("{}:{}", self.host, self.port)
         .parse()
         .map_err(|_| ConfigError::Invalid {
            name:  "BFF_HOST",
            value: self.host.clone(),
         })
   }
}
