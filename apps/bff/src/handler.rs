//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、認証・データ操作は外部プロバイダに委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `auth`: 認証関連（サインアップ、サインイン、サインアウト、リフレッシュ）
//! - `item`: アイテム関連（一覧、作成）
//! - `ledger`: 家計簿関連（取引、カテゴリ、支出上限）

pub mod auth;
pub mod health;
pub mod item;
pub mod ledger;

pub use auth::{AuthState, protected_route, refresh, signin, signout, signup};
pub use health::{ReadinessState, health_check, readiness_check};
pub use item::{ItemState, create_item, list_items};
pub use ledger::{
    LedgerState,
    delete_transactions,
    list_categories,
    list_spend_limits,
    list_transactions,
    save_spend_limit,
    save_transaction,
};
