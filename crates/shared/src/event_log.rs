//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` で効率的に調査できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.actor_id`: 操作者 ID（プロバイダのユーザー ID）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const AUTH: &str = "auth";
        pub const ITEM: &str = "item";
        pub const TRANSACTION: &str = "transaction";
        pub const CATEGORY: &str = "category";
    }

    /// イベントアクション
    pub mod action {
        // 認証
        pub const SIGNUP: &str = "auth.signup";
        pub const SIGNIN_SUCCESS: &str = "auth.signin_success";
        pub const SIGNIN_FAILURE: &str = "auth.signin_failure";
        pub const REFRESH: &str = "auth.refresh";
        pub const REFRESH_FAILURE: &str = "auth.refresh_failure";
        pub const SIGNOUT: &str = "auth.signout";

        // アイテム
        pub const ITEM_CREATED: &str = "item.created";

        // 取引
        pub const TRANSACTION_SAVED: &str = "transaction.saved";
        pub const TRANSACTIONS_DELETED: &str = "transaction.deleted";

        // カテゴリ
        pub const SPEND_LIMIT_SAVED: &str = "category.spend_limit_saved";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const USER: &str = "user";
        pub const SESSION: &str = "session";
        pub const ITEM: &str = "item";
        pub const TRANSACTION: &str = "transaction";
        pub const SPEND_LIMIT: &str = "spend_limit";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 外部プロバイダ呼び出し（認証、データストア）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const AUTH_PROVIDER: &str = "auth_provider";
        pub const ITEM_STORE: &str = "item_store";
        pub const LEDGER_STORE: &str = "ledger_store";
    }
}
