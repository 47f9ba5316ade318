//! # Tally ドメイン層
//!
//! BFF が外部プロバイダへ転送する前に検証する値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 生成時に検証し、不正な値の存在を型レベルで排除する
//! - **I/O なし**: このクレートは HTTP やプロバイダ API を知らない
//! - **ワイヤ表現の保持**: 価格は受け取った文字列表現のまま転送する
//!
//! ## モジュール構成
//!
//! - [`category`] - カテゴリ、カテゴリ別の支出上限
//! - [`credentials`] - サインイン・サインアップの入力（メールアドレス、パスワード）
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`item`] - アイテム（名前、価格）
//! - [`receipt`] - レシート（ルートを持たないデータ形状）
//! - [`transaction`] - 呼び出し元ユーザーが所有する取引
//!
//! ## 使用例
//!
//! ```rust
//! use tally_domain::item::NewItem;
//!
//! let item = NewItem::new("Pen", "Blue ink", "1.50").unwrap();
//! assert_eq!(item.price().as_str(), "1.50");
//! ```

#[macro_use]
mod macros;

pub mod category;
pub mod credentials;
pub mod error;
pub mod item;
pub mod receipt;
pub mod transaction;

pub use error::DomainError;
