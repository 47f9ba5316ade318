//! # カテゴリ
//!
//! 取引を分類するカテゴリと、カテゴリ別の支出上限を定義する。
//!
//! カテゴリ自体はデータストアが名前を主キーとして管理し、BFF は名前を
//! 参照として受け渡すだけ。支出上限は呼び出し元ユーザーの所有物として、
//! `user_id` を BFF 側で必ず埋めてから書き込む。

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, item::Price};

define_validated_string! {
    /// カテゴリ名（例: `"groceries"`）
    pub struct CategoryName {
        label: "category",
    }
}

/// 支出上限の集計期間
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
pub enum TimeFrame {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl FromStr for TimeFrame {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yearly" => Ok(Self::Yearly),
            "Monthly" => Ok(Self::Monthly),
            "Weekly" => Ok(Self::Weekly),
            "Daily" => Ok(Self::Daily),
            _ => Err(DomainError::Validation(format!(
                "time_frame must be one of Yearly, Monthly, Weekly, Daily, got {s:?}"
            ))),
        }
    }
}

/// カテゴリ別支出上限の書き込み行
///
/// `id` があれば既存行の更新、なければ新規作成として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendLimit {
    #[serde(skip_serializing_if = "Option::is_none")]
    id:         Option<i64>,
    user_id:    String,
    category:   CategoryName,
    limit:      Decimal,
    time_frame: TimeFrame,
}

impl SpendLimit {
    pub fn new(
        id: Option<i64>,
        user_id: impl Into<String>,
        category: CategoryName,
        limit: &Price,
        time_frame: TimeFrame,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            category,
            limit: limit.amount(),
            time_frame,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn category(&self) -> &CategoryName {
        &self.category
    }

    pub fn limit(&self) -> Decimal {
        self.limit
    }

    pub fn time_frame(&self) -> TimeFrame {
        self.time_frame
    }
}
