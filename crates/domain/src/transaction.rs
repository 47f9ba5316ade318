//! # 取引
//!
//! 呼び出し元ユーザーが所有する入出金の記録を定義する。
//!
//! ## 所有者
//!
//! 取引行の `user_id` は入力から受け取らず、検証済みの呼び出し元から
//! [`TransactionDraft::into_upsert`] で埋める。
//!
//! ## 金額
//!
//! 入力は [`Price`] と同じ形式（`"1,234.50"` のような桁区切りも可）。
//! 書き込み行では桁区切りを除いた十進数になる。

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, category::CategoryName, item::Price};

define_validated_string! {
    /// 取引日（データストアの日付表記のまま保持する）
    pub struct TransactionDate {
        label: "date",
    }
}

define_validated_string! {
    /// 取引の説明
    pub struct TransactionDescription {
        label: "description",
    }
}

/// 取引の状態
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
pub enum TransactionStatus {
    Pending,
    Complete,
    Canceled,
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Complete" => Ok(Self::Complete),
            "Canceled" => Ok(Self::Canceled),
            _ => Err(DomainError::Validation(format!(
                "status must be one of Pending, Complete, Canceled, got {s:?}"
            ))),
        }
    }
}

/// 取引の種別（収入・支出）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
pub enum TransactionType {
    Income,
    Expense,
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(Self::Income),
            "Expense" => Ok(Self::Expense),
            _ => Err(DomainError::Validation(format!(
                "type must be one of Income, Expense, got {s:?}"
            ))),
        }
    }
}

/// 検証済みの取引入力
///
/// `id` があれば既存取引の更新、なければ新規作成。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub id:          Option<i64>,
    pub amount:      Price,
    pub category:    CategoryName,
    pub date:        TransactionDate,
    pub description: TransactionDescription,
    pub merchant:    Option<String>,
    pub notes:       Option<String>,
    pub status:      TransactionStatus,
    pub subtotal:    Option<Price>,
    pub tax:         Option<Price>,
    pub tip:         Option<Price>,
    pub kind:        TransactionType,
}

impl TransactionDraft {
    /// 呼び出し元ユーザーと更新日時を埋めた書き込み行に変換する
    pub fn into_upsert(
        self,
        user_id: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> TransactionUpsert {
        let amount_of = |price: Option<Price>| price.map(|p| p.amount());

        TransactionUpsert {
            id: self.id,
            user_id: user_id.into(),
            amount: self.amount.amount(),
            category: self.category,
            date: self.date,
            description: self.description,
            merchant: self.merchant,
            notes: self.notes,
            status: self.status,
            subtotal: amount_of(self.subtotal),
            tax: amount_of(self.tax),
            tip: amount_of(self.tip),
            kind: self.kind,
            updated_at,
        }
    }
}

/// 取引テーブルへの書き込み行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionUpsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id:          Option<i64>,
    pub user_id:     String,
    pub amount:      Decimal,
    pub category:    CategoryName,
    pub date:        TransactionDate,
    pub description: TransactionDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant:    Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes:       Option<String>,
    pub status:      TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal:    Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax:         Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip:         Option<Decimal>,
    #[serde(rename = "type")]
    pub kind:        TransactionType,
    pub updated_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn draft() -> TransactionDraft {
        TransactionDraft {
            id:          None,
            amount:      Price::new("1,250.00").unwrap(),
            category:    CategoryName::new("groceries").unwrap(),
            date:        TransactionDate::new("2026-04-01").unwrap(),
            description: TransactionDescription::new("Weekly shop").unwrap(),
            merchant:    Some("Corner store".to_string()),
            notes:       None,
            status:      TransactionStatus::Complete,
            subtotal:    Some(Price::new("1,100.00").unwrap()),
            tax:         None,
            tip:         None,
            kind:        TransactionType::Expense,
        }
    }

    #[rstest]
    fn test_書き込み行は呼び出し元のuser_idと桁区切りを除いた金額を持つ(draft: TransactionDraft) {
        // Given
        let now = Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0).unwrap();

        // When
        let row = draft.into_upsert("user-1", now);

        // Then
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_id": "user-1",
                "amount": "1250.00",
                "category": "groceries",
                "date": "2026-04-01",
                "description": "Weekly shop",
                "merchant": "Corner store",
                "status": "Complete",
                "subtotal": "1100.00",
                "type": "Expense",
                "updated_at": "2026-04-02T09:00:00Z"
            })
        );
    }

    #[rstest]
    fn test_idがある場合は書き込み行に含める(mut draft: TransactionDraft) {
        draft.id = Some(42);

        let row = draft.into_upsert("user-1", Utc::now());

        assert_eq!(row.id, Some(42));
        assert_eq!(serde_json::to_value(&row).unwrap()["id"], 42);
    }

    #[rstest]
    #[case("Pending", TransactionStatus::Pending)]
    #[case("Complete", TransactionStatus::Complete)]
    #[case("Canceled", TransactionStatus::Canceled)]
    fn test_取引の状態を文字列から解釈できる(
        #[case] input: &str,
        #[case] expected: TransactionStatus,
    ) {
        assert_eq!(input.parse::<TransactionStatus>(), Ok(expected));
    }

    #[test]
    fn test_未知の状態と種別はバリデーションエラー() {
        assert!("Done".parse::<TransactionStatus>().is_err());
        assert!("Transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_種別はjsonの文字列から解釈できる() {
        let kind: TransactionType = serde_json::from_str(r#""Income""#).unwrap();

        assert_eq!(kind, TransactionType::Income);
        assert_eq!(<&'static str>::from(kind), "Income");
    }

    #[test]
    fn test_空白のみの取引日はバリデーションエラー() {
        assert_eq!(
            TransactionDate::new(" "),
            Err(DomainError::Validation("date is required".to_string()))
        );
    }
}
