//! # 認証情報
//!
//! サインイン・サインアップで受け取る入力値を定義する。
//! どちらも外部の認証プロバイダへ転送するだけで、サーバー側には保存しない。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`Email`] | メールアドレス | ユーザーの識別子 |
//! | [`PlainPassword`] | 平文パスワード | サインイン時の入力値 |
//! | [`Credentials`] | 認証情報 | 上記の組 |

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// メールアドレスの最大長
const EMAIL_MAX_LENGTH: usize = 255;

/// メールアドレス（値オブジェクト）
///
/// 構造の最低限の検証のみ行う。実在確認は認証プロバイダの責務。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation("email is required".to_string()));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "email must be in the form local@domain".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::Validation(
                "email must be in the form local@domain".to_string(),
            ));
        }

        if value.len() > EMAIL_MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// 平文パスワード（サインイン時の入力値）
///
/// 強度ポリシーは認証プロバイダが持つため、ここでは空でないことだけを確認する。
///
/// # セキュリティ
///
/// Debug 出力ではパスワードの値をマスクする。
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
    }
}

impl PlainPassword {
    /// パスワードを作成する
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::Validation("password is required".to_string()));
        }
        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 認証情報（メールアドレス + パスワード）
#[derive(Debug, Clone)]
pub struct Credentials {
    email:    Email,
    password: PlainPassword,
}

impl Credentials {
    /// 生の入力値から認証情報を組み立てる
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            email:    Email::new(email)?,
            password: PlainPassword::new(password)?,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}
