//! # Tally BFF (Backend for Frontend) ライブラリ
//!
//! フロントエンド専用の API サーバーのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: State の初期化とルーター構築
//! - `client`: 外部プロバイダクライアント（Supabase Auth / PostgREST）
//! - `config`: 環境変数からの設定読み込み
//! - `error`: API エラーとレスポンス変換
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（Bearer 検証、Request ID 等）
//! - `openapi`: OpenAPI 仕様定義

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod openapi;
