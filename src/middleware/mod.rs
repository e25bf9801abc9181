/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: identity 抽出 + route guards / http・cors・security_headers: 横断的な関心事
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
