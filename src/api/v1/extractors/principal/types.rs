/*
 * Responsibility
 * - Handler から見える「認証済み主体」の型
 * - identity middleware が token を検証して request extensions に格納する
 *
 * Notes
 * - token の形式や検証は services/auth 側の責務
 * - 1 リクエストにのみ属する。リクエスト間で共有しない
 */
use crate::services::auth::IdentityClaims;

/// 認証済みのリクエストに付与される主体
///
/// - `subject_id` は users.id
/// - `issued_at` は token 発行時刻 (unix 秒)。有効期限ポリシーを足す場合に使う
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: i32,
    pub subject_name: String,
    pub issued_at: i64,
}

impl From<IdentityClaims> for Principal {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            subject_id: claims.subject_id,
            subject_name: claims.subject_name,
            issued_at: claims.issued_at,
        }
    }
}
