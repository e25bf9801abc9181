/*!
 * Request principal extractor
 *
 * Responsibility:
 * - 認証済みリクエストの主体（Principal）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - Principal
 * - CurrentPrincipal
 */

mod core;
mod types;

pub use self::core::CurrentPrincipal;
pub use types::Principal;
