/*
 * Responsibility
 * - Path の 1 セグメントを整数 ID として受け取る
 * - guard と handler は同じ parse_path_id を使う (片方だけ通る ID を作らない)
 * - 失敗時は AppError (JSON envelope) に変換。axum の plain-text 400 は返さない
 */
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

/// Resource kind named by a path id, used in the 404 message.
pub trait PathResource {
    const NAME: &'static str;
}

pub struct User;
pub struct Todo;
pub struct Category;

impl PathResource for User {
    const NAME: &'static str = "user";
}

impl PathResource for Todo {
    const NAME: &'static str = "todo";
}

impl PathResource for Category {
    const NAME: &'static str = "category";
}

/// Exact decimal integer: no surrounding whitespace, no fractions or exponents.
pub fn parse_path_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

pub struct PathId<T> {
    pub id: i32,
    _marker: PhantomData<T>,
}

impl<T> PathId<T> {
    fn new(id: i32) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

impl<T, S> FromRequestParts<S> for PathId<T>
where
    T: PathResource + Send + Sync,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found(T::NAME))?;

        parse_path_id(&raw)
            .map(Self::new)
            .ok_or(AppError::not_found(T::NAME))
    }
}

impl<T> std::fmt::Debug for PathId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathId").field("id", &self.id).finish()
    }
}
