// 汎用ステージの具象実装

use crate::core::PipelineStage;
use std::fmt;
use std::marker::PhantomData;

/// 要素をそのまま通すステージ
pub struct IdentityStage<T> {
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> IdentityStage<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for IdentityStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for IdentityStage<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for IdentityStage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityStage")
    }
}

impl<T: Send> PipelineStage for IdentityStage<T> {
    type Input = T;
    type Task = T;
    type Output = T;

    fn stage1(&self, item: T) -> T {
        item
    }

    fn stage2(&self, task: T) -> T {
        task
    }
}

/// 二つのクロージャから組み立てるステージ
pub struct FnStage<I, T, O, F1, F2> {
    first: F1,
    second: F2,
    _marker: PhantomData<fn(I) -> (T, O)>,
}

impl<I, T, O, F1, F2> FnStage<I, T, O, F1, F2>
where
    F1: Fn(I) -> T,
    F2: Fn(T) -> O,
{
    pub fn new(first: F1, second: F2) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, T, O, F1, F2> PipelineStage for FnStage<I, T, O, F1, F2>
where
    I: Send,
    T: Send,
    O: Send,
    F1: Fn(I) -> T + Send + Sync,
    F2: Fn(T) -> O + Send + Sync,
{
    type Input = I;
    type Task = T;
    type Output = O;

    fn stage1(&self, item: I) -> T {
        (self.first)(item)
    }

    fn stage2(&self, task: T) -> O {
        (self.second)(task)
    }
}
