// ソースの具象実装

use crate::core::ItemSource;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 失敗しないイテレーターをソースとして扱うアダプター
#[derive(Debug)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator,
{
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
        }
    }
}

impl<I> ItemSource for IterSource<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    fn next_item(&mut self) -> Result<Option<Self::Item>> {
        Ok(self.iter.next())
    }
}

/// `Result` を返すイテレーターをソースとして扱うアダプター
///
/// 最初の `Err` でソースは失敗として終了する。
#[derive(Debug)]
pub struct FallibleIterSource<I> {
    iter: I,
}

impl<I> FallibleIterSource<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
        }
    }
}

impl<I, T, E> ItemSource for FallibleIterSource<I>
where
    I: Iterator<Item = std::result::Result<T, E>> + Send,
    T: Send,
    E: Into<anyhow::Error>,
{
    type Item = T;

    fn next_item(&mut self) -> Result<Option<Self::Item>> {
        self.iter.next().transpose().map_err(Into::into)
    }
}

/// ディレクトリを遅延走査して通常ファイルのパスを返すソース
pub struct WalkDirSource {
    walker: walkdir::IntoIter,
    skip_errors: bool,
}

impl WalkDirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            walker: WalkDir::new(root).follow_links(false).into_iter(),
            skip_errors: false,
        }
    }

    /// 走査エラーを警告として読み飛ばす
    pub fn skip_errors(mut self, skip: bool) -> Self {
        self.skip_errors = skip;
        self
    }
}

impl ItemSource for WalkDirSource {
    type Item = PathBuf;

    fn next_item(&mut self) -> Result<Option<Self::Item>> {
        for entry in self.walker.by_ref() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    return Ok(Some(entry.into_path()));
                }
                Ok(_) => continue,
                Err(e) if self.skip_errors => {
                    log::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}
