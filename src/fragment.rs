//! Fragmenter Module
//!
//! 正規化済みテキストを固定文字数の断片に分割する。
//! 断片は重なりも隙間もなく、順に連結すると元のテキストに戻る。

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

/// 断片を順に返すイテレータ
///
/// `fragments()`で生成します。元のテキストを借用し、コピーは行いません。
#[derive(Debug, Clone)]
pub struct Fragments<'a> {
    rest: &'a str,
    size: NonZeroUsize,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        // 長さは文字数で数える（バイト境界で分割しない）
        let split_at = self
            .rest
            .char_indices()
            .nth(self.size.get())
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());

        let (head, tail) = self.rest.split_at(split_at);
        self.rest = tail;
        Some(head)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.rest.is_empty() {
            return (0, Some(0));
        }
        // 1文字は最大4バイト
        let min_chars = self.rest.len().div_ceil(4);
        let max_chars = self.rest.len();
        let size = self.size.get();
        (min_chars.div_ceil(size), Some(max_chars.div_ceil(size)))
    }
}

impl FusedIterator for Fragments<'_> {}

/// テキストを`size`文字ごとの断片に分割する
///
/// 最後の断片以外はちょうど`size`文字、最後の断片は残りの文字数です。
/// 入力が空の場合に限り、断片は1つも返りません。
///
/// # 使用例
///
/// ```rust
/// use std::num::NonZeroUsize;
/// use xlsxtally::fragments;
///
/// let size = NonZeroUsize::new(4).unwrap();
/// let parts: Vec<&str> = fragments("voto noboa", size).collect();
/// assert_eq!(parts, vec!["voto", " nob", "oa"]);
/// ```
pub fn fragments(text: &str, size: NonZeroUsize) -> Fragments<'_> {
    Fragments { rest: text, size }
}

/// `fragments()`の結果を所有文字列のベクターとして返す
pub fn fragment(text: &str, size: NonZeroUsize) -> Vec<String> {
    fragments(text, size).map(str::to_string).collect()
}
