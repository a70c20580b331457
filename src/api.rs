//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use std::num::NonZeroUsize;

/// `DocumentLimit::Capped`で一般的に使う文字数上限
pub const DEFAULT_DOCUMENT_CAP: usize = 4000;

/// デフォルトの断片サイズ（文字数）
pub const DEFAULT_FRAGMENT_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(size) => size,
    None => panic!("fragment size must be non-zero"),
};

/// 日付の出力形式
///
/// Excelの日付セルをテキストに変換する際の出力形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式
    ///
    /// 時刻部分が0の場合は`2025-11-20`、それ以外は`2025-11-20 08:30:00`。
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxtally::{AnalyzerBuilder, DateFormat, OracleConfig};
    ///
    /// # fn main() -> Result<(), xlsxtally::XlsxTallyError> {
    /// let analyzer = AnalyzerBuilder::new()
    ///     .with_oracle_config(OracleConfig::new("sk-test"))
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// シート選択方式
///
/// テキスト抽出の対象とするシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートを抽出（デフォルト）
    All,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),

    /// 複数のインデックス指定
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}

/// シート本文のテキスト表現
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// 列幅を揃えたプレーンテキスト（デフォルト）
    ///
    /// 行インデックスは出力せず、列見出しを含みます。
    ///
    /// ```text
    /// Mesa  Comentario
    ///    1  voto noboa
    /// ```
    PlainText,

    /// CSV（Comma-Separated Values）形式
    ///
    /// ```csv
    /// Mesa,Comentario
    /// 1,voto noboa
    /// ```
    Csv,
}

/// 抽出テキストの長さに関する方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentLimit {
    /// 上限なし（デフォルト）
    ///
    /// 文書全体を正規化し、オラクルへのリクエストごとの長さは
    /// 断片化（`with_fragment_size`）で制限します。
    Unbounded,

    /// 正規化前の連結テキストを先頭から指定文字数で切り詰める
    ///
    /// 切り詰めが発生した場合は`ExtractedDocument::truncated`が`true`になります。
    Capped(usize),
}

/// 集計戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TallyStrategy {
    /// 文書全体を1回で送信し、応答中のカテゴリ語句の出現回数を数える（デフォルト）
    SubstringCount,

    /// 断片ごとにラベルを1つ問い合わせ、ラベルを累積する
    PerFragment,
}

/// オラクルが既知のカテゴリ以外のラベルを返した場合の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnknownLabelPolicy {
    /// 黙って無視する
    Ignore,

    /// `UnclassifiedFragment`警告として結果に記録し、ログにも出力する（デフォルト）
    Warn,
}
