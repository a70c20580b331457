//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::NaiveDateTime;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 整数
    Int(i64),

    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付・時刻
    DateTime(NaiveDateTime),

    /// ISO 8601形式でそのまま保持される日付・期間
    Iso(String),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// 1シート分の表データ
///
/// 先頭行を列見出し、以降をデータ行として保持します。
/// すべてのセルは表示用文字列に変換済みです。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SheetTable {
    /// シート名
    pub name: String,

    /// 列見出し
    pub headers: Vec<String>,

    /// データ行（各行の長さは`headers.len()`と等しい）
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// 見出しもデータもないシートか
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

/// ワークブックから抽出されたテキスト
///
/// シートごとの見出し行と表テキストを連結したものです。
/// `text`は正規化済みで、後続の断片化・オラクル呼び出しに使われます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// 正規化前のテキスト（上限適用後）
    pub raw_text: String,

    /// 正規化済みテキスト
    pub text: String,

    /// `DocumentLimit::Capped`によって切り詰められたか
    pub truncated: bool,

    /// 抽出したシート数
    pub sheet_count: usize,
}

impl ExtractedDocument {
    /// 正規化済みテキストが空か
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 正規化済みテキストの先頭`max_chars`文字
    ///
    /// 画面上のサンプル表示用です。
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> ExtractedDocument {
        ExtractedDocument {
            raw_text: text.to_string(),
            text: text.to_string(),
            truncated: false,
            sheet_count: 1,
        }
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::String(String::new()).is_empty());
        assert!(!CellValue::String("   ".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::String("voto".to_string()).is_empty());
        assert!(!CellValue::Bool(false).is_empty());
    }

    #[test]
    fn test_sheet_table_is_empty() {
        assert!(SheetTable::default().is_empty());

        let table = SheetTable {
            name: "Votos".to_string(),
            headers: vec!["Mesa".to_string()],
            rows: vec![],
        };
        assert!(!table.is_empty());
        assert_eq!(table.width(), 1);
    }

    #[test]
    fn test_preview_counts_characters() {
        let doc = document("Ñandú votó");
        assert_eq!(doc.preview(5), "Ñandú");
        assert_eq!(doc.preview(100), "Ñandú votó");
        assert_eq!(doc.preview(0), "");
    }

    #[test]
    fn test_document_is_empty() {
        assert!(document("").is_empty());
        assert!(!document("a").is_empty());
    }
}
