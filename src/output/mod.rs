//! Output Format Module
//!
//! シートの表データをテキストに変換し、ワークブック全体の文書として連結する。

mod chart;
mod formatters;

use crate::api::OutputFormat;
use crate::error::XlsxTallyError;
use crate::types::SheetTable;
use std::io::Write;

pub use chart::{ChartBar, VoteChart};
pub(crate) use formatters::*;

/// 出力フォーマッター（Strategy Pattern）
#[derive(Debug, Clone, Copy)]
pub(crate) enum OutputFormatter {
    PlainText,
    Csv,
}

impl OutputFormatter {
    /// 出力フォーマットからフォーマッターを生成
    pub fn from_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::PlainText => OutputFormatter::PlainText,
            OutputFormat::Csv => OutputFormatter::Csv,
        }
    }

    /// 表を指定されたフォーマットで出力する
    pub fn render<W: Write>(&self, table: &SheetTable, writer: &mut W) -> Result<(), XlsxTallyError> {
        match self {
            OutputFormatter::PlainText => PlainTextFormatter.render(table, writer),
            OutputFormatter::Csv => CsvFormatter.render(table, writer),
        }
    }

    /// 表を文字列として出力する
    pub fn render_to_string(&self, table: &SheetTable) -> Result<String, XlsxTallyError> {
        let mut buffer = Vec::new();
        self.render(table, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| XlsxTallyError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

/// シートごとのテキストを1つの文書に連結する
///
/// 各シートは`--- {シート名} ---`の区切り行、表テキスト、空行の順に並びます。
/// シートが1つもない場合は空文字列です。
pub(crate) fn assemble_document<'a, I>(sheets: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut document = String::new();
    for (name, body) in sheets {
        document.push_str("--- ");
        document.push_str(name);
        document.push_str(" ---\n");
        document.push_str(body);
        document.push_str("\n\n");
    }
    document
}
