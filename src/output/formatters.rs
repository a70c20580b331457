//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use crate::error::XlsxTallyError;
use crate::types::SheetTable;
use std::io::Write;
use unicode_width::UnicodeWidthStr;

/// 列の区切り
const COLUMN_GAP: &str = "  ";

/// 列幅を揃えたプレーンテキスト形式のフォーマッター
///
/// 見出し行とデータ行を右揃えで出力します。行インデックスは出力しません。
/// 最終行の後に改行は付けません。
pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    pub fn render<W: Write>(&self, table: &SheetTable, writer: &mut W) -> Result<(), XlsxTallyError> {
        if table.is_empty() {
            return Ok(());
        }

        let widths: Vec<usize> = (0..table.width())
            .map(|col| {
                std::iter::once(&table.headers[col])
                    .chain(table.rows.iter().filter_map(|row| row.get(col)))
                    .map(|cell| UnicodeWidthStr::width(cell.as_str()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write_aligned_line(writer, &table.headers, &widths)?;
        for row in &table.rows {
            writeln!(writer)?;
            write_aligned_line(writer, row, &widths)?;
        }

        Ok(())
    }
}

fn write_aligned_line<W: Write>(
    writer: &mut W,
    cells: &[String],
    widths: &[usize],
) -> Result<(), XlsxTallyError> {
    for (col, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if col > 0 {
            write!(writer, "{}", COLUMN_GAP)?;
        }
        // 全角文字を考慮して表示幅で右揃えにする
        let padding = width.saturating_sub(UnicodeWidthStr::width(cell.as_str()));
        write!(writer, "{:padding$}{}", "", cell, padding = padding)?;
    }
    Ok(())
}

/// CSV形式のフォーマッター
pub(crate) struct CsvFormatter;

impl CsvFormatter {
    pub fn render<W: Write>(&self, table: &SheetTable, writer: &mut W) -> Result<(), XlsxTallyError> {
        if table.is_empty() {
            return Ok(());
        }

        write_csv_line(writer, &table.headers)?;
        for row in &table.rows {
            writeln!(writer)?;
            write_csv_line(writer, row)?;
        }

        Ok(())
    }
}

fn write_csv_line<W: Write>(writer: &mut W, cells: &[String]) -> Result<(), XlsxTallyError> {
    let line = cells
        .iter()
        .map(|cell| escape_csv(cell))
        .collect::<Vec<_>>()
        .join(",");
    write!(writer, "{}", line)?;
    Ok(())
}

/// CSV文字列をエスケープ
///
/// ダブルクォート、改行、カンマを含む場合はダブルクォートで囲み、
/// 内部のダブルクォートは2つにエスケープします。
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
