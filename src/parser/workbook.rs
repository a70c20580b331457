//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックレベルの操作を提供します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::Cursor;

use crate::api::SheetSelector;
use crate::builder::PipelineConfig;
use crate::error::XlsxTallyError;
use crate::formatter::CellFormatter;
use crate::types::{CellValue, SheetTable};

/// ワークブックパーサー
///
/// アップロードされたバイト列から開いたXLSX/XLSワークブックを保持します。
/// 読み込み後は変更されず、テキスト抽出が終われば破棄されます。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// メモリ上のバイト列からワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - XLSXまたはXLSとして開けた場合
    /// * `Err(XlsxTallyError::MalformedWorkbook)` - スプレッドシートとして解析できない場合
    /// * `Err(XlsxTallyError::UnsupportedFormat)` - ODS/XLSBなど対象外の形式の場合
    pub fn open(buffer: Vec<u8>) -> Result<Self, XlsxTallyError> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;

        match workbook {
            Sheets::Xlsx(_) | Sheets::Xls(_) => Ok(Self { workbook }),
            _ => Err(XlsxTallyError::UnsupportedFormat(
                "only .xlsx and .xls workbooks are accepted".to_string(),
            )),
        }
    }

    /// すべてのシート名を取得（ファイル内の順序）
    pub fn get_sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト
    /// * `Err(XlsxTallyError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, XlsxTallyError> {
        let all_sheet_names = self.get_sheet_names();

        let by_index = |index: usize| -> Result<String, XlsxTallyError> {
            all_sheet_names.get(index).cloned().ok_or_else(|| {
                XlsxTallyError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            })
        };
        let by_name = |name: &String| -> Result<String, XlsxTallyError> {
            if all_sheet_names.contains(name) {
                Ok(name.clone())
            } else {
                Err(XlsxTallyError::Config(format!("Sheet '{}' not found", name)))
            }
        };

        match selector {
            SheetSelector::All => Ok(all_sheet_names.clone()),
            SheetSelector::Index(index) => Ok(vec![by_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![by_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|&i| by_index(i)).collect(),
            SheetSelector::Names(names) => names.iter().map(by_name).collect(),
        }
    }

    /// シートを読み込み、表データに変換する
    ///
    /// 先頭行を列見出し、以降をデータ行とします。
    pub fn read_sheet(
        &mut self,
        sheet_name: &str,
        formatter: &CellFormatter,
        config: &PipelineConfig,
    ) -> Result<SheetTable, XlsxTallyError> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        log::debug!(
            "sheet '{}': {} rows x {} cols",
            sheet_name,
            range.height(),
            range.width()
        );

        Ok(build_table(sheet_name, &range, formatter, config))
    }
}

fn build_table(
    sheet_name: &str,
    range: &Range<Data>,
    formatter: &CellFormatter,
    config: &PipelineConfig,
) -> SheetTable {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(col, cell)| formatter.format_header(&to_cell_value(cell), col, config))
            .collect(),
        None => {
            return SheetTable {
                name: sheet_name.to_string(),
                ..Default::default()
            }
        }
    };

    let rows = rows
        // 完全に空の行は表から除く
        .filter(|row| !row.iter().all(|cell| to_cell_value(cell).is_empty()))
        .map(|row| {
            row.iter()
                .map(|cell| formatter.format_cell(&to_cell_value(cell), config))
                .collect()
        })
        .collect();

    SheetTable {
        name: sheet_name.to_string(),
        headers,
        rows,
    }
}

/// calamineのセルを内部表現に変換
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Iso(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}
