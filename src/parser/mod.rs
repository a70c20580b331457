//! Parser Module
//!
//! calamineを使用したワークブック解析。
//! XLSX/XLSコンテナを開き、シートごとの表データを抽出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
