//! Formatter Module
//!
//! セル値を表示用文字列に変換するモジュール。

use chrono::{NaiveDateTime, Timelike};

use crate::api::DateFormat;
use crate::builder::PipelineConfig;
use crate::types::CellValue;

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,

    /// 数値フォーマッター
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self {
            date_formatter: DateFormatter,
            number_formatter: NumberFormatter,
        }
    }

    /// セル値をフォーマット
    ///
    /// 改行を含む文字列はスペースに置き換え、1行に収めます。
    /// 空セルと空文字列は`config.empty_cell_text`になります。
    /// 空白だけの文字列はそのまま残します。
    pub fn format_cell(&self, value: &CellValue, config: &PipelineConfig) -> String {
        match value {
            CellValue::Int(i) => i.to_string(),
            CellValue::Number(n) => self.number_formatter.format(*n),
            CellValue::String(s) => {
                if s.is_empty() {
                    config.empty_cell_text.clone()
                } else {
                    single_line(s)
                }
            }
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::DateTime(dt) => self.date_formatter.format(dt, &config.date_format),
            CellValue::Iso(s) => s.clone(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => config.empty_cell_text.clone(),
        }
    }

    /// 列見出しをフォーマット
    ///
    /// 空の見出しは`Unnamed: {列番号}`になります。
    pub fn format_header(&self, value: &CellValue, col: usize, config: &PipelineConfig) -> String {
        if value.is_empty() {
            format!("Unnamed: {}", col)
        } else {
            self.format_cell(value, config)
        }
    }
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// 日付フォーマッター
#[derive(Debug)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    pub fn format(&self, value: &NaiveDateTime, format: &DateFormat) -> String {
        match format {
            DateFormat::Iso8601 => {
                let time = value.time();
                if time.hour() == 0 && time.minute() == 0 && time.second() == 0 {
                    value.format("%Y-%m-%d").to_string()
                } else {
                    value.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            DateFormat::Custom(format_str) => value.format(format_str).to_string(),
        }
    }
}

/// 数値フォーマッター
///
/// 整数値の浮動小数点数は小数部なしで出力します（`3.0` → `3`）。
#[derive(Debug)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    /// 整数として表示できる上限（f64で正確に表現できる範囲）
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    pub fn format(&self, value: f64) -> String {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < Self::MAX_EXACT {
            format!("{}", value as i64)
        } else {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_number_formatting() {
        let formatter = NumberFormatter;
        assert_eq!(formatter.format(3.0), "3");
        assert_eq!(formatter.format(-12.0), "-12");
        assert_eq!(formatter.format(2.5), "2.5");
        assert_eq!(formatter.format(f64::NAN), "NaN");
        assert_eq!(formatter.format(1e300), 1e300f64.to_string());
    }

    #[test]
    fn test_format_cell_scalars() {
        let formatter = CellFormatter::new();
        let config = config();

        assert_eq!(formatter.format_cell(&CellValue::Int(7), &config), "7");
        assert_eq!(formatter.format_cell(&CellValue::Bool(true), &config), "True");
        assert_eq!(formatter.format_cell(&CellValue::Bool(false), &config), "False");
        assert_eq!(
            formatter.format_cell(&CellValue::Error("#DIV/0!".to_string()), &config),
            "#DIV/0!"
        );
        assert_eq!(formatter.format_cell(&CellValue::Empty, &config), "NaN");
    }

    #[test]
    fn test_format_cell_flattens_line_breaks() {
        let formatter = CellFormatter::new();
        let value = CellValue::String("voto\r\nnoboa\nmesa 3".to_string());
        assert_eq!(formatter.format_cell(&value, &config()), "voto noboa mesa 3");
    }

    #[test]
    fn test_whitespace_only_string_is_kept() {
        let formatter = CellFormatter::new();
        let config = config();
        assert_eq!(
            formatter.format_cell(&CellValue::String("   ".to_string()), &config),
            "   "
        );
        assert_eq!(formatter.format_cell(&CellValue::String(String::new()), &config), "NaN");
        assert_eq!(
            formatter.format_header(&CellValue::String(" ".to_string()), 1, &config),
            " "
        );
    }

    #[test]
    fn test_custom_empty_cell_text() {
        let formatter = CellFormatter::new();
        let config = PipelineConfig {
            empty_cell_text: String::new(),
            ..Default::default()
        };
        assert_eq!(formatter.format_cell(&CellValue::Empty, &config), "");
    }

    #[test]
    fn test_date_formatting() {
        let formatter = DateFormatter;
        assert_eq!(
            formatter.format(&datetime(2025, 1, 2, 0, 0), &DateFormat::Iso8601),
            "2025-01-02"
        );
        assert_eq!(
            formatter.format(&datetime(2025, 1, 2, 8, 30), &DateFormat::Iso8601),
            "2025-01-02 08:30:00"
        );
        assert_eq!(
            formatter.format(
                &datetime(2025, 4, 13, 0, 0),
                &DateFormat::Custom("%d/%m/%Y".to_string())
            ),
            "13/04/2025"
        );
    }

    #[test]
    fn test_format_header_unnamed() {
        let formatter = CellFormatter::new();
        let config = config();
        assert_eq!(formatter.format_header(&CellValue::Empty, 2, &config), "Unnamed: 2");
        assert_eq!(
            formatter.format_header(&CellValue::String("Mesa".to_string()), 0, &config),
            "Mesa"
        );
    }
}
