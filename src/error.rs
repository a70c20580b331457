//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxtallyクレート全体で使用するエラー型
///
/// どのエラーもプロセスを終了させるものではなく、現在のパイプライン実行のみを
/// 中断します。呼び出し側が保持する`Session`（会話履歴）はそのまま残ります。
///
/// # エラーの種類
///
/// - `Io`: 入力の読み込み中に発生したエラー
/// - `MalformedWorkbook`: スプレッドシートとして解析できない入力
/// - `UnsupportedFormat`: XLSX/XLS以外のコンテナ
/// - `EmptyDocument`: 抽出結果が空のためオラクルを呼び出さなかった
/// - `NoDocumentLoaded`: 質問時にワークブックが読み込まれていない
/// - `OracleUnavailable` / `OracleAuth` / `OracleRateLimited`: オラクル呼び出しの失敗
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: 入力サイズやZIP構造の制限違反
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtally::XlsxTallyError;
/// use std::fs::File;
///
/// fn open_upload(path: &str) -> Result<File, XlsxTallyError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxTallyError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力バイト列をスプレッドシートとして解析できなかったエラー
    ///
    /// calamineまたはZIPアーカイブの解析エラーのメッセージを保持します。
    /// 抽出処理の前にパイプラインは中断されます。
    #[error("Malformed workbook: {0}")]
    MalformedWorkbook(String),

    /// XLSX/XLS以外のスプレッドシート形式
    #[error("Unsupported workbook format: {0}")]
    UnsupportedFormat(String),

    /// 正規化後のテキストが空
    ///
    /// 空のプロンプトを送信しないよう、オラクル呼び出しの前に検出されます。
    #[error("Extracted document is empty")]
    EmptyDocument,

    /// ワークブックが読み込まれる前に質問された
    #[error("No workbook has been analyzed in this session")]
    NoDocumentLoaded,

    /// オラクルに到達できない（ネットワーク障害、サーバーエラーなど）
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// オラクルが認証情報を拒否した
    #[error("Oracle rejected credentials: {0}")]
    OracleAuth(String),

    /// オラクルがレート制限を返した
    #[error("Oracle rate limited: {0}")]
    OracleRateLimited(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `AnalyzerBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、断片サイズが0の場合や、オラクル設定が
    /// 与えられていない場合などです。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxtally::{AnalyzerBuilder, XlsxTallyError};
    ///
    /// let result = AnalyzerBuilder::new().build();
    ///
    /// match result {
    ///     Err(XlsxTallyError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<calamine::Error> for XlsxTallyError {
    fn from(err: calamine::Error) -> Self {
        XlsxTallyError::MalformedWorkbook(err.to_string())
    }
}

impl From<crate::oracle::OracleError> for XlsxTallyError {
    fn from(err: crate::oracle::OracleError) -> Self {
        use crate::oracle::OracleError;

        match err {
            OracleError::Unavailable(msg) => XlsxTallyError::OracleUnavailable(msg),
            OracleError::Auth(msg) => XlsxTallyError::OracleAuth(msg),
            OracleError::RateLimited(msg) => XlsxTallyError::OracleRateLimited(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxTallyError = io_err.into();

        match error {
            XlsxTallyError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_calamine_error_becomes_malformed_workbook() {
        let parse_err = calamine::Error::Msg("Invalid file format");
        let error: XlsxTallyError = parse_err.into();

        match error {
            XlsxTallyError::MalformedWorkbook(msg) => {
                assert!(msg.contains("Invalid file format"));
            }
            _ => panic!("Expected MalformedWorkbook error"),
        }
    }

    #[test]
    fn test_oracle_error_mapping() {
        let error: XlsxTallyError = OracleError::Unavailable("connection reset".to_string()).into();
        assert!(matches!(error, XlsxTallyError::OracleUnavailable(ref m) if m == "connection reset"));

        let error: XlsxTallyError = OracleError::Auth("invalid key".to_string()).into();
        assert!(matches!(error, XlsxTallyError::OracleAuth(_)));

        let error: XlsxTallyError = OracleError::RateLimited("429".to_string()).into();
        assert!(matches!(error, XlsxTallyError::OracleRateLimited(_)));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxTallyError> {
            let _file = std::fs::File::open("nonexistent_upload.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxTallyError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    // エラーメッセージのフォーマット確認
    #[test]
    fn test_all_error_formats() {
        let io_err: XlsxTallyError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let malformed: XlsxTallyError = calamine::Error::Msg("test parse").into();
        assert!(malformed.to_string().starts_with("Malformed workbook"));

        assert_eq!(
            XlsxTallyError::EmptyDocument.to_string(),
            "Extracted document is empty"
        );

        let config_err = XlsxTallyError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let security_err = XlsxTallyError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));
    }
}
