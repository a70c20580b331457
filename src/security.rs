//! Security Module
//!
//! アップロードされたバイト列に対するセキュリティ対策を実装するモジュール。
//! 入力サイズ制限、ZIP bomb攻撃、パストラバーサル攻撃への対策を提供します。

use std::io::Cursor;

use zip::ZipArchive;

use crate::error::XlsxTallyError;

/// ZIPローカルファイルヘッダーのシグネチャ（XLSXコンテナの先頭）
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_file_size: 104_857_600,         // 100MB
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力バイト列を検査する
    ///
    /// サイズ上限を確認し、ZIPコンテナ（XLSX）であればアーカイブ内の
    /// エントリ数・エントリサイズ・パスも検証します。XLSのような
    /// 非ZIPコンテナはサイズ上限のみ検査し、解析はcalamineに任せます。
    pub fn inspect(&self, buffer: &[u8]) -> Result<(), XlsxTallyError> {
        if buffer.len() as u64 > self.max_input_file_size {
            return Err(XlsxTallyError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                buffer.len(),
                self.max_input_file_size
            )));
        }

        if buffer.starts_with(ZIP_MAGIC) {
            self.inspect_zip(buffer)?;
        }

        Ok(())
    }

    fn inspect_zip(&self, buffer: &[u8]) -> Result<(), XlsxTallyError> {
        let mut archive = ZipArchive::new(Cursor::new(buffer))
            .map_err(|e| XlsxTallyError::MalformedWorkbook(format!("ZIP archive error: {}", e)))?;

        if archive.len() > self.max_file_count {
            return Err(XlsxTallyError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive.by_index(i).map_err(|e| {
                XlsxTallyError::MalformedWorkbook(format!("ZIP archive error: {}", e))
            })?;

            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                XlsxTallyError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(XlsxTallyError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size =
                total_decompressed_size
                    .checked_add(file_size)
                    .ok_or_else(|| {
                        XlsxTallyError::SecurityViolation(
                            "Total decompressed size calculation overflow".to_string(),
                        )
                    })?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(XlsxTallyError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// ZIPエントリのパスを検証
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（空、`..`、絶対パス、バックスラッシュ）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
