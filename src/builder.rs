//! Builder Module
//!
//! Fluent Builder APIを提供し、`Analyzer`インスタンスを段階的に構築する。
//! `Analyzer`は抽出・正規化・断片化・集計のパイプラインのファサードです。

use crate::api::{
    DateFormat, DocumentLimit, OutputFormat, SheetSelector, TallyStrategy, UnknownLabelPolicy,
    DEFAULT_DOCUMENT_CAP, DEFAULT_FRAGMENT_SIZE,
};
use crate::error::XlsxTallyError;
use crate::formatter::CellFormatter;
use crate::fragment::fragments;
use crate::normalize::normalize;
use crate::oracle::{ClassificationOracle, OracleConfig};
use crate::output::{assemble_document, OutputFormatter, VoteChart};
use crate::parser::WorkbookParser;
use crate::security::SecurityConfig;
use crate::session::{LoadedDocument, Session};
use crate::tally::{TallyAccumulator, UnclassifiedFragment, VoteTally};
use crate::types::{ExtractedDocument, SheetTable};
use chrono::format::{Item, StrftimeItems};
use rayon::prelude::*;
use std::io::{Read, Seek};
use std::num::NonZeroUsize;

/// パイプラインの設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 日付形式
    pub date_format: DateFormat,

    /// シート本文のテキスト表現
    pub output_format: OutputFormat,

    /// 空セルの表示
    pub empty_cell_text: String,

    /// 抽出テキストの長さの方針
    pub document_limit: DocumentLimit,

    /// 断片の最大文字数
    pub fragment_size: NonZeroUsize,

    /// 質問時に送る文書の最大文字数
    pub question_context_size: usize,

    /// 集計戦略
    pub strategy: TallyStrategy,

    /// 未知ラベルの扱い
    pub unknown_label_policy: UnknownLabelPolicy,

    /// 入力のセキュリティ制限
    pub security: SecurityConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::All,
            date_format: DateFormat::Iso8601,
            output_format: OutputFormat::PlainText,
            empty_cell_text: "NaN".to_string(),
            document_limit: DocumentLimit::Unbounded,
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            question_context_size: DEFAULT_DOCUMENT_CAP,
            strategy: TallyStrategy::SubstringCount,
            unknown_label_policy: UnknownLabelPolicy::Warn,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値がありますが、オラクル設定だけは必須です。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtally::{AnalyzerBuilder, OracleConfig, TallyStrategy};
///
/// # fn main() -> Result<(), xlsxtally::XlsxTallyError> {
/// let analyzer = AnalyzerBuilder::new()
///     .with_oracle_config(OracleConfig::from_env("OPENAI_API_KEY")?)
///     .with_strategy(TallyStrategy::PerFragment)
///     .with_fragment_size(1000)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AnalyzerBuilder {
    /// 内部設定（構築中）
    config: PipelineConfig,

    /// 断片サイズ（`build()`で検証）
    fragment_size: usize,

    /// オラクル設定
    oracle: Option<OracleConfig>,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 日付形式: ISO 8601
    /// - 本文形式: プレーンテキスト
    /// - 空セル: `NaN`
    /// - 文書長: 上限なし
    /// - 断片サイズ: 1000文字
    /// - 質問時の文書: 先頭4000文字
    /// - 集計戦略: 応答中の語句カウント
    /// - 未知ラベル: 警告として記録
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            fragment_size: DEFAULT_FRAGMENT_SIZE.get(),
            oracle: None,
        }
    }

    /// 抽出対象のシートを選択する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 日付の出力形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// シート本文のテキスト表現を指定する
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// 空セルの表示文字列を指定する
    pub fn with_empty_cell_text(mut self, text: impl Into<String>) -> Self {
        self.config.empty_cell_text = text.into();
        self
    }

    /// 抽出テキストの長さの方針を指定する
    ///
    /// ```rust,no_run
    /// use xlsxtally::{AnalyzerBuilder, DocumentLimit, OracleConfig, DEFAULT_DOCUMENT_CAP};
    ///
    /// let builder = AnalyzerBuilder::new()
    ///     .with_oracle_config(OracleConfig::new("sk-test"))
    ///     .with_document_limit(DocumentLimit::Capped(DEFAULT_DOCUMENT_CAP));
    /// ```
    pub fn with_document_limit(mut self, limit: DocumentLimit) -> Self {
        self.config.document_limit = limit;
        self
    }

    /// 断片の最大文字数を指定する（0は`build()`でエラー）
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size;
        self
    }

    /// 質問時に送る文書の最大文字数を指定する（0は`build()`でエラー）
    pub fn with_question_context_size(mut self, chars: usize) -> Self {
        self.config.question_context_size = chars;
        self
    }

    /// 集計戦略を指定する
    pub fn with_strategy(mut self, strategy: TallyStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// 未知ラベルの扱いを指定する
    pub fn with_unknown_label_policy(mut self, policy: UnknownLabelPolicy) -> Self {
        self.config.unknown_label_policy = policy;
        self
    }

    /// 入力バイト列の最大サイズを指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// オラクル設定を指定する（必須）
    pub fn with_oracle_config(mut self, oracle: OracleConfig) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// 設定を検証し、`Analyzer`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxTallyError::Config(String)`: 設定の検証に失敗した場合
    ///   * オラクル設定がない、または空の項目がある
    ///   * 断片サイズが0
    ///   * 文書長の上限、または質問時の文書の最大文字数が0
    ///   * カスタム日付形式が空、または不正な書式指定子を含む
    pub fn build(mut self) -> Result<Analyzer, XlsxTallyError> {
        // 1. オラクル設定の検証
        let oracle = self.oracle.take().ok_or_else(|| {
            XlsxTallyError::Config("Oracle configuration is required".to_string())
        })?;
        oracle.validate()?;

        // 2. 断片サイズの検証
        self.config.fragment_size = NonZeroUsize::new(self.fragment_size).ok_or_else(|| {
            XlsxTallyError::Config("Fragment size must be greater than zero".to_string())
        })?;

        // 3. 文書長の上限の検証
        if let DocumentLimit::Capped(0) = self.config.document_limit {
            return Err(XlsxTallyError::Config(
                "Document cap must be greater than zero".to_string(),
            ));
        }

        if self.config.question_context_size == 0 {
            return Err(XlsxTallyError::Config(
                "Question context size must be greater than zero".to_string(),
            ));
        }

        // 4. カスタム日付形式の検証
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            let invalid = format_str.is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(XlsxTallyError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        Ok(Analyzer::new(self.config, oracle))
    }
}

/// 1回の解析の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    /// 抽出された文書
    pub document: ExtractedDocument,

    /// 集計結果（常に3カテゴリ）
    pub tally: VoteTally,

    /// 会話履歴に記録されたアシスタントの応答
    pub reply: String,

    /// オラクルに送った断片の数（リクエスト数と等しい）
    pub fragment_count: usize,

    /// 分類できなかった断片
    pub warnings: Vec<UnclassifiedFragment>,
}

impl AnalysisReport {
    /// グラフ描画側に渡すデータ
    pub fn chart(&self) -> VoteChart {
        VoteChart::from_tally(&self.tally)
    }
}

/// パイプラインのファサード
///
/// `AnalyzerBuilder`で構築された設定に基づいて、ワークブックのテキスト抽出、
/// オラクルによる分類、集計、会話履歴の更新を行います。
#[derive(Debug)]
pub struct Analyzer {
    /// パイプライン設定
    config: PipelineConfig,

    /// オラクル設定
    oracle: OracleConfig,

    /// セルフォーマッター
    formatter: CellFormatter,
}

impl Analyzer {
    pub(crate) fn new(config: PipelineConfig, oracle: OracleConfig) -> Self {
        Self {
            config,
            oracle,
            formatter: CellFormatter::new(),
        }
    }

    /// ワークブックからテキストを抽出し、正規化する
    ///
    /// # 処理フロー
    ///
    /// 1. 入力をメモリに読み込み、セキュリティ制限を確認
    /// 2. calamineでワークブックを開き、シートを選択
    /// 3. 各シートを表データとして読み込む
    /// 4. 各シートをテキスト化（並列）し、シート順に連結
    /// 5. 上限が設定されていれば切り詰め、正規化
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxtally::{AnalyzerBuilder, OracleConfig};
    ///
    /// # fn main() -> Result<(), xlsxtally::XlsxTallyError> {
    /// let analyzer = AnalyzerBuilder::new()
    ///     .with_oracle_config(OracleConfig::new("sk-test"))
    ///     .build()?;
    /// let document = analyzer.extract(File::open("votos.xlsx")?)?;
    /// println!("{}", document.preview(500));
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract<R: Read + Seek>(&self, mut input: R) -> Result<ExtractedDocument, XlsxTallyError> {
        // 1. 入力データをメモリに読み込む
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;
        self.config.security.inspect(&buffer)?;

        // 2. ワークブックを開き、シートを選択
        let mut parser = WorkbookParser::open(buffer)?;
        let sheet_names = parser.select_sheets(&self.config.sheet_selector)?;

        // 3. シートの読み込み
        let tables = sheet_names
            .iter()
            .map(|name| parser.read_sheet(name, &self.formatter, &self.config))
            .collect::<Result<Vec<SheetTable>, XlsxTallyError>>()?;

        // 4. シートごとのテキスト化を並列化（collectは元の順序を保つ）
        let renderer = OutputFormatter::from_format(self.config.output_format);
        let bodies = tables
            .par_iter()
            .map(|table| renderer.render_to_string(table))
            .collect::<Result<Vec<String>, XlsxTallyError>>()?;

        let document = assemble_document(
            tables
                .iter()
                .zip(&bodies)
                .map(|(table, body)| (table.name.as_str(), body.as_str())),
        );

        // 5. 切り詰めと正規化
        let (raw_text, truncated) = apply_limit(document, self.config.document_limit);
        if truncated {
            log::warn!(
                "extracted text exceeded the document cap ({:?}); truncated before normalization",
                self.config.document_limit
            );
        }
        let text = normalize(&raw_text);

        log::info!(
            "extracted {} sheet(s): {} raw chars, {} normalized chars",
            tables.len(),
            raw_text.chars().count(),
            text.chars().count()
        );

        Ok(ExtractedDocument {
            raw_text,
            text,
            truncated,
            sheet_count: tables.len(),
        })
    }

    /// アップロードされたワークブックを解析し、投票を集計する
    ///
    /// 正規化済みテキストは`fragment_size`文字ごとの断片に分けて送信するため、
    /// 1回のリクエストに含まれる文書は常に断片サイズ以下です。
    /// 語句カウント戦略では断片ごとの応答を数えて合算し、応答文は空行で連結します。
    ///
    /// 抽出結果が空の場合はオラクルを呼び出さずに`EmptyDocument`を返します。
    /// 成功した場合のみ、`session`に「Subido: {file_name}」と応答を追記し、
    /// 文書を後続の質問のために保存します。失敗時は`session`を変更しません。
    pub fn analyze<R, O>(
        &self,
        session: &mut Session,
        file_name: &str,
        input: R,
        oracle: &O,
    ) -> Result<AnalysisReport, XlsxTallyError>
    where
        R: Read + Seek,
        O: ClassificationOracle + ?Sized,
    {
        log::info!("analyzing '{}' with {:?}", file_name, self.config.strategy);

        let document = self.extract(input)?;
        if document.is_empty() {
            return Err(XlsxTallyError::EmptyDocument);
        }

        let (tally, reply, fragment_count, warnings) = match self.config.strategy {
            TallyStrategy::SubstringCount => {
                let mut tally = VoteTally::new();
                let mut replies = Vec::new();
                for (index, fragment) in fragments(&document.text, self.config.fragment_size).enumerate() {
                    let request = self
                        .oracle
                        .request(&self.oracle.analysis_instruction, vec![fragment.to_string()]);
                    let reply = oracle.complete(&request)?;
                    let partial = VoteTally::from_response(&reply);
                    log::debug!("fragment {} counted {:?}", index, partial);
                    tally.merge(&partial);
                    replies.push(reply);
                }
                let fragment_count = replies.len();
                (tally, replies.join("\n\n"), fragment_count, Vec::new())
            }
            TallyStrategy::PerFragment => {
                let mut accumulator = TallyAccumulator::new(self.config.unknown_label_policy);
                for (index, fragment) in fragments(&document.text, self.config.fragment_size).enumerate() {
                    let request = self
                        .oracle
                        .request(&self.oracle.classification_instruction, vec![fragment.to_string()]);
                    let label = oracle.complete(&request)?;
                    let matched = accumulator.accept(&label);
                    log::debug!("fragment {} classified as {:?}", index, matched);
                }
                let fragment_count = accumulator.fragments_seen();
                let (tally, warnings) = accumulator.finish();
                (tally, tally.summary(), fragment_count, warnings)
            }
        };

        session.record_upload(
            LoadedDocument {
                file_name: file_name.to_string(),
                document: document.clone(),
            },
            &reply,
        );

        Ok(AnalysisReport {
            document,
            tally,
            reply,
            fragment_count,
            warnings,
        })
    }

    /// 読み込み済みのデータについて質問する
    ///
    /// 文書は先頭`question_context_size`文字（デフォルト4000）だけを送信します。
    /// 成功した場合のみ、質問と回答を会話履歴に追記します。
    pub fn ask<O>(&self, session: &mut Session, question: &str, oracle: &O) -> Result<String, XlsxTallyError>
    where
        O: ClassificationOracle + ?Sized,
    {
        let question = question.trim();
        if question.is_empty() {
            return Err(XlsxTallyError::Config("Question must not be empty".to_string()));
        }

        let loaded = session.document().ok_or(XlsxTallyError::NoDocumentLoaded)?;
        let context = loaded.document.preview(self.config.question_context_size);
        if context.len() < loaded.document.text.len() {
            log::warn!(
                "question context limited to the first {} chars of '{}'",
                self.config.question_context_size,
                loaded.file_name
            );
        }
        let request = self.oracle.request(
            &self.oracle.question_instruction,
            vec![format!("Datos cargados: {}", context), question.to_string()],
        );
        let answer = oracle.complete(&request)?;

        session.record_exchange(question, &answer);
        Ok(answer)
    }
}

/// 文書長の上限を適用する（文字数単位）
fn apply_limit(document: String, limit: DocumentLimit) -> (String, bool) {
    match limit {
        DocumentLimit::Unbounded => (document, false),
        DocumentLimit::Capped(max_chars) => match document.char_indices().nth(max_chars) {
            Some((idx, _)) => {
                let mut document = document;
                document.truncate(idx);
                (document, true)
            }
            None => (document, false),
        },
    }
}
