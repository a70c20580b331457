//! xlsxtally - Vote tallying over Excel workbooks with an external classification oracle
//!
//! This crate extracts the text of an Excel workbook (XLSX/XLS), normalizes it,
//! splits it into fragments, asks an external language-model oracle to classify
//! the vote mentions, and tallies them into three fixed categories:
//! `VOTO NOBOA`, `VOTO LUISA` and `VOTO NULO`. A chat transcript keeps the
//! upload and every follow-up question so a UI layer can replay it.
//!
//! The oracle client itself is not part of this crate: implement
//! [`ClassificationOracle`] over whatever HTTP client you use.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxtally::{
//!     AnalyzerBuilder, ClassificationOracle, CompletionRequest, OracleConfig, OracleError,
//!     Session,
//! };
//!
//! struct MyOracle;
//!
//! impl ClassificationOracle for MyOracle {
//!     fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
//!         // Send `request` to the hosted model and return the full reply.
//!         # let _ = request;
//!         Ok("VOTO NOBOA".to_string())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = AnalyzerBuilder::new()
//!         .with_oracle_config(OracleConfig::from_env("OPENAI_API_KEY")?)
//!         .build()?;
//!
//!     let mut session = Session::new();
//!     let report = analyzer.analyze(&mut session, "votos.xlsx", File::open("votos.xlsx")?, &MyOracle)?;
//!     println!("{}", report.tally.summary());
//!
//!     let answer = analyzer.ask(&mut session, "¿Cuántos votos nulos hay?", &MyOracle)?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Per-Fragment Classification
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxtally::{AnalyzerBuilder, DocumentLimit, OracleConfig, TallyStrategy, UnknownLabelPolicy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = AnalyzerBuilder::new()
//!         .with_oracle_config(OracleConfig::new("sk-..."))
//!         .with_strategy(TallyStrategy::PerFragment)
//!         .with_fragment_size(1000)
//!         .with_unknown_label_policy(UnknownLabelPolicy::Warn)
//!         .with_document_limit(DocumentLimit::Capped(4000))
//!         .build()?;
//!
//!     // Extraction alone does not call the oracle
//!     let document = analyzer.extract(File::open("votos.xlsx")?)?;
//!     println!("{}", document.preview(500));
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod fragment;
mod normalize;
mod oracle;
mod output;
mod parser;
mod security;
mod session;
mod tally;
mod types;

// 公開API
pub use api::{
    DateFormat, DocumentLimit, OutputFormat, SheetSelector, TallyStrategy, UnknownLabelPolicy,
    DEFAULT_DOCUMENT_CAP, DEFAULT_FRAGMENT_SIZE,
};
pub use builder::{AnalysisReport, Analyzer, AnalyzerBuilder};
pub use error::XlsxTallyError;
pub use fragment::{fragment, fragments, Fragments};
pub use normalize::normalize;
pub use oracle::{
    ClassificationOracle, CompletionRequest, OracleConfig, OracleError, PromptMessage, Role,
    DEFAULT_ANALYSIS_INSTRUCTION, DEFAULT_CLASSIFICATION_INSTRUCTION, DEFAULT_MODEL,
    DEFAULT_QUESTION_INSTRUCTION,
};
pub use output::{ChartBar, VoteChart};
pub use session::{ChatMessage, ChatRole, LoadedDocument, Session, Transcript};
pub use tally::{
    classify_label, LabelMatch, TallyAccumulator, UnclassifiedFragment, VoteCategory, VoteTally,
};
pub use types::ExtractedDocument;
