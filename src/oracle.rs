//! Oracle Module
//!
//! 外部の分類オラクル（ホスト型言語モデル）との境界を定義するモジュール。
//! 具体的な通信クライアントはこのクレートに含まれず、呼び出し側が
//! `ClassificationOracle`を実装して渡します。

use thiserror::Error;

use crate::error::XlsxTallyError;

/// デフォルトのモデル
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// 文書全体を分析させる際のシステム指示
pub const DEFAULT_ANALYSIS_INSTRUCTION: &str = "Analiza los datos y clasifica las menciones de votos en: \
'VOTO NOBOA', 'VOTO LUISA', 'VOTO NULO'. Muestra un conteo de cada categoría.";

/// 断片ごとにラベルを1つ返させる際のシステム指示
pub const DEFAULT_CLASSIFICATION_INSTRUCTION: &str = "Clasifica el siguiente fragmento en exactamente una de estas \
categorías: 'VOTO NOBOA', 'VOTO LUISA', 'VOTO NULO'. Responde solo con la categoría.";

/// 追加の質問に答えさせる際のシステム指示
pub const DEFAULT_QUESTION_INSTRUCTION: &str = "Responde preguntas basadas en los datos de votos cargados.";

/// オラクル呼び出しの失敗
///
/// このクレートは再試行を行いません。再試行方針は実装側の責務です。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// ネットワーク障害、タイムアウト、サーバーエラーなど
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// 認証情報が拒否された
    #[error("oracle authentication failed: {0}")]
    Auth(String),

    /// レート制限
    #[error("oracle rate limited: {0}")]
    RateLimited(String),
}

/// プロンプト内のメッセージの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// プロンプトの1メッセージ
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// オラクルへの1回分のリクエスト
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
}

/// 分類オラクル
///
/// 1リクエストに対して、完成した応答文字列を1つ返します。
/// ストリーミングで応答を受け取る実装は、すべてのチャンクを連結してから
/// 返さなければなりません。断片ごとの分類では、返された文字列全体が
/// 1つのラベルとして解釈されます。
pub trait ClassificationOracle {
    fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError>;
}

impl<T: ClassificationOracle + ?Sized> ClassificationOracle for &T {
    fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        (**self).complete(request)
    }
}

impl<T: ClassificationOracle + ?Sized> ClassificationOracle for Box<T> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        (**self).complete(request)
    }
}

/// オラクル呼び出しの設定
///
/// 認証情報はここで明示的に受け取り、`AnalyzerBuilder::build()`で一度だけ検証されます。
#[derive(Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    pub analysis_instruction: String,
    pub classification_instruction: String,
    pub question_instruction: String,
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("analysis_instruction", &self.analysis_instruction)
            .field("classification_instruction", &self.classification_instruction)
            .field("question_instruction", &self.question_instruction)
            .finish()
    }
}

impl OracleConfig {
    /// デフォルトのモデルと指示文で設定を作成
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            analysis_instruction: DEFAULT_ANALYSIS_INSTRUCTION.to_string(),
            classification_instruction: DEFAULT_CLASSIFICATION_INSTRUCTION.to_string(),
            question_instruction: DEFAULT_QUESTION_INSTRUCTION.to_string(),
        }
    }

    /// 環境変数から認証情報を読み込む
    ///
    /// プロセス起動時に一度だけ呼び出すことを想定しています。
    /// 変数が未設定または空の場合は`XlsxTallyError::Config`を返します。
    ///
    /// ```rust,no_run
    /// use xlsxtally::OracleConfig;
    ///
    /// # fn main() -> Result<(), xlsxtally::XlsxTallyError> {
    /// let config = OracleConfig::from_env("OPENAI_API_KEY")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_env(var: &str) -> Result<Self, XlsxTallyError> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            Ok(_) => Err(XlsxTallyError::Config(format!(
                "Environment variable {} is empty",
                var
            ))),
            Err(e) => Err(XlsxTallyError::Config(format!(
                "Environment variable {} is not available: {}",
                var, e
            ))),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_analysis_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.analysis_instruction = instruction.into();
        self
    }

    pub fn with_classification_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.classification_instruction = instruction.into();
        self
    }

    pub fn with_question_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.question_instruction = instruction.into();
        self
    }

    /// 空の項目がないことを検証
    pub fn validate(&self) -> Result<(), XlsxTallyError> {
        let fields = [
            ("api_key", &self.api_key),
            ("model", &self.model),
            ("analysis_instruction", &self.analysis_instruction),
            ("classification_instruction", &self.classification_instruction),
            ("question_instruction", &self.question_instruction),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(XlsxTallyError::Config(format!(
                    "Oracle setting '{}' must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }

    /// システム指示と利用者メッセージからリクエストを組み立てる
    pub(crate) fn request(&self, instruction: &str, user_messages: Vec<String>) -> CompletionRequest {
        let mut messages = Vec::with_capacity(user_messages.len() + 1);
        messages.push(PromptMessage::system(instruction));
        messages.extend(user_messages.into_iter().map(PromptMessage::user));

        CompletionRequest {
            model: self.model.clone(),
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::new("sk-test");
        assert_eq!(config.model, "gpt-4-turbo");
        assert!(config.analysis_instruction.contains("VOTO NOBOA"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        match OracleConfig::new("   ").validate() {
            Err(XlsxTallyError::Config(msg)) => assert!(msg.contains("api_key")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let config = OracleConfig::new("sk-test").with_model("");
        assert!(matches!(config.validate(), Err(XlsxTallyError::Config(_))));
    }

    #[test]
    fn test_from_env_missing_variable() {
        let result = OracleConfig::from_env("XLSXTALLY_TEST_KEY_THAT_IS_NEVER_SET");
        assert!(matches!(result, Err(XlsxTallyError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", OracleConfig::new("sk-secret"));
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_request_layout() {
        let config = OracleConfig::new("sk-test").with_model("m");
        let request = config.request("sys", vec!["a".to_string(), "b".to_string()]);

        assert_eq!(request.model, "m");
        assert_eq!(
            request.messages,
            vec![
                PromptMessage::system("sys"),
                PromptMessage::user("a"),
                PromptMessage::user("b"),
            ]
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
