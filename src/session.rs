//! Session Module
//!
//! 会話履歴と読み込み済み文書を保持する明示的なコンテキスト。
//! 所有者は呼び出し側（UI層）で、パイプラインには`&mut`で渡されます。

use serde::Serialize;

use crate::types::ExtractedDocument;

/// 会話履歴上の役割（利用者とアシスタントのみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// 会話履歴の1メッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// 追記のみの会話履歴
///
/// 画面の再描画ごとに先頭から順にすべて再生されます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// 解析済みのワークブック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub file_name: String,
    pub document: ExtractedDocument,
}

/// パイプライン呼び出しの間で引き継がれる状態
///
/// パイプラインはすべての失敗し得る処理が成功した後にのみ更新するため、
/// エラー時には以前の状態がそのまま残ります。
#[derive(Debug, Clone, Default)]
pub struct Session {
    transcript: Transcript,
    document: Option<LoadedDocument>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// 直近に解析したワークブック
    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub(crate) fn record_upload(&mut self, loaded: LoadedDocument, reply: &str) {
        self.transcript.push_user(format!("Subido: {}", loaded.file_name));
        self.transcript.push_assistant(reply);
        self.document = Some(loaded);
    }

    pub(crate) fn record_exchange(&mut self, question: &str, answer: &str) {
        self.transcript.push_user(question);
        self.transcript.push_assistant(answer);
    }
}
