//! Text Normalizer Module
//!
//! 抽出テキストから記号類を取り除き、空白を1つのスペースにまとめる。

/// 英数字以外で保持するアクセント付き文字
const ACCENTED: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'Á', 'É', 'Í', 'Ó', 'Ú', 'ñ', 'Ñ'];

fn is_space(c: char) -> bool {
    // U+001C..U+001F は char::is_whitespace に含まれない
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || ACCENTED.contains(&c)
}

/// テキストを正規化する
///
/// 1. ASCII英数字、`áéíóúÁÉÍÓÚñÑ`、空白以外の文字を削除
/// 2. 連続する空白を1つのスペースに置換
/// 3. 先頭・末尾の空白を除去
///
/// 削除を先に行うため、結果は常に単一スペース区切りとなり、
/// `normalize(normalize(x)) == normalize(x)`が成り立ちます。
///
/// # 使用例
///
/// ```rust
/// use xlsxtally::normalize;
///
/// assert_eq!(normalize("  ¡Voto  NOBOA!\n\t(mesa #3) "), "Voto NOBOA mesa 3");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_space(c) {
            pending_space = true;
        } else if is_kept(c) {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.push(c);
        }
    }

    normalized
}
