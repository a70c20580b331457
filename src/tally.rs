//! Vote Tally Module
//!
//! 3つの固定カテゴリ（VOTO NOBOA / VOTO LUISA / VOTO NULO）の集計を行う。
//! カウンタは加算のみで、減算されることはない。

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::api::UnknownLabelPolicy;

/// 投票カテゴリ（閉じた列挙）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VoteCategory {
    Noboa,
    Luisa,
    Nulo,
}

impl VoteCategory {
    /// すべてのカテゴリ（表示順）
    pub const ALL: [VoteCategory; 3] = [VoteCategory::Noboa, VoteCategory::Luisa, VoteCategory::Nulo];

    /// 表示用ラベル（例: `VOTO NOBOA`）
    pub fn label(self) -> &'static str {
        match self {
            VoteCategory::Noboa => "VOTO NOBOA",
            VoteCategory::Luisa => "VOTO LUISA",
            VoteCategory::Nulo => "VOTO NULO",
        }
    }

    /// 応答テキスト内で数える小文字の語句
    pub fn phrase(self) -> &'static str {
        match self {
            VoteCategory::Noboa => "voto noboa",
            VoteCategory::Luisa => "voto luisa",
            VoteCategory::Nulo => "voto nulo",
        }
    }

    fn bare_name(self) -> &'static str {
        match self {
            VoteCategory::Noboa => "noboa",
            VoteCategory::Luisa => "luisa",
            VoteCategory::Nulo => "nulo",
        }
    }

    fn index(self) -> usize {
        match self {
            VoteCategory::Noboa => 0,
            VoteCategory::Luisa => 1,
            VoteCategory::Nulo => 2,
        }
    }
}

impl std::fmt::Display for VoteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// オラクルが返したラベルの解釈結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelMatch {
    /// 既知のカテゴリ
    Category(VoteCategory),

    /// どのカテゴリにも一致しないラベル（元の文字列を保持）
    Unknown(String),
}

/// オラクルのラベル文字列をカテゴリに対応付ける
///
/// 前後の空白・引用符・句読点を除き、大文字小文字を区別せず、
/// 内部の空白をまとめたうえで`voto noboa`または`noboa`のような
/// 完全一致のみを受け付けます。部分一致は行いません。
///
/// ```rust
/// use xlsxtally::{classify_label, LabelMatch, VoteCategory};
///
/// assert_eq!(classify_label(" 'VOTO NOBOA'. "), LabelMatch::Category(VoteCategory::Noboa));
/// assert_eq!(classify_label("Luisa"), LabelMatch::Category(VoteCategory::Luisa));
/// assert!(matches!(classify_label("no es un voto"), LabelMatch::Unknown(_)));
/// ```
pub fn classify_label(raw: &str) -> LabelMatch {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    let key = trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    VoteCategory::ALL
        .into_iter()
        .find(|category| key == category.phrase() || key == category.bare_name())
        .map(LabelMatch::Category)
        .unwrap_or_else(|| LabelMatch::Unknown(raw.to_string()))
}

/// 3カテゴリの集計結果
///
/// 常に3つのキーをすべて持ち、値は非負です。
/// JSONではラベルをキーとする順序付きマップとしてシリアライズされます。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    counts: [u64; 3],
}

impl VoteTally {
    /// すべて0の集計
    pub fn new() -> Self {
        Self::default()
    }

    /// 応答テキスト中の各カテゴリ語句の出現回数を数える
    ///
    /// 大文字小文字を区別せず、重ならない出現のみを数えます。
    ///
    /// ```rust
    /// use xlsxtally::{VoteCategory, VoteTally};
    ///
    /// let tally = VoteTally::from_response("voto noboa voto noboa voto luisa");
    /// assert_eq!(tally.get(VoteCategory::Noboa), 2);
    /// assert_eq!(tally.get(VoteCategory::Luisa), 1);
    /// assert_eq!(tally.get(VoteCategory::Nulo), 0);
    /// ```
    pub fn from_response(response: &str) -> Self {
        let lowered = response.to_lowercase();
        let mut tally = Self::new();
        for category in VoteCategory::ALL {
            tally.add(category, lowered.matches(category.phrase()).count() as u64);
        }
        tally
    }

    /// カテゴリの件数
    pub fn get(&self, category: VoteCategory) -> u64 {
        self.counts[category.index()]
    }

    /// 1件加算
    pub fn record(&mut self, category: VoteCategory) {
        self.add(category, 1);
    }

    /// `count`件加算
    pub fn add(&mut self, category: VoteCategory, count: u64) {
        let slot = &mut self.counts[category.index()];
        *slot = slot.saturating_add(count);
    }

    /// 別の集計を加算する
    pub fn merge(&mut self, other: &VoteTally) {
        for category in VoteCategory::ALL {
            self.add(category, other.get(category));
        }
    }

    /// 全カテゴリの合計
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(カテゴリ, 件数)`を表示順に返す
    pub fn iter(&self) -> impl Iterator<Item = (VoteCategory, u64)> + '_ {
        VoteCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// 1カテゴリ1行の要約テキスト
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(category, count)| format!("{}: {}", category.label(), count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for VoteTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(VoteCategory::ALL.len()))?;
        for (category, count) in self.iter() {
            map.serialize_entry(category.label(), &count)?;
        }
        map.end()
    }
}

/// 分類できなかった断片の警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnclassifiedFragment {
    /// 断片のインデックス（0始まり）
    pub index: usize,

    /// オラクルが返したラベル
    pub label: String,
}

/// 断片ごとのラベルを累積する
#[derive(Debug, Clone)]
pub struct TallyAccumulator {
    tally: VoteTally,
    policy: UnknownLabelPolicy,
    warnings: Vec<UnclassifiedFragment>,
    seen: usize,
}

impl TallyAccumulator {
    pub fn new(policy: UnknownLabelPolicy) -> Self {
        Self {
            tally: VoteTally::new(),
            policy,
            warnings: Vec::new(),
            seen: 0,
        }
    }

    /// 次の断片のラベルを取り込む
    pub fn accept(&mut self, label: &str) -> LabelMatch {
        let index = self.seen;
        self.seen += 1;

        let matched = classify_label(label);
        match &matched {
            LabelMatch::Category(category) => self.tally.record(*category),
            LabelMatch::Unknown(raw) => match self.policy {
                UnknownLabelPolicy::Ignore => {
                    log::debug!("ignoring unrecognized label for fragment {}: {:?}", index, raw);
                }
                UnknownLabelPolicy::Warn => {
                    log::warn!("fragment {} returned unrecognized label {:?}", index, raw);
                    self.warnings.push(UnclassifiedFragment {
                        index,
                        label: raw.clone(),
                    });
                }
            },
        }
        matched
    }

    /// これまでに取り込んだ断片数
    pub fn fragments_seen(&self) -> usize {
        self.seen
    }

    /// 集計結果と警告を取り出す
    pub fn finish(self) -> (VoteTally, Vec<UnclassifiedFragment>) {
        (self.tally, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_substring_count_example() {
        let tally = VoteTally::from_response("voto noboa voto noboa voto luisa");
        assert_eq!(tally.get(VoteCategory::Noboa), 2);
        assert_eq!(tally.get(VoteCategory::Luisa), 1);
        assert_eq!(tally.get(VoteCategory::Nulo), 0);
    }

    #[test]
    fn test_substring_count_is_case_insensitive() {
        let tally = VoteTally::from_response("VOTO NULO, Voto Nulo y voto nulo.");
        assert_eq!(tally.get(VoteCategory::Nulo), 3);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_substring_count_ignores_partial_phrases() {
        let tally = VoteTally::from_response("noboa luisa nulo voto");
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn test_classify_label_variants() {
        assert_eq!(classify_label("VOTO NOBOA"), LabelMatch::Category(VoteCategory::Noboa));
        assert_eq!(classify_label("\"voto   luisa\"\n"), LabelMatch::Category(VoteCategory::Luisa));
        assert_eq!(classify_label("Nulo."), LabelMatch::Category(VoteCategory::Nulo));
        assert_eq!(
            classify_label("La respuesta es VOTO NOBOA"),
            LabelMatch::Unknown("La respuesta es VOTO NOBOA".to_string())
        );
        assert!(matches!(classify_label(""), LabelMatch::Unknown(_)));
    }

    #[test]
    fn test_accumulator_warns_on_unknown() {
        let mut acc = TallyAccumulator::new(UnknownLabelPolicy::Warn);
        acc.accept("VOTO NOBOA");
        acc.accept("sin mención");
        acc.accept("voto nulo");
        assert_eq!(acc.fragments_seen(), 3);

        let (tally, warnings) = acc.finish();
        assert_eq!(tally.get(VoteCategory::Noboa), 1);
        assert_eq!(tally.get(VoteCategory::Nulo), 1);
        assert_eq!(
            warnings,
            vec![UnclassifiedFragment {
                index: 1,
                label: "sin mención".to_string()
            }]
        );
    }

    #[test]
    fn test_accumulator_ignore_policy_drops_unknown() {
        let mut acc = TallyAccumulator::new(UnknownLabelPolicy::Ignore);
        acc.accept("???");
        acc.accept("luisa");
        let (tally, warnings) = acc.finish();
        assert_eq!(tally.get(VoteCategory::Luisa), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_merge_and_summary() {
        let mut a = VoteTally::new();
        a.record(VoteCategory::Noboa);
        let mut b = VoteTally::new();
        b.add(VoteCategory::Nulo, 4);
        a.merge(&b);

        assert_eq!(a.summary(), "VOTO NOBOA: 1\nVOTO LUISA: 0\nVOTO NULO: 4");
    }

    #[test]
    fn test_serializes_all_three_keys_in_order() {
        let tally = VoteTally::from_response("voto luisa");
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"VOTO NOBOA":0,"VOTO LUISA":1,"VOTO NULO":0}"#);
    }

    proptest! {
        #[test]
        fn test_tally_always_has_three_keys(text in any::<String>()) {
            let tally = VoteTally::from_response(&text);
            let value = serde_json::to_value(tally).unwrap();
            let map = value.as_object().unwrap();
            prop_assert_eq!(map.len(), 3);
            for category in VoteCategory::ALL {
                prop_assert!(map[category.label()].as_u64().is_some());
            }
        }
    }
}
