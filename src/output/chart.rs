//! Chart Payload
//!
//! 外部のグラフ描画側に渡す棒グラフのデータ。描画自体は行わない。

use serde::Serialize;

use crate::tally::{VoteCategory, VoteTally};

const TITLE: &str = "Distribución de Votos";
const X_AXIS_LABEL: &str = "Categoría";
const Y_AXIS_LABEL: &str = "Cantidad de Votos";

/// 棒1本分のデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub count: u64,
    pub color: &'static str,
}

/// 3本の棒からなるカテゴリ別棒グラフ
///
/// 棒の順序と色は固定です（NOBOA: blue, LUISA: green, NULO: red）。
///
/// ```rust
/// use xlsxtally::{VoteChart, VoteTally};
///
/// let chart = VoteChart::from_tally(&VoteTally::from_response("voto nulo"));
/// assert_eq!(chart.bars.len(), 3);
/// assert_eq!(chart.bars[2].count, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteChart {
    pub title: &'static str,
    pub x_axis_label: &'static str,
    pub y_axis_label: &'static str,
    pub bars: Vec<ChartBar>,
}

impl VoteChart {
    pub fn from_tally(tally: &VoteTally) -> Self {
        let bars = tally
            .iter()
            .map(|(category, count)| ChartBar {
                label: category.label(),
                count,
                color: bar_color(category),
            })
            .collect();

        Self {
            title: TITLE,
            x_axis_label: X_AXIS_LABEL,
            y_axis_label: Y_AXIS_LABEL,
            bars,
        }
    }

    /// JSON文字列に変換
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn bar_color(category: VoteCategory) -> &'static str {
    match category {
        VoteCategory::Noboa => "blue",
        VoteCategory::Luisa => "green",
        VoteCategory::Nulo => "red",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_has_fixed_shape() {
        let mut tally = VoteTally::new();
        tally.add(VoteCategory::Luisa, 5);
        let chart = VoteChart::from_tally(&tally);

        assert_eq!(chart.title, "Distribución de Votos");
        assert_eq!(chart.y_axis_label, "Cantidad de Votos");
        let labels: Vec<_> = chart.bars.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["VOTO NOBOA", "VOTO LUISA", "VOTO NULO"]);
        let counts: Vec<_> = chart.bars.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 5, 0]);
    }

    #[test]
    fn test_chart_json() {
        let chart = VoteChart::from_tally(&VoteTally::new());
        let value: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(value["bars"][0]["color"], "blue");
        assert_eq!(value["x_axis_label"], "Categoría");
    }
}
