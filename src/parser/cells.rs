//! セル値の変換
//!
//! calamineのセル値（`Data`）を、取引行の各項目（日付・摘要・金額）に変換します。

use calamine::{Data, DataType};
use chrono::{NaiveDate, NaiveDateTime};

/// テキストセルとして受け付ける日付形式（日が月より先）
const DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// 日付の後ろに続いてもよい時刻部分
const TIME_SUFFIXES: &[&str] = &[
    " %H:%M:%S",
    " %H:%M",
    "T%H:%M:%S",
    "T%H:%M:%S%.f",
    "T%H:%M",
];

/// Excelシリアル値として扱う範囲（1900-01-01 〜 9999-12-31）
const MIN_SERIAL: f64 = 1.0;
const MAX_SERIAL: f64 = 2_958_466.0;

/// 日付テキストを解析
///
/// 前後の空白を取り除いたうえで、ISO形式（`2021-02-11`）、
/// スラッシュ区切り（`2021/02/11`）、日が先の短い日付形式（`11/02/2021`、
/// `11-02-2021`、`11.02.2021`）を順に試します。
/// いずれの形式にも時刻部分（`10:30`、`10:30:00`、`T10:30:00`）が続いてもかまいません。
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use xlsx2qif::parse_date_text;
///
/// let expected = NaiveDate::from_ymd_opt(2021, 2, 11);
/// assert_eq!(parse_date_text("11/02/2021"), expected);
/// assert_eq!(parse_date_text("2021-02-11T08:15:00"), expected);
/// assert_eq!(parse_date_text("tomorrow"), None);
/// ```
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            return Some(date);
        }
        for suffix in TIME_SUFFIXES {
            let pattern = format!("{}{}", pattern, suffix);
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, &pattern) {
                return Some(datetime.date());
            }
        }
    }

    None
}

/// 日付列のセルを日付に変換
///
/// 数値セルはExcelのシリアル日付値（1900年システム）として、
/// 日付セルはその日付部分として、テキストセルは`parse_date_text()`で解釈します。
/// 空セル、真偽値、エラー値は日付として扱えないため`None`を返します。
pub(crate) fn cell_date(cell: Option<&Data>) -> Option<NaiveDate> {
    match cell? {
        Data::String(s) | Data::DateTimeIso(s) => parse_date_text(s),
        Data::Float(f) if !(MIN_SERIAL..MAX_SERIAL).contains(f) => None,
        Data::Int(i) if !(MIN_SERIAL..MAX_SERIAL).contains(&(*i as f64)) => None,
        other @ (Data::Float(_) | Data::Int(_) | Data::DateTime(_)) => other.as_date(),
        _ => None,
    }
}

/// セルのテキスト表現を取得
///
/// 空セルは`None`になります。数値は最短の10進表記（`1000`、`-3.7`）になります。
pub(crate) fn cell_text(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        other => Some(other.to_string()),
    }
}

/// 摘要列のセルを摘要テキストに変換
pub(crate) fn cell_label(cell: Option<&Data>) -> Option<String> {
    cell_text(cell).map(|text| decode_label(&text))
}

/// 金額列のセルを金額テキストに変換（空セルは空文字列）
pub(crate) fn cell_amount(cell: Option<&Data>) -> String {
    cell_text(cell).unwrap_or_default()
}

/// セルが空（空セル、または空白のみの文字列）かどうか
pub(crate) fn is_blank(cell: Option<&Data>) -> bool {
    match cell {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// エクスポート時に残った`&amp;`を`&`に戻す
///
/// それ以外の実体参照（`&lt;`など）はそのまま残します。
fn decode_label(label: &str) -> String {
    label.replace("&amp;", "&")
}
