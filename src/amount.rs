//! Amount Module
//!
//! 金額テキストと10進数（`rust_decimal::Decimal`）の相互変換を提供するモジュール。
//!
//! 銀行からエクスポートされたスプレッドシートでは、金額がロケール依存の
//! 表記（`-3,7`、`1 234,56`、`1,234.56` など）で記録されていることがあります。
//! 最後に現れる `.` または `,` を小数点とみなし、それ以外の区切り文字は
//! 桁区切りとして取り除きます。

use std::str::FromStr;

use rust_decimal::Decimal;

/// 桁区切りとして無視する空白類
fn is_group_space(c: char) -> bool {
    matches!(c, ' ' | '\u{00A0}' | '\u{202F}' | '\'')
}

/// 金額テキストを10進数として解析
///
/// # 戻り値
///
/// * `Some(Decimal)` - 解析に成功した場合
/// * `None` - 空文字列、または数値として解釈できない場合
///
/// # 使用例
///
/// ```rust
/// use rust_decimal::Decimal;
/// use xlsx2qif::parse_amount;
///
/// assert_eq!(parse_amount("-3,7"), Some(Decimal::new(-37, 1)));
/// assert_eq!(parse_amount("1 234,50"), Some(Decimal::new(123450, 2)));
/// assert_eq!(parse_amount("n/a"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let compact: String = text.trim().chars().filter(|c| !is_group_space(*c)).collect();
    if compact.is_empty() {
        return None;
    }

    let dots = compact.matches('.').count();
    let commas = compact.matches(',').count();

    // 小数点の判定: 両方あれば後ろにある方、片方だけなら1回だけ現れる場合に限る
    let decimal_separator = match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) if dots == 1 => Some('.'),
        (None, Some(_)) if commas == 1 => Some(','),
        _ => None,
    };

    let normalized: String = compact
        .chars()
        .filter_map(|c| match c {
            '.' | ',' if Some(c) == decimal_separator => Some('.'),
            '.' | ',' => None,
            other => Some(other),
        })
        .collect();

    // Decimal::from_strは'_'を読み飛ばすため、数字・符号・小数点以外は事前に拒否する
    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return None;
    }

    Decimal::from_str(&normalized).ok()
}

/// 10進数を金額テキストに変換
///
/// 末尾の0を取り除いた最短表記を返します（`20.00` → `20`、`-3.70` → `-3.7`）。
pub fn format_amount(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}
