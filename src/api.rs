//! Public API Types
//!
//! 公開APIで使用する列挙型と定数を定義するモジュール。

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::error::XlsxToQifError;

/// 日付列の列インデックス（0始まり）
///
/// 各シートの列は位置で解釈されます。ヘッダー行の内容は検証しないため、
/// 列の順序が異なるスプレッドシートでは値が誤った項目に割り当てられます。
pub const COLUMN_DATE: usize = 0;

/// 摘要（ラベル）列の列インデックス（0始まり）
pub const COLUMN_LABEL: usize = 1;

/// 金額列の列インデックス（0始まり）
pub const COLUMN_AMOUNT: usize = 2;

/// 既定で走査するスプレッドシートの拡張子
pub const DEFAULT_EXTENSION: &str = "xlsx";

/// 出力ファイル名
pub const OUTPUT_FILE_NAME: &str = "result.qif";

/// QIF出力の日付形式
///
/// 各ブロックの`D`行に書き出す日付の形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DateFormat {
    /// 短い日付形式（DD/MM/YYYY）
    ///
    /// 例: `11/02/2021`
    #[default]
    ShortDate,

    /// ISO 8601形式（YYYY-MM-DD）
    ///
    /// 例: `2021-02-11`
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsx2qif::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), xlsx2qif::XlsxToQifError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%m/%d/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

impl DateFormat {
    /// chrono互換のフォーマット文字列を返す
    pub fn pattern(&self) -> &str {
        match self {
            DateFormat::ShortDate => "%d/%m/%Y",
            DateFormat::Iso8601 => "%Y-%m-%d",
            DateFormat::Custom(pattern) => pattern,
        }
    }

    /// 日付をこの形式の文字列に変換
    ///
    /// 時刻やタイムゾーンの書式指定子（`%H`、`%z`など）は日付だけからは出力できないため、
    /// そのような形式はエラーになります。
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 変換した日付
    /// * `Err(XlsxToQifError::Config)` - 形式が日付を出力できない場合
    pub fn render(&self, date: NaiveDate) -> Result<String, XlsxToQifError> {
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(self.pattern())).map_err(|_| {
            XlsxToQifError::Config(format!(
                "Date format '{}' cannot render a calendar date",
                self.pattern()
            ))
        })?;
        Ok(rendered)
    }
}
