//! Parser Module
//!
//! calamineを使用したスプレッドシート解析。
//! ワークシートの各データ行を取引行（`Row`）に変換します。

mod cells;
mod workbook;

pub use cells::parse_date_text;
pub(crate) use workbook::WorkbookParser;
