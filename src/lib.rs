//! xlsx2qif - Convert bank statement spreadsheets to QIF
//!
//! 銀行の取引明細をエクスポートしたスプレッドシート（XLSXなど）を読み込み、
//! QIF形式（`!Type:Bank`）のテキストに変換するクレートです。
//!
//! 各シートの1行目はヘッダーとして読み飛ばし、それ以降の行を
//! 「A列: 日付 / B列: 摘要 / C列: 金額」として解釈します。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsx2qif::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 取引額が記録された明細をデフォルト設定で変換
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // statements/*.xlsx を読み込み、statements/result.qif を書き込む
//!     let report = converter.convert_directory("statements", None::<&str>)?;
//!     println!("{} transactions", report.rows);
//!
//!     Ok(())
//! }
//! ```
//!
//! # 残高が記録された明細
//!
//! 金額列が取引額ではなく累積残高の場合は、`only_transactions(false)`を指定します。
//! 連続する行の残高の差が取引額として出力されます。
//!
//! ```rust,no_run
//! use rust_decimal::Decimal;
//! use xlsx2qif::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .only_transactions(false)
//!         .with_initial_amount(Decimal::new(1000, 0))
//!         .build()?;
//!
//!     let qif = converter.convert_files(&["statements/2024.xlsx"])?;
//!     print!("{}", qif);
//!
//!     Ok(())
//! }
//! ```
//!
//! # 抽出と変換を個別に使う
//!
//! ```rust,no_run
//! use rust_decimal::Decimal;
//! use xlsx2qif::{LedgerFormatter, NoProgress, RowExtractor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rows = RowExtractor::new().extract(&["statements/2024.xlsx"], &mut NoProgress)?;
//!     let qif = LedgerFormatter::new(Decimal::ZERO, true).render_to_string(&rows)?;
//!     print!("{}", qif);
//!     Ok(())
//! }
//! ```

mod amount;
mod api;
mod builder;
mod discovery;
mod error;
mod extractor;
mod formatter;
mod parser;
mod progress;
mod types;

// 公開API
pub use amount::{format_amount, parse_amount};
pub use api::{
    DateFormat, COLUMN_AMOUNT, COLUMN_DATE, COLUMN_LABEL, DEFAULT_EXTENSION, OUTPUT_FILE_NAME,
};
pub use builder::{Converter, ConverterBuilder};
pub use discovery::discover_spreadsheets;
pub use error::XlsxToQifError;
pub use extractor::RowExtractor;
pub use formatter::{LedgerFormatter, DEFAULT_LABEL, INITIAL_AMOUNT_LABEL, QIF_HEADER};
pub use parser::parse_date_text;
pub use progress::{NoProgress, ProgressObserver};
pub use types::{ConversionReport, Row};
