//! Row Extractor
//!
//! 複数のスプレッドシートから取引行を抽出し、日付の昇順に並べ替えます。

use std::path::Path;

use tracing::debug;

use crate::error::XlsxToQifError;
use crate::parser::WorkbookParser;
use crate::progress::ProgressObserver;
use crate::types::Row;

/// 取引行の抽出器
///
/// 各ファイルのすべてのシートを走査し、取引行を1つの列にまとめます。
/// 結果は日付の昇順に安定ソートされるため、入力ファイルの順序は結果に影響しません。
#[derive(Debug, Clone, Copy, Default)]
pub struct RowExtractor;

impl RowExtractor {
    /// 新しい抽出器を生成
    pub fn new() -> Self {
        Self
    }

    /// ファイル群から取引行を抽出
    ///
    /// # 引数
    ///
    /// * `paths` - スプレッドシートのパス
    /// * `progress` - 進捗オブザーバー
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Row>)` - 日付の昇順に並んだ取引行（`paths`が空なら空のベクター）
    /// * `Err(XlsxToQifError)` - いずれかのファイル・シート・行の解析に失敗した場合。
    ///   途中まで抽出した行は破棄されます。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsx2qif::{NoProgress, RowExtractor};
    ///
    /// # fn main() -> Result<(), xlsx2qif::XlsxToQifError> {
    /// let rows = RowExtractor::new().extract(&["2024-01.xlsx", "2024-02.xlsx"], &mut NoProgress)?;
    /// for row in &rows {
    ///     println!("{} {}", row.date(), row.amount());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract<P: AsRef<Path>>(
        &self,
        paths: &[P],
        progress: &mut dyn ProgressObserver,
    ) -> Result<Vec<Row>, XlsxToQifError> {
        let mut rows = Vec::new();

        for (index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            progress.file_started(path, index, paths.len());
            debug!(file = %path.display(), "reading spreadsheet");

            // ファイルハンドルはこのループの1回分だけ保持する
            let mut parser = WorkbookParser::open(path)?;
            for sheet_name in parser.sheet_names() {
                for row in parser.parse_sheet(&sheet_name)? {
                    progress.row_extracted(&row);
                    rows.push(row);
                }
            }
        }

        sort_chronologically(&mut rows);
        Ok(rows)
    }
}

/// 日付の昇順に並べ替える（安定ソート: 同じ日付の行は抽出順を保つ）
fn sort_chronologically(rows: &mut [Row]) {
    rows.sort_by_key(Row::date);
}
