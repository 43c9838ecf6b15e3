//! Workbook Parser
//!
//! calamineのワークブックをラップし、シート単位で取引行を抽出します。

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Reader, Sheets};
use tracing::{debug, trace};

use super::cells::{cell_amount, cell_date, cell_label, cell_text, is_blank};
use crate::api::{COLUMN_AMOUNT, COLUMN_DATE, COLUMN_LABEL};
use crate::error::XlsxToQifError;
use crate::types::Row;

/// ワークブックパーサー
///
/// 1ファイル分のワークブックを保持します。ファイルハンドルはこの構造体が
/// 破棄された時点で閉じられるため、ファイルごとにスコープを区切って使用します。
pub(crate) struct WorkbookParser {
    /// 読み込み中のファイルパス（エラーメッセージ用）
    path: PathBuf,
    /// calamineのワークブック（xlsx / xlsm / xlsb / xls / ods）
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(XlsxToQifError::Parse)` - ファイルが存在しない、または形式が不正な場合
    pub fn open(path: &Path) -> Result<Self, XlsxToQifError> {
        let workbook = open_workbook_auto(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シートのデータ行を取引行に変換
    ///
    /// シートの1行目はヘッダーとして読み飛ばします。各データ行は列位置で解釈し
    /// （`COLUMN_DATE` / `COLUMN_LABEL` / `COLUMN_AMOUNT`）、それ以降の列は無視します。
    /// 行・列はセルが存在する範囲ではなく、シートの1行目・A列からの位置です。
    /// 日付・摘要・金額がすべて空の行は区切り行とみなして読み飛ばします。
    ///
    /// 行は最終行から先頭行に向かって走査します。銀行のエクスポートは新しい順に
    /// 並んでいることが多く、同じ日付の行を後段の安定ソートで古い順に保つためです。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Row>)` - 抽出した取引行（シート内の逆順）
    /// * `Err(XlsxToQifError::Sheet)` - シートの読み込みに失敗した場合
    /// * `Err(XlsxToQifError::InvalidDate)` - 日付列を日付として解析できない行がある場合
    pub fn parse_sheet(&mut self, sheet_name: &str) -> Result<Vec<Row>, XlsxToQifError> {
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| XlsxToQifError::Sheet {
                file: self.path.clone(),
                sheet: sheet_name.to_string(),
                message: e.to_string(),
            })?;

        // 使用範囲は最初の非空セルから始まるため、行・列はシート上の絶対位置で参照する
        let Some((end_row, _)) = range.end() else {
            trace!(sheet = sheet_name, "empty sheet");
            return Ok(Vec::new());
        };
        let cell = |row: u32, column: usize| range.get_value((row, column as u32));

        let mut rows = Vec::new();
        // シートの1行目（絶対行0）はヘッダー
        for sheet_row in (1..=end_row).rev() {
            let date_cell = cell(sheet_row, COLUMN_DATE);
            let label_cell = cell(sheet_row, COLUMN_LABEL);
            let amount_cell = cell(sheet_row, COLUMN_AMOUNT);

            if is_blank(date_cell) && is_blank(label_cell) && is_blank(amount_cell) {
                trace!(sheet = sheet_name, row = sheet_row + 1, "skipping blank row");
                continue;
            }

            let date = cell_date(date_cell).ok_or_else(|| XlsxToQifError::InvalidDate {
                file: self.path.clone(),
                sheet: sheet_name.to_string(),
                row: sheet_row as usize + 1,
                value: cell_text(date_cell).unwrap_or_default(),
            })?;

            rows.push(Row::new(
                date,
                cell_label(label_cell),
                cell_amount(amount_cell),
            ));
        }

        debug!(
            file = %self.path.display(),
            sheet = sheet_name,
            rows = rows.len(),
            "parsed sheet"
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = WorkbookParser::open(Path::new("definitely/missing/statement.xlsx"));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_not_a_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        match WorkbookParser::open(&path) {
            Err(XlsxToQifError::Parse(_)) => {}
            Err(e) => panic!("Expected Parse error, got {e}"),
            Ok(_) => panic!("Expected Parse error"),
        }
    }
}
