//! File Discovery
//!
//! 入力ディレクトリから変換対象のスプレッドシートを列挙します。

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::XlsxToQifError;

/// ディレクトリ直下のスプレッドシートを列挙
///
/// 拡張子は大文字・小文字を区別せずに比較します。サブディレクトリは走査しません。
/// Excelが編集中に作成するロックファイル（`~$`で始まるファイル）は除外します。
///
/// # 戻り値
///
/// * `Ok(Vec<PathBuf>)` - パス順に並べたファイルの一覧（該当なしの場合は空）
/// * `Err(XlsxToQifError::Io)` - ディレクトリを読み込めない場合
pub fn discover_spreadsheets<P: AsRef<Path>>(
    dir: P,
    extension: &str,
) -> Result<Vec<PathBuf>, XlsxToQifError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        let is_lock_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("~$"));

        if matches_extension && !is_lock_file {
            trace!(file = %path.display(), "found spreadsheet");
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
