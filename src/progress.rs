//! Progress Reporting
//!
//! 変換処理の進捗を受け取るオブザーバー。変換処理そのものは進捗表示に依存せず、
//! 呼び出し側が必要な場合だけ実装を渡します。

use std::path::Path;

use crate::types::Row;

/// 進捗オブザーバー
///
/// すべてのメソッドは何もしないデフォルト実装を持つため、必要な通知だけを
/// 実装できます。
///
/// # 使用例
///
/// ```rust
/// use std::path::Path;
/// use xlsx2qif::ProgressObserver;
///
/// #[derive(Default)]
/// struct FileCounter(usize);
///
/// impl ProgressObserver for FileCounter {
///     fn file_started(&mut self, _path: &Path, _index: usize, _total: usize) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait ProgressObserver {
    /// ファイルの読み込みを開始した（`index`は0始まり）
    fn file_started(&mut self, _path: &Path, _index: usize, _total: usize) {}

    /// 取引行を1件抽出した
    fn row_extracted(&mut self, _row: &Row) {}

    /// QIFブロックを1件書き出した（`index`は0始まり、初期残高ブロックを含む）
    fn block_written(&mut self, _index: usize, _total: usize) {}
}

/// 何も通知しないオブザーバー
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}
