//! Internal Data Models
//!
//! 変換処理で受け渡すデータ構造を定義するモジュール。

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 1件の取引行
///
/// スプレッドシートの1データ行（日付・摘要・金額）を表します。
/// 生成後は変更できません。
///
/// 金額は抽出時点では数値に変換せず、セルのテキスト表現（`"-3,7"` など）を
/// そのまま保持します。数値が必要になるのは残高モードの差分計算のみです。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    date: NaiveDate,
    label: Option<String>,
    amount: String,
}

impl Row {
    /// 新しい取引行を生成
    ///
    /// # 引数
    ///
    /// * `date` - 取引日
    /// * `label` - 摘要（元セルが空の場合は`None`）
    /// * `amount` - 金額のテキスト表現
    pub fn new(date: NaiveDate, label: Option<String>, amount: impl Into<String>) -> Self {
        Self {
            date,
            label,
            amount: amount.into(),
        }
    }

    /// 取引日
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 摘要
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// 金額のテキスト表現
    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// 変換結果のサマリー
///
/// `Converter::convert_directory()`が出力ファイルを書き込んだ後に返します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// 読み込んだスプレッドシートのパス
    pub files: Vec<PathBuf>,
    /// 抽出した取引行の数
    pub rows: usize,
    /// 最も古い取引日
    pub first_date: NaiveDate,
    /// 最も新しい取引日
    pub last_date: NaiveDate,
    /// 書き込んだQIFファイルのパス
    pub output_path: PathBuf,
    /// 書き込んだバイト数
    pub bytes_written: usize,
}
