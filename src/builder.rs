//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::api::{DateFormat, DEFAULT_EXTENSION, OUTPUT_FILE_NAME};
use crate::discovery::discover_spreadsheets;
use crate::error::XlsxToQifError;
use crate::extractor::RowExtractor;
use crate::formatter::LedgerFormatter;
use crate::progress::{NoProgress, ProgressObserver};
use crate::types::{ConversionReport, Row};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConversionConfig {
    /// 初期残高
    pub initial_amount: Decimal,

    /// 金額が取引額（true）か累積残高（false）か
    pub only_transactions: bool,

    /// 日付形式
    pub date_format: DateFormat,

    /// 走査するスプレッドシートの拡張子（先頭の`.`なし）
    pub extension: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            initial_amount: Decimal::ZERO,
            only_transactions: true,
            date_format: DateFormat::ShortDate,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use rust_decimal::Decimal;
/// use xlsx2qif::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsx2qif::XlsxToQifError> {
/// let converter = ConverterBuilder::new()
///     .only_transactions(false)
///     .with_initial_amount(Decimal::new(150000, 2))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 初期残高: 0（初期残高ブロックなし）
    /// - 金額の解釈: 取引額
    /// - 日付形式: 短い日付形式 (DD/MM/YYYY)
    /// - 拡張子: `xlsx`
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期残高を指定する
    ///
    /// 0以外を指定すると、先頭の取引日付で`Initial Amount`ブロックを出力します。
    /// 残高モードでは、先頭行の取引額は「先頭行の残高 - 初期残高」になります。
    /// 初期残高ブロックの`T`行は`format_amount()`で正規化した表記になります
    /// （例: `-1 250,50`を解析した値は`T-1250.5`）。
    pub fn with_initial_amount(mut self, amount: Decimal) -> Self {
        self.config.initial_amount = amount;
        self
    }

    /// 金額列の解釈を指定する
    ///
    /// * `true`: 金額列は取引額（デフォルト）
    /// * `false`: 金額列は累積残高。連続する行の差を取引額として出力する
    pub fn only_transactions(mut self, only: bool) -> Self {
        self.config.only_transactions = only;
        self
    }

    /// 日付の出力形式を指定する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsx2qif::{ConverterBuilder, DateFormat};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Iso8601);
    /// ```
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// `convert_directory()`で走査する拡張子を指定する（例: `"xls"`）
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxToQifError::Config(String)`: 設定の検証に失敗した場合
    ///   * カスタム日付形式が空、不正な書式指定子を含む、または日付を出力できない（`%H`など）
    ///   * 拡張子が空、または`.`や区切り文字を含む
    pub fn build(self) -> Result<Converter, XlsxToQifError> {
        // 1. カスタム日付形式の検証
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            let invalid = format_str.trim().is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(XlsxToQifError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }
        // 時刻の書式指定子を含む形式は解析できても日付を出力できない
        self.config.date_format.render(NaiveDate::MIN)?;

        // 2. 拡張子の検証
        let extension = &self.config.extension;
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(XlsxToQifError::Config(format!(
                "Invalid file extension: '{}' (expected e.g. 'xlsx')",
                extension
            )));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// ファイル探索 → 行の抽出 → QIF出力 → ファイル書き込みの各段階を実行し、
/// 段階ごとに異なるエラーを返します。設定は不変のため、複数スレッドから
/// 同時に使用しても状態を共有しません。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2qif::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsx2qif::XlsxToQifError> {
/// let converter = ConverterBuilder::new().build()?;
/// let report = converter.convert_directory("statements", None::<&str>)?;
/// println!("{} rows -> {}", report.rows, report.output_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// 取引行の抽出器
    extractor: RowExtractor,

    /// QIFフォーマッター
    formatter: LedgerFormatter,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        let formatter = LedgerFormatter::new(config.initial_amount, config.only_transactions)
            .with_date_format(config.date_format.clone());
        Self {
            extractor: RowExtractor::new(),
            formatter,
            config,
        }
    }

    /// スプレッドシート群をQIFテキストに変換
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - QIFテキスト
    /// * `Err(XlsxToQifError::EmptyExtraction)` - データ行が1行もない場合（`paths`が空の場合も含む）
    /// * `Err(XlsxToQifError)` - 抽出または変換に失敗した場合
    pub fn convert_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<String, XlsxToQifError> {
        self.convert_files_with_progress(paths, &mut NoProgress)
    }

    /// 進捗を通知しながらスプレッドシート群をQIFテキストに変換
    pub fn convert_files_with_progress<P: AsRef<Path>>(
        &self,
        paths: &[P],
        progress: &mut dyn ProgressObserver,
    ) -> Result<String, XlsxToQifError> {
        let rows = self.extract_rows(paths, progress)?;
        self.render(&rows, progress)
    }

    /// ディレクトリ内のスプレッドシートを変換し、`result.qif`を書き込む
    ///
    /// # 引数
    ///
    /// * `input_dir` - スプレッドシートを含むディレクトリ
    /// * `output_dir` - 出力先ディレクトリ（`None`の場合は`input_dir`）
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionReport)` - 書き込みに成功した場合
    /// * `Err(XlsxToQifError::Config)` - ディレクトリが存在しない場合
    /// * `Err(XlsxToQifError::NoInputFiles)` - 対象の拡張子のファイルがない場合
    /// * `Err(XlsxToQifError::EmptyExtraction)` - データ行が1行もない場合
    /// * `Err(XlsxToQifError::Persistence)` - 出力ファイルを作成できなかった場合
    pub fn convert_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<Q>,
    ) -> Result<ConversionReport, XlsxToQifError> {
        self.convert_directory_with_progress(input_dir, output_dir, &mut NoProgress)
    }

    /// 進捗を通知しながらディレクトリ内のスプレッドシートを変換する
    pub fn convert_directory_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<Q>,
        progress: &mut dyn ProgressObserver,
    ) -> Result<ConversionReport, XlsxToQifError> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref().map_or(input_dir, |dir| dir.as_ref());

        for dir in [input_dir, output_dir] {
            if !dir.is_dir() {
                return Err(XlsxToQifError::Config(format!(
                    "Directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        debug!(dir = %input_dir.display(), extension = %self.config.extension, "looking for spreadsheets");
        let files = discover_spreadsheets(input_dir, &self.config.extension)?;
        if files.is_empty() {
            warn!(dir = %input_dir.display(), "no spreadsheets to convert");
            return Err(XlsxToQifError::NoInputFiles {
                dir: input_dir.to_path_buf(),
                extension: self.config.extension.clone(),
            });
        }

        let rows = self.extract_rows(&files, progress)?;
        let qif = self.render(&rows, progress)?;

        let output_path = output_dir.join(OUTPUT_FILE_NAME);
        let bytes_written = self.write_output(&output_path, &qif)?;

        // extract_rows()が空でないことを保証している
        let (first_date, last_date) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => (first.date(), last.date()),
            _ => return Err(XlsxToQifError::EmptyExtraction),
        };

        info!(
            files = files.len(),
            rows = rows.len(),
            output = %output_path.display(),
            "conversion finished"
        );

        Ok(ConversionReport {
            files,
            rows: rows.len(),
            first_date,
            last_date,
            output_path,
            bytes_written,
        })
    }

    /// QIFテキストをファイルに書き込み、ファイルが作成されたことを確認する
    ///
    /// # 戻り値
    ///
    /// * `Ok(usize)` - 書き込んだバイト数
    /// * `Err(XlsxToQifError::Persistence)` - 書き込みに失敗した、またはファイルが存在しない場合
    pub fn write_output<P: AsRef<Path>>(
        &self,
        path: P,
        content: &str,
    ) -> Result<usize, XlsxToQifError> {
        let path = path.as_ref();
        let persistence = |source: std::io::Error| XlsxToQifError::Persistence {
            path: path.to_path_buf(),
            source,
        };

        fs::write(path, content).map_err(persistence)?;
        if !path.is_file() {
            return Err(persistence(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "file is missing after write",
            )));
        }

        debug!(path = %path.display(), bytes = content.len(), "wrote QIF file");
        Ok(content.len())
    }

    /// 取引行を抽出し、空でないことを確認する
    fn extract_rows<P: AsRef<Path>>(
        &self,
        paths: &[P],
        progress: &mut dyn ProgressObserver,
    ) -> Result<Vec<Row>, XlsxToQifError> {
        let rows = self.extractor.extract(paths, progress)?;
        if rows.is_empty() {
            warn!(files = paths.len(), "no transaction rows found");
            return Err(XlsxToQifError::EmptyExtraction);
        }
        debug!(rows = rows.len(), "extracted transaction rows");
        Ok(rows)
    }

    /// QIFテキストを生成し、空でないことを確認する
    fn render(
        &self,
        rows: &[Row],
        progress: &mut dyn ProgressObserver,
    ) -> Result<String, XlsxToQifError> {
        let qif = self.formatter.render_to_string_with_progress(rows, progress)?;
        if qif.trim().is_empty() {
            return Err(XlsxToQifError::EmptyOutput);
        }

        Ok(qif)
    }
}
