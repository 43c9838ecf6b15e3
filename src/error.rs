//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;

use thiserror::Error;

/// xlsx2qifクレート全体で使用するエラー型
///
/// 変換処理は「すべて成功するか、すべて失敗するか」のどちらかです。
/// 1行でも解析できない行があれば、その時点で変換全体を中断し、
/// 途中まで生成したQIFテキストは返しません。
///
/// # エラーの種類
///
/// - `NoInputFiles`: 入力ディレクトリに対象のスプレッドシートが存在しない
/// - `Parse` / `Sheet` / `InvalidDate`: 行の抽出中に発生したエラー
/// - `EmptyExtraction`: ファイルは読めたがデータ行が1行もない
/// - `InvalidAmount`: 残高モードで金額を数値として解析できない
/// - `EmptyOutput`: 出力テキストが空になった（フォーマッターの内部不整合）
/// - `Persistence`: 出力ファイルの作成に失敗した
/// - `Config` / `Io`: 設定エラー、その他のI/Oエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2qif::{ConverterBuilder, XlsxToQifError};
///
/// # fn main() -> Result<(), XlsxToQifError> {
/// let converter = ConverterBuilder::new().build()?;
/// match converter.convert_directory("statements", None::<&str>) {
///     Err(XlsxToQifError::NoInputFiles { dir, .. }) => {
///         println!("nothing to convert in {}", dir.display());
///     }
///     Err(e) => return Err(e),
///     Ok(report) => println!("wrote {}", report.output_path.display()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToQifError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー
    ///
    /// calamineクレートがファイルを開く際、またはワークシートを読み込む際に
    /// 発生したエラーです。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// 特定のシートの読み込みに失敗したエラー
    #[error("Failed to read sheet '{sheet}' in {}: {message}", file.display())]
    Sheet {
        /// ファイルパス
        file: PathBuf,
        /// シート名
        sheet: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// 日付列の値を日付として解析できなかったエラー
    ///
    /// 行番号はシート上の行番号（1始まり、ヘッダー行を含む）です。
    #[error("Invalid date '{value}' at {}, sheet '{sheet}', row {row}", file.display())]
    InvalidDate {
        /// ファイルパス
        file: PathBuf,
        /// シート名
        sheet: String,
        /// シート上の行番号（1始まり）
        row: usize,
        /// 解析に失敗したセル値
        value: String,
    },

    /// 入力ディレクトリに変換対象のファイルが存在しない
    #[error("No '*.{extension}' files to convert in {}", dir.display())]
    NoInputFiles {
        /// 走査したディレクトリ
        dir: PathBuf,
        /// 対象の拡張子
        extension: String,
    },

    /// データ行が1行も抽出されなかった（ヘッダーのみのシートなど）
    #[error("Input files contain no transaction rows")]
    EmptyExtraction,

    /// 金額を10進数として解析できなかったエラー
    ///
    /// `row`は日付順に並べ替えた後の行インデックス（0始まり）です。
    #[error("Invalid amount '{value}' in row {row}")]
    InvalidAmount {
        /// 並べ替え後の行インデックス（0始まり）
        row: usize,
        /// 解析に失敗した金額テキスト
        value: String,
    },

    /// 出力テキストが空になった
    #[error("Conversion produced an empty QIF document")]
    EmptyOutput,

    /// 出力ファイルの作成に失敗した
    #[error("Failed to create QIF file {}: {source}", path.display())]
    Persistence {
        /// 出力先パス
        path: PathBuf,
        /// 原因となったI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),
}
