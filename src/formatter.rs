//! Ledger Formatter
//!
//! 日付順に並んだ取引行をQIF（`!Type:Bank`）テキストに変換するモジュール。
//!
//! 出力は次の4行ブロックの連続です。
//!
//! ```text
//! !Type:Bank
//! D11/02/2021
//! T-3,7
//! MGroceries
//! ^
//! ```

use std::borrow::Cow;
use std::io::{BufWriter, Write};

use rust_decimal::Decimal;

use crate::amount::{format_amount, parse_amount};
use crate::api::DateFormat;
use crate::error::XlsxToQifError;
use crate::progress::{NoProgress, ProgressObserver};
use crate::types::Row;

/// QIFヘッダー行
pub const QIF_HEADER: &str = "!Type:Bank";

/// 初期残高ブロックの摘要
pub const INITIAL_AMOUNT_LABEL: &str = "Initial Amount";

/// 摘要が空の場合に使用する摘要
pub const DEFAULT_LABEL: &str = "Transaction";

/// 取引行をQIFテキストに変換するフォーマッター
///
/// 2つのモードをサポートします。
///
/// - 取引モード（`only_transactions = true`）: 各行の金額はそのまま取引額として出力します。
/// - 残高モード（`only_transactions = false`）: 各行の金額は累積残高とみなし、
///   直前の行の残高との差を取引額として出力します。先頭行は`initial_amount`との差になります。
///
/// `initial_amount`が0でない場合は、先頭行の日付で初期残高ブロックを出力します。
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use xlsx2qif::{LedgerFormatter, Row};
///
/// # fn main() -> Result<(), xlsx2qif::XlsxToQifError> {
/// let day = NaiveDate::from_ymd_opt(2021, 2, 11).unwrap();
/// let rows = vec![
///     Row::new(day, Some("Salary".to_string()), "1000"),
///     Row::new(day, Some("Rent".to_string()), "1020"),
/// ];
///
/// let qif = LedgerFormatter::new(Decimal::ZERO, false).render_to_string(&rows)?;
/// assert_eq!(
///     qif,
///     "!Type:Bank\nD11/02/2021\nT1000\nMSalary\n^\nD11/02/2021\nT20\nMRent\n^\n"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFormatter {
    /// 初期残高
    initial_amount: Decimal,

    /// 金額が取引額（true）か累積残高（false）か
    only_transactions: bool,

    /// `D`行の日付形式
    date_format: DateFormat,
}

impl LedgerFormatter {
    /// 新しいフォーマッターを生成（日付形式は`DateFormat::ShortDate`）
    ///
    /// 初期残高ブロックの金額は`format_amount()`で正規化して出力します
    /// （`-1 250,50`として解析した値は`-1250.5`になります）。
    pub fn new(initial_amount: Decimal, only_transactions: bool) -> Self {
        Self {
            initial_amount,
            only_transactions,
            date_format: DateFormat::default(),
        }
    }

    /// `D`行の日付形式を指定する
    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// 取引行をQIF形式で書き出す
    ///
    /// 残高モードの差分と日付はすべて書き出し前に変換するため、金額の解析や
    /// 日付の出力に失敗した場合は`writer`に何も書き込まずにエラーを返します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(XlsxToQifError::EmptyExtraction)` - `rows`が空の場合
    /// * `Err(XlsxToQifError::InvalidAmount)` - 残高モードで金額を解析できない場合
    /// * `Err(XlsxToQifError::Config)` - 日付形式が日付を出力できない場合
    /// * `Err(XlsxToQifError::Io)` - 書き込みに失敗した場合
    pub fn render<W: Write>(&self, rows: &[Row], writer: W) -> Result<(), XlsxToQifError> {
        self.render_with_progress(rows, writer, &mut NoProgress)
    }

    /// 進捗を通知しながら取引行をQIF形式で書き出す
    pub fn render_with_progress<W: Write>(
        &self,
        rows: &[Row],
        writer: W,
        progress: &mut dyn ProgressObserver,
    ) -> Result<(), XlsxToQifError> {
        if rows.is_empty() {
            return Err(XlsxToQifError::EmptyExtraction);
        }
        let amounts = self.transaction_amounts(rows)?;
        let dates = rows
            .iter()
            .map(|row| self.date_format.render(row.date()))
            .collect::<Result<Vec<_>, _>>()?;

        let has_initial_block = !self.initial_amount.is_zero();
        let total = rows.len() + usize::from(has_initial_block);
        let mut written = 0;

        let mut writer = BufWriter::new(writer);
        writeln!(writer, "{}", QIF_HEADER)?;

        if has_initial_block {
            self.write_block(
                &mut writer,
                &dates[0],
                &format_amount(self.initial_amount),
                Some(INITIAL_AMOUNT_LABEL),
            )?;
            progress.block_written(written, total);
            written += 1;
        }

        for ((row, date), amount) in rows.iter().zip(&dates).zip(&amounts) {
            self.write_block(&mut writer, date, amount, row.label())?;
            progress.block_written(written, total);
            written += 1;
        }

        writer.flush()?;
        Ok(())
    }

    /// 取引行をQIF形式の文字列に変換
    pub fn render_to_string(&self, rows: &[Row]) -> Result<String, XlsxToQifError> {
        self.render_to_string_with_progress(rows, &mut NoProgress)
    }

    /// 進捗を通知しながら取引行をQIF形式の文字列に変換
    pub(crate) fn render_to_string_with_progress(
        &self,
        rows: &[Row],
        progress: &mut dyn ProgressObserver,
    ) -> Result<String, XlsxToQifError> {
        let mut buffer = Vec::new();
        self.render_with_progress(rows, &mut buffer, progress)?;

        let result = String::from_utf8(buffer).map_err(|e| {
            XlsxToQifError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(result)
    }

    /// 各行の`T`行に出力する金額を求める
    fn transaction_amounts<'a>(&self, rows: &'a [Row]) -> Result<Vec<Cow<'a, str>>, XlsxToQifError> {
        if self.only_transactions {
            return Ok(rows.iter().map(|row| single_line(row.amount())).collect());
        }

        let mut amounts = Vec::with_capacity(rows.len());
        let mut previous = self.initial_amount;
        for (index, row) in rows.iter().enumerate() {
            let invalid = || XlsxToQifError::InvalidAmount {
                row: index,
                value: row.amount().to_string(),
            };
            let balance = parse_amount(row.amount()).ok_or_else(invalid)?;
            let delta = balance.checked_sub(previous).ok_or_else(invalid)?;
            amounts.push(Cow::Owned(format_amount(delta)));
            previous = balance;
        }

        Ok(amounts)
    }

    /// 1ブロック（D / T / M / ^）を書き出す
    fn write_block<W: Write>(
        &self,
        writer: &mut W,
        date: &str,
        amount: &str,
        label: Option<&str>,
    ) -> Result<(), XlsxToQifError> {
        writeln!(writer, "D{}", date)?;
        writeln!(writer, "T{}", amount)?;
        writeln!(writer, "M{}", memo(label))?;
        writeln!(writer, "^")?;
        Ok(())
    }
}

/// `M`行の摘要
///
/// 空・空白のみ・`None`の場合は`DEFAULT_LABEL`になります。
fn memo(label: Option<&str>) -> Cow<'_, str> {
    match label {
        Some(label) if !label.trim().is_empty() => single_line(label),
        _ => Cow::Borrowed(DEFAULT_LABEL),
    }
}

/// セル内改行を空白に置き換える（1ブロック4行の構造を保つ）
fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n']) {
        Cow::Owned(text.replace("\r\n", " ").replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, 11).unwrap()
    }

    fn rows(amounts: &[&str]) -> Vec<Row> {
        amounts
            .iter()
            .map(|amount| Row::new(day(), Some("Test".to_string()), *amount))
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_only_transactions_no_initial_amount() {
        let qif = LedgerFormatter::new(Decimal::ZERO, true)
            .render_to_string(&rows(&["-3,7", "3,7", "-3,7"]))
            .unwrap();

        assert_eq!(
            qif,
            "!Type:Bank\nD11/02/2021\nT-3,7\nMTest\n^\nD11/02/2021\nT3,7\nMTest\n^\nD11/02/2021\nT-3,7\nMTest\n^\n"
        );
    }

    #[test]
    fn test_only_transactions_initial_amount() {
        let qif = LedgerFormatter::new(dec("1000"), true)
            .render_to_string(&rows(&["-3,7", "3,7", "-3,7"]))
            .unwrap();

        assert_eq!(
            qif,
            "!Type:Bank\nD11/02/2021\nT1000\nMInitial Amount\n^\nD11/02/2021\nT-3,7\nMTest\n^\nD11/02/2021\nT3,7\nMTest\n^\nD11/02/2021\nT-3,7\nMTest\n^\n"
        );
    }

    #[test]
    fn test_balances_no_initial_amount() {
        let qif = LedgerFormatter::new(Decimal::ZERO, false)
            .render_to_string(&rows(&["1000", "1020", "990"]))
            .unwrap();

        assert_eq!(
            qif,
            "!Type:Bank\nD11/02/2021\nT1000\nMTest\n^\nD11/02/2021\nT20\nMTest\n^\nD11/02/2021\nT-30\nMTest\n^\n"
        );
    }

    #[test]
    fn test_balances_initial_amount() {
        let qif = LedgerFormatter::new(dec("1000"), false)
            .render_to_string(&rows(&["1000", "1020", "990"]))
            .unwrap();

        assert_eq!(
            qif,
            "!Type:Bank\nD11/02/2021\nT1000\nMInitial Amount\n^\nD11/02/2021\nT0\nMTest\n^\nD11/02/2021\nT20\nMTest\n^\nD11/02/2021\nT-30\nMTest\n^\n"
        );
    }

    #[test]
    fn test_balances_with_decimal_comma() {
        let qif = LedgerFormatter::new(Decimal::ZERO, false)
            .render_to_string(&rows(&["10,50", "7,30"]))
            .unwrap();

        assert!(qif.contains("T10.5\n"));
        assert!(qif.contains("T-3.2\n"));
    }

    #[test]
    fn test_missing_labels_fall_back() {
        let rows = vec![
            Row::new(day(), Some(String::new()), "1000"),
            Row::new(day(), None, "1020"),
            Row::new(day(), Some(" ".to_string()), "990"),
        ];

        let qif = LedgerFormatter::new(dec("1000"), false)
            .render_to_string(&rows)
            .unwrap();

        assert_eq!(
            qif,
            "!Type:Bank\nD11/02/2021\nT1000\nMInitial Amount\n^\nD11/02/2021\nT0\nMTransaction\n^\nD11/02/2021\nT20\nMTransaction\n^\nD11/02/2021\nT-30\nMTransaction\n^\n"
        );
    }

    #[test]
    fn test_invalid_balance_aborts_without_output() {
        let formatter = LedgerFormatter::new(Decimal::ZERO, false);
        let mut output = Vec::new();

        let result = formatter.render(&rows(&["1000", "oops", "990"]), &mut output);

        match result {
            Err(XlsxToQifError::InvalidAmount { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "oops");
            }
            other => panic!("Expected InvalidAmount error, got {other:?}"),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn test_invalid_amount_is_kept_verbatim_in_transaction_mode() {
        let qif = LedgerFormatter::new(Decimal::ZERO, true)
            .render_to_string(&rows(&["n/a"]))
            .unwrap();
        assert!(qif.contains("Tn/a\n"));
    }

    #[test]
    fn test_empty_rows_rejected() {
        let result = LedgerFormatter::new(Decimal::ZERO, true).render_to_string(&[]);
        assert!(matches!(result, Err(XlsxToQifError::EmptyExtraction)));
    }

    #[test]
    fn test_negative_initial_amount() {
        let qif = LedgerFormatter::new(dec("-250.50"), false)
            .render_to_string(&rows(&["-200"]))
            .unwrap();

        assert!(qif.starts_with("!Type:Bank\nD11/02/2021\nT-250.5\nMInitial Amount\n^\n"));
        assert!(qif.ends_with("T50.5\nMTest\n^\n"));
    }

    #[test]
    fn test_initial_amount_is_normalized() {
        let initial = parse_amount("-1 250,50").unwrap();
        let qif = LedgerFormatter::new(initial, true)
            .render_to_string(&rows(&["1"]))
            .unwrap();
        assert!(qif.starts_with("!Type:Bank\nD11/02/2021\nT-1250.5\nMInitial Amount\n^\n"));
    }

    #[test]
    fn test_iso_date_format() {
        let qif = LedgerFormatter::new(Decimal::ZERO, true)
            .with_date_format(DateFormat::Iso8601)
            .render_to_string(&rows(&["1"]))
            .unwrap();
        assert!(qif.contains("D2021-02-11\n"));
    }

    #[test]
    fn test_multiline_label_is_flattened() {
        let rows = vec![Row::new(day(), Some("Card\r\npayment\nshop".to_string()), "1")];
        let qif = LedgerFormatter::new(Decimal::ZERO, true)
            .render_to_string(&rows)
            .unwrap();
        assert!(qif.contains("MCard payment shop\n^\n"));
    }

    #[test]
    fn test_multiline_amount_is_flattened() {
        let qif = LedgerFormatter::new(Decimal::ZERO, true)
            .render_to_string(&rows(&["12\n,50", "3\r\n7"]))
            .unwrap();

        assert_eq!(
            qif,
            "!Type:Bank\nD11/02/2021\nT12 ,50\nMTest\n^\nD11/02/2021\nT3 7\nMTest\n^\n"
        );
    }

    #[test]
    fn test_time_format_is_an_error_without_output() {
        let formatter = LedgerFormatter::new(dec("10"), true)
            .with_date_format(DateFormat::Custom("%d/%m/%Y %H:%M".to_string()));
        let mut output = Vec::new();

        let result = formatter.render(&rows(&["1"]), &mut output);

        assert!(matches!(result, Err(XlsxToQifError::Config(_))));
        assert!(output.is_empty());
    }

    #[test]
    fn test_block_shape() {
        let qif = LedgerFormatter::new(dec("5"), false)
            .render_to_string(&rows(&["1", "2", "3"]))
            .unwrap();

        let lines: Vec<&str> = qif.lines().collect();
        assert_eq!(lines[0], QIF_HEADER);
        let blocks = &lines[1..];
        assert_eq!(blocks.len(), 4 * 4);
        for block in blocks.chunks(4) {
            assert!(block[0].starts_with('D'));
            assert!(block[1].starts_with('T'));
            assert!(block[2].starts_with('M'));
            assert_eq!(block[3], "^");
        }
        assert!(qif.ends_with("^\n"));
        assert!(!qif.contains("\n\n"));
    }

    #[derive(Default)]
    struct BlockCounter {
        seen: Vec<(usize, usize)>,
    }

    impl ProgressObserver for BlockCounter {
        fn block_written(&mut self, index: usize, total: usize) {
            self.seen.push((index, total));
        }
    }

    #[test]
    fn test_progress_counts_initial_block() {
        let mut counter = BlockCounter::default();
        LedgerFormatter::new(dec("10"), true)
            .render_with_progress(&rows(&["1", "2"]), std::io::sink(), &mut counter)
            .unwrap();

        assert_eq!(counter.seen, vec![(0, 3), (1, 3), (2, 3)]);
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn t_lines(qif: &str) -> Vec<&str> {
            qif.lines().filter_map(|line| line.strip_prefix('T')).collect()
        }

        proptest! {
            /// 残高モードの取引額の合計は「最後の残高 - 初期残高」に一致する
            #[test]
            fn test_balance_deltas_sum_to_final_balance(
                initial in -1_000_000i64..1_000_000,
                balances in prop::collection::vec(-1_000_000i64..1_000_000, 1..40),
            ) {
                let initial = Decimal::new(initial, 2);
                let rows: Vec<Row> = balances
                    .iter()
                    .map(|cents| Row::new(day(), None, Decimal::new(*cents, 2).to_string()))
                    .collect();

                let qif = LedgerFormatter::new(initial, false).render_to_string(&rows).unwrap();
                let mut amounts = t_lines(&qif);
                if !initial.is_zero() {
                    prop_assert_eq!(amounts.remove(0), format_amount(initial));
                }
                prop_assert_eq!(amounts.len(), rows.len());

                let total: Decimal = amounts.iter().map(|a| parse_amount(a).unwrap()).sum();
                let last = Decimal::new(*balances.last().unwrap(), 2);
                prop_assert_eq!(total, last - initial);
            }

            /// 取引モードでは金額をそのまま出力する
            #[test]
            fn test_transaction_amounts_are_verbatim(
                amounts in prop::collection::vec("[0-9 .,+-]{1,12}", 1..20),
            ) {
                let rows: Vec<Row> = amounts
                    .iter()
                    .map(|amount| Row::new(day(), Some("x".to_string()), amount.as_str()))
                    .collect();

                let qif = LedgerFormatter::new(Decimal::ZERO, true).render_to_string(&rows).unwrap();
                prop_assert_eq!(t_lines(&qif), amounts.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }
    }
}
