//! CSV生成（共通ライブラリ）
//!
//! ヘッダ行はレコードのフィールド名（APIのキー名）をそのまま使う。
//! データ行はすべてダブルクォートで囲み、nullは `""` になる。

use crate::error::Result;
use crate::types::{GemsTransaction, GpfTransaction};
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// CSV出力できるレコード
pub trait CsvRecord {
    /// 列名（出力順）
    const HEADERS: &'static [&'static str];

    /// HEADERSと同じ順序の値
    fn values(&self) -> Vec<Option<&str>>;
}

impl CsvRecord for GemsTransaction {
    const HEADERS: &'static [&'static str] = &[
        "TRANSACTION_ID",
        "GE_NUMBER",
        "EVENT_ID",
        "EVENT_NAME",
        "FILE_ID",
        "PDF_FILE_NAME",
        "JSONSENTDATE",
    ];

    fn values(&self) -> Vec<Option<&str>> {
        vec![
            self.transaction_id.as_deref(),
            self.ge_number.as_deref(),
            self.event_id.as_deref(),
            self.event_name.as_deref(),
            self.file_id.as_deref(),
            self.pdf_file_name.as_deref(),
            self.json_sent_date.as_deref(),
        ]
    }
}

impl CsvRecord for GpfTransaction {
    const HEADERS: &'static [&'static str] = &[
        "TRANSACTION_ID",
        "GPF_ID",
        "KGID",
        "NAME",
        "DATE_OF_BIRTH",
        "JOINING_DATE",
        "POLICY_NO",
        "POLICY_START_DATE",
        "JSON_SENT_DATE",
    ];

    fn values(&self) -> Vec<Option<&str>> {
        vec![
            self.transaction_id.as_deref(),
            self.gpf_id.as_deref(),
            self.kgid.as_deref(),
            self.name.as_deref(),
            self.date_of_birth.as_deref(),
            self.joining_date.as_deref(),
            self.policy_no.as_deref(),
            self.policy_start_date.as_deref(),
            self.json_sent_date.as_deref(),
        ]
    }
}

fn builder(style: QuoteStyle) -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.quote_style(style).terminator(Terminator::Any(b'\n'));
    builder
}

/// レコード一覧をCSV文字列に変換（0件ならNone）
pub fn to_csv<R: CsvRecord>(records: &[R]) -> Result<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut buf = Vec::new();
    {
        let mut header = builder(QuoteStyle::Necessary).from_writer(&mut buf);
        header.write_record(R::HEADERS)?;
        header.flush().map_err(csv::Error::from)?;
    }

    let mut rows = builder(QuoteStyle::Always).from_writer(&mut buf);
    for record in records {
        rows.write_record(record.values().into_iter().map(|v| v.unwrap_or("")))?;
    }
    rows.flush().map_err(csv::Error::from)?;
    drop(rows);

    Ok(Some(String::from_utf8(buf)?))
}
