//! # IO
//!
//! `io` is a module for reading line-delimited JSON transactions and writing line-delimited JSON
//! decisions.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::{future, Stream, StreamExt};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::LinesStream;

use crate::{parse_amount, CustomerId, Decision, LoadId, ParseAmountError, Transaction};

/// A transaction represented by an input line
#[derive(Deserialize)]
struct JsonTransaction {
    id: LoadId,
    customer_id: CustomerId,
    load_amount: String,
    time: DateTime<Utc>,
}

impl TryFrom<JsonTransaction> for Transaction {
    type Error = ParseAmountError;

    fn try_from(record: JsonTransaction) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_amount(&record.load_amount)?,
            id: record.id,
            customer_id: record.customer_id,
            time: record.time,
        })
    }
}

fn parse_line(line: &str) -> Result<Transaction> {
    let record: JsonTransaction = serde_json::from_str(line)?;
    Ok(Transaction::try_from(record)?)
}

/// Stream transactions from a line-delimited JSON reader
///
/// Blank lines are skipped. Errors name the offending line number.
pub fn read_transactions<R>(reader: R) -> impl Stream<Item = Result<Transaction>>
where
    R: AsyncRead + Unpin,
{
    LinesStream::new(BufReader::new(reader).lines())
        .enumerate()
        .filter(|(_, line)| future::ready(!matches!(line, Ok(line) if line.trim().is_empty())))
        .map(|(index, line)| -> Result<Transaction> {
            let line_number = index + 1;
            let line = line.with_context(|| format!("Failed to read line {line_number}"))?;
            parse_line(&line).with_context(|| format!("Invalid transaction on line {line_number}"))
        })
}

/// Write one JSON object per decision, in order
pub async fn write_decisions<W>(mut writer: W, decisions: &[Decision]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    for decision in decisions {
        let mut line = serde_json::to_vec(decision)?;
        line.push(b'\n');
        writer
            .write_all(&line)
            .await
            .context("Failed to write decision")?;
    }
    writer.flush().await.context("Failed to flush decisions")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::TryStreamExt;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn read_transactions_works() {
        let input = br#"{"id":"15887","customer_id":"528","load_amount":"$3318.47","time":"2000-01-01T00:00:00Z"}

{"id":"30081","customer_id":"154","load_amount":"$1413.18","time":"2000-01-01T01:01:22Z"}
"#;
        let transactions: Vec<_> = read_transactions(&input[..]).try_collect().await.unwrap();
        assert_eq!(
            transactions,
            vec![
                Transaction {
                    id: LoadId::from("15887"),
                    customer_id: CustomerId::from("528"),
                    amount: dec!(3318.47),
                    time: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
                },
                Transaction {
                    id: LoadId::from("30081"),
                    customer_id: CustomerId::from("154"),
                    amount: dec!(1413.18),
                    time: Utc.with_ymd_and_hms(2000, 1, 1, 1, 1, 22).unwrap(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn malformed_amount_names_line() {
        let input = br#"{"id":"1","customer_id":"1","load_amount":"$1.00","time":"2000-01-01T00:00:00Z"}
{"id":"2","customer_id":"1","load_amount":"$oops","time":"2000-01-01T00:00:00Z"}
"#;
        let err = read_transactions(&input[..])
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.root_cause().to_string().contains("$oops"));
    }

    #[tokio::test]
    async fn malformed_json_fails() {
        let input = b"not json\n";
        let result = read_transactions(&input[..]).try_collect::<Vec<_>>().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn write_decisions_works() {
        let decisions = [
            Decision {
                id: LoadId::from("15887"),
                customer_id: CustomerId::from("528"),
                accepted: true,
            },
            Decision {
                id: LoadId::from("30081"),
                customer_id: CustomerId::from("154"),
                accepted: false,
            },
        ];
        let mut output = Vec::new();
        write_decisions(&mut output, &decisions).await.unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"id\":\"15887\",\"customer_id\":\"528\",\"accepted\":true}\n\
             {\"id\":\"30081\",\"customer_id\":\"154\",\"accepted\":false}\n"
        );
    }
}
