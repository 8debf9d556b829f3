use crate::data::SaleRecord;
use serde::Serialize;
use std::path::Path;

/// Pretty JSON exporter for a ledger, indented by four spaces.
pub(crate) fn write_records<W: std::io::Write>(
    writer: W,
    records: &[SaleRecord],
) -> Result<(), anyhow::Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut ser)?;
    let mut writer = ser.into_inner();
    std::io::Write::flush(&mut writer)?;
    Ok(())
}

/// Replaces the whole file at `path` with `records`.
pub(crate) fn write_ledger(path: &Path, records: &[SaleRecord]) -> Result<(), anyhow::Error> {
    let file = std::fs::File::create(path)?;
    write_records(std::io::BufWriter::new(file), records)?;
    tracing::debug!("saved {} sales to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_records;
    use crate::data::SaleRecord;
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_document_layout() {
        let mut out = Vec::new();
        write_records(
            &mut out,
            &[
                SaleRecord {
                    amount: dec!(100),
                    client: "Ana".to_owned(),
                },
                SaleRecord {
                    amount: dec!(50.5),
                    client: "João".to_owned(),
                },
            ],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[
    {
        "valor": 100.0,
        "cliente": "Ana"
    },
    {
        "valor": 50.5,
        "cliente": "João"
    }
]"#
        );
    }

    #[test]
    fn test_write_empty_ledger() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(out, b"[]");
    }
}
