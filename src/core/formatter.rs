use crate::domain::model::{Cluster, Record};
use crate::utils::error::{EtlError, Result};

/// 兩欄 CSV 寫入器。欄位含逗號、雙引號、CR 或 LF 時才加引號
fn row_writer(buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

fn write_row(writer: &mut csv::Writer<Vec<u8>>, record: &Record) -> Result<()> {
    writer.write_record([record.input.as_str(), record.fingerprint.as_str()])?;
    Ok(())
}

// Fields are &str, so the encoded bytes are valid UTF-8
fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn render_append(records: &[Record]) -> Result<String> {
    let mut writer = row_writer(Vec::new());
    for record in records {
        write_row(&mut writer, record)?;
    }
    Ok(into_text(finish(writer)?))
}

/// Rows of each cluster followed by one blank line.
pub fn render_report(clusters: &[Cluster]) -> Result<String> {
    let mut writer = row_writer(Vec::new());
    for cluster in clusters {
        for member in &cluster.members {
            write_row(&mut writer, member)?;
        }
        // csv 會把空記錄寫成 `""`，空行要直接寫進底層緩衝區
        let mut buf = finish(writer)?;
        buf.push(b'\n');
        writer = row_writer(buf);
    }
    Ok(into_text(finish(writer)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_row(value: &str, fingerprint: &str) -> String {
        render_append(&[Record::new(value, fingerprint, 1)]).unwrap()
    }

    #[test]
    fn test_plain_fields_written_verbatim() {
        assert_eq!(one_row("Acme Corp", "K1"), "Acme Corp,K1\n");
        assert_eq!(one_row("  padded  ", "K1"), "  padded  ,K1\n");
    }

    #[test]
    fn test_empty_fingerprint_leaves_trailing_comma() {
        assert_eq!(one_row("Acme Corp", ""), "Acme Corp,\n");
    }

    #[test]
    fn test_special_characters_are_quoted() {
        assert_eq!(
            one_row("Smith, Barney & Co", "K1"),
            "\"Smith, Barney & Co\",K1\n"
        );
        assert_eq!(
            one_row("The \"Best\" Inc", "K2"),
            "\"The \"\"Best\"\" Inc\",K2\n"
        );
        assert_eq!(one_row("a\rb", "K"), "\"a\rb\",K\n");
        assert_eq!(one_row("a\nb", "K"), "\"a\nb\",K\n");
    }

    #[test]
    fn test_escaped_fields_round_trip_through_csv_reader() {
        let originals = [
            ("Smith, Barney", "k,1"),
            ("He said \"hi\"", "\"quoted\""),
            ("line\nbreak", "cr\rkey"),
            ("plain", ""),
        ];
        let records: Vec<Record> = originals
            .iter()
            .enumerate()
            .map(|(i, (v, k))| Record::new(*v, *k, i + 1))
            .collect();
        let encoded = render_append(&records).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(encoded.as_bytes());
        let decoded: Vec<(String, String)> = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                (r[0].to_string(), r[1].to_string())
            })
            .collect();

        let expected: Vec<(String, String)> = originals
            .iter()
            .map(|(v, k)| (v.to_string(), k.to_string()))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_render_append_one_row_per_record() {
        let records = vec![
            Record::new("Acme Corp", "K1", 1),
            Record::new("Broken Co", "", 2),
            Record::new("Other, Inc", "K3", 4),
        ];
        assert_eq!(
            render_append(&records).unwrap(),
            "Acme Corp,K1\nBroken Co,\n\"Other, Inc\",K3\n"
        );
        assert_eq!(render_append(&[]).unwrap(), "");
    }

    #[test]
    fn test_render_report_separates_clusters_with_blank_line() {
        let clusters = vec![
            Cluster {
                fingerprint: "K1".to_string(),
                members: vec![
                    Record::new("Acme Corp", "K1", 1),
                    Record::new("ACME Corporation", "K1", 2),
                ],
            },
            Cluster {
                fingerprint: "K9".to_string(),
                members: vec![Record::new("x, y", "K9", 5), Record::new("y", "K9", 7)],
            },
        ];
        assert_eq!(
            render_report(&clusters).unwrap(),
            "Acme Corp,K1\nACME Corporation,K1\n\n\"x, y\",K9\ny,K9\n\n"
        );
        assert_eq!(render_report(&[]).unwrap(), "");
    }
}
