use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use sally_core::record::{EXPORT_HEADER, LeadRecord};

/// Write leads as CSV rows under the export header.
pub fn write_leads<W: Write>(writer: W, records: &[LeadRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPORT_HEADER)
        .context("Failed to write CSV header")?;
    for record in records {
        csv.write_record(record.to_row())
            .context("Failed to write CSV row")?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write leads to `path`, or to stdout when no path is given.
pub fn export_leads(path: Option<&Path>, records: &[LeadRecord]) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_leads(file, records)?;
            tracing::info!(path = %path.display(), rows = records.len(), "Leads exported");
        }
        None => write_leads(std::io::stdout().lock(), records)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sally_core::models::SignalSet;

    use super::*;

    fn record() -> LeadRecord {
        let signals = SignalSet {
            url: "https://www.zapaterialuna.mx/".into(),
            description: vec!["Zapatos, bolsas y más".into()],
            phones: vec!["555-123-4567".into(), "55-1234-5678".into()],
            ..Default::default()
        };
        LeadRecord::from_signals(
            &signals,
            4,
            "",
            Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_header_and_row() {
        let mut out = Vec::new();
        write_leads(&mut out, &[record()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "SCORE,WEB SITE,ABOUT,CATEGORY,LIKES,TELEPHONE,EMAIL,ADDRESS,CITY,COUNTRY,CRAWL DATE"
        );
        assert_eq!(
            lines[1],
            r#"4,https://www.zapaterialuna.mx/,"Zapatos, bolsas y más",,,"555-123-4567,55-1234-5678",,,,,10162026"#
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_no_records_writes_header_only() {
        let mut out = Vec::new();
        write_leads(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        export_leads(Some(&path), &[record(), record()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
