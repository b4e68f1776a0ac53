use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One data row of a score sheet; `row` is 1-based and excludes the header.
#[derive(Debug)]
pub(crate) struct ScoreSheetRow {
    pub(crate) row: usize,
    pub(crate) category: Option<String>,
    pub(crate) subcategory: String,
    pub(crate) score: u8,
    pub(crate) comments: Option<String>,
    pub(crate) confidence: Option<u8>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ScoreSheetRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawRow>().enumerate() {
        let raw = record?;
        rows.push(ScoreSheetRow {
            row: index + 1,
            category: raw.category.map(|value| clean_id(&value)),
            subcategory: clean_id(&raw.subcategory),
            score: raw.score,
            comments: raw.comments,
            confidence: raw.confidence,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(
        rename = "Category",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    category: Option<String>,
    #[serde(rename = "Subcategory")]
    subcategory: String,
    #[serde(rename = "Score")]
    score: u8,
    #[serde(
        rename = "Comments",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    comments: Option<String>,
    #[serde(rename = "Confidence", default)]
    confidence: Option<u8>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Spreadsheet exports like to smuggle byte-order marks and zero-width spaces into cells.
fn clean_id(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blank_optional_cells_become_none() {
        let rows = parse_rows(Cursor::new(
            "Category,Subcategory,Score,Comments,Confidence\n,sub-a, 4 ,  ,\n",
        ))
        .expect("parse");
        let row = &rows[0];
        assert_eq!(row.row, 1);
        assert_eq!(row.category, None);
        assert_eq!(row.subcategory, "sub-a");
        assert_eq!(row.score, 4);
        assert_eq!(row.comments, None);
        assert_eq!(row.confidence, None);
    }

    #[test]
    fn clean_id_strips_invisible_characters() {
        assert_eq!(clean_id("\u{feff} sub-sec-1\u{200b} "), "sub-sec-1");
    }

    #[test]
    fn non_numeric_scores_are_rejected() {
        let result = parse_rows(Cursor::new(
            "Category,Subcategory,Score,Comments,Confidence\ncat-a,sub-a,great,,\n",
        ));
        assert!(result.is_err());
    }
}
