use serde_json::{Number, Value};

/// Quote a field, doubling embedded quotes
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render one cell: strings quoted, numbers and booleans raw, null empty,
/// nested values as their quoted JSON text
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => quote(text),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number_text(number),
        Some(nested) => quote(&nested.to_string()),
    }
}

/// Numbers as written by JavaScript: whole floats lose their `.0`
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

/// Project a list of flat records onto CSV.
///
/// The header is the key list of the first record; later records are read
/// through it, so extra keys are dropped and missing ones render empty.
/// Lines are joined with `\n` without a trailing newline. An empty list
/// renders as an empty string.
pub fn to_csv(records: &[Value]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let headers: Vec<&str> = first
        .as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(headers.join(","));
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|header| cell(record.get(*header)))
            .collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// Lines of fully quoted cells under a fixed header
pub fn quoted_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|field| quote(field)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_list_is_empty_string() {
        assert_eq!(to_csv(&[]), "");
    }

    #[test]
    fn test_strings_quoted_numbers_raw() {
        let records = vec![
            json!({ "siteId": "s1", "overlapAll": 3, "overLapAllPercentage": 1.5 }),
            json!({ "siteId": "s2", "overlapAll": 0, "overLapAllPercentage": 0.0 }),
        ];
        assert_eq!(
            to_csv(&records),
            "siteId,overlapAll,overLapAllPercentage\n\"s1\",3,1.5\n\"s2\",0,0"
        );
    }

    #[test]
    fn test_whole_floats_render_without_fraction() {
        let records = vec![json!({ "pct": 1.0, "big": 200.0, "part": 0.25, "count": 7 })];
        assert_eq!(to_csv(&records), "pct,big,part,count\n1,200,0.25,7");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let records = vec![json!({ "name": "say \"hi\"" })];
        assert_eq!(to_csv(&records), "name\n\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_null_missing_and_nested_cells() {
        let records = vec![
            json!({ "a": null, "b": true, "c": [1, 2] }),
            json!({ "b": false, "extra": "dropped" }),
        ];
        assert_eq!(to_csv(&records), "a,b,c\n,true,\"[1,2]\"\n,false,");
    }

    #[test]
    fn test_quoted_table() {
        let table = quoted_table(&["Site", "URL"], &[vec!["a.com".into(), "a.com/\"x\"".into()]]);
        assert_eq!(table, "Site,URL\n\"a.com\",\"a.com/\"\"x\"\"\"");
    }
}
