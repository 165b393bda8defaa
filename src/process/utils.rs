use crate::types::RawCell;

/// Trim whitespace and strip one pair of outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Lower-cased, cleaned text of a header cell.
pub fn header_text(cell: &RawCell) -> String {
    clean_str(&cell.display()).to_lowercase()
}

/// Leading integer of `s`: optional sign then digits, anything after is ignored
/// (`"12"`, `" 07 "`, `"3.0"`, `"21º"`). `None` when no digit leads.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = clean_str(s);
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Integer value of a cell. Numeric cells are truncated toward zero.
pub fn cell_to_int(cell: &RawCell) -> Option<i64> {
    match cell {
        RawCell::Number(n) if n.is_finite() && n.abs() < 9.0e15 => Some(n.trunc() as i64),
        RawCell::Number(_) => None,
        RawCell::Text(s) => parse_leading_int(s),
        RawCell::Absent => None,
    }
}

/// Decode a packed numbers cell: a bracketed list (`[1, 2, 3]`) or a comma-separated one
/// (`1,2,3`). `None` when any element is not an integer.
pub fn parse_number_list(cell: &RawCell) -> Option<Vec<i64>> {
    match cell {
        RawCell::Text(s) => {
            let s = clean_str(s);
            if s.starts_with('[') && s.ends_with(']') {
                let values: Vec<serde_json::Value> = serde_json::from_str(s).ok()?;
                values.iter().map(json_int).collect()
            } else {
                s.split(',')
                    .map(|tok| clean_str(tok).parse::<i64>().ok())
                    .collect()
            }
        }
        RawCell::Number(_) => cell_to_int(cell).map(|n| vec![n]),
        RawCell::Absent => None,
    }
}

fn json_int(v: &serde_json::Value) -> Option<i64> {
    match v {
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(f as i64),
            _ => None,
        },
        serde_json::Value::String(s) => clean_str(s).parse().ok(),
        _ => None,
    }
}
