//! Brace-aware word and list mechanics for the command surface.
//!
//! A word is either a run of non-whitespace characters or a `{...}` group;
//! the braces delimit the word and are stripped, nested braces are kept so
//! the content can be split again as a sub-list.

use crate::error::RtError;

/// Split a command line (or a list value) into words.
pub fn split_words(text: &str) -> Result<Vec<String>, RtError> {
    let mut words = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        let Some(&c) = chars.peek() else {
            break;
        };
        if c == '{' {
            chars.next();
            let mut depth = 1usize;
            let mut word = String::new();
            for c in chars.by_ref() {
                match c {
                    '{' => {
                        depth += 1;
                        word.push(c);
                    }
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                        word.push(c);
                    }
                    _ => word.push(c),
                }
            }
            if depth != 0 {
                return Err(RtError::argument("Unmatched open brace in list"));
            }
            words.push(word);
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                if c == '}' {
                    return Err(RtError::argument("Unmatched close brace in list"));
                }
                word.push(c);
                chars.next();
            }
            words.push(word);
        }
    }
    Ok(words)
}

/// List values use the same mechanics as command words.
pub fn split_list(text: &str) -> Result<Vec<String>, RtError> {
    split_words(text)
}

/// Join items back into a list value, bracing any item containing whitespace.
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let item = item.as_ref();
        if item.is_empty() || item.chars().any(char::is_whitespace) {
            out.push('{');
            out.push_str(item);
            out.push('}');
        } else {
            out.push_str(item);
        }
    }
    out
}

/// Parse 1-D (`1 2 3`) or rectangular 2-D (`{1 2} {3 4}`) numeric data into
/// a flat value buffer plus its shape. Jagged rows are rejected.
pub fn parse_matrix(data: &str) -> Result<(Vec<f64>, Vec<i64>), RtError> {
    let rows = split_list(data)?;
    if rows.is_empty() {
        return Ok((Vec::new(), vec![0]));
    }
    let first_numeric = rows[0].parse::<f64>().is_ok();
    if first_numeric {
        let mut flat = Vec::with_capacity(rows.len());
        for item in &rows {
            let v = item.parse::<f64>().map_err(|_| {
                RtError::argument(format!("Invalid numeric value in list: \"{item}\""))
            })?;
            flat.push(v);
        }
        let len = flat.len() as i64;
        return Ok((flat, vec![len]));
    }
    // 2-D: every row is itself a list of equal length.
    let mut flat = Vec::new();
    let mut cols: Option<usize> = None;
    for row in &rows {
        let items = split_list(row)?;
        match cols {
            None => cols = Some(items.len()),
            Some(n) if n != items.len() => {
                return Err(RtError::argument(
                    "Jagged lists are not supported: each row must have equal length",
                ));
            }
            Some(_) => {}
        }
        for item in &items {
            let v = item.parse::<f64>().map_err(|_| {
                RtError::argument(format!("Invalid numeric value in list: \"{item}\""))
            })?;
            flat.push(v);
        }
    }
    let rows_n = rows.len() as i64;
    let cols_n = cols.unwrap_or(0) as i64;
    Ok((flat, vec![rows_n, cols_n]))
}
