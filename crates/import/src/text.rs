//! Delimited-text primitives: delimiter sniffing and quote-aware row
//! splitting. Shared by file uploads, pasted grids, and remote sheets.

/// Delimiters the sniffer considers.
const CANDIDATES: [char; 3] = ['\t', ',', ';'];

/// Picks the delimiter by counting candidates in the first non-empty line.
/// A strictly highest count wins; a tie or an all-zero count falls back to
/// tab, which is what spreadsheet paste produces.
pub fn detect_delimiter(text: &str) -> char {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let counts: Vec<(char, usize)> = CANDIDATES
        .iter()
        .map(|&c| (c, first_line.matches(c).count()))
        .collect();

    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if max == 0 {
        return '\t';
    }
    let mut at_max = counts.iter().filter(|(_, n)| *n == max);
    match (at_max.next(), at_max.next()) {
        (Some((delimiter, _)), None) => *delimiter,
        _ => '\t',
    }
}

/// Splits delimited text into rows of cells.
///
/// A double quote toggles quoting, `""` inside quotes is a literal quote,
/// and delimiters and newlines inside quotes are kept verbatim. Carriage
/// returns outside quotes are dropped, so CRLF input needs no special
/// handling.
pub fn parse_delimited(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == delimiter {
            row.push(std::mem::take(&mut cell));
        } else if ch == '\n' {
            row.push(std::mem::take(&mut cell));
            rows.push(std::mem::take(&mut row));
        } else if ch != '\r' {
            cell.push(ch);
        }
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }
    rows
}
