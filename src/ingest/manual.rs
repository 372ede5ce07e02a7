use crate::ingest::{ColumnLayout, RawTable};

/// Splits rows into at most `max_index + 2` pieces; columns 0, 1, 2 when the header names none of the targets.
pub fn parse(bytes: &[u8], delimiter: char) -> RawTable {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines();

    let header_line = match lines.next() {
        Some(line) => line,
        None => return RawTable::default(),
    };

    let mut layout = ColumnLayout::from_headers(header_line.split(delimiter).map(str::trim));
    if layout.is_empty() {
        layout = ColumnLayout::positional();
    }
    let max_pieces = layout.max_index() + 2;

    let rows = lines
        .map(|line| {
            let parts: Vec<&str> = line.splitn(max_pieces, delimiter).collect();
            layout.extract(|idx| parts.get(idx).copied())
        })
        .collect();

    RawTable {
        columns: layout.presence(),
        rows,
    }
}
