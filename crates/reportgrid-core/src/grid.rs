//! Rectangular grid helpers.

/// Pad every row to the width of the widest one.
pub fn pad_rows<T: Clone + Default>(rows: &[Vec<T>]) -> Vec<Vec<T>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(width, T::default());
            row
        })
        .collect()
}

/// Swap rows and columns.
///
/// Ragged input is padded with `T::default()` first, so the result is
/// always rectangular: `width` rows of `rows.len()` cells each.
pub fn transpose<T: Clone + Default>(rows: &[Vec<T>]) -> Vec<Vec<T>> {
    let padded = pad_rows(rows);
    let width = padded.first().map_or(0, Vec::len);
    (0..width)
        .map(|col| padded.iter().map(|row| row[col].clone()).collect())
        .collect()
}
