//! Sparse row helpers. A row is a list of `(column, weight)` sorted by column.

pub type SparseRow = Vec<(usize, f64)>;

pub fn l2_norm(row: &[(usize, f64)]) -> f64 {
    row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
}

/// Scale to unit length in place. An all-zero row is left untouched.
pub fn l2_normalize(row: &mut [(usize, f64)]) {
    let norm = l2_norm(row);
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of a sparse row with a dense vector; columns past the end of
/// `dense` contribute nothing.
pub fn dot_dense(row: &[(usize, f64)], dense: &[f64]) -> f64 {
    row.iter().map(|&(col, w)| dense.get(col).map_or(0.0, |q| w * q)).sum()
}
