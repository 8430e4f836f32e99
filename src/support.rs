//! Support-set text rendering (§6, C7).
//!
//! One line per training example with a nonzero `α`: `alpha` followed by
//! the feature vector's nonzero `index:value` tokens, space-separated —
//! the same token grammar [`crate::dataset::parse_dataset`] reads back.

use std::io::{self, Write};

use crate::vector::FeatureVector;

/// Writes `bias` as a leading comment line, then one `alpha  index:value...`
/// line per support pair, to `writer`.
///
/// # Errors
///
/// Returns the underlying I/O error on a write failure.
pub fn write_support<W: Write>(
    writer: &mut W,
    bias: f64,
    support: &[(f64, FeatureVector)],
) -> io::Result<()> {
    writeln!(writer, "# bias {bias}")?;
    for (alpha, vector) in support {
        write!(writer, "{alpha}")?;
        for (index, value) in vector.to_sparse().entries() {
            write!(writer, " {index}:{value}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
