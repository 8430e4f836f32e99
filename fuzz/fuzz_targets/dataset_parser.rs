//! Fuzzing submodule on the dataset line parser.

use std::io::Cursor;

use honggfuzz::fuzz;
use kernel_svm::dataset::parse_dataset;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let _ = parse_dataset(Cursor::new(data));
        });
    }
}
