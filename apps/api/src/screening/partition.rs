use std::num::NonZeroUsize;

use crate::models::screening::Resume;

/// A contiguous slice of the uploaded resumes, ranked by one LLM call.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Position of this batch in input order, starting at 0.
    pub index: usize,
    pub resumes: Vec<Resume>,
}

impl Batch {
    pub fn resume_names(&self) -> Vec<String> {
        self.resumes.iter().map(|r| r.name.clone()).collect()
    }
}

/// Splits `resumes` into batches of at most `batch_size`, preserving order.
///
/// Produces `ceil(len / batch_size)` batches; only the last may be short.
/// An empty input produces no batches.
pub fn partition(resumes: Vec<Resume>, batch_size: NonZeroUsize) -> Vec<Batch> {
    let size = batch_size.get();
    let mut batches = Vec::with_capacity(resumes.len().div_ceil(size));
    let mut iter = resumes.into_iter().peekable();

    while iter.peek().is_some() {
        batches.push(Batch {
            index: batches.len(),
            resumes: iter.by_ref().take(size).collect(),
        });
    }

    batches
}
