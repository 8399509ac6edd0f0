use std::io::{self, Write};

const MARKS_PER_LINE: usize = 80;

/// Prints one mark per completed run so the user can see the scenario making progress.
///
/// Marks wrap onto a new line after every 80 runs. Writes are best effort: a broken output
/// stream must not stop the benchmark.
pub(crate) struct ProgressMarks<W: Write> {
    out: W,
    count: usize,
}

impl ProgressMarks<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ProgressMarks<W> {
    pub fn new(out: W) -> Self {
        Self { out, count: 0 }
    }

    pub fn mark(&mut self) {
        self.count += 1;
        let _ = self.out.write_all(b".");
        if self.count % MARKS_PER_LINE == 0 {
            let _ = self.out.write_all(b"\n");
        }
        let _ = self.out.flush();
    }

    /// Terminate a partially filled line once the last run has completed.
    pub fn finish(&mut self) {
        if self.count % MARKS_PER_LINE != 0 {
            let _ = self.out.write_all(b"\n");
            let _ = self.out.flush();
        }
    }
}
