use crate::pipeline::BoundingBox;

/// Pixel type of label images
pub type Label = u8;

/// A horizontal line of pixels belonging to one label object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Run {
    pub y: u32,
    pub x: u32,
    pub length: u32,
}

impl Run {
    pub fn new(x: u32, y: u32, length: u32) -> Self {
        Self { y, x, length }
    }

    /// Last column covered by this run (inclusive)
    pub fn end_x(&self) -> u32 {
        self.x + self.length - 1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.y == y && x >= self.x && x <= self.end_x()
    }
}

/// One connected region of a label map, stored as runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelObject {
    pub label: Label,
    runs: Vec<Run>,
}

impl LabelObject {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            runs: Vec::new(),
        }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Add a single pixel, extending the last run when it is adjacent
    pub fn add_pixel(&mut self, x: u32, y: u32) {
        if let Some(last) = self.runs.last_mut() {
            if last.y == y && last.end_x() + 1 == x {
                last.length += 1;
                return;
            }
        }
        self.runs.push(Run::new(x, y, 1));
    }

    /// Append a run; zero-length runs are ignored
    pub fn add_run(&mut self, run: Run) {
        if run.length > 0 {
            self.runs.push(run);
        }
    }

    /// Sort the runs and merge the ones that touch or overlap on a row
    pub fn optimize(&mut self) {
        if self.runs.len() < 2 {
            return;
        }
        self.runs.sort();

        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.y == run.y && run.x <= last.end_x() + 1 => {
                    let end = last.end_x().max(run.end_x());
                    last.length = end - last.x + 1;
                }
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Number of pixels. Assumes the runs do not overlap (see `optimize`).
    pub fn area(&self) -> u32 {
        self.runs.iter().map(|r| r.length).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.runs.iter().any(|r| r.contains(x, y))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.runs.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.end_x(), first.y);

        for run in &self.runs[1..] {
            min_x = min_x.min(run.x);
            min_y = min_y.min(run.y);
            max_x = max_x.max(run.end_x());
            max_y = max_y.max(run.y);
        }

        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Iterate over every pixel of the object as (x, y)
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.runs
            .iter()
            .flat_map(|r| (r.x..=r.end_x()).map(move |x| (x, r.y)))
    }

    /// Remove every pixel that is also covered by `other`
    pub fn subtract(&mut self, other: &LabelObject) {
        let mut remaining = Vec::with_capacity(self.runs.len());

        for run in &self.runs {
            let mut pieces = vec![*run];
            for cut in other.runs.iter().filter(|c| c.y == run.y) {
                pieces = pieces
                    .into_iter()
                    .flat_map(|piece| split_run(piece, cut))
                    .collect();
            }
            remaining.extend(pieces);
        }

        self.runs = remaining;
    }
}

/// Pieces of `run` not covered by `cut` (both on the same row)
fn split_run(run: Run, cut: &Run) -> Vec<Run> {
    if cut.end_x() < run.x || cut.x > run.end_x() {
        return vec![run];
    }

    let mut pieces = Vec::with_capacity(2);
    if cut.x > run.x {
        pieces.push(Run::new(run.x, run.y, cut.x - run.x));
    }
    if cut.end_x() < run.end_x() {
        pieces.push(Run::new(cut.end_x() + 1, run.y, run.end_x() - cut.end_x()));
    }
    pieces
}
