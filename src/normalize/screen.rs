use super::metric::LINE_BREAK;

/// Pairs consecutive sub-lines into captions of at most two screen lines.
///
/// A sub-line left without a partner waits for the next one, even across
/// source screen lines, and is flushed alone by [`ScreenBuilder::build`].
#[derive(Debug, Default)]
pub struct ScreenBuilder {
    items: Vec<String>,
    pending: Option<String>,
}

impl ScreenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: String) {
        match self.pending.take() {
            Some(first) => self.items.push(format!("{first}{LINE_BREAK}{line}")),
            None => self.pending = Some(line),
        }
    }

    pub fn build(mut self) -> Vec<String> {
        if let Some(last) = self.pending.take() {
            self.items.push(last);
        }
        self.items
    }
}
