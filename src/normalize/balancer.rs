use tracing::debug;

use super::metric::symbol_count;
use super::rules::PunctuationRule;
use super::BreakRule;

/// A run of words that will become one sub-line, with its cached symbol length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator<'a> {
    words: Vec<&'a str>,
    symbols: usize,
}

impl<'a> Accumulator<'a> {
    pub fn starting_with(word: &'a str) -> Self {
        Self::default().pushed(word)
    }

    pub fn words(&self) -> &[&'a str] {
        &self.words
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn last(&self) -> Option<&'a str> {
        self.words.last().copied()
    }

    fn pushed(mut self, word: &'a str) -> Self {
        self.symbols += symbol_count(word);
        self.words.push(word);
        self
    }

    fn prepended(mut self, word: &'a str) -> Self {
        self.symbols += symbol_count(word);
        self.words.insert(0, word);
        self
    }

    fn without_last(mut self) -> (Self, Option<&'a str>) {
        let word = self.words.pop();
        if let Some(word) = word {
            self.symbols -= symbol_count(word);
        }
        (self, word)
    }

    fn without_first(mut self) -> (Self, Option<&'a str>) {
        if self.words.is_empty() {
            return (self, None);
        }
        let word = self.words.remove(0);
        self.symbols -= symbol_count(word);
        (self, Some(word))
    }

    fn merged(mut self, other: Accumulator<'a>) -> Self {
        self.symbols += other.symbols;
        self.words.extend(other.words);
        self
    }

    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// Phase of the split state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Words are flowing into the current accumulator
    Accumulating,
    /// The current accumulator rejected a word and is being closed
    Closing,
    /// All words are consumed and the sub-lines are final
    Finalized,
}

/// What happened to an accumulator when it was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// There was no previous accumulator, the closed one became previous
    Held,
    /// The closed accumulator fit into the previous one
    Merged,
    /// Previous and closed were rebalanced, previous was finalized
    Rebalanced,
}

#[derive(Debug)]
struct SplitState<'a> {
    phase: Phase,
    previous: Option<Accumulator<'a>>,
    current: Accumulator<'a>,
    finished: Vec<Accumulator<'a>>,
    closes: Vec<CloseOutcome>,
}

impl<'a> SplitState<'a> {
    fn new() -> Self {
        Self {
            phase: Phase::Accumulating,
            previous: None,
            current: Accumulator::default(),
            finished: Vec::new(),
            closes: Vec::new(),
        }
    }
}

/// Result of splitting one screen line, with the close decisions taken on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub lines: Vec<String>,
    pub closes: Vec<CloseOutcome>,
}

/// Splits a screen line into sub-lines that fit a symbol budget
pub struct LineBalancer {
    limit: usize,
    rule: Box<dyn BreakRule>,
}

impl LineBalancer {
    pub fn new(limit: usize, rule: Box<dyn BreakRule>) -> Self {
        Self { limit, rule }
    }

    /// Balancer using the punctuation break rule
    pub fn with_limit(limit: usize) -> Self {
        Self::new(limit, Box::new(PunctuationRule))
    }

    /// Split a screen line into budget-respecting sub-lines
    pub fn split(&self, line: &str) -> Vec<String> {
        self.split_traced(line).lines
    }

    /// Split a screen line and report how every closed accumulator was handled
    pub fn split_traced(&self, line: &str) -> SplitOutcome {
        let line = line.trim();
        if line.is_empty() {
            return SplitOutcome { lines: Vec::new(), closes: Vec::new() };
        }
        if symbol_count(line) <= self.limit {
            return SplitOutcome { lines: vec![line.to_string()], closes: Vec::new() };
        }

        let state = line
            .split_whitespace()
            .fold(SplitState::new(), |state, word| self.advance(state, word));
        let state = self.finalize(state);
        debug_assert_eq!(state.phase, Phase::Finalized);

        let lines: Vec<String> = state.finished.iter().map(Accumulator::text).collect();
        debug!("Split {} symbols into {} lines (limit {})", symbol_count(line), lines.len(), self.limit);

        SplitOutcome { lines, closes: state.closes }
    }

    /// Whether `word` may join the accumulator without closing it
    fn accepts(&self, current: &Accumulator<'_>, word: &str) -> bool {
        let Some(last) = current.last() else {
            return true;
        };
        let length = current.symbols();
        if length + symbol_count(word) > self.limit {
            return false;
        }

        self.rule.is_good_end(word) || length < self.limit * 2 / 3 || !self.rule.is_good_end(last)
    }

    fn advance<'a>(&self, mut state: SplitState<'a>, word: &'a str) -> SplitState<'a> {
        if self.accepts(&state.current, word) {
            state.current = std::mem::take(&mut state.current).pushed(word);
            state.phase = Phase::Accumulating;
            return state;
        }

        state.phase = Phase::Closing;
        let closed = std::mem::replace(&mut state.current, Accumulator::starting_with(word));
        self.close(state, closed)
    }

    /// Merge into previous, otherwise rebalance and finalize previous
    fn close<'a>(&self, mut state: SplitState<'a>, closed: Accumulator<'a>) -> SplitState<'a> {
        let (previous, outcome) = match state.previous.take() {
            Some(previous) if previous.symbols() + closed.symbols() <= self.limit => {
                (previous.merged(closed), CloseOutcome::Merged)
            }
            Some(previous) => {
                let (previous, closed) = self.rebalance(previous, closed);
                state.finished.push(previous);
                (closed, CloseOutcome::Rebalanced)
            }
            None => (closed, CloseOutcome::Held),
        };

        state.previous = Some(previous);
        state.closes.push(outcome);
        state.phase = Phase::Accumulating;
        state
    }

    fn finalize<'a>(&self, mut state: SplitState<'a>) -> SplitState<'a> {
        let current = std::mem::take(&mut state.current);
        match state.previous.take() {
            Some(previous) => {
                let (previous, current) = self.rebalance(previous, current);
                state.finished.push(previous);
                state.finished.push(current);
            }
            None => state.finished.push(current),
        }

        state.finished.retain(|acc| !acc.text().trim().is_empty());
        state.phase = Phase::Finalized;
        state
    }

    /// Move boundary words from the longer accumulator to the shorter one
    /// while the worst deviation from the average keeps shrinking
    pub fn rebalance<'a>(
        &self,
        mut previous: Accumulator<'a>,
        mut current: Accumulator<'a>,
    ) -> (Accumulator<'a>, Accumulator<'a>) {
        if previous.is_empty() || current.is_empty() {
            return (previous, current);
        }

        let limit = self.limit as i64;
        let mut previous_len = previous.symbols() as i64;
        let mut current_len = current.symbols() as i64;
        let average = (previous_len + current_len) / 2;
        let deviation = |a: i64, b: i64| (average - a).abs().max((average - b).abs());
        let mut to_perfect_balance = deviation(previous_len, current_len);
        let toward_current = current_len < previous_len;

        loop {
            let (boundary, receiver_len) = if toward_current {
                if previous.words().len() == 1 {
                    break;
                }
                let Some(word) = previous.last() else { break };
                if self.rule.is_good_end(word) {
                    break;
                }
                (word, current_len)
            } else {
                if current.words().len() == 1 {
                    break;
                }
                let Some(last) = previous.last() else { break };
                if self.rule.is_good_end(last) {
                    break;
                }
                (current.words()[0], previous_len)
            };

            let word_len = symbol_count(boundary) as i64;
            if word_len + receiver_len > limit {
                break;
            }

            let (new_previous_len, new_current_len) = if toward_current {
                (previous_len - word_len, current_len + word_len)
            } else {
                (previous_len + word_len, current_len - word_len)
            };
            let new_to_perfect_balance = deviation(new_previous_len, new_current_len);
            if new_to_perfect_balance >= to_perfect_balance {
                break;
            }

            if toward_current {
                let (rest, moved) = previous.without_last();
                previous = rest;
                if let Some(word) = moved {
                    current = current.prepended(word);
                }
            } else {
                let (rest, moved) = current.without_first();
                current = rest;
                if let Some(word) = moved {
                    previous = previous.pushed(word);
                }
            }

            previous_len = new_previous_len;
            current_len = new_current_len;
            to_perfect_balance = new_to_perfect_balance;
        }

        (previous, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::rules::NoBreakRule;

    fn words(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|line| line.split_whitespace().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_short_line_is_unchanged() {
        let balancer = LineBalancer::with_limit(42);
        assert_eq!(balancer.split("Short line"), vec!["Short line"]);
        assert_eq!(balancer.split("  padded  "), vec!["padded"]);
    }

    #[test]
    fn test_blank_line_yields_nothing() {
        let balancer = LineBalancer::with_limit(42);
        assert!(balancer.split("   ").is_empty());
        assert!(balancer.split("").is_empty());
    }

    #[test]
    fn test_prefers_break_after_punctuation() {
        let balancer = LineBalancer::with_limit(20);
        let lines = balancer.split("Hello there my friend, how are you today");
        assert_eq!(lines, vec!["Hello there my friend,", "how are you today"]);
        for line in &lines {
            assert!(symbol_count(line) <= 20);
        }
    }

    #[test]
    fn test_rebalances_line_without_punctuation() {
        let balancer = LineBalancer::with_limit(42);
        let text = "alpha bravo delta gamma omega sigma kappa theta lemon mango";
        assert_eq!(symbol_count(text), 50);

        let lines = balancer.split(text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "alpha bravo delta gamma omega");
        assert_eq!(lines[1], "sigma kappa theta lemon mango");
        let diff = symbol_count(&lines[0]).abs_diff(symbol_count(&lines[1]));
        assert!(diff <= 5);
    }

    #[test]
    fn test_close_merges_short_fragment_into_previous() {
        let balancer = LineBalancer::with_limit(20);
        let outcome = balancer.split_traced("aaaaaaaaaaaaaa. bb cccccccccccccccccccc");
        assert_eq!(outcome.closes, vec![CloseOutcome::Held, CloseOutcome::Merged]);
        assert_eq!(outcome.lines, vec!["aaaaaaaaaaaaaa. bb", "cccccccccccccccccccc"]);
    }

    #[test]
    fn test_close_rebalances_and_finalizes_previous() {
        let balancer = LineBalancer::new(10, Box::new(NoBreakRule));
        let outcome = balancer.split_traced("aaaa bbbb cccc dddd eeee ffff");
        assert_eq!(outcome.closes, vec![CloseOutcome::Held, CloseOutcome::Rebalanced]);
        assert_eq!(outcome.lines, vec!["aaaa bbbb", "cccc dddd", "eeee ffff"]);
    }

    #[test]
    fn test_oversized_word_stays_whole() {
        let balancer = LineBalancer::with_limit(10);
        let lines = balancer.split("Supercalifragilisticexpialidocious is long");
        assert_eq!(lines, vec!["Supercalifragilisticexpialidocious", "is long"]);
    }

    #[test]
    fn test_rebalance_does_not_move_clause_end() {
        let balancer = LineBalancer::with_limit(40);
        let previous = Accumulator::default()
            .pushed("one")
            .pushed("two")
            .pushed("three,");
        let current = Accumulator::starting_with("x");
        let (previous, current) = balancer.rebalance(previous, current);
        assert_eq!(previous.words(), &["one", "two", "three,"]);
        assert_eq!(current.words(), &["x"]);
    }

    #[test]
    fn test_rebalance_pulls_from_current_into_previous() {
        let balancer = LineBalancer::new(40, Box::new(NoBreakRule));
        let previous = Accumulator::starting_with("a");
        let current = Accumulator::default()
            .pushed("bbbb")
            .pushed("cccc")
            .pushed("dddd");
        let (previous, current) = balancer.rebalance(previous, current);
        assert_eq!(previous.words(), &["a", "bbbb"]);
        assert_eq!(current.words(), &["cccc", "dddd"]);
        assert_eq!(previous.symbols(), 5);
        assert_eq!(current.symbols(), 8);
    }

    #[test]
    fn test_words_are_conserved_and_budget_respected() {
        let samples = [
            "I told you already, we are not going back to that house tonight, no matter what he says.",
            "The quick brown fox jumps over the lazy dog while everyone else is sleeping in the barn",
            "Wait! Stop! Don't touch that button, it launches the whole thing and we can't undo it.",
            "a b c d e f g h i j k l m n o p q r s t u v w x y z a b c d e f g h i j k l m n o p",
        ];

        for limit in [12, 20, 30, 42] {
            let balancer = LineBalancer::with_limit(limit);
            for sample in samples {
                let lines = balancer.split(sample);
                let original: Vec<String> = sample.split_whitespace().map(str::to_string).collect();
                assert_eq!(words(&lines), original, "limit {limit}: {sample}");
                for line in &lines {
                    let single_word = line.split_whitespace().count() == 1;
                    assert!(
                        symbol_count(line) <= limit || single_word,
                        "limit {limit}: {line:?} is over budget"
                    );
                }
            }
        }
    }

    #[test]
    fn test_split_is_idempotent_on_compliant_lines() {
        let balancer = LineBalancer::with_limit(20);
        for line in balancer.split("Hello there my friend, how are you today") {
            assert_eq!(balancer.split(&line), vec![line.clone()]);
        }
    }
}
