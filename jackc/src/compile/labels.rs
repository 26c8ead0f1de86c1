//! Control flow label numbering.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    If,
    While,
}

/// Per subroutine counters for `if` and `while` labels.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    if_count: usize,
    while_count: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn counter(&mut self, kind: LabelKind) -> &mut usize {
        match kind {
            LabelKind::If => &mut self.if_count,
            LabelKind::While => &mut self.while_count,
        }
    }

    #[inline]
    pub fn get(&self, kind: LabelKind) -> usize {
        match kind {
            LabelKind::If => self.if_count,
            LabelKind::While => self.while_count,
        }
    }

    #[inline]
    pub fn increment(&mut self, kind: LabelKind) {
        *self.counter(kind) += 1;
    }

    /// Step the counter back, stopping at zero.
    #[inline]
    pub fn decrement(&mut self, kind: LabelKind) {
        let counter = self.counter(kind);
        *counter = counter.saturating_sub(1);
    }

    /// Take the current number and move the counter past it.
    pub fn next(&mut self, kind: LabelKind) -> usize {
        let n = self.get(kind);
        self.increment(kind);
        n
    }

    pub fn reset_counts(&mut self) {
        self.if_count = 0;
        self.while_count = 0;
    }
}

/// Label names as they appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    IfTrue(usize),
    IfFalse(usize),
    IfEnd(usize),
    WhileExp(usize),
    WhileEnd(usize),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::IfTrue(n) => write!(f, "IF_TRUE{n}"),
            Label::IfFalse(n) => write!(f, "IF_FALSE{n}"),
            Label::IfEnd(n) => write!(f, "IF_END{n}"),
            Label::WhileExp(n) => write!(f, "WHILE_EXP{n}"),
            Label::WhileEnd(n) => write!(f, "WHILE_END{n}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let mut labels = LabelAllocator::new();
        assert_eq!(labels.next(LabelKind::If), 0);
        assert_eq!(labels.next(LabelKind::If), 1);
        assert_eq!(labels.next(LabelKind::While), 0);
        assert_eq!(labels.get(LabelKind::If), 2);
        assert_eq!(labels.get(LabelKind::While), 1);
    }

    #[test]
    fn test_decrement_saturates() {
        let mut labels = LabelAllocator::new();
        labels.increment(LabelKind::While);
        labels.decrement(LabelKind::While);
        labels.decrement(LabelKind::While);
        assert_eq!(labels.get(LabelKind::While), 0);
    }

    #[test]
    fn test_reset_counts() {
        let mut labels = LabelAllocator::new();
        labels.next(LabelKind::If);
        labels.next(LabelKind::While);
        labels.reset_counts();
        assert_eq!(labels.get(LabelKind::If), 0);
        assert_eq!(labels.get(LabelKind::While), 0);
    }

    #[test]
    fn test_label_names() {
        assert_eq!(Label::IfTrue(0).to_string(), "IF_TRUE0");
        assert_eq!(Label::IfFalse(3).to_string(), "IF_FALSE3");
        assert_eq!(Label::IfEnd(12).to_string(), "IF_END12");
        assert_eq!(Label::WhileExp(1).to_string(), "WHILE_EXP1");
        assert_eq!(Label::WhileEnd(1).to_string(), "WHILE_END1");
    }
}
