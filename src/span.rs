use std::fmt::Display;

/// Position of a token in the source text. Lines and columns start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn at(line: usize, column: usize) -> Self {
        Span {
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
        }
    }
}

impl std::ops::Add<Span> for Span {
    type Output = Span;

    fn add(self, other: Span) -> Span {
        let start = if (self.start_line, self.start_column) <= (other.start_line, other.start_column)
        {
            &self
        } else {
            &other
        };
        let end = if (self.end_line, self.end_column) >= (other.end_line, other.end_column) {
            &self
        } else {
            &other
        };

        Span {
            start_line: start.start_line,
            start_column: start.start_column,
            end_line: end.end_line,
            end_column: end.end_column,
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.start_line, self.start_column)
    }
}
