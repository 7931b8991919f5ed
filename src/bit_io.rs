use std::io::{Read, Write};

/// How much of `ZERO` or `ONE` has been seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partial {
    Empty,
    Z,
    Ze,
    Zer,
    O,
    On,
}

enum Step {
    Continue(Partial),
    Matched(bool),
}

fn step(partial: Partial, c: u8) -> Step {
    match (partial, c) {
        (Partial::Zer, b'O') => Step::Matched(false),
        (Partial::On, b'E') => Step::Matched(true),
        (Partial::Z, b'E') => Step::Continue(Partial::Ze),
        (Partial::Ze, b'R') => Step::Continue(Partial::Zer),
        (Partial::O, b'N') => Step::Continue(Partial::On),
        // A character that breaks the current match may still start a new one.
        (_, b'Z') => Step::Continue(Partial::Z),
        (_, b'O') => Step::Continue(Partial::O),
        _ => Step::Continue(Partial::Empty),
    }
}

/// Scans `input` until it spells `ZERO` or `ONE`, ignoring whitespace and
/// anything that is not part of a match. `None` once the input runs dry.
pub fn read_bit(input: &mut dyn Read) -> std::io::Result<Option<bool>> {
    let mut partial = Partial::Empty;
    for byte in input.bytes() {
        let byte = byte?;
        if byte.is_ascii_whitespace() {
            continue;
        }
        match step(partial, byte) {
            Step::Continue(next) => partial = next,
            Step::Matched(bit) => return Ok(Some(bit)),
        }
    }
    Ok(None)
}

pub fn write_bit(output: &mut dyn Write, bit: bool) -> std::io::Result<()> {
    writeln!(output, "{}", if bit { "ONE" } else { "ZERO" })
}
