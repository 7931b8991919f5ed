use std::{cell::RefCell, io::Cursor, rc::Rc};

use bit::{
    error::InvalidOperation,
    interpreter::{ExecutionError, ExecutionErrorKind, Interpreter},
    parser::ParseError,
    tokenizer::TokenError,
    Config, Error,
};

fn run_program(source: &str, input: &str) -> Result<String, Error> {
    let program = bit::load(source, &Config::default())?;
    let output = Rc::new(RefCell::new(Vec::new()));
    let input = Rc::new(RefCell::new(Cursor::new(input.as_bytes().to_vec())));
    let mut interpreter = Interpreter::new(input, output.clone());
    interpreter.interpret(&program)?;
    let output = String::from_utf8(output.take()).expect("Output should be valid UTF-8");
    Ok(output)
}

fn test_valid_program(source: &str, input: &str, expected_output: &str) {
    let output = run_program(source, input).expect("Program should run to completion");
    assert_eq!(output, expected_output);
}

fn invalid_operation(err: Error) -> InvalidOperation {
    match err {
        Error::Parse(ParseError::InvalidOperation { operation, .. }) => operation,
        Error::Execution(ExecutionError::Execution {
            kind: ExecutionErrorKind::InvalidOperation(operation),
            ..
        }) => operation,
        err => panic!("expected an invalid operation, got {err}"),
    }
}

#[test]
fn test_print_and_halt() {
    test_valid_program("LINENUMBER ZERO CODE PRINT ONE", "", "ONE\n");
}

#[test]
fn test_print_variable() {
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS ONE GOTO ONE
    LINE NUMBER ONE CODE PRINT VARIABLE ZERO
    "#;
    test_valid_program(source, "", "ONE\n");
}

#[test]
fn test_execution_starts_at_lowest_line() {
    let source = r#"
    LINE NUMBER ONE ONE CODE PRINT ZERO
    LINE NUMBER ONE CODE PRINT ONE GOTO ONE ONE
    "#;
    test_valid_program(source, "", "ONE\nZERO\n");
}

#[test]
fn test_alias_through_address_variable() {
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS ZERO GOTO ONE
    LINE NUMBER ONE CODE VARIABLE ONE EQUALS THE ADDRESS OF VARIABLE ZERO GOTO ONE ZERO
    LINE NUMBER ONE ZERO CODE THE VALUE AT VARIABLE ONE EQUALS ONE GOTO ONE ONE
    LINE NUMBER ONE ONE CODE PRINT VARIABLE ZERO GOTO ONE ZERO ZERO
    LINE NUMBER ONE ZERO ZERO CODE VARIABLE ZERO EQUALS ZERO GOTO ONE ZERO ONE
    LINE NUMBER ONE ZERO ONE CODE PRINT THE VALUE AT VARIABLE ONE
    "#;
    test_valid_program(source, "", "ONE\nZERO\n");
}

#[test]
fn test_address_variables_copy_addresses() {
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ONE EQUALS THE ADDRESS OF VARIABLE ZERO GOTO ONE
    LINE NUMBER ONE CODE VARIABLE ONE ZERO EQUALS VARIABLE ONE GOTO ONE ZERO
    LINE NUMBER ONE ZERO CODE THE VALUE AT VARIABLE ONE ZERO EQUALS ONE GOTO ONE ONE
    LINE NUMBER ONE ONE CODE PRINT VARIABLE ZERO
    "#;
    test_valid_program(source, "", "ONE\n");
}

#[test]
fn test_bit_variable_cannot_become_address() {
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS ONE GOTO ONE
    LINE NUMBER ONE CODE VARIABLE ZERO EQUALS THE ADDRESS OF VARIABLE ONE
    "#;
    assert_eq!(
        invalid_operation(run_program(source, "").unwrap_err()),
        InvalidOperation::AddressIntoBitVariable(0)
    );
}

#[test]
fn test_address_variable_cannot_become_bit() {
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS THE ADDRESS OF VARIABLE ONE GOTO ONE
    LINE NUMBER ONE CODE VARIABLE ZERO EQUALS ONE
    "#;
    assert_eq!(
        invalid_operation(run_program(source, "").unwrap_err()),
        InvalidOperation::AddressOfAddressVariable(0)
    );
}

#[test]
fn test_uninitialised_read() {
    let source = "LINE NUMBER ZERO CODE PRINT VARIABLE ONE";
    assert_eq!(
        invalid_operation(run_program(source, "").unwrap_err()),
        InvalidOperation::UninitialisedVariable(1)
    );
}

#[test]
fn test_duplicate_goto() {
    let source = "LINE NUMBER ZERO CODE READ GOTO ONE GOTO ZERO IF THE JUMP REGISTER IS ONE";
    assert!(matches!(
        run_program(source, "ONE"),
        Err(Error::Parse(ParseError::DuplicateGoto(0)))
    ));
}

#[test]
fn test_multi_bit_literal() {
    let source = "LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS ONE ONE";
    assert_eq!(
        invalid_operation(run_program(source, "").unwrap_err()),
        InvalidOperation::MultiBitLiteral(3)
    );
}

#[test]
fn test_load_errors_stop_before_execution() {
    let source = r#"
    LINE NUMBER ZERO CODE READ
    LINE NUMBER ONE CODE PRINT ONE ZERO
    "#;
    // The READ would fail on closed input if anything ran.
    assert!(matches!(
        run_program(source, ""),
        Err(Error::Parse(ParseError::InvalidOperation { line: 1, .. }))
    ));
}

#[test]
fn test_tokenizer_errors() {
    assert!(matches!(
        run_program("LINE NUMBER 0 CODE PRINT ONE", ""),
        Err(Error::Token(TokenError::InvalidCharacter('0', _)))
    ));
    assert!(matches!(
        run_program("LINE NUMBER ZERO CODE PRINT ON", ""),
        Err(Error::Token(TokenError::InvalidToken(word, _))) if word == "ON"
    ));
}

#[test]
fn test_deep_nand_chain_is_rejected() {
    let source = format!(
        "LINE NUMBER ZERO CODE PRINT {}ONE",
        "ONE NAND ".repeat(200_000)
    );
    assert!(matches!(
        run_program(&source, ""),
        Err(Error::Parse(ParseError::NestingTooDeep(0)))
    ));
}

#[test]
fn test_strict_mode() {
    let source = "LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS THE JUMP REGISTER";
    let program = bit::load(source, &Config::default()).unwrap();
    assert_eq!(program.warnings.len(), 1);
    assert!(bit::load(source, &Config { strict: true }).is_err());
}

#[test]
fn test_echo_until_zero() {
    let source = r#"
    LINE NUMBER ZERO CODE READ
        GOTO ONE IF THE JUMP REGISTER IS ONE
        GOTO ONE ZERO IF THE JUMP REGISTER IS ZERO
    LINE NUMBER ONE CODE PRINT ONE GOTO ZERO
    LINE NUMBER ONE ZERO CODE PRINT ZERO
    "#;
    test_valid_program(source, "ONE\nONE\nnoise ZERO\nONE\n", "ONE\nONE\nZERO\n");
}

#[test]
fn test_read_past_end_of_input() {
    let source = "LINE NUMBER ZERO CODE READ GOTO ZERO";
    assert!(matches!(
        run_program(source, "ONE ZERO"),
        Err(Error::Execution(ExecutionError::Execution {
            kind: ExecutionErrorKind::InputClosed,
            ..
        }))
    ));
}

#[test]
fn test_toggle_loop() {
    let source = r#"
    LINE NUMBER ZERO CODE PRINT ONE GOTO ONE
    LINE NUMBER ONE CODE THE JUMP REGISTER EQUALS THE JUMP REGISTER NAND ONE
        GOTO ZERO IF THE JUMP REGISTER IS ONE
    "#;
    test_valid_program(source, "", "ONE\nONE\n");
}

#[test]
fn test_nand_with_zero_ignores_unset_right_operand() {
    let source = r#"
    LINE NUMBER ZERO CODE THE JUMP REGISTER EQUALS ZERO NAND VARIABLE ONE
        GOTO ONE IF THE JUMP REGISTER IS ONE
    LINE NUMBER ONE CODE PRINT ONE
    "#;
    test_valid_program(source, "", "ONE\n");
}

#[test]
fn test_two_bit_counter() {
    // Counts VARIABLE ONE (high bit) and VARIABLE ZERO (low bit) from 00 until
    // it wraps back to 00, printing once per iteration.
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS ZERO GOTO ONE
    LINE NUMBER ONE CODE VARIABLE ONE EQUALS ZERO GOTO ONE ZERO
    LINE NUMBER ONE ZERO CODE PRINT ONE GOTO ONE ONE
    LINE NUMBER ONE ONE CODE VARIABLE ONE ZERO EQUALS VARIABLE ZERO NAND VARIABLE ONE
        GOTO ONE ZERO ZERO
    LINE NUMBER ONE ZERO ZERO CODE VARIABLE ONE EQUALS
        OPEN PARENTHESIS VARIABLE ZERO NAND VARIABLE ONE ZERO CLOSE PARENTHESIS
        NAND OPEN PARENTHESIS VARIABLE ONE NAND VARIABLE ONE ZERO CLOSE PARENTHESIS
        GOTO ONE ZERO ONE
    LINE NUMBER ONE ZERO ONE CODE VARIABLE ZERO EQUALS VARIABLE ZERO NAND ONE
        GOTO ONE ONE ZERO
    LINE NUMBER ONE ONE ZERO CODE THE JUMP REGISTER EQUALS
        OPEN PARENTHESIS VARIABLE ZERO NAND ONE CLOSE PARENTHESIS
        NAND OPEN PARENTHESIS VARIABLE ONE NAND ONE CLOSE PARENTHESIS
        GOTO ONE ZERO IF THE JUMP REGISTER IS ONE
    "#;
    test_valid_program(source, "", "ONE\nONE\nONE\nONE\n");
}

#[test]
fn test_listing_runs_the_same() {
    let source = r#"
    LINE NUMBER ZERO CODE VARIABLE ZERO EQUALS ONE GOTO ONE
    LINE NUMBER ONE CODE VARIABLE ONE EQUALS THE ADDRESS OF VARIABLE ZERO GOTO ONE ZERO
    LINE NUMBER ONE ZERO CODE PRINT OPEN PARENTHESIS THE VALUE AT VARIABLE ONE CLOSE PARENTHESIS NAND ZERO
    "#;
    let listing = bit::load(source, &Config::default()).unwrap().to_string();
    assert_eq!(
        run_program(&listing, "").unwrap(),
        run_program(source, "").unwrap()
    );
}
