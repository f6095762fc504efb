//! Formula tokenizer
//!
//! Turns formula text into a flat token stream and collects the references it
//! mentions. Grammar checks beyond parenthesis balance happen in the evaluator.

use crate::error::{FormulaError, FormulaResult};
use crate::token::{AggregateFunction, FormulaKind, Operator, ParsedFormula, Token};
use tabula_core::{CellAddress, CellRange};

/// Parse a formula string into tokens
///
/// # Example
/// ```rust
/// use tabula_formula::{parse_formula, FormulaKind};
///
/// let parsed = parse_formula("=SUM(A1:A10)").unwrap();
/// assert_eq!(parsed.kind, FormulaKind::Function);
///
/// let parsed = parse_formula("=100*15%").unwrap();
/// assert_eq!(parsed.kind, FormulaKind::Constant);
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<ParsedFormula> {
    let formula = formula.trim();
    if formula.is_empty() {
        return Err(FormulaError::Parse("Formula is empty".into()));
    }

    // Formula must start with '='
    let body = formula
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let tokens = Tokenizer::new(body).tokenize()?;

    let mut cell_refs = Vec::new();
    let mut range_refs = Vec::new();
    let mut has_function = false;

    for token in &tokens {
        match token {
            Token::CellRef(addr) if !cell_refs.contains(addr) => cell_refs.push(*addr),
            Token::RangeRef(range) if !range_refs.contains(range) => range_refs.push(*range),
            Token::Function(_) => has_function = true,
            _ => {}
        }
    }

    let kind = if has_function {
        FormulaKind::Function
    } else if cell_refs.is_empty() && range_refs.is_empty() {
        FormulaKind::Constant
    } else {
        FormulaKind::Expression
    };

    Ok(ParsedFormula {
        tokens,
        cell_refs,
        range_refs,
        kind,
    })
}

/// Character scanner over the formula body (text after `=`)
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    depth: i32,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn tokenize(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
                continue;
            }

            if let Some(func) = self.scan_function() {
                tokens.push(Token::Function(func));
                continue;
            }

            if c.is_ascii_alphabetic() {
                tokens.push(self.scan_reference()?);
                continue;
            }

            if let Some(op) = Operator::from_char(c) {
                self.advance();
                tokens.push(Token::Operator(op));
                continue;
            }

            match c {
                '(' => {
                    self.advance();
                    self.depth += 1;
                    tokens.push(Token::LParen);
                }
                ')' => {
                    self.advance();
                    self.depth -= 1;
                    if self.depth < 0 {
                        return Err(FormulaError::Parse(format!(
                            "Unmatched ')' at position {}",
                            self.pos
                        )));
                    }
                    tokens.push(Token::RParen);
                }
                c if c.is_ascii_digit() || c == '.' => tokens.push(self.scan_number()?),
                // Argument separator
                ',' => self.advance(),
                _ => {
                    return Err(FormulaError::Parse(format!(
                        "Unexpected character '{}' at position {}",
                        c, self.pos
                    )))
                }
            }
        }

        if self.depth != 0 {
            return Err(FormulaError::Parse("Unmatched '('".into()));
        }

        Ok(tokens)
    }

    // === Token scanning ===

    /// Function name immediately followed (ignoring whitespace) by `(`
    fn scan_function(&mut self) -> Option<AggregateFunction> {
        let rest = self.rest();

        for func in AggregateFunction::ALL {
            let name = func.name();
            let matches_name = rest
                .get(..name.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(name));

            if matches_name && rest[name.len()..].trim_start().starts_with('(') {
                self.pos += name.len();
                return Some(func);
            }
        }

        None
    }

    /// Cell reference (`B3`) or range reference (`A1:C4`)
    fn scan_reference(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        let first = self.scan_cell_text();

        if !first.bytes().any(|b| b.is_ascii_digit()) {
            return Err(FormulaError::Parse(format!("Unknown identifier '{}'", first)));
        }

        if self.peek_char() == Some(':') {
            self.advance();
            self.scan_cell_text();
            let input = self.input;
            let text = &input[start..self.pos];
            let range = CellRange::parse(text).map_err(|e| {
                FormulaError::Parse(format!("Invalid range reference '{}': {}", text, e))
            })?;
            return Ok(Token::RangeRef(range));
        }

        let address = CellAddress::parse(first).map_err(|e| {
            FormulaError::Parse(format!("Invalid cell reference '{}': {}", first, e))
        })?;
        Ok(Token::CellRef(address))
    }

    /// Letters followed by any alphanumerics; shape is validated by the caller
    fn scan_cell_text(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self.peek_char().map_or(false, |c| c.is_ascii_alphanumeric()) {
            self.advance();
        }
        &input[start..self.pos]
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // A second decimal point makes the literal malformed
        if self.peek_char() == Some('.') {
            self.advance();
            return Err(FormulaError::Parse(format!(
                "Invalid number '{}'",
                &self.input[start..self.pos]
            )));
        }

        let num_str = &self.input[start..self.pos];
        let mut num: f64 = num_str
            .parse()
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))?;

        if self.peek_char() == Some('%') {
            self.advance();
            num /= 100.0;
        }

        Ok(Token::Number(num))
    }

    // === Helper methods ===

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}
