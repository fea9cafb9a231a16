#[macro_use]
extern crate lazy_static;

use onig::{Regex, RegexOptions, Syntax};
use unicode_segmentation::UnicodeSegmentation;

use common::error::RuntimeError;
use common::ParsedExpr;

/**
 * Lex rules, tried in order at the cursor.
 */
static LEX_RULES: [&'static str; 5] = [
    r"^\s+",
    r"^\(",
    r"^\)",
    r"^[\-]?\d+(?![A-Za-z0-9_])",
    r"^[A-Za-z_][A-Za-z0-9_]*",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Skip,
    LParen,
    RParen,
    Number,
    Symbol,
}

/**
 * Token kind produced by each lex rule, by rule index.
 */
static TOKEN_KINDS: [TokenKind; 5] = [
    TokenKind::Skip,
    TokenKind::LParen,
    TokenKind::RParen,
    TokenKind::Number,
    TokenKind::Symbol,
];

lazy_static! {
    /**
     * Pre-parse the regex instead of parsing it every time when calling `next_token`.
     */
    static ref REGEX_RULES: Vec<Regex> = LEX_RULES
        .iter()
        .map(|rule| Regex::with_options(rule, RegexOptions::REGEX_OPTION_SINGLELINE, Syntax::default()).unwrap())
        .collect();
}

#[derive(Debug, Clone, Copy)]
struct Token<'t> {
    kind: TokenKind,
    value: &'t str,
    line: usize,
    column: usize,
}

struct Tokenizer<'t> {
    /**
     * Tokenizing string.
     */
    string: &'t str,

    /**
     * Cursor for current symbol.
     */
    cursor: usize,

    /**
     * Line-based location tracking. Columns are counted in graphemes so
     * the ^ marker in error excerpts lines up with the source.
     */
    current_line: usize,
    current_column: usize,
}

impl<'t> Tokenizer<'t> {
    fn new() -> Tokenizer<'t> {
        Tokenizer {
            string: "",
            cursor: 0,
            current_line: 1,
            current_column: 0,
        }
    }

    /**
     * Initializes a parsing string.
     */
    fn init_string(&mut self, string: &'t str) -> &mut Tokenizer<'t> {
        self.string = string;
        self.cursor = 0;
        self.current_line = 1;
        self.current_column = 0;
        self
    }

    /**
     * Returns the next token, or `None` at the end of input.
     */
    fn next_token(&mut self) -> Result<Option<Token<'t>>, RuntimeError> {
        while self.cursor < self.string.len() {
            let str_slice = &self.string[self.cursor..];
            let (kind, text) = match self.match_rule(str_slice) {
                Some(matched) => matched,
                None => {
                    let bad = str_slice.graphemes(true).next().unwrap_or("");
                    return Err(self.unexpected_token(bad, self.current_line, self.current_column));
                }
            };
            let line = self.current_line;
            let column = self.current_column;
            self.advance(text);
            if kind != TokenKind::Skip {
                return Ok(Some(Token { kind, value: text, line, column }));
            }
        }
        Ok(None)
    }

    fn match_rule(&self, str_slice: &'t str) -> Option<(TokenKind, &'t str)> {
        for (i, re) in REGEX_RULES.iter().enumerate() {
            if let Some(caps) = re.captures(str_slice) {
                return Some((TOKEN_KINDS[i], caps.at(0).unwrap()));
            }
        }
        None
    }

    fn advance(&mut self, matched: &str) {
        self.cursor += matched.len();
        for grapheme in matched.graphemes(true) {
            if grapheme == "\n" {
                self.current_line += 1;
                self.current_column = 0;
            } else {
                self.current_column += 1;
            }
        }
    }

    /**
     * Builds an "Unexpected token" error, showing the actual line from
     * the source, pointing with the ^ marker to the bad token.
     * In addition, shows `line:column` location.
     */
    fn unexpected_token(&self, string: &str, line: usize, column: usize) -> RuntimeError {
        let line_source = self.string.split('\n').nth(line - 1).unwrap_or("");
        let pad = " ".repeat(column);
        RuntimeError::syntax_error(format!(
            "\n\n{}\n{}^\nUnexpected token: \"{}\" at {}:{}.",
            line_source, pad, string, line, column
        ))
    }
}

/**
 * Reads source text into raw s-expressions by recursive descent over
 * the token stream.
 */
pub struct Parser<'t> {
    tokenizer: Tokenizer<'t>,
    lookahead: Option<Token<'t>>,
}

impl<'t> Parser<'t> {
    pub fn new() -> Parser<'t> {
        Parser {
            tokenizer: Tokenizer::new(),
            lookahead: None,
        }
    }

    /**
     * Parses a string into its top-level s-expressions.
     */
    pub fn parse(&mut self, string: &'t str) -> Result<Vec<ParsedExpr>, RuntimeError> {
        self.tokenizer.init_string(string);
        self.lookahead = self.tokenizer.next_token()?;
        if self.lookahead.is_none() {
            return Err(RuntimeError::syntax_error("Unexpected end of input.".to_string()));
        }
        let mut program = Vec::new();
        while self.lookahead.is_some() {
            program.push(self.parse_expression()?);
        }
        Ok(program)
    }

    fn parse_expression(&mut self) -> Result<ParsedExpr, RuntimeError> {
        let token = match self.lookahead {
            Some(token) => token,
            None => return Err(RuntimeError::syntax_error("Unexpected end of input.".to_string())),
        };
        match token.kind {
            TokenKind::Number => {
                self.consume()?;
                let number = token.value.parse::<isize>().map_err(|_| {
                    RuntimeError::syntax_error(format!(
                        "number literal \"{}\" is out of range at {}:{}.",
                        token.value, token.line, token.column
                    ))
                })?;
                Ok(ParsedExpr::Int(number))
            }
            TokenKind::Symbol => {
                self.consume()?;
                Ok(ParsedExpr::Symbol(token.value.to_string()))
            }
            TokenKind::LParen => self.parse_list(),
            TokenKind::RParen => {
                Err(self.tokenizer.unexpected_token(token.value, token.line, token.column))
            }
            TokenKind::Skip => unreachable!(),
        }
    }

    fn parse_list(&mut self) -> Result<ParsedExpr, RuntimeError> {
        // past the opening paren
        self.consume()?;
        let mut elements = Vec::new();
        loop {
            match self.lookahead {
                Some(token) if token.kind == TokenKind::RParen => {
                    self.consume()?;
                    return Ok(ParsedExpr::List(elements));
                }
                Some(_) => elements.push(self.parse_expression()?),
                None => {
                    return Err(RuntimeError::syntax_error("Unexpected end of input.".to_string()))
                }
            }
        }
    }

    fn consume(&mut self) -> Result<(), RuntimeError> {
        self.lookahead = self.tokenizer.next_token()?;
        Ok(())
    }
}
