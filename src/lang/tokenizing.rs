use crate::{
    lang::source_buffer::{SourceBuffer, SourceLocation},
    runtime::{
        data_structures::value::Value,
        error::{self, startup_error, syntax_error},
    },
};
use lazy_static::lazy_static;
use std::{
    collections::HashMap,
    fmt::{self, Debug, Display, Formatter},
    fs::read_to_string,
};

/// Every kind of token the language knows about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TokenKind {
    /// A numeric literal, always decoded as a floating point value.
    Number,

    /// A string literal, possibly spanning multiple lines.
    String,

    /// A name that is looked up as a word or a variable when executed.
    Identifier,

    Colon,
    SemiColon,
    Dot,

    Minus,
    Plus,
    Star,
    Slash,

    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    Equal,
    BangEqual,
    Question,
    At,
    Bang,

    PlusBang,
    MinusBang,
    StarBang,
    SlashBang,

    And,
    Or,
    Invert,
    If,
    Then,
    Else,

    Do,
    Loop,
    Begin,
    Until,

    /// Declares a variable, the token's lexeme is the declared name.
    Variable,

    /// Declares a constant, the token's lexeme is the declared name.
    Constant,

    /// Always the last token of a list.
    End,
}

lazy_static! {
    /// Identifiers with these names become keyword tokens.
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("and", TokenKind::And),
        ("or", TokenKind::Or),
        ("invert", TokenKind::Invert),
        ("if", TokenKind::If),
        ("then", TokenKind::Then),
        ("else", TokenKind::Else),
        ("do", TokenKind::Do),
        ("loop", TokenKind::Loop),
        ("begin", TokenKind::Begin),
        ("until", TokenKind::Until),
        ("variable", TokenKind::Variable),
        ("constant", TokenKind::Constant),
    ]);
}

impl TokenKind {
    /// Look up a keyword by its text.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS.get(text).copied()
    }

    /// Operators that pop two numbers and push one.
    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Equal
                | TokenKind::BangEqual
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
        )
    }

    /// Operators that write to the variable referenced one below the top of the stack.
    pub fn is_mutation_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Bang
                | TokenKind::PlusBang
                | TokenKind::MinusBang
                | TokenKind::StarBang
                | TokenKind::SlashBang
        )
    }

    /// The control flow keywords, these may only appear inside of a word definition.
    pub fn is_word_only(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::Do
                | TokenKind::Loop
                | TokenKind::Begin
                | TokenKind::Until
        )
    }

    /// The `variable` and `constant` declarations.
    pub fn is_declaration(&self) -> bool {
        matches!(self, TokenKind::Variable | TokenKind::Constant)
    }
}

/// A token is a simple unit of the language.  It records its kind, where it was found in the
/// source, the original text, and for literals the decoded value.
#[derive(Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,

    /// Where the first character of the token was found.
    pub location: SourceLocation,

    /// The original text of the token.  For declarations this is the declared name, for strings it
    /// is the text between the quotes.
    pub lexeme: String,

    /// The decoded value of number and string literals.
    pub value: Option<Value>,
}

/// A list of tokens found in the source code.
pub type TokenList = Vec<Token>;

/// Make sure that the tokens are nicely printable for error messages.
impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.lexeme),
            TokenKind::Variable => write!(f, "variable {}", self.lexeme),
            TokenKind::Constant => write!(f, "constant {}", self.lexeme),
            TokenKind::End => write!(f, "<end of input>"),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}

/// Include the location and the kind of token when debugging.
impl Debug for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {:?}({}) = {:?}", self.location, self.kind, self.lexeme, value),
            None => write!(f, "{}: {:?}({})", self.location, self.kind, self.lexeme),
        }
    }
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, location: SourceLocation, lexeme: String, value: Option<Value>) -> Token {
        Token {
            kind,
            location,
            lexeme,
            value,
        }
    }

    /// Is this an identifier with the given text?
    pub fn is_identifier(&self, text: &str) -> bool {
        self.kind == TokenKind::Identifier && self.lexeme == text
    }
}

/// Check if the given character is considered whitespace.
fn is_whitespace(next: &char) -> bool {
    *next == ' ' || *next == '\t' || *next == '\r' || *next == '\n'
}

/// Every token has to be followed by whitespace or the end of the source.
fn is_terminator(next: Option<char>) -> bool {
    match next {
        Some(next) => is_whitespace(&next),
        None => true,
    }
}

/// Can an identifier start with this character?
fn is_identifier_start(next: char) -> bool {
    next.is_ascii_alphabetic() || next == '_' || next == '-'
}

/// Skip a `( ... )` comment, including the closing parenthesis.  A comment missing it simply runs
/// to the end of the source.
fn skip_comment(buffer: &mut SourceBuffer) {
    let _ = buffer.next_char();

    while let Some(next) = buffer.next_char() {
        if next == ')' {
            break;
        }
    }
}

/// Process a string literal, the text between the quotes is kept verbatim including any new lines.
fn process_string(buffer: &mut SourceBuffer, location: SourceLocation) -> error::Result<Token> {
    let _ = buffer.next_char();
    let mut text = String::new();

    loop {
        match buffer.next_char() {
            Some('"') => break,
            Some(next) => text.push(next),
            None => return syntax_error(&location, "String is not closed.".to_string()),
        }
    }

    let value = Value::Text(text.clone());

    Ok(Token::new(TokenKind::String, location, text, Some(value)))
}

/// Process a numeral: an optional leading minus, digits, and an optional fraction.
fn process_number(buffer: &mut SourceBuffer, location: SourceLocation) -> error::Result<Token> {
    let mut text = String::new();

    if buffer.peek_next() == Some('-') {
        text.push('-');
        let _ = buffer.next_char();
    }

    fn take_digits(buffer: &mut SourceBuffer, text: &mut String) {
        while let Some(next) = buffer.peek_next()
            && next.is_ascii_digit()
        {
            text.push(next);
            let _ = buffer.next_char();
        }
    }

    take_digits(buffer, &mut text);

    if buffer.peek_next() == Some('.') && buffer.peek_second().is_some_and(|next| next.is_ascii_digit()) {
        text.push('.');
        let _ = buffer.next_char();

        take_digits(buffer, &mut text);
    }

    match text.parse::<f64>() {
        Ok(number) => Ok(Token::new(TokenKind::Number, location, text, Some(Value::Number(number)))),
        Err(error) => syntax_error(&location, format!("Invalid numeral '{}': {}.", text, error)),
    }
}

/// Pull text out of the buffer until we hit a terminator.
fn process_until_whitespace(buffer: &mut SourceBuffer) -> String {
    let mut text = String::new();

    while !is_terminator(buffer.peek_next()) {
        if let Some(next) = buffer.next_char() {
            text.push(next);
        }
    }

    text
}

/// The name following `variable` or `constant` is part of the declaration token.  Exactly one
/// separator is allowed between the keyword and the name.
fn process_declaration_name(buffer: &mut SourceBuffer, keyword: &str) -> error::Result<String> {
    let separated = buffer.peek_next().is_some_and(|next| is_whitespace(&next));

    if separated {
        let _ = buffer.next_char();
    }

    match buffer.peek_next() {
        Some(next) if separated && is_identifier_start(next) => Ok(process_until_whitespace(buffer)),

        _ => syntax_error(
            buffer.location(),
            format!("You must provide an identifier for this {}.", keyword),
        ),
    }
}

/// Process an identifier, keyword, or declaration.
fn process_identifier(buffer: &mut SourceBuffer, location: SourceLocation) -> error::Result<Token> {
    let text = process_until_whitespace(buffer);

    match TokenKind::keyword(&text) {
        Some(kind) if kind.is_declaration() => {
            let name = process_declaration_name(buffer, &text)?;
            Ok(Token::new(kind, location, name, None))
        }

        Some(kind) => Ok(Token::new(kind, location, text, None)),

        None => Ok(Token::new(TokenKind::Identifier, location, text, None)),
    }
}

/// Process one or two character operators and punctuation, preferring the longer form.
fn process_operator(buffer: &mut SourceBuffer, location: SourceLocation) -> error::Result<Token> {
    let first = match buffer.next_char() {
        Some(first) => first,
        None => return syntax_error(&location, "Unexpected end of input.".to_string()),
    };

    let mut with_suffix = |suffix: char, long: TokenKind, short: TokenKind| {
        if buffer.match_next(suffix) {
            (long, format!("{}{}", first, suffix))
        } else {
            (short, first.to_string())
        }
    };

    let (kind, lexeme) = match first {
        '!' => with_suffix('=', TokenKind::BangEqual, TokenKind::Bang),
        '+' => with_suffix('!', TokenKind::PlusBang, TokenKind::Plus),
        '-' => with_suffix('!', TokenKind::MinusBang, TokenKind::Minus),
        '*' => with_suffix('!', TokenKind::StarBang, TokenKind::Star),
        '/' => with_suffix('!', TokenKind::SlashBang, TokenKind::Slash),
        '<' => with_suffix('=', TokenKind::LessEqual, TokenKind::Less),
        '>' => with_suffix('=', TokenKind::GreaterEqual, TokenKind::Greater),

        ':' => (TokenKind::Colon, first.to_string()),
        ';' => (TokenKind::SemiColon, first.to_string()),
        '.' => (TokenKind::Dot, first.to_string()),
        '?' => (TokenKind::Question, first.to_string()),
        '@' => (TokenKind::At, first.to_string()),
        '=' => (TokenKind::Equal, first.to_string()),

        _ => return syntax_error(&location, format!("Invalid token found '{}'.", first)),
    };

    Ok(Token::new(kind, location, lexeme, None))
}

/// Tokenize the source code from a string.  The returned list always ends with a single End token.
pub fn tokenize_from_source(path: &str, source: &str) -> error::Result<TokenList> {
    let mut buffer = SourceBuffer::new(path, source);
    let mut token_list = TokenList::new();

    // Keep going until we hit the end of the buffer or error out.
    while let Some(next) = buffer.peek_next() {
        if is_whitespace(&next) {
            let _ = buffer.next_char();
            continue;
        }

        let location = buffer.location().clone();

        match next {
            '(' => skip_comment(&mut buffer),
            '"' => token_list.push(process_string(&mut buffer, location)?),

            '-' if buffer.peek_second().is_some_and(|second| second.is_ascii_digit()) => {
                token_list.push(process_number(&mut buffer, location)?)
            }

            _ if next.is_ascii_digit() => token_list.push(process_number(&mut buffer, location)?),
            _ if next != '-' && is_identifier_start(next) => {
                token_list.push(process_identifier(&mut buffer, location)?)
            }

            _ => token_list.push(process_operator(&mut buffer, location)?),
        }

        // There is no token concatenation in the language.
        if let Some(next) = buffer.peek_next()
            && !is_whitespace(&next)
        {
            return syntax_error(
                buffer.location(),
                format!("Token must be terminated, found '{}'.", next),
            );
        }
    }

    token_list.push(Token::new(TokenKind::End, buffer.location().clone(), String::new(), None));

    Ok(token_list)
}

/// Load the code from a file and then tokenize it.  Failing to read the file is a startup error.
pub fn tokenize_from_file(path: &str) -> error::Result<TokenList> {
    match read_to_string(path) {
        Ok(source) => tokenize_from_source(path, &source),

        Err(err) => startup_error(format!("Could not read file '{}': {}", path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::ErrorKind;
    use test_case::test_case;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize_from_source("<test>", source)
            .unwrap()
            .iter()
            .map(|token| token.kind)
            .collect()
    }

    fn syntax_fails(source: &str) -> bool {
        matches!(tokenize_from_source("<test>", source), Err(error) if error.kind() == ErrorKind::Syntax)
    }

    #[test_case("", &[TokenKind::End]; "empty source")]
    #[test_case("  \t\r\n ", &[TokenKind::End]; "only whitespace")]
    #[test_case(": sq dup * ;", &[TokenKind::Colon, TokenKind::Identifier, TokenKind::Identifier,
                                  TokenKind::Star, TokenKind::SemiColon, TokenKind::End]; "word definition")]
    #[test_case("!= ! +! + -! - *! * /! / <= < >= > = @ ? .",
                &[TokenKind::BangEqual, TokenKind::Bang, TokenKind::PlusBang, TokenKind::Plus,
                  TokenKind::MinusBang, TokenKind::Minus, TokenKind::StarBang, TokenKind::Star,
                  TokenKind::SlashBang, TokenKind::Slash, TokenKind::LessEqual, TokenKind::Less,
                  TokenKind::GreaterEqual, TokenKind::Greater, TokenKind::Equal, TokenKind::At,
                  TokenKind::Question, TokenKind::Dot, TokenKind::End]; "operators")]
    #[test_case("if then else do loop begin until and or invert",
                &[TokenKind::If, TokenKind::Then, TokenKind::Else, TokenKind::Do, TokenKind::Loop,
                  TokenKind::Begin, TokenKind::Until, TokenKind::And, TokenKind::Or,
                  TokenKind::Invert, TokenKind::End]; "keywords")]
    #[test_case("1 ( a comment\n over lines ) 2", &[TokenKind::Number, TokenKind::Number, TokenKind::End]; "comments")]
    #[test_case("stack-len _x dup2", &[TokenKind::Identifier, TokenKind::Identifier,
                                      TokenKind::Identifier, TokenKind::End]; "identifiers")]
    #[test_case("dup;", &[TokenKind::Identifier, TokenKind::End]; "semicolon inside an identifier")]
    fn token_kinds(source: &str, expected: &[TokenKind]) {
        assert_eq!(kinds(source), expected);
    }

    #[test]
    fn exactly_one_end_token() {
        let tokens = tokenize_from_source("<test>", "1 2 + .").unwrap();
        let ends = tokens.iter().filter(|token| token.kind == TokenKind::End).count();

        assert_eq!(ends, 1);
        assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::End));
    }

    #[test_case("12.5", 12.5; "decimal")]
    #[test_case("-3", -3.0; "negative")]
    #[test_case("42", 42.0; "integer")]
    #[test_case("-0.25", -0.25; "negative decimal")]
    fn numerals_decode(source: &str, expected: f64) {
        let tokens = tokenize_from_source("<test>", source).unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].value, Some(Value::Number(expected)));
    }

    #[test]
    fn minus_without_digit_is_an_operator() {
        assert_eq!(kinds("5 - 3"), vec![TokenKind::Number, TokenKind::Minus, TokenKind::Number, TokenKind::End]);
    }

    #[test]
    fn strings_span_lines() {
        let tokens = tokenize_from_source("<test>", "\"hello\nworld\" 1").unwrap();

        assert_eq!(tokens[0].value, Some(Value::Text("hello\nworld".to_string())));
        assert_eq!(tokens[1].location.line(), 2);
    }

    #[test]
    fn declarations_carry_their_name() {
        let tokens = tokenize_from_source("<test>", "5 variable count 1 constant one").unwrap();

        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].lexeme, "count");
        assert_eq!(tokens[3].kind, TokenKind::Constant);
        assert_eq!(tokens[3].lexeme, "one");
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn locations_point_at_the_start_of_the_token() {
        let tokens = tokenize_from_source("<test>", "1\n  dup").unwrap();

        assert_eq!(tokens[1].location.line(), 2);
        assert_eq!(tokens[1].location.column(), 3);
    }

    #[test_case("\"unclosed"; "unterminated string")]
    #[test_case("variable"; "declaration without name")]
    #[test_case("variable  x"; "declaration with two separators")]
    #[test_case("constant 5"; "declaration with numeric name")]
    #[test_case("1+"; "unterminated number")]
    #[test_case("1.2.3"; "two decimal points")]
    #[test_case("\"a\"b"; "unterminated string token")]
    #[test_case("( note )x"; "unterminated comment token")]
    #[test_case("1 $ 2"; "invalid character")]
    #[test_case("-x"; "minus glued to identifier")]
    fn syntax_errors(source: &str) {
        assert!(syntax_fails(source));
    }
}
