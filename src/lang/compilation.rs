use crate::{
    lang::{
        source_buffer::SourceLocation,
        tokenizing::{Token, TokenKind, TokenList},
    },
    runtime::{
        data_structures::dictionary::Dictionary,
        error::{self, syntax_error},
    },
};

/// The compiled body of a script defined word.
///
/// Along with the tokens between the word's name and its `;`, the body records for every control
/// flow opener where its matching keyword is.  The evaluator jumps using these links instead of
/// searching for keywords, so nested constructs always find their own partner.
#[derive(Clone, Debug)]
pub struct WordBody {
    /// The name of the word.
    pub name: String,

    /// Where the word's name was found.
    pub location: SourceLocation,

    /// The tokens of the body, excluding the name and the `;`.
    pub tokens: TokenList,

    /// Parallel to `tokens`.  For `if` the index of its `else` if it has one, otherwise of its
    /// `then`.  For `else` the index of its `then`.  For `do` its `loop`, for `begin` its `until`.
    /// None for everything else.
    pub links: Vec<Option<usize>>,
}

impl WordBody {
    /// The index of the keyword matching the control flow keyword at the given index.
    pub fn link(&self, index: usize) -> Option<usize> {
        self.links.get(index).copied().flatten()
    }
}

/// The output of the compiler, the top level code to run and the words it defined.
#[derive(Clone, Debug, Default)]
pub struct CompiledProgram {
    /// The tokens outside of any word definition, still ending with the End token.
    pub top_level: TokenList,

    /// The words defined by the program, in definition order.
    pub words: Vec<WordBody>,
}

/// A control flow construct that has been opened but not yet closed.
enum Frame {
    If { index: usize, else_index: Option<usize> },
    Do(usize),
    Begin(usize),
}

impl Frame {
    fn index(&self) -> usize {
        match self {
            Frame::If { index, .. } => *index,
            Frame::Do(index) => *index,
            Frame::Begin(index) => *index,
        }
    }

    fn closer(&self) -> &'static str {
        match self {
            Frame::If { .. } => "then",
            Frame::Do(_) => "loop",
            Frame::Begin(_) => "until",
        }
    }
}

/// Split the token list into the top level code and the word definitions it contains.
///
/// Word names must be new, the dictionary is consulted so that built-in words can't be redefined.
/// Control flow keywords are only allowed within words and must be properly nested.
pub fn compile(tokens: TokenList, dictionary: &Dictionary) -> error::Result<CompiledProgram> {
    let mut program = CompiledProgram::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match token.kind {
            TokenKind::Colon => {
                let word = compile_word(&token, &mut tokens, dictionary, &program.words)?;
                program.words.push(word);
            }

            kind if kind.is_word_only() => {
                return syntax_error(
                    &token.location,
                    format!("Token '{}' is only allowed within words.", token),
                );
            }

            _ => program.top_level.push(token),
        }
    }

    Ok(program)
}

/// Compile a single word definition.  The colon has already been consumed.
fn compile_word(
    colon: &Token,
    tokens: &mut impl Iterator<Item = Token>,
    dictionary: &Dictionary,
    defined: &[WordBody],
) -> error::Result<WordBody> {
    let name_token = match tokens.next() {
        Some(token) if token.kind == TokenKind::Identifier => token,

        Some(token) => {
            return syntax_error(
                &token.location,
                format!("Expected identifier for the word name, found '{}'.", token),
            );
        }

        None => return syntax_error(&colon.location, "Expected identifier for the word name.".to_string()),
    };

    let name = name_token.lexeme;

    if dictionary.contains(&name) || defined.iter().any(|word| word.name == name) {
        return syntax_error(
            &name_token.location,
            format!("Word '{}' has been previously defined or is reserved.", name),
        );
    }

    let mut body = TokenList::new();
    let mut links: Vec<Option<usize>> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();

    loop {
        let token = match tokens.next() {
            Some(token) => token,
            None => return syntax_error(&colon.location, format!("Unterminated word '{}'.", name)),
        };

        let index = body.len();

        match token.kind {
            TokenKind::End => {
                return syntax_error(
                    &token.location,
                    format!("Unterminated word '{}', missing ';'.", name),
                );
            }

            TokenKind::SemiColon => {
                if let Some(frame) = frames.last() {
                    let opener = &body[frame.index()];

                    return syntax_error(
                        &opener.location,
                        format!("'{}' is missing its '{}' in word '{}'.", opener, frame.closer(), name),
                    );
                }

                break;
            }

            TokenKind::Colon => {
                return syntax_error(
                    &token.location,
                    format!("Word definitions can not be nested, found ':' in word '{}'.", name),
                );
            }

            TokenKind::If => frames.push(Frame::If { index, else_index: None }),
            TokenKind::Do => frames.push(Frame::Do(index)),
            TokenKind::Begin => frames.push(Frame::Begin(index)),

            TokenKind::Else => match frames.last_mut() {
                Some(Frame::If { else_index, .. }) if else_index.is_none() => *else_index = Some(index),
                _ => return unmatched(&token, "if"),
            },

            TokenKind::Then => match frames.pop() {
                Some(Frame::If { index: opener, else_index }) => {
                    links[opener] = Some(else_index.unwrap_or(index));

                    if let Some(else_index) = else_index {
                        links[else_index] = Some(index);
                    }
                }

                _ => return unmatched(&token, "if"),
            },

            TokenKind::Loop => match frames.pop() {
                Some(Frame::Do(opener)) => links[opener] = Some(index),
                _ => return unmatched(&token, "do"),
            },

            TokenKind::Until => match frames.pop() {
                Some(Frame::Begin(opener)) => links[opener] = Some(index),
                _ => return unmatched(&token, "begin"),
            },

            _ => {}
        }

        body.push(token);
        links.push(None);
    }

    Ok(WordBody {
        name,
        location: name_token.location,
        tokens: body,
        links,
    })
}

/// Report a control flow keyword found without its opener.
fn unmatched<T>(token: &Token, opener: &str) -> error::Result<T> {
    syntax_error(
        &token.location,
        format!("Found '{}' without a matching '{}'.", token, opener),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lang::tokenizing::tokenize_from_source, runtime::error::ErrorKind};
    use test_case::test_case;

    fn compile_source(source: &str) -> error::Result<CompiledProgram> {
        let tokens = tokenize_from_source("<test>", source)?;
        compile(tokens, &Dictionary::new())
    }

    #[test]
    fn words_are_removed_from_the_top_level() {
        let program = compile_source(": square dup * ; 4 square .").unwrap();
        let top_level: Vec<&str> = program.top_level.iter().map(|token| token.lexeme.as_str()).collect();

        assert_eq!(top_level, vec!["4", "square", ".", ""]);
        assert_eq!(program.words.len(), 1);
        assert_eq!(program.words[0].name, "square");
        assert_eq!(program.words[0].tokens.len(), 2);
    }

    #[test]
    fn word_bodies_can_be_debug_printed() {
        let program = compile_source(": square dup * ;").unwrap();
        let printed = format!("{:?}", program.words[0]);

        assert!(printed.contains("square"));
        assert!(printed.contains("<test>"));
    }

    #[test]
    fn links_point_at_matching_keywords() {
        let program = compile_source(": w if 1 else 2 then 3 0 do i loop begin 0 until ;").unwrap();
        let body = &program.words[0];

        assert_eq!(body.link(0), Some(2));
        assert_eq!(body.link(2), Some(4));
        assert_eq!(body.link(7), Some(9));
        assert_eq!(body.link(10), Some(12));
        assert_eq!(body.link(1), None);
    }

    #[test]
    fn nested_ifs_link_to_their_own_then() {
        let program = compile_source(": w if if 1 then else 2 then ;").unwrap();
        let body = &program.words[0];

        assert_eq!(body.link(0), Some(4));
        assert_eq!(body.link(1), Some(3));
        assert_eq!(body.link(4), Some(6));
    }

    #[test]
    fn builtin_names_are_reserved() {
        use crate::runtime::{
            built_ins::base_words::register_base_words,
            interpreter::{Interpreter, forth_interpreter::ForthInterpreter},
        };

        let mut interpreter = ForthInterpreter::new();
        register_base_words(&mut interpreter);

        let tokens = tokenize_from_source("<test>", ": dup 1 ;").unwrap();
        let result = compile(tokens, interpreter.dictionary());

        assert!(matches!(result, Err(error) if error.kind() == ErrorKind::Syntax));
    }

    #[test_case("then"; "then at top level")]
    #[test_case("1 if 2 then"; "if at top level")]
    #[test_case("3 0 do loop"; "do at top level")]
    #[test_case(": a 1 ; : a 2 ;"; "duplicate word")]
    #[test_case(": 5 dup ;"; "numeric word name")]
    #[test_case(": if dup ;"; "keyword word name")]
    #[test_case(":"; "missing word name")]
    #[test_case(": a dup"; "unterminated word")]
    #[test_case(": a then ;"; "then without if")]
    #[test_case(": a else then ;"; "else without if")]
    #[test_case(": a if else else then ;"; "two elses")]
    #[test_case(": a if ;"; "if without then")]
    #[test_case(": a do until ;"; "do closed by until")]
    #[test_case(": a begin loop ;"; "begin closed by loop")]
    #[test_case(": a loop ;"; "loop without do")]
    #[test_case(": a if do then loop ;"; "crossed constructs")]
    #[test_case(": a : b ; ;"; "nested definition")]
    fn syntax_errors(source: &str) {
        assert!(matches!(compile_source(source), Err(error) if error.kind() == ErrorKind::Syntax));
    }
}
