
use std::{ io::{ self,
                 Write },
           rc::Rc };
use crate::{ location_here,
             lang::{ compilation::{ compile,
                                    CompiledProgram,
                                    WordBody },
                     source_buffer::SourceLocation,
                     tokenizing::{ tokenize_from_file,
                                   tokenize_from_source,
                                   Token,
                                   TokenKind } },
             runtime::{ data_structures::{ contextual_data::ContextualData,
                                           dictionary::{ Dictionary,
                                                         WordInfo,
                                                         WordType },
                                           value::{ Composite,
                                                    Value },
                                           value_stack::ValueStack,
                                           variables::{ Binding,
                                                        BindingKind,
                                                        VariableHandle,
                                                        Variables } },
                        error::{ self,
                                 script_error,
                                 script_error_str,
                                 syntax_error },
                        interpreter::{ CallItem,
                                       CallStack,
                                       CodeManagement,
                                       Interpreter,
                                       InterpreterStack,
                                       VariableManagement,
                                       WordHandler,
                                       WordManagement } } };



/// How deeply word invocations may nest before the script is stopped.
pub const MAX_CALL_DEPTH: usize = 512;

/// How deeply word bodies and the bodies of `if`, `begin`, and `do` may nest, counted together.
/// Each level costs native stack, so recursion through control flow is stopped here before the
/// word call limit is reached.
pub const MAX_NESTING_DEPTH: usize = 1024;



/// The core interpreter implementation for the language.
pub struct ForthInterpreter
{
    /// The data stack used by the interpreter.
    stack: ValueStack,


    /// The last known location execution has reached in the original source code.
    current_location: Option<SourceLocation>,

    /// The call stack used to keep track of the current execution context.
    call_stack: CallStack,

    /// How many token ranges are currently being executed.
    nesting_depth: usize,


    /// The dictionary of words known by the interpreter.
    dictionary: Dictionary,

    /// The global and local variable scopes.
    variables: Variables,


    /// Where `.`, `?`, `nl`, and `emit` write to.
    output: Box<dyn Write>
}


impl Interpreter for ForthInterpreter
{
    fn dictionary(&self) -> &Dictionary
    {
        &self.dictionary
    }

    fn output(&mut self) -> &mut dyn Write
    {
        self.output.as_mut()
    }
}


impl ContextualData for ForthInterpreter
{
    fn mark_context(&mut self)
    {
        self.variables.mark_context();
    }

    fn release_context(&mut self)
    {
        self.variables.release_context();
    }
}


impl InterpreterStack for ForthInterpreter
{
    fn stack(&self) -> &ValueStack
    {
        &self.stack
    }

    fn push(&mut self, value: Value)
    {
        self.stack.push(value);
    }

    fn pop(&mut self) -> error::Result<Value>
    {
        match self.stack.pop()
        {
            Some(value) => Ok(value),
            None => script_error_str(self, "Stack underflow.")
        }
    }

    fn pop_n(&mut self, count: usize) -> error::Result<Vec<Value>>
    {
        match self.stack.pop_n(count)
        {
            Some(values) => Ok(values),
            None => script_error(self, format!("Stack underflow, expected {} values but found {}.",
                                               count,
                                               self.stack.len()))
        }
    }

    fn pop_as_number(&mut self) -> error::Result<f64>
    {
        let value = self.pop()?;

        Ok(*value.as_number(self)?)
    }

    fn pop_as_usize(&mut self) -> error::Result<usize>
    {
        let value = self.pop_as_number()?;

        if value < 0.0
        {
            return script_error(self, format!("Expected a count, found {}.", value));
        }

        Ok(value as usize)
    }

    fn pop_as_composite(&mut self) -> error::Result<Composite>
    {
        match self.pop()?
        {
            Value::Composite(composite) => Ok(composite),
            other => script_error(self, format!("Expected a composite, found {}.", other.type_name()))
        }
    }

    fn is_truthy(&self) -> bool
    {
        self.stack.peek().is_some_and(Value::is_truthy)
    }
}


impl VariableManagement for ForthInterpreter
{
    fn variables(&self) -> &Variables
    {
        &self.variables
    }

    fn binding(&self, handle: VariableHandle) -> error::Result<&Binding>
    {
        match self.variables.get(handle)
        {
            Some(binding) => Ok(binding),
            None => script_error_str(self, "Variable reference used after its scope ended.")
        }
    }

    fn set_binding_value(&mut self, handle: VariableHandle, value: Value) -> error::Result<()>
    {
        match self.variables.get_mut(handle)
        {
            Some(binding) =>
                {
                    binding.value = value;
                    Ok(())
                },

            None => script_error_str(self, "Variable reference used after its scope ended.")
        }
    }

    fn set_arguments(&mut self, arguments: &[String])
    {
        let location = location_here!();

        let _ = self.variables.declare_global(Binding::new("argc",
                                                           BindingKind::Variable,
                                                           arguments.len().into(),
                                                           location.clone()));

        let _ = self.variables.declare_global(Binding::new("argv",
                                                           BindingKind::Variable,
                                                           arguments.into(),
                                                           location));
    }
}


impl ForthInterpreter
{
    /// Evaluate a single token that isn't handled by a word body's control flow.
    fn eval_token(&mut self, token: &Token) -> error::Result<()>
    {
        self.current_location = Some(token.location.clone());

        if let Some(value) = &token.value
        {
            self.push(value.clone());
            return Ok(());
        }

        match token.kind
        {
            TokenKind::Identifier => self.eval_identifier(token),

            TokenKind::And | TokenKind::Or | TokenKind::Invert => self.bitwise_operator(token),
            kind if kind.is_binary_operator() => self.binary_operator(token),
            kind if kind.is_mutation_operator() => self.write_variable(token),

            TokenKind::At => self.read_variable(),
            TokenKind::Dot => self.print_top(),
            TokenKind::Question => self.print_variable(),

            TokenKind::Variable => self.declare(token, BindingKind::Variable),
            TokenKind::Constant => self.declare(token, BindingKind::Constant),

            TokenKind::End => Ok(()),

            _ => script_error(self, format!("Token '{}' can not be executed here.", token))
        }
    }

    /// Words take priority over variables of the same name.
    fn eval_identifier(&mut self, token: &Token) -> error::Result<()>
    {
        if let Some(word) = self.dictionary.try_get(&token.lexeme).cloned()
        {
            return self.execute_word(&token.location, &word);
        }

        if let Some(handle) = self.variables.find(&token.lexeme)
        {
            self.push(Value::Reference(handle));
            return Ok(());
        }

        script_error(self, format!("Unknown word or variable '{}'.", token.lexeme))
    }

    /// Get the two numbers on top of the stack, the deeper one first, without popping them.
    fn top_two_numbers(&self, token: &Token) -> error::Result<( f64, f64 )>
    {
        match self.stack.top_two()
        {
            Some(( Value::Number(left), Value::Number(right) )) => Ok(( *left, *right )),

            Some(( left, right )) =>
                script_error(self, format!("Operator '{}' expects two numbers, found {} and {}.",
                                           token,
                                           left.type_name(),
                                           right.type_name())),

            None => script_error(self, format!("Stack is empty or invalid for operator '{}'.",
                                               token))
        }
    }

    fn binary_operator(&mut self, token: &Token) -> error::Result<()>
    {
        let ( left, right ) = self.top_two_numbers(token)?;

        let result = match token.kind
            {
                TokenKind::Plus         => left + right,
                TokenKind::Minus        => left - right,
                TokenKind::Star         => left * right,
                TokenKind::Slash        => left / right,

                TokenKind::Equal        => truth(left == right),
                TokenKind::BangEqual    => truth(left != right),
                TokenKind::Less         => truth(left < right),
                TokenKind::Greater      => truth(left > right),
                TokenKind::LessEqual    => truth(left <= right),
                TokenKind::GreaterEqual => truth(left >= right),

                _ => return script_error(self, format!("Token '{}' is not a binary operator.",
                                                       token))
            };

        self.pop_n(2)?;
        self.push(Value::Number(result));

        Ok(())
    }

    /// Bitwise operators work on the integer part of their operands, which keeps -1 and 0 closed
    /// under them.
    fn bitwise_operator(&mut self, token: &Token) -> error::Result<()>
    {
        let result = match token.kind
            {
                TokenKind::Invert =>
                    {
                        let value = match self.stack.peek()
                            {
                                Some(Value::Number(value)) => *value,
                                Some(other) =>
                                    return script_error(self,
                                                        format!("Operator '{}' expects a number, \
                                                                 found {}.",
                                                                token,
                                                                other.type_name())),
                                None => return script_error(self,
                                                            format!("Stack is empty for operator \
                                                                     '{}'.",
                                                                    token))
                            };

                        self.pop()?;
                        !(value as i64)
                    },

                _ =>
                    {
                        let ( left, right ) = self.top_two_numbers(token)?;

                        self.pop_n(2)?;

                        if token.kind == TokenKind::And
                        {
                            (left as i64) & (right as i64)
                        }
                        else
                        {
                            (left as i64) | (right as i64)
                        }
                    }
            };

        self.push(Value::Number(result as f64));
        Ok(())
    }

    /// Handle `!` and the arithmetic assignments.  The reference sits one below the top with the
    /// new value or operand on top.
    fn write_variable(&mut self, token: &Token) -> error::Result<()>
    {
        let ( handle, operand ) = match self.stack.top_two()
            {
                Some(( Value::Reference(handle), operand )) => ( *handle, operand.clone() ),

                Some(( other, _ )) =>
                    return script_error(self, format!("Operator '{}' expects a variable reference \
                                                       below the value, found {}.",
                                                      token,
                                                      other.type_name())),

                None => return script_error(self, format!("Stack is empty or invalid for \
                                                           operator '{}'.",
                                                          token))
            };

        let binding = self.binding(handle)?;

        if binding.kind == BindingKind::Constant
        {
            return script_error(self, format!("Can not modify constant '{}'.", binding.name));
        }

        let new_value = if token.kind == TokenKind::Bang
            {
                operand
            }
            else
            {
                let current = match binding.value.number()
                    {
                        Some(current) => current,
                        None => return script_error(self,
                                                    format!("Variable '{}' holds {}, not a number.",
                                                            binding.name,
                                                            binding.value.type_name()))
                    };

                let operand = *operand.as_number(self)?;

                Value::Number(match token.kind
                    {
                        TokenKind::PlusBang  => current + operand,
                        TokenKind::MinusBang => current - operand,
                        TokenKind::StarBang  => current * operand,
                        _                    => current / operand
                    })
            };

        self.set_binding_value(handle, new_value)?;
        self.pop_n(2)?;

        Ok(())
    }

    /// Replace the reference on top of the stack with the value it refers to.
    fn read_variable(&mut self) -> error::Result<()>
    {
        let handle = match self.stack.peek()
            {
                Some(value) => *value.as_reference(self)?,
                None => return script_error_str(self, "Stack is empty, expected a variable \
                                                       reference for '@'.")
            };

        let value = self.binding(handle)?.value.clone();

        if let Some(top) = self.stack.peek_mut()
        {
            *top = value;
        }

        Ok(())
    }

    fn print_top(&mut self) -> error::Result<()>
    {
        let value = self.pop()?;

        write!(self.output, "{}", value)?;
        Ok(())
    }

    /// Print the value a reference refers to, then drop the reference.
    fn print_variable(&mut self) -> error::Result<()>
    {
        let handle = match self.stack.peek()
            {
                Some(value) => *value.as_reference(self)?,
                None => return script_error_str(self, "Stack is empty, expected a variable \
                                                       reference for '?'.")
            };

        let value = self.binding(handle)?.value.clone();

        write!(self.output, "{}", value)?;
        self.pop()?;

        Ok(())
    }

    /// Bind the declared name in the current scope, using the top of the stack as its value.
    fn declare(&mut self, token: &Token, kind: BindingKind) -> error::Result<()>
    {
        if self.stack.is_empty()
        {
            return script_error(self, format!("Declaring '{}' requires an initial value on the \
                                               stack.",
                                              token.lexeme));
        }

        let value = self.pop()?;
        let binding = Binding::new(&token.lexeme, kind, value, token.location.clone());

        let _ = self.variables.declare(binding);
        Ok(())
    }

    /// Get the index of the keyword matching the control flow keyword at the given index.
    fn link(&self, body: &WordBody, index: usize) -> error::Result<usize>
    {
        match body.link(index)
        {
            Some(link) => Ok(link),
            None => script_error(self, format!("Word '{}' has an unlinked '{}'.",
                                               body.name,
                                               body.tokens[index]))
        }
    }

    /// Run the tokens of a word body from start up to, but not including, end.  The loop counter is
    /// the value of the innermost enclosing `do` loop, if any.
    fn execute_range(&mut self,
                     body: &WordBody,
                     start: usize,
                     end: usize,
                     loop_counter: Option<f64>) -> error::Result<()>
    {
        if self.nesting_depth >= MAX_NESTING_DEPTH
        {
            return script_error(self, format!("Nesting overflow in '{}', words and control \
                                               structures nested more than {} deep.",
                                              body.name,
                                              MAX_NESTING_DEPTH));
        }

        self.nesting_depth += 1;

        let result = self.run_range(body, start, end, loop_counter);

        self.nesting_depth -= 1;
        result
    }

    fn run_range(&mut self,
                 body: &WordBody,
                 start: usize,
                 end: usize,
                 loop_counter: Option<f64>) -> error::Result<()>
    {
        let mut index = start;

        while index < end
        {
            let token = &body.tokens[index];

            if let Some(counter) = loop_counter
                && token.kind == TokenKind::Identifier
                && token.lexeme == "i"
            {
                self.push(Value::Number(counter));
                index += 1;
                continue;
            }

            match token.kind
            {
                TokenKind::If =>
                    {
                        self.current_location = Some(token.location.clone());

                        let link = self.link(body, index)?;
                        let ( else_index, then_index ) = if body.tokens[link].kind == TokenKind::Else
                            {
                                ( Some(link), self.link(body, link)? )
                            }
                            else
                            {
                                ( None, link )
                            };

                        if self.is_truthy()
                        {
                            self.execute_range(body,
                                               index + 1,
                                               else_index.unwrap_or(then_index),
                                               loop_counter)?;
                        }
                        else if let Some(else_index) = else_index
                        {
                            self.execute_range(body, else_index + 1, then_index, loop_counter)?;
                        }

                        index = then_index + 1;
                    },

                TokenKind::Begin =>
                    {
                        let until_index = self.link(body, index)?;

                        loop
                        {
                            self.execute_range(body, index + 1, until_index, loop_counter)?;

                            if !self.is_truthy()
                            {
                                break;
                            }
                        }

                        index = until_index + 1;
                    },

                TokenKind::Do =>
                    {
                        self.current_location = Some(token.location.clone());

                        let loop_index = self.link(body, index)?;
                        let ( limit, start ) = self.top_two_numbers(token)?;

                        self.pop_n(2)?;

                        let mut counter = start;

                        while counter < limit
                        {
                            self.execute_range(body, index + 1, loop_index, Some(counter))?;
                            counter += 1.0;
                        }

                        index = loop_index + 1;
                    },

                _ =>
                    {
                        self.eval_token(token)?;
                        index += 1;
                    }
            }
        }

        Ok(())
    }

    /// Run a script defined word in a fresh local scope.  The scope and call stack are unwound even
    /// if the word fails.
    fn execute_scripted(&mut self, location: &SourceLocation, body: &WordBody) -> error::Result<()>
    {
        self.call_stack_push(body.name.clone(), location.clone())?;
        self.mark_context();

        let result = self.execute_range(body, 0, body.tokens.len(), None);

        self.release_context();
        self.call_stack_pop()?;

        result
    }
}


impl CodeManagement for ForthInterpreter
{
    fn process_source_file(&mut self, path: &str) -> error::Result<()>
    {
        let tokens = tokenize_from_file(path)?;
        let program = compile(tokens, &self.dictionary)?;

        self.evaluate(program)
    }

    fn process_source(&mut self, path: &str, source: &str) -> error::Result<()>
    {
        let tokens = tokenize_from_source(path, source)?;
        let program = compile(tokens, &self.dictionary)?;

        self.evaluate(program)
    }

    fn evaluate(&mut self, program: CompiledProgram) -> error::Result<()>
    {
        self.add_script_words(program.words)?;

        let result = program.top_level
                            .iter()
                            .try_for_each(|token| self.eval_token(token));

        self.output.flush()?;
        result
    }
}


impl WordManagement for ForthInterpreter
{
    fn current_location(&self) -> &Option<SourceLocation>
    {
        &self.current_location
    }

    fn add_word(&mut self,
                file: String,
                line: usize,
                column: usize,
                name: String,
                handler: Rc<WordHandler>,
                description: String,
                signature: String)
    {
        let word_info = WordInfo
            {
                location: SourceLocation::new_from_info(&file, line, column),
                name: name.clone(),
                description,
                signature,
                word_type: WordType::Native(handler)
            };

        if self.dictionary.insert(word_info).is_err()
        {
            panic!("Native word '{}' registered twice.", name);
        }
    }

    fn add_script_words(&mut self, words: Vec<WordBody>) -> error::Result<()>
    {
        for body in words
        {
            let location = body.location.clone();
            let name = body.name.clone();

            if self.dictionary.insert(WordInfo::new_scripted(body)).is_err()
            {
                return syntax_error(&location, format!("Word '{}' has already been defined.",
                                                       name));
            }
        }

        Ok(())
    }

    fn execute_word(&mut self, location: &SourceLocation, word: &WordInfo) -> error::Result<()>
    {
        self.current_location = Some(location.clone());

        match &word.word_type
        {
            WordType::Native(handler) =>
                {
                    self.call_stack_push(word.name.clone(), location.clone())?;

                    let result = (**handler)(self);

                    self.call_stack_pop()?;
                    result
                },

            WordType::Scripted(body) => self.execute_scripted(location, body)
        }
    }

    fn execute_word_named(&mut self, location: &SourceLocation, word: &str) -> error::Result<()>
    {
        match self.dictionary.try_get(word).cloned()
        {
            Some(word_info) => self.execute_word(location, &word_info),
            None => script_error(self, format!("Word {} not found.", word))
        }
    }

    fn call_stack(&self) -> &CallStack
    {
        &self.call_stack
    }

    fn call_stack_push(&mut self, name: String, location: SourceLocation) -> error::Result<()>
    {
        if self.call_stack.len() >= MAX_CALL_DEPTH
        {
            return script_error(self, format!("Call stack overflow calling '{}', words nested \
                                               more than {} deep.",
                                              name,
                                              MAX_CALL_DEPTH));
        }

        self.call_stack.push(CallItem::new(name, location));
        Ok(())
    }

    fn call_stack_pop(&mut self) -> error::Result<()>
    {
        match self.call_stack.pop()
        {
            Some(_) => Ok(()),
            None => script_error_str(self, "Call stack underflow.")
        }
    }
}


impl ForthInterpreter
{
    /// Create an interpreter that prints to standard output.
    pub fn new() -> ForthInterpreter
    {
        ForthInterpreter::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter that prints to the given writer.  The `argc` and `argv` globals start
    /// out describing an empty argument list.
    pub fn with_output(output: Box<dyn Write>) -> ForthInterpreter
    {
        let mut interpreter = ForthInterpreter
            {
                stack: ValueStack::new(),

                current_location: None,
                call_stack: CallStack::with_capacity(40),
                nesting_depth: 0,

                dictionary: Dictionary::new(),
                variables: Variables::new(),

                output
            };

        interpreter.set_arguments(&[]);
        interpreter
    }
}


impl Default for ForthInterpreter {
    fn default() -> Self {
        Self::new()
    }
}


/// The language's booleans, -1 for true and 0 for false.
fn truth(value: bool) -> f64
{
    if value { -1.0 } else { 0.0 }
}



#[cfg(test)]
mod tests
{
    use super::*;
    use crate::runtime::{ built_ins::register_builtin_words,
                          error::ErrorKind };
    use std::thread;
    use test_case::test_case;

    /// Enough native stack for the deepest nesting the interpreter allows.
    const DEEP_STACK_SIZE: usize = 64 * 1024 * 1024;

    fn interpreter() -> ForthInterpreter
    {
        let mut interpreter = ForthInterpreter::with_output(Box::new(io::sink()));

        register_builtin_words(&mut interpreter);
        interpreter
    }

    #[test]
    fn loop_counter_is_only_visible_inside_do()
    {
        let mut interpreter = interpreter();
        let error = interpreter.process_source("<test>", ": w i ; w").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Runtime);
    }

    #[test]
    fn words_run_by_name()
    {
        let mut interpreter = interpreter();
        let location = SourceLocation::new();

        interpreter.process_source("<test>", ": seven 7 ;").unwrap();
        interpreter.execute_word_named(&location, "seven").unwrap();

        assert_eq!(interpreter.pop_as_number().unwrap(), 7.0);
        assert!(interpreter.execute_word_named(&location, "eight").is_err());
    }

    #[test]
    fn stray_colon_is_a_runtime_error()
    {
        let mut interpreter = interpreter();
        let token = Token::new(TokenKind::Colon, SourceLocation::new(), ":".to_string(), None);

        let error = interpreter.eval_token(&token).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Runtime);
    }

    #[test]
    fn do_requires_two_numbers()
    {
        let mut interpreter = interpreter();
        let error = interpreter.process_source("<test>", ": w 3 do loop ; w").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Runtime);
        assert!(interpreter.call_stack().is_empty());
    }

    #[test]
    fn call_stack_limit_is_enforced()
    {
        let mut interpreter = interpreter();

        for _ in 0..MAX_CALL_DEPTH
        {
            interpreter.call_stack_push("w".to_string(), SourceLocation::new()).unwrap();
        }

        let error = interpreter.call_stack_push("w".to_string(), SourceLocation::new()).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Runtime);
        assert_eq!(interpreter.call_stack().len(), MAX_CALL_DEPTH);
    }

    #[test_case(": r r ; r", "Call stack overflow"; "plain recursion")]
    #[test_case(": r -1 if 1 0 do begin r 0 until loop then ; r", "Nesting overflow"; "recursion through control flow")]
    #[test_case(": r -1 if -1 if -1 if -1 if r then then then then ; r", "Nesting overflow"; "recursion through nested ifs")]
    fn runaway_recursion_is_a_runtime_error(source: &'static str, message: &'static str)
    {
        let outcome = thread::Builder::new()
            .stack_size(DEEP_STACK_SIZE)
            .spawn(move ||
                {
                    let mut interpreter = interpreter();
                    let error = interpreter.process_source("<test>", source).unwrap_err();

                    assert!(interpreter.call_stack().is_empty());
                    assert_eq!(interpreter.nesting_depth, 0);

                    ( error.kind(), error.error().clone() )
                })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(outcome.0, ErrorKind::Runtime);
        assert!(outcome.1.starts_with(message), "unexpected error: {}", outcome.1);
    }
}
