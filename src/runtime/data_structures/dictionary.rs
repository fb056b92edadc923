use crate::{
    lang::{compilation::WordBody, source_buffer::SourceLocation},
    runtime::interpreter::WordHandler,
};
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// How a word is executed.
#[derive(Clone)]
pub enum WordType {
    /// The word is a native word written in Rust.  It works on the interpreter's stack directly and
    /// has no token level control flow.
    Native(Rc<WordHandler>),

    /// The word was defined in a script with `: name ... ;`.
    Scripted(Rc<WordBody>),
}

/// The information stored in the word dictionary for each word.
#[derive(Clone)]
pub struct WordInfo {
    /// The location in the source code where the word was defined.
    pub location: SourceLocation,

    /// The name of the word.
    pub name: String,

    /// A simple description of the word.
    pub description: String,

    /// The stack signature of the word.
    pub signature: String,

    /// What to run when the word is invoked.
    pub word_type: WordType,
}

impl WordInfo {
    /// Create the entry for a word defined in a script.
    pub fn new_scripted(body: WordBody) -> WordInfo {
        WordInfo {
            location: body.location.clone(),
            name: body.name.clone(),
            description: String::new(),
            signature: String::new(),
            word_type: WordType::Scripted(Rc::new(body)),
        }
    }
}

/// The word dictionary used by the interpreter.  Built-in and script defined words share one name
/// space, and once a name is defined it can never be redefined.
pub struct Dictionary {
    words: HashMap<String, WordInfo>,
}

/// Pretty print the dictionary, sorted by name.
impl Display for Dictionary {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let max_size = self.words.keys().map(|name| name.len()).max().unwrap_or(0);
        let max_signature = self
            .words
            .values()
            .filter(|word| matches!(word.word_type, WordType::Native(_)))
            .map(|word| word.signature.len())
            .max()
            .unwrap_or(0);

        writeln!(formatter, "{} words defined.\n", self.words.len())?;

        let mut keys: Vec<&String> = self.words.keys().collect();
        keys.sort();

        for key in keys {
            let word = &self.words[key];

            match &word.word_type {
                WordType::Native(_) => writeln!(
                    formatter,
                    "{:width$}  native  {:sig_width$}  {}",
                    key,
                    word.signature,
                    word.description,
                    width = max_size,
                    sig_width = max_signature
                )?,

                WordType::Scripted(body) => writeln!(
                    formatter,
                    "{:width$}  script  {} tokens, {}",
                    key,
                    body.tokens.len(),
                    word.location,
                    width = max_size
                )?,
            }
        }

        Ok(())
    }
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Dictionary {
        Dictionary {
            words: HashMap::new(),
        }
    }

    /// Add a word to the dictionary.  If the name is already taken the dictionary is left unchanged
    /// and the existing entry is returned as the error.
    pub fn insert(&mut self, word: WordInfo) -> Result<(), &WordInfo> {
        if self.words.contains_key(&word.name) {
            return Err(&self.words[&word.name]);
        }

        let _ = self.words.insert(word.name.clone(), word);
        Ok(())
    }

    /// Is the name already in use?
    pub fn contains(&self, name: &str) -> bool {
        self.words.contains_key(name)
    }

    /// Try to get a word from the dictionary.
    pub fn try_get(&self, name: &str) -> Option<&WordInfo> {
        self.words.get(name)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{error, interpreter::Interpreter};

    fn native(name: &str) -> WordInfo {
        let handler: Rc<WordHandler> = Rc::new(|_: &mut dyn Interpreter| -> error::Result<()> { Ok(()) });

        WordInfo {
            location: SourceLocation::new(),
            name: name.to_string(),
            description: format!("Does {}.", name),
            signature: " -- ".to_string(),
            word_type: WordType::Native(handler),
        }
    }

    #[test]
    fn words_are_write_once() {
        let mut dictionary = Dictionary::new();

        assert!(dictionary.insert(native("dup")).is_ok());
        assert!(dictionary.insert(native("dup")).is_err());
        assert_eq!(dictionary.len(), 1);
        assert!(dictionary.contains("dup"));
        assert!(dictionary.try_get("drop").is_none());
    }

    #[test]
    fn listing_shows_native_descriptions() {
        let mut dictionary = Dictionary::new();

        assert!(dictionary.insert(native("dup")).is_ok());
        assert!(dictionary.insert(native("drop")).is_ok());

        let listing = dictionary.to_string();

        assert!(listing.starts_with("2 words defined."));
        assert!(listing.contains("Does dup."));
        assert!(listing.contains("Does drop."));
        assert!(listing.find("drop").unwrap() < listing.find("dup ").unwrap());
    }
}
