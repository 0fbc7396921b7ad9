use std::fmt;

use crate::error::ParseError;

/// Represents the smallest meaningful units (atoms) of the command language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords (case-sensitive) ---
    Create,
    Key,
    Fields,
    Insert,
    Into,
    Select,
    From,
    Where,
    Delete,
    And,
    Or,
    SaveAs,
    ReadFrom,

    // --- Data Types ---
    Int,
    Float,
    /// The `STRING` column type.
    Text,
    Bool,

    // --- Identifiers & Literals ---
    /// A name representing a table or a column (e.g., `Users`, `UserId`).
    Ident(String),
    /// A 64-bit integer literal, optionally signed (e.g., `42`, `-7`).
    Number(i64),
    /// A 64-bit floating-point literal (e.g., `3.14`).
    FloatNumber(f64),
    /// A quoted string literal (e.g., `"Alice"`).
    String(String),
    /// The boolean literal `true`.
    True,
    /// The boolean literal `false`.
    False,
    /// The unquoted file name following `SAVE_AS` or `READ_FROM`.
    Path(String),

    // --- Symbols ---
    LeftParen,
    RightParen,
    Comma,
    Colon,
    /// Wildcard symbol `*`
    Star,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Lower,
    LowerEqual,

    // --- Special ---
    /// Represents the End Of File/Input.
    Eof,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::FloatNumber(_) | Self::String(_) | Self::True | Self::False
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Create => "CREATE",
            Self::Key => "KEY",
            Self::Fields => "FIELDS",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Delete => "DELETE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::SaveAs => "SAVE_AS",
            Self::ReadFrom => "READ_FROM",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Text => "STRING",
            Self::Bool => "BOOL",
            Self::Ident(name) => return write!(f, "identifier {name}"),
            Self::Number(n) => return write!(f, "{n}"),
            Self::FloatNumber(n) => return write!(f, "{n:?}"),
            Self::String(s) => return write!(f, "{s:?}"),
            Self::True => "true",
            Self::False => "false",
            Self::Path(p) => return write!(f, "path {p}"),
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Star => "'*'",
            Self::Equal => "'='",
            Self::NotEqual => "'!='",
            Self::Greater => "'>'",
            Self::GreaterEqual => "'>='",
            Self::Lower => "'<'",
            Self::LowerEqual => "'<='",
            Self::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A [Token] together with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// A lexical scanner (lexer) that converts a raw command line into a sequence of [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens, always
    /// terminated by [Token::Eof].
    ///
    /// # Errors
    /// Returns a [ParseError] if an invalid character is encountered or if a
    /// literal (like a string) is malformed.
    ///
    /// # Example
    /// ```
    /// # use minidb::tokenizer::{Tokenizer, Token};
    /// let mut t = Tokenizer::new("SELECT *");
    /// let tokens = t.tokenize().unwrap();
    /// assert_eq!(tokens[0].token, Token::Select);
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let position = self.position;
            let token = self.next_token()?;
            let expects_path = matches!(token, Token::SaveAs | Token::ReadFrom);
            tokens.push(Spanned { token, position });

            // File names are free-form, so they bypass the normal token rules.
            if expects_path {
                self.skip_whitespace();
                if let Some(path) = self.read_path()? {
                    tokens.push(path);
                }
            }
        }

        tokens.push(Spanned {
            token: Token::Eof,
            position: self.input.len(),
        });
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> Result<Token, ParseError> {
        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ':' => {
                self.advance();
                Ok(Token::Colon)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '=' | '!' | '<' | '>' => self.read_operator(),
            '"' | '\'' => self.read_string(),
            '-' | '+' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            _ => Err(ParseError::UnexpectedChar {
                found: ch,
                position: self.position,
            }),
        }
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Returns the character after the current one, if any.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads a sequence of alphanumeric characters and determines if it's
    /// a reserved keyword or a user-defined identifier.
    ///
    /// Keywords are matched case-sensitively: `select` is an identifier.
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }

        match ident.as_str() {
            "CREATE" => Token::Create,
            "KEY" => Token::Key,
            "FIELDS" => Token::Fields,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "DELETE" => Token::Delete,
            "AND" => Token::And,
            "OR" => Token::Or,
            "SAVE_AS" => Token::SaveAs,
            "READ_FROM" => Token::ReadFrom,
            "INT" => Token::Int,
            "FLOAT" => Token::Float,
            "STRING" => Token::Text,
            "BOOL" => Token::Bool,
            "true" => Token::True,
            "false" => Token::False,
            _ => Token::Ident(ident),
        }
    }

    /// Reads a numeric literal with an optional leading sign. If a dot `.` is
    /// encountered, it returns a [Token::FloatNumber], otherwise a
    /// [Token::Number]. A float needs digits on both sides of the dot.
    fn read_number(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        let mut number = String::new();
        let mut has_dot = false;

        if matches!(self.current_char(), '-' | '+') {
            number.push(self.current_char());
            self.advance();
        }

        while !self.is_at_end()
            && (self.current_char().is_ascii_digit() || (self.current_char() == '.' && !has_dot))
        {
            if self.current_char() == '.' {
                has_dot = true;
            }
            number.push(self.current_char());
            self.advance();
        }

        let invalid = |literal: String| ParseError::InvalidNumber {
            literal,
            position: start,
        };

        if !self.is_at_end() && self.current_char() == '.' {
            // multiple dots are not allowed for a float
            number.push('.');
            return Err(invalid(number));
        }

        if has_dot {
            if number.ends_with('.') {
                return Err(invalid(number));
            }
            // an overflowing literal parses as infinity, which has no literal form
            return match number.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Token::FloatNumber(n)),
                _ => Err(invalid(number)),
            };
        }

        number
            .parse::<i64>()
            .map(Token::Number)
            .map_err(|_| invalid(number.clone()))
    }

    /// Reads a string literal enclosed in double or single quotes. A backslash
    /// escapes the next character.
    fn read_string(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        let quote = self.current_char();
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != quote {
            if self.current_char() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
            }
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(ParseError::UnterminatedString { position: start });
        }

        // Skip the closing quote
        self.advance();

        Ok(Token::String(string))
    }

    /// Reads a run of comparison characters and maps it to an operator.
    fn read_operator(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        let mut op = String::new();

        while !self.is_at_end() && matches!(self.current_char(), '=' | '!' | '<' | '>') {
            op.push(self.current_char());
            self.advance();
        }

        match op.as_str() {
            "=" => Ok(Token::Equal),
            "!=" => Ok(Token::NotEqual),
            ">" => Ok(Token::Greater),
            ">=" => Ok(Token::GreaterEqual),
            "<" => Ok(Token::Lower),
            "<=" => Ok(Token::LowerEqual),
            _ => Err(ParseError::UnknownOperator {
                op,
                position: start,
            }),
        }
    }

    /// Reads a file name: either a quoted string or everything up to the next
    /// whitespace. Returns `None` at the end of input.
    fn read_path(&mut self) -> Result<Option<Spanned>, ParseError> {
        if self.is_at_end() {
            return Ok(None);
        }

        let position = self.position;
        if matches!(self.current_char(), '"' | '\'') {
            let token = self.read_string()?;
            return Ok(Some(Spanned { token, position }));
        }

        let mut path = String::new();
        while !self.is_at_end() && !self.current_char().is_whitespace() {
            path.push(self.current_char());
            self.advance();
        }

        Ok(Some(Spanned {
            token: Token::Path(path),
            position,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Tokenizer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_tokenize_create() {
        assert_eq!(
            tokens("CREATE Users KEY UserId FIELDS Name:STRING, Age: INT"),
            vec![
                Token::Create,
                Token::Ident("Users".into()),
                Token::Key,
                Token::Ident("UserId".into()),
                Token::Fields,
                Token::Ident("Name".into()),
                Token::Colon,
                Token::Text,
                Token::Comma,
                Token::Ident("Age".into()),
                Token::Colon,
                Token::Int,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            tokens("select True"),
            vec![
                Token::Ident("select".into()),
                Token::Ident("True".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_signed_numbers() {
        assert_eq!(
            tokens("42, -7, +3, 1.5, -0.25"),
            vec![
                Token::Number(42),
                Token::Comma,
                Token::Number(-7),
                Token::Comma,
                Token::Number(3),
                Token::Comma,
                Token::FloatNumber(1.5),
                Token::Comma,
                Token::FloatNumber(-0.25),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_float_needs_digits_after_dot() {
        let result = Tokenizer::new("Score=3.").tokenize();
        assert_eq!(
            result,
            Err(ParseError::InvalidNumber {
                literal: "3.".into(),
                position: 6
            })
        );
    }

    #[test]
    fn test_multiple_dots_rejected() {
        assert!(matches!(
            Tokenizer::new("1.2.3").tokenize(),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_integer_overflow_rejected() {
        assert!(matches!(
            Tokenizer::new("99999999999999999999").tokenize(),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_float_overflow_rejected() {
        let literal = format!("1{}.0", "0".repeat(400));
        assert_eq!(
            Tokenizer::new(&format!("f={literal}")).tokenize(),
            Err(ParseError::InvalidNumber {
                literal,
                position: 2
            })
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            tokens("a=b a!=b a>b a>=b a<b a<=b"),
            vec![
                Token::Ident("a".into()),
                Token::Equal,
                Token::Ident("b".into()),
                Token::Ident("a".into()),
                Token::NotEqual,
                Token::Ident("b".into()),
                Token::Ident("a".into()),
                Token::Greater,
                Token::Ident("b".into()),
                Token::Ident("a".into()),
                Token::GreaterEqual,
                Token::Ident("b".into()),
                Token::Ident("a".into()),
                Token::Lower,
                Token::Ident("b".into()),
                Token::Ident("a".into()),
                Token::LowerEqual,
                Token::Ident("b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            Tokenizer::new("Age <> 3").tokenize(),
            Err(ParseError::UnknownOperator {
                op: "<>".into(),
                position: 4
            })
        );
        assert!(matches!(
            Tokenizer::new("Age == 3").tokenize(),
            Err(ParseError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_tokenize_strings_with_escapes() {
        assert_eq!(
            tokens(r#""Alice", 'Bob Dylan', "a \"quoted\" word""#),
            vec![
                Token::String("Alice".into()),
                Token::Comma,
                Token::String("Bob Dylan".into()),
                Token::Comma,
                Token::String("a \"quoted\" word".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            Tokenizer::new("Name=\"hello").tokenize(),
            Err(ParseError::UnterminatedString { position: 5 })
        );
    }

    #[test]
    fn test_tokenize_paths() {
        assert_eq!(
            tokens("SAVE_AS ./logs/history.txt"),
            vec![
                Token::SaveAs,
                Token::Path("./logs/history.txt".into()),
                Token::Eof
            ]
        );
        assert_eq!(
            tokens("READ_FROM \"my file.txt\""),
            vec![
                Token::ReadFrom,
                Token::String("my file.txt".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            Tokenizer::new("SELECT # FROM t").tokenize(),
            Err(ParseError::UnexpectedChar {
                found: '#',
                position: 7
            })
        );
    }

    #[test]
    fn test_positions_are_recorded() {
        let spanned = Tokenizer::new("SELECT  Age").tokenize().unwrap();
        assert_eq!(spanned[0].position, 0);
        assert_eq!(spanned[1].position, 8);
        assert_eq!(spanned[2].position, 11);
    }
}
