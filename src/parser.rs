use std::path::PathBuf;

use crate::{
    ColumnDef, DataType, Value,
    ast::*,
    error::ParseError,
    tokenizer::{Spanned, Token, Tokenizer},
};

/// Tokenizes and parses a single command line.
///
/// # Example
/// ```
/// # use minidb::{parser, ast::Command};
/// let command = parser::parse("SELECT * FROM Users WHERE Age > 18").unwrap();
/// assert!(matches!(command, Command::Select(_)));
/// ```
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let tokens = Tokenizer::new(line).tokenize()?;
    Parser::new(tokens).parse()
}

/// Recursive-descent parser turning a token stream into one [Command].
///
/// It is purely syntactic: table and column names are not resolved here.
pub struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
}

impl Parser {
    /// `tokens` must end with [Token::Eof], as [Tokenizer::tokenize] guarantees.
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Command, ParseError> {
        let command = match self.current_token() {
            Token::Eof => return Err(ParseError::Empty),
            Token::Create => self.parse_create_table()?,
            Token::Insert => self.parse_insert()?,
            Token::Select => self.parse_select()?,
            Token::Delete => self.parse_delete()?,
            Token::SaveAs => {
                self.advance();
                Command::SaveAs(self.consume_path()?)
            }
            Token::ReadFrom => {
                self.advance();
                Command::ReadFrom(self.consume_path()?)
            }
            other => {
                return Err(ParseError::UnknownCommand {
                    found: other.to_string(),
                    position: self.current_position(),
                });
            }
        };

        // Check we are at the end of the command
        match self.current_token() {
            Token::Eof => Ok(command),
            Token::RightParen => Err(ParseError::UnbalancedParenthesis {
                position: self.current_position(),
            }),
            _ => Err(self.unexpected("end of input")),
        }
    }

    // --- Helpers ---

    fn current(&self) -> &Spanned {
        // the stream always ends with Eof and advance() never moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn current_token(&self) -> &Token {
        &self.current().token
    }

    fn current_position(&self) -> usize {
        self.current().position
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token().to_string(),
            position: self.current_position(),
        }
    }

    fn consume(&mut self, expected: Token) -> Result<(), ParseError> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn consume_ident(&mut self) -> Result<String, ParseError> {
        match self.current_token() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn consume_data_type(&mut self) -> Result<DataType, ParseError> {
        let data_type = match self.current_token() {
            Token::Int => DataType::Int,
            Token::Float => DataType::Float,
            Token::Text => DataType::Text,
            Token::Bool => DataType::Bool,
            Token::Ident(name) => {
                return Err(ParseError::UnknownType {
                    found: name.clone(),
                    position: self.current_position(),
                });
            }
            _ => return Err(self.unexpected("column type")),
        };
        self.advance();
        Ok(data_type)
    }

    /// Consumes a literal token, or `None` if the current token is not one.
    fn consume_literal(&mut self) -> Option<Value> {
        let value = match self.current_token() {
            Token::Number(n) => Value::Int(*n),
            Token::FloatNumber(n) => Value::Float(*n),
            Token::String(s) => Value::Text(s.as_str().into()),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            _ => return None,
        };
        self.advance();
        Some(value)
    }

    fn consume_path(&mut self) -> Result<PathBuf, ParseError> {
        match self.current_token() {
            Token::Path(path) | Token::String(path) => {
                let path = PathBuf::from(path);
                self.advance();
                Ok(path)
            }
            _ => Err(self.unexpected("file name")),
        }
    }

    // --- Commands ---

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.consume_ident()?;
        self.consume(Token::Colon)?;
        let data_type = self.consume_data_type()?;

        Ok(ColumnDef { name, data_type })
    }

    fn parse_create_table(&mut self) -> Result<Command, ParseError> {
        self.consume(Token::Create)?;
        let name = self.consume_ident()?;
        self.consume(Token::Key)?;
        let key_column = self.consume_ident()?;

        let mut fields = vec![];
        if *self.current_token() == Token::Fields {
            self.advance();
            loop {
                fields.push(self.parse_column_def()?);
                if *self.current_token() != Token::Comma {
                    break;
                }
                self.advance();
            }
        }

        Ok(Command::CreateTable(CreateTable {
            name,
            key_column,
            fields,
        }))
    }

    fn parse_insert(&mut self) -> Result<Command, ParseError> {
        self.consume(Token::Insert)?;

        let mut values = vec![];
        loop {
            let column = self.consume_ident()?;
            self.consume(Token::Equal)?;
            let value = match self.consume_literal() {
                Some(value) => value,
                // a bare word is a text value
                None => Value::Text(
                    self.consume_ident()
                        .map_err(|_| self.unexpected("value"))?
                        .into(),
                ),
            };
            values.push((column, value));

            if *self.current_token() != Token::Comma {
                break;
            }
            self.advance();
        }

        self.consume(Token::Into)?;
        let table = self.consume_ident()?;

        Ok(Command::InsertInto(InsertInto { table, values }))
    }

    fn parse_select(&mut self) -> Result<Command, ParseError> {
        self.consume(Token::Select)?;

        let columns = if *self.current_token() == Token::Star {
            self.advance();
            ColumnsSelect::Star
        } else {
            let mut names = vec![self.consume_ident()?];
            while *self.current_token() == Token::Comma {
                self.advance();
                names.push(self.consume_ident()?);
            }
            ColumnsSelect::ColumnsNames(names)
        };

        self.consume(Token::From)?;
        let table = self.consume_ident()?;

        let where_clause = if *self.current_token() == Token::Where {
            self.advance();
            self.parse_optional_expr()?
        } else {
            None
        };

        Ok(Command::Select(Select {
            columns,
            table,
            where_clause,
        }))
    }

    fn parse_delete(&mut self) -> Result<Command, ParseError> {
        self.consume(Token::Delete)?;
        self.consume(Token::From)?;
        let table = self.consume_ident()?;
        self.consume(Token::Where)?;
        let where_clause = self.parse_optional_expr()?;

        Ok(Command::Delete(Delete {
            table,
            where_clause,
        }))
    }

    // --- WHERE expressions ---

    /// A WHERE keyword followed by nothing matches every record.
    fn parse_optional_expr(&mut self) -> Result<Option<Expr>, ParseError> {
        if *self.current_token() == Token::Eof {
            return Ok(None);
        }
        self.parse_or().map(Some)
    }

    /// `or := and (OR and)*`
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while *self.current_token() == Token::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    /// `and := primary (AND primary)*`
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;
        while *self.current_token() == Token::And {
            self.advance();
            let right = self.parse_primary()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    /// `primary := '(' or ')' | comparison`
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if *self.current_token() != Token::LeftParen {
            return self.parse_comparison();
        }

        let open = self.current_position();
        self.advance();
        let expr = self.parse_or()?;
        match self.current_token() {
            Token::RightParen => {
                self.advance();
                Ok(expr)
            }
            Token::Eof => Err(ParseError::UnbalancedParenthesis { position: open }),
            _ => Err(self.unexpected("')'")),
        }
    }

    /// `comparison := column op (column | literal)`
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token();
        if token.is_literal() {
            return Err(ParseError::LiteralOnLeft {
                found: token.to_string(),
                position: self.current_position(),
            });
        }
        if *token == Token::RightParen {
            return Err(ParseError::UnbalancedParenthesis {
                position: self.current_position(),
            });
        }

        let column = self.consume_ident()?;
        let op = self.consume_operator()?;
        let rhs = match self.consume_literal() {
            Some(value) => Operand::Literal(value),
            None => Operand::Column(
                self.consume_ident()
                    .map_err(|_| self.unexpected("column or literal"))?,
            ),
        };

        Ok(Expr::compare(column, op, rhs))
    }

    fn consume_operator(&mut self) -> Result<ComparisonOp, ParseError> {
        let op = match self.current_token() {
            Token::Equal => ComparisonOp::Eq,
            Token::NotEqual => ComparisonOp::NotEq,
            Token::Greater => ComparisonOp::Gt,
            Token::GreaterEqual => ComparisonOp::GtEq,
            Token::Lower => ComparisonOp::Lt,
            Token::LowerEqual => ComparisonOp::LtEq,
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        Ok(op)
    }
}
