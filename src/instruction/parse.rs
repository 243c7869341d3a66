//! mov 3
//! rot 90
//! mov 2

use std::borrow::Cow;
use std::error;
use std::fs;
use std::iter::Enumerate;
use std::path::Path;
use std::str::FromStr;
use std::{fmt, str::Lines};

use super::{Instruction, Line, Opcode, Program, RotateOperand};

macro_rules! propagate {
    ( $res:expr ) => {
        match $res {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnrecognizedInstruction,
    InvalidStepCount,
    MissingOperand,
    TrailingOperand,
    EmptyProgram,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnrecognizedInstruction => f.write_str("unrecognized instruction"),
            ParseErrorKind::InvalidStepCount => f.write_str("invalid step count"),
            ParseErrorKind::MissingOperand => f.write_str("missing operand"),
            ParseErrorKind::TrailingOperand => f.write_str("too many operands"),
            ParseErrorKind::EmptyProgram => f.write_str("file contains no instructions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// How the parser treats lines that match no opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Keep them in the program; the interpreter skips them
    Permissive,
    /// Reject them with [`ParseErrorKind::UnrecognizedInstruction`]
    Strict,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Permissive
    }
}

/// Splits raw file contents into trimmed, non-empty lines paired with their
/// 1-based line numbers. Lines starting with `#` are comments.
pub fn load(data: &str) -> Loader<'_> {
    Loader {
        lines: data.lines().enumerate(),
    }
}

/// Iterator returned by [`load`]
#[derive(Debug, Clone)]
pub struct Loader<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Iterator for Loader<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in &mut self.lines {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                return Some((idx + 1, line));
            }
        }

        None
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Loader<'a>,
    line_nr: usize,
    dialect: Dialect,
    program: Vec<Line>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data` using `dialect` for unknown lines.
    pub fn new(data: &'a str, dialect: Dialect) -> Self {
        Self {
            lines: load(data),
            line_nr: 0,
            dialect,
            program: Vec::new(),
        }
    }

    /// Consumes `self` and tries to parse all of the data into a [`Program`].
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end. A
    /// file without a single instruction is an error as well.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() && self.program.is_empty() {
            let err = ParseError::new::<_, &'static str>(
                ParseErrorKind::EmptyProgram,
                None,
                self.line_nr,
            );
            log::error!("{}", err);
            errors.push(err);
        }

        if errors.is_empty() {
            Ok(Program::new(self.program))
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Each instruction should be located on
    /// its own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let (line_nr, line) = self.lines.next()?;
        self.line_nr = line_nr;

        let mut tokens = line.split_whitespace();
        let mnemonic = tokens.next().unwrap_or_default();
        let opcode = Opcode::ALL
            .iter()
            .find(|opcode| mnemonic == opcode.name())
            .copied();

        let instruction = match opcode {
            Some(opcode) => {
                let operand = tokens.next();
                if let Some(extra) = tokens.next() {
                    propagate!(self.unrecognized(
                        line,
                        ParseErrorKind::TrailingOperand,
                        format!("unexpected `{}`", extra)
                    ))
                } else {
                    propagate!(self.parse_operand(line, opcode, operand))
                }
            }
            None => propagate!(self.unrecognized(
                line,
                ParseErrorKind::UnrecognizedInstruction,
                format!("no opcode named `{}`", mnemonic)
            )),
        };

        log::debug!("[{}] Found instruction `{}`", self.line_nr, instruction);

        self.program.push(Line {
            line_nr: self.line_nr,
            instruction,
        });

        Some(Ok(()))
    }

    /// Tries to parse the operand of `opcode`. The `line` should be the whole
    /// line without any modifications.
    ///
    /// # Examples
    ///
    /// - `mov 3`
    /// - `rot 270`
    fn parse_operand(
        &self,
        line: &str,
        opcode: Opcode,
        operand: Option<&str>,
    ) -> Result<Instruction> {
        match opcode {
            Opcode::Mov => {
                let operand = match operand {
                    Some(operand) => operand,
                    None => {
                        return self.unrecognized(
                            line,
                            ParseErrorKind::MissingOperand,
                            "`mov` needs a step count",
                        )
                    }
                };

                match operand.parse::<u32>() {
                    Ok(steps) => Ok(Instruction::Move { steps }),
                    Err(_) => self.unrecognized(
                        line,
                        ParseErrorKind::InvalidStepCount,
                        format!("`{}` is not a non-negative integer", operand),
                    ),
                }
            }
            Opcode::Rot => {
                // Range and multiple-of-90 checks happen at run time.
                let degrees = match operand {
                    Some(operand) => match operand.parse::<i64>() {
                        Ok(degrees) => RotateOperand::Degrees(degrees),
                        Err(_) => RotateOperand::Malformed(operand.to_string()),
                    },
                    None => RotateOperand::Malformed(String::new()),
                };

                Ok(Instruction::Rotate { degrees })
            }
        }
    }

    /// Handles a line that cannot be decoded. In the permissive dialect the
    /// line is kept and skipped at run time.
    fn unrecognized<S>(&self, line: &str, kind: ParseErrorKind, context: S) -> Result<Instruction>
    where
        S: Into<Cow<'static, str>>,
    {
        match self.dialect {
            Dialect::Permissive => {
                log::warn!("[{}] Ignoring `{}`: {}", self.line_nr, line, kind);
                Ok(Instruction::Unrecognized {
                    text: line.to_string(),
                })
            }
            Dialect::Strict => Err(ParseError::new(kind, context, self.line_nr)),
        }
    }
}

impl Program {
    /// Parses `data` with the given dialect
    pub fn parse(data: &str, dialect: Dialect) -> Result<Self, Vec<ParseError>> {
        Parser::new(data, dialect).parse()
    }

    /// Reads and parses an instruction file
    pub fn from_file<P: AsRef<Path>>(path: P, dialect: Dialect) -> color_eyre::eyre::Result<Self> {
        use color_eyre::eyre::{eyre, WrapErr};

        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read `{}`", path.display()))?;

        Self::parse(&data, dialect).map_err(|errors| {
            let report = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            eyre!("Failed to parse `{}`:\n{}", path.display(), report)
        })
    }
}

impl FromStr for Program {
    type Err = Vec<ParseError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, Dialect::default())
    }
}
