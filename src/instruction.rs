use std::fmt;

pub mod parse;

macro_rules! opcodes {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $mnemonic:literal , )+ ) => {
        /// Defines the mnemonics understood by the simulator.
        /// Every opcode takes exactly one integer operand.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Opcode {
            $(
                $( #[doc = $doc] )+
                $name,
            )+
        }

        impl Opcode {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => $mnemonic , )+
                }
            }
        }

        impl ::std::fmt::Display for Opcode {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

opcodes! {
    /// Move forward a number of cells
    /// @param steps Number of unit steps
    Mov = "mov",
    /// Rotate clockwise
    /// @param degrees A multiple of 90 between 0 and 360
    Rot = "rot",
}

/// A single decoded line of an instruction file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Walk `steps` cells along the current heading
    Move { steps: u32 },
    /// Turn clockwise. Holds the operand as written; it is checked when executed.
    Rotate { degrees: RotateOperand },
    /// Text that matched no opcode. Skipped when executed.
    Unrecognized { text: String },
}

/// Operand of a `rot` line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RotateOperand {
    Degrees(i64),
    /// Operand that is not an integer at all
    Malformed(String),
}

impl Instruction {
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Instruction::Move { .. } => Some(Opcode::Mov),
            Instruction::Rotate { .. } => Some(Opcode::Rot),
            Instruction::Unrecognized { .. } => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Move { steps } => write!(f, "{} {}", Opcode::Mov, steps),
            Instruction::Rotate {
                degrees: RotateOperand::Degrees(degrees),
            } => write!(f, "{} {}", Opcode::Rot, degrees),
            Instruction::Rotate {
                degrees: RotateOperand::Malformed(text),
            } => write!(f, "{} {}", Opcode::Rot, text),
            Instruction::Unrecognized { text } => f.write_str(text),
        }
    }
}

/// An instruction together with the line it was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub line_nr: usize,
    pub instruction: Instruction,
}

/// A loaded instruction file. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    lines: Vec<Line>,
}

impl Program {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Builds a program from bare instructions, numbering them from 1
    pub fn from_instructions<I>(instructions: I) -> Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        Self {
            lines: instructions
                .into_iter()
                .enumerate()
                .map(|(idx, instruction)| Line {
                    line_nr: idx + 1,
                    instruction,
                })
                .collect(),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Prints the program listing at debug level
    pub fn dump(&self) {
        for line in &self.lines {
            log::debug!("{:>4}: {}", line.line_nr, line.instruction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_opcode_names() -> Result<()> {
        assert_eq!(Opcode::Mov.name(), "mov");
        assert_eq!(Opcode::Rot.to_string(), "rot");
        assert_eq!(Opcode::ALL.len(), 2);

        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        assert_eq!(Instruction::Move { steps: 3 }.to_string(), "mov 3");
        let rot = Instruction::Rotate {
            degrees: RotateOperand::Degrees(-90),
        };
        assert_eq!(rot.to_string(), "rot -90");
        assert_eq!(rot.opcode(), Some(Opcode::Rot));

        let text = Instruction::Unrecognized {
            text: "jump 2".into(),
        };
        assert_eq!(text.to_string(), "jump 2");
        assert_eq!(text.opcode(), None);

        Ok(())
    }

    #[test]
    fn test_program_numbering() -> Result<()> {
        let program = Program::from_instructions(vec![
            Instruction::Move { steps: 1 },
            Instruction::Move { steps: 2 },
        ]);

        assert_eq!(program.len(), 2);
        assert_eq!(program.get(1).map(|line| line.line_nr), Some(2));
        assert!(program.get(2).is_none());
        assert!(Program::default().is_empty());

        Ok(())
    }
}
