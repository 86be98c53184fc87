use crate::diagnostic::{Diagnostic, Label, Span};

/// A runtime failure. Evaluation does not recover from these: the error
/// unwinds to `interpret`, which hands it to the caller to report.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    UndefinedVariable { name: String, span: Span },
    OperandNotNumber { span: Span },
    OperandsNotAddable { span: Span },
}

impl RuntimeError {
    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn operand_not_number(span: Span) -> Self {
        Self::OperandNotNumber { span }
    }

    pub fn operands_not_addable(span: Span) -> Self {
        Self::OperandsNotAddable { span }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. } => *span,
            Self::OperandNotNumber { span } => *span,
            Self::OperandsNotAddable { span } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UndefinedVariable { name, span } => {
                Diagnostic::error(format!("Undefined variable '{}'.", name))
                    .with_code("E0201")
                    .with_label(Label::primary(*span, "not found in this scope"))
                    .with_help(format!("declare it first: `var {} = ...;`", name))
            }
            Self::OperandNotNumber { span } => Diagnostic::error("Operand must be a number.")
                .with_code("E0202")
                .with_label(Label::primary(*span, "this operand is not a number")),
            Self::OperandsNotAddable { span } => {
                Diagnostic::error("Operands must be two numbers or two strings.")
                    .with_code("E0203")
                    .with_label(Label::primary(*span, "cannot add these operands"))
            }
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name, .. } => {
                write!(f, "Undefined variable '{}'.", name)
            }
            RuntimeError::OperandNotNumber { .. } => write!(f, "Operand must be a number."),
            RuntimeError::OperandsNotAddable { .. } => {
                write!(f, "Operands must be two numbers or two strings.")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
