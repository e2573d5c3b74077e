//! Operators and declaration scopes.

use serde::Serialize;

/// Declaration scope of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    /// No prefix keyword; the binding lands in the module's global table.
    Global,
    /// Prefixed with `local`.
    Local,
    /// Literals and anonymous forms that never carry a prefix.
    None,
}

impl Scope {
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Local => "local ",
            Scope::Global | Scope::None => "",
        }
    }
}

/// Luau operators.
///
/// Every variant except [`Operator::Illegal`] has exactly one rendering.
/// `Illegal` marks a source operator with no Luau counterpart and must be
/// rejected before a tree reaches the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Illegal,

    Add,
    Sub,
    Mul,
    Div,
    Rem,

    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    ConcatAssign,

    Eql,
    Neq,
    Lss,
    Gtr,
    Leq,
    Geq,

    And,
    Or,
    Not,

    Neg,
    Len,
    Concat,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Illegal => "",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Rem => "%",
            Operator::Assign => "=",
            Operator::AddAssign => "+=",
            Operator::SubAssign => "-=",
            Operator::MulAssign => "*=",
            Operator::DivAssign => "/=",
            Operator::RemAssign => "%=",
            Operator::ConcatAssign => "..=",
            Operator::Eql => "==",
            Operator::Neq => "~=",
            Operator::Lss => "<",
            Operator::Gtr => ">",
            Operator::Leq => "<=",
            Operator::Geq => ">=",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Neg => "-",
            Operator::Len => "#",
            Operator::Concat => "..",
        }
    }

    pub fn is_illegal(self) -> bool {
        self == Operator::Illegal
    }

    /// Whether this operator may appear between the two sides of an assignment.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::AddAssign
                | Operator::SubAssign
                | Operator::MulAssign
                | Operator::DivAssign
                | Operator::RemAssign
                | Operator::ConcatAssign
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not | Operator::Neg | Operator::Len)
    }

    /// Binding strength as a binary operator (Luau reference manual, lowest first).
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Eql
            | Operator::Neq
            | Operator::Lss
            | Operator::Gtr
            | Operator::Leq
            | Operator::Geq => 3,
            Operator::Concat => 4,
            Operator::Add | Operator::Sub => 5,
            Operator::Mul | Operator::Div | Operator::Rem => 6,
            Operator::Not | Operator::Neg | Operator::Len => 7,
            _ => 0,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        self == Operator::Concat
    }

    /// The compound-assignment form of a binary operator, if Luau has one.
    pub fn compound(self) -> Operator {
        match self {
            Operator::Add => Operator::AddAssign,
            Operator::Sub => Operator::SubAssign,
            Operator::Mul => Operator::MulAssign,
            Operator::Div => Operator::DivAssign,
            Operator::Rem => Operator::RemAssign,
            Operator::Concat => Operator::ConcatAssign,
            _ => Operator::Illegal,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
