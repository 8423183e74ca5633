//! Token model shared by the tokenizer and the analysis rules.
//!
//! A [`Token`] is an immutable record: its kind, raw lexeme, index in the
//! stream, source location, and the nesting metadata precomputed by the
//! tokenizer. All cross-token references are plain indices into the owning
//! [`TokenStream`](crate::token_stream::TokenStream).

use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Token kinds
// ═══════════════════════════════════════════════════════════════════════════

/// Assignment operator variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Plain,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `**=`
    Pow,
    /// `%=`
    Mod,
    /// `&=`
    BitAnd,
    /// `|=`
    BitOr,
    /// `^=`
    BitXor,
    /// `<<=`
    ShiftLeft,
    /// `>>=`
    ShiftRight,
    /// `.=`
    Concat,
}

impl AssignOp {
    /// Map an operator lexeme to its assignment variant.
    pub fn from_lexeme(text: &str) -> Option<Self> {
        let op = match text {
            "=" => Self::Plain,
            "+=" => Self::Add,
            "-=" => Self::Sub,
            "*=" => Self::Mul,
            "/=" => Self::Div,
            "**=" => Self::Pow,
            "%=" => Self::Mod,
            "&=" => Self::BitAnd,
            "|=" => Self::BitOr,
            "^=" => Self::BitXor,
            "<<=" => Self::ShiftLeft,
            ">>=" => Self::ShiftRight,
            ".=" => Self::Concat,
            _ => return None,
        };
        Some(op)
    }

    /// Returns true for every variant except plain `=`.
    pub fn is_compound(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// Reserved words the analysis cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Named function or method declaration.
    Function,
    /// Anonymous function (`function (...) use (...) { }`).
    Closure,
    /// Arrow function (`fn (...) => expr`).
    Fn,
    For,
    Foreach,
    While,
    Do,
    /// Terminators of the `for (...): ... endfor;` loop forms.
    Endfor,
    Endforeach,
    Endwhile,
    If,
    Else,
    Elseif,
    Switch,
    Try,
    Catch,
    Finally,
    Class,
    Interface,
    Trait,
    Static,
    Use,
    As,
    List,
    Echo,
}

impl Keyword {
    /// Look up a keyword by identifier, ignoring ASCII case.
    ///
    /// `function` always maps to [`Keyword::Function`]; the tokenizer
    /// promotes it to [`Keyword::Closure`] once it sees what follows.
    pub fn lookup(ident: &str) -> Option<Self> {
        let keyword = match ident.to_ascii_lowercase().as_str() {
            "function" => Self::Function,
            "fn" => Self::Fn,
            "for" => Self::For,
            "foreach" => Self::Foreach,
            "while" => Self::While,
            "do" => Self::Do,
            "endfor" => Self::Endfor,
            "endforeach" => Self::Endforeach,
            "endwhile" => Self::Endwhile,
            "if" => Self::If,
            "else" => Self::Else,
            "elseif" => Self::Elseif,
            "switch" => Self::Switch,
            "try" => Self::Try,
            "catch" => Self::Catch,
            "finally" => Self::Finally,
            "class" => Self::Class,
            "interface" => Self::Interface,
            "trait" => Self::Trait,
            "static" => Self::Static,
            "use" => Self::Use,
            "as" => Self::As,
            "list" => Self::List,
            "echo" => Self::Echo,
            _ => return None,
        };
        Some(keyword)
    }

    /// Function-like constructs delimit variable scopes.
    pub fn is_function_like(self) -> bool {
        matches!(self, Self::Function | Self::Closure)
    }

    /// Constructs with a parameter list, arrow functions included.
    pub fn declares_parameters(self) -> bool {
        matches!(self, Self::Function | Self::Closure | Self::Fn)
    }

    /// Loop constructs whose bodies may run more than once.
    pub fn is_loop(self) -> bool {
        matches!(self, Self::For | Self::Foreach | Self::While | Self::Do)
    }

    /// Keyword closing the alternative-syntax body of a loop.
    pub fn alternative_terminator(self) -> Option<Self> {
        match self {
            Self::For => Some(Self::Endfor),
            Self::Foreach => Some(Self::Endforeach),
            Self::While => Some(Self::Endwhile),
            _ => None,
        }
    }

    /// Class-like constructs whose direct children are member declarations.
    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::Trait)
    }
}

/// Closed set of token kinds produced by the tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Text outside `<?php ... ?>`.
    InlineHtml,
    /// `<?php` or `<?=`
    OpenTag,
    /// `?>`
    CloseTag,
    Whitespace,
    Comment,
    /// `$name`
    Variable,
    Assign(AssignOp),
    /// `++`
    Increment,
    /// `--`
    Decrement,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    /// `[` opening a short array or destructuring list.
    OpenShortArray,
    /// `]` closing a short array or destructuring list.
    CloseShortArray,
    /// `[` opening an index expression.
    OpenSquareBracket,
    /// `]` closing an index expression.
    CloseSquareBracket,
    Keyword(Keyword),
    /// `->` or `?->`
    ObjectOperator,
    /// `::`
    DoubleColon,
    Comma,
    Semicolon,
    /// `=>`
    DoubleArrow,
    /// A lone `:`, as in ternaries, labels and alternative syntax.
    Colon,
    /// A lone `&`, used for references and bitwise and.
    BitwiseAnd,
    Identifier,
    Number,
    String,
    /// Any other operator or punctuation.
    Operator,
}

impl TokenKind {
    /// Whitespace and comments carry no meaning for the analysis.
    pub fn is_ineffective(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// The keyword carried by this kind, if any.
    pub fn keyword(self) -> Option<Keyword> {
        match self {
            Self::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// Returns true when this kind is the given keyword.
    pub fn is_keyword(self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "keyword `{keyword:?}`"),
            Self::Assign(op) => write!(f, "assignment `{op:?}`"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Token
// ═══════════════════════════════════════════════════════════════════════════

/// An enclosing scope-owning construct: the owner's position and keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Condition {
    pub owner: usize,
    pub keyword: Keyword,
}

/// A single token with its precomputed nesting metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme; variable names are compared on this.
    pub text: String,
    /// Index of this token in its stream.
    pub position: usize,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
    /// Enclosing scope owners, outermost first.
    pub conditions: Vec<Condition>,
    /// Nesting depth, equal to the number of conditions.
    pub level: usize,
    /// Enclosing parenthesis openers, outermost first.
    pub nested_parentheses: Vec<usize>,
    /// Set on `(`, `)` and on constructs owning a parenthesised header.
    pub parenthesis_opener: Option<usize>,
    pub parenthesis_closer: Option<usize>,
    /// Set on `(` and `)` when the pair belongs to a construct.
    pub parenthesis_owner: Option<usize>,
    /// Set on scope owners and on the braces they own.
    pub scope_opener: Option<usize>,
    pub scope_closer: Option<usize>,
}

impl Token {
    /// Create a token with empty nesting metadata.
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            position: 0,
            line,
            column,
            conditions: Vec::new(),
            level: 0,
            nested_parentheses: Vec::new(),
            parenthesis_opener: None,
            parenthesis_closer: None,
            parenthesis_owner: None,
            scope_opener: None,
            scope_closer: None,
        }
    }

    /// Innermost enclosing parenthesis opener, if any.
    pub fn innermost_parenthesis(&self) -> Option<usize> {
        self.nested_parentheses.last().copied()
    }

    /// Innermost enclosing scope owner, if any.
    pub fn innermost_condition(&self) -> Option<Condition> {
        self.conditions.last().copied()
    }
}
