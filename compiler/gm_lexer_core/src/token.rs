//! Token kinds and the tokens produced by a scan.
//!
//! [`TokenKind`] is a closed two-level taxonomy: a family (`String`,
//! `Comment`, ...) with an optional qualifier (`String(StringKind::Double)`).
//! The `Plain` qualifier stands for the unqualified family. Grammars that need
//! categories outside the taxonomy use [`TokenKind::Custom`].

use std::fmt;

use crate::span::Span;

/// Semantic classification of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    /// Subtype of [`TokenKind::Text`].
    Whitespace,
    /// In-band lexical error: input the grammar explicitly classifies as invalid.
    Error,
    Punctuation,
    Operator,
    Keyword(KeywordKind),
    Name(NameKind),
    String(StringKind),
    Comment(CommentKind),
    Generic(GenericKind),
    /// Grammar-specific extension: a static tag plus optional sub-tag.
    Custom {
        tag: &'static str,
        sub: Option<&'static str>,
    },
    /// Zero-length end-of-input marker.
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    Plain,
    Constant,
    Declaration,
    Namespace,
    Pseudo,
    Reserved,
    Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    Plain,
    Attribute,
    Builtin,
    Class,
    Constant,
    Function,
    Label,
    Tag,
    Variable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
    Plain,
    Char,
    Doc,
    Double,
    Escape,
    Interpol,
    Regex,
    Single,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Plain,
    Hashbang,
    Multiline,
    Preproc,
    Single,
    Special,
}

/// Markup-like categories, used for annotated comment markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Plain,
    Deleted,
    Emph,
    Error,
    Heading,
    Inserted,
    Output,
    Prompt,
    Strong,
    Traceback,
}

impl TokenKind {
    /// The enclosing kind, if any.
    ///
    /// Qualified kinds have their `Plain` family as parent, and
    /// `Whitespace` is a kind of `Text`. Families and standalone kinds have
    /// no parent.
    pub fn parent(self) -> Option<TokenKind> {
        match self {
            TokenKind::Whitespace => Some(TokenKind::Text),
            TokenKind::Keyword(k) if k != KeywordKind::Plain => {
                Some(TokenKind::Keyword(KeywordKind::Plain))
            }
            TokenKind::Name(k) if k != NameKind::Plain => Some(TokenKind::Name(NameKind::Plain)),
            TokenKind::String(k) if k != StringKind::Plain => {
                Some(TokenKind::String(StringKind::Plain))
            }
            TokenKind::Comment(k) if k != CommentKind::Plain => {
                Some(TokenKind::Comment(CommentKind::Plain))
            }
            TokenKind::Generic(k) if k != GenericKind::Plain => {
                Some(TokenKind::Generic(GenericKind::Plain))
            }
            TokenKind::Custom { tag, sub: Some(_) } => Some(TokenKind::Custom { tag, sub: None }),
            _ => None,
        }
    }

    /// Returns `true` if `self` is `ancestor` or one of its subtypes.
    pub fn is_within(self, ancestor: TokenKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Conventional short class name used by highlighting front ends.
    ///
    /// Custom kinds report their tag.
    pub fn short_name(self) -> &'static str {
        match self {
            TokenKind::Text => "",
            TokenKind::Whitespace => "w",
            TokenKind::Error => "err",
            TokenKind::Punctuation => "p",
            TokenKind::Operator => "o",
            TokenKind::Eof => "",
            TokenKind::Custom { tag, .. } => tag,
            TokenKind::Keyword(k) => match k {
                KeywordKind::Plain => "k",
                KeywordKind::Constant => "kc",
                KeywordKind::Declaration => "kd",
                KeywordKind::Namespace => "kn",
                KeywordKind::Pseudo => "kp",
                KeywordKind::Reserved => "kr",
                KeywordKind::Type => "kt",
            },
            TokenKind::Name(k) => match k {
                NameKind::Plain => "n",
                NameKind::Attribute => "na",
                NameKind::Builtin => "nb",
                NameKind::Class => "nc",
                NameKind::Constant => "no",
                NameKind::Function => "nf",
                NameKind::Label => "nl",
                NameKind::Tag => "nt",
                NameKind::Variable => "nv",
            },
            TokenKind::String(k) => match k {
                StringKind::Plain => "s",
                StringKind::Char => "sc",
                StringKind::Doc => "sd",
                StringKind::Double => "s2",
                StringKind::Escape => "se",
                StringKind::Interpol => "si",
                StringKind::Regex => "sr",
                StringKind::Single => "s1",
            },
            TokenKind::Comment(k) => match k {
                CommentKind::Plain => "c",
                CommentKind::Hashbang => "ch",
                CommentKind::Multiline => "cm",
                CommentKind::Preproc => "cp",
                CommentKind::Single => "c1",
                CommentKind::Special => "cs",
            },
            TokenKind::Generic(k) => match k {
                GenericKind::Plain => "g",
                GenericKind::Deleted => "gd",
                GenericKind::Emph => "ge",
                GenericKind::Error => "gr",
                GenericKind::Heading => "gh",
                GenericKind::Inserted => "gi",
                GenericKind::Output => "go",
                GenericKind::Prompt => "gp",
                GenericKind::Strong => "gs",
                GenericKind::Traceback => "gt",
            },
        }
    }

    /// Family name and qualifier name, e.g. `("Keyword", Some("Declaration"))`.
    fn path(self) -> (&'static str, Option<&'static str>) {
        match self {
            TokenKind::Text => ("Text", None),
            TokenKind::Whitespace => ("Text", Some("Whitespace")),
            TokenKind::Error => ("Error", None),
            TokenKind::Punctuation => ("Punctuation", None),
            TokenKind::Operator => ("Operator", None),
            TokenKind::Eof => ("Eof", None),
            TokenKind::Custom { tag, sub } => (tag, sub),
            TokenKind::Keyword(k) => ("Keyword", (k != KeywordKind::Plain).then_some(k.name())),
            TokenKind::Name(k) => ("Name", (k != NameKind::Plain).then_some(k.name())),
            TokenKind::String(k) => ("String", (k != StringKind::Plain).then_some(k.name())),
            TokenKind::Comment(k) => ("Comment", (k != CommentKind::Plain).then_some(k.name())),
            TokenKind::Generic(k) => ("Generic", (k != GenericKind::Plain).then_some(k.name())),
        }
    }
}

macro_rules! qualifier_names {
    ($($ty:ident { $($variant:ident),* $(,)? })*) => {
        $(
            impl $ty {
                /// Qualifier name as written in dotted kind paths.
                pub const fn name(self) -> &'static str {
                    match self {
                        $($ty::$variant => stringify!($variant),)*
                    }
                }
            }
        )*
    };
}

qualifier_names! {
    KeywordKind { Plain, Constant, Declaration, Namespace, Pseudo, Reserved, Type }
    NameKind { Plain, Attribute, Builtin, Class, Constant, Function, Label, Tag, Variable }
    StringKind { Plain, Char, Doc, Double, Escape, Interpol, Regex, Single }
    CommentKind { Plain, Hashbang, Multiline, Preproc, Single, Special }
    GenericKind { Plain, Deleted, Emph, Error, Heading, Inserted, Output, Prompt, Strong, Traceback }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            (family, Some(qualifier)) => write!(f, "{family}.{qualifier}"),
            (family, None) => f.write_str(family),
        }
    }
}

/// A classified slice of the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub span: Span,
    /// The covered source text, borrowed from the scanned input.
    pub text: &'src str,
}

impl<'src> Token<'src> {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Token { kind, span, text }
    }

    /// Byte offset of the first covered byte.
    #[inline]
    pub const fn start(&self) -> u32 {
        self.span.start
    }

    /// Byte offset one past the last covered byte.
    #[inline]
    pub const fn end(&self) -> u32 {
        self.span.end
    }

    /// Returns `true` for the zero-length end-of-input marker.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
