//
// kind.rs
//
// Token and node kinds of the C# syntax tree, plus the rowan language binding.
//

macro_rules! syntax_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Every token and node kind that can appear in a [`SyntaxTree`](super::SyntaxTree).
        ///
        /// Token kinds come first, node kinds after `CompilationUnit`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($kind),*
        }

        impl SyntaxKind {
            const ALL: &'static [SyntaxKind] = &[$(SyntaxKind::$kind),*];
        }
    };
}

syntax_kinds! {
    // Trivia
    Whitespace,
    Newline,
    SingleLineComment,
    DocComment,
    MultiLineComment,
    Directive,
    DisabledText,

    // Literals and names
    Ident,
    NumericLiteral,
    CharLiteral,
    StringLiteral,
    VerbatimStringLiteral,
    InterpolatedStringLiteral,
    RawStringLiteral,
    Unknown,
    Eof,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    QuestionDot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Bang,
    Tilde,
    Eq,
    Lt,
    Gt,
    PlusPlus,
    MinusMinus,
    AmpAmp,
    PipePipe,
    EqEq,
    BangEq,
    LtEq,
    GtEq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLt,
    LtLtEq,
    GtGt,
    GtGtEq,
    FatArrow,
    Arrow,

    // Reserved keywords
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FixedKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    LongKw,
    NamespaceKw,
    NewKw,
    NullKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    SizeofKw,
    StackallocKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UncheckedKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // Contextual keywords (lexed as identifiers, remapped by the parser)
    FromKw,
    WhereKw,
    SelectKw,
    GroupKw,
    ByKw,
    IntoKw,
    OrderbyKw,
    JoinKw,
    LetKw,
    OnKw,
    EqualsKw,
    AscendingKw,
    DescendingKw,
    GetKw,
    SetKw,
    InitKw,
    AddKw,
    RemoveKw,
    YieldKw,
    RecordKw,
    WhenKw,

    // Nodes
    CompilationUnit,
    ExternAlias,
    UsingDirective,
    NamespaceDecl,
    NamespaceBody,
    TypeDecl,
    TypeBody,
    EnumDecl,
    EnumBody,
    EnumMember,
    DelegateDecl,
    BaseList,
    TypeParameterList,
    TypeParameter,
    ConstraintClause,
    AttributeList,
    Attribute,
    MethodDecl,
    ConstructorInitializer,
    ParameterList,
    Parameter,
    PropertyDecl,
    IndexerDecl,
    EventDecl,
    AccessorList,
    AccessorDecl,
    FieldDecl,
    IncompleteMember,
    VariableDeclaration,
    VariableDeclarator,
    EqualsValueClause,
    ArrowClause,
    Block,

    LocalDeclStmt,
    LocalFunctionStmt,
    ExprStmt,
    EmptyStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForeachStmt,
    UsingStmt,
    LockStmt,
    FixedStmt,
    SwitchStmt,
    SwitchBlock,
    SwitchSection,
    SwitchLabel,
    TryStmt,
    CatchClause,
    CatchDecl,
    FinallyClause,
    ReturnStmt,
    ThrowStmt,
    BreakStmt,
    ContinueStmt,
    GotoStmt,
    YieldStmt,
    LabeledStmt,
    CheckedStmt,
    UnsafeStmt,

    Type,
    TypeArgumentList,
    Name,
    MemberAccess,
    Invocation,
    ArgumentList,
    Argument,
    ElementAccess,
    BracketedArgumentList,
    Literal,
    Paren,
    Tuple,
    Cast,
    Prefix,
    Postfix,
    Binary,
    Assignment,
    Conditional,
    Lambda,
    AnonymousMethod,
    ObjectCreation,
    ArrayCreation,
    AnonymousObject,
    Initializer,
    CollectionExpr,
    KeywordExpr,
    DeclarationExpr,

    QueryExpr,
    FromClause,
    QueryBody,
    WhereClause,
    SelectClause,
    GroupClause,
    OrderByClause,
    Ordering,
    JoinClause,
    LetClause,
    QueryContinuation,

    SwitchExpr,
    SwitchExprArm,
    Pattern,
    Error,
}

impl SyntaxKind {
    /// Convert a raw rowan kind back into a `SyntaxKind`.
    pub fn from_raw(raw: u16) -> SyntaxKind {
        Self::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(SyntaxKind::Error)
    }

    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::Newline
                | SyntaxKind::SingleLineComment
                | SyntaxKind::DocComment
                | SyntaxKind::MultiLineComment
                | SyntaxKind::Directive
                | SyntaxKind::DisabledText
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            SyntaxKind::SingleLineComment | SyntaxKind::DocComment | SyntaxKind::MultiLineComment
        )
    }

    /// String tokens that may span several lines.
    pub fn is_string_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::StringLiteral
                | SyntaxKind::VerbatimStringLiteral
                | SyntaxKind::InterpolatedStringLiteral
                | SyntaxKind::RawStringLiteral
        )
    }

    pub fn is_literal(self) -> bool {
        self.is_string_literal()
            || matches!(
                self,
                SyntaxKind::NumericLiteral
                    | SyntaxKind::CharLiteral
                    | SyntaxKind::TrueKw
                    | SyntaxKind::FalseKw
                    | SyntaxKind::NullKw
            )
    }

    /// Keywords naming a built-in type (`int`, `string`, ...), including `void`.
    pub fn is_predefined_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BoolKw
                | SyntaxKind::ByteKw
                | SyntaxKind::CharKw
                | SyntaxKind::DecimalKw
                | SyntaxKind::DoubleKw
                | SyntaxKind::FloatKw
                | SyntaxKind::IntKw
                | SyntaxKind::LongKw
                | SyntaxKind::ObjectKw
                | SyntaxKind::SbyteKw
                | SyntaxKind::ShortKw
                | SyntaxKind::StringKw
                | SyntaxKind::UintKw
                | SyntaxKind::UlongKw
                | SyntaxKind::UshortKw
                | SyntaxKind::VoidKw
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::InternalKw
                | SyntaxKind::StaticKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::SealedKw
                | SyntaxKind::VirtualKw
                | SyntaxKind::OverrideKw
                | SyntaxKind::ReadonlyKw
                | SyntaxKind::ExternKw
                | SyntaxKind::UnsafeKw
                | SyntaxKind::VolatileKw
                | SyntaxKind::ConstKw
                | SyntaxKind::NewKw
        )
    }

    /// Statement nodes, plus the clauses that own an embedded statement or block.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::LocalDeclStmt
                | SyntaxKind::LocalFunctionStmt
                | SyntaxKind::ExprStmt
                | SyntaxKind::EmptyStmt
                | SyntaxKind::IfStmt
                | SyntaxKind::WhileStmt
                | SyntaxKind::DoStmt
                | SyntaxKind::ForStmt
                | SyntaxKind::ForeachStmt
                | SyntaxKind::UsingStmt
                | SyntaxKind::LockStmt
                | SyntaxKind::FixedStmt
                | SyntaxKind::SwitchStmt
                | SyntaxKind::TryStmt
                | SyntaxKind::ReturnStmt
                | SyntaxKind::ThrowStmt
                | SyntaxKind::BreakStmt
                | SyntaxKind::ContinueStmt
                | SyntaxKind::GotoStmt
                | SyntaxKind::YieldStmt
                | SyntaxKind::LabeledStmt
                | SyntaxKind::CheckedStmt
                | SyntaxKind::UnsafeStmt
        )
    }

    /// Type, member, namespace and using declarations.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ExternAlias
                | SyntaxKind::UsingDirective
                | SyntaxKind::NamespaceDecl
                | SyntaxKind::TypeDecl
                | SyntaxKind::EnumDecl
                | SyntaxKind::EnumMember
                | SyntaxKind::DelegateDecl
                | SyntaxKind::MethodDecl
                | SyntaxKind::PropertyDecl
                | SyntaxKind::IndexerDecl
                | SyntaxKind::EventDecl
                | SyntaxKind::AccessorDecl
                | SyntaxKind::FieldDecl
                | SyntaxKind::IncompleteMember
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Reserved keyword for `text`, if any.
pub(crate) fn keyword(text: &str) -> Option<SyntaxKind> {
    use SyntaxKind::*;
    let kind = match text {
        "abstract" => AbstractKw,
        "as" => AsKw,
        "base" => BaseKw,
        "bool" => BoolKw,
        "break" => BreakKw,
        "byte" => ByteKw,
        "case" => CaseKw,
        "catch" => CatchKw,
        "char" => CharKw,
        "checked" => CheckedKw,
        "class" => ClassKw,
        "const" => ConstKw,
        "continue" => ContinueKw,
        "decimal" => DecimalKw,
        "default" => DefaultKw,
        "delegate" => DelegateKw,
        "do" => DoKw,
        "double" => DoubleKw,
        "else" => ElseKw,
        "enum" => EnumKw,
        "event" => EventKw,
        "explicit" => ExplicitKw,
        "extern" => ExternKw,
        "false" => FalseKw,
        "finally" => FinallyKw,
        "fixed" => FixedKw,
        "float" => FloatKw,
        "for" => ForKw,
        "foreach" => ForeachKw,
        "goto" => GotoKw,
        "if" => IfKw,
        "implicit" => ImplicitKw,
        "in" => InKw,
        "int" => IntKw,
        "interface" => InterfaceKw,
        "internal" => InternalKw,
        "is" => IsKw,
        "lock" => LockKw,
        "long" => LongKw,
        "namespace" => NamespaceKw,
        "new" => NewKw,
        "null" => NullKw,
        "object" => ObjectKw,
        "operator" => OperatorKw,
        "out" => OutKw,
        "override" => OverrideKw,
        "params" => ParamsKw,
        "private" => PrivateKw,
        "protected" => ProtectedKw,
        "public" => PublicKw,
        "readonly" => ReadonlyKw,
        "ref" => RefKw,
        "return" => ReturnKw,
        "sbyte" => SbyteKw,
        "sealed" => SealedKw,
        "short" => ShortKw,
        "sizeof" => SizeofKw,
        "stackalloc" => StackallocKw,
        "static" => StaticKw,
        "string" => StringKw,
        "struct" => StructKw,
        "switch" => SwitchKw,
        "this" => ThisKw,
        "throw" => ThrowKw,
        "true" => TrueKw,
        "try" => TryKw,
        "typeof" => TypeofKw,
        "uint" => UintKw,
        "ulong" => UlongKw,
        "unchecked" => UncheckedKw,
        "unsafe" => UnsafeKw,
        "ushort" => UshortKw,
        "using" => UsingKw,
        "virtual" => VirtualKw,
        "void" => VoidKw,
        "volatile" => VolatileKw,
        "while" => WhileKw,
        _ => return None,
    };
    Some(kind)
}

/// The C# language tag for rowan trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CSharpLanguage {}

impl rowan::Language for CSharpLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}
