//! Expression and statement tree of the generated Go program.
//!
//! The tree is built once per generation, never mutated afterwards, and
//! consumed by the renderer.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::namespace::Namespace;

/// A scalar literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted string.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating-point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// File mode, printed in octal.
    FileMode(u32),
    /// Duration, printed as a multiple of a `time` unit.
    Duration(Duration),
    /// `nil`.
    Nil,
}

/// A Go type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Predeclared type (`string`, `error`, …).
    Named(&'static str),
    /// Package-qualified type.
    Qualified(Namespace, &'static str),
    /// `*T`.
    Pointer(Box<TypeExpr>),
    /// `[]T`.
    Slice(Box<TypeExpr>),
    /// `map[K]V`.
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// `chan T`.
    Chan(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for `string`.
    #[must_use]
    pub const fn string() -> Self {
        Self::Named("string")
    }

    /// Shorthand for `*ns.Name`.
    #[must_use]
    pub fn pointer_to(ns: Namespace, name: &'static str) -> Self {
        Self::Pointer(Box::new(Self::Qualified(ns, name)))
    }

    fn collect_namespaces(&self, out: &mut BTreeSet<Namespace>) {
        match self {
            Self::Named(_) => {}
            Self::Qualified(ns, _) => {
                let _ = out.insert(*ns);
            }
            Self::Pointer(inner) | Self::Slice(inner) | Self::Chan(inner) => {
                inner.collect_namespaces(out);
            }
            Self::Map(key, value) => {
                key.collect_namespaces(out);
                value.collect_namespaces(out);
            }
        }
    }
}

/// What a call is invoked on.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A local function or builtin: `run()`.
    Bare,
    /// A package-level function: `host.Privileged()`.
    Package(Namespace),
    /// A method on a value: `proj.AddService(...)`, or a chained call.
    Receiver(Box<Expr>),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!x`
    Not,
    /// `<-ch`
    Recv,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `&&`
    And,
    /// `!=`
    NotEq,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A function or method call.
    Call {
        /// Receiver or package.
        target: Target,
        /// Function or method name.
        name: String,
        /// Arguments in emission order.
        args: Vec<Expr>,
    },
    /// A local identifier.
    Ident(String),
    /// A package-qualified reference such as `os.Stdout`.
    Qualified {
        /// Package.
        ns: Namespace,
        /// Exported name.
        name: String,
    },
    /// A scalar literal.
    Lit(Literal),
    /// A slice literal.
    List {
        /// Element type.
        elem: TypeExpr,
        /// Elements in order.
        items: Vec<Expr>,
    },
    /// A map literal.
    Map {
        /// Key type.
        key: TypeExpr,
        /// Value type.
        value: TypeExpr,
        /// Entries in emission order.
        entries: Vec<(Expr, Expr)>,
    },
    /// Arguments spliced as one bundle into the enclosing argument list.
    Group(Vec<Expr>),
    /// A type used as a value (`make(chan os.Signal, 1)`).
    Type(TypeExpr),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Package-level call: `ns.name(args...)`.
    pub fn call(ns: Namespace, name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            target: Target::Package(ns),
            name: name.into(),
            args,
        }
    }

    /// Method call: `receiver.name(args...)`.
    pub fn method(receiver: Self, name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            target: Target::Receiver(Box::new(receiver)),
            name: name.into(),
            args,
        }
    }

    /// Local call: `name(args...)`.
    pub fn local(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            target: Target::Bare,
            name: name.into(),
            args,
        }
    }

    /// Local identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// Package-qualified reference.
    pub fn qualified(ns: Namespace, name: impl Into<String>) -> Self {
        Self::Qualified {
            ns,
            name: name.into(),
        }
    }

    /// String literal.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Lit(Literal::Str(value.into()))
    }

    /// Signed integer literal.
    pub const fn int(value: i64) -> Self {
        Self::Lit(Literal::Int(value))
    }

    /// Unsigned integer literal.
    pub const fn uint(value: u64) -> Self {
        Self::Lit(Literal::Uint(value))
    }

    /// Float literal.
    pub const fn float(value: f64) -> Self {
        Self::Lit(Literal::Float(value))
    }

    /// Octal file-mode literal.
    pub const fn file_mode(value: u32) -> Self {
        Self::Lit(Literal::FileMode(value))
    }

    /// Duration literal.
    pub const fn duration(value: Duration) -> Self {
        Self::Lit(Literal::Duration(value))
    }

    /// `nil`.
    pub const fn nil() -> Self {
        Self::Lit(Literal::Nil)
    }

    /// `[]string{...}` literal.
    pub fn string_list<S: AsRef<str>>(items: &[S]) -> Self {
        Self::List {
            elem: TypeExpr::string(),
            items: items.iter().map(|s| Self::str(s.as_ref())).collect(),
        }
    }

    /// `map[string]string{...}` literal from already sorted pairs.
    pub fn string_map<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        Self::Map {
            key: TypeExpr::string(),
            value: TypeExpr::string(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (Self::str(k.as_str()), Self::str(v.as_str())))
                .collect(),
        }
    }

    /// `!operand`.
    #[must_use]
    pub fn not(operand: Self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    /// `lhs op rhs`.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Whether the node nests further structure (calls, literals of
    /// composite type, or argument groups).
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Call { .. } | Self::List { .. } | Self::Map { .. } | Self::Group(_)
        )
    }

    /// Adds every namespace referenced by this expression to `out`.
    pub fn collect_namespaces(&self, out: &mut BTreeSet<Namespace>) {
        match self {
            Self::Call { target, args, .. } => {
                match target {
                    Target::Bare => {}
                    Target::Package(ns) => {
                        let _ = out.insert(*ns);
                    }
                    Target::Receiver(receiver) => receiver.collect_namespaces(out),
                }
                for arg in args {
                    arg.collect_namespaces(out);
                }
            }
            Self::Qualified { ns, .. } => {
                let _ = out.insert(*ns);
            }
            Self::Lit(Literal::Duration(d)) if !d.is_zero() => {
                let _ = out.insert(Namespace::Time);
            }
            Self::Ident(_) | Self::Lit(_) => {}
            Self::List { elem, items } => {
                elem.collect_namespaces(out);
                for item in items {
                    item.collect_namespaces(out);
                }
            }
            Self::Map {
                key,
                value,
                entries,
            } => {
                key.collect_namespaces(out);
                value.collect_namespaces(out);
                for (k, v) in entries {
                    k.collect_namespaces(out);
                    v.collect_namespaces(out);
                }
            }
            Self::Group(items) => {
                for item in items {
                    item.collect_namespaces(out);
                }
            }
            Self::Type(ty) => ty.collect_namespaces(out),
            Self::Unary { operand, .. } => operand.collect_namespaces(out),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_namespaces(out);
                rhs.collect_namespaces(out);
            }
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement.
    Expr(Expr),
    /// Short variable declaration: `a, b := value`.
    Define {
        /// Declared names.
        names: Vec<String>,
        /// Initializer.
        value: Expr,
    },
    /// `return [value]`.
    Return(Option<Expr>),
    /// `if [init;] cond { then }`.
    If {
        /// Optional init statement.
        init: Option<Box<Stmt>>,
        /// Condition.
        cond: Expr,
        /// Body.
        then: Vec<Stmt>,
    },
    /// `go func() { body }()`.
    Go(Vec<Stmt>),
    /// `defer func() { body }()`.
    Defer(Vec<Stmt>),
    /// `defer call`.
    DeferCall(Expr),
    /// An empty separator line.
    Blank,
}

impl Stmt {
    /// `name := value`.
    pub fn define(name: impl Into<String>, value: Expr) -> Self {
        Self::Define {
            names: vec![name.into()],
            value,
        }
    }

    fn collect_namespaces(&self, out: &mut BTreeSet<Namespace>) {
        match self {
            Self::Expr(expr) | Self::Define { value: expr, .. } | Self::DeferCall(expr) => {
                expr.collect_namespaces(out);
            }
            Self::Return(value) => {
                if let Some(expr) = value {
                    expr.collect_namespaces(out);
                }
            }
            Self::If { init, cond, then } => {
                if let Some(stmt) = init {
                    stmt.collect_namespaces(out);
                }
                cond.collect_namespaces(out);
                for stmt in then {
                    stmt.collect_namespaces(out);
                }
            }
            Self::Go(body) | Self::Defer(body) => {
                for stmt in body {
                    stmt.collect_namespaces(out);
                }
            }
            Self::Blank => {}
        }
    }
}

/// A top-level function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// Doc comment lines, without the `//` prefix.
    pub doc: Vec<String>,
    /// Function name.
    pub name: String,
    /// Result types.
    pub results: Vec<TypeExpr>,
    /// Body statements.
    pub body: Vec<Stmt>,
}

impl FuncDecl {
    /// Creates a parameterless function.
    pub fn new(name: impl Into<String>, results: Vec<TypeExpr>, body: Vec<Stmt>) -> Self {
        Self {
            doc: Vec::new(),
            name: name.into(),
            results,
            body,
        }
    }

    /// Attaches a one-line doc comment.
    #[must_use]
    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Leading comment lines, without the `//` prefix.
    pub header: Vec<String>,
    /// Package clause.
    pub package: String,
    /// Functions in output order.
    pub funcs: Vec<FuncDecl>,
}

impl File {
    /// Returns every namespace the file references, in registry order.
    #[must_use]
    pub fn namespaces(&self) -> BTreeSet<Namespace> {
        let mut out = BTreeSet::new();
        for func in &self.funcs {
            for ty in &func.results {
                ty.collect_namespaces(&mut out);
            }
            for stmt in &func.body {
                stmt.collect_namespaces(&mut out);
            }
        }
        out
    }
}
