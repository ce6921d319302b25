//! Structural printer: expression tree → Go source text.
//!
//! Layout decisions are made while walking the tree, from the node kind,
//! its namespace, and the current nesting depth:
//!
//! 1. a chain of two or more calls prints every chained call on its own
//!    line, the dot ending the previous line;
//! 2. a call in a configuration namespace whose arguments nest a composite
//!    node prints one argument per line, down to a fixed depth;
//! 3. a configuration-group call always opens its argument list on a new
//!    line.
//!
//! Argument groups are spliced into the enclosing argument list. Imports are
//! derived from the namespaces the file references.

pub mod canonical;

use std::fmt::Write as _;
use std::time::Duration;

use gantry_common::constants::MAX_ARGUMENT_BREAK_DEPTH;
use gantry_common::error::{GantryError, Result};

use crate::ast::{BinaryOp, Expr, File, FuncDecl, Literal, Stmt, Target, TypeExpr, UnaryOp};
use crate::ident::is_go_identifier;
use crate::namespace::Namespace;

/// Calls whose arguments always start on a new line.
const CONFIG_GROUPS: &[&str] = &[
    "WithConfig",
    "WithHostConfig",
    "WithNetworkingConfig",
    "WithPlatform",
    "NewService",
];

/// Renders a whole file.
///
/// # Errors
///
/// Returns [`GantryError::Render`] for an invalid identifier, a non-finite
/// float, or an argument group outside an argument list.
pub fn render(file: &File, api_module: &str) -> Result<String> {
    let mut printer = Printer::default();
    printer.file(file, api_module)?;
    Ok(printer.out)
}

#[derive(Debug, Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn file(&mut self, file: &File, api_module: &str) -> Result<()> {
        check_ident(&file.package)?;
        for line in &file.header {
            self.comment(line);
        }
        if !file.header.is_empty() {
            self.out.push('\n');
        }
        let _ = writeln!(self.out, "package {}", file.package);

        let namespaces = file.namespaces();
        let (std, builder): (Vec<Namespace>, Vec<Namespace>) =
            namespaces.into_iter().partition(|ns| ns.is_std());
        let groups: Vec<Vec<String>> = [std, builder]
            .into_iter()
            .map(|group| {
                let mut paths: Vec<String> =
                    group.iter().map(|ns| ns.import_path(api_module)).collect();
                paths.sort();
                paths
            })
            .filter(|paths| !paths.is_empty())
            .collect();
        if !groups.is_empty() {
            self.out.push_str("\nimport (\n");
            for (i, paths) in groups.iter().enumerate() {
                if i > 0 {
                    self.out.push('\n');
                }
                for path in paths {
                    let _ = writeln!(self.out, "\t{}", quote(path));
                }
            }
            self.out.push_str(")\n");
        }

        for func in &file.funcs {
            self.out.push('\n');
            self.func(func)?;
        }
        Ok(())
    }

    fn comment(&mut self, line: &str) {
        if line.is_empty() {
            self.out.push_str("//\n");
        } else {
            let _ = writeln!(self.out, "// {line}");
        }
    }

    fn func(&mut self, func: &FuncDecl) -> Result<()> {
        check_ident(&func.name)?;
        for line in &func.doc {
            self.comment(line);
        }
        let _ = write!(self.out, "func {}()", func.name);
        match func.results.as_slice() {
            [] => {}
            [single] => {
                self.out.push(' ');
                self.type_expr(single)?;
            }
            many => {
                self.out.push_str(" (");
                for (i, ty) in many.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.type_expr(ty)?;
                }
                self.out.push(')');
            }
        }
        self.block(&func.body)?;
        self.out.push('\n');
        Ok(())
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    /// ` { body }`, the closing brace on its own line.
    fn block(&mut self, body: &[Stmt]) -> Result<()> {
        self.out.push_str(" {");
        self.indent += 1;
        for stmt in body {
            if matches!(stmt, Stmt::Blank) {
                self.out.push('\n');
                continue;
            }
            self.newline();
            self.stmt(stmt)?;
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => self.expr(expr, 0),
            Stmt::Define { names, value } => {
                for (i, name) in names.iter().enumerate() {
                    check_ident(name)?;
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(name);
                }
                self.out.push_str(" := ");
                self.expr(value, 0)
            }
            Stmt::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value, 0)?;
                }
                Ok(())
            }
            Stmt::If { init, cond, then } => {
                self.out.push_str("if ");
                if let Some(init) = init {
                    self.stmt(init)?;
                    self.out.push_str("; ");
                }
                self.expr(cond, 0)?;
                self.block(then)
            }
            Stmt::Go(body) => {
                self.out.push_str("go func()");
                self.block(body)?;
                self.out.push_str("()");
                Ok(())
            }
            Stmt::Defer(body) => {
                self.out.push_str("defer func()");
                self.block(body)?;
                self.out.push_str("()");
                Ok(())
            }
            Stmt::DeferCall(call) => {
                self.out.push_str("defer ");
                self.expr(call, 0)
            }
            Stmt::Blank => Ok(()),
        }
    }

    fn expr(&mut self, expr: &Expr, depth: usize) -> Result<()> {
        match expr {
            Expr::Call { .. } => self.call(expr, depth),
            Expr::Ident(name) => {
                check_ident(name)?;
                self.out.push_str(name);
                Ok(())
            }
            Expr::Qualified { ns, name } => {
                check_ident(name)?;
                let _ = write!(self.out, "{ns}.{name}");
                Ok(())
            }
            Expr::Lit(lit) => self.literal(lit),
            Expr::List { elem, items } => {
                self.out.push_str("[]");
                self.type_expr(elem)?;
                self.out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(item, depth + 1)?;
                }
                self.out.push('}');
                Ok(())
            }
            Expr::Map {
                key,
                value,
                entries,
            } => {
                self.out.push_str("map[");
                self.type_expr(key)?;
                self.out.push(']');
                self.type_expr(value)?;
                self.out.push('{');
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(k, depth + 1)?;
                    self.out.push_str(": ");
                    self.expr(v, depth + 1)?;
                }
                self.out.push('}');
                Ok(())
            }
            Expr::Group(_) => Err(GantryError::render(
                "argument group used outside an argument list",
            )),
            Expr::Type(ty) => self.type_expr(ty),
            Expr::Unary { op, operand } => {
                self.out.push_str(match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Recv => "<-",
                });
                self.operand(operand, u8::MAX, depth)
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = precedence(*op);
                self.operand(lhs, prec, depth)?;
                let _ = write!(
                    self.out,
                    " {} ",
                    match op {
                        BinaryOp::And => "&&",
                        BinaryOp::NotEq => "!=",
                    }
                );
                self.operand(rhs, prec, depth)
            }
        }
    }

    /// Prints an operand, parenthesized when it binds looser than `min`.
    fn operand(&mut self, expr: &Expr, min: u8, depth: usize) -> Result<()> {
        let needs_parens = matches!(expr, Expr::Binary { op, .. } if precedence(*op) < min);
        if needs_parens {
            self.out.push('(');
        }
        self.expr(expr, depth)?;
        if needs_parens {
            self.out.push(')');
        }
        Ok(())
    }

    fn call(&mut self, expr: &Expr, depth: usize) -> Result<()> {
        // Unwind receiver-call chains, outermost link first.
        let mut links: Vec<(&str, &[Expr])> = Vec::new();
        let mut head = expr;
        while let Expr::Call {
            target: Target::Receiver(receiver),
            name,
            args,
        } = head
        {
            if !matches!(**receiver, Expr::Call { .. }) {
                break;
            }
            links.push((name.as_str(), args.as_slice()));
            head = receiver.as_ref();
        }

        let Expr::Call { target, name, args } = head else {
            return self.expr(head, depth);
        };
        check_ident(name)?;
        let ns = match target {
            Target::Bare => None,
            Target::Package(ns) => {
                let _ = write!(self.out, "{ns}.");
                Some(*ns)
            }
            Target::Receiver(receiver) => {
                self.expr(receiver, depth)?;
                self.out.push('.');
                None
            }
        };
        self.out.push_str(name);
        self.args(name, ns, args, depth)?;

        if links.is_empty() {
            return Ok(());
        }
        self.indent += 1;
        for (name, args) in links.into_iter().rev() {
            check_ident(name)?;
            self.out.push('.');
            self.newline();
            self.out.push_str(name);
            self.args(name, None, args, depth)?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn args(
        &mut self,
        name: &str,
        ns: Option<Namespace>,
        args: &[Expr],
        depth: usize,
    ) -> Result<()> {
        let mut flat = Vec::with_capacity(args.len());
        splice(args, &mut flat);

        let break_lines = if CONFIG_GROUPS.contains(&name) {
            !flat.is_empty()
        } else {
            ns.is_some_and(Namespace::is_config)
                && depth <= MAX_ARGUMENT_BREAK_DEPTH
                && flat.iter().any(|arg| arg.is_composite())
        };

        self.out.push('(');
        if break_lines {
            self.indent += 1;
            for arg in flat {
                self.newline();
                self.expr(arg, depth + 1)?;
                self.out.push(',');
            }
            self.indent -= 1;
            self.newline();
        } else {
            for (i, arg) in flat.into_iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.expr(arg, depth + 1)?;
            }
        }
        self.out.push(')');
        Ok(())
    }

    fn literal(&mut self, lit: &Literal) -> Result<()> {
        match lit {
            Literal::Str(s) => self.out.push_str(&quote(s)),
            Literal::Int(v) => {
                let _ = write!(self.out, "{v}");
            }
            Literal::Uint(v) => {
                let _ = write!(self.out, "{v}");
            }
            Literal::Float(v) => {
                if !v.is_finite() {
                    return Err(GantryError::render(format!("non-finite float {v}")));
                }
                let _ = write!(self.out, "{v:?}");
            }
            Literal::Bool(v) => {
                let _ = write!(self.out, "{v}");
            }
            Literal::FileMode(mode) => {
                if *mode == 0 {
                    self.out.push('0');
                } else {
                    let _ = write!(self.out, "0{mode:o}");
                }
            }
            Literal::Duration(d) => self.out.push_str(&duration(*d)),
            Literal::Nil => self.out.push_str("nil"),
        }
        Ok(())
    }

    fn type_expr(&mut self, ty: &TypeExpr) -> Result<()> {
        match ty {
            TypeExpr::Named(name) => {
                check_ident(name)?;
                self.out.push_str(name);
            }
            TypeExpr::Qualified(ns, name) => {
                check_ident(name)?;
                let _ = write!(self.out, "{ns}.{name}");
            }
            TypeExpr::Pointer(inner) => {
                self.out.push('*');
                self.type_expr(inner)?;
            }
            TypeExpr::Slice(inner) => {
                self.out.push_str("[]");
                self.type_expr(inner)?;
            }
            TypeExpr::Map(key, value) => {
                self.out.push_str("map[");
                self.type_expr(key)?;
                self.out.push(']');
                self.type_expr(value)?;
            }
            TypeExpr::Chan(inner) => {
                self.out.push_str("chan ");
                self.type_expr(inner)?;
            }
        }
        Ok(())
    }
}

/// Flattens argument groups, recursively, into `out`.
fn splice<'a>(args: &'a [Expr], out: &mut Vec<&'a Expr>) {
    for arg in args {
        match arg {
            Expr::Group(items) => splice(items, out),
            other => out.push(other),
        }
    }
}

const fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::And => 2,
        BinaryOp::NotEq => 3,
    }
}

fn check_ident(name: &str) -> Result<()> {
    if is_go_identifier(name) {
        Ok(())
    } else {
        Err(GantryError::render(format!("invalid identifier {name:?}")))
    }
}

/// Quotes a string as a Go interpreted string literal.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let code = u32::from(c);
                if code < 0x100 {
                    let _ = write!(out, "\\x{code:02x}");
                } else {
                    let _ = write!(out, "\\u{code:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Prints a duration as a multiple of the largest `time` unit that divides
/// it exactly.
fn duration(d: Duration) -> String {
    const UNITS: [(u128, &str); 6] = [
        (3_600_000_000_000, "Hour"),
        (60_000_000_000, "Minute"),
        (1_000_000_000, "Second"),
        (1_000_000, "Millisecond"),
        (1_000, "Microsecond"),
        (1, "Nanosecond"),
    ];
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0".to_string();
    }
    let (size, unit) = UNITS
        .iter()
        .copied()
        .find(|(size, _)| nanos % size == 0)
        .unwrap_or((1, "Nanosecond"));
    match nanos / size {
        1 => format!("time.{unit}"),
        n => format!("{n} * time.{unit}"),
    }
}
