//! Runnable entry point: `main` and `run`.
//!
//! `run` brings the project up under a context cancelled by SIGINT or
//! SIGTERM and always tears it down on the way out. Cancellation surfacing
//! from `Up` counts as a clean exit.

use crate::assemble::{PROJECT_FUNC, PROJECT_VAR};
use crate::ast::{BinaryOp, Expr, FuncDecl, Stmt, TypeExpr, UnaryOp};
use crate::namespace::Namespace;

const RUN_FUNC: &str = "run";

/// Returns the `main` and `run` declarations.
pub fn entry_point(profiles: &[String]) -> Vec<FuncDecl> {
    vec![main_func(), run_func(profiles)]
}

fn main_func() -> FuncDecl {
    FuncDecl::new(
        "main",
        vec![],
        vec![if_err(
            Expr::local(RUN_FUNC, vec![]),
            vec![Stmt::Expr(Expr::call(
                Namespace::Log,
                "Fatal",
                vec![Expr::ident("err")],
            ))],
        )],
    )
}

fn run_func(profiles: &[String]) -> FuncDecl {
    let proj = || Expr::ident(PROJECT_VAR);
    let background = || Expr::call(Namespace::Context, "Background", vec![]);
    let lifecycle_options = |mut head: Vec<Expr>| {
        head.push(Expr::call(Namespace::Gantry, "RemoveOrphans", vec![]));
        if !profiles.is_empty() {
            head.push(Expr::call(
                Namespace::Gantry,
                "WithProfiles",
                profiles.iter().map(|p| Expr::str(p.as_str())).collect(),
            ));
        }
        head
    };

    let signals = vec![
        Stmt::define(
            "sig",
            Expr::local(
                "make",
                vec![
                    Expr::Type(TypeExpr::Chan(Box::new(TypeExpr::Qualified(
                        Namespace::Os,
                        "Signal",
                    )))),
                    Expr::int(1),
                ],
            ),
        ),
        Stmt::Expr(Expr::call(
            Namespace::Signal,
            "Notify",
            vec![
                Expr::ident("sig"),
                Expr::qualified(Namespace::Os, "Interrupt"),
                Expr::qualified(Namespace::Syscall, "SIGTERM"),
            ],
        )),
        Stmt::Expr(Expr::Unary {
            op: UnaryOp::Recv,
            operand: Box::new(Expr::ident("sig")),
        }),
        Stmt::Expr(Expr::local("cancel", vec![])),
    ];

    let teardown = vec![if_err(
        Expr::method(proj(), "Down", lifecycle_options(vec![background()])),
        vec![Stmt::Expr(Expr::call(
            Namespace::Log,
            "Printf",
            vec![Expr::str("teardown failed: %v"), Expr::ident("err")],
        ))],
    )];

    let up = Stmt::If {
        init: Some(Box::new(Stmt::define(
            "err",
            Expr::method(
                proj(),
                "Up",
                lifecycle_options(vec![
                    Expr::ident("ctx"),
                    Expr::call(
                        Namespace::Gantry,
                        "WithProgress",
                        vec![Expr::qualified(Namespace::Os, "Stdout")],
                    ),
                ]),
            ),
        ))),
        cond: Expr::binary(
            BinaryOp::And,
            err_not_nil(),
            Expr::not(Expr::call(
                Namespace::Errors,
                "Is",
                vec![
                    Expr::ident("err"),
                    Expr::qualified(Namespace::Context, "Canceled"),
                ],
            )),
        ),
        then: vec![Stmt::Return(Some(Expr::ident("err")))],
    };

    FuncDecl::new(
        RUN_FUNC,
        vec![TypeExpr::Named("error")],
        vec![
            Stmt::Define {
                names: vec!["ctx".into(), "cancel".into()],
                value: Expr::call(Namespace::Context, "WithCancel", vec![background()]),
            },
            Stmt::DeferCall(Expr::local("cancel", vec![])),
            Stmt::Blank,
            Stmt::Go(signals),
            Stmt::Blank,
            Stmt::define(PROJECT_VAR, Expr::local(PROJECT_FUNC, vec![])),
            Stmt::Defer(teardown),
            Stmt::Blank,
            up,
            Stmt::Return(Some(Expr::nil())),
        ],
    )
    .with_doc(format!(
        "{RUN_FUNC} brings the deployment up and tears it down on exit or signal."
    ))
}

/// `if err := call; err != nil { then }`
fn if_err(call: Expr, then: Vec<Stmt>) -> Stmt {
    Stmt::If {
        init: Some(Box::new(Stmt::define("err", call))),
        cond: err_not_nil(),
        then,
    }
}

fn err_not_nil() -> Expr {
    Expr::binary(BinaryOp::NotEq, Expr::ident("err"), Expr::nil())
}
