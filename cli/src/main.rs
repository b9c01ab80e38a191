mod json;

use std::io::{BufRead, BufReader, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tales::{Context, Engine, Error, ExecutionOptions, Position, Value, render_error};
use tracing::debug;

use json::{Repeat, Root};

/// TALES - evaluate template expressions from the command line
#[derive(Parser, Debug)]
#[command(name = "tales")]
#[command(about = "Evaluate TALES expressions", long_about = None)]
struct Args {
    /// Root variable as NAME=JSON (plain text if not valid JSON); repeatable
    #[arg(long = "root", value_name = "NAME=JSON")]
    roots: Vec<Root>,

    /// Evaluate every expression once per item of NAME=EXPRESSION
    #[arg(long, value_name = "NAME=EXPRESSION")]
    repeat: Option<Repeat>,

    /// Maximum nesting depth of evaluation
    #[arg(long, default_value_t = ExecutionOptions::default().max_depth)]
    max_depth: usize,

    /// Expressions to evaluate (if not provided, reads from stdin)
    expressions: Vec<String>,
}

/// Evaluate one expression and print its text; returns whether it succeeded.
fn interpret_input(context: &Context, input: &str) -> bool {
    let result = context
        .evaluate_text(input)
        .and_then(|value| match value {
            Value::Null | Value::Default => Ok(String::new()),
            other => other.to_text().map(|text| text.to_string()),
        });
    match result {
        Ok(text) => {
            println!("{text}");
            true
        }
        Err(e) => {
            render_error(&Error::evaluation(context, input, e));
            false
        }
    }
}

/// Evaluate all `expressions`, once per item of `repeat` if given.
fn run_batch(context: &Context, repeat: Option<&Repeat>, expressions: &[String]) -> bool {
    let Some(repeat) = repeat else {
        return expressions
            .iter()
            .fold(true, |ok, expr| interpret_input(context, expr) && ok);
    };

    context.begin_scope();
    let iterator = match context.set_repeat(repeat.name.clone(), repeat.expression.as_str()) {
        Ok(iterator) => iterator,
        Err(e) => {
            render_error(&Error::evaluation(context, &repeat.expression, e));
            close_scope(context);
            return false;
        }
    };
    let mut ok = true;
    loop {
        match iterator.borrow_mut().advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                render_error(&Error::evaluation(context, &repeat.expression, e));
                ok = false;
                break;
            }
        }
        for expr in expressions {
            ok &= interpret_input(context, expr);
        }
    }
    close_scope(context);
    ok
}

fn close_scope(context: &Context) {
    if let Err(e) = context.end_scope() {
        debug!(error = %e, "unbalanced scope");
    }
}

/// Handle a REPL line: `:let NAME EXPRESSION` binds a global, anything else
/// is evaluated.
fn interpret_line(context: &Context, line: &str) -> bool {
    let Some(binding) = line.strip_prefix(":let ") else {
        return interpret_input(context, line);
    };
    let Some((name, expr)) = binding.trim_start().split_once(' ') else {
        eprintln!("usage: :let NAME EXPRESSION");
        return false;
    };
    match context.evaluate(expr) {
        Ok(value) => {
            context.set_global(name, value);
            true
        }
        Err(e) => {
            render_error(&Error::evaluation(context, expr, e));
            false
        }
    }
}

fn run_repl(context: &Context) -> bool {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("tales".to_string()),
        DefaultPromptSegment::Empty,
    );

    println!("TALES REPL - type expressions to evaluate, :let NAME EXPRESSION to bind (Ctrl+D to exit)");

    loop {
        let sig = match line_editor.read_line(&prompt) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Reedline error: {e}");
                return false;
            }
        };
        match sig {
            Signal::Success(buffer) => {
                interpret_line(context, buffer.trim());
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nGoodbye!");
                return true;
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // Use TALES_LOG or RUST_LOG to control the log level; default to WARN.
    let filter = EnvFilter::try_from_env("TALES_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let engine = Arc::new(Engine::with_standard_types());
    let context = engine
        .context()
        .roots(
            args.roots
                .iter()
                .map(|root| (root.name.clone(), json::to_value(&root.value))),
        )
        .execution_options(ExecutionOptions {
            max_depth: args.max_depth,
        })
        .build();

    let ok = if !args.expressions.is_empty() {
        run_batch(&context, args.repeat.as_ref(), &args.expressions)
    } else if std::io::stdin().is_terminal() {
        run_repl(&context)
    } else {
        // Pipe mode: one expression per line.
        context.set_source_file(Some("<stdin>".into()));
        let reader = BufReader::new(std::io::stdin().lock());
        let mut ok = true;
        let mut expressions = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.into_diagnostic()?;
            if line.trim().is_empty() {
                continue;
            }
            if args.repeat.is_some() {
                expressions.push(line);
                continue;
            }
            context.set_position(Position::new(n + 1, 1));
            ok &= interpret_input(&context, &line);
        }
        if let Some(repeat) = &args.repeat {
            ok &= run_batch(&context, Some(repeat), &expressions);
        }
        ok
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
