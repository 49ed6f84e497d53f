use std::collections::HashMap;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pbg::config::CliConfig;
use pbg::{errors::print_error, evaluate, parse, Field};

/// Parse and evaluate a Prefix Boolean Grammar expression.
#[derive(Debug, Parser)]
#[command(name = "pbg", version, about)]
struct Args {
    /// The expression to evaluate, e.g. "(& TRUE (= [x] 10))".
    expression: String,

    /// Variable bindings as `name=value` pairs, comma-separated. Values are
    /// classified the same way a literal in the expression would be
    /// (so `status='active'` needs the quotes).
    #[arg(long, value_delimiter = ',')]
    vars: Vec<String>,

    /// Print the parsed tree's canonical form to stderr before evaluating.
    #[arg(long)]
    print_canonical: bool,
}

fn main() -> ExitCode {
    let config = CliConfig::load().unwrap_or_default();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(config) {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            // The PbgError case already reported itself via print_error;
            // anything else (a malformed --vars binding) still needs printing.
            if err.downcast_ref::<pbg::PbgError>().is_none() {
                eprintln!("{err:#}");
            }
            ExitCode::from(2)
        }
    }
}

fn run(config: CliConfig) -> Result<bool> {
    let args = Args::parse();
    let dict = parse_vars(&args.vars)?;

    info!(expression = %args.expression, "parsing");
    let mut expr = parse(&args.expression).map_err(|err| {
        print_error(&err);
        anyhow::Error::new(err)
    })?;

    if args.print_canonical || config.print_canonical {
        eprintln!("{}", expr.to_canonical_string());
    }

    debug!(variables = expr.variable_count(), "evaluating");
    let result = evaluate(&mut expr, |name| {
        let name = String::from_utf8_lossy(name);
        dict.get(name.as_ref())
            .cloned()
            .unwrap_or_else(Field::null)
    });

    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            print_error(&err);
            Err(anyhow::Error::new(err))
        }
    }
}

/// Parses `--vars name=value,...` into a dictionary, classifying each value
/// with the same literal grammar an expression's fields use.
fn parse_vars(vars: &[String]) -> Result<HashMap<String, Field>> {
    let mut dict = HashMap::new();
    for binding in vars {
        let (name, value) = binding
            .split_once('=')
            .with_context(|| format!("malformed --vars binding `{binding}` (expected name=value)"))?;
        let field = classify_var_value(value)
            .with_context(|| format!("could not classify value `{value}` for variable `{name}`"))?;
        dict.insert(name.to_string(), field);
    }
    Ok(dict)
}

fn classify_var_value(value: &str) -> Result<Field> {
    use pbg::FieldType;
    let ty = pbg::classifier::classify(value.as_bytes());
    match ty {
        FieldType::True => Ok(Field::boolean(true)),
        FieldType::False => Ok(Field::boolean(false)),
        FieldType::Number => Ok(Field::number(value.parse()?)),
        FieldType::String => Ok(Field::string(&value.as_bytes()[1..value.len() - 1])),
        FieldType::Date => {
            let year: u16 = value[0..4].parse()?;
            let month: u8 = value[5..7].parse()?;
            let day: u8 = value[8..10].parse()?;
            Ok(Field::date(year, month, day))
        }
        other => anyhow::bail!("`{value}` classifies as {other:?}, not a variable-assignable literal"),
    }
}
