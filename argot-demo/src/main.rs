use std::process::ExitCode;

use anyhow::Context;
use argot::{ArgParser, ArgumentType, ParseStatus, Parsed, Storage};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// A label of at most `threshold` bytes
#[derive(Debug)]
struct Label {
    threshold: usize,
}

impl Default for Label {
    fn default() -> Self {
        Self { threshold: 1 }
    }
}

impl ArgumentType for Label {
    type Value = String;
    const PLACEHOLDER: &'static str = "label";

    fn parse_and_save(&self, token: &str, storage: &mut Storage<'_, String>) -> ParseStatus {
        if token.len() > self.threshold {
            return ParseStatus::NotParsed;
        }

        storage.save(token.to_owned());
        ParseStatus::Success
    }

    fn display_value(&self, value: &String) -> Option<String> {
        Some(value.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Sum,
    Product,
}

fn combine(numbers: &[i32], operation: Operation) -> anyhow::Result<i64> {
    let total = match operation {
        Operation::Sum => numbers
            .iter()
            .try_fold(0i64, |total, &number| total.checked_add(number.into())),
        Operation::Product => numbers
            .iter()
            .try_fold(1i64, |total, &number| total.checked_mul(number.into())),
    };

    total.context("the result doesn't fit in a 64-bit integer")
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut numbers: Vec<i32> = Vec::new();
    let mut sum = false;

    let report = {
        let mut parser = ArgParser::new("argot-demo");
        parser.add_help('h', "help", "Add or multiply a list of integers");
        parser
            .add_int_argument("numbers")
            .description("The integers to combine")
            .multi_value(1)
            .positional()
            .redirect_sequence_to(&mut numbers);
        parser
            .add_flag("sum")
            .nickname('s')
            .description("Add the numbers")
            .redirect_to(&mut sum);
        parser
            .add_flag("mult")
            .nickname('m')
            .description("Multiply the numbers");
        parser
            .add_argument::<Parsed<f64>>("scale", true)
            .description("Scale the result by this factor")
            .default_value(1.0);
        parser
            .add_argument::<Label>("label", true)
            .nickname('l')
            .description("A short label to print before the result")
            .configure(|label| label.threshold = 8)
            .default_value(String::from("result"));

        if !parser.parse_env() {
            let error = parser
                .error()
                .cloned()
                .context("parse failed without an error")?;

            eprintln!("{error}\n");
            eprint!("{}", parser.help_description());
            return Ok(ExitCode::FAILURE);
        }

        if parser.help() {
            print!("{}", parser.help_description());
            return Ok(ExitCode::SUCCESS);
        }

        let multiply = parser.get_value::<bool>("mult").unwrap_or(false);
        let scale = parser.get_value::<f64>("scale").unwrap_or(1.0);
        let label = parser.get_value::<String>("label").unwrap_or_default();

        debug!(multiply, scale, label = label.as_str(), "parsed");
        (multiply, scale, label)
    };

    let (multiply, scale, label) = report;

    let total = match (sum, multiply) {
        (true, false) => combine(&numbers, Operation::Sum)?,
        (false, true) => combine(&numbers, Operation::Product)?,
        _ => anyhow::bail!("exactly one of --sum or --mult is required"),
    };

    println!("{label}: {}", total as f64 * scale);
    Ok(ExitCode::SUCCESS)
}
