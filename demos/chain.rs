use std::process::ExitCode;
use std::sync::mpsc;

use argh::FromArgs;
use promise_chain::{Error, Promise};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry};

/// Resolve a promise when the number is 3, reject it otherwise, and watch
/// the outcome travel down a chain of handlers.
#[derive(FromArgs)]
struct Args {
    /// num to be tested for equality with 3
    #[argh(option, default = "3")]
    test_num: i64,
}

fn main() -> ExitCode {
    let mut filter = EnvFilter::from_default_env();
    filter = filter.add_directive(LevelFilter::WARN.into());
    let print = fmt::layer().compact();
    registry().with(filter).with(print).init();

    let Args { test_num } = argh::from_env();
    let (done, finished) = mpsc::channel();

    let promise = Promise::new(move |resolve, reject| {
        println!("{test_num}");
        if test_num == 3 {
            resolve.resolve(test_num);
        } else {
            reject.reject(Error::msg(format!("{test_num} is not equal to 3")));
        }
    })
    .then(
        |data| {
            println!("Current value is: {data}");
            data + 1
        },
        Err,
    )
    .then(
        |data| {
            println!("Current value is: {data}");
            None::<i64>
        },
        Err,
    )
    .catch(|err| {
        println!("I am in catch block");
        println!("{err}");
        Ok(None)
    })
    .finally(move || {
        println!("Finally its over");
        let _ = done.send(());
    });

    let result = promise.await_promise();
    // finally forwards the result before running its callback
    let _ = finished.recv();

    match result {
        Ok(value) => {
            info!(?value, "chain fulfilled");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("chain rejected: {e}");
            ExitCode::FAILURE
        }
    }
}
