mod device;
/// Runs tests against a device running `PtpClass` in camera emulation mode, using libusb.
///
/// This is a `harness = false` test because the Rust test runner is not well suited for tests
/// that depend on hardware and cannot run in parallel. Without a device attached it reports so
/// and exits successfully.
mod tests;

use crate::device::open_device;
use crate::tests::{get_tests, TestFn};
use rusb::Context;
use std::io::prelude::*;
use std::io::stdout;
use std::panic;

fn main() {
    let tests = get_tests();
    run_tests(&tests[..]);
}

fn run_tests(tests: &[(&str, TestFn)]) {
    println!("hil_host starting");
    println!("looking for device...");

    let ctx = match Context::new() {
        Ok(ctx) => ctx,
        Err(err) => {
            println!("libusb unavailable ({}), skipping", err);
            return;
        }
    };

    let mut dev = match open_device(&ctx) {
        Ok(dev) => dev,
        Err(err) => {
            println!("device not found ({}), skipping", err);
            return;
        }
    };

    println!("\nrunning {} tests", tests.len());

    let mut success = 0;
    for (name, test) in tests {
        print!("test {} ... ", name);
        let _ = stdout().flush();

        let mut out = String::new();

        let res = {
            let hook = panic::take_hook();
            panic::set_hook(Box::new(|_| {}));
            let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                test(&mut dev, &mut out);
            }));
            panic::set_hook(hook);

            res
        };

        if let Err(err) = res {
            let err = if let Some(err) = err.downcast_ref::<&'static str>() {
                String::from(*err)
            } else if let Some(err) = err.downcast_ref::<String>() {
                err.clone()
            } else {
                String::from("???")
            };

            println!("FAILED\nerror: {}\n", err);
        } else {
            println!("ok");

            if !out.is_empty() {
                print!("{}", out);
            }

            success += 1;
        }
    }

    println!("{} failed, {} succeeded", tests.len() - success, success);

    if success == tests.len() {
        println!("\nALL TESTS PASSED!");
    } else {
        std::process::exit(1);
    }
}
