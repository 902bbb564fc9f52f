#![allow(clippy::expect_used)]

mod actions_test;
mod bot_test;
mod classifier_test;
#[allow(dead_code)]
mod support;
mod suppression_test;
mod watchdog_test;
