#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn LogLevel___ordering___warn_less_than_error() {
    assert!(LogLevel::Warn < LogLevel::Error);
    assert!(LogLevel::Error < LogLevel::Off);
}

#[test_case(0, LogLevel::Warn)]
#[test_case(1, LogLevel::Info)]
#[test_case(2, LogLevel::Debug)]
#[test_case(9, LogLevel::Trace)]
fn LogLevel___from_verbosity___maps_count(count: u8, expected: LogLevel) {
    assert_eq!(LogLevel::from_verbosity(count), expected);
}

#[test]
fn LogLevel___display___uppercase() {
    assert_eq!(LogLevel::Warn.to_string(), "WARN");
}
