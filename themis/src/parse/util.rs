//! Utility to make parsing easier.

use nom::{error::ErrorKind, error_position, Err as NomError, IResult};
use regex::Regex;

/// Tries to capture the given regex.
///
/// The leftmost match is returned. The input is consumed to the end of the
/// match.
///
/// # Skipped content
///
/// The way regular expressions work it is possible that this parser skipps
/// significant content. It is recommended to start regexes with '^' to prevent
/// this.
pub fn parse_regex(re: &'static Regex) -> impl Fn(&str) -> IResult<&str, &str> {
    move |i: &str| {
        if let Some(found) = re.find(i) {
            let captured = found.as_str();
            let end = found.end();

            Ok((&i[end..], captured))
        } else {
            Err(NomError::Error(error_position!(
                i,
                ErrorKind::RegexpCapture
            )))
        }
    }
}

/// Cuts `margin` characters from both ends of the input.
#[inline]
pub fn unwrap_str(i: &str, margin: usize) -> &str {
    &i[margin..i.len() - margin]
}
