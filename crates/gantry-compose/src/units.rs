//! Parsers for the compact value syntaxes of descriptors, built on `nom`.
//!
//! - durations such as `1m30s`, `500ms`, `2h`;
//! - byte sizes such as `512m`, `1.5gb`, `1024`;
//! - short port specs such as `127.0.0.1:8080:80/udp` or `9000-9001:80-81`.

use std::time::Duration;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize, value},
    multi::many1,
    sequence::{pair, preceded},
};
use thiserror::Error;

use crate::model::PortConfig;

/// Failure to parse a compact value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The duration string is malformed.
    #[error("invalid duration: {0:?}")]
    Duration(String),
    /// The byte-size string is malformed.
    #[error("invalid byte size: {0:?}")]
    Bytes(String),
    /// The port spec is malformed.
    #[error("invalid port spec: {0:?}")]
    Port(String),
}

fn decimal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(digit1, opt(preceded(char('.'), digit1)))),
        str::parse::<f64>,
    )
    .parse(input)
}

/// Duration unit scale in nanoseconds. Longest suffixes first so `ms`
/// is not read as `m`.
fn duration_unit(input: &str) -> IResult<&str, f64> {
    alt((
        value(1.0, tag("ns")),
        value(1_000.0, tag("us")),
        value(1_000.0, tag("µs")),
        value(1_000_000.0, tag("ms")),
        value(1_000_000_000.0, tag("s")),
        value(60_000_000_000.0, tag("m")),
        value(3_600_000_000_000.0, tag("h")),
    ))
    .parse(input)
}

fn duration_components(input: &str) -> IResult<&str, Vec<(f64, f64)>> {
    many1(pair(decimal, duration_unit)).parse(input)
}

/// Parses a Go-style duration string (`1h2m3.5s`, `250ms`, `0`).
///
/// # Errors
///
/// Returns [`UnitError::Duration`] if the string is not a valid duration.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_duration(input: &str) -> Result<Duration, UnitError> {
    let trimmed = input.trim();
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }
    let (_, parts) = all_consuming(duration_components)
        .parse(trimmed)
        .map_err(|_| UnitError::Duration(input.to_string()))?;
    let nanos: f64 = parts.iter().map(|(n, scale)| n * scale).sum();
    Ok(Duration::from_nanos(nanos.round() as u64))
}

fn byte_unit(input: &str) -> IResult<&str, i64> {
    alt((
        value(1_i64 << 30, alt((tag_no_case("gb"), tag_no_case("g")))),
        value(1_i64 << 20, alt((tag_no_case("mb"), tag_no_case("m")))),
        value(1_i64 << 10, alt((tag_no_case("kb"), tag_no_case("k")))),
        value(1_i64, tag_no_case("b")),
    ))
    .parse(input)
}

/// Parses a byte size (`512m`, `1.5g`, `2048`, `-1`). Units are binary.
///
/// # Errors
///
/// Returns [`UnitError::Bytes`] if the string is not a valid size.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn parse_bytes(input: &str) -> Result<i64, UnitError> {
    let trimmed = input.trim();
    if trimmed == "-1" {
        return Ok(-1);
    }
    let (_, (amount, unit)) = all_consuming(pair(decimal, opt(byte_unit)))
        .parse(trimmed)
        .map_err(|_| UnitError::Bytes(input.to_string()))?;
    Ok((amount * unit.unwrap_or(1) as f64).round() as i64)
}

/// A port in `0..=65535`; anything larger fails the parse.
fn port_number(input: &str) -> IResult<&str, u16> {
    map_res(digit1, str::parse::<u16>).parse(input)
}

fn port_range(input: &str) -> IResult<&str, (u16, Option<u16>)> {
    pair(port_number, opt(preceded(char('-'), port_number))).parse(input)
}

fn parse_range(text: &str, original: &str) -> Result<(u16, u16), UnitError> {
    let (_, (start, end)) = all_consuming(port_range)
        .parse(text)
        .map_err(|_| UnitError::Port(original.to_string()))?;
    let end = end.unwrap_or(start);
    if end < start {
        return Err(UnitError::Port(original.to_string()));
    }
    Ok((start, end))
}

/// Splits `[ip:][published:]target` into its parts, honouring a bracketed
/// IPv6 host address.
fn split_host_parts(spec: &str) -> (Option<&str>, Option<&str>, &str) {
    if let Some(rest) = spec.strip_prefix('[') {
        if let Some((ip, tail)) = rest.split_once("]:") {
            return match tail.split_once(':') {
                Some((published, target)) => (Some(ip), Some(published), target),
                None => (Some(ip), None, tail),
            };
        }
    }
    let parts: Vec<&str> = spec.rsplitn(3, ':').collect();
    match parts.as_slice() {
        [target] => (None, None, target),
        [target, published] => (None, Some(published), target),
        [target, published, ip] => (Some(ip), Some(published), target),
        _ => (None, None, spec),
    }
}

/// Expands a short-syntax port spec into one [`PortConfig`] per container port.
///
/// A container port range paired with a host range of the same length maps
/// port by port; a host range against a single container port is kept
/// verbatim for the engine to choose from.
///
/// # Errors
///
/// Returns [`UnitError::Port`] if the spec is malformed or the ranges do
/// not line up.
pub fn parse_port_spec(spec: &str) -> Result<Vec<PortConfig>, UnitError> {
    let trimmed = spec.trim();
    let (address, protocol) = match trimmed.split_once('/') {
        Some((addr, proto)) => (addr, Some(proto.to_string())),
        None => (trimmed, None),
    };
    let (host_ip, published, target) = split_host_parts(address);
    let host_ip = host_ip.filter(|ip| !ip.is_empty()).map(str::to_string);
    let published = published.filter(|p| !p.is_empty());

    let (target_start, target_end) = parse_range(target, spec)?;
    let target_len = target_end - target_start;

    let published_ports: Vec<Option<String>> = match published {
        None => vec![None; usize::from(target_len) + 1],
        Some(text) => {
            let (pub_start, pub_end) = parse_range(text, spec)?;
            if target_len == 0 {
                vec![Some(text.to_string())]
            } else if pub_end - pub_start == target_len {
                (pub_start..=pub_end).map(|p| Some(p.to_string())).collect()
            } else {
                return Err(UnitError::Port(spec.to_string()));
            }
        }
    };

    Ok((target_start..=target_end)
        .zip(published_ports)
        .map(|(target, published)| PortConfig {
            target,
            published,
            protocol: protocol.clone(),
            host_ip: host_ip.clone(),
        })
        .collect())
}
