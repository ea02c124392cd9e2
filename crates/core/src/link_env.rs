// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-link-style environment variable encoding, bit-exact with the
//! upstream convention so linked containers keep working across discovery
//! round-trips.
//!
//! For a link with `alias`, `local_port`, and `remote_port`, four variables
//! are emitted, keyed off `{ALIAS}_PORT_{local_port}_{PROTO}`. Decoding must
//! invert this exactly: only the `_PORT`-suffixed line carries enough
//! information (both ports and the alias) to reconstruct a `Link`. The bare
//! base-URL line is redundant with it and is dropped; the `_ADDR`/`_PROTO`
//! lines are not recognized at all and survive as ordinary user
//! environment, per the encoding's own "anything else" rule.

use crate::application::Link;

const PROTOCOL: &str = "tcp";

fn env_alias(alias: &str) -> String {
    alias.to_uppercase().replace('-', "_")
}

fn base_name(alias: &str, local_port: u16) -> String {
    format!("{}_PORT_{}_{}", env_alias(alias), local_port, PROTOCOL.to_uppercase())
}

/// The four environment variables a starting container sees for one link.
pub fn encode_link(link: &Link, hostname: &str) -> Vec<(String, String)> {
    let base = base_name(&link.alias, link.local_port);
    vec![
        (base.clone(), format!("{PROTOCOL}://{hostname}:{}", link.remote_port)),
        (format!("{base}_ADDR"), hostname.to_string()),
        (format!("{base}_PORT"), link.remote_port.to_string()),
        (format!("{base}_PROTO"), PROTOCOL.to_string()),
    ]
}

/// The `_ADDR`/`_PROTO` variable names `encode_link` produces for `link`,
/// i.e. the two lines that now survive `decode_environment` untouched.
/// Restart-detection uses this to recognize and discount them: they are
/// fully determined by the application's own declared `links`, so their
/// presence in a discovered unit's environment must not by itself count as
/// spec drift against a desired copy that never baked them in.
pub fn derived_env_keys(link: &Link) -> [String; 2] {
    let base = base_name(&link.alias, link.local_port);
    [format!("{base}_ADDR"), format!("{base}_PROTO")]
}

enum Suffix {
    Port,
    Addr,
    Proto,
    None,
}

fn strip_link_suffix(key: &str) -> (&str, Suffix) {
    if let Some(base) = key.strip_suffix("_ADDR") {
        return (base, Suffix::Addr);
    }
    if let Some(base) = key.strip_suffix("_PROTO") {
        return (base, Suffix::Proto);
    }
    if let Some(base) = key.strip_suffix("_PORT") {
        return (base, Suffix::Port);
    }
    (key, Suffix::None)
}

/// Recognize `"{ALIAS}_PORT_{local_port}_{PROTO}"` and return `(alias, local_port)`.
fn parse_base(base: &str) -> Option<(String, u16)> {
    let parts: Vec<&str> = base.rsplitn(4, '_').collect();
    let [proto, port, port_literal, alias] = parts.as_slice() else {
        return None;
    };
    if !proto.eq_ignore_ascii_case(PROTOCOL) || *port_literal != "PORT" {
        return None;
    }
    let local_port: u16 = port.parse().ok()?;
    Some((alias.to_string(), local_port))
}

enum ParsedVar {
    Link(Link),
    BaseUrl,
}

/// Classify one environment line. `_ADDR`/`_PROTO` lines are never
/// recognized here — per the encoding's final rule they always fall into
/// the "anything else" bucket and survive verbatim as user environment,
/// even though they were produced alongside a real link. Only the bare
/// `_PORT_{port}_TCP` base-URL line and the `_PORT_{port}_TCP_PORT` line
/// are link-shaped: the former is redundant with the latter and is
/// dropped without surviving; the latter is the one line that carries
/// enough information (alias, both ports) to reconstruct a `Link`.
fn parse_link_var(key: &str, value: &str) -> Option<ParsedVar> {
    let (base, suffix) = strip_link_suffix(key);
    match suffix {
        Suffix::Addr | Suffix::Proto => None,
        Suffix::Port => {
            let (alias, local_port) = parse_base(base)?;
            let remote_port: u16 = value.parse().ok()?;
            Some(ParsedVar::Link(Link { alias, local_port, remote_port }))
        }
        Suffix::None => {
            parse_base(base)?;
            Some(ParsedVar::BaseUrl)
        }
    }
}

/// Decode a unit's full environment, splitting out link variables from the
/// user-supplied ones.
///
/// Anything that doesn't match the link pattern passes through unchanged as
/// user environment — including the `_ADDR`/`_PROTO` lines a starting
/// container also saw, which the encoding side always emits alongside a
/// recognized link but which carry no information decoding needs, so they
/// are retained verbatim rather than reconstructed into anything. Only the
/// redundant base-URL line is dropped outright, and exactly one `Link` is
/// emitted per recognized group.
pub fn decode_environment(env: &[(String, String)]) -> (Vec<Link>, Vec<(String, String)>) {
    let mut links = Vec::new();
    let mut surviving = Vec::new();

    for (key, value) in env {
        match parse_link_var(key, value) {
            Some(ParsedVar::Link(link)) => links.push(link),
            Some(ParsedVar::BaseUrl) => {}
            None => surviving.push((key.clone(), value.clone())),
        }
    }

    (links, surviving)
}

#[cfg(test)]
#[path = "link_env_tests.rs"]
mod tests;
