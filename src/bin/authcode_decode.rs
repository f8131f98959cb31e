//! §3.1.0 Overview — CLI: decode an authcode token
//! - token from argv, or stdin when the token argument is "-"
//! - key via `pw <key>`/--key, else TTY prompt (empty = embedded default)
//! - invalid, expired, or tampered token → nonzero exit

/* =============================================================================
 * authcode — authcode_decode.rs — Program v3.0.0
 * Numbering: Sections §3.X.0, Subsections §3.X.Y (code-only labels)
 * =============================================================================
 */

// ============================================================================
// §3.2.0 Imports
// ============================================================================
use anyhow::{Context, Result};
use std::io::{Read, Write};

// ============================================================================
// §3.3.0 main: CLI Decode Flow
// ============================================================================
fn main() -> Result<()> {
    /* §3.3.1 parse args */
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    // support both: authcode_decode <token>  OR  authcode_decode pw <key> <token>
    let (key_arg, token_arg) = if args.len() >= 3 && args[0] == "pw" {
        (Some(args[1].clone()), args[2].clone())
    } else {
        let token = args.get(0).cloned().context(
            "Usage: authcode_decode <token|-> [--key <key>]  |  authcode_decode pw <key> <token|->",
        )?;
        let key = if args.len() >= 3 && args[1] == "--key" {
            Some(args[2].clone())
        } else {
            None
        };
        (key, token)
    };

    /* §3.3.2 token: argv or stdin */
    let token = if token_arg == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s).context("read stdin")?;
        s.trim_end_matches(['\r', '\n']).to_string()
    } else {
        token_arg
    };

    /* §3.3.3 key selection (CLI flag or TTY prompt; empty = default key) */
    let key = if let Some(k) = key_arg {
        k
    } else if atty::is(atty::Stream::Stdin) {
        rpassword::prompt_password("Key (empty for default): ")?
    } else {
        String::new()
    };

    /* §3.3.4 decode; the typed layer distinguishes reject from empty message */
    match authcode::try_decode(&token, &key) {
        Some(message) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(&message)?;
            if atty::is(atty::Stream::Stdout) {
                out.write_all(b"\n")?;
            }
            Ok(())
        }
        None => anyhow::bail!("invalid, expired, or tampered token"),
    }
}
