//! §2.1.0 Overview — CLI: encode a message into an authcode token
//! - message from argv, or stdin when the message argument is "-"
//! - key via `pw <key> <message>` or `<message> --key <key>`; empty = default
//! - optional --expiry <secs> embeds an absolute expiry inside the token

/* =============================================================================
 * authcode — authcode_encode.rs — Program v2.0.0
 * Numbering: Sections §2.X.0, Subsections §2.X.Y (code-only labels)
 * =============================================================================
 */

// ============================================================================
// §2.2.0 Imports
// ============================================================================
use anyhow::{Context, Result};
use std::io::Read;

// ============================================================================
// §2.3.0 main: CLI Encode Flow
// ============================================================================
fn main() -> Result<()> {
    /* §2.3.1 parse args */
    let mut args = std::env::args().skip(1).collect::<Vec<_>>();

    // detect and strip --expiry <secs>
    let mut expiry: u64 = 0;
    if let Some(pos) = args.iter().position(|a| a == "--expiry") {
        let val = args
            .get(pos + 1)
            .context("--expiry needs a value in seconds")?;
        expiry = val.parse().context("parse --expiry")?;
        args.drain(pos..=pos + 1);
    }

    // support both: authcode_encode pw <key> <message>  OR  authcode_encode <message> [--key <key>]
    let (message_arg, key) = if args.len() >= 3 && args[0] == "pw" {
        (args[2].clone(), args[1].clone())
    } else {
        let message = args.get(0).cloned().context(
            "Usage: authcode_encode [--expiry <secs>] <message|-> [--key <key>]  |  authcode_encode pw <key> [--expiry <secs>] <message|->",
        )?;
        let key = if args.len() >= 3 && args[1] == "--key" {
            args[2].clone()
        } else {
            String::new()
        };
        (message, key)
    };

    /* §2.3.2 message bytes: argv or stdin */
    let message = if message_arg == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("read stdin")?;
        // drop a trailing newline from pipes and heredocs
        while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
            buf.pop();
        }
        buf
    } else {
        message_arg.into_bytes()
    };

    /* §2.3.3 encode + TTY-sensitive output */
    let token = authcode::encode(&message, &key, expiry);
    if atty::is(atty::Stream::Stdout) {
        println!("✅ Encoded {} bytes\n{token}", message.len());
    } else {
        println!("{token}");
    }
    Ok(())
}
